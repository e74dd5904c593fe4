//! # lsb_image 库
//!
//! 本库包含图像隐写工具的核心逻辑：位序列编解码、位平面读写、头部协议、
//! 容量规划以及嵌入/提取引擎。

// 声明库包含的所有模块。

pub mod bits;
pub mod cli;
pub mod compression;
pub mod constants;
pub mod error;
pub mod handler;
pub mod header;
pub mod plane;
pub mod planner;
pub mod steganography;

pub use error::StegoError;
pub use header::{HeaderRecord, Protocol};
pub use steganography::{DecodeReport, EncodeReport, embed, extract};
