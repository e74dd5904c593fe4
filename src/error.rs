//! # 错误类型
//!
//! 核心编解码模块统一返回 [`StegoError`]，命令行层再用 `anyhow` 附加上下文。

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StegoError {
    /// 源图像无法读取或解码，例如文件不存在或格式损坏
    #[error("Unable to read image '{}'", path.display())]
    ImageFormat {
        path: PathBuf,
        source: image::ImageError,
    },

    /// 结果图像无法写入目标路径
    #[error("Unable to write image '{}'", path.display())]
    Write {
        path: PathBuf,
        source: image::ImageError,
    },

    /// 即使降到每通道 1 bit，秘密图像仍放不进载体
    #[error("Not enough capacity in the cover image. Required: {required} bits, Available: {available} bits")]
    InsufficientCapacity { required: usize, available: usize },

    /// 负载解压失败或头部字段与实际数据不符
    #[error("Hidden payload is corrupted: {0}")]
    DataCorruption(String),

    /// 载体可提取的位数不足以容纳一个完整头部
    #[error("Malformed header: {available} carrier bits available, {required} required")]
    MalformedHeader { available: usize, required: usize },
}
