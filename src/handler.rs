//! # 命令处理逻辑模块
//!
//! 包含处理 `encode` 和 `decode` 子命令的高级业务逻辑。
//! 本模块负责读写图像文件并调用核心隐写算法，结果以报告的形式返回给调用方。

use crate::cli::{DecodeArgs, EncodeArgs};
use crate::error::StegoError;
use crate::header::Protocol;
use crate::steganography::{DecodeReport, EncodeReport, embed, extract};
use anyhow::{Context, Result};
use colored::Colorize;
use image::RgbaImage;
use log::debug;
use std::path::Path;

fn protocol(legacy: bool) -> Protocol {
    if legacy { Protocol::Legacy } else { Protocol::Extended }
}

/// 读取图像并转换为 8 位 RGBA。
///
/// # Errors
///
/// 文件不存在、无法识别或已损坏时返回 [`StegoError::ImageFormat`]。
pub fn load_image(path: &Path) -> Result<RgbaImage, StegoError> {
    let image = image::open(path).map_err(|source| StegoError::ImageFormat {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(
        "loaded {} ({}x{})",
        path.display(),
        image.width(),
        image.height()
    );
    Ok(image.to_rgba8())
}

/// 按扩展名推断格式保存图像。
///
/// # Errors
///
/// 路径不可写或格式不受支持时返回 [`StegoError::Write`]。
pub fn save_image(image: &RgbaImage, path: &Path) -> Result<(), StegoError> {
    image.save(path).map_err(|source| StegoError::Write {
        path: path.to_path_buf(),
        source,
    })
}

/// 处理 'Encode' 命令的执行逻辑。
///
/// 读取载体和秘密图像，将秘密图像嵌入载体，最后把编码后的图像写入输出路径。
/// 任何一步失败都不会写出文件。
///
/// # Arguments
///
/// * `args` - 包含输入/输出路径的 `EncodeArgs` 结构体。
///
/// # Errors
///
/// 如果发生以下任一情况，将返回错误：
/// * 无法读取载体或秘密图像。
/// * 载体容量不足以容纳秘密图像。
/// * 无法写入到输出路径。
pub fn handle_encode(args: EncodeArgs) -> Result<EncodeReport> {
    let cover_path = args.cover.unwrap_or_default();
    let secret_path = args.secret.unwrap_or_default();
    let output_path = args.output.unwrap_or_default();

    let mut cover = load_image(&cover_path)?;
    let secret = load_image(&secret_path)?;

    let report = embed(&mut cover, &secret, protocol(args.legacy)).with_context(|| {
        format!(
            "Failed to hide '{}' in '{}'. \nTry a larger cover image or a smaller secret image.",
            secret_path.to_string_lossy().red().bold(),
            cover_path.to_string_lossy().red().bold()
        )
    })?;

    save_image(&cover, &output_path)?;
    Ok(report)
}

/// 处理 'Decode' 命令的执行逻辑。
///
/// 读取编码后的图像，恢复秘密图像并保存到输出路径。
///
/// # Arguments
///
/// * `args` - 包含输入/输出路径的 `DecodeArgs` 结构体。
///
/// # Errors
///
/// 如果发生以下任一情况，将返回错误：
/// * 无法读取编码后的图像。
/// * 图像中没有可识别的头部，或负载已损坏。
/// * 无法写入到输出路径。
pub fn handle_decode(args: DecodeArgs) -> Result<DecodeReport> {
    let encoded_path = args.encoded.unwrap_or_default();
    let output_path = args.output.unwrap_or_default();

    let encoded = load_image(&encoded_path)?;
    let (secret, report) = extract(&encoded, protocol(args.legacy)).with_context(|| {
        format!(
            "Failed to recover a hidden image from '{}'. \nThe image may not contain a hidden image or is corrupted.",
            encoded_path.to_string_lossy().red().bold()
        )
    })?;

    save_image(&secret, &output_path)?;
    Ok(report)
}
