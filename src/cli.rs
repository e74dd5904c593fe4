//! # 命令行接口模块
//!
//! 使用 `clap` 定义了程序的命令行结构。模式 (`encode` / `decode`) 不区分大小写，
//! 缺省的路径参数留空，交给图像读写时报错。

use clap::{Args, Parser, Subcommand};
use std::ffi::OsString;
use std::path::PathBuf;

/// 把一幅图像隐藏在另一幅无损格式图像 (如 PNG, BMP) 的最低有效位中，或将其恢复。
#[derive(Parser, Debug)]
#[command(
    version,
    about,
    long_about = "把一幅图像隐藏在另一幅无损格式图像 (如 PNG, BMP) 每个颜色通道的最低 2 位中，或从编码后的图像中恢复它。"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// 可用的子命令：encode (隐藏) 和 decode (恢复)。
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// 将秘密图像嵌入载体图像，保存编码后的图像。
    Encode(EncodeArgs),

    /// 从编码后的图像中恢复秘密图像。
    Decode(DecodeArgs),
}

/// 'encode' 命令所需的参数。
#[derive(Args, Debug)]
pub struct EncodeArgs {
    /// 载体图像路径。
    pub cover: Option<PathBuf>,

    /// 要隐藏的秘密图像路径。
    pub secret: Option<PathBuf>,

    /// 编码后图像的输出路径，必须是无损格式。
    pub output: Option<PathBuf>,

    /// 使用 96 位头部、不压缩的旧版格式。
    #[arg(long)]
    pub legacy: bool,
}

/// 'decode' 命令所需的参数。
#[derive(Args, Debug)]
pub struct DecodeArgs {
    /// 编码后图像的路径。
    pub encoded: Option<PathBuf>,

    /// 恢复出的秘密图像的保存路径。
    pub output: Option<PathBuf>,

    /// 按旧版格式解码。
    #[arg(long)]
    pub legacy: bool,
}

/// 把第一个参数 (模式) 转为小写，使 `ENCODE`、`Decode` 等写法也能匹配子命令。
pub fn normalize_mode<I, T>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    args.into_iter()
        .enumerate()
        .map(|(i, arg)| {
            let arg = arg.into();
            if i == 1 { arg.to_ascii_lowercase() } else { arg }
        })
        .collect()
}
