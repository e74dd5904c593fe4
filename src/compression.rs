//! zlib 压缩，作为不透明的字节流编解码器使用。

use crate::constants::COMPRESSION_LEVEL;
use crate::error::StegoError;
use miniz_oxide::deflate::compress_to_vec_zlib;
use miniz_oxide::inflate::decompress_to_vec_zlib_with_limit;

pub fn compress(bytes: &[u8]) -> Vec<u8> {
    compress_to_vec_zlib(bytes, COMPRESSION_LEVEL)
}

/// 解压 zlib 数据，输出超过 `limit` 字节即视为损坏。
///
/// # Errors
///
/// 输入不是合法的 zlib 流、被截断或解压结果过大时返回 [`StegoError::DataCorruption`]。
pub fn decompress(bytes: &[u8], limit: usize) -> Result<Vec<u8>, StegoError> {
    decompress_to_vec_zlib_with_limit(bytes, limit)
        .map_err(|err| StegoError::DataCorruption(format!("zlib inflate failed ({:?})", err.status)))
}
