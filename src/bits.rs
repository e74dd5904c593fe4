//! # 位序列编解码
//!
//! 在定宽整数、字节序列和有序位序列之间转换。位序列是线上格式的一部分，
//! 顺序即含义：整数与字节一律按最高位在前展开。

/// 有序的位序列，`true` 表示 1。
pub type BitSequence = Vec<bool>;

/// 将 `u32` 展开为 32 位，最高位在前。
pub fn int_to_bits(n: u32) -> BitSequence {
    (0..32).rev().map(|i| (n >> i) & 1 == 1).collect()
}

/// [`int_to_bits`] 的逆运算。接受不超过 32 位的切片，切片第 0 位为最高位。
pub fn bits_to_int(bits: &[bool]) -> u32 {
    debug_assert!(bits.len() <= 32);
    bits.iter().fold(0u32, |acc, &bit| (acc << 1) | bit as u32)
}

/// 每 8 位打包为一个字节，字节内最高位在前。
///
/// 最后一组不足 8 位时在低位补零，仍然输出一个字节。补齐的位不会被去除，
/// 调用方需要自行记录真实的位数。
pub fn bits_to_bytes(bits: &[bool]) -> Vec<u8> {
    bits.chunks(8)
        .map(|chunk| {
            chunk
                .iter()
                .enumerate()
                .fold(0u8, |byte, (i, &bit)| byte | ((bit as u8) << (7 - i)))
        })
        .collect()
}

/// [`bits_to_bytes`] 的逆运算，总是输出 8 的整数倍个位。
pub fn bytes_to_bits(bytes: &[u8]) -> BitSequence {
    bytes
        .iter()
        .flat_map(|&byte| (0..8).rev().map(move |i| (byte >> i) & 1 == 1))
        .collect()
}
