//! # 头部协议
//!
//! 头部写在载体 2 位最低平面的最前面。扩展协议为六个大端 32 位字段
//! (宽、高、每通道位数、负载位长、原始宽、原始高)，共 192 bits；旧版协议只有
//! 前三个字段，共 96 bits，且负载不压缩。两种格式互不兼容，由调用方显式选择。

use crate::bits::{BitSequence, bits_to_int, int_to_bits};
use crate::constants::{CHANNELS, HEADER_BITS, HEADER_FIELD_BITS, LEGACY_HEADER_BITS};
use crate::error::StegoError;
use std::fmt;

/// 线上协议版本。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Protocol {
    /// 96 位头部，原始供体位直接跟在头部之后。
    Legacy,
    /// 192 位头部，负载经过 zlib 压缩。
    #[default]
    Extended,
}

impl Protocol {
    pub fn header_bits(self) -> usize {
        match self {
            Protocol::Legacy => LEGACY_HEADER_BITS,
            Protocol::Extended => HEADER_BITS,
        }
    }

    pub fn compression_enabled(self) -> bool {
        matches!(self, Protocol::Extended)
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Protocol::Legacy => write!(f, "legacy ({LEGACY_HEADER_BITS}-bit header, raw)"),
            Protocol::Extended => write!(f, "extended ({HEADER_BITS}-bit header, zlib)"),
        }
    }
}

/// 每次编码构造一次的元数据记录。字段值在解析时不做范围检查。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeaderRecord {
    pub image_width: u32,
    pub image_height: u32,
    pub bits_per_channel: u32,
    pub payload_bit_length: u32,
    pub original_width: u32,
    pub original_height: u32,
}

impl HeaderRecord {
    /// 按协议序列化。旧版协议只写入前三个字段。
    pub fn to_bits(&self, protocol: Protocol) -> BitSequence {
        let fields = [
            self.image_width,
            self.image_height,
            self.bits_per_channel,
            self.payload_bit_length,
            self.original_width,
            self.original_height,
        ];
        let count = protocol.header_bits() / HEADER_FIELD_BITS;
        fields[..count].iter().flat_map(|&f| int_to_bits(f)).collect()
    }

    /// 从 `bits` 的开头解析头部，只要求位数足够。
    ///
    /// 旧版头部没有负载长度和原始尺寸：负载长度由尺寸和每通道位数推出
    /// (溢出时饱和为 `u32::MAX`)，原始尺寸等于存储尺寸。
    ///
    /// # Errors
    ///
    /// 可用位数少于协议头部长度时返回 [`StegoError::MalformedHeader`]。
    pub fn from_bits(bits: &[bool], protocol: Protocol) -> Result<Self, StegoError> {
        let required = protocol.header_bits();
        if bits.len() < required {
            return Err(StegoError::MalformedHeader {
                available: bits.len(),
                required,
            });
        }

        let mut fields = bits[..required].chunks(HEADER_FIELD_BITS).map(bits_to_int);
        let mut next = || fields.next().unwrap_or_default();
        let image_width = next();
        let image_height = next();
        let bits_per_channel = next();

        let record = match protocol {
            Protocol::Extended => HeaderRecord {
                image_width,
                image_height,
                bits_per_channel,
                payload_bit_length: next(),
                original_width: next(),
                original_height: next(),
            },
            Protocol::Legacy => {
                let raw = (image_width as u64)
                    .checked_mul(image_height as u64)
                    .and_then(|n| n.checked_mul(CHANNELS as u64 * bits_per_channel as u64))
                    .and_then(|n| u32::try_from(n).ok());
                HeaderRecord {
                    image_width,
                    image_height,
                    bits_per_channel,
                    payload_bit_length: raw.unwrap_or(u32::MAX),
                    original_width: image_width,
                    original_height: image_height,
                }
            }
        };
        Ok(record)
    }
}
