//! # 嵌入与提取引擎
//!
//! 编码：头部位 + 负载位拼成一条位流，按行优先、每像素 R/G/B 的顺序写入载体的
//! 2 位最低平面。解码：读出整个最低平面，解析头部，截取负载，按需解压，
//! 再把供体位写回一张全零图像的高位平面。

use crate::bits::{BitSequence, bits_to_bytes, bytes_to_bits};
use crate::compression::decompress;
use crate::constants::{CARRIER_BITS, CHANNELS, MAX_BITS_PER_CHANNEL};
use crate::error::StegoError;
use crate::header::{HeaderRecord, Protocol};
use crate::planner::{carrier_capacity, plan, rescale_target};
use crate::plane::{Plane, read_image_plane, write_image_plane};
use colored::Colorize;
use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};
use log::{debug, info, warn};
use std::fmt;

/// 一次编码的结果摘要，由调用方决定如何展示。
#[derive(Debug, Clone, PartialEq)]
pub struct EncodeReport {
    pub protocol: Protocol,
    pub cover_width: u32,
    pub cover_height: u32,
    pub capacity_bits: usize,
    /// 实际嵌入的秘密图像尺寸 (可能已缩放)。
    pub secret_width: u32,
    pub secret_height: u32,
    pub original_width: u32,
    pub original_height: u32,
    pub bits_per_channel: u8,
    pub raw_bits: usize,
    pub payload_bits: usize,
    pub compression_ratio: f64,
}

impl EncodeReport {
    pub fn rescaled(&self) -> bool {
        (self.secret_width, self.secret_height) != (self.original_width, self.original_height)
    }
}

impl fmt::Display for EncodeReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.rescaled() {
            writeln!(
                f,
                "Secret image rescaled from {}x{} to {}",
                self.original_width,
                self.original_height,
                format!("{}x{}", self.secret_width, self.secret_height).yellow().bold()
            )?;
        }
        write!(
            f,
            "Image encoded successfully: {} bits per channel, {} of {} carrier bits used (payload ratio {:.3}, {})",
            self.bits_per_channel.to_string().green().bold(),
            (self.protocol.header_bits() + self.payload_bits).to_string().green(),
            self.capacity_bits,
            self.compression_ratio,
            self.protocol
        )
    }
}

/// 一次解码的结果摘要。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeReport {
    pub protocol: Protocol,
    pub width: u32,
    pub height: u32,
    pub bits_per_channel: u8,
    pub payload_bits: usize,
    pub original_width: u32,
    pub original_height: u32,
}

impl DecodeReport {
    /// 头部记录的原始尺寸与存储尺寸不同，说明编码时做过缩放。解码不会放大回去。
    pub fn dimension_mismatch(&self) -> bool {
        (self.width, self.height) != (self.original_width, self.original_height)
    }
}

impl fmt::Display for DecodeReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.dimension_mismatch() {
            writeln!(
                f,
                "Note: the secret was {}x{} originally and is restored at {}",
                self.original_width,
                self.original_height,
                format!("{}x{}", self.width, self.height).yellow().bold()
            )?;
        }
        write!(
            f,
            "Image decoded successfully: {}x{} at {} bits per channel",
            self.width,
            self.height,
            self.bits_per_channel.to_string().green().bold()
        )
    }
}

/// 把 `secret` 嵌入 `cover` 的最低平面，`cover` 原地变为编码后的图像。
///
/// 秘密图像过大时先按比例缩小，再由规划器选择每通道位数。
/// 任何错误都发生在写入之前，失败时 `cover` 保持不变。
///
/// # Errors
///
/// * 载体容量不足以容纳头部，或每通道 1 位时负载仍放不下：
///   [`StegoError::InsufficientCapacity`]。
pub fn embed(
    cover: &mut RgbaImage,
    secret: &RgbaImage,
    protocol: Protocol,
) -> Result<EncodeReport, StegoError> {
    let capacity_bits = carrier_capacity(cover.width(), cover.height());
    let header_bits = protocol.header_bits();
    let available = capacity_bits
        .checked_sub(header_bits)
        .ok_or(StegoError::InsufficientCapacity {
            required: header_bits,
            available: capacity_bits,
        })?;
    debug!("carrier holds {capacity_bits} bits, {available} after the header");

    let (original_width, original_height) = secret.dimensions();
    let resized;
    let secret = match rescale_target(cover.dimensions(), secret.dimensions()) {
        Some((width, height)) => {
            info!(
                "rescaling secret from {original_width}x{original_height} to {width}x{height}"
            );
            resized = imageops::resize(secret, width, height, FilterType::Triangle);
            &resized
        }
        None => secret,
    };

    let plan = plan(secret, available, protocol)?;
    let payload_bit_length =
        u32::try_from(plan.payload.len()).map_err(|_| StegoError::InsufficientCapacity {
            required: plan.payload.len(),
            available: u32::MAX as usize,
        })?;

    let header = HeaderRecord {
        image_width: secret.width(),
        image_height: secret.height(),
        bits_per_channel: plan.bits_per_channel as u32,
        payload_bit_length,
        original_width,
        original_height,
    };

    let mut stream = header.to_bits(protocol);
    stream.extend_from_slice(&plan.payload);
    debug_assert!(stream.len() <= capacity_bits);
    write_image_plane(cover, Plane::low(CARRIER_BITS), &stream);

    Ok(EncodeReport {
        protocol,
        cover_width: cover.width(),
        cover_height: cover.height(),
        capacity_bits,
        secret_width: secret.width(),
        secret_height: secret.height(),
        original_width,
        original_height,
        bits_per_channel: plan.bits_per_channel,
        raw_bits: plan.raw_bits,
        payload_bits: plan.payload.len(),
        compression_ratio: plan.compression_ratio(),
    })
}

/// 从编码后的图像中恢复秘密图像，alpha 固定为不透明，低位全部为 0。
///
/// 头部字段在重建之前全部校验，不会为损坏的数据生成图像。
///
/// # Errors
///
/// * 可用位数不足一个头部：[`StegoError::MalformedHeader`]。
/// * 头部字段不合理、负载越界、解压失败或供体位不足：[`StegoError::DataCorruption`]。
pub fn extract(
    encoded: &RgbaImage,
    protocol: Protocol,
) -> Result<(RgbaImage, DecodeReport), StegoError> {
    let carrier = read_image_plane(encoded, Plane::low(CARRIER_BITS));
    let header = HeaderRecord::from_bits(&carrier, protocol)?;
    debug!("decoded header {header:?}");

    let bits_per_channel = u8::try_from(header.bits_per_channel)
        .ok()
        .filter(|bits| (1..=MAX_BITS_PER_CHANNEL).contains(bits))
        .ok_or_else(|| {
            StegoError::DataCorruption(format!(
                "bits per channel {} is outside 1..={MAX_BITS_PER_CHANNEL}",
                header.bits_per_channel
            ))
        })?;
    if header.image_width == 0 || header.image_height == 0 {
        return Err(StegoError::DataCorruption(format!(
            "stored image size {}x{} is empty",
            header.image_width, header.image_height
        )));
    }

    let raw_bits = donor_bits(header.image_width, header.image_height, bits_per_channel)
        .ok_or_else(|| {
            StegoError::DataCorruption(format!(
                "stored image size {}x{} is implausible",
                header.image_width, header.image_height
            ))
        })?;

    let start = protocol.header_bits();
    let payload_bits = header.payload_bit_length as usize;
    let payload = carrier
        .get(start..start + payload_bits)
        .ok_or_else(|| {
            StegoError::DataCorruption(format!(
                "payload of {payload_bits} bits does not fit in the {} carrier bits after the header",
                carrier.len() - start
            ))
        })?;

    let donor: BitSequence = if protocol.compression_enabled() {
        let inflated = decompress(&bits_to_bytes(payload), raw_bits.div_ceil(8))?;
        bytes_to_bits(&inflated)
    } else {
        payload.to_vec()
    };
    if donor.len() < raw_bits {
        return Err(StegoError::DataCorruption(format!(
            "payload holds {} donor bits, {raw_bits} required",
            donor.len()
        )));
    }

    let image = reconstruct(
        header.image_width,
        header.image_height,
        bits_per_channel,
        &donor,
    );
    let report = DecodeReport {
        protocol,
        width: header.image_width,
        height: header.image_height,
        bits_per_channel,
        payload_bits,
        original_width: header.original_width,
        original_height: header.original_height,
    };
    if report.dimension_mismatch() {
        warn!(
            "secret was {}x{} before encoding, restoring at {}x{}",
            report.original_width, report.original_height, report.width, report.height
        );
    }
    Ok((image, report))
}

/// `width * height * 3 * bits_per_channel`，溢出 `usize` 时返回 `None`。
fn donor_bits(width: u32, height: u32, bits_per_channel: u8) -> Option<usize> {
    (width as usize)
        .checked_mul(height as usize)?
        .checked_mul(CHANNELS * bits_per_channel as usize)
}

fn reconstruct(width: u32, height: u32, bits_per_channel: u8, donor: &[bool]) -> RgbaImage {
    let plane = Plane::high(bits_per_channel);
    let mut groups = donor.chunks_exact(bits_per_channel as usize);
    RgbaImage::from_fn(width, height, |_, _| {
        let mut pixel = [0, 0, 0, u8::MAX];
        for channel in pixel[..CHANNELS].iter_mut() {
            if let Some(group) = groups.next() {
                *channel = plane.inject(0, group);
            }
        }
        Rgba(pixel)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::HEADER_BITS;

    fn gradient(width: u32, height: u32) -> RgbaImage {
        RgbaImage::from_fn(width, height, |x, y| {
            Rgba([(x * 25) as u8, (y * 25) as u8, ((x + y) * 12) as u8, 255])
        })
    }

    #[test]
    fn solid_secret_round_trips_exactly() -> Result<(), StegoError> {
        let mut cover = RgbaImage::from_pixel(100, 100, Rgba([90, 140, 200, 255]));
        let secret = RgbaImage::from_pixel(10, 10, Rgba([250, 5, 128, 255]));

        let encoded = embed(&mut cover, &secret, Protocol::Extended)?;
        assert_eq!(encoded.bits_per_channel, 8);
        assert!(!encoded.rescaled());

        let (decoded, report) = extract(&cover, Protocol::Extended)?;
        assert_eq!(decoded, secret);
        assert_eq!(report.bits_per_channel, 8);
        assert_eq!(report.payload_bits, encoded.payload_bits);
        assert!(!report.dimension_mismatch());
        Ok(())
    }

    #[test]
    fn cover_changes_only_in_the_low_bits() -> Result<(), StegoError> {
        let original = gradient(40, 40);
        let mut cover = original.clone();
        embed(&mut cover, &gradient(8, 8), Protocol::Extended)?;

        for (before, after) in original.pixels().zip(cover.pixels()) {
            for channel in 0..CHANNELS {
                assert_eq!(before.0[channel] & 0xFC, after.0[channel] & 0xFC);
            }
            assert_eq!(before.0[3], after.0[3]);
        }
        Ok(())
    }

    #[test]
    fn legacy_round_trip_is_uncompressed() -> Result<(), StegoError> {
        let mut cover = RgbaImage::from_pixel(40, 40, Rgba([1, 2, 3, 255]));
        let secret = gradient(10, 10);

        let encoded = embed(&mut cover, &secret, Protocol::Legacy)?;
        assert_eq!(encoded.payload_bits, encoded.raw_bits);

        let (decoded, report) = extract(&cover, Protocol::Legacy)?;
        let mask = 0xFFu8 << (8 - report.bits_per_channel);
        for (restored, source) in decoded.pixels().zip(secret.pixels()) {
            for channel in 0..CHANNELS {
                assert_eq!(restored.0[channel], source.0[channel] & mask);
            }
            assert_eq!(restored.0[3], 255);
        }
        Ok(())
    }

    #[test]
    fn tiny_cover_cannot_hold_a_header() {
        let mut cover = RgbaImage::new(4, 4);
        let secret = RgbaImage::new(1, 1);
        let err = embed(&mut cover, &secret, Protocol::Extended).unwrap_err();
        assert!(matches!(
            err,
            StegoError::InsufficientCapacity {
                required: HEADER_BITS,
                available: 96
            }
        ));
        assert_eq!(cover, RgbaImage::new(4, 4));
    }

    #[test]
    fn tiny_image_has_malformed_header() {
        let encoded = RgbaImage::new(3, 3);
        assert!(matches!(
            extract(&encoded, Protocol::Extended),
            Err(StegoError::MalformedHeader {
                available: 54,
                required: HEADER_BITS
            })
        ));
    }

    #[test]
    fn plain_image_is_rejected_before_reconstruction() {
        // 全零载体解析出宽高为 0 的头部
        let encoded = RgbaImage::from_pixel(50, 50, Rgba([0, 0, 0, 255]));
        assert!(matches!(
            extract(&encoded, Protocol::Extended),
            Err(StegoError::DataCorruption(_))
        ));
    }

    #[test]
    fn oversized_payload_length_is_rejected() {
        let header = HeaderRecord {
            image_width: 2,
            image_height: 2,
            bits_per_channel: 8,
            payload_bit_length: 1_000_000,
            original_width: 2,
            original_height: 2,
        };
        let mut encoded = RgbaImage::new(50, 50);
        write_image_plane(
            &mut encoded,
            Plane::low(CARRIER_BITS),
            &header.to_bits(Protocol::Extended),
        );
        assert!(matches!(
            extract(&encoded, Protocol::Extended),
            Err(StegoError::DataCorruption(_))
        ));
    }

    #[test]
    fn garbage_payload_fails_to_inflate() {
        let header = HeaderRecord {
            image_width: 2,
            image_height: 2,
            bits_per_channel: 8,
            payload_bit_length: 64,
            original_width: 2,
            original_height: 2,
        };
        let mut stream = header.to_bits(Protocol::Extended);
        stream.extend([true; 64]);
        let mut encoded = RgbaImage::new(50, 50);
        write_image_plane(&mut encoded, Plane::low(CARRIER_BITS), &stream);
        assert!(matches!(
            extract(&encoded, Protocol::Extended),
            Err(StegoError::DataCorruption(_))
        ));
    }

    #[test]
    fn reconstruct_fills_high_bits_only() {
        let donor = [true, true, true, false, false, true];
        let image = reconstruct(1, 1, 2, &donor);
        assert_eq!(image.get_pixel(0, 0).0, [0xC0, 0x40, 0x80, 255]);
    }
}
