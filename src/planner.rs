//! # 容量规划
//!
//! 决定秘密图像每通道保留多少高位，并在启用压缩时反复压缩直到负载放得进载体。
//! 降低位数会永久丢弃低位颜色信息。

use crate::bits::{BitSequence, bits_to_bytes, bytes_to_bits};
use crate::compression::compress;
use crate::constants::{CARRIER_BITS, MAX_BITS_PER_CHANNEL, RESCALE_BIAS};
use crate::error::StegoError;
use crate::header::Protocol;
use crate::plane::{Plane, read_image_plane};
use image::RgbaImage;
use log::debug;

/// 一次编码的规划结果，只存在于内存中，最终体现在头部里。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapacityPlan {
    pub bits_per_channel: u8,
    /// 未压缩的供体位数。
    pub raw_bits: usize,
    /// 实际写入载体的负载。
    pub payload: BitSequence,
}

impl CapacityPlan {
    /// 负载相对原始供体位的比例，小于 1 表示压缩有效。
    pub fn compression_ratio(&self) -> f64 {
        if self.raw_bits == 0 {
            return 1.0;
        }
        self.payload.len() as f64 / self.raw_bits as f64
    }
}

/// 载体最低平面的总容量 `3 * 像素数 * 2`。
pub fn carrier_capacity(width: u32, height: u32) -> usize {
    Plane::low(CARRIER_BITS).capacity(width, height)
}

/// 秘密图像像素数超过载体放大 [`RESCALE_BIAS`] 倍后的像素数时，返回保持宽高比的缩放目标。
///
/// 宽、高两个方向各自计算超出比例，以较大的那个为准同比缩小。
pub fn rescale_target(cover: (u32, u32), secret: (u32, u32)) -> Option<(u32, u32)> {
    let max_width = cover.0 as f64 * RESCALE_BIAS;
    let max_height = cover.1 as f64 * RESCALE_BIAS;
    if secret.0 as f64 * secret.1 as f64 <= max_width * max_height {
        return None;
    }

    let width_ratio = secret.0 as f64 / max_width;
    let height_ratio = secret.1 as f64 / max_height;
    let (width, height) = if width_ratio >= height_ratio {
        (max_width, secret.1 as f64 * max_width / secret.0 as f64)
    } else {
        (secret.0 as f64 * max_height / secret.1 as f64, max_height)
    };
    Some(((width.floor() as u32).max(1), (height.floor() as u32).max(1)))
}

/// 从每通道 8 位开始逐位递减，返回第一个能放进 `available_bits` 的方案。
///
/// # Errors
///
/// 降到每通道 1 位仍放不下时返回 [`StegoError::InsufficientCapacity`]，
/// 其中 `required` 为 1 位时的负载长度。
pub fn plan(
    secret: &RgbaImage,
    available_bits: usize,
    protocol: Protocol,
) -> Result<CapacityPlan, StegoError> {
    let mut required = 0;
    for bits_per_channel in (1..=MAX_BITS_PER_CHANNEL).rev() {
        let candidate = candidate(secret, bits_per_channel, protocol);
        debug!(
            "{} bits per channel: {} raw bits -> {} payload bits (available {})",
            bits_per_channel,
            candidate.raw_bits,
            candidate.payload.len(),
            available_bits
        );
        if candidate.payload.len() <= available_bits {
            return Ok(candidate);
        }
        required = candidate.payload.len();
    }

    Err(StegoError::InsufficientCapacity {
        required,
        available: available_bits,
    })
}

fn candidate(secret: &RgbaImage, bits_per_channel: u8, protocol: Protocol) -> CapacityPlan {
    let donor = read_image_plane(secret, Plane::high(bits_per_channel));
    let raw_bits = donor.len();
    let payload = if protocol.compression_enabled() {
        bytes_to_bits(&compress(&bits_to_bytes(&donor)))
    } else {
        donor
    };
    CapacityPlan {
        bits_per_channel,
        raw_bits,
        payload,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn noise(width: u32, height: u32, seed: u32) -> RgbaImage {
        let mut state = seed;
        RgbaImage::from_fn(width, height, |_, _| {
            state = state.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
            let [r, g, b, _] = state.to_be_bytes();
            Rgba([r, g, b, 255])
        })
    }

    #[test]
    fn capacity_is_six_bits_per_pixel() {
        assert_eq!(carrier_capacity(100, 100), 60_000);
        assert_eq!(carrier_capacity(1, 1), 6);
    }

    #[test]
    fn raw_bits_never_grow_as_depth_drops() {
        let secret = noise(7, 5, 1);
        let sizes: Vec<usize> = (1..=MAX_BITS_PER_CHANNEL)
            .map(|bits| candidate(&secret, bits, Protocol::Legacy).raw_bits)
            .collect();
        assert!(sizes.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(sizes[7], 7 * 5 * 3 * 8);
    }

    #[test]
    fn roomy_cover_keeps_full_depth() -> Result<(), StegoError> {
        let secret = RgbaImage::from_pixel(10, 10, Rgba([10, 200, 30, 255]));
        let plan = plan(&secret, 60_000 - 192, Protocol::Extended)?;
        assert_eq!(plan.bits_per_channel, 8);
        assert_eq!(plan.raw_bits, 2400);
        assert!(plan.compression_ratio() < 1.0);
        assert_eq!(plan.payload.len() % 8, 0);
        Ok(())
    }

    #[test]
    fn tight_cover_lowers_depth() -> Result<(), StegoError> {
        let secret = noise(12, 12, 7);
        let plan = plan(&secret, 2208, Protocol::Extended)?;
        assert!(plan.bits_per_channel < 8);
        assert!(plan.payload.len() <= 2208);
        Ok(())
    }

    #[test]
    fn legacy_picks_largest_raw_fit() -> Result<(), StegoError> {
        let secret = noise(10, 10, 3);
        // 100 像素 * 3 通道，每通道 4 位刚好 1200 bits
        let plan = plan(&secret, 1250, Protocol::Legacy)?;
        assert_eq!(plan.bits_per_channel, 4);
        assert_eq!(plan.payload.len(), 1200);
        assert_eq!(plan.compression_ratio(), 1.0);
        Ok(())
    }

    #[test]
    fn hopeless_cover_fails() {
        let secret = noise(30, 30, 11);
        let err = plan(&secret, 100, Protocol::Legacy).unwrap_err();
        assert!(matches!(
            err,
            StegoError::InsufficientCapacity {
                required: 2700,
                available: 100
            }
        ));
    }

    #[test]
    fn small_secret_is_not_rescaled() {
        assert_eq!(rescale_target((100, 100), (150, 150)), None);
        assert_eq!(rescale_target((100, 100), (10, 10)), None);
    }

    #[test]
    fn rescale_follows_the_dominant_axis() {
        assert_eq!(rescale_target((20, 20), (40, 40)), Some((30, 30)));
        // 宽度超出更多，以宽度为准
        assert_eq!(rescale_target((10, 10), (60, 30)), Some((15, 7)));
        assert_eq!(rescale_target((10, 10), (30, 60)), Some((7, 15)));
    }
}
