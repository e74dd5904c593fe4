//! # 像素位平面访问
//!
//! 读写每个颜色通道中一段连续的位区间 (位平面)。区间内的位总是从 `start`
//! 向上迭代，即低平面按重要性升序读出。alpha 通道从不参与读写。

use crate::bits::BitSequence;
use crate::constants::{CHANNELS, MAX_BITS_PER_CHANNEL};
use image::RgbaImage;

/// 单个通道内的位区间 `[start, end)`，满足 `0 <= start < end <= 8`。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Plane {
    start: u8,
    end: u8,
}

impl Plane {
    /// 最低的 `bit_count` 位，载体平面即 `Plane::low(2)`。
    pub fn low(bit_count: u8) -> Self {
        debug_assert!((1..=MAX_BITS_PER_CHANNEL).contains(&bit_count));
        Plane {
            start: 0,
            end: bit_count,
        }
    }

    /// 最高的 `bit_count` 位，秘密图像的供体平面。
    pub fn high(bit_count: u8) -> Self {
        debug_assert!((1..=MAX_BITS_PER_CHANNEL).contains(&bit_count));
        Plane {
            start: MAX_BITS_PER_CHANNEL - bit_count,
            end: MAX_BITS_PER_CHANNEL,
        }
    }

    pub fn width(&self) -> usize {
        (self.end - self.start) as usize
    }

    /// 把 `values` 写入 `value` 的这段位区间。
    pub fn inject(&self, value: u8, values: &[bool]) -> u8 {
        inject_plane(value, self.start, self.end, values)
    }

    /// 整幅图像在该平面上的总位数。
    pub fn capacity(&self, width: u32, height: u32) -> usize {
        width as usize * height as usize * CHANNELS * self.width()
    }
}

/// 取出 `value` 的 `[start, end)` 位，从 `start` 开始向高位迭代。
pub fn extract_plane(value: u8, start: u8, end: u8) -> BitSequence {
    debug_assert!(start < end && end <= 8);
    (start..end).map(|bit| (value >> bit) & 1 == 1).collect()
}

/// 用 `values` 覆盖 `value` 的 `[start, end)` 位，其余位保持不变。
pub fn inject_plane(value: u8, start: u8, end: u8, values: &[bool]) -> u8 {
    debug_assert_eq!(values.len(), (end - start) as usize);
    (start..end).zip(values).fold(value, |acc, (bit, &set)| {
        if set { acc | (1 << bit) } else { acc & !(1 << bit) }
    })
}

/// 按行优先顺序读出整幅图像在 `plane` 上的位，每个像素依次为 R、G、B。
pub fn read_image_plane(image: &RgbaImage, plane: Plane) -> BitSequence {
    let mut bits = Vec::with_capacity(plane.capacity(image.width(), image.height()));
    for pixel in image.pixels() {
        for &channel in &pixel.0[..CHANNELS] {
            bits.extend(extract_plane(channel, plane.start, plane.end));
        }
    }
    bits
}

/// 从第一个像素开始把 `bits` 写入 `plane`，数据写完后剩余像素保持原样。
///
/// 最后一个通道不足一个平面宽度时只覆盖它拿到的那几位。超出图像容量的位被丢弃，
/// 调用方负责事先检查容量。
pub fn write_image_plane(image: &mut RgbaImage, plane: Plane, bits: &[bool]) {
    let mut chunks = bits.chunks(plane.width());
    for pixel in image.pixels_mut() {
        for channel in pixel.0[..CHANNELS].iter_mut() {
            let Some(chunk) = chunks.next() else {
                return;
            };
            let end = plane.start + chunk.len() as u8;
            *channel = inject_plane(*channel, plane.start, end, chunk);
        }
    }
}
