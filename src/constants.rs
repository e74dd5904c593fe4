/// 载体图像每个颜色通道 (R, G, B) 中用于隐写的最低位数。
/// 每个像素因此提供 3 * 2 = 6 bits 的容量，alpha 通道从不使用。
pub const CARRIER_BITS: u8 = 2;

/// 每个像素参与隐写的颜色通道数 (R, G, B)。
pub const CHANNELS: usize = 3;

/// 头部中单个字段的位宽 (大端 u32)。
pub const HEADER_FIELD_BITS: usize = 32;

/// 扩展协议头部：六个 32 位字段，共 192 bits。
pub const HEADER_BITS: usize = 6 * HEADER_FIELD_BITS;

/// 旧版协议头部：宽、高、每通道位数三个字段，共 96 bits。
pub const LEGACY_HEADER_BITS: usize = 3 * HEADER_FIELD_BITS;

/// 秘密图像每个通道最多保留的高位数。
pub const MAX_BITS_PER_CHANNEL: u8 = 8;

/// 秘密图像允许超出载体尺寸的倍数，超过后先缩放。
pub const RESCALE_BIAS: f64 = 1.5;

/// zlib 压缩等级 (0-10)。
pub const COMPRESSION_LEVEL: u8 = 9;
