//! 内置色表数据.
//!
//! 均匀色表以 `0xRRGGBB` 列表给出, 各颜色在 `[0, 1]` 上等距分布.
//! 分段色表逐通道给出 `(位置, 取值)` 锚点.

pub(super) type Anchors = &'static [(f32, f32)];

pub(super) const VIRIDIS: &[u32] = &[
    0x440154, 0x482878, 0x3e4a89, 0x31688e, 0x26828e, 0x1f9e89, 0x35b779, 0x6dcd59, 0xb4de2c,
    0xfde725,
];

pub(super) const INFERNO: &[u32] = &[
    0x000004, 0x1b0c41, 0x4a0c6b, 0x781c6d, 0xa52c60, 0xcf4446, 0xed6925, 0xfb9b06, 0xf7d13d,
    0xfcffa4,
];

pub(super) const MAGMA: &[u32] = &[
    0x000004, 0x180f3d, 0x440f76, 0x721f81, 0x9e2f7f, 0xcd4071, 0xf1605d, 0xfd9668, 0xfeca8d,
    0xfcfdbf,
];

pub(super) const PLASMA: &[u32] = &[
    0x0d0887, 0x47039f, 0x7301a8, 0x9c179e, 0xbd3786, 0xd8576b, 0xed7953, 0xfa9e3b, 0xfdc926,
    0xf0f921,
];

/// ColorBrewer RdYlBu, 红 -> 黄 -> 蓝.
pub(super) const RDYLBU: &[u32] = &[
    0xa50026, 0xd73027, 0xf46d43, 0xfdae61, 0xfee090, 0xffffbf, 0xe0f3f8, 0xabd9e9, 0x74add1,
    0x4575b4, 0x313695,
];

/// ColorBrewer RdBu, 红 -> 白 -> 蓝.
pub(super) const RDBU: &[u32] = &[
    0x67001f, 0xb2182b, 0xd6604d, 0xf4a582, 0xfddbc7, 0xf7f7f7, 0xd1e5f0, 0x92c5de, 0x4393c3,
    0x2166ac, 0x053061,
];

/// ColorBrewer PiYG, 品红 -> 白 -> 绿.
pub(super) const PIYG: &[u32] = &[
    0x8e0152, 0xc51b7d, 0xde77ae, 0xf1b6da, 0xfde0ef, 0xf7f7f7, 0xe6f5d0, 0xb8e186, 0x7fbc41,
    0x4d9221, 0x276419,
];

pub(super) const COOLWARM: &[u32] = &[
    0x3b4cc0, 0x6788ee, 0x9abbff, 0xc9d7f0, 0xedd1c2, 0xf7a889, 0xe26952, 0xb40426,
];

pub(super) const GRAY: [Anchors; 3] = [
    &[(0.0, 0.0), (1.0, 1.0)],
    &[(0.0, 0.0), (1.0, 1.0)],
    &[(0.0, 0.0), (1.0, 1.0)],
];

pub(super) const HOT: [Anchors; 3] = [
    &[(0.0, 0.0416), (0.365079, 1.0), (1.0, 1.0)],
    &[(0.0, 0.0), (0.365079, 0.0), (0.746032, 1.0), (1.0, 1.0)],
    &[(0.0, 0.0), (0.746032, 0.0), (1.0, 1.0)],
];

pub(super) const JET: [Anchors; 3] = [
    &[(0.0, 0.0), (0.35, 0.0), (0.66, 1.0), (0.89, 1.0), (1.0, 0.5)],
    &[
        (0.0, 0.0),
        (0.125, 0.0),
        (0.375, 1.0),
        (0.64, 1.0),
        (0.91, 0.0),
        (1.0, 0.0),
    ],
    &[(0.0, 0.5), (0.11, 1.0), (0.34, 1.0), (0.65, 0.0), (1.0, 0.0)],
];
