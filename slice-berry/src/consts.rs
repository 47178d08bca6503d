//! 通用常量.

/// 8-bit RGB 颜色.
pub mod rgb {
    use image::Rgb;

    /// 白色.
    pub const WHITE: Rgb<u8> = Rgb([255, 255, 255]);

    /// 黑色.
    pub const BLACK: Rgb<u8> = Rgb([0, 0, 0]);

    /// 十字准线的默认颜色 (绿色).
    pub const CROSSHAIR: Rgb<u8> = Rgb([0, 128, 0]);
}

/// 默认伪彩色色表.
pub const DEFAULT_COLOR_MAP: &str = "RdYlBu_r";

/// 默认伪彩色映射区间.
pub const DEFAULT_COLOR_LIMS: [f32; 2] = [-1.0, 1.0];

/// 默认伪彩色缩放系数.
pub const DEFAULT_COLOR_SCALE: f32 = 1.0;

/// 默认伪彩色轴标签.
pub const DEFAULT_COLOR_LABEL: &str = "% Change";

/// 默认透明度映射区间.
pub const DEFAULT_ALPHA_LIMS: [f32; 2] = [0.5, 1.0];

/// 默认透明度轴标签.
pub const DEFAULT_ALPHA_LABEL: &str = "1-p";

/// 默认底图显示窗口 (百分位数).
pub const DEFAULT_WINDOW_PERCENTILES: [f32; 2] = [1.0, 99.0];

/// 默认切片采样点数 (较长的平面内方向).
pub const DEFAULT_SAMPLES: usize = 128;

/// 默认数据插值阶数.
pub const DEFAULT_INTERP_ORDER: u32 = 1;
