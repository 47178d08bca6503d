//! 多图层切片合成.
//!
//! 一次合成由灰度底图, 可选的伪彩色图层, 可选的透明度图层和可选的遮罩组成.
//! 所有图层都在同一 [`SliceGeometry`] 上采样, 因此形状一致.

use log::debug;
use ndarray::ArrayView2;

use crate::color::{self, colormap, RgbField, ScalarField};
use crate::consts::{
    DEFAULT_ALPHA_LIMS, DEFAULT_COLOR_LIMS, DEFAULT_COLOR_MAP, DEFAULT_COLOR_SCALE,
    DEFAULT_INTERP_ORDER,
};
use crate::geometry::SliceGeometry;
use crate::sample::Boundary;
use crate::{ensure_shape, Limits, SliceResult, Volume, Window};

/// 合成参数.
///
/// 默认值与命令行工具一致: 一阶插值, `RdYlBu_r` 色表, 色彩区间 `(-1, 1)`,
/// 不缩放, 无阈值, 透明度区间 `(0.5, 1.0)`, 越界取最近边缘.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct Options {
    /// 插值阶数, 见 [`crate::sample`].
    pub interp_order: u32,

    /// 伪彩色图层的色表名称.
    pub color_map: String,

    /// 伪彩色图层的映射区间.
    pub color_lims: Limits,

    /// 伪彩色图层采样后乘以的系数.
    pub color_scale: f32,

    /// 伪彩色遮罩的二值化阈值. 严格大于阈值处可见.
    ///
    /// `Some(0.0)` 是有效阈值 (仅正值可见), 不等同于 `None`.
    pub color_mask_thresh: Option<f32>,

    /// 透明度图层的映射区间.
    pub alpha_lims: Limits,

    /// 越界采样点的延拓方式.
    pub boundary: Boundary,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            interp_order: DEFAULT_INTERP_ORDER,
            color_map: String::from(DEFAULT_COLOR_MAP),
            // 常量区间, 该操作不会生成 `Err`, 可直接 unwrap.
            color_lims: Limits::try_from(DEFAULT_COLOR_LIMS).unwrap(),
            color_scale: DEFAULT_COLOR_SCALE,
            color_mask_thresh: None,
            alpha_lims: Limits::try_from(DEFAULT_ALPHA_LIMS).unwrap(),
            boundary: Boundary::default(),
        }
    }
}

/// 参与合成的体数据. 除底图外均可缺省, 缺省的图层不参与合成.
#[derive(Copy, Clone, Debug)]
pub struct Layers<'a> {
    /// 结构像底图.
    pub base: &'a Volume,

    /// 整体遮罩, 最后作用于合成结果.
    pub mask: Option<&'a Volume>,

    /// 伪彩色图层, 如统计效应图.
    pub color: Option<&'a Volume>,

    /// 伪彩色图层的专用遮罩.
    pub color_mask: Option<&'a Volume>,

    /// 透明度图层, 如 `1 - p` 图.
    pub alpha: Option<&'a Volume>,
}

impl<'a> Layers<'a> {
    /// 仅含底图.
    #[inline]
    pub fn new(base: &'a Volume) -> Self {
        Self {
            base,
            mask: None,
            color: None,
            color_mask: None,
            alpha: None,
        }
    }

    /// 设置整体遮罩.
    #[inline]
    pub fn with_mask(mut self, mask: Option<&'a Volume>) -> Self {
        self.mask = mask;
        self
    }

    /// 设置伪彩色图层.
    #[inline]
    pub fn with_color(mut self, color: Option<&'a Volume>) -> Self {
        self.color = color;
        self
    }

    /// 设置伪彩色遮罩.
    #[inline]
    pub fn with_color_mask(mut self, color_mask: Option<&'a Volume>) -> Self {
        self.color_mask = color_mask;
        self
    }

    /// 设置透明度图层.
    #[inline]
    pub fn with_alpha(mut self, alpha: Option<&'a Volume>) -> Self {
        self.alpha = alpha;
        self
    }
}

/// 伪彩色图层的可见性策略. 每次合成解析一次.
#[derive(Clone, Debug, PartialEq)]
pub enum ColorMaskPolicy {
    /// 使用专用遮罩. 给定阈值时先二值化, 否则截断到 `[0, 1]` 后作为连续权重.
    ExplicitMask {
        /// 采样得到的遮罩.
        field: ScalarField,
        /// 二值化阈值.
        threshold: Option<f32>,
    },

    /// 按阈值二值化 (已缩放的) 伪彩色数据本身.
    ThresholdOnColor(f32),

    /// 全部可见.
    AlwaysVisible,
}

impl ColorMaskPolicy {
    /// 由是否存在专用遮罩和是否给定阈值决定策略. 专用遮罩优先.
    pub fn resolve(explicit: Option<ScalarField>, threshold: Option<f32>) -> Self {
        match (explicit, threshold) {
            (Some(field), threshold) => Self::ExplicitMask { field, threshold },
            (None, Some(t)) => Self::ThresholdOnColor(t),
            (None, None) => Self::AlwaysVisible,
        }
    }

    /// 针对伪彩色数据 `color` 求可见性遮罩.
    pub fn apply(self, color: ArrayView2<f32>) -> SliceResult<ScalarField> {
        match self {
            Self::ExplicitMask { field, threshold } => {
                ensure_shape(color.shape(), field.shape())?;
                Ok(match threshold {
                    Some(t) => color::threshold(field.view(), t),
                    None => color::clip_unit(field.view()),
                })
            }
            Self::ThresholdOnColor(t) => Ok(color::threshold(color, t)),
            Self::AlwaysVisible => Ok(ScalarField::ones(color.raw_dim())),
        }
    }
}

/// 在 `geometry` 上合成一张 RGB 切片.
///
/// 1. 底图以灰度色表和显示窗口 `window` 上色.
/// 2. 若有伪彩色图层: 采样并乘以 `color_scale`, 按 [`ColorMaskPolicy`] 求遮罩,
///    以 `color_map` 和 `color_lims` 上色后遮罩. 若有透明度图层, 以
///    `scale_clip(alpha, alpha_lims)` 为权重与底图混合; 否则以伪彩色遮罩本身为权重.
/// 3. 若有整体遮罩: 采样并截断到 `[0, 1]` 后乘到混合结果上.
///
/// # 注意
///
/// 无透明度图层时, 伪彩色遮罩既决定可见性又作为混合权重.
/// 二值遮罩因此表现为硬裁剪, 连续遮罩表现为软混合.
pub fn overlay_slice(
    geometry: &SliceGeometry,
    options: &Options,
    window: Window,
    layers: &Layers<'_>,
) -> SliceResult<RgbField> {
    let sample = |volume: &Volume| {
        geometry.sample_with(volume, options.interp_order, options.boundary)
    };
    debug!(
        "合成 {:?} 切片: color = {}, alpha = {}, mask = {}",
        geometry.shape(),
        layers.color.is_some(),
        layers.alpha.is_some(),
        layers.mask.is_some()
    );

    let base = color::grayscale(sample(layers.base)?.view(), window);

    let blended = match layers.color {
        Some(color_volume) => {
            let mut color_field = sample(color_volume)?;
            color_field *= options.color_scale;

            let explicit = layers.color_mask.map(sample).transpose()?;
            let color_mask = ColorMaskPolicy::resolve(explicit, options.color_mask_thresh)
                .apply(color_field.view())?;

            let cmap = colormap::lookup(&options.color_map)?;
            let color_layer = color::colorize_with(color_field.view(), &cmap, options.color_lims);
            let color_layer = color::mask(color_layer.view(), color_mask.view())?;

            let weight = match layers.alpha {
                Some(alpha_volume) => {
                    color::scale_clip(sample(alpha_volume)?.view(), options.alpha_lims)
                }
                None => color_mask,
            };
            color::blend(base.view(), color_layer.view(), weight.view())?
        }
        None => base,
    };

    match layers.mask {
        Some(mask_volume) => {
            let mask = color::clip_unit(sample(mask_volume)?.view());
            color::mask(blended.view(), mask.view())
        }
        None => Ok(blended),
    }
}
