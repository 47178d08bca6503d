//! 切片工具依赖的通用组件: 共享的命令行选项和体数据加载.

use std::path::PathBuf;

use clap::builder::RangedU64ValueParser;
use clap::{ArgAction, Args, ValueEnum};
use image::imageops::FilterType;
use slice_berry::annotate::{parse_color, ContourSpec, LineStyle};
use slice_berry::compose::Options;
use slice_berry::consts::{
    DEFAULT_ALPHA_LABEL, DEFAULT_COLOR_LABEL, DEFAULT_COLOR_MAP, DEFAULT_COLOR_SCALE,
    DEFAULT_INTERP_ORDER, DEFAULT_SAMPLES,
};
use slice_berry::geometry::Orientation;
use slice_berry::sample::Boundary;
use slice_berry::{Limits, SliceError, SliceResult, Volume, Window};

pub mod loader;

const SEP: &str = "--------------------------------------------------------";

/// 简单分隔线.
#[inline]
pub fn sep() {
    println!("{SEP}");
}

/// 显示 (放大) 时的插值方式.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, ValueEnum)]
pub enum DisplayInterp {
    /// 不插值.
    None,
    /// 最近邻.
    Nearest,
    /// 双线性.
    Bilinear,
    /// 双三次.
    Bicubic,
    /// 汉宁窗.
    #[default]
    Hanning,
    /// 汉明窗.
    Hamming,
    /// 高斯.
    Gaussian,
    /// Lanczos.
    Lanczos,
}

impl DisplayInterp {
    /// 对应的 `image` 缩放滤波器. 窗函数类的插值以高斯滤波近似.
    pub fn filter(self) -> FilterType {
        match self {
            DisplayInterp::None | DisplayInterp::Nearest => FilterType::Nearest,
            DisplayInterp::Bilinear => FilterType::Triangle,
            DisplayInterp::Bicubic => FilterType::CatmullRom,
            DisplayInterp::Hanning | DisplayInterp::Hamming | DisplayInterp::Gaussian => {
                FilterType::Gaussian
            }
            DisplayInterp::Lanczos => FilterType::Lanczos3,
        }
    }
}

/// 切片工具共享的命令行选项.
#[derive(Args, Clone, Debug)]
pub struct CommonOptions {
    /// 结构像底图.
    pub base_image: PathBuf,

    /// 整体遮罩.
    #[arg(long)]
    pub mask: Option<PathBuf>,

    /// 伪彩色图层.
    #[arg(long)]
    pub color: Option<PathBuf>,

    /// 伪彩色映射区间.
    #[arg(long, alias = "color_lims", num_args = 2, action = ArgAction::Set,
          allow_negative_numbers = true, default_values_t = [-1.0, 1.0])]
    pub color_lims: Vec<f32>,

    /// 伪彩色图层的专用遮罩.
    #[arg(long, alias = "color_mask")]
    pub color_mask: Option<PathBuf>,

    /// 伪彩色遮罩阈值.
    #[arg(long, alias = "color_mask_thresh", allow_negative_numbers = true)]
    pub color_mask_thresh: Option<f32>,

    /// 伪彩色图层缩放系数.
    #[arg(long, alias = "color_scale", allow_negative_numbers = true,
          default_value_t = DEFAULT_COLOR_SCALE)]
    pub color_scale: f32,

    /// 伪彩色色表, 名称加 `_r` 后缀为反向色表.
    #[arg(long, alias = "color_map", default_value = DEFAULT_COLOR_MAP)]
    pub color_map: String,

    /// 伪彩色轴标签.
    #[arg(long, alias = "color_label", default_value = DEFAULT_COLOR_LABEL)]
    pub color_label: String,

    /// 透明度图层.
    #[arg(long)]
    pub alpha: Option<PathBuf>,

    /// 透明度映射区间.
    #[arg(long, alias = "alpha_lims", num_args = 2, action = ArgAction::Set,
          allow_negative_numbers = true, default_values_t = [0.5, 1.0])]
    pub alpha_lims: Vec<f32>,

    /// 透明度轴标签.
    #[arg(long, alias = "alpha_label", default_value = DEFAULT_ALPHA_LABEL)]
    pub alpha_label: String,

    /// 提取等值线的图像. 缺省时使用透明度图层.
    #[arg(long, alias = "contour_img")]
    pub contour_img: Option<PathBuf>,

    /// 等值线水平, 可重复.
    #[arg(long, action = ArgAction::Append, allow_negative_numbers = true)]
    pub contour: Vec<f32>,

    /// 等值线颜色, 可重复.
    #[arg(long, alias = "contour_color", action = ArgAction::Append)]
    pub contour_color: Vec<String>,

    /// 等值线线型, 可重复.
    #[arg(long, alias = "contour_style", action = ArgAction::Append)]
    pub contour_style: Vec<String>,

    /// 底图显示窗口 (百分位数).
    #[arg(long, num_args = 2, action = ArgAction::Set, default_values_t = [1.0, 99.0])]
    pub window: Vec<f32>,

    /// 较长平面内方向的采样点数.
    #[arg(long, default_value_t = DEFAULT_SAMPLES, value_parser = at_least_one())]
    pub samples: usize,

    /// 显示插值方式.
    #[arg(long, value_enum, default_value_t = DisplayInterp::Hanning)]
    pub interp: DisplayInterp,

    /// 数据插值阶数 (0 ~ 3).
    #[arg(long, alias = "interp_order", default_value_t = DEFAULT_INTERP_ORDER)]
    pub interp_order: u32,

    /// 方向约定: clin 或 preclin.
    #[arg(long, default_value = "clin")]
    pub orient: Orientation,
}

/// 取值不小于 1 的计数参数.
pub fn at_least_one() -> RangedU64ValueParser<usize> {
    RangedU64ValueParser::new().range(1..)
}

/// 将两个数值解释为上下限.
fn limits(values: &[f32]) -> SliceResult<Limits> {
    match values {
        [low, high] => Limits::new(*low, *high),
        _ => Err(SliceError::InvalidLimits {
            low: f32::NAN,
            high: f32::NAN,
        }),
    }
}

impl CommonOptions {
    /// 合成参数.
    pub fn to_options(&self) -> SliceResult<Options> {
        Ok(Options {
            interp_order: self.interp_order,
            color_map: self.color_map.clone(),
            color_lims: limits(&self.color_lims)?,
            color_scale: self.color_scale,
            color_mask_thresh: self.color_mask_thresh,
            alpha_lims: limits(&self.alpha_lims)?,
            boundary: Boundary::default(),
        })
    }

    /// 伪彩色映射区间.
    #[inline]
    pub fn color_limits(&self) -> SliceResult<Limits> {
        limits(&self.color_lims)
    }

    /// 透明度映射区间.
    #[inline]
    pub fn alpha_limits(&self) -> SliceResult<Limits> {
        limits(&self.alpha_lims)
    }

    /// 按 `--window` 百分位数求底图显示窗口.
    pub fn window_for(&self, base: &Volume) -> SliceResult<Window> {
        match self.window.as_slice() {
            [low, high] => Limits::from_percentiles(base.data().iter(), (*low, *high)),
            _ => Err(SliceError::InvalidLimits {
                low: f32::NAN,
                high: f32::NAN,
            }),
        }
    }

    /// 是否需要绘制等值线: 给定了等值线水平或等值线图像.
    #[inline]
    pub fn wants_contours(&self) -> bool {
        !self.contour.is_empty() || self.contour_img.is_some()
    }

    /// 在 `volume` 上按 `--contour*` 选项构建等值线设置.
    pub fn contour_spec<'a>(&self, volume: &'a Volume) -> SliceResult<ContourSpec<'a>> {
        let mut spec = ContourSpec::new(volume);
        if !self.contour.is_empty() {
            spec.levels = self.contour.clone();
        }
        if !self.contour_color.is_empty() {
            spec.colors = self
                .contour_color
                .iter()
                .map(|c| parse_color(c))
                .collect::<SliceResult<_>>()?;
        }
        if !self.contour_style.is_empty() {
            spec.styles = self
                .contour_style
                .iter()
                .map(|s| s.parse::<LineStyle>())
                .collect::<SliceResult<_>>()?;
        }
        Ok(spec)
    }
}
