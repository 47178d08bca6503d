//! 图例: 一维色条 (`colorbar`) 和二维 色彩 × 透明度 色条 (`alphabar`).
//!
//! 图例是 `STEPS × STEPS` 的 RGB 场, 附带显示范围, 刻度和前景色等元数据.
//! 行 0 为下边缘, 与切片一致.

use std::str::FromStr;

use image::{Rgb, RgbImage};
use ndarray::{Array2, Array3};

use crate::annotate::raster::{self, Canvas, LineStyle};
use crate::color::{self, RgbField};
use crate::save::to_rgb_image;
use crate::{Limits, SliceResult};

/// 图例每个方向的采样数.
pub const STEPS: usize = 32;

/// 图例方向.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LegendOrient {
    /// 色彩沿水平方向变化.
    #[default]
    Horizontal,

    /// 色彩沿垂直方向变化.
    Vertical,
}

impl FromStr for LegendOrient {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "h" | "horizontal" => Ok(LegendOrient::Horizontal),
            "v" | "vertical" => Ok(LegendOrient::Vertical),
            other => Err(format!("未知的图例方向 `{other}`, 应为 h 或 v")),
        }
    }
}

/// 坐标轴刻度.
#[derive(Clone, Debug, PartialEq)]
pub struct Tick {
    /// 数据坐标.
    pub position: f64,
    /// 标签.
    pub label: String,
}

/// 透明度参考线.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RefLine {
    /// 透明度轴上的数据坐标.
    pub position: f64,
    /// 颜色.
    pub color: Rgb<u8>,
    /// 线型.
    pub style: LineStyle,
}

/// [`colorbar`] 的样式.
#[derive(Clone, Debug)]
pub struct ColorbarStyle {
    /// 黑色背景 (前景为白色). 否则前景为黑色.
    pub black_backg: bool,
    /// 是否显示两端刻度. 否则只在中点显示标签.
    pub show_ticks: bool,
    /// 刻度的小数位数.
    pub precision: usize,
    /// 方向.
    pub orient: LegendOrient,
}

impl Default for ColorbarStyle {
    fn default() -> Self {
        Self {
            black_backg: true,
            show_ticks: true,
            precision: 0,
            orient: LegendOrient::Horizontal,
        }
    }
}

/// [`alphabar`] 的样式.
#[derive(Clone, Debug)]
pub struct AlphabarStyle {
    /// 透明度参考线位置.
    pub alines: Vec<f64>,
    /// 参考线颜色, 循环使用.
    pub alines_colors: Vec<Rgb<u8>>,
    /// 参考线线型, 循环使用.
    pub alines_styles: Vec<LineStyle>,
    /// 色彩刻度的小数位数.
    pub cprecision: usize,
    /// 透明度刻度的小数位数.
    pub aprecision: usize,
    /// 黑色背景 (前景为白色). 否则前景为黑色.
    pub black_backg: bool,
    /// 方向.
    pub orient: LegendOrient,
}

impl Default for AlphabarStyle {
    fn default() -> Self {
        Self {
            alines: Vec::new(),
            alines_colors: vec![raster::BLACK],
            alines_styles: vec![LineStyle::Solid],
            cprecision: 1,
            aprecision: 0,
            black_backg: true,
            orient: LegendOrient::Horizontal,
        }
    }
}

/// 渲染好的图例.
#[derive(Clone, Debug)]
pub struct Legend {
    image: RgbField,
    extent: [f64; 4],
    x_ticks: Vec<Tick>,
    y_ticks: Vec<Tick>,
    forecolor: Rgb<u8>,
    lines: Vec<RefLine>,
    orient: LegendOrient,
}

impl Legend {
    /// 图例栅格, 形状为 `(STEPS, STEPS, 3)`.
    #[inline]
    pub fn image(&self) -> &RgbField {
        &self.image
    }

    /// 显示范围 `(左, 右, 下, 上)`, 以数据坐标表示.
    #[inline]
    pub fn extent(&self) -> [f64; 4] {
        self.extent
    }

    /// 水平轴刻度.
    #[inline]
    pub fn x_ticks(&self) -> &[Tick] {
        &self.x_ticks
    }

    /// 垂直轴刻度.
    #[inline]
    pub fn y_ticks(&self) -> &[Tick] {
        &self.y_ticks
    }

    /// 刻度, 标签和边框的颜色.
    #[inline]
    pub fn forecolor(&self) -> Rgb<u8> {
        self.forecolor
    }

    /// 透明度参考线.
    #[inline]
    pub fn lines(&self) -> &[RefLine] {
        &self.lines
    }

    /// 栅格化为 RGB 图像, 包括参考线.
    pub fn to_rgb_image(&self) -> SliceResult<RgbImage> {
        let mut canvas = Canvas::new(&to_rgb_image(self.image.view())?);
        let last = (STEPS - 1) as f64;
        let [left, right, bottom, top] = self.extent;
        for line in &self.lines {
            let segment = match self.orient {
                LegendOrient::Horizontal => {
                    let y = last - (line.position - bottom) / (top - bottom) * last;
                    ((0.0, y), (last, y))
                }
                LegendOrient::Vertical => {
                    let x = (line.position - left) / (right - left) * last;
                    ((x, 0.0), (x, last))
                }
            };
            canvas.stroke([segment], line.color, line.style);
        }
        Ok(canvas.into_image())
    }
}

/// `[low, high]` 上的 `STEPS` 个等距点.
fn linspace(low: f64, high: f64) -> Vec<f64> {
    let last = (STEPS - 1) as f64;
    (0..STEPS)
        .map(|i| low + (high - low) * i as f64 / last)
        .collect()
}

/// 沿 `orient` 方向变化的斜坡场: 水平时沿列变化, 垂直时沿行变化.
fn ramp(values: &[f64], orient: LegendOrient) -> Array2<f32> {
    Array2::from_shape_fn((STEPS, STEPS), |(r, c)| match orient {
        LegendOrient::Horizontal => values[c] as f32,
        LegendOrient::Vertical => values[r] as f32,
    })
}

#[inline]
fn forecolor(black_backg: bool) -> Rgb<u8> {
    if black_backg {
        raster::WHITE
    } else {
        raster::BLACK
    }
}

/// 两端为格式化数值, 中点为 `label` 的三个刻度.
fn ticks(limits: Limits, label: &str, precision: usize) -> Vec<Tick> {
    let (low, high) = (f64::from(limits.low()), f64::from(limits.high()));
    vec![
        Tick {
            position: low,
            label: format!("{low:.precision$}"),
        },
        Tick {
            position: (low + high) / 2.0,
            label: label.to_string(),
        },
        Tick {
            position: high,
            label: format!("{high:.precision$}"),
        },
    ]
}

/// 一维色条: `clims` 上的线性斜坡经 `cmap_name` 上色.
///
/// 显示刻度时, 刻度位于两端和中点, 标签为两端数值和 `clabel`;
/// 否则中点处只有 `clabel`.
pub fn colorbar(
    cmap_name: &str,
    clims: Limits,
    clabel: &str,
    style: &ColorbarStyle,
) -> SliceResult<Legend> {
    let (low, high) = (f64::from(clims.low()), f64::from(clims.high()));
    let cdata = ramp(&linspace(low, high), style.orient);
    let image = color::colorize(cdata.view(), cmap_name, clims)?;

    let ticks = if style.show_ticks {
        ticks(clims, clabel, style.precision)
    } else {
        vec![Tick {
            position: (low + high) / 2.0,
            label: clabel.to_string(),
        }]
    };
    let (extent, x_ticks, y_ticks) = match style.orient {
        LegendOrient::Horizontal => ([low, high, 0.0, 1.0], ticks, Vec::new()),
        LegendOrient::Vertical => ([0.0, 1.0, low, high], Vec::new(), ticks),
    };

    Ok(Legend {
        image,
        extent,
        x_ticks,
        y_ticks,
        forecolor: forecolor(style.black_backg),
        lines: Vec::new(),
        orient: style.orient,
    })
}

/// 二维色条: 色彩斜坡以 0 到 1 的透明度斜坡混合到白色背景上.
///
/// 水平方向时色彩沿水平轴, 透明度沿垂直轴; 垂直方向时相反.
/// 透明度轴的数据坐标为 `alims`, 参考线 `alines` 以该坐标给出.
pub fn alphabar(
    cmap_name: &str,
    clims: Limits,
    clabel: &str,
    alims: Limits,
    alabel: &str,
    style: &AlphabarStyle,
) -> SliceResult<Legend> {
    let (c_low, c_high) = (f64::from(clims.low()), f64::from(clims.high()));
    let (a_low, a_high) = (f64::from(alims.low()), f64::from(alims.high()));
    let alpha_orient = match style.orient {
        LegendOrient::Horizontal => LegendOrient::Vertical,
        LegendOrient::Vertical => LegendOrient::Horizontal,
    };

    let cdata = ramp(&linspace(c_low, c_high), style.orient);
    let alpha = ramp(&linspace(0.0, 1.0), alpha_orient);
    let color = color::colorize(cdata.view(), cmap_name, clims)?;
    let backg = Array3::<f32>::ones((STEPS, STEPS, 3));
    let image = color::blend(backg.view(), color.view(), alpha.view())?;

    let cticks = ticks(clims, clabel, style.cprecision);
    let aticks = ticks(alims, alabel, style.aprecision);
    let (extent, x_ticks, y_ticks) = match style.orient {
        LegendOrient::Horizontal => ([c_low, c_high, a_low, a_high], cticks, aticks),
        LegendOrient::Vertical => ([a_low, a_high, c_low, c_high], aticks, cticks),
    };

    let lines = style
        .alines
        .iter()
        .enumerate()
        .map(|(i, position)| RefLine {
            position: *position,
            color: cycle(&style.alines_colors, i).unwrap_or(raster::BLACK),
            style: cycle(&style.alines_styles, i).unwrap_or_default(),
        })
        .collect();

    Ok(Legend {
        image,
        extent,
        x_ticks,
        y_ticks,
        forecolor: forecolor(style.black_backg),
        lines,
        orient: style.orient,
    })
}

#[inline]
fn cycle<T: Copy>(items: &[T], i: usize) -> Option<T> {
    (!items.is_empty()).then(|| items[i % items.len()])
}

#[cfg(test)]
mod tests {
    use super::{
        alphabar, colorbar, AlphabarStyle, ColorbarStyle, LegendOrient, RefLine, STEPS,
    };
    use crate::annotate::raster::{BLACK, WHITE};
    use crate::annotate::LineStyle;
    use crate::color::colormap;
    use crate::Limits;

    fn close(a: [f32; 3], b: &[f32]) -> bool {
        a.iter().zip(b).all(|(x, y)| (x - y).abs() < 1e-5)
    }

    #[test]
    fn test_colorbar_horizontal() {
        let clims = Limits::new(-1.0, 1.0).unwrap();
        let bar = colorbar("RdYlBu_r", clims, "% Change", &ColorbarStyle::default()).unwrap();
        let cmap = colormap::lookup("RdYlBu_r").unwrap();
        let img = bar.image();
        assert_eq!(img.dim(), (STEPS, STEPS, 3));
        for r in [0, 17, STEPS - 1] {
            assert!(close(
                cmap.eval(0.0),
                img.slice(ndarray::s![r, 0, ..]).to_vec().as_slice()
            ));
            assert!(close(
                cmap.eval(1.0),
                img.slice(ndarray::s![r, STEPS - 1, ..]).to_vec().as_slice()
            ));
        }
        assert_eq!(bar.extent(), [-1.0, 1.0, 0.0, 1.0]);
        let labels: Vec<_> = bar.x_ticks().iter().map(|t| t.label.as_str()).collect();
        assert_eq!(labels, ["-1", "% Change", "1"]);
        assert_eq!(bar.x_ticks()[1].position, 0.0);
        assert!(bar.y_ticks().is_empty());
        assert_eq!(bar.forecolor(), WHITE);
    }

    #[test]
    fn test_colorbar_vertical_without_ticks() {
        let clims = Limits::new(0.0, 4.0).unwrap();
        let style = ColorbarStyle {
            black_backg: false,
            show_ticks: false,
            orient: LegendOrient::Vertical,
            ..ColorbarStyle::default()
        };
        let bar = colorbar("gray", clims, "T", &style).unwrap();
        let img = bar.image();
        assert_eq!(img[(0, 5, 0)], 0.0);
        assert_eq!(img[(STEPS - 1, 5, 0)], 1.0);
        assert_eq!(img[(3, 0, 1)], img[(3, STEPS - 1, 1)]);
        assert_eq!(bar.extent(), [0.0, 1.0, 0.0, 4.0]);
        assert_eq!(bar.y_ticks().len(), 1);
        assert_eq!(bar.y_ticks()[0].position, 2.0);
        assert_eq!(bar.y_ticks()[0].label, "T");
        assert_eq!(bar.forecolor(), BLACK);
    }

    #[test]
    fn test_alphabar() {
        let clims = Limits::new(-1.0, 1.0).unwrap();
        let alims = Limits::new(0.5, 1.0).unwrap();
        let style = AlphabarStyle {
            alines: vec![1.0],
            ..AlphabarStyle::default()
        };
        let bar = alphabar("RdYlBu_r", clims, "% Change", alims, "1-p", &style).unwrap();
        let img = bar.image();

        // 透明度为 0 的下边缘是白色背景.
        assert!((0..STEPS).all(|c| (0..3).all(|ch| (img[(0, c, ch)] - 1.0).abs() < 1e-6)));
        // 透明度为 1 的上边缘是色条本身.
        let cmap = colormap::lookup("RdYlBu_r").unwrap();
        assert!(close(
            cmap.eval(0.0),
            img.slice(ndarray::s![STEPS - 1, 0, ..]).to_vec().as_slice()
        ));

        assert_eq!(bar.extent(), [-1.0, 1.0, 0.5, 1.0]);
        let clabels: Vec<_> = bar.x_ticks().iter().map(|t| t.label.as_str()).collect();
        assert_eq!(clabels, ["-1.0", "% Change", "1.0"]);
        let alabels: Vec<_> = bar.y_ticks().iter().map(|t| t.label.as_str()).collect();
        assert_eq!(alabels, ["0", "1-p", "1"]);
        assert_eq!(
            bar.lines(),
            [RefLine {
                position: 1.0,
                color: BLACK,
                style: LineStyle::Solid,
            }]
        );

        // 参考线 alpha = 1.0 位于图像第 0 行.
        let raster = bar.to_rgb_image().unwrap();
        assert_eq!(*raster.get_pixel(5, 0), BLACK);
    }

    #[test]
    fn test_alphabar_vertical_swaps_axes() {
        let clims = Limits::new(0.0, 2.0).unwrap();
        let alims = Limits::new(0.0, 1.0).unwrap();
        let style = AlphabarStyle {
            orient: LegendOrient::Vertical,
            ..AlphabarStyle::default()
        };
        let bar = alphabar("gray", clims, "c", alims, "a", &style).unwrap();
        assert_eq!(bar.extent(), [0.0, 1.0, 0.0, 2.0]);
        assert_eq!(bar.x_ticks()[1].label, "a");
        assert_eq!(bar.y_ticks()[1].label, "c");
        // 左边缘透明度为 0.
        assert_eq!(bar.image()[(10, 0, 0)], 1.0);
    }

    #[test]
    fn test_unknown_colormap() {
        let clims = Limits::unit();
        assert!(colorbar("nope", clims, "", &ColorbarStyle::default()).is_err());
    }
}
