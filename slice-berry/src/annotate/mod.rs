//! 切片标注: 等值线, 十字准线和栅格化输出.

pub mod contour;
pub mod raster;

pub use contour::Segment;
pub use raster::{parse_color, Canvas, LineStyle};

use image::{Rgb, RgbImage};
use log::debug;

use crate::compose::{overlay_slice, Layers, Options};
use crate::geometry::{axis_indices, Axis3, Orientation, SliceGeometry};
use crate::save::to_rgb_image;
use crate::{Point3, SliceResult, Volume, Window};

/// 默认等值线水平.
pub const DEFAULT_CONTOUR_LEVEL: f32 = 0.95;

/// 等值线设置. 颜色和线型按水平循环使用.
#[derive(Clone, Debug)]
pub struct ContourSpec<'a> {
    /// 提取等值线的体数据, 总是以一阶插值采样.
    pub volume: &'a Volume,

    /// 等值线水平. 第一个水平决定是否绘制任何等值线.
    pub levels: Vec<f32>,

    /// 颜色.
    pub colors: Vec<Rgb<u8>>,

    /// 线型.
    pub styles: Vec<LineStyle>,
}

impl<'a> ContourSpec<'a> {
    /// 在 [`DEFAULT_CONTOUR_LEVEL`] 处以白色实线绘制等值线.
    pub fn new(volume: &'a Volume) -> Self {
        Self {
            volume,
            levels: vec![DEFAULT_CONTOUR_LEVEL],
            colors: vec![raster::WHITE],
            styles: vec![LineStyle::Solid],
        }
    }

    fn color(&self, i: usize) -> Rgb<u8> {
        if self.colors.is_empty() {
            raster::WHITE
        } else {
            self.colors[i % self.colors.len()]
        }
    }

    fn style(&self, i: usize) -> LineStyle {
        if self.styles.is_empty() {
            LineStyle::Solid
        } else {
            self.styles[i % self.styles.len()]
        }
    }
}

/// 单个水平的等值线.
#[derive(Clone, Debug)]
pub struct ContourLine {
    /// 水平.
    pub level: f32,
    /// 颜色.
    pub color: Rgb<u8>,
    /// 线型.
    pub style: LineStyle,
    /// 网格坐标系中的线段.
    pub segments: Vec<Segment>,
}

/// 十字准线在切片平面上的物理位置.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Crosshair {
    /// 竖线的水平物理坐标.
    pub x: f64,
    /// 横线的垂直物理坐标.
    pub y: f64,
}

/// 求物理点 `point` 在垂直于 `axis` 的切片上对应的十字准线位置.
#[inline]
pub fn crosshairs(point: Point3, axis: Axis3, orient: Orientation) -> Crosshair {
    let (ind1, ind2) = axis_indices(axis, orient);
    Crosshair {
        x: point[ind1],
        y: point[ind2],
    }
}

/// 合成并标注后的切片.
#[derive(Clone, Debug)]
pub struct RenderedSlice {
    image: crate::color::RgbField,
    geometry: SliceGeometry,
    contours: Vec<ContourLine>,
}

impl RenderedSlice {
    /// 合成图像, 行 0 为下边缘.
    #[inline]
    pub fn image(&self) -> &crate::color::RgbField {
        &self.image
    }

    /// 显示范围 `(左, 右, 下, 上)`.
    #[inline]
    pub fn extent(&self) -> [f64; 4] {
        self.geometry.extent()
    }

    /// 切片几何.
    #[inline]
    pub fn geometry(&self) -> &SliceGeometry {
        &self.geometry
    }

    /// 所有等值线. 等值线被跳过时为空.
    #[inline]
    pub fn contours(&self) -> &[ContourLine] {
        &self.contours
    }

    /// 栅格化为 RGB 图像: 合成图像, 等值线, 以及可选的十字准线.
    ///
    /// 输出图像的上边缘对应切片的上边缘.
    pub fn to_rgb_image(&self, crosshair: Option<(Crosshair, Rgb<u8>)>) -> SliceResult<RgbImage> {
        let img = to_rgb_image(self.image.view())?;
        let flip = self.image.dim().0.saturating_sub(1) as f64;
        let mut canvas = Canvas::new(&img);

        for line in &self.contours {
            let segments = line.segments.iter().map(|s| {
                (
                    (f64::from(s.start.0), flip - f64::from(s.start.1)),
                    (f64::from(s.end.0), flip - f64::from(s.end.1)),
                )
            });
            canvas.stroke(segments, line.color, line.style);
        }

        if let Some((cross, color)) = crosshair {
            let (px, py) = self.geometry.to_pixel((cross.x, cross.y));
            let (w, h) = (f64::from(img.width()), f64::from(img.height()));
            let lines = [
                ((px, 0.0), (px, h - 1.0)),
                ((0.0, flip - py), (w - 1.0, flip - py)),
            ];
            canvas.stroke(lines, color, LineStyle::Solid);
        }
        Ok(canvas.into_image())
    }
}

/// 合成一张切片, 并按 `contour` 提取等值线.
///
/// 等值线数据以一阶插值采样. 若采样结果并非同时存在严格小于和严格大于第一个水平的值,
/// 则不绘制任何等值线.
pub fn draw_slice(
    geometry: &SliceGeometry,
    options: &Options,
    window: Window,
    layers: &Layers<'_>,
    contour: Option<&ContourSpec<'_>>,
) -> SliceResult<RenderedSlice> {
    let image = overlay_slice(geometry, options, window, layers)?;

    let mut contours = Vec::new();
    if let Some(spec) = contour {
        let field = geometry.sample_with(spec.volume, 1, options.boundary)?;
        match spec.levels.first() {
            Some(first) if contour::straddles(field.view(), *first) => {
                for (i, level) in spec.levels.iter().enumerate() {
                    contours.push(ContourLine {
                        level: *level,
                        color: spec.color(i),
                        style: spec.style(i),
                        segments: contour::march_squares(field.view(), *level),
                    });
                }
            }
            _ => debug!("等值线数据未跨越首个水平, 跳过等值线"),
        }
    }

    Ok(RenderedSlice {
        image,
        geometry: geometry.clone(),
        contours,
    })
}
