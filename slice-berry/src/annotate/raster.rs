//! 栅格化原语: 颜色解析, 线型和线段绘制.

use std::fmt;
use std::str::FromStr;

use image::{Rgb, RgbImage};
use tiny_skia::{LineCap, Paint, PathBuilder, Pixmap, Stroke, StrokeDash, Transform};

use crate::{SliceError, SliceResult};

pub use crate::consts::rgb::{BLACK, WHITE};

/// 解析颜色.
///
/// 支持单字母简写 (`w`, `k`, `r`, `g`, `b`, `c`, `m`, `y`), 对应的英文全称,
/// 以及 `#rrggbb` 十六进制形式. 其余输入返回 [`SliceError::UnknownColor`].
pub fn parse_color(s: &str) -> SliceResult<Rgb<u8>> {
    let rgb = match s.trim() {
        "w" | "white" => [255, 255, 255],
        "k" | "black" => [0, 0, 0],
        "r" | "red" => [255, 0, 0],
        "g" | "green" => [0, 128, 0],
        "b" | "blue" => [0, 0, 255],
        "c" | "cyan" => [0, 191, 191],
        "m" | "magenta" => [191, 0, 191],
        "y" | "yellow" => [191, 191, 0],
        hex => return parse_hex(hex).ok_or_else(|| SliceError::UnknownColor(s.to_string())),
    };
    Ok(Rgb(rgb))
}

fn parse_hex(s: &str) -> Option<Rgb<u8>> {
    let digits = s.strip_prefix('#')?;
    if digits.len() != 6 || !digits.is_ascii() {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).ok();
    Some(Rgb([channel(0)?, channel(2)?, channel(4)?]))
}

/// 线型.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LineStyle {
    /// 实线.
    #[default]
    Solid,

    /// 虚线.
    Dashed,

    /// 点线.
    Dotted,

    /// 点划线.
    DashDot,
}

impl LineStyle {
    /// 以像素为单位的 "画, 空, 画, 空, ..." 长度序列. 实线为空序列.
    pub const fn pattern(self) -> &'static [f32] {
        match self {
            LineStyle::Solid => &[],
            LineStyle::Dashed => &[6.0, 4.0],
            LineStyle::Dotted => &[1.5, 3.0],
            LineStyle::DashDot => &[6.0, 3.0, 1.5, 3.0],
        }
    }

    /// 对应的虚线设置. 实线为 `None`.
    fn dash(self) -> Option<StrokeDash> {
        let pattern = self.pattern();
        if pattern.is_empty() {
            None
        } else {
            StrokeDash::new(pattern.to_vec(), 0.0)
        }
    }
}

impl FromStr for LineStyle {
    type Err = SliceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "solid" | "-" => Ok(LineStyle::Solid),
            "dashed" | "--" => Ok(LineStyle::Dashed),
            "dotted" | ":" => Ok(LineStyle::Dotted),
            "dashdot" | "-." => Ok(LineStyle::DashDot),
            other => Err(SliceError::UnknownLineStyle(other.to_string())),
        }
    }
}

impl fmt::Display for LineStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LineStyle::Solid => "solid",
            LineStyle::Dashed => "dashed",
            LineStyle::Dotted => "dotted",
            LineStyle::DashDot => "dashdot",
        };
        f.write_str(name)
    }
}

/// 栅格画布: 在 RGB 图像上以 `tiny-skia` 描线.
///
/// 坐标为图像像素坐标 `(x, y)`, y 轴向下, 整数坐标落在像素中心. 超出图像的部分被裁剪.
/// 不做抗锯齿, 线条颜色保持原样.
pub struct Canvas {
    pixmap: Option<Pixmap>,
    width: u32,
    height: u32,
}

impl Canvas {
    /// 以 `img` 为背景新建画布. 空图像得到的画布不绘制任何内容.
    pub fn new(img: &RgbImage) -> Self {
        let pixmap = Pixmap::new(img.width(), img.height()).map(|mut pm| {
            for (dst, src) in pm.data_mut().chunks_exact_mut(4).zip(img.pixels()) {
                dst[..3].copy_from_slice(&src.0);
                dst[3] = u8::MAX;
            }
            pm
        });
        Self {
            pixmap,
            width: img.width(),
            height: img.height(),
        }
    }

    /// 以 `color` 和 `style` 描出所有线段 `(起点, 终点)`. 同一次调用的线段共享线型.
    pub fn stroke<I>(&mut self, segments: I, color: Rgb<u8>, style: LineStyle)
    where
        I: IntoIterator<Item = ((f64, f64), (f64, f64))>,
    {
        let Some(pixmap) = self.pixmap.as_mut() else {
            return;
        };
        let mut pb = PathBuilder::new();
        for (from, to) in segments {
            pb.move_to(from.0 as f32 + 0.5, from.1 as f32 + 0.5);
            pb.line_to(to.0 as f32 + 0.5, to.1 as f32 + 0.5);
        }
        let Some(path) = pb.finish() else {
            return;
        };

        let mut paint = Paint::default();
        let [r, g, b] = color.0;
        paint.set_color_rgba8(r, g, b, u8::MAX);
        paint.anti_alias = false;
        let stroke = Stroke {
            width: 1.0,
            line_cap: LineCap::Square,
            dash: style.dash(),
            ..Stroke::default()
        };
        pixmap.stroke_path(&path, &paint, &stroke, Transform::identity(), None);
    }

    /// 取回绘制结果.
    pub fn into_image(self) -> RgbImage {
        let mut img = RgbImage::new(self.width, self.height);
        if let Some(pixmap) = self.pixmap {
            for (dst, src) in img.pixels_mut().zip(pixmap.data().chunks_exact(4)) {
                *dst = Rgb([src[0], src[1], src[2]]);
            }
        }
        img
    }
}

#[cfg(test)]
mod tests {
    use super::{parse_color, Canvas, LineStyle, BLACK, WHITE};
    use crate::SliceError;
    use image::{Rgb, RgbImage};

    #[test]
    fn test_parse_color() {
        assert_eq!(parse_color("w").unwrap(), WHITE);
        assert_eq!(parse_color("k").unwrap(), BLACK);
        assert_eq!(parse_color("#ff8000").unwrap(), Rgb([255, 128, 0]));
        assert!(matches!(parse_color("#ff80"), Err(SliceError::UnknownColor(_))));
        assert!(matches!(parse_color("purple"), Err(SliceError::UnknownColor(_))));
    }

    #[test]
    fn test_line_style_parse() {
        assert_eq!("--".parse::<LineStyle>().unwrap(), LineStyle::Dashed);
        assert_eq!("dashdot".parse::<LineStyle>().unwrap(), LineStyle::DashDot);
        assert_eq!(LineStyle::Dotted.to_string(), "dotted");
        assert!(matches!(
            "wavy".parse::<LineStyle>(),
            Err(SliceError::UnknownLineStyle(_))
        ));
    }

    #[test]
    fn test_solid_line_is_continuous() {
        let mut canvas = Canvas::new(&RgbImage::new(10, 10));
        canvas.stroke([((0.0, 4.0), (9.0, 4.0))], WHITE, LineStyle::Solid);
        let img = canvas.into_image();
        for x in 0..10 {
            assert_eq!(*img.get_pixel(x, 4), WHITE);
            assert_eq!(*img.get_pixel(x, 3), BLACK);
        }
    }

    #[test]
    fn test_dashed_line_has_gaps() {
        let mut canvas = Canvas::new(&RgbImage::new(40, 3));
        canvas.stroke([((0.0, 1.0), (39.0, 1.0))], WHITE, LineStyle::Dashed);
        let img = canvas.into_image();
        let lit = (0..40).filter(|x| *img.get_pixel(*x, 1) == WHITE).count();
        assert!(lit > 15 && lit < 35, "lit = {lit}");
        assert_eq!(*img.get_pixel(0, 1), WHITE);
        assert_eq!(*img.get_pixel(8, 1), BLACK);
    }

    #[test]
    fn test_line_is_clipped() {
        let mut canvas = Canvas::new(&RgbImage::new(4, 4));
        canvas.stroke([((-10.0, -10.0), (10.0, 10.0))], WHITE, LineStyle::Solid);
        assert_eq!(*canvas.into_image().get_pixel(2, 2), WHITE);
    }

    #[test]
    fn test_canvas_keeps_background() {
        let mut img = RgbImage::new(3, 3);
        img.put_pixel(0, 0, Rgb([10, 20, 30]));
        let mut canvas = Canvas::new(&img);
        canvas.stroke([((0.0, 2.0), (2.0, 2.0))], WHITE, LineStyle::Solid);
        let out = canvas.into_image();
        assert_eq!(*out.get_pixel(0, 0), Rgb([10, 20, 30]));
        assert_eq!(*out.get_pixel(1, 2), WHITE);
        assert_eq!(*out.get_pixel(1, 1), BLACK);

        // 空图像不绘制.
        let mut empty = Canvas::new(&RgbImage::new(0, 0));
        empty.stroke([((0.0, 0.0), (1.0, 1.0))], WHITE, LineStyle::Solid);
        assert_eq!(empty.into_image().dimensions(), (0, 0));
    }
}
