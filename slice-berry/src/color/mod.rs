//! 上色, 遮罩与混合.
//!
//! 所有函数都是纯函数: 输入为只读视图, 输出为新分配的场.

pub mod colormap;
mod palettes;

pub use colormap::Colormap;

use ndarray::{Array2, Array3, ArrayView2, ArrayView3, Axis, Zip};

use crate::{ensure_shape, Limits, SliceResult};

/// 二维标量场, 形状为 `(行数, 列数)`.
pub type ScalarField = Array2<f32>;

/// 二维 RGB 场, 形状为 `(行数, 列数, 3)`, 通道取值于 `[0, 1]`.
pub type RgbField = Array3<f32>;

/// 无意义值 (NaN, inf) 的颜色.
pub const BAD_COLOR: [f32; 3] = [0.0; 3];

/// 将 `field` 按 `limits` 线性归一化到 `[0, 1]` 后, 经名为 `colormap_name` 的色表映射为 RGB.
///
/// 色表名称未知时返回 [`crate::SliceError::UnknownColormap`].
pub fn colorize(
    field: ArrayView2<f32>,
    colormap_name: &str,
    limits: Limits,
) -> SliceResult<RgbField> {
    let cmap = colormap::lookup(colormap_name)?;
    Ok(colorize_with(field, &cmap, limits))
}

/// 同 [`colorize`], 但直接使用已解析的色表.
pub fn colorize_with(field: ArrayView2<f32>, cmap: &Colormap, limits: Limits) -> RgbField {
    let (h, w) = field.dim();
    let mut out = RgbField::zeros((h, w, 3));
    Zip::from(out.lanes_mut(Axis(2)))
        .and(&field)
        .for_each(|mut px, &v| {
            let rgb = limits.normalize(v).map_or(BAD_COLOR, |t| cmap.eval(t));
            for (slot, c) in px.iter_mut().zip(rgb) {
                *slot = c;
            }
        });
    out
}

/// 用灰度色表和显示窗口上色.
#[inline]
pub fn grayscale(field: ArrayView2<f32>, window: Limits) -> RgbField {
    // 内置色表, 总是存在.
    let gray = colormap::lookup("gray").expect("内置灰度色表缺失");
    colorize_with(field, &gray, window)
}

/// 用 `mask` 遮罩 `rgb`: 每个像素的三个通道乘以对应的遮罩值.
///
/// 遮罩值为 1 处保持不变, 为 0 处变为黑色背景, 连续值按比例衰减.
/// 两者平面形状不一致时返回 [`crate::SliceError::ShapeMismatch`].
pub fn mask(rgb: ArrayView3<f32>, mask: ArrayView2<f32>) -> SliceResult<RgbField> {
    ensure_shape(&rgb.shape()[..2], mask.shape())?;
    let mut out = rgb.to_owned();
    Zip::from(out.lanes_mut(Axis(2)))
        .and(&mask)
        .for_each(|mut px, &m| px *= m);
    Ok(out)
}

/// 将 `field` 按 `limits` 线性映射到 `[0, 1]` 并截断. 无意义值映射为 0.
///
/// `x <= low` 处恒为 0, `x >= high` 处恒为 1, 其间单调不减.
pub fn scale_clip(field: ArrayView2<f32>, limits: Limits) -> ScalarField {
    field.mapv(|v| limits.normalize(v).unwrap_or(0.0))
}

/// 将遮罩或权重场截断到 `[0, 1]`. 无意义值映射为 0.
///
/// 高阶插值在阶跃边缘会过冲, `0 / 255` 编码的遮罩也可能直接越界.
#[inline]
pub fn clip_unit(field: ArrayView2<f32>) -> ScalarField {
    scale_clip(field, Limits::unit())
}

/// 按 `alpha` 逐像素凸组合: `base * (1 - alpha) + overlay * alpha`.
///
/// `alpha` 在三个通道间广播. 任意两者形状不一致时返回
/// [`crate::SliceError::ShapeMismatch`].
pub fn blend(
    base: ArrayView3<f32>,
    overlay: ArrayView3<f32>,
    alpha: ArrayView2<f32>,
) -> SliceResult<RgbField> {
    ensure_shape(base.shape(), overlay.shape())?;
    ensure_shape(&base.shape()[..2], alpha.shape())?;
    let mut out = base.to_owned();
    Zip::from(out.lanes_mut(Axis(2)))
        .and(overlay.lanes(Axis(2)))
        .and(&alpha)
        .for_each(|mut px, over, &a| {
            px.zip_mut_with(&over, |b, o| *b = *b * (1.0 - a) + *o * a);
        });
    Ok(out)
}

/// 将浮点场二值化: 严格大于 `threshold` 处为 1, 其余为 0.
#[inline]
pub fn threshold(field: ArrayView2<f32>, threshold: f32) -> ScalarField {
    field.mapv(|v| if v > threshold { 1.0 } else { 0.0 })
}

#[cfg(test)]
mod tests {
    use super::{blend, clip_unit, colorize, grayscale, mask, scale_clip, threshold};
    use crate::{Limits, SliceError};
    use ndarray::{arr2, Array2, Array3};

    fn rgb_field() -> Array3<f32> {
        Array3::from_shape_fn((3, 4, 3), |(r, c, ch)| (r * 12 + c * 3 + ch) as f32 / 36.0)
    }

    #[test]
    fn test_colorize_unit_limits_is_palette() {
        let field = arr2(&[[0.0, 0.25], [0.5, 1.0]]);
        let out = colorize(field.view(), "gray", Limits::unit()).unwrap();
        for ((r, c), v) in field.indexed_iter() {
            for ch in 0..3 {
                assert_eq!(out[(r, c, ch)], *v);
            }
        }

        let hot = colorize(field.view(), "hot_r", Limits::unit()).unwrap();
        let cmap = crate::color::colormap::lookup("hot_r").unwrap();
        assert_eq!(hot[(1, 0, 0)], cmap.eval(0.5)[0]);
    }

    #[test]
    fn test_colorize_clips_and_handles_nan() {
        let field = arr2(&[[-10.0, 10.0, f32::NAN]]);
        let out = grayscale(field.view(), Limits::new(-1.0, 1.0).unwrap());
        assert_eq!(out[(0, 0, 0)], 0.0);
        assert_eq!(out[(0, 1, 1)], 1.0);
        assert_eq!(out[(0, 2, 2)], 0.0);

        assert!(matches!(
            colorize(field.view(), "nope", Limits::unit()),
            Err(SliceError::UnknownColormap(_))
        ));
    }

    #[test]
    fn test_mask_identity_and_background() {
        let rgb = rgb_field();
        let ones = Array2::<f32>::ones((3, 4));
        assert_eq!(mask(rgb.view(), ones.view()).unwrap(), rgb);

        let zeros = Array2::<f32>::zeros((3, 4));
        let out = mask(rgb.view(), zeros.view()).unwrap();
        assert!(out.iter().all(|v| *v == 0.0));

        let wrong = Array2::<f32>::ones((4, 3));
        assert!(matches!(
            mask(rgb.view(), wrong.view()),
            Err(SliceError::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn test_scale_clip() {
        let lim = Limits::new(0.5, 1.0).unwrap();
        let field = arr2(&[[-1.0, 0.5, 0.6, 0.75, 0.9, 1.0, 3.0]]);
        let out = scale_clip(field.view(), lim);
        assert_eq!(out[(0, 0)], 0.0);
        assert_eq!(out[(0, 1)], 0.0);
        assert_eq!(out[(0, 5)], 1.0);
        assert_eq!(out[(0, 6)], 1.0);
        assert!(out.row(0).windows(2).into_iter().all(|w| w[0] <= w[1]));
        assert!((out[(0, 3)] - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_clip_unit() {
        let field = arr2(&[[-0.1, 0.0, 0.3, 1.0, 1.1, 255.0, f32::NAN]]);
        assert_eq!(
            clip_unit(field.view()),
            arr2(&[[0.0, 0.0, 0.3, 1.0, 1.0, 1.0, 0.0]])
        );
    }

    #[test]
    fn test_blend_extremes() {
        let a = rgb_field();
        let b = a.mapv(|v| 1.0 - v);
        let zeros = Array2::<f32>::zeros((3, 4));
        let ones = Array2::<f32>::ones((3, 4));
        assert_eq!(blend(a.view(), b.view(), zeros.view()).unwrap(), a);
        assert_eq!(blend(a.view(), b.view(), ones.view()).unwrap(), b);

        let half = Array2::<f32>::from_elem((3, 4), 0.5);
        let ab = blend(a.view(), b.view(), half.view()).unwrap();
        let ba = blend(b.view(), a.view(), half.view()).unwrap();
        assert!(ab.iter().zip(ba.iter()).all(|(x, y)| (x - y).abs() < 1e-6));
        assert!(ab.iter().all(|v| (v - 0.5).abs() < 1e-6));
    }

    #[test]
    fn test_threshold_is_strict() {
        let field = arr2(&[[0.4, 0.5, 0.6]]);
        assert_eq!(threshold(field.view(), 0.5), arr2(&[[0.0, 0.0, 1.0]]));
    }
}
