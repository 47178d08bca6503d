//! 图像的持久化存储.

use std::path::Path;

use image::{Rgb, RgbImage};
use ndarray::{ArrayBase, ArrayView3, Data, Ix3};

use crate::annotate::RenderedSlice;
use crate::legend::Legend;
use crate::{ensure_shape, SliceResult};

/// 表明一个可以通过 **可视化友好** 模式持久化存储的图像对象.
///
/// 图像以显示约定保存: 场的行 0 (下边缘) 落在输出图像的最后一行.
/// 输出格式由 `path` 的扩展名决定, 通常为 png.
pub trait ImgWriteVis {
    /// 将图片保存到 `path` 路径.
    fn save<P: AsRef<Path>>(&self, path: P) -> SliceResult<()>;
}

/// 将 `[0, 1]` 通道值转换为 8-bit. 无意义值为 0.
#[inline]
pub(crate) fn channel_u8(v: f32) -> u8 {
    // 255, not 256.
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}

/// 将 RGB 场转换为 8-bit 图像, 同时翻转行序.
///
/// `field` 的形状必须为 `(行数, 列数, 3)`, 否则返回 [`crate::SliceError::ShapeMismatch`].
pub fn to_rgb_image(field: ArrayView3<f32>) -> SliceResult<RgbImage> {
    let (height, width, _) = field.dim();
    ensure_shape(&[height, width, 3], field.shape())?;
    let mut buf = RgbImage::new(width as u32, height as u32);
    for h in 0..height {
        for w in 0..width {
            let px = |ch: usize| channel_u8(field[(h, w, ch)]);
            buf.put_pixel(w as u32, (height - 1 - h) as u32, Rgb([px(0), px(1), px(2)]));
        }
    }
    Ok(buf)
}

/// RGB 场.
impl<S: Data<Elem = f32>> ImgWriteVis for ArrayBase<S, Ix3> {
    fn save<P: AsRef<Path>>(&self, path: P) -> SliceResult<()> {
        to_rgb_image(self.view())?.save(path)?;
        Ok(())
    }
}

/// 包括等值线, 不包括十字准线.
impl ImgWriteVis for RenderedSlice {
    fn save<P: AsRef<Path>>(&self, path: P) -> SliceResult<()> {
        self.to_rgb_image(None)?.save(path)?;
        Ok(())
    }
}

/// 包括参考线.
impl ImgWriteVis for Legend {
    fn save<P: AsRef<Path>>(&self, path: P) -> SliceResult<()> {
        self.to_rgb_image()?.save(path)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{channel_u8, to_rgb_image, ImgWriteVis};
    use crate::SliceError;
    use image::Rgb;
    use ndarray::Array3;

    #[test]
    fn test_channel_u8() {
        assert_eq!(channel_u8(0.0), 0);
        assert_eq!(channel_u8(1.0), 255);
        assert_eq!(channel_u8(2.0), 255);
        assert_eq!(channel_u8(-1.0), 0);
        assert_eq!(channel_u8(f32::NAN), 0);
    }

    #[test]
    fn test_rows_are_flipped() {
        let mut field = Array3::<f32>::zeros((2, 3, 3));
        field[(0, 2, 0)] = 1.0;
        let img = to_rgb_image(field.view()).unwrap();
        assert_eq!((img.width(), img.height()), (3, 2));
        assert_eq!(*img.get_pixel(2, 1), Rgb([255, 0, 0]));
        assert_eq!(*img.get_pixel(2, 0), Rgb([0, 0, 0]));

        let gray = Array3::<f32>::zeros((2, 3, 1));
        assert!(matches!(
            to_rgb_image(gray.view()),
            Err(SliceError::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn test_save_png() {
        let field = Array3::<f32>::from_elem((4, 5, 3), 0.5);
        let path = std::env::temp_dir().join("slice-berry-save-test.png");
        field.save(&path).unwrap();
        let back = image::open(&path).unwrap().to_rgb8();
        assert_eq!(back.dimensions(), (5, 4));
        assert_eq!(*back.get_pixel(0, 0), Rgb([128, 128, 128]));
        std::fs::remove_file(path).unwrap();
    }
}
