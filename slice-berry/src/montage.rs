//! 多切片合成与拼图.

use ndarray::{s, Array3};

use crate::color::RgbField;
use crate::compose::{overlay_slice, Layers, Options};
use crate::geometry::{Axis3, Orientation, SliceGeometry};
use crate::{SliceResult, Volume, Window};

cfg_if::cfg_if! {
    if #[cfg(feature = "rayon")] {
        use rayon::iter::{IntoParallelRefIterator, ParallelIterator};
    }
}

/// 沿 `axis` 在 `volume` 包围盒内等距排列的 `count` 个切片位置, 不含两端.
pub fn positions(volume: &Volume, axis: Axis3, count: usize) -> Vec<f64> {
    let bbox = volume.bounding_box();
    let (low, high) = (bbox.low[axis.index()], bbox.high[axis.index()]);
    (1..=count)
        .map(|i| low + (high - low) * i as f64 / (count + 1) as f64)
        .collect()
}

/// 沿 `axis` 在 `positions` 处的一组轴对齐切片几何.
pub fn geometries(
    volume: &Volume,
    axis: Axis3,
    positions: &[f64],
    samples: usize,
    orient: Orientation,
) -> Vec<SliceGeometry> {
    let bbox = volume.bounding_box();
    positions
        .iter()
        .map(|p| SliceGeometry::axis_aligned(&bbox, axis, *p, samples, orient))
        .collect()
}

/// 依次合成每个 `geometries`. 输出顺序与输入一致.
pub fn overlay_slices(
    geometries: &[SliceGeometry],
    options: &Options,
    window: Window,
    layers: &Layers<'_>,
) -> SliceResult<Vec<RgbField>> {
    geometries
        .iter()
        .map(|g| overlay_slice(g, options, window, layers))
        .collect()
}

/// 借助 `rayon`, 并行地合成每个 `geometries`. 输出顺序与输入一致.
#[cfg(feature = "rayon")]
pub fn par_overlay_slices(
    geometries: &[SliceGeometry],
    options: &Options,
    window: Window,
    layers: &Layers<'_>,
) -> SliceResult<Vec<RgbField>> {
    geometries
        .par_iter()
        .map(|g| overlay_slice(g, options, window, layers))
        .collect()
}

/// 将 `images` 按行优先拼接为 `cols` 列的网格. 每格大小取所有图像的最大值, 空白处为黑色.
///
/// 与切片一致, 输出的行 0 为下边缘, 因此第一张图像位于左上角.
///
/// # 注意
///
/// `cols` 为 0 时程序 panic.
pub fn tile(images: &[RgbField], cols: usize) -> RgbField {
    assert!(cols > 0, "列数必须为正");
    let cell_h = images.iter().map(|m| m.dim().0).max().unwrap_or(0);
    let cell_w = images.iter().map(|m| m.dim().1).max().unwrap_or(0);
    let cols = cols.min(images.len().max(1));
    let rows = (images.len() + cols - 1) / cols;

    let mut out = Array3::<f32>::zeros((rows * cell_h, cols * cell_w, 3));
    for (n, img) in images.iter().enumerate() {
        let (h, w, _) = img.dim();
        let (grid_r, grid_c) = (n / cols, n % cols);
        // 第 0 行网格在上方, 即输出的高行号处.
        let top = (rows - grid_r) * cell_h;
        let left = grid_c * cell_w;
        out.slice_mut(s![top - h..top, left..left + w, ..])
            .assign(img);
    }
    out
}
