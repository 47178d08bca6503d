use ndarray::Array2;

use super::{axis_indices, Axis3, Orientation};
use crate::data::BoundingBox;
use crate::sample::{sample_point_with, Boundary};
use crate::{Idx2d, Point3, SliceResult, Volume};

/// 二维采样平面.
///
/// 由原点和两个平面内基向量定义: 第 `r` 行第 `c` 列的采样点为
/// `origin + c / (cols - 1) * u + r / (rows - 1) * v`.
/// 行 0 对应显示图像的 **下** 边缘.
///
/// 某个方向仅有一个采样点时, 该点取在基向量的中点.
#[derive(Clone, Debug, PartialEq)]
pub struct SliceGeometry {
    origin: Point3,
    u: Point3,
    v: Point3,
    rows: usize,
    cols: usize,
    extent: [f64; 4],
}

#[inline]
fn norm(p: Point3) -> f64 {
    (p[0] * p[0] + p[1] * p[1] + p[2] * p[2]).sqrt()
}

/// 第 `i` 个 (共 `n` 个) 采样点在 `[0, 1]` 上的位置.
#[inline]
fn unit_step(i: usize, n: usize) -> f64 {
    if n <= 1 {
        0.5
    } else {
        i as f64 / (n - 1) as f64
    }
}

impl SliceGeometry {
    /// 构建任意朝向的采样平面. `samples` 为 `(列数, 行数)`, 即沿 `u` 和沿 `v` 的采样点数.
    ///
    /// 显示范围为 `(0, |u|, 0, |v|)`. 采样点数为 0 时程序 panic.
    pub fn new(origin: Point3, u: Point3, v: Point3, (cols, rows): Idx2d) -> Self {
        assert!(cols > 0 && rows > 0, "采样点数必须为正");
        Self {
            origin,
            u,
            v,
            rows,
            cols,
            extent: [0.0, norm(u), 0.0, norm(v)],
        }
    }

    /// 在包围盒 `bbox` 内构建垂直于 `axis`, 且位于 `position` 处的轴对齐切片.
    ///
    /// 跨度较大的平面内方向使用 `samples` 个采样点, 另一方向按跨度比例缩放 (至少 1 个).
    /// 显示范围为两个平面内物理轴的上下界.
    pub fn axis_aligned(
        bbox: &BoundingBox,
        axis: Axis3,
        position: f64,
        samples: usize,
        orient: Orientation,
    ) -> Self {
        assert!(samples > 0, "采样点数必须为正");
        let (ind1, ind2) = axis_indices(axis, orient);
        let span = bbox.span();

        let mut origin = bbox.low;
        origin[axis.index()] = position;
        let mut u = [0.0; 3];
        u[ind1] = span[ind1];
        let mut v = [0.0; 3];
        v[ind2] = span[ind2];

        let longest = span[ind1].max(span[ind2]);
        let count = |s: f64| {
            if longest > 0.0 {
                ((samples as f64 * s / longest).round() as usize).max(1)
            } else {
                1
            }
        };

        Self {
            origin,
            u,
            v,
            rows: count(span[ind2]),
            cols: count(span[ind1]),
            extent: [bbox.low[ind1], bbox.high[ind1], bbox.low[ind2], bbox.high[ind2]],
        }
    }

    /// 在体数据 `volume` 的包围盒内构建轴对齐切片.
    #[inline]
    pub fn through_volume(
        volume: &Volume,
        axis: Axis3,
        position: f64,
        samples: usize,
        orient: Orientation,
    ) -> Self {
        Self::axis_aligned(&volume.bounding_box(), axis, position, samples, orient)
    }

    /// 输出网格形状 `(行数, 列数)`.
    #[inline]
    pub fn shape(&self) -> Idx2d {
        (self.rows, self.cols)
    }

    /// 显示范围 `(左, 右, 下, 上)`.
    #[inline]
    pub fn extent(&self) -> [f64; 4] {
        self.extent
    }

    /// 原点.
    #[inline]
    pub fn origin(&self) -> Point3 {
        self.origin
    }

    /// 第 `r` 行第 `c` 列的采样点物理坐标.
    #[inline]
    pub fn point(&self, (r, c): Idx2d) -> Point3 {
        let (a, b) = (unit_step(c, self.cols), unit_step(r, self.rows));
        let mut p = self.origin;
        for (axis, slot) in p.iter_mut().enumerate() {
            *slot += a * self.u[axis] + b * self.v[axis];
        }
        p
    }

    /// 所有采样点的物理坐标, 形状为 `(行数 * 列数, 3)`, 行优先.
    pub fn points(&self) -> Array2<f64> {
        let mut out = Array2::<f64>::zeros((self.rows * self.cols, 3));
        for (n, mut row) in out.outer_iter_mut().enumerate() {
            let p = self.point((n / self.cols, n % self.cols));
            for (slot, v) in row.iter_mut().zip(p) {
                *slot = v;
            }
        }
        out
    }

    /// 在该平面上以 `order` 阶插值采样 `volume`, 越界点按最近邻延拓.
    #[inline]
    pub fn sample(&self, volume: &Volume, order: u32) -> SliceResult<Array2<f32>> {
        self.sample_with(volume, order, Boundary::default())
    }

    /// 在该平面上以 `order` 阶插值采样 `volume`, 越界点按 `boundary` 处理.
    pub fn sample_with(
        &self,
        volume: &Volume,
        order: u32,
        boundary: Boundary,
    ) -> SliceResult<Array2<f32>> {
        let values = sample_point_with(volume, self.points().view(), order, boundary)?;
        // 长度恒为 rows * cols, 该操作不会生成 `Err`, 可直接 unwrap.
        Ok(values.into_shape((self.rows, self.cols)).unwrap())
    }

    /// 物理坐标 `p` 在显示图像中的像素坐标 `(x, y)`, y 轴向上.
    ///
    /// 仅对轴对齐切片有意义. `p` 为平面内两个物理坐标 (水平, 垂直).
    pub fn to_pixel(&self, (px, py): (f64, f64)) -> (f64, f64) {
        let [left, right, bottom, top] = self.extent;
        let fx = if right > left {
            (px - left) / (right - left)
        } else {
            0.5
        };
        let fy = if top > bottom {
            (py - bottom) / (top - bottom)
        } else {
            0.5
        };
        (
            fx * self.cols.saturating_sub(1) as f64,
            fy * self.rows.saturating_sub(1) as f64,
        )
    }
}
