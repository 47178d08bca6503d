use std::ops::Index;
use std::path::Path;

use ndarray::{Array3, ArrayView, ArrayView3, Axis, Ix3};
use once_cell::sync::OnceCell;
use ordered_float::OrderedFloat;

use crate::sample::spline;
use crate::{Idx3d, Point3, SliceResult};

pub mod affine;
mod nii;
pub mod window;

pub use affine::Affine;
pub use window::{Limits, Window};

/// 三维体数据: 标量体素数组和体素索引到物理空间的仿射变换.
///
/// 数据按 `[i, j, k]` 体素顺序存储, 与仿射变换的输入顺序一致.
/// 体数据加载后只读, 采样和合成都不会修改它.
#[derive(Debug, Clone)]
pub struct Volume {
    data: Array3<f32>,
    affine: Affine,
    /// 二阶和三阶 B 样条系数, 首次高阶采样时计算.
    coefficients: [OnceCell<Array3<f64>>; 2],
}

impl Index<Idx3d> for Volume {
    type Output = f32;

    #[inline]
    fn index(&self, index: Idx3d) -> &Self::Output {
        &self.data[index]
    }
}

impl Volume {
    /// 由内存中的数据和仿射变换直接创建体数据.
    #[inline]
    pub fn new(data: Array3<f32>, affine: Affine) -> Self {
        Self {
            data,
            affine,
            coefficients: Default::default(),
        }
    }

    /// 打开 nii 文件格式的体数据. `path` 为 nii (或 nii.gz) 文件的本地路径.
    ///
    /// 仿射变换优先取 sform, 其次 qform, 最后退化为 pixdim 缩放.
    /// 四维数据仅保留第一帧.
    pub fn open<P: AsRef<Path>>(path: P) -> SliceResult<Self> {
        nii::read_volume(path.as_ref())
    }

    /// 获取数据形状 `(i, j, k)`.
    #[inline]
    pub fn shape(&self) -> Idx3d {
        self.data.dim()
    }

    /// 获取数据体素个数.
    #[inline]
    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// 检查索引是否合法.
    #[inline]
    pub fn check(&self, (i0, j0, k0): &Idx3d) -> bool {
        let (i, j, k) = self.shape();
        *i0 < i && *j0 < j && *k0 < k
    }

    /// `order` (2 或 3) 阶 B 样条插值系数. 同一体数据只预滤波一次, 之后的采样复用结果.
    pub(crate) fn spline_coefficients(&self, order: u32) -> ArrayView3<f64> {
        debug_assert!((2..=3).contains(&order));
        self.coefficients[(order - 2) as usize]
            .get_or_init(|| spline::prefilter(self.data.view(), order))
            .view()
    }

    /// 体素到物理空间的仿射变换.
    #[inline]
    pub fn affine(&self) -> &Affine {
        &self.affine
    }

    /// 获取单个体素在三个体素轴方向上的物理尺寸.
    #[inline]
    pub fn pix_dim(&self) -> Point3 {
        self.affine.voxel_size()
    }

    /// 获取体素的实际体积值.
    #[inline]
    pub fn voxel(&self) -> f64 {
        self.pix_dim().iter().product()
    }

    /// 获得数据的一份不可变 shallow copy.
    #[inline]
    pub fn data(&self) -> ArrayView<'_, f32, Ix3> {
        self.data.view()
    }

    /// 体素索引 `idx` (可为小数) 对应的物理坐标.
    #[inline]
    pub fn to_physical(&self, idx: Point3) -> Point3 {
        self.affine.apply(idx)
    }

    /// 包含所有体素中心的物理空间轴对齐包围盒.
    pub fn bounding_box(&self) -> BoundingBox {
        let (i, j, k) = self.shape();
        let hi = [
            i.saturating_sub(1) as f64,
            j.saturating_sub(1) as f64,
            k.saturating_sub(1) as f64,
        ];
        let mut bbox = BoundingBox {
            low: [f64::INFINITY; 3],
            high: [f64::NEG_INFINITY; 3],
        };
        for corner in 0..8u8 {
            let idx = [
                if corner & 1 == 0 { 0.0 } else { hi[0] },
                if corner & 2 == 0 { 0.0 } else { hi[1] },
                if corner & 4 == 0 { 0.0 } else { hi[2] },
            ];
            bbox.extend(self.to_physical(idx));
        }
        bbox
    }

    /// 峰值强度位置的物理坐标.
    ///
    /// 对每个轴独立地求: 沿其余两轴求和后, 总强度最大的索引 (并列时取最小索引).
    /// 然后将该索引三元组经仿射变换映射到物理空间.
    ///
    /// # 注意
    ///
    /// 这是逐轴边缘分布的最大值, 并非真正的质心.
    pub fn center_of_mass(&self) -> Point3 {
        let mut idx = [0.0; 3];
        for (axis, slot) in idx.iter_mut().enumerate() {
            *slot = self.marginal_argmax(axis) as f64;
        }
        self.to_physical(idx)
    }

    /// 沿 `axis` 的边缘强度最大处的索引.
    fn marginal_argmax(&self, axis: usize) -> usize {
        let marginal: Vec<f64> = self
            .data
            .axis_iter(Axis(axis))
            .map(|plane| plane.iter().map(|v| f64::from(*v)).sum())
            .collect();
        // `max_by_key` 在并列时返回最后一个, 逆序迭代使其返回第一个.
        marginal
            .iter()
            .enumerate()
            .rev()
            .max_by_key(|(_, v)| OrderedFloat(**v))
            .map_or(0, |(i, _)| i)
    }
}

/// 物理空间中的轴对齐包围盒.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct BoundingBox {
    /// 各轴最小坐标.
    pub low: Point3,

    /// 各轴最大坐标.
    pub high: Point3,
}

impl BoundingBox {
    /// 扩展包围盒使其包含 `p`.
    #[inline]
    pub fn extend(&mut self, p: Point3) {
        for axis in 0..3 {
            self.low[axis] = self.low[axis].min(p[axis]);
            self.high[axis] = self.high[axis].max(p[axis]);
        }
    }

    /// 包围盒中心.
    #[inline]
    pub fn center(&self) -> Point3 {
        [
            (self.low[0] + self.high[0]) / 2.0,
            (self.low[1] + self.high[1]) / 2.0,
            (self.low[2] + self.high[2]) / 2.0,
        ]
    }

    /// 各轴跨度.
    #[inline]
    pub fn span(&self) -> Point3 {
        [
            self.high[0] - self.low[0],
            self.high[1] - self.low[1],
            self.high[2] - self.low[2],
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::{Affine, Volume};
    use ndarray::Array3;

    #[test]
    fn test_center_of_mass_single_voxel() {
        let mut data = Array3::<f32>::zeros((5, 6, 7));
        data[(3, 1, 5)] = 2.5;
        let aff = Affine::from_scale_offset([2.0, 3.0, 0.5], [-4.0, 10.0, 1.0]);
        let vol = Volume::new(data, aff);
        assert_eq!(vol.center_of_mass(), [2.0, 13.0, 3.5]);
    }

    #[test]
    fn test_center_of_mass_marginal_ties() {
        // 两个等强度体素: 各轴取第一个最大值.
        let mut data = Array3::<f32>::zeros((4, 4, 4));
        data[(1, 2, 3)] = 1.0;
        data[(2, 1, 0)] = 1.0;
        let vol = Volume::new(data, Affine::identity());
        assert_eq!(vol.center_of_mass(), [1.0, 1.0, 0.0]);
    }

    #[test]
    fn test_bounding_box() {
        let data = Array3::<f32>::zeros((11, 21, 5));
        let aff = Affine::from_scale_offset([-1.0, 2.0, 1.0], [5.0, 0.0, -2.0]);
        let bbox = Volume::new(data, aff).bounding_box();
        assert_eq!(bbox.low, [-5.0, 0.0, -2.0]);
        assert_eq!(bbox.high, [5.0, 40.0, 2.0]);
        assert_eq!(bbox.center(), [0.0, 20.0, 0.0]);
    }
}
