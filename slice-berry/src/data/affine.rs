//! 体素索引与物理空间之间的 4×4 仿射变换.

use crate::{Point3, SliceError, SliceResult};

/// 4×4 齐次仿射变换, 将体素索引 `(i, j, k, 1)` 映射为物理坐标 `(x, y, z, 1)`.
///
/// 左上 3×3 为旋转 / 缩放 / 错切部分, 第四列前三项为平移部分.
/// 最后一行总是被视为 `(0, 0, 0, 1)`.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Affine([[f64; 4]; 4]);

impl Default for Affine {
    #[inline]
    fn default() -> Self {
        Self::identity()
    }
}

impl Affine {
    /// 由行优先的 4×4 矩阵直接构建.
    #[inline]
    pub const fn new(matrix: [[f64; 4]; 4]) -> Self {
        Self(matrix)
    }

    /// 恒等变换.
    #[inline]
    pub const fn identity() -> Self {
        Self([
            [1.0, 0.0, 0.0, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ])
    }

    /// 轴对齐的缩放 + 平移. `scale` 为每个轴的体素尺寸, `offset` 为索引原点的物理坐标.
    #[inline]
    pub const fn from_scale_offset(scale: Point3, offset: Point3) -> Self {
        Self([
            [scale[0], 0.0, 0.0, offset[0]],
            [0.0, scale[1], 0.0, offset[1]],
            [0.0, 0.0, scale[2], offset[2]],
            [0.0, 0.0, 0.0, 1.0],
        ])
    }

    /// 由线性部分和平移部分构建.
    pub fn from_linear(linear: [[f64; 3]; 3], translation: Point3) -> Self {
        let mut m = Self::identity().0;
        for (row, (lin, t)) in m.iter_mut().zip(linear.iter().zip(translation)) {
            row[..3].copy_from_slice(lin);
            row[3] = t;
        }
        Self(m)
    }

    /// 行优先的 4×4 矩阵.
    #[inline]
    pub fn matrix(&self) -> &[[f64; 4]; 4] {
        &self.0
    }

    /// 左上 3×3 线性部分.
    pub fn linear(&self) -> [[f64; 3]; 3] {
        let m = &self.0;
        [
            [m[0][0], m[0][1], m[0][2]],
            [m[1][0], m[1][1], m[1][2]],
            [m[2][0], m[2][1], m[2][2]],
        ]
    }

    /// 平移部分.
    #[inline]
    pub fn translation(&self) -> Point3 {
        [self.0[0][3], self.0[1][3], self.0[2][3]]
    }

    /// 将点 `p` 映射到目标空间.
    #[inline]
    pub fn apply(&self, p: Point3) -> Point3 {
        let m = &self.0;
        let mut out = [0.0; 3];
        for (o, row) in out.iter_mut().zip(m.iter()) {
            *o = row[0] * p[0] + row[1] * p[1] + row[2] * p[2] + row[3];
        }
        out
    }

    /// 各体素轴方向上的体素尺寸 (线性部分列向量的模).
    pub fn voxel_size(&self) -> Point3 {
        let lin = self.linear();
        let mut out = [0.0; 3];
        for (c, o) in out.iter_mut().enumerate() {
            *o = (0..3).map(|r| lin[r][c] * lin[r][c]).sum::<f64>().sqrt();
        }
        out
    }

    /// 求逆变换.
    ///
    /// 线性部分求逆得到 `S = R⁻¹`, 平移部分重新推导为 `-S·t`.
    /// 当线性部分 (相对其量级) 奇异时返回 [`SliceError::SingularAffine`].
    pub fn inverse(&self) -> SliceResult<Affine> {
        let a = self.linear();
        let cof = |r0: usize, r1: usize, c0: usize, c1: usize| {
            a[r0][c0] * a[r1][c1] - a[r0][c1] * a[r1][c0]
        };

        // 伴随矩阵 (余子式矩阵的转置).
        let adj = [
            [cof(1, 2, 1, 2), -cof(0, 2, 1, 2), cof(0, 1, 1, 2)],
            [-cof(1, 2, 0, 2), cof(0, 2, 0, 2), -cof(0, 1, 0, 2)],
            [cof(1, 2, 0, 1), -cof(0, 2, 0, 1), cof(0, 1, 0, 1)],
        ];
        let det = a[0][0] * adj[0][0] + a[0][1] * adj[1][0] + a[0][2] * adj[2][0];

        let scale = a
            .iter()
            .flatten()
            .fold(0.0f64, |acc, v| acc.max(v.abs()));
        if !det.is_finite() || det.abs() <= 1e-12 * scale.powi(3) || scale == 0.0 {
            return Err(SliceError::SingularAffine(det));
        }

        let mut inv = [[0.0; 3]; 3];
        for (r, row) in inv.iter_mut().enumerate() {
            for (c, v) in row.iter_mut().enumerate() {
                *v = adj[r][c] / det;
            }
        }

        let t = self.translation();
        let mut offset = [0.0; 3];
        for (o, row) in offset.iter_mut().zip(inv.iter()) {
            *o = -(row[0] * t[0] + row[1] * t[1] + row[2] * t[2]);
        }
        Ok(Self::from_linear(inv, offset))
    }
}

#[cfg(test)]
mod tests {
    use super::Affine;
    use crate::SliceError;

    fn f64_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_inverse_scale_offset() {
        let aff = Affine::from_scale_offset([2.0, 0.5, 4.0], [-10.0, 3.0, 7.0]);
        let inv = aff.inverse().unwrap();
        assert_eq!(inv.apply(aff.apply([1.0, 2.0, 3.0])), [1.0, 2.0, 3.0]);
        assert_eq!(inv.apply([-10.0, 3.0, 7.0]), [0.0, 0.0, 0.0]);
        assert_eq!(aff.voxel_size(), [2.0, 0.5, 4.0]);
    }

    #[test]
    fn test_inverse_rotation_shear() {
        let (s, c) = 0.3f64.sin_cos();
        let aff = Affine::from_linear(
            [[c * 1.5, -s, 0.2], [s * 1.5, c, 0.0], [0.0, 0.1, 3.0]],
            [12.5, -4.0, 100.0],
        );
        let inv = aff.inverse().unwrap();
        for p in [[0.0, 0.0, 0.0], [3.0, -7.5, 11.0], [64.0, 64.0, 20.0]] {
            let q = inv.apply(aff.apply(p));
            for axis in 0..3 {
                assert!(f64_eq(p[axis], q[axis]), "{p:?} vs {q:?}");
            }
        }
    }

    #[test]
    fn test_singular_affine() {
        let aff = Affine::from_scale_offset([1.0, 0.0, 1.0], [0.0; 3]);
        assert!(matches!(aff.inverse(), Err(SliceError::SingularAffine(_))));

        // 两行线性相关.
        let aff = Affine::from_linear([[1.0, 2.0, 3.0], [2.0, 4.0, 6.0], [0.0, 0.0, 1.0]], [0.0; 3]);
        assert!(aff.inverse().is_err());
    }
}
