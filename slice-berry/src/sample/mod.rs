//! 体数据在任意物理坐标处的插值采样.
//!
//! 物理坐标先经仿射逆变换映射为小数体素索引, 再按给定阶数插值:
//!
//! | 阶数 | 插值方式                         |
//! |------|----------------------------------|
//! | 0    | 最近邻 (`floor(x + 0.5)`)         |
//! | 1    | 三线性                           |
//! | 2, 3 | 预滤波后的二次 / 三次 B 样条      |
//!
//! 样条系数按体数据缓存, 同一体数据的多次高阶采样只预滤波一次.
//!
//! 越界点按 [`Boundary`] 处理, 默认为最近邻延拓.

pub(crate) mod spline;

use itertools::iproduct;
use log::trace;
use ndarray::{Array1, ArrayView2, ArrayView3};

use crate::{ensure_shape, Affine, Point3, SliceError, SliceResult, Volume};

/// 支持的最高插值阶数.
pub const MAX_ORDER: u32 = 3;

/// 越界点的延拓方式.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Boundary {
    /// 取最近的边缘体素.
    #[default]
    Nearest,

    /// 越界处取常数.
    Constant(f32),

    /// 以边缘体素为对称轴镜像延拓 (不重复边缘体素).
    Mirror,
}

/// 在物理坐标 `points` (形状 `(n, 3)`) 处以 `order` 阶插值采样 `volume`,
/// 越界点按最近邻延拓. 每个输入点返回一个值.
///
/// 仿射变换不可逆时返回 [`SliceError::SingularAffine`].
#[inline]
pub fn sample_point(
    volume: &Volume,
    points: ArrayView2<f64>,
    order: u32,
) -> SliceResult<Array1<f32>> {
    sample_point_with(volume, points, order, Boundary::default())
}

/// 同 [`sample_point`], 但越界点按 `boundary` 处理.
pub fn sample_point_with(
    volume: &Volume,
    points: ArrayView2<f64>,
    order: u32,
    boundary: Boundary,
) -> SliceResult<Array1<f32>> {
    if order > MAX_ORDER {
        return Err(SliceError::UnsupportedOrder(order));
    }
    ensure_shape(&[points.nrows(), 3], points.shape())?;
    let inverse = volume.affine().inverse()?;
    trace!("以 {order} 阶插值采样 {} 个点", points.nrows());

    let values = if order <= 1 {
        sample_all(volume.data(), points, &inverse, order, boundary)
    } else {
        sample_all(volume.spline_coefficients(order), points, &inverse, order, boundary)
    };
    Ok(values)
}

/// 峰值强度位置的物理坐标. 见 [`Volume::center_of_mass`].
#[inline]
pub fn center_of_mass(volume: &Volume) -> Point3 {
    volume.center_of_mass()
}

fn sample_all<T: Copy + Into<f64>>(
    data: ArrayView3<T>,
    points: ArrayView2<f64>,
    inverse: &Affine,
    order: u32,
    boundary: Boundary,
) -> Array1<f32> {
    points
        .outer_iter()
        .map(|p| {
            let idx = inverse.apply([p[0], p[1], p[2]]);
            interpolate(&data, idx, order, boundary)
        })
        .collect()
}

/// 一维插值抽头: 参与插值的索引及其权重.
#[derive(Copy, Clone, Debug, Default)]
struct Taps {
    idx: [usize; 4],
    weight: [f64; 4],
    len: usize,
}

impl Taps {
    /// 在长度为 `n` 的轴上, 坐标 `x` (已处理越界) 处的 `order` 阶抽头.
    fn new(x: f64, n: usize, order: u32) -> Self {
        let mut taps = Taps::default();
        match order {
            0 => {
                taps.idx[0] = ((x + 0.5).floor().max(0.0) as usize).min(n - 1);
                taps.weight[0] = 1.0;
                taps.len = 1;
            }
            1 => {
                let f = x.floor();
                let t = x - f;
                let i0 = (f.max(0.0) as usize).min(n - 1);
                taps.idx[..2].copy_from_slice(&[i0, (i0 + 1).min(n - 1)]);
                taps.weight[..2].copy_from_slice(&[1.0 - t, t]);
                taps.len = 2;
            }
            2 => {
                let c = (x + 0.5).floor();
                let t = x - c;
                let start = c as i64 - 1;
                for k in 0..3 {
                    taps.idx[k] = mirror_index(start + k as i64, n);
                }
                taps.weight[..3].copy_from_slice(&[
                    0.5 * (0.5 - t) * (0.5 - t),
                    0.75 - t * t,
                    0.5 * (0.5 + t) * (0.5 + t),
                ]);
                taps.len = 3;
            }
            _ => {
                let f = x.floor();
                let t = x - f;
                let start = f as i64 - 1;
                for k in 0..4 {
                    taps.idx[k] = mirror_index(start + k as i64, n);
                }
                let (t2, t3) = (t * t, t * t * t);
                taps.weight = [
                    (1.0 - t) * (1.0 - t) * (1.0 - t) / 6.0,
                    (4.0 - 6.0 * t2 + 3.0 * t3) / 6.0,
                    (1.0 + 3.0 * t + 3.0 * t2 - 3.0 * t3) / 6.0,
                    t3 / 6.0,
                ];
                taps.len = 4;
            }
        }
        taps
    }
}

/// 将整数索引以边缘为对称轴镜像到 `[0, n)` 内.
#[inline]
fn mirror_index(i: i64, n: usize) -> usize {
    if n == 1 {
        return 0;
    }
    let period = 2 * (n as i64 - 1);
    let i = i.rem_euclid(period);
    if i >= n as i64 {
        (period - i) as usize
    } else {
        i as usize
    }
}

/// 将连续坐标以边缘为对称轴镜像到 `[0, n - 1]` 内.
#[inline]
fn mirror_coord(x: f64, n: usize) -> f64 {
    if n == 1 {
        return 0.0;
    }
    let last = (n - 1) as f64;
    let x = x.rem_euclid(2.0 * last);
    if x > last {
        2.0 * last - x
    } else {
        x
    }
}

/// 在小数体素索引 `idx` 处插值.
fn interpolate<T: Copy + Into<f64>>(
    data: &ArrayView3<T>,
    idx: Point3,
    order: u32,
    boundary: Boundary,
) -> f32 {
    const EPS: f64 = 1e-9;

    let (d0, d1, d2) = data.dim();
    let dims = [d0, d1, d2];
    if dims.contains(&0) {
        return f32::NAN;
    }

    let mut taps = [Taps::default(); 3];
    for axis in 0..3 {
        let n = dims[axis];
        let last = (n - 1) as f64;
        let x = idx[axis];
        if !x.is_finite() {
            return match boundary {
                Boundary::Constant(cval) => cval,
                _ => f32::NAN,
            };
        }
        let x = match boundary {
            Boundary::Nearest => x.clamp(0.0, last),
            Boundary::Constant(cval) => {
                if x < -EPS || x > last + EPS {
                    return cval;
                }
                x.clamp(0.0, last)
            }
            Boundary::Mirror => mirror_coord(x, n),
        };
        taps[axis] = Taps::new(x, n, order);
    }

    let [t0, t1, t2] = &taps;
    let value: f64 = iproduct!(0..t0.len, 0..t1.len, 0..t2.len)
        .map(|(a, b, c)| {
            let w = t0.weight[a] * t1.weight[b] * t2.weight[c];
            let v: f64 = data[(t0.idx[a], t1.idx[b], t2.idx[c])].into();
            w * v
        })
        .sum();
    value as f32
}

#[cfg(test)]
mod tests {
    use super::{mirror_coord, mirror_index, sample_point, sample_point_with, Boundary};
    use crate::{Affine, SliceError, Volume};
    use ndarray::{arr2, Array2, Array3};

    fn f32_eq(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-4
    }

    /// 体素值各不相同的测试体数据.
    fn ramp_volume(aff: Affine) -> Volume {
        let data = Array3::from_shape_fn((5, 6, 7), |(i, j, k)| {
            (i * 42 + j * 7 + k) as f32 + ((i * j + k) % 3) as f32 * 0.25
        });
        Volume::new(data, aff)
    }

    fn voxel_centers(vol: &Volume) -> (Array2<f64>, Vec<f32>) {
        let (a, b, c) = vol.shape();
        let mut pts = Vec::new();
        let mut expected = Vec::new();
        for i in 0..a {
            for j in 0..b {
                for k in 0..c {
                    pts.extend(vol.to_physical([i as f64, j as f64, k as f64]));
                    expected.push(vol[(i, j, k)]);
                }
            }
        }
        (Array2::from_shape_vec((expected.len(), 3), pts).unwrap(), expected)
    }

    #[test]
    fn test_voxel_center_round_trip() {
        let (s, c) = 0.4f64.sin_cos();
        let rotated = Affine::from_linear(
            [[c * 2.0, -s, 0.0], [s * 2.0, c, 0.0], [0.0, 0.3, 1.5]],
            [10.0, -3.0, 4.0],
        );
        for aff in [
            Affine::from_scale_offset([2.0, 2.0, 3.0], [-5.0, 1.0, 0.5]),
            rotated,
        ] {
            let vol = ramp_volume(aff);
            let (pts, expected) = voxel_centers(&vol);
            for order in 0..=3 {
                let got = sample_point(&vol, pts.view(), order).unwrap();
                for (g, e) in got.iter().zip(expected.iter()) {
                    assert!(f32_eq(*g, *e), "order {order}: {g} vs {e}");
                }
            }
        }
    }

    #[test]
    fn test_linear_midpoint() {
        let vol = ramp_volume(Affine::identity());
        let pts = arr2(&[[1.5, 2.0, 3.0]]);
        let got = sample_point(&vol, pts.view(), 1).unwrap();
        let expected = (vol[(1, 2, 3)] + vol[(2, 2, 3)]) / 2.0;
        assert!(f32_eq(got[0], expected));

        let nearest = sample_point(&vol, arr2(&[[1.4, 2.6, 3.0]]).view(), 0).unwrap();
        assert_eq!(nearest[0], vol[(1, 3, 3)]);
    }

    #[test]
    fn test_cubic_reproduces_linear_function() {
        // 线性函数在 B 样条插值下 (远离边界处) 被精确重建.
        let data = Array3::from_shape_fn((32, 32, 32), |(i, j, k)| (i + 2 * j + 3 * k) as f32);
        let vol = Volume::new(data, Affine::identity());
        let got = sample_point(&vol, arr2(&[[15.25, 16.5, 14.75]]).view(), 3).unwrap();
        assert!(f32_eq(got[0], 15.25 + 33.0 + 44.25));
    }

    #[test]
    fn test_boundary_modes() {
        let vol = ramp_volume(Affine::identity());
        let outside = arr2(&[[-3.0, 0.0, 0.0], [4.0, 5.0, 9.0]]);

        let nearest = sample_point(&vol, outside.view(), 1).unwrap();
        assert_eq!(nearest[0], vol[(0, 0, 0)]);
        assert_eq!(nearest[1], vol[(4, 5, 6)]);

        let constant =
            sample_point_with(&vol, outside.view(), 1, Boundary::Constant(-1.0)).unwrap();
        assert_eq!(constant.to_vec(), vec![-1.0, -1.0]);

        let mirror = sample_point_with(&vol, outside.view(), 0, Boundary::Mirror).unwrap();
        assert_eq!(mirror[0], vol[(3, 0, 0)]);
        assert_eq!(mirror[1], vol[(4, 5, 3)]);
    }

    #[test]
    fn test_errors() {
        let vol = ramp_volume(Affine::identity());
        let pts = arr2(&[[0.0, 0.0, 0.0]]);
        assert!(matches!(
            sample_point(&vol, pts.view(), 4),
            Err(SliceError::UnsupportedOrder(4))
        ));

        let flat = ramp_volume(Affine::from_scale_offset([1.0, 1.0, 0.0], [0.0; 3]));
        assert!(matches!(
            sample_point(&flat, pts.view(), 1),
            Err(SliceError::SingularAffine(_))
        ));

        let bad = arr2(&[[0.0, 0.0]]);
        assert!(matches!(
            sample_point(&vol, bad.view(), 1),
            Err(SliceError::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn test_spline_coefficients_are_cached() {
        let vol = ramp_volume(Affine::identity());
        let first = vol.spline_coefficients(3).as_ptr();
        let pts = arr2(&[[1.5, 2.5, 3.5], [0.2, 4.0, 6.1]]);
        let a = sample_point(&vol, pts.view(), 3).unwrap();
        assert_eq!(vol.spline_coefficients(3).as_ptr(), first);
        assert_ne!(vol.spline_coefficients(2).as_ptr(), first);

        let fresh = ramp_volume(Affine::identity());
        assert_eq!(sample_point(&fresh, pts.view(), 3).unwrap(), a);
        assert_eq!(sample_point(&vol, pts.view(), 3).unwrap(), a);
    }

    #[test]
    fn test_mirror_helpers() {
        assert_eq!(mirror_index(-1, 5), 1);
        assert_eq!(mirror_index(5, 5), 3);
        assert_eq!(mirror_index(9, 5), 1);
        assert_eq!(mirror_index(3, 1), 0);
        assert_eq!(mirror_coord(-0.5, 5), 0.5);
        assert_eq!(mirror_coord(4.5, 5), 3.5);
    }
}
