//! B 样条插值的预滤波.
//!
//! 对每个轴上的每条数据线做递归滤波 (一个因果, 一个反因果), 得到插值系数.
//! 边界按镜像对称处理, 与 [`super::mirror_index`] 一致.

// ref: M. Unser, "Splines: a perfect fit for signal and image processing", 1999.

use ndarray::{Array3, ArrayView3, Axis};

/// 二次 B 样条的极点 `√8 - 3`.
const POLE_QUADRATIC: f64 = -0.171_572_875_253_809_9;

/// 三次 B 样条的极点 `√3 - 2`.
const POLE_CUBIC: f64 = -0.267_949_192_431_122_7;

/// 因果初值截断求和的相对精度.
const TOLERANCE: f64 = 1e-12;

#[inline]
fn poles(order: u32) -> &'static [f64] {
    match order {
        2 => &[POLE_QUADRATIC],
        3 => &[POLE_CUBIC],
        _ => &[],
    }
}

/// 求 `order` 阶 B 样条插值系数. 阶数小于 2 时系数即为原数据.
pub(crate) fn prefilter(data: ArrayView3<f32>, order: u32) -> Array3<f64> {
    let mut coefficients = data.mapv(f64::from);
    let poles = poles(order);
    if poles.is_empty() {
        return coefficients;
    }

    let mut line = Vec::new();
    for axis in 0..3 {
        for mut lane in coefficients.lanes_mut(Axis(axis)) {
            line.clear();
            line.extend(lane.iter().copied());
            filter_line(&mut line, poles);
            for (slot, v) in lane.iter_mut().zip(line.iter()) {
                *slot = *v;
            }
        }
    }
    coefficients
}

/// 原地对一条数据线做递归滤波.
fn filter_line(c: &mut [f64], poles: &[f64]) {
    let n = c.len();
    if n < 2 {
        return;
    }

    let gain: f64 = poles.iter().map(|z| (1.0 - z) * (1.0 - 1.0 / z)).product();
    c.iter_mut().for_each(|v| *v *= gain);

    for &z in poles {
        c[0] = causal_init(c, z);
        for k in 1..n {
            c[k] += z * c[k - 1];
        }
        c[n - 1] = anticausal_init(c, z);
        for k in (0..n - 1).rev() {
            c[k] = z * (c[k + 1] - c[k]);
        }
    }
}

/// 镜像对称边界下因果滤波的初值.
fn causal_init(c: &[f64], z: f64) -> f64 {
    let n = c.len();
    let horizon = (TOLERANCE.ln() / z.abs().ln()).ceil() as usize;

    if horizon < n {
        // 截断求和已足够精确.
        let mut zk = z;
        let mut sum = c[0];
        for v in &c[1..horizon] {
            sum += zk * v;
            zk *= z;
        }
        return sum;
    }

    // 精确求和.
    let zn = z.powi(n as i32 - 1);
    let mut z2n = zn * zn / z;
    let mut zk = z;
    let mut sum = c[0] + zn * c[n - 1];
    for v in &c[1..n - 1] {
        sum += (zk + z2n) * v;
        zk *= z;
        z2n /= z;
    }
    sum / (1.0 - zn * zn)
}

/// 镜像对称边界下反因果滤波的初值.
#[inline]
fn anticausal_init(c: &[f64], z: f64) -> f64 {
    let n = c.len();
    (z / (z * z - 1.0)) * (c[n - 1] + z * c[n - 2])
}
