//! nii 文件读取.

use std::path::Path;

use log::{debug, warn};
use ndarray::{ArrayD, Axis, Ix3};
use nifti::{IntoNdArray, NiftiHeader, NiftiObject, ReaderOptions};

use super::{Affine, Volume};
use crate::{SliceError, SliceResult};

/// 读取 nii 文件并构建 [`Volume`].
pub(super) fn read_volume(path: &Path) -> SliceResult<Volume> {
    let obj = ReaderOptions::new().read_file(path)?;
    let affine = affine_from_header(obj.header());

    // nifti 数据按 [i, j, k, ...] 组织, 底层为列优先, 这里转换为标准布局.
    let data = obj.into_volume().into_ndarray::<f32>()?;
    let data = to_three_dims(data)?
        .as_standard_layout()
        .into_owned();
    debug!("已读取 `{}`: 形状 {:?}", path.display(), data.dim());

    Ok(Volume::new(data, affine))
}

/// 将任意维度的数据规整为三维.
///
/// 二维数据视为单层; 末尾长度为 1 的轴会被压缩; 更高维的数据仅保留第一帧.
fn to_three_dims(mut data: ArrayD<f32>) -> SliceResult<ndarray::Array3<f32>> {
    match data.ndim() {
        0 | 1 => return Err(SliceError::NotVolumetric(data.shape().to_vec())),
        2 => data.insert_axis_inplace(Axis(2)),
        _ => {}
    }
    while data.ndim() > 3 {
        let last = Axis(data.ndim() - 1);
        if data.len_of(last) != 1 {
            warn!(
                "数据形状为 {:?}, 沿第 {} 轴仅保留第一帧",
                data.shape(),
                last.index()
            );
        }
        data.index_axis_inplace(last, 0);
    }
    let shape = data.shape().to_vec();
    data.into_dimensionality::<Ix3>()
        .map_err(|_| SliceError::NotVolumetric(shape))
}

/// 由 header 推导体素到物理空间的仿射变换.
///
/// 优先级: sform > qform > pixdim 缩放.
pub(crate) fn affine_from_header(h: &NiftiHeader) -> Affine {
    if h.sform_code > 0 {
        let row = |r: &[f32; 4]| [r[0] as f64, r[1] as f64, r[2] as f64, r[3] as f64];
        return Affine::new([
            row(&h.srow_x),
            row(&h.srow_y),
            row(&h.srow_z),
            [0.0, 0.0, 0.0, 1.0],
        ]);
    }

    let pix = |v: f32| if v > 0.0 { v as f64 } else { 1.0 };
    let [qfac, dx, dy, dz, ..] = h.pixdim;
    let scale = [pix(dx), pix(dy), pix(dz)];

    if h.qform_code > 0 {
        let (b, c, d) = (
            h.quatern_b as f64,
            h.quatern_c as f64,
            h.quatern_d as f64,
        );
        let a = (1.0 - (b * b + c * c + d * d)).max(0.0).sqrt();
        let qfac = if qfac < 0.0 { -1.0 } else { 1.0 };
        let rot = [
            [
                a * a + b * b - c * c - d * d,
                2.0 * (b * c - a * d),
                2.0 * (b * d + a * c),
            ],
            [
                2.0 * (b * c + a * d),
                a * a + c * c - b * b - d * d,
                2.0 * (c * d - a * b),
            ],
            [
                2.0 * (b * d - a * c),
                2.0 * (c * d + a * b),
                a * a + d * d - c * c - b * b,
            ],
        ];
        let col_scale = [scale[0], scale[1], scale[2] * qfac];
        let mut linear = [[0.0; 3]; 3];
        for (r, row) in linear.iter_mut().enumerate() {
            for (c, v) in row.iter_mut().enumerate() {
                *v = rot[r][c] * col_scale[c];
            }
        }
        let offset = [
            h.quatern_x as f64,
            h.quatern_y as f64,
            h.quatern_z as f64,
        ];
        return Affine::from_linear(linear, offset);
    }

    Affine::from_scale_offset(scale, [0.0; 3])
}
