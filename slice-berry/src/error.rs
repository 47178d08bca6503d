//! 运行时错误.

use thiserror::Error;

/// 切片、上色与合成过程中的运行时错误.
///
/// 缺失的可选图层 (color / mask / alpha) 不属于错误, 各合成阶段会直接退化为恒等操作.
#[derive(Debug, Error)]
pub enum SliceError {
    /// 仿射变换的线性部分不可逆.
    #[error("仿射变换不可逆 (行列式 = {0:e})")]
    SingularAffine(f64),

    /// 非法的上下限: 要求两端有限且 `low < high`.
    #[error("非法的上下限 ({low}, {high}): 要求有限且 low < high")]
    InvalidLimits {
        /// 下限.
        low: f32,
        /// 上限.
        high: f32,
    },

    /// 不支持的插值阶数. 目前支持 0 ~ 3.
    #[error("不支持的插值阶数 {0}, 仅支持 0 ~ 3")]
    UnsupportedOrder(u32),

    /// 两个二维场的形状不一致.
    #[error("形状不一致: 期望 {expected:?}, 实际 {found:?}")]
    ShapeMismatch {
        /// 期望的形状.
        expected: Vec<usize>,
        /// 实际的形状.
        found: Vec<usize>,
    },

    /// 数据无法被解释为三维体数据.
    #[error("数据不是三维体数据, 形状为 {0:?}")]
    NotVolumetric(Vec<usize>),

    /// 未知的色表名称. 不会回退到任何默认色表.
    #[error("未知的色表 `{0}`")]
    UnknownColormap(String),

    /// 无法解析的颜色名称.
    #[error("未知的颜色 `{0}`")]
    UnknownColor(String),

    /// 无法解析的线型名称.
    #[error("未知的线型 `{0}`")]
    UnknownLineStyle(String),

    /// 读取 nifti 文件错误.
    #[error(transparent)]
    Nifti(#[from] nifti::NiftiError),

    /// 图像编码或写入错误.
    #[error(transparent)]
    Image(#[from] image::ImageError),
}

/// 切片 / 合成运行时结果.
pub type SliceResult<T> = Result<T, SliceError>;

/// 检查两个形状是否一致, 不一致时返回 [`SliceError::ShapeMismatch`].
#[inline]
pub(crate) fn ensure_shape(expected: &[usize], found: &[usize]) -> SliceResult<()> {
    if expected == found {
        Ok(())
    } else {
        Err(SliceError::ShapeMismatch {
            expected: expected.to_vec(),
            found: found.to_vec(),
        })
    }
}
