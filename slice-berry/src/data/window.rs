use crate::{SliceError, SliceResult};
use ordered_float::OrderedFloat;

/// 归一化上下限 `(low, high)`.
///
/// 既用作底图的显示窗口 (window), 也用作伪彩色 / 透明度图层的映射区间 (limits).
/// `low` 被映射为 0, `high` 被映射为 1, 区间外的值被截断.
///
/// 该结构是只读的. 若要修改参数, 你应该创建新的实例.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "[f32; 2]", into = "[f32; 2]")
)]
pub struct Limits {
    low: f32,
    high: f32,
}

/// 底图显示窗口. 与 [`Limits`] 语义相同.
pub type Window = Limits;

impl Limits {
    /// 构建上下限.
    ///
    /// 两端必须有限且 `low < high`, 否则返回 [`SliceError::InvalidLimits`].
    /// 不会自动交换颠倒的两端.
    pub fn new(low: f32, high: f32) -> SliceResult<Limits> {
        if low.is_finite() && high.is_finite() && low < high {
            Ok(Self { low, high })
        } else {
            Err(SliceError::InvalidLimits { low, high })
        }
    }

    /// 单位区间 `(0, 1)`.
    #[inline]
    pub const fn unit() -> Limits {
        Self {
            low: 0.0,
            high: 1.0,
        }
    }

    /// 按百分位数构建窗口. `percentiles` 以百分比给出, 如 `(1.0, 99.0)`.
    ///
    /// 百分位数按线性插值计算, 非有限值 (NaN, inf) 不参与统计.
    /// 数据为空或过于均匀 (两个百分位数相等) 时返回 [`SliceError::InvalidLimits`].
    pub fn from_percentiles<'a, I>(data: I, (p_low, p_high): (f32, f32)) -> SliceResult<Limits>
    where
        I: IntoIterator<Item = &'a f32>,
    {
        let mut sorted: Vec<OrderedFloat<f32>> = data
            .into_iter()
            .filter(|v| v.is_finite())
            .map(|v| OrderedFloat(*v))
            .collect();
        if sorted.is_empty() || !(0.0..=100.0).contains(&p_low) || !(0.0..=100.0).contains(&p_high)
        {
            return Err(SliceError::InvalidLimits {
                low: p_low,
                high: p_high,
            });
        }
        sorted.sort_unstable();
        Self::new(percentile(&sorted, p_low), percentile(&sorted, p_high))
    }

    /// 下限.
    #[inline]
    pub fn low(&self) -> f32 {
        self.low
    }

    /// 上限.
    #[inline]
    pub fn high(&self) -> f32 {
        self.high
    }

    /// 区间中点.
    #[inline]
    pub fn mid(&self) -> f32 {
        (self.low + self.high) / 2.0
    }

    /// 区间宽度, 恒为正.
    #[inline]
    pub fn width(&self) -> f32 {
        self.high - self.low
    }

    /// 将 `v` 线性映射到 `[0, 1]` 并截断.
    ///
    /// 如果 `v` 无意义 (如 inf, NaN), 则返回 `None`.
    #[inline]
    pub fn normalize(&self, v: f32) -> Option<f32> {
        if !v.is_finite() {
            return None;
        }
        if v <= self.low {
            Some(0.0)
        } else if v >= self.high {
            Some(1.0)
        } else {
            Some((v - self.low) / self.width())
        }
    }

    /// 求 `v` 对应的 8-bit 灰度值 (0 <= value <= 255).
    ///
    /// 如果 `v` 无意义 (如 inf, NaN), 则返回 `None`.
    pub fn eval_u8(&self, v: f32) -> Option<u8> {
        // 255, not 256.
        self.normalize(v).map(|t| (t * 255.0) as u8)
    }
}

impl TryFrom<[f32; 2]> for Limits {
    type Error = SliceError;

    #[inline]
    fn try_from([low, high]: [f32; 2]) -> Result<Self, Self::Error> {
        Self::new(low, high)
    }
}

impl From<Limits> for [f32; 2] {
    #[inline]
    fn from(value: Limits) -> Self {
        [value.low, value.high]
    }
}

/// 对已升序排列的非空数据求第 `p` 百分位数 (线性插值).
fn percentile(sorted: &[OrderedFloat<f32>], p: f32) -> f32 {
    debug_assert!(!sorted.is_empty());
    let rank = f64::from(p) / 100.0 * (sorted.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    let frac = (rank - lo as f64) as f32;
    sorted[lo].0 + (sorted[hi].0 - sorted[lo].0) * frac
}
