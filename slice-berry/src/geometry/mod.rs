//! 切片平面几何.

mod plane;

pub use plane::SliceGeometry;

use std::fmt;
use std::str::FromStr;

/// 物理空间中的三个坐标轴. 切片总是垂直于其中一个轴.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Axis3 {
    /// 矢状面法向.
    X,

    /// 冠状面法向.
    Y,

    /// 横断面法向.
    Z,
}

impl Axis3 {
    /// 轴序号.
    #[inline]
    pub const fn index(self) -> usize {
        match self {
            Axis3::X => 0,
            Axis3::Y => 1,
            Axis3::Z => 2,
        }
    }
}

impl fmt::Display for Axis3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Axis3::X => write!(f, "x"),
            Axis3::Y => write!(f, "y"),
            Axis3::Z => write!(f, "z"),
        }
    }
}

impl FromStr for Axis3 {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "x" | "X" => Ok(Axis3::X),
            "y" | "Y" => Ok(Axis3::Y),
            "z" | "Z" => Ok(Axis3::Z),
            other => Err(format!("未知的轴 `{other}`, 应为 x, y 或 z")),
        }
    }
}

/// 显示方向约定.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Orientation {
    /// 临床约定.
    #[default]
    Clinical,

    /// 临床前 (动物) 约定, 矢状面和冠状面的显示轴互换.
    Preclinical,
}

impl FromStr for Orientation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "clin" | "clinical" => Ok(Orientation::Clinical),
            "preclin" | "preclinical" => Ok(Orientation::Preclinical),
            other => Err(format!("未知的方向约定 `{other}`, 应为 clin 或 preclin")),
        }
    }
}

/// 垂直于 `axis` 的切片中, 图像水平方向和垂直方向分别对应的物理轴序号.
#[inline]
pub const fn axis_indices(axis: Axis3, orient: Orientation) -> (usize, usize) {
    match (orient, axis) {
        (Orientation::Clinical, Axis3::X) => (1, 2),
        (Orientation::Clinical, Axis3::Y) => (0, 2),
        (Orientation::Clinical, Axis3::Z) => (0, 1),
        (Orientation::Preclinical, Axis3::X) => (2, 1),
        (Orientation::Preclinical, Axis3::Y) => (2, 0),
        (Orientation::Preclinical, Axis3::Z) => (0, 1),
    }
}

#[cfg(test)]
mod tests {
    use super::{axis_indices, Axis3, Orientation};

    #[test]
    fn test_axis_indices_exclude_normal() {
        for orient in [Orientation::Clinical, Orientation::Preclinical] {
            for axis in [Axis3::X, Axis3::Y, Axis3::Z] {
                let (a, b) = axis_indices(axis, orient);
                assert_ne!(a, b);
                assert_ne!(a, axis.index());
                assert_ne!(b, axis.index());
            }
        }
    }

    #[test]
    fn test_parse() {
        assert_eq!("z".parse::<Axis3>(), Ok(Axis3::Z));
        assert!("w".parse::<Axis3>().is_err());
        assert_eq!("preclin".parse::<Orientation>(), Ok(Orientation::Preclinical));
    }
}
