#![warn(missing_docs)] // <= 合适时移除它.
// #![warn(clippy::missing_docs_in_private_items)]  // <= too strict.

//! 核心库. 在三维体数据上任意切片重采样, 并将灰度结构像, 伪彩色统计图,
//! 透明度编码的显著性图, 遮罩和等值线合成为一张 RGB 图像.
//!
//! 该 crate 目前仅提供 `safe` 接口.
//!
//! # 注意
//!
//! 1. 体数据的仿射变换将 `[i, j, k]` 体素索引映射到物理坐标. 切片几何总是以物理坐标给出.
//! 2. 所有二维场的行 0 对应显示图像的 **下** 边缘. 只有在写出图像时才会翻转行序.
//! 3. 库代码对用户输入返回 [`SliceError`], 不会 panic.
//!   构造几何对象时传入 0 个采样点等编程错误除外.
//!
//! # 模块
//!
//! ### 体数据 ✅
//!
//! 体素数组 + 仿射变换, nii 文件读取, 百分位数显示窗口.
//!
//! 实现位于 `slice-berry/src/data`.
//!
//! ### 插值采样 ✅
//!
//! 最近邻, 三线性, 二次 / 三次 B 样条. 越界延拓方式可选.
//!
//! 实现位于 `slice-berry/src/sample`.
//!
//! ### 上色 ✅
//!
//! 具名色表 (含 `_r` 反向色表), 遮罩, `scale_clip` 和透明度混合.
//!
//! 实现位于 `slice-berry/src/color`.
//!
//! ### 切片合成 ✅
//!
//! `overlay_slice`: 底图 + 伪彩色 + 透明度 + 遮罩.
//!
//! 实现位于 `slice-berry/src/compose`.
//!
//! ### 标注与图例 ✅
//!
//! 等值线 (marching squares), 十字准线, 一维 / 二维色条.
//!
//! 实现位于 `slice-berry/src/annotate` 和 `slice-berry/src/legend.rs`.
//!
//! ### 多切片拼图 ✅
//!
//! 支持 `rayon` 并行合成.
//!
//! 实现位于 `slice-berry/src/montage.rs`.

/// 二维索引, 同时也可一定程度上用作非负整数向量.
pub type Idx2d = (usize, usize);

/// 三维索引, 同时也可一定程度上用作非负整数向量.
pub type Idx3d = (usize, usize, usize);

/// 物理空间中的点 / 向量.
pub type Point3 = [f64; 3];

mod error;

pub use error::{SliceError, SliceResult};

pub(crate) use error::ensure_shape;

/// 三维体数据及其仿射变换.
pub mod data;

pub use data::{Affine, BoundingBox, Limits, Volume, Window};

pub mod annotate;
pub mod color;
pub mod compose;
pub mod consts;
pub mod geometry;
pub mod legend;
pub mod montage;
pub mod prelude;
pub mod sample;
pub mod save;
