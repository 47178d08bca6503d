//! 具名色表注册表.
//!
//! 色表是 `[0, 1] -> RGB` 的连续分段线性函数, 按名称查找. 任何名称加上 `_r`
//! 后缀即得到反向色表. 未知名称返回 [`SliceError::UnknownColormap`], 不会回退.

use std::collections::HashMap;

use once_cell::sync::Lazy;

use super::palettes::{self, Anchors};
use crate::{SliceError, SliceResult};

/// 反向色表的名称后缀.
const REVERSED_SUFFIX: &str = "_r";

/// 逐通道的分段线性锚点.
#[derive(Debug)]
struct Segments {
    channels: [Vec<(f32, f32)>; 3],
}

impl Segments {
    fn from_anchors(anchors: [Anchors; 3]) -> Self {
        Self {
            channels: anchors.map(<[(f32, f32)]>::to_vec),
        }
    }

    /// 等距分布的颜色列表.
    fn from_hex_list(colors: &[u32]) -> Self {
        let last = (colors.len() - 1) as f32;
        let mut channels: [Vec<(f32, f32)>; 3] = Default::default();
        for (i, rgb) in colors.iter().enumerate() {
            let pos = i as f32 / last;
            for (ch, slot) in channels.iter_mut().enumerate() {
                let byte = (rgb >> (16 - 8 * ch)) & 0xff;
                slot.push((pos, byte as f32 / 255.0));
            }
        }
        Self { channels }
    }
}

static REGISTRY: Lazy<HashMap<&'static str, Segments>> = Lazy::new(|| {
    let mut map = HashMap::new();
    map.insert("gray", Segments::from_anchors(palettes::GRAY));
    map.insert("hot", Segments::from_anchors(palettes::HOT));
    map.insert("jet", Segments::from_anchors(palettes::JET));
    map.insert("viridis", Segments::from_hex_list(palettes::VIRIDIS));
    map.insert("inferno", Segments::from_hex_list(palettes::INFERNO));
    map.insert("magma", Segments::from_hex_list(palettes::MAGMA));
    map.insert("plasma", Segments::from_hex_list(palettes::PLASMA));
    map.insert("RdYlBu", Segments::from_hex_list(palettes::RDYLBU));
    map.insert("RdBu", Segments::from_hex_list(palettes::RDBU));
    map.insert("PiYG", Segments::from_hex_list(palettes::PIYG));
    map.insert("coolwarm", Segments::from_hex_list(palettes::COOLWARM));
    map
});

/// 已解析的色表. 复制开销很小.
#[derive(Copy, Clone, Debug)]
pub struct Colormap {
    name: &'static str,
    segments: &'static Segments,
    reversed: bool,
}

/// 按名称查找色表.
pub fn lookup(name: &str) -> SliceResult<Colormap> {
    let (base, reversed) = match name.strip_suffix(REVERSED_SUFFIX) {
        Some(base) => (base, true),
        None => (name, false),
    };
    REGISTRY
        .get_key_value(base)
        .map(|(name, segments)| Colormap {
            name: *name,
            segments,
            reversed,
        })
        .ok_or_else(|| SliceError::UnknownColormap(name.to_string()))
}

/// 所有注册色表的基础名称 (不含 `_r` 变体), 按字典序排列.
pub fn names() -> Vec<&'static str> {
    let mut names: Vec<_> = REGISTRY.keys().copied().collect();
    names.sort_unstable();
    names
}

/// 单通道分段线性求值.
fn channel(anchors: &[(f32, f32)], t: f32) -> f32 {
    let i = anchors.partition_point(|(p, _)| *p < t);
    if i == 0 {
        return anchors[0].1;
    }
    if i == anchors.len() {
        return anchors[i - 1].1;
    }
    let (p0, v0) = anchors[i - 1];
    let (p1, v1) = anchors[i];
    if p1 <= p0 {
        v1
    } else {
        v0 + (v1 - v0) * (t - p0) / (p1 - p0)
    }
}

impl Colormap {
    /// 基础名称 (不含 `_r` 后缀).
    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// 是否为反向色表.
    #[inline]
    pub fn is_reversed(&self) -> bool {
        self.reversed
    }

    /// 求 `t` 处的颜色. `t` 会先被截断到 `[0, 1]`.
    pub fn eval(&self, t: f32) -> [f32; 3] {
        let t = t.clamp(0.0, 1.0);
        let t = if self.reversed { 1.0 - t } else { t };
        let [r, g, b] = &self.segments.channels;
        [channel(r, t), channel(g, t), channel(b, t)]
    }
}

#[cfg(test)]
mod tests {
    use super::{lookup, names};
    use crate::SliceError;

    fn rgb_eq(a: [f32; 3], b: [f32; 3]) -> bool {
        a.iter().zip(b.iter()).all(|(x, y)| (x - y).abs() < 1e-6)
    }

    #[test]
    fn test_gray_is_identity() {
        let gray = lookup("gray").unwrap();
        for t in [0.0, 0.125, 0.3, 0.5, 0.99, 1.0] {
            assert_eq!(gray.eval(t), [t, t, t]);
        }
        assert_eq!(gray.eval(-1.0), [0.0; 3]);
        assert_eq!(gray.eval(2.0), [1.0; 3]);
    }

    #[test]
    fn test_reversed() {
        let fwd = lookup("RdYlBu").unwrap();
        let rev = lookup("RdYlBu_r").unwrap();
        assert!(rev.is_reversed());
        assert_eq!(rev.name(), "RdYlBu");
        for t in [0.0, 0.2, 0.5, 0.77, 1.0] {
            assert!(rgb_eq(fwd.eval(t), rev.eval(1.0 - t)));
        }
        // RdYlBu_r 的低端为蓝色, 高端为红色.
        let low = rev.eval(0.0);
        let high = rev.eval(1.0);
        assert!(low[2] > low[0]);
        assert!(high[0] > high[2]);
    }

    #[test]
    fn test_hex_anchors() {
        let viridis = lookup("viridis").unwrap();
        assert!(rgb_eq(
            viridis.eval(0.0),
            [0x44 as f32 / 255.0, 0x01 as f32 / 255.0, 0x54 as f32 / 255.0]
        ));
        assert!(rgb_eq(
            viridis.eval(1.0),
            [0xfd as f32 / 255.0, 0xe7 as f32 / 255.0, 0x25 as f32 / 255.0]
        ));
    }

    #[test]
    fn test_unknown_colormap() {
        assert!(matches!(
            lookup("not-a-map"),
            Err(SliceError::UnknownColormap(n)) if n == "not-a-map"
        ));
        assert!(lookup("_r").is_err());
        assert!(names().contains(&"hot"));
    }
}
