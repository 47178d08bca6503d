//! 等值线提取 (marching squares).
//!
//! 坐标为网格坐标 `(x, y)`: `x` 为列索引, `y` 为行索引, 行 0 为下边缘.

use ndarray::ArrayView2;

/// 网格坐标系中的一条线段.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Segment {
    /// 起点 `(x, y)`.
    pub start: (f32, f32),
    /// 终点 `(x, y)`.
    pub end: (f32, f32),
}

/// `field` 是否同时存在严格小于和严格大于 `level` 的值.
///
/// 只有这种情况下等值线才有意义.
pub fn straddles(field: ArrayView2<f32>, level: f32) -> bool {
    field.iter().any(|v| *v < level) && field.iter().any(|v| *v > level)
}

/// 提取 `field` 在 `level` 处的等值线段. 含 NaN 的网格单元被跳过.
pub fn march_squares(field: ArrayView2<f32>, level: f32) -> Vec<Segment> {
    let (rows, cols) = field.dim();
    let mut segments = Vec::new();
    if rows < 2 || cols < 2 {
        return segments;
    }

    for r in 0..rows - 1 {
        for c in 0..cols - 1 {
            // 逆时针: 左下, 右下, 右上, 左上.
            let corners = [
                field[(r, c)],
                field[(r, c + 1)],
                field[(r + 1, c + 1)],
                field[(r + 1, c)],
            ];
            if corners.iter().any(|v| v.is_nan()) {
                continue;
            }
            let case = corners
                .iter()
                .enumerate()
                .fold(0u8, |acc, (bit, v)| acc | (u8::from(*v >= level) << bit));
            cell_segments(case, (c as f32, r as f32), corners, level, &mut segments);
        }
    }
    segments
}

fn cell_segments(
    case: u8,
    (x, y): (f32, f32),
    [c00, c01, c11, c10]: [f32; 4],
    level: f32,
    out: &mut Vec<Segment>,
) {
    let south = || crossing((x, y), (x + 1.0, y), c00, c01, level);
    let east = || crossing((x + 1.0, y), (x + 1.0, y + 1.0), c01, c11, level);
    let north = || crossing((x, y + 1.0), (x + 1.0, y + 1.0), c10, c11, level);
    let west = || crossing((x, y), (x, y + 1.0), c00, c10, level);
    let mut push = |start, end| out.push(Segment { start, end });

    match case {
        1 | 14 => push(west(), south()),
        2 | 13 => push(south(), east()),
        3 | 12 => push(west(), east()),
        4 | 11 => push(east(), north()),
        5 => {
            push(west(), south());
            push(east(), north());
        }
        6 | 9 => push(south(), north()),
        7 | 8 => push(west(), north()),
        10 => {
            push(south(), east());
            push(west(), north());
        }
        // 0, 15: 整个单元在同一侧.
        _ => {}
    }
}

/// 端点取值分别为 `va`, `vb` 的网格边上, 值为 `level` 处的线性插值位置.
fn crossing(a: (f32, f32), b: (f32, f32), va: f32, vb: f32, level: f32) -> (f32, f32) {
    if (vb - va).abs() < 1e-6 {
        return ((a.0 + b.0) / 2.0, (a.1 + b.1) / 2.0);
    }
    let t = ((level - va) / (vb - va)).clamp(0.0, 1.0);
    (a.0 + t * (b.0 - a.0), a.1 + t * (b.1 - a.1))
}

#[cfg(test)]
mod tests {
    use super::{march_squares, straddles, Segment};
    use ndarray::{arr2, Array2};

    #[test]
    fn test_straddles() {
        let field = arr2(&[[0.0, 1.0], [0.5, 0.95]]);
        assert!(straddles(field.view(), 0.9));
        assert!(!straddles(field.view(), 1.0));
        assert!(!straddles(field.view(), 0.0));
    }

    #[test]
    fn test_vertical_edge() {
        // 左半为 0, 右半为 1, 等值线为 x = 1.5 的竖线.
        let field = Array2::from_shape_fn((4, 4), |(_, c)| if c < 2 { 0.0 } else { 1.0 });
        let segments = march_squares(field.view(), 0.5);
        assert_eq!(segments.len(), 3);
        for s in &segments {
            assert_eq!(s.start.0, 1.5);
            assert_eq!(s.end.0, 1.5);
            assert_eq!((s.end.1 - s.start.1).abs(), 1.0);
        }
    }

    #[test]
    fn test_single_peak_is_closed_diamond() {
        let mut field = Array2::<f32>::zeros((3, 3));
        field[(1, 1)] = 1.0;
        let segments = march_squares(field.view(), 0.5);
        assert_eq!(segments.len(), 4);
        assert!(segments.contains(&Segment {
            start: (1.0, 0.5),
            end: (0.5, 1.0),
        }) || segments.contains(&Segment {
            start: (0.5, 1.0),
            end: (1.0, 0.5),
        }));
    }

    #[test]
    fn test_degenerate_inputs() {
        let row = arr2(&[[0.0, 1.0, 2.0]]);
        assert!(march_squares(row.view(), 0.5).is_empty());

        let nan = arr2(&[[f32::NAN, 1.0], [0.0, 0.0]]);
        assert!(march_squares(nan.view(), 0.5).is_empty());
    }
}
