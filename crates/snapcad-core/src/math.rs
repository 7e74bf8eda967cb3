//! 数学基础
//!
//! 基于 nalgebra 的二维点/向量类型，以及捕捉和拾取共用的几何原语：
//! 距离、角度、弧角范围判断、点到线段的投影。

use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;

pub type Point2 = nalgebra::Point2<f64>;
pub type Vector2 = nalgebra::Vector2<f64>;

/// 浮点比较容差
pub const EPSILON: f64 = 1e-10;

/// 两点间的欧氏距离
#[inline]
pub fn distance(p1: &Point2, p2: &Point2) -> f64 {
    (p2 - p1).norm()
}

/// `center` 指向 `p` 的极角，范围 (-π, π]
#[inline]
pub fn angle_of(center: &Point2, p: &Point2) -> f64 {
    (p.y - center.y).atan2(p.x - center.x)
}

/// 将角度归一化到 [0, 2π)
pub fn normalize_angle(angle: f64) -> f64 {
    let a = angle.rem_euclid(TAU);
    // rem_euclid 对极小的负数会返回 TAU 本身
    if a >= TAU {
        0.0
    } else {
        a
    }
}

/// 判断角度是否落在弧的角度范围内
///
/// 三个角度先全部归一化到 [0, 2π)。若 `end < start`，说明弧跨越了 0 弧度，
/// 此时只要 `angle >= start` 或 `angle <= end` 即在范围内。
///
/// 所有圆弧相关的判断都必须通过这个函数，保证跨零弧的处理在各处一致。
pub fn angle_in_arc_range(angle: f64, start: f64, end: f64) -> bool {
    let a = normalize_angle(angle);
    let start = normalize_angle(start);
    let end = normalize_angle(end);

    if end < start {
        a >= start || a <= end
    } else {
        a >= start && a <= end
    }
}

/// 圆上指定角度处的点
#[inline]
pub fn point_on_circle(center: &Point2, radius: f64, angle: f64) -> Point2 {
    Point2::new(
        center.x + radius * angle.cos(),
        center.y + radius * angle.sin(),
    )
}

/// 点在线段上的垂直投影，参数 t 截断到 [0, 1]
///
/// 零长度线段返回起点。
pub fn project_point_on_segment(p: &Point2, seg_start: &Point2, seg_end: &Point2) -> Point2 {
    let v = seg_end - seg_start;
    let len_sq = v.norm_squared();
    if len_sq < EPSILON {
        return *seg_start;
    }
    let t = ((p - seg_start).dot(&v) / len_sq).clamp(0.0, 1.0);
    seg_start + v * t
}

/// 点在线段所在直线上的投影参数 t（未截断）
///
/// 零长度线段返回 `None`。
pub fn segment_parameter(p: &Point2, seg_start: &Point2, seg_end: &Point2) -> Option<f64> {
    let v = seg_end - seg_start;
    let len_sq = v.norm_squared();
    if len_sq < EPSILON {
        return None;
    }
    Some((p - seg_start).dot(&v) / len_sq)
}

/// 点到线段的最短距离
pub fn distance_to_segment(p: &Point2, seg_start: &Point2, seg_end: &Point2) -> f64 {
    distance(p, &project_point_on_segment(p, seg_start, seg_end))
}

/// 绕 `pivot` 旋转 `angle` 弧度
pub fn rotate_about(p: &Point2, pivot: &Point2, angle: f64) -> Point2 {
    let (sin, cos) = angle.sin_cos();
    let dx = p.x - pivot.x;
    let dy = p.y - pivot.y;
    Point2::new(
        pivot.x + dx * cos - dy * sin,
        pivot.y + dx * sin + dy * cos,
    )
}

/// 两点中点
#[inline]
pub fn midpoint(a: &Point2, b: &Point2) -> Point2 {
    Point2::new((a.x + b.x) / 2.0, (a.y + b.y) / 2.0)
}

/// 轴对齐包围盒
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox2 {
    pub min: Point2,
    pub max: Point2,
}

impl BoundingBox2 {
    pub fn new(min: Point2, max: Point2) -> Self {
        Self { min, max }
    }

    /// 由任意两个对角点构造（与拖拽方向无关）
    pub fn from_corners(a: Point2, b: Point2) -> Self {
        Self {
            min: Point2::new(a.x.min(b.x), a.y.min(b.y)),
            max: Point2::new(a.x.max(b.x), a.y.max(b.y)),
        }
    }

    /// 空包围盒（min > max）
    pub fn empty() -> Self {
        Self {
            min: Point2::new(f64::INFINITY, f64::INFINITY),
            max: Point2::new(f64::NEG_INFINITY, f64::NEG_INFINITY),
        }
    }

    pub fn from_points(points: impl IntoIterator<Item = Point2>) -> Self {
        let mut bbox = Self::empty();
        for p in points {
            bbox.expand_to_include(&p);
        }
        bbox
    }

    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y
    }

    pub fn expand_to_include(&mut self, p: &Point2) {
        self.min.x = self.min.x.min(p.x);
        self.min.y = self.min.y.min(p.y);
        self.max.x = self.max.x.max(p.x);
        self.max.y = self.max.y.max(p.y);
    }

    pub fn union(&self, other: &BoundingBox2) -> BoundingBox2 {
        if self.is_empty() {
            return *other;
        }
        if other.is_empty() {
            return *self;
        }
        BoundingBox2::new(
            Point2::new(self.min.x.min(other.min.x), self.min.y.min(other.min.y)),
            Point2::new(self.max.x.max(other.max.x), self.max.y.max(other.max.y)),
        )
    }

    /// 四周各扩大 `margin`
    pub fn expanded(&self, margin: f64) -> BoundingBox2 {
        BoundingBox2::new(
            Point2::new(self.min.x - margin, self.min.y - margin),
            Point2::new(self.max.x + margin, self.max.y + margin),
        )
    }

    /// 包含判断（含边界）
    pub fn contains(&self, p: &Point2) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }

    pub fn intersects(&self, other: &BoundingBox2) -> bool {
        !self.is_empty()
            && !other.is_empty()
            && self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
    }

    pub fn center(&self) -> Point2 {
        midpoint(&self.min, &self.max)
    }

    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }

    /// 四条边，按 下、右、上、左 的顺序
    pub fn edges(&self) -> [(Point2, Point2); 4] {
        let bl = self.min;
        let br = Point2::new(self.max.x, self.min.y);
        let tr = self.max;
        let tl = Point2::new(self.min.x, self.max.y);
        [(bl, br), (br, tr), (tr, tl), (tl, bl)]
    }
}
