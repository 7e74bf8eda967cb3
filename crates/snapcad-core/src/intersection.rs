//! 交点与切点计算
//!
//! 所有函数返回 0、1 或 2 个点：
//! - 平行/重合的线段、同心圆不返回交点
//! - 零长度线段、零半径圆视为退化，不返回交点
//!
//! 弧的角度过滤统一使用 [`Arc::contains_point_angle`]。

use crate::geometry::{Arc, Circle, Line, Shape};
use crate::math::{Point2, Vector2, EPSILON};

/// 线段-线段交点
///
/// 两个参数都必须落在 [0, 1] 内。
pub fn line_line(l1: &Line, l2: &Line) -> Option<Point2> {
    let d1 = l1.end - l1.start;
    let d2 = l2.end - l2.start;

    let cross = d1.x * d2.y - d1.y * d2.x;

    // 平行或退化
    if cross.abs() < EPSILON {
        return None;
    }

    let d = l2.start - l1.start;
    let t1 = (d.x * d2.y - d.y * d2.x) / cross;
    let t2 = (d.x * d1.y - d.y * d1.x) / cross;

    let range = -EPSILON..=1.0 + EPSILON;
    if range.contains(&t1) && range.contains(&t2) {
        Some(l1.start + d1 * t1)
    } else {
        None
    }
}

/// 线段-圆交点
pub fn line_circle(line: &Line, circle: &Circle) -> Vec<Point2> {
    if circle.is_degenerate() {
        return vec![];
    }

    let d = line.end - line.start;
    let f = line.start - circle.center;

    let a = d.dot(&d);
    if a < EPSILON {
        return vec![];
    }
    let b = 2.0 * f.dot(&d);
    let c = f.dot(&f) - circle.radius * circle.radius;

    let discriminant = b * b - 4.0 * a * c;
    if discriminant < 0.0 {
        return vec![];
    }

    let sqrt_disc = discriminant.sqrt();
    let roots = [(-b - sqrt_disc) / (2.0 * a), (-b + sqrt_disc) / (2.0 * a)];

    let mut intersections: Vec<Point2> = Vec::with_capacity(2);
    for t in roots {
        if !(-EPSILON..=1.0 + EPSILON).contains(&t) {
            continue;
        }
        let p = line.start + d * t;
        // 相切时两个根重合
        if intersections.iter().all(|q| (q - p).norm() > EPSILON) {
            intersections.push(p);
        }
    }
    intersections
}

/// 线段-圆弧交点：先求与整圆的交点，再按弧的角度范围过滤
pub fn line_arc(line: &Line, arc: &Arc) -> Vec<Point2> {
    line_circle(line, &arc.circle())
        .into_iter()
        .filter(|p| arc.contains_point_angle(p))
        .collect()
}

/// 圆-圆交点
pub fn circle_circle(c1: &Circle, c2: &Circle) -> Vec<Point2> {
    if c1.is_degenerate() || c2.is_degenerate() {
        return vec![];
    }

    let delta = c2.center - c1.center;
    let d = delta.norm();

    // 相离、内含、同心
    if d > c1.radius + c2.radius || d < (c1.radius - c2.radius).abs() || d < EPSILON {
        return vec![];
    }

    // 圆心连线上根轴的位置与半弦长
    let a = (c1.radius * c1.radius - c2.radius * c2.radius + d * d) / (2.0 * d);
    let h = (c1.radius * c1.radius - a * a).max(0.0).sqrt();

    let dir = delta / d;
    let p = c1.center + dir * a;
    let perp = Vector2::new(-dir.y, dir.x);

    if h < EPSILON {
        // 相切
        vec![p]
    } else {
        vec![p + perp * h, p - perp * h]
    }
}

/// 圆-圆弧交点
pub fn circle_arc(circle: &Circle, arc: &Arc) -> Vec<Point2> {
    circle_circle(circle, &arc.circle())
        .into_iter()
        .filter(|p| arc.contains_point_angle(p))
        .collect()
}

/// 圆弧-圆弧交点：两段弧的角度范围都要满足
pub fn arc_arc(a1: &Arc, a2: &Arc) -> Vec<Point2> {
    circle_circle(&a1.circle(), &a2.circle())
        .into_iter()
        .filter(|p| a1.contains_point_angle(p) && a2.contains_point_angle(p))
        .collect()
}

/// 从圆外一点到圆的两个切点
///
/// 点在圆内或圆上时没有切点。
pub fn tangent_points_from_point(point: &Point2, circle: &Circle) -> Vec<Point2> {
    if circle.is_degenerate() {
        return vec![];
    }

    let to_point = point - circle.center;
    let d = to_point.norm();
    if d <= circle.radius || d < EPSILON {
        return vec![];
    }

    let r = circle.radius;
    // 切线长
    let tangent_len = (d * d - r * r).sqrt();
    let dir = to_point / d;
    let perp = Vector2::new(-dir.y, dir.x);

    // 切点在圆心连线上的投影距离与垂直偏移
    let along = r * r / d;
    let offset = r * tangent_len / d;
    let base = circle.center + dir * along;

    vec![base + perp * offset, base - perp * offset]
}

fn orientation(a: &Point2, b: &Point2, c: &Point2) -> i8 {
    let cross = (b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x);
    if cross.abs() < EPSILON {
        0
    } else if cross > 0.0 {
        1
    } else {
        -1
    }
}

/// 共线前提下，`q` 是否在线段 `p-r` 的范围内
fn on_segment(p: &Point2, q: &Point2, r: &Point2) -> bool {
    q.x <= p.x.max(r.x) + EPSILON
        && q.x >= p.x.min(r.x) - EPSILON
        && q.y <= p.y.max(r.y) + EPSILON
        && q.y >= p.y.min(r.y) - EPSILON
}

/// 两条线段是否相交（含端点接触和共线重叠）
pub fn segments_intersect(p1: &Point2, p2: &Point2, q1: &Point2, q2: &Point2) -> bool {
    let o1 = orientation(p1, p2, q1);
    let o2 = orientation(p1, p2, q2);
    let o3 = orientation(q1, q2, p1);
    let o4 = orientation(q1, q2, p2);

    if o1 != o2 && o3 != o4 {
        return true;
    }

    (o1 == 0 && on_segment(p1, q1, p2))
        || (o2 == 0 && on_segment(p1, q2, p2))
        || (o3 == 0 && on_segment(q1, p1, q2))
        || (o4 == 0 && on_segment(q1, p2, q2))
}

/// 参与交点计算的基本曲线
#[derive(Debug, Clone, PartialEq)]
pub enum Primitive {
    Segment(Line),
    Circle(Circle),
    Arc(Arc),
}

/// 将图形分解为基本曲线，退化部分被丢弃
///
/// 多段线、矩形、正多边形分解为各自的边；其余图形不参与交点捕捉。
pub fn primitives(shape: &Shape) -> Vec<Primitive> {
    let segments = |iter: &mut dyn Iterator<Item = (Point2, Point2)>| -> Vec<Primitive> {
        iter.map(|(a, b)| Line::new(a, b))
            .filter(|l| !l.is_degenerate())
            .map(Primitive::Segment)
            .collect()
    };

    match shape {
        Shape::Line(l) if !l.is_degenerate() => vec![Primitive::Segment(l.clone())],
        Shape::Circle(c) if !c.is_degenerate() => vec![Primitive::Circle(c.clone())],
        Shape::Arc(a) if !a.is_degenerate() => vec![Primitive::Arc(a.clone())],
        Shape::Polyline(pl) => segments(&mut pl.segments()),
        Shape::Rectangle(r) => segments(&mut r.segments()),
        Shape::Polygon(p) => {
            let vertices = p.vertices();
            let n = vertices.len();
            segments(&mut (0..n).map(|i| (vertices[i], vertices[(i + 1) % n])))
        }
        _ => vec![],
    }
}

/// 两条基本曲线的交点
pub fn primitive_intersections(a: &Primitive, b: &Primitive) -> Vec<Point2> {
    match (a, b) {
        (Primitive::Segment(l1), Primitive::Segment(l2)) => line_line(l1, l2).into_iter().collect(),
        (Primitive::Segment(line), Primitive::Circle(circle))
        | (Primitive::Circle(circle), Primitive::Segment(line)) => line_circle(line, circle),
        (Primitive::Segment(line), Primitive::Arc(arc))
        | (Primitive::Arc(arc), Primitive::Segment(line)) => line_arc(line, arc),
        (Primitive::Circle(c1), Primitive::Circle(c2)) => circle_circle(c1, c2),
        (Primitive::Circle(circle), Primitive::Arc(arc))
        | (Primitive::Arc(arc), Primitive::Circle(circle)) => circle_arc(circle, arc),
        (Primitive::Arc(a1), Primitive::Arc(a2)) => arc_arc(a1, a2),
    }
}

/// 两个图形之间的全部交点
pub fn shape_intersections(a: &Shape, b: &Shape) -> Vec<Point2> {
    let pa = primitives(a);
    if pa.is_empty() {
        return vec![];
    }
    let pb = primitives(b);

    let mut points = Vec::new();
    for x in &pa {
        for y in &pb {
            points.extend(primitive_intersections(x, y));
        }
    }
    points
}
