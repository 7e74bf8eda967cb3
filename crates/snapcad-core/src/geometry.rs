//! 几何图元定义
//!
//! 支持的图元：
//! - 线段 (Line)
//! - 圆 (Circle)
//! - 圆弧 (Arc)
//! - 多段线 (Polyline)
//! - 矩形 (Rectangle)
//! - 椭圆 (Ellipse)
//! - 正多边形 (Polygon)
//! - 点 (Point)
//! - 文本 (Text)
//! - 样条曲线 (Spline)
//! - 尺寸标注 (Dimension)
//! - 块 (Block)
//!
//! `Shape` 以 `"type"` 字段区分种类，未知种类反序列化为 `Shape::Unknown`，
//! 所有捕捉和拾取逻辑对它一律返回"无匹配"。

use crate::error::ShapeError;
use crate::math::{
    angle_in_arc_range, angle_of, distance, midpoint, normalize_angle, point_on_circle,
    rotate_about, BoundingBox2, Point2, Vector2, EPSILON,
};
use serde::{Deserialize, Serialize};
use std::f64::consts::{FRAC_PI_2, FRAC_PI_8, PI, TAU};

/// 圆弧/圆在框选时的采样角步长
pub const ARC_SAMPLE_STEP: f64 = FRAC_PI_8;
/// 椭圆在框选时的采样点数
pub const ELLIPSE_SAMPLES: usize = 24;
/// 样条每个控制区间的线性分段数
pub const SPLINE_STEPS_PER_SPAN: usize = 10;
/// 正多边形的最大边数
pub const MAX_POLYGON_SIDES: u32 = 1024;

/// 几何类型
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Shape {
    Line(Line),
    Circle(Circle),
    Arc(Arc),
    Polyline(Polyline),
    Rectangle(Rectangle),
    Ellipse(Ellipse),
    Polygon(Polygon),
    Point(PointObject),
    Text(Text),
    Spline(Spline),
    Dimension(Dimension),
    Block(Block),
    /// 无法识别的类型
    #[serde(other)]
    Unknown,
}

impl Shape {
    /// 获取几何的类型名称
    pub fn type_name(&self) -> &'static str {
        match self {
            Shape::Line(_) => "line",
            Shape::Circle(_) => "circle",
            Shape::Arc(_) => "arc",
            Shape::Polyline(_) => "polyline",
            Shape::Rectangle(_) => "rectangle",
            Shape::Ellipse(_) => "ellipse",
            Shape::Polygon(_) => "polygon",
            Shape::Point(_) => "point",
            Shape::Text(_) => "text",
            Shape::Spline(_) => "spline",
            Shape::Dimension(_) => "dimension",
            Shape::Block(_) => "block",
            Shape::Unknown => "unknown",
        }
    }

    /// 获取几何的包围盒，未知类型返回空包围盒
    pub fn bounding_box(&self) -> BoundingBox2 {
        match self {
            Shape::Line(l) => l.bounding_box(),
            Shape::Circle(c) => c.bounding_box(),
            Shape::Arc(a) => a.bounding_box(),
            Shape::Polyline(pl) => BoundingBox2::from_points(pl.points.iter().copied()),
            Shape::Rectangle(r) => r.bounds(),
            Shape::Ellipse(e) => e.bounding_box(),
            Shape::Polygon(p) => BoundingBox2::from_points(p.vertices()),
            Shape::Point(p) => BoundingBox2::new(p.position, p.position),
            Shape::Text(t) => BoundingBox2::from_points(t.corners()),
            Shape::Spline(s) => BoundingBox2::from_points(s.sample_points()),
            Shape::Dimension(d) => d.bounding_box(),
            Shape::Block(b) => b
                .world_elements()
                .iter()
                .fold(BoundingBox2::new(b.position, b.position), |acc, e| {
                    acc.union(&e.bounding_box())
                }),
            Shape::Unknown => BoundingBox2::empty(),
        }
    }

    /// 平移后的副本
    pub fn translated(&self, offset: Vector2) -> Shape {
        match self {
            Shape::Line(l) => Shape::Line(Line::new(l.start + offset, l.end + offset)),
            Shape::Circle(c) => Shape::Circle(Circle::new(c.center + offset, c.radius)),
            Shape::Arc(a) => Shape::Arc(Arc::new(
                a.center + offset,
                a.radius,
                a.start_angle,
                a.end_angle,
            )),
            Shape::Polyline(pl) => Shape::Polyline(Polyline::new(
                pl.points.iter().map(|p| p + offset).collect(),
                pl.closed,
            )),
            Shape::Rectangle(r) => {
                Shape::Rectangle(Rectangle::new(r.corner1 + offset, r.corner2 + offset))
            }
            Shape::Ellipse(e) => Shape::Ellipse(Ellipse {
                center: e.center + offset,
                ..e.clone()
            }),
            Shape::Polygon(p) => Shape::Polygon(Polygon {
                center: p.center + offset,
                ..p.clone()
            }),
            Shape::Point(p) => Shape::Point(PointObject::new(p.position + offset)),
            Shape::Text(t) => Shape::Text(Text {
                position: t.position + offset,
                ..t.clone()
            }),
            Shape::Spline(s) => Shape::Spline(Spline::new(
                s.points.iter().map(|p| p + offset).collect(),
                s.tension,
            )),
            Shape::Dimension(d) => Shape::Dimension(Dimension {
                start: d.start + offset,
                end: d.end + offset,
                ..d.clone()
            }),
            Shape::Block(b) => Shape::Block(Block {
                position: b.position + offset,
                elements: b.elements.clone(),
            }),
            Shape::Unknown => Shape::Unknown,
        }
    }

    /// 边界的折线近似，用于框选
    ///
    /// 一个图形可能由多段组成（块、标注），因此返回多条轮廓。
    pub fn outlines(&self) -> Vec<Outline> {
        match self {
            Shape::Line(l) => vec![Outline::open(vec![l.start, l.end])],
            Shape::Circle(c) => vec![Outline::closed(c.sample_points())],
            Shape::Arc(a) => vec![Outline::open(a.sample_points())],
            Shape::Polyline(pl) => vec![Outline {
                points: pl.points.clone(),
                closed: pl.closed,
            }],
            Shape::Rectangle(r) => vec![Outline::closed(r.corners().to_vec())],
            Shape::Ellipse(e) => vec![Outline::closed(e.sample_points(ELLIPSE_SAMPLES))],
            Shape::Polygon(p) => vec![Outline::closed(p.vertices())],
            Shape::Point(p) => vec![Outline::open(vec![p.position])],
            Shape::Text(t) => vec![Outline::closed(t.corners().to_vec())],
            Shape::Spline(s) => vec![Outline::open(s.sample_points())],
            Shape::Dimension(d) => {
                let (a, b) = d.dimension_line();
                vec![
                    Outline::open(vec![d.start, a, b, d.end]),
                    Outline::closed(d.label().corners().to_vec()),
                ]
            }
            Shape::Block(b) => {
                let mut outlines: Vec<Outline> = b
                    .world_elements()
                    .iter()
                    .flat_map(|e| e.outlines())
                    .collect();
                outlines.push(Outline::open(vec![b.position]));
                outlines
            }
            Shape::Unknown => vec![],
        }
    }

    /// 校验几何参数
    ///
    /// 由数据层在载入快照时调用；捕捉和拾取引擎假定输入已经合法。
    pub fn validate(&self) -> Result<(), ShapeError> {
        let name = self.type_name();
        let finite = |points: &[Point2], scalars: &[f64]| -> Result<(), ShapeError> {
            let ok = points.iter().all(|p| p.x.is_finite() && p.y.is_finite())
                && scalars.iter().all(|v| v.is_finite());
            if ok {
                Ok(())
            } else {
                Err(ShapeError::NonFinite { shape: name })
            }
        };
        let radius = |r: f64| -> Result<(), ShapeError> {
            if r < 0.0 {
                Err(ShapeError::NegativeRadius { shape: name, radius: r })
            } else {
                Ok(())
            }
        };
        let min_points = |count: usize, min: usize| -> Result<(), ShapeError> {
            if count < min {
                Err(ShapeError::TooFewPoints { shape: name, count, min })
            } else {
                Ok(())
            }
        };

        match self {
            Shape::Line(l) => finite(&[l.start, l.end], &[]),
            Shape::Circle(c) => {
                finite(&[c.center], &[c.radius])?;
                radius(c.radius)
            }
            Shape::Arc(a) => {
                finite(&[a.center], &[a.radius, a.start_angle, a.end_angle])?;
                radius(a.radius)
            }
            Shape::Polyline(pl) => {
                finite(&pl.points, &[])?;
                min_points(pl.points.len(), 2)
            }
            Shape::Rectangle(r) => finite(&[r.corner1, r.corner2], &[]),
            Shape::Ellipse(e) => {
                finite(&[e.center], &[e.radius_x, e.radius_y, e.rotation])?;
                radius(e.radius_x)?;
                radius(e.radius_y)
            }
            Shape::Polygon(p) => {
                finite(&[p.center], &[p.radius])?;
                radius(p.radius)?;
                if p.sides < 3 {
                    return Err(ShapeError::TooFewSides(p.sides));
                }
                if p.sides > MAX_POLYGON_SIDES {
                    return Err(ShapeError::TooManySides {
                        sides: p.sides,
                        max: MAX_POLYGON_SIDES,
                    });
                }
                Ok(())
            }
            Shape::Point(p) => finite(&[p.position], &[]),
            Shape::Text(t) => finite(&[t.position], &[t.font_size, t.rotation]),
            Shape::Spline(s) => {
                finite(&s.points, &[s.tension])?;
                min_points(s.points.len(), 2)
            }
            Shape::Dimension(d) => finite(&[d.start, d.end], &[d.offset, d.text_height]),
            Shape::Block(b) => {
                finite(&[b.position], &[])?;
                b.elements.iter().try_for_each(Shape::validate)
            }
            Shape::Unknown => Ok(()),
        }
    }
}

/// 折线轮廓
#[derive(Debug, Clone, PartialEq)]
pub struct Outline {
    pub points: Vec<Point2>,
    pub closed: bool,
}

impl Outline {
    pub fn open(points: Vec<Point2>) -> Self {
        Self { points, closed: false }
    }

    pub fn closed(points: Vec<Point2>) -> Self {
        Self { points, closed: true }
    }

    /// 依次返回各段，闭合轮廓包含首尾相连的闭合段
    pub fn segments(&self) -> impl Iterator<Item = (Point2, Point2)> + '_ {
        segments_of(&self.points, self.closed)
    }
}

/// 顶点序列的线段迭代器
pub(crate) fn segments_of(
    points: &[Point2],
    closed: bool,
) -> impl Iterator<Item = (Point2, Point2)> + '_ {
    let n = points.len();
    let count = match n {
        0 | 1 => 0,
        2 => 1,
        _ if closed => n,
        _ => n - 1,
    };
    (0..count).map(move |i| (points[i], points[(i + 1) % n]))
}

/// 线段
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Line {
    pub start: Point2,
    pub end: Point2,
}

impl Line {
    pub fn new(start: Point2, end: Point2) -> Self {
        Self { start, end }
    }

    /// 计算线段长度
    pub fn length(&self) -> f64 {
        (self.end - self.start).norm()
    }

    /// 零长度线段
    pub fn is_degenerate(&self) -> bool {
        self.length() < EPSILON
    }

    /// 单位方向向量，零长度线段返回 `None`
    pub fn direction(&self) -> Option<Vector2> {
        let len = self.length();
        (len >= EPSILON).then(|| (self.end - self.start) / len)
    }

    /// 计算线段中点
    pub fn midpoint(&self) -> Point2 {
        midpoint(&self.start, &self.end)
    }

    pub fn bounding_box(&self) -> BoundingBox2 {
        BoundingBox2::from_points([self.start, self.end])
    }
}

/// 圆
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Circle {
    pub center: Point2,
    pub radius: f64,
}

impl Circle {
    pub fn new(center: Point2, radius: f64) -> Self {
        Self { center, radius }
    }

    pub fn is_degenerate(&self) -> bool {
        self.radius < EPSILON
    }

    /// 获取圆上指定角度的点
    pub fn point_at_angle(&self, angle: f64) -> Point2 {
        point_on_circle(&self.center, self.radius, angle)
    }

    /// 0°, 90°, 180°, 270° 四个象限点
    pub fn quadrant_points(&self) -> [Point2; 4] {
        [0.0, FRAC_PI_2, PI, 3.0 * FRAC_PI_2].map(|a| self.point_at_angle(a))
    }

    /// 按 π/8 步长采样一周
    pub fn sample_points(&self) -> Vec<Point2> {
        let n = (TAU / ARC_SAMPLE_STEP).round() as usize;
        (0..n)
            .map(|i| self.point_at_angle(i as f64 * ARC_SAMPLE_STEP))
            .collect()
    }

    pub fn bounding_box(&self) -> BoundingBox2 {
        BoundingBox2::new(
            Point2::new(self.center.x - self.radius, self.center.y - self.radius),
            Point2::new(self.center.x + self.radius, self.center.y + self.radius),
        )
    }
}

/// 圆弧
///
/// 角度不做归一化存储，从 `start_angle` 扫到 `end_angle`；
/// 归一化后 `end < start` 表示跨越 0 弧度。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Arc {
    pub center: Point2,
    pub radius: f64,
    /// 起始角度（弧度）
    pub start_angle: f64,
    /// 终止角度（弧度）
    pub end_angle: f64,
}

impl Arc {
    pub fn new(center: Point2, radius: f64, start_angle: f64, end_angle: f64) -> Self {
        Self {
            center,
            radius,
            start_angle,
            end_angle,
        }
    }

    pub fn is_degenerate(&self) -> bool {
        self.radius < EPSILON
    }

    /// 所在的整圆
    pub fn circle(&self) -> Circle {
        Circle::new(self.center, self.radius)
    }

    /// 扫过的角度，范围 [0, 2π)
    pub fn sweep_angle(&self) -> f64 {
        let start = normalize_angle(self.start_angle);
        let end = normalize_angle(self.end_angle);
        if end < start {
            end + TAU - start
        } else {
            end - start
        }
    }

    /// 获取起点
    pub fn start_point(&self) -> Point2 {
        point_on_circle(&self.center, self.radius, self.start_angle)
    }

    /// 获取终点
    pub fn end_point(&self) -> Point2 {
        point_on_circle(&self.center, self.radius, self.end_angle)
    }

    /// 弧中点的角度
    pub fn mid_angle(&self) -> f64 {
        let start = normalize_angle(self.start_angle);
        let end = normalize_angle(self.end_angle);
        if end < start {
            normalize_angle((start + end + TAU) / 2.0)
        } else {
            (start + end) / 2.0
        }
    }

    pub fn midpoint(&self) -> Point2 {
        point_on_circle(&self.center, self.radius, self.mid_angle())
    }

    /// 检查角度是否在弧的范围内
    pub fn contains_angle(&self, angle: f64) -> bool {
        angle_in_arc_range(angle, self.start_angle, self.end_angle)
    }

    /// 检查点的极角是否在弧的范围内（不检查半径）
    pub fn contains_point_angle(&self, point: &Point2) -> bool {
        self.contains_angle(angle_of(&self.center, point))
    }

    /// 从起点到终点按 π/8 步长采样，总是包含终点
    pub fn sample_points(&self) -> Vec<Point2> {
        let start = normalize_angle(self.start_angle);
        let sweep = self.sweep_angle();
        let steps = (sweep / ARC_SAMPLE_STEP - EPSILON).ceil().max(1.0) as usize;
        (0..=steps)
            .map(|i| {
                let a = start + sweep * i as f64 / steps as f64;
                point_on_circle(&self.center, self.radius, a)
            })
            .collect()
    }

    pub fn bounding_box(&self) -> BoundingBox2 {
        let mut bbox = BoundingBox2::from_points([self.start_point(), self.end_point()]);

        // 检查象限点
        for angle in [0.0, FRAC_PI_2, PI, 3.0 * FRAC_PI_2] {
            if self.contains_angle(angle) {
                bbox.expand_to_include(&point_on_circle(&self.center, self.radius, angle));
            }
        }

        bbox
    }
}

/// 多段线
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Polyline {
    pub points: Vec<Point2>,
    /// 是否闭合
    #[serde(default)]
    pub closed: bool,
}

impl Polyline {
    pub fn new(points: Vec<Point2>, closed: bool) -> Self {
        Self { points, closed }
    }

    /// 线段数量（闭合时包含闭合段）
    pub fn segment_count(&self) -> usize {
        self.segments().count()
    }

    pub fn segments(&self) -> impl Iterator<Item = (Point2, Point2)> + '_ {
        segments_of(&self.points, self.closed)
    }

    /// 爆炸为独立的线段
    pub fn explode(&self) -> Vec<Line> {
        self.segments().map(|(a, b)| Line::new(a, b)).collect()
    }
}

/// 轴对齐矩形，两个对角点顺序任意
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rectangle {
    pub corner1: Point2,
    pub corner2: Point2,
}

impl Rectangle {
    pub fn new(corner1: Point2, corner2: Point2) -> Self {
        Self { corner1, corner2 }
    }

    pub fn bounds(&self) -> BoundingBox2 {
        BoundingBox2::from_corners(self.corner1, self.corner2)
    }

    /// 四个角点，逆时针
    pub fn corners(&self) -> [Point2; 4] {
        let b = self.bounds();
        [
            b.min,
            Point2::new(b.max.x, b.min.y),
            b.max,
            Point2::new(b.min.x, b.max.y),
        ]
    }

    pub fn segments(&self) -> impl Iterator<Item = (Point2, Point2)> {
        let c = self.corners();
        (0..4).map(move |i| (c[i], c[(i + 1) % 4]))
    }
}

/// 椭圆
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ellipse {
    pub center: Point2,
    pub radius_x: f64,
    pub radius_y: f64,
    /// 旋转角度（弧度）
    #[serde(default)]
    pub rotation: f64,
}

impl Ellipse {
    pub fn new(center: Point2, radius_x: f64, radius_y: f64, rotation: f64) -> Self {
        Self {
            center,
            radius_x,
            radius_y,
            rotation,
        }
    }

    pub fn is_degenerate(&self) -> bool {
        self.radius_x < EPSILON || self.radius_y < EPSILON
    }

    /// 参数方程上的点（已计入旋转）
    pub fn point_at(&self, t: f64) -> Point2 {
        let local = Point2::new(
            self.center.x + self.radius_x * t.cos(),
            self.center.y + self.radius_y * t.sin(),
        );
        rotate_about(&local, &self.center, self.rotation)
    }

    /// 长短轴端点，对应参数 0, π/2, π, 3π/2
    pub fn quadrant_points(&self) -> [Point2; 4] {
        [0.0, FRAC_PI_2, PI, 3.0 * FRAC_PI_2].map(|t| self.point_at(t))
    }

    pub fn sample_points(&self, count: usize) -> Vec<Point2> {
        (0..count)
            .map(|i| self.point_at(TAU * i as f64 / count as f64))
            .collect()
    }

    pub fn bounding_box(&self) -> BoundingBox2 {
        let (sin, cos) = self.rotation.sin_cos();
        let half_w = ((self.radius_x * cos).powi(2) + (self.radius_y * sin).powi(2)).sqrt();
        let half_h = ((self.radius_x * sin).powi(2) + (self.radius_y * cos).powi(2)).sqrt();
        BoundingBox2::new(
            Point2::new(self.center.x - half_w, self.center.y - half_h),
            Point2::new(self.center.x + half_w, self.center.y + half_h),
        )
    }
}

/// 正多边形，顶点按需计算
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Polygon {
    pub center: Point2,
    /// 外接圆半径
    pub radius: f64,
    pub sides: u32,
}

impl Polygon {
    pub fn new(center: Point2, radius: f64, sides: u32) -> Self {
        Self {
            center,
            radius,
            sides,
        }
    }

    /// 顶点列表，第一个顶点位于 -π/2 方向；边数不足 3 时为空
    pub fn vertices(&self) -> Vec<Point2> {
        if self.sides < 3 {
            return vec![];
        }
        let n = self.sides as f64;
        (0..self.sides)
            .map(|i| {
                let angle = TAU * i as f64 / n - FRAC_PI_2;
                point_on_circle(&self.center, self.radius, angle)
            })
            .collect()
    }
}

/// 点对象
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointObject {
    pub position: Point2,
}

impl PointObject {
    pub fn new(position: Point2) -> Self {
        Self { position }
    }
}

/// 文本
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Text {
    /// 插入点（左下角）
    pub position: Point2,
    /// 文本内容
    pub content: String,
    /// 字号（世界单位）
    #[serde(default = "Text::default_font_size")]
    pub font_size: f64,
    /// 旋转角度（弧度）
    #[serde(default)]
    pub rotation: f64,
}

impl Text {
    /// 创建新的文本对象
    pub fn new(position: Point2, content: impl Into<String>, font_size: f64) -> Self {
        Self {
            position,
            content: content.into(),
            font_size,
            rotation: 0.0,
        }
    }

    fn default_font_size() -> f64 {
        12.0
    }

    /// 设置旋转角度
    pub fn with_rotation(mut self, rotation: f64) -> Self {
        self.rotation = rotation;
        self
    }

    /// 估算文本宽度：CJK字符按字号计，其余按字号的0.6倍计
    pub fn estimated_width(&self) -> f64 {
        estimate_text_width(&self.content, self.font_size)
    }

    /// 文本框四角（已计入旋转），从插入点开始逆时针
    pub fn corners(&self) -> [Point2; 4] {
        let w = self.estimated_width();
        let h = self.font_size;
        let p = self.position;
        [
            p,
            Point2::new(p.x + w, p.y),
            Point2::new(p.x + w, p.y + h),
            Point2::new(p.x, p.y + h),
        ]
        .map(|c| rotate_about(&c, &p, self.rotation))
    }

    /// 点是否在（扩大 `tolerance` 后的）文本框内
    pub fn contains_point(&self, point: &Point2, tolerance: f64) -> bool {
        // 反向旋转到文本的局部坐标系
        let local = rotate_about(point, &self.position, -self.rotation);
        let dx = local.x - self.position.x;
        let dy = local.y - self.position.y;
        dx >= -tolerance
            && dx <= self.estimated_width() + tolerance
            && dy >= -tolerance
            && dy <= self.font_size + tolerance
    }
}

pub(crate) fn estimate_text_width(content: &str, font_size: f64) -> f64 {
    let char_count = content.chars().count();
    let cjk_count = content.chars().filter(|c| is_cjk(*c)).count();
    let other_count = char_count - cjk_count;
    cjk_count as f64 * font_size + other_count as f64 * font_size * 0.6
}

fn is_cjk(c: char) -> bool {
    matches!(c, '\u{4E00}'..='\u{9FFF}' | '\u{3400}'..='\u{4DBF}' | '\u{F900}'..='\u{FAFF}')
}

/// 基数样条（控制点 + 张力）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Spline {
    pub points: Vec<Point2>,
    #[serde(default = "Spline::default_tension")]
    pub tension: f64,
}

impl Spline {
    pub fn new(points: Vec<Point2>, tension: f64) -> Self {
        Self { points, tension }
    }

    fn default_tension() -> f64 {
        0.5
    }

    /// 每个控制区间按固定步数线性化
    ///
    /// 控制点 i 处的切向量为 `tension * (p[i+1] - p[i-1])`，两端取自身。
    pub fn sample_points(&self) -> Vec<Point2> {
        let pts = &self.points;
        if pts.len() < 3 {
            return pts.clone();
        }

        let last = pts.len() - 1;
        let tangent = |i: usize| -> Vector2 {
            let prev = pts[i.saturating_sub(1)];
            let next = pts[(i + 1).min(last)];
            (next - prev) * self.tension
        };

        let mut out = Vec::with_capacity(last * SPLINE_STEPS_PER_SPAN + 1);
        out.push(pts[0]);
        for i in 0..last {
            let (p1, p2) = (pts[i].coords, pts[i + 1].coords);
            let (m1, m2) = (tangent(i), tangent(i + 1));
            for step in 1..=SPLINE_STEPS_PER_SPAN {
                let s = step as f64 / SPLINE_STEPS_PER_SPAN as f64;
                let s2 = s * s;
                let s3 = s2 * s;
                let h00 = 2.0 * s3 - 3.0 * s2 + 1.0;
                let h10 = s3 - 2.0 * s2 + s;
                let h01 = -2.0 * s3 + 3.0 * s2;
                let h11 = s3 - s2;
                out.push(Point2::from(p1 * h00 + m1 * h10 + p2 * h01 + m2 * h11));
            }
        }
        out
    }
}

/// 对齐尺寸标注
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dimension {
    /// 第一个测量点
    pub start: Point2,
    /// 第二个测量点
    pub end: Point2,
    /// 标注线相对测量线的偏移（沿左法线方向）
    #[serde(default)]
    pub offset: f64,
    /// 文本高度
    #[serde(default = "Dimension::default_text_height")]
    pub text_height: f64,
    /// 覆盖文本（为空时显示测量值）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_override: Option<String>,
}

impl Dimension {
    pub fn new(start: Point2, end: Point2, offset: f64) -> Self {
        Self {
            start,
            end,
            offset,
            text_height: Self::default_text_height(),
            text_override: None,
        }
    }

    fn default_text_height() -> f64 {
        10.0
    }

    /// 测量值
    pub fn measurement(&self) -> f64 {
        distance(&self.start, &self.end)
    }

    /// 显示的文本
    pub fn display_text(&self) -> String {
        match &self.text_override {
            Some(text) => text.clone(),
            None => format!("{:.2}", self.measurement()),
        }
    }

    /// 测量线的左法线，零长度时取 +Y
    fn normal(&self) -> Vector2 {
        let d = self.end - self.start;
        let len = d.norm();
        if len < EPSILON {
            Vector2::new(0.0, 1.0)
        } else {
            Vector2::new(-d.y / len, d.x / len)
        }
    }

    /// 标注线两端
    pub fn dimension_line(&self) -> (Point2, Point2) {
        let shift = self.normal() * self.offset;
        (self.start + shift, self.end + shift)
    }

    /// 标注文本，居中放在标注线外侧并随标注线旋转
    pub fn label(&self) -> Text {
        let (a, b) = self.dimension_line();
        let side = if self.offset < 0.0 { -1.0 } else { 1.0 };
        let rotation = angle_of(&self.start, &self.end);
        let content = self.display_text();
        let width = estimate_text_width(&content, self.text_height);

        // 标注线外侧 0.8 倍字高处为文本中心
        let center = midpoint(&a, &b) + self.normal() * (side * self.text_height * 0.8);
        let half = Point2::new(center.x - width / 2.0, center.y - self.text_height / 2.0);
        let position = rotate_about(&half, &center, rotation);

        Text {
            position,
            content,
            font_size: self.text_height,
            rotation,
        }
    }

    pub fn bounding_box(&self) -> BoundingBox2 {
        let (a, b) = self.dimension_line();
        BoundingBox2::from_points([self.start, self.end, a, b])
            .union(&BoundingBox2::from_points(self.label().corners()))
    }
}

/// 块引用：元素以块内局部坐标存储，按插入点平移
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub position: Point2,
    #[serde(default)]
    pub elements: Vec<Shape>,
}

impl Block {
    pub fn new(position: Point2, elements: Vec<Shape>) -> Self {
        Self { position, elements }
    }

    /// 平移到世界坐标后的元素
    pub fn world_elements(&self) -> Vec<Shape> {
        self.elements
            .iter()
            .map(|e| e.translated(self.position.coords))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_length() {
        let line = Line::new(Point2::new(0.0, 0.0), Point2::new(3.0, 4.0));
        assert!((line.length() - 5.0).abs() < EPSILON);
        assert!(Line::new(Point2::origin(), Point2::origin()).direction().is_none());
    }

    #[test]
    fn test_arc_midpoint_wraps() {
        // 从 315° 扫到 45°，中点应在 0°
        let arc = Arc::new(Point2::origin(), 2.0, 7.0 * PI / 4.0, PI / 4.0);
        let mid = arc.midpoint();
        assert!((mid.x - 2.0).abs() < 1e-9);
        assert!(mid.y.abs() < 1e-9);
        assert!((arc.sweep_angle() - PI / 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_arc_samples_include_endpoints() {
        let arc = Arc::new(Point2::origin(), 1.0, 0.0, PI);
        let samples = arc.sample_points();
        assert_eq!(samples.len(), 9);
        assert!((samples[0] - arc.start_point()).norm() < 1e-12);
        assert!((samples[8] - arc.end_point()).norm() < 1e-12);
    }

    #[test]
    fn test_polyline_segments_closed() {
        let pl = Polyline::new(
            vec![
                Point2::new(0.0, 0.0),
                Point2::new(10.0, 0.0),
                Point2::new(10.0, 10.0),
            ],
            true,
        );
        assert_eq!(pl.segment_count(), 3);
        let last = pl.segments().last().unwrap();
        assert_eq!(last, (Point2::new(10.0, 10.0), Point2::new(0.0, 0.0)));

        let open = Polyline::new(pl.points.clone(), false);
        assert_eq!(open.explode().len(), 2);
    }

    #[test]
    fn test_polygon_vertices() {
        let square = Polygon::new(Point2::origin(), 1.0, 4);
        let v = square.vertices();
        assert_eq!(v.len(), 4);
        // 第一个顶点在正下方 (-π/2)
        assert!(v[0].x.abs() < 1e-12 && (v[0].y + 1.0).abs() < 1e-12);
        assert!(Polygon::new(Point2::origin(), 1.0, 2).vertices().is_empty());
    }

    #[test]
    fn test_ellipse_quadrants_rotated() {
        let e = Ellipse::new(Point2::new(1.0, 1.0), 4.0, 2.0, PI / 2.0);
        let q = e.quadrant_points();
        // 旋转 90° 后长轴沿 Y
        assert!((q[0].x - 1.0).abs() < 1e-12 && (q[0].y - 5.0).abs() < 1e-12);
        assert!((q[1].x + 1.0).abs() < 1e-12 && (q[1].y - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_spline_passes_through_control_points() {
        let s = Spline::new(
            vec![
                Point2::new(0.0, 0.0),
                Point2::new(10.0, 10.0),
                Point2::new(20.0, 0.0),
            ],
            0.5,
        );
        let samples = s.sample_points();
        assert_eq!(samples.len(), 2 * SPLINE_STEPS_PER_SPAN + 1);
        assert!((samples[SPLINE_STEPS_PER_SPAN] - Point2::new(10.0, 10.0)).norm() < 1e-12);
        assert!((samples.last().unwrap() - Point2::new(20.0, 0.0)).norm() < 1e-12);
    }

    #[test]
    fn test_text_width_mixed_scripts() {
        let t = Text::new(Point2::origin(), "ab中", 10.0);
        assert!((t.estimated_width() - 22.0).abs() < EPSILON);
        assert!(t.contains_point(&Point2::new(21.0, 9.0), 0.0));
        assert!(!t.contains_point(&Point2::new(23.0, 9.0), 0.0));
    }

    #[test]
    fn test_block_elements_are_translated() {
        let block = Block::new(
            Point2::new(100.0, 50.0),
            vec![Shape::Point(PointObject::new(Point2::new(1.0, 2.0)))],
        );
        match &block.world_elements()[0] {
            Shape::Point(p) => assert_eq!(p.position, Point2::new(101.0, 52.0)),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_unknown_type_deserializes() {
        let shape: Shape =
            serde_json::from_str(r#"{"type":"hatch","pattern":"ANSI31"}"#).unwrap();
        assert_eq!(shape, Shape::Unknown);
        assert!(shape.bounding_box().is_empty());
        assert!(shape.outlines().is_empty());
    }

    #[test]
    fn test_tagged_json_shape() {
        let shape: Shape = serde_json::from_str(
            r#"{"type":"arc","center":[0.0,0.0],"radius":5.0,"startAngle":0.0,"endAngle":1.5}"#,
        )
        .unwrap();
        assert!(matches!(shape, Shape::Arc(ref a) if a.radius == 5.0 && a.end_angle == 1.5));
    }

    #[test]
    fn test_validate_rejects_bad_shapes() {
        assert!(matches!(
            Shape::Polygon(Polygon::new(Point2::origin(), 1.0, 2)).validate(),
            Err(ShapeError::TooFewSides(2))
        ));
        assert!(matches!(
            Shape::Circle(Circle::new(Point2::origin(), -1.0)).validate(),
            Err(ShapeError::NegativeRadius { .. })
        ));
        assert!(matches!(
            Shape::Line(Line::new(Point2::new(f64::NAN, 0.0), Point2::origin())).validate(),
            Err(ShapeError::NonFinite { shape: "line" })
        ));
        assert!(Shape::Circle(Circle::new(Point2::origin(), 0.0)).validate().is_ok());
    }

    #[test]
    fn test_validate_caps_polygon_sides() {
        assert!(Shape::Polygon(Polygon::new(Point2::origin(), 1.0, MAX_POLYGON_SIDES))
            .validate()
            .is_ok());
        assert!(matches!(
            Shape::Polygon(Polygon::new(Point2::origin(), 1.0, 4_000_000_000)).validate(),
            Err(ShapeError::TooManySides { sides: 4_000_000_000, .. })
        ));
    }
}
