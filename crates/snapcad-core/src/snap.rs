//! 对象捕捉系统
//!
//! 参考 LibreCAD 的设计，实现 CAD 标准的对象捕捉功能。
//!
//! 支持的捕捉类型（同时也是求值顺序）：
//! - 端点 (Endpoint)
//! - 中点 (Midpoint)
//! - 圆心 (Center)
//! - 节点 (Node)
//! - 象限点 (Quadrant)
//! - 交点 (Intersection)
//! - 延伸点 (Extension)
//! - 插入点 (Insertion)
//! - 垂足 (Perpendicular)
//! - 切点 (Tangent)
//! - 最近点 (Nearest)
//!
//! 每种捕捉类型按实体顺序扫描，返回第一个落在容差内的候选点；
//! 各类型的候选再按到光标的距离取最近者，距离相同时先求值的类型优先。

use crate::entity::{Entity, EntityId};
use crate::geometry::Shape;
use crate::intersection::{primitives, shape_intersections, tangent_points_from_point, Primitive};
use crate::math::{distance, project_point_on_segment, segment_parameter, Point2, Vector2, EPSILON};
use serde::{Deserialize, Serialize};

/// 延伸捕捉的探测半径是捕捉容差的倍数
pub const EXTENSION_RADIUS_FACTOR: f64 = 5.0;

/// 延伸判断中"超出端点"的容差
const EXTENSION_BEYOND_TOLERANCE: f64 = -0.001;

/// 捕捉类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SnapMode {
    /// 端点捕捉
    Endpoint,
    /// 中点捕捉
    Midpoint,
    /// 圆心捕捉
    Center,
    /// 节点捕捉（点对象）
    Node,
    /// 象限点（圆/弧的0°, 90°, 180°, 270°位置）
    Quadrant,
    /// 交点捕捉
    Intersection,
    /// 延伸捕捉
    Extension,
    /// 插入点捕捉（块、文本）
    Insertion,
    /// 垂足捕捉
    Perpendicular,
    /// 切点捕捉
    Tangent,
    /// 最近点捕捉
    Nearest,
}

impl SnapMode {
    /// 全部捕捉类型，按求值顺序
    pub const ALL: [SnapMode; 11] = [
        SnapMode::Endpoint,
        SnapMode::Midpoint,
        SnapMode::Center,
        SnapMode::Node,
        SnapMode::Quadrant,
        SnapMode::Intersection,
        SnapMode::Extension,
        SnapMode::Insertion,
        SnapMode::Perpendicular,
        SnapMode::Tangent,
        SnapMode::Nearest,
    ];

    /// 获取捕捉类型的名称
    pub fn name(&self) -> &'static str {
        match self {
            SnapMode::Endpoint => "Endpoint",
            SnapMode::Midpoint => "Midpoint",
            SnapMode::Center => "Center",
            SnapMode::Node => "Node",
            SnapMode::Quadrant => "Quadrant",
            SnapMode::Intersection => "Intersection",
            SnapMode::Extension => "Extension",
            SnapMode::Insertion => "Insertion",
            SnapMode::Perpendicular => "Perpendicular",
            SnapMode::Tangent => "Tangent",
            SnapMode::Nearest => "Nearest",
        }
    }

    /// 获取捕捉类型的快捷键
    pub fn shortcut(&self) -> &'static str {
        match self {
            SnapMode::Endpoint => "END",
            SnapMode::Midpoint => "MID",
            SnapMode::Center => "CEN",
            SnapMode::Node => "NOD",
            SnapMode::Quadrant => "QUA",
            SnapMode::Intersection => "INT",
            SnapMode::Extension => "EXT",
            SnapMode::Insertion => "INS",
            SnapMode::Perpendicular => "PER",
            SnapMode::Tangent => "TAN",
            SnapMode::Nearest => "NEA",
        }
    }

    fn bit(&self) -> u16 {
        match self {
            SnapMode::Endpoint => SnapMask::ENDPOINT,
            SnapMode::Midpoint => SnapMask::MIDPOINT,
            SnapMode::Center => SnapMask::CENTER,
            SnapMode::Node => SnapMask::NODE,
            SnapMode::Quadrant => SnapMask::QUADRANT,
            SnapMode::Intersection => SnapMask::INTERSECTION,
            SnapMode::Extension => SnapMask::EXTENSION,
            SnapMode::Insertion => SnapMask::INSERTION,
            SnapMode::Perpendicular => SnapMask::PERPENDICULAR,
            SnapMode::Tangent => SnapMask::TANGENT,
            SnapMode::Nearest => SnapMask::NEAREST,
        }
    }
}

/// 捕捉掩码（位域，用于快速启用/禁用捕捉类型）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapMask {
    bits: u16,
}

impl SnapMask {
    pub const ENDPOINT: u16 = 1 << 0;
    pub const MIDPOINT: u16 = 1 << 1;
    pub const CENTER: u16 = 1 << 2;
    pub const NODE: u16 = 1 << 3;
    pub const QUADRANT: u16 = 1 << 4;
    pub const INTERSECTION: u16 = 1 << 5;
    pub const EXTENSION: u16 = 1 << 6;
    pub const INSERTION: u16 = 1 << 7;
    pub const PERPENDICULAR: u16 = 1 << 8;
    pub const TANGENT: u16 = 1 << 9;
    pub const NEAREST: u16 = 1 << 10;

    pub const NONE: SnapMask = SnapMask { bits: 0 };
    pub const ALL: SnapMask = SnapMask { bits: (1 << 11) - 1 };

    pub fn new(bits: u16) -> Self {
        Self {
            bits: bits & Self::ALL.bits,
        }
    }

    pub fn from_modes(modes: impl IntoIterator<Item = SnapMode>) -> Self {
        let mut mask = Self::NONE;
        for mode in modes {
            mask.set(mode, true);
        }
        mask
    }

    pub fn is_enabled(&self, mode: SnapMode) -> bool {
        self.bits & mode.bit() != 0
    }

    pub fn set(&mut self, mode: SnapMode, enabled: bool) {
        if enabled {
            self.bits |= mode.bit();
        } else {
            self.bits &= !mode.bit();
        }
    }

    pub fn toggle(&mut self, mode: SnapMode) {
        let enabled = self.is_enabled(mode);
        self.set(mode, !enabled);
    }

    /// 已启用的类型，按求值顺序
    pub fn modes(&self) -> impl Iterator<Item = SnapMode> + '_ {
        SnapMode::ALL.into_iter().filter(|m| self.is_enabled(*m))
    }
}

impl Default for SnapMask {
    fn default() -> Self {
        // 默认启用常用的捕捉类型
        Self {
            bits: Self::ENDPOINT | Self::MIDPOINT | Self::CENTER | Self::INTERSECTION,
        }
    }
}

/// 捕捉配置
///
/// 每次查询显式传入，引擎本身不持有配置。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SnapConfig {
    /// 总开关
    pub enabled: bool,
    /// 启用的捕捉类型
    pub active_modes: SnapMask,
    /// 捕捉距离（屏幕像素）
    pub snap_distance: f64,
    /// 是否显示捕捉标记
    pub show_snap_points: bool,
    /// 是否显示延伸线等辅助线
    pub show_snap_lines: bool,
}

impl Default for SnapConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            active_modes: SnapMask::default(),
            snap_distance: 10.0, // 10像素
            show_snap_points: true,
            show_snap_lines: true,
        }
    }
}

impl SnapConfig {
    /// 只启用指定类型的配置
    pub fn with_modes(modes: impl IntoIterator<Item = SnapMode>) -> Self {
        Self {
            active_modes: SnapMask::from_modes(modes),
            ..Self::default()
        }
    }

    /// 世界坐标容差；缩放比例非法时返回 `None`
    pub fn world_tolerance(&self, zoom: f64) -> Option<f64> {
        if !(zoom.is_finite() && zoom > 0.0) {
            return None;
        }
        let tolerance = self.snap_distance / zoom;
        (tolerance.is_finite() && tolerance >= 0.0).then_some(tolerance)
    }
}

/// 捕捉结果
#[derive(Debug, Clone, PartialEq)]
pub struct SnapResult {
    /// 捕捉到的世界坐标
    pub point: Point2,
    /// 捕捉类型
    pub snap_mode: SnapMode,
    /// 来源实体（交点涉及两个实体，为 None）
    pub entity_id: Option<EntityId>,
    /// 提示文本
    pub description: String,
    /// 到光标的世界距离（用于排序）
    pub distance: f64,
}

impl SnapResult {
    fn new(point: Point2, snap_mode: SnapMode, source: Option<&Entity>, cursor: Point2) -> Self {
        let description = match source {
            Some(entity) => format!("{} of {}", snap_mode.name(), entity.geometry.type_name()),
            None => snap_mode.name().to_string(),
        };
        Self {
            point,
            snap_mode,
            entity_id: source.map(|e| e.id),
            description,
            distance: distance(&point, &cursor),
        }
    }
}

/// 延伸辅助线：从线段端点沿线段方向向外
#[derive(Debug, Clone, PartialEq)]
pub struct ExtensionGuide {
    /// 被延伸的端点
    pub origin: Point2,
    /// 向外的单位方向
    pub direction: Vector2,
    /// 延伸点（端点外探测半径处）
    pub point: Point2,
    pub entity_id: EntityId,
}

/// 单次查询的上下文
struct Query<'a> {
    cursor: Point2,
    tolerance: f64,
    entities: &'a [Entity],
}

impl Query<'_> {
    /// 按顺序返回第一个在容差内的点
    fn first_within(&self, points: impl IntoIterator<Item = Point2>) -> Option<Point2> {
        points
            .into_iter()
            .find(|p| distance(p, &self.cursor) <= self.tolerance)
    }

    /// 对每个实体依次求候选，返回第一个命中
    fn scan<I>(&self, mode: SnapMode, candidates: impl Fn(&Shape) -> I) -> Option<SnapResult>
    where
        I: IntoIterator<Item = Point2>,
    {
        self.entities.iter().find_map(|entity| {
            self.first_within(candidates(&entity.geometry))
                .map(|p| SnapResult::new(p, mode, Some(entity), self.cursor))
        })
    }
}

/// 捕捉引擎
///
/// 只保存查询期间的临时数据（候选点、延伸辅助线），每次查询开始时清空重建，
/// 所以相同输入总是得到相同结果。
#[derive(Debug, Clone, Default)]
pub struct SnapEngine {
    /// 各类型的候选捕捉点
    candidates: Vec<SnapResult>,
    /// 延伸辅助线缓存
    extension_guides: Vec<ExtensionGuide>,
}

impl SnapEngine {
    pub fn new() -> Self {
        Self {
            candidates: Vec::with_capacity(SnapMode::ALL.len()),
            extension_guides: Vec::with_capacity(64),
        }
    }

    /// 最近一次查询构建的延伸辅助线
    pub fn extension_guides(&self) -> &[ExtensionGuide] {
        &self.extension_guides
    }

    /// 最近一次查询中各类型的候选点
    pub fn candidates(&self) -> &[SnapResult] {
        &self.candidates
    }

    /// 寻找最佳捕捉点
    ///
    /// # 参数
    /// - `config`: 捕捉配置
    /// - `cursor`: 光标的世界坐标
    /// - `entities`: 要搜索的实体快照
    /// - `zoom`: 当前缩放比例（屏幕像素/世界单位），用于换算捕捉距离
    pub fn find_snap_point(
        &mut self,
        config: &SnapConfig,
        cursor: Point2,
        entities: &[Entity],
        zoom: f64,
    ) -> Option<SnapResult> {
        self.candidates.clear();
        self.extension_guides.clear();

        if !config.enabled {
            return None;
        }

        let Some(tolerance) = config.world_tolerance(zoom) else {
            tracing::warn!("Ignoring snap query with invalid zoom {}", zoom);
            return None;
        };

        let query = Query {
            cursor,
            tolerance,
            entities,
        };

        if config.active_modes.is_enabled(SnapMode::Extension) {
            self.rebuild_extension_guides(entities, tolerance * EXTENSION_RADIUS_FACTOR);
        }

        for mode in config.active_modes.modes() {
            if let Some(candidate) = self.detect(mode, &query) {
                self.candidates.push(candidate);
            }
        }

        // 严格小于才替换，距离相同时保留先求值的类型
        let best = self
            .candidates
            .iter()
            .fold(None::<&SnapResult>, |best, c| match best {
                Some(b) if b.distance <= c.distance => Some(b),
                _ => Some(c),
            })
            .cloned();

        if let Some(ref snap) = best {
            tracing::trace!(
                "Snapped to {} at ({:.3}, {:.3}), {} candidates",
                snap.description,
                snap.point.x,
                snap.point.y,
                self.candidates.len()
            );
        }

        best
    }

    fn detect(&self, mode: SnapMode, query: &Query) -> Option<SnapResult> {
        match mode {
            SnapMode::Endpoint => query.scan(mode, endpoints),
            SnapMode::Midpoint => query.scan(mode, midpoints),
            SnapMode::Center => query.scan(mode, center),
            SnapMode::Node => query.scan(mode, |shape| match shape {
                Shape::Point(p) => Some(p.position),
                _ => None,
            }),
            SnapMode::Quadrant => query.scan(mode, quadrants),
            SnapMode::Intersection => self.snap_intersection(query),
            SnapMode::Extension => self.snap_extension(query),
            SnapMode::Insertion => query.scan(mode, |shape| match shape {
                Shape::Block(b) => Some(b.position),
                Shape::Text(t) => Some(t.position),
                _ => None,
            }),
            SnapMode::Perpendicular => query.scan(mode, |shape| perpendicular_feet(shape, &query.cursor)),
            SnapMode::Tangent => self.snap_tangent(query),
            SnapMode::Nearest => self.snap_nearest(query),
        }
    }

    /// 交点捕捉（需要成对的实体）
    fn snap_intersection(&self, query: &Query) -> Option<SnapResult> {
        // 交点同时位于两个图形上，包围盒离光标超过容差的实体不可能贡献候选
        let nearby: Vec<&Entity> = query
            .entities
            .iter()
            .filter(|e| {
                e.geometry
                    .bounding_box()
                    .expanded(query.tolerance)
                    .contains(&query.cursor)
            })
            .collect();

        for i in 0..nearby.len() {
            for j in (i + 1)..nearby.len() {
                let points = shape_intersections(&nearby[i].geometry, &nearby[j].geometry);
                if let Some(p) = query.first_within(points) {
                    return Some(SnapResult::new(p, SnapMode::Intersection, None, query.cursor));
                }
            }
        }
        None
    }

    /// 重建延伸辅助线缓存：每条非退化线段的两端各一条
    fn rebuild_extension_guides(&mut self, entities: &[Entity], radius: f64) {
        for entity in entities {
            let Shape::Line(line) = &entity.geometry else {
                continue;
            };
            let Some(dir) = line.direction() else {
                continue;
            };
            for (origin, direction) in [(line.start, -dir), (line.end, dir)] {
                self.extension_guides.push(ExtensionGuide {
                    origin,
                    direction,
                    point: origin + direction * radius,
                    entity_id: entity.id,
                });
            }
        }
    }

    /// 延伸捕捉
    ///
    /// 光标须在端点的探测半径内、投影落在端点之外，并且离延长线不超过容差。
    fn snap_extension(&self, query: &Query) -> Option<SnapResult> {
        let radius = query.tolerance * EXTENSION_RADIUS_FACTOR;
        let guide = self.extension_guides.iter().find(|g| {
            let offset = query.cursor - g.origin;
            let along = offset.dot(&g.direction);
            let across = (offset.x * g.direction.y - offset.y * g.direction.x).abs();
            along > EXTENSION_BEYOND_TOLERANCE
                && offset.norm() <= radius
                && across <= query.tolerance
        })?;

        let source = query.entities.iter().find(|e| e.id == guide.entity_id);
        Some(SnapResult::new(guide.point, SnapMode::Extension, source, query.cursor))
    }

    /// 切点捕捉：所有实体中最近的在范围内的切点
    fn snap_tangent(&self, query: &Query) -> Option<SnapResult> {
        let mut best: Option<(Point2, f64, &Entity)> = None;
        for entity in query.entities {
            for prim in primitives(&entity.geometry) {
                let (circle, arc) = match &prim {
                    Primitive::Circle(c) => (c.clone(), None),
                    Primitive::Arc(a) => (a.circle(), Some(a)),
                    Primitive::Segment(_) => continue,
                };
                for p in tangent_points_from_point(&query.cursor, &circle) {
                    if arc.is_some_and(|a| !a.contains_point_angle(&p)) {
                        continue;
                    }
                    let d = distance(&p, &query.cursor);
                    if d <= query.tolerance && best.map_or(true, |(_, bd, _)| d < bd) {
                        best = Some((p, d, entity));
                    }
                }
            }
        }
        best.map(|(p, _, entity)| SnapResult::new(p, SnapMode::Tangent, Some(entity), query.cursor))
    }

    /// 最近点捕捉：全局最近的边界点，且必须在容差内
    fn snap_nearest(&self, query: &Query) -> Option<SnapResult> {
        let mut best: Option<(Point2, f64, &Entity)> = None;
        for entity in query.entities {
            if let Some(p) = nearest_on_shape(&entity.geometry, &query.cursor) {
                let d = distance(&p, &query.cursor);
                if best.map_or(true, |(_, bd, _)| d < bd) {
                    best = Some((p, d, entity));
                }
            }
        }
        best.filter(|(_, d, _)| *d <= query.tolerance)
            .map(|(p, _, entity)| SnapResult::new(p, SnapMode::Nearest, Some(entity), query.cursor))
    }
}

/// 使用一次性引擎寻找捕捉点
pub fn find_snap_point(
    config: &SnapConfig,
    cursor: Point2,
    entities: &[Entity],
    zoom: f64,
) -> Option<SnapResult> {
    SnapEngine::new().find_snap_point(config, cursor, entities, zoom)
}

// ========== 各类型的候选点 ==========

fn endpoints(shape: &Shape) -> Vec<Point2> {
    match shape {
        Shape::Line(l) if !l.is_degenerate() => vec![l.start, l.end],
        Shape::Arc(a) if !a.is_degenerate() => vec![a.start_point(), a.end_point()],
        Shape::Polyline(pl) => pl.points.clone(),
        Shape::Rectangle(r) => r.corners().to_vec(),
        Shape::Polygon(p) => p.vertices(),
        _ => vec![],
    }
}

fn midpoints(shape: &Shape) -> Vec<Point2> {
    primitives(shape)
        .iter()
        .filter_map(|prim| match prim {
            Primitive::Segment(l) => Some(l.midpoint()),
            Primitive::Arc(a) => Some(a.midpoint()),
            Primitive::Circle(_) => None,
        })
        .collect()
}

fn center(shape: &Shape) -> Option<Point2> {
    match shape {
        Shape::Circle(c) if !c.is_degenerate() => Some(c.center),
        Shape::Arc(a) if !a.is_degenerate() => Some(a.center),
        Shape::Ellipse(e) if !e.is_degenerate() => Some(e.center),
        Shape::Polygon(p) if p.sides >= 3 && p.radius >= EPSILON => Some(p.center),
        _ => None,
    }
}

/// 象限点不按弧的角度范围过滤
fn quadrants(shape: &Shape) -> Vec<Point2> {
    match shape {
        Shape::Circle(c) if !c.is_degenerate() => c.quadrant_points().to_vec(),
        Shape::Arc(a) if !a.is_degenerate() => a.circle().quadrant_points().to_vec(),
        Shape::Ellipse(e) if !e.is_degenerate() => e.quadrant_points().to_vec(),
        _ => vec![],
    }
}

/// 圆心指向光标的射线与圆的交点，光标与圆心重合时无解
fn radial_point(center: &Point2, radius: f64, cursor: &Point2) -> Option<Point2> {
    let v = cursor - center;
    let d = v.norm();
    (d >= EPSILON).then(|| center + v * (radius / d))
}

fn perpendicular_feet(shape: &Shape, cursor: &Point2) -> Vec<Point2> {
    primitives(shape)
        .iter()
        .filter_map(|prim| match prim {
            Primitive::Segment(l) => {
                let t = segment_parameter(cursor, &l.start, &l.end)?;
                (0.0..=1.0).contains(&t).then(|| l.start + (l.end - l.start) * t)
            }
            Primitive::Circle(c) => radial_point(&c.center, c.radius, cursor),
            Primitive::Arc(a) => radial_point(&a.center, a.radius, cursor)
                .filter(|p| a.contains_point_angle(p)),
        })
        .collect()
}

/// 图形边界上离光标最近的点
fn nearest_on_shape(shape: &Shape, cursor: &Point2) -> Option<Point2> {
    if let Shape::Point(p) = shape {
        return Some(p.position);
    }

    primitives(shape)
        .iter()
        .filter_map(|prim| match prim {
            Primitive::Segment(l) => Some(project_point_on_segment(cursor, &l.start, &l.end)),
            Primitive::Circle(c) => radial_point(&c.center, c.radius, cursor),
            Primitive::Arc(a) => match radial_point(&a.center, a.radius, cursor) {
                Some(p) if a.contains_point_angle(&p) => Some(p),
                // 角度范围外退回到较近的端点
                Some(_) => {
                    let (s, e) = (a.start_point(), a.end_point());
                    Some(if distance(&s, cursor) <= distance(&e, cursor) { s } else { e })
                }
                None => None,
            },
        })
        .min_by(|a, b| {
            distance(a, cursor)
                .partial_cmp(&distance(b, cursor))
                .unwrap_or(std::cmp::Ordering::Equal)
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Arc, Block, Circle, Line, PointObject, Polyline, Text};
    use std::f64::consts::PI;

    fn line(x1: f64, y1: f64, x2: f64, y2: f64) -> Entity {
        Entity::new(Shape::Line(Line::new(Point2::new(x1, y1), Point2::new(x2, y2))))
    }

    fn circle(x: f64, y: f64, r: f64) -> Entity {
        Entity::new(Shape::Circle(Circle::new(Point2::new(x, y), r)))
    }

    fn only(mode: SnapMode) -> SnapConfig {
        SnapConfig::with_modes([mode])
    }

    #[test]
    fn test_snap_mask() {
        let mut mask = SnapMask::default();
        assert!(mask.is_enabled(SnapMode::Endpoint));
        assert!(mask.is_enabled(SnapMode::Midpoint));
        assert!(!mask.is_enabled(SnapMode::Nearest));

        mask.set(SnapMode::Nearest, true);
        assert!(mask.is_enabled(SnapMode::Nearest));

        mask.toggle(SnapMode::Endpoint);
        assert!(!mask.is_enabled(SnapMode::Endpoint));

        let order: Vec<_> = SnapMask::ALL.modes().collect();
        assert_eq!(order, SnapMode::ALL.to_vec());
    }

    #[test]
    fn test_endpoint_on_line_start() {
        let entities = vec![line(0.0, 0.0, 100.0, 0.0)];
        let snap = find_snap_point(&SnapConfig::default(), Point2::new(0.0, 0.0), &entities, 1.0)
            .unwrap();
        assert_eq!(snap.snap_mode, SnapMode::Endpoint);
        assert_eq!(snap.point, Point2::new(0.0, 0.0));
        assert_eq!(snap.entity_id, Some(entities[0].id));
        assert_eq!(snap.description, "Endpoint of line");
    }

    #[test]
    fn test_disabled_config_never_snaps() {
        let entities = vec![line(0.0, 0.0, 100.0, 0.0)];
        let config = SnapConfig {
            enabled: false,
            ..SnapConfig::default()
        };
        assert!(find_snap_point(&config, Point2::origin(), &entities, 1.0).is_none());
    }

    #[test]
    fn test_invalid_zoom_never_snaps() {
        let entities = vec![line(0.0, 0.0, 100.0, 0.0)];
        let config = SnapConfig::default();
        assert!(find_snap_point(&config, Point2::origin(), &entities, 0.0).is_none());
        assert!(find_snap_point(&config, Point2::origin(), &entities, f64::NAN).is_none());
    }

    #[test]
    fn test_tolerance_scales_with_zoom() {
        let entities = vec![line(0.0, 0.0, 100.0, 0.0)];
        let config = only(SnapMode::Endpoint);
        let cursor = Point2::new(3.0, 0.0);
        // 10px / 1 = 10 世界单位
        assert!(find_snap_point(&config, cursor, &entities, 1.0).is_some());
        // 10px / 5 = 2 世界单位
        assert!(find_snap_point(&config, cursor, &entities, 5.0).is_none());
    }

    #[test]
    fn test_quadrant_on_circle() {
        let entities = vec![circle(10.0, 10.0, 5.0)];
        let snap = find_snap_point(&only(SnapMode::Quadrant), Point2::new(15.0, 10.0), &entities, 1.0)
            .unwrap();
        assert_eq!(snap.snap_mode, SnapMode::Quadrant);
        assert!((snap.point - Point2::new(15.0, 10.0)).norm() < EPSILON);
    }

    #[test]
    fn test_quadrant_on_arc_ignores_range() {
        // 上半弧仍然提供 270° 象限点
        let arc = Entity::new(Shape::Arc(Arc::new(Point2::origin(), 5.0, 0.0, PI)));
        let snap = find_snap_point(&only(SnapMode::Quadrant), Point2::new(0.0, -5.0), &[arc], 5.0)
            .unwrap();
        assert!((snap.point - Point2::new(0.0, -5.0)).norm() < EPSILON);
    }

    #[test]
    fn test_arc_midpoint_wraparound() {
        let arc = Entity::new(Shape::Arc(Arc::new(Point2::origin(), 10.0, 3.0 * PI / 2.0, PI / 2.0)));
        let snap = find_snap_point(&only(SnapMode::Midpoint), Point2::new(9.0, 0.0), &[arc], 1.0)
            .unwrap();
        assert!((snap.point - Point2::new(10.0, 0.0)).norm() < 1e-9);
    }

    #[test]
    fn test_closed_polyline_closing_midpoint() {
        let points = vec![Point2::new(0.0, 0.0), Point2::new(20.0, 0.0), Point2::new(20.0, 20.0)];
        let closed = Entity::new(Shape::Polyline(Polyline::new(points.clone(), true)));
        let open = Entity::new(Shape::Polyline(Polyline::new(points, false)));
        let config = only(SnapMode::Midpoint);
        let cursor = Point2::new(10.5, 10.0);

        // 容差 10px / 5 = 2
        let snap = find_snap_point(&config, cursor, &[closed], 5.0).unwrap();
        assert!((snap.point - Point2::new(10.0, 10.0)).norm() < EPSILON);
        assert!(find_snap_point(&config, cursor, &[open], 5.0).is_none());
    }

    #[test]
    fn test_closest_mode_wins() {
        // 光标离中点比离端点近
        let entities = vec![line(0.0, 0.0, 12.0, 0.0)];
        let snap = find_snap_point(&SnapConfig::default(), Point2::new(5.0, 0.0), &entities, 1.0)
            .unwrap();
        assert_eq!(snap.snap_mode, SnapMode::Midpoint);
    }

    #[test]
    fn test_equal_distance_prefers_earlier_mode() {
        // 端点同时也是圆心
        let entities = vec![line(0.0, 0.0, 50.0, 0.0), circle(0.0, 0.0, 30.0)];
        let config = SnapConfig::with_modes([SnapMode::Center, SnapMode::Endpoint]);
        let snap = find_snap_point(&config, Point2::new(1.0, 1.0), &entities, 1.0).unwrap();
        assert_eq!(snap.snap_mode, SnapMode::Endpoint);
    }

    #[test]
    fn test_detector_returns_first_entity_in_range() {
        let entities = vec![line(0.0, 0.0, 100.0, 0.0), line(4.0, 0.0, 4.0, 100.0)];
        let snap = find_snap_point(&only(SnapMode::Endpoint), Point2::new(3.0, 0.0), &entities, 1.0)
            .unwrap();
        // 第二条线的端点更近，但第一条线先被扫描
        assert_eq!(snap.entity_id, Some(entities[0].id));
    }

    #[test]
    fn test_intersection_of_lines() {
        let entities = vec![line(0.0, 0.0, 10.0, 10.0), line(0.0, 10.0, 10.0, 0.0)];
        let snap = find_snap_point(&only(SnapMode::Intersection), Point2::new(5.5, 5.0), &entities, 1.0)
            .unwrap();
        assert_eq!(snap.snap_mode, SnapMode::Intersection);
        assert!((snap.point - Point2::new(5.0, 5.0)).norm() < EPSILON);
        assert_eq!(snap.entity_id, None);
    }

    #[test]
    fn test_intersection_line_with_polyline_and_circle() {
        let entities = vec![
            Entity::new(Shape::Polyline(Polyline::new(
                vec![Point2::new(-10.0, -10.0), Point2::new(-10.0, 10.0), Point2::new(10.0, 10.0)],
                false,
            ))),
            circle(0.0, 10.0, 4.0),
        ];
        let snap = find_snap_point(&only(SnapMode::Intersection), Point2::new(4.5, 10.5), &entities, 2.0)
            .unwrap();
        assert!((snap.point - Point2::new(4.0, 10.0)).norm() < EPSILON);
    }

    #[test]
    fn test_perpendicular_only_within_segment() {
        let entities = vec![line(0.0, 0.0, 10.0, 0.0)];
        let config = only(SnapMode::Perpendicular);
        let snap = find_snap_point(&config, Point2::new(4.0, 3.0), &entities, 1.0).unwrap();
        assert!((snap.point - Point2::new(4.0, 0.0)).norm() < EPSILON);
        // 投影在线段外
        assert!(find_snap_point(&config, Point2::new(12.0, 1.0), &entities, 1.0).is_none());
    }

    #[test]
    fn test_perpendicular_on_arc_respects_range() {
        let arc = Entity::new(Shape::Arc(Arc::new(Point2::origin(), 10.0, 0.0, PI)));
        let config = only(SnapMode::Perpendicular);
        let snap = find_snap_point(&config, Point2::new(0.0, 12.0), &[arc.clone()], 1.0).unwrap();
        assert!((snap.point - Point2::new(0.0, 10.0)).norm() < EPSILON);
        assert!(find_snap_point(&config, Point2::new(0.0, -12.0), &[arc], 1.0).is_none());
    }

    #[test]
    fn test_cursor_on_center_is_guarded() {
        let entities = vec![circle(0.0, 0.0, 5.0)];
        let config = SnapConfig::with_modes([SnapMode::Perpendicular, SnapMode::Nearest]);
        // 容差足够大，但圆心处方向未定义
        let snap = find_snap_point(&config, Point2::origin(), &entities, 0.1);
        assert!(snap.is_none());

        // 圆弧也不能退回到端点
        let arc = Entity::new(Shape::Arc(Arc::new(Point2::origin(), 5.0, 0.0, 1.0)));
        assert!(find_snap_point(&config, Point2::origin(), &[arc.clone()], 0.1).is_none());
        assert!(find_snap_point(&only(SnapMode::Nearest), Point2::origin(), &[arc], 0.1).is_none());
    }

    #[test]
    fn test_tangent_on_arc_respects_range() {
        // 光标 (10.5, 2) 对半径 10 的圆有上下两个切点，上切点约在 31°，下切点约在 -10°
        let cursor = Point2::new(10.5, 2.0);
        let config = only(SnapMode::Tangent);

        let upper = Entity::new(Shape::Arc(Arc::new(Point2::origin(), 10.0, 0.0, PI)));
        let snap = find_snap_point(&config, cursor, &[upper], 1.0).unwrap();
        assert!(snap.point.y > 0.0);
        assert!((snap.point.coords.norm() - 10.0).abs() < 1e-9);

        let lower = Entity::new(Shape::Arc(Arc::new(Point2::origin(), 10.0, PI, 2.0 * PI)));
        let snap = find_snap_point(&config, cursor, &[lower], 1.0).unwrap();
        assert!(snap.point.y < 0.0);

        // 两个切点都不在弧上
        let left = Entity::new(Shape::Arc(Arc::new(Point2::origin(), 10.0, PI / 2.0, PI)));
        assert!(find_snap_point(&config, cursor, &[left], 1.0).is_none());
    }

    #[test]
    fn test_intersection_of_line_and_arc() {
        let config = only(SnapMode::Intersection);
        let cursor = Point2::new(9.0, 5.5);
        // 容差 10px / 5 = 2
        let upper = vec![
            line(-20.0, 5.0, 20.0, 5.0),
            Entity::new(Shape::Arc(Arc::new(Point2::origin(), 10.0, 0.0, PI))),
        ];
        let snap = find_snap_point(&config, cursor, &upper, 5.0).unwrap();
        assert_eq!(snap.snap_mode, SnapMode::Intersection);
        assert!((snap.point - Point2::new(75f64.sqrt(), 5.0)).norm() < 1e-9);

        // 下半弧与直线没有交点
        let lower = vec![
            line(-20.0, 5.0, 20.0, 5.0),
            Entity::new(Shape::Arc(Arc::new(Point2::origin(), 10.0, PI, 2.0 * PI))),
        ];
        assert!(find_snap_point(&config, cursor, &lower, 5.0).is_none());
    }

    #[test]
    fn test_tangent_point() {
        let entities = vec![circle(0.0, 0.0, 10.0)];
        let cursor = Point2::new(10.5, 2.0);
        let snap = find_snap_point(&only(SnapMode::Tangent), cursor, &entities, 1.0).unwrap();
        assert_eq!(snap.snap_mode, SnapMode::Tangent);
        let t = snap.point;
        assert!((t.coords.norm() - 10.0).abs() < 1e-9);
        assert!(t.coords.dot(&(cursor - t)).abs() < 1e-9);
    }

    #[test]
    fn test_nearest_on_arc_falls_back_to_endpoint() {
        let arc = Entity::new(Shape::Arc(Arc::new(Point2::origin(), 10.0, 0.0, PI / 2.0)));
        let snap = find_snap_point(&only(SnapMode::Nearest), Point2::new(11.0, -2.0), &[arc], 1.0)
            .unwrap();
        assert!((snap.point - Point2::new(10.0, 0.0)).norm() < EPSILON);
    }

    #[test]
    fn test_nearest_picks_globally_closest() {
        let entities = vec![line(0.0, 0.0, 10.0, 0.0), line(0.0, 2.0, 10.0, 2.0)];
        let snap = find_snap_point(&only(SnapMode::Nearest), Point2::new(5.0, 1.5), &entities, 1.0)
            .unwrap();
        assert_eq!(snap.entity_id, Some(entities[1].id));
        assert!((snap.point - Point2::new(5.0, 2.0)).norm() < EPSILON);
    }

    #[test]
    fn test_extension_beyond_endpoint() {
        let entities = vec![line(0.0, 0.0, 10.0, 0.0)];
        let config = only(SnapMode::Extension);
        let mut engine = SnapEngine::new();

        // 容差 10px / 10 = 1，探测半径 5
        let snap = engine
            .find_snap_point(&config, Point2::new(12.0, 0.5), &entities, 10.0)
            .unwrap();
        assert_eq!(snap.snap_mode, SnapMode::Extension);
        assert!((snap.point - Point2::new(15.0, 0.0)).norm() < EPSILON);
        assert_eq!(engine.extension_guides().len(), 2);

        let snap = engine
            .find_snap_point(&config, Point2::new(-3.0, 0.2), &entities, 10.0)
            .unwrap();
        assert!((snap.point - Point2::new(-5.0, 0.0)).norm() < EPSILON);

        // 线段内部不触发
        assert!(engine
            .find_snap_point(&config, Point2::new(5.0, 0.5), &entities, 10.0)
            .is_none());
        // 偏离延长线
        assert!(engine
            .find_snap_point(&config, Point2::new(12.0, 3.0), &entities, 10.0)
            .is_none());
    }

    #[test]
    fn test_insertion_and_node() {
        let entities = vec![
            Entity::new(Shape::Text(Text::new(Point2::new(50.0, 50.0), "A", 5.0))),
            Entity::new(Shape::Block(Block::new(Point2::new(-50.0, 0.0), vec![]))),
            Entity::new(Shape::Point(PointObject::new(Point2::new(0.0, 30.0)))),
        ];
        let config = SnapConfig::with_modes([SnapMode::Insertion, SnapMode::Node]);
        let snap = find_snap_point(&config, Point2::new(51.0, 50.0), &entities, 1.0).unwrap();
        assert_eq!(snap.snap_mode, SnapMode::Insertion);
        let snap = find_snap_point(&config, Point2::new(-49.0, 1.0), &entities, 1.0).unwrap();
        assert_eq!(snap.entity_id, Some(entities[1].id));
        let snap = find_snap_point(&config, Point2::new(0.0, 31.0), &entities, 1.0).unwrap();
        assert_eq!(snap.snap_mode, SnapMode::Node);
    }

    #[test]
    fn test_degenerate_shapes_produce_nothing() {
        let entities = vec![line(1.0, 1.0, 1.0, 1.0), circle(1.0, 1.0, 0.0), Entity::new(Shape::Unknown)];
        let config = SnapConfig {
            active_modes: SnapMask::ALL,
            ..SnapConfig::default()
        };
        assert!(find_snap_point(&config, Point2::new(1.0, 1.0), &entities, 1.0).is_none());
    }

    #[test]
    fn test_repeated_queries_are_identical() {
        let entities = vec![line(0.0, 0.0, 10.0, 10.0), line(0.0, 10.0, 10.0, 0.0), circle(5.0, 5.0, 3.0)];
        let config = SnapConfig {
            active_modes: SnapMask::ALL,
            ..SnapConfig::default()
        };
        let mut engine = SnapEngine::new();
        let cursor = Point2::new(7.0, 6.0);
        let first = engine.find_snap_point(&config, cursor, &entities, 2.0);
        let second = engine.find_snap_point(&config, cursor, &entities, 2.0);
        assert!(first.is_some());
        assert_eq!(first, second);
    }

    #[test]
    fn test_config_json_defaults() {
        let config: SnapConfig = serde_json::from_str(r#"{"snapDistance": 15.0}"#).unwrap();
        assert!(config.enabled);
        assert_eq!(config.snap_distance, 15.0);
        assert_eq!(config.active_modes, SnapMask::default());
    }
}
