//! 框选
//!
//! 从左向右拖动为窗口选择（图形必须完全在框内），
//! 从右向左拖动为交叉选择（图形与框相交即可）。

use crate::entity::{Entity, EntityId};
use crate::geometry::Shape;
use crate::intersection::segments_intersect;
use crate::math::{BoundingBox2, Point2};
use serde::{Deserialize, Serialize};

/// 框选模式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SelectionMode {
    /// 窗口选择：完全包含
    #[default]
    Window,
    /// 交叉选择：相交即选中
    Crossing,
}

impl SelectionMode {
    /// 由拖动方向决定模式
    pub fn from_drag(start: &Point2, end: &Point2) -> Self {
        if end.x >= start.x {
            SelectionMode::Window
        } else {
            SelectionMode::Crossing
        }
    }
}

/// 正在进行的框选
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SelectionArea {
    pub active: bool,
    pub start_point: Option<Point2>,
    pub end_point: Option<Point2>,
    pub mode: SelectionMode,
}

impl SelectionArea {
    pub fn new() -> Self {
        Self::default()
    }

    /// 按下鼠标，开始框选
    pub fn begin(&mut self, point: Point2) {
        self.active = true;
        self.start_point = Some(point);
        self.end_point = Some(point);
        self.mode = SelectionMode::Window;
    }

    /// 拖动时更新终点，模式随方向变化
    pub fn update(&mut self, point: Point2) {
        if !self.active {
            return;
        }
        if let Some(start) = self.start_point {
            self.end_point = Some(point);
            self.mode = SelectionMode::from_drag(&start, &point);
        }
    }

    /// 松开鼠标，返回选框 `(start, end, mode)` 并复位
    pub fn finish(&mut self) -> Option<(Point2, Point2, SelectionMode)> {
        let result = match (self.active, self.start_point, self.end_point) {
            (true, Some(start), Some(end)) => Some((start, end, self.mode)),
            _ => None,
        };
        self.reset();
        result
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// 当前选框（已规整为 min/max）
    pub fn bounds(&self) -> Option<BoundingBox2> {
        match (self.start_point, self.end_point) {
            (Some(a), Some(b)) if self.active => Some(BoundingBox2::from_corners(a, b)),
            _ => None,
        }
    }
}

/// 图形是否被选框选中
///
/// 选框由两个角点给出，与拖动方向无关。
pub fn is_shape_in_selection_area(
    shape: &Shape,
    start: &Point2,
    end: &Point2,
    mode: SelectionMode,
) -> bool {
    let rect = BoundingBox2::from_corners(*start, *end);
    let outlines = shape.outlines();
    if outlines.iter().all(|o| o.points.is_empty()) {
        return false;
    }

    match mode {
        SelectionMode::Window => outlines
            .iter()
            .flat_map(|o| o.points.iter())
            .all(|p| rect.contains(p)),
        SelectionMode::Crossing => {
            if outlines
                .iter()
                .flat_map(|o| o.points.iter())
                .any(|p| rect.contains(p))
            {
                return true;
            }
            let edges = rect.edges();
            outlines.iter().flat_map(|o| o.segments()).any(|(a, b)| {
                edges
                    .iter()
                    .any(|(c, d)| segments_intersect(&a, &b, c, d))
            })
        }
    }
}

/// 返回被选中实体的标识（保持快照顺序）
pub fn select_entities(
    entities: &[Entity],
    start: &Point2,
    end: &Point2,
    mode: SelectionMode,
) -> Vec<EntityId> {
    let selected: Vec<EntityId> = entities
        .iter()
        .filter(|e| is_shape_in_selection_area(&e.geometry, start, end, mode))
        .map(|e| e.id)
        .collect();
    tracing::debug!(
        "{:?} selection picked {} of {} entities",
        mode,
        selected.len(),
        entities.len()
    );
    selected
}
