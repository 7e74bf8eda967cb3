//! 坐标变换
//!
//! 两套约定并存：
//! - `ViewTransform`：屏幕坐标 = 世界坐标 × 缩放 + 偏移，Y 轴不翻转
//! - `CanvasTransform`：画布坐标的 Y 轴向下，世界坐标的 Y 轴向上
//!
//! 两者各自服务不同的调用方，互不换算。

use crate::error::ShapeError;
use crate::math::{Point2, Vector2};
use serde::{Deserialize, Serialize};

/// 缩放下限
pub const MIN_SCALE: f64 = 0.01;
/// 缩放上限
pub const MAX_SCALE: f64 = 100.0;

fn check_scale(scale: f64) -> Result<f64, ShapeError> {
    if scale.is_finite() && scale > 0.0 {
        Ok(scale)
    } else {
        Err(ShapeError::InvalidScale(scale))
    }
}

/// 视图变换（无 Y 翻转）
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewTransform {
    scale: f64,
    pub offset: Vector2,
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self {
            scale: 1.0,
            offset: Vector2::zeros(),
        }
    }
}

impl ViewTransform {
    pub fn new(scale: f64, offset: Vector2) -> Result<Self, ShapeError> {
        Ok(Self {
            scale: check_scale(scale)?,
            offset,
        })
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// 世界坐标转屏幕坐标
    pub fn world_to_screen(&self, point: &Point2) -> Point2 {
        Point2::from(point.coords * self.scale + self.offset)
    }

    /// 屏幕坐标转世界坐标
    pub fn screen_to_world(&self, point: &Point2) -> Point2 {
        Point2::from((point.coords - self.offset) / self.scale)
    }

    /// 平移（屏幕像素）
    pub fn pan(&mut self, delta: Vector2) {
        self.offset += delta;
    }

    /// 以屏幕上的 `anchor` 为不动点缩放
    ///
    /// 结果超出 [`MIN_SCALE`, `MAX_SCALE`] 时截断；非法的缩放因子被忽略。
    pub fn zoom_at(&mut self, anchor: &Point2, factor: f64) {
        if !(factor.is_finite() && factor > 0.0) {
            tracing::warn!("Ignoring invalid zoom factor {}", factor);
            return;
        }
        let world = self.screen_to_world(anchor);
        self.scale = (self.scale * factor).clamp(MIN_SCALE, MAX_SCALE);
        self.offset = anchor.coords - world.coords * self.scale;
    }
}

/// 画布变换（Y 轴翻转）
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CanvasTransform {
    scale: f64,
    pub offset: Vector2,
}

impl Default for CanvasTransform {
    fn default() -> Self {
        Self {
            scale: 1.0,
            offset: Vector2::zeros(),
        }
    }
}

impl CanvasTransform {
    pub fn new(scale: f64, offset: Vector2) -> Result<Self, ShapeError> {
        Ok(Self {
            scale: check_scale(scale)?,
            offset,
        })
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn world_to_canvas(&self, point: &Point2) -> Point2 {
        Point2::new(
            point.x * self.scale + self.offset.x,
            self.offset.y - point.y * self.scale, // Y轴翻转
        )
    }

    pub fn canvas_to_world(&self, point: &Point2) -> Point2 {
        Point2::new(
            (point.x - self.offset.x) / self.scale,
            (self.offset.y - point.y) / self.scale, // Y轴翻转
        )
    }

    pub fn pan(&mut self, delta: Vector2) {
        self.offset += delta;
    }

    /// 以画布上的 `anchor` 为不动点缩放
    pub fn zoom_at(&mut self, anchor: &Point2, factor: f64) {
        if !(factor.is_finite() && factor > 0.0) {
            tracing::warn!("Ignoring invalid zoom factor {}", factor);
            return;
        }
        let world = self.canvas_to_world(anchor);
        self.scale = (self.scale * factor).clamp(MIN_SCALE, MAX_SCALE);
        self.offset = Vector2::new(
            anchor.x - world.x * self.scale,
            anchor.y + world.y * self.scale,
        );
    }
}
