//! SnapCAD 核心：对象捕捉与拾取引擎
//!
//! 提供2D几何图元、交点计算、对象捕捉、点选/框选以及坐标变换。
//!
//! # 架构设计
//!
//! 采用 Entity-Component 模式：
//! - `Entity`: 唯一标识符 + 图层
//! - `Shape`: 几何数据（线、圆、弧、多段线等）
//! - `Properties`: 视觉属性（颜色、线型）
//!
//! 所有查询都是只读的：调用方每次传入实体快照、配置和光标位置。
//!
//! # 示例
//!
//! ```rust
//! use snapcad_core::prelude::*;
//!
//! let entities = vec![Entity::new(Shape::Line(Line::new(
//!     Point2::origin(),
//!     Point2::new(100.0, 50.0),
//! )))];
//!
//! let snap = find_snap_point(&SnapConfig::default(), Point2::new(1.0, 1.0), &entities, 1.0);
//! assert_eq!(snap.map(|s| s.snap_mode), Some(SnapMode::Endpoint));
//! ```

pub mod entity;
pub mod error;
pub mod geometry;
pub mod intersection;
pub mod math;
pub mod properties;
pub mod selection;
pub mod snap;
pub mod transform;

pub mod prelude {
    //! 常用类型的便捷导入
    pub use crate::entity::{load_entities, Entity, EntityId, LayerId};
    pub use crate::error::ShapeError;
    pub use crate::geometry::{
        Arc, Block, Circle, Dimension, Ellipse, Line, PointObject, Polygon, Polyline, Rectangle,
        Shape, Spline, Text,
    };
    pub use crate::hit_test::{hit_test, pick_entity};
    pub use crate::math::{BoundingBox2, Point2, Vector2};
    pub use crate::properties::{Color, LineType, Properties};
    pub use crate::selection::{
        is_shape_in_selection_area, select_entities, SelectionArea, SelectionMode,
    };
    pub use crate::snap::{find_snap_point, SnapConfig, SnapEngine, SnapMask, SnapMode, SnapResult};
    pub use crate::transform::{CanvasTransform, ViewTransform};
}
