//! 实体
//!
//! 实体 = 标识 + 所属图层 + 几何 + 属性。实体列表归文档层所有，
//! 捕捉/拾取引擎每次查询只借用一个只读快照。

use crate::error::ShapeError;
use crate::geometry::Shape;
use crate::properties::Properties;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_ENTITY_ID: AtomicU64 = AtomicU64::new(1);

/// 实体唯一标识
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(pub u64);

impl EntityId {
    /// 分配一个进程内唯一的新标识
    pub fn new() -> Self {
        Self(NEXT_ENTITY_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl Default for EntityId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// 图层引用
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LayerId(pub u32);

/// 实体
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub id: EntityId,
    #[serde(default)]
    pub layer: LayerId,
    pub geometry: Shape,
    #[serde(default)]
    pub properties: Properties,
}

impl Entity {
    /// 在默认图层上创建实体
    pub fn new(geometry: Shape) -> Self {
        Self {
            id: EntityId::new(),
            layer: LayerId::default(),
            geometry,
            properties: Properties::default(),
        }
    }

    pub fn with_layer(mut self, layer: LayerId) -> Self {
        self.layer = layer;
        self
    }

    pub fn with_properties(mut self, properties: Properties) -> Self {
        self.properties = properties;
        self
    }

    /// 从 JSON 读取单个实体并校验几何
    pub fn from_json(json: &str) -> Result<Self, ShapeError> {
        let entity: Entity = serde_json::from_str(json)?;
        entity.geometry.validate()?;
        Ok(entity)
    }
}

/// 从 JSON 数组读取实体快照
///
/// 任一图形不合法时整体失败；未知类型的图形保留为 `Shape::Unknown`。
pub fn load_entities(json: &str) -> Result<Vec<Entity>, ShapeError> {
    let entities: Vec<Entity> = serde_json::from_str(json)?;
    for entity in &entities {
        entity.geometry.validate()?;
    }
    tracing::debug!("Loaded {} entities from snapshot", entities.len());
    Ok(entities)
}
