//! 错误定义
//!
//! 只有数据层服务（快照加载、图形校验、视图变换构造）会返回错误，
//! 捕捉/拾取/框选查询本身都是全函数，不会失败。

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ShapeError {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{shape} has a non-finite coordinate or parameter")]
    NonFinite { shape: &'static str },

    #[error("{shape} has a negative radius: {radius}")]
    NegativeRadius { shape: &'static str, radius: f64 },

    #[error("polygon needs at least 3 sides, got {0}")]
    TooFewSides(u32),

    #[error("polygon has {sides} sides, at most {max} are supported")]
    TooManySides { sides: u32, max: u32 },

    #[error("{shape} needs at least {min} points, got {count}")]
    TooFewPoints {
        shape: &'static str,
        count: usize,
        min: usize,
    },

    #[error("view scale must be positive and finite, got {0}")]
    InvalidScale(f64),
}
