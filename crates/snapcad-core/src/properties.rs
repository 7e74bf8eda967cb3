//! 视觉属性
//!
//! 捕捉和拾取不读取这些属性，它们只随实体一起在快照中流转。

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// RGBA 颜色
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    #[serde(default = "Color::opaque")]
    pub a: u8,
}

impl Color {
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const BLACK: Color = Color::rgb(0, 0, 0);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    fn opaque() -> u8 {
        255
    }

    /// 解析 `#rrggbb` / `#rrggbbaa`
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        let channel = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();
        match hex.len() {
            6 => Some(Self::rgb(channel(0)?, channel(2)?, channel(4)?)),
            8 => Some(Self {
                r: channel(0)?,
                g: channel(2)?,
                b: channel(4)?,
                a: channel(6)?,
            }),
            _ => None,
        }
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::WHITE
    }
}

/// 线型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LineType {
    #[default]
    Continuous,
    Dashed,
    Dotted,
    DashDot,
}

/// 实体属性包
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Properties {
    /// 描边颜色
    pub stroke: Color,
    /// 填充颜色（无填充为 None）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fill: Option<Color>,
    /// 线宽（像素）
    pub stroke_width: f64,
    pub line_type: LineType,
    /// 类型相关的附加数值参数
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub params: BTreeMap<String, f64>,
}

impl Default for Properties {
    fn default() -> Self {
        Self {
            stroke: Color::default(),
            fill: None,
            stroke_width: 1.0,
            line_type: LineType::default(),
            params: BTreeMap::new(),
        }
    }
}

impl Properties {
    pub fn param(&self, key: &str) -> Option<f64> {
        self.params.get(key).copied()
    }
}
