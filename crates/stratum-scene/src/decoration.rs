//! Non-colliding decorative items such as score labels.
//!
//! Decorations live in a layer's second sequence: they are painted by the
//! renderer in insertion order but never receive updates, key events, or
//! collision notifications.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::geometry::Vec2;
use crate::layer::LayerId;

/// Horizontal alignment of a text label relative to its position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HAlign {
    Left,
    Center,
    Right,
    /// Offset in pixels from the left edge.
    Offset(f32),
}

/// Vertical alignment of a text label relative to its position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VAlign {
    Bottom,
    Center,
    Top,
    /// Offset in pixels from the bottom edge.
    Offset(f32),
}

/// Which point of the label sits on its position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Anchor {
    pub x: HAlign,
    pub y: VAlign,
}

impl Anchor {
    pub const CENTER: Anchor = Anchor::new(HAlign::Center, VAlign::Center);
    pub const LEFT: Anchor = Anchor::new(HAlign::Left, VAlign::Center);
    pub const RIGHT: Anchor = Anchor::new(HAlign::Right, VAlign::Center);
    pub const BOTTOM: Anchor = Anchor::new(HAlign::Center, VAlign::Bottom);
    pub const TOP: Anchor = Anchor::new(HAlign::Center, VAlign::Top);

    pub const fn new(x: HAlign, y: VAlign) -> Self {
        Self { x, y }
    }

    /// Anchor at an explicit pixel offset from the bottom-left corner.
    pub const fn explicit(x: f32, y: f32) -> Self {
        Self::new(HAlign::Offset(x), VAlign::Offset(y))
    }
}

impl Default for Anchor {
    /// Bottom-left.
    fn default() -> Self {
        Anchor::new(HAlign::Left, VAlign::Bottom)
    }
}

impl FromStr for Anchor {
    type Err = std::convert::Infallible;

    /// Named anchors; anything unrecognised falls back to bottom-left.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "center" => Anchor::CENTER,
            "left" => Anchor::LEFT,
            "right" => Anchor::RIGHT,
            "bottom" => Anchor::BOTTOM,
            "top" => Anchor::TOP,
            _ => Anchor::default(),
        })
    }
}

/// RGBA color, 8 bits per channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color(pub [u8; 4]);

impl Color {
    pub const WHITE: Color = Color([255, 255, 255, 255]);

    /// Opaque color from three channels.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Color([r, g, b, 255])
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Color([r, g, b, a])
    }
}

impl Default for Color {
    fn default() -> Self {
        Color::WHITE
    }
}

impl From<[u8; 3]> for Color {
    fn from([r, g, b]: [u8; 3]) -> Self {
        Color::rgb(r, g, b)
    }
}

impl From<[u8; 4]> for Color {
    fn from(c: [u8; 4]) -> Self {
        Color(c)
    }
}

/// A text label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Decoration {
    text: String,
    pub position: Vec2,
    pub font_size: f32,
    pub font_name: Option<String>,
    pub color: Color,
    pub anchor: Anchor,
    #[serde(skip)]
    pub(crate) layer: Option<LayerId>,
}

impl Decoration {
    /// Label at `position`, 12pt white, anchored bottom-left.
    pub fn new(text: impl Into<String>, position: impl Into<Vec2>) -> Self {
        Self {
            text: text.into(),
            position: position.into(),
            font_size: 12.0,
            font_name: None,
            color: Color::WHITE,
            anchor: Anchor::default(),
            layer: None,
        }
    }

    pub fn with_font_size(mut self, size: f32) -> Self {
        self.font_size = size;
        self
    }

    pub fn with_font(mut self, name: impl Into<String>) -> Self {
        self.font_name = Some(name.into());
        self
    }

    pub fn with_color(mut self, color: impl Into<Color>) -> Self {
        self.color = color.into();
        self
    }

    pub fn with_anchor(mut self, anchor: Anchor) -> Self {
        self.anchor = anchor;
        self
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    /// The layer this label is attached to, if any.
    pub fn layer(&self) -> Option<LayerId> {
        self.layer
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn named_anchors_parse() {
        assert_eq!("center".parse::<Anchor>().unwrap(), Anchor::CENTER);
        assert_eq!("top".parse::<Anchor>().unwrap(), Anchor::TOP);
        assert_eq!("sideways".parse::<Anchor>().unwrap(), Anchor::default());
    }

    #[test]
    fn explicit_anchor_keeps_offsets() {
        let label = Decoration::new("hp", (0.0, 0.0)).with_anchor(Anchor::explicit(4.0, 2.5));
        assert_eq!(label.anchor.x, HAlign::Offset(4.0));
        assert_eq!(label.anchor.y, VAlign::Offset(2.5));
    }

    #[test]
    fn three_channel_color_is_opaque() {
        let label = Decoration::new("score: 0", (10.0, 10.0)).with_color([10, 20, 30]);
        assert_eq!(label.color, Color([10, 20, 30, 255]));
    }

    #[test]
    fn text_can_be_replaced() {
        let mut label = Decoration::new("lives: 3", Vec2::ZERO);
        label.set_text("lives: 2");
        assert_eq!(label.text(), "lives: 2");
        assert_eq!(label.layer(), None);
    }
}
