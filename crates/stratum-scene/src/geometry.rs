//! 2D vectors, collision shapes, and the overlap predicates between them.
//!
//! A [`Shape`] is either a circle or an axis-aligned rectangle. Its center is
//! derived each frame from the owning entity's position and [`Visual`]
//! extents, so the shape always sits over what a renderer would draw.

use std::fmt;
use std::ops::{Add, Mul, Neg, Sub};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::SceneError;

// ---------------------------------------------------------------------------
// Vec2
// ---------------------------------------------------------------------------

/// A 2D vector / point.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec2 {
    /// Horizontal coordinate.
    pub x: f64,
    /// Vertical coordinate.
    pub y: f64,
}

impl Vec2 {
    /// The origin.
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    #[inline]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean length.
    #[inline]
    pub fn length(self) -> f64 {
        self.x.hypot(self.y)
    }

    /// Euclidean distance to `other`.
    #[inline]
    pub fn distance(self, other: Vec2) -> f64 {
        (self - other).length()
    }
}

impl Add for Vec2 {
    type Output = Vec2;

    fn add(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Vec2 {
    type Output = Vec2;

    fn sub(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f64> for Vec2 {
    type Output = Vec2;

    fn mul(self, rhs: f64) -> Vec2 {
        Vec2::new(self.x * rhs, self.y * rhs)
    }
}

impl Neg for Vec2 {
    type Output = Vec2;

    fn neg(self) -> Vec2 {
        Vec2::new(-self.x, -self.y)
    }
}

impl From<(f64, f64)> for Vec2 {
    fn from((x, y): (f64, f64)) -> Self {
        Vec2::new(x, y)
    }
}

impl fmt::Display for Vec2 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

// ---------------------------------------------------------------------------
// Shape
// ---------------------------------------------------------------------------

/// Geometric collision primitive.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Shape {
    /// Circle with a center and radius.
    Circle {
        /// Center point.
        center: Vec2,
        /// Radius.
        radius: f64,
    },
    /// Axis-aligned rectangle with a center and half-extents.
    Rect {
        /// Center point.
        center: Vec2,
        /// Half-width along the x-axis.
        half_x: f64,
        /// Half-height along the y-axis.
        half_y: f64,
    },
}

impl Shape {
    /// Circle constructor.
    pub fn circle(center: impl Into<Vec2>, radius: f64) -> Self {
        Shape::Circle {
            center: center.into(),
            radius,
        }
    }

    /// Axis-aligned rectangle constructor from half-extents.
    pub fn rect(center: impl Into<Vec2>, half_x: f64, half_y: f64) -> Self {
        Shape::Rect {
            center: center.into(),
            half_x,
            half_y,
        }
    }

    /// The shape's center.
    pub fn center(&self) -> Vec2 {
        match *self {
            Shape::Circle { center, .. } | Shape::Rect { center, .. } => center,
        }
    }

    /// Move the shape so its center is at `new_center`. Size is unchanged.
    pub fn set_center(&mut self, new_center: Vec2) {
        match self {
            Shape::Circle { center, .. } | Shape::Rect { center, .. } => *center = new_center,
        }
    }

    /// Whether this shape overlaps `other`. Touching edges count as overlap.
    ///
    /// Pure predicate; `a.overlaps(&b) == b.overlaps(&a)` for every pair.
    pub fn overlaps(&self, other: &Shape) -> bool {
        match (*self, *other) {
            (
                Shape::Circle {
                    center: c1,
                    radius: r1,
                },
                Shape::Circle {
                    center: c2,
                    radius: r2,
                },
            ) => c1.distance(c2) <= r1 + r2,
            (
                Shape::Rect {
                    center: c1,
                    half_x: hx1,
                    half_y: hy1,
                },
                Shape::Rect {
                    center: c2,
                    half_x: hx2,
                    half_y: hy2,
                },
            ) => (c1.x - c2.x).abs() <= hx1 + hx2 && (c1.y - c2.y).abs() <= hy1 + hy2,
            (Shape::Circle { center, radius }, rect @ Shape::Rect { .. })
            | (rect @ Shape::Rect { .. }, Shape::Circle { center, radius }) => {
                rect_circle_overlap(&rect, center, radius)
            }
        }
    }
}

/// Distance from the circle center to the closest point of the rectangle,
/// compared against the radius.
fn rect_circle_overlap(rect: &Shape, circle_center: Vec2, radius: f64) -> bool {
    let Shape::Rect {
        center,
        half_x,
        half_y,
    } = *rect
    else {
        return false;
    };
    let closest = Vec2::new(
        circle_center.x.max(center.x - half_x).min(center.x + half_x),
        circle_center.y.max(center.y - half_y).min(center.y + half_y),
    );
    closest.distance(circle_center) <= radius
}

// ---------------------------------------------------------------------------
// Visual
// ---------------------------------------------------------------------------

/// Visual extents of an entity: what a renderer draws at its position.
///
/// `anchor` is the point of the unscaled image that sits on the entity's
/// position; `(0, 0)` puts the position at the bottom-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Visual {
    /// Unscaled width.
    pub width: f64,
    /// Unscaled height.
    pub height: f64,
    /// Anchor offset inside the unscaled image.
    #[serde(default)]
    pub anchor: Vec2,
    /// Uniform scale factor.
    #[serde(default = "default_scale")]
    pub scale: f64,
}

fn default_scale() -> f64 {
    1.0
}

impl Visual {
    /// Bottom-left anchored visual of the given size, scale 1.
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            anchor: Vec2::ZERO,
            scale: 1.0,
        }
    }

    /// Builder: set the anchor.
    pub fn with_anchor(mut self, anchor: impl Into<Vec2>) -> Self {
        self.anchor = anchor.into();
        self
    }

    /// Builder: set the scale.
    pub fn with_scale(mut self, scale: f64) -> Self {
        self.scale = scale;
        self
    }

    /// Scaled `(width, height)`.
    pub fn size(&self) -> (f64, f64) {
        (self.width * self.scale, self.height * self.scale)
    }

    /// Center of the drawn image when the entity is at `position`.
    pub fn center_at(&self, position: Vec2) -> Vec2 {
        let (w, h) = self.size();
        position - self.anchor * self.scale + Vec2::new(w / 2.0, h / 2.0)
    }
}

impl Default for Visual {
    fn default() -> Self {
        Self::new(0.0, 0.0)
    }
}

// ---------------------------------------------------------------------------
// ShapeKind
// ---------------------------------------------------------------------------

/// How an entity derives its collision [`Shape`] from its [`Visual`].
///
/// Resolved once when the entity is built; string tags are parsed with
/// [`FromStr`] and unknown tags are rejected with
/// [`SceneError::InvalidShapeKind`].
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeKind {
    /// Radius is half the larger scaled side.
    Circle,
    /// Half-extents are half the scaled size.
    #[default]
    Rectangle,
    /// Use the given shape as-is (its center is still recomputed per frame).
    Explicit(Shape),
}

impl ShapeKind {
    /// Build the collision shape for `visual` placed at `position`.
    pub fn build(&self, visual: &Visual, position: Vec2) -> Shape {
        let center = visual.center_at(position);
        let (w, h) = visual.size();
        match *self {
            ShapeKind::Circle => Shape::circle(center, w.max(h) / 2.0),
            ShapeKind::Rectangle => Shape::rect(center, w / 2.0, h / 2.0),
            ShapeKind::Explicit(shape) => shape,
        }
    }

    /// Tag used in configuration, `None` for explicit shapes.
    pub fn tag(&self) -> Option<&'static str> {
        match self {
            ShapeKind::Circle => Some("circle"),
            ShapeKind::Rectangle => Some("rectangle"),
            ShapeKind::Explicit(_) => None,
        }
    }
}

impl FromStr for ShapeKind {
    type Err = SceneError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "circle" => Ok(ShapeKind::Circle),
            "rectangle" => Ok(ShapeKind::Rectangle),
            other => Err(SceneError::InvalidShapeKind {
                value: other.to_owned(),
            }),
        }
    }
}

impl From<Shape> for ShapeKind {
    fn from(shape: Shape) -> Self {
        ShapeKind::Explicit(shape)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
