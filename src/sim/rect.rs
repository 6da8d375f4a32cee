//! Axis-aligned rectangle geometry and pairwise collision queries
//!
//! Rectangles are stored as a centre plus size. The world is y-up, so
//! `top = y + h/2` and `bottom = y - h/2`. The z component of the centre is a
//! layer tag and never participates in collision math.
//!
//! Overlap queries treat touching as colliding: tiles are laid edge-to-edge
//! with no gap, and collision response treats contact as a hit. Adjacency
//! queries only report exact bound equality.

use glam::{DVec2, DVec3};
use serde::{Deserialize, Serialize};

use crate::Side;

/// Named reference point on a rectangle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
    Centre,
}

/// A positioned, sized axis-aligned rectangle
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    /// Centre position (z is draw layer only)
    pub position: DVec3,
    /// Width and height, both >= 0
    pub size: DVec2,
}

impl Rect {
    pub fn new(position: DVec3, size: DVec2) -> Self {
        Self {
            position,
            size: size.max(DVec2::ZERO),
        }
    }

    /// Rectangle centred at (x, y) on layer 0
    pub fn from_centre(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self::new(DVec3::new(x, y, 0.0), DVec2::new(width, height))
    }

    #[inline]
    pub fn top(&self) -> f64 {
        self.position.y + self.size.y / 2.0
    }

    #[inline]
    pub fn bottom(&self) -> f64 {
        self.position.y - self.size.y / 2.0
    }

    #[inline]
    pub fn left(&self) -> f64 {
        self.position.x - self.size.x / 2.0
    }

    #[inline]
    pub fn right(&self) -> f64 {
        self.position.x + self.size.x / 2.0
    }

    #[inline]
    pub fn centre(&self) -> DVec2 {
        self.position.truncate()
    }

    pub fn top_left(&self) -> DVec2 {
        DVec2::new(self.left(), self.top())
    }

    pub fn top_right(&self) -> DVec2 {
        DVec2::new(self.right(), self.top())
    }

    pub fn bottom_left(&self) -> DVec2 {
        DVec2::new(self.left(), self.bottom())
    }

    pub fn bottom_right(&self) -> DVec2 {
        DVec2::new(self.right(), self.bottom())
    }

    pub fn anchor(&self, anchor: Anchor) -> DVec2 {
        match anchor {
            Anchor::TopLeft => self.top_left(),
            Anchor::TopRight => self.top_right(),
            Anchor::BottomLeft => self.bottom_left(),
            Anchor::BottomRight => self.bottom_right(),
            Anchor::Centre => self.centre(),
        }
    }
}

/// Result of classifying which edge of a rectangle is being struck
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SideContact {
    /// The named edge of the first rectangle is struck
    Struck(Side),
    /// Both bounds on the axis are exactly equal
    Adjacent,
}

impl SideContact {
    pub fn side(self) -> Option<Side> {
        match self {
            SideContact::Struck(side) => Some(side),
            SideContact::Adjacent => None,
        }
    }
}

#[inline]
fn strictly_between(value: f64, low: f64, high: f64) -> bool {
    value > low && value < high
}

/// Vertical overlap, counting exactly equal tops or bottoms as overlap
pub fn y_overlap(a: &Rect, b: &Rect) -> bool {
    strictly_between(b.top(), a.bottom(), a.top())
        || strictly_between(b.bottom(), a.bottom(), a.top())
        || strictly_between(a.top(), b.bottom(), b.top())
        || strictly_between(a.bottom(), b.bottom(), b.top())
        || a.top() == b.top()
        || a.bottom() == b.bottom()
        || a.top() == b.bottom()
        || a.bottom() == b.top()
}

/// Horizontal overlap, counting exactly equal lefts or rights as overlap
pub fn x_overlap(a: &Rect, b: &Rect) -> bool {
    strictly_between(b.left(), a.left(), a.right())
        || strictly_between(b.right(), a.left(), a.right())
        || strictly_between(a.left(), b.left(), b.right())
        || strictly_between(a.right(), b.left(), b.right())
        || a.left() == b.left()
        || a.right() == b.right()
        || a.left() == b.right()
        || a.right() == b.left()
}

/// B's top or bottom exactly equals A's top or bottom
pub fn y_adjacent(a: &Rect, b: &Rect) -> bool {
    b.top() == a.top() || b.top() == a.bottom() || b.bottom() == a.top() || b.bottom() == a.bottom()
}

/// B's left or right exactly equals A's left or right
pub fn x_adjacent(a: &Rect, b: &Rect) -> bool {
    left_x_adjacent(a, b) || right_x_adjacent(a, b)
}

/// Some bound of B lies exactly on A's left edge
pub fn left_x_adjacent(a: &Rect, b: &Rect) -> bool {
    b.right() == a.left() || b.left() == a.left()
}

/// Some bound of B lies exactly on A's right edge
pub fn right_x_adjacent(a: &Rect, b: &Rect) -> bool {
    b.left() == a.right() || b.right() == a.right()
}

/// Overlapping or touching on both axes
pub fn intersects(a: &Rect, b: &Rect) -> bool {
    y_overlap(a, b) && x_overlap(a, b)
}

/// Which of A's horizontal edges B strikes
///
/// B's bottom inside A means B came down onto A's top; B's top inside A means
/// B rose into A's bottom. The reverse containments are checked next, then
/// exact equality of both bounds.
pub fn side_of_top_bottom_collision(a: &Rect, b: &Rect) -> Option<SideContact> {
    if strictly_between(b.bottom(), a.bottom(), a.top()) {
        Some(SideContact::Struck(Side::Top))
    } else if strictly_between(b.top(), a.bottom(), a.top()) {
        Some(SideContact::Struck(Side::Bottom))
    } else if strictly_between(a.top(), b.bottom(), b.top()) {
        Some(SideContact::Struck(Side::Top))
    } else if strictly_between(a.bottom(), b.bottom(), b.top()) {
        Some(SideContact::Struck(Side::Bottom))
    } else if a.top() == b.top() && a.bottom() == b.bottom() {
        Some(SideContact::Adjacent)
    } else {
        None
    }
}

/// Which of A's vertical edges B strikes
pub fn side_of_left_right_collision(a: &Rect, b: &Rect) -> Option<SideContact> {
    if strictly_between(b.left(), a.left(), a.right()) {
        Some(SideContact::Struck(Side::Right))
    } else if strictly_between(b.right(), a.left(), a.right()) {
        Some(SideContact::Struck(Side::Left))
    } else if strictly_between(a.right(), b.left(), b.right()) {
        Some(SideContact::Struck(Side::Right))
    } else if strictly_between(a.left(), b.left(), b.right()) {
        Some(SideContact::Struck(Side::Left))
    } else if a.left() == b.left() && a.right() == b.right() {
        Some(SideContact::Adjacent)
    } else {
        None
    }
}
