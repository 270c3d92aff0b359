//! Geometry types for cell grids and drawing rectangles.
//!
//! - [`Point`]: a cell coordinate with signed components
//! - [`Size`]: grid dimensions in cells
//! - [`Rect`]: an origin plus a size, used for clipping
//! - [`Alignment`]: how an inner box is anchored inside an outer one
//!
//! Coordinates are measured in character cells with (0, 0) at the top-left
//! corner, x growing to the right and y growing downward.

use crate::error::Error;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Sub, SubAssign};
use std::str::FromStr;

// ============================================================================
// Point
// ============================================================================

/// A 2D point with signed integer coordinates.
///
/// # Examples
///
/// ```
/// use fastterm_core::geometry::Point;
///
/// let p = Point::new(10, 20) + Point::new(5, 5);
/// assert_eq!(p, Point::new(15, 25));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Point {
    /// The x coordinate (column).
    pub x: i32,
    /// The y coordinate (row).
    pub y: i32,
}

impl Point {
    /// The origin point (0, 0).
    pub const ZERO: Self = Self { x: 0, y: 0 };

    /// Creates a new point at the given coordinates.
    #[inline]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Returns the point moved by the given offset.
    #[inline]
    pub const fn offset(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x.saturating_add(dx),
            y: self.y.saturating_add(dy),
        }
    }
}

impl Add for Point {
    type Output = Self;

    #[inline]
    fn add(self, rhs: Self) -> Self::Output {
        self.offset(rhs.x, rhs.y)
    }
}

impl AddAssign for Point {
    #[inline]
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl Sub for Point {
    type Output = Self;

    #[inline]
    fn sub(self, rhs: Self) -> Self::Output {
        Self {
            x: self.x.saturating_sub(rhs.x),
            y: self.y.saturating_sub(rhs.y),
        }
    }
}

impl SubAssign for Point {
    #[inline]
    fn sub_assign(&mut self, rhs: Self) {
        *self = *self - rhs;
    }
}

impl From<(i32, i32)> for Point {
    #[inline]
    fn from((x, y): (i32, i32)) -> Self {
        Self::new(x, y)
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

// ============================================================================
// Size
// ============================================================================

/// Grid dimensions measured in cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Size {
    /// Number of columns.
    pub width: u16,
    /// Number of rows.
    pub height: u16,
}

impl Size {
    /// A size with zero width and height.
    pub const ZERO: Self = Self {
        width: 0,
        height: 0,
    };

    /// Creates a new size.
    #[inline]
    pub const fn new(width: u16, height: u16) -> Self {
        Self { width, height }
    }

    /// Returns the number of cells covered by this size.
    #[inline]
    pub const fn area(self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Returns whether either dimension is zero.
    #[inline]
    pub const fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Returns `self - inner` per axis as signed values.
    ///
    /// The slack is negative along an axis where `inner` is larger.
    #[inline]
    pub const fn slack(self, inner: Self) -> Point {
        Point::new(
            self.width as i32 - inner.width as i32,
            self.height as i32 - inner.height as i32,
        )
    }
}

impl From<(u16, u16)> for Size {
    #[inline]
    fn from((width, height): (u16, u16)) -> Self {
        Self::new(width, height)
    }
}

impl From<Size> for (u16, u16) {
    #[inline]
    fn from(size: Size) -> Self {
        (size.width, size.height)
    }
}

impl fmt::Display for Size {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

// ============================================================================
// Rect
// ============================================================================

/// A rectangle defined by its top-left corner and a size.
///
/// # Examples
///
/// ```
/// use fastterm_core::geometry::Rect;
///
/// let clip = Rect::new(0, 0, 10, 10);
/// let area = Rect::new(5, 5, 10, 10);
/// assert_eq!(clip.intersection(area), Some(Rect::new(5, 5, 5, 5)));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rect {
    /// The x coordinate of the left edge.
    pub x: i32,
    /// The y coordinate of the top edge.
    pub y: i32,
    /// The width of the rectangle.
    pub width: u16,
    /// The height of the rectangle.
    pub height: u16,
}

impl Rect {
    /// A zero-sized rectangle at the origin.
    pub const ZERO: Self = Self {
        x: 0,
        y: 0,
        width: 0,
        height: 0,
    };

    /// The whole drawable plane, used when no clipping rectangle is active.
    pub const PLANE: Self = Self {
        x: 0,
        y: 0,
        width: u16::MAX,
        height: u16::MAX,
    };

    /// Creates a new rectangle at the given position with the given size.
    #[inline]
    pub const fn new(x: i32, y: i32, width: u16, height: u16) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Creates a rectangle at the origin with the given size.
    #[inline]
    pub const fn from_size(size: Size) -> Self {
        Self::new(0, 0, size.width, size.height)
    }

    /// Returns the top-left corner.
    #[inline]
    pub const fn position(self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Returns the size.
    #[inline]
    pub const fn size(self) -> Size {
        Size::new(self.width, self.height)
    }

    /// Returns the x coordinate of the left edge.
    #[inline]
    pub const fn left(self) -> i32 {
        self.x
    }

    /// Returns the y coordinate of the top edge.
    #[inline]
    pub const fn top(self) -> i32 {
        self.y
    }

    /// Returns the x coordinate one past the right edge.
    #[inline]
    pub const fn right(self) -> i32 {
        self.x.saturating_add(self.width as i32)
    }

    /// Returns the y coordinate one past the bottom edge.
    #[inline]
    pub const fn bottom(self) -> i32 {
        self.y.saturating_add(self.height as i32)
    }

    /// Returns the number of cells covered.
    #[inline]
    pub const fn area(self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Returns whether the rectangle has zero area.
    #[inline]
    pub const fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Returns whether the rectangle contains the given point.
    #[inline]
    pub const fn contains_point(self, point: Point) -> bool {
        self.contains_xy(point.x, point.y)
    }

    /// Returns whether the rectangle contains the given coordinates.
    #[inline]
    pub const fn contains_xy(self, x: i32, y: i32) -> bool {
        x >= self.x && x < self.right() && y >= self.y && y < self.bottom()
    }

    /// Returns the intersection of this rectangle with another.
    ///
    /// Returns `None` if the rectangles do not overlap.
    #[inline]
    pub fn intersection(self, other: Self) -> Option<Self> {
        let x = self.x.max(other.x);
        let y = self.y.max(other.y);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());

        if x < right && y < bottom {
            Some(Self {
                x,
                y,
                width: (right - x) as u16,
                height: (bottom - y) as u16,
            })
        } else {
            None
        }
    }

    /// Returns the rectangle moved by the given offset.
    #[inline]
    pub const fn translate(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x.saturating_add(dx),
            y: self.y.saturating_add(dy),
            width: self.width,
            height: self.height,
        }
    }

    /// Iterates over every point in row-major order.
    pub fn points(self) -> impl Iterator<Item = Point> {
        let (left, right) = (self.left(), self.right());
        (self.top()..self.bottom()).flat_map(move |y| (left..right).map(move |x| Point::new(x, y)))
    }
}

impl From<(i32, i32, u16, u16)> for Rect {
    #[inline]
    fn from((x, y, width, height): (i32, i32, u16, u16)) -> Self {
        Self::new(x, y, width, height)
    }
}

impl From<Size> for Rect {
    #[inline]
    fn from(size: Size) -> Self {
        Self::from_size(size)
    }
}

// ============================================================================
// Alignment
// ============================================================================

/// Where an inner box is anchored inside an outer one.
///
/// Used both to position drawing rectangles and to decide which part of a
/// frame buffer's content survives a resize.
///
/// # Examples
///
/// ```
/// use fastterm_core::geometry::{Alignment, Rect};
///
/// let outer = Rect::new(0, 0, 10, 4);
/// let inner = Rect::new(0, 0, 4, 2);
/// assert_eq!(Alignment::BottomRight.place(outer, inner), Rect::new(6, 2, 4, 2));
/// assert_eq!(Alignment::Center.place(outer, inner), Rect::new(3, 1, 4, 2));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Alignment {
    /// Anchored to the top-left corner.
    #[default]
    TopLeft,
    /// Anchored to the top-right corner.
    TopRight,
    /// Anchored to the bottom-left corner.
    BottomLeft,
    /// Anchored to the bottom-right corner.
    BottomRight,
    /// Centered on both axes, leaning top-left on odd slack.
    Center,
}

impl Alignment {
    /// Every alignment, in declaration order.
    pub const ALL: [Self; 5] = [
        Self::TopLeft,
        Self::TopRight,
        Self::BottomLeft,
        Self::BottomRight,
        Self::Center,
    ];

    /// Returns the offset of the inner box given `slack = outer - inner`.
    ///
    /// Slack may be negative when the inner box is larger. Center halves the
    /// slack truncating toward zero, so the odd cell ends up bottom/right.
    #[inline]
    pub const fn anchor_offset(self, slack: Point) -> Point {
        match self {
            Self::TopLeft => Point::ZERO,
            Self::TopRight => Point::new(slack.x, 0),
            Self::BottomLeft => Point::new(0, slack.y),
            Self::BottomRight => slack,
            Self::Center => Point::new(slack.x / 2, slack.y / 2),
        }
    }

    /// Positions `inner` relative to `outer` according to this alignment.
    ///
    /// The result is `inner` translated by the outer origin plus the anchor
    /// offset of the size difference. It is not clipped to `outer`.
    #[inline]
    pub const fn place(self, outer: Rect, inner: Rect) -> Rect {
        let offset = self.anchor_offset(outer.size().slack(inner.size()));
        inner.translate(
            outer.x.saturating_add(offset.x),
            outer.y.saturating_add(offset.y),
        )
    }

    /// Returns the canonical kebab-case name.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::TopLeft => "top-left",
            Self::TopRight => "top-right",
            Self::BottomLeft => "bottom-left",
            Self::BottomRight => "bottom-right",
            Self::Center => "center",
        }
    }
}

impl fmt::Display for Alignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Alignment {
    type Err = Error;

    /// Parses names like `top-left`, `TopLeft`, `bottom_right` or `centre`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| !matches!(c, '-' | '_' | ' '))
            .map(|c| c.to_ascii_lowercase())
            .collect();
        match normalized.as_str() {
            "topleft" => Ok(Self::TopLeft),
            "topright" => Ok(Self::TopRight),
            "bottomleft" => Ok(Self::BottomLeft),
            "bottomright" => Ok(Self::BottomRight),
            "center" | "centre" => Ok(Self::Center),
            _ => Err(Error::UnknownAlignment(s.to_string())),
        }
    }
}

impl TryFrom<String> for Alignment {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Alignment> for String {
    fn from(alignment: Alignment) -> Self {
        alignment.as_str().to_string()
    }
}
