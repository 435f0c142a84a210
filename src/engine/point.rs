//! Source Positions
//!
//! Points, lengths and ranges used throughout the tree. All byte offsets are
//! 0-based UTF-8 byte counts; a [`Point`] is a 0-based `(row, column)` pair
//! with the column measured in bytes within the row.
//!
//! Syntax nodes store their extent as relative [`Length`]s so that an edit
//! only has to touch the nodes along the edited spine: everything after the
//! edit moves implicitly because its position is the sum of the lengths
//! before it.

use serde::Serialize;
use std::fmt;
use std::ops::{Add, Sub};

/// A `(row, column)` position in source text
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize)]
pub struct Point {
    /// Row (0-based)
    pub row: usize,
    /// Column in bytes (0-based)
    pub column: usize,
}

impl Point {
    /// Create a new point
    #[inline]
    pub const fn new(row: usize, column: usize) -> Self {
        Self { row, column }
    }

    /// The point at the start of input
    #[inline]
    pub const fn zero() -> Self {
        Self { row: 0, column: 0 }
    }

    /// Compute the point of a byte offset by scanning `text`
    pub fn from_offset(text: &[u8], offset: usize) -> Self {
        let offset = offset.min(text.len());
        let head = &text[..offset];
        let row = memchr::memchr_iter(b'\n', head).count();
        let column = match memchr::memrchr(b'\n', head) {
            Some(newline) => offset - newline - 1,
            None => offset,
        };
        Self { row, column }
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.column)
    }
}

/// A relative extent: a byte count plus the rows/columns it spans
///
/// Adding a length whose extent crosses a newline replaces the column
/// instead of accumulating it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Length {
    /// Number of bytes
    pub bytes: usize,
    /// Rows and trailing columns covered
    pub extent: Point,
}

impl Length {
    /// The empty length
    pub const ZERO: Length = Length {
        bytes: 0,
        extent: Point::zero(),
    };

    /// Create a new length
    #[inline]
    pub const fn new(bytes: usize, extent: Point) -> Self {
        Self { bytes, extent }
    }

    /// Length of a piece of text
    pub fn of(text: &[u8]) -> Self {
        Self::new(text.len(), Point::from_offset(text, text.len()))
    }

    /// Whether this length covers no bytes
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bytes == 0
    }
}

impl Add for Length {
    type Output = Length;

    #[inline]
    fn add(self, rhs: Length) -> Length {
        let extent = if rhs.extent.row > 0 {
            Point::new(self.extent.row + rhs.extent.row, rhs.extent.column)
        } else {
            Point::new(self.extent.row, self.extent.column + rhs.extent.column)
        };
        Length::new(self.bytes + rhs.bytes, extent)
    }
}

impl Sub for Length {
    type Output = Length;

    /// Saturating difference; `rhs` is expected to be a prefix of `self`
    #[inline]
    fn sub(self, rhs: Length) -> Length {
        let extent = if self.extent.row > rhs.extent.row {
            Point::new(self.extent.row - rhs.extent.row, self.extent.column)
        } else {
            Point::new(0, self.extent.column.saturating_sub(rhs.extent.column))
        };
        Length::new(self.bytes.saturating_sub(rhs.bytes), extent)
    }
}

/// An absolute range in source text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub struct Range {
    /// Start byte offset (inclusive)
    pub start_byte: usize,
    /// End byte offset (exclusive)
    pub end_byte: usize,
    /// Start point
    pub start_point: Point,
    /// End point
    pub end_point: Point,
}

impl Range {
    /// Build a range from two absolute lengths
    #[inline]
    pub fn from_lengths(start: Length, end: Length) -> Self {
        Self {
            start_byte: start.bytes,
            end_byte: end.bytes,
            start_point: start.extent,
            end_point: end.extent,
        }
    }

    /// Number of bytes covered
    #[inline]
    pub fn len(&self) -> usize {
        self.end_byte - self.start_byte
    }

    /// Whether the range is empty
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.start_byte == self.end_byte
    }

    /// Check if this range contains a byte offset
    #[inline]
    pub fn contains(&self, offset: usize) -> bool {
        offset >= self.start_byte && offset < self.end_byte
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}..{}] {} - {}",
            self.start_byte, self.end_byte, self.start_point, self.end_point
        )
    }
}
