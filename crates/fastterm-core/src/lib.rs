//! Core types for `fastterm`.
//!
//! This crate holds the value types every other fastterm crate builds on:
//!
//! - [`color`]: ARGB colors with interpolation, alpha blending and hex parsing
//! - [`geometry`]: cell coordinates, sizes, rectangles and [`Alignment`]
//! - [`error`]: the shared error type
//!
//! # Examples
//!
//! ```
//! use fastterm_core::{Alignment, Color, Rect};
//!
//! let shade = Color::alpha_blend(Color::BLACK, Color::argb(64, 255, 255, 255));
//! assert!(shade.is_opaque());
//!
//! let panel = Alignment::Center.place(Rect::new(0, 0, 80, 24), Rect::new(0, 0, 20, 4));
//! assert_eq!(panel, Rect::new(30, 10, 20, 4));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::return_self_not_must_use)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::float_cmp)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::match_same_arms)]

pub mod color;
pub mod error;
pub mod geometry;

// Re-export commonly used types at the crate root for convenience
pub use color::Color;
pub use error::{ColorParseError, Error, Result};
pub use geometry::{Alignment, Point, Rect, Size};
