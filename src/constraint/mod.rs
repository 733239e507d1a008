//! Constraint Model
//!
//! A constraint is a viewport classification: an orientation plus the largest
//! length, in the constrained dimension, that the classification covers. The
//! background is refreshed only when a new constraint dominates the one the
//! current background was fetched for.

pub mod breakpoints;

pub use breakpoints::{Breakpoint, BreakpointSet, Viewport};

use crate::error::BackdropError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Viewport orientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    Portrait,
    Landscape,
}

impl Orientation {
    pub fn name(self) -> &'static str {
        match self {
            Orientation::Portrait => "portrait",
            Orientation::Landscape => "landscape",
        }
    }

    /// The dimension an image is sized by in this orientation.
    pub fn dimension(self) -> &'static str {
        match self {
            Orientation::Portrait => "height",
            Orientation::Landscape => "width",
        }
    }
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Orientation {
    type Err = BackdropError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "portrait" => Ok(Orientation::Portrait),
            "landscape" => Ok(Orientation::Landscape),
            other => Err(BackdropError::InvalidArgument(format!(
                "Unknown orientation: {} (must be 'portrait' or 'landscape')",
                other
            ))),
        }
    }
}

/// Upper bound of a constraint, in pixels.
///
/// `Unbounded` orders after every pixel count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Bound {
    Px(u32),
    Unbounded,
}

impl Bound {
    pub fn px(self) -> Option<u32> {
        match self {
            Bound::Px(n) => Some(n),
            Bound::Unbounded => None,
        }
    }

    pub fn contains(self, length: u32) -> bool {
        match self {
            Bound::Px(n) => length <= n,
            Bound::Unbounded => true,
        }
    }
}

impl fmt::Display for Bound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Bound::Px(n) => write!(f, "{}", n),
            Bound::Unbounded => f.write_str("unbounded"),
        }
    }
}

impl FromStr for Bound {
    type Err = BackdropError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        match s.to_ascii_lowercase().as_str() {
            "inf" | "infinity" | "unbounded" => Ok(Bound::Unbounded),
            _ => s
                .parse::<u32>()
                .map(Bound::Px)
                .map_err(|e| BackdropError::InvalidArgument(format!("Invalid bound '{}': {}", s, e))),
        }
    }
}

/// Viewport classification used to size the background image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Constraint {
    pub orientation: Orientation,
    pub bound: Bound,
}

impl Constraint {
    pub const fn new(orientation: Orientation, bound: Bound) -> Self {
        Self { orientation, bound }
    }

    pub const fn portrait(px: u32) -> Self {
        Self::new(Orientation::Portrait, Bound::Px(px))
    }

    pub const fn landscape(px: u32) -> Self {
        Self::new(Orientation::Landscape, Bound::Px(px))
    }

    pub const fn unbounded(orientation: Orientation) -> Self {
        Self::new(orientation, Bound::Unbounded)
    }

    /// Whether moving from `self` to `candidate` needs a new image.
    ///
    /// True on an orientation change, or on a strictly larger bound in the same
    /// orientation. Shrinking never requires an update.
    pub fn requires_update(&self, candidate: &Constraint) -> bool {
        candidate.orientation != self.orientation || candidate.bound > self.bound
    }

    /// `width=N` / `height=N`, or an empty string when unbounded.
    pub fn to_query_string(&self) -> String {
        match self.bound {
            Bound::Px(n) => format!("{}={}", self.orientation.dimension(), n),
            Bound::Unbounded => String::new(),
        }
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.orientation, self.bound)
    }
}

impl FromStr for Constraint {
    type Err = BackdropError;

    /// Parses `portrait/480` or `landscape/unbounded`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (orientation, bound) = s.split_once('/').ok_or_else(|| {
            BackdropError::InvalidArgument(format!(
                "Invalid constraint '{}' (expected ORIENTATION/BOUND)",
                s
            ))
        })?;
        Ok(Constraint::new(orientation.parse()?, bound.parse()?))
    }
}
