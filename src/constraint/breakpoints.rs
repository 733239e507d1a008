//! Breakpoint ranges and viewport classification.

use super::{Bound, Constraint, Orientation};
use crate::error::BackdropError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Standard landscape breakpoints (viewport widths).
pub const STANDARD_WIDTHS: &[u32] = &[480, 736, 980, 1280, 1690, 1920, 2880];

/// Standard portrait breakpoints (viewport heights).
pub const STANDARD_HEIGHTS: &[u32] = &[480, 736, 980, 1280, 1690];

/// Concrete viewport size in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Portrait when the height is at least the width.
    pub fn orientation(&self) -> Orientation {
        if self.height >= self.width {
            Orientation::Portrait
        } else {
            Orientation::Landscape
        }
    }

    pub fn length(&self, orientation: Orientation) -> u32 {
        match orientation {
            Orientation::Portrait => self.height,
            Orientation::Landscape => self.width,
        }
    }
}

impl fmt::Display for Viewport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

impl FromStr for Viewport {
    type Err = BackdropError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || {
            BackdropError::InvalidArgument(format!(
                "Invalid viewport '{}' (expected WIDTHxHEIGHT)",
                s
            ))
        };
        let (w, h) = s.trim().split_once(['x', 'X']).ok_or_else(invalid)?;
        let width = w.trim().parse().map_err(|_| invalid())?;
        let height = h.trim().parse().map_err(|_| invalid())?;
        Ok(Viewport { width, height })
    }
}

/// A contiguous range `[low, constraint.bound]` in one orientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Breakpoint {
    pub low: u32,
    pub constraint: Constraint,
}

impl Breakpoint {
    pub fn matches(&self, viewport: &Viewport) -> bool {
        let orientation = self.constraint.orientation;
        if viewport.orientation() != orientation {
            return false;
        }
        let length = viewport.length(orientation);
        length >= self.low && self.constraint.bound.contains(length)
    }

    /// CSS media query equivalent of this range.
    pub fn to_media_query(&self) -> String {
        let orientation = self.constraint.orientation;
        let mut mq = format!("(orientation: {})", orientation.name());
        if self.low != 0 {
            mq.push_str(&format!(
                " and (min-{}: {}px)",
                orientation.dimension(),
                self.low
            ));
        }
        if let Bound::Px(high) = self.constraint.bound {
            mq.push_str(&format!(
                " and (max-{}: {}px)",
                orientation.dimension(),
                high
            ));
        }
        mq
    }
}

/// All registered breakpoints, landscape first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BreakpointSet {
    breakpoints: Vec<Breakpoint>,
}

impl BreakpointSet {
    pub fn standard() -> Self {
        // The standard lists are ascending and non-zero.
        Self {
            breakpoints: ranges(Orientation::Landscape, STANDARD_WIDTHS)
                .into_iter()
                .chain(ranges(Orientation::Portrait, STANDARD_HEIGHTS))
                .collect(),
        }
    }

    /// Build ranges from ascending widths (landscape) and heights (portrait).
    pub fn from_lengths(widths: &[u32], heights: &[u32]) -> Result<Self, BackdropError> {
        validate_lengths("widths", widths)?;
        validate_lengths("heights", heights)?;
        let mut breakpoints = ranges(Orientation::Landscape, widths);
        breakpoints.extend(ranges(Orientation::Portrait, heights));
        Ok(Self { breakpoints })
    }

    pub fn classify(&self, viewport: &Viewport) -> Option<&Breakpoint> {
        self.breakpoints.iter().find(|b| b.matches(viewport))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Breakpoint> {
        self.breakpoints.iter()
    }

    pub fn len(&self) -> usize {
        self.breakpoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.breakpoints.is_empty()
    }
}

impl Default for BreakpointSet {
    fn default() -> Self {
        Self::standard()
    }
}

fn validate_lengths(name: &str, lengths: &[u32]) -> Result<(), BackdropError> {
    if lengths.first() == Some(&0) {
        return Err(BackdropError::Config(format!(
            "Breakpoint {} must be non-zero",
            name
        )));
    }
    // The open-ended range above the last length starts at last + 1.
    if lengths.last() == Some(&u32::MAX) {
        return Err(BackdropError::Config(format!(
            "Breakpoint {} must be below {}",
            name,
            u32::MAX
        )));
    }
    if lengths.windows(2).any(|w| w[0] >= w[1]) {
        return Err(BackdropError::Config(format!(
            "Breakpoint {} must be strictly ascending: {:?}",
            name, lengths
        )));
    }
    Ok(())
}

fn ranges(orientation: Orientation, lengths: &[u32]) -> Vec<Breakpoint> {
    let mut out = Vec::with_capacity(lengths.len() + 1);
    let mut low = 0;
    for &high in lengths {
        out.push(Breakpoint {
            low,
            constraint: Constraint::new(orientation, Bound::Px(high)),
        });
        low = high.saturating_add(1);
    }
    if !lengths.is_empty() {
        out.push(Breakpoint {
            low,
            constraint: Constraint::unbounded(orientation),
        });
    }
    out
}
