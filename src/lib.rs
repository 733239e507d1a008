//! Backdrop: Responsive Background Resolution
//!
//! Picks a background image for a session and fetches a variant sized for the
//! current viewport breakpoint, refreshing only when a breakpoint change needs a
//! larger or differently oriented image.

pub mod background;
pub mod config;
pub mod constraint;
pub mod error;
pub mod logging;
pub mod source;
pub mod tooling;
