//! Background Manager
//!
//! Owns the session's background state: the selected image, the constraint the
//! visible background satisfies, and the generation counter that decides which
//! in-flight update may still be applied.
//!
//! Only the most recently dispatched update is ever applied. An update whose
//! generation has been overtaken by the time its fetch completes is dropped,
//! whether it succeeded or failed. A constraint the shown background already
//! satisfies cancels any outstanding update instead of waiting for it.

use super::resolver::BackgroundResolver;
use super::surface::BackgroundSurface;
use crate::constraint::{BreakpointSet, Constraint, Viewport};
use crate::error::BackdropError;
use parking_lot::Mutex;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, error, info};

/// What is currently displayed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum BackgroundState {
    Empty,
    Shown { constraint: Constraint, key: String },
    /// Nothing could be fetched; any constraint triggers a retry.
    Fallback,
}

impl BackgroundState {
    pub fn current_constraint(&self) -> Option<&Constraint> {
        match self {
            BackgroundState::Shown { constraint, .. } => Some(constraint),
            BackgroundState::Empty | BackgroundState::Fallback => None,
        }
    }

    fn satisfies(&self, candidate: &Constraint) -> bool {
        self.current_constraint()
            .map(|current| !current.requires_update(candidate))
            .unwrap_or(false)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum UpdateOutcome {
    /// The current background already satisfies the constraint.
    Skipped,
    /// The viewport matched no registered breakpoint.
    NoBreakpoint,
    Applied {
        constraint: Constraint,
        from_cache: bool,
    },
    /// A later update was dispatched before this one completed.
    Superseded,
}

struct ManagerState {
    background: BackgroundState,
    generation: u64,
    /// Target of the latest dispatch while its fetch is outstanding.
    pending: Option<Constraint>,
    last_error: Option<BackdropError>,
}

pub struct BackgroundManager {
    identifier: String,
    breakpoints: BreakpointSet,
    resolver: Arc<BackgroundResolver>,
    surface: Arc<dyn BackgroundSurface>,
    state: Mutex<ManagerState>,
}

impl BackgroundManager {
    pub fn new(
        identifier: String,
        breakpoints: BreakpointSet,
        resolver: Arc<BackgroundResolver>,
        surface: Arc<dyn BackgroundSurface>,
    ) -> Self {
        Self {
            identifier,
            breakpoints,
            resolver,
            surface,
            state: Mutex::new(ManagerState {
                background: BackgroundState::Empty,
                generation: 0,
                pending: None,
                last_error: None,
            }),
        }
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn breakpoints(&self) -> &BreakpointSet {
        &self.breakpoints
    }

    pub fn resolver(&self) -> &Arc<BackgroundResolver> {
        &self.resolver
    }

    pub fn state(&self) -> BackgroundState {
        self.state.lock().background.clone()
    }

    pub fn current_constraint(&self) -> Option<Constraint> {
        self.state.lock().background.current_constraint().copied()
    }

    /// Constraint of the update currently being fetched, if any.
    pub fn pending_constraint(&self) -> Option<Constraint> {
        self.state.lock().pending
    }

    /// Most recent failure that reached the surface, if any.
    pub fn last_error(&self) -> Option<BackdropError> {
        self.state.lock().last_error.clone()
    }

    /// Classify `viewport` and update to its breakpoint's constraint.
    pub async fn handle_viewport(&self, viewport: Viewport) -> Result<UpdateOutcome, BackdropError> {
        let Some(breakpoint) = self.breakpoints.classify(&viewport) else {
            debug!(viewport = %viewport, "Viewport matches no breakpoint");
            return Ok(UpdateOutcome::NoBreakpoint);
        };
        let constraint = breakpoint.constraint;
        debug!(viewport = %viewport, constraint = %constraint, "Viewport classified");
        self.update_constraint(constraint).await
    }

    pub async fn update_constraint(
        &self,
        constraint: Constraint,
    ) -> Result<UpdateOutcome, BackdropError> {
        let token = {
            let mut state = self.state.lock();
            if state.background.satisfies(&constraint) {
                // An outstanding fetch must not replace a background that fits.
                if let Some(cancelled) = state.pending.take() {
                    state.generation += 1;
                    debug!(cancelled = %cancelled, "Cancelling outstanding background update");
                }
                debug!(constraint = %constraint, "Current background satisfies constraint");
                return Ok(UpdateOutcome::Skipped);
            }
            if let Some(pending) = state.pending {
                if !pending.requires_update(&constraint) {
                    debug!(
                        constraint = %constraint,
                        pending = %pending,
                        "Pending update satisfies constraint"
                    );
                    return Ok(UpdateOutcome::Skipped);
                }
            }
            state.generation += 1;
            state.pending = Some(constraint);
            state.generation
        };

        let result = self.resolver.resolve(&self.identifier, &constraint).await;

        let mut state = self.state.lock();
        if state.generation != token {
            debug!(
                constraint = %constraint,
                generation = token,
                latest = state.generation,
                "Dropping superseded background update"
            );
            return Ok(UpdateOutcome::Superseded);
        }
        state.pending = None;

        match result {
            Ok(resolved) => {
                let key = resolved.variant.key.clone();
                self.surface.update_legend(&resolved.variant.legend);
                self.surface.show_background(resolved.variant);
                state.background = BackgroundState::Shown { constraint, key };
                info!(
                    image = %self.identifier,
                    constraint = %constraint,
                    from_cache = resolved.from_cache,
                    "Background updated"
                );
                Ok(UpdateOutcome::Applied {
                    constraint,
                    from_cache: resolved.from_cache,
                })
            }
            Err(err) => {
                error!(
                    image = %self.identifier,
                    constraint = %constraint,
                    class = ?err.class(),
                    error = %err,
                    "Background update failed"
                );
                if state.background.current_constraint().is_none() {
                    self.surface.show_fallback(self.resolver.defaults());
                    state.background = BackgroundState::Fallback;
                }
                state.last_error = Some(err.clone());
                Err(err)
            }
        }
    }
}
