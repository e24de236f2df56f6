//! Self-clearing decorations.
//!
//! At most one decoration per style is live at a time: adding a new one
//! clears the previous handle first. Temporary decorations carry a deadline
//! and are cleared by `tick` once it passes, standing in for a timer.

use super::surface::{Decoration, DecorationHandle, DecorationStyle, TextSurface};
use std::collections::HashMap;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy)]
struct Active {
    handle: DecorationHandle,
    expires_at: Option<Instant>,
}

/// Tracks the live decoration handle for each style.
#[derive(Debug, Default)]
pub struct DecorationTracker {
    active: HashMap<DecorationStyle, Active>,
}

impl DecorationTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `decoration`, replacing any live decoration of the same style.
    ///
    /// With a `lifetime`, the decoration expires at `now + lifetime`.
    pub fn replace<S: TextSurface + ?Sized>(
        &mut self,
        surface: &mut S,
        decoration: Decoration,
        lifetime: Option<Duration>,
        now: Instant,
    ) -> DecorationHandle {
        self.clear(surface, decoration.style);
        let handle = surface.add_decoration(decoration);
        self.active.insert(
            decoration.style,
            Active {
                handle,
                expires_at: lifetime.map(|lifetime| now + lifetime),
            },
        );
        handle
    }

    /// Clears the live decoration of `style`, if any.
    pub fn clear<S: TextSurface + ?Sized>(&mut self, surface: &mut S, style: DecorationStyle) {
        if let Some(active) = self.active.remove(&style) {
            surface.clear_decoration(active.handle);
        }
    }

    /// Clears every decoration whose deadline is at or before `now`.
    ///
    /// Returns the number cleared.
    pub fn tick<S: TextSurface + ?Sized>(&mut self, surface: &mut S, now: Instant) -> usize {
        let expired: Vec<DecorationStyle> = self
            .active
            .iter()
            .filter(|(_, active)| active.expires_at.is_some_and(|at| at <= now))
            .map(|(style, _)| *style)
            .collect();

        for style in &expired {
            self.clear(surface, *style);
        }
        if !expired.is_empty() {
            tracing::debug!(count = expired.len(), "cleared expired decorations");
        }
        expired.len()
    }

    pub fn handle(&self, style: DecorationStyle) -> Option<DecorationHandle> {
        self.active.get(&style).map(|active| active.handle)
    }

    pub fn is_active(&self, style: DecorationStyle) -> bool {
        self.active.contains_key(&style)
    }
}
