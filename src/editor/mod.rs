//! The editing side of synchronization.
//!
//! - `surface`: the text widget interface and an in-memory implementation
//! - `decorations`: replace-not-stack tracking of highlights
//! - `state`: `SyncEngine`, the owner of tree, line map and selection
//! - `tree_view`: visible rows for a tree sidebar
//! - `assist`: hover summaries and key completions
//!
//! # Example
//!
//! ```
//! use std::time::Instant;
//! use yamlsync::config::Config;
//! use yamlsync::editor::state::SyncEngine;
//! use yamlsync::editor::surface::{BufferSurface, TextSurface};
//! use yamlsync::sync::resolver::Position;
//!
//! let mut surface = BufferSurface::new("team:\n  lead: Alice\n");
//! let mut engine = SyncEngine::new(Config::default());
//! engine.on_content_changed(&mut surface, Instant::now());
//!
//! surface.set_cursor(Position::new(2, 4));
//! let path = engine.on_cursor_moved(&surface).unwrap();
//! assert_eq!(path.to_string(), "team.lead");
//! ```

pub mod assist;
pub mod decorations;
pub mod state;
pub mod surface;
pub mod tree_view;
