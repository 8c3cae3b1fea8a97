//! Terminal User Interface module.
//!
//! This module provides the TUI for the news reader, including:
//! - Main event loop (`run`)
//! - Input handling for the news and source screens and their overlays
//! - Rendering for headline sections, the source catalogue and overlays
//! - Loader completion and routing event processing
//!
//! # Module Structure
//!
//! - `loop_runner` - Main event loop and terminal management
//! - `input` - Keyboard input handling
//! - `events` - Loader completions and routing requests
//! - `render` - Screen dispatch and overlays
//! - `news` - Headline list widget
//! - `sources` - Source catalogue widget
//! - `help` - Keybinding overlay
//! - `status` - Status bar widget

mod events;
mod help;
mod input;
mod loop_runner;
mod news;
mod render;
mod sources;
mod status;

// Re-export the public API
pub use events::{handle_app_event, handle_articles_loaded, handle_sources_loaded};
pub use input::handle_input;
pub use loop_runner::{run, Action};
