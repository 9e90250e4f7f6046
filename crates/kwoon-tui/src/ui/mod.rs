//! Terminal UI module using ratatui.
//!
//! This module provides the TUI rendering and input handling:
//!
//! - `render`: Frame layout, navigation bar, status bar and overlays
//! - `input`: Keyboard event handling
//! - `styles`: Color schemes and text styling
//! - `tabs`: Per-screen content rendering (dashboard, events, directory lists)

pub mod input;
pub mod render;
pub mod styles;
pub mod tabs;
