//! Typed host-domain contracts shared by the desktop runtime and its embedding host.
//!
//! This crate is the API-first boundary for platform services: geometry primitives, the
//! immediate-mode [`RenderSurface`] the runtime draws through, lightweight preference storage,
//! and the frame clock. Concrete GPU or storage backends live in the embedding application.

#![warn(missing_docs, rustdoc::broken_intra_doc_links)]

pub mod geometry;
pub mod render;
pub mod storage;
pub mod time;

pub use geometry::{Color, Vec2, WindowRect};
pub use render::{DrawCommand, RecordingSurface, RenderSurface, RenderTarget, Texture};
pub use storage::prefs::{load_pref_with, save_pref_with, MemoryPrefsStore, PrefsStore};
pub use time::{FrameClock, FrameTime};
