//! Photo placement and compositing engine for the twibbon editor.
//!
//! The crate owns everything between raw pointer input and the finished
//! square image: where the user's photo sits, how it is scaled, and how it
//! is composited under the campaign frame. It builds natively (the `twibbon`
//! CLI and the test suite) and for WebAssembly, where [`engine::Engine`]
//! presents the surface into an `HtmlCanvasElement`. Persisting the result
//! is left to the host.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`engine`] | Top-level engine and testable [`engine::EngineCore`] |
//! | [`store`] | Photo and its transform (offset + cover-fit scale) |
//! | [`render`] | Compositor and the scoped-transform painter |
//! | [`input`] | Mouse/touch adapters and the drag state machine |
//! | [`viewport`] | Surface size, display rect, client-to-surface mapping |
//! | [`photo`] | Decoded photo and frame bitmaps |
//! | [`export`] | PNG and data URL encoding |
//! | [`error`] | Crate error type |
//! | [`consts`] | Shared constants (surface side, cursors, export names) |

pub mod consts;
pub mod engine;
pub mod error;
pub mod export;
pub mod input;
pub mod photo;
pub mod render;
pub mod store;
pub mod viewport;
