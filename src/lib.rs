//! Host side of the twibbon editor.
//!
//! The `canvas` crate owns placement and compositing. This crate adds what
//! leaves the process: environment configuration, the campaign server
//! client, and the [`session::Session`] that drives one editor through
//! upload, download and save.

pub mod config;
pub mod services;
pub mod session;
