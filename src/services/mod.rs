//! Services: network-facing operations of the editor.

pub mod campaign;
