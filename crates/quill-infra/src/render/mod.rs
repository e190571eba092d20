//! Rendering layer implementations.

mod json;

pub use json::JsonRenderer;
