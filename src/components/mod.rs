//! Reusable Leptos components.

pub mod auth_gate;
pub mod graph_editor;
