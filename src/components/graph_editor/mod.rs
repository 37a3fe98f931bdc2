//! Force-directed node/link editor drawn on a 2D canvas.

mod component;
pub mod layout;
pub mod model;
pub mod reconcile;
pub mod reducer;
mod render;
mod state;
pub mod types;
pub mod viewport;

pub use component::GraphEditor;
pub use layout::{LayoutParams, Simulation};
pub use model::{ConnectError, Graph};
pub use reconcile::{CardGeometry, Scene};
pub use reducer::{Action, Change, EditorState, HitTarget, Interaction, Key, LayoutEffect, reduce};
pub use state::EditorRuntime;
pub use types::{Direction, GraphPoint, Link, LinkKey, Modifiers, Node, NodeId, ScreenPoint, Selection};
pub use viewport::Viewport;
