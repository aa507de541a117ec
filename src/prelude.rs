//! Griddle Prelude
//!
//! A convenient way to import the types and functions a typical baking
//! workflow touches.
//!
//! ```rust
//! use griddle::prelude::*;
//! ```

// Re-export the document model
pub use crate::document::image::Image;
pub use crate::document::material::Material;
pub use crate::document::mesh::{Face, Mesh, UvLayer};
pub use crate::document::nodes::{NodeGraph, NodeKind, ShaderNode};
pub use crate::document::object::Object;
pub use crate::document::Document;

// Re-export the baker operations and their collaborators
pub use crate::baker::engine::{BakeEngine, BakeError, BakeMode};
pub use crate::baker::grid::{ensure_grid_material, GRID_MATERIAL_NAME};
pub use crate::baker::session::UnwrapSession;
pub use crate::baker::settings::BakeSettings;
pub use crate::baker::{bake_and_restore, prepare_for_unwrap, BakeOutcome, UNWRAP_UV_LAYER};

// Re-export the error type
pub use crate::error::BakerError;

// Re-export common external dependencies
pub use cgmath::{Vector2, Vector3};
