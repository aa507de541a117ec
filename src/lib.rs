// src/lib.rs
//! Griddle
//!
//! A UV-unwrap preparation and texture baking toolkit. Griddle swaps an
//! object's materials for a diagnostic color grid while its UVs are being
//! unwrapped, then restores the originals and bakes their combined
//! appearance (optionally with an alpha cutout) onto a single texture
//! mapped to the new layout.
//!
//! The crate owns the document model (objects, node-based materials,
//! images) and the orchestration; the renderer that actually fills pixels
//! is supplied by the caller through [`baker::engine::BakeEngine`].
//!
//! ```no_run
//! use griddle::prelude::*;
//!
//! struct MyRenderer;
//!
//! impl BakeEngine for MyRenderer {
//!     fn bake(
//!         &mut self,
//!         _document: &Document,
//!         _object: &str,
//!         _mode: BakeMode,
//!         width: u32,
//!         height: u32,
//!     ) -> Result<Vec<f32>, BakeError> {
//!         Ok(vec![0.0; (width * height * 4) as usize])
//!     }
//! }
//!
//! fn main() -> griddle::Result<()> {
//!     let mut doc = griddle::new_document();
//!     let name = doc.import_obj("model.obj")?;
//!     doc.set_active_object(&name)?;
//!
//!     prepare_for_unwrap(&mut doc)?;
//!     // ... unwrap the new "Unwrap" UV layer in your editor of choice ...
//!
//!     doc.settings.set_resolution(1024);
//!     let outcome = bake_and_restore(&mut doc, &mut MyRenderer)?;
//!     doc.image(&outcome.image).unwrap().save_png("baked.png")?;
//!     Ok(())
//! }
//! ```

pub mod baker;
pub mod document;
pub mod error;
pub mod prelude;

// Re-export the error types for convenience
pub use error::{BakerError, Result};

/// Creates an empty document with default bake settings
pub fn new_document() -> document::Document {
    document::Document::new()
}
