//! The external bake renderer interface.
//!
//! Rendering a material's shader output into a flat pixel buffer is the job
//! of the host's rendering engine, not this crate. The baker drives that
//! engine through [`BakeEngine`]; anything implementing it (a path tracer, a
//! rasterizer, a test double) can serve as the renderer.

use thiserror::Error;

use crate::document::Document;

/// Which signal the bake pass renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BakeMode {
    /// Render only emission. The baker routes each material's color texture
    /// into its shader's emission input first, so an emission pass captures
    /// the combined surface color.
    Emit,
    /// The renderer's default combined pass, used for the alpha bake.
    Combined,
}

/// Errors the external renderer can report.
#[derive(Error, Debug)]
pub enum BakeError {
    /// The render itself failed.
    #[error("render failed: {0}")]
    Render(String),

    /// The render device was lost or unavailable.
    #[error("render device unavailable: {0}")]
    Device(String),
}

/// A renderer that can bake an object's materials into pixels.
///
/// Implementations read the document (the object's mesh, its active UV
/// layer, and each material's shader graph with its active bake-target
/// node) and produce an RGBA-interleaved `f32` buffer of exactly
/// `width * height * 4` values. The call blocks until the bake completes;
/// there is no cancellation or retry at this layer.
pub trait BakeEngine {
    /// Bake `object`'s materials in the given mode.
    ///
    /// # Arguments
    /// * `document` - Document holding the object and its materials
    /// * `object` - Name of the object to bake
    /// * `mode` - Which signal to render
    /// * `width`, `height` - Dimensions of the target pixel buffer
    ///
    /// # Returns
    /// The rendered RGBA pixel buffer, or a [`BakeError`] describing why
    /// the render could not complete.
    fn bake(
        &mut self,
        document: &Document,
        object: &str,
        mode: BakeMode,
        width: u32,
        height: u32,
    ) -> Result<Vec<f32>, BakeError>;
}
