//! Error types for griddle.
//!
//! Every fallible host-state lookup (objects, materials, nodes, sockets,
//! images) surfaces as its own named variant rather than a generic failure,
//! so callers can report exactly which piece of document state was missing.

use thiserror::Error;

use crate::baker::engine::BakeError;

/// Result type alias using [`BakerError`].
pub type Result<T> = std::result::Result<T, BakerError>;

/// Errors that can occur while preparing an object for unwrapping or while
/// baking its materials.
#[derive(Error, Debug)]
pub enum BakerError {
    /// The document has no active object to operate on.
    #[error("no active object in the document")]
    NoActiveObject,

    /// Bake was invoked without a prior prepare-for-unwrap call.
    #[error("no unwrap session has been prepared")]
    NoPriorSession,

    /// The active object is not the one the unwrap session was captured from.
    #[error("unwrap session was prepared for '{prepared}' but '{active}' is active")]
    ObjectMismatch {
        /// Object the session was captured from.
        prepared: String,
        /// Object currently active in the document.
        active: String,
    },

    /// A material expected on the object or in the document is missing.
    #[error("material '{0}' not found")]
    MaterialNotFound(String),

    /// The mesh was edited between prepare and bake, so the captured
    /// per-face material assignment no longer applies.
    #[error("mesh topology changed since capture: captured {expected} faces, found {found}")]
    InconsistentMeshState {
        /// Face count recorded by prepare-for-unwrap.
        expected: usize,
        /// Face count present at bake time.
        found: usize,
    },

    /// The external bake engine reported a failure.
    #[error("bake failed: {0}")]
    BakeFailed(#[from] BakeError),

    /// No object with the given name exists in the document.
    #[error("object '{0}' not found")]
    ObjectNotFound(String),

    /// A shader node expected in a material's graph is missing.
    #[error("node '{node}' not found in material '{material}'")]
    NodeNotFound {
        /// Material whose graph was searched.
        material: String,
        /// Name of the missing node.
        node: String,
    },

    /// A node id handed to a graph operation does not refer to any node.
    #[error("node id {0} out of range")]
    InvalidNodeId(usize),

    /// A named socket does not exist on the given node.
    #[error("socket '{socket}' not found on node '{node}'")]
    SocketNotFound {
        /// Node the socket was looked up on.
        node: String,
        /// Name of the missing socket.
        socket: String,
    },

    /// No image with the given name exists in the document.
    #[error("image '{0}' not found")]
    ImageNotFound(String),

    /// Two images that must share dimensions do not.
    #[error("image dimensions differ: {a_width}x{a_height} vs {b_width}x{b_height}")]
    ImageSizeMismatch {
        a_width: u32,
        a_height: u32,
        b_width: u32,
        b_height: u32,
    },

    /// A pixel buffer handed to an image has the wrong length.
    #[error("pixel buffer length {found} does not match expected {expected}")]
    PixelBufferSize {
        /// Length the image requires (width * height * 4).
        expected: usize,
        /// Length actually supplied.
        found: usize,
    },

    /// File I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to load an OBJ/MTL file.
    #[error("failed to load OBJ: {0}")]
    ObjLoad(#[from] tobj::LoadError),

    /// Image encode/decode error.
    #[error("image I/O error: {0}")]
    Image(#[from] image::ImageError),

    /// Failed to parse persisted bake settings.
    #[error("failed to parse settings: {0}")]
    SettingsParse(#[from] ron::error::SpannedError),

    /// Failed to serialize bake settings.
    #[error("failed to encode settings: {0}")]
    SettingsEncode(#[from] ron::Error),
}
