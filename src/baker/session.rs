//! Captured object state bridging prepare and bake.

use crate::document::object::Object;

/// Snapshot of an object's state taken by prepare-for-unwrap and consumed
/// by bake-and-restore.
///
/// One session exists per document at most. Preparing again overwrites it;
/// a successful bake invalidates it.
#[derive(Debug, Clone)]
pub struct UnwrapSession {
    /// Name of the object the session was captured from.
    pub object_name: String,
    /// Per-face material slot indices, in face order.
    pub face_materials: Vec<usize>,
    /// Name of the UV layer that was active before preparation.
    pub uv_layer: Option<String>,
    /// Topology hash taken at capture time, checked again at restore time.
    pub mesh_fingerprint: u64,
}

impl UnwrapSession {
    /// Capture the state bake-and-restore will need from `object`.
    pub fn capture(object: &Object) -> Self {
        Self {
            object_name: object.name.clone(),
            face_materials: object.mesh.face_materials(),
            uv_layer: object.mesh.active_uv_layer().map(|l| l.name.clone()),
            mesh_fingerprint: object.mesh.fingerprint(),
        }
    }
}
