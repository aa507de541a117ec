//! Polygon mesh data for the document model.
//!
//! A [`Mesh`] owns an ordered face list (each face carries a material slot
//! index), a set of named UV layers with one optionally active, and enough
//! geometry to triangulate and fingerprint itself. Face order is treated as
//! stable between a state capture and the matching restore; the fingerprint
//! exists to detect when that assumption has been broken.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use cgmath::{InnerSpace, Vector2, Vector3, Zero};

/// Name of the UV layer procedural constructors and the OBJ importer create.
pub const DEFAULT_UV_LAYER: &str = "UVMap";

/// A polygon face: corner vertex indices plus the material slot it uses.
#[derive(Debug, Clone)]
pub struct Face {
    /// Vertex indices of the face corners, in winding order.
    pub corners: Vec<u32>,
    /// Index into the owning object's material slot list.
    pub material_index: usize,
}

impl Face {
    /// Create a face using material slot 0.
    pub fn new(corners: Vec<u32>) -> Self {
        Self {
            corners,
            material_index: 0,
        }
    }
}

/// A named per-vertex UV coordinate set.
#[derive(Debug, Clone)]
pub struct UvLayer {
    pub name: String,
    pub uvs: Vec<Vector2<f32>>,
}

/// Polygon mesh with per-face material indices and named UV layers.
#[derive(Debug, Clone)]
pub struct Mesh {
    pub positions: Vec<Vector3<f32>>,
    pub normals: Vec<Vector3<f32>>,
    faces: Vec<Face>,
    uv_layers: Vec<UvLayer>,
    active_uv: Option<usize>,
}

impl Mesh {
    /// Create a mesh from positions, normals, and faces.
    ///
    /// Normals may be empty; [`Mesh::recompute_normals`] fills them in.
    pub fn new(positions: Vec<Vector3<f32>>, normals: Vec<Vector3<f32>>, faces: Vec<Face>) -> Self {
        Self {
            positions,
            normals,
            faces,
            uv_layers: Vec::new(),
            active_uv: None,
        }
    }

    /// Number of faces.
    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// Faces in order.
    pub fn faces(&self) -> &[Face] {
        &self.faces
    }

    /// Mutable access to the face list.
    pub fn faces_mut(&mut self) -> &mut [Face] {
        &mut self.faces
    }

    /// Append a face.
    pub fn push_face(&mut self, face: Face) {
        self.faces.push(face);
    }

    /// The per-face material slot indices, in face order.
    pub fn face_materials(&self) -> Vec<usize> {
        self.faces.iter().map(|f| f.material_index).collect()
    }

    /// Point every face at the given material slot.
    pub fn assign_all_faces(&mut self, slot: usize) {
        for face in &mut self.faces {
            face.material_index = slot;
        }
    }

    /// UV layers in creation order.
    pub fn uv_layers(&self) -> &[UvLayer] {
        &self.uv_layers
    }

    /// Index of the named UV layer, if present.
    pub fn uv_layer_index(&self, name: &str) -> Option<usize> {
        self.uv_layers.iter().position(|l| l.name == name)
    }

    /// The active UV layer, if one is set.
    pub fn active_uv_layer(&self) -> Option<&UvLayer> {
        self.active_uv.map(|i| &self.uv_layers[i])
    }

    /// Mark the layer at `index` active. Out-of-range indices are ignored.
    pub fn set_active_uv_layer(&mut self, index: usize) {
        if index < self.uv_layers.len() {
            self.active_uv = Some(index);
        }
    }

    /// Create a new UV layer initialized from the active layer's coordinates
    /// (zeroed when no layer is active yet).
    ///
    /// The requested name is uniqued against existing layers, so asking for
    /// `Unwrap` twice yields `Unwrap` and `Unwrap (1)`. Returns the index of
    /// the new layer; the active layer is left unchanged.
    pub fn add_uv_layer(&mut self, name: &str) -> usize {
        let unique = self.ensure_unique_layer_name(name);
        let uvs = match self.active_uv_layer() {
            Some(layer) => layer.uvs.clone(),
            None => vec![Vector2::zero(); self.positions.len()],
        };
        self.uv_layers.push(UvLayer { name: unique, uvs });
        self.uv_layers.len() - 1
    }

    /// Create a UV layer from explicit per-vertex coordinates.
    ///
    /// The name is uniqued like [`Mesh::add_uv_layer`]. Returns the index of
    /// the new layer.
    pub fn add_uv_layer_with(&mut self, name: &str, uvs: Vec<Vector2<f32>>) -> usize {
        let unique = self.ensure_unique_layer_name(name);
        self.uv_layers.push(UvLayer { name: unique, uvs });
        self.uv_layers.len() - 1
    }

    fn ensure_unique_layer_name(&self, desired: &str) -> String {
        let mut counter = 0;
        let mut test_name = desired.to_string();

        while self.uv_layers.iter().any(|l| l.name == test_name) {
            counter += 1;
            test_name = format!("{} ({})", desired, counter);
        }

        test_name
    }

    /// Fan-triangulate every face into index triples.
    ///
    /// Faces with fewer than three corners are skipped.
    pub fn triangulate(&self) -> Vec<[u32; 3]> {
        let mut triangles = Vec::new();
        for face in &self.faces {
            if face.corners.len() < 3 {
                continue;
            }
            let root = face.corners[0];
            for pair in face.corners[1..].windows(2) {
                triangles.push([root, pair[0], pair[1]]);
            }
        }
        triangles
    }

    /// Hash of the mesh topology: vertex count plus every face's corner list.
    ///
    /// Captured alongside the per-face material assignment so a later restore
    /// can tell the mesh was edited in between, rather than only comparing
    /// face counts.
    pub fn fingerprint(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.positions.len().hash(&mut hasher);
        for face in &self.faces {
            face.corners.hash(&mut hasher);
        }
        hasher.finish()
    }

    /// Recompute smooth vertex normals by averaging face normals.
    pub fn recompute_normals(&mut self) {
        self.normals = vec![Vector3::zero(); self.positions.len()];

        for tri in self.triangulate() {
            let v0 = self.positions[tri[0] as usize];
            let v1 = self.positions[tri[1] as usize];
            let v2 = self.positions[tri[2] as usize];
            let normal = (v1 - v0).cross(v2 - v0);
            for idx in tri {
                self.normals[idx as usize] += normal;
            }
        }

        for n in &mut self.normals {
            let length = n.magnitude();
            if length > 0.0 {
                *n /= length;
            }
        }
    }

    /// Axis-aligned unit cube centered on the origin: 24 vertices and 6 quad
    /// faces, with a `UVMap` layer mapping each face to the full UV square.
    pub fn cube(size: f32) -> Self {
        let h = size * 0.5;

        // Six faces, four corners each, wound counter-clockwise when viewed
        // from outside.
        let face_data: [([f32; 3], [[f32; 3]; 4]); 6] = [
            // +X
            (
                [1.0, 0.0, 0.0],
                [[h, -h, -h], [h, h, -h], [h, h, h], [h, -h, h]],
            ),
            // -X
            (
                [-1.0, 0.0, 0.0],
                [[-h, -h, h], [-h, h, h], [-h, h, -h], [-h, -h, -h]],
            ),
            // +Y
            (
                [0.0, 1.0, 0.0],
                [[-h, h, -h], [-h, h, h], [h, h, h], [h, h, -h]],
            ),
            // -Y
            (
                [0.0, -1.0, 0.0],
                [[-h, -h, h], [-h, -h, -h], [h, -h, -h], [h, -h, h]],
            ),
            // +Z
            (
                [0.0, 0.0, 1.0],
                [[-h, -h, h], [h, -h, h], [h, h, h], [-h, h, h]],
            ),
            // -Z
            (
                [0.0, 0.0, -1.0],
                [[h, -h, -h], [-h, -h, -h], [-h, h, -h], [h, h, -h]],
            ),
        ];

        let mut positions = Vec::with_capacity(24);
        let mut normals = Vec::with_capacity(24);
        let mut uvs = Vec::with_capacity(24);
        let mut faces = Vec::with_capacity(6);

        let corner_uvs = [
            Vector2::new(0.0, 0.0),
            Vector2::new(1.0, 0.0),
            Vector2::new(1.0, 1.0),
            Vector2::new(0.0, 1.0),
        ];

        for (normal, corners) in &face_data {
            let base = positions.len() as u32;
            for (i, p) in corners.iter().enumerate() {
                positions.push(Vector3::new(p[0], p[1], p[2]));
                normals.push(Vector3::new(normal[0], normal[1], normal[2]));
                uvs.push(corner_uvs[i]);
            }
            faces.push(Face::new(vec![base, base + 1, base + 2, base + 3]));
        }

        let mut mesh = Self::new(positions, normals, faces);
        mesh.uv_layers.push(UvLayer {
            name: DEFAULT_UV_LAYER.to_string(),
            uvs,
        });
        mesh.active_uv = Some(0);
        mesh
    }

    /// Single quad in the XZ plane facing +Y, with a `UVMap` layer.
    pub fn plane(width: f32, depth: f32) -> Self {
        let hw = width * 0.5;
        let hd = depth * 0.5;

        let positions = vec![
            Vector3::new(-hw, 0.0, -hd),
            Vector3::new(-hw, 0.0, hd),
            Vector3::new(hw, 0.0, hd),
            Vector3::new(hw, 0.0, -hd),
        ];
        let normals = vec![Vector3::new(0.0, 1.0, 0.0); 4];
        let uvs = vec![
            Vector2::new(0.0, 0.0),
            Vector2::new(0.0, 1.0),
            Vector2::new(1.0, 1.0),
            Vector2::new(1.0, 0.0),
        ];
        let faces = vec![Face::new(vec![0, 1, 2, 3])];

        let mut mesh = Self::new(positions, normals, faces);
        mesh.uv_layers.push(UvLayer {
            name: DEFAULT_UV_LAYER.to_string(),
            uvs,
        });
        mesh.active_uv = Some(0);
        mesh
    }
}
