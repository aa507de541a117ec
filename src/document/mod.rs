//! The in-memory document the baker operates on.
//!
//! A [`Document`] plays the role of the host application's data block
//! collections: named materials and images, an ordered object list, the
//! active-object selection, the persisted bake settings, and the transient
//! unwrap session. Owning the session here (rather than in process-global
//! state) is what makes per-document and per-test isolation possible.

pub mod image;
pub mod material;
pub mod mesh;
pub mod nodes;
pub mod object;

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use cgmath::{Vector2, Vector3};
use log::{info, warn};

use crate::baker::session::UnwrapSession;
use crate::baker::settings::BakeSettings;
use crate::document::image::Image;
use crate::document::material::Material;
use crate::document::mesh::{Face, Mesh, DEFAULT_UV_LAYER};
use crate::document::nodes::socket;
use crate::document::object::Object;
use crate::error::{BakerError, Result};

/// Scene document: objects, materials, images, selection, settings, and the
/// transient unwrap session.
pub struct Document {
    materials: HashMap<String, Material>,
    images: HashMap<String, Image>,
    objects: Vec<Object>,
    active_object: Option<usize>,
    /// Per-document bake configuration.
    pub settings: BakeSettings,
    pub(crate) session: Option<UnwrapSession>,
    pub(crate) grid_material: Option<String>,
}

impl Document {
    /// Create an empty document with default settings.
    pub fn new() -> Self {
        Self {
            materials: HashMap::new(),
            images: HashMap::new(),
            objects: Vec::new(),
            active_object: None,
            settings: BakeSettings::default(),
            session: None,
            grid_material: None,
        }
    }

    // --- materials ---

    /// Add a material, uniquing its name against the collection.
    ///
    /// Returns the name the material ended up with.
    pub fn add_material(&mut self, mut material: Material) -> String {
        let name = unique_name(&material.name, |n| self.materials.contains_key(n));
        material.name = name.clone();
        self.materials.insert(name.clone(), material);
        name
    }

    /// Material by name.
    pub fn material(&self, name: &str) -> Option<&Material> {
        self.materials.get(name)
    }

    /// Mutable material by name.
    pub fn material_mut(&mut self, name: &str) -> Option<&mut Material> {
        self.materials.get_mut(name)
    }

    /// Remove a material from the document.
    pub fn remove_material(&mut self, name: &str) -> Option<Material> {
        self.materials.remove(name)
    }

    /// All materials, in no particular order.
    pub fn materials(&self) -> impl Iterator<Item = &Material> {
        self.materials.values()
    }

    /// Number of materials in the document.
    pub fn material_count(&self) -> usize {
        self.materials.len()
    }

    // --- images ---

    /// Add an image, uniquing its name against the collection.
    pub fn add_image(&mut self, mut image: Image) -> String {
        let name = unique_name(&image.name, |n| self.images.contains_key(n));
        image.name = name.clone();
        self.images.insert(name.clone(), image);
        name
    }

    /// Image by name.
    pub fn image(&self, name: &str) -> Option<&Image> {
        self.images.get(name)
    }

    /// Mutable image by name.
    pub fn image_mut(&mut self, name: &str) -> Option<&mut Image> {
        self.images.get_mut(name)
    }

    /// All images, in no particular order.
    pub fn images(&self) -> impl Iterator<Item = &Image> {
        self.images.values()
    }

    // --- objects ---

    /// Add an object, uniquing its name, and return the final name.
    pub fn add_object(&mut self, mut object: Object) -> String {
        let name = unique_name(&object.name, |n| self.objects.iter().any(|o| o.name == n));
        object.name = name.clone();
        self.objects.push(object);
        name
    }

    /// Objects in insertion order.
    pub fn objects(&self) -> &[Object] {
        &self.objects
    }

    /// Object by name.
    pub fn object(&self, name: &str) -> Option<&Object> {
        self.objects.iter().find(|o| o.name == name)
    }

    /// Mutable object by name.
    pub fn object_mut(&mut self, name: &str) -> Option<&mut Object> {
        self.objects.iter_mut().find(|o| o.name == name)
    }

    /// Make the named object active.
    pub fn set_active_object(&mut self, name: &str) -> Result<()> {
        let index = self
            .objects
            .iter()
            .position(|o| o.name == name)
            .ok_or_else(|| BakerError::ObjectNotFound(name.to_string()))?;
        self.active_object = Some(index);
        Ok(())
    }

    /// Clear the active-object selection.
    pub fn clear_active_object(&mut self) {
        self.active_object = None;
    }

    /// The active object, if any.
    pub fn active_object(&self) -> Option<&Object> {
        self.active_object.map(|i| &self.objects[i])
    }

    /// Mutable access to the active object.
    pub fn active_object_mut(&mut self) -> Option<&mut Object> {
        let index = self.active_object?;
        Some(&mut self.objects[index])
    }

    /// Name of the active object, if any.
    pub fn active_object_name(&self) -> Option<&str> {
        self.active_object().map(|o| o.name.as_str())
    }

    /// The unwrap session captured by the last prepare, if it has not been
    /// consumed yet.
    pub fn unwrap_session(&self) -> Option<&UnwrapSession> {
        self.session.as_ref()
    }

    // --- import ---

    /// Load an OBJ file (and its MTL, when present) into the document.
    ///
    /// All models in the file merge into a single object; each model's
    /// material id becomes the material slot of its faces, so a multi-material
    /// OBJ arrives with the same per-face assignment the baker later captures
    /// and restores. Returns the name of the new object.
    pub fn import_obj<P: AsRef<Path>>(&mut self, path: P) -> Result<String> {
        let path = path.as_ref();
        let (models, materials) = tobj::load_obj(
            path,
            &tobj::LoadOptions {
                triangulate: true,
                single_index: true,
                ..Default::default()
            },
        )?;

        let materials = materials.unwrap_or_else(|e| {
            warn!("no usable MTL for {}: {}", path.display(), e);
            Vec::new()
        });

        // One material slot per MTL material, in MTL order, so tobj's
        // material ids index the slot list directly.
        let mut slot_names = Vec::with_capacity(materials.len());
        for (i, mtl) in materials.iter().enumerate() {
            let material_name = if mtl.name.is_empty() {
                format!("material_{}", i)
            } else {
                mtl.name.clone()
            };

            if self.materials.contains_key(&material_name) {
                slot_names.push(material_name);
                continue;
            }

            let mut material = Material::new(&material_name);
            let diffuse = mtl.diffuse.unwrap_or([0.8, 0.8, 0.8]);
            material.set_base_color([
                diffuse[0],
                diffuse[1],
                diffuse[2],
                mtl.dissolve.unwrap_or(1.0),
            ]);

            if let Some(tex_path) = &mtl.diffuse_texture {
                let resolved = path
                    .parent()
                    .map(|dir| dir.join(tex_path))
                    .unwrap_or_else(|| PathBuf::from(tex_path));
                match ::image::open(&resolved) {
                    Ok(loaded) => {
                        let rgba = loaded.to_rgba32f();
                        let (w, h) = rgba.dimensions();
                        let img = Image::from_pixels(tex_path, w, h, rgba.into_raw())?;
                        let image_name = self.add_image(img);
                        let shader = material.shader()?;
                        let texture =
                            material.graph_mut().add_image_texture(Some(image_name));
                        material
                            .graph_mut()
                            .link(texture, socket::COLOR, shader, socket::BASE_COLOR)?;
                    }
                    Err(e) => {
                        warn!("failed to load texture {}: {}", resolved.display(), e);
                    }
                }
            }

            slot_names.push(self.add_material(material));
        }

        // Merge all models into one mesh.
        let mut positions: Vec<Vector3<f32>> = Vec::new();
        let mut normals: Vec<Vector3<f32>> = Vec::new();
        let mut uvs: Vec<Vector2<f32>> = Vec::new();
        let mut faces: Vec<Face> = Vec::new();
        let mut all_normals = true;
        let mut any_uvs = false;

        for model in &models {
            let mesh = &model.mesh;
            let base = positions.len() as u32;
            let vertex_count = mesh.positions.len() / 3;

            for p in mesh.positions.chunks_exact(3) {
                positions.push(Vector3::new(p[0], p[1], p[2]));
            }

            if mesh.normals.len() == mesh.positions.len() {
                for n in mesh.normals.chunks_exact(3) {
                    normals.push(Vector3::new(n[0], n[1], n[2]));
                }
            } else {
                all_normals = false;
                normals.extend(std::iter::repeat(Vector3::new(0.0, 0.0, 0.0)).take(vertex_count));
            }

            if mesh.texcoords.len() == vertex_count * 2 {
                any_uvs = true;
                for uv in mesh.texcoords.chunks_exact(2) {
                    uvs.push(Vector2::new(uv[0], uv[1]));
                }
            } else {
                uvs.extend(std::iter::repeat(Vector2::new(0.0, 0.0)).take(vertex_count));
            }

            let slot = mesh.material_id.unwrap_or(0);
            for tri in mesh.indices.chunks_exact(3) {
                let mut face = Face::new(vec![base + tri[0], base + tri[1], base + tri[2]]);
                face.material_index = slot;
                faces.push(face);
            }
        }

        let mut mesh = Mesh::new(positions, normals, faces);
        if !all_normals {
            mesh.recompute_normals();
        }
        if any_uvs {
            let layer = mesh.add_uv_layer_with(DEFAULT_UV_LAYER, uvs);
            mesh.set_active_uv_layer(layer);
        }

        let object_name = models
            .iter()
            .find(|m| !m.name.is_empty())
            .map(|m| m.name.clone())
            .or_else(|| path.file_stem().map(|s| s.to_string_lossy().into_owned()))
            .unwrap_or_else(|| "object".to_string());

        let mut object = Object::new(&object_name, mesh);
        for slot in slot_names {
            object.add_material_slot(slot);
        }

        let final_name = self.add_object(object);
        info!(
            "imported {} as '{}' ({} faces, {} materials)",
            path.display(),
            final_name,
            self.object(&final_name).map(|o| o.mesh.face_count()).unwrap_or(0),
            materials.len()
        );
        Ok(final_name)
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

/// Resolve a desired name against a taken-predicate by appending ` (n)`.
fn unique_name<F: Fn(&str) -> bool>(desired: &str, taken: F) -> String {
    let mut counter = 0;
    let mut test_name = desired.to_string();

    while taken(&test_name) {
        counter += 1;
        test_name = format!("{} ({})", desired, counter);
    }

    test_name
}
