//! Scene objects: a mesh plus its material slots.

use crate::document::mesh::Mesh;

/// A named object pairing a mesh with an ordered list of material slots.
///
/// Faces reference slots by index, so removing a slot shifts the indices of
/// every face that pointed past it, the way the host collection behaves.
#[derive(Debug, Clone)]
pub struct Object {
    pub name: String,
    pub mesh: Mesh,
    material_slots: Vec<String>,
}

impl Object {
    pub fn new(name: &str, mesh: Mesh) -> Self {
        Self {
            name: name.to_string(),
            mesh,
            material_slots: Vec::new(),
        }
    }

    /// Material names in slot order.
    pub fn material_slots(&self) -> &[String] {
        &self.material_slots
    }

    /// Append a material slot and return its index.
    pub fn add_material_slot(&mut self, material: String) -> usize {
        self.material_slots.push(material);
        self.material_slots.len() - 1
    }

    /// Index of the slot holding the named material, if any.
    pub fn material_slot_index(&self, material: &str) -> Option<usize> {
        self.material_slots.iter().position(|m| m == material)
    }

    /// Remove the slot at `index`, shifting the material index of every face
    /// that referenced a later slot.
    pub fn remove_material_slot(&mut self, index: usize) -> String {
        let removed = self.material_slots.remove(index);
        for face in self.mesh.faces_mut() {
            if face.material_index > index {
                face.material_index -= 1;
            }
        }
        removed
    }

    /// Drop every slot and reset all faces to slot 0.
    pub fn clear_material_slots(&mut self) {
        self.material_slots.clear();
        self.mesh.assign_all_faces(0);
    }
}
