//! The diagnostic grid material registry.
//!
//! One grid material and one grid image exist per document, looked up by a
//! reserved name and created lazily on first use. The document caches the
//! handle; the cache is revalidated against the live collection on every
//! access so a deleted material is simply recreated instead of leaving a
//! dangling name behind.

use log::info;

use crate::document::image::Image;
use crate::document::material::Material;
use crate::document::Document;

/// Reserved name of the diagnostic grid material and its image.
pub const GRID_MATERIAL_NAME: &str = "uv-baker_uv-grid";

/// Resolution of the generated grid image.
pub const GRID_IMAGE_SIZE: u32 = 1024;

/// Look up or create the document's diagnostic grid material.
///
/// Returns the material's name. A material already carrying the reserved
/// name is reused unconditionally, whether or not it actually is a grid
/// material; callers that stomped on the reserved name get whatever they
/// put there.
pub fn ensure_grid_material(document: &mut Document) -> String {
    // Cached handle still valid?
    if let Some(name) = &document.grid_material {
        if document.material(name).is_some() {
            return name.clone();
        }
        document.grid_material = None;
    }

    // Reserved-name lookup.
    if document.material(GRID_MATERIAL_NAME).is_some() {
        document.grid_material = Some(GRID_MATERIAL_NAME.to_string());
        return GRID_MATERIAL_NAME.to_string();
    }

    // First use in this document: generate the image and wire the material.
    let image = Image::color_grid(GRID_MATERIAL_NAME, GRID_IMAGE_SIZE, GRID_IMAGE_SIZE);
    let image_name = document.add_image(image);
    let material = Material::with_base_color_image(GRID_MATERIAL_NAME, &image_name);
    let name = document.add_material(material);

    info!("created diagnostic grid material '{}'", name);
    document.grid_material = Some(name.clone());
    name
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_factory_is_idempotent() {
        let mut doc = Document::new();
        let first = ensure_grid_material(&mut doc);
        let second = ensure_grid_material(&mut doc);

        assert_eq!(first, GRID_MATERIAL_NAME);
        assert_eq!(first, second);
        assert_eq!(doc.material_count(), 1);
        assert_eq!(doc.images().count(), 1);
    }

    #[test]
    fn test_grid_material_samples_grid_image() {
        let mut doc = Document::new();
        let name = ensure_grid_material(&mut doc);

        let material = doc.material(&name).unwrap();
        assert!(material.base_color_texture().is_some());
        let image = doc.image(GRID_MATERIAL_NAME).unwrap();
        assert_eq!(image.width(), GRID_IMAGE_SIZE);
        assert_eq!(image.height(), GRID_IMAGE_SIZE);
    }

    #[test]
    fn test_existing_reserved_name_is_reused() {
        let mut doc = Document::new();
        doc.add_material(Material::new(GRID_MATERIAL_NAME));

        let name = ensure_grid_material(&mut doc);
        assert_eq!(name, GRID_MATERIAL_NAME);
        // Reused as-is: no grid image was generated.
        assert_eq!(doc.images().count(), 0);
    }

    #[test]
    fn test_cache_recovers_from_deleted_material() {
        let mut doc = Document::new();
        let name = ensure_grid_material(&mut doc);
        doc.remove_material(&name);

        let recreated = ensure_grid_material(&mut doc);
        assert!(doc.material(&recreated).is_some());
    }
}
