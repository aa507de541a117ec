//! The two baker operations.
//!
//! [`prepare_for_unwrap`] swaps every face of the active object onto the
//! diagnostic grid material and opens a fresh UV layer for manual
//! unwrapping. [`bake_and_restore`] puts the original materials back,
//! rewires them toward a shared bake target, drives the external renderer,
//! and appends a new material wrapping the baked image.
//!
//! Between the two calls sits the document's [`UnwrapSession`]: written by
//! prepare, validated against the active object and the mesh topology by
//! bake, and invalidated once a bake succeeds.

pub mod engine;
pub mod grid;
pub mod session;
pub mod settings;

use log::{debug, info};

use crate::baker::engine::{BakeEngine, BakeMode};
use crate::baker::grid::{ensure_grid_material, GRID_MATERIAL_NAME};
use crate::baker::session::UnwrapSession;
use crate::document::image::Image;
use crate::document::material::Material;
use crate::document::nodes::socket;
use crate::document::Document;
use crate::error::{BakerError, Result};

/// Name of the UV layer created for manual unwrapping.
pub const UNWRAP_UV_LAYER: &str = "Unwrap";

/// What a successful bake produced.
#[derive(Debug, Clone)]
pub struct BakeOutcome {
    /// Name of the final baked image in the document.
    pub image: String,
    /// Name of the material appended to the object.
    pub material: String,
}

/// Prepare the active object for manual UV unwrapping.
///
/// Captures the object's per-face material assignment, active UV layer, and
/// topology fingerprint into the document's unwrap session (overwriting any
/// previous session), assigns the diagnostic grid material to every face,
/// and creates a new active UV layer named `Unwrap` initialized from the
/// existing UVs.
pub fn prepare_for_unwrap(document: &mut Document) -> Result<()> {
    let session = {
        let object = document.active_object().ok_or(BakerError::NoActiveObject)?;
        UnwrapSession::capture(object)
    };
    info!(
        "preparing '{}' for unwrap ({} faces)",
        session.object_name,
        session.face_materials.len()
    );
    document.session = Some(session);

    let grid = ensure_grid_material(document);
    let object = document
        .active_object_mut()
        .ok_or(BakerError::NoActiveObject)?;
    let slot = object.add_material_slot(grid);
    object.mesh.assign_all_faces(slot);

    let layer = object.mesh.add_uv_layer(UNWRAP_UV_LAYER);
    object.mesh.set_active_uv_layer(layer);
    Ok(())
}

/// Restore the active object's materials and bake them onto the new UVs.
///
/// Requires an unwrap session captured from the same object; baking with no
/// session reports [`BakerError::NoPriorSession`] and baking while a
/// different object is active reports [`BakerError::ObjectMismatch`], so a
/// stale session can never rewrite another object's face assignment.
///
/// The bake resolution and the optional alpha pass come from the document's
/// [`settings`](crate::baker::settings::BakeSettings). On success the
/// session is invalidated and the names of the final image and the appended
/// material are returned. On failure the document is left as far as the
/// operation got; re-running after a failed bake starts from a fresh
/// prepare.
pub fn bake_and_restore(
    document: &mut Document,
    engine: &mut dyn BakeEngine,
) -> Result<BakeOutcome> {
    let active = document
        .active_object_name()
        .ok_or(BakerError::NoActiveObject)?
        .to_string();
    let session = document.session.as_ref().ok_or(BakerError::NoPriorSession)?;
    if session.object_name != active {
        return Err(BakerError::ObjectMismatch {
            prepared: session.object_name.clone(),
            active,
        });
    }
    let face_materials = session.face_materials.clone();
    let fingerprint = session.mesh_fingerprint;

    let resolution = document.settings.resolution();
    let bake_alpha = document.settings.bake_alpha;
    let keep_slots = document.settings.keep_original_slots;

    // Allocate the bake targets up front.
    let bake_image = document.add_image(Image::new(
        &format!("{}_bake", active),
        resolution,
        resolution,
    ));
    let alpha_image = if bake_alpha {
        Some(document.add_image(Image::new(
            &format!("{}_bake-alpha", active),
            resolution,
            resolution,
        )))
    } else {
        None
    };

    // Drop the grid slot and put the captured assignment back.
    let slots = {
        let object = document
            .object_mut(&active)
            .ok_or_else(|| BakerError::ObjectNotFound(active.clone()))?;
        let slot = object
            .material_slot_index(GRID_MATERIAL_NAME)
            .ok_or_else(|| BakerError::MaterialNotFound(GRID_MATERIAL_NAME.to_string()))?;
        object.remove_material_slot(slot);

        if object.mesh.face_count() != face_materials.len() {
            return Err(BakerError::InconsistentMeshState {
                expected: face_materials.len(),
                found: object.mesh.face_count(),
            });
        }
        if object.mesh.fingerprint() != fingerprint {
            return Err(BakerError::InconsistentMeshState {
                expected: face_materials.len(),
                found: object.mesh.face_count(),
            });
        }
        for (face, &index) in object.mesh.faces_mut().iter_mut().zip(&face_materials) {
            face.material_index = index;
        }
        object.material_slots().to_vec()
    };

    // Route every textured material's color into emission and aim it at the
    // shared bake target.
    let mut targeted = 0;
    for name in &slots {
        if rewire_for_color_bake(document, name, &bake_image)? {
            targeted += 1;
        }
    }
    debug!("{} of {} materials target the bake image", targeted, slots.len());

    run_bake(document, engine, &active, BakeMode::Emit, &bake_image)?;

    let final_image = if let Some(alpha_name) = alpha_image {
        for name in &slots {
            rewire_for_alpha_bake(document, name, &alpha_name)?;
        }
        run_bake(document, engine, &active, BakeMode::Combined, &alpha_name)?;

        let combined = {
            let rgb = document
                .image(&bake_image)
                .ok_or_else(|| BakerError::ImageNotFound(bake_image.clone()))?;
            let alpha = document
                .image(&alpha_name)
                .ok_or_else(|| BakerError::ImageNotFound(alpha_name.clone()))?;
            Image::combine_alpha(rgb, alpha)?
        };
        document.add_image(combined)
    } else {
        bake_image
    };

    // Author the result material and hang it on the object. The original
    // slots stay attached unless the settings say otherwise.
    let bake_material =
        Material::with_base_color_image(&format!("{}-bake", active), &final_image);
    let material_name = document.add_material(bake_material);
    let object = document
        .object_mut(&active)
        .ok_or_else(|| BakerError::ObjectNotFound(active.clone()))?;
    if !keep_slots {
        object.clear_material_slots();
    }
    object.add_material_slot(material_name.clone());

    document.session = None;
    info!(
        "baked '{}' into '{}' at {}x{}",
        active, final_image, resolution, resolution
    );
    Ok(BakeOutcome {
        image: final_image,
        material: material_name,
    })
}

/// Wire `material`'s color texture into its shader's emission input and aim
/// an image texture node at the bake target.
///
/// Returns false (and changes nothing) when the material has no image
/// texture on its base color input. Re-running converges: the emission link
/// replaces itself and an existing node for the same target is reused.
fn rewire_for_color_bake(document: &mut Document, material: &str, bake_image: &str) -> Result<bool> {
    let material = document
        .material_mut(material)
        .ok_or_else(|| BakerError::MaterialNotFound(material.to_string()))?;
    let texture = match material.base_color_texture() {
        Some(id) => id,
        None => return Ok(false),
    };
    let shader = material.shader()?;

    let graph = material.graph_mut();
    graph.link(texture, socket::COLOR, shader, socket::EMISSION)?;
    let target = match graph.image_texture_for(bake_image) {
        Some(id) => id,
        None => graph.add_image_texture(Some(bake_image.to_string())),
    };
    graph.set_active(target);
    Ok(true)
}

/// Wire `material`'s texture alpha into its shader's alpha input and aim a
/// second image texture node at the alpha bake target.
fn rewire_for_alpha_bake(document: &mut Document, material: &str, alpha_image: &str) -> Result<()> {
    let material = document
        .material_mut(material)
        .ok_or_else(|| BakerError::MaterialNotFound(material.to_string()))?;
    let texture = match material.base_color_texture() {
        Some(id) => id,
        None => return Ok(()),
    };
    let shader = material.shader()?;

    let graph = material.graph_mut();
    graph.link(texture, socket::ALPHA, shader, socket::ALPHA)?;
    let target = match graph.image_texture_for(alpha_image) {
        Some(id) => id,
        None => graph.add_image_texture(Some(alpha_image.to_string())),
    };
    graph.set_active(target);
    Ok(())
}

/// Drive the engine and store the rendered pixels in the target image.
fn run_bake(
    document: &mut Document,
    engine: &mut dyn BakeEngine,
    object: &str,
    mode: BakeMode,
    target: &str,
) -> Result<()> {
    let (width, height) = {
        let image = document
            .image(target)
            .ok_or_else(|| BakerError::ImageNotFound(target.to_string()))?;
        (image.width(), image.height())
    };
    debug!("baking '{}' in {:?} mode into '{}'", object, mode, target);
    let pixels = engine.bake(document, object, mode, width, height)?;
    document
        .image_mut(target)
        .ok_or_else(|| BakerError::ImageNotFound(target.to_string()))?
        .set_pixels(pixels)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::baker::engine::BakeError;
    use crate::document::mesh::{Face, Mesh};
    use crate::document::nodes::NodeKind;
    use crate::document::object::Object;

    fn init_logging() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    /// Fills the buffer with a constant color per bake mode.
    struct SolidBake;

    impl BakeEngine for SolidBake {
        fn bake(
            &mut self,
            _document: &Document,
            _object: &str,
            mode: BakeMode,
            width: u32,
            height: u32,
        ) -> std::result::Result<Vec<f32>, BakeError> {
            let color = match mode {
                BakeMode::Emit => [0.8, 0.2, 0.1, 1.0],
                BakeMode::Combined => [0.0, 0.0, 0.0, 0.25],
            };
            Ok(color
                .iter()
                .copied()
                .cycle()
                .take((width * height * 4) as usize)
                .collect())
        }
    }

    /// Always reports a render failure.
    struct FailingBake;

    impl BakeEngine for FailingBake {
        fn bake(
            &mut self,
            _document: &Document,
            _object: &str,
            _mode: BakeMode,
            _width: u32,
            _height: u32,
        ) -> std::result::Result<Vec<f32>, BakeError> {
            Err(BakeError::Render("out of memory".to_string()))
        }
    }

    /// A document holding a cube named "Cube" whose single slot is a
    /// textured material named "Red".
    fn red_cube_document() -> Document {
        let mut doc = Document::new();
        doc.add_image(Image::new("red-tex", 4, 4));
        doc.add_material(Material::with_base_color_image("Red", "red-tex"));

        let mut object = Object::new("Cube", Mesh::cube(2.0));
        object.add_material_slot("Red".to_string());
        doc.add_object(object);
        doc.set_active_object("Cube").unwrap();
        doc
    }

    #[test]
    fn test_prepare_assigns_grid_to_every_face() {
        init_logging();
        let mut doc = red_cube_document();
        prepare_for_unwrap(&mut doc).unwrap();

        let object = doc.object("Cube").unwrap();
        let grid_slot = object.material_slot_index(GRID_MATERIAL_NAME).unwrap();
        assert!(object
            .mesh
            .faces()
            .iter()
            .all(|f| f.material_index == grid_slot));

        let active = object.mesh.active_uv_layer().unwrap();
        assert_eq!(active.name, UNWRAP_UV_LAYER);

        let session = doc.unwrap_session().unwrap();
        assert_eq!(session.object_name, "Cube");
        assert_eq!(session.face_materials, vec![0; 6]);
    }

    #[test]
    fn test_prepare_requires_active_object() {
        let mut doc = Document::new();
        assert!(matches!(
            prepare_for_unwrap(&mut doc),
            Err(BakerError::NoActiveObject)
        ));
    }

    #[test]
    fn test_capture_restore_round_trip() {
        // Uneven assignment survives a prepare/bake cycle untouched.
        let mut doc = red_cube_document();
        doc.add_material(Material::new("Blue"));
        let object = doc.object_mut("Cube").unwrap();
        object.add_material_slot("Blue".to_string());
        object.mesh.faces_mut()[1].material_index = 1;
        object.mesh.faces_mut()[4].material_index = 1;
        let original = object.mesh.face_materials();

        prepare_for_unwrap(&mut doc).unwrap();
        bake_and_restore(&mut doc, &mut SolidBake).unwrap();

        assert_eq!(doc.object("Cube").unwrap().mesh.face_materials(), original);
    }

    #[test]
    fn test_bake_scenario_cube_red() {
        init_logging();
        let mut doc = red_cube_document();
        doc.settings.set_resolution(64);

        prepare_for_unwrap(&mut doc).unwrap();
        let outcome = bake_and_restore(&mut doc, &mut SolidBake).unwrap();

        // The diagnostic slot is gone and every face is back on "Red".
        let object = doc.object("Cube").unwrap();
        assert_eq!(object.material_slot_index(GRID_MATERIAL_NAME), None);
        assert_eq!(object.mesh.face_materials(), vec![0; 6]);

        // The bake material wraps a 64x64 image and sits in the last slot.
        assert_eq!(outcome.material, "Cube-bake");
        assert_eq!(outcome.image, "Cube_bake");
        assert_eq!(
            object.material_slots(),
            ["Red".to_string(), "Cube-bake".to_string()]
        );
        let baked = doc.image("Cube_bake").unwrap();
        assert_eq!((baked.width(), baked.height()), (64, 64));
        assert_eq!(baked.pixel(0, 0), [0.8, 0.2, 0.1, 1.0]);

        // Consumed sessions do not linger.
        assert!(doc.unwrap_session().is_none());
    }

    #[test]
    fn test_bake_rewires_textured_material() {
        let mut doc = red_cube_document();
        prepare_for_unwrap(&mut doc).unwrap();
        bake_and_restore(&mut doc, &mut SolidBake).unwrap();

        let red = doc.material("Red").unwrap();
        let shader = red.shader().unwrap();
        let emission = red.graph().link_into(shader, socket::EMISSION).unwrap();
        let texture = red.base_color_texture().unwrap();
        assert_eq!(emission.from_node, texture);

        // The active node is the bake target aimed at the shared image.
        let active = red.graph().active().unwrap();
        match &red.graph().node(active).unwrap().kind {
            NodeKind::ImageTexture { image } => {
                assert_eq!(image.as_deref(), Some("Cube_bake"));
            }
            other => panic!("unexpected active node: {:?}", other),
        }
    }

    #[test]
    fn test_bake_without_session() {
        let mut doc = red_cube_document();
        assert!(matches!(
            bake_and_restore(&mut doc, &mut SolidBake),
            Err(BakerError::NoPriorSession)
        ));
    }

    #[test]
    fn test_bake_on_different_object_is_rejected() {
        // Prepare "Cube", then try to bake while "Other" is active. The
        // stale session must not rewrite "Other"'s materials.
        let mut doc = red_cube_document();
        doc.add_object(Object::new("Other", Mesh::plane(1.0, 1.0)));
        prepare_for_unwrap(&mut doc).unwrap();

        doc.set_active_object("Other").unwrap();
        let err = bake_and_restore(&mut doc, &mut SolidBake).unwrap_err();
        match err {
            BakerError::ObjectMismatch { prepared, active } => {
                assert_eq!(prepared, "Cube");
                assert_eq!(active, "Other");
            }
            other => panic!("unexpected error: {:?}", other),
        }

        let other = doc.object("Other").unwrap();
        assert!(other.material_slots().is_empty());
        assert_eq!(other.mesh.face_materials(), vec![0]);
        assert!(doc.unwrap_session().is_some());
    }

    #[test]
    fn test_bake_detects_face_count_change() {
        let mut doc = red_cube_document();
        prepare_for_unwrap(&mut doc).unwrap();

        doc.object_mut("Cube")
            .unwrap()
            .mesh
            .push_face(Face::new(vec![0, 1, 2]));

        let err = bake_and_restore(&mut doc, &mut SolidBake).unwrap_err();
        assert!(matches!(
            err,
            BakerError::InconsistentMeshState {
                expected: 6,
                found: 7
            }
        ));
    }

    #[test]
    fn test_bake_detects_topology_change() {
        // Same face count, different corner wiring.
        let mut doc = red_cube_document();
        prepare_for_unwrap(&mut doc).unwrap();

        doc.object_mut("Cube").unwrap().mesh.faces_mut()[0]
            .corners
            .reverse();

        let err = bake_and_restore(&mut doc, &mut SolidBake).unwrap_err();
        assert!(matches!(err, BakerError::InconsistentMeshState { .. }));
    }

    #[test]
    fn test_bake_failure_propagates_and_keeps_session() {
        let mut doc = red_cube_document();
        prepare_for_unwrap(&mut doc).unwrap();

        let err = bake_and_restore(&mut doc, &mut FailingBake).unwrap_err();
        assert!(matches!(err, BakerError::BakeFailed(_)));
        assert!(doc.unwrap_session().is_some());
    }

    #[test]
    fn test_alpha_bake_composites_cutout() {
        let mut doc = red_cube_document();
        doc.settings.set_resolution(8);
        doc.settings.bake_alpha = true;

        prepare_for_unwrap(&mut doc).unwrap();
        let outcome = bake_and_restore(&mut doc, &mut SolidBake).unwrap();

        assert_eq!(outcome.image, "Cube_bake_cutout");
        assert!(doc.image("Cube_bake-alpha").is_some());

        // RGB from the emission pass, alpha from the combined pass.
        let cutout = doc.image("Cube_bake_cutout").unwrap();
        for y in 0..8 {
            for x in 0..8 {
                assert_eq!(cutout.pixel(x, y), [0.8, 0.2, 0.1, 0.25]);
            }
        }

        // The shader's alpha input is fed by the texture's alpha output.
        let red = doc.material("Red").unwrap();
        let shader = red.shader().unwrap();
        let link = red.graph().link_into(shader, socket::ALPHA).unwrap();
        assert_eq!(link.from_socket, socket::ALPHA);
    }

    #[test]
    fn test_untextured_materials_are_skipped() {
        let mut doc = red_cube_document();
        doc.add_material(Material::new("Plain"));
        doc.object_mut("Cube")
            .unwrap()
            .add_material_slot("Plain".to_string());

        prepare_for_unwrap(&mut doc).unwrap();
        bake_and_restore(&mut doc, &mut SolidBake).unwrap();

        // Untouched: still just the principled node, no links.
        let plain = doc.material("Plain").unwrap();
        assert_eq!(plain.graph().nodes().len(), 1);
        assert!(plain.graph().links().is_empty());
    }

    #[test]
    fn test_empty_mesh_round_trips() {
        let mut doc = Document::new();
        let mesh = Mesh::new(Vec::new(), Vec::new(), Vec::new());
        doc.add_object(Object::new("Empty", mesh));
        doc.set_active_object("Empty").unwrap();
        doc.settings.set_resolution(1);

        prepare_for_unwrap(&mut doc).unwrap();
        let outcome = bake_and_restore(&mut doc, &mut SolidBake).unwrap();

        assert_eq!(outcome.material, "Empty-bake");
        let baked = doc.image(&outcome.image).unwrap();
        assert_eq!((baked.width(), baked.height()), (1, 1));
    }

    #[test]
    fn test_second_cycle_reuses_wiring() {
        // A full second prepare/bake cycle converges instead of compounding:
        // the emission link is replaced, not duplicated.
        let mut doc = red_cube_document();
        prepare_for_unwrap(&mut doc).unwrap();
        bake_and_restore(&mut doc, &mut SolidBake).unwrap();

        prepare_for_unwrap(&mut doc).unwrap();
        bake_and_restore(&mut doc, &mut SolidBake).unwrap();

        let object = doc.object("Cube").unwrap();
        assert_eq!(
            object.material_slots(),
            [
                "Red".to_string(),
                "Cube-bake".to_string(),
                "Cube-bake (1)".to_string()
            ]
        );

        let red = doc.material("Red").unwrap();
        let shader = red.shader().unwrap();
        let emission_links = red
            .graph()
            .links()
            .iter()
            .filter(|l| l.to_node == shader && l.to_socket == socket::EMISSION)
            .count();
        assert_eq!(emission_links, 1);
    }
}
