//! Griddle CLI - grid texture generation and OBJ inspection.
//!
//! Usage: griddle <COMMAND> [OPTIONS]
//!
//! Run `griddle --help` for available commands.

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};

use griddle::baker::grid::GRID_MATERIAL_NAME;
use griddle::baker::settings::{MAX_RESOLUTION, MIN_RESOLUTION};
use griddle::document::image::Image;
use griddle::document::Document;

#[derive(Parser)]
#[command(name = "griddle")]
#[command(author, version, about = "UV grid textures and OBJ inspection", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render the diagnostic color grid pattern to a PNG
    Grid {
        /// Output image file
        output: PathBuf,

        /// Edge length in pixels
        #[arg(short, long, default_value = "1024")]
        size: u32,
    },

    /// Display the objects, materials, and UV layers of an OBJ file
    Info {
        /// Input mesh file
        input: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Grid { output, size } => {
            let size = size.clamp(MIN_RESOLUTION, MAX_RESOLUTION);
            let image = Image::color_grid(GRID_MATERIAL_NAME, size, size);
            image
                .save_png(&output)
                .with_context(|| format!("writing {}", output.display()))?;
            println!("wrote {}x{} grid to {}", size, size, output.display());
        }
        Commands::Info { input } => {
            let mut doc = Document::new();
            let name = doc
                .import_obj(&input)
                .with_context(|| format!("loading {}", input.display()))?;
            let object = doc.object(&name).expect("object was just imported");

            println!("object: {}", object.name);
            println!("  vertices:  {}", object.mesh.positions.len());
            println!("  faces:     {}", object.mesh.face_count());
            println!("  triangles: {}", object.mesh.triangulate().len());

            let active = object.mesh.active_uv_layer().map(|l| l.name.clone());
            for layer in object.mesh.uv_layers() {
                let marker = if Some(&layer.name) == active.as_ref() {
                    " (active)"
                } else {
                    ""
                };
                println!("  uv layer:  {}{}", layer.name, marker);
            }

            for (i, slot) in object.material_slots().iter().enumerate() {
                println!("  slot {}:    {}", i, slot);
            }
        }
    }

    Ok(())
}
