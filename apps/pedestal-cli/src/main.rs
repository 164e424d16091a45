use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use pedestal_assets::{Catalog, display_pose, import_model};
use pedestal_render::{Renderer, SceneView, TextFrameRenderer};
use pedestal_scene::ViewerScene;
use pedestal_tools::ViewerInspector;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "pedestal-cli", about = "CLI tool for pedestal assets")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print version and crate info
    Info,
    /// Import a model and report its geometry
    Inspect {
        /// Path to a .gltf/.glb file
        path: PathBuf,
        /// Emit machine-readable JSON
        #[arg(long)]
        json: bool,
    },
    /// Validate a catalog manifest
    Catalog {
        /// Path to a catalog YAML file
        #[arg(default_value = "demos/catalog.yaml")]
        path: PathBuf,
    },
    /// Print the display pose a model would be staged with
    Pose {
        /// Path to a .gltf/.glb file
        path: PathBuf,
    },
    /// Render one headless text frame of a staged model
    Frame {
        /// Path to a .gltf/.glb file
        path: PathBuf,
    },
}

fn model_label(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "model".to_string())
}

/// Run a file through the same import pipeline the viewer uses and stage
/// the result in a fresh scene.
fn stage_file(path: &Path) -> Result<ViewerScene> {
    let mut data =
        import_model(path).with_context(|| format!("importing {}", path.display()))?;
    data.normalize();
    data.apply_display_finish();

    let mut scene = ViewerScene::new();
    scene.insert(model_label(path), data, display_pose());
    Ok(scene)
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match cli.command {
        Commands::Info => {
            println!("pedestal-cli v{}", env!("CARGO_PKG_VERSION"));
            println!("assets: {}", pedestal_assets::crate_info());
            println!("director: {}", pedestal_director::crate_info());
            println!("input: {}", pedestal_input::crate_info());
            println!("loader: {}", pedestal_loader::crate_info());
            println!("render: {}", pedestal_render::crate_info());
            println!("scene: {}", pedestal_scene::crate_info());
            println!("tools: {}", pedestal_tools::crate_info());
        }
        Commands::Inspect { path, json } => {
            let scene = stage_file(&path)?;
            let model = scene
                .current()
                .context("import produced no staged model")?;
            let info = ViewerInspector::inspect_model(model);

            if json {
                let value = serde_json::json!({
                    "id": info.short_id,
                    "label": info.label,
                    "meshes": info.mesh_count,
                    "vertices": info.vertex_count,
                    "position": info.position,
                });
                println!("{}", serde_json::to_string_pretty(&value)?);
            } else {
                println!("{info}");
            }
        }
        Commands::Catalog { path } => {
            let catalog = Catalog::load(&path)
                .with_context(|| format!("loading catalog {}", path.display()))?;
            println!("{} entries in {}", catalog.len(), path.display());

            // Entry paths were resolved against the manifest dir at load.
            let mut missing = 0usize;
            for index in 0..catalog.len() {
                let entry = catalog.entry(index).unwrap();
                let status = if entry.path.exists() {
                    "ok"
                } else {
                    missing += 1;
                    "MISSING"
                };
                println!(
                    "  [{index}] {} ({}) -> {} [{status}]",
                    entry.label,
                    entry.id,
                    entry.path.display()
                );
            }
            if missing > 0 {
                anyhow::bail!("{missing} catalog entries point at missing files");
            }
        }
        Commands::Pose { path } => {
            let mut data =
                import_model(&path).with_context(|| format!("importing {}", path.display()))?;
            let raw_aabb = data.aabb().context("model has no geometry")?;
            let stats = data.normalize();
            let staged_aabb = data.aabb().context("model has no geometry")?;
            let pose = display_pose();

            println!("model: {}", model_label(&path));
            println!(
                "raw bounds: center=({:.3}, {:.3}, {:.3}) extent={:.3}",
                stats.center.x,
                stats.center.y,
                stats.center.z,
                raw_aabb.max_extent()
            );
            println!(
                "normalize: scale={:.4} -> extent={:.3}",
                stats.scale,
                staged_aabb.max_extent()
            );
            println!(
                "display pose: pos=({:.2}, {:.2}, {:.2})",
                pose.position.x, pose.position.y, pose.position.z
            );
        }
        Commands::Frame { path } => {
            let scene = stage_file(&path)?;
            let frame = TextFrameRenderer::new().render(&scene, &SceneView::default());
            print!("{frame}");
        }
    }

    Ok(())
}
