use anyhow::Result;
use base64::Engine;
use clap::{Parser, Subcommand};
use serde_json::json;
use std::path::Path;
use std::process::Command;

#[derive(Parser)]
#[command(name = "xtask", about = "Workspace automation for pedestal")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run all checks: fmt, clippy, tests, deny, doc
    Check,
    /// Run cargo fmt --check on all crates
    Fmt,
    /// Run clippy on all crates
    Clippy,
    /// Run all tests
    Test,
    /// Run cargo deny check
    Deny,
    /// Build rustdoc for the workspace
    Doc,
    /// Build the entire workspace
    Build,
    /// Regenerate the demo catalog and its glTF card fixtures
    Fixtures {
        /// Output directory
        #[arg(long, default_value = "demos")]
        out: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Check => {
            run_fmt()?;
            run_clippy()?;
            run_tests()?;
            run_deny()?;
            run_doc()?;
        }
        Commands::Fmt => run_fmt()?,
        Commands::Clippy => run_clippy()?,
        Commands::Test => run_tests()?,
        Commands::Deny => run_deny()?,
        Commands::Doc => run_doc()?,
        Commands::Build => run_build()?,
        Commands::Fixtures { out } => write_fixtures(Path::new(&out))?,
    }

    Ok(())
}

fn run_fmt() -> Result<()> {
    println!("==> Running cargo fmt --check");
    let status = Command::new("cargo")
        .args(["fmt", "--all", "--", "--check"])
        .status()?;
    if !status.success() {
        anyhow::bail!("cargo fmt check failed");
    }
    Ok(())
}

fn run_clippy() -> Result<()> {
    println!("==> Running cargo clippy");
    let status = Command::new("cargo")
        .args([
            "clippy",
            "--workspace",
            "--all-targets",
            "--",
            "-D",
            "warnings",
        ])
        .status()?;
    if !status.success() {
        anyhow::bail!("cargo clippy failed");
    }
    Ok(())
}

fn run_tests() -> Result<()> {
    println!("==> Running cargo test");
    let status = Command::new("cargo")
        .args(["test", "--workspace"])
        .status()?;
    if !status.success() {
        anyhow::bail!("cargo test failed");
    }
    Ok(())
}

fn run_deny() -> Result<()> {
    println!("==> Running cargo deny check (licenses bans sources)");
    let status = Command::new("cargo")
        .args(["deny", "check", "licenses", "bans", "sources"])
        .status()?;
    if !status.success() {
        anyhow::bail!("cargo deny check failed");
    }
    Ok(())
}

fn run_doc() -> Result<()> {
    println!("==> Running cargo doc");
    let status = Command::new("cargo")
        .args(["doc", "--workspace", "--no-deps"])
        .status()?;
    if !status.success() {
        anyhow::bail!("cargo doc failed");
    }
    Ok(())
}

fn run_build() -> Result<()> {
    println!("==> Running cargo build");
    let status = Command::new("cargo")
        .args(["build", "--workspace"])
        .status()?;
    if !status.success() {
        anyhow::bail!("cargo build failed");
    }
    Ok(())
}

/// Card slab half extents shared by every fixture. Credit-card
/// proportions so the viewer's framing is easy to eyeball.
const HX: f32 = 0.428;
const HY: f32 = 0.27;
const HZ: f32 = 0.016;

struct CardSpec {
    id: &'static str,
    label: &'static str,
    base_color: [f32; 4],
    metallic: f32,
    roughness: f32,
    emissive: [f32; 3],
}

const CARDS: [CardSpec; 3] = [
    CardSpec {
        id: "obsidian",
        label: "Obsidian",
        base_color: [0.05, 0.05, 0.07, 1.0],
        metallic: 0.9,
        roughness: 0.25,
        emissive: [0.01, 0.01, 0.02],
    },
    CardSpec {
        id: "gilded",
        label: "Gilded",
        base_color: [0.92, 0.72, 0.32, 1.0],
        metallic: 1.0,
        roughness: 0.18,
        emissive: [0.05, 0.03, 0.0],
    },
    CardSpec {
        id: "cobalt",
        label: "Cobalt",
        base_color: [0.16, 0.32, 0.78, 1.0],
        metallic: 0.7,
        roughness: 0.3,
        emissive: [0.0, 0.01, 0.04],
    },
];

fn write_fixtures(out: &Path) -> Result<()> {
    std::fs::create_dir_all(out)?;

    let mut manifest = String::from(
        "# Demo catalog for the pedestal viewer. Paths are resolved relative to\n\
         # this file's directory.\n\
         models:\n",
    );
    for card in &CARDS {
        manifest.push_str(&format!(
            "  - id: {id}\n    path: {id}-card.gltf\n    label: {label}\n",
            id = card.id,
            label = card.label
        ));
        let path = out.join(format!("{}-card.gltf", card.id));
        std::fs::write(&path, card_gltf(card)?)?;
        println!("wrote {}", path.display());
    }

    let manifest_path = out.join("catalog.yaml");
    std::fs::write(&manifest_path, manifest)?;
    println!("wrote {}", manifest_path.display());
    Ok(())
}

/// Slab geometry packed the glTF way: positions, normals, then u16
/// indices, all in one base64 data-URI buffer.
fn slab_buffer() -> (String, usize, usize, usize) {
    #[rustfmt::skip]
    let positions: [[f32; 3]; 24] = [
        // +Z face
        [-HX, -HY,  HZ], [ HX, -HY,  HZ], [ HX,  HY,  HZ], [-HX,  HY,  HZ],
        // -Z face
        [ HX, -HY, -HZ], [-HX, -HY, -HZ], [-HX,  HY, -HZ], [ HX,  HY, -HZ],
        // +X face
        [ HX, -HY,  HZ], [ HX, -HY, -HZ], [ HX,  HY, -HZ], [ HX,  HY,  HZ],
        // -X face
        [-HX, -HY, -HZ], [-HX, -HY,  HZ], [-HX,  HY,  HZ], [-HX,  HY, -HZ],
        // +Y face
        [-HX,  HY,  HZ], [ HX,  HY,  HZ], [ HX,  HY, -HZ], [-HX,  HY, -HZ],
        // -Y face
        [-HX, -HY, -HZ], [ HX, -HY, -HZ], [ HX, -HY,  HZ], [-HX, -HY,  HZ],
    ];

    #[rustfmt::skip]
    let face_normals: [[f32; 3]; 6] = [
        [0.0, 0.0, 1.0], [0.0, 0.0, -1.0],
        [1.0, 0.0, 0.0], [-1.0, 0.0, 0.0],
        [0.0, 1.0, 0.0], [0.0, -1.0, 0.0],
    ];

    let mut bytes = Vec::new();
    for p in &positions {
        for c in p {
            bytes.extend_from_slice(&c.to_le_bytes());
        }
    }
    let position_len = bytes.len();

    for normal in &face_normals {
        for _ in 0..4 {
            for c in normal {
                bytes.extend_from_slice(&c.to_le_bytes());
            }
        }
    }
    let normal_len = bytes.len() - position_len;

    for face in 0..6u16 {
        let base = face * 4;
        for i in [0, 1, 2, 0, 2, 3] {
            bytes.extend_from_slice(&(base + i).to_le_bytes());
        }
    }
    let index_len = bytes.len() - position_len - normal_len;

    let encoded = base64::engine::general_purpose::STANDARD.encode(&bytes);
    (
        format!("data:application/octet-stream;base64,{encoded}"),
        position_len,
        normal_len,
        index_len,
    )
}

fn card_gltf(card: &CardSpec) -> Result<String> {
    let (uri, position_len, normal_len, index_len) = slab_buffer();
    let byte_length = position_len + normal_len + index_len;

    let doc = json!({
        "asset": { "version": "2.0", "generator": "pedestal-fixtures" },
        "scene": 0,
        "scenes": [ { "nodes": [0] } ],
        "nodes": [ { "mesh": 0 } ],
        "meshes": [
            {
                "name": format!("{}-card", card.id),
                "primitives": [
                    {
                        "attributes": { "POSITION": 0, "NORMAL": 1 },
                        "indices": 2,
                        "material": 0
                    }
                ]
            }
        ],
        "materials": [
            {
                "name": format!("{}-card-finish", card.id),
                "pbrMetallicRoughness": {
                    "baseColorFactor": card.base_color,
                    "metallicFactor": card.metallic,
                    "roughnessFactor": card.roughness
                },
                "emissiveFactor": card.emissive
            }
        ],
        "buffers": [ { "uri": uri, "byteLength": byte_length } ],
        "bufferViews": [
            { "buffer": 0, "byteOffset": 0, "byteLength": position_len },
            { "buffer": 0, "byteOffset": position_len, "byteLength": normal_len },
            {
                "buffer": 0,
                "byteOffset": position_len + normal_len,
                "byteLength": index_len
            }
        ],
        "accessors": [
            {
                "bufferView": 0,
                "componentType": 5126,
                "count": 24,
                "type": "VEC3",
                "min": [-HX, -HY, -HZ],
                "max": [HX, HY, HZ]
            },
            { "bufferView": 1, "componentType": 5126, "count": 24, "type": "VEC3" },
            { "bufferView": 2, "componentType": 5123, "count": 36, "type": "SCALAR" }
        ]
    });

    Ok(format!("{}\n", serde_json::to_string_pretty(&doc)?))
}
