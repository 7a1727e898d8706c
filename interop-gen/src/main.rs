use anyhow::{bail, Context, Result};
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use interop_core::emit::render_module;
use interop_core::parser::parse_files;
use interop_core::types::{ArrayLen, Block};

/// Project manifest: which shader files to scan and where the generated
/// module goes. Paths are resolved relative to the manifest's directory.
#[derive(Debug, Serialize, Deserialize)]
pub struct InteropProject {
    shader_files: Vec<String>,
    output_file: PathBuf,
}

impl InteropProject {
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        let config_str = std::fs::read_to_string(path.as_ref()).with_context(|| {
            format!("failed to read project manifest {}", path.as_ref().display())
        })?;
        let config: InteropProject = toml::from_str(&config_str)?;
        Ok(config)
    }

    /// Expands the manifest's shader file entries. Manifest order is kept;
    /// glob patterns contribute their matches in glob's sorted order, so the
    /// emitted block order is stable across runs.
    pub fn resolve_inputs(&self, root: &Path) -> Result<Vec<PathBuf>> {
        let mut inputs = Vec::new();
        for pattern in &self.shader_files {
            let full = root.join(pattern).to_string_lossy().into_owned();
            let before = inputs.len();
            for path in glob::glob(&full)? {
                inputs.push(path?);
            }
            if inputs.len() == before {
                bail!("shader file pattern matched nothing: {pattern}");
            }
        }
        Ok(inputs)
    }
}

/// One member in the YAML layout report.
///
/// `offset` and `size` are the declared layout values the offset formulas
/// produce, not positions in the emitted struct: a later field can sit past
/// its reported offset when a fixed array wrapper spans more than the
/// array's declared size.
#[derive(Debug, Serialize)]
struct FieldReport {
    name: String,
    #[serde(rename = "type")]
    type_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    array: Option<usize>,
    offset: usize,
    size: usize,
    alignment: usize,
}

#[derive(Debug, Serialize)]
struct BlockReport {
    name: String,
    binding: String,
    layout: String,
    byte_end: usize,
    fields: Vec<FieldReport>,
}

impl BlockReport {
    fn from_block(block: &Block) -> Self {
        Self {
            name: block.name.clone(),
            binding: block.binding.clone(),
            layout: block.standard.keyword().to_owned(),
            byte_end: block.byte_end(),
            fields: block
                .fields
                .iter()
                .map(|field| FieldReport {
                    name: field.name.clone(),
                    type_name: field.entry.name.to_owned(),
                    array: match field.array {
                        ArrayLen::Fixed(count) => Some(count),
                        _ => None,
                    },
                    offset: field.offset,
                    size: field.size,
                    alignment: field.alignment,
                })
                .collect(),
        }
    }
}

fn generate(project_path: impl AsRef<Path>, report: Option<&Path>) -> Result<PathBuf> {
    let project_path = project_path.as_ref();
    let project = InteropProject::new(project_path)?;
    let root = project_path.parent().unwrap_or_else(|| Path::new("."));

    let inputs = project.resolve_inputs(root)?;
    log::info!("parsing {} shader files", inputs.len());
    let blocks = parse_files(&inputs)?;
    log::info!("rendering {} buffer blocks", blocks.len());
    let rendered = render_module(&blocks)?;

    if let Some(report_path) = report {
        let reports: Vec<BlockReport> = blocks.iter().map(BlockReport::from_block).collect();
        std::fs::write(report_path, serde_yaml::to_string(&reports)?)
            .with_context(|| format!("failed to write report {}", report_path.display()))?;
    }

    // The output path is only ever touched after the whole pipeline has
    // succeeded: fill a sibling temp file, then rename it into place. A
    // failed run leaves the previous artifact intact.
    let output = root.join(&project.output_file);
    if let Some(dir) = output.parent() {
        std::fs::create_dir_all(dir)?;
    }
    let tmp = output.with_extension("tmp");
    std::fs::write(&tmp, rendered)
        .with_context(|| format!("failed to write {}", tmp.display()))?;
    std::fs::rename(&tmp, &output)
        .with_context(|| format!("failed to move generated file to {}", output.display()))?;
    log::info!("wrote {}", output.display());

    Ok(output)
}

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to the project manifest
    #[clap(short, long, default_value = "interop.toml")]
    project: String,
    /// Optional path for a YAML report of the computed block layouts
    #[clap(short, long)]
    report: Option<PathBuf>,
}

fn main() {
    env_logger::init();
    let args = Args::parse();
    if let Err(e) = generate(&args.project, args.report.as_deref()) {
        log::error!("Error: {e:#}");
        std::process::exit(1);
    }
}

// The checked-in artifact for the testcase project, compiled as part of the
// test build so "the output is valid host code" is itself under test.
#[cfg(test)]
#[path = "../testcase/gen/shader_interop.rs"]
mod generated;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate() {
        let manifest = Path::new(concat!(
            env!("CARGO_MANIFEST_DIR"),
            "/testcase/interop.toml"
        ));
        let report = std::env::temp_dir().join("interop_gen_test_report.yaml");

        let output = generate(manifest, Some(report.as_path())).unwrap();
        let text = std::fs::read_to_string(&output).unwrap();
        assert!(text.contains("pub struct camera_data {"));
        assert!(text.contains("pub struct light_data {"));

        let report_text = std::fs::read_to_string(&report).unwrap();
        assert!(report_text.contains("camera_data"));
        assert!(report_text.contains("std430"));

        // Unchanged input must reproduce the artifact byte for byte.
        generate(manifest, None).unwrap();
        assert_eq!(std::fs::read_to_string(&output).unwrap(), text);

        // The output path is tracked, so a change to the pipeline that is
        // not reflected in the checked-in module shows up here.
        assert_eq!(text, include_str!("../testcase/gen/shader_interop.rs"));
    }

    #[test]
    fn test_generated_blocks_match_their_declared_layout() {
        use crate::generated::{camera_data, light_data};

        // std140: three mat4 columns, a vec3/float scalar run, a float[4]
        // at its 16-byte stride and a trailing bool rounded out to the
        // struct alignment glam's Mat4 imposes.
        assert_eq!(std::mem::align_of::<camera_data>(), 16);
        assert_eq!(std::mem::size_of::<camera_data>(), 304);
        assert_eq!(std::mem::offset_of!(camera_data, camera_position), 192);
        assert_eq!(std::mem::offset_of!(camera_data, shadow_split_depths), 224);
        // The array wrapper spans 4 * 16 bytes, so the bool lands at 288.
        assert_eq!(std::mem::offset_of!(camera_data, frustum_culling), 288);

        // std430: uvec2 + uint + one pad, then two tightly packed vec4
        // arrays with nothing left to round out.
        assert_eq!(std::mem::size_of::<light_data>(), 2064);
        assert_eq!(std::mem::offset_of!(light_data, light_positions), 16);
        assert_eq!(std::mem::offset_of!(light_data, light_colors), 1040);
    }

    #[test]
    fn test_generated_blocks_are_plain_old_data() {
        use crate::generated::camera_data;

        let mut block: camera_data = bytemuck::Zeroable::zeroed();
        block.camera_near = 0.1;
        block.shadow_split_depths.fill_from_slice(&[4.0, 16.0, 64.0, 256.0]);
        block.frustum_culling = true.into();

        let bytes = bytemuck::bytes_of(&block);
        assert_eq!(bytes.len(), 304);
        // Second cascade split sits one 16-byte stride into the array.
        assert_eq!(bytes[240..244], 16.0_f32.to_le_bytes());
        assert_eq!(bytes[288..292], 1_u32.to_le_bytes());
    }

    #[test]
    fn test_failed_run_writes_nothing() {
        let manifest = Path::new(concat!(
            env!("CARGO_MANIFEST_DIR"),
            "/testcase/broken/interop.toml"
        ));
        assert!(generate(manifest, None).is_err());
        let output = Path::new(concat!(
            env!("CARGO_MANIFEST_DIR"),
            "/testcase/broken/gen/shader_interop.rs"
        ));
        assert!(!output.exists());
    }
}
