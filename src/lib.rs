use std::path::PathBuf;

use log::info;

pub mod config;
pub mod document;
pub mod error;
pub mod geometry;
pub mod glb;
pub mod inspect;
pub mod keyframes;
pub mod machine;

use config::GeneratorConfig;
use error::Result;

pub fn align_to_4(n: usize) -> usize {
    (n + 3) & !3
}

/// Builds the machine asset and writes it to the configured destination.
/// Returns the path that was written.
pub fn generate(config: &GeneratorConfig) -> Result<PathBuf> {
    let asset = machine::build_machine()?;
    let bytes = asset.to_glb()?;
    info!(
        "encoded {} nodes, {} animations into {} bytes",
        asset.root.nodes.len(),
        asset.root.animations.len(),
        bytes.len()
    );
    glb::write_atomically(&config.output_path, &bytes)?;
    Ok(config.output_path.clone())
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;
    use crate::glb::GlbHeader;
    use crate::inspect::AssetSummary;

    #[test]
    fn align_rounds_up_to_multiples_of_four() {
        assert_eq!(align_to_4(0), 0);
        assert_eq!(align_to_4(1), 4);
        assert_eq!(align_to_4(4), 4);
        assert_eq!(align_to_4(73), 76);
    }

    #[test]
    fn generate_into_an_empty_directory() {
        let dir = tempfile::tempdir().unwrap();
        let config = GeneratorConfig {
            output_path: dir.path().join("models/machine.glb"),
        };

        let written = generate(&config).unwrap();

        assert_eq!(written, config.output_path);
        assert!(dir.path().join("models").is_dir());
        let bytes = fs::read(&written).unwrap();
        assert!(!bytes.is_empty());
        let header = GlbHeader::read(&mut bytes.as_slice()).unwrap();
        assert_eq!(header.length as usize, bytes.len());

        let summary = AssetSummary::load(&written).unwrap();
        assert_eq!(summary.clips.len(), 3);
        assert_eq!(summary.node_names.len(), 4);
    }

    #[test]
    fn generating_twice_is_byte_identical() {
        let dir = tempfile::tempdir().unwrap();
        let first = GeneratorConfig {
            output_path: dir.path().join("first.glb"),
        };
        let second = GeneratorConfig {
            output_path: dir.path().join("second.glb"),
        };

        generate(&first).unwrap();
        generate(&second).unwrap();

        assert_eq!(
            fs::read(&first.output_path).unwrap(),
            fs::read(&second.output_path).unwrap()
        );
    }

    #[test]
    fn regenerating_overwrites_the_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = GeneratorConfig {
            output_path: dir.path().join("machine.glb"),
        };
        fs::write(&config.output_path, b"stale").unwrap();

        generate(&config).unwrap();

        let summary = AssetSummary::load(&config.output_path).unwrap();
        assert_eq!(summary.clip_names(), vec!["Explode", "Assemble", "Run"]);
    }
}
