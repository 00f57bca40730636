use std::env;
use std::fs::File;
use std::io::BufReader;

use machine_asset::config::InspectConfig;
use machine_asset::glb::GlbHeader;
use machine_asset::inspect::AssetSummary;
use machine_asset::keyframes::TimeWrapMode;

/// Sample points per clip in the printed timeline.
const TIMELINE_STEPS: usize = 4;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let args: Vec<String> = env::args().skip(1).collect();
    let config = InspectConfig::from_args(&args);

    let summary = AssetSummary::load(&config.input_path)?;
    if config.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    let mut file = BufReader::new(File::open(&config.input_path)?);
    let header = GlbHeader::read(&mut file)?;
    println!("magic: {}, version: {}, length: {}", header.magic, header.version, header.length);
    for chunk in &header.chunks {
        println!("{} CHUNK | length: {}", chunk.chunk_type, chunk.chunk_length);
    }

    if let Some(generator) = &summary.generator {
        println!("generator: {}", generator);
    }
    println!("nodes: {}", summary.node_names.join(", "));
    println!("scene roots: {}", summary.scene_roots.join(", "));
    println!("meshes: {}", summary.mesh_count);

    if summary.clips.is_empty() {
        println!("no clips detected");
        return Ok(());
    }
    println!("clips: {}", summary.clip_names().join(", "));
    for clip in &summary.clips {
        println!("{} ({:.2}s)", clip.name, clip.duration);
        for step in 0..=TIMELINE_STEPS {
            let t = clip.duration * step as f32 / TIMELINE_STEPS as f32;
            let pose: Vec<String> = clip
                .sample(t, TimeWrapMode::Clamp)
                .iter()
                .map(|(node, translation)| {
                    format!(
                        "{} [{:.3}, {:.3}, {:.3}]",
                        node, translation.x, translation.y, translation.z
                    )
                })
                .collect();
            println!("  t={:.2}  {}", t, pose.join("  "));
        }
    }

    Ok(())
}
