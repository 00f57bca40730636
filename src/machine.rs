//! The placeholder "machine" rig: a root node with three boxes sharing one
//! cube mesh, and the Explode / Assemble / Run translation clips.

use glam::Vec3;
use gltf::json;
use log::debug;

use crate::document::{DocumentBuilder, GltfAsset, TranslationChannel};
use crate::error::Result;
use crate::geometry::cube;
use crate::keyframes::TranslationTrack;

pub const GENERATOR: &str = concat!("machine-asset ", env!("CARGO_PKG_VERSION"));

pub const CUBE_HALF_EXTENT: f32 = 0.06;

pub const BASE_REST: Vec3 = Vec3::new(0.0, 0.06, 0.0);
pub const PART_A_REST: Vec3 = Vec3::new(-0.18, 0.18, 0.0);
pub const PART_B_REST: Vec3 = Vec3::new(0.18, 0.18, 0.0);
pub const PART_A_OPEN: Vec3 = Vec3::new(-0.45, 0.3, 0.18);
pub const PART_B_OPEN: Vec3 = Vec3::new(0.45, 0.3, -0.18);

/// Seconds for the parts to travel between rest and open.
pub const SEPARATE_DURATION: f32 = 1.0;

pub const RUN_TIMES: [f32; 3] = [0.0, 0.6, 1.2];
pub const RUN_BOB_HEIGHT: f32 = 0.05;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Part {
    Machine,
    Base,
    PartA,
    PartB,
}

impl Part {
    pub fn name(self) -> &'static str {
        match self {
            Part::Machine => "Machine",
            Part::Base => "Base",
            Part::PartA => "PartA",
            Part::PartB => "PartB",
        }
    }

    /// Rest translation relative to the parent, None for the root.
    pub fn rest_translation(self) -> Option<Vec3> {
        match self {
            Part::Machine => None,
            Part::Base => Some(BASE_REST),
            Part::PartA => Some(PART_A_REST),
            Part::PartB => Some(PART_B_REST),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClipDef {
    pub name: &'static str,
    pub tracks: Vec<(Part, TranslationTrack)>,
}

impl ClipDef {
    pub fn track(&self, part: Part) -> Option<&TranslationTrack> {
        self.tracks.iter().find(|(p, _)| *p == part).map(|(_, t)| t)
    }
}

pub fn explode_clip() -> Result<ClipDef> {
    Ok(ClipDef {
        name: "Explode",
        tracks: vec![
            (
                Part::PartA,
                TranslationTrack::between(PART_A_REST, PART_A_OPEN, SEPARATE_DURATION)?,
            ),
            (
                Part::PartB,
                TranslationTrack::between(PART_B_REST, PART_B_OPEN, SEPARATE_DURATION)?,
            ),
        ],
    })
}

/// Explode played backwards.
pub fn assemble_clip() -> Result<ClipDef> {
    let explode = explode_clip()?;
    Ok(ClipDef {
        name: "Assemble",
        tracks: explode
            .tracks
            .iter()
            .map(|(part, track)| (*part, track.reversed()))
            .collect(),
    })
}

/// Root bob: rest, up, rest.
pub fn run_clip() -> Result<ClipDef> {
    Ok(ClipDef {
        name: "Run",
        tracks: vec![(
            Part::Machine,
            TranslationTrack::new(
                RUN_TIMES.to_vec(),
                vec![Vec3::ZERO, Vec3::new(0.0, RUN_BOB_HEIGHT, 0.0), Vec3::ZERO],
            )?,
        )],
    })
}

pub fn clips() -> Result<Vec<ClipDef>> {
    Ok(vec![explode_clip()?, assemble_clip()?, run_clip()?])
}

struct Rig {
    machine: json::Index<json::Node>,
    base: json::Index<json::Node>,
    part_a: json::Index<json::Node>,
    part_b: json::Index<json::Node>,
}

impl Rig {
    fn node(&self, part: Part) -> json::Index<json::Node> {
        match part {
            Part::Machine => self.machine,
            Part::Base => self.base,
            Part::PartA => self.part_a,
            Part::PartB => self.part_b,
        }
    }
}

fn add_clip(builder: &mut DocumentBuilder, rig: &Rig, clip: &ClipDef) -> Result<()> {
    // tracks with identical keyframe times share one input accessor
    let mut inputs: Vec<(&[f32], json::Index<json::Accessor>)> = vec![];
    let mut channels = vec![];
    for (part, track) in &clip.tracks {
        let input = match inputs.iter().find(|(times, _)| *times == track.times()) {
            Some((_, input)) => *input,
            None => {
                let name = if inputs.is_empty() {
                    format!("{}.times", clip.name)
                } else {
                    format!("{}.times.{}", clip.name, inputs.len())
                };
                let input = builder.push_scalar_accessor(&name, track.times())?;
                inputs.push((track.times(), input));
                input
            }
        };
        let values: Vec<[f32; 3]> = track.values().iter().map(|v| v.to_array()).collect();
        let output = builder.push_vec3_accessor(
            &format!("{}.{}.translation", clip.name, part.name()),
            &values,
            None,
        )?;
        channels.push(TranslationChannel {
            node: rig.node(*part),
            input,
            output,
        });
    }
    builder.push_translation_animation(clip.name, &channels);
    debug!(
        "clip {}: {} channels, {} input accessors",
        clip.name,
        channels.len(),
        inputs.len()
    );
    Ok(())
}

/// Assembles the full document: cube mesh, node tree, scene and clips.
pub fn build_machine() -> Result<GltfAsset> {
    let mesh = cube(CUBE_HALF_EXTENT);
    mesh.validate()?;

    let mut builder = DocumentBuilder::new(GENERATOR);
    let positions = builder.push_vec3_accessor(
        "POSITION",
        &mesh.positions,
        Some(json::buffer::Target::ArrayBuffer),
    )?;
    let normals = builder.push_vec3_accessor(
        "NORMAL",
        &mesh.normals,
        Some(json::buffer::Target::ArrayBuffer),
    )?;
    let indices = builder.push_index_accessor("INDICES", &mesh.indices)?;
    let material = builder.push_material("material", 0.0, 1.0);
    let cube_mesh = builder.push_mesh("Cube", positions, normals, indices, material);

    let mut push_part = |part: Part| {
        let mesh = match part {
            Part::Machine => None,
            _ => Some(cube_mesh),
        };
        builder.push_node(part.name(), mesh, part.rest_translation())
    };
    let rig = Rig {
        machine: push_part(Part::Machine),
        base: push_part(Part::Base),
        part_a: push_part(Part::PartA),
        part_b: push_part(Part::PartB),
    };
    builder.add_children(rig.machine, &[rig.base, rig.part_a, rig.part_b]);
    let scene = builder.push_scene("Scene", &[rig.node(Part::Machine)]);
    builder.set_default_scene(scene);

    for clip in clips()? {
        add_clip(&mut builder, &rig, &clip)?;
    }

    builder.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assemble_is_explode_reversed_per_part() {
        let explode = explode_clip().unwrap();
        let assemble = assemble_clip().unwrap();
        for part in [Part::PartA, Part::PartB] {
            let e = explode.track(part).unwrap();
            let a = assemble.track(part).unwrap();
            assert_eq!(e.last_value(), a.first_value());
            assert_eq!(e.first_value(), a.last_value());
            assert_eq!(e.times(), a.times());
        }
    }

    #[test]
    fn explode_starts_from_the_rest_pose() {
        let explode = explode_clip().unwrap();
        for part in [Part::PartA, Part::PartB] {
            assert_eq!(Some(explode.track(part).unwrap().first_value()), part.rest_translation());
        }
        assert_eq!(explode.track(Part::PartA).unwrap().duration(), 1.0);
    }

    #[test]
    fn parts_sit_symmetrically_about_the_root() {
        assert_eq!(PART_A_REST.x, -PART_B_REST.x);
        assert_eq!(PART_A_REST.y, PART_B_REST.y);
        assert_eq!(PART_A_OPEN.x, -PART_B_OPEN.x);
        assert_eq!(PART_A_OPEN.z, -PART_B_OPEN.z);
    }

    #[test]
    fn run_bobs_the_root_over_three_keyframes() {
        let run = run_clip().unwrap();
        assert_eq!(run.tracks.len(), 1);
        let track = run.track(Part::Machine).unwrap();
        assert_eq!(track.times(), &[0.0, 0.6, 1.2]);
        assert!(track.times().windows(2).all(|w| w[0] < w[1]));
        assert_eq!(track.flattened_values().len(), 3 * track.times().len());
        assert_eq!(track.sample(0.6).y, RUN_BOB_HEIGHT);
    }

    #[test]
    fn document_has_expected_structure() {
        let asset = build_machine().unwrap();
        let root = &asset.root;

        let names: Vec<_> = root.nodes.iter().map(|n| n.name.clone().unwrap()).collect();
        assert_eq!(names, vec!["Machine", "Base", "PartA", "PartB"]);
        let children: Vec<_> = root.nodes[0]
            .children
            .as_ref()
            .unwrap()
            .iter()
            .map(|c| c.value())
            .collect();
        assert_eq!(children, vec![1, 2, 3]);
        assert!(root.nodes[0].mesh.is_none());
        assert!(root.nodes[1..].iter().all(|n| n.mesh.map(|m| m.value()) == Some(0)));

        assert_eq!(root.buffers.len(), 1);
        assert_eq!(root.meshes.len(), 1);
        assert_eq!(root.meshes[0].primitives.len(), 1);
        assert_eq!(root.materials.len(), 1);
        assert_eq!(root.scenes.len(), 1);
        assert_eq!(root.scene.map(|s| s.value()), Some(0));

        let clips: Vec<_> = root.animations.iter().map(|a| a.name.clone().unwrap()).collect();
        assert_eq!(clips, vec!["Explode", "Assemble", "Run"]);
    }

    #[test]
    fn explode_and_assemble_share_one_input_accessor_per_clip() {
        let asset = build_machine().unwrap();
        for animation in &asset.root.animations[..2] {
            assert_eq!(animation.samplers.len(), 2);
            let [a, b] = [&animation.samplers[0], &animation.samplers[1]];
            assert_eq!(a.input.value(), b.input.value());
            assert_ne!(a.output.value(), b.output.value());
        }
        // 3 mesh accessors, 2 clips with 1 input + 2 outputs, Run with 1 + 1
        assert_eq!(asset.root.accessors.len(), 3 + 2 * 3 + 2);
    }

    #[test]
    fn material_is_rough_dielectric() {
        let asset = build_machine().unwrap();
        let pbr = &asset.root.materials[0].pbr_metallic_roughness;
        assert_eq!(pbr.metallic_factor.0, 0.0);
        assert_eq!(pbr.roughness_factor.0, 1.0);
    }
}
