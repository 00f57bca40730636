use std::fs;
use std::path::Path;

use glam::Vec3;
use gltf::animation::util::ReadOutputs;
use gltf::animation::Interpolation;
use log::warn;
use serde::Serialize;

use crate::error::{GenerateError, Result};
use crate::keyframes::{wrap_time, CubicSplineTrack, Curve, TimeWrapMode, TranslationTrack};

#[derive(Serialize, Debug, Clone)]
pub struct ClipTrack {
    pub node: String,
    pub curve: Curve,
}

#[derive(Serialize, Debug, Clone)]
pub struct ClipSummary {
    pub name: String,
    pub duration: f32,
    pub tracks: Vec<ClipTrack>,
}

impl ClipSummary {
    /// Translation of every animated node at `time`.
    pub fn sample(&self, time: f32, wrap: TimeWrapMode) -> Vec<(String, Vec3)> {
        let t = wrap_time(time, self.duration, wrap);
        self.tracks
            .iter()
            .map(|clip_track| (clip_track.node.clone(), clip_track.curve.sample(t)))
            .collect()
    }
}

/// What a viewer sees when it loads the file: names and clips.
#[derive(Serialize, Debug, Clone)]
pub struct AssetSummary {
    pub generator: Option<String>,
    pub node_names: Vec<String>,
    pub scene_roots: Vec<String>,
    pub mesh_count: usize,
    pub clips: Vec<ClipSummary>,
}

fn build_curve(interpolation: Interpolation, times: Vec<f32>, values: Vec<Vec3>) -> Result<Curve> {
    Ok(match interpolation {
        Interpolation::Linear => Curve::Linear(TranslationTrack::new(times, values)?),
        Interpolation::Step => Curve::Step(TranslationTrack::new(times, values)?),
        Interpolation::CubicSpline => Curve::CubicSpline(CubicSplineTrack::new(times, values)?),
    })
}

fn node_name(node: &gltf::Node) -> String {
    node.name()
        .map(str::to_string)
        .unwrap_or_else(|| format!("node{}", node.index()))
}

impl AssetSummary {
    pub fn load(path: &Path) -> Result<Self> {
        let bytes = fs::read(path).map_err(|source| GenerateError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_slice(&bytes)
    }

    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        let (document, buffers, _images) = gltf::import_slice(bytes)?;

        let scene_roots = document
            .default_scene()
            .or_else(|| document.scenes().next())
            .map(|scene| scene.nodes().map(|n| node_name(&n)).collect())
            .unwrap_or_default();

        let mut clips = vec![];
        for (idx, animation) in document.animations().enumerate() {
            let name = animation
                .name()
                .map(str::to_string)
                .unwrap_or_else(|| format!("animation{}", idx));
            let mut tracks = vec![];
            for (channel_idx, channel) in animation.channels().enumerate() {
                let reader = channel.reader(|buffer| Some(&buffers[buffer.index()]));
                let times: Vec<f32> = match reader.read_inputs() {
                    Some(inputs) => inputs.collect(),
                    None => {
                        warn!("clip {}: channel {} has no keyframe times, skipping", name, channel_idx);
                        continue;
                    }
                };
                let values: Vec<Vec3> = match reader.read_outputs() {
                    Some(ReadOutputs::Translations(translations)) => {
                        translations.map(Vec3::from).collect()
                    }
                    _ => {
                        warn!("clip {}: channel {} is not a translation, skipping", name, channel_idx);
                        continue;
                    }
                };
                let curve = match build_curve(channel.sampler().interpolation(), times, values) {
                    Ok(curve) => curve,
                    Err(e) => {
                        warn!("clip {}: channel {} has unusable keyframes ({}), skipping", name, channel_idx, e);
                        continue;
                    }
                };
                tracks.push(ClipTrack {
                    node: node_name(&channel.target().node()),
                    curve,
                });
            }
            let duration = tracks
                .iter()
                .map(|t| t.curve.duration())
                .fold(0.0, f32::max);
            clips.push(ClipSummary {
                name,
                duration,
                tracks,
            });
        }

        Ok(Self {
            generator: document.as_json().asset.generator.clone(),
            node_names: document.nodes().map(|n| node_name(&n)).collect(),
            scene_roots,
            mesh_count: document.meshes().count(),
            clips,
        })
    }

    pub fn clip_names(&self) -> Vec<&str> {
        self.clips.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn clip(&self, name: &str) -> Result<&ClipSummary> {
        self.clips
            .iter()
            .find(|c| c.name == name)
            .ok_or_else(|| GenerateError::MissingClip(name.to_string()))
    }
}
