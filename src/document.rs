use std::collections::BTreeMap;

use glam::Vec3;
use gltf::json;
use json::validation::Checked::Valid;
use json::validation::USize64;
use log::debug;

use crate::align_to_4;
use crate::error::{GenerateError, Result};
use crate::geometry::calculate_aabb;

/// Appends to one of the root's tables and returns the new entry's index.
/// Entities refer to each other only through these indices.
fn push<T>(items: &mut Vec<T>, item: T) -> json::Index<T> {
    items.push(item);
    json::Index::new((items.len() - 1) as u32)
}

/// Translation channel of an animation: (target node, times, values)
pub struct TranslationChannel {
    pub node: json::Index<json::Node>,
    pub input: json::Index<json::Accessor>,
    pub output: json::Index<json::Accessor>,
}

/// A validated glTF document together with the contents of its single buffer.
#[derive(Debug, Clone)]
pub struct GltfAsset {
    pub root: json::Root,
    pub bin: Vec<u8>,
}

impl GltfAsset {
    pub fn to_glb(&self) -> Result<Vec<u8>> {
        crate::glb::encode_glb(self)
    }
}

/// Owns every table of the document plus the bytes of its single buffer.
pub struct DocumentBuilder {
    root: json::Root,
    bin: Vec<u8>,
}

impl DocumentBuilder {
    pub fn new(generator: &str) -> Self {
        let mut root = json::Root::default();
        root.asset.generator = Some(generator.to_string());
        push(
            &mut root.buffers,
            json::Buffer {
                byte_length: USize64(0),
                name: Some("buffer".to_string()),
                uri: None,
                extensions: Default::default(),
                extras: Default::default(),
            },
        );
        Self { root, bin: vec![] }
    }

    fn buffer(&self) -> json::Index<json::Buffer> {
        json::Index::new(0)
    }

    fn push_view(
        &mut self,
        bytes: &[u8],
        target: Option<json::buffer::Target>,
    ) -> json::Index<json::buffer::View> {
        // every view starts on a 4 byte boundary, f32 accessors require it
        self.bin.resize(align_to_4(self.bin.len()), 0);
        let byte_offset = self.bin.len();
        self.bin.extend_from_slice(bytes);
        let view = json::buffer::View {
            buffer: self.buffer(),
            byte_length: USize64::from(bytes.len()),
            byte_offset: Some(USize64::from(byte_offset)),
            byte_stride: None,
            name: None,
            target: target.map(Valid),
            extensions: Default::default(),
            extras: Default::default(),
        };
        push(&mut self.root.buffer_views, view)
    }

    fn push_accessor(
        &mut self,
        name: &str,
        bytes: &[u8],
        count: usize,
        component_type: json::accessor::ComponentType,
        type_: json::accessor::Type,
        bounds: Option<(Vec<f32>, Vec<f32>)>,
        target: Option<json::buffer::Target>,
    ) -> Result<json::Index<json::Accessor>> {
        if count == 0 {
            return Err(GenerateError::Validation(vec![format!(
                "accessor {} has no elements",
                name
            )]));
        }
        let buffer_view = self.push_view(bytes, target);
        let (min, max) = match bounds {
            Some((min, max)) => (Some(json::Value::from(min)), Some(json::Value::from(max))),
            None => (None, None),
        };
        debug!("accessor {}: {} elements, {} bytes", name, count, bytes.len());
        Ok(push(
            &mut self.root.accessors,
            json::Accessor {
                buffer_view: Some(buffer_view),
                byte_offset: Some(USize64(0)),
                count: USize64::from(count),
                component_type: Valid(json::accessor::GenericComponentType(component_type)),
                extensions: Default::default(),
                extras: Default::default(),
                type_: Valid(type_),
                min,
                max,
                name: Some(name.to_string()),
                normalized: false,
                sparse: None,
            },
        ))
    }

    /// VEC3 float accessor with `min`/`max` bounds.
    pub fn push_vec3_accessor(
        &mut self,
        name: &str,
        data: &[[f32; 3]],
        target: Option<json::buffer::Target>,
    ) -> Result<json::Index<json::Accessor>> {
        let aabb = calculate_aabb(data);
        self.push_accessor(
            name,
            bytemuck::cast_slice(data),
            data.len(),
            json::accessor::ComponentType::F32,
            json::accessor::Type::Vec3,
            Some((aabb.min.to_vec(), aabb.max.to_vec())),
            target,
        )
    }

    /// SCALAR float accessor with `min`/`max` bounds, used for keyframe times.
    pub fn push_scalar_accessor(
        &mut self,
        name: &str,
        data: &[f32],
    ) -> Result<json::Index<json::Accessor>> {
        let min = data.iter().copied().fold(f32::MAX, f32::min);
        let max = data.iter().copied().fold(f32::MIN, f32::max);
        self.push_accessor(
            name,
            bytemuck::cast_slice(data),
            data.len(),
            json::accessor::ComponentType::F32,
            json::accessor::Type::Scalar,
            Some((vec![min], vec![max])),
            None,
        )
    }

    pub fn push_index_accessor(
        &mut self,
        name: &str,
        indices: &[u16],
    ) -> Result<json::Index<json::Accessor>> {
        self.push_accessor(
            name,
            bytemuck::cast_slice(indices),
            indices.len(),
            json::accessor::ComponentType::U16,
            json::accessor::Type::Scalar,
            None,
            Some(json::buffer::Target::ElementArrayBuffer),
        )
    }

    pub fn push_material(
        &mut self,
        name: &str,
        metallic: f32,
        roughness: f32,
    ) -> json::Index<json::Material> {
        push(
            &mut self.root.materials,
            json::Material {
                name: Some(name.to_string()),
                pbr_metallic_roughness: json::material::PbrMetallicRoughness {
                    metallic_factor: json::material::StrengthFactor(metallic),
                    roughness_factor: json::material::StrengthFactor(roughness),
                    ..Default::default()
                },
                ..Default::default()
            },
        )
    }

    /// Mesh with a single indexed triangle primitive.
    pub fn push_mesh(
        &mut self,
        name: &str,
        positions: json::Index<json::Accessor>,
        normals: json::Index<json::Accessor>,
        indices: json::Index<json::Accessor>,
        material: json::Index<json::Material>,
    ) -> json::Index<json::Mesh> {
        let mut attributes = BTreeMap::new();
        attributes.insert(Valid(json::mesh::Semantic::Positions), positions);
        attributes.insert(Valid(json::mesh::Semantic::Normals), normals);
        let primitive = json::mesh::Primitive {
            attributes,
            extensions: Default::default(),
            extras: Default::default(),
            indices: Some(indices),
            material: Some(material),
            mode: Valid(json::mesh::Mode::Triangles),
            targets: None,
        };
        push(
            &mut self.root.meshes,
            json::Mesh {
                extensions: Default::default(),
                extras: Default::default(),
                name: Some(name.to_string()),
                primitives: vec![primitive],
                weights: None,
            },
        )
    }

    pub fn push_node(
        &mut self,
        name: &str,
        mesh: Option<json::Index<json::Mesh>>,
        translation: Option<Vec3>,
    ) -> json::Index<json::Node> {
        push(
            &mut self.root.nodes,
            json::Node {
                name: Some(name.to_string()),
                mesh,
                translation: translation.map(|t| t.to_array()),
                ..Default::default()
            },
        )
    }

    pub fn add_children(
        &mut self,
        parent: json::Index<json::Node>,
        children: &[json::Index<json::Node>],
    ) {
        let node = &mut self.root.nodes[parent.value()];
        node.children
            .get_or_insert_with(Vec::new)
            .extend_from_slice(children);
    }

    pub fn push_scene(
        &mut self,
        name: &str,
        roots: &[json::Index<json::Node>],
    ) -> json::Index<json::Scene> {
        push(
            &mut self.root.scenes,
            json::Scene {
                extensions: Default::default(),
                extras: Default::default(),
                name: Some(name.to_string()),
                nodes: roots.to_vec(),
            },
        )
    }

    pub fn set_default_scene(&mut self, scene: json::Index<json::Scene>) {
        self.root.scene = Some(scene);
    }

    /// Clip made of LINEAR translation channels, one sampler per channel.
    pub fn push_translation_animation(
        &mut self,
        name: &str,
        channels: &[TranslationChannel],
    ) -> json::Index<json::Animation> {
        let mut samplers = vec![];
        let mut animation_channels = vec![];
        for channel in channels {
            let sampler = push(
                &mut samplers,
                json::animation::Sampler {
                    extensions: Default::default(),
                    extras: Default::default(),
                    input: channel.input,
                    interpolation: Valid(json::animation::Interpolation::Linear),
                    output: channel.output,
                },
            );
            animation_channels.push(json::animation::Channel {
                sampler,
                target: json::animation::Target {
                    extensions: Default::default(),
                    extras: Default::default(),
                    node: channel.node,
                    path: Valid(json::animation::Property::Translation),
                },
                extensions: Default::default(),
                extras: Default::default(),
            });
        }
        push(
            &mut self.root.animations,
            json::Animation {
                extensions: Default::default(),
                extras: Default::default(),
                channels: animation_channels,
                name: Some(name.to_string()),
                samplers,
            },
        )
    }

    /// Seals the buffer and runs glTF validation over the whole document.
    pub fn finish(mut self) -> Result<GltfAsset> {
        self.bin.resize(align_to_4(self.bin.len()), 0);
        self.root.buffers[0].byte_length = USize64::from(self.bin.len());

        let document = match gltf::Document::from_json(self.root) {
            Ok(document) => document,
            Err(gltf::Error::Validation(errors)) => {
                return Err(GenerateError::Validation(
                    errors
                        .iter()
                        .map(|(path, error)| format!("{}: {}", path, error))
                        .collect(),
                ))
            }
            Err(e) => return Err(e.into()),
        };

        Ok(GltfAsset {
            root: document.into_json(),
            bin: self.bin,
        })
    }
}
