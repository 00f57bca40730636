use glam::Vec3;

use crate::error::{GenerateError, Result};

pub const FACE_COUNT: usize = 6;
pub const VERTICES_PER_FACE: usize = 4;
pub const INDICES_PER_FACE: usize = 6;

/// Outward normal of each face, in face order +X, -X, +Y, -Y, +Z, -Z.
const FACE_NORMALS: [[f32; 3]; FACE_COUNT] = [
    [1.0, 0.0, 0.0],
    [-1.0, 0.0, 0.0],
    [0.0, 1.0, 0.0],
    [0.0, -1.0, 0.0],
    [0.0, 0.0, 1.0],
    [0.0, 0.0, -1.0],
];

/// Unit cube corners per face, counter-clockwise when seen from outside.
const FACE_CORNERS: [[[f32; 3]; VERTICES_PER_FACE]; FACE_COUNT] = [
    // +X
    [[1.0, 1.0, 1.0], [1.0, -1.0, 1.0], [1.0, -1.0, -1.0], [1.0, 1.0, -1.0]],
    // -X
    [[-1.0, 1.0, -1.0], [-1.0, -1.0, -1.0], [-1.0, -1.0, 1.0], [-1.0, 1.0, 1.0]],
    // +Y
    [[-1.0, 1.0, 1.0], [1.0, 1.0, 1.0], [1.0, 1.0, -1.0], [-1.0, 1.0, -1.0]],
    // -Y
    [[-1.0, -1.0, -1.0], [1.0, -1.0, -1.0], [1.0, -1.0, 1.0], [-1.0, -1.0, 1.0]],
    // +Z
    [[-1.0, 1.0, 1.0], [-1.0, -1.0, 1.0], [1.0, -1.0, 1.0], [1.0, 1.0, 1.0]],
    // -Z
    [[1.0, 1.0, -1.0], [1.0, -1.0, -1.0], [-1.0, -1.0, -1.0], [-1.0, 1.0, -1.0]],
];

/// Two triangles per quad, relative to the face's first vertex.
const QUAD_TRIANGLES: [u16; INDICES_PER_FACE] = [0, 1, 2, 0, 2, 3];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: [f32; 3],
    pub max: [f32; 3],
}

/// Flat-shaded cube: every face owns its four vertices so normals never get
/// averaged across an edge.
#[derive(Debug, Clone)]
pub struct CubeMesh {
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    pub indices: Vec<u16>,
}

pub fn cube(half_extent: f32) -> CubeMesh {
    let mut positions = Vec::with_capacity(FACE_COUNT * VERTICES_PER_FACE);
    let mut normals = Vec::with_capacity(FACE_COUNT * VERTICES_PER_FACE);
    let mut indices = Vec::with_capacity(FACE_COUNT * INDICES_PER_FACE);

    for (face, corners) in FACE_CORNERS.iter().enumerate() {
        let base_vertex = positions.len() as u16;
        for corner in corners {
            positions.push((Vec3::from(*corner) * half_extent).to_array());
            normals.push(FACE_NORMALS[face]);
        }
        indices.extend(QUAD_TRIANGLES.iter().map(|i| base_vertex + i));
    }

    CubeMesh {
        positions,
        normals,
        indices,
    }
}

impl CubeMesh {
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn validate(&self) -> Result<()> {
        if self.positions.len() != self.normals.len() {
            return Err(GenerateError::InvalidGeometry(format!(
                "position count ({}) does not match normal count ({})",
                self.positions.len(),
                self.normals.len()
            )));
        }
        if self.indices.len() % 3 != 0 {
            return Err(GenerateError::InvalidGeometry(
                "index buffer length must be a multiple of 3 (triangles)".to_string(),
            ));
        }
        if let Some(index) = self
            .indices
            .iter()
            .find(|&&i| i as usize >= self.vertex_count())
        {
            return Err(GenerateError::InvalidGeometry(format!(
                "index {} points outside of position buffer ({} vertices)",
                index,
                self.vertex_count()
            )));
        }
        Ok(())
    }
}

pub fn calculate_aabb(positions: &[[f32; 3]]) -> Aabb {
    let (min, max) = positions.iter().map(|p| Vec3::from(*p)).fold(
        (Vec3::splat(f32::MAX), Vec3::splat(f32::MIN)),
        |(min, max), p| (min.min(p), max.max(p)),
    );
    Aabb {
        min: min.to_array(),
        max: max.to_array(),
    }
}
