//! Mesh generators for common shapes.
//!
//! These produce validated [`CpuMesh`] values that slot straight into a
//! [`Model`](super::Model), useful for demo scenes without any asset import.

use std::f32::consts::PI;

use super::data::CpuMesh;

/// Generate a unit-size axis-aligned cube centered on the origin.
///
/// Each face has its own four vertices so normals and UVs stay flat
/// (24 vertices, 36 indices).
pub fn generate_cube(size: f32) -> CpuMesh {
    let h = size / 2.0;

    // (normal, four corners counter-clockwise seen from outside)
    let faces: [([f32; 3], [[f32; 3]; 4]); 6] = [
        (
            [0.0, 0.0, 1.0],
            [[-h, -h, h], [h, -h, h], [h, h, h], [-h, h, h]],
        ),
        (
            [0.0, 0.0, -1.0],
            [[h, -h, -h], [-h, -h, -h], [-h, h, -h], [h, h, -h]],
        ),
        (
            [1.0, 0.0, 0.0],
            [[h, -h, h], [h, -h, -h], [h, h, -h], [h, h, h]],
        ),
        (
            [-1.0, 0.0, 0.0],
            [[-h, -h, -h], [-h, -h, h], [-h, h, h], [-h, h, -h]],
        ),
        (
            [0.0, 1.0, 0.0],
            [[-h, h, h], [h, h, h], [h, h, -h], [-h, h, -h]],
        ),
        (
            [0.0, -1.0, 0.0],
            [[-h, -h, -h], [h, -h, -h], [h, -h, h], [-h, -h, h]],
        ),
    ];

    let mut positions = Vec::with_capacity(24);
    let mut normals = Vec::with_capacity(24);
    let mut uvs = Vec::with_capacity(24);
    let mut indices = Vec::with_capacity(36);

    for (normal, corners) in faces {
        let base = positions.len() as u32;
        positions.extend_from_slice(&corners);
        normals.extend_from_slice(&[normal; 4]);
        uvs.extend_from_slice(&[[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]]);
        indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }

    CpuMesh::new("cube", positions, indices)
        .with_normals(normals)
        .with_uvs(uvs)
}

/// Generate a UV sphere.
///
/// `segments` is the number of longitudinal segments around the equator,
/// `rings` the number of latitudinal rings from pole to pole.
pub fn generate_sphere(radius: f32, segments: u32, rings: u32) -> CpuMesh {
    let mut positions = Vec::new();
    let mut normals = Vec::new();
    let mut uvs = Vec::new();
    let mut indices = Vec::new();

    for ring in 0..=rings {
        let theta = ring as f32 * PI / rings as f32;
        let sin_theta = theta.sin();
        let cos_theta = theta.cos();

        for segment in 0..=segments {
            let phi = segment as f32 * 2.0 * PI / segments as f32;
            let x = sin_theta * phi.cos();
            let y = cos_theta;
            let z = sin_theta * phi.sin();

            positions.push([x * radius, y * radius, z * radius]);
            normals.push([x, y, z]);
            uvs.push([segment as f32 / segments as f32, ring as f32 / rings as f32]);
        }
    }

    for ring in 0..rings {
        for segment in 0..segments {
            let current = ring * (segments + 1) + segment;
            let next = current + segments + 1;

            indices.push(current);
            indices.push(next);
            indices.push(current + 1);

            indices.push(current + 1);
            indices.push(next);
            indices.push(next + 1);
        }
    }

    CpuMesh::new("sphere", positions, indices)
        .with_normals(normals)
        .with_uvs(uvs)
}

/// Generate a flat quad in the XY plane, facing +Z.
pub fn generate_quad(width: f32, height: f32) -> CpuMesh {
    let hw = width / 2.0;
    let hh = height / 2.0;

    CpuMesh::new(
        "quad",
        vec![[-hw, -hh, 0.0], [hw, -hh, 0.0], [hw, hh, 0.0], [-hw, hh, 0.0]],
        vec![0, 1, 2, 0, 2, 3],
    )
    .with_normals(vec![[0.0, 0.0, 1.0]; 4])
    .with_uvs(vec![[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]])
}
