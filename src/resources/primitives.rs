//! Parametric mesh generators.
//!
//! Each generator produces a [`MeshData`] — plain CPU-side vertex and index
//! vectors — at construction time. Generation is pure: the same parameters
//! always yield the same buffers, so primitives can be shared read-only
//! across every entity using the same shape.

use std::f32::consts::{PI, TAU};

use wgpu::util::DeviceExt;

use crate::data_structures::model::{Mesh, ModelVertex};

/// Vertex and index data before upload.
#[derive(Clone, Debug, PartialEq)]
pub struct MeshData {
    pub vertices: Vec<ModelVertex>,
    pub indices: Vec<u32>,
}

impl MeshData {
    /// Create the GPU buffers for this data. Material slot 0 by convention;
    /// callers reassign when the mesh joins a multi-material model.
    pub fn upload(&self, device: &wgpu::Device, label: &str) -> Mesh {
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label} Vertex Buffer")),
            contents: bytemuck::cast_slice(&self.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label} Index Buffer")),
            contents: bytemuck::cast_slice(&self.indices),
            usage: wgpu::BufferUsages::INDEX,
        });
        Mesh {
            name: label.to_string(),
            vertex_buffer,
            index_buffer,
            num_elements: self.indices.len() as u32,
            material: 0,
        }
    }
}

/// Filled circle on the XY plane, facing +Z.
///
/// One center vertex plus `segments + 1` ring vertices (the ring closes by
/// repeating the first ring vertex), triangulated as a fan: `3 * segments`
/// indices. Fewer than 3 segments cannot form a surface, so the count is
/// raised to 3.
pub fn circle(radius: f32, segments: u32) -> MeshData {
    let segments = segments.max(3);
    let mut vertices = Vec::with_capacity(segments as usize + 2);
    vertices.push(ModelVertex {
        position: [0.0, 0.0, 0.0],
        normal: [0.0, 0.0, 1.0],
        tex_coords: [0.5, 0.5],
    });

    let delta = TAU / segments as f32;
    for i in 0..=segments {
        let angle = i as f32 * delta;
        let (sin, cos) = angle.sin_cos();
        vertices.push(ModelVertex {
            position: [radius * cos, radius * sin, 0.0],
            normal: [0.0, 0.0, 1.0],
            // UV circle inscribed in the unit square
            tex_coords: [0.5 + 0.5 * cos, 0.5 + 0.5 * sin],
        });
    }

    let mut indices = Vec::with_capacity(segments as usize * 3);
    for i in 1..=segments {
        indices.extend_from_slice(&[0, i, i + 1]);
    }

    MeshData { vertices, indices }
}

/// Axis-aligned unit cube of half-extent 0.5 with per-face normals.
///
/// 36 unique vertices (6 faces x 2 triangles x 3 vertices), indices 0..36.
pub fn cube() -> MeshData {
    const FACES: [([f32; 3], [f32; 3], [f32; 3]); 6] = [
        // normal, tangent u, tangent v per face
        ([0.0, 0.0, 1.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
        ([0.0, 0.0, -1.0], [-1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
        ([-1.0, 0.0, 0.0], [0.0, 0.0, 1.0], [0.0, 1.0, 0.0]),
        ([1.0, 0.0, 0.0], [0.0, 0.0, -1.0], [0.0, 1.0, 0.0]),
        ([0.0, 1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, -1.0]),
        ([0.0, -1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, 1.0]),
    ];
    // two triangles per face in (u, v) corner space
    const CORNERS: [([f32; 2], [f32; 2]); 6] = [
        ([-0.5, -0.5], [0.0, 0.0]),
        ([0.5, -0.5], [1.0, 0.0]),
        ([0.5, 0.5], [1.0, 1.0]),
        ([-0.5, -0.5], [0.0, 0.0]),
        ([0.5, 0.5], [1.0, 1.0]),
        ([-0.5, 0.5], [0.0, 1.0]),
    ];

    let mut vertices = Vec::with_capacity(36);
    for (normal, tan_u, tan_v) in FACES {
        for ([u, v], uv) in CORNERS {
            let position = [
                normal[0] * 0.5 + tan_u[0] * u + tan_v[0] * v,
                normal[1] * 0.5 + tan_u[1] * u + tan_v[1] * v,
                normal[2] * 0.5 + tan_u[2] * u + tan_v[2] * v,
            ];
            vertices.push(ModelVertex {
                position,
                normal,
                tex_coords: uv,
            });
        }
    }

    let indices = (0..36).collect();
    MeshData { vertices, indices }
}

/// Unit quad on the XY plane facing +Z: 4 corners, 6 indices.
pub fn quad() -> MeshData {
    let vertices = vec![
        ModelVertex {
            position: [-0.5, 0.5, 0.0],
            normal: [0.0, 0.0, 1.0],
            tex_coords: [0.0, 1.0],
        },
        ModelVertex {
            position: [0.5, 0.5, 0.0],
            normal: [0.0, 0.0, 1.0],
            tex_coords: [1.0, 1.0],
        },
        ModelVertex {
            position: [0.5, -0.5, 0.0],
            normal: [0.0, 0.0, 1.0],
            tex_coords: [1.0, 0.0],
        },
        ModelVertex {
            position: [-0.5, -0.5, 0.0],
            normal: [0.0, 0.0, 1.0],
            tex_coords: [0.0, 0.0],
        },
    ];
    let indices = vec![0, 1, 2, 2, 3, 0];
    MeshData { vertices, indices }
}

/// UV sphere from spherical coordinates.
///
/// `(stacks + 1) * (slices + 1)` vertices with radial normals and
/// `6 * stacks * slices` indices (two triangles per lat/long quad).
/// Subdivisions below the minimum closed surface (2 stacks, 3 slices) are
/// raised to it.
pub fn sphere(radius: f32, stacks: u32, slices: u32) -> MeshData {
    let stacks = stacks.max(2);
    let slices = slices.max(3);
    let mut vertices = Vec::with_capacity(((stacks + 1) * (slices + 1)) as usize);
    for i in 0..=stacks {
        let theta = PI * i as f32 / stacks as f32;
        for j in 0..=slices {
            let phi = TAU * j as f32 / slices as f32;

            let x = radius * theta.sin() * phi.cos();
            let y = radius * theta.cos();
            let z = radius * theta.sin() * phi.sin();
            let inv_len = 1.0 / radius;

            vertices.push(ModelVertex {
                position: [x, y, z],
                normal: [x * inv_len, y * inv_len, z * inv_len],
                tex_coords: [phi / TAU, 1.0 - theta / PI],
            });
        }
    }

    let mut indices = Vec::with_capacity((stacks * slices * 6) as usize);
    for i in 0..stacks {
        for j in 0..slices {
            let current = i * (slices + 1) + j;
            let next = (i + 1) * (slices + 1) + j;
            indices.extend_from_slice(&[current, next, current + 1]);
            indices.extend_from_slice(&[current + 1, next, next + 1]);
        }
    }

    MeshData { vertices, indices }
}

/// Ellipsoid with semi-axes `rx`/`ry`/`rz`.
///
/// `(stacks + 1) * (sectors + 1)` vertices; cap rows contribute one triangle
/// per sector and interior rows two, so `6 * sectors * (stacks - 1)` indices.
/// Subdivisions below the minimum closed surface (3 sectors, 2 stacks) are
/// raised to it.
pub fn ellipsoid(rx: f32, ry: f32, rz: f32, sectors: u32, stacks: u32) -> MeshData {
    let sectors = sectors.max(3);
    let stacks = stacks.max(2);
    let mut vertices = Vec::with_capacity(((stacks + 1) * (sectors + 1)) as usize);
    for i in 0..=stacks {
        // latitude from pi/2 down to -pi/2
        let stack_angle = PI / 2.0 - PI * i as f32 / stacks as f32;
        let xy = stack_angle.cos();
        let z = stack_angle.sin();

        for j in 0..=sectors {
            let sector_angle = TAU * j as f32 / sectors as f32;
            let x = xy * sector_angle.cos();
            let y = xy * sector_angle.sin();

            let normal = cgmath::InnerSpace::normalize(cgmath::Vector3::new(
                x / rx,
                y / ry,
                z / rz,
            ));
            vertices.push(ModelVertex {
                position: [x * rx, y * ry, z * rz],
                normal: normal.into(),
                tex_coords: [j as f32 / sectors as f32, i as f32 / stacks as f32],
            });
        }
    }

    let mut indices = Vec::with_capacity((sectors * (stacks - 1) * 6) as usize);
    for i in 0..stacks {
        let mut k1 = i * (sectors + 1);
        let mut k2 = k1 + sectors + 1;
        for _ in 0..sectors {
            if i != 0 {
                indices.extend_from_slice(&[k1, k2, k1 + 1]);
            }
            if i != stacks - 1 {
                indices.extend_from_slice(&[k1 + 1, k2, k2 + 1]);
            }
            k1 += 1;
            k2 += 1;
        }
    }

    MeshData { vertices, indices }
}
