use wgpu::util::DeviceExt;

use crate::data_structures::model;

/// Upload the meshes of a parsed OBJ file.
///
/// tobj was asked for a single index stream, so positions, texcoords and
/// normals share indices. Missing normals or texcoords default to zero.
pub fn load_meshes(
    models: &[tobj::Model],
    file_name: &str,
    device: &wgpu::Device,
) -> Vec<model::Mesh> {
    models
        .iter()
        .map(|m| {
            let vertices = (0..m.mesh.positions.len() / 3)
                .map(|i| model::ModelVertex {
                    position: [
                        m.mesh.positions[i * 3],
                        m.mesh.positions[i * 3 + 1],
                        m.mesh.positions[i * 3 + 2],
                    ],
                    normal: [
                        m.mesh.normals.get(i * 3).copied().unwrap_or(0.0),
                        m.mesh.normals.get(i * 3 + 1).copied().unwrap_or(0.0),
                        m.mesh.normals.get(i * 3 + 2).copied().unwrap_or(0.0),
                    ],
                    // OBJ uses a bottom-left UV origin, wgpu a top-left one
                    tex_coords: [
                        m.mesh.texcoords.get(i * 2).copied().unwrap_or(0.0),
                        1.0 - m.mesh.texcoords.get(i * 2 + 1).copied().unwrap_or(0.0),
                    ],
                })
                .collect::<Vec<_>>();

            let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(&format!("{file_name:?} Vertex Buffer")),
                contents: bytemuck::cast_slice(&vertices),
                usage: wgpu::BufferUsages::VERTEX,
            });
            let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(&format!("{file_name:?} Index Buffer")),
                contents: bytemuck::cast_slice(&m.mesh.indices),
                usage: wgpu::BufferUsages::INDEX,
            });

            model::Mesh {
                name: file_name.to_string(),
                vertex_buffer,
                index_buffer,
                num_elements: m.mesh.indices.len() as u32,
                material: m.mesh.material_id.unwrap_or(0),
            }
        })
        .collect()
}
