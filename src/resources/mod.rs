//! Asset loading and ownership.
//!
//! Everything that comes from disk or a generator ends up here: meshes and
//! textures are loaded (or generated via [`primitives`]) and parked in a
//! [`Registry`] under a caller-chosen name. Registries hand out `Arc` clones,
//! so scenes can share the underlying GPU resources without copying them,
//! and [`Registry::sweep`] reclaims whatever no scene holds anymore.

use std::{collections::HashMap, sync::Arc};

use crate::data_structures::{model, texture::Texture};
use crate::resources::texture::diffuse_layout;

pub mod mesh;
pub mod primitives;
pub mod shader;
pub mod texture;

/// Named storage for loaded resources of one kind.
///
/// Lookups clone the `Arc`, so a resource stays alive as long as either the
/// registry or any scene still references it.
#[derive(Debug)]
pub struct Registry<T> {
    entries: HashMap<String, Arc<T>>,
}

impl<T> Registry<T> {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Store `value` under `name`, returning the shared handle. Re-inserting
    /// an existing name replaces the old entry; holders of the old handle
    /// keep it alive until they drop it.
    pub fn insert(&mut self, name: impl Into<String>, value: T) -> Arc<T> {
        let value = Arc::new(value);
        self.entries.insert(name.into(), Arc::clone(&value));
        value
    }

    pub fn get(&self, name: &str) -> Option<Arc<T>> {
        self.entries.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn remove(&mut self, name: &str) -> Option<Arc<T>> {
        self.entries.remove(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop every entry no one outside the registry references.
    /// Returns how many entries were reclaimed.
    pub fn sweep(&mut self) -> usize {
        let before = self.entries.len();
        self.entries
            .retain(|_, value| Arc::strong_count(value) > 1);
        before - self.entries.len()
    }
}

impl<T> Default for Registry<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// All resource registries the engine owns, one per resource kind.
#[derive(Debug, Default)]
pub struct Assets {
    pub meshes: Registry<primitives::MeshData>,
    pub models: Registry<model::Model>,
    pub textures: Registry<Texture>,
    pub shaders: Registry<shader::ShaderProgram>,
}

impl Assets {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sweep every registry, logging what was reclaimed.
    pub fn sweep(&mut self) {
        let meshes = self.meshes.sweep();
        let models = self.models.sweep();
        let textures = self.textures.sweep();
        let shaders = self.shaders.sweep();
        if meshes + models + textures + shaders > 0 {
            log::debug!(
                "asset sweep reclaimed {meshes} meshes, {models} models, \
                 {textures} textures, {shaders} shaders"
            );
        }
    }
}

/// Load a Wavefront OBJ (with its MTL materials) into a [`model::Model`].
///
/// Any failure is returned to the caller; a scene that cannot load its
/// assets must not come up half-initialised.
pub async fn load_model_obj(
    file_name: &str,
    device: &wgpu::Device,
    queue: &wgpu::Queue,
) -> anyhow::Result<model::Model> {
    let bind_group_layout = diffuse_layout(device);

    let (materials, models) =
        texture::load_textures(file_name, queue, device, &bind_group_layout).await?;
    let meshes = mesh::load_meshes(&models, file_name, device);

    Ok(model::Model { meshes, materials })
}

/// Wrap generated [`primitives::MeshData`] into a single-material model.
pub fn model_from_primitive(
    data: &primitives::MeshData,
    label: &str,
    colour: [u8; 4],
    device: &wgpu::Device,
    queue: &wgpu::Queue,
) -> model::Model {
    let layout = diffuse_layout(device);
    let diffuse = Texture::solid_colour(device, queue, colour, label);
    let material = model::Material::new(device, label, diffuse, &layout);
    model::Model {
        meshes: vec![data.upload(device, label)],
        materials: vec![material],
    }
}

pub use shader::ShaderProgram;
pub use texture::{load_binary, load_string, load_texture};

#[cfg(test)]
mod tests {
    use super::{Assets, Registry, primitives};

    #[test]
    fn assets_sweep_spans_every_registry() {
        let mut assets = Assets::new();
        let held = assets.meshes.insert("held", primitives::cube());
        assets.meshes.insert("loose", primitives::quad());

        assets.sweep();
        assert!(assets.meshes.contains("held"));
        assert!(!assets.meshes.contains("loose"));
        drop(held);
        assets.sweep();
        assert!(assets.meshes.is_empty());
    }

    #[test]
    fn sweep_drops_only_unreferenced_entries() {
        let mut registry: Registry<u32> = Registry::new();
        let held = registry.insert("held", 1);
        registry.insert("loose", 2);

        assert_eq!(registry.sweep(), 1);
        assert!(registry.contains("held"));
        assert!(!registry.contains("loose"));
        assert_eq!(*held, 1);
    }

    #[test]
    fn reinsert_replaces_entry() {
        let mut registry: Registry<u32> = Registry::new();
        let old = registry.insert("slot", 1);
        let new = registry.insert("slot", 2);

        assert_eq!(*old, 1);
        assert_eq!(*new, 2);
        assert_eq!(registry.get("slot").as_deref(), Some(&2));
        assert_eq!(registry.len(), 1);
    }
}
