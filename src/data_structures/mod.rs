//! Core data types shared across the engine:
//!
//! - `model` holds mesh, material and model definitions on the GPU
//! - `texture` wraps wgpu textures with their views and samplers
//! - `instance` carries per-entity transforms into the instance buffer

pub mod instance;
pub mod model;
pub mod texture;
