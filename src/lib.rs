//! scene-ngin
//!
//! A small scene-stack engine on winit/wgpu. The crate owns the window and
//! GPU context, drives a stack of scenes (menu, gameplay, overlays) where
//! only the top scene updates and renders, and provides the building blocks
//! scenes are made of: camera variants, parametric mesh generators, shared
//! resource registries and instanced render batching.
//!
//! High-level modules
//! - `camera`: first-person/isometric/orbit cameras, controller and uniforms
//! - `context`: central GPU and window context that owns device/queue/pipelines
//! - `app`: the winit event loop driving the scene stack each frame
//! - `scene`: the `Scene` trait, transitions and the `SceneManager`
//! - `scenes`: the shipped menu and play scenes
//! - `data_structures`: meshes, instances, textures
//! - `pipelines`: render pipeline construction
//! - `resources`: registries plus texture/model/primitive loading
//! - `render`: render composition for efficient pipeline reuse

pub mod app;
pub mod camera;
pub mod context;
pub mod data_structures;
pub mod pipelines;
pub mod render;
pub mod resources;
pub mod scene;
pub mod scenes;

// Re-exports commonly used types for convenience in downstream code.
pub use cgmath::*;
pub use wgpu::*;
pub use winit::dpi::PhysicalPosition;
pub use winit::event::DeviceEvent;
pub use winit::event::WindowEvent;
