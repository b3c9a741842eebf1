//! Render pipeline construction.
//!
//! Pipelines are built once at context creation and reused every frame;
//! the frame composer batches draws so each pipeline is bound once per pass.

pub mod basic;
pub mod transparent;

/// The pipeline set owned by the context.
#[derive(Debug)]
pub struct Pipelines {
    pub basic: wgpu::RenderPipeline,
    pub transparent: wgpu::RenderPipeline,
}

impl Pipelines {
    pub fn new(
        device: &wgpu::Device,
        config: &wgpu::SurfaceConfiguration,
        camera_bind_group_layout: &wgpu::BindGroupLayout,
        shaders: &mut crate::resources::Registry<crate::resources::ShaderProgram>,
    ) -> Self {
        Self {
            basic: basic::mk_basic_pipeline(device, config, camera_bind_group_layout, shaders),
            transparent: transparent::mk_transparent_pipeline(
                device,
                config,
                camera_bind_group_layout,
                shaders,
            ),
        }
    }
}
