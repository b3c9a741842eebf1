//! Tests that need a real GPU device. Run with
//! `cargo test --features integration-tests` on a machine with an adapter.
#![cfg(feature = "integration-tests")]

use std::sync::mpsc;

use cgmath::Deg;
use scene_ngin::{
    camera::{Camera, CameraResources, CameraUniform, OrbitCamera, Projection},
    data_structures::{instance::Instance, model::DrawModel, texture::Texture},
    pipelines::Pipelines,
    resources::{Assets, Registry, ShaderProgram, model_from_primitive, primitives},
};
use wgpu::util::DeviceExt;

const SIZE: u32 = 256;

fn request_device() -> (wgpu::Device, wgpu::Queue) {
    let rt = tokio::runtime::Runtime::new().expect("tokio runtime");
    rt.block_on(async {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: None,
                force_fallback_adapter: false,
            })
            .await
            .expect("no GPU adapter available");
        adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: None,
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                experimental_features: wgpu::ExperimentalFeatures::disabled(),
                memory_hints: Default::default(),
                trace: wgpu::Trace::Off,
            })
            .await
            .expect("device request failed")
    })
}

fn offscreen_config() -> wgpu::SurfaceConfiguration {
    wgpu::SurfaceConfiguration {
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        format: wgpu::TextureFormat::Rgba8UnormSrgb,
        width: SIZE,
        height: SIZE,
        present_mode: wgpu::PresentMode::Fifo,
        alpha_mode: wgpu::CompositeAlphaMode::Opaque,
        view_formats: vec![],
        desired_maximum_frame_latency: 2,
    }
}

#[test]
fn registry_sweep_frees_gpu_models() {
    let (device, queue) = request_device();
    let mut registry = Registry::new();

    let cube = model_from_primitive(
        &primitives::cube(),
        "cube",
        [255, 0, 0, 255],
        &device,
        &queue,
    );
    let held = registry.insert("held", cube);
    let loose = model_from_primitive(
        &primitives::sphere(1.0, 8, 8),
        "sphere",
        [0, 255, 0, 255],
        &device,
        &queue,
    );
    registry.insert("loose", loose);

    assert_eq!(registry.sweep(), 1);
    assert!(registry.contains("held"));
    assert!(!registry.contains("loose"));
    drop(held);
    assert_eq!(registry.sweep(), 1);
    assert!(registry.is_empty());
}

#[test]
fn shader_release_at_unload_leaves_no_dangling_entry() {
    const TINY_SHADER: &str =
        "@vertex fn vs_main() -> @builtin(position) vec4<f32> { return vec4<f32>(0.0); }";

    let (device, _queue) = request_device();
    let mut assets = Assets::new();

    let held = assets
        .shaders
        .insert("held", ShaderProgram::from_source(&device, "held", TINY_SHADER));
    assets
        .shaders
        .insert("loose", ShaderProgram::from_source(&device, "loose", TINY_SHADER));

    // the unload-boundary sweep drops what no scene references anymore
    assets.sweep();
    assert!(assets.shaders.contains("held"));
    assert!(!assets.shaders.contains("loose"));

    drop(held);
    assets.sweep();
    assert!(assets.shaders.is_empty());
}

#[test]
fn offscreen_frame_draws_the_cube() {
    let (device, queue) = request_device();
    let config = offscreen_config();

    let camera_resources = CameraResources::new(&device);
    let mut shaders = Registry::new();
    let pipelines = Pipelines::new(
        &device,
        &config,
        &camera_resources.bind_group_layout,
        &mut shaders,
    );
    // both pipelines share one compiled module
    assert_eq!(shaders.len(), 1);
    // releasing the shader module must not invalidate the built pipelines
    assert_eq!(shaders.sweep(), 1);

    // camera on the -Z axis looking at the cube
    let mut orbit = OrbitCamera::new((0.0, 0.0, 0.0), 4.0);
    orbit.pitch = Deg(20.0);
    let camera = Camera::Orbit(orbit);
    let projection = Projection::new(SIZE, SIZE);
    let mut uniform = CameraUniform::new();
    uniform.update_view_proj(&camera, &projection);
    queue.write_buffer(
        &camera_resources.buffer,
        0,
        bytemuck::cast_slice(&[uniform]),
    );

    let cube = model_from_primitive(
        &primitives::cube(),
        "cube",
        [255, 0, 0, 255],
        &device,
        &queue,
    );
    let raw = [Instance::new().to_raw()];
    let instance_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some("Instance Buffer"),
        contents: bytemuck::cast_slice(&raw),
        usage: wgpu::BufferUsages::VERTEX,
    });

    let target = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("Offscreen Target"),
        size: wgpu::Extent3d {
            width: SIZE,
            height: SIZE,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: config.format,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
        view_formats: &[],
    });
    let depth = Texture::create_depth_texture(&device, [SIZE, SIZE], "test_depth");

    let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
        label: Some("Test Encoder"),
    });
    {
        let view = target.create_view(&wgpu::TextureViewDescriptor::default());
        let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Test Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: &view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &depth.view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            occlusion_query_set: None,
            timestamp_writes: None,
        });

        render_pass.set_pipeline(&pipelines.basic);
        render_pass.set_vertex_buffer(1, instance_buffer.slice(..));
        render_pass.draw_model_instanced(&cube, 0..1, &camera_resources.bind_group);
    }

    let bytes_per_row = SIZE * 4;
    let output_buffer = device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("Readback"),
        size: (bytes_per_row * SIZE) as wgpu::BufferAddress,
        usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
        mapped_at_creation: false,
    });
    encoder.copy_texture_to_buffer(
        wgpu::TexelCopyTextureInfo {
            aspect: wgpu::TextureAspect::All,
            texture: &target,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
        },
        wgpu::TexelCopyBufferInfo {
            buffer: &output_buffer,
            layout: wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(bytes_per_row),
                rows_per_image: Some(SIZE),
            },
        },
        wgpu::Extent3d {
            width: SIZE,
            height: SIZE,
            depth_or_array_layers: 1,
        },
    );
    queue.submit(std::iter::once(encoder.finish()));

    let (tx, rx) = mpsc::channel();
    let slice = output_buffer.slice(..);
    slice.map_async(wgpu::MapMode::Read, move |result| {
        tx.send(result).expect("send map result");
    });
    device
        .poll(wgpu::PollType::Wait {
            submission_index: None,
            timeout: Some(std::time::Duration::from_secs(5)),
        })
        .expect("device poll");
    rx.recv().expect("map callback").expect("buffer map");

    let data = slice.get_mapped_range();
    // center pixel: the cube, lit red
    let center = ((SIZE / 2 * SIZE + SIZE / 2) * 4) as usize;
    assert!(data[center] > 40, "expected a red cube at the center");
    assert!(data[center + 1] < 40);
    // corner pixel: the clear colour
    assert_eq!(&data[0..4], &[0, 0, 0, 255]);
}
