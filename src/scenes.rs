//! The scenes the engine ships: a menu and a play scene.
//!
//! Both are built entirely from generated primitives, so they run without
//! any asset files. The menu pushes the play scene on Enter/Space; the play
//! scene pops back on Escape and replaces itself on R.

use std::{pin::Pin, sync::Arc};

use cgmath::{Deg, Quaternion, Rotation3, Vector3};
use instant::Duration;
use wgpu::util::DeviceExt;
use winit::{
    event::WindowEvent,
    keyboard::{KeyCode, PhysicalKey},
};

use crate::{
    camera::{Camera, FirstPersonCamera, OrbitCamera},
    context::Context,
    data_structures::{instance::Instance, model::Model},
    render::{Instanced, Render},
    resources::{model_from_primitive, primitives},
    scene::{Scene, Transition},
};

/// One drawable thing: a shared model plus its instance buffer.
struct Entity {
    model: Arc<Model>,
    instances: wgpu::Buffer,
    count: usize,
}

impl Entity {
    fn new(ctx: &Context, model: Arc<Model>, transforms: &[Instance]) -> Self {
        let raw: Vec<_> = transforms.iter().map(Instance::to_raw).collect();
        let instances = ctx
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Instance Buffer"),
                contents: bytemuck::cast_slice(&raw),
                usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            });
        Self {
            model,
            instances,
            count: transforms.len(),
        }
    }

    fn as_instanced(&self) -> Instanced<'_> {
        Instanced {
            instance: &self.instances,
            model: &self.model,
            amount: self.count,
        }
    }
}

/// Fetch a generated model from the registry, creating it on first use.
fn ensure_model(
    ctx: &mut Context,
    name: &str,
    data: &primitives::MeshData,
    colour: [u8; 4],
) -> Arc<Model> {
    match ctx.assets.models.get(name) {
        Some(model) => model,
        None => {
            let model = model_from_primitive(data, name, colour, &ctx.device, &ctx.queue);
            ctx.assets.models.insert(name, model)
        }
    }
}

fn key_pressed(event: &WindowEvent, code: KeyCode) -> bool {
    matches!(
        event,
        WindowEvent::KeyboardInput { event, .. }
            if event.state.is_pressed()
                && !event.repeat
                && event.physical_key == PhysicalKey::Code(code)
    )
}

/// The title screen: a banner quad in front of a first-person camera.
pub struct MenuScene {
    camera: Camera,
    banner: Option<Entity>,
}

impl MenuScene {
    pub fn new() -> Self {
        Self {
            camera: Camera::FirstPerson(FirstPersonCamera::new(
                (0.0, 0.0, 3.0),
                Deg(-90.0),
                Deg(0.0),
            )),
            banner: None,
        }
    }

    pub fn boxed() -> Box<dyn Scene<()>> {
        Box::new(Self::new())
    }
}

impl Default for MenuScene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene<()> for MenuScene {
    fn on_load<'a>(
        &'a mut self,
        ctx: &'a mut Context,
        _state: &'a mut (),
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<()>> + 'a>> {
        Box::pin(async move {
            let model = ensure_model(ctx, "menu_banner", &primitives::quad(), [230, 190, 60, 255]);
            let transform = Instance {
                scale: Vector3::new(2.0, 1.0, 1.0),
                ..Instance::new()
            };
            self.banner = Some(Entity::new(ctx, model, &[transform]));
            log::info!("menu scene loaded");
            Ok(())
        })
    }

    fn on_unload(&mut self, _ctx: &mut Context, _state: &mut ()) {
        self.banner = None;
    }

    fn on_update(&mut self, _ctx: &Context, _state: &mut (), _dt: Duration) -> Transition<()> {
        Transition::None
    }

    fn on_window_events(
        &mut self,
        _ctx: &Context,
        _state: &mut (),
        event: &WindowEvent,
    ) -> Transition<()> {
        if key_pressed(event, KeyCode::Enter) || key_pressed(event, KeyCode::Space) {
            return Transition::Push(PlayScene::boxed());
        }
        if key_pressed(event, KeyCode::Escape) {
            return Transition::Quit;
        }
        Transition::None
    }

    fn on_render(&self) -> Render<'_> {
        match &self.banner {
            Some(banner) => Render::Opaque(banner.as_instanced()),
            None => Render::None,
        }
    }

    fn camera(&self) -> &Camera {
        &self.camera
    }

    fn camera_mut(&mut self) -> &mut Camera {
        &mut self.camera
    }
}

/// The gameplay scene: generated primitives on a ground plane, orbit camera.
pub struct PlayScene {
    camera: Camera,
    opaque: Vec<Entity>,
    glass: Option<Entity>,
    spinner_angle: Deg<f32>,
}

impl PlayScene {
    pub fn new() -> Self {
        let mut orbit = OrbitCamera::new((0.0, 0.0, 0.0), 12.0);
        orbit.pitch = Deg(25.0);
        Self {
            camera: Camera::Orbit(orbit),
            opaque: Vec::new(),
            glass: None,
            spinner_angle: Deg(0.0),
        }
    }

    pub fn boxed() -> Box<dyn Scene<()>> {
        Box::new(Self::new())
    }

    fn spinner_transform(&self) -> Instance {
        Instance {
            position: Vector3::new(0.0, 1.0, 0.0),
            rotation: Quaternion::from_angle_y(self.spinner_angle),
            ..Instance::new()
        }
    }
}

impl Default for PlayScene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene<()> for PlayScene {
    fn on_load<'a>(
        &'a mut self,
        ctx: &'a mut Context,
        _state: &'a mut (),
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<()>> + 'a>> {
        Box::pin(async move {
            let ground = ensure_model(ctx, "play_ground", &primitives::quad(), [90, 140, 80, 255]);
            let cube = ensure_model(ctx, "play_cube", &primitives::cube(), [200, 80, 70, 255]);
            let sphere = ensure_model(
                ctx,
                "play_sphere",
                &primitives::sphere(1.0, 16, 32),
                [70, 110, 200, 255],
            );
            let coin = ensure_model(
                ctx,
                "play_coin",
                &primitives::circle(0.8, 32),
                [240, 210, 90, 255],
            );
            let egg = ensure_model(
                ctx,
                "play_egg",
                &primitives::ellipsoid(0.7, 0.7, 1.1, 24, 12),
                [150, 240, 230, 160],
            );

            self.opaque = vec![
                // ground plane, rotated flat and scaled out
                Entity::new(
                    ctx,
                    ground,
                    &[Instance {
                        rotation: Quaternion::from_angle_x(Deg(-90.0)),
                        scale: Vector3::new(20.0, 20.0, 1.0),
                        ..Instance::new()
                    }],
                ),
                Entity::new(ctx, cube, &[self.spinner_transform()]),
                Entity::new(
                    ctx,
                    sphere,
                    &[
                        Instance::from(Vector3::new(-3.0, 1.0, -2.0)),
                        Instance::from(Vector3::new(3.0, 1.0, -2.0)),
                    ],
                ),
                Entity::new(
                    ctx,
                    coin,
                    &[Instance {
                        position: Vector3::new(0.0, 1.0, -4.0),
                        ..Instance::new()
                    }],
                ),
            ];
            self.glass = Some(Entity::new(
                ctx,
                egg,
                &[Instance::from(Vector3::new(0.0, 1.2, 3.0))],
            ));
            log::info!("play scene loaded");
            Ok(())
        })
    }

    fn on_unload(&mut self, _ctx: &mut Context, _state: &mut ()) {
        self.opaque.clear();
        self.glass = None;
    }

    fn on_update(&mut self, ctx: &Context, _state: &mut (), dt: Duration) -> Transition<()> {
        self.spinner_angle += Deg(45.0 * dt.as_secs_f32());
        if let Some(spinner) = self.opaque.get(1) {
            let raw = [self.spinner_transform().to_raw()];
            ctx.queue
                .write_buffer(&spinner.instances, 0, bytemuck::cast_slice(&raw));
        }
        Transition::None
    }

    fn on_window_events(
        &mut self,
        _ctx: &Context,
        _state: &mut (),
        event: &WindowEvent,
    ) -> Transition<()> {
        if key_pressed(event, KeyCode::Escape) {
            return Transition::Pop;
        }
        if key_pressed(event, KeyCode::KeyR) {
            return Transition::Replace(PlayScene::boxed());
        }
        Transition::None
    }

    fn on_render(&self) -> Render<'_> {
        let mut renders: Vec<Render<'_>> = vec![Render::OpaqueBatch(
            self.opaque.iter().map(Entity::as_instanced).collect(),
        )];
        if let Some(glass) = &self.glass {
            renders.push(Render::Transparent(glass.as_instanced()));
        }
        Render::Composed(renders)
    }

    fn camera(&self) -> &Camera {
        &self.camera
    }

    fn camera_mut(&mut self) -> &mut Camera {
        &mut self.camera
    }
}
