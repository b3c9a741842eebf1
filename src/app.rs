//! The application event loop.
//!
//! [`App`] wires winit's `ApplicationHandler` to the [`SceneManager`]. Each
//! frame: input events go to the top scene, the top scene updates, its camera
//! is uploaded, its render batches are drawn, the frame presents, and only
//! then are queued scene transitions applied. An empty stack ends the loop.

use std::{iter, pin::Pin, sync::Arc};

use instant::{Duration, Instant};
use winit::{
    application::ApplicationHandler,
    event::{DeviceEvent, DeviceId, MouseButton, WindowEvent},
    event_loop::{ActiveEventLoop, EventLoop},
    window::Window,
};

use crate::{
    camera::CameraController,
    context::{Context, InitContext},
    data_structures::model::DrawModel,
    render::Instanced,
    scene::{Scene, SceneManager, Transition},
};

/// Async factory for the initial scene. Runs on the startup runtime before
/// the first frame; a `Err` aborts startup.
pub type SceneConstructor<S> =
    Box<dyn FnOnce(InitContext) -> Pin<Box<dyn Future<Output = anyhow::Result<Box<dyn Scene<S>>>>>>>;

/// GPU context plus the shared application state.
#[derive(Debug)]
pub struct AppState<S: 'static> {
    pub(crate) ctx: Context,
    state: S,
    is_surface_configured: bool,
}

impl<S: Default> AppState<S> {
    async fn new(window: Arc<Window>) -> anyhow::Result<Self> {
        let ctx = Context::new(window).await?;
        Ok(Self {
            ctx,
            state: S::default(),
            is_surface_configured: false,
        })
    }

    fn resize(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.is_surface_configured = true;
        }
        self.ctx.resize(width, height);
    }

    fn render(&mut self, scenes: &mut SceneManager<S>) -> Result<(), wgpu::SurfaceError> {
        self.ctx.window.request_redraw();

        if !self.is_surface_configured {
            return Ok(());
        }

        let output = self.ctx.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .ctx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });
        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.ctx.clear_colour),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.ctx.depth_texture.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            let mut opaques: Vec<Instanced> = Vec::new();
            let mut transparents: Vec<Instanced> = Vec::new();
            if let Some(scene) = scenes.top() {
                scene
                    .on_render()
                    .collect_batches(&mut opaques, &mut transparents);
            }

            render_pass.set_pipeline(&self.ctx.pipelines.basic);
            for instanced in opaques {
                if instanced.amount == 0 || instanced.instance.size() == 0 {
                    log::warn!("skipping a draw with zero instances");
                    continue;
                }
                render_pass.set_vertex_buffer(1, instanced.instance.slice(..));
                render_pass.draw_model_instanced(
                    instanced.model,
                    0..instanced.amount as u32,
                    &self.ctx.camera.bind_group,
                );
            }

            render_pass.set_pipeline(&self.ctx.pipelines.transparent);
            for instanced in transparents {
                if instanced.amount == 0 || instanced.instance.size() == 0 {
                    log::warn!("skipping a draw with zero instances");
                    continue;
                }
                render_pass.set_vertex_buffer(1, instanced.instance.slice(..));
                render_pass.draw_model_instanced(
                    instanced.model,
                    0..instanced.amount as u32,
                    &self.ctx.camera.bind_group,
                );
            }
        }

        self.ctx.queue.submit(iter::once(encoder.finish()));
        output.present();
        Ok(())
    }
}

pub struct App<S: 'static> {
    async_runtime: tokio::runtime::Runtime,
    state: Option<AppState<S>>,
    scenes: SceneManager<S>,
    controller: CameraController,
    // taken in `resumed`
    constructors: Option<Vec<SceneConstructor<S>>>,
    last_time: Instant,
}

impl<S> App<S> {
    fn new(constructors: Vec<SceneConstructor<S>>) -> anyhow::Result<Self> {
        let async_runtime = tokio::runtime::Runtime::new()?;
        Ok(Self {
            async_runtime,
            state: None,
            scenes: SceneManager::new(),
            controller: CameraController::new(),
            constructors: Some(constructors),
            last_time: Instant::now(),
        })
    }

    /// Upload the top scene's camera for this frame.
    fn write_camera(&mut self, dt: Duration) {
        let Some(state) = &mut self.state else { return };
        let Some(scene) = self.scenes.top_mut() else {
            return;
        };
        self.controller.update(scene.camera_mut(), dt);
        state
            .ctx
            .camera
            .uniform
            .update_view_proj(scene.camera(), &state.ctx.projection);
        state.ctx.queue.write_buffer(
            &state.ctx.camera.buffer,
            0,
            bytemuck::cast_slice(&[state.ctx.camera.uniform]),
        );
    }

    /// Frame boundary: apply queued transitions, then exit once nothing is
    /// left on the stack.
    fn finish_frame(&mut self, event_loop: &ActiveEventLoop) {
        if let Some(state) = &mut self.state {
            if let Err(e) =
                self.scenes
                    .apply_pending(&self.async_runtime, &mut state.ctx, &mut state.state)
            {
                log::error!("scene transition rejected: {e:#}");
            }
        }
        if self.scenes.is_empty() {
            log::info!("scene stack is empty, exiting");
            event_loop.exit();
        }
    }
}

impl<S: 'static + Default> ApplicationHandler for App<S> {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        let window_attributes = Window::default_attributes();
        let window = match event_loop.create_window(window_attributes) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                log::error!("cannot create a window: {e}");
                event_loop.exit();
                return;
            }
        };

        let Some(constructors) = self.constructors.take() else {
            // resumed again after suspend, nothing to initialise
            return;
        };

        let init = async move {
            let app_state = AppState::new(window).await?;
            let futures: Vec<_> = constructors
                .into_iter()
                // the clone in into() only clones the internal Arcs of
                // Device and Queue
                .map(|constructor| constructor((&app_state.ctx).into()))
                .collect();
            let scenes: Vec<_> = futures::future::join_all(futures)
                .await
                .into_iter()
                .collect::<anyhow::Result<_>>()?;
            anyhow::Ok((app_state, scenes))
        };

        match self.async_runtime.block_on(init) {
            Ok((app_state, scenes)) => {
                self.state = Some(app_state);
                // `apply_pending` runs each scene's on_load, bottom of the
                // stack first; a failure leaves the stack empty and
                // finish_frame exits.
                for scene in scenes {
                    self.scenes.defer(Transition::Push(scene));
                }
                self.finish_frame(event_loop);
            }
            Err(e) => {
                log::error!("initialisation failed: {e:#}");
                event_loop.exit();
            }
        }
    }

    fn device_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _device_id: DeviceId,
        event: DeviceEvent,
    ) {
        let Some(state) = &mut self.state else { return };

        if let DeviceEvent::MouseMotion { delta: (dx, dy) } = event {
            self.controller.handle_mouse(dx, dy);
        }
        self.scenes
            .handle_device_event(&state.ctx, &mut state.state, &event);
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: winit::window::WindowId,
        event: WindowEvent,
    ) {
        let Some(state) = &mut self.state else { return };

        self.controller.handle_window_events(&event);
        if let WindowEvent::MouseInput {
            state: button_state,
            button: MouseButton::Right,
            ..
        } = &event
        {
            self.controller.dragging = button_state.is_pressed();
        }

        self.scenes
            .handle_window_event(&state.ctx, &mut state.state, &event);

        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::Resized(size) => {
                if let Some(state) = &mut self.state {
                    state.resize(size.width, size.height);
                }
            }
            WindowEvent::RedrawRequested => {
                let dt = self.last_time.elapsed();
                self.last_time = Instant::now();

                if let Some(state) = &mut self.state {
                    let ctx = &state.ctx;
                    self.scenes.update(ctx, &mut state.state, dt);
                }
                self.write_camera(dt);

                let render_result = match &mut self.state {
                    Some(state) => state.render(&mut self.scenes),
                    None => Ok(()),
                };
                match render_result {
                    Ok(()) => {}
                    Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                        if let Some(state) = &mut self.state {
                            let size = state.ctx.window.inner_size();
                            state.resize(size.width, size.height);
                        }
                    }
                    Err(e) => log::error!("unable to render: {e}"),
                }

                self.finish_frame(event_loop);
            }
            _ => {}
        }
    }
}

/// Build the event loop, load the initial scenes (first constructor at the
/// bottom of the stack) and run until the stack empties or the window closes.
pub fn run<S: 'static + Default>(constructors: Vec<SceneConstructor<S>>) -> anyhow::Result<()> {
    if let Err(e) = env_logger::try_init() {
        eprintln!("could not initialise the logger: {e}");
    }

    let event_loop = EventLoop::new()?;
    let mut app: App<S> = App::new(constructors)?;
    event_loop.run_app(&mut app)?;

    Ok(())
}
