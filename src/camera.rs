//! Camera variants, controller and uniforms for view/projection.
//!
//! A [`Camera`] is a tagged variant over the projection strategies the engine
//! supports: first-person (perspective, yaw/pitch), isometric (orthographic,
//! fixed angles around a center) and orbit (perspective around a target).
//! Each variant computes its matrices purely from its own state; degenerate
//! viewport input is rejected at the [`Projection`] boundary, never here.
//!
//! The GPU side lives in [`CameraUniform`] and [`CameraResources`]: the
//! combined view-projection matrix is written into a uniform buffer once per
//! frame by the app loop.

use cgmath::{
    Angle, Deg, EuclideanSpace, InnerSpace, Matrix4, Point3, SquareMatrix, Vector3, ortho,
    perspective,
};
use instant::Duration;
use winit::event::WindowEvent;
use winit::keyboard::{KeyCode, PhysicalKey};

/// wgpu clip space is x,y in -1..1 but z in 0..1, while cgmath produces
/// OpenGL-style -1..1 z. Applied once when building the uniform.
#[rustfmt::skip]
pub const OPENGL_TO_WGPU_MATRIX: Matrix4<f32> = Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.0,
    0.0, 0.0, 0.5, 1.0,
);

const PITCH_LIMIT: Deg<f32> = Deg(89.0);

/// A camera state the scene owns. Exactly one camera is active per scene.
#[derive(Clone, Debug)]
pub enum Camera {
    FirstPerson(FirstPersonCamera),
    Isometric(IsometricCamera),
    Orbit(OrbitCamera),
}

impl Camera {
    /// World-to-view matrix computed from the variant's current state.
    pub fn view_matrix(&self) -> Matrix4<f32> {
        match self {
            Camera::FirstPerson(c) => c.view_matrix(),
            Camera::Isometric(c) => c.view_matrix(),
            Camera::Orbit(c) => c.view_matrix(),
        }
    }

    /// Projection matrix for the given aspect ratio.
    ///
    /// `aspect` has already passed the [`Projection`] boundary and is > 0.
    pub fn projection_matrix(&self, aspect: f32) -> Matrix4<f32> {
        match self {
            Camera::FirstPerson(c) => c.projection_matrix(aspect),
            Camera::Isometric(c) => c.projection_matrix(aspect),
            Camera::Orbit(c) => c.projection_matrix(aspect),
        }
    }

    /// Current world-space eye position.
    pub fn position(&self) -> Point3<f32> {
        match self {
            Camera::FirstPerson(c) => c.position,
            Camera::Isometric(c) => c.eye(),
            Camera::Orbit(c) => c.eye(),
        }
    }
}

impl Default for Camera {
    fn default() -> Self {
        Camera::FirstPerson(FirstPersonCamera::default())
    }
}

/// Free-look camera: position plus yaw/pitch Euler angles.
///
/// Front/right/up are derived from the angles on demand, so there is no
/// redundant state to keep in sync.
#[derive(Clone, Debug)]
pub struct FirstPersonCamera {
    pub position: Point3<f32>,
    pub yaw: Deg<f32>,
    pub pitch: Deg<f32>,
    pub fovy: Deg<f32>,
    pub znear: f32,
    pub zfar: f32,
    pub speed: f32,
    pub sensitivity: f32,
}

impl FirstPersonCamera {
    pub fn new<P: Into<Point3<f32>>>(position: P, yaw: Deg<f32>, pitch: Deg<f32>) -> Self {
        Self {
            position: position.into(),
            yaw,
            pitch,
            ..Self::default()
        }
    }

    fn front(&self) -> Vector3<f32> {
        Vector3::new(
            self.yaw.cos() * self.pitch.cos(),
            self.pitch.sin(),
            self.yaw.sin() * self.pitch.cos(),
        )
        .normalize()
    }

    fn right(&self) -> Vector3<f32> {
        self.front().cross(Vector3::unit_y()).normalize()
    }

    pub fn view_matrix(&self) -> Matrix4<f32> {
        let front = self.front();
        let right = front.cross(Vector3::unit_y()).normalize();
        let up = right.cross(front).normalize();
        Matrix4::look_at_rh(self.position, self.position + front, up)
    }

    pub fn projection_matrix(&self, aspect: f32) -> Matrix4<f32> {
        perspective(self.fovy, aspect, self.znear, self.zfar)
    }

    /// Move along the derived axes. `dt` keeps the speed frame-rate independent.
    pub fn process_keyboard(
        &mut self,
        dt: Duration,
        forward: f32,
        backward: f32,
        left: f32,
        right: f32,
    ) {
        let velocity = self.speed * dt.as_secs_f32();
        let front = self.front();
        let right_axis = self.right();
        self.position += front * (forward - backward) * velocity;
        self.position += right_axis * (right - left) * velocity;
    }

    /// Mouse-look: offsets rotate yaw/pitch, pitch clamped so the view
    /// never flips over the poles.
    pub fn process_mouse(&mut self, dx: f32, dy: f32) {
        self.yaw += Deg(dx * self.sensitivity);
        self.pitch += Deg(dy * self.sensitivity);
        self.pitch = clamp_deg(self.pitch, -PITCH_LIMIT, PITCH_LIMIT);
    }

    /// Scroll zoom narrows/widens the field of view within 1..=45 degrees.
    pub fn process_scroll(&mut self, dy: f32) {
        self.fovy -= Deg(dy);
        self.fovy = clamp_deg(self.fovy, Deg(1.0), Deg(45.0));
    }
}

impl Default for FirstPersonCamera {
    fn default() -> Self {
        Self {
            position: Point3::origin(),
            // look toward -Z
            yaw: Deg(-90.0),
            pitch: Deg(0.0),
            fovy: Deg(45.0),
            znear: 0.1,
            zfar: 100.0,
            speed: 2.5,
            sensitivity: 0.1,
        }
    }
}

/// Orthographic camera looking at a center from the standard isometric
/// direction (yaw 225 degrees, pitch -35.264 degrees).
#[derive(Clone, Debug)]
pub struct IsometricCamera {
    pub center: Point3<f32>,
    /// Half the height of the ortho view volume in world units.
    pub size: f32,
    pub distance: f32,
    pub yaw: Deg<f32>,
    pub pitch: Deg<f32>,
    pub znear: f32,
    pub zfar: f32,
}

impl IsometricCamera {
    pub fn new<P: Into<Point3<f32>>>(center: P, size: f32, distance: f32) -> Self {
        Self {
            center: center.into(),
            size,
            distance,
            ..Self::default()
        }
    }

    fn direction(&self) -> Vector3<f32> {
        Vector3::new(
            self.yaw.cos() * self.pitch.cos(),
            self.pitch.sin(),
            self.yaw.sin() * self.pitch.cos(),
        )
        .normalize()
    }

    /// Eye position derived from center, angles and distance.
    pub fn eye(&self) -> Point3<f32> {
        self.center - self.direction() * self.distance
    }

    pub fn view_matrix(&self) -> Matrix4<f32> {
        Matrix4::look_at_rh(self.eye(), self.center, Vector3::unit_y())
    }

    pub fn projection_matrix(&self, aspect: f32) -> Matrix4<f32> {
        let half_w = self.size * aspect;
        ortho(-half_w, half_w, -self.size, self.size, self.znear, self.zfar)
    }

    /// Scroll zooms the ortho volume, never below a sliver.
    pub fn process_scroll(&mut self, dy: f32) {
        self.size = (self.size - dy).clamp(1.0, 100.0);
    }

    pub fn set_angles(&mut self, yaw: Deg<f32>, pitch: Deg<f32>) {
        self.yaw = yaw;
        self.pitch = clamp_deg(pitch, -PITCH_LIMIT, PITCH_LIMIT);
    }

    pub fn rotate_yaw(&mut self, delta: Deg<f32>) {
        self.yaw += delta;
    }
}

impl Default for IsometricCamera {
    fn default() -> Self {
        Self {
            center: Point3::origin(),
            size: 10.0,
            distance: 20.0,
            yaw: Deg(225.0),
            pitch: Deg(-35.264),
            znear: 0.1,
            zfar: 100.0,
        }
    }
}

/// Perspective camera orbiting a target on a sphere of radius `distance`.
#[derive(Clone, Debug)]
pub struct OrbitCamera {
    pub target: Point3<f32>,
    pub distance: f32,
    pub yaw: Deg<f32>,
    pub pitch: Deg<f32>,
    pub fovy: Deg<f32>,
    pub znear: f32,
    pub zfar: f32,
    pub sensitivity: f32,
    pub scroll_sensitivity: f32,
}

impl OrbitCamera {
    pub fn new<P: Into<Point3<f32>>>(target: P, distance: f32) -> Self {
        Self {
            target: target.into(),
            distance,
            ..Self::default()
        }
    }

    /// Spherical-to-Cartesian conversion around the target.
    pub fn eye(&self) -> Point3<f32> {
        Point3::new(
            self.target.x + self.distance * self.pitch.cos() * self.yaw.cos(),
            self.target.y + self.distance * self.pitch.sin(),
            self.target.z + self.distance * self.pitch.cos() * self.yaw.sin(),
        )
    }

    pub fn view_matrix(&self) -> Matrix4<f32> {
        Matrix4::look_at_rh(self.eye(), self.target, Vector3::unit_y())
    }

    pub fn projection_matrix(&self, aspect: f32) -> Matrix4<f32> {
        perspective(self.fovy, aspect, self.znear, self.zfar)
    }

    /// Drag rotates around the target, pitch clamped so the orbit never flips.
    pub fn process_mouse(&mut self, dx: f32, dy: f32) {
        self.yaw += Deg(dx * self.sensitivity);
        self.pitch += Deg(dy * self.sensitivity);
        self.pitch = clamp_deg(self.pitch, -PITCH_LIMIT, PITCH_LIMIT);
    }

    /// Scroll moves along the view ray, distance clamped to 1..=100.
    pub fn process_scroll(&mut self, dy: f32) {
        self.distance = (self.distance - dy * self.scroll_sensitivity).clamp(1.0, 100.0);
    }
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self {
            target: Point3::origin(),
            distance: 10.0,
            yaw: Deg(-90.0),
            pitch: Deg(0.0),
            fovy: Deg(45.0),
            znear: 0.1,
            zfar: 100.0,
            sensitivity: 0.1,
            scroll_sensitivity: 1.0,
        }
    }
}

fn clamp_deg(value: Deg<f32>, min: Deg<f32>, max: Deg<f32>) -> Deg<f32> {
    Deg(value.0.clamp(min.0, max.0))
}

/// Viewport dimensions, the boundary where degenerate sizes are rejected.
#[derive(Clone, Copy, Debug)]
pub struct Projection {
    width: u32,
    height: u32,
}

impl Projection {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width: width.max(1),
            height: height.max(1),
        }
    }

    /// Zero dimensions (minimized window) are ignored rather than producing
    /// a degenerate aspect ratio downstream.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            log::warn!("ignoring degenerate viewport resize to {width}x{height}");
            return;
        }
        self.width = width;
        self.height = height;
    }

    pub fn aspect(&self) -> f32 {
        self.width as f32 / self.height as f32
    }
}

/// The view-projection data as it crosses to the GPU.
#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniform {
    view_position: [f32; 4],
    view_proj: [[f32; 4]; 4],
}

impl CameraUniform {
    pub fn new() -> Self {
        Self {
            view_position: [0.0; 4],
            view_proj: Matrix4::identity().into(),
        }
    }

    pub fn update_view_proj(&mut self, camera: &Camera, projection: &Projection) {
        self.view_position = camera.position().to_homogeneous().into();
        self.view_proj = (OPENGL_TO_WGPU_MATRIX
            * camera.projection_matrix(projection.aspect())
            * camera.view_matrix())
        .into();
    }
}

impl Default for CameraUniform {
    fn default() -> Self {
        Self::new()
    }
}

/// Uniform buffer and bind group for the active camera, owned by the context.
///
/// The camera state itself lives in the scene; the app loop reads the top
/// scene's camera each frame and writes the combined matrix into `buffer`.
#[derive(Debug)]
pub struct CameraResources {
    pub uniform: CameraUniform,
    pub buffer: wgpu::Buffer,
    pub bind_group: wgpu::BindGroup,
    pub bind_group_layout: wgpu::BindGroupLayout,
}

impl CameraResources {
    pub fn new(device: &wgpu::Device) -> Self {
        use wgpu::util::DeviceExt;

        let uniform = CameraUniform::new();
        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Camera Buffer"),
            contents: bytemuck::cast_slice(&[uniform]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                }],
                label: Some("camera_bind_group_layout"),
            });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            }],
            label: Some("camera_bind_group"),
        });

        Self {
            uniform,
            buffer,
            bind_group,
            bind_group_layout,
        }
    }
}

/// Per-frame input state applied to whichever camera the active scene owns.
///
/// The app loop feeds winit events in and calls [`CameraController::update`]
/// once per frame with the top scene's camera.
#[derive(Debug, Default)]
pub struct CameraController {
    amount_forward: f32,
    amount_backward: f32,
    amount_left: f32,
    amount_right: f32,
    mouse_dx: f32,
    mouse_dy: f32,
    scroll: f32,
    pub dragging: bool,
}

impl CameraController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accumulate a raw mouse motion delta (consumed on the next update).
    pub fn handle_mouse(&mut self, dx: f64, dy: f64) {
        self.mouse_dx += dx as f32;
        self.mouse_dy += dy as f32;
    }

    pub fn handle_window_events(&mut self, event: &WindowEvent) {
        match event {
            WindowEvent::KeyboardInput { event, .. } => {
                let amount = if event.state.is_pressed() { 1.0 } else { 0.0 };
                match event.physical_key {
                    PhysicalKey::Code(KeyCode::KeyW | KeyCode::ArrowUp) => {
                        self.amount_forward = amount;
                    }
                    PhysicalKey::Code(KeyCode::KeyS | KeyCode::ArrowDown) => {
                        self.amount_backward = amount;
                    }
                    PhysicalKey::Code(KeyCode::KeyA | KeyCode::ArrowLeft) => {
                        self.amount_left = amount;
                    }
                    PhysicalKey::Code(KeyCode::KeyD | KeyCode::ArrowRight) => {
                        self.amount_right = amount;
                    }
                    _ => (),
                }
            }
            WindowEvent::MouseWheel { delta, .. } => {
                self.scroll += match delta {
                    winit::event::MouseScrollDelta::LineDelta(_, y) => *y,
                    winit::event::MouseScrollDelta::PixelDelta(pos) => pos.y as f32 / 100.0,
                };
            }
            _ => (),
        }
    }

    /// Apply the accumulated input to the camera and reset the deltas.
    pub fn update(&mut self, camera: &mut Camera, dt: Duration) {
        match camera {
            Camera::FirstPerson(c) => {
                c.process_keyboard(
                    dt,
                    self.amount_forward,
                    self.amount_backward,
                    self.amount_left,
                    self.amount_right,
                );
                if self.dragging {
                    // reversed dy: screen y grows downward
                    c.process_mouse(self.mouse_dx, -self.mouse_dy);
                }
                c.process_scroll(self.scroll);
            }
            Camera::Isometric(c) => {
                if self.dragging {
                    c.rotate_yaw(Deg(self.mouse_dx * 0.25));
                }
                c.process_scroll(self.scroll);
            }
            Camera::Orbit(c) => {
                if self.dragging {
                    c.process_mouse(self.mouse_dx, -self.mouse_dy);
                }
                c.process_scroll(self.scroll);
            }
        }
        self.mouse_dx = 0.0;
        self.mouse_dy = 0.0;
        self.scroll = 0.0;
    }
}
