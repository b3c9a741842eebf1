use cgmath::{Deg, Matrix4, Point3, SquareMatrix, Vector3};
use scene_ngin::camera::{
    Camera, CameraUniform, FirstPersonCamera, IsometricCamera, OrbitCamera, Projection,
};

const EPS: f32 = 1e-5;

fn assert_matrix_eq(actual: Matrix4<f32>, expected: Matrix4<f32>) {
    let a: [[f32; 4]; 4] = actual.into();
    let e: [[f32; 4]; 4] = expected.into();
    for (col_a, col_e) in a.iter().zip(e.iter()) {
        for (x, y) in col_a.iter().zip(col_e.iter()) {
            assert!(
                (x - y).abs() < EPS,
                "matrices differ:\n{a:?}\nvs\n{e:?}"
            );
        }
    }
}

#[test]
fn first_person_zeroed_view_is_identity() {
    // at the origin, looking down -Z with +Y up
    let camera = FirstPersonCamera::new((0.0, 0.0, 0.0), Deg(-90.0), Deg(0.0));
    assert_matrix_eq(camera.view_matrix(), Matrix4::identity());
}

#[test]
fn orbit_zeroed_view_is_a_pure_translation() {
    // yaw -90 / pitch 0 puts the eye on the -Z axis looking at the origin,
    // so the view is exactly "move the world distance units away"
    let camera = OrbitCamera::new((0.0, 0.0, 0.0), 5.0);
    let expected = Matrix4::from_translation(Vector3::new(0.0, 0.0, -5.0))
        * Matrix4::from_angle_y(Deg(180.0));
    assert_matrix_eq(camera.view_matrix(), expected);
}

#[test]
fn orbit_eye_is_spherical_offset_from_target() {
    let mut camera = OrbitCamera::new((1.0, 2.0, 3.0), 10.0);
    camera.yaw = Deg(0.0);
    camera.pitch = Deg(0.0);
    let eye = camera.eye();
    assert!((eye.x - 11.0).abs() < EPS);
    assert!((eye.y - 2.0).abs() < EPS);
    assert!((eye.z - 3.0).abs() < EPS);

    camera.pitch = Deg(90.0);
    camera.process_mouse(0.0, 0.0); // clamps
    let eye = camera.eye();
    assert!(eye.y < 2.0 + 10.0, "pitch must clamp below the pole");
}

#[test]
fn first_person_pitch_clamps_at_89_degrees() {
    let mut camera = FirstPersonCamera::default();
    camera.process_mouse(0.0, 10_000.0);
    assert!((camera.pitch.0 - 89.0).abs() < EPS);
    camera.process_mouse(0.0, -100_000.0);
    assert!((camera.pitch.0 + 89.0).abs() < EPS);
}

#[test]
fn first_person_zoom_clamps_to_1_to_45_degrees() {
    let mut camera = FirstPersonCamera::default();
    camera.process_scroll(100.0);
    assert!((camera.fovy.0 - 1.0).abs() < EPS);
    camera.process_scroll(-100.0);
    assert!((camera.fovy.0 - 45.0).abs() < EPS);
}

#[test]
fn orbit_distance_clamps_to_1_to_100() {
    let mut camera = OrbitCamera::new((0.0, 0.0, 0.0), 10.0);
    camera.process_scroll(1_000.0);
    assert!((camera.distance - 1.0).abs() < EPS);
    camera.process_scroll(-1_000.0);
    assert!((camera.distance - 100.0).abs() < EPS);
}

#[test]
fn isometric_eye_sits_opposite_its_view_direction() {
    let camera = IsometricCamera::default();
    let eye = camera.eye();
    let to_center = Point3::new(0.0f32, 0.0, 0.0) - eye;
    // the default direction comes down from above on the 225-degree diagonal
    assert!(to_center.y < 0.0);
    assert!(to_center.x < 0.0);
    assert!(to_center.z < 0.0);
}

#[test]
fn isometric_scroll_zooms_the_ortho_volume() {
    let mut camera = IsometricCamera::default();
    camera.process_scroll(3.0);
    assert!((camera.size - 7.0).abs() < EPS);
    camera.process_scroll(1_000.0);
    assert!((camera.size - 1.0).abs() < EPS);
}

#[test]
fn projection_rejects_degenerate_resize() {
    let mut projection = Projection::new(800, 600);
    let aspect = projection.aspect();
    projection.resize(0, 600);
    assert!((projection.aspect() - aspect).abs() < EPS);
    projection.resize(800, 0);
    assert!((projection.aspect() - aspect).abs() < EPS);
    projection.resize(400, 400);
    assert!((projection.aspect() - 1.0).abs() < EPS);
}

#[test]
fn uniform_update_is_deterministic() {
    let camera = Camera::Orbit(OrbitCamera::new((0.0, 1.0, 0.0), 8.0));
    let projection = Projection::new(640, 480);
    let mut a = CameraUniform::new();
    let mut b = CameraUniform::new();
    a.update_view_proj(&camera, &projection);
    b.update_view_proj(&camera, &projection);
    assert_eq!(bytemuck::bytes_of(&a), bytemuck::bytes_of(&b));
}
