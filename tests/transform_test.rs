use cgmath::{Deg, Matrix4, Quaternion, Rotation3, Vector3, Vector4};
use scene_ngin::data_structures::instance::Instance;

fn assert_matrix_eq(actual: Matrix4<f32>, expected: Matrix4<f32>) {
    let a: [[f32; 4]; 4] = actual.into();
    let e: [[f32; 4]; 4] = expected.into();
    for (col_a, col_e) in a.iter().zip(e.iter()) {
        for (x, y) in col_a.iter().zip(col_e.iter()) {
            assert!((x - y).abs() < 1e-4, "matrices differ:\n{a:?}\nvs\n{e:?}");
        }
    }
}

#[test]
fn identity_instance_is_the_identity_matrix() {
    use cgmath::SquareMatrix;
    assert_matrix_eq(Instance::new().to_matrix(), Matrix4::identity());
}

#[test]
fn composition_matches_matrix_multiplication() {
    let parent = Instance {
        position: Vector3::new(1.0, 2.0, 3.0),
        rotation: Quaternion::from_angle_y(Deg(90.0)),
        scale: Vector3::new(2.0, 2.0, 2.0),
    };
    let child = Instance {
        position: Vector3::new(0.5, 0.0, -1.0),
        rotation: Quaternion::from_angle_x(Deg(45.0)),
        scale: Vector3::new(1.0, 3.0, 1.0),
    };

    let composed = (&parent * &child).to_matrix();
    let expected = parent.to_matrix() * child.to_matrix();

    // compare by how they move a probe point: uniform parent scale keeps
    // TRS composition exact
    let probe = Vector4::new(0.3, -0.7, 1.1, 1.0);
    let a = composed * probe;
    let b = expected * probe;
    for i in 0..4 {
        assert!((a[i] - b[i]).abs() < 1e-4, "{a:?} vs {b:?}");
    }
}

#[test]
fn from_position_keeps_rotation_and_scale_identity() {
    let instance = Instance::from(Vector3::new(4.0, 5.0, 6.0));
    let expected = Matrix4::from_translation(Vector3::new(4.0, 5.0, 6.0));
    assert_matrix_eq(instance.to_matrix(), expected);
}
