use scene_ngin::resources::primitives;

fn normals_are_unit(data: &primitives::MeshData) {
    for vertex in &data.vertices {
        let [x, y, z] = vertex.normal;
        let len = (x * x + y * y + z * z).sqrt();
        assert!((len - 1.0).abs() < 1e-4, "normal {:?} not unit", vertex.normal);
    }
}

fn indices_in_range(data: &primitives::MeshData) {
    let count = data.vertices.len() as u32;
    for &index in &data.indices {
        assert!(index < count, "index {index} out of range (< {count})");
    }
}

#[test]
fn circle_counts_match_the_fan_layout() {
    let segments = 24;
    let data = primitives::circle(1.5, segments);
    // one center vertex plus a closed ring
    assert_eq!(data.vertices.len(), segments as usize + 2);
    assert_eq!(data.indices.len(), 3 * segments as usize);
    assert!(data.indices.chunks(3).all(|tri| tri[0] == 0));
    indices_in_range(&data);
    normals_are_unit(&data);
}

#[test]
fn cube_has_36_unique_vertices() {
    let data = primitives::cube();
    assert_eq!(data.vertices.len(), 36);
    assert_eq!(data.indices, (0..36).collect::<Vec<u32>>());
    normals_are_unit(&data);
    for vertex in &data.vertices {
        for axis in vertex.position {
            assert!(axis.abs() <= 0.5 + 1e-6);
        }
    }
}

#[test]
fn quad_is_two_triangles() {
    let data = primitives::quad();
    assert_eq!(data.vertices.len(), 4);
    assert_eq!(data.indices.len(), 6);
    indices_in_range(&data);
    for vertex in &data.vertices {
        assert_eq!(vertex.normal, [0.0, 0.0, 1.0]);
        assert_eq!(vertex.position[2], 0.0);
    }
}

#[test]
fn sphere_counts_match_the_grid() {
    let (stacks, slices) = (8u32, 12u32);
    let data = primitives::sphere(2.0, stacks, slices);
    assert_eq!(
        data.vertices.len(),
        ((stacks + 1) * (slices + 1)) as usize
    );
    assert_eq!(data.indices.len(), (6 * stacks * slices) as usize);
    indices_in_range(&data);
    normals_are_unit(&data);
    // every point sits on the sphere
    for vertex in &data.vertices {
        let [x, y, z] = vertex.position;
        let r = (x * x + y * y + z * z).sqrt();
        assert!((r - 2.0).abs() < 1e-4);
    }
}

#[test]
fn ellipsoid_caps_emit_single_triangles() {
    let (sectors, stacks) = (10u32, 6u32);
    let data = primitives::ellipsoid(1.0, 2.0, 3.0, sectors, stacks);
    assert_eq!(
        data.vertices.len(),
        ((stacks + 1) * (sectors + 1)) as usize
    );
    // cap rows contribute one triangle per sector, interior rows two
    assert_eq!(data.indices.len(), (6 * sectors * (stacks - 1)) as usize);
    indices_in_range(&data);
    normals_are_unit(&data);
}

#[test]
fn degenerate_subdivisions_are_raised_to_the_minimum() {
    assert_eq!(primitives::circle(1.0, 0), primitives::circle(1.0, 3));
    assert_eq!(primitives::sphere(1.0, 0, 0), primitives::sphere(1.0, 2, 3));
    assert_eq!(
        primitives::ellipsoid(1.0, 1.0, 1.0, 0, 0),
        primitives::ellipsoid(1.0, 1.0, 1.0, 3, 2)
    );

    // clamped output is still a well-formed mesh, no NaN normals
    for data in [
        primitives::circle(1.0, 1),
        primitives::sphere(1.0, 1, 1),
        primitives::ellipsoid(2.0, 1.0, 1.0, 1, 1),
    ] {
        normals_are_unit(&data);
        indices_in_range(&data);
        assert!(!data.indices.is_empty());
    }
}

#[test]
fn generators_are_deterministic() {
    assert_eq!(primitives::circle(1.0, 16), primitives::circle(1.0, 16));
    assert_eq!(primitives::cube(), primitives::cube());
    assert_eq!(primitives::quad(), primitives::quad());
    assert_eq!(
        primitives::sphere(1.0, 8, 8),
        primitives::sphere(1.0, 8, 8)
    );
    assert_eq!(
        primitives::ellipsoid(1.0, 1.0, 2.0, 8, 4),
        primitives::ellipsoid(1.0, 1.0, 2.0, 8, 4)
    );
}
