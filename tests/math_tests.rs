use phys2d::math::{Aabb, Rotation, Transform, Vector2};
use std::f32::consts::PI;
use approx::assert_relative_eq;

#[test]
fn test_vector2_operations() {
    let v1 = Vector2::new(1.0, 2.0);
    let v2 = Vector2::new(3.0, 4.0);

    assert_eq!(v1 + v2, Vector2::new(4.0, 6.0));
    assert_eq!(v2 - v1, Vector2::new(2.0, 2.0));
    assert_eq!(v1 * 2.0, Vector2::new(2.0, 4.0));
    assert_eq!(-v1, Vector2::new(-1.0, -2.0));

    assert_eq!(v1.dot(&v2), 11.0);
    assert_eq!(v1.cross(&v2), -2.0);
    assert_eq!(v2.length(), 5.0);
    assert_relative_eq!(v2.normalize().length(), 1.0, epsilon = 1e-6);
}

#[test]
fn test_edge_normal_points_outward_for_ccw_edges() {
    // Bottom edge of a CCW square runs +x, so its outward normal is -y
    let edge = Vector2::new(2.0, 0.0);
    assert_eq!(edge.normal(), Vector2::new(0.0, -1.0));

    let right_edge = Vector2::new(0.0, 2.0);
    assert_eq!(right_edge.normal(), Vector2::new(1.0, 0.0));
}

#[test]
fn test_cross_scalar_is_tangential_velocity() {
    let r = Vector2::new(1.0, 0.0);
    let v = Vector2::cross_scalar(2.0, &r);
    assert_relative_eq!(v.x, 0.0);
    assert_relative_eq!(v.y, 2.0);
}

#[test]
fn test_rotation_composition() {
    let quarter = Rotation::new(PI / 2.0);
    let rotated = quarter.rotate(&Vector2::new(1.0, 0.0));
    assert_relative_eq!(rotated.x, 0.0, epsilon = 1e-6);
    assert_relative_eq!(rotated.y, 1.0, epsilon = 1e-6);

    let half = quarter.compose(&quarter);
    assert_relative_eq!(half.angle().abs(), PI, epsilon = 1e-5);

    let back = quarter.inverse().rotate(&rotated);
    assert_relative_eq!(back.x, 1.0, epsilon = 1e-6);
    assert_relative_eq!(back.y, 0.0, epsilon = 1e-6);
}

#[test]
fn test_rotation_stays_unit_after_many_increments() {
    let mut rotation = Rotation::identity();
    for _ in 0..1000 {
        rotation += 0.01;
        rotation.normalize();
    }
    let axis = rotation.x_axis();
    assert_relative_eq!(axis.length(), 1.0, epsilon = 1e-5);
    assert_relative_eq!(rotation.angle(), 10.0 - 4.0 * PI, epsilon = 1e-2);
}

#[test]
fn test_transform_round_trip() {
    let transform = Transform::new(Vector2::new(3.0, -1.0), Rotation::new(0.7));
    let local = Vector2::new(0.5, 2.0);

    let world = transform.transform_point(&local);
    let back = transform.inverse_transform_point(&world);
    assert_relative_eq!(back.x, local.x, epsilon = 1e-5);
    assert_relative_eq!(back.y, local.y, epsilon = 1e-5);

    let direction = transform.transform_direction(&Vector2::new(1.0, 0.0));
    assert_relative_eq!(direction.length(), 1.0, epsilon = 1e-6);
}

#[test]
fn test_aabb_operations() {
    let a = Aabb::new(Vector2::new(0.0, 0.0), Vector2::new(2.0, 2.0));
    let b = Aabb::new(Vector2::new(2.0, 1.0), Vector2::new(3.0, 4.0));
    let c = Aabb::new(Vector2::new(5.0, 5.0), Vector2::new(6.0, 6.0));

    // Touching boxes count as overlapping
    assert!(a.intersects(&b));
    assert!(!a.intersects(&c));

    let union = a.union(&b);
    assert_eq!(union.min, Vector2::new(0.0, 0.0));
    assert_eq!(union.max, Vector2::new(3.0, 4.0));
    assert!(union.contains(&a));
    assert_eq!(union.perimeter(), 14.0);

    let fat = a.expand(2.0);
    assert_eq!(fat.min, Vector2::new(-2.0, -2.0));
    assert!(fat.contains_point(&Vector2::new(3.5, 3.5)));

    assert!(Aabb::from_points(&[]).is_none());
}
