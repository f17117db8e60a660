//! Transform Tests
//!
//! Tests for:
//! - Parent/child composition and its agreement with matrix products
//! - Inverse, point and vector transforms
//! - Matrix round trips

use std::f32::consts::FRAC_PI_2;

use glam::{Mat4, Quat, Vec3};

use armature::transform::Transform;

const EPSILON: f32 = 1e-5;

fn vec3_approx(a: Vec3, b: Vec3) -> bool {
    a.abs_diff_eq(b, EPSILON)
}

fn mat4_approx(a: &Mat4, b: &Mat4) -> bool {
    a.abs_diff_eq(*b, EPSILON)
}

#[test]
fn identity_is_neutral() {
    let t = Transform::new(
        Vec3::new(1.0, -2.0, 3.0),
        Quat::from_rotation_y(0.7),
        Vec3::splat(1.5),
    );
    let composed = Transform::IDENTITY.mul_transform(&t);
    assert!(vec3_approx(composed.translation, t.translation));
    assert!(vec3_approx(composed.scale, t.scale));
    assert!(composed.rotation.angle_between(t.rotation) < 1e-4);
    assert_eq!(Transform::default(), Transform::IDENTITY);
    assert_eq!(Transform::IDENTITY.to_matrix(), Mat4::IDENTITY);
}

#[test]
fn composition_matches_matrix_product() {
    let parent = Transform::new(
        Vec3::new(0.0, 2.0, 0.0),
        Quat::from_rotation_z(FRAC_PI_2),
        Vec3::splat(2.0),
    );
    let child = Transform::new(
        Vec3::new(1.0, 0.0, 0.0),
        Quat::from_rotation_x(0.3),
        Vec3::new(1.0, 0.5, 2.0),
    );

    let composed = (parent * child).to_matrix();
    let expected = parent.to_matrix() * child.to_matrix();
    assert!(mat4_approx(&composed, &expected), "{composed:?} != {expected:?}");
}

#[test]
fn child_translation_follows_parent_rotation() {
    let parent = Transform::from_rotation(Quat::from_rotation_z(FRAC_PI_2));
    let child = Transform::from_translation(Vec3::X);

    let global = parent.mul_transform(&child);
    assert!(vec3_approx(global.translation, Vec3::Y), "{:?}", global.translation);
}

#[test]
fn inverse_undoes_transform() {
    let t = Transform::new(
        Vec3::new(3.0, -1.0, 0.5),
        Quat::from_rotation_y(1.1),
        Vec3::splat(0.5),
    );
    let round_trip = t.inverse().mul_transform(&t);

    assert!(vec3_approx(round_trip.translation, Vec3::ZERO));
    assert!(vec3_approx(round_trip.scale, Vec3::ONE));
    assert!(round_trip.rotation.angle_between(Quat::IDENTITY) < 1e-4);

    let point = Vec3::new(4.0, 5.0, 6.0);
    assert!(vec3_approx(t.inverse().transform_point3(t.transform_point3(point)), point));
}

#[test]
fn inverse_matrix_handles_non_uniform_scale() {
    let t = Transform::new(
        Vec3::new(1.0, 2.0, 3.0),
        Quat::from_rotation_z(0.8),
        Vec3::new(2.0, 1.0, 0.5),
    );
    assert!(mat4_approx(&(t.to_matrix() * t.inverse_matrix()), &Mat4::IDENTITY));

    let point = Vec3::new(-1.0, 4.0, 0.5);
    let back = t.inverse_matrix().transform_point3(t.transform_point3(point));
    assert!(vec3_approx(back, point), "{back:?}");
}

#[test]
fn vectors_ignore_translation() {
    let t = Transform::new(Vec3::new(10.0, 10.0, 10.0), Quat::IDENTITY, Vec3::splat(2.0));
    assert_eq!(t.transform_vector3(Vec3::X), Vec3::new(2.0, 0.0, 0.0));
    assert_eq!(t.transform_point3(Vec3::X), Vec3::new(12.0, 10.0, 10.0));
}

#[test]
fn matrix_round_trip() {
    let t = Transform::new(
        Vec3::new(-2.0, 0.25, 8.0),
        Quat::from_rotation_x(0.4) * Quat::from_rotation_z(-1.2),
        Vec3::new(1.0, 2.0, 3.0),
    );
    let back = Transform::from_matrix(&t.to_matrix());

    assert!(vec3_approx(back.translation, t.translation));
    assert!(vec3_approx(back.scale, t.scale));
    assert!(back.rotation.angle_between(t.rotation) < 1e-4);
    assert_eq!(Mat4::from(t), t.to_matrix());
}

#[test]
fn non_finite_components_are_detected() {
    assert!(Transform::IDENTITY.is_finite());
    assert!(!Transform::from_translation(Vec3::new(f32::NAN, 0.0, 0.0)).is_finite());
}
