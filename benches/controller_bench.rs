//! Controller Benchmarks
//!
//! Measures per-frame cost of a long joint chain:
//! - `update` (rest pose reset + clip sampling)
//! - `pose` (global evaluation + skinning matrices)
//! - stateless vs cursor clip sampling

use std::hint::black_box;

use criterion::{Criterion, criterion_group, criterion_main};
use glam::{Mat4, Quat, Vec3};

use armature::animation::clip::{Clip, ClipCursor};
use armature::animation::controller::Controller;
use armature::animation::pose::Pose;
use armature::animation::skeleton::Skeleton;
use armature::animation::tracks::{Frame, InterpolationMode, Track};
use armature::animation::transform_track::TransformTrack;
use armature::transform::Transform;

const JOINTS: usize = 96;
const KEYS: usize = 60;

fn chain_skeleton() -> Skeleton {
    let mut rest = Pose::new(JOINTS);
    for joint in 1..JOINTS {
        rest.set_local(joint, Transform::from_translation(Vec3::Y * 0.1));
        rest.set_parent(joint, Some(joint - 1)).expect("parent precedes child");
    }

    let mut globals = Vec::new();
    rest.global_matrices_into(&mut globals);
    let inverse_binds = globals.iter().map(Mat4::inverse).collect::<Vec<Mat4>>();

    Skeleton::new(rest, inverse_binds, Vec::new()).expect("chain is acyclic")
}

fn sway_clip() -> Clip {
    let tracks = (0..JOINTS)
        .map(|joint| {
            let mut track = TransformTrack::new(joint);
            track.rotation = Track::new(
                (0..KEYS)
                    .map(|k| {
                        let t = k as f32 / 30.0;
                        Frame::new(t, Quat::from_rotation_z((t * 3.0 + joint as f32).sin() * 0.2))
                    })
                    .collect(),
                InterpolationMode::Linear,
            );
            track
        })
        .collect();
    Clip::with_tracks("sway", tracks)
}

fn bench_controller(c: &mut Criterion) {
    let mut controller = Controller::new();
    controller.set_skeleton(chain_skeleton());
    controller.add_clip(sway_clip());
    controller.play();

    let mut group = c.benchmark_group("controller");
    group.bench_function("update", |b| {
        b.iter(|| controller.update(black_box(1.0 / 60.0)));
    });
    group.bench_function("update_and_pose", |b| {
        b.iter(|| {
            let _ = controller.update(black_box(1.0 / 60.0));
            black_box(controller.pose().len())
        });
    });
    group.finish();
}

fn bench_clip_sampling(c: &mut Criterion) {
    let clip = sway_clip();
    let mut pose = Pose::new(JOINTS);
    let mut cursor = ClipCursor::default();
    let mut time = 0.0_f32;

    let mut group = c.benchmark_group("clip_sample");
    group.bench_function("binary_search", |b| {
        b.iter(|| {
            time += 1.0 / 60.0;
            clip.sample(&mut pose, black_box(time))
        });
    });
    group.bench_function("cursor", |b| {
        b.iter(|| {
            time += 1.0 / 60.0;
            clip.sample_with_cursor(&mut pose, black_box(time), &mut cursor)
        });
    });
    group.finish();
}

criterion_group!(benches, bench_controller, bench_clip_sampling);
criterion_main!(benches);
