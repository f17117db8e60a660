//! Asset Loading Tests
//!
//! Tests for:
//! - Building skeletons and clips from JSON descriptions
//! - Defaults for absent data (inverse bind matrices, names, rest transforms)
//! - Rejection of malformed channels and hierarchies
//! - Channel merging and cubic spline layouts

use glam::{Mat4, Quat, Vec3};

use armature::animation::asset::{AnimationAsset, ChannelDesc, ClipDesc, JointDesc, SkeletonDesc};
use armature::animation::tracks::InterpolationMode;
use armature::errors::AnimationError;
use armature::settings::AnimationSettings;

const EPSILON: f32 = 1e-5;

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

const WAVE_JSON: &str = r#"{
    "skeleton": {
        "joints": [
            { "name": "root" },
            {
                "name": "arm",
                "parent": 0,
                "translation": [0.0, 1.0, 0.0],
                "inverse_bind_matrix": [1,0,0,0, 0,1,0,0, 0,0,1,0, 0,-1,0,1]
            }
        ]
    },
    "clips": [
        {
            "name": "wave",
            "channels": [
                {
                    "target": 1,
                    "path": "rotation",
                    "times": [0.0, 1.0],
                    "values": [0,0,0,1, 0,0,0.70710677,0.70710677]
                },
                {
                    "target": 1,
                    "path": "weights",
                    "times": [0.0],
                    "values": [1.0]
                }
            ]
        },
        { "name": "idle", "looping": false }
    ]
}"#;

fn channel(target: usize, path: &str, times: Vec<f32>, values: Vec<f32>) -> ChannelDesc {
    ChannelDesc {
        target,
        path: path.to_string(),
        interpolation: InterpolationMode::Linear,
        times,
        values,
        in_tangents: None,
        out_tangents: None,
    }
}

fn clip_with(channels: Vec<ChannelDesc>) -> ClipDesc {
    ClipDesc {
        name: "test".to_string(),
        looping: None,
        channels,
    }
}

// ============================================================================
// JSON -> Controller
// ============================================================================

#[test]
fn json_asset_builds_playable_controller() -> anyhow::Result<()> {
    init_logger();
    let asset = AnimationAsset::from_json(WAVE_JSON)?;
    let mut controller = asset
        .build_controller(AnimationSettings::default())?
        .expect("asset has a skeleton");

    assert_eq!(controller.clip_count(), 2);
    assert_eq!(controller.current_animation_name(), Some("wave"));
    assert!(!controller.clips()[1].looping());

    let skeleton = controller.skeleton().expect("skeleton bound");
    assert_eq!(skeleton.joint_count(), 2);
    assert_eq!(skeleton.joint_index("arm"), Some(1));
    assert_eq!(skeleton.inverse_bind_matrix(0), Some(&Mat4::IDENTITY));

    // The weights channel is skipped; only the rotation track survives
    let wave = controller.clip(0)?;
    assert_eq!(wave.len(), 1);
    let track = wave.track(1).expect("rotation track for joint 1");
    assert_eq!(track.rotation.len(), 2);
    assert!(track.translation.is_empty());
    assert!((wave.duration() - 1.0).abs() < EPSILON);

    controller.play();
    controller.update(0.5)?;
    controller.update(0.0)?;
    let matrices = controller.pose();
    assert_eq!(matrices.len(), 2);

    let expected = Mat4::from_translation(Vec3::Y)
        * Mat4::from_quat(Quat::from_rotation_z(std::f32::consts::FRAC_PI_4))
        * Mat4::from_translation(-Vec3::Y);
    assert!(matrices[1].abs_diff_eq(expected, 1e-5), "{:?}", matrices[1]);
    Ok(())
}

#[test]
fn asset_round_trips_through_json() -> anyhow::Result<()> {
    let asset = AnimationAsset::from_json(WAVE_JSON)?;
    let again = AnimationAsset::from_json(&asset.to_json()?)?;
    assert_eq!(asset, again);
    Ok(())
}

#[test]
fn invalid_json_is_reported() {
    let result = AnimationAsset::from_json("{ \"clips\": 3 }");
    assert!(matches!(result, Err(AnimationError::Json(_))));
}

#[test]
fn asset_without_skeleton_builds_nothing() -> anyhow::Result<()> {
    init_logger();
    let asset = AnimationAsset {
        skeleton: None,
        clips: vec![clip_with(vec![])],
    };
    assert!(asset.build_controller(AnimationSettings::default())?.is_none());
    Ok(())
}

// ============================================================================
// Skeleton Description
// ============================================================================

#[test]
fn missing_bind_data_uses_defaults() -> anyhow::Result<()> {
    init_logger();
    let desc = SkeletonDesc {
        joints: vec![JointDesc::default(), JointDesc {
            parent: Some(0),
            ..Default::default()
        }],
    };
    let skeleton = desc.build()?;

    assert_eq!(skeleton.inverse_bind_matrices(), &[Mat4::IDENTITY, Mat4::IDENTITY]);
    assert_eq!(skeleton.joint_name(1), Some("joint_1"));
    assert_eq!(skeleton.rest_pose().parent(1), Some(0));
    Ok(())
}

#[test]
fn trs_fields_override_matrix() -> anyhow::Result<()> {
    let matrix = Mat4::from_scale_rotation_translation(
        Vec3::splat(2.0),
        Quat::from_rotation_y(0.5),
        Vec3::new(1.0, 2.0, 3.0),
    );
    let joint = JointDesc {
        matrix: Some(matrix.to_cols_array()),
        translation: Some([9.0, 0.0, 0.0]),
        ..Default::default()
    };
    let rest = joint.rest_transform(0)?;

    assert_eq!(rest.translation, Vec3::new(9.0, 0.0, 0.0));
    assert!(rest.scale.abs_diff_eq(Vec3::splat(2.0), EPSILON));
    assert!(rest.rotation.angle_between(Quat::from_rotation_y(0.5)) < 1e-4);
    Ok(())
}

#[test]
fn broken_hierarchies_are_rejected() {
    let out_of_range = SkeletonDesc {
        joints: vec![JointDesc {
            parent: Some(3),
            ..Default::default()
        }],
    };
    assert!(matches!(
        out_of_range.build(),
        Err(AnimationError::MalformedJoint { joint: 0, .. })
    ));

    let cyclic = SkeletonDesc {
        joints: vec![
            JointDesc {
                parent: Some(1),
                ..Default::default()
            },
            JointDesc {
                parent: Some(0),
                ..Default::default()
            },
        ],
    };
    assert!(matches!(cyclic.build(), Err(AnimationError::HierarchyCycle { .. })));
}

#[test]
fn zero_rotation_is_rejected() {
    let joint = JointDesc {
        rotation: Some([0.0; 4]),
        ..Default::default()
    };
    assert!(matches!(
        joint.rest_transform(2),
        Err(AnimationError::MalformedJoint { joint: 2, .. })
    ));
}

// ============================================================================
// Clip Description
// ============================================================================

#[test]
fn mismatched_value_count_is_rejected() {
    let desc = clip_with(vec![channel(0, "translation", vec![0.0, 1.0], vec![0.0; 5])]);
    assert!(matches!(
        desc.build(None),
        Err(AnimationError::MalformedChannel { channel: 0, .. })
    ));
}

#[test]
fn unordered_times_are_rejected() {
    let desc = clip_with(vec![channel(0, "scale", vec![1.0, 0.5], vec![1.0; 6])]);
    assert!(matches!(desc.build(None), Err(AnimationError::MalformedChannel { .. })));
}

#[test]
fn target_outside_skeleton_is_rejected() {
    let desc = clip_with(vec![channel(4, "translation", vec![0.0], vec![0.0; 3])]);
    assert!(desc.build(None).is_ok());
    assert!(matches!(desc.build(Some(2)), Err(AnimationError::MalformedChannel { .. })));
}

#[test]
fn channels_for_same_joint_merge_into_one_track() -> anyhow::Result<()> {
    let desc = clip_with(vec![
        channel(1, "translation", vec![0.0, 2.0], vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0]),
        channel(0, "scale", vec![0.0], vec![1.0, 1.0, 1.0]),
        channel(1, "rotation", vec![0.5, 1.0], vec![0.0, 0.0, 0.0, 2.0, 0.0, 0.0, 0.0, 1.0]),
    ]);
    let clip = desc.build(Some(2))?;

    assert_eq!(clip.len(), 2);
    assert_eq!(clip.id_at_index(0), Some(1));
    let track = clip.track(1).expect("merged track");
    assert_eq!(track.translation.len(), 2);
    assert_eq!(track.rotation.len(), 2);
    // Rotations are normalized on load
    assert_eq!(track.rotation.frames()[0].value, Quat::IDENTITY);
    assert!((clip.duration() - 2.0).abs() < EPSILON);
    Ok(())
}

#[test]
fn interleaved_cubic_values_split_into_tangents() -> anyhow::Result<()> {
    let mut cubic = channel(
        0,
        "translation",
        vec![0.0, 1.0],
        vec![
            // in, value, out for key 0
            0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0,
            // in, value, out for key 1
            1.0, 0.0, 0.0, 2.0, 0.0, 0.0, 0.0, 0.0, 0.0,
        ],
    );
    cubic.interpolation = InterpolationMode::Cubic;
    let clip = clip_with(vec![cubic]).build(None)?;

    let frames = clip.track(0).expect("track").translation.frames().to_vec();
    assert_eq!(frames[0].tangent_out, Vec3::X);
    assert_eq!(frames[1].tangent_in, Vec3::X);
    assert_eq!(frames[1].value, Vec3::new(2.0, 0.0, 0.0));
    Ok(())
}

#[test]
fn gltf_interpolation_names_are_accepted() -> anyhow::Result<()> {
    let json = r#"{ "target": 0, "path": "scale", "interpolation": "STEP", "times": [0.0], "values": [1,1,1] }"#;
    let desc: ChannelDesc = serde_json::from_str(json)?;
    assert_eq!(desc.interpolation, InterpolationMode::Constant);

    let json = r#"{ "target": 0, "path": "scale", "interpolation": "cubic", "times": [0.0], "values": [1,1,1] }"#;
    let desc: ChannelDesc = serde_json::from_str(json)?;
    assert_eq!(desc.interpolation, InterpolationMode::Cubic);
    Ok(())
}
