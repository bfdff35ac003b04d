//! Gaze angles for the eye sockets of a skin.
//!
//! Skins are authored in a 170x120 box whose centre sits on the entity
//! position. Both ends of the connection go through this module so the
//! constants below never disagree.

use std::f64::consts::{PI, TAU};

use glam::{DVec2, IVec2};

use crate::entity::{Entity, Facing};
use crate::skin::GazeCircle;

pub const SKIN_HALF_WIDTH: f64 = 85.0;
pub const SKIN_HALF_HEIGHT: f64 = 60.0;

/// World-space centre of a gaze circle.
///
/// Intrinsic rotation is applied in skin space, then the offset from the skin
/// centre is mirrored for left-facing entities.
pub fn eye_position(position: IVec2, facing: Facing, circle: &GazeCircle) -> DVec2 {
    let local = DVec2::new(circle.cx, circle.cy);
    let local = if circle.rotation != 0.0 {
        DVec2::from_angle(circle.rotation).rotate(local)
    } else {
        local
    };

    let offset = local - DVec2::new(SKIN_HALF_WIDTH, SKIN_HALF_HEIGHT);
    position.as_dvec2() + DVec2::new(facing.mirror_x(offset.x), offset.y)
}

/// Angle from one gaze circle to `target`, in the circle's unrotated frame.
pub fn gaze_angle(position: IVec2, facing: Facing, circle: &GazeCircle, target: DVec2) -> f64 {
    let eye = eye_position(position, facing, circle);
    let to_target = target - eye;
    let angle = facing.reflect_angle(to_target.y.atan2(to_target.x));
    wrap_angle(angle - circle.rotation)
}

/// One angle per circle, in circle order.
pub fn angles_for(entity: &Entity, circles: &[GazeCircle], target: DVec2) -> Vec<f64> {
    circles
        .iter()
        .map(|circle| gaze_angle(entity.position, entity.facing, circle, target))
        .collect()
}

/// Wraps into (-PI, PI].
pub fn wrap_angle(angle: f64) -> f64 {
    let mut wrapped = angle % TAU;
    if wrapped > PI {
        wrapped -= TAU;
    } else if wrapped <= -PI {
        wrapped += TAU;
    }
    wrapped
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::entity::EntityId;
    use crate::skin::Skin;

    const EPSILON: f64 = 1e-9;

    fn entity_at(x: i32, y: i32, facing: Facing) -> Entity {
        let mut entity = Entity::new(
            EntityId(1),
            IVec2::new(x, y),
            Arc::new(Skin::new("test.svg", "<svg/>")),
        );
        entity.facing = facing;
        entity
    }

    fn centred() -> GazeCircle {
        GazeCircle::new(SKIN_HALF_WIDTH, SKIN_HALF_HEIGHT, 5.0, 5.0)
    }

    #[test]
    fn centred_eye_looking_right() {
        let entity = entity_at(100, 100, Facing::Right);
        let angles = angles_for(&entity, &[centred()], DVec2::new(200.0, 100.0));
        assert_eq!(angles.len(), 1);
        assert!(angles[0].abs() < EPSILON);
    }

    #[test]
    fn flipped_entity_reflects_angle() {
        let entity = entity_at(100, 100, Facing::Left);
        let angles = angles_for(&entity, &[centred()], DVec2::new(200.0, 100.0));
        assert!((angles[0] - PI).abs() < EPSILON);
    }

    #[test]
    fn offset_eye_is_mirrored_when_facing_left() {
        let circle = GazeCircle::new(SKIN_HALF_WIDTH + 20.0, SKIN_HALF_HEIGHT, 5.0, 5.0);

        let right = eye_position(IVec2::new(0, 0), Facing::Right, &circle);
        let left = eye_position(IVec2::new(0, 0), Facing::Left, &circle);

        assert!((right - DVec2::new(20.0, 0.0)).length() < EPSILON);
        assert!((left - DVec2::new(-20.0, 0.0)).length() < EPSILON);
    }

    #[test]
    fn looking_down_is_positive_quarter_turn() {
        let entity = entity_at(0, 0, Facing::Right);
        let angles = angles_for(&entity, &[centred()], DVec2::new(0.0, 50.0));
        assert!((angles[0] - PI / 2.0).abs() < EPSILON);
    }

    #[test]
    fn rotation_is_removed_from_the_stored_angle() {
        // Rotating (cx, cy) by a quarter turn lands it on the skin centre.
        let circle = GazeCircle::new(SKIN_HALF_HEIGHT, -SKIN_HALF_WIDTH, 5.0, 5.0)
            .with_rotation(PI / 2.0);
        let entity = entity_at(0, 0, Facing::Right);

        assert!(eye_position(entity.position, entity.facing, &circle).length() < 1e-6);

        let angles = angles_for(&entity, &[circle], DVec2::new(10.0, 0.0));
        assert!((angles[0] + PI / 2.0).abs() < 1e-6);
    }

    #[test]
    fn rotated_eye_facing_left() {
        // The right eye of "standard issue", rotated 70 degrees.
        let circle = GazeCircle::new(87.682, -71.012, 16.0, 11.0).with_rotation(70f64.to_radians());

        let right = eye_position(IVec2::ZERO, Facing::Right, &circle);
        let left = eye_position(IVec2::ZERO, Facing::Left, &circle);
        assert!((right - DVec2::new(11.718, -1.893)).length() < 1e-3);
        assert!((left - DVec2::new(-right.x, right.y)).length() < EPSILON);

        let target = DVec2::new(200.0, 50.0);
        let to_target = target - left;
        let expected = wrap_angle(PI - to_target.y.atan2(to_target.x) - circle.rotation);

        let entity = entity_at(0, 0, Facing::Left);
        let angle = angles_for(&entity, &[circle], target)[0];
        assert!((angle - expected).abs() < EPSILON);
        assert!((angle - 1.679495).abs() < 1e-5);

        let entity = entity_at(0, 0, Facing::Right);
        let angle = angles_for(&entity, &[circle], target)[0];
        assert!((angle + 0.952792).abs() < 1e-5);
    }

    #[test]
    fn angles_stay_in_half_open_range() {
        let circle = centred().with_rotation(3.0);
        for facing in [Facing::Right, Facing::Left] {
            let entity = entity_at(0, 0, facing);
            for step in 0..32 {
                let theta = step as f64 * TAU / 32.0;
                let target = DVec2::new(theta.cos(), theta.sin()) * 100.0;
                let angle = angles_for(&entity, &[circle], target)[0];
                assert!(angle > -PI && angle <= PI, "angle {angle} out of range");
            }
        }
    }

    #[test]
    fn wrap_angle_bounds() {
        assert!((wrap_angle(PI) - PI).abs() < EPSILON);
        assert!((wrap_angle(-PI) - PI).abs() < EPSILON);
        assert!((wrap_angle(3.0 * PI / 2.0) + PI / 2.0).abs() < EPSILON);
        assert!(wrap_angle(0.0).abs() < EPSILON);
    }

    #[test]
    fn no_circles_no_angles() {
        let entity = entity_at(0, 0, Facing::Right);
        assert!(angles_for(&entity, &[], DVec2::ZERO).is_empty());
    }
}
