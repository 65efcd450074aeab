//! End-to-end command scenarios: orbit, center on target, path line-up.

mod common;

use approx::assert_relative_eq;
use chakra_drive::field::{Alliance, LineUpTarget, line_up_pose};
use chakra_drive::hal::{DriverInput, VisionSource};
use chakra_drive::{ChassisVelocity, Pose2D, Translation2D};
use chakra_io::RunOutcome;

#[test]
fn test_orbit_turns_short_way_across_wrap() {
    // Blue orbit point is (0, 5.55); from (2, 5.55) the bearing is 180°
    for (heading_deg, turn_sign) in [(-179.0, -1.0), (179.0, 1.0)] {
        let mut robot = common::quiet_robot(Some(Alliance::Blue), Some(2));
        common::place(&mut robot, Pose2D::from_degrees(2.0, 5.55, heading_deg));

        let orbit = Box::new(robot.orbit());
        robot.schedule(orbit, None).unwrap();
        robot.step().unwrap();

        let omega = robot.drive.lock().last_command().omega;
        assert!(
            omega * turn_sign > 0.0,
            "heading {heading_deg}°: expected turn sign {turn_sign}, got {omega}"
        );
        // One degree of error, not 359
        assert!(omega.abs() < 0.1, "heading {heading_deg}°: omega {omega} too large");
    }
}

#[test]
fn test_orbit_converges_on_point() {
    let mut robot = common::quiet_robot(Some(Alliance::Blue), Some(2));
    common::place(&mut robot, Pose2D::from_degrees(2.0, 4.0, 0.0));

    let orbit = Box::new(robot.orbit());
    robot.schedule(orbit, None).unwrap();
    robot.run(400).unwrap();

    let pose = robot.pose();
    let bearing = (5.55 - pose.y).atan2(0.0 - pose.x);
    let error = chakra_drive::core::math::angle_diff(pose.theta, bearing);
    assert!(error.abs() < 0.5, "still {error} rad off the orbit point");
    assert_eq!(robot.control.runner().active_name(), Some("Orbit"));
}

#[test]
fn test_orbit_unknown_alliance_holds_output() {
    let mut robot = common::quiet_robot(None, None);
    let held = ChassisVelocity::new(0.5, 0.0, 0.0);
    robot.drive.lock().set_chassis_velocity(held).unwrap();
    robot.input.set(DriverInput {
        x: 1.0,
        ..Default::default()
    });

    let orbit = Box::new(robot.orbit());
    robot.schedule(orbit, None).unwrap();
    robot.run(20).unwrap();

    assert_eq!(robot.drive.lock().last_command(), held);
    assert!(!robot.control.runner().is_idle());

    // Once the alliance arrives the same command starts aiming
    robot.match_info.set_alliance(Some(Alliance::Blue));
    robot.step().unwrap();
    let command = robot.drive.lock().last_command();
    assert_ne!(command, held);
    assert!(command.omega.abs() > 0.0);
}

#[test]
fn test_orbit_dpad_overrides_sticks() {
    let mut robot = common::quiet_robot(Some(Alliance::Blue), Some(2));
    robot.input.set(DriverInput {
        x: -1.0,
        pov: Some(0),
        ..Default::default()
    });
    let orbit = Box::new(robot.orbit());
    robot.schedule(orbit, None).unwrap();
    robot.step().unwrap();

    let command = robot.drive.lock().last_command();
    // dpad_speed 0.25 scaled by the orbit speed coefficient 0.25
    assert_relative_eq!(command.vx, 0.0625, epsilon = 1e-12);
    assert_relative_eq!(command.vy, 0.0, epsilon = 1e-12);
    assert_relative_eq!(command.omega, 0.0);
}

#[test]
fn test_center_without_target_finishes_in_place() {
    let mut robot = common::quiet_robot(None, None);
    robot.schedule_center().unwrap();

    assert_eq!(common::run_until_idle(&mut robot, 5), Some(1));
    assert_eq!(
        robot.control.runner().last_outcome(),
        Some(&RunOutcome::Finished("CenterOnTarget".to_string()))
    );
    robot.run(5).unwrap();
    assert_eq!(robot.world.pose(), Pose2D::identity());
}

#[test]
fn test_center_backs_up_to_target_area() {
    let mut robot = common::quiet_robot(None, None);
    // Rear camera: the object sits behind the robot
    robot.world.set_object(Some(Translation2D::new(-2.0, 0.0)));
    assert!(robot.vision.target_area() < 0.12);

    let center = Box::new(robot.center_on_target());
    robot.schedule(center, None).unwrap();
    let ticks = common::run_until_idle(&mut robot, 500);

    assert!(ticks.is_some(), "center never finished");
    assert_eq!(
        robot.control.runner().last_outcome(),
        Some(&RunOutcome::Finished("CenterOnTarget".to_string()))
    );
    let area = robot.vision.target_area();
    assert!((area - 0.12).abs() < 0.015, "area {area}");
    let x = robot.world.pose().x;
    assert!(x < -0.8 && x > -1.2, "stopped at x = {x}");
    assert_relative_eq!(robot.world.pose().y, 0.0, epsilon = 1e-9);
}

#[test]
fn test_center_times_out() {
    let mut robot = common::quiet_robot(None, None);
    // Too far to close within the 1.5 s timeout
    robot.world.set_object(Some(Translation2D::new(-3.0, 0.0)));
    robot.schedule_center().unwrap();

    assert_eq!(common::run_until_idle(&mut robot, 200), Some(75));
    assert_eq!(
        robot.control.runner().last_outcome(),
        Some(&RunOutcome::TimedOut("CenterOnTarget".to_string()))
    );
}

#[test]
fn test_line_up_unknown_alliance_finishes_immediately() {
    let mut robot = common::quiet_robot(None, None);
    let line_up = Box::new(robot.line_up(LineUpTarget::Amp));
    robot.schedule(line_up, None).unwrap();

    assert_eq!(common::run_until_idle(&mut robot, 5), Some(1));
    assert_eq!(robot.world.pose(), Pose2D::identity());
}

#[test]
fn test_line_up_reaches_speaker_pose() {
    let mut robot = common::quiet_robot(Some(Alliance::Blue), Some(2));
    let line_up = Box::new(robot.line_up(LineUpTarget::Speaker));
    robot.schedule(line_up, None).unwrap();

    let ticks = common::run_until_idle(&mut robot, 1500);
    assert!(ticks.is_some(), "line-up never arrived");
    assert_eq!(
        robot.control.runner().last_outcome(),
        Some(&RunOutcome::Finished("PathfindLineUp".to_string()))
    );

    let goal = line_up_pose(Alliance::Blue, LineUpTarget::Speaker);
    let pose = robot.pose();
    assert!(common::translation_error(&pose, &goal) < 0.06, "arrived at {pose:?}");
    assert!(chakra_drive::core::math::angle_diff(pose.theta, goal.theta).abs() < 0.04);
    for wheel in &robot.wheels {
        assert_eq!(wheel.command().0, 0.0);
    }
}

#[test]
fn test_line_up_cancel_stops_modules() {
    let mut robot = common::quiet_robot(Some(Alliance::Red), Some(2));
    let line_up = Box::new(robot.line_up(LineUpTarget::Amp));
    robot.schedule(line_up, None).unwrap();
    robot.run(20).unwrap();
    assert!(robot.wheels.iter().any(|w| w.command().0 != 0.0));

    robot.control.runner_mut().cancel();
    for wheel in &robot.wheels {
        assert_eq!(wheel.command().0, 0.0);
    }
}
