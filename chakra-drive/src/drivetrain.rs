//! The swerve drivetrain: four modules, a gyro, optional vision, and the
//! pose estimator that ties them together.
//!
//! Commands reach it through [`SharedDrive`]. Only the control tick calls
//! [`SwerveDrive::periodic`], so pose state has a single writer.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::config::{DriveConfig, LimitsConfig};
use crate::core::{ChassisVelocity, Pose2D, WheelPosition, WheelState};
use crate::dynamics::correct_for_dynamics;
use crate::error::Result;
use crate::estimator::{FusionOutcome, PoseEstimator, VisionFrame};
use crate::hal::{Gyro, VisionSource, WheelActuator};
use crate::kinematics::{MODULE_COUNT, SwerveKinematics, desaturate};
use crate::module::SwerveModule;

/// Drivetrain handle shared between the control loop and commands.
pub type SharedDrive = Arc<Mutex<SwerveDrive>>;

pub struct SwerveDrive {
    limits: LimitsConfig,
    kinematics: SwerveKinematics,
    modules: [SwerveModule; MODULE_COUNT],
    gyro: Box<dyn Gyro>,
    vision: Option<Arc<dyn VisionSource>>,
    estimator: PoseEstimator,
    last_command: ChassisVelocity,
    last_fusion: Option<FusionOutcome>,
}

impl SwerveDrive {
    /// Build the drivetrain and seed the estimator at `initial_pose`.
    ///
    /// Actuators are given in kinematics order (see
    /// [`crate::kinematics::MODULE_NAMES`]).
    pub fn new(
        config: &DriveConfig,
        actuators: [Box<dyn WheelActuator>; MODULE_COUNT],
        gyro: Box<dyn Gyro>,
        vision: Option<Arc<dyn VisionSource>>,
        initial_pose: Pose2D,
    ) -> Result<Self> {
        let kinematics =
            SwerveKinematics::from_dimensions(config.geometry.wheel_base, config.geometry.track_width)?;

        let mut index = 0;
        let modules = actuators.map(|a| {
            let m = SwerveModule::new(index, a);
            index += 1;
            m
        });

        let heading = gyro.heading()?;
        let positions = read_positions(&modules)?;
        let estimator = PoseEstimator::new(
            config.estimator.clone(),
            kinematics.clone(),
            heading,
            positions,
            initial_pose,
        );

        log::info!(
            "SwerveDrive: initialized at ({:.2}, {:.2}, {:.1}°)",
            initial_pose.x,
            initial_pose.y,
            initial_pose.theta.to_degrees()
        );

        Ok(Self {
            limits: config.limits.clone(),
            kinematics,
            modules,
            gyro,
            vision,
            estimator,
            last_command: ChassisVelocity::zero(),
            last_fusion: None,
        })
    }

    pub fn into_shared(self) -> SharedDrive {
        Arc::new(Mutex::new(self))
    }

    pub fn kinematics(&self) -> &SwerveKinematics {
        &self.kinematics
    }

    /// Current pose estimate.
    pub fn pose(&self) -> Pose2D {
        self.estimator.pose()
    }

    /// Gyro-derived field heading in radians.
    pub fn heading(&self) -> f64 {
        self.estimator.pose().theta
    }

    /// Last robot-relative velocity requested, before correction.
    pub fn last_command(&self) -> ChassisVelocity {
        self.last_command
    }

    /// Outcome of the most recent vision fusion attempt.
    pub fn last_fusion(&self) -> Option<FusionOutcome> {
        self.last_fusion
    }

    /// Drive at a robot-relative velocity for the next tick.
    ///
    /// The command is corrected for discretization, converted to wheel
    /// states, and desaturated before reaching the modules.
    pub fn set_chassis_velocity(&mut self, velocity: ChassisVelocity) -> Result<()> {
        self.last_command = velocity;
        let corrected = correct_for_dynamics(&velocity, self.limits.loop_period_s);
        let states = self.kinematics.to_wheel_states(&corrected);
        self.set_module_states(states)
    }

    /// Desaturate and dispatch wheel states.
    pub fn set_module_states(&mut self, mut states: [WheelState; MODULE_COUNT]) -> Result<()> {
        let factor = desaturate(&mut states, self.limits.max_module_speed);
        if factor < 1.0 {
            log::trace!("SwerveDrive: desaturated by {factor:.3}");
        }
        for (module, state) in self.modules.iter_mut().zip(states) {
            module.set_desired_state(state)?;
        }
        Ok(())
    }

    /// Stop every module, even if one of them fails.
    pub fn stop(&mut self) -> Result<()> {
        self.last_command = ChassisVelocity::zero();
        let mut first_err = None;
        for module in &mut self.modules {
            if let Err(e) = module.stop() {
                log::error!("SwerveDrive: module {} failed to stop: {e}", module.index());
                first_err.get_or_insert(e);
            }
        }
        first_err.map_or(Ok(()), Err)
    }

    pub fn module_positions(&self) -> Result<[WheelPosition; MODULE_COUNT]> {
        read_positions(&self.modules)
    }

    pub fn module_states(&self) -> Result<[WheelState; MODULE_COUNT]> {
        let mut states = [WheelState::default(); MODULE_COUNT];
        for (slot, module) in states.iter_mut().zip(&self.modules) {
            *slot = module.get_state()?;
        }
        Ok(states)
    }

    /// One control tick: integrate odometry, then offer the latest vision
    /// frame to the estimator.
    ///
    /// If the gyro or a module stops reporting, the modules are stopped
    /// before the error is returned.
    pub fn periodic(&mut self, now_us: u64) -> Result<Pose2D> {
        let sensed = self
            .gyro
            .heading()
            .and_then(|heading| Ok((heading, self.module_positions()?)));
        let (heading, positions) = match sensed {
            Ok(v) => v,
            Err(e) => {
                log::error!("SwerveDrive: lost feedback, stopping: {e}");
                if let Err(stop_err) = self.stop() {
                    log::error!("SwerveDrive: stop after feedback loss failed: {stop_err}");
                }
                return Err(e);
            }
        };

        let pose = self.estimator.update(now_us, heading, positions);

        if let Some(vision) = &self.vision {
            let frame = VisionFrame::capture(vision.as_ref());
            self.last_fusion = Some(self.estimator.fuse_vision(&frame, now_us));
            return Ok(self.estimator.pose());
        }
        Ok(pose)
    }

    pub fn zero_heading(&mut self) -> Result<()> {
        self.set_heading(0.0)
    }

    /// Redefine the current heading, keeping the translation.
    pub fn set_heading(&mut self, heading_deg: f64) -> Result<()> {
        let heading = heading_deg.to_radians();
        self.gyro.reset_heading(heading)?;
        let positions = self.module_positions()?;
        let pose = self.estimator.pose().with_theta(heading);
        self.estimator.reset(heading, positions, pose);
        log::info!("SwerveDrive: heading set to {heading_deg:.1}°");
        Ok(())
    }

    pub fn reset_pose(&mut self, pose: Pose2D) -> Result<()> {
        let heading = self.gyro.heading()?;
        let positions = self.module_positions()?;
        self.estimator.reset(heading, positions, pose);
        log::info!(
            "SwerveDrive: pose reset to ({:.2}, {:.2}, {:.1}°)",
            pose.x,
            pose.y,
            pose.theta.to_degrees()
        );
        Ok(())
    }

    /// Snap translation to the vision pose, keeping the gyro heading.
    ///
    /// Returns `false` without changing anything when vision has no pose.
    pub fn reset_translation_to_vision(&mut self) -> Result<bool> {
        let Some(estimate) = self.vision.as_ref().and_then(|v| v.pose_estimate()) else {
            return Ok(false);
        };
        if estimate.pose.translation().is_origin() {
            return Ok(false);
        }
        let pose = estimate.pose.with_theta(self.heading());
        self.reset_pose(pose)?;
        Ok(true)
    }

    /// Zero every drive encoder without moving the pose estimate.
    pub fn zero_drive_encoders(&mut self) -> Result<()> {
        let heading = self.gyro.heading()?;
        // Motion since the last tick is only on the old counts
        let pose = self.estimator.catch_up(heading, self.module_positions()?);
        for module in &mut self.modules {
            module.zero_drive_encoder()?;
        }
        let positions = self.module_positions()?;
        self.estimator.reset(heading, positions, pose);
        log::info!("SwerveDrive: drive encoders zeroed");
        Ok(())
    }
}

fn read_positions(modules: &[SwerveModule; MODULE_COUNT]) -> Result<[WheelPosition; MODULE_COUNT]> {
    let mut positions = [WheelPosition::default(); MODULE_COUNT];
    for (slot, module) in positions.iter_mut().zip(modules) {
        *slot = module.get_position()?;
    }
    Ok(positions)
}
