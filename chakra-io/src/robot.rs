//! A complete simulated robot: the real drivetrain wired to simulated
//! hardware, plus the control loop that ticks it.

use std::sync::Arc;
use std::time::Duration;

use chakra_drive::field::{LineUpTarget, StartingLocation, starting_pose};
use chakra_drive::hal::{AllianceProvider, VisionSource, WheelActuator};
use chakra_drive::{
    CenterOnTargetCommand, Command, MODULE_COUNT, OrbitCommand, PathfindLineUp, Pose2D,
    SharedDrive, SwerveDrive, SwerveKinematics,
};

use crate::config::AppConfig;
use crate::control_loop::ControlLoop;
use crate::error::Result;
use crate::sim::{ScriptedInput, SimGyro, SimMatch, SimPathFollower, SimVision, SimWheel, SimWorld};

pub struct SimRobot {
    pub config: AppConfig,
    pub world: SimWorld,
    pub control: ControlLoop,
    pub drive: SharedDrive,
    pub wheels: [SimWheel; MODULE_COUNT],
    pub gyro: SimGyro,
    pub vision: SimVision,
    pub match_info: SimMatch,
    pub input: ScriptedInput,
}

impl SimRobot {
    /// Build the robot at the starting pose the match context reports.
    pub fn new(config: AppConfig) -> Result<Self> {
        let match_info = SimMatch::new(
            config.sim.alliance,
            config.sim.location.and_then(StartingLocation::from_index),
        );
        let alliance = match_info.alliance();
        let start = starting_pose(alliance, match_info.starting_location());

        let geometry = &config.drive.geometry;
        let kinematics = SwerveKinematics::from_dimensions(geometry.wheel_base, geometry.track_width)?;

        let wheels: [SimWheel; MODULE_COUNT] = std::array::from_fn(SimWheel::new);
        let gyro = SimGyro::new();
        let vision = SimVision::new();
        let world = SimWorld::new(
            config.sim.clone(),
            kinematics,
            wheels.clone(),
            gyro.clone(),
            vision.clone(),
            start,
        );

        let actuators = wheels.clone().map(|w| Box::new(w) as Box<dyn WheelActuator>);
        let camera: Arc<dyn VisionSource> = Arc::new(vision.clone());
        let drive = SwerveDrive::new(&config.drive, actuators, Box::new(gyro.clone()), Some(camera), start)?
            .into_shared();

        let period = Duration::from_secs_f64(config.drive.limits.loop_period_s);
        let control = ControlLoop::new(Arc::clone(&drive), period);

        log::info!(
            "SimRobot: alliance {}, start ({:.2}, {:.2}, {:.1}°)",
            alliance.map_or("unknown".to_string(), |a| a.to_string()),
            start.x,
            start.y,
            start.theta.to_degrees()
        );

        Ok(Self {
            world,
            control,
            drive,
            wheels,
            gyro,
            vision,
            match_info,
            input: ScriptedInput::new(),
            config,
        })
    }

    pub fn period_s(&self) -> f64 {
        self.config.drive.limits.loop_period_s
    }

    /// Advance physics one period, then run one control tick.
    pub fn step(&mut self) -> Result<Pose2D> {
        self.world.step(self.period_s());
        self.control.tick(self.world.time_us())
    }

    /// Run `ticks` steps, stopping at the first error.
    pub fn run(&mut self, ticks: u64) -> Result<Pose2D> {
        let mut pose = self.drive.lock().pose();
        for _ in 0..ticks {
            pose = self.step()?;
        }
        Ok(pose)
    }

    /// Estimated pose.
    pub fn pose(&self) -> Pose2D {
        self.drive.lock().pose()
    }

    pub fn schedule(&mut self, command: Box<dyn Command>, timeout: Option<Duration>) -> Result<()> {
        self.control.runner_mut().schedule(command, timeout)
    }

    pub fn orbit(&self) -> OrbitCommand {
        OrbitCommand::new(
            Arc::clone(&self.drive),
            Box::new(self.input.clone()),
            Arc::new(self.match_info.clone()),
            &self.config.drive,
        )
    }

    pub fn center_on_target(&self) -> CenterOnTargetCommand {
        CenterOnTargetCommand::new(Arc::clone(&self.drive), Arc::new(self.vision.clone()), &self.config.drive)
    }

    /// Center with the configured timeout.
    pub fn schedule_center(&mut self) -> Result<()> {
        let timeout = Duration::from_secs_f64(self.config.drive.center.timeout_s);
        let command = Box::new(self.center_on_target());
        self.schedule(command, Some(timeout))
    }

    pub fn line_up(&self, target: LineUpTarget) -> PathfindLineUp {
        PathfindLineUp::new(
            Arc::clone(&self.drive),
            Box::new(SimPathFollower::new(Arc::clone(&self.drive), self.period_s())),
            Arc::new(self.match_info.clone()),
            target,
            self.config.drive.pathfind,
        )
    }
}
