//! Robot instances: realization of one placement into physics bodies,
//! part instances, and wheel states.

use std::ops::Range;
use std::path::{Path, PathBuf};

use nalgebra::Vector3;
use tracing::{info, warn};

use crate::mesh::{MeshCache, MeshSource};
use crate::part::PartInstance;
use iq_config::{ArticulatedSubmodel, DrivePorts, RobotDefinition, WheelAssembly};
use iq_ipc::ProgramBridge;
use iq_ldraw::{Assembly, color_rgb};
use iq_physics::{
    Drivetrain, DrivetrainConfig, PartCollider, RobotBody, RobotCollider, SubmodelCollider,
};
use iq_types::math::{LDU_TO_INCHES, cad_position_to_world, cad_rotation_to_world};
use iq_types::{CollisionState, Obb, PhysicsParams, RobotInput};

/// Millimeters per inch, for wheel diameters from robot definitions.
const MM_PER_INCH: f64 = 25.4;

/// Joint state of one articulated submodel (an arm, a claw). Articulation
/// is visual: the joint angle tracks the bound motor's reported encoder
/// position, clamped to the declared travel, and feeds the transform
/// builder. It does not enter the collision hierarchy.
#[derive(Debug, Clone)]
pub struct ArticulationState {
    /// Submodel name from the definition.
    pub name: String,
    /// Matching top-level submodel index in the assembly, if any.
    pub submodel: Option<usize>,
    /// Joint axis, CAD coordinates.
    pub axis: Vector3<f64>,
    /// Joint origin, pivot-relative, LDU.
    pub origin: Vector3<f64>,
    /// Travel limits in degrees `[min, max]`.
    pub limits_deg: [f64; 2],
    /// Motor port driving the joint, from the definition's motors list.
    pub port: Option<u8>,
    /// Current joint angle, radians.
    pub angle: f64,
}

impl ArticulationState {
    /// Track a reported motor position (degrees), clamped to the joint's
    /// travel.
    pub fn set_motor_position(&mut self, degrees: f64) {
        let [min, max] = self.limits_deg;
        let clamped = if min < max {
            degrees.clamp(min, max)
        } else {
            degrees
        };
        self.angle = clamped.to_radians();
    }
}

/// Spin state of one wheel assembly.
#[derive(Debug, Clone)]
pub struct WheelState {
    /// Accumulated spin angle, radians.
    pub spin_angle: f64,
    /// Wheel surface velocity from the drivetrain, inches/s.
    pub surface_vel: f64,
    /// Wheel radius, inches.
    pub radius: f64,
    /// Spin axis in CAD coordinates.
    pub spin_axis: Vector3<f64>,
    /// Sign correction for the spin-axis orientation (left and right
    /// wheels carry mirrored axes).
    pub axis_sign: f64,
    /// Whether this assembly is on the left side.
    pub is_left: bool,
}

/// How robot programs are launched.
///
/// The program file itself is interpreted; the simulator spawns
/// `interpreter [bridge_script] <program>` with piped stdio. A missing
/// interpreter or script demotes the robot to non-programmed.
#[derive(Debug, Clone)]
pub struct Launcher {
    /// Interpreter executable.
    pub interpreter: String,
    /// Optional bridge script handed to the interpreter before the program
    /// path.
    pub bridge_script: Option<PathBuf>,
}

impl Default for Launcher {
    fn default() -> Self {
        Self {
            interpreter: "python3".to_string(),
            bridge_script: std::env::var_os("IQ_SIM_BRIDGE").map(PathBuf::from),
        }
    }
}

impl Launcher {
    /// Spawn the program for one robot. Failure is startup-recoverable:
    /// the caller logs and continues with a non-programmed robot.
    pub fn spawn(&self, program: &Path) -> iq_ipc::Result<ProgramBridge> {
        let program = program.to_string_lossy();
        match &self.bridge_script {
            Some(script) => {
                let script = script.to_string_lossy();
                ProgramBridge::spawn(&self.interpreter, &[script.as_ref(), program.as_ref()])
            }
            None => ProgramBridge::spawn(&self.interpreter, &[program.as_ref()]),
        }
    }
}

/// One realized robot.
///
/// The matching [`RobotBody`] (pose + collision hierarchy) lives in the
/// orchestrator's parallel body vector so the collision engine can take
/// all bodies as one mutable slice.
#[derive(Debug)]
pub struct RobotInstance {
    /// Display name (the assembly's main model).
    pub name: String,
    /// The robot definition (defaults if the file was absent).
    pub definition: RobotDefinition,
    /// Resolved drive ports for IPC motor mapping.
    pub ports: DrivePorts,
    /// Whether the drivetrain has active dynamics.
    pub driving: bool,
    /// This robot's slice of the global part-instance vector.
    pub parts: Range<usize>,
    /// Wheel spin states, parallel to the definition's wheel assemblies.
    pub wheels: Vec<WheelState>,
    /// Articulated submodel joints.
    pub articulations: Vec<ArticulationState>,
    /// Chassis rotation axis in CAD coordinates.
    pub yaw_axis_cad: Vector3<f64>,
    /// Motor command for the current frame.
    pub input: RobotInput,
}

impl RobotInstance {
    /// Realize one robot placement: bake part instances into `parts_out`,
    /// build the collision hierarchy, compute the ground offset, and
    /// configure the drivetrain. Returns the instance and its physics
    /// body.
    #[allow(clippy::too_many_arguments)]
    pub fn realize(
        robot_index: usize,
        assembly: &Assembly,
        definition: RobotDefinition,
        ports: DrivePorts,
        world_position: &Vector3<f64>,
        yaw_deg: f64,
        physics: &PhysicsParams,
        parts_out: &mut Vec<PartInstance>,
        meshes: &mut MeshCache,
        source: &mut dyn MeshSource,
    ) -> (Self, RobotBody) {
        let pivot = definition.drivetrain.rotation_center;
        let part_start = parts_out.len();

        // Collider groups: one per top-level submodel, plus a trailing
        // group for parts placed directly in the main model.
        let mut groups: Vec<Vec<PartCollider>> = vec![Vec::new(); assembly.submodels.len() + 1];
        let mut lowest_y = f64::INFINITY;
        let mut skipped = 0_usize;

        for flat in &assembly.parts {
            let Some(mesh) = meshes.get(&flat.part_id, source) else {
                skipped += 1;
                continue;
            };
            let info = *meshes.info(mesh);

            let position_cad = flat.position - pivot;
            let rotation_world = cad_rotation_to_world(&flat.rotation);
            let position_local = cad_position_to_world(&position_cad);

            // Track the lowest mesh corner in the pivot-relative frame.
            let local_obb = Obb {
                center: nalgebra::Point3::from(
                    position_local
                        + rotation_world * nalgebra::center(&info.min_bounds, &info.max_bounds).coords,
                ),
                half_extents: (info.max_bounds - info.min_bounds) * 0.5,
                rotation: rotation_world,
            };
            for corner in local_obb.corners() {
                lowest_y = lowest_y.min(corner.y);
            }

            let index = parts_out.len();
            let wheel = wheel_assembly_for(&definition.wheel_assemblies, &flat.part_id, &flat.position);
            let group = flat.submodel.unwrap_or(assembly.submodels.len());
            groups[group].push(PartCollider::new(index, local_obb));

            parts_out.push(PartInstance {
                mesh,
                color: color_rgb(flat.color),
                position_cad,
                rotation_cad: flat.rotation,
                robot: Some(robot_index),
                wheel,
                submodel: flat.submodel,
                local_obb,
                state: CollisionState::None,
            });
        }

        if skipped > 0 {
            warn!(
                assembly = %assembly.name,
                skipped,
                "parts without meshes were skipped"
            );
        }

        // Lowest modeled point lands on Y = 0; the pivot stays the world
        // anchor in X/Z.
        let ground_offset = if lowest_y.is_finite() { -lowest_y } else { 0.0 };

        let collider = RobotCollider::new(
            groups
                .into_iter()
                .filter_map(SubmodelCollider::enclosing)
                .collect(),
        );

        let mut drivetrain = Drivetrain::new(drivetrain_config(&definition, physics));
        drivetrain.set_friction(physics.friction);
        drivetrain.set_position(world_position.x, world_position.z, yaw_deg.to_radians());

        let wheels = definition
            .wheel_assemblies
            .iter()
            .map(|assembly| wheel_state(assembly, &definition))
            .collect();

        let articulations = definition
            .submodels
            .iter()
            .filter(|s| s.has_kinematics)
            .map(|s| articulation_state(s, assembly, &definition, &pivot))
            .collect();

        let driving = definition.drivetrain.kind.drives();
        if !driving {
            info!(assembly = %assembly.name, "robot has no simulated drivetrain");
        }

        let instance = Self {
            name: assembly.name.clone(),
            yaw_axis_cad: definition.drivetrain.rotation_axis,
            definition,
            ports,
            driving,
            parts: part_start..parts_out.len(),
            wheels,
            articulations,
            input: RobotInput::stop(),
        };
        (instance, RobotBody::new(drivetrain, collider, ground_offset))
    }

    /// Articulation for an assembly submodel index, if one is bound.
    #[must_use]
    pub fn articulation_for_submodel(&self, submodel: usize) -> Option<&ArticulationState> {
        self.articulations
            .iter()
            .find(|a| a.submodel == Some(submodel))
    }

    /// Pull the drivetrain's wheel surface velocities into the per-wheel
    /// states and integrate spin angles.
    ///
    /// The spin rate is `surface_vel / radius`, sign-adjusted for the
    /// wheel's axis orientation and inverted while the robot turns in
    /// place (the sides run in opposite directions).
    pub fn integrate_wheel_spin(&mut self, drivetrain: &Drivetrain, dt: f64) {
        let turning_in_place = drivetrain.left_wheel_vel * drivetrain.right_wheel_vel < 0.0;

        for wheel in &mut self.wheels {
            wheel.surface_vel = if wheel.is_left {
                drivetrain.left_wheel_vel
            } else {
                drivetrain.right_wheel_vel
            };
            if wheel.radius <= 0.0 {
                continue;
            }

            let mut rate = (wheel.surface_vel / wheel.radius) * wheel.axis_sign;
            if turning_in_place {
                rate = -rate;
            }
            wheel.spin_angle += rate * dt;
        }
    }
}

/// Build the joint state for one articulated submodel: resolve its
/// assembly submodel by name, its driving motor port from the motors list,
/// and its joint origin relative to the chassis pivot.
fn articulation_state(
    articulated: &ArticulatedSubmodel,
    assembly: &Assembly,
    definition: &RobotDefinition,
    pivot: &Vector3<f64>,
) -> ArticulationState {
    let submodel = assembly
        .submodels
        .iter()
        .position(|s| s.name.eq_ignore_ascii_case(&articulated.name));
    if submodel.is_none() {
        warn!(
            submodel = %articulated.name,
            "articulated submodel not present in assembly"
        );
    }

    let port = definition
        .motors
        .iter()
        .find(|m| m.submodel.eq_ignore_ascii_case(&articulated.name))
        .and_then(|m| m.port);

    ArticulationState {
        name: articulated.name.clone(),
        submodel,
        axis: articulated.rotation_axis,
        origin: articulated.position + articulated.rotation_origin - pivot,
        limits_deg: articulated.rotation_limits,
        port,
        angle: 0.0,
    }
}

/// Wheel assembly a part belongs to: its id must appear in the assembly's
/// part list, and among candidates the nearest wheel center wins (all four
/// wheels usually share the same part numbers).
fn wheel_assembly_for(
    assemblies: &[WheelAssembly],
    part_id: &str,
    position_cad: &Vector3<f64>,
) -> Option<usize> {
    assemblies
        .iter()
        .enumerate()
        .filter(|(_, assembly)| {
            assembly
                .part_numbers
                .iter()
                .any(|p| p.eq_ignore_ascii_case(part_id))
        })
        .map(|(index, assembly)| ((assembly.center - position_cad).norm(), index))
        .min_by(|a, b| a.0.total_cmp(&b.0))
        .map(|(_, index)| index)
}

fn wheel_state(assembly: &WheelAssembly, definition: &RobotDefinition) -> WheelState {
    let diameter_mm = if assembly.outer_diameter_mm > 0.0 {
        assembly.outer_diameter_mm
    } else {
        definition.drivetrain.wheel_diameter
    };
    let radius = diameter_mm / MM_PER_INCH / 2.0;

    // Left and right wheels carry mirrored spin axes; normalize the spin
    // direction so equal surface velocities animate the same way.
    let dominant = if assembly.spin_axis.x.abs() >= assembly.spin_axis.z.abs() {
        assembly.spin_axis.x
    } else {
        assembly.spin_axis.z
    };

    WheelState {
        spin_angle: 0.0,
        surface_vel: 0.0,
        radius,
        spin_axis: assembly.spin_axis,
        axis_sign: if dominant < 0.0 { -1.0 } else { 1.0 },
        is_left: !assembly.side.is_right(),
    }
}

/// Drivetrain configuration from a definition and the scene's physics
/// constants, with LDU and millimeter fields converted to inches.
fn drivetrain_config(definition: &RobotDefinition, physics: &PhysicsParams) -> DrivetrainConfig {
    let mut config = DrivetrainConfig::default().with_gravity(physics.gravity);

    let track_in = definition.drivetrain.track_width * LDU_TO_INCHES;
    config = config.with_track_width(track_in);

    let diameter_mm = if definition.drivetrain.wheel_diameter > 0.0 {
        definition.drivetrain.wheel_diameter
    } else {
        definition
            .wheel_assemblies
            .iter()
            .map(|w| w.outer_diameter_mm)
            .fold(0.0, f64::max)
    };
    config = config.with_wheel_diameter(diameter_mm / MM_PER_INCH);

    config
}
