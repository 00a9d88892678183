//! Robot definition (`.robotdef`) schema.
//!
//! A robot definition is the static, read-only description of one chassis:
//! drivetrain geometry (pivot, rotation axis, track width), the wheel
//! assemblies that spin with each side, motor-to-submodel bindings, and any
//! articulated submodels. Only the drivetrain geometry and wheel assemblies
//! feed the dynamics; the rest is retained for IPC metadata.

use std::fs;
use std::path::Path;

use nalgebra::Vector3;
use tracing::{info, warn};

use crate::error::{ConfigError, Result};
use crate::indent::{Document, Node};
use iq_types::{DrivetrainKind, Side};

/// Counts from the definition's `summary` block.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Summary {
    /// Total wheel count.
    pub total_wheels: u32,
    /// Total motor count.
    pub total_motors: u32,
    /// Total sensor count.
    pub total_sensors: u32,
    /// Whether the model includes a brain unit.
    pub has_brain: bool,
}

/// Drivetrain geometry in CAD (LDU) coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct DrivetrainGeometry {
    /// Drive family; only tank has dynamics.
    pub kind: DrivetrainKind,
    /// Name of the left drive submodel.
    pub left_drive: String,
    /// Name of the right drive submodel.
    pub right_drive: String,
    /// Pivot point the chassis yaws about, in LDU.
    pub rotation_center: Vector3<f64>,
    /// Yaw axis; vertical unless the definition says otherwise.
    pub rotation_axis: Vector3<f64>,
    /// Track width in LDU.
    pub track_width: f64,
    /// Wheel diameter in millimeters (0 when unspecified).
    pub wheel_diameter: f64,
}

impl Default for DrivetrainGeometry {
    fn default() -> Self {
        Self {
            kind: DrivetrainKind::Unknown,
            left_drive: String::new(),
            right_drive: String::new(),
            rotation_center: Vector3::zeros(),
            rotation_axis: Vector3::new(0.0, 1.0, 0.0),
            track_width: 0.0,
            wheel_diameter: 0.0,
        }
    }
}

/// One motor entry: which submodel it lives in and which brain port drives
/// it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MotorBinding {
    /// Submodel name the motor belongs to.
    pub submodel: String,
    /// Brain port 1-12, `None` when unassigned (`port: null`).
    pub port: Option<u8>,
    /// Number of motors in the submodel.
    pub count: u32,
}

/// Kinematics of an articulated submodel (an arm, a claw).
#[derive(Debug, Clone, PartialEq)]
pub struct ArticulatedSubmodel {
    /// Submodel name (matches the assembly's section names).
    pub name: String,
    /// Placement position in LDU.
    pub position: Vector3<f64>,
    /// Local rotation axis; zero when the submodel is rigid.
    pub rotation_axis: Vector3<f64>,
    /// Pivot point in local coordinates.
    pub rotation_origin: Vector3<f64>,
    /// Travel limits in degrees `[min, max]`.
    pub rotation_limits: [f64; 2],
    /// Whether a rotation axis was declared.
    pub has_kinematics: bool,
}

/// One wheel assembly: the parts that spin together about a common axis.
#[derive(Debug, Clone, PartialEq)]
pub struct WheelAssembly {
    /// Assembly id from the definition (e.g. `left_front`).
    pub id: String,
    /// Drive side, inferred from the id ("left" anywhere in it).
    pub side: Side,
    /// Wheel center in LDU.
    pub center: Vector3<f64>,
    /// Unit spin axis in CAD coordinates.
    pub spin_axis: Vector3<f64>,
    /// Outer diameter in millimeters.
    pub outer_diameter_mm: f64,
    /// Part ids participating in the spin transform (composite `c##`
    /// suffixes already stripped).
    pub part_numbers: Vec<String>,
}

/// A complete robot definition.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RobotDefinition {
    /// Format version.
    pub version: u32,
    /// CAD file this definition was generated from.
    pub source_file: String,
    /// Main model name.
    pub main_model: String,
    /// Summary counts.
    pub summary: Summary,
    /// Drivetrain geometry.
    pub drivetrain: DrivetrainGeometry,
    /// Motor bindings.
    pub motors: Vec<MotorBinding>,
    /// Articulated submodels.
    pub submodels: Vec<ArticulatedSubmodel>,
    /// Wheel assemblies.
    pub wheel_assemblies: Vec<WheelAssembly>,
}

impl RobotDefinition {
    /// Find a wheel assembly by id.
    #[must_use]
    pub fn wheel_assembly(&self, id: &str) -> Option<&WheelAssembly> {
        self.wheel_assemblies.iter().find(|w| w.id == id)
    }

    /// Motor port bound to the given drivetrain side, resolved from the
    /// motors list against the `left_drive`/`right_drive` submodel names.
    #[must_use]
    pub fn drive_port(&self, side: Side) -> Option<u8> {
        let submodel = match side {
            Side::Left => &self.drivetrain.left_drive,
            Side::Right => &self.drivetrain.right_drive,
        };
        if submodel.is_empty() {
            return None;
        }
        self.motors
            .iter()
            .find(|m| m.submodel.eq_ignore_ascii_case(submodel))
            .and_then(|m| m.port)
    }
}

/// Load a robot definition from disk.
pub fn load_robotdef_file(path: impl AsRef<Path>) -> Result<RobotDefinition> {
    let path = path.as_ref();
    let text =
        fs::read_to_string(path).map_err(|e| ConfigError::io(path.display().to_string(), e))?;
    let def = parse_robotdef_str(&text)?;
    info!(
        path = %path.display(),
        wheels = def.wheel_assemblies.len(),
        motors = def.motors.len(),
        "loaded robot definition"
    );
    Ok(def)
}

/// Parse a robot definition from text.
pub fn parse_robotdef_str(input: &str) -> Result<RobotDefinition> {
    let doc = Document::parse(input);
    if doc.is_empty() {
        return Err(ConfigError::empty("robot definition"));
    }

    let mut def = RobotDefinition::default();

    if let Some(version) = doc.root("version").and_then(Node::u32_value) {
        def.version = version;
    }
    if let Some(source) = doc.root_value("source_file") {
        def.source_file = source.to_string();
    }
    if let Some(main) = doc.root_value("main_model") {
        def.main_model = main.to_string();
    }

    if let Some(summary) = doc.root("summary") {
        def.summary = parse_summary(summary);
    }
    if let Some(drivetrain) = doc.root("drivetrain") {
        def.drivetrain = parse_drivetrain(drivetrain);
    }
    if let Some(motors) = doc.root("motors") {
        def.motors = motors.list_items().filter_map(parse_motor).collect();
    }
    if let Some(submodels) = doc.root("submodels") {
        def.submodels = submodels.children.iter().map(parse_submodel).collect();
    }
    if let Some(assemblies) = doc.root("wheel_assemblies") {
        def.wheel_assemblies = assemblies.children.iter().map(parse_wheel).collect();
    }

    Ok(def)
}

fn parse_summary(node: &Node) -> Summary {
    Summary {
        total_wheels: node
            .child("total_wheels")
            .and_then(Node::u32_value)
            .unwrap_or(0),
        total_motors: node
            .child("total_motors")
            .and_then(Node::u32_value)
            .unwrap_or(0),
        total_sensors: node
            .child("total_sensors")
            .and_then(Node::u32_value)
            .unwrap_or(0),
        has_brain: node
            .child("has_brain")
            .and_then(Node::bool_value)
            .unwrap_or(false),
    }
}

fn parse_drivetrain(node: &Node) -> DrivetrainGeometry {
    let mut geometry = DrivetrainGeometry::default();

    match node.child_value("type") {
        Some(value) if value.starts_with("tank") => geometry.kind = DrivetrainKind::Tank,
        Some(value) if value.starts_with("mecanum") => geometry.kind = DrivetrainKind::Mecanum,
        Some(value) if value.starts_with("omni") => geometry.kind = DrivetrainKind::Omni,
        Some(value) if value.starts_with("ackermann") => geometry.kind = DrivetrainKind::Ackermann,
        Some(value) => warn!(value, "unknown drivetrain type"),
        None => {}
    }

    if let Some(left) = node.child_value("left_drive") {
        geometry.left_drive = left.to_string();
    }
    if let Some(right) = node.child_value("right_drive") {
        geometry.right_drive = right.to_string();
    }
    if let Some(center) = node.child("rotation_center").and_then(Node::vec3_value) {
        geometry.rotation_center = center;
    }
    if let Some(axis) = node.child("rotation_axis").and_then(Node::vec3_value) {
        geometry.rotation_axis = axis;
    }
    if let Some(track) = node.child("track_width").and_then(Node::f64_value) {
        geometry.track_width = track;
    }
    if let Some(diameter) = node.child("wheel_diameter").and_then(Node::f64_value) {
        geometry.wheel_diameter = diameter;
    }

    geometry
}

fn parse_motor(item: &Node) -> Option<MotorBinding> {
    // Items are `- submodel: <name>` followed by port/count.
    if item.key != "submodel" {
        return None;
    }
    let submodel = item.str_value()?.to_string();
    let port = match item.child_value("port") {
        Some("null") | None => None,
        Some(value) => value.parse::<u8>().ok(),
    };
    let count = item.child("count").and_then(Node::u32_value).unwrap_or(1);
    Some(MotorBinding {
        submodel,
        port,
        count,
    })
}

fn parse_submodel(node: &Node) -> ArticulatedSubmodel {
    let rotation_axis = node.child("rotation_axis").and_then(Node::vec3_value);
    ArticulatedSubmodel {
        name: node.key.clone(),
        position: node
            .child("position")
            .and_then(Node::vec3_value)
            .unwrap_or_else(Vector3::zeros),
        rotation_axis: rotation_axis.unwrap_or_else(Vector3::zeros),
        rotation_origin: node
            .child("rotation_origin")
            .and_then(Node::vec3_value)
            .unwrap_or_else(Vector3::zeros),
        rotation_limits: node
            .child("rotation_limits")
            .and_then(Node::vec2_value)
            .unwrap_or([0.0, 0.0]),
        has_kinematics: rotation_axis.is_some(),
    }
}

fn parse_wheel(node: &Node) -> WheelAssembly {
    let id = node.key.clone();
    let side = if id.to_ascii_lowercase().contains("left") {
        Side::Left
    } else {
        Side::Right
    };

    let part_numbers = node
        .child("parts")
        .map(|parts| {
            parts
                .list_items()
                .filter(|item| item.key == "part")
                .filter_map(Node::str_value)
                .map(strip_composite_suffix)
                .collect()
        })
        .unwrap_or_default();

    WheelAssembly {
        id,
        side,
        center: node
            .child("world_position")
            .and_then(Node::vec3_value)
            .unwrap_or_else(Vector3::zeros),
        spin_axis: node
            .child("spin_axis")
            .and_then(Node::vec3_value)
            .unwrap_or_else(|| Vector3::new(1.0, 0.0, 0.0)),
        outer_diameter_mm: node
            .child("outer_diameter_mm")
            .and_then(Node::f64_value)
            .unwrap_or(0.0),
        part_numbers,
    }
}

/// Strip a trailing `c##` composite-part suffix (`228-2500-208c01` names the
/// same mesh as `228-2500-208`).
fn strip_composite_suffix(part: &str) -> String {
    let bytes = part.as_bytes();
    if bytes.len() > 3 {
        let tail = &bytes[bytes.len() - 3..];
        if tail[0] == b'c' && tail[1].is_ascii_digit() && tail[2].is_ascii_digit() {
            return part[..part.len() - 3].to_string();
        }
    }
    part.to_string()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]
mod tests {
    use super::*;

    const DEF: &str = "\
version: 1
source_file: ClawbotIQ.mpd
main_model: ClawbotIQ
summary:
  total_wheels: 4
  total_motors: 4
  total_sensors: 2
  has_brain: true
drivetrain:
  type: tank
  left_drive: LeftSideDrive.ldr
  right_drive: RightSideDrive.ldr
  rotation_center: [0, -32, 40]
  rotation_axis: [0, 1, 0]
  track_width: 440
  wheel_diameter: 200
motors:
  - submodel: LeftSideDrive.ldr
    port: 1
    count: 1
  - submodel: RightSideDrive.ldr
    port: 6
    count: 1
  - submodel: Arm.ldr
    port: null
    count: 1
submodels:
  Arm.ldr:
    position: [0, -60, -20]
    rotation_axis: [1, 0, 0]
    rotation_origin: [0, 0, 0]
    rotation_limits: [-10, 80]
wheel_assemblies:
  left_front:
    world_position: [-220, -20, 120]
    spin_axis: [1, 0, 0]
    outer_diameter_mm: 200
    parts:
      - part: 228-2500-208c01
      - part: 228-2500-209
  right_front:
    world_position: [220, -20, 120]
    spin_axis: [-1, 0, 0]
    outer_diameter_mm: 200
    parts:
      - part: 228-2500-208c02
";

    #[test]
    fn test_full_definition() {
        let def = parse_robotdef_str(DEF).unwrap();

        assert_eq!(def.version, 1);
        assert_eq!(def.main_model, "ClawbotIQ");
        assert_eq!(def.summary.total_wheels, 4);
        assert!(def.summary.has_brain);

        assert_eq!(def.drivetrain.kind, DrivetrainKind::Tank);
        assert_eq!(def.drivetrain.track_width, 440.0);
        assert_eq!(def.drivetrain.rotation_center.y, -32.0);

        assert_eq!(def.motors.len(), 3);
        assert_eq!(def.motors[0].port, Some(1));
        assert_eq!(def.motors[2].port, None);

        assert_eq!(def.submodels.len(), 1);
        assert!(def.submodels[0].has_kinematics);
        assert_eq!(def.submodels[0].rotation_limits, [-10.0, 80.0]);

        assert_eq!(def.wheel_assemblies.len(), 2);
        let left = def.wheel_assembly("left_front").unwrap();
        assert_eq!(left.side, Side::Left);
        assert_eq!(left.part_numbers, vec!["228-2500-208", "228-2500-209"]);
        let right = def.wheel_assembly("right_front").unwrap();
        assert_eq!(right.side, Side::Right);
    }

    #[test]
    fn test_drive_port_resolution() {
        let def = parse_robotdef_str(DEF).unwrap();
        assert_eq!(def.drive_port(Side::Left), Some(1));
        assert_eq!(def.drive_port(Side::Right), Some(6));
    }

    #[test]
    fn test_default_is_non_driving() {
        let def = RobotDefinition::default();
        assert_eq!(def.drivetrain.kind, DrivetrainKind::Unknown);
        assert!(!def.drivetrain.kind.drives());
        assert_eq!(def.drivetrain.rotation_axis, Vector3::new(0.0, 1.0, 0.0));
        assert_eq!(def.drive_port(Side::Left), None);
    }

    #[test]
    fn test_composite_suffix_stripping() {
        assert_eq!(strip_composite_suffix("228-2500-208c01"), "228-2500-208");
        assert_eq!(strip_composite_suffix("228-2500-208"), "228-2500-208");
        assert_eq!(strip_composite_suffix("c01"), "c01");
    }

    #[test]
    fn test_empty_document_is_error() {
        assert!(parse_robotdef_str("# nothing\n").is_err());
    }
}
