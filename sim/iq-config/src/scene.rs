//! Scene (`.scene`) schema.
//!
//! A scene enumerates robot placements (assembly file, world position, yaw,
//! optional program and drive-port map) and movable field cylinders, plus
//! the physics constants of the field.

use std::fs;
use std::path::{Path, PathBuf};

use nalgebra::Vector3;
use tracing::info;

use crate::error::{ConfigError, Result};
use crate::indent::{Document, Node};
use iq_types::PhysicsParams;

/// Default mass of a field cylinder in pounds (a light plastic cup).
pub const DEFAULT_CYLINDER_MASS: f64 = 0.1;

/// One robot placement.
#[derive(Debug, Clone, PartialEq)]
pub struct RobotPlacement {
    /// Assembly document path (relative to the scene file's directory).
    pub assembly: PathBuf,
    /// World position in inches.
    pub position: Vector3<f64>,
    /// Yaw about the vertical axis in degrees.
    pub yaw_deg: f64,
    /// Robot program path; a placement without one is a static robot.
    pub program: Option<PathBuf>,
    /// Optional drive-port map path.
    pub config: Option<PathBuf>,
}

impl RobotPlacement {
    /// Whether this placement declares a robot program.
    #[must_use]
    pub fn has_program(&self) -> bool {
        self.program.is_some()
    }

    /// Conventional robot definition path: the assembly path with a
    /// `robotdef` extension.
    #[must_use]
    pub fn definition_path(&self) -> PathBuf {
        self.assembly.with_extension("robotdef")
    }
}

/// One movable cylinder.
#[derive(Debug, Clone, PartialEq)]
pub struct CylinderSpec {
    /// X position on the field, inches.
    pub x: f64,
    /// Z position on the field, inches.
    pub z: f64,
    /// Radius in inches.
    pub radius: f64,
    /// Height in inches.
    pub height: f64,
    /// RGB color in `0.0..=1.0`.
    pub color: [f64; 3],
    /// Mass in pounds.
    pub mass: f64,
}

/// A loaded scene.
#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    /// Display name.
    pub name: String,
    /// Field physics constants.
    pub physics: PhysicsParams,
    /// Robot placements in declaration order.
    pub robots: Vec<RobotPlacement>,
    /// Field cylinders in declaration order.
    pub cylinders: Vec<CylinderSpec>,
}

impl Default for Scene {
    fn default() -> Self {
        Self {
            name: "Unnamed Scene".to_string(),
            physics: PhysicsParams::default(),
            robots: Vec::new(),
            cylinders: Vec::new(),
        }
    }
}

impl Scene {
    /// Index of the first placement with a program, the initial active
    /// robot.
    #[must_use]
    pub fn first_programmed_robot(&self) -> Option<usize> {
        self.robots.iter().position(RobotPlacement::has_program)
    }
}

/// Load a scene from disk.
pub fn load_scene_file(path: impl AsRef<Path>) -> Result<Scene> {
    let path = path.as_ref();
    let text =
        fs::read_to_string(path).map_err(|e| ConfigError::io(path.display().to_string(), e))?;
    let scene = parse_scene_str(&text)?;
    info!(
        path = %path.display(),
        name = %scene.name,
        robots = scene.robots.len(),
        cylinders = scene.cylinders.len(),
        friction = scene.physics.friction,
        "loaded scene"
    );
    Ok(scene)
}

/// Parse a scene from text.
pub fn parse_scene_str(input: &str) -> Result<Scene> {
    let doc = Document::parse(input);
    if doc.is_empty() {
        return Err(ConfigError::empty("scene"));
    }

    let mut scene = Scene::default();

    if let Some(name) = doc.root_value("name") {
        scene.name = name.to_string();
    }

    if let Some(physics) = doc.root("physics") {
        if let Some(friction) = physics.child("friction").and_then(Node::f64_value) {
            scene.physics.friction = friction;
        }
        if let Some(friction) = physics.child("cylinder_friction").and_then(Node::f64_value) {
            scene.physics.cylinder_friction = friction;
        }
        if let Some(gravity) = physics.child("gravity").and_then(Node::f64_value) {
            scene.physics.gravity = gravity;
        }
    }

    if let Some(robots) = doc.root("robots") {
        scene.robots = robots.list_items().filter_map(parse_robot).collect();
    }
    if let Some(cylinders) = doc.root("cylinders") {
        scene.cylinders = cylinders.list_items().filter_map(parse_cylinder).collect();
    }

    Ok(scene)
}

fn parse_robot(item: &Node) -> Option<RobotPlacement> {
    // Items open with `- mpd: <path>`.
    if item.key != "mpd" {
        return None;
    }
    let assembly = PathBuf::from(item.str_value()?);

    Some(RobotPlacement {
        assembly,
        position: item
            .child("position")
            .and_then(Node::vec3_value)
            .unwrap_or_else(Vector3::zeros),
        yaw_deg: item
            .child("rotation")
            .and_then(Node::f64_value)
            .unwrap_or(0.0),
        program: item.child_value("iqpython").map(PathBuf::from),
        config: item.child_value("config").map(PathBuf::from),
    })
}

fn parse_cylinder(item: &Node) -> Option<CylinderSpec> {
    // Items open with `- position: [x, z]`.
    if item.key != "position" {
        return None;
    }
    let [x, z] = item.vec2_value()?;

    let color = item
        .child("color")
        .and_then(Node::floats_value)
        .filter(|floats| floats.len() >= 3)
        .map_or([1.0, 1.0, 1.0], |floats| [floats[0], floats[1], floats[2]]);

    Some(CylinderSpec {
        x,
        z,
        radius: item.child("radius").and_then(Node::f64_value).unwrap_or(1.0),
        height: item.child("height").and_then(Node::f64_value).unwrap_or(1.0),
        color,
        mass: DEFAULT_CYLINDER_MASS,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]
mod tests {
    use super::*;

    const SCENE: &str = "\
name: Practice Field

physics:
  friction: 0.85
  cylinder_friction: 0.6
  gravity: 386.1

robots:
  - mpd: ClawbotIQ.mpd
    position: [-20, 0, 0]
    rotation: 90
    iqpython: ClawbotIQ.iqpython
    config: ClawbotIQ.config
  - mpd: BaseBot.mpd
    position: [20, 0, 0]
    rotation: -90

cylinders:
  - position: [-30, -20]
    radius: 2
    height: 7
    color: [0.9, 0.2, 0.2]
  - position: [0, 10]
    radius: 2
    height: 7
";

    #[test]
    fn test_full_scene() {
        let scene = parse_scene_str(SCENE).unwrap();

        assert_eq!(scene.name, "Practice Field");
        assert_eq!(scene.physics.friction, 0.85);
        assert_eq!(scene.physics.cylinder_friction, 0.6);

        assert_eq!(scene.robots.len(), 2);
        let first = &scene.robots[0];
        assert_eq!(first.position.x, -20.0);
        assert_eq!(first.yaw_deg, 90.0);
        assert!(first.has_program());
        assert_eq!(
            first.definition_path(),
            PathBuf::from("ClawbotIQ.robotdef")
        );
        assert!(!scene.robots[1].has_program());

        assert_eq!(scene.cylinders.len(), 2);
        assert_eq!(scene.cylinders[0].color, [0.9, 0.2, 0.2]);
        assert_eq!(scene.cylinders[1].color, [1.0, 1.0, 1.0]);
        assert_eq!(scene.cylinders[0].mass, DEFAULT_CYLINDER_MASS);
    }

    #[test]
    fn test_active_robot_selection() {
        let scene = parse_scene_str(SCENE).unwrap();
        assert_eq!(scene.first_programmed_robot(), Some(0));

        let no_programs = parse_scene_str(
            "robots:\n\
             \x20\x20- mpd: A.mpd\n",
        )
        .unwrap();
        assert_eq!(no_programs.first_programmed_robot(), None);
    }

    #[test]
    fn test_defaults_apply() {
        let scene = parse_scene_str("name: Empty\n").unwrap();
        assert_eq!(scene.physics.friction, 0.8);
        assert_eq!(scene.physics.gravity, 386.1);
        assert!(scene.robots.is_empty());
    }
}
