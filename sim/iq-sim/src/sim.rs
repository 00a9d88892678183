//! The simulator: scene realization plus the per-frame loop.

use std::path::Path;

use tracing::{info, warn};

use crate::error::Result;
use crate::input::{OperatorInput, fold_triggers, gamepad_tank, keyboard_tank};
use crate::mesh::{MeshCache, MeshSource};
use crate::part::PartInstance;
use crate::render::{CylinderRender, PartRender, RenderFrame, RobotStatus};
use crate::robot::{Launcher, RobotInstance};
use crate::transform::{ArticulationSpin, WheelSpin, build_part_transform, cylinder_transform};
use iq_config::{DrivePorts, RobotDefinition, Scene, load_drive_config_file, load_robotdef_file};
use iq_ipc::{ProgramBridge, robot_input_from_state};
use iq_ldraw::load_assembly_file;
use iq_physics::{Cylinder, Field, RobotBody, collision, step_cylinders};
use iq_types::{PhysicsParams, Side};

/// Frame time cap: a window stall must not explode the integrators.
const MAX_FRAME_DT: f64 = 0.1;

/// The whole simulation: robots, parts, cylinders, bridges, and the frame
/// loop. Exclusively owns all mutable state; the rendering layer only ever
/// sees [`RenderFrame`] snapshots.
pub struct Simulator {
    scene_name: String,
    field: Field,
    physics: PhysicsParams,
    settings: collision::CollisionSettings,
    robots: Vec<RobotInstance>,
    bodies: Vec<RobotBody>,
    parts: Vec<PartInstance>,
    cylinders: Vec<Cylinder>,
    cylinder_colors: Vec<[f64; 3]>,
    bridges: Vec<Option<ProgramBridge>>,
    meshes: MeshCache,
    active_robot: Option<usize>,
    collision_debug: bool,
    time: f64,
}

impl Simulator {
    /// Load a scene file and realize it. Paths inside the scene resolve
    /// relative to the scene file's directory.
    pub fn from_scene_file(
        path: impl AsRef<Path>,
        source: &mut dyn MeshSource,
        launcher: Option<&Launcher>,
    ) -> Result<Self> {
        let path = path.as_ref();
        let scene = iq_config::load_scene_file(path)?;
        let scene_dir = path.parent().unwrap_or_else(|| Path::new("."));
        Self::realize(&scene, scene_dir, source, launcher)
    }

    /// Realize a loaded scene: assemblies, definitions, colliders, ground
    /// offsets, cylinders, and (optionally) robot-program bridges.
    ///
    /// Failure taxonomy per the simulator's rules: an unreadable assembly
    /// is fatal; a missing robot definition, drive-port map, or program
    /// degrades that robot and continues.
    pub fn realize(
        scene: &Scene,
        scene_dir: &Path,
        source: &mut dyn MeshSource,
        launcher: Option<&Launcher>,
    ) -> Result<Self> {
        let mut meshes = MeshCache::new();
        let mut parts = Vec::new();
        let mut robots = Vec::new();
        let mut bodies = Vec::new();
        let mut bridges = Vec::new();

        for (index, placement) in scene.robots.iter().enumerate() {
            let assembly = load_assembly_file(scene_dir.join(&placement.assembly))?;

            let definition_path = scene_dir.join(placement.definition_path());
            let definition = match load_robotdef_file(&definition_path) {
                Ok(definition) => definition,
                Err(e) => {
                    warn!(
                        path = %definition_path.display(),
                        %e,
                        "robot definition unavailable, using non-driving defaults"
                    );
                    RobotDefinition::default()
                }
            };

            // The definition's motors list is authoritative for drive
            // ports; the .config map fills unassigned sides.
            let mut ports = DrivePorts {
                left: definition.drive_port(Side::Left),
                right: definition.drive_port(Side::Right),
            };
            if let Some(config) = &placement.config {
                match load_drive_config_file(scene_dir.join(config)) {
                    Ok(fallback) => ports = ports.or(fallback),
                    Err(e) => warn!(%e, "drive-port map unavailable"),
                }
            }

            let (robot, body) = RobotInstance::realize(
                index,
                &assembly,
                definition,
                ports,
                &placement.position,
                placement.yaw_deg,
                &scene.physics,
                &mut parts,
                &mut meshes,
                source,
            );

            let bridge = match (&placement.program, launcher) {
                (Some(program), Some(launcher)) => {
                    match launcher.spawn(&scene_dir.join(program)) {
                        Ok(bridge) => Some(bridge),
                        Err(e) => {
                            warn!(%e, "program spawn failed, robot is non-programmed");
                            None
                        }
                    }
                }
                _ => None,
            };

            robots.push(robot);
            bodies.push(body);
            bridges.push(bridge);
        }

        let cylinders = scene
            .cylinders
            .iter()
            .map(|c| Cylinder::new(c.x, c.z, c.radius, c.height, c.mass))
            .collect();
        let cylinder_colors = scene.cylinders.iter().map(|c| c.color).collect();

        let active_robot = scene.first_programmed_robot();
        info!(
            scene = %scene.name,
            robots = robots.len(),
            parts = parts.len(),
            active = ?active_robot,
            "scene realized"
        );

        Ok(Self {
            scene_name: scene.name.clone(),
            field: Field::default(),
            physics: scene.physics,
            settings: collision::CollisionSettings::default(),
            robots,
            bodies,
            parts,
            cylinders,
            cylinder_colors,
            bridges,
            meshes,
            active_robot,
            collision_debug: false,
            time: 0.0,
        })
    }

    /// Advance one frame. `dt` is clamped to 0.1 s.
    pub fn step(&mut self, dt: f64, input: &OperatorInput) {
        let dt = dt.clamp(0.0, MAX_FRAME_DT);
        self.time += dt;

        // 1. Ingest: IPC inbound and operator toggles.
        for bridge in self.bridges.iter_mut().flatten() {
            bridge.pump();
        }
        if input.toggle_collision_debug {
            self.collision_debug = !self.collision_debug;
            info!(enabled = self.collision_debug, "collision overlay toggled");
        }
        if let Some(key) = input.select_robot {
            self.select_robot(key);
        }

        // 2. Resolve per-robot motor commands.
        for (index, robot) in self.robots.iter_mut().enumerate() {
            match self.bridges[index].as_mut() {
                Some(bridge) if bridge.is_connected() => {
                    if self.active_robot == Some(index) {
                        if let Some((axes, buttons)) = input.gamepad {
                            let buttons =
                                fold_triggers(buttons, input.triggers.0, input.triggers.1);
                            bridge.send_gamepad(axes, buttons);
                        }
                    }
                    bridge.send_tick(dt);
                    robot.input = robot_input_from_state(bridge.state(), robot.ports);

                    // Articulated joints track their motors' reported
                    // encoder positions.
                    for articulation in &mut robot.articulations {
                        if let Some(port) = articulation.port {
                            articulation.set_motor_position(bridge.state().motor_position(port));
                        }
                    }
                }
                // A disconnected program freezes the motors at the last
                // command.
                Some(_) => {}
                None => {
                    let mut command = keyboard_tank(index, &input.keyboard);
                    // Robot 0 also answers to the gamepad when the
                    // keyboard is idle.
                    if index == 0 && command == iq_types::RobotInput::stop() {
                        if let Some((axes, _)) = input.gamepad {
                            command = gamepad_tank(&axes);
                        }
                    }
                    robot.input = command;
                }
            }
        }

        // 3. Step drivetrains.
        for (robot, body) in self.robots.iter().zip(&mut self.bodies) {
            if robot.driving {
                body.drivetrain
                    .set_motors(robot.input.left_pct, robot.input.right_pct);
            } else {
                body.drivetrain.set_motors(0.0, 0.0);
            }
            body.drivetrain.step(dt);
        }

        // 4. Collision response, sub-stepped.
        collision::resolve(
            &mut self.bodies,
            &mut self.cylinders,
            &self.field,
            &self.settings,
        );

        // 5. Cylinder physics.
        step_cylinders(&mut self.cylinders, &self.field, &self.physics, dt);

        // 6. Wheel spin integration.
        for (robot, body) in self.robots.iter_mut().zip(&self.bodies) {
            robot.integrate_wheel_spin(&body.drivetrain, dt);
        }

        // 7. Detection pass, purely for the overlay.
        if self.collision_debug {
            collision::detect_and_mark(&mut self.bodies, &self.cylinders, &self.field);
            self.sync_collision_states();
        }
    }

    /// Snapshot everything the rendering layer needs this frame.
    #[must_use]
    pub fn render_frame(&self) -> RenderFrame {
        let mut frame = RenderFrame::with_capacity(self.parts.len(), self.cylinders.len());
        frame.active_robot = self.active_robot;
        frame.collision_overlay = self.collision_debug;

        for part in &self.parts {
            let Some(robot_index) = part.robot else {
                continue;
            };
            let robot = &self.robots[robot_index];
            let body = &self.bodies[robot_index];

            let spin = part.wheel.map(|w| WheelSpin {
                axis: robot.wheels[w].spin_axis,
                angle: robot.wheels[w].spin_angle,
            });
            let articulation = part
                .submodel
                .and_then(|s| robot.articulation_for_submodel(s))
                .map(|joint| ArticulationSpin {
                    axis: joint.axis,
                    origin: joint.origin,
                    angle: joint.angle,
                });

            frame.parts.push(PartRender {
                mesh: part.mesh,
                transform: build_part_transform(
                    &part.position_cad,
                    &part.rotation_cad,
                    spin,
                    articulation,
                    &robot.yaw_axis_cad,
                    body.drivetrain.yaw,
                    &body.world_translation(),
                ),
                color: part.color,
                state: part.state,
            });
        }

        for (cylinder, color) in self.cylinders.iter().zip(&self.cylinder_colors) {
            frame.cylinders.push(CylinderRender {
                transform: cylinder_transform(
                    cylinder.x,
                    cylinder.z,
                    cylinder.radius,
                    cylinder.height,
                ),
                color: *color,
            });
        }

        for (index, robot) in self.robots.iter().enumerate() {
            let bridge = self.bridges[index].as_ref();
            frame.robots.push(RobotStatus {
                name: robot.name.clone(),
                driving: robot.driving,
                slipping: self.bodies[index].drivetrain.is_slipping(),
                programmed: bridge.is_some(),
                connected: bridge.is_some_and(|b| b.is_connected()),
                project: bridge.map_or_else(String::new, |b| b.state().project.clone()),
                status: bridge.map_or_else(String::new, |b| b.state().status.clone()),
            });
        }

        frame
    }

    /// Switch the active robot to placement `key` (1-based). Placements
    /// without a program can't take operator input; the switch is a no-op
    /// reported to the operator.
    pub fn select_robot(&mut self, key: u8) {
        let index = usize::from(key.saturating_sub(1));
        if index < self.robots.len() && self.bridges[index].is_some() {
            self.active_robot = Some(index);
            info!(robot = index, name = %self.robots[index].name, "active robot switched");
        } else {
            warn!(key, "cannot switch: placement has no program");
        }
    }

    /// Copy collider collision states back onto the rendered parts.
    fn sync_collision_states(&mut self) {
        for body in &self.bodies {
            for collider in body.collider.parts() {
                if let Some(part) = self.parts.get_mut(collider.key) {
                    part.state = collider.state;
                }
            }
        }
    }

    /// Graceful teardown: notify every program, then reap the children.
    pub fn shutdown(self) {
        for bridge in self.bridges.into_iter().flatten() {
            bridge.shutdown();
        }
        info!(scene = %self.scene_name, "simulator shut down");
    }

    /// Scene display name.
    #[must_use]
    pub fn scene_name(&self) -> &str {
        &self.scene_name
    }

    /// Elapsed simulated time, seconds.
    #[must_use]
    pub fn time(&self) -> f64 {
        self.time
    }

    /// Realized robots.
    #[must_use]
    pub fn robots(&self) -> &[RobotInstance] {
        &self.robots
    }

    /// Physics bodies, parallel to [`Simulator::robots`].
    #[must_use]
    pub fn bodies(&self) -> &[RobotBody] {
        &self.bodies
    }

    /// Part instances.
    #[must_use]
    pub fn parts(&self) -> &[PartInstance] {
        &self.parts
    }

    /// Field cylinders.
    #[must_use]
    pub fn cylinders(&self) -> &[Cylinder] {
        &self.cylinders
    }

    /// Mesh cache statistics for the operator display.
    #[must_use]
    pub fn mesh_count(&self) -> usize {
        self.meshes.len()
    }

    /// Scene physics constants.
    #[must_use]
    pub fn physics(&self) -> &PhysicsParams {
        &self.physics
    }

    /// Currently active robot, if any placement declared a program.
    #[must_use]
    pub fn active_robot(&self) -> Option<usize> {
        self.active_robot
    }

    /// Whether any robot program is still connected.
    #[must_use]
    pub fn any_program_connected(&self) -> bool {
        self.bridges
            .iter()
            .flatten()
            .any(ProgramBridge::is_connected)
    }

    /// Whether any placement spawned a program at all.
    #[must_use]
    pub fn any_program_spawned(&self) -> bool {
        self.bridges.iter().any(Option::is_some)
    }
}
