//! Collision detection and response.
//!
//! Two passes share the per-robot box hierarchy:
//!
//! - **Response** (always runs): positional correction and velocity
//!   constraints. Robot-robot works at submodel level only (cheap inner
//!   loop in dense contact), walls drill into parts, cylinders take one-way
//!   momentum. Corrections below the dead-zone tolerance are skipped so a
//!   correction never reintroduces an equal-and-opposite contact next
//!   frame. The pass is iterated a few times per frame to converge stacked
//!   contacts.
//! - **Detection** (debug visualization only): the full hierarchy walk that
//!   classifies submodels and parts as touching, for colored rendering.
//!
//! Response communicates with the drivetrains only through their contact
//! slots and pose fields; it never applies forces directly to velocity
//! except to zero components into a surface.

use tracing::trace;

use crate::collider::RobotBody;
use crate::cylinder::Cylinder;
use crate::field::Field;
use iq_types::CollisionState;

/// Tuning knobs for the response pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollisionSettings {
    /// Penetration below this is not corrected, inches. Breaks the
    /// oscillation where each correction causes the opposite contact.
    pub dead_zone: f64,
    /// Response iterations per frame.
    pub iterations: usize,
    /// Fraction of the robot's normal velocity transferred into a pushed
    /// cylinder.
    pub cylinder_transfer: f64,
}

impl Default for CollisionSettings {
    fn default() -> Self {
        Self {
            dead_zone: 0.15,
            iterations: 4,
            cylinder_transfer: 0.8,
        }
    }
}

/// Run the sub-stepped response pass over all bodies.
pub fn resolve(
    bodies: &mut [RobotBody],
    cylinders: &mut [Cylinder],
    field: &Field,
    settings: &CollisionSettings,
) {
    for iteration in 0..settings.iterations.max(1) {
        let mut any = false;
        any |= resolve_robot_robot(bodies, settings);
        any |= resolve_robot_walls(bodies, field, settings);
        any |= resolve_robot_cylinders(bodies, cylinders, settings);
        if !any {
            trace!(iteration, "collision response converged");
            break;
        }
    }

    for body in bodies.iter_mut() {
        body.drivetrain.sanitize();
    }
}

/// Robot-robot response at submodel level: find the deepest overlapping
/// submodel pair per robot pair, push both robots apart along the axis of
/// minimum penetration, split 50/50.
fn resolve_robot_robot(bodies: &mut [RobotBody], settings: &CollisionSettings) -> bool {
    let mut corrected = false;

    for i in 0..bodies.len() {
        for j in (i + 1)..bodies.len() {
            let (head, tail) = bodies.split_at_mut(j);
            let a = &mut head[i];
            let b = &mut tail[0];

            // Deepest submodel-pair overlap for this robot pair.
            let mut deepest: Option<(f64, usize)> = None; // (depth, axis 0=x 2=z)
            for sa in 0..a.collider.submodels.len() {
                let obb_a = a.world_submodel_obb(sa);
                for sb in 0..b.collider.submodels.len() {
                    let obb_b = b.world_submodel_obb(sb);
                    if !obb_a.intersects(&obb_b) {
                        continue;
                    }
                    let Some(depths) = obb_a
                        .enclosing_aabb()
                        .overlap_depths(&obb_b.enclosing_aabb())
                    else {
                        continue;
                    };
                    // Robots move on the floor plane: choose between X and Z.
                    let (depth, axis) = if depths.x <= depths.z {
                        (depths.x, 0)
                    } else {
                        (depths.z, 2)
                    };
                    if deepest.map_or(true, |(best, _)| depth > best) {
                        deepest = Some((depth, axis));
                    }
                }
            }

            let Some((depth, axis)) = deepest else {
                continue;
            };

            // Normal on robot A, pointing away from robot B.
            let (nx, nz) = if axis == 0 {
                let sign = if a.drivetrain.pos_x <= b.drivetrain.pos_x {
                    -1.0
                } else {
                    1.0
                };
                (sign, 0.0)
            } else {
                let sign = if a.drivetrain.pos_z <= b.drivetrain.pos_z {
                    -1.0
                } else {
                    1.0
                };
                (0.0, sign)
            };

            // Opposite-signed contact normals, armed even inside the dead
            // zone so the drivetrains keep attenuating into the contact.
            a.drivetrain.set_contact(nx, nz);
            b.drivetrain.set_contact(-nx, -nz);

            if depth <= settings.dead_zone {
                continue;
            }

            let push = (depth - settings.dead_zone) / 2.0;
            a.drivetrain.pos_x += nx * push;
            a.drivetrain.pos_z += nz * push;
            b.drivetrain.pos_x -= nx * push;
            b.drivetrain.pos_z -= nz * push;
            corrected = true;
        }
    }

    corrected
}

/// Robot-wall response: broad-phase submodels against the wall slabs, then
/// take the worst single-part penetration per wall and push the robot back
/// inside. Velocity into the wall is zeroed.
fn resolve_robot_walls(
    bodies: &mut [RobotBody],
    field: &Field,
    settings: &CollisionSettings,
) -> bool {
    let mut corrected = false;

    for body in bodies.iter_mut() {
        for wall in field.walls() {
            let mut worst = 0.0_f64;

            for (si, submodel) in body.collider.submodels.iter().enumerate() {
                if !body.world_submodel_obb(si).intersects_aabb(&wall.aabb) {
                    continue;
                }
                for pi in 0..submodel.parts.len() {
                    let part_aabb = body.world_part_obb(si, pi).enclosing_aabb();
                    worst = worst.max(field.wall_penetration(&part_aabb, &wall));
                }
            }

            if worst <= 0.0 {
                continue;
            }

            let (nx, nz) = wall.normal;
            let drivetrain = &mut body.drivetrain;

            // Kill the velocity component into the wall and arm the
            // contact whether or not a positional correction is due.
            let into = drivetrain.vel_x * nx + drivetrain.vel_z * nz;
            if into < 0.0 {
                drivetrain.vel_x -= into * nx;
                drivetrain.vel_z -= into * nz;
            }
            drivetrain.set_contact(nx, nz);

            if worst <= settings.dead_zone {
                continue;
            }

            let push = worst - settings.dead_zone;
            drivetrain.pos_x += nx * push;
            drivetrain.pos_z += nz * push;
            corrected = true;
        }
    }

    corrected
}

/// Robot-cylinder response: one-way momentum transfer (robots are heavy,
/// cylinders are light) plus cylinder push-out along the contact normal.
fn resolve_robot_cylinders(
    bodies: &mut [RobotBody],
    cylinders: &mut [Cylinder],
    settings: &CollisionSettings,
) -> bool {
    let mut corrected = false;

    for body in bodies.iter_mut() {
        for cylinder in cylinders.iter_mut() {
            let Some((depth, nx, nz)) = deepest_cylinder_contact(body, cylinder) else {
                continue;
            };

            // Transfer the robot's approach velocity into the cylinder.
            let drivetrain = &body.drivetrain;
            let approach = drivetrain.vel_x * nx + drivetrain.vel_z * nz;
            if approach > 0.0 {
                let target = approach * settings.cylinder_transfer;
                let current = cylinder.vel_x * nx + cylinder.vel_z * nz;
                if target > current {
                    cylinder.vel_x += (target - current) * nx;
                    cylinder.vel_z += (target - current) * nz;
                }
            }

            // Push the cylinder out of penetration; the robot is not
            // arrested.
            if depth > settings.dead_zone {
                let push = depth - settings.dead_zone;
                cylinder.x += nx * push;
                cylinder.z += nz * push;
                corrected = true;
            }
        }
    }

    corrected
}

/// Deepest part-level contact between a robot and a cylinder:
/// `(penetration, normal_x, normal_z)` with the normal pointing from the
/// robot toward the cylinder.
fn deepest_cylinder_contact(body: &RobotBody, cylinder: &Cylinder) -> Option<(f64, f64, f64)> {
    let mut best: Option<(f64, f64, f64)> = None;

    for (si, submodel) in body.collider.submodels.iter().enumerate() {
        let broad = body.world_submodel_obb(si);
        if !broad.intersects_circle_xz(cylinder.x, cylinder.z, cylinder.radius) {
            continue;
        }

        for pi in 0..submodel.parts.len() {
            let part = body.world_part_obb(si, pi);
            let (cx, cz) = part.closest_point_xz(cylinder.x, cylinder.z);
            let dx = cylinder.x - cx;
            let dz = cylinder.z - cz;
            let dist = (dx * dx + dz * dz).sqrt();
            if dist >= cylinder.radius {
                continue;
            }

            let depth = cylinder.radius - dist;
            let (nx, nz) = if dist > 1e-9 {
                (dx / dist, dz / dist)
            } else {
                // Cylinder center inside the part box: fall back to the
                // robot-center direction.
                let fx = cylinder.x - body.drivetrain.pos_x;
                let fz = cylinder.z - body.drivetrain.pos_z;
                let norm = (fx * fx + fz * fz).sqrt().max(1e-9);
                (fx / norm, fz / norm)
            };

            if best.map_or(true, |(d, _, _)| depth > d) {
                best = Some((depth, nx, nz));
            }
        }
    }

    best
}

/// Full hierarchical detection, marking collision states on submodels and
/// parts for debug rendering. Runs only when the operator enables the
/// collision overlay.
pub fn detect_and_mark(bodies: &mut [RobotBody], cylinders: &[Cylinder], field: &Field) {
    for body in bodies.iter_mut() {
        body.collider.clear_states();
    }

    mark_robot_robot(bodies);
    mark_externals(bodies, cylinders, field);
}

fn mark_robot_robot(bodies: &mut [RobotBody]) {
    for i in 0..bodies.len() {
        for j in (i + 1)..bodies.len() {
            let (head, tail) = bodies.split_at_mut(j);
            let a = &mut head[i];
            let b = &mut tail[0];

            for sa in 0..a.collider.submodels.len() {
                let obb_a = a.world_submodel_obb(sa);
                for sb in 0..b.collider.submodels.len() {
                    let obb_b = b.world_submodel_obb(sb);
                    if !obb_a.intersects(&obb_b) {
                        continue;
                    }

                    upgrade(&mut a.collider.submodels[sa].state, CollisionState::SubmodelTouch);
                    upgrade(&mut b.collider.submodels[sb].state, CollisionState::SubmodelTouch);

                    // Narrow phase: the submodels' parts against each other.
                    for pa in 0..a.collider.submodels[sa].parts.len() {
                        let part_a = a.world_part_obb(sa, pa);
                        for pb in 0..b.collider.submodels[sb].parts.len() {
                            let part_b = b.world_part_obb(sb, pb);
                            if part_a.intersects(&part_b) {
                                upgrade(
                                    &mut a.collider.submodels[sa].parts[pa].state,
                                    CollisionState::PartTouch,
                                );
                                upgrade(
                                    &mut b.collider.submodels[sb].parts[pb].state,
                                    CollisionState::PartTouch,
                                );
                            }
                        }
                    }
                }
            }
        }
    }
}

fn mark_externals(bodies: &mut [RobotBody], cylinders: &[Cylinder], field: &Field) {
    for body in bodies.iter_mut() {
        for si in 0..body.collider.submodels.len() {
            let broad = body.world_submodel_obb(si);

            for wall in field.walls() {
                if !broad.intersects_aabb(&wall.aabb) {
                    continue;
                }
                upgrade(
                    &mut body.collider.submodels[si].state,
                    CollisionState::ExternalTouch,
                );
                for pi in 0..body.collider.submodels[si].parts.len() {
                    if body.world_part_obb(si, pi).intersects_aabb(&wall.aabb) {
                        upgrade(
                            &mut body.collider.submodels[si].parts[pi].state,
                            CollisionState::ExternalTouch,
                        );
                    }
                }
            }

            for cylinder in cylinders {
                if !broad.intersects_circle_xz(cylinder.x, cylinder.z, cylinder.radius) {
                    continue;
                }
                upgrade(
                    &mut body.collider.submodels[si].state,
                    CollisionState::ExternalTouch,
                );
                for pi in 0..body.collider.submodels[si].parts.len() {
                    let part = body.world_part_obb(si, pi);
                    if part.intersects_circle_xz(cylinder.x, cylinder.z, cylinder.radius) {
                        upgrade(
                            &mut body.collider.submodels[si].parts[pi].state,
                            CollisionState::ExternalTouch,
                        );
                    }
                }
            }
        }
    }
}

/// Replace a state only with a higher-priority one.
fn upgrade(slot: &mut CollisionState, new: CollisionState) {
    if rank(new) > rank(*slot) {
        *slot = new;
    }
}

fn rank(state: CollisionState) -> u8 {
    match state {
        CollisionState::None => 0,
        CollisionState::SubmodelTouch => 1,
        CollisionState::PartTouch => 2,
        CollisionState::ExternalTouch => 3,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use crate::collider::{PartCollider, RobotCollider, SubmodelCollider};
    use crate::drivetrain::Drivetrain;
    use iq_types::Obb;
    use nalgebra::Point3;

    /// A 10x4x10 inch box robot centered on its pivot.
    fn box_robot(x: f64, z: f64) -> RobotBody {
        let part = PartCollider::new(
            0,
            Obb::from_bounds(Point3::new(-5.0, 0.0, -5.0), Point3::new(5.0, 4.0, 5.0)),
        );
        let submodel = SubmodelCollider::enclosing(vec![part]).unwrap();
        let mut body = RobotBody::new(Drivetrain::default(), RobotCollider::new(vec![submodel]), 0.0);
        body.drivetrain.set_position(x, z, 0.0);
        body
    }

    #[test]
    fn test_dead_zone_skips_small_penetration() {
        let settings = CollisionSettings::default();
        // Overlap of 0.14 on X: below the dead zone.
        let mut bodies = [box_robot(0.0, 0.0), box_robot(9.86, 0.0)];
        let mut cylinders: [Cylinder; 0] = [];
        resolve(&mut bodies, &mut cylinders, &Field::default(), &settings);
        assert_eq!(bodies[0].drivetrain.pos_x, 0.0);
        assert_eq!(bodies[1].drivetrain.pos_x, 9.86);
    }

    #[test]
    fn test_above_dead_zone_corrects_the_excess() {
        let settings = CollisionSettings {
            iterations: 1,
            ..Default::default()
        };
        // Overlap of 0.16 on X: correction of 0.01 split between the two.
        let mut bodies = [box_robot(0.0, 0.0), box_robot(9.84, 0.0)];
        let mut cylinders: [Cylinder; 0] = [];
        resolve(&mut bodies, &mut cylinders, &Field::default(), &settings);

        let moved_a = -bodies[0].drivetrain.pos_x;
        let moved_b = bodies[1].drivetrain.pos_x - 9.84;
        approx::assert_relative_eq!(moved_a + moved_b, 0.01, epsilon = 1e-9);
        approx::assert_relative_eq!(moved_a, moved_b, epsilon = 1e-9);

        // Contact flags with opposite normals.
        assert!(bodies[0].drivetrain.in_contact);
        assert!(bodies[1].drivetrain.in_contact);
        assert_eq!(
            bodies[0].drivetrain.contact_normal_x,
            -bodies[1].drivetrain.contact_normal_x
        );
    }

    #[test]
    fn test_wall_response_pushes_inside_and_zeroes_velocity() {
        let settings = CollisionSettings::default();
        let field = Field::default();
        // Robot half-width 5, so the +X face pokes 1 inch through the wall.
        let mut bodies = [box_robot(32.0, 0.0)];
        bodies[0].drivetrain.vel_x = 20.0;
        let mut cylinders: [Cylinder; 0] = [];

        resolve(&mut bodies, &mut cylinders, &field, &settings);

        let drivetrain = &bodies[0].drivetrain;
        // Pushed back so the residual penetration is within the dead zone.
        assert!(drivetrain.pos_x <= 32.0 - (1.0 - settings.dead_zone) + 1e-9);
        assert!(drivetrain.vel_x <= 0.0);
        assert!(drivetrain.in_contact);
        assert_eq!(drivetrain.contact_normal_x, -1.0);
        assert_eq!(drivetrain.contact_normal_z, 0.0);
    }

    #[test]
    fn test_cylinder_takes_momentum_and_separation() {
        let settings = CollisionSettings::default();
        let field = Field::default();
        let mut bodies = [box_robot(0.0, 0.0)];
        bodies[0].drivetrain.vel_z = 10.0;
        // Cylinder overlapping the robot's +Z face by 1 inch.
        let mut cylinders = [Cylinder::new(0.0, 6.0, 2.0, 7.0, 0.1)];

        resolve(&mut bodies, &mut cylinders, &field, &settings);

        let cylinder = &cylinders[0];
        assert!(cylinder.vel_z > 0.0, "cylinder should be pushed forward");
        approx::assert_relative_eq!(cylinder.vel_z, 8.0, epsilon = 1e-9);
        assert!(cylinder.z > 6.0, "cylinder should be separated");
        // One-way transfer: the robot keeps its velocity.
        approx::assert_relative_eq!(bodies[0].drivetrain.vel_z, 10.0);
    }

    #[test]
    fn test_detection_marks_hierarchy() {
        let field = Field::default();
        let mut bodies = [box_robot(0.0, 0.0), box_robot(8.0, 0.0)];
        let cylinders = [Cylinder::new(-30.0, -30.0, 2.0, 7.0, 0.1)];

        detect_and_mark(&mut bodies, &cylinders, &field);

        // Overlapping robots: submodels flagged, single parts flagged too.
        assert_eq!(
            bodies[0].collider.submodels[0].state,
            CollisionState::SubmodelTouch
        );
        assert_eq!(
            bodies[0].collider.submodels[0].parts[0].state,
            CollisionState::PartTouch
        );

        // A far-away cylinder marks nothing.
        let mut lone = [box_robot(-20.0, 20.0)];
        detect_and_mark(&mut lone, &cylinders, &field);
        assert_eq!(lone[0].collider.submodels[0].state, CollisionState::None);
    }

    #[test]
    fn test_symmetric_collision_preserves_centroid() {
        let settings = CollisionSettings::default();
        let field = Field::default();
        let mut bodies = [box_robot(-4.0, 0.0), box_robot(4.0, 0.0)];
        let mut cylinders: [Cylinder; 0] = [];

        resolve(&mut bodies, &mut cylinders, &field, &settings);

        let centroid = (bodies[0].drivetrain.pos_x + bodies[1].drivetrain.pos_x) / 2.0;
        approx::assert_relative_eq!(centroid, 0.0, epsilon = 1e-9);
    }
}
