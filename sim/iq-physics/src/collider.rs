//! Per-robot collision hierarchy.
//!
//! Each robot carries a two-level set of boxes in its local render frame
//! (pivot-relative, Y-up, inches):
//!
//! - one tight oriented box per part, rotated by the part's converted CAD
//!   rotation;
//! - one loose identity-rotation box per submodel, enclosing its parts.
//!
//! Submodel boxes are cheap to test and drive the broad phase; part boxes
//! drive the narrow phase. World-space boxes are produced per query from
//! the robot's pose: translation `(pos_x, ground_offset, pos_z)` and
//! rotation `R_y(yaw)`.

use nalgebra::Vector3;

use crate::drivetrain::Drivetrain;
use iq_types::math::rotation_y;
use iq_types::{Aabb, CollisionState, Obb};

/// One part's collision box plus its response bookkeeping.
#[derive(Debug, Clone)]
pub struct PartCollider {
    /// Box in the robot-local render frame.
    pub local: Obb,
    /// Caller-assigned key (the orchestrator uses the global part-instance
    /// index) for mapping collision states back to rendered parts.
    pub key: usize,
    /// Contact classification from the last detection pass.
    pub state: CollisionState,
}

impl PartCollider {
    /// Create a part collider.
    #[must_use]
    pub fn new(key: usize, local: Obb) -> Self {
        Self {
            local,
            key,
            state: CollisionState::None,
        }
    }
}

/// A submodel's loose box over a set of part colliders.
#[derive(Debug, Clone)]
pub struct SubmodelCollider {
    /// Identity-rotation box enclosing all part boxes, robot-local frame.
    pub local: Obb,
    /// The submodel's parts.
    pub parts: Vec<PartCollider>,
    /// Contact classification from the last detection pass.
    pub state: CollisionState,
}

impl SubmodelCollider {
    /// Build a submodel collider enclosing the given parts. Returns `None`
    /// for an empty part set (a submodel whose referents all failed to
    /// load has no collision presence).
    #[must_use]
    pub fn enclosing(parts: Vec<PartCollider>) -> Option<Self> {
        let corners = parts.iter().flat_map(|p| {
            let aabb = p.local.enclosing_aabb();
            [aabb.min, aabb.max]
        });
        let aabb = Aabb::enclosing(corners)?;
        Some(Self {
            local: Obb::from_aabb(&aabb),
            parts,
            state: CollisionState::None,
        })
    }
}

/// All collision boxes of one robot.
#[derive(Debug, Clone, Default)]
pub struct RobotCollider {
    /// Submodel colliders; index order matches the assembly's submodel
    /// table (with an optional trailing entry for loose root parts).
    pub submodels: Vec<SubmodelCollider>,
}

impl RobotCollider {
    /// Build from submodel colliders.
    #[must_use]
    pub fn new(submodels: Vec<SubmodelCollider>) -> Self {
        Self { submodels }
    }

    /// Reset all collision states to [`CollisionState::None`].
    pub fn clear_states(&mut self) {
        for submodel in &mut self.submodels {
            submodel.state = CollisionState::None;
            for part in &mut submodel.parts {
                part.state = CollisionState::None;
            }
        }
    }

    /// Iterate over every part collider.
    pub fn parts(&self) -> impl Iterator<Item = &PartCollider> {
        self.submodels.iter().flat_map(|s| s.parts.iter())
    }
}

/// A robot as the collision engine sees it: drivetrain pose plus collision
/// hierarchy plus the vertical offset that rests its lowest point on the
/// floor.
#[derive(Debug, Clone)]
pub struct RobotBody {
    /// Pose, velocities and the external-force channel.
    pub drivetrain: Drivetrain,
    /// Collision hierarchy in the robot-local frame.
    pub collider: RobotCollider,
    /// Y translation applied to all local boxes (and meshes) so the robot
    /// sits on the floor.
    pub ground_offset: f64,
}

impl RobotBody {
    /// Create a body.
    #[must_use]
    pub fn new(drivetrain: Drivetrain, collider: RobotCollider, ground_offset: f64) -> Self {
        Self {
            drivetrain,
            collider,
            ground_offset,
        }
    }

    /// World translation of the robot-local frame.
    #[must_use]
    pub fn world_translation(&self) -> Vector3<f64> {
        Vector3::new(
            self.drivetrain.pos_x,
            self.ground_offset,
            self.drivetrain.pos_z,
        )
    }

    /// Submodel box `index` in world space.
    #[must_use]
    pub fn world_submodel_obb(&self, index: usize) -> Obb {
        let rotation = rotation_y(self.drivetrain.yaw);
        self.collider.submodels[index]
            .local
            .transformed(&self.world_translation(), &rotation)
    }

    /// Part box `(submodel, part)` in world space.
    #[must_use]
    pub fn world_part_obb(&self, submodel: usize, part: usize) -> Obb {
        let rotation = rotation_y(self.drivetrain.yaw);
        self.collider.submodels[submodel].parts[part]
            .local
            .transformed(&self.world_translation(), &rotation)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::Point3;

    fn part(key: usize, min: [f64; 3], max: [f64; 3]) -> PartCollider {
        PartCollider::new(key, Obb::from_bounds(Point3::from(min), Point3::from(max)))
    }

    #[test]
    fn test_submodel_encloses_parts() {
        let submodel = SubmodelCollider::enclosing(vec![
            part(0, [-1.0, 0.0, -1.0], [1.0, 2.0, 1.0]),
            part(1, [3.0, 0.0, -2.0], [5.0, 1.0, 2.0]),
        ])
        .unwrap();

        let aabb = submodel.local.enclosing_aabb();
        assert_relative_eq!(aabb.min.x, -1.0);
        assert_relative_eq!(aabb.max.x, 5.0);
        assert_relative_eq!(aabb.max.y, 2.0);
        assert_relative_eq!(aabb.min.z, -2.0);
    }

    #[test]
    fn test_empty_submodel_has_no_collider() {
        assert!(SubmodelCollider::enclosing(Vec::new()).is_none());
    }

    #[test]
    fn test_world_transform_applies_pose_and_ground_offset() {
        let submodel =
            SubmodelCollider::enclosing(vec![part(0, [-1.0, 0.0, -1.0], [1.0, 1.0, 1.0])]).unwrap();
        let mut body = RobotBody::new(
            Drivetrain::default(),
            RobotCollider::new(vec![submodel]),
            0.75,
        );
        body.drivetrain.set_position(10.0, -4.0, 0.0);

        let world = body.world_submodel_obb(0);
        assert_relative_eq!(world.center.x, 10.0);
        assert_relative_eq!(world.center.y, 1.25); // 0.5 + ground offset
        assert_relative_eq!(world.center.z, -4.0);
    }
}
