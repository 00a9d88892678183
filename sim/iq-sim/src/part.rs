//! Per-part runtime records.

use nalgebra::{Matrix3, Vector3};

use crate::mesh::MeshId;
use iq_types::{CollisionState, Obb};

/// One rendered part instance.
///
/// All part instances live in a single orchestrator-owned vector; robots
/// reference their parts by index range. Pose-dependent data (the world
/// transform) is rebuilt each frame from the owning robot's pose; the
/// fields here are baked at scene realization.
#[derive(Debug, Clone)]
pub struct PartInstance {
    /// Interned mesh handle.
    pub mesh: MeshId,
    /// Resolved RGB color.
    pub color: [f64; 3],
    /// Position relative to the robot pivot, LDU, CAD frame. For loose
    /// field parts this is relative to the world origin.
    pub position_cad: Vector3<f64>,
    /// Baked rotation, CAD frame.
    pub rotation_cad: Matrix3<f64>,
    /// Owning robot index, or `None` for loose field parts.
    pub robot: Option<usize>,
    /// Wheel assembly index within the owning robot, or `None`.
    pub wheel: Option<usize>,
    /// Top-level submodel index within the owning robot's assembly, or
    /// `None` for parts placed directly in the main model.
    pub submodel: Option<usize>,
    /// Collision box in the robot-local render frame.
    pub local_obb: Obb,
    /// Contact classification from the last detection pass.
    pub state: CollisionState,
}
