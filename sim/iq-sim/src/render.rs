//! The render boundary: everything the drawing layer needs for one frame.

use crate::mesh::MeshId;
use iq_types::CollisionState;

/// One drawable part.
#[derive(Debug, Clone, Copy)]
pub struct PartRender {
    /// Interned mesh to draw.
    pub mesh: MeshId,
    /// Column-major model matrix.
    pub transform: [f64; 16],
    /// Base color.
    pub color: [f64; 3],
    /// Contact classification for the collision overlay.
    pub state: CollisionState,
}

/// One drawable field cylinder.
#[derive(Debug, Clone, Copy)]
pub struct CylinderRender {
    /// Column-major model matrix scaling a unit cylinder.
    pub transform: [f64; 16],
    /// Base color.
    pub color: [f64; 3],
}

/// Operator-display status for one robot, feeding the (external) text
/// overlay.
#[derive(Debug, Clone, Default)]
pub struct RobotStatus {
    /// Robot display name.
    pub name: String,
    /// Whether the drivetrain is simulated.
    pub driving: bool,
    /// Whether either side is currently slipping.
    pub slipping: bool,
    /// Whether the placement declared a program.
    pub programmed: bool,
    /// Whether the program is still connected.
    pub connected: bool,
    /// Project name reported by the program.
    pub project: String,
    /// Last status line reported by the program.
    pub status: String,
}

/// Everything the rendering layer consumes for one frame. The orchestrator
/// owns all simulation state; this is a plain data snapshot.
#[derive(Debug, Clone, Default)]
pub struct RenderFrame {
    /// Parts in arena order.
    pub parts: Vec<PartRender>,
    /// Cylinders in scene order.
    pub cylinders: Vec<CylinderRender>,
    /// Per-robot operator status, in placement order.
    pub robots: Vec<RobotStatus>,
    /// Index of the robot currently receiving operator input.
    pub active_robot: Option<usize>,
    /// Whether the collision overlay states are fresh this frame.
    pub collision_overlay: bool,
}

impl RenderFrame {
    /// Empty frame with part capacity reserved.
    #[must_use]
    pub fn with_capacity(parts: usize, cylinders: usize) -> Self {
        Self {
            parts: Vec::with_capacity(parts),
            cylinders: Vec::with_capacity(cylinders),
            robots: Vec::new(),
            active_robot: None,
            collision_overlay: false,
        }
    }
}
