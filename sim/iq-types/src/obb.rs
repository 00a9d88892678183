//! Oriented and axis-aligned bounding boxes.
//!
//! The collision engine works on a two-level hierarchy of these boxes:
//! loose identity-rotation boxes per submodel, tight oriented boxes per part.
//! Intersection tests are boolean-only; penetration depth is recovered
//! separately from enclosing-AABB overlap by the response code.
//!
//! OBB-OBB intersection uses the Separating Axis Theorem over the 15
//! candidate axes (3 + 3 face normals, 9 edge cross products), following
//! Ericson, *Real-Time Collision Detection*.

use nalgebra::{Matrix3, Point3, Vector3};

/// Numerical guard added to each absolute rotation entry so nearly parallel
/// edge pairs do not produce a spurious separating axis.
const SAT_EPSILON: f64 = 1e-6;

/// An axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    /// Minimum corner.
    pub min: Point3<f64>,
    /// Maximum corner.
    pub max: Point3<f64>,
}

impl Aabb {
    /// Create an AABB from minimum and maximum corners.
    #[must_use]
    pub const fn new(min: Point3<f64>, max: Point3<f64>) -> Self {
        Self { min, max }
    }

    /// Create an AABB centered at a point with the given half-extents.
    #[must_use]
    pub fn from_center(center: Point3<f64>, half_extents: Vector3<f64>) -> Self {
        Self {
            min: center - half_extents,
            max: center + half_extents,
        }
    }

    /// Center point of the box.
    #[must_use]
    pub fn center(&self) -> Point3<f64> {
        nalgebra::center(&self.min, &self.max)
    }

    /// Half-extents of the box.
    #[must_use]
    pub fn half_extents(&self) -> Vector3<f64> {
        (self.max - self.min) * 0.5
    }

    /// Check whether this AABB overlaps another.
    #[must_use]
    pub fn overlaps(&self, other: &Self) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
            && self.min.z <= other.max.z
            && self.max.z >= other.min.z
    }

    /// Per-axis overlap depths, or `None` when the boxes are disjoint.
    ///
    /// Each component is the length of the intersection interval on that
    /// axis; the response code pushes along the axis of minimum depth.
    #[must_use]
    pub fn overlap_depths(&self, other: &Self) -> Option<Vector3<f64>> {
        let x = self.max.x.min(other.max.x) - self.min.x.max(other.min.x);
        let y = self.max.y.min(other.max.y) - self.min.y.max(other.min.y);
        let z = self.max.z.min(other.max.z) - self.min.z.max(other.min.z);
        if x >= 0.0 && y >= 0.0 && z >= 0.0 {
            Some(Vector3::new(x, y, z))
        } else {
            None
        }
    }

    /// Grow the box to also contain `point`.
    pub fn extend(&mut self, point: &Point3<f64>) {
        self.min.x = self.min.x.min(point.x);
        self.min.y = self.min.y.min(point.y);
        self.min.z = self.min.z.min(point.z);
        self.max.x = self.max.x.max(point.x);
        self.max.y = self.max.y.max(point.y);
        self.max.z = self.max.z.max(point.z);
    }

    /// Enclose a set of points. Returns `None` for an empty iterator.
    #[must_use]
    pub fn enclosing<I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = Point3<f64>>,
    {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let mut aabb = Self::new(first, first);
        for p in iter {
            aabb.extend(&p);
        }
        Some(aabb)
    }
}

impl Default for Aabb {
    fn default() -> Self {
        Self::new(Point3::origin(), Point3::origin())
    }
}

/// An oriented bounding box: center, half-extents, and a local-to-world
/// rotation. Half-extents are expressed in the box's own frame, so they are
/// invariant under [`Obb::transformed`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Obb {
    /// Box center.
    pub center: Point3<f64>,
    /// Half-size along the local X, Y, Z axes.
    pub half_extents: Vector3<f64>,
    /// Local-to-world rotation.
    pub rotation: Matrix3<f64>,
}

impl Obb {
    /// Build an identity-rotation OBB from min/max bounds.
    #[must_use]
    pub fn from_bounds(min: Point3<f64>, max: Point3<f64>) -> Self {
        Self {
            center: nalgebra::center(&min, &max),
            half_extents: (max - min) * 0.5,
            rotation: Matrix3::identity(),
        }
    }

    /// Build an OBB from an AABB (identity rotation).
    #[must_use]
    pub fn from_aabb(aabb: &Aabb) -> Self {
        Self::from_bounds(aabb.min, aabb.max)
    }

    /// Replace the rotation, keeping center and extents.
    #[must_use]
    pub fn with_rotation(mut self, rotation: Matrix3<f64>) -> Self {
        self.rotation = rotation;
        self
    }

    /// Transform this box by a world translation and rotation:
    /// the center moves to `R·center + t`, the rotation composes to `R·R_local`,
    /// and the half-extents are untouched.
    #[must_use]
    pub fn transformed(&self, translation: &Vector3<f64>, rotation: &Matrix3<f64>) -> Self {
        Self {
            center: Point3::from(rotation * self.center.coords + translation),
            half_extents: self.half_extents,
            rotation: rotation * self.rotation,
        }
    }

    /// The 8 corners in world space.
    #[must_use]
    pub fn corners(&self) -> [Point3<f64>; 8] {
        let e = self.half_extents;
        let signs = [
            Vector3::new(-e.x, -e.y, -e.z),
            Vector3::new(e.x, -e.y, -e.z),
            Vector3::new(e.x, e.y, -e.z),
            Vector3::new(-e.x, e.y, -e.z),
            Vector3::new(-e.x, -e.y, e.z),
            Vector3::new(e.x, -e.y, e.z),
            Vector3::new(e.x, e.y, e.z),
            Vector3::new(-e.x, e.y, e.z),
        ];
        signs.map(|local| self.center + self.rotation * local)
    }

    /// Smallest AABB containing the box.
    #[must_use]
    pub fn enclosing_aabb(&self) -> Aabb {
        let corners = self.corners();
        let mut aabb = Aabb::new(corners[0], corners[0]);
        for corner in &corners[1..] {
            aabb.extend(corner);
        }
        aabb
    }

    /// Separating-Axis Theorem intersection test against another OBB.
    #[must_use]
    pub fn intersects(&self, other: &Self) -> bool {
        let a = self;
        let b = other;

        // World-space axes are the columns of the local-to-world rotations.
        let a_axes: [Vector3<f64>; 3] = [
            a.rotation.column(0).into_owned(),
            a.rotation.column(1).into_owned(),
            a.rotation.column(2).into_owned(),
        ];
        let b_axes: [Vector3<f64>; 3] = [
            b.rotation.column(0).into_owned(),
            b.rotation.column(1).into_owned(),
            b.rotation.column(2).into_owned(),
        ];

        // Rotation expressing B in A's frame, and its absolute value with the
        // epsilon guard for near-parallel edges.
        let mut r = [[0.0_f64; 3]; 3];
        let mut abs_r = [[0.0_f64; 3]; 3];
        for i in 0..3 {
            for j in 0..3 {
                r[i][j] = a_axes[i].dot(&b_axes[j]);
                abs_r[i][j] = r[i][j].abs() + SAT_EPSILON;
            }
        }

        let t_world = b.center - a.center;
        let t = [
            t_world.dot(&a_axes[0]),
            t_world.dot(&a_axes[1]),
            t_world.dot(&a_axes[2]),
        ];

        let ae = [a.half_extents.x, a.half_extents.y, a.half_extents.z];
        let be = [b.half_extents.x, b.half_extents.y, b.half_extents.z];

        // Axes A0, A1, A2
        for i in 0..3 {
            let ra = ae[i];
            let rb = be[0] * abs_r[i][0] + be[1] * abs_r[i][1] + be[2] * abs_r[i][2];
            if t[i].abs() > ra + rb {
                return false;
            }
        }

        // Axes B0, B1, B2
        for j in 0..3 {
            let ra = ae[0] * abs_r[0][j] + ae[1] * abs_r[1][j] + ae[2] * abs_r[2][j];
            let rb = be[j];
            let tb = t[0] * r[0][j] + t[1] * r[1][j] + t[2] * r[2][j];
            if tb.abs() > ra + rb {
                return false;
            }
        }

        // Cross-product axes Ai × Bj
        for i in 0..3 {
            let (i1, i2) = ((i + 1) % 3, (i + 2) % 3);
            for j in 0..3 {
                let (j1, j2) = ((j + 1) % 3, (j + 2) % 3);
                let ra = ae[i1] * abs_r[i2][j] + ae[i2] * abs_r[i1][j];
                let rb = be[j1] * abs_r[i][j2] + be[j2] * abs_r[i][j1];
                let dist = t[i2] * r[i1][j] - t[i1] * r[i2][j];
                if dist.abs() > ra + rb {
                    return false;
                }
            }
        }

        true
    }

    /// Intersection test against an AABB, by promoting the AABB to an
    /// identity-rotation OBB.
    #[must_use]
    pub fn intersects_aabb(&self, aabb: &Aabb) -> bool {
        self.intersects(&Self::from_aabb(aabb))
    }

    /// Closest point of the box to `(x, z)` in the top-down XZ projection:
    /// project the query into the box's local XZ frame, clamp to the
    /// extents, and transform back.
    #[must_use]
    pub fn closest_point_xz(&self, x: f64, z: f64) -> (f64, f64) {
        // X and Z axes of the box projected onto the world XZ plane.
        let (ax_x, ax_z) = (self.rotation[(0, 0)], self.rotation[(2, 0)]);
        let (az_x, az_z) = (self.rotation[(0, 2)], self.rotation[(2, 2)]);

        let dx = x - self.center.x;
        let dz = z - self.center.z;

        let proj_x = dx * ax_x + dz * ax_z;
        let proj_z = dx * az_x + dz * az_z;

        let clamped_x = proj_x.clamp(-self.half_extents.x, self.half_extents.x);
        let clamped_z = proj_z.clamp(-self.half_extents.z, self.half_extents.z);

        (
            self.center.x + clamped_x * ax_x + clamped_z * az_x,
            self.center.z + clamped_x * ax_z + clamped_z * az_z,
        )
    }

    /// Top-down intersection test against a circle on the XZ plane (a
    /// cylinder seen from above).
    #[must_use]
    pub fn intersects_circle_xz(&self, circle_x: f64, circle_z: f64, radius: f64) -> bool {
        let (closest_x, closest_z) = self.closest_point_xz(circle_x, circle_z);
        let dist_x = circle_x - closest_x;
        let dist_z = circle_z - closest_z;
        dist_x * dist_x + dist_z * dist_z <= radius * radius
    }
}
