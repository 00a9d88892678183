//! The playing field and its boundary walls.

use iq_types::Aabb;
use nalgebra::Point3;

/// Wall slab thickness, inches. Only the inner face matters for response;
/// the thickness just gives the broad phase a real box to test against.
const WALL_THICKNESS: f64 = 12.0;

/// Vertical extent of the wall boxes, inches.
const WALL_BOTTOM: f64 = -12.0;
const WALL_TOP: f64 = 36.0;

/// Field extents on the floor plane, inches. The default is the 6 ft × 8 ft
/// competition field centered on the origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Field {
    /// -X boundary.
    pub min_x: f64,
    /// +X boundary.
    pub max_x: f64,
    /// -Z boundary.
    pub min_z: f64,
    /// +Z boundary.
    pub max_z: f64,
}

impl Default for Field {
    fn default() -> Self {
        Self {
            min_x: -36.0,
            max_x: 36.0,
            min_z: -48.0,
            max_z: 48.0,
        }
    }
}

/// One boundary wall: its slab box and the inward-pointing normal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Wall {
    /// The wall slab, just outside the field.
    pub aabb: Aabb,
    /// Unit normal on the XZ plane pointing into the field.
    pub normal: (f64, f64),
}

impl Field {
    /// Create a field from full width (X) and depth (Z) in inches,
    /// centered on the origin.
    #[must_use]
    pub fn new(width: f64, depth: f64) -> Self {
        Self {
            min_x: -width / 2.0,
            max_x: width / 2.0,
            min_z: -depth / 2.0,
            max_z: depth / 2.0,
        }
    }

    /// Whether a floor point lies inside the field.
    #[must_use]
    pub fn contains_xz(&self, x: f64, z: f64) -> bool {
        x >= self.min_x && x <= self.max_x && z >= self.min_z && z <= self.max_z
    }

    /// The four boundary walls.
    #[must_use]
    pub fn walls(&self) -> [Wall; 4] {
        [
            // +X wall, pushes robots toward -X.
            Wall {
                aabb: Aabb::new(
                    Point3::new(self.max_x, WALL_BOTTOM, self.min_z - WALL_THICKNESS),
                    Point3::new(self.max_x + WALL_THICKNESS, WALL_TOP, self.max_z + WALL_THICKNESS),
                ),
                normal: (-1.0, 0.0),
            },
            // -X wall.
            Wall {
                aabb: Aabb::new(
                    Point3::new(self.min_x - WALL_THICKNESS, WALL_BOTTOM, self.min_z - WALL_THICKNESS),
                    Point3::new(self.min_x, WALL_TOP, self.max_z + WALL_THICKNESS),
                ),
                normal: (1.0, 0.0),
            },
            // +Z wall.
            Wall {
                aabb: Aabb::new(
                    Point3::new(self.min_x - WALL_THICKNESS, WALL_BOTTOM, self.max_z),
                    Point3::new(self.max_x + WALL_THICKNESS, WALL_TOP, self.max_z + WALL_THICKNESS),
                ),
                normal: (0.0, -1.0),
            },
            // -Z wall.
            Wall {
                aabb: Aabb::new(
                    Point3::new(self.min_x - WALL_THICKNESS, WALL_BOTTOM, self.min_z - WALL_THICKNESS),
                    Point3::new(self.max_x + WALL_THICKNESS, WALL_TOP, self.min_z),
                ),
                normal: (0.0, 1.0),
            },
        ]
    }

    /// How far a world AABB pokes through the inner face of `wall`
    /// (0 when clear of it).
    #[must_use]
    pub fn wall_penetration(&self, aabb: &Aabb, wall: &Wall) -> f64 {
        let (nx, nz) = wall.normal;
        let depth = if nx < 0.0 {
            aabb.max.x - self.max_x
        } else if nx > 0.0 {
            self.min_x - aabb.min.x
        } else if nz < 0.0 {
            aabb.max.z - self.max_z
        } else {
            self.min_z - aabb.min.z
        };
        depth.max(0.0)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]
mod tests {
    use super::*;

    #[test]
    fn test_containment() {
        let field = Field::default();
        assert!(field.contains_xz(0.0, 0.0));
        assert!(field.contains_xz(36.0, -48.0));
        assert!(!field.contains_xz(36.1, 0.0));
    }

    #[test]
    fn test_walls_sit_outside_the_field() {
        let field = Field::default();
        for wall in field.walls() {
            let center = wall.aabb.center();
            assert!(!field.contains_xz(center.x, center.z));
        }
    }

    #[test]
    fn test_wall_penetration() {
        let field = Field::default();
        let walls = field.walls();
        let poking = Aabb::new(Point3::new(30.0, 0.0, -5.0), Point3::new(37.5, 5.0, 5.0));
        assert_eq!(field.wall_penetration(&poking, &walls[0]), 1.5);
        assert_eq!(field.wall_penetration(&poking, &walls[1]), 0.0);
    }
}
