//! Mesh interning.
//!
//! The simulator never decodes mesh files itself; it asks a [`MeshSource`]
//! for bounds by part id and interns the result. A part id that fails to
//! load is remembered as absent and never retried, so a model referencing a
//! thousand missing wheels warns once per id, not once per frame.
//!
//! Meshes live in a process-wide arena addressed by dense [`MeshId`]s; part
//! instances carry ids, never pointers.

use std::collections::HashMap;

use nalgebra::Point3;
use tracing::warn;

/// Bounds and size of a loaded mesh, in the mesh frame (Y-up, inches).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeshInfo {
    /// Minimum corner of the mesh bounds.
    pub min_bounds: Point3<f64>,
    /// Maximum corner of the mesh bounds.
    pub max_bounds: Point3<f64>,
    /// Index count, for the renderer's draw call.
    pub index_count: u32,
}

/// Dense handle into the mesh arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MeshId(pub u32);

/// The mesh-loading service the rendering layer provides.
pub trait MeshSource {
    /// Load a mesh by part id (e.g. `228-2500-021`). `None` means the mesh
    /// doesn't exist or failed to decode.
    fn load(&mut self, part_id: &str) -> Option<MeshInfo>;
}

/// Interning cache over a [`MeshSource`].
#[derive(Default)]
pub struct MeshCache {
    arena: Vec<MeshInfo>,
    by_part: HashMap<String, Option<MeshId>>,
}

impl MeshCache {
    /// Create an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up (or load and intern) the mesh for a part id.
    pub fn get(&mut self, part_id: &str, source: &mut dyn MeshSource) -> Option<MeshId> {
        if let Some(cached) = self.by_part.get(part_id) {
            return *cached;
        }

        let loaded = source.load(part_id).map(|info| {
            let id = MeshId(self.arena.len() as u32);
            self.arena.push(info);
            id
        });
        if loaded.is_none() {
            warn!(part_id, "mesh unavailable, part will be skipped");
        }
        self.by_part.insert(part_id.to_string(), loaded);
        loaded
    }

    /// Bounds and size for an interned mesh.
    #[must_use]
    pub fn info(&self, id: MeshId) -> &MeshInfo {
        &self.arena[id.0 as usize]
    }

    /// Number of distinct meshes interned.
    #[must_use]
    pub fn len(&self) -> usize {
        self.arena.len()
    }

    /// Whether nothing has been interned.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }
}

/// A stand-in source for headless runs with no rendering layer attached:
/// every part id resolves to a nominal structural-part box. Physics stays
/// meaningful (robots have extent and a ground plane) without any mesh
/// files on disk.
#[derive(Debug, Clone, Default)]
pub struct FallbackMeshSource;

impl MeshSource for FallbackMeshSource {
    fn load(&mut self, _part_id: &str) -> Option<MeshInfo> {
        Some(MeshInfo {
            min_bounds: Point3::new(-1.0, -0.5, -1.0),
            max_bounds: Point3::new(1.0, 0.5, 1.0),
            index_count: 0,
        })
    }
}
