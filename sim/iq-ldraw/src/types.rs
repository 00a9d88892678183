//! Assembly document representations, raw and flattened.

use nalgebra::{Matrix3, Vector3};

/// What a placement line points at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Referent {
    /// A leaf part; the string is the mesh key (file stem, extension
    /// stripped).
    Part(String),
    /// Another section of the same document, by name.
    Section(String),
}

impl Referent {
    /// Classify a referent token by its extension. `.dat` is a leaf part,
    /// `.ldr`/`.mpd` a section reference; anything else is treated as a
    /// leaf part keyed by its stem.
    #[must_use]
    pub fn classify(token: &str) -> Self {
        let lower = token.to_ascii_lowercase();
        if lower.ends_with(".ldr") || lower.ends_with(".mpd") {
            Self::Section(token.to_string())
        } else {
            let stem = token
                .rsplit_once('.')
                .map_or(token, |(stem, _ext)| stem)
                .to_string();
            Self::Part(stem)
        }
    }
}

/// One type-1 placement line, in document-local coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct Placement {
    /// LDraw color code (16 = inherit).
    pub color: i32,
    /// Position in LDU, CAD frame.
    pub position: Vector3<f64>,
    /// Row-major rotation as parsed, stored as a matrix applied `v' = R·v`.
    pub rotation: Matrix3<f64>,
    /// The part or section this placement instantiates.
    pub referent: Referent,
}

/// A named section of the document (`0 FILE <name>` block).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Section {
    /// Section name as written in the document.
    pub name: String,
    /// Placements in document order.
    pub placements: Vec<Placement>,
}

/// A parsed but not yet flattened document.
#[derive(Debug, Clone, PartialEq)]
pub struct RawDocument {
    /// Name of the main model (the first section).
    pub main: String,
    /// All sections in document order.
    pub sections: Vec<Section>,
}

impl RawDocument {
    /// Look up a section by name, case-insensitively.
    #[must_use]
    pub fn section(&self, name: &str) -> Option<&Section> {
        self.sections
            .iter()
            .find(|s| s.name.eq_ignore_ascii_case(name))
    }
}

/// A flattened part with its world-baked CAD transform.
#[derive(Debug, Clone, PartialEq)]
pub struct FlatPart {
    /// Mesh key (part file stem, e.g. `228-2500-021`).
    pub part_id: String,
    /// Resolved LDraw color code (never 16).
    pub color: i32,
    /// Baked position in LDU, CAD frame.
    pub position: Vector3<f64>,
    /// Baked rotation, CAD frame.
    pub rotation: Matrix3<f64>,
    /// Index of the top-level submodel this part belongs to, or `None` for
    /// parts placed directly in the main model.
    pub submodel: Option<usize>,
}

/// A top-level submodel: a contiguous slice of the flattened part list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submodel {
    /// Section name of the submodel.
    pub name: String,
    /// First part index in [`Assembly::parts`].
    pub part_start: usize,
    /// Number of parts in the slice.
    pub part_count: usize,
}

/// A fully flattened assembly.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Assembly {
    /// Main model name.
    pub name: String,
    /// Flattened parts; submodel slices are contiguous within this list.
    pub parts: Vec<FlatPart>,
    /// Top-level submodel table.
    pub submodels: Vec<Submodel>,
}

impl Assembly {
    /// The parts belonging to top-level submodel `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds; submodel indices come from this
    /// assembly's own table.
    #[must_use]
    pub fn submodel_parts(&self, index: usize) -> &[FlatPart] {
        let sm = &self.submodels[index];
        &self.parts[sm.part_start..sm.part_start + sm.part_count]
    }

    /// Iterate over parts placed directly in the main model (no submodel).
    pub fn root_parts(&self) -> impl Iterator<Item = &FlatPart> {
        self.parts.iter().filter(|p| p.submodel.is_none())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_referent_classification() {
        assert_eq!(
            Referent::classify("228-2500-021.dat"),
            Referent::Part("228-2500-021".into())
        );
        assert_eq!(
            Referent::classify("228-2500-021.DAT"),
            Referent::Part("228-2500-021".into())
        );
        assert_eq!(
            Referent::classify("wheels.LDR"),
            Referent::Section("wheels.LDR".into())
        );
        assert_eq!(
            Referent::classify("sub.mpd"),
            Referent::Section("sub.mpd".into())
        );
    }

    #[test]
    fn test_case_insensitive_section_lookup() {
        let doc = RawDocument {
            main: "Main.ldr".into(),
            sections: vec![Section {
                name: "Wheels.ldr".into(),
                placements: Vec::new(),
            }],
        };
        assert!(doc.section("wheels.ldr").is_some());
        assert!(doc.section("WHEELS.LDR").is_some());
        assert!(doc.section("arm.ldr").is_none());
    }
}
