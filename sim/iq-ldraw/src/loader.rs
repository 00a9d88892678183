//! Hierarchy flattening: raw sections to a transform-baked part list.

use std::fs;
use std::path::Path;

use nalgebra::{Matrix3, Vector3};
use tracing::{info, warn};

use crate::error::{LdrawError, Result};
use crate::parser::parse_document_str;
use crate::types::{Assembly, FlatPart, RawDocument, Referent, Submodel};
use crate::{DEFAULT_COLOR, INHERIT_COLOR, MAX_DEPTH, MAX_PARTS};

/// Load and flatten an assembly document from disk.
pub fn load_assembly_file(path: impl AsRef<Path>) -> Result<Assembly> {
    let path = path.as_ref();
    let text = fs::read_to_string(path)?;
    let assembly = parse_assembly_str(&text)?;
    info!(
        path = %path.display(),
        parts = assembly.parts.len(),
        submodels = assembly.submodels.len(),
        "loaded assembly"
    );
    Ok(assembly)
}

/// Parse and flatten an assembly document from a string.
pub fn parse_assembly_str(input: &str) -> Result<Assembly> {
    let doc = parse_document_str(input)?;
    flatten(&doc)
}

/// Flatten a parsed document into a part list plus top-level submodel table.
pub fn flatten(doc: &RawDocument) -> Result<Assembly> {
    let mut assembly = Assembly {
        name: doc.main.clone(),
        parts: Vec::new(),
        submodels: Vec::new(),
    };

    expand(
        doc,
        &doc.main,
        Vector3::zeros(),
        &Matrix3::identity(),
        DEFAULT_COLOR,
        0,
        None,
        &mut assembly,
    );

    if assembly.parts.is_empty() {
        return Err(LdrawError::empty_assembly(&assembly.name));
    }
    Ok(assembly)
}

/// Recursively expand `section_name`, accumulating flattened parts.
///
/// `submodel` is the index of the top-level submodel being filled, assigned
/// when recursing out of the main model (depth 0) and carried unchanged
/// below that.
#[allow(clippy::too_many_arguments)]
fn expand(
    doc: &RawDocument,
    section_name: &str,
    parent_pos: Vector3<f64>,
    parent_rot: &Matrix3<f64>,
    parent_color: i32,
    depth: usize,
    submodel: Option<usize>,
    out: &mut Assembly,
) {
    if depth > MAX_DEPTH {
        warn!(section = section_name, "max recursion depth reached");
        return;
    }

    let Some(section) = doc.section(section_name) else {
        warn!(section = section_name, "referenced section not found");
        return;
    };

    for placement in &section.placements {
        let color = if placement.color == INHERIT_COLOR {
            parent_color
        } else {
            placement.color
        };
        let position = parent_pos + parent_rot * placement.position;
        let rotation = parent_rot * placement.rotation;

        match &placement.referent {
            Referent::Part(part_id) => {
                if out.parts.len() >= MAX_PARTS {
                    warn!(limit = MAX_PARTS, "part limit reached, truncating");
                    return;
                }
                out.parts.push(FlatPart {
                    part_id: part_id.clone(),
                    color,
                    position,
                    rotation,
                    submodel,
                });
            }
            Referent::Section(name) => {
                // Direct children of the main model become the submodel
                // table; deeper references dissolve into their top-level
                // ancestor.
                let child_submodel = if depth == 0 {
                    let index = out.submodels.len();
                    out.submodels.push(Submodel {
                        name: name.clone(),
                        part_start: out.parts.len(),
                        part_count: 0,
                    });
                    Some(index)
                } else {
                    submodel
                };

                let parts_before = out.parts.len();
                expand(
                    doc,
                    name,
                    position,
                    &rotation,
                    color,
                    depth + 1,
                    child_submodel,
                    out,
                );

                if depth == 0 {
                    if let Some(index) = child_submodel {
                        out.submodels[index].part_count = out.parts.len() - parts_before;
                    }
                }
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_nested_transform_baking() {
        // Submodel placed at (10, 0, 0) rotated 90 degrees about Y (row-major
        // [0 0 1; 0 1 0; -1 0 0]); part inside at (0, 0, 5).
        let doc = "\
0 FILE main.ldr
1 0 10 0 0 0 0 1 0 1 0 -1 0 0 sub.ldr
0 FILE sub.ldr
1 0 0 0 5 1 0 0 0 1 0 0 0 1 p.dat
";
        let assembly = parse_assembly_str(doc).unwrap();
        let part = &assembly.parts[0];
        // Local +Z maps to +X under the parent rotation.
        assert_relative_eq!(part.position, Vector3::new(15.0, 0.0, 0.0), epsilon = 1e-12);
    }

    #[test]
    fn test_missing_referent_is_skipped() {
        let doc = "\
0 FILE main.ldr
1 0 0 0 0 1 0 0 0 1 0 0 0 1 ghost.ldr
1 0 0 0 0 1 0 0 0 1 0 0 0 1 real.dat
";
        let assembly = parse_assembly_str(doc).unwrap();
        assert_eq!(assembly.parts.len(), 1);
        // The dangling reference still created a (now empty) submodel entry.
        assert_eq!(assembly.submodels.len(), 1);
        assert_eq!(assembly.submodels[0].part_count, 0);
    }

    #[test]
    fn test_self_reference_stops_at_depth_cap() {
        let doc = "\
0 FILE main.ldr
1 0 0 0 0 1 0 0 0 1 0 0 0 1 loop.ldr
0 FILE loop.ldr
1 0 0 0 0 1 0 0 0 1 0 0 0 1 p.dat
1 0 0 0 10 1 0 0 0 1 0 0 0 1 loop.ldr
";
        // Each level adds one part; recursion must stop at the cap rather
        // than hang. Depth 1..=20 emit a part each.
        let assembly = parse_assembly_str(doc).unwrap();
        assert_eq!(assembly.parts.len(), MAX_DEPTH);
    }

    #[test]
    fn test_empty_assembly_is_error() {
        let doc = "0 FILE main.ldr\n0 Nothing here\n";
        assert!(matches!(
            parse_assembly_str(doc),
            Err(LdrawError::EmptyAssembly { .. })
        ));
    }

    #[test]
    fn test_deep_nesting_keeps_top_level_submodel_index() {
        let doc = "\
0 FILE main.ldr
1 0 0 0 0 1 0 0 0 1 0 0 0 1 outer.ldr
0 FILE outer.ldr
1 0 0 0 0 1 0 0 0 1 0 0 0 1 inner.ldr
0 FILE inner.ldr
1 0 0 0 0 1 0 0 0 1 0 0 0 1 p.dat
";
        let assembly = parse_assembly_str(doc).unwrap();
        assert_eq!(assembly.submodels.len(), 1);
        assert_eq!(assembly.parts[0].submodel, Some(0));
        assert_eq!(assembly.submodels[0].part_count, 1);
    }

    #[test]
    fn test_color_inheritance_through_levels() {
        // main places outer in red (4); outer places inner with 16; the
        // part with 16 resolves to the nearest non-16 ancestor: red.
        let doc = "\
0 FILE main.ldr
1 4 0 0 0 1 0 0 0 1 0 0 0 1 outer.ldr
0 FILE outer.ldr
1 16 0 0 0 1 0 0 0 1 0 0 0 1 inner.ldr
0 FILE inner.ldr
1 16 0 0 0 1 0 0 0 1 0 0 0 1 p.dat
1 2 0 0 0 1 0 0 0 1 0 0 0 1 q.dat
";
        let assembly = parse_assembly_str(doc).unwrap();
        assert_eq!(assembly.parts[0].color, 4);
        assert_eq!(assembly.parts[1].color, 2);
    }

    #[test]
    fn test_root_color_16_uses_document_default() {
        let doc = "\
0 FILE main.ldr
1 16 0 0 0 1 0 0 0 1 0 0 0 1 p.dat
";
        let assembly = parse_assembly_str(doc).unwrap();
        assert_eq!(assembly.parts[0].color, DEFAULT_COLOR);
    }
}
