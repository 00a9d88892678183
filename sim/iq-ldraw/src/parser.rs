//! Line-level parser for assembly documents.

use nalgebra::{Matrix3, Vector3};
use tracing::debug;

use crate::error::{LdrawError, Result};
use crate::types::{Placement, RawDocument, Referent, Section};

/// Parse a document string into sections.
///
/// Lines before the first `0 FILE` marker and meta commands are ignored.
/// Malformed placement lines are skipped (the count is logged); geometry
/// primitive lines (types 2-5) are not placements and are skipped silently.
pub fn parse_document_str(input: &str) -> Result<RawDocument> {
    let mut sections: Vec<Section> = Vec::new();
    let mut skipped = 0_usize;

    for raw_line in input.lines() {
        let line = raw_line.trim();
        if line.is_empty() {
            continue;
        }

        if let Some(name) = line.strip_prefix("0 FILE ") {
            sections.push(Section {
                name: name.trim().to_string(),
                placements: Vec::new(),
            });
            continue;
        }

        // Any other meta command, or content before the first section.
        let Some(current) = sections.last_mut() else {
            continue;
        };
        if !line.starts_with('1') {
            continue;
        }

        match parse_placement(line) {
            Some(placement) => current.placements.push(placement),
            None => skipped += 1,
        }
    }

    if skipped > 0 {
        debug!(skipped, "skipped malformed placement lines");
    }

    let main = sections
        .first()
        .map(|s| s.name.clone())
        .ok_or_else(|| LdrawError::no_sections("document has no 0 FILE marker"))?;

    Ok(RawDocument { main, sections })
}

/// Parse one type-1 line: `1 <color> <x y z> <9 rotation floats> <referent>`.
fn parse_placement(line: &str) -> Option<Placement> {
    let mut tokens = line.split_whitespace();
    if tokens.next() != Some("1") {
        return None;
    }

    let color: i32 = tokens.next()?.parse().ok()?;

    let mut floats = [0.0_f64; 12];
    for slot in &mut floats {
        *slot = tokens.next()?.parse().ok()?;
    }

    // Referent is everything after the numeric fields; part file names may
    // contain spaces.
    let referent = tokens.collect::<Vec<_>>().join(" ");
    if referent.is_empty() {
        return None;
    }

    Some(Placement {
        color,
        position: Vector3::new(floats[0], floats[1], floats[2]),
        rotation: Matrix3::from_row_slice(&floats[3..12]),
        referent: Referent::classify(&referent),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_parse_placement_line() {
        let p = parse_placement("1 4 10 -20 30 1 0 0 0 1 0 0 0 1 228-2500-021.dat").unwrap();
        assert_eq!(p.color, 4);
        assert_relative_eq!(p.position, Vector3::new(10.0, -20.0, 30.0));
        assert_relative_eq!(p.rotation, Matrix3::identity());
        assert_eq!(p.referent, Referent::Part("228-2500-021".into()));
    }

    #[test]
    fn test_rotation_is_row_major() {
        // Row-major [0 0 1; 0 1 0; -1 0 0] maps +Z to +X.
        let p = parse_placement("1 0 0 0 0 0 0 1 0 1 0 -1 0 0 part.dat").unwrap();
        let v = p.rotation * Vector3::new(0.0, 0.0, 1.0);
        assert_relative_eq!(v, Vector3::new(1.0, 0.0, 0.0));
    }

    #[test]
    fn test_malformed_lines_are_skipped() {
        let doc = parse_document_str(
            "0 FILE a.ldr\n\
             1 4 nonsense\n\
             1 4 0 0 0 1 0 0 0 1 0 0 0 1\n\
             2 24 0 0 0 1 1 1\n\
             1 0 0 0 0 1 0 0 0 1 0 0 0 1 ok.dat\n",
        )
        .unwrap();
        assert_eq!(doc.sections[0].placements.len(), 1);
    }

    #[test]
    fn test_content_before_first_section_ignored() {
        let doc = parse_document_str(
            "1 0 0 0 0 1 0 0 0 1 0 0 0 1 stray.dat\n\
             0 FILE main.ldr\n\
             1 0 0 0 0 1 0 0 0 1 0 0 0 1 kept.dat\n",
        )
        .unwrap();
        assert_eq!(doc.main, "main.ldr");
        assert_eq!(doc.sections.len(), 1);
        assert_eq!(doc.sections[0].placements.len(), 1);
    }

    #[test]
    fn test_no_sections_is_an_error() {
        assert!(parse_document_str("0 just a comment\n").is_err());
    }

    #[test]
    fn test_referent_with_spaces() {
        let p = parse_placement("1 0 0 0 0 1 0 0 0 1 0 0 0 1 my part.dat").unwrap();
        assert_eq!(p.referent, Referent::Part("my part".into()));
    }
}
