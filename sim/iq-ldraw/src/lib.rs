//! LDraw multi-part document loader.
//!
//! This crate parses the hierarchical CAD assembly format used for VEX IQ
//! robot models and flattens it into a transform-baked part list ready for
//! rendering and collision.
//!
//! # Format
//!
//! An assembly document is a sequence of sections, each opened by a
//! `0 FILE <name>` line. Other `0 ...` lines are meta commands and are
//! ignored. Placements are type-1 lines:
//!
//! ```text
//! 1 <color> <x> <y> <z> <a b c d e f g h i> <referent>
//! ```
//!
//! where `a..i` is a 3x3 rotation in row-major order and the referent is
//! either a leaf part (`.dat`) or another section of the same document
//! (`.ldr`/`.mpd`, resolved case-insensitively). Positions are in LDU
//! (0.4 mm) in the CAD frame: X-right, Y-down, Z-back.
//!
//! Color code 16 means "inherit from the parent placement".
//!
//! # Flattening
//!
//! [`Assembly`] is the flattened form: every part carries its world-baked
//! CAD transform (`pos = parent_pos + parent_rot * local_pos`,
//! `rot = parent_rot * local_rot`) and the index of the **top-level**
//! submodel it came from. The submodel table only records the direct
//! children of the main model; those are the natural granularity for
//! broad-phase collision (arms, wheel pods, chassis sections), while deeply
//! nested structural sub-assemblies dissolve into their parents.
//!
//! # Example
//!
//! ```
//! let doc = "\
//! 0 FILE main.ldr
//! 1 4 0 0 0 1 0 0 0 1 0 0 0 1 pod.ldr
//! 0 FILE pod.ldr
//! 1 16 0 -10 0 1 0 0 0 1 0 0 0 1 228-2500-021.dat
//! ";
//!
//! let assembly = iq_ldraw::parse_assembly_str(doc).unwrap();
//! assert_eq!(assembly.parts.len(), 1);
//! assert_eq!(assembly.submodels.len(), 1);
//! // Color 16 inherited the red (4) of the pod placement.
//! assert_eq!(assembly.parts[0].color, 4);
//! ```

#![doc(html_root_url = "https://docs.rs/iq-ldraw/0.3.0")]
#![deny(clippy::unwrap_used, clippy::expect_used)]
#![warn(missing_docs)]
#![allow(
    clippy::missing_const_for_fn,
    clippy::module_name_repetitions,
    clippy::missing_errors_doc,
    clippy::cast_precision_loss,
)]

mod colors;
mod error;
mod loader;
mod parser;
mod types;

pub use colors::color_rgb;
pub use error::{LdrawError, Result};
pub use loader::{flatten, load_assembly_file, parse_assembly_str};
pub use parser::parse_document_str;
pub use types::{Assembly, FlatPart, Placement, RawDocument, Referent, Section, Submodel};

/// Color code meaning "inherit from the parent placement".
pub const INHERIT_COLOR: i32 = 16;

/// Effective color of the document root when nothing overrides it
/// (VEX dark gray).
pub const DEFAULT_COLOR: i32 = 72;

/// Recursion cap for submodel expansion.
pub const MAX_DEPTH: usize = 20;

/// Cap on flattened parts per document; documents beyond this are truncated
/// with a warning.
pub const MAX_PARTS: usize = 1024;
