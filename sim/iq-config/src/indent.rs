//! Indented key/value document model.
//!
//! The simulator's text formats (robot definitions, drive-port maps, scenes)
//! all use the same surface syntax: two-space indentation for nesting,
//! `key: value` pairs, `- ` prefixed list items, `[a, b, c]` inline arrays,
//! and `#` comments. This module parses that syntax once into a small node
//! tree the schema loaders walk.
//!
//! # Shape
//!
//! ```text
//! drivetrain:                 Node { key: "drivetrain", value: None }
//!   type: tank                  child Node { key: "type", value: Some("tank") }
//! motors:
//!   - submodel: LeftDrive     child Node { key: "submodel", list_item: true, .. }
//!     port: 1                   its child Node { key: "port", .. }
//! ```
//!
//! A list item's inline pair becomes the item node itself; lines indented
//! under the item become its children, which matches how the schemas use
//! them (the inline pair identifies the element, the children configure it).

use nalgebra::Vector3;

/// One node of a parsed document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Node {
    /// Key text, trimmed.
    pub key: String,
    /// Scalar value, if the line was `key: value` rather than `key:`.
    pub value: Option<String>,
    /// Whether the line carried a `- ` list prefix.
    pub list_item: bool,
    /// Nested lines.
    pub children: Vec<Node>,
}

impl Node {
    /// First child with the given key.
    #[must_use]
    pub fn child(&self, key: &str) -> Option<&Node> {
        self.children.iter().find(|n| n.key == key)
    }

    /// All children carrying the list-item flag.
    pub fn list_items(&self) -> impl Iterator<Item = &Node> {
        self.children.iter().filter(|n| n.list_item)
    }

    /// The scalar value of the child with the given key.
    #[must_use]
    pub fn child_value(&self, key: &str) -> Option<&str> {
        self.child(key).and_then(|n| n.value.as_deref())
    }

    /// The scalar value, trimmed.
    #[must_use]
    pub fn str_value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    /// Parse the value as `f64`.
    #[must_use]
    pub fn f64_value(&self) -> Option<f64> {
        self.value.as_deref().and_then(|v| v.parse().ok())
    }

    /// Parse the value as an unsigned integer.
    #[must_use]
    pub fn u32_value(&self) -> Option<u32> {
        self.value.as_deref().and_then(|v| v.parse().ok())
    }

    /// Parse the value as a boolean (`true`/`false`).
    #[must_use]
    pub fn bool_value(&self) -> Option<bool> {
        match self.value.as_deref() {
            Some("true") => Some(true),
            Some("false") => Some(false),
            _ => None,
        }
    }

    /// Parse the value as an inline float array of any length.
    #[must_use]
    pub fn floats_value(&self) -> Option<Vec<f64>> {
        self.value.as_deref().and_then(parse_float_array)
    }

    /// Parse the value as a 3-vector `[x, y, z]`.
    #[must_use]
    pub fn vec3_value(&self) -> Option<Vector3<f64>> {
        let floats = self.floats_value()?;
        (floats.len() >= 3).then(|| Vector3::new(floats[0], floats[1], floats[2]))
    }

    /// Parse the value as a pair `[a, b]`.
    #[must_use]
    pub fn vec2_value(&self) -> Option<[f64; 2]> {
        let floats = self.floats_value()?;
        (floats.len() >= 2).then(|| [floats[0], floats[1]])
    }
}

/// Parse an inline array such as `[1, -2.5, 3]`.
#[must_use]
pub fn parse_float_array(text: &str) -> Option<Vec<f64>> {
    let inner = text.trim().strip_prefix('[')?.strip_suffix(']')?;
    let mut out = Vec::new();
    for piece in inner.split(',') {
        let piece = piece.trim();
        if piece.is_empty() {
            continue;
        }
        out.push(piece.parse().ok()?);
    }
    Some(out)
}

/// A parsed document: the top-level nodes in file order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Document {
    /// Nodes at indentation zero.
    pub roots: Vec<Node>,
}

impl Document {
    /// Parse a document from text. Never fails: unparseable lines are
    /// simply absent from the tree, matching the leniency of the formats.
    #[must_use]
    pub fn parse(input: &str) -> Self {
        let lines: Vec<RawLine> = input.lines().filter_map(RawLine::parse).collect();
        let mut pos = 0;
        let roots = build_block(&lines, &mut pos, 0);
        Self { roots }
    }

    /// First root node with the given key.
    #[must_use]
    pub fn root(&self, key: &str) -> Option<&Node> {
        self.roots.iter().find(|n| n.key == key)
    }

    /// The scalar value of the root with the given key.
    #[must_use]
    pub fn root_value(&self, key: &str) -> Option<&str> {
        self.root(key).and_then(|n| n.value.as_deref())
    }

    /// Whether the document parsed to nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }
}

/// A significant line before tree assembly.
#[derive(Debug)]
struct RawLine {
    indent: usize,
    list_item: bool,
    key: String,
    value: Option<String>,
}

impl RawLine {
    fn parse(line: &str) -> Option<Self> {
        let trimmed_end = line.trim_end();
        let content = trimmed_end.trim_start();
        if content.is_empty() || content.starts_with('#') {
            return None;
        }
        let mut indent = trimmed_end.len() - content.len();

        let (list_item, content) = match content.strip_prefix("- ") {
            Some(rest) => {
                // The dash occupies indentation; children of the item sit
                // two spaces deeper, aligned with the inline key.
                indent += 2;
                (true, rest)
            }
            None => (false, content),
        };

        let (key, value) = match content.split_once(':') {
            Some((key, value)) => {
                let value = value.trim();
                (
                    key.trim().to_string(),
                    (!value.is_empty()).then(|| value.to_string()),
                )
            }
            // A bare token is kept as a valueless key.
            None => (content.trim().to_string(), None),
        };

        Some(Self {
            indent,
            list_item,
            key,
            value,
        })
    }
}

/// Assemble the block starting at `pos` whose lines are indented at least
/// `min_indent`; returns when a shallower line is reached.
///
/// Within a block, a `- ` item starts a list element; plain `key: value`
/// lines at the same indent that follow it configure that element (they
/// align with the item's inline key), so they become its children rather
/// than block siblings.
fn build_block(lines: &[RawLine], pos: &mut usize, min_indent: usize) -> Vec<Node> {
    let mut nodes: Vec<Node> = Vec::new();
    let mut current_item: Option<usize> = None;

    let Some(first) = lines.get(*pos) else {
        return nodes;
    };
    if first.indent < min_indent {
        return nodes;
    }
    let block_indent = first.indent;

    while let Some(line) = lines.get(*pos) {
        if line.indent < block_indent {
            break;
        }
        if line.indent > block_indent {
            // Deeper than the block: nest under the most recent node.
            let children = build_block(lines, pos, block_indent + 1);
            if let Some(target) = attach_target(&mut nodes, current_item) {
                target.children.extend(children);
            }
            continue;
        }

        let node = Node {
            key: line.key.clone(),
            value: line.value.clone(),
            list_item: line.list_item,
            children: Vec::new(),
        };
        *pos += 1;

        if node.list_item {
            nodes.push(node);
            current_item = Some(nodes.len() - 1);
        } else if let Some(item) = current_item {
            nodes[item].children.push(node);
        } else {
            nodes.push(node);
        }
    }

    nodes
}

/// The node deeper lines should nest under: the latest child of the open
/// list element, or the latest block sibling.
fn attach_target(nodes: &mut [Node], current_item: Option<usize>) -> Option<&mut Node> {
    match current_item {
        Some(index) => {
            let item = &mut nodes[index];
            if item.children.is_empty() {
                Some(item)
            } else {
                item.children.last_mut()
            }
        }
        None => nodes.last_mut(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_nesting() {
        let doc = Document::parse(
            "name: Scene One\n\
             physics:\n\
             \x20\x20friction: 0.8\n\
             \x20\x20gravity: 386.1\n",
        );
        assert_eq!(doc.root_value("name"), Some("Scene One"));
        let physics = doc.root("physics").unwrap();
        assert_eq!(physics.child("friction").unwrap().f64_value(), Some(0.8));
        assert_eq!(physics.child("gravity").unwrap().f64_value(), Some(386.1));
    }

    #[test]
    fn test_list_items_with_trailing_keys() {
        let doc = Document::parse(
            "motors:\n\
             \x20\x20- submodel: LeftDrive\n\
             \x20\x20\x20\x20port: 1\n\
             \x20\x20- submodel: RightDrive\n\
             \x20\x20\x20\x20port: 6\n",
        );
        let motors = doc.root("motors").unwrap();
        let items: Vec<_> = motors.list_items().collect();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].str_value(), Some("LeftDrive"));
        assert_eq!(items[0].child_value("port"), Some("1"));
        assert_eq!(items[1].child_value("port"), Some("6"));
    }

    #[test]
    fn test_inline_arrays() {
        let doc = Document::parse("rotation_center: [10, -20.5, 3]\n");
        let v = doc.root("rotation_center").unwrap().vec3_value().unwrap();
        assert_eq!(v.x, 10.0);
        assert_eq!(v.y, -20.5);
        assert_eq!(v.z, 3.0);

        assert_eq!(parse_float_array("[1, 2]").unwrap(), vec![1.0, 2.0]);
        assert!(parse_float_array("1, 2").is_none());
        assert!(parse_float_array("[1, x]").is_none());
    }

    #[test]
    fn test_comments_and_blanks_are_skipped() {
        let doc = Document::parse(
            "# header comment\n\
             \n\
             key: value\n\
             \x20\x20# indented comment\n",
        );
        assert_eq!(doc.roots.len(), 1);
        assert_eq!(doc.root_value("key"), Some("value"));
    }

    #[test]
    fn test_named_map_entries() {
        let doc = Document::parse(
            "wheel_assemblies:\n\
             \x20\x20left_front:\n\
             \x20\x20\x20\x20outer_diameter_mm: 200\n\
             \x20\x20\x20\x20parts:\n\
             \x20\x20\x20\x20\x20\x20- part: 228-2500-208c01\n\
             \x20\x20right_front:\n\
             \x20\x20\x20\x20outer_diameter_mm: 200\n",
        );
        let assemblies = doc.root("wheel_assemblies").unwrap();
        assert_eq!(assemblies.children.len(), 2);
        let left = assemblies.child("left_front").unwrap();
        let parts = left.child("parts").unwrap();
        assert_eq!(
            parts.list_items().next().unwrap().str_value(),
            Some("228-2500-208c01")
        );
    }

    #[test]
    fn test_bool_values() {
        let doc = Document::parse("has_brain: true\nother: yes\n");
        assert_eq!(doc.root("has_brain").unwrap().bool_value(), Some(true));
        assert_eq!(doc.root("other").unwrap().bool_value(), None);
    }
}
