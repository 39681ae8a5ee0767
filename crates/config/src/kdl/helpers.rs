//! KDL parsing helper functions.
//!
//! Common utilities for extracting values from KDL nodes.

/// Convert a byte offset to line and column numbers (1-indexed)
pub fn offset_to_line_col(content: &str, offset: usize) -> (usize, usize) {
    let mut line = 1;
    let mut col = 1;
    for (i, ch) in content.char_indices() {
        if i >= offset {
            break;
        }
        if ch == '\n' {
            line += 1;
            col = 1;
        } else {
            col += 1;
        }
    }
    (line, col)
}

/// Helper to get a string entry from a KDL node
pub fn get_string_entry(node: &kdl::KdlNode, name: &str) -> Option<String> {
    node.children()
        .and_then(|children| children.get(name))
        .and_then(|n| n.entries().first())
        .and_then(|e| e.value().as_string())
        .map(|s| s.to_string())
}

/// Helper to get every positional string argument of a child node
///
/// `subject-alternative-names "a" "b"` yields `["a", "b"]`. A missing child
/// yields an empty list.
pub fn get_string_list_entry(node: &kdl::KdlNode, name: &str) -> Vec<String> {
    node.children()
        .and_then(|children| children.get(name))
        .map(|n| {
            n.entries()
                .iter()
                .filter(|e| e.name().is_none())
                .filter_map(|e| e.value().as_string())
                .map(|s| s.to_string())
                .collect()
        })
        .unwrap_or_default()
}

/// Helper to get the first argument of a node as a string
pub fn get_first_arg_string(node: &kdl::KdlNode) -> Option<String> {
    node.entries()
        .first()
        .and_then(|e| e.value().as_string())
        .map(|s| s.to_string())
}
