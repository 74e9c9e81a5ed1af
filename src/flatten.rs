//! Dotted-path flattening of a [`ConfigTree`], and its inverse.
//!
//! `{arg2 = {obj1 = [3, 4]}}` flattens to `[("arg2.obj1", [3, 4])]`; every
//! non-mapping value is a leaf. [`unflatten`] re-splits paths on `.` and
//! deep-merges the pieces back together.

use crate::merge::deep_merge;
use crate::value::{ConfigTree, Value};

/// One leaf of a flattened tree.
#[derive(Debug, Clone, PartialEq)]
pub struct FlatEntry {
    pub path: String,
    pub value: Value,
}

/// Join a path prefix and a key with `.`.
pub fn dotted(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{prefix}.{key}")
    }
}

/// Depth-first flatten, in key order. Empty nested mappings emit nothing.
pub fn flatten(tree: &ConfigTree) -> Vec<FlatEntry> {
    let mut out = Vec::new();
    walk(tree, "", &mut out);
    out
}

fn walk(tree: &ConfigTree, prefix: &str, out: &mut Vec<FlatEntry>) {
    for (key, value) in tree {
        let path = dotted(prefix, key);
        match value {
            Value::Map(nested) => walk(nested, &path, out),
            leaf => out.push(FlatEntry {
                path,
                value: leaf.clone(),
            }),
        }
    }
}

/// Rebuild nesting from dotted paths.
///
/// Entries are merged in iteration order with [`deep_merge`] semantics: when
/// `a` and `a.b` both appear, whichever comes later wins. Sorted input (as
/// from a `BTreeMap`) puts `a` first, so the nested mapping replaces the
/// scalar.
pub fn unflatten<I, K>(entries: I) -> ConfigTree
where
    I: IntoIterator<Item = (K, Value)>,
    K: AsRef<str>,
{
    let mut tree = ConfigTree::new();
    for (path, value) in entries {
        tree = deep_merge(tree, single_path(path.as_ref(), value));
    }
    tree
}

/// `("a.b.c", v)` becomes `{a = {b = {c = v}}}`.
fn single_path(path: &str, value: Value) -> ConfigTree {
    let mut segments = path.rsplit('.');
    let leaf = segments.next().unwrap_or(path);
    let mut tree = ConfigTree::new();
    tree.insert(leaf.to_string(), value);
    for segment in segments {
        let mut parent = ConfigTree::new();
        parent.insert(segment.to_string(), Value::Map(tree));
        tree = parent;
    }
    tree
}
