//! Type inference for config-derived options.
//!
//! The inferred type of a leaf decides how a command-line override for that
//! key is decoded. Inference is a pure function over [`Value`] shapes.

use std::fmt;

use crate::value::Value;

/// Element type recorded for an open-length sequence.
///
/// Informational: sequence tokens are classified element by element when
/// decoded, so a `Sequence(Int)` option still accepts `[1,two]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementKind {
    Int,
    Float,
    Str,
    Bool,
    /// Empty, heterogeneous, or containing non-primitive elements.
    Mixed,
}

/// The declared type of an option.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InferredType {
    Int,
    Float,
    Str,
    Bool,
    Sequence(ElementKind),
    FixedSequence { arity: usize },
}

impl InferredType {
    /// Placeholder shown in `--help` output.
    pub fn value_name(&self) -> String {
        match self {
            InferredType::Int => "INT".into(),
            InferredType::Float => "FLOAT".into(),
            InferredType::Str => "STR".into(),
            InferredType::Bool => "BOOL".into(),
            InferredType::Sequence(_) => "[A,B,..]".into(),
            InferredType::FixedSequence { arity } => {
                let slots: Vec<String> = (0..*arity).map(slot_name).collect();
                format!("({})", slots.join(","))
            }
        }
    }
}

fn slot_name(index: usize) -> String {
    // A..Z, then X26, X27, ..
    match u8::try_from(index) {
        Ok(i) if i < 26 => char::from(b'A' + i).to_string(),
        _ => format!("X{index}"),
    }
}

impl fmt::Display for InferredType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InferredType::Int => write!(f, "integer"),
            InferredType::Float => write!(f, "float"),
            InferredType::Str => write!(f, "string"),
            InferredType::Bool => write!(f, "boolean (yes/no, true/false, t/f, y/n, 1/0)"),
            InferredType::Sequence(ElementKind::Mixed) => write!(f, "comma-separated sequence"),
            InferredType::Sequence(kind) => {
                write!(f, "comma-separated sequence of {}", kind_name(*kind))
            }
            InferredType::FixedSequence { arity } => {
                write!(f, "comma-separated tuple of {arity} elements")
            }
        }
    }
}

fn kind_name(kind: ElementKind) -> &'static str {
    match kind {
        ElementKind::Int => "integers",
        ElementKind::Float => "floats",
        ElementKind::Str => "strings",
        ElementKind::Bool => "booleans",
        ElementKind::Mixed => "values",
    }
}

/// Infer the option type for a config leaf.
///
/// Returns `None` for mappings: they are expanded into dotted keys by the
/// flattener and never registered as options themselves.
pub fn infer(value: &Value) -> Option<InferredType> {
    let ty = match value {
        // Null stays overridable by a plain string from the command line.
        Value::Null => InferredType::Str,
        Value::Bool(_) => InferredType::Bool,
        Value::Int(_) => InferredType::Int,
        Value::Float(_) => InferredType::Float,
        Value::Str(_) => InferredType::Str,
        Value::Seq(items) => InferredType::Sequence(element_kind(items)),
        Value::Tuple(items) => InferredType::FixedSequence { arity: items.len() },
        Value::Map(_) => return None,
    };
    Some(ty)
}

fn primitive_kind(value: &Value) -> Option<ElementKind> {
    match value {
        Value::Bool(_) => Some(ElementKind::Bool),
        Value::Int(_) => Some(ElementKind::Int),
        Value::Float(_) => Some(ElementKind::Float),
        Value::Str(_) => Some(ElementKind::Str),
        _ => None,
    }
}

fn element_kind(items: &[Value]) -> ElementKind {
    let mut kinds = items.iter().map(primitive_kind);
    let Some(Some(first)) = kinds.next() else {
        return ElementKind::Mixed;
    };
    if kinds.all(|k| k == Some(first)) {
        first
    } else {
        ElementKind::Mixed
    }
}
