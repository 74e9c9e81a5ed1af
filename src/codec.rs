//! Scalar codec: command-line tokens to typed values and back.
//!
//! Sequences are written as comma-separated elements, optionally wrapped in
//! one matching pair of `[]` or `()`: `[5,mode,35.6]`, `(3,224)`, `a,b`.
//! Each element is classified independently (integer, then float, then
//! trimmed string). Booleans are lenient: `yes/no`, `true/false`, `t/f`,
//! `y/n`, `1/0`, case-insensitive.

use crate::error::DotfigError;
use crate::infer::InferredType;
use crate::value::Value;

const TRUE_TOKENS: [&str; 5] = ["yes", "true", "t", "y", "1"];
const FALSE_TOKENS: [&str; 5] = ["no", "false", "f", "n", "0"];

/// Decode a command-line token for option `key` as type `ty`.
///
/// Every failure is [`DotfigError::TypeCoercion`] carrying the key, the token
/// and the expected type.
pub fn decode(key: &str, token: &str, ty: &InferredType) -> Result<Value, DotfigError> {
    decode_value(token, ty).map_err(|reason| DotfigError::TypeCoercion {
        key: key.to_string(),
        token: token.to_string(),
        expected: ty.to_string(),
        reason,
    })
}

fn decode_value(token: &str, ty: &InferredType) -> Result<Value, String> {
    match ty {
        InferredType::Int => token
            .trim()
            .parse::<i64>()
            .map(Value::Int)
            .map_err(|e| e.to_string()),
        InferredType::Float => token
            .trim()
            .parse::<f64>()
            .map(Value::Float)
            .map_err(|e| e.to_string()),
        InferredType::Str => Ok(Value::Str(token.to_string())),
        InferredType::Bool => parse_bool(token)
            .map(Value::Bool)
            .ok_or_else(|| "unrecognized boolean".to_string()),
        InferredType::Sequence(_) => parse_sequence(token).map(Value::Seq),
        InferredType::FixedSequence { arity } => {
            let items = parse_sequence(token)?;
            if items.len() != *arity {
                return Err(format!(
                    "expected {arity} elements, found {}",
                    items.len()
                ));
            }
            Ok(Value::Tuple(items))
        }
    }
}

/// Lenient, case-insensitive boolean parse.
pub fn parse_bool(token: &str) -> Option<bool> {
    let lowered = token.trim().to_ascii_lowercase();
    if TRUE_TOKENS.contains(&lowered.as_str()) {
        Some(true)
    } else if FALSE_TOKENS.contains(&lowered.as_str()) {
        Some(false)
    } else {
        None
    }
}

/// Split a sequence token into classified elements.
///
/// `[]`, `()` and the empty string decode to an empty sequence.
pub fn parse_sequence(token: &str) -> Result<Vec<Value>, String> {
    let inner = strip_brackets(token.trim())?;
    if inner.contains(['[', ']', '(', ')']) {
        return Err("nested or unbalanced brackets".into());
    }
    if inner.trim().is_empty() {
        return Ok(Vec::new());
    }
    Ok(inner.split(',').map(classify).collect())
}

fn strip_brackets(token: &str) -> Result<&str, String> {
    let open = token.chars().next();
    let close = token.chars().last();
    match (open, close) {
        (Some('['), Some(']')) | (Some('('), Some(')')) if token.len() >= 2 => {
            Ok(&token[1..token.len() - 1])
        }
        (Some('[' | '('), _) | (_, Some(']' | ')')) => {
            Err("unmatched or mismatched brackets".into())
        }
        _ => Ok(token),
    }
}

/// Integer, then float, then trimmed string.
fn classify(element: &str) -> Value {
    let element = element.trim();
    if let Ok(i) = element.parse::<i64>() {
        return Value::Int(i);
    }
    if let Ok(f) = element.parse::<f64>() {
        return Value::Float(f);
    }
    Value::Str(element.to_string())
}

/// Render a value as the token [`decode`] accepts for its inferred type.
///
/// Sequences render as `[a,b]`, tuples as `(a,b)`, null as the empty string.
/// Floats always carry a decimal point or exponent so they classify as
/// floats again inside a sequence.
pub fn encode(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Int(i) => i.to_string(),
        Value::Float(f) => format!("{f:?}"),
        Value::Str(s) => s.clone(),
        Value::Seq(items) => format!("[{}]", join(items)),
        Value::Tuple(items) => format!("({})", join(items)),
        Value::Map(map) => {
            let entries: Vec<String> = map
                .iter()
                .map(|(k, v)| format!("{k}={}", encode(v)))
                .collect();
            format!("{{{}}}", entries.join(","))
        }
    }
}

fn join(items: &[Value]) -> String {
    items.iter().map(encode).collect::<Vec<_>>().join(",")
}
