//! The result of a parse: a flat, read-only view of every merged value.

use std::collections::BTreeMap;
use std::fmt;

use serde::de::DeserializeOwned;

use crate::error::DotfigError;
use crate::flatten::unflatten;
use crate::value::{ConfigTree, Value};

/// Which precedence layer a merged value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layer {
    CommandLine,
    ConfigFile,
    Default,
}

/// Merged values keyed by option name (dotted for config-derived keys).
///
/// Options with no value in any layer are present as [`Value::Null`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Namespace {
    values: BTreeMap<String, Value>,
    sources: BTreeMap<String, Layer>,
}

impl Namespace {
    pub(crate) fn insert(&mut self, key: &str, value: Value, layer: Layer) {
        self.values.insert(key.to_string(), value);
        self.sources.insert(key.to_string(), layer);
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Layer that supplied `key`.
    pub fn source(&self, key: &str) -> Option<Layer> {
        self.sources.get(key).copied()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Plain mapping of the merged values.
    ///
    /// With `expand == false` keys stay dotted (`arg2.obj2`); with
    /// `expand == true` they are re-split into nested mappings.
    pub fn to_dict(&self, expand: bool) -> ConfigTree {
        if expand {
            unflatten(self.values.iter().map(|(k, v)| (k, v.clone())))
        } else {
            self.values.clone()
        }
    }

    /// Deserialize the expanded dict into `T`.
    pub fn extract<T: DeserializeOwned>(&self) -> Result<T, DotfigError> {
        let json = serde_json::to_value(self.to_dict(true)).map_err(|e| {
            DotfigError::InvalidValue {
                key: "<namespace>".into(),
                reason: e.to_string(),
            }
        })?;
        serde_json::from_value(json).map_err(|e| DotfigError::InvalidValue {
            key: "<namespace>".into(),
            reason: e.to_string(),
        })
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (key, value)) in self.values.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            match value {
                Value::Null => write!(f, "{key} = <not set>")?,
                other => write!(f, "{key} = {other}")?,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    fn namespace() -> Namespace {
        let mut ns = Namespace::default();
        ns.insert("arg1", Value::Int(3), Layer::CommandLine);
        ns.insert(
            "arg2.obj1",
            Value::Seq(vec![Value::Int(3), Value::Int(4)]),
            Layer::ConfigFile,
        );
        ns.insert("arg2.obj2", Value::Str("bar".into()), Layer::CommandLine);
        ns.insert("datafile", Value::Null, Layer::Default);
        ns
    }

    #[test]
    fn flat_dict_keeps_dotted_keys() {
        let dict = namespace().to_dict(false);
        assert_eq!(dict["arg2.obj2"], Value::Str("bar".into()));
        assert!(!dict.contains_key("arg2"));
    }

    #[test]
    fn expanded_dict_is_nested() {
        let dict = namespace().to_dict(true);
        let arg2 = dict["arg2"].as_map().unwrap();
        assert_eq!(arg2["obj1"], Value::Seq(vec![Value::Int(3), Value::Int(4)]));
        assert_eq!(arg2["obj2"], Value::Str("bar".into()));
        assert_eq!(dict["arg1"], Value::Int(3));
    }

    #[test]
    fn source_reports_layer() {
        let ns = namespace();
        assert_eq!(ns.source("arg1"), Some(Layer::CommandLine));
        assert_eq!(ns.source("arg2.obj1"), Some(Layer::ConfigFile));
        assert_eq!(ns.source("missing"), None);
    }

    #[test]
    fn extract_into_struct() {
        #[derive(Deserialize)]
        struct Inner {
            obj1: Vec<i64>,
            obj2: String,
        }
        #[derive(Deserialize)]
        struct Args {
            arg1: i64,
            arg2: Inner,
            datafile: Option<String>,
        }
        let args: Args = namespace().extract().unwrap();
        assert_eq!(args.arg1, 3);
        assert_eq!(args.arg2.obj1, vec![3, 4]);
        assert_eq!(args.arg2.obj2, "bar");
        assert!(args.datafile.is_none());
    }

    #[test]
    fn extract_type_mismatch_errors() {
        #[derive(Debug, Deserialize)]
        #[allow(dead_code)]
        struct Args {
            arg1: String,
        }
        let result: Result<Args, _> = namespace().extract();
        assert!(matches!(result, Err(DotfigError::InvalidValue { .. })));
    }

    #[test]
    fn display_lists_entries() {
        let text = namespace().to_string();
        assert!(text.contains("arg1 = 3"));
        assert!(text.contains("arg2.obj1 = [3,4]"));
        assert!(text.contains("datafile = <not set>"));
    }
}
