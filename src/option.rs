//! Option declarations.

use crate::infer::{self, InferredType};
use crate::value::Value;

/// Where an option in the registered set came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    /// Declared by the caller.
    Declared,
    /// Derived from a config-file key.
    Config,
}

/// One named, typed option.
///
/// Named options are exposed as `--<name>`; config-derived names are dotted
/// paths such as `--arg2.obj2`.
///
/// ```ignore
/// let epochs = OptionSpec::new("epochs").default(1).help("Training epochs");
/// let model = OptionSpec::new("model").kind(InferredType::Sequence(ElementKind::Mixed));
/// let name = OptionSpec::positional("name");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct OptionSpec {
    name: String,
    kind: Option<InferredType>,
    default: Option<Value>,
    short: Option<char>,
    help: Option<String>,
    positional: bool,
    required: bool,
    origin: Origin,
}

impl OptionSpec {
    /// A `--name` option. Its type is inferred from the default if
    /// [`kind`](Self::kind) is not set, and is a string otherwise.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            kind: None,
            default: None,
            short: None,
            help: None,
            positional: false,
            required: false,
            origin: Origin::Declared,
        }
    }

    /// A required positional argument.
    pub fn positional(name: &str) -> Self {
        Self {
            positional: true,
            required: true,
            ..Self::new(name)
        }
    }

    pub(crate) fn from_config(path: &str, kind: InferredType, value: Value) -> Self {
        Self {
            kind: Some(kind),
            default: Some(value),
            origin: Origin::Config,
            ..Self::new(path)
        }
    }

    pub fn kind(mut self, kind: InferredType) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn default<V: Into<Value>>(mut self, value: V) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn short(mut self, flag: char) -> Self {
        self.short = Some(flag);
        self
    }

    pub fn help(mut self, text: &str) -> Self {
        self.help = Some(text.to_string());
        self
    }

    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Effective type: explicit, else inferred from the default, else string.
    pub fn value_type(&self) -> InferredType {
        self.kind
            .or_else(|| self.default.as_ref().and_then(infer::infer))
            .unwrap_or(InferredType::Str)
    }

    pub fn default_value(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    pub fn short_flag(&self) -> Option<char> {
        self.short
    }

    pub fn help_text(&self) -> Option<&str> {
        self.help.as_deref()
    }

    pub fn is_positional(&self) -> bool {
        self.positional
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    pub fn origin(&self) -> Origin {
        self.origin
    }

    /// Adopt a config value for an option the caller already declared.
    ///
    /// The config-inferred type wins, except that a fixed arity the caller
    /// set explicitly is kept when the config is also a fixed sequence. The
    /// config value becomes the default, which also satisfies `required`.
    pub(crate) fn adopt_config(mut self, inferred: InferredType, value: Value) -> Self {
        let kind = match (self.kind, inferred) {
            (
                Some(InferredType::FixedSequence { arity }),
                InferredType::FixedSequence { .. },
            ) => InferredType::FixedSequence { arity },
            _ => inferred,
        };
        self.kind = Some(kind);
        self.default = Some(value);
        self.required = false;
        self
    }
}

/// The reserved option that names the config file, `-c/--configfile` by default.
///
/// Never derived from config keys, and a config key with the same name is
/// ignored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigFileFlag {
    pub short: Option<char>,
    pub long: String,
}

impl Default for ConfigFileFlag {
    fn default() -> Self {
        Self {
            short: Some('c'),
            long: "configfile".into(),
        }
    }
}

impl ConfigFileFlag {
    pub(crate) fn to_option_spec(&self) -> OptionSpec {
        let spec = OptionSpec::new(&self.long)
            .kind(InferredType::Str)
            .help("Path to the configuration file");
        match self.short {
            Some(c) => spec.short(c),
            None => spec,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infer::ElementKind;

    #[test]
    fn type_inferred_from_default() {
        let spec = OptionSpec::new("epochs").default(1);
        assert_eq!(spec.value_type(), InferredType::Int);
    }

    #[test]
    fn explicit_kind_beats_default() {
        let spec = OptionSpec::new("rate").default(1).kind(InferredType::Float);
        assert_eq!(spec.value_type(), InferredType::Float);
    }

    #[test]
    fn no_kind_no_default_is_string() {
        assert_eq!(OptionSpec::new("datafile").value_type(), InferredType::Str);
    }

    #[test]
    fn positional_is_required() {
        let spec = OptionSpec::positional("name");
        assert!(spec.is_positional());
        assert!(spec.is_required());
        assert_eq!(spec.origin(), Origin::Declared);
    }

    #[test]
    fn adopt_config_overrides_type_and_default() {
        let spec = OptionSpec::new("epochs")
            .default(1)
            .short('e')
            .help("Epochs")
            .adopt_config(InferredType::Float, Value::Float(5.0));
        assert_eq!(spec.value_type(), InferredType::Float);
        assert_eq!(spec.default_value(), Some(&Value::Float(5.0)));
        assert_eq!(spec.short_flag(), Some('e'));
        assert_eq!(spec.help_text(), Some("Epochs"));
        assert_eq!(spec.name(), "epochs");
    }

    #[test]
    fn adopt_config_keeps_declared_arity() {
        let spec = OptionSpec::new("shape")
            .kind(InferredType::FixedSequence { arity: 3 })
            .adopt_config(
                InferredType::FixedSequence { arity: 2 },
                Value::Tuple(vec![Value::Int(1), Value::Int(2)]),
            );
        assert_eq!(spec.value_type(), InferredType::FixedSequence { arity: 3 });
    }

    #[test]
    fn adopt_config_replaces_non_fixed_kind() {
        let spec = OptionSpec::new("model")
            .kind(InferredType::Sequence(ElementKind::Mixed))
            .adopt_config(InferredType::Str, Value::Str("x".into()));
        assert_eq!(spec.value_type(), InferredType::Str);
    }

    #[test]
    fn adopt_config_clears_required() {
        let spec = OptionSpec::positional("name").adopt_config(InferredType::Str, "x".into());
        assert!(!spec.is_required());
        assert!(spec.is_positional());
    }

    #[test]
    fn config_file_flag_spec() {
        let spec = ConfigFileFlag::default().to_option_spec();
        assert_eq!(spec.name(), "configfile");
        assert_eq!(spec.short_flag(), Some('c'));
        assert_eq!(spec.value_type(), InferredType::Str);
    }
}
