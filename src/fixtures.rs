#[cfg(test)]
pub mod test {
    use serde_json::json;

    use crate::codec;
    use crate::engine::{ParseEngine, ParsedLayer};
    use crate::error::DotfigError;
    use crate::registrar::OptionSet;
    use crate::tree::to_tree;
    use crate::value::ConfigTree;

    /// The config used throughout the tests:
    ///
    /// ```toml
    /// arg1 = 4
    /// arg3 = null   # JSON only
    /// epochs = 5
    ///
    /// [arg2]
    /// obj1 = [3, 4]
    /// obj2 = "foo"
    /// ```
    pub fn sample_tree() -> ConfigTree {
        to_tree(&json!({
            "arg1": 4,
            "arg2": {
                "obj1": [3, 4],
                "obj2": "foo",
            },
            "arg3": null,
            "epochs": 5,
        }))
        .unwrap()
    }

    #[test]
    fn sample_tree_shape() {
        let tree = sample_tree();
        assert_eq!(tree.len(), 4);
        assert!(tree["arg2"].as_map().is_some());
        assert!(tree["arg3"].is_null());
    }

    /// Minimal engine for exercising the resolver without clap.
    ///
    /// Accepts `--name value` and `--name=value` for named options and bare
    /// tokens for positionals, in declaration order.
    pub struct TokenEngine;

    impl ParseEngine for TokenEngine {
        fn parse(
            &self,
            options: &OptionSet,
            tokens: &[String],
        ) -> Result<ParsedLayer, DotfigError> {
            let mut parsed = ParsedLayer::new();
            let mut positionals = options.iter().filter(|o| o.is_positional());
            let mut iter = tokens.iter();

            while let Some(token) = iter.next() {
                let Some(flag) = token.strip_prefix("--") else {
                    let option = positionals
                        .next()
                        .ok_or_else(|| DotfigError::UnknownOption(token.clone()))?;
                    let value = codec::decode(option.name(), token, &option.value_type())?;
                    parsed.insert(option.name(), value);
                    continue;
                };
                let (name, inline) = match flag.split_once('=') {
                    Some((name, value)) => (name, Some(value.to_string())),
                    None => (flag, None),
                };
                let option = options
                    .get(name)
                    .filter(|o| !o.is_positional())
                    .ok_or_else(|| DotfigError::UnknownOption(token.clone()))?;
                let raw = match inline {
                    Some(v) => v,
                    None => iter.next().cloned().ok_or_else(|| DotfigError::InvalidValue {
                        key: name.to_string(),
                        reason: "missing value".into(),
                    })?,
                };
                let value = codec::decode(name, &raw, &option.value_type())?;
                parsed.insert(name, value);
            }
            Ok(parsed)
        }
    }
}
