//! End-to-end resolution through the public API: config file on disk, clap
//! engine, namespace out.

#![cfg(feature = "clap")]

use std::fs;
use std::path::PathBuf;

use dotfig::{
    ConfigTree, Dotfig, DotfigBuilder, DotfigError, ElementKind, InferredType, Layer, OptionSpec,
    Value, flatten, to_tree, unflatten,
};
use serde::Deserialize;
use tempfile::TempDir;

const TRAIN_TOML: &str = r#"
arg1 = 4
epochs = 5
verbose = false

[arg2]
obj1 = [3, 4]
obj2 = "foo"
"#;

const TRAIN_JSON: &str = r#"{
    "arg1": 4,
    "arg2": {"obj1": [3, 4], "obj2": "foo"},
    "arg3": null,
    "epochs": 5
}"#;

struct Fixture {
    _dir: TempDir,
    toml: String,
    json: String,
}

fn fixture() -> Fixture {
    let dir = TempDir::new().unwrap();
    let toml: PathBuf = dir.path().join("train.toml");
    let json: PathBuf = dir.path().join("train.json");
    fs::write(&toml, TRAIN_TOML).unwrap();
    fs::write(&json, TRAIN_JSON).unwrap();
    Fixture {
        toml: toml.to_string_lossy().into_owned(),
        json: json.to_string_lossy().into_owned(),
        _dir: dir,
    }
}

fn train() -> DotfigBuilder {
    Dotfig::builder("train")
        .about("Train a model")
        .option(OptionSpec::positional("name"))
        .option(OptionSpec::new("datafile").short('d').help("Input data"))
        .option(OptionSpec::new("model").kind(InferredType::Sequence(ElementKind::Mixed)))
        .option(OptionSpec::new("arg1").default(1))
        .option(OptionSpec::new("epochs").default(1))
}

#[test]
fn config_beats_declared_default() {
    let fx = fixture();
    let ns = train().parse_from(["run1", "-c", fx.toml.as_str()]).unwrap();
    assert_eq!(ns.get("arg1"), Some(&Value::Int(4)));
    assert_eq!(ns.source("arg1"), Some(Layer::ConfigFile));
}

#[test]
fn command_line_beats_config() {
    let fx = fixture();
    let ns = train()
        .parse_from(["run1", "-c", fx.toml.as_str(), "--arg1", "3"])
        .unwrap();
    assert_eq!(ns.get("arg1"), Some(&Value::Int(3)));
    assert_eq!(ns.source("arg1"), Some(Layer::CommandLine));
}

#[test]
fn nested_override_is_per_key() {
    let fx = fixture();
    let ns = train()
        .parse_from(["run1", "--configfile", fx.toml.as_str(), "--arg2.obj2", "bar"])
        .unwrap();
    assert_eq!(
        ns.get("arg2.obj1"),
        Some(&Value::Seq(vec![Value::Int(3), Value::Int(4)]))
    );
    assert_eq!(ns.get("arg2.obj2"), Some(&Value::Str("bar".into())));

    let nested = ns.to_dict(true);
    let arg2 = nested["arg2"].as_map().unwrap();
    assert_eq!(arg2.len(), 2);
    assert_eq!(arg2["obj2"], Value::Str("bar".into()));
}

#[test]
fn null_config_value_accepts_string() {
    let fx = fixture();
    let ns = train()
        .parse_from(["run1", "-c", fx.json.as_str(), "--arg3", "hello"])
        .unwrap();
    assert_eq!(ns.get("arg3"), Some(&Value::Str("hello".into())));
}

#[test]
fn null_config_value_without_override_is_null() {
    let fx = fixture();
    let ns = train().parse_from(["run1", "-c", fx.json.as_str()]).unwrap();
    assert_eq!(ns.get("arg3"), Some(&Value::Null));
    assert_eq!(ns.get("datafile"), Some(&Value::Null));
}

#[test]
fn mixed_sequence_option() {
    let fx = fixture();
    let ns = train()
        .parse_from(["run1", "-c", fx.toml.as_str(), "--model", "[5,mode,35.6]"])
        .unwrap();
    assert_eq!(
        ns.get("model"),
        Some(&Value::Seq(vec![
            Value::Int(5),
            Value::Str("mode".into()),
            Value::Float(35.6),
        ]))
    );
}

#[test]
fn lenient_booleans() {
    let fx = fixture();
    for (token, expected) in [("yes", true), ("No", false), ("1", true), ("F", false)] {
        let ns = train()
            .parse_from(["run1", "-c", fx.toml.as_str(), "--verbose", token])
            .unwrap();
        assert_eq!(ns.get("verbose"), Some(&Value::Bool(expected)), "{token}");
    }
}

#[test]
fn unrecognized_boolean_is_coercion_error() {
    let fx = fixture();
    let err = train()
        .parse_from(["run1", "-c", fx.toml.as_str(), "--verbose", "maybe"])
        .unwrap_err();
    match err {
        DotfigError::TypeCoercion { key, token, .. } => {
            assert_eq!(key, "verbose");
            assert_eq!(token, "maybe");
        }
        other => panic!("Expected TypeCoercion, got {other:?}"),
    }
}

#[test]
fn declared_and_config_collision() {
    let fx = fixture();
    let ns = train().parse_from(["run1", "-c", fx.toml.as_str()]).unwrap();
    assert_eq!(ns.get("epochs"), Some(&Value::Int(5)));
    assert_eq!(ns.keys().filter(|k| *k == "epochs").count(), 1);
}

#[test]
fn positional_and_short_flag() {
    let fx = fixture();
    let ns = train()
        .parse_from(["run1", "-c", fx.toml.as_str(), "-d", "data.csv"])
        .unwrap();
    assert_eq!(ns.get("name"), Some(&Value::Str("run1".into())));
    assert_eq!(ns.get("datafile"), Some(&Value::Str("data.csv".into())));
}

#[test]
fn unknown_option_is_rejected() {
    let fx = fixture();
    let err = train()
        .parse_from(["run1", "-c", fx.toml.as_str(), "--arg9", "1"])
        .unwrap_err();
    assert!(matches!(err, DotfigError::UnknownOption(_)));
}

#[test]
fn parse_known_returns_unrecognized_tokens() {
    let fx = fixture();
    let (ns, rest) = train()
        .parse_known_from([
            "run1",
            "-c",
            fx.toml.as_str(),
            "--lr",
            "0.1",
            "--arg2.obj2",
            "bar",
        ])
        .unwrap();
    assert_eq!(ns.get("name"), Some(&Value::Str("run1".into())));
    assert_eq!(ns.get("arg2.obj2"), Some(&Value::Str("bar".into())));
    assert_eq!(ns.get("arg1"), Some(&Value::Int(4)));
    assert_eq!(rest, vec!["--lr".to_string(), "0.1".to_string()]);
}

#[test]
fn parse_known_with_nothing_left_matches_parse() {
    let fx = fixture();
    let tokens = ["run1", "-c", fx.toml.as_str(), "--epochs", "8"];
    let (ns, rest) = train().parse_known_from(tokens).unwrap();
    assert!(rest.is_empty());
    assert_eq!(ns, train().parse_from(tokens).unwrap());
}

#[test]
fn repeated_option_last_value_wins() {
    let fx = fixture();
    let ns = train()
        .parse_from(["run1", "-c", fx.toml.as_str(), "--arg1", "3", "--arg1", "7"])
        .unwrap();
    assert_eq!(ns.get("arg1"), Some(&Value::Int(7)));

    let tree = to_tree(&serde_json::json!({"arg1": 4})).unwrap();
    let ns = Dotfig::builder("train")
        .resolve_with_tree(["--arg1", "3", "--arg1", "7"], tree)
        .unwrap();
    assert_eq!(ns.get("arg1"), Some(&Value::Int(7)));
}

#[test]
fn dash_prefixed_config_key_is_rejected() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("bad.toml");
    fs::write(&path, "\"-x\" = 1\n").unwrap();
    let err = train()
        .parse_from(["run1", "-c", path.to_str().unwrap()])
        .unwrap_err();
    assert!(matches!(err, DotfigError::MalformedConfigKey { .. }));
}

#[test]
fn missing_config_flag_is_rejected() {
    let err = train().parse_from(["run1"]).unwrap_err();
    assert!(matches!(err, DotfigError::MissingConfigFile { .. }));
}

#[test]
fn repeated_parses_agree() {
    let fx = fixture();
    let builder = train();
    let tokens = ["run1", "-c", fx.toml.as_str(), "--arg2.obj2", "bar"];
    let first = builder.parse_from(tokens).unwrap();
    let second = builder.parse_from(tokens).unwrap();
    assert_eq!(first, second);
}

#[test]
fn help_lists_config_keys() {
    let fx = fixture();
    let err = train()
        .parse_from(["-c", fx.toml.as_str(), "--help"])
        .unwrap_err();
    match err {
        DotfigError::Cli(e) => {
            assert_eq!(e.kind(), clap::error::ErrorKind::DisplayHelp);
            let text = e.to_string();
            assert!(text.contains("--arg2.obj1"));
            assert!(text.contains("--epochs"));
        }
        other => panic!("Expected help display, got {other:?}"),
    }
}

#[test]
fn extract_into_struct() {
    #[derive(Debug, Deserialize)]
    struct Arg2 {
        obj1: Vec<i64>,
        obj2: String,
    }
    #[derive(Debug, Deserialize)]
    struct Args {
        name: String,
        epochs: i64,
        arg2: Arg2,
    }

    let fx = fixture();
    let args: Args = train()
        .parse_from(["run1", "-c", fx.toml.as_str(), "--epochs", "10"])
        .unwrap()
        .extract()
        .unwrap();
    assert_eq!(args.name, "run1");
    assert_eq!(args.epochs, 10);
    assert_eq!(args.arg2.obj1, vec![3, 4]);
    assert_eq!(args.arg2.obj2, "foo");
}

#[test]
fn tuple_tree_enforces_arity() {
    #[derive(serde::Serialize)]
    struct Conf {
        shape: (i64, i64),
    }
    let tree: ConfigTree = to_tree(&Conf { shape: (3, 224) }).unwrap();
    let builder = Dotfig::builder("train");

    let ns = builder
        .resolve_with_tree(["--shape", "(1,2)"], tree.clone())
        .unwrap();
    assert_eq!(
        ns.get("shape"),
        Some(&Value::Tuple(vec![Value::Int(1), Value::Int(2)]))
    );

    let err = builder
        .resolve_with_tree(["--shape", "(1,2,3)"], tree)
        .unwrap_err();
    assert!(matches!(err, DotfigError::TypeCoercion { .. }));
}

#[test]
fn flatten_round_trip() {
    let tree = dotfig::parse_config(std::path::Path::new("t.json"), TRAIN_JSON).unwrap();
    let rebuilt = unflatten(flatten(&tree).into_iter().map(|e| (e.path, e.value)));
    assert_eq!(rebuilt, tree);
}
