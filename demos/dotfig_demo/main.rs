//! # dotfig demo application
//!
//! A sample training launcher that shows how config keys turn into flags.
//! This is **not** a real app; it exists to demonstrate and manually verify
//! dotfig's features.
//!
//! ## Running
//!
//! ```sh
//! cargo run --example dotfig_demo -- run1 -c demos/dotfig_demo/config.toml
//! ```
//!
//! ## Features demonstrated
//!
//! | Feature                   | How to exercise it                                                       |
//! |---------------------------|--------------------------------------------------------------------------|
//! | Config beats default      | `... run1 -c demos/dotfig_demo/config.toml` (epochs = 5, not 1)          |
//! | Top-level override        | `... run1 -c demos/dotfig_demo/config.toml --epochs 20`                  |
//! | Nested override           | `... run1 -c demos/dotfig_demo/config.toml --optimizer.name sgd`         |
//! | Sequence value            | `... run1 -c demos/dotfig_demo/config.toml --model [5,mode,35.6]`        |
//! | Lenient booleans          | `... run1 -c demos/dotfig_demo/config.toml --data.shuffle no`            |
//! | Generated help            | `... -c demos/dotfig_demo/config.toml --help`                            |
//! | Nested output             | `... run1 -c demos/dotfig_demo/config.toml --nested yes`                 |
//! | Debug logging             | `RUST_LOG=dotfig=debug cargo run --example dotfig_demo -- run1 -c ...`   |

use tracing_subscriber::EnvFilter;

use dotfig::{Dotfig, DotfigBuilder, DotfigError, ElementKind, InferredType, Layer, OptionSpec};

fn make_builder() -> DotfigBuilder {
    Dotfig::builder("dotfig-demo")
        .about("dotfig demo: a training launcher driven by a config file")
        .option(OptionSpec::positional("name").help("Run name"))
        .option(
            OptionSpec::new("datafile")
                .short('d')
                .help("Training data file"),
        )
        .option(
            OptionSpec::new("model")
                .kind(InferredType::Sequence(ElementKind::Mixed))
                .help("Model spec, e.g. [5,mode,35.6]"),
        )
        .option(OptionSpec::new("epochs").default(1).help("Training epochs"))
        .option(
            OptionSpec::new("nested")
                .default(false)
                .help("Print the result as nested tables (takes a value: --nested yes)"),
        )
}

fn layer_tag(layer: Option<Layer>) -> &'static str {
    match layer {
        Some(Layer::CommandLine) => "cli",
        Some(Layer::ConfigFile) => "file",
        Some(Layer::Default) | None => "default",
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let ns = match make_builder().parse() {
        Ok(ns) => ns,
        Err(DotfigError::Cli(e)) => e.exit(),
        Err(e) => {
            eprintln!("Failed to parse arguments:\n{e}");
            std::process::exit(2);
        }
    };

    if ns.get("nested").and_then(|v| v.as_bool()) == Some(true) {
        let nested = ns.to_dict(true);
        match toml::to_string_pretty(&nested) {
            Ok(text) => print!("{text}"),
            Err(e) => {
                eprintln!("Cannot render as TOML ({e}); flat view follows:\n{ns}");
            }
        }
        return;
    }

    let max_key_len = ns.keys().map(str::len).max().unwrap_or(0);
    for (key, value) in ns.iter() {
        let shown = if value.is_null() {
            "<not set>".to_string()
        } else {
            value.to_string()
        };
        println!(
            "{key:<max_key_len$}  {shown:<20} ({})",
            layer_tag(ns.source(key))
        );
    }
}
