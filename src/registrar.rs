//! Derive the full option set from declared options and a flattened config.
//!
//! The caller's declarations are never mutated: every call builds a fresh
//! [`OptionSet`], so resolving twice with the same inputs registers the same
//! options.

use tracing::{debug, warn};

use crate::flatten::FlatEntry;
use crate::infer::infer;
use crate::option::OptionSpec;

/// Registered options, declared ones first, then config-derived ones in
/// flattened key order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OptionSet {
    options: Vec<OptionSpec>,
}

impl OptionSet {
    pub fn get(&self, name: &str) -> Option<&OptionSpec> {
        self.options.iter().find(|o| o.name() == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &OptionSpec> {
        self.options.iter()
    }

    pub fn len(&self) -> usize {
        self.options.len()
    }

    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }
}

/// Register an option for every config leaf, on top of `declared`.
///
/// - A leaf with no declared option of the same name becomes a new option
///   with the inferred type and the config value as its default.
/// - A leaf matching a declared option updates that option's type and
///   default (see [`OptionSpec::adopt_config`]); no duplicate is created.
/// - A leaf named `reserved` (the config-file option) is skipped.
///
/// Declaring the same name twice keeps the later declaration.
pub fn register(declared: &[OptionSpec], flat: &[FlatEntry], reserved: Option<&str>) -> OptionSet {
    let mut options: Vec<OptionSpec> = Vec::with_capacity(declared.len() + flat.len());

    for spec in declared {
        match options.iter_mut().find(|o| o.name() == spec.name()) {
            Some(slot) => *slot = spec.clone(),
            None => options.push(spec.clone()),
        }
    }

    for entry in flat {
        if reserved == Some(entry.path.as_str()) {
            warn!(key = %entry.path, "ignoring config key that names the reserved config-file option");
            continue;
        }
        let Some(inferred) = infer(&entry.value) else {
            continue;
        };
        match options.iter_mut().find(|o| o.name() == entry.path) {
            Some(slot) => {
                debug!(key = %entry.path, ty = %inferred, "config value overrides declared option");
                *slot = slot.clone().adopt_config(inferred, entry.value.clone());
            }
            None => {
                debug!(key = %entry.path, ty = %inferred, "registering config-derived option");
                options.push(OptionSpec::from_config(
                    &entry.path,
                    inferred,
                    entry.value.clone(),
                ));
            }
        }
    }

    OptionSet { options }
}
