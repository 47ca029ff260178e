//! Datasets command implementation.

use super::{print_json, CliResult};
use recset_core::{DatasetContext, DatasetRegistry};
use serde::Serialize;

/// A registered dataset.
#[derive(Debug, Serialize)]
pub struct DatasetInfo {
    /// Canonical `category/name`.
    pub name: String,
    /// Where its files live.
    pub working_dir: String,
    /// Whether the working directory exists.
    pub present: bool,
}

/// Runs the datasets command.
pub fn run(registry: &DatasetRegistry, ctx: &DatasetContext, format: &str) -> CliResult<()> {
    let datasets = describe(registry, ctx)?;

    match format {
        "json" => print_json(&datasets)?,
        _ => {
            println!("Registered datasets ({}):", datasets.len());
            for info in &datasets {
                let marker = if info.present { "*" } else { " " };
                println!("  {marker} {:<36} {}", info.name, info.working_dir);
            }
            println!();
            println!("* = working directory exists");
        }
    }
    Ok(())
}

/// Describes every registered dataset.
pub fn describe(registry: &DatasetRegistry, ctx: &DatasetContext) -> CliResult<Vec<DatasetInfo>> {
    registry
        .names()
        .into_iter()
        .map(|key| {
            let dataset = registry.get_by_key(&key, ctx)?;
            let dir = dataset.working_dir();
            Ok(DatasetInfo {
                name: key,
                present: dir.is_dir(),
                working_dir: dir.display().to_string(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use recset_core::{register_builtin, Config};
    use recset_testkit::prelude::*;

    #[test]
    fn describes_builtins() {
        with_test_dir(|dir| {
            std::fs::create_dir_all(dir.path().join("vision").join("cifar10")).unwrap();
            let ctx = DatasetContext::new(Config::new().working_directory(dir.path()));
            let mut registry = DatasetRegistry::new();
            register_builtin(&mut registry).unwrap();

            let infos = describe(&registry, &ctx).unwrap();
            assert_eq!(infos.len(), registry.len());
            let cifar = infos.iter().find(|i| i.name == "vision/cifar10").unwrap();
            assert!(cifar.present);
            assert!(infos.iter().filter(|i| i.present).count() == 1);
        });
    }
}
