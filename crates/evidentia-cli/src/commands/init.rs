//! Init command implementation.

use crate::commands::Context;
use crate::error::Result;
use evidentia_domain::{Repository, Snapshot};
use evidentia_store::RegistryStore;
use std::path::Path;
use tracing::info;

/// Execute the init command.
///
/// Creates an empty store unless one exists, and writes the current
/// configuration to `config_path` when no file is there yet.
pub fn execute_init(
    store: &mut RegistryStore,
    config_path: Option<&Path>,
    ctx: &Context<'_>,
) -> Result<()> {
    let formatter = ctx.formatter;

    if store.exists() {
        println!(
            "{}",
            formatter.warning(&format!(
                "Store already exists at {}; leaving it untouched",
                store.path().display()
            ))
        );
    } else {
        store.save(&Snapshot::new())?;
        info!(path = %store.path().display(), "created empty store");
        println!(
            "{}",
            formatter.success(&format!("Created empty store at {}", store.path().display()))
        );
    }

    if let Some(path) = config_path {
        if !path.exists() {
            ctx.config.save_to(path)?;
            println!(
                "{}",
                formatter.info(&format!("Wrote default configuration to {}", path.display()))
            );
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::testing::Harness;

    #[test]
    fn test_init_creates_store_and_config() {
        let harness = Harness::new();
        let mut store = harness.store();
        let config_path = harness.dir.path().join("config.toml");

        execute_init(&mut store, Some(&config_path), &harness.context()).unwrap();

        assert!(store.exists());
        assert!(harness.snapshot().studies.is_empty());
        assert!(config_path.exists());
    }

    #[test]
    fn test_init_keeps_existing_store() {
        let harness = Harness::new();
        harness.seed();
        let mut store = harness.store();

        execute_init(&mut store, None, &harness.context()).unwrap();

        assert_eq!(harness.snapshot().studies.len(), 2);
    }
}
