//! The `markwise export` command.

use std::path::PathBuf;

use anyhow::{Context, Result};

use markwise_core::traits::{ModuleStore, StudentStore};
use markwise_providers::load_config_from;
use markwise_report::{write_html_results, write_results_csv};
use markwise_store::JsonStore;

pub async fn execute(
    module_id: String,
    format: String,
    output: Option<PathBuf>,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let store = JsonStore::new(&config.data_dir);

    let module = store
        .find_module(&module_id)
        .await?
        .with_context(|| format!("module not found: {module_id}"))?;
    let students = store.list_students(&module_id).await?;

    let path = match format.as_str() {
        "csv" => {
            let path = output.unwrap_or_else(|| PathBuf::from(format!("{module_id}-results.csv")));
            write_results_csv(&module, &students, &path)?;
            path
        }
        "html" => {
            let path = output.unwrap_or_else(|| PathBuf::from(format!("{module_id}-results.html")));
            write_html_results(&module, &students, &path)?;
            path
        }
        other => anyhow::bail!("unknown format: {other} (expected csv or html)"),
    };

    println!(
        "Exported {} students to {}",
        students.len(),
        path.display()
    );
    Ok(())
}
