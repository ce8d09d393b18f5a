//! `ulv check` – validate a batch of URLs and print the outcomes.

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

use ulv_core::batch::BatchValidator;
use ulv_core::config::UlvConfig;
use ulv_core::outcome::ValidationOutcome;

pub fn run_check(
    cfg: &UlvConfig,
    mut urls: Vec<String>,
    file: Option<&Path>,
    json: bool,
) -> Result<()> {
    if let Some(path) = file {
        let data = fs::read_to_string(path)
            .with_context(|| format!("reading URL list {}", path.display()))?;
        urls.extend(
            data.lines()
                .map(str::trim)
                .filter(|line| !line.is_empty() && !line.starts_with('#'))
                .map(str::to_string),
        );
    }
    if urls.is_empty() {
        anyhow::bail!("no URLs given (pass them as arguments or via --file)");
    }

    let validator = BatchValidator::new(cfg);
    let outcomes = validator.validate_batch(&urls);

    if json {
        println!("{}", serde_json::to_string_pretty(&outcomes)?);
    } else {
        print_table(&outcomes);
    }

    let broken = outcomes.iter().filter(|o| !o.is_valid).count();
    tracing::info!("checked {} unique URLs, {} broken", outcomes.len(), broken);
    Ok(())
}

fn print_table(outcomes: &[ValidationOutcome]) {
    println!("{:<8} {:<6} {:<24} {}", "STATE", "CODE", "DETAIL", "URL");
    for o in outcomes {
        let state = if o.is_valid { "ok" } else { "broken" };
        let code = o
            .status_code
            .map(|c| c.to_string())
            .unwrap_or_else(|| "-".to_string());
        let detail = o
            .error
            .as_deref()
            .or(o.status_text.as_deref())
            .unwrap_or("-");
        println!("{:<8} {:<6} {:<24} {}", state, code, detail, o.url);
    }
}
