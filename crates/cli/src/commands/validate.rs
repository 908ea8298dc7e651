//! Scenario file validation command

use anyhow::{bail, Context, Result};
use oracle_lib::{TestScenario, ValidationError, ValidationReport, Validator, ValidatorConfig};
use serde::Serialize;
use std::path::Path;
use tabled::Tabled;

use crate::output::{color_status, print_error, print_json, print_success, print_table, OutputFormat};

/// Row for the validation report table
#[derive(Tabled, Serialize)]
struct ValidationRow {
    #[tabled(rename = "Scenario")]
    scenario: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Defects")]
    defects: usize,
    #[tabled(rename = "Warnings")]
    warnings: usize,
    #[tabled(rename = "Details")]
    details: String,
}

impl ValidationRow {
    fn from_result(result: &Result<ValidationReport, ValidationError>) -> Self {
        match result {
            Ok(report) => Self {
                scenario: report.scenario.clone(),
                status: if report.is_clean() { "valid" } else { "warning" }.to_string(),
                defects: 0,
                warnings: report.warnings.len(),
                details: join(report.warnings.iter().map(ToString::to_string)),
            },
            Err(err) => Self {
                scenario: err.scenario.clone(),
                status: "invalid".to_string(),
                defects: err.defects.len(),
                warnings: err.warnings.len(),
                details: join(err.defects.iter().map(ToString::to_string)),
            },
        }
    }
}

fn join(items: impl Iterator<Item = String>) -> String {
    items.collect::<Vec<_>>().join("; ")
}

/// Read scenarios from `path`
pub fn load_scenarios(path: &Path) -> Result<Vec<TestScenario>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse scenarios from {}", path.display()))
}

/// Validate every scenario in `path`; fails if any scenario is invalid
pub fn run(path: &Path, config: ValidatorConfig, format: OutputFormat) -> Result<()> {
    let scenarios = load_scenarios(path)?;
    let validator = Validator::with_config(config);

    let rows: Vec<ValidationRow> = scenarios
        .iter()
        .map(|s| ValidationRow::from_result(&validator.validate(s)))
        .collect();
    let failed = rows.iter().filter(|r| r.status == "invalid").count();

    match format {
        OutputFormat::Json => print_json(&rows)?,
        OutputFormat::Table => {
            let colored: Vec<ValidationRow> = rows
                .into_iter()
                .map(|r| ValidationRow {
                    status: color_status(&r.status),
                    ..r
                })
                .collect();
            print_table(&colored, format)?;
        }
    }

    if failed > 0 {
        print_error(&format!("{} of {} scenarios failed validation", failed, scenarios.len()));
        bail!("validation failed for {} scenario(s)", failed);
    }

    if matches!(format, OutputFormat::Table) {
        print_success(&format!("All {} scenarios valid", scenarios.len()));
    }
    Ok(())
}
