//! Catalog generation command

use anyhow::{Context, Result};
use oracle_lib::batch::{BatchOutcome, ScenarioWarning};
use oracle_lib::{CatalogConfig, OracleMetrics, ScenarioCatalog, TestScenario};
use serde::Serialize;
use std::path::Path;
use tabled::Tabled;

use crate::output::{
    color_classification, print_info, print_json, print_success, print_table, print_warning,
    OutputFormat,
};

/// Row for the accepted-scenarios table
#[derive(Tabled, Serialize)]
struct ScenarioRow {
    #[tabled(rename = "Scenario")]
    name: String,
    #[tabled(rename = "Mode")]
    mode: String,
    #[tabled(rename = "Kind")]
    kind: String,
    #[tabled(rename = "Replicas")]
    replicas: u32,
    #[tabled(rename = "CPU Req")]
    cpu_request: String,
    #[tabled(rename = "Mem Req")]
    memory_request: String,
    #[tabled(rename = "CPU")]
    cpu_class: String,
    #[tabled(rename = "Memory")]
    memory_class: String,
    #[tabled(rename = "Tags")]
    tags: String,
}

impl ScenarioRow {
    fn from_scenario(s: &TestScenario) -> Self {
        let (cpu_class, memory_class) = match s.expectation.bounds {
            Some(b) => (color_classification(b.cpu), color_classification(b.memory)),
            None => ("-".to_string(), "-".to_string()),
        };
        Self {
            name: s.name.clone(),
            mode: s.policy.mode.to_string(),
            kind: s.workload.kind.to_string(),
            replicas: s.workload.replicas,
            cpu_request: s.workload.resources.requests.cpu.format(),
            memory_request: s.workload.resources.requests.memory.format(),
            cpu_class,
            memory_class,
            tags: s.tag_list(),
        }
    }
}

#[derive(Serialize)]
struct DroppedEntry {
    scenario: String,
    error: String,
}

/// JSON report for a batch run
#[derive(Serialize)]
struct GenerateReport<'a> {
    generated_at: String,
    seed: u64,
    random_count: usize,
    accepted: usize,
    dropped: Vec<DroppedEntry>,
    warnings: &'a [ScenarioWarning],
    #[serde(skip_serializing_if = "Option::is_none")]
    output: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    scenarios: Option<&'a [TestScenario]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    metrics: Option<String>,
}

/// Run the comprehensive batch and report it
pub fn run(config: CatalogConfig, output: Option<&Path>, metrics: bool, format: OutputFormat) -> Result<()> {
    let (seed, random_count) = (config.seed, config.random_count);
    let outcome = ScenarioCatalog::new(config).comprehensive();
    let metrics_text = if metrics {
        Some(OracleMetrics::new().gather_text().context("Failed to encode metrics")?)
    } else {
        None
    };

    if let Some(path) = output {
        let json = serde_json::to_string_pretty(&outcome.accepted)
            .context("Failed to serialize scenarios")?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write {}", path.display()))?;
    }

    match format {
        OutputFormat::Json => {
            let report = GenerateReport {
                generated_at: chrono::Utc::now().to_rfc3339(),
                seed,
                random_count,
                accepted: outcome.accepted.len(),
                dropped: dropped_entries(&outcome),
                warnings: &outcome.warnings,
                output: output.map(|p| p.display().to_string()),
                scenarios: output.is_none().then_some(outcome.accepted.as_slice()),
                metrics: metrics_text,
            };
            print_json(&report)?;
        }
        OutputFormat::Table => {
            let rows: Vec<ScenarioRow> = outcome.accepted.iter().map(ScenarioRow::from_scenario).collect();
            print_table(&rows, format)?;

            for dropped in dropped_entries(&outcome) {
                print_warning(&format!("dropped {}: {}", dropped.scenario, dropped.error));
            }
            for warning in &outcome.warnings {
                print_warning(&format!("{}: {}", warning.scenario, warning.message));
            }
            if let Some(path) = output {
                print_info(&format!("Scenarios written to {}", path.display()));
            }
            if let Some(text) = metrics_text {
                println!("{}", text);
            }
            print_success(&format!(
                "Generated {} scenarios (seed {}): {} accepted, {} dropped",
                outcome.total(),
                seed,
                outcome.accepted.len(),
                outcome.dropped_count()
            ));
        }
    }

    Ok(())
}

fn dropped_entries(outcome: &BatchOutcome) -> Vec<DroppedEntry> {
    outcome
        .dropped
        .iter()
        .map(|d| DroppedEntry {
            scenario: d.scenario.name.clone(),
            error: d.error.to_string(),
        })
        .collect()
}
