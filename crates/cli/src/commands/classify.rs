//! Bounds classification command

use anyhow::{Context, Result};
use clap::ValueEnum;
use oracle_lib::quantity::Dimension;
use oracle_lib::{Cpu, Memory, Quantity, ResourceBound};
use serde::Serialize;
use tabled::Tabled;

use crate::output::{color_classification, print_json, print_table, OutputFormat};

/// Resource dimension selector
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum DimensionArg {
    Cpu,
    Memory,
}

/// Row for the classification table
#[derive(Tabled, Serialize)]
struct ClassificationRow {
    #[tabled(rename = "Dimension")]
    dimension: &'static str,
    #[tabled(rename = "Min")]
    min: String,
    #[tabled(rename = "Max")]
    max: String,
    #[tabled(rename = "Request")]
    request: String,
    #[tabled(rename = "Classification")]
    classification: String,
    #[tabled(rename = "Clamped")]
    clamped: String,
}

fn parse<D: Dimension>(label: &str, value: &str) -> Result<Quantity<D>> {
    Quantity::<D>::parse(value).with_context(|| format!("Invalid {} quantity '{}'", label, value))
}

fn classify_in<D: Dimension>(min: &str, max: &str, request: &str, format: OutputFormat) -> Result<ClassificationRow> {
    let bound = ResourceBound::<D>::checked(parse("min", min)?, parse("max", max)?)?;
    let request = parse::<D>("request", request)?;
    let classification = bound.classify(&request)?;
    let clamped = bound.clamp(&request)?;

    let classification = match format {
        OutputFormat::Table => color_classification(classification),
        OutputFormat::Json => classification.as_str().to_string(),
    };
    Ok(ClassificationRow {
        dimension: D::NAME,
        min: bound.min.format(),
        max: bound.max.format(),
        request: request.format(),
        classification,
        clamped: clamped.format(),
    })
}

pub fn run(dimension: DimensionArg, min: &str, max: &str, request: &str, format: OutputFormat) -> Result<()> {
    let row = match dimension {
        DimensionArg::Cpu => classify_in::<Cpu>(min, max, request, format)?,
        DimensionArg::Memory => classify_in::<Memory>(min, max, request, format)?,
    };

    match format {
        OutputFormat::Json => print_json(&row),
        OutputFormat::Table => print_table(&[row], format),
    }
}
