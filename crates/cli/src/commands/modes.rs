//! Mode contract command

use anyhow::Result;
use oracle_lib::PolicyMode;
use serde::Serialize;
use tabled::Tabled;

use crate::output::{print_json, print_table, yes_no, OutputFormat};

#[derive(Tabled, Serialize)]
struct ModeRow {
    #[tabled(rename = "Mode")]
    mode: &'static str,
    #[tabled(rename = "Recommend")]
    should_recommend: String,
    #[tabled(rename = "Apply")]
    should_apply: String,
}

#[derive(Serialize)]
struct ModeEntry {
    mode: PolicyMode,
    should_recommend: bool,
    should_apply: bool,
}

pub fn run(format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            let entries: Vec<ModeEntry> = PolicyMode::ALL
                .into_iter()
                .map(|mode| {
                    let behavior = mode.expected_behavior();
                    ModeEntry {
                        mode,
                        should_recommend: behavior.should_recommend,
                        should_apply: behavior.should_apply,
                    }
                })
                .collect();
            print_json(&entries)
        }
        OutputFormat::Table => {
            let rows: Vec<ModeRow> = PolicyMode::ALL
                .into_iter()
                .map(|mode| {
                    let behavior = mode.expected_behavior();
                    ModeRow {
                        mode: mode.as_str(),
                        should_recommend: yes_no(behavior.should_recommend),
                        should_apply: yes_no(behavior.should_apply),
                    }
                })
                .collect();
            print_table(&rows, format)
        }
    }
}
