//! Output formatting for the scenario runner

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use notewright_harness::{ScenarioReport, SuiteReport};

/// Report format
#[derive(Debug, Clone, Copy, ValueEnum, Default)]
pub enum OutputFormat {
    /// Human-readable table
    #[default]
    Table,
    /// JSON, as written to the results file
    Json,
    /// One line per scenario
    Plain,
}

/// Print the suite report in the requested format.
pub fn print_report(report: &SuiteReport, format: OutputFormat) {
    match format {
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic);

            table.set_header(vec!["", "Scenario", "Stage", "Duration", "Detail"]);
            for scenario in &report.scenarios {
                table.add_row(row(scenario));
            }

            println!("{table}");
            println!(
                "{} passed, {} failed of {} ({} ms)",
                report.passed, report.failed, report.total, report.duration_ms
            );
        }
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string_pretty(report).unwrap_or_default()
            );
        }
        OutputFormat::Plain => {
            for scenario in &report.scenarios {
                if scenario.success {
                    println!("PASS {} ({} ms)", scenario.name, scenario.duration_ms);
                } else {
                    println!(
                        "FAIL [{}] {}: {}",
                        stage_label(scenario),
                        scenario.name,
                        scenario.error.as_deref().unwrap_or("unknown error")
                    );
                }
            }
            println!(
                "{} passed, {} failed of {} ({} ms)",
                report.passed, report.failed, report.total, report.duration_ms
            );
        }
    }
}

fn row(scenario: &ScenarioReport) -> Vec<String> {
    let mark = if scenario.success { "✓" } else { "✗" };
    vec![
        mark.to_string(),
        scenario.name.clone(),
        stage_label(scenario),
        format!("{} ms", scenario.duration_ms),
        detail(scenario),
    ]
}

fn stage_label(scenario: &ScenarioReport) -> String {
    match scenario.stage {
        Some(stage) => stage.to_string(),
        None if scenario.success => String::new(),
        None => "harness".to_string(),
    }
}

fn detail(scenario: &ScenarioReport) -> String {
    if let Some(error) = &scenario.error {
        return error.clone();
    }
    if !scenario.sync_fallbacks.is_empty() {
        return format!(
            "passed via UI fallback ({} response wait(s) expired)",
            scenario.sync_fallbacks.len()
        );
    }
    String::new()
}
