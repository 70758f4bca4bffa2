use crate::chart::render_chart;
use crate::cli::Cli;
use crate::dataset::{PlayerRecord, clean_players, load_players};
use crate::progress::{ProgressState, Stage, run_with_spinner};
use crate::summary::{SummaryContext, SummaryPaths, print_summary};
use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;
use csv::Writer;
use std::path::Path;
use tokio::fs;
use tokio::task;

mod chart;
mod cli;
mod dataset;
mod formatting;
mod progress;
mod summary;

#[tokio::main]
async fn main() -> Result<()> {
    colored::control::set_override(true);

    let mut cli = Cli::parse();

    if let Some(command) = cli.command.take() {
        crate::cli::handle_command(command)?;
        return Ok(());
    }

    let Cli {
        input,
        output,
        limit,
        save_csv,
        full_output,
        no_progress,
        ..
    } = cli;

    let run_started_at = Local::now();
    let progress = ProgressState::new(!no_progress);

    let raw = run_with_spinner(
        &progress,
        Stage::Load,
        "reading player dataset",
        load_players(input.as_path()),
    )
    .await?;
    let loaded_count = raw.len();
    let report = clean_players(raw, limit);

    if let Some(path) = save_csv.as_ref() {
        save_cleaned_csv(&report.records, path.as_path()).await?;
    }

    if let Some(parent) = output.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .await
                .with_context(|| format!("failed to create directory {}", parent.display()))?;
        }
    }

    let chart_path = output.clone();
    let chart_records = report.records.clone();
    run_with_spinner(
        &progress,
        Stage::Render,
        "drawing market-value chart",
        async move {
            task::spawn_blocking(move || render_chart(&chart_records, &chart_path))
                .await
                .context("chart render worker failed")?
        },
    )
    .await?;
    progress.clear();

    print_summary(&SummaryContext {
        loaded_count,
        dropped_count: report.dropped,
        run_started_at: &run_started_at,
        paths: SummaryPaths {
            chart: output.as_path(),
            csv: save_csv.as_deref(),
        },
        records: &report.records,
        full_output,
    });

    Ok(())
}

pub(crate) async fn write_output_file(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .await
            .with_context(|| format!("failed to create directory {}", parent.display()))?;
    }

    fs::write(path, bytes)
        .await
        .with_context(|| format!("failed to write {}", path.display()))?;

    Ok(())
}

fn finalize_writer(mut writer: Writer<Vec<u8>>, label: &str) -> Result<Vec<u8>> {
    writer
        .flush()
        .with_context(|| format!("failed to flush {label}"))?;
    writer
        .into_inner()
        .with_context(|| format!("failed to finalize {label}"))
}

async fn save_cleaned_csv(records: &[PlayerRecord], path: &Path) -> Result<()> {
    let serialized = serialize_cleaned(records)?;
    write_output_file(path, &serialized).await
}

fn serialize_cleaned(records: &[PlayerRecord]) -> Result<Vec<u8>> {
    let mut writer = Writer::from_writer(Vec::new());
    for record in records {
        writer
            .serialize(record)
            .context("failed to serialize cleaned player record")?;
    }
    finalize_writer(writer, "cleaned dataset writer")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::BarColor;

    #[test]
    fn cleaned_csv_lists_player_change_and_color() {
        let records = [
            PlayerRecord {
                player: "A".to_string(),
                change: 12.3,
                color: BarColor::Green,
            },
            PlayerRecord {
                player: "B".to_string(),
                change: -4.0,
                color: BarColor::Red,
            },
        ];

        let bytes = serialize_cleaned(&records).expect("serialize cleaned records");
        let csv = String::from_utf8(bytes).expect("valid utf-8");
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "player,change,color");
        assert_eq!(lines[1], "A,12.3,green");
        assert_eq!(lines[2], "B,-4.0,red");
    }

    #[tokio::test]
    async fn write_output_file_creates_parent_directories() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("nested/output.csv");

        write_output_file(&path, b"player,change,color\n")
            .await
            .expect("write output file");

        assert!(path.exists());
    }
}
