use crate::dataset::{BarColor, PlayerRecord};
use crate::formatting::format_change_percent;
use chrono::{DateTime, Local};
use colored::Colorize;
use std::path::Path;

const COMPACT_TABLE_ROWS: usize = 10;

pub struct SummaryPaths<'a> {
    pub(crate) chart: &'a Path,
    pub(crate) csv: Option<&'a Path>,
}

pub struct SummaryContext<'a> {
    pub(crate) loaded_count: usize,
    pub(crate) dropped_count: usize,
    pub(crate) run_started_at: &'a DateTime<Local>,
    pub(crate) paths: SummaryPaths<'a>,
    pub(crate) records: &'a [PlayerRecord],
    pub(crate) full_output: bool,
}

pub fn print_summary(context: &SummaryContext<'_>) {
    println!();
    print_summary_header(context);
    print_summary_paths(&context.paths);
    println!();
    println!("{}", "Market Value Changes".bold().bright_magenta());
    let table_width = print_player_table(context.records, context.full_output);
    if table_width > 0 {
        let divider = "=".repeat(table_width);
        println!("{}", divider.bright_cyan());
    }
}

fn print_summary_header(context: &SummaryContext<'_>) {
    println!(
        "{}",
        "====================== FootyViz Chart ======================"
            .bold()
            .bright_cyan()
    );
    println!(
        "{} {}",
        "Run started".bright_yellow().bold(),
        context
            .run_started_at
            .format("%Y-%m-%d %H:%M:%S %Z")
            .to_string()
            .bright_white()
    );
    println!(
        "{} {} | {} | {}",
        "Dataset".bright_yellow().bold(),
        format!("Loaded: {}", context.loaded_count).bright_white(),
        format!("Dropped: {}", context.dropped_count).bright_white(),
        format!("Charted: {}", context.records.len()).bright_white()
    );
}

fn print_summary_paths(paths: &SummaryPaths<'_>) {
    print_path_line("Chart PNG", Some(paths.chart), "");
    print_path_line("Cleaned CSV", paths.csv, "not saved (use --save-csv)");
}

fn print_path_line(label: &str, path: Option<&Path>, hint: &str) {
    let label_colored = label.bright_yellow().bold();
    match path {
        Some(path) => println!(
            "{} {}",
            label_colored,
            format!("{}", path.display()).bright_white()
        ),
        None => println!("{} {}", label_colored, hint.bright_black()),
    }
}

fn print_player_table(records: &[PlayerRecord], full_output: bool) -> usize {
    if records.is_empty() {
        let message = "No market-value data available.";
        println!("{}", message.bright_black());
        return message.len();
    }

    let header = "Pos | Player                         | Change";
    let separator = "----+--------------------------------+--------";
    let mut max_width = header.len().max(separator.len());
    println!("{}", header.bold().bright_white());
    println!("{}", separator.bright_black());

    let shown = if full_output {
        records.len()
    } else {
        records.len().min(COMPACT_TABLE_ROWS)
    };
    for (position, record) in records.iter().take(shown).enumerate() {
        let line = format!(
            "{:>3} | {:<30} | {:>6}",
            position + 1,
            record.player,
            format_change_percent(record.change)
        );
        max_width = max_width.max(line.len());
        match record.color {
            BarColor::Green => println!("{}", line.bright_green()),
            BarColor::Red => println!("{}", line.bright_red()),
        }
    }

    if records.len() > shown {
        let message = format!(
            "... {} more entries (use --full-output to display all).",
            records.len() - shown
        );
        max_width = max_width.max(message.len());
        println!("{}", message.bright_black());
    }

    max_width
}
