use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{Shell, generate, generate_to};

pub const DEFAULT_INPUT_PATH: &str = "salaries_footystats.json";
pub const DEFAULT_OUTPUT_PATH: &str = "bundesliga_players_market_value_change_2024_vs_2023.png";
pub const DEFAULT_CSV_PATH: &str = "data/output/market_value_changes.csv";
pub const DEFAULT_PLAYER_LIMIT: usize = 50;

pub const INPUT_HELP: &str =
    "JSON dataset with a `players` array of objects carrying `Player` and `Change` fields.";
pub const OUTPUT_HELP: &str = "Path of the rendered PNG chart.";
pub const LIMIT_HELP: &str =
    "Chart at most this many players, counted after dropping records without a parseable change.";
pub const SAVE_CSV_HELP: &str = "Save the cleaned record set (player, change, color) to the given CSV file (defaults to data/output/market_value_changes.csv when no path is provided).";

#[derive(Debug, Parser)]
#[command(
    name = "footyviz",
    about = "Chart football player market-value changes from a FootyStats JSON export.",
    version = env!("CARGO_PKG_VERSION")
)]
pub struct Cli {
    #[arg(long, value_name = "FILE", default_value = DEFAULT_INPUT_PATH, help = INPUT_HELP)]
    pub input: PathBuf,
    #[arg(long, value_name = "FILE", default_value = DEFAULT_OUTPUT_PATH, help = OUTPUT_HELP)]
    pub output: PathBuf,
    #[arg(long, value_name = "N", default_value_t = DEFAULT_PLAYER_LIMIT, help = LIMIT_HELP)]
    pub limit: usize,
    #[arg(
        long,
        value_name = "FILE",
        num_args = 0..=1,
        default_missing_value = DEFAULT_CSV_PATH,
        help = SAVE_CSV_HELP
    )]
    pub save_csv: Option<PathBuf>,
    #[arg(
        long,
        help = "Print every charted player in the summary table instead of the abbreviated top 10."
    )]
    pub full_output: bool,
    #[arg(long, help = "Disable progress spinner output.")]
    pub no_progress: bool,
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Generate shell completion scripts, optionally installing them for the current user.
    Completions {
        #[arg(value_enum, help = "Shell to generate completions for.")]
        shell: Shell,
        #[arg(
            long,
            value_name = "DIR",
            help = "Directory to write the completion script to."
        )]
        output_dir: Option<PathBuf>,
        #[arg(
            long,
            help = "Install the completion script into the default location for the selected shell."
        )]
        install: bool,
    },
}

pub fn handle_command(command: Commands) -> Result<()> {
    match command {
        Commands::Completions {
            shell,
            output_dir,
            install,
        } => generate_completions(shell, output_dir, install),
    }
}

fn generate_completions(shell: Shell, output_dir: Option<PathBuf>, install: bool) -> Result<()> {
    let mut command = Cli::command();
    let bin_name = command.get_name().to_string();

    let target_dir = if let Some(dir) = output_dir {
        Some(dir)
    } else if install {
        Some(default_install_dir(shell)?)
    } else {
        None
    };

    if let Some(dir) = target_dir {
        fs::create_dir_all(&dir)
            .with_context(|| format!("failed to create completion directory {}", dir.display()))?;
        let path = generate_to(shell, &mut command, bin_name, &dir)
            .context("failed to write completion file")?;
        println!("Installed {shell:?} completions to {}", path.display());
    } else {
        let mut stdout = io::stdout().lock();
        generate(shell, &mut command, bin_name, &mut stdout);
        stdout
            .flush()
            .context("failed to flush completion output")?;
    }

    Ok(())
}

fn default_install_dir(shell: Shell) -> Result<PathBuf> {
    let home = std::env::var_os("HOME").ok_or_else(|| {
        anyhow!("HOME environment variable is not set; use --output-dir to specify a path")
    })?;
    let mut path = PathBuf::from(home);

    match shell {
        Shell::Bash => {
            path.push(".local/share/bash-completion/completions");
            Ok(path)
        }
        Shell::Elvish => {
            path.push(".elvish/lib/completions");
            Ok(path)
        }
        Shell::Fish => {
            path.push(".config/fish/completions");
            Ok(path)
        }
        Shell::PowerShell => {
            path.push(".local/share/powershell/Scripts");
            Ok(path)
        }
        Shell::Zsh => {
            path.push(".local/share/zsh/site-functions");
            Ok(path)
        }
        other => Err(anyhow!(
            "no default install location for {other:?}; specify --output-dir"
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_fixed_literals() {
        let cli = Cli::parse_from(["footyviz"]);
        assert_eq!(cli.input, PathBuf::from(DEFAULT_INPUT_PATH));
        assert_eq!(cli.output, PathBuf::from(DEFAULT_OUTPUT_PATH));
        assert_eq!(cli.limit, DEFAULT_PLAYER_LIMIT);
        assert!(cli.save_csv.is_none());
        assert!(!cli.full_output);
    }

    #[test]
    fn save_csv_without_value_uses_default_path() {
        let cli = Cli::parse_from(["footyviz", "--save-csv"]);
        assert_eq!(cli.save_csv, Some(PathBuf::from(DEFAULT_CSV_PATH)));
    }

    #[test]
    fn save_csv_accepts_explicit_path() {
        let cli = Cli::parse_from(["footyviz", "--save-csv", "out/clean.csv"]);
        assert_eq!(cli.save_csv, Some(PathBuf::from("out/clean.csv")));
    }

    #[test]
    fn completions_accept_install_flag() {
        let cli = Cli::parse_from(["footyviz", "completions", "bash", "--install"]);
        match cli.command {
            Some(Commands::Completions {
                output_dir,
                install,
                ..
            }) => {
                assert!(install);
                assert!(output_dir.is_none());
            }
            _ => panic!("expected completions subcommand"),
        }
    }
}
