//! Lifescore CLI
//!
//! Command-line interface over the scoring engine:
//! - Score a CSV daily log
//! - Run a streak cascade for an edited day
//! - Correlate habits with the final score
//! - Summarize trends, completion rates and vice frequency
//! - Validate and generate configuration

use anyhow::{bail, Context};
use chrono::{NaiveDate, Utc};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use lifescore::config::{generate_default_config, Config, LoggingConfig};
use lifescore::engine::{
    compute_cascade, compute_correlations, day_of_week_averages, habit_completion_rates,
    parse_date, rows_in_window, score_history, score_trend, vice_frequency, CascadeUpdate,
    CatalogInputBuilder, CorrelationFlag, CorrelationResult, DailyLogRow, DayOfWeekAverage,
    HabitCompletionRate, ScoreTrendPoint, ScoringOutput, ViceFrequency,
};
use lifescore::import::DailyLogImporter;

#[derive(Parser)]
#[command(name = "lifescore")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Daily habit scoring, streaks and correlations")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (default: search standard locations)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Table, global = true)]
    pub format: OutputFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Score every day of a daily log from scratch
    Score {
        /// Path to the daily log CSV
        csv: PathBuf,
        /// Only print this date (YYYY-MM-DD)
        #[arg(short, long)]
        date: Option<String>,
    },

    /// Show which days change after editing one
    Cascade {
        /// Path to the daily log CSV (with stored scores)
        csv: PathBuf,
        /// The edited date (YYYY-MM-DD)
        date: String,
    },

    /// Correlate each habit with the final score
    Correlate {
        /// Path to the daily log CSV
        csv: PathBuf,
        /// Trailing window in days, 0 for all history (default: from config)
        #[arg(short, long)]
        window: Option<i64>,
        /// Last day of the window (default: latest day in the log)
        #[arg(short, long)]
        until: Option<String>,
        /// Score the history first instead of using stored final scores
        #[arg(long)]
        rescore: bool,
    },

    /// Score trend, habit completion, vice frequency and weekday averages
    Analytics {
        /// Path to the daily log CSV
        csv: PathBuf,
        /// Trailing window in days, 0 for all history (default: from config)
        #[arg(short, long)]
        window: Option<i64>,
        /// Last day of the window (default: latest day in the log)
        #[arg(short, long)]
        until: Option<String>,
        /// Score the history first instead of using stored final scores
        #[arg(long)]
        rescore: bool,
    },

    /// Validate the loaded configuration
    Validate,

    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

/// One scored day, flattened for JSON output
#[derive(Serialize)]
struct ScoredDay {
    date: NaiveDate,
    #[serde(flatten)]
    scores: ScoringOutput,
}

/// Everything `analytics` reports for one window
#[derive(Serialize)]
struct AnalyticsReport {
    until: NaiveDate,
    window_days: i64,
    score_trend: Vec<ScoreTrendPoint>,
    habit_completion: Vec<HabitCompletionRate>,
    vice_frequency: Vec<ViceFrequency>,
    day_of_week: Vec<DayOfWeekAverage>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // a broken config file aborts here instead of being replaced by the seeds;
    // `config` only prints the template, so it must work even then
    let config = match (&cli.command, &cli.config) {
        (Commands::Config { .. }, _) => Config::default(),
        (_, Some(path)) => Config::load_with_env(path)?,
        (_, None) => Config::try_load_default()?,
    };

    init_logging(&config.logging);

    tracing::debug!(
        habits = config.habits.len(),
        window = config.scoring.correlation_window_days,
        "Configuration loaded"
    );

    match cli.command {
        Commands::Score { csv, date } => {
            let rows = load_rows(&csv)?;
            let builder = CatalogInputBuilder::new(&config.habits, config.scoring.clone());

            let mut scored: Vec<ScoredDay> = score_history(&rows, &builder)
                .into_iter()
                .map(|(date, scores)| ScoredDay { date, scores })
                .collect();

            if let Some(date) = date {
                let date = parse_date(&date)?;
                scored.retain(|d| d.date == date);
                if scored.is_empty() {
                    bail!("No row for {} in {:?}", date, csv);
                }
            }

            match cli.format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&scored)?),
                OutputFormat::Table => print_scores(&scored),
            }
        }

        Commands::Cascade { csv, date } => {
            let rows = load_rows(&csv)?;
            let edited = parse_date(&date)?;
            let builder = CatalogInputBuilder::new(&config.habits, config.scoring.clone());

            let updates = compute_cascade(edited, &rows, &config.scoring, &builder)?;

            match cli.format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&updates)?),
                OutputFormat::Table => print_cascade(&updates),
            }
        }

        Commands::Correlate {
            csv,
            window,
            until,
            rescore,
        } => {
            let window = window.unwrap_or(config.scoring.correlation_window_days);
            let (windowed, until) = load_window(&csv, &config, window, until, rescore)?;
            let results = compute_correlations(&windowed, &config.habits);

            tracing::info!(
                window,
                until = %until,
                days = windowed.len(),
                "Correlated habits"
            );

            match cli.format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&results)?),
                OutputFormat::Table => print_correlations(&results),
            }
        }

        Commands::Analytics {
            csv,
            window,
            until,
            rescore,
        } => {
            let window = window.unwrap_or(config.scoring.correlation_window_days);
            let (windowed, until) = load_window(&csv, &config, window, until, rescore)?;

            let report = AnalyticsReport {
                until,
                window_days: window,
                score_trend: score_trend(&windowed),
                habit_completion: habit_completion_rates(&windowed, &config.habits),
                vice_frequency: vice_frequency(&windowed, &config.habits),
                day_of_week: day_of_week_averages(&windowed),
            };

            tracing::info!(
                window,
                until = %until,
                days = windowed.len(),
                "Summarized history"
            );

            match cli.format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
                OutputFormat::Table => print_analytics(&report),
            }
        }

        Commands::Validate => {
            let result = config.validate();

            match cli.format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&result)?),
                OutputFormat::Table => {
                    for error in &result.errors {
                        println!("error:   {}", error);
                    }
                    for warning in &result.warnings {
                        println!("warning: {}", warning);
                    }
                    if result.valid {
                        println!(
                            "Configuration is valid ({} habits, {} warnings)",
                            config.habits.len(),
                            result.warnings.len()
                        );
                    }
                }
            }

            if !result.valid {
                bail!("Configuration has {} errors", result.errors.len());
            }
        }

        Commands::Config { output } => {
            let content = generate_default_config();

            match output {
                Some(path) => {
                    // Create parent directory if needed
                    if let Some(parent) = path.parent() {
                        std::fs::create_dir_all(parent)?;
                    }
                    std::fs::write(&path, &content)
                        .with_context(|| format!("Failed to write {:?}", path))?;
                    println!("Config written to {:?}", path);
                }
                None => {
                    print!("{}", content);
                }
            }
        }
    }

    Ok(())
}

/// Logs go to stderr so JSON output on stdout stays parseable
fn init_logging(logging: &LoggingConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("lifescore={}", logging.level).into());
    let registry = tracing_subscriber::registry().with(filter);

    if logging.format == "json" {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

fn load_rows(path: &Path) -> anyhow::Result<Vec<DailyLogRow>> {
    let import = DailyLogImporter::new()
        .import(path)
        .with_context(|| format!("Failed to import {:?}", path))?;

    for error in &import.errors {
        tracing::warn!("{}", error);
    }
    if import.rows_failed > 0 {
        tracing::warn!(failed = import.rows_failed, "Skipped unreadable rows");
    }

    Ok(import.rows)
}

/// Rows of the trailing window ending at `until` (default: latest logged day)
fn load_window(
    csv: &Path,
    config: &Config,
    window: i64,
    until: Option<String>,
    rescore: bool,
) -> anyhow::Result<(Vec<DailyLogRow>, NaiveDate)> {
    let mut rows = load_rows(csv)?;

    if rescore {
        let builder = CatalogInputBuilder::new(&config.habits, config.scoring.clone());
        let scored = score_history(&rows, &builder);
        // both sides are in date order
        for (row, (_, scores)) in rows.iter_mut().zip(&scored) {
            *row = row.clone().scored(scores);
        }
    }

    let until = match until {
        Some(s) => parse_date(&s)?,
        None => rows
            .last()
            .map(|r| r.date)
            .unwrap_or_else(|| Utc::now().date_naive()),
    };

    Ok((rows_in_window(&rows, until, window), until))
}

fn print_scores(days: &[ScoredDay]) {
    if days.is_empty() {
        println!("No data");
        return;
    }

    println!(
        "{:<12} {:>9} {:>9} {:>9} {:>7} {:>9}",
        "Date", "Positive", "Vice", "Base", "Streak", "Final"
    );
    println!("{}", "-".repeat(60));

    for day in days {
        let s = &day.scores;
        println!(
            "{:<12} {:>9.4} {:>9.4} {:>9.4} {:>7} {:>9.4}",
            day.date.to_string(),
            s.positive_score,
            s.vice_penalty,
            s.base_score,
            s.streak,
            s.final_score
        );
    }
}

fn print_cascade(updates: &[CascadeUpdate]) {
    if updates.is_empty() {
        println!("No days changed");
        return;
    }

    println!("{:<12} {:<11} {:>7} {:>9}", "Date", "Change", "Streak", "Final");
    println!("{}", "-".repeat(42));

    for update in updates {
        let kind = match update {
            CascadeUpdate::Edited { .. } => "rescored",
            CascadeUpdate::Propagated { .. } => "propagated",
        };
        println!(
            "{:<12} {:<11} {:>7} {:>9.4}",
            update.date().to_string(),
            kind,
            update.streak(),
            update.final_score()
        );
    }
}

fn print_correlations(results: &[CorrelationResult]) {
    if results.is_empty() {
        println!("No active good habits");
        return;
    }

    println!(
        "{:<20} {:>7} {:>5}  {:<12} {}",
        "Habit", "r", "n", "Strength", "Note"
    );
    println!("{}", "-".repeat(60));

    for result in results {
        let r = result
            .r
            .map(|r| format!("{:.3}", r))
            .unwrap_or_else(|| "-".to_string());
        let note = match result.flag {
            Some(CorrelationFlag::InsufficientData) => "insufficient data",
            Some(CorrelationFlag::ZeroVariance) => "no variance",
            None => result.direction().unwrap_or(""),
        };
        println!(
            "{:<20} {:>7} {:>5}  {:<12} {}",
            result.habit,
            r,
            result.n,
            result.strength().unwrap_or("-"),
            note
        );
    }
}

const WEEKDAYS: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];

fn print_analytics(report: &AnalyticsReport) {
    if report.score_trend.is_empty() && report.habit_completion.is_empty() {
        println!("No data");
        return;
    }

    println!("Score trend");
    println!("{:<12} {:>9} {:>9}", "Date", "Final", "7d avg");
    println!("{}", "-".repeat(32));
    for point in &report.score_trend {
        let avg = point
            .moving_avg_7d
            .map(|a| format!("{:.4}", a))
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:<12} {:>9.4} {:>9}",
            point.date.to_string(),
            point.final_score,
            avg
        );
    }

    println!();
    println!("Habit completion");
    println!("{:<20} {:<13} {:>6} {:>9}", "Habit", "Category", "Rate", "Days");
    println!("{}", "-".repeat(51));
    for rate in &report.habit_completion {
        println!(
            "{:<20} {:<13} {:>5.0}% {:>4}/{:<4}",
            rate.habit,
            rate.category.to_string(),
            rate.rate * 100.0,
            rate.days_completed,
            rate.total_days
        );
    }

    println!();
    println!("Vice frequency");
    println!("{:<20} {:>9}", "Vice", "Days");
    println!("{}", "-".repeat(30));
    for vice in &report.vice_frequency {
        println!("{:<20} {:>4}/{:<4}", vice.vice, vice.frequency, vice.total_days);
    }

    println!();
    println!("Day of week");
    println!("{:<5} {:>9} {:>5}", "Day", "Average", "n");
    println!("{}", "-".repeat(21));
    for day in &report.day_of_week {
        let name = WEEKDAYS.get(day.day as usize).copied().unwrap_or("?");
        println!("{:<5} {:>9.4} {:>5}", name, day.avg_score, day.count);
    }
}
