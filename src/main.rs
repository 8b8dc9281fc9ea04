use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use colored::*;
use rust_decimal::Decimal;
use std::path::{Path, PathBuf};
use tabled::{settings::Style, Table, Tabled};

use vitalrs::activity::bmi;
use vitalrs::dashboard::{self, DataState, MetricRequest};
use vitalrs::import::DailyRecordCsvImporter;
use vitalrs::logging::{init_logging, LogLevel};
use vitalrs::{AppConfig, CycleRecord, CyclePredictor, InMemoryRepository, Metric, RangeKey};

/// VitalRS - Health Metrics CLI
///
/// Summarizes daily activity, sleep and cycle data into the values the
/// mobile screens render.
#[derive(Parser)]
#[command(name = "vitalrs")]
#[command(version)]
#[command(about = "Health metrics aggregation CLI", long_about = None)]
struct Cli {
    /// Sets a custom config file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Increase verbosity of output
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Summarize one metric over a range of daily records
    Summary {
        /// CSV file with a `date` column and measurement columns
        #[arg(short, long)]
        records: PathBuf,

        /// steps, calories, heartRate or sleepHours
        #[arg(short, long, default_value = "steps")]
        metric: String,

        /// week, month or quarter
        #[arg(long, default_value = "week")]
        range: String,

        /// Reference date (YYYY-MM-DD), defaults to the local date
        #[arg(short, long)]
        today: Option<NaiveDate>,

        /// Goal overriding the configured one
        #[arg(short, long)]
        goal: Option<Decimal>,
    },

    /// Sleep quality over a range of daily records
    Sleep {
        #[arg(short, long)]
        records: PathBuf,

        #[arg(long, default_value = "week")]
        range: String,

        #[arg(short, long)]
        today: Option<NaiveDate>,

        /// Bedtime (HH:MM), stored together with --wakeup
        #[arg(long, requires = "wakeup")]
        bedtime: Option<String>,

        /// Wake-up time (HH:MM)
        #[arg(long, requires = "bedtime")]
        wakeup: Option<String>,
    },

    /// Predict days until the next cycle start
    Cycle {
        /// Date the most recent period began (YYYY-MM-DD)
        #[arg(short, long)]
        start: NaiveDate,

        /// Average cycle length in days
        #[arg(short, long, default_value_t = vitalrs::DEFAULT_CYCLE_LENGTH_DAYS)]
        length: u32,

        #[arg(short, long)]
        today: Option<NaiveDate>,
    },

    /// Body mass index from weight and height
    Bmi {
        /// Weight in kilograms
        #[arg(short, long)]
        weight: Decimal,

        /// Height in centimetres
        #[arg(long)]
        height: Decimal,
    },

    /// Show or initialize the configuration file
    Config {
        /// Print the active configuration
        #[arg(short, long)]
        show: bool,

        /// Write the default configuration to disk
        #[arg(short, long)]
        init: bool,
    },
}

#[derive(Tabled)]
struct PointRow {
    #[tabled(rename = "Label")]
    label: String,
    #[tabled(rename = "Date")]
    date: String,
    #[tabled(rename = "Value")]
    value: String,
}

const CLI_USER: &str = "local";

fn load_config(path: Option<&PathBuf>) -> Result<AppConfig> {
    match path {
        Some(path) => AppConfig::load_from_file(path),
        None => Ok(AppConfig::load_or_default()),
    }
}

async fn repository_from_csv(path: &Path, user_id: &str) -> Result<InMemoryRepository> {
    let records = DailyRecordCsvImporter::new()
        .import_file(path)
        .with_context(|| format!("Failed to import records from {}", path.display()))?;

    let repo = InMemoryRepository::new();
    repo.upsert_daily_records(user_id, records).await;
    Ok(repo)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_ref())?;

    let mut log_config = config.logging.clone();
    log_config.level = LogLevel::from_verbosity(log_config.level, cli.verbose);
    init_logging(&log_config)?;

    let user_id = config
        .default_user_id
        .clone()
        .unwrap_or_else(|| CLI_USER.to_string());
    let local_today = Local::now().date_naive();

    match cli.command {
        Commands::Summary {
            records,
            metric,
            range,
            today,
            goal,
        } => {
            let metric: Metric = metric.parse()?;
            let range: RangeKey = range.parse()?;
            let repo = repository_from_csv(&records, &user_id).await?;

            let request = MetricRequest {
                user_id: user_id.clone(),
                range,
                metric,
                today: today.unwrap_or(local_today),
                goal,
            };
            let fetched = dashboard::load_metric_summary(&repo, &request, &config).await?;

            match fetched.value {
                DataState::Ready(summary) => {
                    let aggregate = &summary.aggregate;
                    let heading = format!(
                        "{} over the last {} ({} to {})",
                        metric, range, summary.window.start_date, summary.window.end_date
                    );
                    println!("{}", heading.green().bold());
                    println!("  Total:   {} {}", aggregate.total.normalize(), metric.unit());
                    println!("  Average: {} {}", aggregate.rounded_average(1).normalize(), metric.unit());
                    if let (Some(min), Some(max)) = (aggregate.min, aggregate.max) {
                        println!("  Min/Max: {} / {}", min.normalize(), max.normalize());
                    }
                    if let Some(progress) = summary.progress {
                        println!("  Goal:    {}%", progress.percent());
                    }
                    if let Some(km) = summary.distance_km {
                        println!("  Distance: {} km", km);
                    }
                    if let Some(kcal) = summary.step_calories {
                        println!("  Walking: {} kcal", kcal);
                    }

                    let rows: Vec<PointRow> = if summary.weekly_buckets.is_empty() {
                        summary
                            .window
                            .dates()
                            .zip(aggregate.points())
                            .map(|(date, (label, value))| PointRow {
                                label: label.to_string(),
                                date: date.to_string(),
                                value: value.normalize().to_string(),
                            })
                            .collect()
                    } else {
                        summary
                            .weekly_buckets
                            .iter()
                            .map(|bucket| PointRow {
                                label: bucket.label.clone(),
                                date: format!("{}..{}", bucket.start_date, bucket.end_date),
                                value: bucket.value.round_dp(1).normalize().to_string(),
                            })
                            .collect()
                    };
                    println!("{}", Table::new(rows).with(Style::rounded()));
                }
                DataState::NoData(reason) => {
                    println!("{}", reason.user_message().yellow());
                }
            }
        }

        Commands::Sleep {
            records,
            range,
            today,
            bedtime,
            wakeup,
        } => {
            let range: RangeKey = range.parse()?;
            let repo = repository_from_csv(&records, &user_id).await?;
            if let (Some(bedtime), Some(wakeup)) = (bedtime, wakeup) {
                dashboard::save_sleep_schedule(&repo, &user_id, &bedtime, &wakeup).await?;
            }

            let fetched = dashboard::load_sleep_summary(
                &repo,
                &user_id,
                range,
                today.unwrap_or(local_today),
                &config,
            )
            .await?;

            match fetched.value {
                DataState::Ready(summary) => {
                    println!("{}", format!("Sleep over the last {}", range).cyan().bold());
                    println!(
                        "  Average:    {}h",
                        summary.aggregate.rounded_average(1).normalize()
                    );
                    println!("  Quality:    {}", summary.insight.quality);
                    println!("  Deep sleep: {}", summary.insight.deep_sleep);
                    println!("  Goal:       {}%", summary.progress.percent());
                    if let (Some(schedule), Some(hours)) = (summary.schedule, summary.scheduled_hours) {
                        println!(
                            "  Schedule:   {} - {} ({}h)",
                            schedule.bedtime,
                            schedule.wakeup_time,
                            hours.round_dp(2).normalize()
                        );
                    }
                }
                DataState::NoData(reason) => {
                    println!("{}", reason.user_message().yellow());
                }
            }
        }

        Commands::Cycle {
            start,
            length,
            today,
        } => {
            let record = CycleRecord::new(start, length)?;
            let predictor = CyclePredictor::with_policy(config.cycle.clone());
            let forecast = predictor
                .predict(Some(&record), today.unwrap_or(local_today))
                .require()?;

            println!("{}", "Cycle prediction".magenta().bold());
            println!("  Cycle day:       {}", forecast.cycle_day);
            println!("  Days until next: {}", forecast.days_until_next);
            println!("  Next start:      {}", forecast.next_start);
            println!("  Likelihood:      {}", forecast.likelihood);
        }

        Commands::Bmi { weight, height } => {
            let reading = bmi(weight, height)?;
            println!("BMI: {} ({})", reading.value.to_string().bold(), reading.category);
        }

        Commands::Config { show, init } => {
            if init {
                let mut fresh = AppConfig::default();
                match &cli.config {
                    Some(path) => fresh.save_to_file(path)?,
                    None => fresh.save_default()?,
                }
                println!("{}", "✓ Configuration written".green());
            }
            if show || !init {
                let rendered = toml::to_string_pretty(&config)
                    .context("Failed to render configuration")?;
                println!("{}", rendered);
            }
        }
    }

    Ok(())
}
