use analytics::{AggregationEngine, summarize_pct_diff, yearly_means};
use analyzer::Analyzer;
use clap::{Args, Parser, Subcommand};
use configuration::{AnalysisConfig, ReadingSelection, init_tracing, load_config};
use core_types::{Measurement, PartitionKey, Sport};
use database::{DbRepository, Snapshot, connect, load_csv};
use futures::future::join_all;
use indicatif::{ProgressBar, ProgressStyle};
use reshape::{pivot, pivot_entity};
use risk::{RiskClassifier, RiskReport, ThresholdRiskClassifier};
use std::collections::BTreeSet;
use std::path::PathBuf;
use std::sync::Arc;

mod render;

/// The main entry point for the perfmon CLI.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse command-line arguments
    let cli = Cli::parse();

    let mut config = load_config(cli.config.as_deref())?;
    if cli.all_sports {
        config.scope.sports.clear();
    }
    // Keep the guard alive so the file sink flushes on exit.
    let _guard = init_tracing(&config.logging)?;

    // Execute the appropriate command
    match cli.command {
        Commands::Pivot(args) => handle_pivot(args, &config, cli.json).await,
        Commands::TeamStats(args) => handle_team_stats(args, &config, cli.json).await,
        Commands::Compare(args) => handle_compare(args, &config, cli.json).await,
        Commands::Trends(args) => handle_trends(args, &config, cli.json).await,
        Commands::Flag(args) => handle_flag(args, config, cli.json).await,
        Commands::Research(args) => handle_research(args, config, cli.json).await,
    }
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// Performance-metric monitoring and injury-risk flagging for athlete test data.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Configuration file. Defaults to ./perfmon.toml when present.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Print JSON instead of tables.
    #[arg(long, global = true)]
    json: bool,

    /// Ignore the configured sport scope and analyse every team.
    #[arg(long, global = true)]
    all_sports: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the snapshot in wide format, one row per athlete and timestamp.
    Pivot(PivotArgs),
    /// Count, mean, spread and percentile of each metric per partition.
    TeamStats(TeamStatsArgs),
    /// Place every reading against its partition's mean.
    Compare(CompareArgs),
    /// Mean of each metric per calendar year.
    Trends(TrendsArgs),
    /// Flag asymmetry and load and label every athlete's risk.
    Flag(FlagArgs),
    /// Answer the five research questions.
    Research(ResearchArgs),
}

/// Where the measurement snapshot comes from.
#[derive(Args)]
#[group(required = true, multiple = false)]
struct SourceArgs {
    /// A CSV export with playername, team, metric, value and timestamp columns.
    #[arg(long)]
    input: Option<PathBuf>,

    /// A PostgreSQL table, read with DATABASE_URL.
    #[arg(long)]
    table: Option<String>,
}

#[derive(Args)]
struct PivotArgs {
    #[command(flatten)]
    source: SourceArgs,

    /// Only show this athlete.
    #[arg(long)]
    entity: Option<String>,
}

#[derive(Args)]
struct TeamStatsArgs {
    #[command(flatten)]
    source: SourceArgs,

    #[arg(long, value_enum, default_value_t = PartitionKey::Team)]
    partition: PartitionKey,

    /// Percentile to report, as a fraction. Defaults to the load percentile.
    #[arg(long)]
    percentile: Option<f64>,
}

#[derive(Args)]
struct CompareArgs {
    #[command(flatten)]
    source: SourceArgs,

    #[arg(long, value_enum, default_value_t = PartitionKey::Team)]
    partition: PartitionKey,

    /// List this athlete's readings as well as the summary.
    #[arg(long)]
    entity: Option<String>,
}

#[derive(Args)]
struct TrendsArgs {
    #[command(flatten)]
    source: SourceArgs,
}

#[derive(Args)]
struct FlagArgs {
    #[command(flatten)]
    source: SourceArgs,

    /// Which readings to flag. Overrides `load.selection`.
    #[arg(long, value_enum)]
    selection: Option<ReadingSelection>,

    /// Run one classification per sport, in parallel.
    #[arg(long)]
    per_sport: bool,
}

#[derive(Args)]
struct ResearchArgs {
    #[command(flatten)]
    source: SourceArgs,
}

// ==============================================================================
// Snapshot Loading
// ==============================================================================

/// Reads the snapshot from a CSV file or a database table.
async fn load_snapshot(source: &SourceArgs, config: &AnalysisConfig) -> anyhow::Result<Vec<Measurement>> {
    let snapshot: Snapshot = match (&source.input, &source.table) {
        (Some(path), _) => {
            let path = path.clone();
            tokio::task::spawn_blocking(move || load_csv(&path)).await??
        }
        (None, Some(table)) => {
            let pool = connect().await?;
            DbRepository::new(pool)
                .fetch_measurements(table, &config.tracked_metrics())
                .await?
        }
        (None, None) => anyhow::bail!("either --input or --table is required"),
    };
    Ok(snapshot.measurements)
}

/// The snapshot restricted to the configured sports.
async fn load_scoped(source: &SourceArgs, config: &AnalysisConfig) -> anyhow::Result<Vec<Measurement>> {
    let directory = config.team_directory();
    let (scoped, excluded): (Vec<Measurement>, Vec<Measurement>) = load_snapshot(source, config)
        .await?
        .into_iter()
        .partition(|m| config.in_scope(&directory.profile(&m.group_key)));

    let kept: BTreeSet<&str> = scoped.iter().map(|m| m.entity_id.as_str()).collect();
    let out_of_scope = excluded
        .iter()
        .map(|m| m.entity_id.as_str())
        .filter(|id| !kept.contains(id))
        .collect::<BTreeSet<_>>()
        .len();
    if out_of_scope > 0 {
        tracing::info!(out_of_scope, "Athletes outside the sport scope were left out.");
    }
    tracing::debug!(rows = scoped.len(), "Applied sport scope.");
    Ok(scoped)
}

// ==============================================================================
// Command Handlers
// ==============================================================================

async fn handle_pivot(args: PivotArgs, config: &AnalysisConfig, json: bool) -> anyhow::Result<()> {
    let snapshot = load_scoped(&args.source, config).await?;
    let wide = match &args.entity {
        Some(entity) => pivot_entity(&snapshot, entity, &config.metrics),
        None => pivot(&snapshot, &config.metrics),
    };
    if json {
        render::print_json(wide.rows())
    } else {
        println!("{}", render::wide_table(&wide));
        Ok(())
    }
}

async fn handle_team_stats(args: TeamStatsArgs, config: &AnalysisConfig, json: bool) -> anyhow::Result<()> {
    let snapshot = load_scoped(&args.source, config).await?;
    let engine = AggregationEngine::new(config.team_directory());
    let percentile = args.percentile.unwrap_or(config.load.percentile);
    let stats = engine.group_stats_all(&snapshot, args.partition, &config.metrics, percentile)?;
    if json {
        render::print_json(&stats)
    } else {
        println!("{}", render::group_stats(&stats));
        Ok(())
    }
}

async fn handle_compare(args: CompareArgs, config: &AnalysisConfig, json: bool) -> anyhow::Result<()> {
    let snapshot = load_scoped(&args.source, config).await?;
    let engine = AggregationEngine::new(config.team_directory());
    let mut relative = engine.compare_to_group(&snapshot, args.partition, &config.metrics);
    let summary = summarize_pct_diff(&relative);
    if let Some(entity) = &args.entity {
        relative.retain(|row| &row.entity_id == entity);
    }

    if json {
        return match args.entity {
            Some(_) => render::print_json(&relative),
            None => render::print_json(&summary),
        };
    }
    println!("{}", render::pct_diff(&summary));
    if args.entity.is_some() {
        println!("{}", render::relative(&relative));
    }
    Ok(())
}

async fn handle_trends(args: TrendsArgs, config: &AnalysisConfig, json: bool) -> anyhow::Result<()> {
    let snapshot = load_scoped(&args.source, config).await?;
    let means = yearly_means(&snapshot, &config.metrics);
    if json {
        render::print_json(&means)
    } else {
        println!("{}", render::yearly(&means));
        Ok(())
    }
}

/// Handles the orchestration of a flagging run, optionally one task per sport.
async fn handle_flag(args: FlagArgs, mut config: AnalysisConfig, json: bool) -> anyhow::Result<()> {
    if let Some(selection) = args.selection {
        config.load.selection = selection;
    }
    let classifier = ThresholdRiskClassifier::new(&config)?;
    let snapshot: Arc<[Measurement]> = load_snapshot(&args.source, &config).await?.into();

    let reports = if args.per_sport {
        let sports = sports_to_run(&classifier, &snapshot, &config);
        classify_per_sport(&classifier, snapshot, sports).await?
    } else {
        vec![classifier.classify(&snapshot)?]
    };

    if json {
        return render::print_json(&reports);
    }
    for report in &reports {
        println!("{}\n", render::risk_report(report));
    }
    Ok(())
}

/// The configured sports, or every sport present when the scope is open.
///
/// Every run keeps athletes of unknown sport, so `Unknown` only gets a run of
/// its own when nothing else is present.
fn sports_to_run(classifier: &ThresholdRiskClassifier, snapshot: &[Measurement], config: &AnalysisConfig) -> Vec<Sport> {
    if !classifier.sports().is_empty() {
        return classifier.sports().to_vec();
    }
    let directory = config.team_directory();
    let mut sports: Vec<Sport> = snapshot
        .iter()
        .map(|m| directory.profile(&m.group_key).sport)
        .filter(|sport| *sport != Sport::Unknown)
        .collect();
    sports.sort();
    sports.dedup();
    if sports.is_empty() {
        sports.push(Sport::Unknown);
    }
    sports
}

async fn classify_per_sport(
    classifier: &ThresholdRiskClassifier,
    snapshot: Arc<[Measurement]>,
    sports: Vec<Sport>,
) -> anyhow::Result<Vec<RiskReport>> {
    // Set up the progress bar
    let progress_bar = ProgressBar::new(sports.len() as u64);
    progress_bar.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("#>-"),
    );

    // One blocking task per sport over the shared snapshot
    let tasks: Vec<_> = sports
        .into_iter()
        .map(|sport| {
            let classifier = classifier.clone().for_sport(sport);
            let snapshot = Arc::clone(&snapshot);
            let pb_clone = progress_bar.clone();

            tokio::task::spawn_blocking(move || {
                pb_clone.set_message(format!("Classifying {sport}..."));
                let report = classifier.classify(&snapshot);
                pb_clone.inc(1);
                report
            })
        })
        .collect();

    let results = join_all(tasks).await;
    progress_bar.finish_with_message("Classification complete!");

    let mut reports = Vec::with_capacity(results.len());
    for result in results {
        reports.push(result??);
    }
    Ok(reports)
}

async fn handle_research(args: ResearchArgs, config: AnalysisConfig, json: bool) -> anyhow::Result<()> {
    let snapshot = load_snapshot(&args.source, &config).await?;
    let analyzer = Analyzer::new(config)?;
    let answers = analyzer.run(&snapshot)?;
    if json {
        render::print_json(&answers)
    } else {
        println!("{}", render::research(&answers));
        Ok(())
    }
}
