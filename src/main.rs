//! sentiment-lens CLI: customer sentiment alert client.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use miette::{IntoDiagnostic, Result};

use sentiment_lens::client::{AnalysisClient, ProgressUpdate, Supported, cancel_on_interrupt};
use sentiment_lens::config::LensConfig;
use sentiment_lens::error::LensResult;
use sentiment_lens::export;
use sentiment_lens::format::{
    PerformanceRating, format_number, format_processing_time, format_timestamp, format_unix,
    truncate_text, urgency_label,
};
use sentiment_lens::history::{HistoryEntry, HistoryStore, open_history};
use sentiment_lens::input;
use sentiment_lens::paths::LensPaths;
use sentiment_lens::report::{
    AnalysisResult, ComparisonSummary, FilterCriteria, NormalizedReport, Severity,
    SentimentFilter, SortBy, Workflow, compare, filter_result, normalize, sort_items,
};

#[derive(Parser)]
#[command(
    name = "sentiment-lens",
    version,
    about = "Customer sentiment alert client and report normalizer"
)]
struct Cli {
    /// Root directory for config, history and exports (overrides XDG).
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Analysis backend URL.
    #[arg(long, global = true)]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

/// Where a report comes from: a file or stdin, as raw text or result JSON.
#[derive(clap::Args)]
struct ReportInput {
    /// Report file; reads stdin when omitted.
    input: Option<PathBuf>,

    /// Company name for raw-text reports.
    #[arg(long)]
    company: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Normalize a report and print everything extracted from it.
    Parse {
        #[command(flatten)]
        source: ReportInput,

        /// Print the normalized report as JSON.
        #[arg(long)]
        json: bool,
    },

    /// List the agent sections of a report.
    Agents {
        #[command(flatten)]
        source: ReportInput,
    },

    /// List the draft emails in a report.
    Emails {
        #[command(flatten)]
        source: ReportInput,

        /// default, priority, priority-asc or recent.
        #[arg(long, default_value = "priority")]
        sort: String,

        /// Print full bodies instead of previews.
        #[arg(long)]
        full: bool,
    },

    /// Show the executive insights of a report.
    Insights {
        #[command(flatten)]
        source: ReportInput,
    },

    /// Show the scalar metrics of a report.
    Metrics {
        #[command(flatten)]
        source: ReportInput,
    },

    /// Keep only the report lines matching the given criteria.
    Filter {
        #[command(flatten)]
        source: ReportInput,

        /// Whitespace-separated keywords; any match keeps the line.
        #[arg(long, default_value = "")]
        keyword: String,

        /// all, critical, high, medium or low.
        #[arg(long, default_value = "all")]
        severity: String,

        /// all, negative, positive or neutral.
        #[arg(long, default_value = "all")]
        sentiment: String,
    },

    /// Run an analysis on the backend.
    Analyze {
        /// Company to analyze.
        company: String,

        /// Use the five-agent deep workflow.
        #[arg(long)]
        deep: bool,

        /// Stream agent progress while the analysis runs. Ctrl-C stops the
        /// stream; a second Ctrl-C exits immediately.
        #[arg(long)]
        stream: bool,

        /// Dry run: do not save the result to history.
        #[arg(long)]
        no_save: bool,

        /// Also write the result JSON to this file.
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Analyze two or three companies side by side.
    Compare {
        /// Companies to compare.
        #[arg(required = true, num_args = 2..=3)]
        companies: Vec<String>,

        /// Use the five-agent deep workflow.
        #[arg(long)]
        deep: bool,
    },

    /// Saved analyses.
    History {
        #[command(subcommand)]
        action: HistoryAction,
    },

    /// Check that the backend is up.
    Health,

    /// Show example companies.
    Companies,

    /// Write exports to disk.
    Export {
        #[command(subcommand)]
        action: ExportAction,
    },

    /// Inspect or create the config file.
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum HistoryAction {
    /// List saved analyses, most recent first.
    List,
    /// Show one saved analysis.
    Show {
        /// History entry id.
        id: u64,
        /// Print the stored result JSON.
        #[arg(long)]
        json: bool,
    },
    /// Remove every saved analysis.
    Clear,
}

#[derive(Subcommand)]
enum ExportAction {
    /// The raw report framed with its metadata, as text.
    Report {
        #[command(flatten)]
        source: ReportInput,
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Draft emails as a text preview document, or CSV.
    Emails {
        #[command(flatten)]
        source: ReportInput,
        #[arg(long)]
        csv: bool,
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Executive insights as JSON.
    Insights {
        #[command(flatten)]
        source: ReportInput,
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Comparison of saved result files as JSON.
    Comparison {
        /// Two or three analysis result JSON files.
        #[arg(required = true, num_args = 2..=3)]
        inputs: Vec<PathBuf>,
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the effective configuration.
    Show,
    /// Write a default config file if none exists.
    Init,
}

fn main() -> Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(3)
                .build(),
        )
    }))
    .ok(); // Ignore error if hook already set (e.g., in tests)

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let paths = match &cli.data_dir {
        Some(root) => LensPaths::rooted(root),
        None => LensPaths::resolve()?,
    };
    let config = LensConfig::load_or_default(&paths.config_file())?
        .with_overrides(cli.api_url.as_deref());

    match cli.command {
        Commands::Parse { source, json } => {
            let result = read_result(&source)?;
            let report = normalize(&result);
            if json {
                println!("{}", serde_json::to_string_pretty(&report).into_diagnostic()?);
            } else {
                print_summary(&report);
            }
        }

        Commands::Agents { source } => {
            let report = normalize(&read_result(&source)?);
            if report.agents.is_empty() {
                println!("No report text.");
            }
            for section in &report.agents {
                println!("{} {} [{}]", section.icon, section.name, section.color);
                for line in section.body.lines() {
                    println!("    {line}");
                }
                println!();
            }
        }

        Commands::Emails { source, sort, full } => {
            let sort = SortBy::for_emails(&sort)?;
            let report = normalize(&read_result(&source)?);
            if report.emails.is_empty() {
                println!("No draft emails found.");
                return Ok(());
            }
            let tier = report
                .email_tier
                .map_or_else(String::new, |t| format!(" ({t})"));
            println!("Draft emails ({}){tier}:", report.emails.len());
            for (i, email) in sort_items(&report.emails, sort).iter().enumerate() {
                println!();
                println!(
                    "  {}. [{}] {} -> {}",
                    i + 1,
                    email.priority,
                    email.department,
                    email.to
                );
                println!("     Subject: {}", email.subject);
                println!("     Read time: {} min", email.read_time_minutes());
                let body = if full {
                    email.body.clone()
                } else {
                    truncate_text(&email.body, 150)
                };
                for line in body.lines() {
                    println!("     {line}");
                }
            }
        }

        Commands::Insights { source } => {
            let result = read_result(&source)?;
            match normalize(&result).insights {
                Some(insights) if !insights.is_blank() => {
                    println!("Executive insights for {}:", result.company);
                    println!("  Summary: {}", insights.summary);
                    print_list("Immediate actions", &insights.actions);
                    print_list("Key trends", &insights.trends);
                    print_list("Recommendations", &insights.recommendations);
                    println!("  Risk ({}): {}", insights.risk_level(), insights.risk);
                    print_list("Opportunities", &insights.opportunities);
                }
                _ => println!("No executive insights in this report."),
            }
        }

        Commands::Metrics { source } => {
            let report = normalize(&read_result(&source)?);
            print_metrics(&report);
        }

        Commands::Filter {
            source,
            keyword,
            severity,
            sentiment,
        } => {
            let criteria = FilterCriteria {
                keyword,
                severity: severity.parse::<Severity>()?,
                sentiment: sentiment.parse::<SentimentFilter>()?,
                sort_by: SortBy::default(),
            };
            let filtered = filter_result(&read_result(&source)?, &criteria);
            println!("{}", filtered.report());
        }

        Commands::Analyze {
            company,
            deep,
            stream,
            no_save,
            output,
        } => {
            let workflow = workflow_for(deep, &config);
            let client = AnalysisClient::from_config(&config);
            let result = if stream {
                let cancel = cancel_on_interrupt().into_diagnostic()?;
                client.analyze_stream(&company, workflow, print_progress, cancel)?
            } else {
                eprintln!("Running {} analysis for {}...", workflow.label(), company.trim());
                client.analyze(&company, workflow)?
            };

            print_summary(&normalize(&result));

            if let Some(path) = output {
                let json = serde_json::to_string_pretty(&result).into_diagnostic()?;
                write_output(&path, &json)?;
            }
            let store = open_history(&paths, &config, no_save)?;
            let entry = store.save(HistoryEntry::from_result(&result, now_unix()))?;
            if no_save {
                println!("Not saved to history (dry run).");
            } else {
                println!("Saved to history as #{}.", entry.id);
            }
        }

        Commands::Compare { companies, deep } => {
            let workflow = workflow_for(deep, &config);
            let client = AnalysisClient::from_config(&config);
            eprintln!("Comparing {} companies...", companies.len());
            let response = client.compare(&companies, workflow)?;
            print_comparison(&compare(&response.results, workflow));
        }

        Commands::History { action } => {
            let store = open_history(&paths, &config, false)?;
            match action {
                HistoryAction::List => {
                    let entries = store.load()?;
                    if entries.is_empty() {
                        println!("No saved analyses.");
                    } else {
                        println!("Saved analyses ({}):", entries.len());
                        for e in &entries {
                            println!(
                                "  #{:<4} {:<24} {:<5} sentiment {:>3}  mentions {:>7}  {}",
                                e.id,
                                e.company,
                                e.workflow.as_str(),
                                e.sentiment_score,
                                format_number(e.mentions_count),
                                format_unix(e.saved_at)
                            );
                        }
                    }
                }
                HistoryAction::Show { id, json } => {
                    let entry = store.get(id)?;
                    if json {
                        println!(
                            "{}",
                            serde_json::to_string_pretty(&entry.result).into_diagnostic()?
                        );
                    } else {
                        println!("History #{} (saved {})", entry.id, format_unix(entry.saved_at));
                        println!(
                            "  Executed: {}",
                            format_timestamp(entry.result.execution_timestamp.as_deref())
                        );
                        print_summary(&normalize(&entry.result));
                    }
                }
                HistoryAction::Clear => {
                    store.clear()?;
                    println!("History cleared.");
                }
            }
        }

        Commands::Health => {
            let client = AnalysisClient::from_config(&config);
            let health = client.health()?;
            println!("Backend: {}", client.base_url());
            println!("  status:  {}", health.status);
            if let Some(system) = &health.system {
                println!("  system:  {system}");
            }
            if let Some(version) = &health.version {
                println!("  version: {version}");
            }
            for feature in &health.features {
                println!("  - {feature}");
            }
            match client.system_info() {
                Ok(info) => {
                    println!("  {}", info.system);
                    if let Some(description) = &info.description {
                        println!("  {description}");
                    }
                    for (name, path) in &info.endpoints {
                        println!("  {name:<20} {path}");
                    }
                }
                Err(e) => tracing::debug!(error = %e, "system info unavailable"),
            }
        }

        Commands::Companies => {
            let client = AnalysisClient::from_config(&config);
            let companies = client.supported_companies();
            if let Some(Supported::Text(text)) = &companies.supported {
                println!("Supported: {text}");
            }
            println!("Example companies:");
            for name in companies.companies() {
                println!("  {name}");
            }
            for tip in &companies.usage_tips {
                println!("  tip: {tip}");
            }
            if let Some(note) = &companies.note {
                println!("{note}");
            }
        }

        Commands::Export { action } => {
            let date = chrono::Local::now().format("%Y-%m-%d").to_string();
            match action {
                ExportAction::Report { source, output } => {
                    let result = read_result(&source)?;
                    let now = chrono::Local::now().to_rfc3339();
                    let text = export::render_analysis_report(&result, &now);
                    let default = format!("{}_analysis_{date}.txt", export::slug(&result.company));
                    write_export(&paths, output, &default, &text)?;
                }
                ExportAction::Emails {
                    source,
                    csv,
                    output,
                } => {
                    let result = read_result(&source)?;
                    let report = normalize(&result);
                    if report.emails.is_empty() {
                        miette::bail!("no draft emails to export");
                    }
                    let slug = export::slug(&result.company);
                    let (text, default) = if csv {
                        let text = export::emails_csv(&report.emails).unwrap_or_default();
                        (text, format!("{slug}_emails_{date}.csv"))
                    } else {
                        let generated = chrono::Local::now().format("%c").to_string();
                        (
                            export::render_email_previews(&report.emails, &generated),
                            format!("{slug}_email_previews_{date}.txt"),
                        )
                    };
                    write_export(&paths, output, &default, &text)?;
                }
                ExportAction::Insights { source, output } => {
                    let result = read_result(&source)?;
                    let Some(insights) = normalize(&result).insights else {
                        miette::bail!("no executive insights to export");
                    };
                    let json =
                        export::insights_json(&result.company, &insights).into_diagnostic()?;
                    let default =
                        format!("{}_insights_{date}.json", export::slug(&result.company));
                    write_export(&paths, output, &default, &json)?;
                }
                ExportAction::Comparison { inputs, output } => {
                    let results = inputs
                        .iter()
                        .map(|p| input::read_result(Some(p), None))
                        .collect::<Result<Vec<_>, _>>()?;
                    let workflow = results.first().map(|r| r.workflow).unwrap_or_default();
                    let summary = compare(&results, workflow);
                    let json = export::comparison_json(&summary, &date).into_diagnostic()?;
                    write_export(&paths, output, &format!("comparison_{date}.json"), &json)?;
                }
            }
        }

        Commands::Config { action } => match action {
            ConfigAction::Show => {
                println!("# {}", paths.config_file().display());
                print!("{}", toml::to_string_pretty(&config).into_diagnostic()?);
            }
            ConfigAction::Init => {
                let path = paths.config_file();
                if path.exists() {
                    println!("Config already exists at {}", path.display());
                } else {
                    LensConfig::default().save(&path)?;
                    println!("Wrote default config to {}", path.display());
                }
            }
        },
    }

    Ok(())
}

fn workflow_for(deep: bool, config: &LensConfig) -> Workflow {
    if deep {
        Workflow::Deep
    } else {
        config.default_workflow
    }
}

fn now_unix() -> i64 {
    chrono::Utc::now().timestamp()
}

fn read_result(source: &ReportInput) -> LensResult<AnalysisResult> {
    input::read_result(source.input.as_deref(), source.company.as_deref())
}

fn write_output(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).into_diagnostic()?;
    }
    std::fs::write(path, content).into_diagnostic()?;
    println!("Wrote {}", path.display());
    Ok(())
}

fn write_export(
    paths: &LensPaths,
    output: Option<PathBuf>,
    default_name: &str,
    content: &str,
) -> Result<()> {
    let path = output.unwrap_or_else(|| paths.exports_dir().join(default_name));
    write_output(&path, content)
}

fn print_progress(update: &ProgressUpdate) {
    let agent = update.agent.as_deref().unwrap_or("Crew");
    let message = update.message.as_deref().unwrap_or("working");
    match update.progress {
        Some(p) => eprintln!("[{p:>3.0}%] {agent}: {message}"),
        None => eprintln!("       {agent}: {message}"),
    }
}

fn print_list(title: &str, items: &[String]) {
    if items.is_empty() {
        return;
    }
    println!("  {title}:");
    for item in items {
        println!("    - {item}");
    }
}

fn print_metrics(report: &NormalizedReport) {
    let m = &report.metrics;
    println!("  Mentions:        {}", format_number(m.mentions_count));
    println!("  Critical issues: {}", m.critical_count);
    println!(
        "  Sentiment:       {}/100 ({})",
        m.sentiment_score,
        m.sentiment_band()
    );
    println!(
        "  Issues:          {} critical, {} high, {} medium",
        m.issues.critical, m.issues.high, m.issues.medium
    );
    println!("  Urgency:         {}", urgency_label(m.urgency_score));
    println!("  Data source:     {}", m.data_source);
}

fn print_summary(report: &NormalizedReport) {
    let rating = PerformanceRating::from_time(report.processing_time.as_ref());
    println!("{} ({})", report.company, report.workflow.label());
    println!(
        "  Processing time: {} ({rating})",
        format_processing_time(report.processing_time.as_ref())
    );
    print_metrics(report);
    if report.filtered {
        println!("  (filtered view)");
    }

    if report.is_empty() {
        println!("  No report text.");
        return;
    }
    let names: Vec<&str> = report.agents.iter().map(|s| s.name.as_str()).collect();
    println!("  Agents:          {}", names.join(", "));
    println!("  Draft emails:    {}", report.emails.len());
    if let Some(insights) = &report.insights {
        println!("  Risk:            {}", insights.risk_level());
        if !insights.summary.is_empty() {
            println!("  Summary:         {}", truncate_text(&insights.summary, 120));
        }
    }
}

fn print_comparison(summary: &ComparisonSummary) {
    println!("Comparison ({}):", summary.workflow.label());
    for (i, entry) in summary.entries.iter().enumerate() {
        let marker = if summary.best == Some(i) { "*" } else { " " };
        println!(
            " {marker} {:<24} sentiment {:>3}/100  mentions {:>7}  time {}",
            entry.company,
            entry.sentiment_score,
            format_number(entry.mentions),
            format_processing_time(entry.processing_time.as_ref())
        );
    }
    match summary.best_entry() {
        Some(best) => println!("Best performer: {}", best.company),
        None => println!("No company has a positive sentiment score."),
    }
}
