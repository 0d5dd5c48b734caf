//! Command-line front end: check a markdown draft headlessly and gate its export.

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use serde::Serialize;
use std::io::{self, Read};
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;
use wordwise_core::draft::{DraftGenerator, StaticDraft};
use wordwise_core::history::{HistoryStore, MemoryHistory};
use wordwise_core::{Config, Finding};
use wordwise_editor::export::DEFAULT_LINES_PER_PAGE;
use wordwise_editor::{
    CheckerClient, CheckerServices, EditorOptions, EditorSession, ExportError,
};

const DEFAULT_LOG_FILTER: &str = "wordwise_core=warn,wordwise_editor=info";
const UNTITLED: &str = "Untitled draft";
const TITLE_MAX_CHARS: usize = 60;
const POSITIONS_NOTE: &str = "note: positions are line:col in the plain text (markdown markup removed)";

#[derive(Parser)]
#[command(name = "wordwise", about = "WordWise writing checker", version)]
struct Cli {
    /// Output in JSON format
    #[arg(short, long, global = true)]
    json: bool,

    /// Language tag sent to the grammar service
    #[arg(short, long, global = true, env = "WORDWISE_LANGUAGE")]
    language: Option<String>,

    /// Skip the remote grammar service
    #[arg(long, global = true)]
    no_grammar: bool,

    /// Seconds to wait for all checks to finish
    #[arg(short = 't', long, global = true, default_value = "30")]
    timeout: u64,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
    /// Check a markdown file (or stdin) and list its issues
    ///
    /// Finding positions are line:col in the checked plain text, with
    /// markdown markup removed and blocks separated by a blank line.
    Check {
        #[arg(short, long)]
        file: Option<String>,
    },
    /// Check a markdown file and write it out paginated when clean
    Export {
        file: String,
        #[arg(short, long)]
        output: PathBuf,
        #[arg(long, default_value_t = DEFAULT_LINES_PER_PAGE)]
        lines_per_page: usize,
    },
    /// Generate a draft from a prompt and check it
    ///
    /// Drafts are kept in an in-memory history for this run only.
    Draft {
        prompt: String,
    },
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(io::stderr)
        .compact()
        .init();
}

/// Everything one headless check produced.
#[derive(Debug, Serialize)]
struct CheckReport {
    spelling_available: bool,
    settled: bool,
    spelling: Vec<Finding>,
    grammar: Vec<Finding>,
    profanity: Vec<String>,
    export_ready: bool,
    #[serde(skip)]
    text: String,
    #[serde(skip)]
    status: String,
}

fn apply_overrides(mut config: Config, language: Option<String>, no_grammar: bool) -> Config {
    if let Some(language) = language.filter(|value| !value.trim().is_empty()) {
        config.language = language.trim().to_string();
    }
    if no_grammar {
        config.grammar_enabled = false;
    }
    config
}

/// Headless runs have no typing to debounce.
fn headless_options(config: &Config, lines_per_page: usize) -> EditorOptions {
    EditorOptions {
        spelling_delay: Duration::ZERO,
        grammar_delay: Duration::ZERO,
        profanity_delay: Duration::ZERO,
        revalidate_delay: Duration::ZERO,
        lines_per_page,
        ..EditorOptions::from_config(config)
    }
}

fn check_document(session: &mut EditorSession, content: &str, timeout: Duration) -> CheckReport {
    session.open(content, Instant::now());
    let settled = session.run_until_idle(timeout);
    if !settled {
        warn!(timeout_secs = timeout.as_secs(), "checks did not finish before the timeout");
    }
    let status = session.export_status();
    CheckReport {
        spelling_available: session.client().is_spelling_ready(),
        settled,
        spelling: session
            .spelling_findings()
            .into_iter()
            .map(|(_, finding)| finding)
            .collect(),
        grammar: session
            .grammar_findings()
            .into_iter()
            .map(|(_, finding)| finding)
            .collect(),
        profanity: session.profanity_words().to_vec(),
        export_ready: status.is_ready(),
        text: session.text().unwrap_or_default(),
        status: status.to_string(),
    }
}

/// First non-empty line with heading markers stripped.
fn draft_title(content: &str) -> String {
    let title = content
        .lines()
        .map(|line| line.trim().trim_start_matches('#').trim())
        .find(|line| !line.is_empty())
        .unwrap_or(UNTITLED);
    title.chars().take(TITLE_MAX_CHARS).collect()
}

/// Save `content` to the run's history; nothing outlives the process.
fn record_history(history: &dyn HistoryStore, prompt: &str, content: &str) -> Option<String> {
    match history.save(&draft_title(content), prompt, content) {
        Ok(item) => {
            debug!(history_id = %item.id, title = %item.title, "recorded draft");
            Some(item.id)
        }
        Err(err) => {
            warn!(error = %err, "failed to record draft history");
            None
        }
    }
}

/// 1-based line and column of char `offset` in the plain text `text`.
fn line_col(text: &str, offset: usize) -> (usize, usize) {
    let mut line = 1;
    let mut col = 1;
    for c in text.chars().take(offset) {
        if c == '\n' {
            line += 1;
            col = 1;
        } else {
            col += 1;
        }
    }
    (line, col)
}

fn format_finding(label: &str, text: &str, finding: &Finding) -> String {
    let (line, col) = line_col(text, finding.start);
    let mut row = format!("{:<9} {:>4}:{:<4} {}", label, line, col, finding.text);
    if !finding.suggestions.is_empty() {
        row.push_str(" -> ");
        row.push_str(&finding.suggestions.join(", "));
    }
    row
}

fn format_report(report: &CheckReport, json: bool) -> Result<String, String> {
    if json {
        return serde_json::to_string_pretty(report)
            .map_err(|err| format!("report encoding error: {}", err));
    }

    let mut rows = Vec::new();
    if !report.spelling.is_empty() || !report.grammar.is_empty() {
        rows.push(POSITIONS_NOTE.to_string());
    }
    for finding in &report.spelling {
        rows.push(format_finding("spelling", &report.text, finding));
    }
    for finding in &report.grammar {
        rows.push(format_finding("grammar", &report.text, finding));
    }
    for word in &report.profanity {
        rows.push(format!("{:<9} {}", "profanity", word));
    }
    if !report.spelling_available {
        rows.push("note: spelling unavailable (dictionary not loaded)".to_string());
    }
    if !report.settled {
        rows.push("note: some checks did not finish".to_string());
    }
    rows.push(report.status.clone());
    Ok(rows.join("\n"))
}

fn read_input(file: Option<&str>) -> io::Result<String> {
    match file {
        Some(path) => std::fs::read_to_string(path),
        None => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer)?;
            Ok(buffer)
        }
    }
}

fn print_report_or_exit(report: &CheckReport, json: bool, action: &str) {
    match format_report(report, json) {
        Ok(output) => println!("{}", output),
        Err(message) => {
            eprintln!("{} failed: {}", action, message);
            std::process::exit(1);
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let Cli {
        json,
        language,
        no_grammar,
        timeout,
        command,
    } = Cli::parse();

    if let Commands::Completions { shell } = &command {
        let mut cmd = Cli::command();
        let name = cmd.get_name().to_string();
        generate(*shell, &mut cmd, name, &mut io::stdout());
        return Ok(());
    }

    init_tracing();
    let config = apply_overrides(Config::from_env()?, language, no_grammar);
    let timeout = Duration::from_secs(timeout);
    let lines_per_page = match &command {
        Commands::Export { lines_per_page, .. } => *lines_per_page,
        _ => DEFAULT_LINES_PER_PAGE,
    };
    let client = CheckerClient::spawn(CheckerServices::from_config(&config)?);
    let mut session = EditorSession::new(client, headless_options(&config, lines_per_page));
    let history = MemoryHistory::new(config.history_limit);

    match command {
        Commands::Completions { .. } => unreachable!("completions handled before session setup"),
        Commands::Check { file } => {
            let content = read_input(file.as_deref())?;
            let report = check_document(&mut session, &content, timeout);
            record_history(&history, "", &content);
            session.teardown();
            print_report_or_exit(&report, json, "Check");
            if !report.export_ready {
                std::process::exit(1);
            }
        }
        Commands::Export { file, output, .. } => {
            let content = read_input(Some(file.as_str()))?;
            let report = check_document(&mut session, &content, timeout);
            let exported = session.export_to(&output);
            session.teardown();
            match exported {
                Ok(pages) => {
                    if json {
                        print_report_or_exit(&report, json, "Export");
                    } else {
                        println!("Exported {} page(s) to {}", pages, output.display());
                    }
                }
                Err(ExportError::Blocked(status)) => {
                    if let Ok(rows) = format_report(&report, false) {
                        eprintln!("{}", rows);
                    }
                    eprintln!("Export failed: {}", status);
                    std::process::exit(1);
                }
                Err(err) => {
                    eprintln!("Export failed: {}", err);
                    std::process::exit(1);
                }
            }
        }
        Commands::Draft { prompt } => {
            let content = StaticDraft::default().generate(&prompt)?;
            let report = check_document(&mut session, &content, timeout);
            record_history(&history, &prompt, &content);
            session.teardown();
            if !json {
                println!("{}", content);
            }
            print_report_or_exit(&report, json, "Draft");
        }
    }
    Ok(())
}
