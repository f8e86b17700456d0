use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use colored::Colorize;
use revtrack_diff::render_split_document;
use revtrack_store::FsHost;
use revtrack_types::DocumentId;
use revtrack_workflow::{
    NullSink, PresentationSink, RevisionWorkflow, WorkflowConfig, WorkflowReport,
};
use tracing::debug;

use crate::cli::*;
use crate::terminal::TerminalSink;

/// Name of the configuration file looked up in the root directory.
const CONFIG_FILE_NAME: &str = "revtrack.toml";

pub async fn run_command(cli: Cli) -> anyhow::Result<()> {
    let config = load_config(&cli.root, cli.config.as_deref())?;
    match cli.command {
        Command::Calculate(ref args) => cmd_calculate(&cli, config, args).await,
        Command::Previous(ref args) => cmd_previous(&cli, config, args).await,
        Command::Config => cmd_config(&cli, &config),
    }
}

/// `--config FILE`, else `revtrack.toml` under the root, else defaults.
fn load_config(root: &Path, explicit: Option<&Path>) -> anyhow::Result<WorkflowConfig> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => {
            let candidate = root.join(CONFIG_FILE_NAME);
            if !candidate.is_file() {
                debug!(root = %root.display(), "no configuration file, using defaults");
                return Ok(WorkflowConfig::default());
            }
            candidate
        }
    };
    let config = WorkflowConfig::load(&path)
        .with_context(|| format!("loading configuration from {}", path.display()))?;
    debug!(path = %path.display(), "configuration loaded");
    Ok(config)
}

fn workflow(cli: &Cli, config: WorkflowConfig) -> anyhow::Result<(Arc<FsHost>, RevisionWorkflow)> {
    let host = Arc::new(FsHost::with_suffix(cli.root.clone(), config.patch_suffix.clone()));
    let sink: Arc<dyn PresentationSink> = match cli.format {
        OutputFormat::Text => Arc::new(TerminalSink),
        OutputFormat::Json => Arc::new(NullSink),
    };
    let workflow = RevisionWorkflow::new(host.clone(), sink, config)?;
    Ok((host, workflow))
}

async fn cmd_calculate(cli: &Cli, config: WorkflowConfig, args: &CalculateArgs) -> anyhow::Result<()> {
    let id = DocumentId::new(&args.path)
        .with_context(|| format!("invalid document path {:?}", args.path))?;
    let (host, workflow) = workflow(cli, config)?;
    host.set_active(Some(id.clone()));

    let report = workflow
        .calculate_active()
        .await
        .with_context(|| format!("calculating diff for {id}"))?;

    if let Some(out) = &args.html {
        export_html(out, &report)?;
    }

    match cli.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Text => print_summary(&report, args.html.as_deref()),
    }
    Ok(())
}

fn export_html(out: &Path, report: &WorkflowReport) -> anyhow::Result<()> {
    let html = render_split_document(&report.diff, report.document.as_str());
    std::fs::write(out, html).with_context(|| format!("writing {}", out.display()))?;
    debug!(path = %out.display(), "split view exported");
    Ok(())
}

fn print_summary(report: &WorkflowReport, html: Option<&Path>) {
    let stats = report.diff.stats();
    if report.diff.is_unchanged() {
        println!("No changes since the previous version.");
    }
    println!(
        "{} {} inserted, {} deleted, {} unchanged (previous: {})",
        "✓".green().bold(),
        stats.inserted.to_string().green(),
        stats.deleted.to_string().red(),
        stats.unchanged,
        report.previous_source.to_string().cyan(),
    );
    for warning in &report.warnings {
        println!("  {} {}", "warning:".yellow().bold(), warning);
    }
    if report.chain_advanced {
        println!("  Patch: {}", report.patch_path.dimmed());
    } else {
        println!("  {} patch chain did not advance", "✗".red().bold());
    }
    if let Some(path) = html {
        println!("  HTML: {}", path.display().to_string().blue());
    }
}

async fn cmd_previous(cli: &Cli, config: WorkflowConfig, args: &PreviousArgs) -> anyhow::Result<()> {
    let id = DocumentId::new(&args.path)
        .with_context(|| format!("invalid document path {:?}", args.path))?;
    let (_, workflow) = workflow(cli, config)?;
    let previous = workflow
        .previous(&id)
        .await
        .with_context(|| format!("reconstructing previous version of {id}"))?;

    match cli.format {
        OutputFormat::Json => {
            let value = serde_json::json!({
                "document": id,
                "previous_source": previous.source,
                "warning": previous.warning,
                "text": previous.text,
            });
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
        OutputFormat::Text => {
            if let Some(warning) = &previous.warning {
                eprintln!("{} {}", "warning:".yellow().bold(), warning);
            }
            print!("{}", previous.text);
        }
    }
    Ok(())
}

fn cmd_config(cli: &Cli, config: &WorkflowConfig) -> anyhow::Result<()> {
    match cli.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(config)?),
        OutputFormat::Text => print!("{}", config.to_toml_string()?),
    }
    Ok(())
}
