//! SafeBrowse command line
//!
//! Runs the website and document workflows against the canned capabilities,
//! the same ones the extension popup falls back to without a backend.
//!
//! Usage:
//!   safebrowse website https://example.com --simulate danger
//!   safebrowse website --current-tab
//!   safebrowse document --file terms.pdf
//!   safebrowse document --text "..." --json
//!   safebrowse settings

mod config;
mod render;

use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use safebrowse_core::{
    canned::{CannedRiskAnalyzer, CannedSummarizer, StaticBrowserContext},
    AnalysisRequest, DocumentAnalysisWorkflow, FileHandle, InputMode, RiskLevel, RunnerEvent,
    RunnerEventKind, WebsiteAnalysisWorkflow, WebsiteReport,
};
use serde_json::json;
use tokio::sync::broadcast;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;

#[derive(Parser)]
#[command(name = "safebrowse")]
#[command(about = "Check websites and summarize legal documents")]
struct Cli {
    /// Print the result as JSON instead of a formatted report
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check whether a website can be trusted
    Website {
        /// URL to check (a bare host gets https://)
        url: Option<String>,

        /// Check the active tab instead (SAFEBROWSE_ACTIVE_TAB_URL)
        #[arg(long, conflicts_with = "url")]
        current_tab: bool,

        /// Verdict the offline analyzer returns
        #[arg(long, default_value = "caution")]
        simulate: RiskLevel,
    },

    /// Summarize the legal risk in a document
    Document {
        /// File to upload
        #[arg(long, conflicts_with = "text", required_unless_present = "text")]
        file: Option<PathBuf>,

        /// Text to paste (more than 50 characters)
        #[arg(long)]
        text: Option<String>,
    },

    /// Show the effective settings
    Settings,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,safebrowse_core=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = Config::from_env().context("Failed to load configuration")?;

    match cli.command {
        Commands::Website {
            url,
            current_tab,
            simulate,
        } => check_website(&config, url, current_tab, simulate, cli.json).await,
        Commands::Document { file, text } => summarize_document(&config, file, text, cli.json).await,
        Commands::Settings => {
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&config.settings)?);
            } else {
                render::settings(&config.settings);
            }
            Ok(())
        }
    }
}

async fn check_website(
    config: &Config,
    url: Option<String>,
    current_tab: bool,
    simulate: RiskLevel,
    json: bool,
) -> Result<()> {
    let mut workflow = WebsiteAnalysisWorkflow::new(
        Arc::new(CannedRiskAnalyzer::new(simulate)),
        Arc::new(StaticBrowserContext::new(config.active_tab_url.clone())),
        config.settings.context(),
    );

    if current_tab {
        workflow
            .use_current_tab()
            .await
            .context("Could not read the active tab")?;
    } else if let Some(url) = url {
        workflow.set_url(url);
    }
    if !workflow.can_analyze() {
        bail!("Enter a website URL or pass --current-tab");
    }

    let request = AnalysisRequest::from(workflow.request()?);
    let events = workflow.events();
    let handle = workflow.analyze()?;
    tracing::info!(url = workflow.url(), "Analyzing website");
    let result = follow(
        handle,
        events,
        || workflow.cancel(),
        json,
        tokio::signal::ctrl_c(),
    )
    .await?;

    if json {
        let output = json!({
            "request": request,
            "result": result,
            "report": WebsiteReport::from(&result),
            "notify": result.should_notify(&config.settings),
            "block": result.should_block(&config.settings),
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        render::website(workflow.url(), &result, &config.settings);
    }
    Ok(())
}

async fn summarize_document(
    config: &Config,
    file: Option<PathBuf>,
    text: Option<String>,
    json: bool,
) -> Result<()> {
    let mut workflow =
        DocumentAnalysisWorkflow::new(Arc::new(CannedSummarizer::new()), config.settings.context());

    match (file, text) {
        (Some(path), _) => {
            let file = FileHandle::open(&path)
                .await
                .with_context(|| format!("Failed to read {}", path.display()))?;
            if !file.is_pdf() {
                tracing::warn!(name = %file.name, "File does not look like a PDF");
            }
            workflow.set_mode(InputMode::Upload);
            workflow.select_file(file);
        }
        (None, Some(text)) => {
            workflow.set_mode(InputMode::Paste);
            workflow.set_text(text);
        }
        (None, None) => bail!("Pass --file or --text"),
    }

    let events = workflow.events();
    let handle = workflow.analyze()?;
    follow(
        handle,
        events,
        || workflow.cancel(),
        json,
        tokio::signal::ctrl_c(),
    )
    .await?;

    let report = workflow
        .report()
        .context("Summary missing after a completed run")?;
    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        render::document(&report);
    }
    Ok(())
}

/// Wait for a run, echoing progress and cancelling once `interrupt` fires.
async fn follow<T, F, I>(
    handle: F,
    mut events: broadcast::Receiver<RunnerEvent>,
    cancel: impl Fn() -> bool,
    quiet: bool,
    interrupt: I,
) -> Result<T>
where
    F: Future<Output = safebrowse_core::Result<T>> + Unpin,
    I: Future,
{
    let mut handle = handle;
    tokio::pin!(interrupt);
    let mut listening = true;
    let mut interrupted = false;
    loop {
        tokio::select! {
            outcome = &mut handle => return Ok(outcome?),
            event = events.recv(), if listening => match event {
                Ok(RunnerEvent { kind: RunnerEventKind::Progress { percent }, .. }) if !quiet => {
                    render::progress(percent);
                }
                Ok(_) | Err(broadcast::error::RecvError::Lagged(_)) => {}
                Err(broadcast::error::RecvError::Closed) => listening = false,
            },
            _ = &mut interrupt, if !interrupted => {
                interrupted = true;
                if cancel() {
                    tracing::warn!("Cancelling analysis");
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_website_defaults_to_caution() {
        let cli = Cli::try_parse_from(["safebrowse", "website", "example.com"]).unwrap();
        match cli.command {
            Commands::Website { url, simulate, .. } => {
                assert_eq!(url.as_deref(), Some("example.com"));
                assert_eq!(simulate, RiskLevel::Caution);
            }
            _ => panic!("expected website command"),
        }
    }

    #[tokio::test]
    async fn test_interrupt_cancels_run() {
        let mut workflow = WebsiteAnalysisWorkflow::new(
            Arc::new(
                CannedRiskAnalyzer::new(RiskLevel::Safe)
                    .with_delay(std::time::Duration::from_secs(30)),
            ),
            Arc::new(StaticBrowserContext::default()),
            Default::default(),
        );
        workflow.set_url("example.com");

        let events = workflow.events();
        let handle = workflow.analyze().unwrap();
        let outcome = follow(
            handle,
            events,
            || workflow.cancel(),
            true,
            std::future::ready(()),
        )
        .await;

        let err = outcome.unwrap_err();
        assert_eq!(
            err.downcast_ref::<safebrowse_core::WorkflowError>(),
            Some(&safebrowse_core::WorkflowError::Cancelled)
        );
        assert!(workflow.state().is_terminal());
    }

    #[test]
    fn test_document_requires_one_source() {
        assert!(Cli::try_parse_from(["safebrowse", "document"]).is_err());
        assert!(Cli::try_parse_from([
            "safebrowse", "document", "--file", "a.pdf", "--text", "b"
        ])
        .is_err());
        assert!(Cli::try_parse_from(["safebrowse", "document", "--text", "b", "--json"]).is_ok());
    }
}
