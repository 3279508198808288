//! Sends user feedback on a result to `/api/feedback`.

use anyhow::{Context, Result};
use clap::ArgMatches;
use colored::*;
use dialoguer::{Input, theme::ColorfulTheme};
use serde_json::Value;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::cli::AppContext;
use crate::core::billing::FeedbackRequest;
use crate::infra::http::BackendClient;
use crate::infra::t;

pub async fn execute(ctx: &AppContext, matches: &ArgMatches) -> Result<ExitCode> {
    let locale = ctx.locale();
    let comment = match matches.get_one::<String>("comment") {
        Some(comment) => comment.clone(),
        None if std::io::stdin().is_terminal() => Input::<String>::with_theme(&ColorfulTheme::default())
            .with_prompt(t!("feedback.prompt_comment", locale = locale).to_string())
            .allow_empty(true)
            .interact_text()
            .context("Failed to read comment")?,
        None => String::new(),
    };

    let request = FeedbackRequest {
        kind: matches.get_one::<String>("type").cloned().unwrap_or_default(),
        context: matches.get_one::<String>("context").cloned().unwrap_or_default(),
        user_input: matches.get_one::<String>("input").cloned().unwrap_or_default(),
        comment,
        lang: ctx.lang,
        analysis_result: match matches.get_one::<PathBuf>("result") {
            Some(path) => Some(read_analysis_result(path)?),
            None => None,
        },
    };

    let client = BackendClient::new(&ctx.config.base_url, ctx.config.timeout())
        .context("Failed to create HTTP client")?;
    match client.send_feedback(&request).await {
        Ok(response) if response.is_success() => {
            println!("{}", t!("feedback.sent", locale = locale).green());
            Ok(ExitCode::SUCCESS)
        }
        Ok(response) => {
            let message = response
                .error
                .or(response.message)
                .unwrap_or_else(|| "unknown".to_string());
            println!(
                "{}",
                t!("feedback.failed", locale = locale, message = message).red()
            );
            Ok(ExitCode::FAILURE)
        }
        Err(e) => {
            tracing::error!("Feedback request failed: {}", e);
            println!(
                "{}",
                t!("feedback.failed", locale = locale, message = e.to_string()).red()
            );
            Ok(ExitCode::FAILURE)
        }
    }
}

/// Reads a saved analysis response to attach to the feedback unchanged.
pub fn read_analysis_result(path: &Path) -> Result<Value> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read analysis result {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Analysis result {} is not valid JSON", path.display()))
}
