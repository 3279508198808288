//! # Analyze Command Module / 分析命令模块
//!
//! Sends a service description to `/api/analyze-billing`, prints a console
//! summary of the decision and optionally writes the full HTML rendering.
//!
//! 将服务描述发送到 `/api/analyze-billing`，打印决定摘要，并可选写出完整 HTML。

use anyhow::{Context, Result};
use clap::ArgMatches;
use colored::*;
use std::path::PathBuf;
use std::process::ExitCode;

use crate::cli::AppContext;
use crate::core::billing::{AnalyzeRequest, UserInput};
use crate::error::InputError;
use crate::infra::data::load_reference_data;
use crate::infra::http::BackendClient;
use crate::infra::t;
use crate::reporting::{console, html};

pub async fn execute(ctx: &AppContext, matches: &ArgMatches) -> Result<ExitCode> {
    let locale = ctx.locale();
    let input = UserInput {
        text: matches.get_one::<String>("text").cloned().unwrap_or_default(),
        icd: matches.get_one::<String>("icd").cloned().unwrap_or_default(),
        gtin: matches.get_one::<String>("gtin").cloned().unwrap_or_default(),
        use_icd: !matches.get_flag("no-icd") && ctx.prefs.use_icd(),
        age: matches.get_one::<String>("age").cloned(),
        gender: matches.get_one::<String>("gender").cloned(),
    };
    let html_path = matches.get_one::<PathBuf>("html").cloned();

    let request = match AnalyzeRequest::from_input(&input, ctx.lang) {
        Ok(request) => request,
        Err(InputError::EmptyText) => {
            println!("{}", t!("analysis.empty_input", locale = locale).red());
            return Ok(ExitCode::FAILURE);
        }
        Err(e) => {
            println!("{}", e.to_string().red());
            return Ok(ExitCode::FAILURE);
        }
    };

    println!(
        "{}",
        t!(
            "data.loading",
            locale = locale,
            path = ctx.config.data_dir.display().to_string()
        )
    );
    let loaded = load_reference_data(&ctx.config.data_dir).await;
    let mut page = String::new();
    match &loaded.problem {
        Some(problem) => {
            println!("{}", problem.to_string().yellow());
            page.push_str(&html::render_data_banner(problem, ctx.lang));
        }
        None => println!("{}", t!("data.loaded", locale = locale).green()),
    }

    let client = BackendClient::new(&ctx.config.base_url, ctx.config.timeout())
        .context("Failed to create HTTP client")?;
    println!("{}", t!("analysis.sending", locale = locale).cyan());
    tracing::info!(
        "Analyzing {} chars, {} ICD, {} GTIN, useIcd={}",
        request.input_text.len(),
        request.icd.len(),
        request.gtin.len(),
        request.use_icd
    );

    let code = match client.analyze_billing(&request).await {
        Ok(response) => {
            console::print_analysis_summary(&response, &loaded.data, ctx.lang);
            page.push_str(&html::render_analysis(
                &request.input_text,
                &response,
                &loaded.data,
                ctx.lang,
            ));
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!("Analysis request failed: {}", e);
            println!(
                "{}",
                t!("analysis.server_error", locale = locale, message = e.to_string()).red()
            );
            page.push_str(&html::render_api_error(&e, ctx.lang));
            ExitCode::FAILURE
        }
    };

    if let Some(path) = html_path {
        let document = html::render_document(&request.input_text, &page, ctx.lang);
        html::write_html(&path, &document)?;
        println!(
            "{}",
            t!("analysis.html_written", locale = locale, path = path.display().to_string())
        );
    }

    Ok(code)
}
