//! # Quality-Control Command Module / 质量控制命令模块
//!
//! Replays examples of the baseline set against `/api/test-example` through
//! the sequential test runner, either selected rows (`--id`) or the whole set
//! as one batch (`--all`). Cell results are printed as they settle.
//!
//! 通过顺序测试运行器将基线示例回放到 `/api/test-example`，
//! 可选择单行（`--id`）或整个集合（`--all`）。

use anyhow::{Context, Result};
use clap::ArgMatches;
use colored::*;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use crate::cli::AppContext;
use crate::core::models::{CellStatus, ExampleId};
use crate::core::runner::{EventSink, RunnerEvent, TestRunner};
use crate::infra::data::load_examples;
use crate::infra::http::BackendClient;
use crate::infra::t;
use crate::reporting::{console, html};

pub async fn execute(ctx: &AppContext, matches: &ArgMatches) -> Result<ExitCode> {
    let locale = ctx.locale();
    let lang = ctx.lang;
    let run_all = matches.get_flag("all");
    let requested: Vec<ExampleId> = matches
        .get_many::<String>("id")
        .map(|ids| ids.map(|id| ExampleId::new(id.as_str())).collect())
        .unwrap_or_default();
    let html_path = matches.get_one::<PathBuf>("html").cloned();

    if requested.is_empty() && !run_all {
        println!("{}", t!("qc.nothing_selected", locale = locale).yellow());
        return Ok(ExitCode::FAILURE);
    }

    let examples_path = ctx.config.examples_path();
    println!(
        "{}",
        t!(
            "qc.loading_examples",
            locale = locale,
            path = examples_path.display().to_string()
        )
    );
    let examples = load_examples(&examples_path)
        .await
        .with_context(|| t!("qc.no_examples", locale = locale).to_string())?;
    if examples.is_empty() {
        println!("{}", t!("qc.no_examples", locale = locale).red());
        return Ok(ExitCode::FAILURE);
    }
    println!(
        "{}",
        t!("qc.loaded_examples", locale = locale, count = examples.len())
    );

    let all_ids: Vec<ExampleId> = examples.iter().map(|e| e.id.clone()).collect();
    if let Some(unknown) = requested.iter().find(|id| !all_ids.contains(id)) {
        println!(
            "{}",
            t!("qc.unknown_example", locale = locale, id = unknown.as_str()).red()
        );
        return Ok(ExitCode::FAILURE);
    }

    let client = BackendClient::new(&ctx.config.base_url, ctx.config.timeout())
        .context("Failed to create HTTP client")?;
    let sink: EventSink = Arc::new(move |event: &RunnerEvent| console::print_event(event, lang));
    let runner = TestRunner::with_events(Arc::new(client), sink);
    runner.seed_rows(&all_ids);

    let tested = if run_all {
        runner.enqueue_all(&all_ids);
        all_ids
    } else {
        for id in &requested {
            runner.enqueue_row(id.clone());
        }
        requested
    };
    runner.wait_idle().await;

    let snapshot = runner.snapshot();
    console::print_qc_summary(&examples, &snapshot.board, snapshot.counters, lang);

    if let Some(path) = html_path {
        let page = html::render_qc_page(&examples, &snapshot.board, snapshot.counters, lang);
        html::write_html(&path, &page)?;
        println!(
            "{}",
            t!("qc.report_written", locale = locale, path = path.display().to_string())
        );
    }

    let all_passed = tested.iter().all(|id| {
        snapshot
            .board
            .row(id)
            .is_some_and(|row| row.cells.iter().all(CellStatus::is_pass))
    });
    if all_passed {
        println!("{}", t!("qc.all_passed", locale = locale).green().bold());
        Ok(ExitCode::SUCCESS)
    } else {
        println!("{}", t!("qc.failures_detected", locale = locale).red().bold());
        Ok(ExitCode::FAILURE)
    }
}
