//! Reference-data lookups (`tarif-desk lookup <kind> <code>`).
//!
//! Prints the rendered info fragment to stdout, or writes a standalone HTML
//! document with `--html`.

use anyhow::Result;
use clap::ArgMatches;
use colored::*;
use std::path::PathBuf;
use std::process::ExitCode;

use crate::cli::AppContext;
use crate::core::models::Language;
use crate::core::reference::ReferenceData;
use crate::infra::data::load_reference_data;
use crate::infra::t;
use crate::reporting::html;

/// Renders the popup of `kind` for `code`; `None` when nothing matches.
pub fn render_lookup(
    kind: &str,
    code: &str,
    data: &ReferenceData,
    lang: Language,
) -> Option<String> {
    match kind {
        "lkn" => html::render_lkn_info(code, data, lang),
        "chapter" => html::render_chapter_info(code, data, lang),
        "group" => html::render_group_info(code, data, lang),
        "icd" => html::render_icd_info(code, data, lang),
        "dignity" => html::render_dignity_info(code, data, lang),
        "interpretation" => html::render_interpretation_info(code, data, lang),
        _ => None,
    }
}

pub async fn execute(ctx: &AppContext, matches: &ArgMatches) -> Result<ExitCode> {
    let locale = ctx.locale();
    let kind = matches.get_one::<String>("kind").map(String::as_str).unwrap_or("lkn");
    let code = matches
        .get_one::<String>("code")
        .map(|c| c.trim().to_string())
        .unwrap_or_default();
    let html_path = matches.get_one::<PathBuf>("html").cloned();

    let loaded = load_reference_data(&ctx.config.data_dir).await;
    if let Some(problem) = &loaded.problem {
        eprintln!("{}", problem.to_string().yellow());
    }

    let Some(fragment) = render_lookup(kind, &code, &loaded.data, ctx.lang) else {
        println!("{}", t!("lookup.not_found", locale = locale, code = code.as_str()).red());
        return Ok(ExitCode::FAILURE);
    };

    match html_path {
        Some(path) => {
            let title = format!("{} {}", kind, code);
            html::write_html(&path, &html::render_document(&title, &fragment, ctx.lang))?;
            println!(
                "{}",
                t!("lookup.written", locale = locale, path = path.display().to_string())
            );
        }
        None => println!("{}", fragment),
    }
    Ok(ExitCode::SUCCESS)
}
