//! Shows or updates the persisted preferences.

use anyhow::Result;
use clap::ArgMatches;
use colored::*;
use std::process::ExitCode;

use crate::cli::AppContext;
use crate::core::models::Language;
use crate::infra::prefs::save_prefs;
use crate::infra::t;

pub fn execute(ctx: &AppContext, matches: &ArgMatches) -> Result<ExitCode> {
    let locale = ctx.locale();
    let use_icd = matches.get_one::<bool>("use-icd").copied();
    let set_lang = matches.get_one::<Language>("set-lang").copied();

    let mut prefs = ctx.prefs.clone();
    if use_icd.is_some() || set_lang.is_some() {
        if use_icd.is_some() {
            prefs.use_icd_relevance = use_icd;
        }
        if set_lang.is_some() {
            prefs.language = set_lang;
        }
        let path = ctx.config.prefs_path();
        save_prefs(&path, &prefs)?;
        println!(
            "{}",
            t!("prefs.saved", locale = locale, path = path.display().to_string()).green()
        );
    }

    let lang = prefs
        .language
        .map(|l| l.code().to_string())
        .unwrap_or_else(|| t!("prefs.unset", locale = locale).to_string());
    println!(
        "{}",
        t!("prefs.show", locale = locale, use_icd = prefs.use_icd(), lang = lang)
    );
    Ok(ExitCode::SUCCESS)
}
