//! # Command-Line Interface / 命令行接口
//!
//! Builds the clap command tree with localized help texts, resolves the
//! effective configuration and output language, and dispatches to the
//! subcommands.
//!
//! 构建带本地化帮助文本的 clap 命令树，解析有效配置与输出语言，并分派到子命令。

use anyhow::{Context, Result};
use clap::parser::ValueSource;
use clap::{Arg, ArgAction, ArgMatches, Command};
use std::env;
use std::path::PathBuf;
use std::process::ExitCode;

use crate::core::config::{self, AppConfig, CONFIG_FILE_NAME};
use crate::core::models::Language;
use crate::infra::prefs::{self, Preferences};
use crate::infra::{logging, t};

pub mod commands;

/// Settings shared by all subcommands after flags, config file, environment
/// and preferences have been merged.
/// 合并命令行参数、配置文件、环境变量和偏好设置后的共享设置。
#[derive(Debug, Clone)]
pub struct AppContext {
    pub config: AppConfig,
    pub lang: Language,
    pub prefs: Preferences,
}

impl AppContext {
    pub fn locale(&self) -> &'static str {
        self.lang.code()
    }
}

/// Pre-parses the command line arguments to find the language setting.
/// This allows the help texts to be localized before the full CLI is built.
/// It looks for `--lang <VALUE>` and `--lang=<VALUE>`.
fn pre_parse_language() -> Language {
    let args: Vec<String> = env::args().collect();
    let explicit = args.iter().enumerate().find_map(|(i, arg)| {
        if arg == "--lang" {
            args.get(i + 1).cloned()
        } else {
            arg.strip_prefix("--lang=").map(str::to_string)
        }
    });
    explicit
        .as_deref()
        .and_then(Language::parse)
        .unwrap_or_else(crate::detect_language)
}

fn path_arg(name: &'static str, help: String) -> Arg {
    Arg::new(name)
        .long(name)
        .help(help)
        .value_name("PATH")
        .value_parser(clap::value_parser!(PathBuf))
        .action(ArgAction::Set)
}

pub fn build_cli(lang: Language) -> Command {
    let locale = lang.code();
    Command::new("tarif-desk")
        .version(env!("CARGO_PKG_VERSION"))
        .about(t!("cli.about", locale = locale).to_string())
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("lang")
                .long("lang")
                .help(t!("cli.lang", locale = locale).to_string())
                .value_name("LANGUAGE")
                .value_parser(clap::value_parser!(Language))
                .global(true)
                .action(ArgAction::Set),
        )
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .help(t!("cli.config", locale = locale).to_string())
                .value_name("CONFIG")
                .default_value(CONFIG_FILE_NAME)
                .value_parser(clap::value_parser!(PathBuf))
                .global(true)
                .action(ArgAction::Set),
        )
        .arg(
            Arg::new("base-url")
                .long("base-url")
                .help(t!("cli.base_url", locale = locale).to_string())
                .value_name("URL")
                .global(true)
                .action(ArgAction::Set),
        )
        .arg(path_arg("data-dir", t!("cli.data_dir", locale = locale).to_string()).global(true))
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help(t!("cli.verbose", locale = locale).to_string())
                .global(true)
                .action(ArgAction::SetTrue),
        )
        .subcommand(
            Command::new("analyze")
                .about(t!("cmd.analyze_about", locale = locale).to_string())
                .arg(
                    Arg::new("text")
                        .help(t!("arg.text", locale = locale).to_string())
                        .value_name("TEXT")
                        .required(true)
                        .action(ArgAction::Set),
                )
                .arg(
                    Arg::new("icd")
                        .long("icd")
                        .help(t!("arg.icd", locale = locale).to_string())
                        .value_name("CODES")
                        .action(ArgAction::Set),
                )
                .arg(
                    Arg::new("gtin")
                        .long("gtin")
                        .help(t!("arg.gtin", locale = locale).to_string())
                        .value_name("CODES")
                        .action(ArgAction::Set),
                )
                .arg(
                    Arg::new("no-icd")
                        .long("no-icd")
                        .help(t!("arg.no_icd", locale = locale).to_string())
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("age")
                        .long("age")
                        .help(t!("arg.age", locale = locale).to_string())
                        .value_name("YEARS")
                        .action(ArgAction::Set),
                )
                .arg(
                    Arg::new("gender")
                        .long("gender")
                        .help(t!("arg.gender", locale = locale).to_string())
                        .value_name("GENDER")
                        .action(ArgAction::Set),
                )
                .arg(path_arg("html", t!("arg.html", locale = locale).to_string())),
        )
        .subcommand(
            Command::new("qc")
                .about(t!("cmd.qc_about", locale = locale).to_string())
                .arg(
                    Arg::new("id")
                        .long("id")
                        .help(t!("arg.id", locale = locale).to_string())
                        .value_name("ID")
                        .action(ArgAction::Append),
                )
                .arg(
                    Arg::new("all")
                        .long("all")
                        .help(t!("arg.all", locale = locale).to_string())
                        .conflicts_with("id")
                        .action(ArgAction::SetTrue),
                )
                .arg(path_arg("html", t!("arg.html", locale = locale).to_string())),
        )
        .subcommand(
            Command::new("lookup")
                .about(t!("cmd.lookup_about", locale = locale).to_string())
                .arg(
                    Arg::new("kind")
                        .help(t!("arg.kind", locale = locale).to_string())
                        .value_name("KIND")
                        .required(true)
                        .value_parser([
                            "lkn",
                            "chapter",
                            "group",
                            "icd",
                            "dignity",
                            "interpretation",
                        ])
                        .action(ArgAction::Set),
                )
                .arg(
                    Arg::new("code")
                        .help(t!("arg.code", locale = locale).to_string())
                        .value_name("CODE")
                        .required(true)
                        .action(ArgAction::Set),
                )
                .arg(path_arg("html", t!("arg.html", locale = locale).to_string())),
        )
        .subcommand(
            Command::new("feedback")
                .about(t!("cmd.feedback_about", locale = locale).to_string())
                .arg(
                    Arg::new("type")
                        .long("type")
                        .help(t!("arg.feedback_type", locale = locale).to_string())
                        .value_name("TYPE")
                        .required(true)
                        .action(ArgAction::Set),
                )
                .arg(
                    Arg::new("comment")
                        .long("comment")
                        .help(t!("arg.comment", locale = locale).to_string())
                        .value_name("TEXT")
                        .action(ArgAction::Set),
                )
                .arg(
                    Arg::new("context")
                        .long("context")
                        .help(t!("arg.context", locale = locale).to_string())
                        .value_name("TEXT")
                        .default_value("")
                        .action(ArgAction::Set),
                )
                .arg(
                    Arg::new("input")
                        .long("input")
                        .help(t!("arg.input", locale = locale).to_string())
                        .value_name("TEXT")
                        .default_value("")
                        .action(ArgAction::Set),
                )
                .arg(
                    Arg::new("result")
                        .long("result")
                        .help(t!("arg.feedback_result", locale = locale).to_string())
                        .value_name("PATH")
                        .value_parser(clap::value_parser!(PathBuf))
                        .action(ArgAction::Set),
                ),
        )
        .subcommand(
            Command::new("prefs")
                .about(t!("cmd.prefs_about", locale = locale).to_string())
                .arg(
                    Arg::new("use-icd")
                        .long("use-icd")
                        .help(t!("arg.use_icd", locale = locale).to_string())
                        .value_name("BOOL")
                        .value_parser(clap::value_parser!(bool))
                        .action(ArgAction::Set),
                )
                .arg(
                    Arg::new("set-lang")
                        .long("set-lang")
                        .help(t!("arg.pref_lang", locale = locale).to_string())
                        .value_name("LANGUAGE")
                        .value_parser(clap::value_parser!(Language))
                        .action(ArgAction::Set),
                ),
        )
        .subcommand(
            Command::new("init")
                .about(t!("cmd.init_about", locale = locale).to_string())
                .arg(
                    Arg::new("force")
                        .short('f')
                        .long("force")
                        .help(t!("arg.force", locale = locale).to_string())
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("non-interactive")
                        .long("non-interactive")
                        .help(t!("arg.non_interactive", locale = locale).to_string())
                        .action(ArgAction::SetTrue),
                ),
        )
}

/// Parses the process arguments with help texts in the pre-detected language.
pub fn parse_args() -> ArgMatches {
    build_cli(pre_parse_language()).get_matches()
}

/// Merges config file, environment, flags and preferences.
///
/// Language precedence: `--lang`, saved preference, config file, system
/// locale, German.
pub fn resolve_context(matches: &ArgMatches) -> Result<AppContext> {
    let config_path = matches
        .get_one::<PathBuf>("config")
        .cloned()
        .unwrap_or_else(|| PathBuf::from(CONFIG_FILE_NAME));
    let explicit = matches.value_source("config") == Some(ValueSource::CommandLine);

    // `init` creates the file, so a missing or broken one must not stop it.
    let loaded = if matches.subcommand_name() == Some("init") {
        Ok(config::load_or_default(&config_path, false).unwrap_or_else(|e| {
            tracing::warn!("{}", e);
            AppConfig::default()
        }))
    } else {
        config::load_or_default(&config_path, explicit)
    };
    let mut app_config = loaded
        .with_context(|| {
            t!(
                "config.read_failed",
                path = config_path.display().to_string()
            )
            .to_string()
        })?
        .with_env_overrides();

    if let Some(url) = matches.get_one::<String>("base-url") {
        app_config.base_url = url.trim_end_matches('/').to_string();
    }
    if let Some(dir) = matches.get_one::<PathBuf>("data-dir") {
        app_config.data_dir = dir.clone();
    }

    let prefs = prefs::load_prefs(&app_config.prefs_path());
    let lang = matches
        .get_one::<Language>("lang")
        .copied()
        .or(prefs.language)
        .or_else(|| app_config.language.as_deref().and_then(Language::parse))
        .unwrap_or_else(crate::detect_language);

    Ok(AppContext {
        config: app_config,
        lang,
        prefs,
    })
}

/// Runs the selected subcommand and returns the process exit code.
pub async fn process_command(matches: ArgMatches) -> Result<ExitCode> {
    logging::init(matches.get_flag("verbose"));

    let ctx = resolve_context(&matches)?;
    crate::init(ctx.lang);
    tracing::debug!(
        "Language {}, backend {}, data {}",
        ctx.lang,
        ctx.config.base_url,
        ctx.config.data_dir.display()
    );

    match matches.subcommand() {
        Some(("analyze", sub)) => commands::analyze::execute(&ctx, sub).await,
        Some(("qc", sub)) => commands::qc::execute(&ctx, sub).await,
        Some(("lookup", sub)) => commands::lookup::execute(&ctx, sub).await,
        Some(("feedback", sub)) => commands::feedback::execute(&ctx, sub).await,
        Some(("prefs", sub)) => commands::prefs::execute(&ctx, sub),
        Some(("init", sub)) => {
            let config_path = matches
                .get_one::<PathBuf>("config")
                .cloned()
                .unwrap_or_else(|| PathBuf::from(CONFIG_FILE_NAME));
            commands::init::execute(&ctx, sub, &config_path)
        }
        // subcommand_required makes clap print help before we get here
        _ => Ok(ExitCode::SUCCESS),
    }
}
