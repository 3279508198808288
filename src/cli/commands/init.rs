//! # Init Command Module / 初始化命令模块
//!
//! Creates a `TarifDesk.toml` configuration file, either through an
//! interactive wizard or, with `--non-interactive`, from the commented
//! default template.
//!
//! 通过交互式向导或（使用 `--non-interactive`）默认模板创建 `TarifDesk.toml` 配置文件。

use anyhow::{Context, Result};
use clap::ArgMatches;
use colored::*;
use dialoguer::{Confirm, Input, Select, theme::ColorfulTheme};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::cli::AppContext;
use crate::core::config::{AppConfig, DEFAULT_CONFIG};
use crate::core::models::Language;
use crate::infra::t;

pub fn execute(ctx: &AppContext, matches: &ArgMatches, config_path: &Path) -> Result<ExitCode> {
    let locale = ctx.locale();
    let force = matches.get_flag("force");
    let non_interactive = matches.get_flag("non-interactive");
    let path_text = config_path.display().to_string();

    if non_interactive {
        if config_path.exists() && !force {
            println!(
                "{}",
                t!("init.file_exists", locale = locale, path = path_text.as_str()).red()
            );
            println!("{}", t!("init.use_force", locale = locale).yellow());
            return Ok(ExitCode::FAILURE);
        }
        write_config(config_path, DEFAULT_CONFIG, locale)?;
        return Ok(ExitCode::SUCCESS);
    }

    let theme = ColorfulTheme::default();
    println!("\n{}", t!("init.welcome", locale = locale).cyan().bold());

    if config_path.exists() && !force {
        let confirmation = Confirm::with_theme(&theme)
            .with_prompt(t!("init.overwrite_prompt", locale = locale, path = path_text.as_str()))
            .default(false)
            .interact()
            .context("Failed to read confirmation")?;
        if !confirmation {
            println!("{}", t!("init.aborted", locale = locale));
            return Ok(ExitCode::SUCCESS);
        }
    }

    let defaults = AppConfig::default();
    let base_url: String = Input::with_theme(&theme)
        .with_prompt(t!("init.prompt_base_url", locale = locale))
        .default(defaults.base_url.clone())
        .validate_with(|input: &String| -> Result<(), &str> {
            if input.starts_with("http://") || input.starts_with("https://") {
                Ok(())
            } else {
                Err("http:// or https://")
            }
        })
        .interact_text()?;
    let data_dir: String = Input::with_theme(&theme)
        .with_prompt(t!("init.prompt_data_dir", locale = locale))
        .default(defaults.data_dir.display().to_string())
        .interact_text()?;
    let codes: Vec<&str> = Language::ALL.iter().map(|l| l.code()).collect();
    let selected = Select::with_theme(&theme)
        .with_prompt(t!("init.prompt_language", locale = locale))
        .items(&codes)
        .default(ctx.lang.index())
        .interact()?;

    let config = AppConfig {
        language: Some(Language::ALL[selected].code().to_string()),
        base_url,
        data_dir: PathBuf::from(data_dir),
        ..defaults
    };
    let content = toml::to_string_pretty(&config).context("Failed to serialize configuration")?;
    write_config(config_path, &content, locale)?;
    Ok(ExitCode::SUCCESS)
}

fn write_config(path: &Path, content: &str, locale: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }
    let path_text = path.display().to_string();
    fs::write(path, content).with_context(|| {
        t!("init.write_failed", locale = locale, path = path_text.as_str()).to_string()
    })?;
    println!(
        "{}",
        t!("init.success", locale = locale, path = path_text.as_str()).green()
    );
    println!("{}", t!("init.next_steps", locale = locale));
    Ok(())
}
