//! # Console Reporting Module / 控制台报告模块
//!
//! Colored console output: live quality-control cell updates, the QC summary
//! table and a compact summary of an analysis result.
//!
//! 彩色控制台输出：质量控制单元格实时更新、质量控制摘要表以及分析结果摘要。

use colored::*;

use crate::core::billing::{BillingKind, BillingResponse};
use crate::core::hints;
use crate::core::models::{CellStatus, Counters, Example, Language};
use crate::core::reference::ReferenceData;
use crate::core::runner::{ResultBoard, RunnerEvent};
use crate::infra::t;

/// Colors a cell label: pass green, fail red, error yellow.
pub fn colored_label(status: &CellStatus, lang: Language) -> ColoredString {
    let label = status.label(lang);
    match status {
        CellStatus::Pass => label.green(),
        CellStatus::Fail { .. } => label.red(),
        CellStatus::Error { .. } => label.yellow(),
        CellStatus::Pending => label.dimmed(),
        CellStatus::Empty => label.normal(),
    }
}

/// Prints one line per settled cell and per finished batch.
/// 每个已完成的单元格和批次打印一行。
pub fn print_event(event: &RunnerEvent, lang: Language) {
    match event {
        RunnerEvent::CellUpdated { id, lang: cell_lang, status } => {
            println!(
                "  {:<28} {}",
                ResultBoard::cell_id(id, *cell_lang),
                colored_label(status, lang)
            );
            if let CellStatus::Error { message } = status {
                println!("  {:<28} {}", "", message.dimmed());
            }
        }
        RunnerEvent::BatchFinished { counters } => {
            println!("{}", counters.summary(lang).bold());
        }
        RunnerEvent::CellPending { .. } | RunnerEvent::RowFinished { .. } => {}
    }
}

/// Prints the result table of the tested examples and the overall summary.
///
/// ```text
/// --- Qualitätskontrolle ---
///   1     DE OK        FR OK        IT Fehler: mismatch
///   2     DE OK        FR error     IT OK
/// Gesamt: 4 / 6 bestanden.
/// ```
pub fn print_qc_summary(
    examples: &[Example],
    board: &ResultBoard,
    counters: Counters,
    lang: Language,
) {
    let locale = lang.code();
    println!("\n{}", format!("--- {} ---", t!("qc.title", locale = locale)).bold());
    for example in examples {
        let Some(row) = board.row(&example.id) else {
            continue;
        };
        if row.cells.iter().all(|c| *c == CellStatus::Empty) {
            continue;
        }
        let cells: Vec<String> = Language::ALL
            .iter()
            .map(|l| {
                format!(
                    "{} {:<10}",
                    l.code().to_uppercase(),
                    colored_label(&row.cells[l.index()], lang)
                )
            })
            .collect();
        println!("  {:<5} {}", example.id.as_str(), cells.join(" "));
    }
    let summary = counters.summary(lang);
    if !summary.is_empty() {
        println!("{}", summary.bold());
    }
}

/// Compact console form of an analysis result.
pub fn print_analysis_summary(response: &BillingResponse, data: &ReferenceData, lang: Language) {
    let locale = lang.code();
    let abrechnung = &response.abrechnung;
    match &abrechnung.kind {
        BillingKind::Pauschale => {
            println!("{}", t!("analysis.pauschale_header", locale = locale).green().bold());
            if let Some(details) = &abrechnung.details {
                println!(
                    "  {} {}",
                    details.code.as_deref().unwrap_or("N/A").bold(),
                    details.text.as_deref().unwrap_or("")
                );
            }
            let status = if abrechnung.conditions_met() {
                t!("pauschale.status_met", locale = locale).green()
            } else {
                t!("pauschale.status_not_met", locale = locale).red()
            };
            println!("  {}", status);
        }
        BillingKind::Tardoc => {
            println!("{}", t!("analysis.tardoc_header", locale = locale).green().bold());
            let mut grand_total = 0.0;
            for leistung in &abrechnung.leistungen {
                match data.tardoc_lookup(&leistung.lkn) {
                    Some(details) => {
                        let total = (details.al + details.ipl) * leistung.menge;
                        grand_total += total;
                        println!(
                            "  {:<12} {:>5} x {:>10.2}  {}",
                            leistung.lkn.bold(),
                            leistung.menge,
                            total,
                            leistung.beschreibung.as_deref().unwrap_or(&details.name)
                        );
                    }
                    None => println!(
                        "  {}",
                        t!("tardoc.not_found", locale = locale, lkn = leistung.lkn.as_str()).red()
                    ),
                }
            }
            println!("  {} {:.2}", t!("tardoc.grand_total", locale = locale).bold(), grand_total);
        }
        BillingKind::Error => {
            println!("{}", t!("analysis.error_header", locale = locale).red().bold());
            let unknown = t!("analysis.unknown_error", locale = locale).to_string();
            let reason = abrechnung.message.as_deref().unwrap_or(&unknown);
            println!("  {}", t!("analysis.reason", locale = locale, reason = reason));
        }
        BillingKind::Unknown(kind) => {
            println!("{}", t!("analysis.unknown_header", locale = locale).red().bold());
            println!("  {}", t!("analysis.unknown_type", locale = locale, kind = kind.as_str()));
        }
    }

    for result in &response.regel_ergebnisse_details {
        for message in result.messages() {
            if hints::is_quantity_reduction(message) {
                println!("  {} {}", "!".red().bold(), message.red());
            } else {
                println!("  - {}", message);
            }
        }
    }
}
