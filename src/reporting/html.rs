//! # HTML Rendering Module / HTML 渲染模块
//!
//! Turns backend responses and reference-data lookups into HTML fragments,
//! and builds the quality-control page. Text that comes from the backend or
//! the datasets is always escaped; only the backend's own pre-rendered
//! fragments (`bedingungs_pruef_html`, `pauschale_erklaerung_html`) are
//! inserted as they are.
//!
//! 将后端响应和参考数据查询渲染为 HTML 片段，并生成质量控制页面。
//! 来自后端或数据集的文本始终转义；只有后端预渲染的片段原样插入。

use anyhow::{Context, Result};
use maud::{DOCTYPE, PreEscaped, html};
use std::fs;
use std::path::Path;

use crate::core::billing::{
    Abrechnung, BillingKind, BillingResponse, RuleResult, Stage1Result, Stage2Result,
    TardocLeistung,
};
use crate::core::hints;
use crate::core::models::{CellStatus, Counters, Example, Language};
use crate::core::reference::{ReferenceData, TariffPosition};
use crate::core::runner::ResultBoard;
use crate::error::{ApiError, DataError};
use crate::infra::t;

/// Embedded CSS for analysis and lookup documents / 分析与查询文档的嵌入式 CSS
const ANALYSIS_STYLE: &str = include_str!("assets/analysis.css");

/// Embedded CSS for the quality-control page / 质量控制页面的嵌入式 CSS
const QC_STYLE: &str = include_str!("assets/qc.css");

/// Longest raw response excerpt shown under a backend error.
pub const RAW_EXCERPT_CHARS: usize = 1000;

/// Renders the complete analysis result: heading, decision, decision details,
/// LLM stage 1 and 2 blocks and the rule-check block.
///
/// 渲染完整的分析结果：标题、决定、决定详情、LLM 第一和第二阶段以及规则检查。
pub fn render_analysis(
    input: &str,
    response: &BillingResponse,
    data: &ReferenceData,
    lang: Language,
) -> String {
    let locale = lang.code();
    let abrechnung = &response.abrechnung;
    let mut html = String::new();

    html.push_str(&format!(
        "<h2>{}</h2>",
        t!("analysis.heading", locale = locale, input = escape_html(input))
    ));

    match &abrechnung.kind {
        BillingKind::Pauschale => {
            tracing::debug!("Billing type Pauschale: {:?}", abrechnung.details);
            html.push_str(&decision_header(
                "success",
                &t!("analysis.pauschale_header", locale = locale),
            ));
            if abrechnung.details.is_some() {
                html.push_str(&render_pauschale(abrechnung, lang));
            } else {
                html.push_str(&format!(
                    "<p class='error'>{}</p>",
                    t!("analysis.pauschale_missing", locale = locale)
                ));
            }
        }
        BillingKind::Tardoc => {
            html.push_str(&decision_header(
                "success",
                &t!("analysis.tardoc_header", locale = locale),
            ));
            if abrechnung.leistungen.is_empty() {
                html.push_str(&format!(
                    "<p><i>{}</i></p>",
                    t!("analysis.no_tardoc", locale = locale)
                ));
            } else {
                html.push_str(&render_tardoc_table(
                    &abrechnung.leistungen,
                    &response.regel_ergebnisse_details,
                    data,
                    lang,
                ));
            }
        }
        BillingKind::Error => {
            tracing::warn!("Billing type Error: {:?}", abrechnung.message);
            html.push_str(&decision_header(
                "error",
                &t!("analysis.error_header", locale = locale),
            ));
            let unknown = t!("analysis.unknown_error", locale = locale).to_string();
            let reason = abrechnung
                .message
                .as_deref()
                .filter(|m| !m.is_empty())
                .unwrap_or(&unknown);
            html.push_str(&format!(
                "<p><i>{}</i></p>",
                t!("analysis.reason", locale = locale, reason = escape_html(reason))
            ));
        }
        BillingKind::Unknown(kind) => {
            tracing::error!("Unknown billing type: {}", kind);
            html.push_str(&decision_header(
                "error",
                &t!("analysis.unknown_header", locale = locale),
            ));
            html.push_str(&format!(
                "<p class='error'>{}</p>",
                t!("analysis.unknown_type", locale = locale, kind = escape_html(kind))
            ));
        }
    }

    html.push_str(&render_stage1(&response.llm_ergebnis_stufe1, data, lang));
    html.push_str(&render_stage2(&response.llm_ergebnis_stufe2, data, lang));
    html.push_str(&render_rule_checks(
        &response.regel_ergebnisse_details,
        abrechnung.kind == BillingKind::Error,
        lang,
    ));
    html
}

fn decision_header(class: &str, text: &str) -> String {
    format!(
        "<p class='final-result-header {}'><b>{}</b></p>",
        class,
        escape_html(text)
    )
}

/// Pauschale code/description/tax-point table with the optional explanation
/// and condition-check blocks, wrapped in an open summary showing whether the
/// structured condition logic was fulfilled.
pub fn render_pauschale(abrechnung: &Abrechnung, lang: Language) -> String {
    let locale = lang.code();
    let Some(details) = &abrechnung.details else {
        return format!(
            "<p class='error'>{}</p>",
            t!("analysis.pauschale_missing", locale = locale)
        );
    };

    let code = escape_html(details.code.as_deref().unwrap_or("N/A"));
    let text = escape_html(details.text.as_deref().unwrap_or("N/A"));
    let tax_points = escape_html(&value_text(details.tax_points.as_ref()));
    let conditions_met = abrechnung.conditions_met();

    let mut content = String::new();
    content.push_str(&format!(
        "<table><thead><tr><th>{}</th><th>{}</th><th>{}</th></tr></thead>",
        t!("pauschale.col_code", locale = locale),
        t!("pauschale.col_text", locale = locale),
        t!("pauschale.col_tp", locale = locale)
    ));
    content.push_str(&format!(
        "<tbody><tr><td>{}</td><td>{}</td><td>{}</td></tr></tbody></table>",
        code, text, tax_points
    ));

    if let Some(explanation) = details
        .pauschale_erklaerung_html
        .as_deref()
        .filter(|e| !e.is_empty())
    {
        content.push_str(&format!(
            "<details><summary>{}</summary>{}</details>",
            t!("pauschale.explanation", locale = locale),
            explanation
        ));
    }

    if let Some(conditions_html) = abrechnung
        .bedingungs_pruef_html
        .as_deref()
        .filter(|h| !h.is_empty())
    {
        let open = !conditions_met || !abrechnung.bedingungs_fehler.is_empty();
        let status = if conditions_met {
            t!("pauschale.logic_met", locale = locale)
        } else {
            t!("pauschale.logic_not_met", locale = locale)
        };
        content.push_str(&format!(
            "<details{}><summary>{}</summary>{}</details>",
            if open { " open" } else { "" },
            t!("pauschale.conditions", locale = locale, status = status),
            conditions_html
        ));
    }

    let main_status = if conditions_met {
        format!(
            "<span class='status-met'>{}</span>",
            t!("pauschale.status_met", locale = locale)
        )
    } else {
        format!(
            "<span class='status-not-met'>{}</span>",
            t!("pauschale.status_not_met", locale = locale)
        )
    };

    format!(
        "<details open><summary>{} {}</summary>{}</details>",
        t!("pauschale.summary", locale = locale, code = code),
        main_status,
        content
    )
}

/// TARDOC billing table. AL and IPL come from the local TARDOC data; the
/// total per row is `(AL + IPL) × quantity`. Rows whose LKN is unknown
/// locally become error rows and do not count towards the grand total.
///
/// TARDOC 计费表。AL 与 IPL 来自本地数据；每行合计为 `(AL + IPL) × 数量`。
pub fn render_tardoc_table(
    leistungen: &[TardocLeistung],
    rule_results: &[RuleResult],
    data: &ReferenceData,
    lang: Language,
) -> String {
    let locale = lang.code();
    if leistungen.is_empty() {
        return format!("<p><i>{}</i></p>", t!("tardoc.empty", locale = locale));
    }

    let mut body = String::new();
    let mut grand_total = 0.0;
    let mut hints_overall = false;

    for leistung in leistungen {
        let Some(details) = data.tardoc_lookup(&leistung.lkn) else {
            body.push_str(&format!(
                "<tr><td colspan='7' class='error'>{}</td></tr>",
                t!(
                    "tardoc.not_found",
                    locale = locale,
                    lkn = escape_html(&leistung.lkn)
                )
            ));
            continue;
        };

        let name = leistung
            .beschreibung
            .as_deref()
            .filter(|b| !b.is_empty())
            .unwrap_or(&details.name);

        let mut rules_html = String::new();
        if !details.rules.is_empty() {
            rules_html.push_str(&format!(
                "<p><b>{}</b> {}</p>",
                t!("tardoc.rule", locale = locale),
                escape_html(&details.rules)
            ));
        }

        let mut hint_for_row = false;
        let messages = rule_results
            .iter()
            .find(|r| r.lkn.as_deref() == Some(leistung.lkn.as_str()))
            .map(RuleResult::messages)
            .unwrap_or_default();
        if !messages.is_empty() {
            if !rules_html.is_empty() {
                rules_html.push_str("<hr>");
            }
            rules_html.push_str(&format!(
                "<p><b>{}</b></p><ul>",
                t!("tardoc.backend_hints", locale = locale)
            ));
            for message in messages {
                let reduction = hints::is_quantity_reduction(message);
                hint_for_row |= reduction;
                rules_html.push_str(&hint_item(message, reduction));
            }
            rules_html.push_str("</ul>");
        }
        hints_overall |= hint_for_row;

        let total = (details.al + details.ipl) * leistung.menge;
        grand_total += total;

        let rules_cell = if rules_html.is_empty() {
            t!("tardoc.none", locale = locale).to_string()
        } else {
            format!(
                "<details><summary{}>{}</summary>{}</details>",
                if hint_for_row { " class='rule-hint-trigger'" } else { "" },
                t!("tardoc.col_rules", locale = locale),
                rules_html
            )
        };

        body.push_str(&format!(
            "<tr><td>{}</td><td>{}</td><td>{:.2}</td><td>{:.2}</td><td>{}</td><td>{:.2}</td><td>{}</td></tr>",
            escape_html(&leistung.lkn),
            escape_html(name),
            details.al,
            details.ipl,
            leistung.menge,
            total,
            rules_cell
        ));
    }

    let mut html = String::new();
    html.push_str(&format!(
        "<details open><summary{}>{}</summary>",
        if hints_overall { " class='rule-hint-trigger'" } else { "" },
        t!("tardoc.summary", locale = locale, count = leistungen.len())
    ));
    html.push_str("<table><thead><tr>");
    for key in [
        "tardoc.col_lkn",
        "tardoc.col_name",
        "tardoc.col_al",
        "tardoc.col_ipl",
        "tardoc.col_qty",
        "tardoc.col_total",
        "tardoc.col_rules",
    ] {
        html.push_str(&format!("<th>{}</th>", t!(key, locale = locale)));
    }
    html.push_str("</tr></thead>");
    html.push_str(&format!("<tbody>{}</tbody>", body));
    html.push_str(&format!(
        "<tfoot><tr><th colspan='5'>{}</th><th colspan='2'>{:.2}</th></tr></tfoot>",
        t!("tardoc.grand_total", locale = locale),
        grand_total
    ));
    html.push_str("</table></details>");
    html
}

fn hint_item(message: &str, reduction: bool) -> String {
    if reduction {
        format!("<li class='hint-reduction'>{}</li>", escape_html(message))
    } else {
        format!("<li>{}</li>", escape_html(message))
    }
}

/// LLM stage 1 block: identified LKNs with their local descriptions,
/// extracted details and the reasoning text.
pub fn render_stage1(result: &Stage1Result, data: &ReferenceData, lang: Language) -> String {
    let locale = lang.code();
    let mut html = format!(
        "<details><summary>{}</summary><div>",
        t!("stage1.summary", locale = locale)
    );

    if result.identified_leistungen.is_empty() {
        html.push_str(&format!("<p><i>{}</i></p>", t!("stage1.none", locale = locale)));
    } else {
        html.push_str(&format!(
            "<p><b>{}</b></p><ul>",
            t!("stage1.identified", locale = locale)
        ));
        for leistung in &result.identified_leistungen {
            let description = data.describe_lkn(&leistung.lkn, lang);
            let quantity = match leistung.menge {
                Some(menge) if menge != 1.0 => format!(
                    " ({})",
                    t!("stage1.quantity", locale = locale, qty = menge)
                ),
                _ => String::new(),
            };
            html.push_str(&format!(
                "<li><b>{}</b> {}{}</li>",
                t!(
                    "stage1.lkn_item",
                    locale = locale,
                    lkn = escape_html(&leistung.lkn)
                ),
                escape_html(&description),
                quantity
            ));
        }
        html.push_str("</ul>");
    }

    let info = &result.extracted_info;
    let mut extracted = Vec::new();
    if let Some(minutes) = info.dauer_minuten {
        extracted.push(t!("stage1.duration", locale = locale, minutes = minutes).to_string());
    }
    if let Some(qty) = info.menge_allgemein.filter(|q| *q != 0.0) {
        extracted.push(t!("stage1.general_qty", locale = locale, qty = qty).to_string());
    }
    if let Some(gender) = info
        .geschlecht
        .as_deref()
        .filter(|g| !g.is_empty() && *g != "null" && *g != "unbekannt")
    {
        extracted.push(
            t!("stage1.gender", locale = locale, gender = escape_html(gender)).to_string(),
        );
    }
    if extracted.is_empty() {
        html.push_str(&format!(
            "<p><i>{}</i></p>",
            t!("stage1.no_extracted", locale = locale)
        ));
    } else {
        html.push_str(&format!(
            "<p><b>{}</b> {}</p>",
            t!("stage1.extracted", locale = locale),
            extracted.join(", ")
        ));
    }

    html.push_str(&format!(
        "<p><b>{}</b></p><p class='pre-wrap'>{}</p>",
        t!("stage1.reasoning", locale = locale),
        escape_html(result.begruendung_llm.as_deref().unwrap_or("N/A"))
    ));
    html.push_str("</div></details>");
    html
}

/// LLM stage 2 mapping block; empty when the backend sent no mapping results.
pub fn render_stage2(result: &Stage2Result, data: &ReferenceData, lang: Language) -> String {
    if result.mapping_results.is_empty() {
        return String::new();
    }
    let locale = lang.code();
    let mut html = format!(
        "<details><summary>{}</summary><div><p>{}</p><ul>",
        t!("stage2.summary", locale = locale),
        t!("stage2.intro", locale = locale)
    );

    for mapping in &result.mapping_results {
        let tardoc_lkn = mapping.tardoc_lkn.as_deref().unwrap_or("N/A");
        html.push_str(&format!(
            "<li><b>{}</b> ({})",
            t!(
                "stage2.tardoc_lkn",
                locale = locale,
                lkn = escape_html(tardoc_lkn)
            ),
            escape_html(&data.describe_lkn(tardoc_lkn, lang))
        ));
        match mapping.mapped_lkn.as_deref().filter(|m| !m.is_empty()) {
            Some(mapped) => {
                let description = data.describe_lkn(mapped, lang);
                let suffix = if description != mapped {
                    format!(" ({})", escape_html(&description))
                } else {
                    String::new()
                };
                html.push_str(&format!(
                    "<br>&rarr; {} <b class='mapped'>{}</b>{}",
                    t!("stage2.mapped", locale = locale),
                    escape_html(mapped),
                    suffix
                ));
            }
            None => {
                html.push_str(&format!(
                    "<br>&rarr; <i class='unmapped'>{}</i>",
                    t!("stage2.no_mapping", locale = locale)
                ));
                if let Some(error) = &mapping.error {
                    html.push_str(&format!(
                        " <span class='muted'>({})</span>",
                        t!("stage2.error", locale = locale, error = escape_html(error))
                    ));
                }
            }
        }
        html.push_str("</li>");
    }

    html.push_str("</ul></div></details>");
    html
}

/// Rule-check block. Shown only when some result carries messages, when the
/// billing failed, or when the sole result is the "no valid LKN" case; open
/// in the latter two cases.
///
/// 规则检查块。仅当存在消息、计费失败或唯一结果为"无有效 LKN"时显示。
pub fn render_rule_checks(results: &[RuleResult], is_error: bool, lang: Language) -> String {
    if results.is_empty() {
        return String::new();
    }
    let locale = lang.code();

    let has_messages = results.iter().any(|r| !r.messages().is_empty());
    let only_no_lkn = results.len() == 1
        && results[0].lkn.is_none()
        && results[0]
            .messages()
            .first()
            .is_some_and(|m| hints::is_no_valid_lkn(m));

    if !has_messages && !is_error && !only_no_lkn {
        return String::new();
    }

    let mut html = format!(
        "<details{}><summary>{}</summary><div>",
        if is_error || only_no_lkn { " open" } else { "" },
        t!("rules.summary", locale = locale)
    );

    for result in results {
        let lkn = result.lkn.as_deref();
        if let Some(lkn) = lkn {
            let quantity = result
                .finale_menge
                .map(|q| q.to_string())
                .unwrap_or_else(|| "N/A".to_string());
            html.push_str(&format!(
                "<h5>{}</h5>",
                t!(
                    "rules.lkn",
                    locale = locale,
                    lkn = escape_html(lkn),
                    qty = quantity
                )
            ));
        }

        match &result.regelpruefung {
            Some(check) if !check.abrechnungsfaehig => {
                html.push_str(&format!(
                    "<p class='error'><b>{}</b></p>",
                    t!("rules.not_billable", locale = locale)
                ));
                if !check.fehler.is_empty() {
                    html.push_str("<ul>");
                    for message in &check.fehler {
                        html.push_str(&format!("<li class='error'>{}</li>", escape_html(message)));
                    }
                    html.push_str("</ul>");
                } else if lkn.is_some() {
                    html.push_str(&format!(
                        "<p><i>{}</i></p>",
                        t!("rules.no_reason", locale = locale)
                    ));
                }
            }
            Some(check) if !check.fehler.is_empty() => {
                html.push_str(&format!(
                    "<p><b>{}</b></p><ul>",
                    t!("rules.hints", locale = locale)
                ));
                for message in &check.fehler {
                    html.push_str(&hint_item(message, hints::is_quantity_reduction(message)));
                }
                html.push_str("</ul>");
            }
            Some(_) if lkn.is_some() => {
                html.push_str(&format!(
                    "<p class='mapped'><i>{}</i></p>",
                    t!("rules.ok", locale = locale)
                ));
            }
            None if lkn.is_some() => {
                html.push_str(&format!(
                    "<p><i>{}</i></p>",
                    t!("rules.no_result", locale = locale)
                ));
            }
            _ => {}
        }
    }

    html.push_str("</div></details>");
    html
}

/// Inline error message for a failed analysis call, with an excerpt of the
/// raw response when one is useful.
pub fn render_backend_error(message: &str, raw: Option<&str>, lang: Language) -> String {
    let locale = lang.code();
    let mut html = format!(
        "<p class='error'>{}</p>",
        t!(
            "analysis.server_error",
            locale = locale,
            message = escape_html(message)
        )
    );
    if let Some(raw) = raw.filter(|r| !r.is_empty()) {
        let excerpt: String = raw.chars().take(RAW_EXCERPT_CHARS).collect();
        let ellipsis = if raw.chars().count() > RAW_EXCERPT_CHARS {
            "..."
        } else {
            ""
        };
        html.push_str(&format!(
            "<details><summary>{}</summary><pre>{}{}</pre></details>",
            t!("analysis.raw_response", locale = locale),
            escape_html(&excerpt),
            ellipsis
        ));
    }
    html
}

/// [`render_backend_error`] for an [`ApiError`]. The raw body is shown for
/// JSON parse failures and for short bodies that the message does not
/// already contain.
pub fn render_api_error(error: &ApiError, lang: Language) -> String {
    let message = match error {
        ApiError::UnexpectedStructure { .. } => {
            t!("analysis.unexpected_structure", locale = lang.code()).to_string()
        }
        other => other.to_string(),
    };
    let raw = error.raw_body().filter(|raw| {
        let head: String = raw.chars().take(50).collect();
        (error.is_decode() || raw.chars().count() < RAW_EXCERPT_CHARS) && !message.contains(&head)
    });
    render_backend_error(&message, raw, lang)
}

/// Banner shown when critical datasets could not be loaded.
pub fn render_data_banner(problem: &DataError, lang: Language) -> String {
    let locale = lang.code();
    let text = match problem {
        DataError::MissingData { names } => {
            t!("data.missing", locale = locale, names = names.join(", ")).to_string()
        }
        other => t!("data.degraded", locale = locale, message = other.to_string()).to_string(),
    };
    format!("<div class='banner error'>{}</div>", escape_html(&text))
}

/// LKN popup: catalog description and interpretation, TARDOC values, chapter,
/// groups, dignities, interpretation notes and the Pauschalen that list the
/// position. `None` when the LKN is unknown to both catalog and TARDOC data.
///
/// LKN 弹窗：目录描述、TARDOC 数值、章节、组、资质以及包含该位置的 Pauschalen。
pub fn render_lkn_info(lkn: &str, data: &ReferenceData, lang: Language) -> Option<String> {
    let locale = lang.code();
    let entry = data.catalog_entry(lkn);
    let position = data.tariff_position(lkn);
    if entry.is_none() && position.is_none() {
        return None;
    }

    let mut html = popup_open(&t!("lookup.lkn_title", locale = locale, code = escape_html(lkn)));
    html.push_str(&format!(
        "<p><b>{}:</b> {}</p>",
        t!("lookup.description", locale = locale),
        escape_html(&data.describe_lkn(lkn, lang))
    ));
    if let Some(interpretation) = entry.and_then(|e| e.interpretation(lang)) {
        html.push_str(&format!(
            "<p><b>{}:</b></p><p class='pre-wrap'>{}</p>",
            t!("lookup.interpretation", locale = locale),
            escape_html(interpretation)
        ));
    }

    if let Some(details) = data.tardoc_lookup(lkn) {
        html.push_str(&format!(
            "<table><tr><th>{}</th><td>{:.2}</td><th>{}</th><td>{:.2}</td></tr></table>",
            t!("tardoc.col_al", locale = locale),
            details.al,
            t!("tardoc.col_ipl", locale = locale),
            details.ipl
        ));
        if !details.rules.is_empty() {
            html.push_str(&format!(
                "<p><b>{}:</b> {}</p>",
                t!("lookup.rules", locale = locale),
                escape_html(&details.rules)
            ));
        }
    }

    if let Some(position) = position {
        if let Some(chapter) = position.chapter.as_deref().filter(|c| !c.is_empty()) {
            html.push_str(&format!(
                "<p><b>{}:</b> {} {}</p>",
                t!("lookup.chapter", locale = locale),
                escape_html(chapter),
                escape_html(position.chapter_title.as_deref().unwrap_or(""))
            ));
        }
        if !position.groups.is_empty() {
            html.push_str(&format!(
                "<p><b>{}:</b></p><ul>",
                t!("lookup.groups", locale = locale)
            ));
            for group in &position.groups {
                html.push_str(&format!(
                    "<li>{} {}</li>",
                    escape_html(&group.code),
                    escape_html(group.text.as_deref().unwrap_or(""))
                ));
            }
            html.push_str("</ul>");
        }
        if !position.dignities.is_empty() {
            html.push_str(&format!(
                "<p><b>{}:</b></p><ul>",
                t!("lookup.dignities", locale = locale)
            ));
            for code in &position.dignities {
                let text = data
                    .dignity(code)
                    .and_then(|d| d.text.as_deref())
                    .unwrap_or("");
                html.push_str(&format!(
                    "<li>{} {}</li>",
                    escape_html(code),
                    escape_html(text)
                ));
            }
            html.push_str("</ul>");
        }
    }

    if let Some(text) = data.interpretation(lkn).and_then(|i| i.text(lang)) {
        html.push_str(&format!(
            "<details><summary>{}</summary><p class='pre-wrap'>{}</p></details>",
            t!("lookup.interpretation_title", locale = locale, code = escape_html(lkn)),
            escape_html(text)
        ));
    }

    let pauschalen = data.pauschalen_for_lkn(lkn);
    if !pauschalen.is_empty() {
        html.push_str(&format!(
            "<p><b>{}:</b></p><ul>",
            t!("lookup.pauschalen", locale = locale)
        ));
        for pauschale in pauschalen {
            html.push_str(&format!(
                "<li>{} {}</li>",
                escape_html(pauschale.code.as_deref().unwrap_or("")),
                escape_html(pauschale.text.as_deref().unwrap_or(""))
            ));
        }
        html.push_str("</ul>");
    }

    html.push_str("</div>");
    Some(html)
}

pub fn render_chapter_info(code: &str, data: &ReferenceData, lang: Language) -> Option<String> {
    let chapter = data.chapter(code)?;
    let locale = lang.code();
    let mut html = popup_open(&t!(
        "lookup.chapter_title",
        locale = locale,
        code = escape_html(code)
    ));
    if let Some(title) = chapter.title {
        html.push_str(&format!("<p>{}</p>", escape_html(title)));
    }
    html.push_str(&positions_table(&chapter.positions, lang));
    html.push_str("</div>");
    Some(html)
}

pub fn render_group_info(code: &str, data: &ReferenceData, lang: Language) -> Option<String> {
    let group = data.group(code)?;
    let locale = lang.code();
    let mut html = popup_open(&t!(
        "lookup.group_title",
        locale = locale,
        code = escape_html(code)
    ));
    if let Some(text) = group.text {
        html.push_str(&format!("<p>{}</p>", escape_html(text)));
    }
    html.push_str(&positions_table(&group.positions, lang));
    html.push_str("</div>");
    Some(html)
}

pub fn render_icd_info(code: &str, data: &ReferenceData, lang: Language) -> Option<String> {
    if !data.has_icd(code) {
        return None;
    }
    let mut html = popup_open(&t!(
        "lookup.icd_title",
        locale = lang.code(),
        code = escape_html(code)
    ));
    html.push_str(&format!("<p>{}</p></div>", escape_html(&data.icd(code, None))));
    Some(html)
}

pub fn render_dignity_info(code: &str, data: &ReferenceData, lang: Language) -> Option<String> {
    let dignity = data.dignity(code)?;
    let mut html = popup_open(&t!(
        "lookup.dignity_title",
        locale = lang.code(),
        code = escape_html(code)
    ));
    html.push_str(&format!(
        "<p>{}</p></div>",
        escape_html(dignity.text.as_deref().unwrap_or(""))
    ));
    Some(html)
}

pub fn render_interpretation_info(
    lkn: &str,
    data: &ReferenceData,
    lang: Language,
) -> Option<String> {
    let text = data.interpretation(lkn)?.text(lang)?;
    let mut html = popup_open(&t!(
        "lookup.interpretation_title",
        locale = lang.code(),
        code = escape_html(lkn)
    ));
    html.push_str(&format!("<p class='pre-wrap'>{}</p></div>", escape_html(text)));
    Some(html)
}

fn popup_open(title: &str) -> String {
    format!("<div class='popup'><h3>{}</h3>", title)
}

fn positions_table(positions: &[&TariffPosition], lang: Language) -> String {
    let locale = lang.code();
    let mut html = format!(
        "<p><b>{}:</b></p><table><thead><tr><th>{}</th><th>{}</th></tr></thead><tbody>",
        t!("lookup.positions", locale = locale),
        t!("tardoc.col_lkn", locale = locale),
        t!("tardoc.col_name", locale = locale)
    );
    for position in positions {
        html.push_str(&format!(
            "<tr><td>{}</td><td>{}</td></tr>",
            escape_html(position.lkn.as_deref().unwrap_or("")),
            escape_html(position.name.as_deref().unwrap_or(""))
        ));
    }
    html.push_str("</tbody></table>");
    html
}

/// Wraps a fragment into a standalone HTML document.
pub fn render_document(title: &str, body: &str, lang: Language) -> String {
    let mut html = String::new();
    html.push_str(&format!(
        "<!DOCTYPE html><html lang='{}'><head><meta charset='utf-8'><title>{}</title>",
        lang.code(),
        escape_html(title)
    ));
    html.push_str("<style>");
    html.push_str(ANALYSIS_STYLE);
    html.push_str("</style></head><body>");
    html.push_str(body);
    html.push_str("</body></html>");
    html
}

/// Quality-control page: one row per example with a result cell per language
/// (`res-<id>-<lang>`), the row triggers and the overall summary.
///
/// 质量控制页面：每个示例一行，每种语言一个结果单元格，以及总体摘要。
pub fn render_qc_page(
    examples: &[Example],
    board: &ResultBoard,
    counters: Counters,
    lang: Language,
) -> String {
    let locale = lang.code();
    let title = t!("qc.title", locale = locale).to_string();
    let generated = chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string();

    let markup = html! {
        (DOCTYPE)
        html lang=(locale) {
            head {
                meta charset="utf-8";
                title { (title) }
                style { (PreEscaped(QC_STYLE)) }
            }
            body {
                h1 { (title) }
                p class="generated" { (generated) }
                button id="test-all" disabled[board.is_test_all_disabled()] {
                    (t!("qc.test_all", locale = locale).to_string())
                }
                table {
                    thead {
                        tr {
                            th { (t!("qc.col_id", locale = locale).to_string()) }
                            th { (t!("qc.col_text", locale = locale).to_string()) }
                            @for column in Language::ALL {
                                th { (column.code().to_uppercase()) }
                            }
                            th { (t!("qc.col_action", locale = locale).to_string()) }
                        }
                    }
                    tbody {
                        @for example in examples {
                            tr {
                                td { (example.id.as_str()) }
                                td { (example.display_text(lang)) }
                                @for column in Language::ALL {
                                    @let status = board.cell(&example.id, column).cloned().unwrap_or_default();
                                    td id=(ResultBoard::cell_id(&example.id, column))
                                        class={ "lang-cell " (status.css_class()) }
                                        title=[cell_title(&status)] {
                                        (status.label(lang))
                                    }
                                }
                                td {
                                    button class="test-btn" data-id=(example.id.as_str())
                                        disabled[board.is_row_disabled(&example.id)] {
                                        (t!("qc.test_example", locale = locale).to_string())
                                    }
                                }
                            }
                        }
                    }
                }
                p id="summary" { (counters.summary(lang)) }
            }
        }
    };
    markup.into_string()
}

fn cell_title(status: &CellStatus) -> Option<String> {
    match status {
        CellStatus::Error { message } => Some(message.clone()),
        _ => None,
    }
}

/// Writes an HTML document to `path`.
pub fn write_html(path: &Path, html: &str) -> Result<()> {
    fs::write(path, html).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

fn value_text(value: Option<&serde_json::Value>) -> String {
    match value {
        Some(serde_json::Value::String(s)) if !s.is_empty() => s.clone(),
        Some(serde_json::Value::Number(n)) => n.to_string(),
        _ => "N/A".to_string(),
    }
}

/// Simple HTML escape function to replace special characters with their HTML entities
/// 简单的 HTML 转义函数，用 HTML 实体替换特殊字符
pub fn escape_html(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
