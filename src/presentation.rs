//! User-facing rendering of analysis outcomes.
//!
//! Shared by the HTTP handlers (failure messages) and the `analyze_cnpj`
//! binary (full text report).

use crate::errors::LookupFailure;
use crate::locale::Locale;
use crate::models::{DecisionOutput, FinancialAssessment, Verdict};
use crate::pipeline::AnalysisOutcome;

pub const POSITIVE_ICON: &str = "✅";
pub const ATTENTION_ICON: &str = "⚠️";
pub const NEGATIVE_ICON: &str = "❌";

/// Localized message for a classified lookup failure.
pub fn failure_message(failure: LookupFailure, locale: Locale) -> String {
    let msg = locale.messages();
    match failure {
        LookupFailure::InvalidId => msg.failure_invalid_id.to_string(),
        LookupFailure::UpstreamFailure => msg.failure_upstream.to_string(),
        LookupFailure::Timeout => msg.failure_timeout.to_string(),
        LookupFailure::UnknownFailure => msg.failure_unknown.replace("{token}", failure.as_token()),
    }
}

pub fn verdict_label(verdict: Verdict, locale: Locale) -> &'static str {
    let msg = locale.messages();
    match verdict {
        Verdict::Approved => msg.verdict_approved,
        Verdict::UnderAttention => msg.verdict_under_attention,
        Verdict::Rejected => msg.verdict_rejected,
    }
}

/// Renders the verdict, company, justification and the itemized factor lists.
///
/// Sentinel entries are replaced by a "nothing found" line for their section.
pub fn render_report(decision: &DecisionOutput, locale: Locale) -> String {
    let msg = locale.messages();
    let mut out = String::new();

    out.push_str(&format!(
        "{}: {}\n",
        msg.report_result,
        verdict_label(decision.verdict, locale)
    ));
    out.push_str(&format!("{}: {}\n", msg.report_company, decision.name));
    out.push_str(&format!(
        "{}: {}\n",
        msg.report_justification, decision.justification
    ));

    let sections = [
        (
            msg.report_positive_header,
            &decision.positive_factors,
            msg.no_positive_factor,
            POSITIVE_ICON,
            msg.report_no_positive,
        ),
        (
            msg.report_attention_header,
            &decision.attention_points,
            msg.no_attention_point,
            ATTENTION_ICON,
            msg.report_no_attention,
        ),
        (
            msg.report_negative_header,
            &decision.negative_factors,
            msg.no_negative_factor,
            NEGATIVE_ICON,
            msg.report_no_negative,
        ),
    ];

    for (header, items, sentinel, icon, empty_line) in sections {
        out.push('\n');
        out.push_str(header);
        out.push('\n');

        let real: Vec<&String> = items
            .iter()
            .filter(|item| !item.eq_ignore_ascii_case(sentinel))
            .collect();
        if real.is_empty() {
            out.push_str(&format!("  {}\n", empty_line));
        } else {
            for item in real {
                out.push_str(&format!("  {} {}\n", icon, item));
            }
        }
    }

    out
}

/// Renders the financial narrative under its own heading.
pub fn render_financial(financial: &FinancialAssessment, locale: Locale) -> String {
    format!(
        "{}\n  {}\n",
        locale.messages().report_financial_header,
        financial.narrative
    )
}

/// One text block for any outcome: the report followed by the financial
/// analysis, or the localized failure message.
pub fn render_outcome(outcome: &AnalysisOutcome, locale: Locale) -> String {
    let msg = locale.messages();
    match outcome {
        AnalysisOutcome::Completed(report) => format!(
            "{}\n{}",
            render_report(&report.decision, locale),
            render_financial(&report.financial, locale)
        ),
        AnalysisOutcome::LookupFailed(failure) => failure_message(*failure, locale),
        AnalysisOutcome::NotFound => msg.failure_not_found.to_string(),
        AnalysisOutcome::ReasoningFailed(_) => msg.failure_reasoning.to_string(),
    }
}
