use crate::locale::Locale;
use crate::models::{DecisionOutput, EntityRecord, SectorFinding, Verdict};
use bigdecimal::BigDecimal;

/// Companies older than this many whole years count as established.
pub const ESTABLISHED_AGE_YEARS: u32 = 2;

/// Declared capital strictly above this amount (BRL) counts as adequate.
pub const CAPITAL_THRESHOLD_BRL: i64 = 100_000;

/// Deterministic rule engine that turns a record and a sector finding into a verdict.
///
/// No I/O. The same inputs always produce the same `DecisionOutput`.
#[derive(Debug, Clone)]
pub struct DecisionEngine {
    locale: Locale,
    domain: String,
}

/// Factor strings matched by direct rule evaluation, in a fixed order.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct CandidateSets {
    pub positive: Vec<String>,
    pub attention: Vec<String>,
    pub negative: Vec<String>,
}

impl DecisionEngine {
    pub fn new(locale: Locale, domain: impl Into<String>) -> Self {
        Self {
            locale,
            domain: domain.into(),
        }
    }

    /// Evaluates the candidate factor sets for a record.
    pub fn candidates(&self, record: &EntityRecord, sector: SectorFinding) -> CandidateSets {
        let msg = self.locale.messages();
        let threshold = BigDecimal::from(CAPITAL_THRESHOLD_BRL);
        let mut sets = CandidateSets::default();

        let established = record
            .age
            .years()
            .map(|years| years > ESTABLISHED_AGE_YEARS)
            .unwrap_or(false);
        let adequate_capital = record
            .declared_capital
            .amount()
            .map(|amount| *amount > threshold)
            .unwrap_or(false);

        // Positive
        if established {
            sets.positive.push(msg.established_presence.to_string());
        }
        if adequate_capital {
            sets.positive.push(msg.capital_above_threshold.to_string());
        }
        if sector == SectorFinding::Compatible {
            sets.positive
                .push(msg.activity_compatible.replace("{domain}", &self.domain));
        }

        // Attention: a missing age or capital is not evidence of stability
        if !established {
            sets.attention.push(msg.newly_established.to_string());
        }
        if !adequate_capital {
            sets.attention.push(msg.capital_low_for_size.to_string());
        }

        // Negative
        if record.status.is_irregular() {
            sets.negative
                .push(msg.irregular_status.replace("{status}", &record.status_text));
        }
        if sector == SectorFinding::Incompatible {
            sets.negative
                .push(msg.activity_incompatible.replace("{domain}", &self.domain));
        }

        sets
    }

    /// Produces the final decision for a record.
    pub fn decide(&self, record: &EntityRecord, sector: SectorFinding) -> DecisionOutput {
        let sets = self.candidates(record, sector);
        let verdict = apply_precedence(&sets);
        let justification = self.justify(verdict, &sets);

        tracing::info!(
            "Decision for {}: {} ({} positive, {} attention, {} negative)",
            record.tax_id,
            verdict,
            sets.positive.len(),
            sets.attention.len(),
            sets.negative.len()
        );

        let msg = self.locale.messages();
        DecisionOutput {
            verdict,
            positive_factors: or_sentinel(sets.positive, msg.no_positive_factor),
            attention_points: or_sentinel(sets.attention, msg.no_attention_point),
            negative_factors: or_sentinel(sets.negative, msg.no_negative_factor),
            justification,
            name: record.display_name.clone(),
        }
    }

    fn justify(&self, verdict: Verdict, sets: &CandidateSets) -> String {
        let msg = self.locale.messages();
        let list = |items: &[String]| items.join("; ");

        let mut parts = Vec::new();
        match verdict {
            Verdict::Rejected => {
                parts.push(msg.justification_rejected.replace("{items}", &list(&sets.negative)));
                if !sets.attention.is_empty() {
                    parts.push(
                        msg.justification_attention_noted
                            .replace("{items}", &list(&sets.attention)),
                    );
                }
                if !sets.positive.is_empty() {
                    parts.push(
                        msg.justification_positives_noted
                            .replace("{items}", &list(&sets.positive)),
                    );
                }
            }
            Verdict::UnderAttention if sets.attention.is_empty() => {
                parts.push(msg.justification_no_evidence.to_string());
            }
            Verdict::UnderAttention => {
                parts.push(
                    msg.justification_under_attention
                        .replace("{items}", &list(&sets.attention)),
                );
                if !sets.positive.is_empty() {
                    parts.push(
                        msg.justification_positives_noted
                            .replace("{items}", &list(&sets.positive)),
                    );
                }
            }
            Verdict::Approved => {
                parts.push(msg.justification_approved.replace("{items}", &list(&sets.positive)));
            }
        }

        parts.join(" ")
    }
}

/// First match wins: negative, then attention, then positive, then the
/// empty-evidence default.
pub fn apply_precedence(sets: &CandidateSets) -> Verdict {
    if !sets.negative.is_empty() {
        Verdict::Rejected
    } else if !sets.attention.is_empty() {
        Verdict::UnderAttention
    } else if !sets.positive.is_empty() {
        Verdict::Approved
    } else {
        Verdict::UnderAttention
    }
}

fn or_sentinel(items: Vec<String>, sentinel: &str) -> Vec<String> {
    if items.is_empty() {
        vec![sentinel.to_string()]
    } else {
        items
    }
}
