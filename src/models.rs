use crate::locale::Locale;
use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

// ============ Registry Models ============

/// Operational status of a company, derived from the registry's free text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationalStatus {
    Active,
    Inactive,
    Suspended,
    StruckOff,
    Unknown,
}

impl OperationalStatus {
    /// Maps registry status text ("Ativa", "Inapta", "Suspensa", "Baixada", "Nula",
    /// or their English equivalents) onto the enumerated set.
    ///
    /// Order matters: "inativa" contains "ativa" and "inactive" contains "active".
    pub fn from_registry_text(text: &str) -> Self {
        let text = text.trim().to_lowercase();
        if text.is_empty() {
            return OperationalStatus::Unknown;
        }

        let any = |needles: &[&str]| needles.iter().any(|n| text.contains(n));

        if any(&["inapt", "inativ", "inactive"]) {
            OperationalStatus::Inactive
        } else if any(&["suspens", "suspended"]) {
            OperationalStatus::Suspended
        } else if any(&["baixad", "nula", "struck", "closed"]) {
            OperationalStatus::StruckOff
        } else if any(&["ativa", "active"]) {
            OperationalStatus::Active
        } else {
            OperationalStatus::Unknown
        }
    }

    /// Inactive, suspended and struck-off companies are a negative factor.
    pub fn is_irregular(&self) -> bool {
        matches!(
            self,
            OperationalStatus::Inactive | OperationalStatus::Suspended | OperationalStatus::StruckOff
        )
    }
}

/// Whole years since foundation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompanyAge {
    Years(u32),
    NotInformed,
}

impl CompanyAge {
    pub fn years(&self) -> Option<u32> {
        match self {
            CompanyAge::Years(y) => Some(*y),
            CompanyAge::NotInformed => None,
        }
    }

    pub fn describe(&self, locale: Locale) -> String {
        match self {
            CompanyAge::Years(y) => y.to_string(),
            CompanyAge::NotInformed => locale.messages().not_informed.to_string(),
        }
    }
}

/// Declared share capital (capital social), in BRL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeclaredCapital {
    Amount(BigDecimal),
    NotInformed,
}

impl DeclaredCapital {
    /// Reads a registry equity value, which may arrive as a JSON number or a numeric string.
    pub fn from_json(value: Option<&Value>) -> Self {
        let raw = match value {
            Some(Value::Number(n)) => n.to_string(),
            Some(Value::String(s)) => s.trim().to_string(),
            _ => return DeclaredCapital::NotInformed,
        };

        match BigDecimal::from_str(&raw) {
            Ok(amount) => DeclaredCapital::Amount(amount),
            Err(_) => {
                tracing::warn!("Unparseable equity value from registry: {}", raw);
                DeclaredCapital::NotInformed
            }
        }
    }

    pub fn amount(&self) -> Option<&BigDecimal> {
        match self {
            DeclaredCapital::Amount(a) => Some(a),
            DeclaredCapital::NotInformed => None,
        }
    }

    pub fn describe(&self, locale: Locale) -> String {
        match self {
            DeclaredCapital::Amount(a) => format_brl(a, locale),
            DeclaredCapital::NotInformed => locale.messages().not_informed.to_string(),
        }
    }
}

/// Formats an amount as Brazilian reais with two decimals and grouped thousands.
///
/// pt-BR: "R$ 1.234.567,89"; en: "R$ 1,234,567.89".
fn format_brl(amount: &BigDecimal, locale: Locale) -> String {
    let (group_sep, decimal_sep) = match locale {
        Locale::PtBr => ('.', ','),
        Locale::En => (',', '.'),
    };
    let fixed = amount.with_scale_round(2, bigdecimal::RoundingMode::HalfUp).to_string();
    let (sign, unsigned) = match fixed.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", fixed.as_str()),
    };
    let (int_part, frac_part) = unsigned.split_once('.').unwrap_or((unsigned, "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, digit) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(group_sep);
        }
        grouped.push(digit);
    }

    format!("R$ {}{}{}{}", sign, grouped, decimal_sep, frac_part)
}

/// Normalized snapshot of a company at lookup time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityRecord {
    /// Digits-only identifier used for the lookup.
    pub tax_id: String,
    pub status: OperationalStatus,
    /// Registry status text as received (or the "not informed" placeholder).
    pub status_text: String,
    pub age: CompanyAge,
    pub main_activity_text: String,
    /// CNAE code of the main activity.
    pub main_activity_code: String,
    pub display_name: String,
    pub declared_capital: DeclaredCapital,
    /// Company size class (ME, EPP, Demais, ...).
    pub size_class: String,
}

// ============ Evaluation Models ============

/// Binary sector classification against the configured target domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectorFinding {
    Compatible,
    Incompatible,
}

impl SectorFinding {
    /// One-sentence statement of the finding.
    pub fn statement(&self, domain: &str) -> String {
        let domain = capitalize(domain);
        match self {
            SectorFinding::Compatible => format!("{} activity confirmed", domain),
            SectorFinding::Incompatible => format!("{} activity incompatible", domain),
        }
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.trim().chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Capital tag surfaced by the financial narrative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CapitalSignal {
    Adequate,
    LowForSize,
}

/// Output of the financial evaluation stage. Informational only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinancialAssessment {
    pub narrative: String,
    pub capital_signal: Option<CapitalSignal>,
}

// ============ Decision Models ============

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Verdict {
    Approved,
    UnderAttention,
    Rejected,
}

impl Verdict {
    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::Approved => "APPROVED",
            Verdict::UnderAttention => "UNDER_ATTENTION",
            Verdict::Rejected => "REJECTED",
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Final structured result of an analysis, as consumed by the presentation layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionOutput {
    pub verdict: Verdict,
    /// Always at least one entry (sentinel when no factor matched).
    pub positive_factors: Vec<String>,
    /// Always at least one entry (sentinel when no point matched).
    pub attention_points: Vec<String>,
    /// Always at least one entry (sentinel when no factor matched).
    pub negative_factors: Vec<String>,
    pub justification: String,
    pub name: String,
}

// ============ API Request Models ============

/// Request payload for `POST /api/v1/analysis`.
#[derive(Debug, Deserialize)]
pub struct AnalysisRequest {
    /// CNPJ in any formatting ("12.345.678/0001-95" or digits only).
    pub cnpj: String,
}

/// Response body of a completed analysis: the decision fields plus the
/// supporting evaluations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisResponse {
    pub analysis_id: uuid::Uuid,
    #[serde(flatten)]
    pub decision: DecisionOutput,
    pub sector_finding: SectorFinding,
    /// Financial auditor narrative, as written by the reasoning backend.
    pub financial_analysis: String,
}
