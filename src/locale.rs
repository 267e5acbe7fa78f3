//! Localized message tables.
//!
//! Every user-visible string produced by the crate (registry placeholders,
//! factor texts, sentinels, justifications, verdict labels and failure
//! messages) comes from one of these tables. Brazilian Portuguese is the
//! default deployment language.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// Output language for an analysis run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum Locale {
    /// Brazilian Portuguese (default)
    #[default]
    #[serde(rename = "pt-BR")]
    PtBr,
    /// English
    #[serde(rename = "en")]
    En,
}

/// Static phrase table for one locale.
///
/// Templates use `{domain}`, `{status}`, `{items}` and `{token}` placeholders,
/// filled with `str::replace` at the call site.
#[derive(Debug)]
pub struct Messages {
    pub not_informed: &'static str,

    pub established_presence: &'static str,
    pub capital_above_threshold: &'static str,
    pub activity_compatible: &'static str,
    pub newly_established: &'static str,
    pub capital_low_for_size: &'static str,
    pub irregular_status: &'static str,
    pub activity_incompatible: &'static str,

    pub no_positive_factor: &'static str,
    pub no_attention_point: &'static str,
    pub no_negative_factor: &'static str,

    pub justification_rejected: &'static str,
    pub justification_under_attention: &'static str,
    pub justification_approved: &'static str,
    pub justification_no_evidence: &'static str,
    pub justification_positives_noted: &'static str,
    pub justification_attention_noted: &'static str,

    pub verdict_approved: &'static str,
    pub verdict_under_attention: &'static str,
    pub verdict_rejected: &'static str,

    pub failure_invalid_id: &'static str,
    pub failure_upstream: &'static str,
    pub failure_timeout: &'static str,
    pub failure_unknown: &'static str,
    pub failure_not_found: &'static str,
    pub failure_reasoning: &'static str,

    pub report_result: &'static str,
    pub report_company: &'static str,
    pub report_justification: &'static str,
    pub report_positive_header: &'static str,
    pub report_attention_header: &'static str,
    pub report_negative_header: &'static str,
    pub report_no_positive: &'static str,
    pub report_no_attention: &'static str,
    pub report_no_negative: &'static str,
    pub report_financial_header: &'static str,
}

static PT_BR: Messages = Messages {
    not_informed: "Não informado",

    established_presence: "Empresa com presença consolidada no mercado (mais de 2 anos)",
    capital_above_threshold: "Capital social acima de R$ 100 mil",
    activity_compatible: "Atividade compatível com o segmento de {domain}",
    newly_established: "Empresa recém-criada (2 anos ou menos, ou idade não informada)",
    capital_low_for_size: "Capital social baixo para o porte",
    irregular_status: "Situação cadastral inativa/irregular ({status})",
    activity_incompatible: "Atividade incompatível com o segmento de {domain}",

    no_positive_factor: "nenhum ponto positivo identificado",
    no_attention_point: "nenhum ponto de atenção identificado",
    no_negative_factor: "nenhum ponto negativo identificado",

    justification_rejected:
        "Empresa REJEITADA: foram identificados fatores negativos ({items}), que prevalecem sobre quaisquer fatores positivos ou pontos de atenção.",
    justification_under_attention:
        "Empresa SOB ATENÇÃO: não há fatores negativos, mas foram identificados pontos de atenção ({items}).",
    justification_approved:
        "Empresa APROVADA: não há fatores negativos nem pontos de atenção, e foram identificados fatores positivos ({items}).",
    justification_no_evidence:
        "Empresa SOB ATENÇÃO: nenhum fator positivo, ponto de atenção ou fator negativo foi identificado, não havendo evidências suficientes para aprovação.",
    justification_positives_noted: "Fatores positivos considerados: {items}.",
    justification_attention_noted: "Pontos de atenção considerados: {items}.",

    verdict_approved: "APROVADO",
    verdict_under_attention: "SOB ATENÇÃO",
    verdict_rejected: "REJEITADO",

    failure_invalid_id:
        "CNPJ não encontrado ou inválido. Por favor, verifique o número inserido.",
    failure_upstream:
        "Erro no servidor de dados: A API retornou um erro interno ao tentar buscar o CNPJ.",
    failure_timeout:
        "O servidor de dados não respondeu a tempo. Tente novamente em alguns instantes.",
    failure_unknown: "Ocorreu um erro desconhecido durante a análise: {token}",
    failure_not_found: "Nenhum dado foi encontrado para o CNPJ informado.",
    failure_reasoning:
        "A etapa de análise não conseguiu produzir um resultado. Nenhum veredicto foi emitido.",

    report_result: "RESULTADO",
    report_company: "Empresa",
    report_justification: "Justificativa",
    report_positive_header: "Fatores Positivos:",
    report_attention_header: "Pontos de Atenção:",
    report_negative_header: "Fatores Negativos:",
    report_no_positive: "Nenhum fator positivo encontrado.",
    report_no_attention: "Nenhum ponto de atenção encontrado.",
    report_no_negative: "Nenhum fator negativo encontrado.",
    report_financial_header: "Análise Financeira:",
};

static EN: Messages = Messages {
    not_informed: "not informed",

    established_presence: "Company with established market presence (more than 2 years)",
    capital_above_threshold: "Share capital above R$ 100k",
    activity_compatible: "Activity compatible with the {domain} segment",
    newly_established: "Newly established company (2 years or less, or age not informed)",
    capital_low_for_size: "Capital low relative to size",
    irregular_status: "Inactive/irregular operational status ({status})",
    activity_incompatible: "Activity incompatible with the {domain} segment",

    no_positive_factor: "no positive factor identified",
    no_attention_point: "no attention point identified",
    no_negative_factor: "no negative factor identified",

    justification_rejected:
        "Company REJECTED: negative factors were found ({items}), which override any positive factors or attention points.",
    justification_under_attention:
        "Company UNDER ATTENTION: no negative factors, but attention points were found ({items}).",
    justification_approved:
        "Company APPROVED: no negative factors or attention points, and positive factors were found ({items}).",
    justification_no_evidence:
        "Company UNDER ATTENTION: no positive factor, attention point or negative factor was found, so there is not enough evidence for approval.",
    justification_positives_noted: "Positive factors considered: {items}.",
    justification_attention_noted: "Attention points considered: {items}.",

    verdict_approved: "APPROVED",
    verdict_under_attention: "UNDER ATTENTION",
    verdict_rejected: "REJECTED",

    failure_invalid_id: "CNPJ not found or invalid. Please check the number entered.",
    failure_upstream: "Data server error: the registry API returned an error while looking up the CNPJ.",
    failure_timeout: "The data server did not respond in time. Please try again shortly.",
    failure_unknown: "An unknown error occurred during the analysis: {token}",
    failure_not_found: "No data was found for the given CNPJ.",
    failure_reasoning: "The analysis stage could not produce a result. No verdict was issued.",

    report_result: "RESULT",
    report_company: "Company",
    report_justification: "Justification",
    report_positive_header: "Positive Factors:",
    report_attention_header: "Attention Points:",
    report_negative_header: "Negative Factors:",
    report_no_positive: "No positive factor found.",
    report_no_attention: "No attention point found.",
    report_no_negative: "No negative factor found.",
    report_financial_header: "Financial Analysis:",
};

impl Locale {
    /// Message table for this locale.
    pub fn messages(self) -> &'static Messages {
        match self {
            Locale::PtBr => &PT_BR,
            Locale::En => &EN,
        }
    }

    /// Language tag, as accepted by `FromStr`.
    pub fn tag(self) -> &'static str {
        match self {
            Locale::PtBr => "pt-BR",
            Locale::En => "en",
        }
    }
}

/// Error type for parsing a Locale
#[derive(Debug)]
pub struct ParseLocaleError(String);

impl fmt::Display for ParseLocaleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for ParseLocaleError {}

impl FromStr for Locale {
    type Err = ParseLocaleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('_', "-").as_str() {
            "pt-br" | "pt" | "br" => Ok(Locale::PtBr),
            "en" | "en-us" | "en-gb" => Ok(Locale::En),
            other => Err(ParseLocaleError(format!(
                "Unknown locale '{}'. Valid values: pt-BR, en",
                other
            ))),
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.tag())
    }
}

impl<'de> Deserialize<'de> for Locale {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_str() {
        assert_eq!("pt-BR".parse::<Locale>().unwrap(), Locale::PtBr);
        assert_eq!("pt_br".parse::<Locale>().unwrap(), Locale::PtBr);
        assert_eq!("EN".parse::<Locale>().unwrap(), Locale::En);
        assert!("fr".parse::<Locale>().is_err());
    }

    #[test]
    fn test_default_is_portuguese() {
        assert_eq!(Locale::default(), Locale::PtBr);
        assert_eq!(
            Locale::default().messages().no_positive_factor,
            "nenhum ponto positivo identificado"
        );
    }

    #[test]
    fn test_display_round_trips_through_parse() {
        for locale in [Locale::PtBr, Locale::En] {
            assert_eq!(locale.to_string().parse::<Locale>().unwrap(), locale);
        }
    }
}
