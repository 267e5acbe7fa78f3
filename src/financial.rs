use crate::errors::AppError;
use crate::locale::Locale;
use crate::models::{CapitalSignal, CompanyAge, DeclaredCapital, FinancialAssessment};
use crate::reasoning::ReasoningBackend;
use regex::Regex;
use std::sync::{Arc, OnceLock};

const SYSTEM_PROMPT: &str = "Role: Financial Auditor.\n\
Goal: Evaluate the coherence and suitability of the company's declared Share Capital \
(Capital Social) in relation to its size (revenue, size) and Legal Nature, identifying \
potential risk misalignments.\n\
Backstory: I work as a Financial Auditor focusing on Balance Sheet and Risk Analysis. My job \
is to verify that the company's financial foundation, the Share Capital, is proportional and \
consistent with the operational level and fiscal responsibility of its declared size (ME, EPP, \
LTDA, S/A, etc.). I am rigorous in searching for inconsistencies that might indicate \
undercapitalization or future risk.";

/// Tag the narrative uses for capital above the threshold.
pub const ADEQUATE_TAG: &str = "Share Capital > R$ 100k";
/// Tag the narrative uses for capital at or below the threshold.
pub const LOW_FOR_SIZE_TAG: &str = "Low capital for size";

/// Produces an explanatory financial narrative for a company.
///
/// The narrative is informational: the decision engine re-checks the same raw
/// values against its own thresholds.
pub struct FinancialEvaluator {
    backend: Arc<dyn ReasoningBackend>,
    locale: Locale,
}

impl FinancialEvaluator {
    pub fn new(backend: Arc<dyn ReasoningBackend>, locale: Locale) -> Self {
        Self { backend, locale }
    }

    pub async fn evaluate(
        &self,
        age: CompanyAge,
        declared_capital: &DeclaredCapital,
        size_class: &str,
    ) -> Result<FinancialAssessment, AppError> {
        let user_prompt = self.task_prompt(age, declared_capital, size_class);

        tracing::info!(
            "Financial evaluation via {} ({})",
            self.backend.provider_name(),
            self.backend.model_name()
        );
        let narrative = self.backend.chat(SYSTEM_PROMPT, &user_prompt).await?;
        if narrative.trim().is_empty() {
            return Err(AppError::ReasoningError(
                "Financial evaluation returned an empty narrative".to_string(),
            ));
        }

        let capital_signal = parse_capital_signal(&narrative);
        tracing::info!("Financial narrative received (capital signal: {:?})", capital_signal);

        Ok(FinancialAssessment {
            narrative: narrative.trim().to_string(),
            capital_signal,
        })
    }

    fn task_prompt(&self, age: CompanyAge, capital: &DeclaredCapital, size_class: &str) -> String {
        let answer_language = match self.locale {
            Locale::PtBr => "Portuguese",
            Locale::En => "English",
        };
        format!(
            "Evaluate the company's financial and structural indicators using the following data:\n\
             - Age: {age} years\n\
             - Share Capital: {capital}\n\
             - Company Size: {size_class} (e.g., MEI, Micro, Small, Medium, Large).\n\n\
             The analysis should:\n\
             - Evaluate whether the declared share capital appears consistent with the company's size and maturity.\n\
             - Comment on the financial solidity and potential stability based on these factors.\n\
             - Identify if there are any risk signals (e.g., very low capital for an older company or large company with undercapitalization).\n\
             - Mention positive financial aspects when applicable (e.g., long market presence, high capitalization, or coherent growth profile).\n\
             - Share Capital: If > R$ 100,000.00, classify as '{ADEQUATE_TAG}' (POSITIVE FACTOR). \
             If R$ 100,000.00 or less, classify as '{LOW_FOR_SIZE_TAG}' (ATTENTION POINT).\n\n\
             Reply with a short paragraph in {answer_language} providing a reasoned financial \
             interpretation, mentioning both strengths and potential concerns if any, and \
             quoting the share capital classification verbatim.",
            age = age.describe(self.locale),
            capital = capital.describe(self.locale),
        )
    }
}

fn adequate_marker() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)share\s+capital\s*>\s*R\$\s*100\s*k|capital\s+social\s+acima")
            .expect("adequate marker regex is valid")
    })
}

fn low_marker() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)low\s+capital\s+for\s+size|capital\s+baixo\s+para\s+o\s+porte")
            .expect("low capital marker regex is valid")
    })
}

/// Extracts the capital tag the narrative surfaced, if exactly one of them is present.
pub fn parse_capital_signal(narrative: &str) -> Option<CapitalSignal> {
    match (adequate_marker().is_match(narrative), low_marker().is_match(narrative)) {
        (true, false) => Some(CapitalSignal::Adequate),
        (false, true) => Some(CapitalSignal::LowForSize),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use bigdecimal::BigDecimal;
    use std::sync::Mutex;

    struct CannedBackend {
        reply: String,
        last_prompt: Mutex<Option<String>>,
    }

    #[async_trait]
    impl ReasoningBackend for CannedBackend {
        async fn chat(&self, _system: &str, user: &str) -> Result<String, AppError> {
            *self.last_prompt.lock().unwrap() = Some(user.to_string());
            Ok(self.reply.clone())
        }

        fn model_name(&self) -> &str {
            "canned"
        }

        fn provider_name(&self) -> &str {
            "test"
        }
    }

    #[test]
    fn test_parse_capital_signal() {
        assert_eq!(
            parse_capital_signal("Solid company. Share Capital > R$ 100k."),
            Some(CapitalSignal::Adequate)
        );
        assert_eq!(
            parse_capital_signal("Classificação: Low capital for size."),
            Some(CapitalSignal::LowForSize)
        );
        assert_eq!(
            parse_capital_signal("Capital social baixo para o porte da empresa."),
            Some(CapitalSignal::LowForSize)
        );
        assert_eq!(parse_capital_signal("No classification given."), None);
        assert_eq!(
            parse_capital_signal("Share Capital > R$ 100k, yet Low capital for size."),
            None
        );
    }

    #[tokio::test]
    async fn test_evaluate_builds_prompt_from_raw_values() {
        let backend = Arc::new(CannedBackend {
            reply: "  Empresa madura. Low capital for size.  ".to_string(),
            last_prompt: Mutex::new(None),
        });
        let evaluator = FinancialEvaluator::new(backend.clone(), Locale::PtBr);

        let assessment = evaluator
            .evaluate(
                CompanyAge::Years(12),
                &DeclaredCapital::Amount(BigDecimal::from(20_000)),
                "ME",
            )
            .await
            .unwrap();

        assert_eq!(assessment.narrative, "Empresa madura. Low capital for size.");
        assert_eq!(assessment.capital_signal, Some(CapitalSignal::LowForSize));

        let prompt = backend.last_prompt.lock().unwrap().clone().unwrap();
        assert!(prompt.contains("- Age: 12 years"));
        assert!(prompt.contains("- Share Capital: R$ 20.000,00"));
        assert!(prompt.contains("- Company Size: ME"));
        assert!(prompt.contains("in Portuguese"));
    }

    #[tokio::test]
    async fn test_empty_narrative_is_reasoning_error() {
        let backend = Arc::new(CannedBackend {
            reply: "   ".to_string(),
            last_prompt: Mutex::new(None),
        });
        let evaluator = FinancialEvaluator::new(backend, Locale::En);

        let err = evaluator
            .evaluate(CompanyAge::NotInformed, &DeclaredCapital::NotInformed, "ME")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ReasoningError(_)));
    }
}
