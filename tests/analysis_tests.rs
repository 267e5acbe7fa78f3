/// Analysis scenarios with an injected reasoning backend
/// Tests the decision rules end to end, the reply parsers, the presentation
/// layer and error handling
use async_trait::async_trait;
use rust_cnpj_risk_api::config::Config;
use rust_cnpj_risk_api::errors::{AppError, LookupFailure};
use rust_cnpj_risk_api::locale::Locale;
use rust_cnpj_risk_api::models::Verdict;
use rust_cnpj_risk_api::pipeline::{AnalysisOutcome, AnalysisPipeline};
use rust_cnpj_risk_api::reasoning::ReasoningBackend;
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Answers sector prompts with a fixed verdict and counts every call.
struct ScriptedBackend {
    sector_reply: &'static str,
    calls: AtomicUsize,
}

impl ScriptedBackend {
    fn new(sector_reply: &'static str) -> Arc<Self> {
        Arc::new(Self {
            sector_reply,
            calls: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl ReasoningBackend for ScriptedBackend {
    async fn chat(&self, _system_prompt: &str, user_prompt: &str) -> Result<String, AppError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if user_prompt.contains("Main activity") {
            Ok(self.sector_reply.to_string())
        } else {
            Ok("Financial profile reviewed.".to_string())
        }
    }

    fn model_name(&self) -> &str {
        "scripted"
    }

    fn provider_name(&self) -> &str {
        "test"
    }
}

/// Helper function to create test config
fn create_test_config(registry_base_url: String, locale: Locale) -> Config {
    Config {
        port: 8080,
        registry_base_url,
        registry_timeout_secs: 5,
        openai_api_key: "unused".to_string(),
        openai_base_url: "http://localhost:1".to_string(),
        llm_model: "gpt-4o-mini".to_string(),
        llm_temperature: 0.7,
        llm_max_tokens: 256,
        reasoning_timeout_secs: 5,
        locale,
        sector_domain: "education".to_string(),
        sector_domain_examples: "schools, courses".to_string(),
    }
}

/// Registry document for a company founded `age_years` whole years ago.
fn company(status: &str, age_years: i64, equity: i64) -> serde_json::Value {
    // A small margin keeps days / 365 on the intended year
    let founded = chrono::Local::now().date_naive() - chrono::Duration::days(age_years * 365 + 10);
    json!({
        "founded": founded.format("%Y-%m-%d").to_string(),
        "status": {"text": status},
        "company": {"name": "EMPRESA TESTE LTDA", "equity": equity},
        "mainActivity": {"id": "8599604", "text": "Treinamento em desenvolvimento profissional", "size": "ME"}
    })
}

async fn run_scenario(
    body: serde_json::Value,
    sector_reply: &'static str,
    locale: Locale,
) -> (AnalysisOutcome, Arc<ScriptedBackend>) {
    let registry = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/office/11222333000181"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(&registry)
        .await;

    let backend = ScriptedBackend::new(sector_reply);
    let config = create_test_config(registry.uri(), locale);
    let pipeline = AnalysisPipeline::new(&config, backend.clone()).unwrap();

    let outcome = pipeline.run("11.222.333/0001-81").await;
    (outcome, backend)
}

#[cfg(test)]
mod scenario_tests {
    use super::*;

    #[tokio::test]
    async fn test_inactive_mature_well_capitalized_is_rejected() {
        let (outcome, backend) = run_scenario(
            company("Inapta", 10, 1_000_000),
            "Education activity confirmed",
            Locale::En,
        )
        .await;

        let AnalysisOutcome::Completed(report) = outcome else {
            panic!("expected completion, got {:?}", outcome);
        };
        let decision = &report.decision;
        assert_eq!(decision.verdict, Verdict::Rejected);
        assert_eq!(
            decision.negative_factors,
            vec!["Inactive/irregular operational status (Inapta)".to_string()]
        );
        assert_eq!(
            decision.positive_factors,
            vec![
                "Company with established market presence (more than 2 years)".to_string(),
                "Share capital above R$ 100k".to_string(),
                "Activity compatible with the education segment".to_string(),
            ]
        );
        assert_eq!(backend.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_young_low_capital_is_under_attention() {
        let (outcome, _) = run_scenario(
            company("Ativa", 1, 50_000),
            "Education activity confirmed",
            Locale::En,
        )
        .await;

        let AnalysisOutcome::Completed(report) = outcome else {
            panic!("expected completion, got {:?}", outcome);
        };
        let decision = &report.decision;
        assert_eq!(decision.verdict, Verdict::UnderAttention);
        assert_eq!(
            decision.attention_points,
            vec![
                "Newly established company (2 years or less, or age not informed)".to_string(),
                "Capital low relative to size".to_string(),
            ]
        );
        assert_eq!(
            decision.positive_factors,
            vec!["Activity compatible with the education segment".to_string()]
        );
    }

    #[tokio::test]
    async fn test_established_well_capitalized_is_approved() {
        let (outcome, _) = run_scenario(
            company("Ativa", 5, 200_000),
            "Education activity confirmed",
            Locale::PtBr,
        )
        .await;

        let AnalysisOutcome::Completed(report) = outcome else {
            panic!("expected completion, got {:?}", outcome);
        };
        let decision = &report.decision;
        assert_eq!(decision.verdict, Verdict::Approved);
        assert_eq!(
            decision.attention_points,
            vec!["nenhum ponto de atenção identificado".to_string()]
        );
        assert_eq!(
            decision.negative_factors,
            vec!["nenhum ponto negativo identificado".to_string()]
        );
        assert_eq!(decision.name, "EMPRESA TESTE LTDA");
    }

    #[tokio::test]
    async fn test_incompatible_sector_is_rejected() {
        let (outcome, _) = run_scenario(
            company("Ativa", 1, 50_000),
            "Education activity incompatible",
            Locale::En,
        )
        .await;

        let AnalysisOutcome::Completed(report) = outcome else {
            panic!("expected completion, got {:?}", outcome);
        };
        assert_eq!(report.decision.verdict, Verdict::Rejected);
    }

    #[tokio::test]
    async fn test_negated_confirmation_is_rejected() {
        let (outcome, _) = run_scenario(
            company("Ativa", 5, 200_000),
            "Educational activity not confirmed",
            Locale::En,
        )
        .await;

        let AnalysisOutcome::Completed(report) = outcome else {
            panic!("expected completion, got {:?}", outcome);
        };
        assert_eq!(report.decision.verdict, Verdict::Rejected);
        assert_eq!(
            report.decision.negative_factors,
            vec!["Activity incompatible with the education segment".to_string()]
        );
    }

    #[tokio::test]
    async fn test_invalid_id_never_invokes_backend() {
        let backend = ScriptedBackend::new("Education activity confirmed");
        let config = create_test_config("http://127.0.0.1:1".to_string(), Locale::PtBr);
        let pipeline = AnalysisPipeline::new(&config, backend.clone()).unwrap();

        let outcome = pipeline.run("not-a-cnpj").await;

        assert!(matches!(
            outcome,
            AnalysisOutcome::LookupFailed(LookupFailure::InvalidId)
        ));
        assert_eq!(backend.calls.load(Ordering::SeqCst), 0);
    }
}

#[cfg(test)]
mod presentation_tests {
    use super::*;
    use rust_cnpj_risk_api::presentation::{failure_message, render_outcome};

    #[tokio::test]
    async fn test_rejected_report_lists_factors_with_icons() {
        let (outcome, _) = run_scenario(
            company("Suspensa", 10, 1_000_000),
            "Atividade educacional confirmada",
            Locale::PtBr,
        )
        .await;

        let text = render_outcome(&outcome, Locale::PtBr);
        assert!(text.starts_with("RESULTADO: REJEITADO\n"));
        assert!(text.contains("Empresa: EMPRESA TESTE LTDA"));
        assert!(text.contains("❌ Situação cadastral inativa/irregular (Suspensa)"));
        assert!(text.contains("✅ Capital social acima de R$ 100 mil"));
        assert!(text.contains("Nenhum ponto de atenção encontrado."));
        assert!(text.contains("Análise Financeira:\n  Financial profile reviewed."));
    }

    #[test]
    fn test_lookup_failure_text() {
        let outcome = AnalysisOutcome::LookupFailed(LookupFailure::Timeout);
        assert_eq!(
            render_outcome(&outcome, Locale::En),
            failure_message(LookupFailure::Timeout, Locale::En)
        );
        assert_eq!(
            failure_message(LookupFailure::UnknownFailure, Locale::En),
            "An unknown error occurred during the analysis: UNKNOWN_FAILURE"
        );
    }

    #[test]
    fn test_reasoning_failure_text_hides_detail() {
        let outcome = AnalysisOutcome::ReasoningFailed("backend said 500".to_string());
        let text = render_outcome(&outcome, Locale::PtBr);
        assert!(!text.contains("500"));
        assert!(text.contains("Nenhum veredicto"));
    }
}

#[cfg(test)]
mod error_handling_tests {
    use super::*;
    use axum::http::StatusCode;
    use axum::response::IntoResponse;

    #[test]
    fn test_app_error_types() {
        let cases = [
            (AppError::BadRequest("x".to_string()), StatusCode::BAD_REQUEST),
            (AppError::ExternalApiError("x".to_string()), StatusCode::BAD_GATEWAY),
            (AppError::Timeout("x".to_string()), StatusCode::GATEWAY_TIMEOUT),
            (AppError::ReasoningError("x".to_string()), StatusCode::BAD_GATEWAY),
            (AppError::InternalError("x".to_string()), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (error, expected) in cases {
            assert_eq!(error.into_response().status(), expected);
        }
    }

    #[test]
    fn test_error_display() {
        assert_eq!(
            AppError::ReasoningError("no verdict".to_string()).to_string(),
            "Reasoning error: no verdict"
        );
        assert_eq!(LookupFailure::UpstreamFailure.to_string(), "UPSTREAM_FAILURE");
    }
}
