/// Orchestration of a single CNPJ analysis run
///
/// 1. Look up the company in the public registry
/// 2. Evaluate sector compatibility and financial profile concurrently
/// 3. Apply the deterministic decision rules
///
/// Lookup failures short-circuit before any reasoning call. Reasoning
/// failures abort the run; no verdict is ever defaulted.
use crate::config::Config;
use crate::decision::{DecisionEngine, CAPITAL_THRESHOLD_BRL};
use crate::errors::{AppError, LookupFailure, ResultExt};
use crate::financial::FinancialEvaluator;
use crate::models::{
    CapitalSignal, DecisionOutput, EntityRecord, FinancialAssessment, SectorFinding,
};
use crate::reasoning::{OpenAiReasoningClient, ReasoningBackend};
use crate::registry_client::RegistryClient;
use crate::sector::{SectorDomain, SectorEvaluator};
use bigdecimal::BigDecimal;
use serde::Serialize;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::Instrument;
use uuid::Uuid;

/// Everything a completed run produced.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub analysis_id: Uuid,
    pub record: EntityRecord,
    pub sector_finding: SectorFinding,
    pub financial: FinancialAssessment,
    pub decision: DecisionOutput,
}

/// Terminal state of one analysis run.
#[derive(Debug, Clone)]
pub enum AnalysisOutcome {
    Completed(Box<AnalysisReport>),
    LookupFailed(LookupFailure),
    /// The registry answered successfully with an empty document.
    NotFound,
    ReasoningFailed(String),
}

pub struct AnalysisPipeline {
    registry: RegistryClient,
    sector: SectorEvaluator,
    financial: FinancialEvaluator,
    engine: DecisionEngine,
    reasoning_timeout: Duration,
}

impl AnalysisPipeline {
    /// Builds a pipeline around an explicit reasoning backend.
    pub fn new(config: &Config, backend: Arc<dyn ReasoningBackend>) -> Result<Self, AppError> {
        let registry = RegistryClient::new(config)?;
        let domain = SectorDomain {
            name: config.sector_domain.clone(),
            examples: config.sector_domain_examples.clone(),
        };

        Ok(Self {
            registry,
            sector: SectorEvaluator::new(backend.clone(), domain),
            financial: FinancialEvaluator::new(backend, config.locale),
            engine: DecisionEngine::new(config.locale, config.sector_domain.clone()),
            reasoning_timeout: Duration::from_secs(config.reasoning_timeout_secs),
        })
    }

    /// Builds a pipeline backed by the configured OpenAI-compatible endpoint.
    pub fn from_config(config: &Config) -> Result<Self, AppError> {
        let backend = OpenAiReasoningClient::from_config(config)?;
        Self::new(config, Arc::new(backend))
    }

    pub async fn run(&self, raw_id: &str) -> AnalysisOutcome {
        let analysis_id = Uuid::new_v4();
        let span = tracing::info_span!("analysis", %analysis_id);
        self.run_inner(analysis_id, raw_id).instrument(span).await
    }

    async fn run_inner(&self, analysis_id: Uuid, raw_id: &str) -> AnalysisOutcome {
        tracing::info!("Starting analysis for identifier '{}'", raw_id);

        // Step 1: registry lookup
        let record = match self.registry.lookup(raw_id).await {
            Ok(Some(record)) => record,
            Ok(None) => {
                tracing::warn!("No registry data for '{}'", raw_id);
                return AnalysisOutcome::NotFound;
            }
            Err(failure) => {
                tracing::warn!("Registry lookup failed: {}", failure);
                return AnalysisOutcome::LookupFailed(failure);
            }
        };
        tracing::info!("Registry record found for {} ({})", record.tax_id, record.display_name);

        // Step 2: both evaluations in parallel
        let sector_task = with_deadline(
            self.reasoning_timeout,
            "sector evaluation",
            self.sector.evaluate(
                &record.main_activity_text,
                &record.main_activity_code,
                &record.display_name,
            ),
        );
        let financial_task = with_deadline(
            self.reasoning_timeout,
            "financial evaluation",
            self.financial
                .evaluate(record.age, &record.declared_capital, &record.size_class),
        );
        let (sector_result, financial_result) = tokio::join!(sector_task, financial_task);

        let sector_finding = match sector_result
            .with_context(|| format!("Sector evaluation failed for {}", record.tax_id))
        {
            Ok(finding) => finding,
            Err(e) => {
                tracing::error!("{}", e);
                return AnalysisOutcome::ReasoningFailed(e.to_string());
            }
        };
        let financial = match financial_result
            .with_context(|| format!("Financial evaluation failed for {}", record.tax_id))
        {
            Ok(assessment) => assessment,
            Err(e) => {
                tracing::error!("{}", e);
                return AnalysisOutcome::ReasoningFailed(e.to_string());
            }
        };
        warn_on_capital_mismatch(&record, &financial);

        // Step 3: deterministic decision
        let decision = self.engine.decide(&record, sector_finding);
        tracing::info!("Analysis finished with verdict {}", decision.verdict);

        AnalysisOutcome::Completed(Box::new(AnalysisReport {
            analysis_id,
            record,
            sector_finding,
            financial,
            decision,
        }))
    }
}

async fn with_deadline<T>(
    limit: Duration,
    stage: &str,
    fut: impl Future<Output = Result<T, AppError>>,
) -> Result<T, AppError> {
    match tokio::time::timeout(limit, fut).await {
        Ok(result) => result,
        Err(_) => Err(AppError::Timeout(format!(
            "{} exceeded {}s",
            stage,
            limit.as_secs()
        ))),
    }
}

/// The narrative is informational; the decision engine re-checks the raw capital.
fn warn_on_capital_mismatch(record: &EntityRecord, financial: &FinancialAssessment) {
    let Some(signal) = financial.capital_signal else {
        return;
    };
    let adequate = record
        .declared_capital
        .amount()
        .map(|amount| *amount > BigDecimal::from(CAPITAL_THRESHOLD_BRL))
        .unwrap_or(false);

    let expected = if adequate {
        CapitalSignal::Adequate
    } else {
        CapitalSignal::LowForSize
    };
    if signal != expected {
        tracing::warn!(
            "Financial narrative tagged capital as {:?} but declared capital is {:?}",
            signal,
            expected
        );
    }
}
