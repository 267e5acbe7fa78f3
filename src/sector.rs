use crate::errors::AppError;
use crate::models::SectorFinding;
use crate::reasoning::ReasoningBackend;
use regex::Regex;
use std::sync::{Arc, OnceLock};

/// Target activity domain for the sector check.
#[derive(Debug, Clone)]
pub struct SectorDomain {
    /// Domain name used in prompts and factor texts ("education").
    pub name: String,
    /// Comma-separated examples of in-domain activities.
    pub examples: String,
}

/// Classifies a company's main activity as compatible or incompatible with the target domain.
pub struct SectorEvaluator {
    backend: Arc<dyn ReasoningBackend>,
    domain: SectorDomain,
}

impl SectorEvaluator {
    pub fn new(backend: Arc<dyn ReasoningBackend>, domain: SectorDomain) -> Self {
        Self { backend, domain }
    }

    /// Asks the reasoning backend for a one-sentence verdict and normalizes it to a
    /// binary finding. The free-form reply is not returned.
    pub async fn evaluate(
        &self,
        activity_text: &str,
        activity_code: &str,
        display_name: &str,
    ) -> Result<SectorFinding, AppError> {
        let system_prompt = self.system_prompt();
        let user_prompt = self.task_prompt(activity_text, activity_code, display_name);

        tracing::info!(
            "Sector evaluation via {} ({})",
            self.backend.provider_name(),
            self.backend.model_name()
        );
        let reply = self.backend.chat(&system_prompt, &user_prompt).await?;
        tracing::debug!("Sector reply: {}", reply);

        let finding = parse_sector_reply(&reply, &self.domain.name)?;
        tracing::info!("Sector finding: {}", finding.statement(&self.domain.name));
        Ok(finding)
    }

    fn system_prompt(&self) -> String {
        format!(
            "Role: Business Analyst.\n\
             Goal: Accurately determine if the company's context (CNAE, trade name, activity \
             description) qualifies it as a company in the {domain} segment, issuing a clear \
             and grounded opinion.\n\
             Backstory: I am an experienced Business Analyst. My expertise lies in deciphering \
             a company's true purpose through its formal records and operational context. I \
             meticulously analyze the National Classification of Economic Activities (CNAE) and \
             the company's name/description to ensure the {domain} classification is strictly \
             and correctly applied.",
            domain = self.domain.name
        )
    }

    fn task_prompt(&self, activity_text: &str, activity_code: &str, display_name: &str) -> String {
        let domain = &self.domain.name;
        let upper = domain.to_uppercase();
        let statement_ok = SectorFinding::Compatible.statement(domain);
        let statement_ko = SectorFinding::Incompatible.statement(domain);
        format!(
            "Analyze the company's data using the following information:\n\
             - Main activity: {activity_text}\n\
             - CNAE: {activity_code}\n\
             - Name: {display_name}\n\n\
             Determine strictly whether the company's main activity, CNAE code, or trade name \
             indicate that it operates in the {upper} sector ({examples}).\n\n\
             The output must be a concise verdict, classifying the company as '{statement_ok}' \
             (POSITIVE FACTOR) or '{statement_ko}' (NEGATIVE FACTOR).\n\
             Answer with a single sentence: '{statement_ok}' or '{statement_ko}'.",
            examples = self.domain.examples,
        )
    }
}

fn incompatible_marker() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)\b(incompatible|incompat[ií]vel|not\s+compatible|n[aã]o\s+compat[ií]vel)\b")
            .expect("incompatible marker regex is valid")
    })
}

/// A negation up to three words before a confirmation or compatibility word.
fn negated_marker() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"(?i)\b(not|never|isn['’]?t|n[aã]o|nunca)\b(?:\W+\w+){0,3}?\W+(confirm\w*|compat\w*)",
        )
        .expect("negated marker regex is valid")
    })
}

fn compatible_marker() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)\b(confirmed|confirmada|confirmado|compatible|compat[ií]vel)\b")
            .expect("compatible marker regex is valid")
    })
}

/// Lowercases and strips surrounding quotes and trailing punctuation.
fn normalize_reply(reply: &str) -> String {
    reply
        .trim_matches(|c: char| c.is_whitespace() || matches!(c, '\'' | '"' | '`' | '.' | '!'))
        .to_lowercase()
}

/// Reduces a free-text sector reply to a binary finding.
///
/// The two statements the prompt asks for are matched exactly first. Otherwise
/// incompatibility and negated confirmations win over any compatibility marker.
/// A reply with no marker at all is a reasoning failure, never a guess.
pub fn parse_sector_reply(reply: &str, domain: &str) -> Result<SectorFinding, AppError> {
    let normalized = normalize_reply(reply);
    for finding in [SectorFinding::Compatible, SectorFinding::Incompatible] {
        if normalized == finding.statement(domain).to_lowercase() {
            return Ok(finding);
        }
    }

    if incompatible_marker().is_match(reply) || negated_marker().is_match(reply) {
        return Ok(SectorFinding::Incompatible);
    }
    if compatible_marker().is_match(reply) {
        return Ok(SectorFinding::Compatible);
    }
    Err(AppError::ReasoningError(format!(
        "Sector reply has no compatibility verdict: {}",
        reply.chars().take(200).collect::<String>()
    )))
}
