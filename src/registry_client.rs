use crate::config::Config;
use crate::errors::{AppError, LookupFailure};
use crate::locale::Locale;
use crate::models::{CompanyAge, DeclaredCapital, EntityRecord, OperationalStatus};
use chrono::{Local, NaiveDate};
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;

/// Strips every non-digit character from a user-supplied identifier.
///
/// "12.345.678/0001-95" → "12345678000195"
pub fn normalize_identifier(raw: &str) -> String {
    raw.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Current date on the host's local calendar.
pub fn local_today() -> NaiveDate {
    Local::now().date_naive()
}

/// Whole years between `founded` and `today`, as `days / 365`, floored and clamped at zero.
///
/// Registry dates are calendar dates without a zone, so `today` is the local
/// calendar day (see [`local_today`]).
pub fn age_in_years(founded: NaiveDate, today: NaiveDate) -> u32 {
    let days = (today - founded).num_days();
    if days <= 0 {
        return 0;
    }
    u32::try_from(days / 365).unwrap_or(u32::MAX)
}

/// Client for the public CNPJ registry (CNPJá open API).
#[derive(Clone)]
pub struct RegistryClient {
    client: Client,
    base_url: String,
    locale: Locale,
}

impl RegistryClient {
    /// Creates a new `RegistryClient` with the configured base URL and timeout.
    pub fn new(config: &Config) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.registry_timeout_secs))
            .build()
            .map_err(|e| {
                AppError::InternalError(format!("Failed to create registry client: {}", e))
            })?;

        Ok(Self {
            client,
            base_url: config.registry_base_url.trim_end_matches('/').to_string(),
            locale: config.locale,
        })
    }

    /// Looks up a company by CNPJ.
    ///
    /// Performs at most one outbound request and never retries. `Ok(None)` means the
    /// registry answered successfully but with an empty document.
    pub async fn lookup(&self, raw_id: &str) -> Result<Option<EntityRecord>, LookupFailure> {
        let tax_id = normalize_identifier(raw_id);
        tracing::info!("Normalized CNPJ: {}", tax_id);

        if tax_id.is_empty() {
            tracing::warn!("Identifier '{}' has no digits, skipping registry call", raw_id);
            return Err(LookupFailure::InvalidId);
        }

        let url = format!("{}/office/{}", self.base_url, tax_id);
        tracing::info!("Requesting registry data: {}", url);

        let response = match self.client.get(&url).send().await {
            Ok(response) => response,
            Err(e) if e.is_timeout() => {
                tracing::error!("Registry request timed out for {}: {}", tax_id, e);
                return Err(LookupFailure::Timeout);
            }
            Err(e) => {
                tracing::error!("Registry request failed for {}: {}", tax_id, e);
                return Err(LookupFailure::UnknownFailure);
            }
        };

        let status = response.status();
        if status.as_u16() != 200 {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            tracing::error!("Registry returned {}: {}", status, error_text);
            return Err(LookupFailure::from_status(status.as_u16()));
        }

        let payload: Value = match response.json().await {
            Ok(payload) => payload,
            Err(e) if e.is_timeout() => {
                tracing::error!("Registry body timed out for {}: {}", tax_id, e);
                return Err(LookupFailure::Timeout);
            }
            Err(e) => {
                tracing::error!("Failed to parse registry response for {}: {}", tax_id, e);
                return Err(LookupFailure::UnknownFailure);
            }
        };
        tracing::info!("Registry request succeeded");

        let today = local_today();
        Ok(map_registry_payload(&tax_id, &payload, today, self.locale))
    }
}

/// Maps a registry JSON document onto an `EntityRecord`.
///
/// Every field is optional; missing values become the locale's "not informed"
/// placeholder. Returns `None` for a `null` body or an empty object.
pub fn map_registry_payload(
    tax_id: &str,
    data: &Value,
    today: NaiveDate,
    locale: Locale,
) -> Option<EntityRecord> {
    match data.as_object() {
        Some(obj) if !obj.is_empty() => {}
        _ => {
            tracing::warn!("Registry returned an empty document for {}", tax_id);
            return None;
        }
    }

    let not_informed = locale.messages().not_informed;
    let text_or_placeholder =
        |value: Option<&Value>| scalar_text(value).unwrap_or_else(|| not_informed.to_string());

    let status_text = text_or_placeholder(data.pointer("/status/text"));
    let status = match scalar_text(data.pointer("/status/text")) {
        Some(text) => OperationalStatus::from_registry_text(&text),
        None => OperationalStatus::Unknown,
    };

    let age = match data.get("founded").and_then(|v| v.as_str()) {
        Some(founded) => match NaiveDate::parse_from_str(founded, "%Y-%m-%d") {
            Ok(date) => CompanyAge::Years(age_in_years(date, today)),
            Err(e) => {
                tracing::warn!("Unparseable foundation date '{}': {}", founded, e);
                CompanyAge::NotInformed
            }
        },
        None => CompanyAge::NotInformed,
    };
    tracing::info!("Company age: {}", age.describe(locale));

    let main_activity_text = text_or_placeholder(data.pointer("/mainActivity/text"));
    let main_activity_code = text_or_placeholder(data.pointer("/mainActivity/id"));
    tracing::info!("CNAE: {}", main_activity_code);

    let declared_capital = DeclaredCapital::from_json(data.pointer("/company/equity"));
    tracing::info!("Declared capital: {}", declared_capital.describe(locale));

    let display_name = text_or_placeholder(data.pointer("/company/name"));
    tracing::info!("Company name: {}", display_name);

    let size_class = scalar_text(data.pointer("/mainActivity/size"))
        .or_else(|| scalar_text(data.pointer("/company/size/text")))
        .or_else(|| scalar_text(data.pointer("/company/size/acronym")))
        .unwrap_or_else(|| not_informed.to_string());
    tracing::info!("Size: {}", size_class);

    Some(EntityRecord {
        tax_id: tax_id.to_string(),
        status,
        status_text,
        age,
        main_activity_text,
        main_activity_code,
        display_name,
        declared_capital,
        size_class,
    })
}

/// Renders a JSON string or number as text. Blank strings count as missing.
fn scalar_text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
