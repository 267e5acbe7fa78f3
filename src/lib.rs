//! CNPJ Risk Analysis Library
//!
//! Looks up a Brazilian company in the public CNPJ registry, has a reasoning
//! backend assess its sector and financial profile, and applies deterministic
//! rules to produce an APPROVED / UNDER_ATTENTION / REJECTED verdict.
//!
//! # Modules
//!
//! - `config`: Configuration management.
//! - `decision`: Deterministic decision rules.
//! - `errors`: Error handling types.
//! - `financial`: Financial evaluator (share capital vs. size).
//! - `handlers`: HTTP request handlers.
//! - `locale`: Localized message tables.
//! - `models`: Core data models.
//! - `pipeline`: End-to-end analysis orchestration.
//! - `presentation`: User-facing rendering of outcomes.
//! - `reasoning`: Reasoning backend trait and OpenAI-compatible client.
//! - `registry_client`: CNPJ registry client.
//! - `sector`: Sector compatibility evaluator.

pub mod config;
pub mod decision;
pub mod errors;
pub mod financial;
pub mod handlers;
pub mod locale;
pub mod models;
pub mod pipeline;
pub mod presentation;
pub mod reasoning;
pub mod registry_client;
pub mod sector;
