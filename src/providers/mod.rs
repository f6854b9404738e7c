/*!
 * Translator adapters for hosted language models.
 *
 * The translation core only depends on the [`Translator`] trait; the
 * implementations here are:
 * - `openai`: OpenAI chat completions
 * - `anthropic`: Anthropic messages
 * - `mock`: offline translator with scripted behaviors
 *
 * Retrying rate-limited or dropped requests is an adapter concern handled by
 * [`send_with_retry`]; the core never retries a provider error.
 */

use async_trait::async_trait;
use log::warn;
use std::fmt::Debug;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Result, anyhow};

use crate::app_config::{TranslationConfig, TranslationProvider};
use crate::errors::ProviderError;

/// Common trait for all translation adapters
///
/// This trait defines the interface that all adapters must follow,
/// allowing them to be used interchangeably by the chunk translator.
#[async_trait]
pub trait Translator: Send + Sync + Debug {
    /// Send a table to the model and return its raw reply
    ///
    /// # Arguments
    /// * `instructions` - Rendered instructions (source and target language included)
    /// * `table` - The table text to translate
    ///
    /// # Returns
    /// * `Result<String, ProviderError>` - The model reply or a transport error
    async fn translate(&self, instructions: &str, table: &str) -> Result<String, ProviderError>;

    /// Short name used in logs
    fn name(&self) -> String;
}

#[async_trait]
impl<T: Translator + ?Sized> Translator for Arc<T> {
    async fn translate(&self, instructions: &str, table: &str) -> Result<String, ProviderError> {
        (**self).translate(instructions, table).await
    }

    fn name(&self) -> String {
        (**self).name()
    }
}

/// Map an unsuccessful HTTP status to a provider error
pub(crate) fn status_error(status_code: u16, message: String) -> ProviderError {
    match status_code {
        401 | 403 => ProviderError::AuthenticationError(message),
        429 => ProviderError::RateLimitExceeded(message),
        _ => ProviderError::ApiError { status_code, message },
    }
}

/// Map a reqwest send failure to a provider error
pub(crate) fn send_error(provider: &str, error: reqwest::Error) -> ProviderError {
    if error.is_timeout() || error.is_connect() {
        ProviderError::ConnectionError(format!("{}: {}", provider, error))
    } else {
        ProviderError::RequestFailed(format!("Failed to send request to {}: {}", provider, error))
    }
}

/// Run a request, retrying transient failures with exponential backoff.
///
/// Waits `backoff_base_ms * 2^attempt` between attempts, and at least the
/// interval implied by `rate_limit` (requests per minute) when one is set.
pub async fn send_with_retry<F, Fut, T>(
    max_retries: u32,
    backoff_base_ms: u64,
    rate_limit: Option<u32>,
    mut request: F,
) -> Result<T, ProviderError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ProviderError>>,
{
    let min_interval_ms = rate_limit
        .filter(|limit| *limit > 0)
        .map(|limit| 60_000 / u64::from(limit))
        .unwrap_or(0);
    let mut attempt: u32 = 0;

    loop {
        match request().await {
            Ok(value) => return Ok(value),
            Err(e) if e.is_transient() && attempt < max_retries => {
                let delay_ms = backoff_base_ms
                    .saturating_mul(2u64.saturating_pow(attempt))
                    .max(min_interval_ms);
                warn!(
                    "{} (attempt {}/{}), retrying in {}ms",
                    e, attempt + 1, max_retries + 1, delay_ms
                );
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}

/// Build the adapter selected by the configuration
pub fn build_translator(config: &TranslationConfig) -> Result<Arc<dyn Translator>> {
    let retry_count = config.common.retry_count;
    let retry_backoff_ms = config.common.retry_backoff_ms;
    let rate_limit = config.get_rate_limit();
    let timeout = Duration::from_secs(config.get_timeout_secs());

    let translator: Arc<dyn Translator> = match config.provider {
        TranslationProvider::OpenAI => {
            let endpoint = config.get_endpoint();
            url::Url::parse(&endpoint)
                .map_err(|e| anyhow!("Invalid OpenAI endpoint '{}': {}", endpoint, e))?;

            Arc::new(
                openai::OpenAI::new_with_config(
                    config.get_api_key(),
                    endpoint,
                    config.model.clone(),
                    timeout,
                    retry_count,
                    retry_backoff_ms,
                    rate_limit,
                )
                .sampling(config.common.temperature, config.common.top_p),
            )
        }
        TranslationProvider::Anthropic => {
            let endpoint = config.get_endpoint();
            url::Url::parse(&endpoint)
                .map_err(|e| anyhow!("Invalid Anthropic endpoint '{}': {}", endpoint, e))?;

            Arc::new(
                anthropic::Anthropic::new_with_config(
                    config.get_api_key(),
                    endpoint,
                    config.model.clone(),
                    timeout,
                    retry_count,
                    retry_backoff_ms,
                    rate_limit,
                )
                .sampling(config.common.temperature, config.common.top_p),
            )
        }
        TranslationProvider::Mock => Arc::new(mock::MockTranslator::echo()),
    };

    Ok(translator)
}

pub mod anthropic;
pub mod mock;
pub mod openai;
