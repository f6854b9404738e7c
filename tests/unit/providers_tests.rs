/*!
 * Tests for translator adapters and adapter-level retry
 */

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use subtable::app_config::{TranslationConfig, TranslationProvider};
use subtable::errors::ProviderError;
use subtable::providers::mock::{MockBehavior, MockTranslator};
use subtable::providers::{Translator, build_translator, send_with_retry};
use subtable::translation::table::table_rows;
use subtable::validation::TableValidator;

const REQUEST: &str = "| Original | Translated |\n| --- | --- |\n| ::0:: Hello |     |\n| ::1:: World |     |\n| ::2:: Test |     |";

#[tokio::test]
async fn test_sendWithRetry_withTransientFailures_shouldRetryUntilSuccess() {
    let attempts = AtomicUsize::new(0);

    let result = send_with_retry(3, 1, None, || {
        let attempt = attempts.fetch_add(1, Ordering::SeqCst);
        async move {
            if attempt < 2 {
                Err(ProviderError::RateLimitExceeded("slow down".to_string()))
            } else {
                Ok("done")
            }
        }
    })
    .await;

    assert_eq!(result.unwrap(), "done");
    assert_eq!(attempts.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_sendWithRetry_withPermanentFailure_shouldNotRetry() {
    let attempts = AtomicUsize::new(0);

    let result: Result<(), _> = send_with_retry(3, 1, None, || {
        attempts.fetch_add(1, Ordering::SeqCst);
        async { Err(ProviderError::AuthenticationError("bad key".to_string())) }
    })
    .await;

    assert!(matches!(result, Err(ProviderError::AuthenticationError(_))));
    assert_eq!(attempts.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_sendWithRetry_withRetriesExhausted_shouldReturnLastError() {
    let attempts = AtomicUsize::new(0);

    let result: Result<(), _> = send_with_retry(2, 1, None, || {
        attempts.fetch_add(1, Ordering::SeqCst);
        async { Err(ProviderError::ConnectionError("reset".to_string())) }
    })
    .await;

    assert!(matches!(result, Err(ProviderError::ConnectionError(_))));
    assert_eq!(attempts.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_mockEcho_shouldProduceValidTable() {
    let translator = MockTranslator::echo();
    let reply = translator.translate("instructions", REQUEST).await.unwrap();

    assert!(TableValidator::is_valid(&reply, 3));
    assert!(reply.contains("| ::2:: Test | ::2:: [TRANSLATED] Test |"));
}

#[tokio::test]
async fn test_mockCorruptUnlessSingleRow_shouldOnlyAcceptSingleRows() {
    let translator = MockTranslator::corrupt_unless_single_row();

    let reply = translator.translate("", REQUEST).await.unwrap();
    assert!(!TableValidator::is_valid(&reply, 3));

    let single = "| Original | Translated |\n| --- | --- |\n| ::0:: Hello |     |";
    let reply = translator.translate("", single).await.unwrap();
    assert!(TableValidator::is_valid(&reply, 1));
    assert_eq!(translator.calls(), 2);
}

#[tokio::test]
async fn test_mockAlwaysInvalid_shouldKeepRowCountButFailValidation() {
    let translator = MockTranslator::new(MockBehavior::AlwaysInvalid);
    let reply = translator.translate("", REQUEST).await.unwrap();

    assert_eq!(table_rows(&reply).count(), 3);
    assert!(!TableValidator::is_valid(&reply, 3));
}

#[tokio::test]
async fn test_arcTranslator_shouldDelegate() {
    let mock = Arc::new(MockTranslator::echo());
    let shared: Arc<dyn Translator> = mock.clone();

    shared.translate("", REQUEST).await.unwrap();

    assert_eq!(mock.calls(), 1);
    assert!(shared.name().starts_with("mock"));
}

#[test]
fn test_buildTranslator_withMockProvider_shouldNotNeedKey() {
    let config = TranslationConfig {
        provider: TranslationProvider::Mock,
        ..Default::default()
    };

    let translator = build_translator(&config).unwrap();
    assert_eq!(translator.name(), "mock/echo");
}

#[test]
fn test_buildTranslator_withInvalidEndpoint_shouldFail() {
    let mut config = TranslationConfig::default();
    config.active_provider_config_mut().endpoint = "not a url".to_string();

    assert!(build_translator(&config).is_err());
}

#[test]
fn test_buildTranslator_withOpenAI_shouldNameModel() {
    let config = TranslationConfig::default();
    let translator = build_translator(&config).unwrap();

    assert_eq!(translator.name(), "openai/gpt-3.5-turbo-1106");
}
