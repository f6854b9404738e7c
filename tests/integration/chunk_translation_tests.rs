/*!
 * End-to-end tests of chunk translation: encode, translate, validate, decode
 * and bisection retry
 */

use std::sync::Arc;

use async_trait::async_trait;

use subtable::errors::{ProviderError, TranslationError};
use subtable::providers::Translator;
use subtable::providers::mock::MockTranslator;
use subtable::translation::table::{TABLE_HEADER, TABLE_SEPARATOR, table_rows};
use subtable::translation::{ChunkTranslator, Chunker, WordTokenCounter};
use crate::common;

/// Echoes translations but returns multi-row tables in reverse row order,
/// each row keeping its own marker in both columns
#[derive(Debug)]
struct ReversingTranslator {
    echo: MockTranslator,
}

#[async_trait]
impl Translator for ReversingTranslator {
    async fn translate(&self, instructions: &str, table: &str) -> Result<String, ProviderError> {
        let reply = self.echo.translate(instructions, table).await?;
        let mut rows: Vec<&str> = table_rows(&reply).collect();
        rows.reverse();
        Ok(format!("{}\n{}\n{}", TABLE_HEADER, TABLE_SEPARATOR, rows.join("\n")))
    }

    fn name(&self) -> String {
        "reversing".to_string()
    }
}

#[tokio::test]
async fn test_translateChunk_withEchoTranslator_shouldTranslateInOrderKeepingTiming() {
    common::init_logging();
    let mock = Arc::new(MockTranslator::echo());
    let translator = ChunkTranslator::new(common::test_context(mock.clone(), 1000));
    let input = common::entries(&["Hello", "World", "Test"]);

    let counter = WordTokenCounter;
    let chunks: Vec<_> = Chunker::new(&counter, 1000).chunks(input.clone()).collect();
    assert_eq!(chunks.len(), 1);

    let output = translator.translate_chunk(&chunks[0].entries, "en", "fr").await.unwrap();

    assert_eq!(
        output.iter().map(|e| e.text.as_str()).collect::<Vec<_>>(),
        ["[TRANSLATED] Hello", "[TRANSLATED] World", "[TRANSLATED] Test"]
    );
    for (translated, original) in output.iter().zip(&input) {
        assert_eq!(translated.seq_num, original.seq_num);
        assert_eq!(translated.start_time_ms, original.start_time_ms);
        assert_eq!(translated.end_time_ms, original.end_time_ms);
    }
    assert_eq!(mock.calls(), 1);
    assert_eq!(translator.bisections(), 0);
}

#[tokio::test]
async fn test_translateChunk_withCorruptMultiRowReplies_shouldBisectDownToSingletons() {
    common::init_logging();
    let mock = Arc::new(MockTranslator::corrupt_unless_single_row());
    let translator = ChunkTranslator::new(common::test_context(mock.clone(), 1000));
    let input = common::entries(&["one", "two", "three", "four"]);

    let output = translator.translate_chunk(&input, "en", "de").await.unwrap();

    assert_eq!(
        output.iter().map(|e| e.text.as_str()).collect::<Vec<_>>(),
        ["[TRANSLATED] one", "[TRANSLATED] two", "[TRANSLATED] three", "[TRANSLATED] four"]
    );
    assert_eq!(output.iter().map(|e| e.seq_num).collect::<Vec<_>>(), vec![1, 2, 3, 4]);
    // 4 -> 2 + 2 -> 1 + 1 + 1 + 1
    assert_eq!(mock.calls(), 7);
    assert!(mock.calls() <= 2 * input.len() - 1);
    assert_eq!(translator.requests(), 7);
    assert_eq!(translator.bisections(), 3);
}

#[tokio::test]
async fn test_translateChunk_withOddLength_shouldStayWithinRequestBound() {
    let mock = Arc::new(MockTranslator::corrupt_unless_single_row());
    let translator = ChunkTranslator::new(common::test_context(mock.clone(), 1000));
    let input = common::entries(&["a", "b", "c", "d", "e"]);

    let output = translator.translate_chunk(&input, "en", "it").await.unwrap();

    assert_eq!(output.len(), 5);
    assert_eq!(output[4].text, "[TRANSLATED] e");
    assert!(mock.calls() <= 2 * input.len() - 1);
}

#[tokio::test]
async fn test_translateChunk_withSingleAlwaysInvalidEntry_shouldBeUnrecoverable() {
    common::init_logging();
    let mock = Arc::new(MockTranslator::always_invalid());
    let translator = ChunkTranslator::new(common::test_context(mock.clone(), 1000));
    let input = vec![subtable::SubtitleEntry::new(9, 62_003, 63_000, "Stubborn".to_string())];

    let result = translator.translate_chunk(&input, "en", "fr").await;

    match result {
        Err(TranslationError::Unrecoverable { seq_num, start, reason }) => {
            assert_eq!(seq_num, 9);
            assert_eq!(start, "00:01:02,003");
            assert!(reason.contains("empty cell"));
        }
        other => panic!("expected an unrecoverable failure, got {:?}", other),
    }
    assert_eq!(mock.calls(), 1);
}

#[tokio::test]
async fn test_translateChunk_withAlwaysInvalidChunk_shouldFailOnFirstSingleton() {
    let mock = Arc::new(MockTranslator::always_invalid());
    let translator = ChunkTranslator::new(common::test_context(mock.clone(), 1000));
    let input = common::entries(&["a", "b", "c", "d"]);

    let result = translator.translate_chunk(&input, "en", "fr").await;

    assert!(matches!(result, Err(TranslationError::Unrecoverable { seq_num: 1, .. })));
    // 4 -> 2 -> first singleton fails
    assert_eq!(mock.calls(), 3);
}

#[tokio::test]
async fn test_translateChunk_withReorderedRows_shouldBisectInsteadOfMisassigning() {
    let echo = MockTranslator::echo();
    let translator = ChunkTranslator::new(common::test_context(
        Arc::new(ReversingTranslator { echo: echo.clone() }),
        1000,
    ));
    let input = common::entries(&["Hello", "World"]);

    let output = translator.translate_chunk(&input, "en", "fr").await.unwrap();

    assert_eq!(
        output.iter().map(|e| (e.seq_num, e.text.as_str())).collect::<Vec<_>>(),
        [(1, "[TRANSLATED] Hello"), (2, "[TRANSLATED] World")]
    );
    // 2 -> 1 + 1
    assert_eq!(echo.calls(), 3);
    assert_eq!(translator.bisections(), 1);
}
