//! Property-based tests for payload normalization.
//!
//! Random structured messages must survive normalization with their pairs,
//! order and category intact, and random non-message values must always be
//! rejected with their JSON attached.

use proptest::prelude::*;
use slslog::{Message, NormalizeError, Payload, Severity, TimestampResolver, normalize};

fn severities() -> impl Strategy<Value = Severity> {
    prop::sample::select(Severity::ALL.to_vec())
}

proptest! {
    #[test]
    fn prop_structured_messages_become_one_record_with_every_pair(
        ref pairs in proptest::collection::vec(("[a-z_]{1,8}", "\\PC{0,16}"), 1..6),
        ref category in "[a-z]{0,8}",
        severity in severities(),
    ) {
        let message = Message::from_pairs(pairs.clone()).with_category(category.clone());
        let batch = normalize(&message.clone().into(), severity, &TimestampResolver::default())
            .expect("non-empty message normalizes");

        prop_assert_eq!(batch.topic(), severity.as_str());
        prop_assert_eq!(batch.category(), category.as_str());
        prop_assert_eq!(batch.records().len(), 1);
        prop_assert_eq!(batch.records()[0].contents(), message.pairs.as_slice());
        prop_assert!(batch.records()[0].time() >= 1);
    }

    #[test]
    fn prop_text_is_stored_under_message_key(ref text in "\\PC*", severity in severities()) {
        let batch = normalize(&Payload::from(text.as_str()), severity, &TimestampResolver::default())
            .expect("text normalizes");
        let contents = batch.records()[0].contents();
        prop_assert_eq!(contents.len(), 1);
        prop_assert_eq!(contents[0].key.as_str(), "message");
        prop_assert_eq!(contents[0].value.as_str(), text.as_str());
    }

    #[test]
    fn prop_numbers_are_rejected_with_json(value in any::<i64>(), severity in severities()) {
        let err = normalize(&Payload::from(value), severity, &TimestampResolver::default())
            .expect_err("numbers are unsupported");
        prop_assert_eq!(err, NormalizeError::Unsupported { payload: value.to_string() });
    }
}
