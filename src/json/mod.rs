//! Minimal JSON engine
//!
//! - `value`: dynamic value tree (`JsonValue`, `Number`, ordered `Map`)
//! - `parser`: recursive-descent text → value
//! - `serializer`: value → compact text
//!
//! For every finite value `v`, `parse(&serialize(&v)) == v`.

pub mod parser;
pub mod serializer;
pub mod value;

pub use parser::{MAX_DEPTH, parse};
pub use serializer::serialize;
pub use value::{JsonValue, Map, Number};

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    /// Values whose strings match the `text` regex
    fn arb_value(text: &'static str) -> impl Strategy<Value = JsonValue> {
        let leaf = prop_oneof![
            Just(JsonValue::Null),
            any::<bool>().prop_map(JsonValue::Bool),
            any::<i64>().prop_map(JsonValue::from),
            (-1.0e12..1.0e12f64).prop_map(JsonValue::from),
            any::<f64>()
                .prop_filter("finite", |f| f.is_finite())
                .prop_map(JsonValue::from),
            text.prop_map(JsonValue::from),
        ];
        leaf.prop_recursive(4, 64, 8, move |inner| {
            prop_oneof![
                prop::collection::vec(inner.clone(), 0..8).prop_map(JsonValue::Array),
                prop::collection::vec((text, inner), 0..8)
                    .prop_map(|entries| JsonValue::Object(entries.into_iter().collect())),
            ]
        })
    }

    proptest! {
        #[test]
        fn test_round_trip(v in arb_value(".*")) {
            let text = serialize(&v);
            prop_assert_eq!(parse(&text).unwrap(), v);
        }

        // Raw control characters pass through unescaped, which strict parsers reject
        #[test]
        fn test_output_is_standard_json(v in arb_value("[^\\x00-\\x1f]*")) {
            let text = serialize(&v);
            prop_assert!(serde_json::from_str::<serde_json::Value>(&text).is_ok(), "{}", text);
        }
    }

    #[test]
    fn test_ledger_shaped_document_round_trip() {
        let text = r#"{"anchors":{"42":{"x":1.5,"y":-2,"z":3000000.25}}}"#;
        let v = parse(text).unwrap();
        assert_eq!(serialize(&v), text);
    }
}
