//! Property-based tests for the field grammars

use atlantis_parser::report::grammar::{parse_text, CoordsGrammar, ItemGrammar, UNLIMITED_AMOUNT};
use proptest::prelude::*;
use serde_json::{json, Value};

fn item_name_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        // Single word
        "[a-z]{1,10}",
        // Two words
        "[a-z]{1,8} [a-z]{1,8}",
    ]
    .prop_filter("not the unlimited keyword", |name| !name.starts_with("unlimited"))
}

/// The amount as printed and the amount expected after parsing.
fn amount_strategy() -> impl Strategy<Value = (String, i64)> {
    prop_oneof![
        (1i64..100_000).prop_map(|n| (format!("{n} "), n)),
        Just((String::new(), 1)),
        Just(("unlimited ".to_string(), UNLIMITED_AMOUNT)),
    ]
}

proptest! {
    #[test]
    fn items_keep_their_fields(
        (printed, amount) in amount_strategy(),
        name in item_name_strategy(),
        code in "[A-Z][A-Z0-9]{3}",
        price in proptest::option::of(0i64..10_000),
    ) {
        let mut text = format!("{printed}{name} [{code}]");
        if let Some(price) = price {
            text.push_str(&format!(" at ${price}"));
        }
        let value = Value::from(parse_text(&ItemGrammar, &text).unwrap());
        prop_assert_eq!(&value["amount"], &json!(amount));
        prop_assert_eq!(&value["name"], &json!(name));
        prop_assert_eq!(&value["code"], &json!(code));
        match price {
            Some(price) => prop_assert_eq!(&value["price"], &json!(price)),
            None => prop_assert!(value.get("price").is_none()),
        }
    }

    #[test]
    fn coords_keep_their_components(
        x in 0i64..1000,
        y in 0i64..1000,
        z in proptest::option::of(0i64..10),
        label in proptest::option::of("[a-z]{1,12}"),
    ) {
        // A label is only printed after a level.
        let label = z.and(label);
        let text = match (z, &label) {
            (Some(z), Some(label)) => format!("({x},{y},{z} <{label}>)"),
            (Some(z), None) => format!("({x},{y},{z})"),
            _ => format!("({x},{y})"),
        };
        let value = Value::from(parse_text(&CoordsGrammar, &text).unwrap());
        prop_assert_eq!(&value["x"], &json!(x));
        prop_assert_eq!(&value["y"], &json!(y));
        match z {
            Some(z) => prop_assert_eq!(&value["z"], &json!(z)),
            None => prop_assert!(value.get("z").is_none()),
        }
        match label {
            Some(label) => prop_assert_eq!(&value["label"], &json!(label)),
            None => prop_assert!(value.get("label").is_none()),
        }
    }

    #[test]
    fn item_parser_never_panics(text in "\\PC{0,40}") {
        let _ = parse_text(&ItemGrammar, &text);
    }
}
