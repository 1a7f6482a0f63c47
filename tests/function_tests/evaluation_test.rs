use std::collections::HashSet;
use std::sync::Arc;
use std::thread;

use fieldfunc::config_tree::{leaf, node, Node};
use fieldfunc::dialog::StaticDialog;
use fieldfunc::{ConfigError, ConfigResult, EngineConfig, NoValues, SimpleValues, Value, ERROR_TEXT};
use pretty_assertions::assert_eq;

use crate::Fixture;

fn value(name: &str) -> Node {
    node("VALUE", [leaf(name)])
}

#[test]
fn test_salutation_block() -> ConfigResult<()> {
    let fixture = Fixture::default();
    let tree = node(
        "SELECT",
        [
            node(
                "IF",
                [
                    node("STRCMP", [value("Anrede"), leaf("Herr")]),
                    node("THEN", [leaf("Sehr geehrter Herr "), value("Nachname")]),
                ],
            ),
            node(
                "IF",
                [
                    node("STRCMP", [value("Anrede"), leaf("Frau")]),
                    node("THEN", [leaf("Sehr geehrte Frau "), value("Nachname")]),
                ],
            ),
            leaf("Sehr geehrte Damen und Herren"),
            node("ONERROR", [leaf("Guten Tag")]),
        ],
    );
    let function = fixture.parse(&tree)?;

    let values = SimpleValues::new()
        .with("Anrede", "Frau")
        .with("Nachname", "Meier");
    assert_eq!(
        function.eval_string(&values),
        Value::text("Sehr geehrte Frau Meier")
    );

    let values = SimpleValues::new()
        .with("Anrede", "Firma")
        .with("Nachname", "Meier");
    assert_eq!(
        function.eval_string(&values),
        Value::text("Sehr geehrte Damen und Herren")
    );

    assert_eq!(function.eval_string(&NoValues), Value::text("Guten Tag"));

    let params: Vec<&str> = function.parameters().iter().map(String::as_str).collect();
    assert_eq!(params, vec!["Anrede", "Nachname"]);
    Ok(())
}

#[test]
fn test_double_negation() -> ConfigResult<()> {
    let fixture = Fixture::default();
    let function = fixture.parse(&node("NOT", [node("NOT", [value("x")])]))?;
    for (input, expected) in [("true", true), ("TRUE", true), ("false", false), ("", false)] {
        let values = SimpleValues::new().with("x", input);
        assert_eq!(function.eval_bool(&values), expected, "{:?}", input);
    }
    assert_eq!(function.eval_string(&NoValues), Value::Error);
    Ok(())
}

#[test]
fn test_error_text_from_input_is_not_the_sentinel() -> ConfigResult<()> {
    let fixture = Fixture::default();
    let values = SimpleValues::new().with("x", ERROR_TEXT);

    let cat = fixture.parse(&node("CAT", [value("x"), leaf("!")]))?;
    assert_eq!(
        cat.eval_string(&values),
        Value::text(format!("{}!", ERROR_TEXT))
    );

    let check = fixture.parse(&node(
        "CAT",
        [
            node("ISERROR", [value("x")]),
            leaf("/"),
            node("ISERRORSTRING", [value("x")]),
        ],
    ))?;
    assert_eq!(check.eval_string(&values), Value::text("false/true"));
    Ok(())
}

#[test]
fn test_evaluation_is_idempotent() -> ConfigResult<()> {
    let fixture = Fixture::default();
    let function = fixture.parse(&node(
        "CAT",
        [
            node("SUM", [value("a"), leaf("1")]),
            leaf(" "),
            node("DIVIDE", [value("a"), node("BY", [leaf("3")]), node("MAX", [leaf("3")])]),
        ],
    ))?;
    let values = SimpleValues::new().with("a", "2");
    let first = function.eval_string(&values);
    for _ in 0..5 {
        assert_eq!(function.eval_string(&values), first);
    }
    assert_eq!(first, Value::text("3 0.667"));
    Ok(())
}

#[test]
fn test_concurrent_evaluation_of_one_tree() -> ConfigResult<()> {
    let fixture = Fixture::default();
    let function = fixture.parse(&node(
        "PRODUCT",
        [value("n"), node("SUM", [value("n"), leaf("1")])],
    ))?;

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let function = Arc::clone(&function);
            thread::spawn(move || {
                let values = SimpleValues::new().with("n", i.to_string());
                (0..100)
                    .map(|_| function.eval_string(&values))
                    .collect::<Vec<_>>()
            })
        })
        .collect();

    for (i, handle) in handles.into_iter().enumerate() {
        let results = handle.join().expect("evaluation thread panicked");
        let expected = Value::text((i * (i + 1)).to_string());
        assert!(results.iter().all(|result| *result == expected));
    }
    Ok(())
}

#[test]
fn test_dialog_references_through_composition() -> ConfigResult<()> {
    let mut fixture = Fixture::default();
    fixture
        .dialogs
        .add("Absender", Arc::new(StaticDialog::new().with("Name", "Amt")));
    fixture
        .dialogs
        .add("Empfaenger", Arc::new(StaticDialog::new().with("Name", "Meier")));

    let function = fixture.parse(&node(
        "BIND",
        [
            node(
                "FUNCTION",
                [node("CAT", [value("p"), node("DIALOG", [leaf("Absender"), leaf("Name")])])],
            ),
            node("SET", [leaf("p"), node("DIALOG", [leaf("Empfaenger"), leaf("Name")])]),
        ],
    ))?;

    let mut references = HashSet::new();
    function.dialog_references(&mut references);
    let mut references: Vec<String> = references.into_iter().collect();
    references.sort();
    assert_eq!(references, vec!["Absender".to_string(), "Empfaenger".to_string()]);
    assert_eq!(function.eval_string(&NoValues), Value::text("MeierAmt"));
    assert!(function.parameters().is_empty());
    Ok(())
}

#[test]
fn test_decimal_comma_end_to_end() -> ConfigResult<()> {
    let fixture = Fixture::with_config(EngineConfig::default().with_decimal_separator(','));
    let function = fixture.parse(&node(
        "DIVIDE",
        [
            node("SUM", [value("netto"), value("mwst")]),
            node("BY", [leaf("3")]),
            node("MIN", [leaf("2")]),
            node("MAX", [leaf("2")]),
        ],
    ))?;
    let values = SimpleValues::new().with("netto", "10,5").with("mwst", "1,5");
    assert_eq!(function.eval_string(&values), Value::text("4,00"));
    Ok(())
}

#[test]
fn test_parse_errors_carry_bounded_excerpt() {
    let fixture = Fixture::with_config(EngineConfig {
        error_excerpt_len: 12,
        ..EngineConfig::default()
    });
    let tree = node("UNKNOWN", [leaf("a very long argument that goes on")]);
    match fixture.parse(&tree) {
        Err(ConfigError::UnknownFunction { name, excerpt }) => {
            assert_eq!(name, "UNKNOWN");
            assert_eq!(excerpt, "UNKNOWN(\"a v");
        }
        other => panic!("unexpected result: {:?}", other),
    }

    let nameless = fixture.parse(&node("", [leaf("x")]));
    assert!(matches!(nameless, Err(ConfigError::MissingFunctionName { .. })));
}

#[test]
fn test_out_of_range_numbers_are_errors() -> ConfigResult<()> {
    let fixture = Fixture::default();
    let sum = fixture.parse(&node("SUM", [value("x"), leaf("1")]))?;
    let format = fixture.parse(&node("FORMAT", [value("x"), node("MAX", [leaf("2")])]))?;

    for input in ["1e3000000000", "1e-3000000000", "1e99999999999"] {
        let values = SimpleValues::new().with("x", input);
        assert_eq!(sum.eval_string(&values), Value::Error, "{}", input);
        assert_eq!(format.eval_string(&values), Value::Error, "{}", input);
    }

    let values = SimpleValues::new().with("x", "1e3");
    assert_eq!(sum.eval_string(&values), Value::text("1001"));
    Ok(())
}

#[test]
fn test_replacement_group_followed_by_text() -> ConfigResult<()> {
    let fixture = Fixture::default();
    let function = fixture.parse(&node(
        "REPLACE",
        [value("betrag"), leaf("(\\d+)"), leaf("\\$$1x")],
    ))?;
    let values = SimpleValues::new().with("betrag", "12 und 3");
    assert_eq!(function.eval_string(&values), Value::text("$12x und $3x"));
    Ok(())
}
