use fieldfunc::config_tree::{leaf, node, Node};
use fieldfunc::{SimpleValues, Value};
use proptest::prelude::*;

use crate::Fixture;

fn value(name: &str) -> Node {
    node("VALUE", [leaf(name)])
}

proptest! {
    #[test]
    fn sum_matches_integer_sum(numbers in prop::collection::vec(-100_000i64..100_000, 1..8)) {
        let fixture = Fixture::default();
        let names: Vec<String> = (0..numbers.len()).map(|i| format!("n{}", i)).collect();
        let function = fixture
            .parse(&node("SUM", names.iter().map(|name| value(name))))
            .map_err(|e| TestCaseError::fail(e.to_string()))?;

        let values: SimpleValues = names
            .iter()
            .zip(&numbers)
            .map(|(name, n)| (name.clone(), n.to_string()))
            .collect();
        let expected = numbers.iter().sum::<i64>().to_string();
        prop_assert_eq!(function.eval_string(&values), Value::text(expected));
    }

    #[test]
    fn double_negation_matches_truthiness(input in "true|TRUE|True|[a-z]{0,6}") {
        let fixture = Fixture::default();
        let function = fixture
            .parse(&node("NOT", [node("NOT", [value("x")])]))
            .map_err(|e| TestCaseError::fail(e.to_string()))?;
        let values = SimpleValues::new().with("x", input.clone());
        prop_assert_eq!(function.eval_bool(&values), input.eq_ignore_ascii_case("true"));
    }

    #[test]
    fn length_counts_characters(input in "\\PC{0,30}") {
        let fixture = Fixture::default();
        let function = fixture
            .parse(&node("LENGTH", [value("x")]))
            .map_err(|e| TestCaseError::fail(e.to_string()))?;
        let values = SimpleValues::new().with("x", input.clone());
        prop_assert_eq!(
            function.eval_string(&values),
            Value::text(input.chars().count().to_string())
        );
    }

    #[test]
    fn strcmp_of_identical_strings_is_true(input in "[a-zA-Z0-9 ]{0,20}", copies in 2usize..5) {
        let fixture = Fixture::default();
        let function = fixture
            .parse(&node("STRCMP", (0..copies).map(|_| value("x"))))
            .map_err(|e| TestCaseError::fail(e.to_string()))?;
        let values = SimpleValues::new().with("x", input);
        prop_assert_eq!(function.eval_string(&values), Value::text("true"));
        prop_assert!(function.eval_bool(&values));
    }

    #[test]
    fn repeated_evaluation_is_stable(a in -1000i64..1000, b in 1i64..1000) {
        let fixture = Fixture::default();
        let function = fixture
            .parse(&node(
                "DIVIDE",
                [value("a"), node("BY", [value("b")]), node("MAX", [leaf("4")])],
            ))
            .map_err(|e| TestCaseError::fail(e.to_string()))?;
        let values = SimpleValues::new()
            .with("a", a.to_string())
            .with("b", b.to_string());
        let first = function.eval_string(&values);
        prop_assert!(!first.is_error());
        prop_assert_eq!(function.eval_string(&values), first);
    }
}
