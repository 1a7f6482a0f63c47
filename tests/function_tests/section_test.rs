use std::sync::Arc;

use fieldfunc::analyzer::FUNCTIONS_SECTION;
use fieldfunc::config_tree::{leaf, node, Node};
use fieldfunc::{FunctionLibrary, NoValues, SimpleValues, Value};
use pretty_assertions::assert_eq;

use crate::Fixture;

fn configuration() -> Node {
    node(
        "Konfiguration",
        [node(
            FUNCTIONS_SECTION,
            [
                node("Eins", [leaf("1")]),
                node("Kaputt", [node("NOPE", [leaf("x")])]),
                node("Leer", []),
                node(
                    "Zwei",
                    [node("SUM", [node("BIND", [node("FUNCTION", [leaf("Eins")])]), leaf("1")])],
                ),
                node("Beides", [leaf("true"), node("VALUE", [leaf("flag")])]),
            ],
        )],
    )
}

#[test]
fn test_parse_functions_skips_broken_definitions() {
    let fixture = Fixture::default();
    let added = fixture.factory.parse_functions(
        &configuration(),
        FUNCTIONS_SECTION,
        &fixture.library,
        &fixture.dialogs,
        Some(&fixture.session),
    );

    assert_eq!(added, 3);
    assert!(!fixture.library.has_function("Kaputt"));
    assert!(!fixture.library.has_function("Leer"));

    let zwei = fixture.library.get("Zwei").map(|f| f.eval_string(&NoValues));
    assert_eq!(zwei, Some(Value::text("2")));

    let beides = fixture.library.get("Beides");
    let values = SimpleValues::new().with("flag", "true");
    assert_eq!(beides.map(|f| f.eval_bool(&values)), Some(true));
}

#[test]
fn test_parse_function_library_on_top_of_base() {
    let fixture = Fixture::default();
    let base = Arc::new(FunctionLibrary::new());
    base.add("Basis", fieldfunc::Function::literal("b"));

    let library = fixture.factory.parse_function_library(
        &configuration(),
        &fixture.dialogs,
        None,
        Some(Arc::clone(&base)),
    );
    assert!(library.has_function("Eins"));
    assert!(library.has_function("Basis"));
    assert!(!base.has_function("Eins"));
}

#[test]
fn test_parse_trafos() {
    let fixture = Fixture::default();
    let conf = node(
        "Datenquelle",
        [node(
            "Spaltenumsetzung",
            [
                node(
                    "Anrede",
                    [node("IF", [
                        node("STRCMP", [node("VALUE", [leaf("Geschlecht")]), leaf("w")]),
                        node("THEN", [leaf("Frau")]),
                        node("ELSE", [leaf("Herr")]),
                    ])],
                ),
                node("Leer", []),
                node("Kaputt", [node("MATCH", [leaf("x")])]),
            ],
        )],
    );

    let trafos = fixture.factory.parse_trafos(
        &conf,
        "Spaltenumsetzung",
        &fixture.library,
        &fixture.dialogs,
        None,
    );
    assert_eq!(trafos.len(), 1);
    let anrede = &trafos["Anrede"];
    let values = SimpleValues::new().with("Geschlecht", "w");
    assert_eq!(anrede.eval_string(&values), Value::text("Frau"));
}

#[test]
fn test_function_library_from_legacy_section() {
    let fixture = Fixture::default();
    let conf = node(
        "Formular",
        [node("Funktionen", [node("Gruss", [leaf("Servus")])])],
    );
    let library = fixture
        .factory
        .parse_function_library(&conf, &fixture.dialogs, None, None);
    let gruss = library.get("Gruss").map(|f| f.eval_string(&NoValues));
    assert_eq!(gruss, Some(Value::text("Servus")));
}
