use std::sync::Arc;

use fieldfunc::config_tree::{leaf, node};
use fieldfunc::{ConfigResult, Function, FunctionLibrary, NoValues, SimpleValues, Value};
use pretty_assertions::assert_eq;

use crate::Fixture;

#[test]
fn test_chained_lookup_and_shadowing() {
    let global = Arc::new(FunctionLibrary::new());
    global.add("Gruss", Function::literal("Hallo"));
    global.add("Abschied", Function::literal("Tschuess"));

    let document = FunctionLibrary::with_parent(Arc::clone(&global));
    document.add("Gruss", Function::literal("Servus"));

    let gruss = document.get("Gruss").map(|f| f.eval_string(&NoValues));
    assert_eq!(gruss, Some(Value::text("Servus")));
    let abschied = document.get("Abschied").map(|f| f.eval_string(&NoValues));
    assert_eq!(abschied, Some(Value::text("Tschuess")));
    assert_eq!(document.len(), 1);

    let mut names = document.names();
    names.sort();
    assert_eq!(names, vec!["Abschied".to_string(), "Gruss".to_string()]);
}

#[test]
fn test_remove_clears_whole_chain() {
    let root = Arc::new(FunctionLibrary::new());
    root.add("F", Function::literal("root"));
    let middle = Arc::new(FunctionLibrary::with_parent(Arc::clone(&root)));
    middle.add("F", Function::literal("middle"));
    let leaf_library = FunctionLibrary::with_parent(Arc::clone(&middle));

    assert!(leaf_library.has_function("F"));
    assert!(leaf_library.remove("F"));
    assert!(!middle.has_function("F"));
    assert!(!root.has_function("F"));
}

#[test]
fn test_bind_resolves_from_parent_library() -> ConfigResult<()> {
    let fixture = Fixture::default();
    fixture.library.add(
        "Anschrift",
        fixture.parse(&node(
            "CAT",
            [
                node("VALUE", [leaf("Strasse")]),
                leaf(", "),
                node("VALUE", [leaf("Ort")]),
            ],
        ))?,
    );

    let document = FunctionLibrary::with_parent(Arc::clone(&fixture.library));
    let bind = fixture.factory.parse(
        &node(
            "BIND",
            [
                node("FUNCTION", [leaf("Anschrift")]),
                node("SET", [leaf("Ort"), leaf("München")]),
            ],
        ),
        &document,
        &fixture.dialogs,
        Some(&fixture.session),
    )?;

    let values = SimpleValues::new().with("Strasse", "Marienplatz 8");
    assert_eq!(
        bind.eval_string(&values),
        Value::text("Marienplatz 8, München")
    );
    let params: Vec<&str> = bind.parameters().iter().map(String::as_str).collect();
    assert_eq!(params, vec!["Strasse"]);
    Ok(())
}

#[test]
fn test_concurrent_readers() {
    let library = Arc::new(FunctionLibrary::ordered(None));
    for i in 0..50 {
        library.add(format!("F{}", i), Function::literal(i.to_string()));
    }

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let library = Arc::clone(&library);
            std::thread::spawn(move || (0..50).all(|i| library.has_function(&format!("F{}", i))))
        })
        .collect();
    for handle in handles {
        assert!(handle.join().expect("reader thread panicked"));
    }
    assert_eq!(library.functions().len(), 50);
}
