use std::rc::Rc;

use vmbind_test::prelude::*;

#[test]
fn standard_set_covers_every_category() {
    let set = standard_processors(Rc::new(TemplateProcessor::new()));
    assert_eq!(
        set.categories().collect::<Vec<_>>(),
        ["styles", "attributes", "properties", "events", "template"]
    );
}

#[test]
fn install_keeps_unrelated_processors() {
    let element = ElementId::new("div");
    let binder = Scanner::new().scan(&element);
    let log = ProcessorLog::new();
    log.record_on(&binder, "widgets");
    log.record_on(&binder, "styles");

    install_standard_processors(&binder, Rc::new(TemplateProcessor::new()));
    let processors = binder.processors();
    assert_eq!(processors.len(), 6);
    assert!(processors.contains("widgets"));
}

#[test]
fn values_map_onto_the_element() {
    let harness = Harness::new();
    let a = harness.define(json!({
        "styles": { "width": 10, "color": null },
        "attributes": { "disabled": true, "hidden": false, "title": "x" },
        "properties": { "value": 3 },
    }));
    let root = harness.define_data(Data::object([("a", a.clone().into())]));
    let element = ElementId::new("input").attr("data-viewmodel", "a");
    element.set_style("color", "red");
    element.set_attribute("hidden", "");

    let binder = Scanner::new().scan(&element);
    install_standard_processors(&binder, Rc::new(TemplateProcessor::new()));
    binder.watch(&root).unwrap();

    assert_eq!(element.style("width").as_deref(), Some("10"));
    assert_eq!(element.style("color"), None);
    assert_eq!(element.attribute("disabled").as_deref(), Some(""));
    assert_eq!(element.attribute("hidden"), None);
    assert_eq!(element.attribute("title").as_deref(), Some("x"));
    assert_eq!(element.property("value"), Some(Value::from(3)));

    a.write("attributes.disabled", false).unwrap();
    a.write("styles.color", "blue").unwrap();
    harness.tick();
    assert_eq!(element.attribute("disabled"), None);
    assert_eq!(element.style("color").as_deref(), Some("blue"));
}

#[test]
fn attributes_reject_structured_values() {
    let harness = Harness::new();
    let a = harness.define_data(Data::object([(
        "attributes",
        Data::object([("items", Value::nodes(Vec::new()).into())]),
    )]));
    let root = harness.define_data(Data::object([("a", a.into())]));
    let element = ElementId::new("div").attr("data-viewmodel", "a");
    let binder = Scanner::new().scan(&element);
    install_standard_processors(&binder, Rc::new(TemplateProcessor::new()));

    let err = binder.watch(&root).unwrap_err();
    assert_eq!(err.category(), "attributes");
    assert_eq!(err.key(), "items");
}
