//! List rendering through the `template` category.

use std::rc::Rc;

use vmbind_test::prelude::*;

/// A list item: `{ label: { properties: { textContent } } }`.
fn row(harness: &Harness, text: &str) -> (ObservableNode, ObservableNode) {
    let label = harness.define(json!({ "properties": { "textContent": text } }));
    let item = harness.define_data(Data::object([("label", label.clone().into())]));
    (item, label)
}

fn list_of(harness: &Harness, name: &str, items: Vec<ObservableNode>) -> ObservableNode {
    harness.define_data(Data::object([(
        "template",
        Data::object([(name, Value::nodes(items).into())]),
    )]))
}

struct Page {
    root: ObservableNode,
    list: ObservableNode,
    ul: ElementId,
    templates: Rc<TemplateProcessor<ElementId>>,
    _binder: Rc<Binder<ElementId>>,
}

fn page(harness: &Harness, items: Vec<ObservableNode>) -> Page {
    let list = list_of(harness, "row", items);
    let root = harness.define_data(Data::object([("list", list.clone().into())]));
    let ul = ElementId::new("ul").attr("data-viewmodel", "list");
    let templates = Rc::new(
        TemplateProcessor::new().template("row", ElementId::new("li").attr("data-viewmodel", "label")),
    );
    let binder = Scanner::new().scan(&ul);
    install_standard_processors(&binder, templates.clone());
    binder.watch(&root).unwrap();
    Page {
        root,
        list,
        ul,
        templates,
        _binder: binder,
    }
}

fn texts(ul: ElementId) -> Vec<String> {
    ul.children()
        .iter()
        .map(|li| li.property("textContent").unwrap_or_default().to_string())
        .collect()
}

#[test]
fn each_node_gets_a_bound_clone() {
    let harness = Harness::new();
    let (one, _) = row(&harness, "one");
    let (two, _) = row(&harness, "two");
    let page = page(&harness, vec![one.clone(), two.clone()]);

    assert_eq!(
        page.ul.markup(),
        "<ul data-viewmodel=\"list\">\
         <li data-viewmodel=\"label\">one</li>\
         <li data-viewmodel=\"label\">two</li>\
         </ul>"
    );
    assert_eq!(page.templates.rendered_len(&page.ul), 2);
    assert_eq!(one.listener_count(), 1);
    assert!(one.is_active());
}

#[test]
fn item_changes_reach_their_clone() {
    let harness = Harness::new();
    let (one, label_one) = row(&harness, "one");
    let (two, _) = row(&harness, "two");
    let page = page(&harness, vec![one, two]);

    label_one.write("properties.textContent", "uno").unwrap();
    harness.tick();
    assert_eq!(texts(page.ul), ["uno", "two"]);
}

#[test]
fn replacing_the_list_rebuilds_the_children() {
    let harness = Harness::new();
    let (one, label_one) = row(&harness, "one");
    let (two, _) = row(&harness, "two");
    let page = page(&harness, vec![one.clone(), two]);
    let old_children = page.ul.children();

    let (three, _) = row(&harness, "three");
    page.list
        .write("template.row", Value::nodes([three.clone()]))
        .unwrap();
    harness.tick();

    assert_eq!(texts(page.ul), ["three"]);
    assert!(old_children.iter().all(|li| !li.is_valid()));
    assert_eq!(page.templates.rendered_len(&page.ul), 1);
    assert_eq!(one.listener_count(), 0);
    assert!(!one.is_active());
    assert!(three.is_active());

    // The old item is no longer bound to anything visible.
    label_one.write("properties.textContent", "uno").unwrap();
    let report = harness.drain();
    assert!(report.failures.is_empty());
    assert_eq!(texts(page.ul), ["three"]);
}

#[test]
fn empty_list_clears_the_target() {
    let harness = Harness::new();
    let (one, _) = row(&harness, "one");
    let page = page(&harness, vec![one]);
    page.ul.append_child(ElementId::new("p"));
    assert_eq!(page.ul.children().len(), 2);

    page.root
        .write("list.template.row", Value::nodes(Vec::new()))
        .unwrap();
    harness.tick();
    assert!(page.ul.children().is_empty());
    assert_eq!(page.templates.rendered_len(&page.ul), 0);
}

#[test]
fn nested_lists_share_the_processor_set() {
    let harness = Harness::new();
    let (inner_a, _) = row(&harness, "a");
    let (inner_b, _) = row(&harness, "b");
    let sub = list_of(&harness, "row", vec![inner_a, inner_b]);
    let outer_label = harness.define(json!({ "properties": { "textContent": "outer" } }));
    let outer = harness.define_data(Data::object([
        ("label", outer_label.into()),
        ("sub", sub.into()),
    ]));
    let list = list_of(&harness, "row", vec![outer]);
    let root = harness.define_data(Data::object([("list", list.into())]));

    let prototype = ElementId::new("li")
        .child(ElementId::new("span").attr("data-viewmodel", "label"))
        .child(ElementId::new("ul").attr("data-viewmodel", "sub"));
    let templates = Rc::new(TemplateProcessor::new().template("row", prototype));
    let ul = ElementId::new("ul").attr("data-viewmodel", "list");
    let binder = Scanner::new().scan(&ul);
    install_standard_processors(&binder, templates.clone());
    binder.watch(&root).unwrap();

    let outer_li = ul.first_child().unwrap();
    let span = outer_li.first_child().unwrap();
    let inner_ul = span.next_sibling().unwrap();
    assert_eq!(span.property("textContent"), Some(Value::from("outer")));
    assert_eq!(templates.rendered_len(&ul), 1);
    assert_eq!(templates.rendered_len(&inner_ul), 2);

    let inner_texts: Vec<_> = inner_ul
        .children()
        .iter()
        .map(|li| li.first_child().unwrap().property("textContent").unwrap())
        .collect();
    assert_eq!(inner_texts, [Value::from("a"), Value::from("b")]);
}

#[test]
fn removing_an_item_tears_down_its_nested_list() {
    let harness = Harness::new();
    let (inner_a, inner_label) = row(&harness, "a");
    let sub = list_of(&harness, "row", vec![inner_a.clone()]);
    let outer = harness.define_data(Data::object([("sub", sub.into())]));
    let list = list_of(&harness, "row", vec![outer.clone()]);
    let root = harness.define_data(Data::object([("list", list.clone().into())]));

    let prototype = ElementId::new("li")
        .child(ElementId::new("span").attr("data-viewmodel", "label"))
        .child(ElementId::new("ul").attr("data-viewmodel", "sub"));
    let templates = Rc::new(TemplateProcessor::new().template("row", prototype));
    let ul = ElementId::new("ul").attr("data-viewmodel", "list");
    let binder = Scanner::new().scan(&ul);
    install_standard_processors(&binder, templates.clone());
    binder.watch(&root).unwrap();

    let inner_ul = ul.first_child().unwrap().children()[1];
    let inner_li = inner_ul.first_child().unwrap();
    assert_eq!(templates.rendered_len(&inner_ul), 1);
    assert!(inner_a.is_active());

    list.write("template.row", Value::nodes(Vec::new())).unwrap();
    harness.tick();

    assert!(ul.children().is_empty());
    assert!(!inner_ul.is_valid());
    assert!(!inner_li.is_valid());
    assert_eq!(templates.rendered_len(&inner_ul), 0);
    assert_eq!(outer.listener_count(), 0);
    assert_eq!(inner_a.listener_count(), 0);
    assert!(!inner_a.is_active());

    inner_label.write("properties.textContent", "gone").unwrap();
    let report = harness.drain();
    assert!(report.failures.is_empty());
    assert!(!inner_a.is_active());
}

#[test]
fn unknown_template_fails_the_render() {
    let harness = Harness::new();
    let (one, _) = row(&harness, "one");
    let list = list_of(&harness, "missing", vec![one]);
    let root = harness.define_data(Data::object([("list", list.into())]));
    let ul = ElementId::new("ul").attr("data-viewmodel", "list");
    let binder = Scanner::new().scan(&ul);
    install_standard_processors(&binder, Rc::new(TemplateProcessor::new()));

    let err = binder.watch(&root).unwrap_err();
    assert_eq!(err.category(), "template");
    assert!(matches!(
        err,
        BindError::Process {
            source: ProcessError::UnknownTemplate(ref name),
            ..
        } if name == "missing"
    ));
    assert!(ul.children().is_empty());
}

#[test]
fn template_value_must_be_a_node_list() {
    let harness = Harness::new();
    let list = harness.define(json!({ "template": { "row": "not a list" } }));
    let root = harness.define_data(Data::object([("list", list.into())]));
    let ul = ElementId::new("ul").attr("data-viewmodel", "list");
    let binder = Scanner::new().scan(&ul);
    let templates = TemplateProcessor::new().template("row", ElementId::new("li"));
    install_standard_processors(&binder, Rc::new(templates));

    let err = binder.watch(&root).unwrap_err();
    assert!(matches!(
        err,
        BindError::Process {
            source: ProcessError::UnexpectedValue {
                expected: "node list",
                found: "text",
                ..
            },
            ..
        }
    ));
}
