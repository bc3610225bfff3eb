use vmbind_test::prelude::*;

/// `root(r) -> [section(a) -> [span(a1)], p(b)]`, markers in parentheses.
fn page(marker: &str) -> ElementId {
    let span = ElementId::new("span").attr(marker, "a1");
    let section = ElementId::new("section").attr(marker, "a").child(span);
    let p = ElementId::new("p").attr(marker, "b");
    let plain = ElementId::new("hr");
    ElementId::new("div")
        .attr(marker, "r")
        .child(section)
        .child(plain)
        .child(p)
}

fn paths(binder: &Binder<ElementId>) -> Vec<String> {
    binder
        .handles()
        .iter()
        .map(|handle| handle.model_path().to_string())
        .collect()
}

#[test]
fn stack_walk_visits_siblings_before_nested_children() {
    let root = page("data-viewmodel");
    let binder = Scanner::new().scan(&root);
    assert_eq!(paths(&binder), ["r", "a", "b", "a1"]);
    assert_eq!(binder.handles()[0].target(), &root);
}

#[test]
fn pre_order_walk_is_available() {
    let root = page("data-viewmodel");
    let binder = Scanner::with_visitor(PreOrderVisitor).scan(&root);
    assert_eq!(paths(&binder), ["r", "a", "a1", "b"]);
}

#[test]
fn marker_name_is_configurable() {
    let root = page("data-bind");
    assert!(Scanner::new().scan(&root).is_empty());

    let binder = Scanner::with_marker("data-bind").scan(&root);
    assert_eq!(binder.len(), 4);

    let config = ScanConfig {
        marker: "data-bind".to_string(),
    };
    let binder = Scanner::with_config(StackVisitor, config).scan(&root);
    assert_eq!(binder.len(), 4);
}

#[test]
fn unmarked_leaf_yields_an_empty_binder() {
    let binder = Scanner::new().scan(&ElementId::new("br"));
    assert!(binder.is_empty());
    assert_eq!(Scanner::new().config(), &ScanConfig::default());
    assert_eq!(ScanConfig::default().marker, "data-viewmodel");
}
