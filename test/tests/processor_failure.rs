//! A failing processor aborts the rest of its pass and nothing else.

use vmbind_test::prelude::*;

fn setup(harness: &Harness) -> (ObservableNode, ObservableNode, ElementId) {
    let a = harness.define(json!({ "styles": { "color": "red", "width": "1px" } }));
    let root = harness.define_data(Data::object([("a", a.clone().into())]));
    let div = ElementId::new("div").attr("data-viewmodel", "a");
    (root, a, div)
}

#[test]
fn failure_aborts_the_remaining_batch() {
    let harness = Harness::new();
    let log = ProcessorLog::new();
    let (root, a, div) = setup(&harness);
    let binder = Scanner::new().scan(&div);
    binder.add_processor("styles", failing_on(&log, "styles", Value::from("bad")));
    binder.watch(&root).unwrap();
    log.clear();

    a.write("styles.color", "bad").unwrap();
    a.write("styles.width", "2px").unwrap();
    let report = harness.drain();

    assert_eq!(report.failures.len(), 1);
    let err = report.failures[0].downcast_ref::<BindError>().unwrap();
    assert_eq!(err.category(), "styles");
    assert_eq!(err.key(), "color");
    assert!(log.is_empty(), "width must not be applied after the failure");
    assert!(!root.has_pending());
}

#[test]
fn next_cycle_is_unaffected() {
    let harness = Harness::new();
    let log = ProcessorLog::new();
    let (root, a, div) = setup(&harness);
    let binder = Scanner::new().scan(&div);
    binder.add_processor("styles", failing_on(&log, "styles", Value::from("bad")));
    binder.watch(&root).unwrap();
    log.clear();

    a.write("styles.color", "bad").unwrap();
    assert_eq!(harness.drain().failures.len(), 1);

    a.write("styles.width", "3px").unwrap();
    let report = harness.drain();
    assert!(report.failures.is_empty());
    assert_eq!(log.pairs("styles"), [("width".to_string(), Value::from("3px"))]);
}

#[test]
fn failing_render_is_reported_by_watch() {
    let harness = Harness::new();
    let log = ProcessorLog::new();
    let (root, _a, div) = setup(&harness);
    let binder = Scanner::new().scan(&div);
    binder.add_processor("styles", failing_on(&log, "styles", Value::from("red")));

    let err = binder.watch(&root).unwrap_err();
    assert_eq!(err.key(), "color");
    assert!(matches!(
        err,
        BindError::Process {
            source: ProcessError::Custom(_),
            ..
        }
    ));
    // `width` comes after `color` and was never reached.
    assert!(log.is_empty());
    // The subscription itself is in place.
    assert_eq!(root.listener_count(), 1);
}
