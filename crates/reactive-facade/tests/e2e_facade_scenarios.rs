//! End-to-end scenarios for the delegating facade: construction, field
//! access, the built-in operations, and a UI-style subscriber that mirrors
//! every change into a render log.

#![forbid(unsafe_code)]

use std::cell::RefCell;
use std::rc::Rc;

use reactive_facade::{
    Args, BatchScope, Facade, FacadeConfig, FacadeError, Operation, Outcome, Record,
    UpdateNotify,
};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

fn record(value: Value) -> Record {
    match value {
        Value::Object(map) => map,
        other => panic!("expected object, got {other}"),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct TodoForm {
    title: String,
    done: bool,
    tags: Vec<String>,
}

#[test]
fn update_keeps_untouched_fields() {
    let state = Facade::new(record(json!({"count": 0, "label": "a"})));
    state.update([("count", json!(5))]);
    assert_eq!(state.field("count"), Some(json!(5)));
    assert_eq!(state.field("label"), Some(json!("a")));
}

#[test]
fn set_then_reset() {
    let state = Facade::new(record(json!({"count": 0})));
    state.set("count", 3).unwrap();
    state.reset();
    assert_eq!(state.field("count"), Some(json!(0)));
}

#[test]
fn colliding_name_resolves_to_operation() {
    let state = Facade::new(record(json!({"current": 1})));
    let entry = state.get("current");
    assert_eq!(entry.operation(), Some(Operation::Current));
    assert!(state.has("current"));
}

#[test]
fn snapshot_after_construction_equals_initial() {
    let initial = record(json!({"a": [1, {"b": null}], "c": "d"}));
    let state = Facade::new(initial.clone());
    assert_eq!(state.snapshot(), initial);
}

#[test]
fn typed_form_roundtrip() {
    let form = TodoForm {
        title: "write tests".into(),
        done: false,
        tags: vec!["rust".into()],
    };
    let state = Facade::from_serialize(&form).unwrap();

    state.set("done", true).unwrap();
    state.update([("tags", json!(["rust", "facade"]))]);

    let edited: TodoForm = state.snapshot_as().unwrap();
    assert!(edited.done);
    assert_eq!(edited.tags, ["rust", "facade"]);

    state.reset();
    assert_eq!(state.snapshot_as::<TodoForm>().unwrap(), form);
}

#[test]
fn render_log_follows_changes() {
    let state = Facade::new(record(json!({"count": 0, "label": "idle"})));
    let renders: Rc<RefCell<Vec<String>>> = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&renders);
    let (live, _sub) = state.subscribe(move |r| {
        sink.borrow_mut()
            .push(format!("{} {}", r["count"], r["label"]));
    });

    // Returned immediately, before any notification.
    assert_eq!(live.get("count"), Some(json!(0)));
    assert!(renders.borrow().is_empty());

    state.set("count", 1).unwrap();
    state.set("label", "busy").unwrap();
    assert_eq!(*renders.borrow(), ["1 \"idle\"", "1 \"busy\""]);

    renders.borrow_mut().clear();
    BatchScope::run(|| {
        state.set("count", 2).unwrap();
        state.set("label", "done").unwrap();
    });
    assert_eq!(*renders.borrow(), ["2 \"done\""]);
}

#[test]
fn batched_reset_notifies_once() {
    let config = FacadeConfig::default().with_update_notify(UpdateNotify::Batched);
    let state = Facade::with_config(record(json!({"a": 1, "b": 2})), config);
    state.update([("a", json!(10)), ("b", json!(20))]);

    let hits = Rc::new(std::cell::Cell::new(0u32));
    let counter = Rc::clone(&hits);
    let (_, _sub) = state.subscribe(move |_| counter.set(counter.get() + 1));

    state.reset();
    assert_eq!(hits.get(), 1);
    assert_eq!(state.snapshot(), record(json!({"a": 1, "b": 2})));
}

#[test]
fn name_based_dispatch_loop() {
    let state = Facade::new(record(json!({"count": 0})));

    for name in state.keys() {
        if let Some(op) = state.get(&name).into_operation() {
            let args = match op.operation() {
                Operation::Update => Args::Partial(record(json!({"count": 1}))),
                Operation::Subscribe => Args::Callback(Box::new(|_: &Record| {})),
                _ => Args::None,
            };
            let outcome = op.invoke(args).unwrap();
            if let Outcome::Record(snapshot) = outcome {
                assert!(snapshot.contains_key("count"));
            }
        }
    }
    // `reset` ran after `update` in declaration order.
    assert_eq!(state.field("count"), Some(json!(0)));
}

#[test]
fn rejected_write_is_recoverable() {
    let state = Facade::new(record(json!({"count": 0})));
    match state.set("subscribe", json!(null)) {
        Err(FacadeError::ReservedName { name }) => assert_eq!(name, "subscribe"),
        other => panic!("expected rejection, got {other:?}"),
    }
    state.set("count", 1).unwrap();
    assert_eq!(state.field("count"), Some(json!(1)));
}
