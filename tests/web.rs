//! Browser tests for the `WasmStore` bridge.  Run with
//! `wasm-pack test --headless --chrome`.

#![cfg(target_arch = "wasm32")]

use std::cell::Cell;
use std::rc::Rc;

use js_sys::{Array, Function, Object, Promise, Reflect};
use serde_json::{json, Value};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_test::*;

use exchange_store::payload::Payload;
use exchange_store::wasm::{action_from_js, payload_from_js, WasmStore};

wasm_bindgen_test_configure!(run_in_browser);

fn js_object(fields: &[(&str, JsValue)]) -> JsValue {
    let obj = Object::new();
    for (key, value) in fields {
        Reflect::set(&obj, &JsValue::from_str(key), value).unwrap();
    }
    obj.into()
}

fn to_json(value: JsValue) -> Value {
    serde_wasm_bindgen::from_value(value).unwrap()
}

#[wasm_bindgen_test]
fn dispatch_from_js_updates_state() {
    let mut store = WasmStore::new(JsValue::UNDEFINED).unwrap();
    let action = js_object(&[
        ("type", JsValue::from_str("balance/add")),
        ("payload", JsValue::from_f64(5.0)),
    ]);

    let report = to_json(store.dispatch(action).unwrap());
    assert_eq!(report["handledBy"], json!(["balance"]));

    let state = to_json(store.get_state().unwrap());
    assert_eq!(state["balance"]["value"].as_f64(), Some(5.0));
    assert_eq!(state["order"]["items"], json!([]));
}

#[wasm_bindgen_test]
fn unknown_action_is_an_error() {
    let mut store = WasmStore::new(JsValue::UNDEFINED).unwrap();
    let action = js_object(&[("type", JsValue::from_str("wallet/connect"))]);
    assert!(store.dispatch(action).is_err());
}

#[wasm_bindgen_test]
fn js_functions_and_promises_are_opaque() {
    let callback = Function::new_no_args("return 1;");
    let promise = Promise::resolve(&JsValue::from_f64(1.0));
    let payload = js_object(&[
        ("amount", JsValue::from_f64(5.0)),
        ("onDone", callback.into()),
        ("pending", promise.into()),
    ]);

    let leaves: Vec<(String, String)> = payload_from_js(&payload)
        .opaque_leaves("payload")
        .into_iter()
        .map(|(path, o)| (path, o.kind().to_string()))
        .collect();
    assert_eq!(
        leaves,
        vec![
            ("payload.onDone".to_string(), "function".to_string()),
            ("payload.pending".to_string(), "Promise".to_string()),
        ]
    );

    assert!(matches!(payload_from_js(&JsValue::from_f64(f64::NAN)), Payload::Opaque(_)));
    assert!(matches!(payload_from_js(&JsValue::UNDEFINED), Payload::None));
}

#[wasm_bindgen_test]
fn self_referencing_payload_is_opaque() {
    let payload = js_object(&[("amount", JsValue::from_f64(5.0))]);
    Reflect::set(&payload, &JsValue::from_str("self"), &payload).unwrap();
    let list = Array::new();
    list.push(&JsValue::from_f64(1.0));
    list.push(&list);
    Reflect::set(&payload, &JsValue::from_str("list"), &list).unwrap();

    let leaves: Vec<(String, String)> = payload_from_js(&payload)
        .opaque_leaves("payload")
        .into_iter()
        .map(|(path, o)| (path, o.kind().to_string()))
        .collect();
    assert_eq!(
        leaves,
        vec![
            ("payload.self".to_string(), "circular".to_string()),
            ("payload.list[1]".to_string(), "circular".to_string()),
        ]
    );

    // The same object twice without a cycle is plain data.
    let shared = js_object(&[("n", JsValue::from_f64(1.0))]);
    let pair = js_object(&[("a", shared.clone()), ("b", shared)]);
    assert!(payload_from_js(&pair).opaque_leaves("payload").is_empty());
}

#[wasm_bindgen_test]
fn partial_options_keep_exchange_defaults() {
    let options = js_object(&[("logActions", JsValue::TRUE)]);
    let mut store = WasmStore::new(options).unwrap();

    let callback = Function::new_no_args("");
    let order = js_object(&[("onSettled", callback.into())]);
    let action = js_object(&[("type", JsValue::from_str("balance/reset")), ("payload", order)]);
    let report = to_json(store.dispatch(action).unwrap());
    assert_eq!(report["warnings"], json!([]));
}

#[wasm_bindgen_test]
fn enabled_check_reports_warnings_to_js() {
    let options = js_object(&[("serializableCheck", JsValue::TRUE)]);
    let mut store = WasmStore::new(options).unwrap();

    let order = js_object(&[
        ("id", JsValue::from_f64(1.0)),
        ("user", JsValue::from_str("0xabc")),
        ("tokenGet", JsValue::from_str("TKN")),
        ("amountGet", JsValue::from_f64(10.0)),
        ("tokenGive", JsValue::from_str("ETH")),
        ("amountGive", JsValue::from_f64(1.0)),
        ("timestamp", JsValue::from_str("2024-03-01T12:00:00Z")),
        ("onSettled", Function::new_no_args("").into()),
    ]);
    let action = js_object(&[("type", JsValue::from_str("order/place")), ("payload", order)]);

    assert!(action_from_js(&action).is_ok());
    let report = to_json(store.dispatch(action).unwrap());
    assert_eq!(report["handledBy"], json!(["order"]));
    assert_eq!(report["warnings"][0]["path"], "payload.onSettled");
    assert_eq!(report["warnings"][0]["valueKind"], "function");

    let plain = js_object(&[
        ("type", JsValue::from_str("balance/add")),
        ("payload", JsValue::from_f64(3.0)),
    ]);
    let report = to_json(store.dispatch(plain).unwrap());
    assert_eq!(report["warnings"], json!([]));
}

#[wasm_bindgen_test]
fn subscribe_and_unsubscribe_from_js() {
    let mut store = WasmStore::new(JsValue::UNDEFINED).unwrap();
    let calls = Rc::new(Cell::new(0));
    let c = calls.clone();
    let closure = Closure::wrap(Box::new(move || c.set(c.get() + 1)) as Box<dyn FnMut()>);
    let id = store.subscribe(closure.as_ref().unchecked_ref::<Function>().clone());

    let add = || {
        js_object(&[
            ("type", JsValue::from_str("balance/add")),
            ("payload", JsValue::from_f64(1.0)),
        ])
    };
    store.dispatch(add()).unwrap();
    assert_eq!(calls.get(), 1);

    assert!(store.unsubscribe(&id));
    store.dispatch(add()).unwrap();
    assert_eq!(calls.get(), 1);
    assert!(!store.unsubscribe("not-a-uuid"));

    drop(closure);
}
