// Test the JavaScript shape of values returned by the WASM API
#![cfg(target_arch = "wasm32")]

use js_sys::{Array, Map, Reflect};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_test::*;

use notatio_sinistra::api;

fn get(value: &JsValue, key: &str) -> JsValue {
    Reflect::get(value, &JsValue::from_str(key)).expect("property lookup")
}

fn entered_score() -> JsValue {
    let state = api::create_empty_state().expect("empty state");
    let state = api::add_note(state, "C", 4, "quarter", None).expect("add C");
    let state = api::add_note(state, "F", 4, "quarter", Some("sharp".to_string())).expect("add F#");
    api::state_to_score(state, Some("Two Notes".to_string())).expect("score")
}

#[wasm_bindgen_test]
fn test_sinistra_score_is_a_plain_object() {
    let sinistra = api::transform_to_sinistra(entered_score()).expect("transform");

    assert!(!sinistra.is_instance_of::<Map>(), "flattened score must not become a Map");
    assert_eq!(get(&sinistra, "isTransformed"), JsValue::TRUE);
    assert_eq!(get(&sinistra, "title").as_string().as_deref(), Some("Two Notes"));
    assert!(Array::is_array(&get(&sinistra, "staves")));
    assert!(api::is_sinistra_score(sinistra).expect("detect"));
}

#[wasm_bindgen_test]
fn test_entry_state_round_trips_through_js() {
    let state = api::create_empty_state().expect("empty state");
    assert!(!state.is_instance_of::<Map>());

    let keyed = api::set_key_signature(state.clone(), -3, "minor").expect("set key");
    assert!(api::set_key_signature(keyed.clone(), 9, "major").is_err());
    assert!(api::set_key_signature(keyed.clone(), 2, "lydian").is_err());

    let key = get(&keyed, "keySignature");
    assert_eq!(get(&key, "fifths").as_f64(), Some(-3.0));
    assert_eq!(get(&key, "mode").as_string().as_deref(), Some("minor"));
}
