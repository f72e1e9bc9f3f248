#![cfg(target_arch = "wasm32")]

use dom_patch_channel::{apply::DomPatcher, patch::Frame};
use serde_json::{json, Value};
use wasm_bindgen::JsCast;
use wasm_bindgen_test::{wasm_bindgen_test, wasm_bindgen_test_configure};

wasm_bindgen_test_configure!(run_in_browser);

mod web_host_;
use web_host_::host;

fn patch(html: &str, response: Value) -> web_sys::Element {
	let host = host();
	host.set_inner_html(html);
	let patcher = DomPatcher::new_for_host(host.clone(), "_bid");
	patcher.apply_frame(Frame::from_response(response).as_ref());
	host
}

#[wasm_bindgen_test]
fn empty_response_is_idempotent() {
	let html = r#"<ul _bid="1"><li>A</li><li class="x">B</li></ul>"#;
	for response in [json!(null), json!(""), json!({})].iter() {
		let host = patch(html, response.clone());
		assert_eq!(host.inner_html(), html);
	}
}

#[wasm_bindgen_test]
fn create_replaces_content() {
	let host = patch("<p>old</p><p>older</p>", json!({ "create": "<div id=\"x\">hi</div>" }));
	assert_eq!(host.inner_html(), r#"<div id="x">hi</div>"#);
}

#[wasm_bindgen_test]
fn null_create_clears_host() {
	let host = patch("<p>old</p><p>older</p>", json!({ "create": null }));
	assert_eq!(host.inner_html(), "");
	assert_eq!(host.child_nodes().length(), 0);
}

#[wasm_bindgen_test]
fn indices_refer_to_original_children() {
	let host = patch(
		"<ul><li>A</li><li>B</li><li>C</li><li>D</li></ul>",
		json!({ "update": {
			"remove": [1],
			"move": [[0, 3]],
			"insert": [{ "html": "<span>N</span>", "index": 2 }]
		} }),
	);
	assert_eq!(host.inner_html(), "<ul><li>D</li><li>A</li><span>N</span><li>C</li></ul>");
}

#[wasm_bindgen_test]
fn flat_move_and_append() {
	let host = patch(
		"<ol><li>A</li><li>B</li><li>C</li></ol>",
		json!({ "update": {
			"move": [2, 0],
			"insert": [{ "html": "<li>Z</li>", "index": 3 }]
		} }),
	);
	assert_eq!(host.inner_html(), "<ol><li>B</li><li>A</li><li>C</li><li>Z</li></ol>");
}

#[wasm_bindgen_test]
fn nested_updates_before_structure() {
	let host = patch(
		"<div><p>one</p><p>two</p><p>three</p></div>",
		json!({ "update": {
			"update-elements": [
				{ "index": 0, "text": "uno" },
				{ "index": 2, "bid": "t", "update-elements": [{ "index": 0, "text": "tres" }] }
			],
			"remove": [1]
		} }),
	);
	assert_eq!(host.inner_html(), r#"<div><p>uno</p><p _bid="t">tres</p></div>"#);
}

#[wasm_bindgen_test]
fn missing_children_are_skipped() {
	let host = patch(
		"<div><p>a</p></div>",
		json!({ "update": {
			"update-elements": [{ "index": 5, "text": "nope" }, { "index": 0, "text": "yes" }],
			"remove": [9],
			"move": [[0, 7]],
			"bid": "still"
		} }),
	);
	assert_eq!(host.inner_html(), r#"<div _bid="still"><p>yes</p></div>"#);
}

#[wasm_bindgen_test]
fn class_clear_sentinel() {
	let host = patch(r#"<div class="x y"></div>"#, json!({ "update": { "classes": ["a", "__clear__"] } }));
	assert_eq!(host.first_element_child().unwrap().class_name(), "a");

	let host = patch(r#"<div class="x y"></div>"#, json!({ "update": { "classes": ["__clear__"] } }));
	assert_eq!(host.first_element_child().unwrap().class_name(), "");

	let host = patch(r#"<div class="x y"></div>"#, json!({ "update": { "classes": [] } }));
	assert_eq!(host.first_element_child().unwrap().class_name(), "x y");
}

#[wasm_bindgen_test]
fn style_names() {
	let host = patch(
		"<div></div>",
		json!({ "update": { "style": { "backgroundColor": "red", "margin-top": "3px" } } }),
	);
	let style = host.first_element_child().unwrap().dyn_into::<web_sys::HtmlElement>().unwrap().style();
	assert_eq!(style.get_property_value("background-color").unwrap(), "red");
	assert_eq!(style.get_property_value("margin-top").unwrap(), "3px");
}

#[wasm_bindgen_test]
fn longhand_after_shorthand() {
	let host = patch("<div></div>", serde_json::from_str(r#"{"update":{"style":{"margin":"1px","margin-top":"2px"}}}"#).unwrap());
	let style = host.first_element_child().unwrap().dyn_into::<web_sys::HtmlElement>().unwrap().style();
	assert_eq!(style.get_property_value("margin-top").unwrap(), "2px");
	assert_eq!(style.get_property_value("margin-left").unwrap(), "1px");
}

#[wasm_bindgen_test]
fn marker_is_overwritten() {
	let host = patch(r#"<div _bid="old"></div>"#, json!({ "update": { "bid": "new" } }));
	assert_eq!(host.first_element_child().unwrap().get_attribute("_bid").as_deref(), Some("new"));
}

#[wasm_bindgen_test]
fn value_is_mirrored() {
	let host = host();
	host.set_inner_html(r#"<input value="old">"#);
	let input = host.first_element_child().unwrap().dyn_into::<web_sys::HtmlInputElement>().unwrap();
	input.set_value("edited by the user");

	let patcher = DomPatcher::new_for_host(host.clone(), "_bid");
	patcher.apply_frame(Frame::from_response(json!({ "update": { "attrs": { "value": "hello", "title": "t" } } })).as_ref());

	assert_eq!(input.get_attribute("value").as_deref(), Some("hello"));
	assert_eq!(input.value(), "hello");
	assert_eq!(input.get_attribute("title").as_deref(), Some("t"));
}

#[wasm_bindgen_test]
fn text_node_update() {
	let host = patch("<p>a<b>b</b></p>", json!({ "update": { "update-elements": [{ "index": 0, "text": "z" }] } }));
	assert_eq!(host.inner_html(), "<p>z<b>b</b></p>");
}

#[wasm_bindgen_test]
fn update_without_root_element() {
	let host = patch("just text", json!({ "update": { "text": "nope" } }));
	assert_eq!(host.inner_html(), "just text");
	assert_eq!(host.child_nodes().length(), 1);
}
