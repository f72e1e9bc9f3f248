#![cfg(target_arch = "wasm32")]
#![allow(dead_code)]

use dom_patch_channel::{transport::decode_response, Result, Transport};
use serde_json::Value;
use std::{cell::RefCell, collections::VecDeque, rc::Rc, sync::Once};
use wasm_bindgen::JsCast;
use web_sys::{window, HtmlBodyElement};

static LOG_INITIALIZED: Once = Once::new();

pub fn init_logging() {
	//TODO: Fail on Warning or Error.
	LOG_INITIALIZED.call_once(tracing_wasm::set_as_global_default);
}

/// A fresh, empty host element attached to the document body.
pub fn host() -> web_sys::Element {
	init_logging();
	let document = window().unwrap().document().unwrap();
	let body = document.body().unwrap().dyn_into::<HtmlBodyElement>().unwrap();
	let host = document.create_element("div").unwrap();
	body.append_child(&host).unwrap();
	host
}

/// Answers each call with the next scripted response body, or `null` once they run out, and records the calls.
#[derive(Debug, Clone, Default)]
pub struct ScriptedTransport {
	responses: Rc<RefCell<VecDeque<&'static str>>>,
	calls: Rc<RefCell<Vec<(String, Value)>>>,
}

impl ScriptedTransport {
	pub fn new(responses: &[&'static str]) -> Self {
		let transport = Self::default();
		transport.responses.borrow_mut().extend(responses);
		transport
	}

	pub fn respond(&self, response: &'static str) {
		self.responses.borrow_mut().push_back(response);
	}

	pub fn calls(&self) -> Vec<(String, Value)> {
		self.calls.borrow().clone()
	}

	pub fn methods(&self) -> Vec<String> {
		self.calls.borrow().iter().map(|(method, _)| method.clone()).collect()
	}
}

impl Transport for ScriptedTransport {
	fn invoke(&self, method: &str, args: &Value) -> Result<Value> {
		self.calls.borrow_mut().push((method.to_owned(), args.clone()));
		let response = self.responses.borrow_mut().pop_front().unwrap_or("null");
		decode_response(response)
	}
}
