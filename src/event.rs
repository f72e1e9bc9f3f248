//! Capturing DOM events on the host element and routing them to identity markers.

use js_sys::Reflect;
use serde::Serialize;
use serde_json::{Number, Value};
use std::rc::Rc;
use tracing::{error, instrument, trace};
use wasm_bindgen::{closure::Closure, JsCast, JsValue};

/// What `dispatch-event` sends to the remote side.
///
/// ```json
/// { "type": "keyup", "bid": "42", "data": { "keyCode": 13, "value": "typed" } }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventPayload {
	#[serde(rename = "type")]
	pub event_type: String,
	pub bid: String,
	pub data: EventData,
}

/// Event-type-specific fields of an [`EventPayload`].
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EventData {
	/// Only for `keyup`.
	#[serde(rename = "keyCode", skip_serializing_if = "Option::is_none")]
	pub key_code: Option<u32>,
	/// The origin target's current `value`, if it has a non-empty one.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub value: Option<Value>,
}

impl EventPayload {
	#[must_use]
	pub fn new(event_type: &str, bid: String, event: &web_sys::Event) -> Self {
		#[allow(deprecated)]
		let key_code = if event_type == "keyup" {
			event.dyn_ref::<web_sys::KeyboardEvent>().map(web_sys::KeyboardEvent::key_code)
		} else {
			None
		};

		Self {
			event_type: event_type.to_owned(),
			bid,
			data: EventData {
				key_code,
				value: event.target().and_then(|target| current_value(&target)),
			},
		}
	}
}

/// The `value` property of `target`, unless it's missing, empty or zero.
#[allow(clippy::float_cmp)]
fn current_value(target: &JsValue) -> Option<Value> {
	let value = Reflect::get(target, &JsValue::from_str("value")).ok()?;
	if let Some(string) = value.as_string() {
		return if string.is_empty() { None } else { Some(Value::String(string)) };
	}
	value.as_f64().filter(|&n| n != 0.0).and_then(Number::from_f64).map(Value::Number)
}

/// Finds the identity marker of the nearest element at or above `target`.
///
/// The walk stops at the first element that carries `marker_attribute` at all, even if it's empty,
/// or at the document.
#[must_use]
pub fn resolve_marker(target: Option<&web_sys::EventTarget>, marker_attribute: &str) -> Option<String> {
	let mut current = target.and_then(|target| target.dyn_ref::<web_sys::Node>()).cloned();
	while let Some(node) = current {
		if node.node_type() == web_sys::Node::DOCUMENT_NODE {
			break;
		}
		if let Some(element) = node.dyn_ref::<web_sys::Element>() {
			if let Some(marker) = element.get_attribute(marker_attribute) {
				return Some(marker);
			}
		}
		current = node.parent_node();
	}
	None
}

type Listener = Closure<dyn Fn(web_sys::Event)>;

/// Event listeners on a host element, one per event type, relying on bubbling.
///
/// Dropping this removes the listeners again.
pub struct EventCapture {
	host: web_sys::Element,
	listeners: Vec<(String, Listener)>,
}

impl EventCapture {
	/// Calls `handler` with the event type and event for each event of `event_types` that reaches `host`.
	#[instrument(skip(handler))]
	pub fn attach(host: &web_sys::Element, event_types: &[String], handler: &Rc<dyn Fn(&str, web_sys::Event)>) -> Self {
		let mut listeners = Vec::with_capacity(event_types.len());
		for event_type in event_types {
			let listener: Listener = {
				let handler = Rc::clone(handler);
				let event_type = event_type.clone();
				Closure::wrap(Box::new(move |event: web_sys::Event| handler(event_type.as_str(), event)) as Box<dyn Fn(web_sys::Event)>)
			};
			match host.add_event_listener_with_callback(event_type, listener.as_ref().unchecked_ref()) {
				Ok(()) => listeners.push((event_type.clone(), listener)),
				Err(error) => error!("Failed to add event listener {:?}: {:?}", event_type, error),
			}
		}
		trace!("Attached {} event listener(s).", listeners.len());
		Self { host: host.clone(), listeners }
	}

	pub fn event_types(&self) -> impl Iterator<Item = &str> {
		self.listeners.iter().map(|(event_type, _)| event_type.as_str())
	}
}

impl core::fmt::Debug for EventCapture {
	fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
		f.debug_struct("EventCapture")
			.field("host", &self.host)
			.field("event_types", &self.event_types().collect::<Vec<_>>())
			.finish()
	}
}

impl Drop for EventCapture {
	fn drop(&mut self) {
		for (event_type, listener) in self.listeners.drain(..) {
			if let Err(error) = self.host.remove_event_listener_with_callback(&event_type, listener.as_ref().unchecked_ref()) {
				error!("Failed to remove event listener {:?}: {:?}", event_type, error);
			}
		}
	}
}
