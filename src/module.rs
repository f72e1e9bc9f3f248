use crate::{
	apply::DomPatcher,
	error::{Error, Result},
	event::{resolve_marker, EventCapture, EventPayload},
	options::ModuleOptions,
	patch::Frame,
	transport::{method, Transport, XhrTransport},
};
use serde_json::Value;
use std::rc::Rc;
use tracing::{debug, error, instrument, trace};
use wasm_bindgen::throw_val;

/// A server-driven UI mounted on a host element.
///
/// [`Module::run`] attaches the event listeners, `initialize`s the remote side and renders the first frame.
/// After that, each captured event that resolves to an identity marker is dispatched and followed by
/// another `render-frame`, all synchronously inside the browser's event dispatch.
///
/// Dropping the module (or [`Module::dispose`]) detaches its listeners. The host's content is left as is.
#[derive(Debug)]
pub struct Module<T = XhrTransport> {
	channel: Rc<Channel<T>>,
	event_types: Vec<String>,
	state: State,
}

#[derive(Debug)]
enum State {
	Uninitialized,
	/// Listening until dropped.
	Running(#[allow(dead_code)] EventCapture),
}

#[derive(Debug)]
struct Channel<T> {
	transport: T,
	patcher: DomPatcher,
	marker_attribute: String,
}

impl Module<XhrTransport> {
	/// A module that talks to the endpoints described by `options` through synchronous `XMLHttpRequest`s.
	#[must_use]
	pub fn with_xhr(host: web_sys::Element, options: &ModuleOptions) -> Self {
		Self::new(host, options, XhrTransport::new(options.clone()))
	}
}

impl<T: Transport + 'static> Module<T> {
	#[must_use]
	#[instrument(skip(transport))]
	pub fn new(host: web_sys::Element, options: &ModuleOptions, transport: T) -> Self {
		Self {
			channel: Rc::new(Channel {
				transport,
				patcher: DomPatcher::new_for_host(host, options.get_marker_attribute()),
				marker_attribute: options.get_marker_attribute().to_owned(),
			}),
			event_types: options.get_event_types().to_vec(),
			state: State::Uninitialized,
		}
	}

	#[must_use]
	pub fn host(&self) -> &web_sys::Element {
		self.channel.patcher.host()
	}

	#[must_use]
	pub fn transport(&self) -> &T {
		&self.channel.transport
	}

	#[must_use]
	pub fn is_running(&self) -> bool {
		matches!(self.state, State::Running(_))
	}

	/// Starts the module. This can happen only once.
	///
	/// Errors raised later by event handling are thrown into JavaScript from the event listener.
	///
	/// # Errors
	///
	/// [`Error::AlreadyRunning`] on a second call, otherwise iff `initialize` or the first `render-frame` fails.
	/// The listeners stay attached in the latter case.
	#[instrument(skip(self))]
	pub fn run(&mut self) -> Result<()> {
		if self.is_running() {
			return Err(Error::AlreadyRunning);
		}

		let handler: Rc<dyn Fn(&str, web_sys::Event)> = {
			let channel = Rc::clone(&self.channel);
			Rc::new(move |event_type: &str, event: web_sys::Event| {
				if let Err(error) = channel.handle_event(event_type, &event) {
					error!("Handling {:?} event failed: {}", event_type, error);
					throw_val(error.into())
				}
			})
		};
		self.state = State::Running(EventCapture::attach(self.host(), &self.event_types, &handler));

		self.channel.transport.invoke(method::INITIALIZE, &empty_args())?;
		self.channel.render_frame()
	}

	/// Requests and applies a frame outside of event handling.
	///
	/// # Errors
	///
	/// Iff `render-frame` fails, in which case the document is left unchanged.
	pub fn render_frame(&self) -> Result<()> {
		self.channel.render_frame()
	}

	/// Handles `event` as if it had been captured on the host element.
	///
	/// # Errors
	///
	/// Iff `dispatch-event` or the following `render-frame` fails.
	pub fn handle_event(&self, event_type: &str, event: &web_sys::Event) -> Result<()> {
		self.channel.handle_event(event_type, event)
	}

	/// Detaches the event listeners.
	pub fn dispose(self) {
		trace!(running = self.is_running(), "Disposing module.");
	}
}

impl<T: Transport> Channel<T> {
	#[instrument(skip(self))]
	fn render_frame(&self) -> Result<()> {
		let response = self.transport.invoke(method::RENDER_FRAME, &empty_args())?;
		self.patcher.apply_frame(Frame::from_response(response).as_ref());
		Ok(())
	}

	#[instrument(skip(self, event))]
	fn handle_event(&self, event_type: &str, event: &web_sys::Event) -> Result<()> {
		let bid = match resolve_marker(event.target().as_ref(), &self.marker_attribute) {
			Some(bid) if !bid.is_empty() => bid,
			_ => {
				debug!("Caught {} event on target without marker: {:?}", event_type, event.target());
				return Ok(());
			}
		};

		let payload = EventPayload::new(event_type, bid, event);
		trace!(?payload, "Dispatching event.");
		self.transport.invoke(method::DISPATCH_EVENT, &serde_json::to_value(&payload)?)?;

		// Re-render even if nothing changed remotely. An unchanged frame is an empty response.
		self.render_frame()
	}
}

fn empty_args() -> Value {
	Value::String(String::new())
}
