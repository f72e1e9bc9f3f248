//! The blocking request/response channel to the remote side.
//!
//! Every call blocks the calling JavaScript turn until the response has arrived. This keeps a `dispatch-event`
//! and the following `render-frame` strictly ordered, and lets a frame be applied before control returns to the
//! browser's event loop, so the document never shows a mix of two frames.

use crate::{
	error::{Error, Result},
	options::{ModuleOptions, CONTENT_TYPE},
};
use serde_json::Value;
use tracing::{instrument, trace};

/// Names of the remote methods invoked by [`Module`](`crate::Module`).
pub mod method {
	pub const INITIALIZE: &str = "initialize";
	pub const RENDER_FRAME: &str = "render-frame";
	pub const DISPATCH_EVENT: &str = "dispatch-event";
}

/// A synchronous remote method call.
///
/// Implementations must not return before the response is complete.
/// A response object with an `error` key must surface as [`Error::Remote`] (see [`decode_response`]).
pub trait Transport {
	/// # Errors
	///
	/// Iff the remote side reports an error or the exchange itself fails.
	fn invoke(&self, method: &str, args: &Value) -> Result<Value>;
}

impl<T: Transport + ?Sized> Transport for Box<T> {
	fn invoke(&self, method: &str, args: &Value) -> Result<Value> {
		(**self).invoke(method, args)
	}
}

/// Decodes a channel response body.
///
/// # Errors
///
/// [`Error::Json`] if `text` isn't JSON, [`Error::Remote`] if it's an object with an `error` key.
pub fn decode_response(text: &str) -> Result<Value> {
	let mut result: Value = serde_json::from_str(text)?;
	if let Value::Object(object) = &mut result {
		if let Some(error) = object.remove("error") {
			return Err(Error::Remote { error });
		}
	}
	Ok(result)
}

/// [`Transport`] over synchronous [***XMLHttpRequest***](https://developer.mozilla.org/en-US/docs/Web/API/XMLHttpRequest)s.
///
/// Intended for development servers. The browser's UI thread is blocked for the whole round trip,
/// and there is neither a timeout nor a retry.
#[derive(Debug, Clone)]
pub struct XhrTransport {
	options: ModuleOptions,
}

impl XhrTransport {
	#[must_use]
	pub fn new(options: ModuleOptions) -> Self {
		Self { options }
	}

	/// `POST`s `body` to `path` and blocks until the response text is available.
	///
	/// # Errors
	///
	/// Iff the request can't be sent or completed.
	#[instrument(skip(body))]
	pub fn send_raw(path: &str, body: &str) -> Result<String> {
		let xhr = web_sys::XmlHttpRequest::new().map_err(|error| Error::xhr(path, &error))?;
		xhr.open_with_async("POST", path, false /* synchronous */)
			.map_err(|error| Error::xhr(path, &error))?;
		xhr.set_request_header("Content-Type", CONTENT_TYPE)
			.map_err(|error| Error::xhr(path, &error))?;
		xhr.send_with_opt_str(Some(body)).map_err(|error| Error::xhr(path, &error))?;
		let text = xhr.response_text().map_err(|error| Error::xhr(path, &error))?.unwrap_or_default();
		trace!(status = xhr.status().unwrap_or(0), len = text.len(), "Received response.");
		Ok(text)
	}
}

impl Transport for XhrTransport {
	#[instrument(skip(self, args))]
	fn invoke(&self, method: &str, args: &Value) -> Result<Value> {
		let body = serde_json::to_string(args)?;
		let text = Self::send_raw(&self.options.endpoint(method), &body)?;
		trace!(%text);
		decode_response(&text)
	}
}
