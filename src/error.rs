//! Faults that abort an `initialize`, `render-frame` or `dispatch-event` round trip.
//!
//! Patch application has no error path of its own. Anomalies found while mutating the DOM are logged and skipped.

use thiserror::Error;
use wasm_bindgen::JsValue;

pub type Result<T> = core::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
	/// The remote side answered with an object carrying an `error` key.
	///
	/// `error` is that key's value, exactly as decoded.
	#[error("Remote error: {error}")]
	Remote { error: serde_json::Value },

	#[error("Malformed channel JSON: {0}")]
	Json(#[from] serde_json::Error),

	/// The `XMLHttpRequest` itself failed, for example through a network error.
	#[error("XMLHttpRequest to {path:?} failed: {message}")]
	Xhr { path: String, message: String },

	#[error("No global `{0}` available")]
	MissingGlobal(&'static str),

	#[error("Module is already running")]
	AlreadyRunning,
}

impl Error {
	pub(crate) fn xhr(path: &str, error: &JsValue) -> Self {
		Self::Xhr {
			path: path.to_owned(),
			message: error.as_string().unwrap_or_else(|| format!("{:?}", error)),
		}
	}
}

impl From<Error> for JsValue {
	fn from(error: Error) -> Self {
		match error {
			// Hand the remote value over as-is, so JavaScript callers can inspect it.
			Error::Remote { error } => serde_json::to_string(&error)
				.ok()
				.and_then(|json| js_sys::JSON::parse(&json).ok())
				.unwrap_or_else(|| JsValue::from_str("remote error")),
			other => js_sys::Error::new(&other.to_string()).into(),
		}
	}
}
