/// Path prefix of the channel endpoint.
pub const DEFAULT_ENDPOINT_PREFIX: &str = "/_butterfly";

/// Path prefix used by the older development server.
pub const DEV_SERVER_ENDPOINT_PREFIX: &str = "/__butterfly_dev_channel__";

/// Attribute holding the identity marker that routes events to their logical element.
pub const DEFAULT_MARKER_ATTRIBUTE: &str = "_bid";

pub const DEFAULT_EVENT_TYPES: [&str; 2] = ["click", "keyup"];

/// Channel request bodies are JSON, but are sent as plain text.
pub const CONTENT_TYPE: &str = "text/plain;charset=UTF-8";

/// Configures how a [`Module`](`crate::Module`) talks to its remote side and which events it captures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleOptions {
	endpoint_prefix: String,
	module_name: Option<String>,
	event_types: Vec<String>,
	marker_attribute: String,
}

impl Default for ModuleOptions {
	fn default() -> Self {
		Self {
			endpoint_prefix: DEFAULT_ENDPOINT_PREFIX.to_owned(),
			module_name: None,
			event_types: DEFAULT_EVENT_TYPES.iter().map(|&t| t.to_owned()).collect(),
			marker_attribute: DEFAULT_MARKER_ATTRIBUTE.to_owned(),
		}
	}
}

impl ModuleOptions {
	#[must_use]
	pub fn new() -> Self {
		Self::default()
	}

	/// Options for a named module, i.e. requests go to `{prefix}/{module_name}/{method}`.
	#[must_use]
	pub fn for_module(module_name: impl Into<String>) -> Self {
		let mut options = Self::new();
		options.module_name(module_name);
		options
	}

	pub fn endpoint_prefix(&mut self, endpoint_prefix: impl Into<String>) -> &mut Self {
		self.endpoint_prefix = endpoint_prefix.into();
		self
	}

	pub fn module_name(&mut self, module_name: impl Into<String>) -> &mut Self {
		self.module_name = Some(module_name.into());
		self
	}

	pub fn event_types<I, S>(&mut self, event_types: I) -> &mut Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.event_types = event_types.into_iter().map(Into::into).collect();
		self
	}

	pub fn marker_attribute(&mut self, marker_attribute: impl Into<String>) -> &mut Self {
		self.marker_attribute = marker_attribute.into();
		self
	}

	#[must_use]
	pub fn get_module_name(&self) -> Option<&str> {
		self.module_name.as_deref()
	}

	#[must_use]
	pub fn get_event_types(&self) -> &[String] {
		&self.event_types
	}

	#[must_use]
	pub fn get_marker_attribute(&self) -> &str {
		&self.marker_attribute
	}

	/// The request path for `method`.
	///
	/// A trailing `/` on the prefix is ignored.
	#[must_use]
	pub fn endpoint(&self, method: &str) -> String {
		let prefix = self.endpoint_prefix.trim_end_matches('/');
		match &self.module_name {
			Some(module_name) => format!("{}/{}/{}", prefix, module_name, method),
			None => format!("{}/{}", prefix, method),
		}
	}
}
