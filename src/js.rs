//! JavaScript entry point.
//!
//! ```js
//! import { ButterflyModule } from "./dom_patch_channel.js";
//!
//! const module = new ButterflyModule("todo", document.getElementById("host"));
//! module.run();
//! ```
//!
//! Each instance owns its module. There is no global registry.

use crate::{module::Module, options::ModuleOptions};
use tracing::debug;
use wasm_bindgen::prelude::*;

#[wasm_bindgen(js_name = ButterflyModule)]
#[derive(Debug)]
pub struct JsModule {
	module: Module,
}

#[wasm_bindgen(js_class = ButterflyModule)]
impl JsModule {
	/// Talks to `{endpointPrefix}/{moduleName}/{method}`. `endpointPrefix` defaults to `/_butterfly`.
	#[wasm_bindgen(constructor)]
	#[must_use]
	pub fn new(module_name: &str, host: web_sys::Element, endpoint_prefix: Option<String>) -> JsModule {
		#[cfg(feature = "panic-hook")]
		console_error_panic_hook::set_once();

		let mut options = ModuleOptions::for_module(module_name);
		if let Some(endpoint_prefix) = endpoint_prefix {
			options.endpoint_prefix(endpoint_prefix);
		}
		debug!(?options, "Creating module.");
		JsModule {
			module: Module::with_xhr(host, &options),
		}
	}

	/// # Errors
	///
	/// Throws the remote error value, or an `Error` describing the failure.
	pub fn run(&mut self) -> Result<(), JsValue> {
		self.module.run().map_err(Into::into)
	}

	/// # Errors
	///
	/// Like [`JsModule::run`].
	#[wasm_bindgen(js_name = renderFrame)]
	pub fn render_frame(&self) -> Result<(), JsValue> {
		self.module.render_frame().map_err(Into::into)
	}

	#[wasm_bindgen(getter, js_name = isRunning)]
	#[must_use]
	pub fn is_running(&self) -> bool {
		self.module.is_running()
	}

	/// Detaches the module's event listeners and frees it.
	pub fn dispose(self) {
		self.module.dispose();
	}
}

/// Same as `new ButterflyModule(moduleName, hostElement)`.
#[wasm_bindgen(js_name = createModule)]
#[must_use]
pub fn create_module(module_name: &str, host: web_sys::Element) -> JsModule {
	JsModule::new(module_name, host, None)
}
