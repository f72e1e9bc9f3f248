#![doc(html_root_url = "https://docs.rs/dom-patch-channel/0.0.1")]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

//! A browser-side client for server-driven UI.
//!
//! A remote process owns the UI state and answers over a blocking channel with either a full HTML snapshot
//! or an incremental [`patch::ElementUpdate`], which [`apply::DomPatcher`] applies to the live
//! [***childNodes***](https://developer.mozilla.org/en-US/docs/Web/API/Node/childNodes) below a host element.
//!
//! User interaction is captured once on the host element, routed to the nearest identity marker and reported back
//! through the same channel, after which the next frame is rendered. See [`module::Module`].

#[cfg(doctest)]
pub mod readme {
	doc_comment::doctest!("../README.md");
}

pub mod apply;
pub mod error;
pub mod event;
pub mod js;
pub mod module;
pub mod options;
pub mod patch;
pub mod transport;

pub use error::{Error, Result};
pub use module::Module;
pub use options::ModuleOptions;
pub use transport::{Transport, XhrTransport};
