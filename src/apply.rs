use crate::patch::{ChildUpdate, ElementUpdate, Frame, Insertion, Move, CLEAR_CLASSES};
use js_sys::Reflect;
use tracing::{debug, error, info, instrument, level_filters::STATIC_MAX_LEVEL, trace, trace_span, warn, Level};
use wasm_bindgen::{JsCast, JsValue, UnwrapThrowExt};

/// Attached to a specific host [`web_sys::Element`] during instantiation, this `struct` applies [`Frame`]s to its
/// [***childNodes***](https://developer.mozilla.org/en-US/docs/Web/API/Node/childNodes).
///
/// Patching is best-effort: anomalies such as child indices that don't exist are logged and the affected operation
/// is skipped, but the remainder of the frame is still applied. Nothing here returns an error or throws.
///
/// # Index resolution
///
/// All child indices inside one [`ElementUpdate`] refer to that element's child list *before* any of its own
/// `remove`, `move` or `insert` operations ran. The nodes they refer to are looked up once, and only then is the
/// child list mutated, so these operations never observe each other's index shifts.
#[derive(Debug)]
pub struct DomPatcher {
	host: web_sys::Element,
	document: web_sys::Document,
	marker_attribute: String,
	performance: Option<web_sys::Performance>,
}

impl DomPatcher {
	#[must_use]
	#[instrument]
	pub fn new_for_host(host: web_sys::Element, marker_attribute: &str) -> Self {
		let document = host.owner_document().expect_throw("dom-patch-channel: No owner document found for host element.");
		Self {
			host,
			document,
			marker_attribute: marker_attribute.to_owned(),
			performance: web_sys::window().and_then(|window| window.performance()),
		}
	}

	#[must_use]
	pub fn host(&self) -> &web_sys::Element {
		&self.host
	}

	/// Applies one decoded `render-frame` response. [`None`] leaves the document untouched.
	#[instrument(skip(self, frame))]
	pub fn apply_frame(&self, frame: Option<&Frame>) {
		let start = self.now();
		match frame {
			None => return trace!("Frame unchanged."),
			Some(Frame::Create(html)) => {
				let span = trace_span!("Creating host content", len = html.len());
				let _enter = span.enter();
				self.host.set_inner_html(html);
				self.log_timing("create", start);
			}
			Some(Frame::Update(update)) => {
				let span = trace_span!("Updating host content");
				let _enter = span.enter();
				match self.host.first_element_child() {
					Some(root) => self.apply_update(root.as_ref(), update),
					None => error!("Expected an element in the host to update, but it has none. Skipping the frame."),
				}
				self.log_timing("update", start);
			}
		}

		if STATIC_MAX_LEVEL >= Level::TRACE {
			if let Ok(all) = self.document.query_selector_all("*") {
				trace!("{} elements in document.", all.length());
			}
		}
	}

	/// Recursively applies `update` to `node`.
	///
	/// Steps run in this order:
	///
	/// 1. `update-elements`, recursing into the children,
	/// 2. resolving the `remove`, `move` and `insert` indices to nodes,
	/// 3. `classes`,
	/// 4. `style`,
	/// 5. `remove`,
	/// 6. `move`,
	/// 7. `insert`,
	/// 8. `bid`,
	/// 9. `text`,
	/// 10. `attrs`.
	#[instrument(skip(self, node, update))]
	pub fn apply_update(&self, node: &web_sys::Node, update: &ElementUpdate) {
		let child_nodes = node.child_nodes();

		for ChildUpdate { index, update: child_update } in &update.update_elements {
			match child_nodes.item(*index) {
				Some(child) => self.apply_update(&child, child_update),
				None => self.log_missing_child(node, *index),
			}
		}

		let mutations = ChildMutations::resolve(&child_nodes, update);

		let element = node.dyn_ref::<web_sys::Element>();
		if element.is_none() && (!update.classes.is_empty() || !update.style.is_empty() || update.bid.is_some() || !update.attrs.is_empty()) {
			warn!("Can't set classes, style, marker or attributes on non-element {}. Skipping those.", describe(node));
		}

		if let Some(element) = element {
			if !update.classes.is_empty() {
				set_classes(element, &update.classes);
			}
			for (name, value) in update.style.iter() {
				set_style(element, name, value);
			}
		}

		mutations.perform(self, node);

		if let Some(element) = element {
			if let Some(bid) = &update.bid {
				if let Err(error) = element.set_attribute(&self.marker_attribute, bid) {
					error!("Could not set marker {:?}: {:?}", bid, error);
				}
			}
		}

		if let Some(text) = &update.text {
			match node.dyn_ref::<web_sys::HtmlElement>() {
				Some(html_element) => html_element.set_inner_text(text),
				None => node.set_text_content(Some(text.as_str())),
			}
		}

		if let Some(element) = element {
			for (name, value) in update.attrs.iter() {
				set_attribute(element, name, value);
			}
		}
	}

	/// Parses `html` into its first node, if any.
	fn parse_fragment(&self, html: &str) -> Option<web_sys::Node> {
		let template = match self.document.create_element("template") {
			Ok(template) => template.unchecked_into::<web_sys::HtmlTemplateElement>(),
			Err(error) => {
				error!("Failed to create template element: {:?}", error);
				return None;
			}
		};
		template.set_inner_html(html);
		template.content().first_child()
	}

	fn log_missing_child(&self, element: &web_sys::Node, index: u32) {
		error!("Element child {} not found in {}. Skipping its update.", index, describe(element));
		let mut parent = element.parent_node();
		while let Some(ancestor) = parent {
			if self.host.is_same_node(Some(&ancestor)) {
				break;
			}
			debug!("…inside {}", describe(&ancestor));
			parent = ancestor.parent_node();
		}
	}

	fn now(&self) -> Option<f64> {
		self.performance.as_ref().map(web_sys::Performance::now)
	}

	fn log_timing(&self, category: &str, start: Option<f64>) {
		if let (Some(start), Some(end)) = (start, self.now()) {
			info!("{}: {} ms", category, end - start);
		}
	}
}

/// `remove`, `move` and `insert` of one [`ElementUpdate`], with every index already resolved to a node.
///
/// A missing node is [`None`]. For reference nodes, [`None`] means "append".
struct ChildMutations<'a> {
	removes: Vec<(u32, Option<web_sys::Node>)>,
	moves: Vec<(Option<web_sys::Node>, u32, Option<web_sys::Node>)>,
	insertions: Vec<(&'a str, Option<web_sys::Node>)>,
}

impl<'a> ChildMutations<'a> {
	fn resolve(child_nodes: &web_sys::NodeList, update: &'a ElementUpdate) -> Self {
		if !update.is_structural() {
			return Self {
				removes: Vec::new(),
				moves: Vec::new(),
				insertions: Vec::new(),
			};
		}

		let span = trace_span!("Resolving child indices", len = child_nodes.length());
		let _enter = span.enter();
		Self {
			removes: update.remove.iter().map(|&index| (index, child_nodes.item(index))).collect(),
			moves: update
				.moves
				.iter()
				.map(|&Move { before, moved }| (child_nodes.item(before), moved, child_nodes.item(moved)))
				.collect(),
			insertions: update.insert.iter().map(|Insertion { html, index }| (html.as_str(), child_nodes.item(*index))).collect(),
		}
	}

	fn perform(self, patcher: &DomPatcher, parent: &web_sys::Node) {
		if !self.removes.is_empty() {
			let span = trace_span!("Removing", count = self.removes.len());
			let _enter = span.enter();
			for (index, removed) in self.removes {
				match removed {
					Some(removed) => {
						if let Err(error) = parent.remove_child(&removed) {
							error!("Failed to remove child {}: {:?}", index, error);
						}
					}
					None => warn!("Child {} to remove not found in {}. Skipping.", index, describe(parent)),
				}
			}
		}

		if !self.moves.is_empty() {
			let span = trace_span!("Moving", count = self.moves.len());
			let _enter = span.enter();
			for (before, index, moved) in self.moves {
				match moved {
					Some(moved) => {
						if let Err(error) = parent.insert_before(&moved, before.as_ref()) {
							error!("Failed to move child {}: {:?}", index, error);
						}
					}
					None => warn!("Child {} to move not found in {}. Skipping.", index, describe(parent)),
				}
			}
		}

		if !self.insertions.is_empty() {
			let span = trace_span!("Inserting", count = self.insertions.len());
			let _enter = span.enter();
			for (html, before) in self.insertions {
				let inserted = match patcher.parse_fragment(html) {
					Some(inserted) => inserted,
					None => {
						warn!("Inserted HTML {:?} produced no node. Skipping.", html);
						continue;
					}
				};
				if let Err(error) = parent.insert_before(&inserted, before.as_ref()) {
					error!("Failed to insert {:?}: {:?}", html, error);
				}
			}
		}
	}
}

/// Replaces the whole class list, unless `classes` is empty.
fn set_classes(element: &web_sys::Element, classes: &[String]) {
	element.set_class_name("");
	let class_list = element.class_list();
	for class in classes.iter().filter(|&class| class != CLEAR_CLASSES) {
		if let Err(error) = class_list.add_1(class) {
			error!("Could not add class {:?}: {:?}", class, error);
		}
	}
}

/// Accepts CSS property names (`background-color`, `--custom`) and camel-case ones (`backgroundColor`).
fn set_style(element: &web_sys::Element, name: &str, value: &str) {
	let style = if let Some(html_element) = element.dyn_ref::<web_sys::HtmlElement>() {
		html_element.style()
	} else if let Some(svg_element) = element.dyn_ref::<web_sys::SvgElement>() {
		svg_element.style()
	} else {
		return warn!("Element {} has no inline style. Skipping style {:?}.", describe(element), name);
	};

	let result = if name.contains('-') {
		style.set_property(name, value)
	} else {
		Reflect::set(&style, &JsValue::from_str(name), &JsValue::from_str(value)).map(drop)
	};
	if let Err(error) = result {
		error!("Could not set style {:?}={:?}: {:?}", name, value, error);
	}
}

fn set_attribute(element: &web_sys::Element, name: &str, value: &str) {
	// The attribute alone doesn't change what an edited form control shows.
	if name == "value" {
		if let Err(error) = Reflect::set(element, &JsValue::from_str("value"), &JsValue::from_str(value)) {
			error!("Could not set value property to {:?}: {:?}", value, error);
		}
	}
	if let Err(error) = element.set_attribute(name, value) {
		error!("Could not set attribute {:?}={:?}: {:?}", name, value, error);
	}
}

/// Short description of `node` for diagnostics.
///
/// Only with the `dangerous-logging` feature does this include markup, which may contain personal data.
pub(crate) fn describe(node: &web_sys::Node) -> String {
	match node.dyn_ref::<web_sys::Element>() {
		Some(element) if cfg!(feature = "dangerous-logging") => element.outer_html(),
		Some(element) => match element.id().as_str() {
			"" => format!("<{}>", element.tag_name()),
			id => format!("<{} id={:?}>", element.tag_name(), id),
		},
		None => node.node_name(),
	}
}
