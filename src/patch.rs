//! Wire types of `render-frame` responses.
//!
//! ```json
//! { "create": "<div _bid=\"1\">…</div>" }
//! ```
//!
//! replaces the host's content, while
//!
//! ```json
//! {
//!   "update": {
//!     "update-elements": [{ "index": 0, "text": "Hello" }],
//!     "remove": [3],
//!     "move": [[0, 2]],
//!     "insert": [{ "html": "<li>new</li>", "index": 1 }],
//!     "classes": ["selected"],
//!     "style": { "color": "red" },
//!     "bid": "7",
//!     "attrs": { "value": "typed" }
//!   }
//! }
//! ```
//!
//! patches the host's first element child in place.
//! All child indices in one [`ElementUpdate`] refer to the child list as it was before that update.

use core::fmt::{self, Formatter};
use serde::{
	de::{DeserializeOwned, Error as _, MapAccess, SeqAccess, Visitor},
	Deserialize, Deserializer,
};
use serde_json::Value;
use tracing::{error, trace, warn};

/// Class list entry that adds nothing, so that "no classes" can be sent as a non-empty list.
pub const CLEAR_CLASSES: &str = "__clear__";

/// One decoded `render-frame` response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
	/// Replace the host element's entire content with this HTML.
	Create(String),
	/// Patch the host element's first element child.
	Update(ElementUpdate),
}

impl Frame {
	/// Interprets a decoded `render-frame` result.
	///
	/// Falsy JSON values (`null`, `false`, `0`, `""`) mean the UI is unchanged and result in [`None`],
	/// as do objects without `create` or `update`. `create` takes precedence if both are present,
	/// and a `null` `create` clears the host.
	///
	/// A response that can't be interpreted is logged and treated as unchanged.
	#[allow(clippy::float_cmp)]
	#[must_use]
	pub fn from_response(response: Value) -> Option<Self> {
		let mut object = match response {
			Value::Null | Value::Bool(false) => return None,
			Value::String(s) if s.is_empty() => return None,
			Value::Number(n) if n.as_f64() == Some(0.0) => return None,
			Value::Object(object) => object,
			other => {
				error!("Expected render response object but found {}. Ignoring the frame.", other);
				return None;
			}
		};

		if let Some(create) = object.remove("create") {
			return match create {
				Value::String(html) => Some(Self::Create(html)),
				Value::Null => Some(Self::Create(String::new())),
				other => {
					error!("Expected `create` HTML string but found {}. Ignoring the frame.", other);
					None
				}
			};
		}

		match object.remove("update").map(ElementUpdate::deserialize) {
			Some(Ok(update)) => Some(Self::Update(update)),
			Some(Err(error)) => {
				error!("Malformed `update`: {}. Ignoring the frame.", error);
				None
			}
			None => {
				trace!("Render response carried neither `create` nor `update`.");
				None
			}
		}
	}
}

/// Mutations of a single element, recursively including its children.
///
/// Each field is decoded on its own: a malformed field is logged and left at its default,
/// so that the rest of the update still applies.
/// In the lists of `update-elements`, `remove`, `insert` and `classes`, this goes down to single entries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ElementUpdate {
	#[serde(rename = "update-elements", deserialize_with = "lenient_entries")]
	pub update_elements: Vec<ChildUpdate>,
	#[serde(deserialize_with = "lenient_entries")]
	pub remove: Vec<u32>,
	#[serde(rename = "move", deserialize_with = "lenient")]
	pub moves: MoveList,
	#[serde(deserialize_with = "lenient_entries")]
	pub insert: Vec<Insertion>,
	#[serde(deserialize_with = "lenient_entries")]
	pub classes: Vec<String>,
	#[serde(deserialize_with = "lenient")]
	pub style: Properties,
	#[serde(deserialize_with = "lenient")]
	pub bid: Option<String>,
	#[serde(deserialize_with = "lenient")]
	pub text: Option<String>,
	#[serde(deserialize_with = "lenient")]
	pub attrs: Properties,
}

impl ElementUpdate {
	/// Whether this update touches the child list's structure (`remove`, `move` or `insert`).
	#[must_use]
	pub fn is_structural(&self) -> bool {
		!self.remove.is_empty() || !self.moves.is_empty() || !self.insert.is_empty()
	}
}

/// An [`ElementUpdate`] for the child node at `index`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ChildUpdate {
	pub index: u32,
	#[serde(flatten)]
	pub update: ElementUpdate,
}

/// Parse `html` into a single node and insert it before the child at `index`.
///
/// An `index` past the end appends.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Insertion {
	pub html: String,
	pub index: u32,
}

/// Move the child at `moved` to directly before the child at `before`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Move {
	pub before: u32,
	pub moved: u32,
}

/// Ordered [`Move`]s.
///
/// Accepts both `[[before, moved], …]` and the flat `[before, moved, before, moved, …]`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MoveList(pub Vec<Move>);

impl MoveList {
	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	pub fn iter(&self) -> core::slice::Iter<'_, Move> {
		self.0.iter()
	}
}

impl<'a> IntoIterator for &'a MoveList {
	type Item = &'a Move;
	type IntoIter = core::slice::Iter<'a, Move>;

	fn into_iter(self) -> Self::IntoIter {
		self.iter()
	}
}

impl<'de> Deserialize<'de> for MoveList {
	fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
		#[derive(Deserialize)]
		#[serde(untagged)]
		enum Entry {
			Pair(u32, u32),
			Index(u32),
		}

		struct MoveListVisitor;
		impl<'de> Visitor<'de> for MoveListVisitor {
			type Value = MoveList;

			fn expecting(&self, f: &mut Formatter) -> fmt::Result {
				f.write_str("a list of index pairs or a flat list of indices")
			}

			fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
				let mut moves = Vec::with_capacity(seq.size_hint().unwrap_or(0));
				let mut pending = None;
				while let Some(entry) = seq.next_element::<Entry>()? {
					match (entry, pending.take()) {
						(Entry::Pair(before, moved), None) => moves.push(Move { before, moved }),
						(Entry::Index(before), None) => pending = Some(before),
						(Entry::Index(moved), Some(before)) => moves.push(Move { before, moved }),
						(Entry::Pair(..), Some(_)) => return Err(A::Error::custom("mixed pair and flat `move` entries")),
					}
				}
				if let Some(before) = pending {
					warn!("Dropping unpaired trailing `move` index {}.", before);
				}
				Ok(MoveList(moves))
			}
		}

		deserializer.deserialize_seq(MoveListVisitor)
	}
}

/// Name-value pairs (`style`, `attrs`) in the order they appear on the wire.
///
/// Later entries are applied after earlier ones, so a longhand style property can follow its shorthand.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Properties(pub Vec<(String, String)>);

impl Properties {
	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	#[must_use]
	pub fn len(&self) -> usize {
		self.0.len()
	}

	/// The last value given for `name`.
	#[must_use]
	pub fn get(&self, name: &str) -> Option<&str> {
		self.0.iter().rev().find(|(key, _)| key == name).map(|(_, value)| value.as_str())
	}

	pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
		self.0.iter().map(|(name, value)| (name.as_str(), value.as_str()))
	}
}

impl<'de> Deserialize<'de> for Properties {
	fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
		struct PropertiesVisitor;
		impl<'de> Visitor<'de> for PropertiesVisitor {
			type Value = Properties;

			fn expecting(&self, f: &mut Formatter) -> fmt::Result {
				f.write_str("an object of string values")
			}

			fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
				let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
				while let Some(entry) = map.next_entry::<String, String>()? {
					entries.push(entry);
				}
				Ok(Properties(entries))
			}
		}

		deserializer.deserialize_map(PropertiesVisitor)
	}
}

/// Deserializes a field, falling back to its default (with an error log) if it's malformed.
fn lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
	D: Deserializer<'de>,
	T: DeserializeOwned + Default,
{
	let value = Value::deserialize(deserializer)?;
	Ok(T::deserialize(&value).unwrap_or_else(|error| {
		error!("Ignoring malformed update field {}: {}", value, error);
		T::default()
	}))
}

/// Deserializes a list field entry by entry, dropping (with an error log) each entry that's malformed.
///
/// A value that isn't a list at all is logged and treated as empty.
fn lenient_entries<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
	D: Deserializer<'de>,
	T: DeserializeOwned,
{
	let entries = match Value::deserialize(deserializer)? {
		Value::Array(entries) => entries,
		other => {
			error!("Expected a list but found {}. Ignoring the update field.", other);
			return Ok(Vec::new());
		}
	};
	Ok(entries
		.into_iter()
		.filter_map(|entry| match T::deserialize(&entry) {
			Ok(entry) => Some(entry),
			Err(error) => {
				error!("Ignoring malformed list entry {}: {}", entry, error);
				None
			}
		})
		.collect())
}
