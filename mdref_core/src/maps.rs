use std::collections::BTreeMap;

use derive_more::Deref;
use serde::Serialize;

use crate::KeyKind;
use crate::MdrefError;
use crate::MdrefResult;

macro_rules! named_map {
	($(#[$meta:meta])* $name:ident, $kind:expr) => {
		$(#[$meta])*
		#[derive(Debug, Clone, Default, PartialEq, Eq, Deref, Serialize)]
		#[serde(transparent)]
		pub struct $name(BTreeMap<String, String>);

		impl $name {
			pub fn new() -> Self {
				Self::default()
			}

			/// Insert a new entry, failing when `name` is already present.
			pub(crate) fn insert_unique(&mut self, name: String, value: String) -> MdrefResult<()> {
				if self.0.contains_key(&name) {
					return Err(MdrefError::DuplicateKey { kind: $kind, name });
				}
				self.0.insert(name, value);
				Ok(())
			}

			pub fn into_inner(self) -> BTreeMap<String, String> {
				self.0
			}
		}

		impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for $name {
			fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
				Self(
					iter.into_iter()
						.map(|(key, value)| (key.into(), value.into()))
						.collect(),
				)
			}
		}

		impl<K: Into<String>, V: Into<String>, const N: usize> From<[(K, V); N]> for $name {
			fn from(entries: [(K, V); N]) -> Self {
				entries.into_iter().collect()
			}
		}

		impl IntoIterator for $name {
			type IntoIter = std::collections::btree_map::IntoIter<String, String>;
			type Item = (String, String);

			fn into_iter(self) -> Self::IntoIter {
				self.0.into_iter()
			}
		}
	};
}

named_map!(
	/// Reference name to captured content, built from `begin-ref` blocks.
	ReferenceMap,
	KeyKind::Reference
);

named_map!(
	/// Variable name to decoded value, built from `var` declarations.
	VariableMap,
	KeyKind::Variable
);
