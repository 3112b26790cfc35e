// Class metadata used to match instanceof conditionals
//
// Classes and interfaces are described declaratively: a class names its
// parent class and the interfaces it implements, an interface names the
// interfaces it extends.

use std::collections::HashSet;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Whether a type is a concrete/abstract class or an interface
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassKind {
	#[default]
	Class,
	Interface,
}

/// Reflected view of one class or interface
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassInfo {
	pub name: String,

	#[serde(default)]
	pub kind: ClassKind,

	/// Parent class (classes only)
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub parent: Option<String>,

	/// Implemented (or, for interfaces, extended) interfaces
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub interfaces: Vec<String>,
}

impl ClassInfo {
	pub fn class(name: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			kind: ClassKind::Class,
			parent: None,
			interfaces: Vec::new(),
		}
	}

	pub fn interface(name: impl Into<String>) -> Self {
		Self {
			kind: ClassKind::Interface,
			..Self::class(name)
		}
	}

	pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
		self.parent = Some(parent.into());
		self
	}

	pub fn implementing<S: Into<String>>(mut self, interfaces: impl IntoIterator<Item = S>) -> Self {
		self.interfaces.extend(interfaces.into_iter().map(Into::into));
		self
	}

	fn supertypes(&self) -> impl Iterator<Item = &str> {
		self.parent.as_deref().into_iter().chain(self.interfaces.iter().map(String::as_str))
	}
}

/// Known classes, looked up by name
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClassMap {
	classes: IndexMap<String, ClassInfo>,
}

impl ClassMap {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn add(&mut self, info: ClassInfo) {
		self.classes.insert(info.name.clone(), info);
	}

	pub fn get(&self, name: &str) -> Option<&ClassInfo> {
		self.classes.get(name)
	}

	pub fn contains(&self, name: &str) -> bool {
		self.classes.contains_key(name)
	}

	pub fn iter(&self) -> impl Iterator<Item = &ClassInfo> {
		self.classes.values()
	}

	pub fn len(&self) -> usize {
		self.classes.len()
	}

	pub fn is_empty(&self) -> bool {
		self.classes.is_empty()
	}

	/// Whether `class` extends or implements `ancestor`, directly or not
	///
	/// A type is never its own subtype. Supertypes that are named but not
	/// registered still match by name; their own ancestors are unknown.
	pub fn is_subtype_of(&self, class: &str, ancestor: &str) -> bool {
		let Some(info) = self.get(class) else {
			return false;
		};

		let mut seen: HashSet<&str> = HashSet::new();
		let mut pending: Vec<&str> = info.supertypes().collect();
		while let Some(name) = pending.pop() {
			if name == ancestor {
				return true;
			}
			if !seen.insert(name) {
				continue;
			}
			if let Some(info) = self.get(name) {
				pending.extend(info.supertypes());
			}
		}

		false
	}
}

impl FromIterator<ClassInfo> for ClassMap {
	fn from_iter<T: IntoIterator<Item = ClassInfo>>(iter: T) -> Self {
		let mut map = Self::new();
		for info in iter {
			map.add(info);
		}
		map
	}
}
