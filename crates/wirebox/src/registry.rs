// Registry interface consumed by compiler passes

use indexmap::IndexMap;
use serde_json::Value;

use crate::definition::Definition;
use crate::error::ContainerError;
use crate::reflection::ClassInfo;

/// Mutable view of a definition registry
///
/// Compiler passes only see the container through this trait, so they can run
/// against any storage that can enumerate, look up and replace definitions,
/// resolve placeholders and answer class hierarchy questions.
pub trait DefinitionRegistry {
	/// Ids of every registered definition, in registration order
	///
	/// The returned list is a snapshot: definitions added afterwards are not
	/// part of it.
	fn definition_ids(&self) -> Vec<String>;

	fn definition(&self, id: &str) -> Option<&Definition>;

	/// Insert or replace the definition stored under `id`
	fn set_definition(&mut self, id: String, definition: Definition);

	/// Templates applied to every autoconfigured definition, keyed by interface
	fn autoconfigured_instanceof(&self) -> &IndexMap<String, Definition>;

	/// Substitute `%parameter%` placeholders
	fn resolve_value(&self, value: &str) -> Result<String, ContainerError>;

	/// Reflect a class or interface by name, `None` if it is unknown
	fn reflect_class(&self, class: &str) -> Option<&ClassInfo>;

	/// Whether `class` extends or implements `interface`
	fn is_subtype_of(&self, class: &str, interface: &str) -> bool;

	fn parameter(&self, name: &str) -> Option<&Value>;

	fn remove_parameter(&mut self, name: &str);
}
