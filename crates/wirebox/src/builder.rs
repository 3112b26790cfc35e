// In-memory container builder

use indexmap::IndexMap;
use serde_json::Value;
use tracing::debug;

use crate::compiler::Compiler;
use crate::definition::Definition;
use crate::error::ContainerError;
use crate::parameters::ParameterBag;
use crate::reflection::{ClassInfo, ClassMap};
use crate::registry::DefinitionRegistry;

/// Holds definitions, parameters and class metadata until the container is compiled
#[derive(Debug, Clone, Default)]
pub struct ContainerBuilder {
	/// Definition id -> definition, in registration order
	definitions: IndexMap<String, Definition>,
	parameters: ParameterBag,
	classes: ClassMap,
	/// Interface -> template applied to autoconfigured definitions
	autoconfigured_instanceof: IndexMap<String, Definition>,
}

impl ContainerBuilder {
	/// Create an empty builder
	pub fn new() -> Self {
		Self::default()
	}

	/// Register a new definition for `class` under `id`, replacing any previous one
	pub fn register(&mut self, id: impl Into<String>, class: impl Into<String>) -> &mut Definition {
		self.set_definition(id, Definition::with_class(class))
	}

	/// Insert or replace a definition and return it for further configuration
	pub fn set_definition(&mut self, id: impl Into<String>, definition: Definition) -> &mut Definition {
		let id = id.into();
		debug!(target: "wirebox", id = %id, "set definition");
		match self.definitions.entry(id) {
			indexmap::map::Entry::Occupied(mut e) => {
				e.insert(definition);
				e.into_mut()
			},
			indexmap::map::Entry::Vacant(e) => e.insert(definition),
		}
	}

	pub fn definition(&self, id: &str) -> Option<&Definition> {
		self.definitions.get(id)
	}

	pub fn definition_mut(&mut self, id: &str) -> Option<&mut Definition> {
		self.definitions.get_mut(id)
	}

	/// Look up a definition, failing if it is not registered
	pub fn get_definition(&self, id: &str) -> Result<&Definition, ContainerError> {
		self.definition(id)
			.ok_or_else(|| ContainerError::DefinitionNotFound(id.to_string()))
	}

	pub fn has_definition(&self, id: &str) -> bool {
		self.definitions.contains_key(id)
	}

	pub fn remove_definition(&mut self, id: &str) -> Option<Definition> {
		self.definitions.shift_remove(id)
	}

	pub fn definitions(&self) -> &IndexMap<String, Definition> {
		&self.definitions
	}

	pub fn len(&self) -> usize {
		self.definitions.len()
	}

	pub fn is_empty(&self) -> bool {
		self.definitions.is_empty()
	}

	pub fn parameters(&self) -> &ParameterBag {
		&self.parameters
	}

	pub fn set_parameter(&mut self, name: impl Into<String>, value: Value) {
		self.parameters.set(name, value);
	}

	pub fn has_parameter(&self, name: &str) -> bool {
		self.parameters.has(name)
	}

	pub fn classes(&self) -> &ClassMap {
		&self.classes
	}

	pub fn add_class(&mut self, info: ClassInfo) {
		self.classes.add(info);
	}

	/// Template applied to every autoconfigured definition whose class is a `interface`
	///
	/// The template is created on first use and returned as-is afterwards.
	pub fn register_for_autoconfiguration(&mut self, interface: impl Into<String>) -> &mut Definition {
		self.autoconfigured_instanceof.entry(interface.into()).or_default()
	}

	pub fn autoconfigured_instanceof(&self) -> &IndexMap<String, Definition> {
		&self.autoconfigured_instanceof
	}

	/// Run the default compiler passes over this container
	pub fn compile(&mut self) -> Result<(), ContainerError> {
		Compiler::default().compile(self)
	}
}

impl DefinitionRegistry for ContainerBuilder {
	fn definition_ids(&self) -> Vec<String> {
		self.definitions.keys().cloned().collect()
	}

	fn definition(&self, id: &str) -> Option<&Definition> {
		self.definitions.get(id)
	}

	fn set_definition(&mut self, id: String, definition: Definition) {
		ContainerBuilder::set_definition(self, id, definition);
	}

	fn autoconfigured_instanceof(&self) -> &IndexMap<String, Definition> {
		&self.autoconfigured_instanceof
	}

	fn resolve_value(&self, value: &str) -> Result<String, ContainerError> {
		self.parameters.resolve_value(value)
	}

	fn reflect_class(&self, class: &str) -> Option<&ClassInfo> {
		self.classes.get(class)
	}

	fn is_subtype_of(&self, class: &str, interface: &str) -> bool {
		self.classes.is_subtype_of(class, interface)
	}

	fn parameter(&self, name: &str) -> Option<&Value> {
		self.parameters.get(name)
	}

	fn remove_parameter(&mut self, name: &str) {
		self.parameters.remove(name);
	}
}

#[cfg(test)]
mod tests {
	use assert_matches::assert_matches;
	use serde_json::json;

	use super::*;

	#[test]
	fn test_register_keeps_order_and_replaces_in_place() {
		let mut builder = ContainerBuilder::new();
		builder.register("a", "App\\A");
		builder.register("b", "App\\B");
		builder.register("a", "App\\A2");

		let ids = DefinitionRegistry::definition_ids(&builder);
		assert_eq!(ids, vec!["a", "b"]);
		assert_eq!(builder.definition("a").and_then(Definition::class), Some("App\\A2"));
	}

	#[test]
	fn test_register_returns_definition_for_configuration() {
		let mut builder = ContainerBuilder::new();
		builder.register("mailer", "App\\Mailer").set_public(true).set_autoconfigured(true);

		let def = builder.get_definition("mailer").unwrap();
		assert!(def.is_public());
		assert!(def.is_autoconfigured());
	}

	#[test]
	fn test_remove_definition_keeps_remaining_order() {
		let mut builder = ContainerBuilder::new();
		builder.register("a", "App\\A");
		builder.register("b", "App\\B");
		builder.register("c", "App\\C");

		let removed = builder.remove_definition("b");
		assert_eq!(removed.as_ref().and_then(Definition::class), Some("App\\B"));
		assert!(builder.remove_definition("b").is_none());
		assert_eq!(DefinitionRegistry::definition_ids(&builder), vec!["a", "c"]);
	}

	#[test]
	fn test_get_missing_definition() {
		let builder = ContainerBuilder::new();
		assert_matches!(builder.get_definition("nope"), Err(ContainerError::DefinitionNotFound(id)) if id == "nope");
	}

	#[test]
	fn test_register_for_autoconfiguration_returns_same_template() {
		let mut builder = ContainerBuilder::new();
		builder
			.register_for_autoconfiguration("App\\Loggable")
			.add_method_call("setLogger", vec![]);
		builder
			.register_for_autoconfiguration("App\\Loggable")
			.add_tag("monitor.tag", Default::default());

		let template = &builder.autoconfigured_instanceof()["App\\Loggable"];
		assert_eq!(template.method_calls().len(), 1);
		assert!(template.has_tag("monitor.tag"));
	}

	#[test]
	fn test_registry_view_resolves_parameters_and_classes() {
		let mut builder = ContainerBuilder::new();
		builder.set_parameter("ns", json!("App"));
		builder.add_class(ClassInfo::interface("App\\Loggable"));
		builder.add_class(ClassInfo::class("App\\Mailer").implementing(["App\\Loggable"]));

		assert_eq!(builder.resolve_value("%ns%\\Mailer").unwrap(), "App\\Mailer");
		assert!(builder.reflect_class("App\\Mailer").is_some());
		assert!(builder.reflect_class("App\\Missing").is_none());
		assert!(DefinitionRegistry::is_subtype_of(&builder, "App\\Mailer", "App\\Loggable"));

		DefinitionRegistry::remove_parameter(&mut builder, "ns");
		assert!(!builder.has_parameter("ns"));
	}
}
