// Applies instanceof conditionals to definitions
//
// Every template whose interface the definition's class satisfies becomes an
// abstract synthetic definition in the registry. The templates are chained
// through their parents so that the last processed template ends up as the
// immediate parent of the rewritten definition. Tags, method calls and
// bindings are copied onto the definition itself and removed from the
// synthetic chain so they are never applied twice.

use indexmap::IndexMap;
use serde_json::Value;
use tracing::{debug, info};

use super::CompilerPass;
use crate::builder::ContainerBuilder;
use crate::definition::{Change, Definition, MethodCall, TagAttributes};
use crate::error::ContainerError;
use crate::registry::DefinitionRegistry;

/// Parameter listing tag names that decorators still inherit from conditionals
pub const BEHAVIOR_DESCRIBING_TAGS: &str = "container.behavior_describing_tags";

const ABSTRACT_PREFIX: &str = "abstract-instanceof.";
const INSTANCEOF_PREFIX: &str = "instanceof.";

/// Id of the abstract placeholder standing in for the original definition `id`
pub fn abstract_id(id: &str) -> String {
	format!("{ABSTRACT_PREFIX}{id}")
}

/// Id of the synthetic definition created from the `index`th template for `interface`
pub fn instanceof_id(interface: &str, index: usize, id: &str) -> String {
	format!("{INSTANCEOF_PREFIX}{interface}.{index}.{id}")
}

/// Whether `id` names a placeholder or chain link created by the pass
pub fn is_synthetic_id(id: &str) -> bool {
	id.starts_with(ABSTRACT_PREFIX) || id.starts_with(INSTANCEOF_PREFIX)
}

/// Collapses instanceof conditionals into inheritance chains
#[derive(Debug, Default, Clone, Copy)]
pub struct ResolveInstanceofConditionalsPass;

impl CompilerPass for ResolveInstanceofConditionalsPass {
	fn name(&self) -> &'static str {
		"resolve_instanceof_conditionals"
	}

	fn process(&self, container: &mut ContainerBuilder) -> Result<(), ContainerError> {
		self.resolve(container)
	}
}

impl ResolveInstanceofConditionalsPass {
	pub fn new() -> Self {
		Self
	}

	/// Resolve the conditionals of every definition currently in `registry`
	///
	/// Definitions created while resolving are not visited. The first error
	/// aborts the pass; definitions already rewritten stay rewritten.
	pub fn resolve<R: DefinitionRegistry + ?Sized>(&self, registry: &mut R) -> Result<(), ContainerError> {
		for (interface, template) in registry.autoconfigured_instanceof() {
			if !template.arguments().is_empty() {
				return Err(ContainerError::invalid_template_arguments(interface));
			}
		}

		let tags_to_keep = behavior_describing_tags(&*registry)?;

		let snapshot: Vec<(String, Definition)> = registry
			.definition_ids()
			.into_iter()
			.filter_map(|id| {
				let definition = registry.definition(&id)?.clone();
				Some((id, definition))
			})
			.collect();
		let total = snapshot.len();

		for (id, definition) in snapshot {
			let resolved = self.resolve_definition(registry, &id, definition, &tags_to_keep)?;
			registry.set_definition(id, resolved);
		}

		registry.remove_parameter(BEHAVIOR_DESCRIBING_TAGS);
		info!(target: "wirebox", definitions = total, "resolved instanceof conditionals");
		Ok(())
	}

	/// Resolve the conditionals of a single definition and return its replacement
	///
	/// Synthetic parents are written to `registry` as a side effect. The
	/// definition is returned unchanged (apart from its conditionals being
	/// cleared) when nothing applies.
	pub fn resolve_definition<R: DefinitionRegistry + ?Sized>(
		&self,
		registry: &mut R,
		id: &str,
		mut definition: Definition,
		tags_to_keep: &[String],
	) -> Result<Definition, ContainerError> {
		let autoconfigured = if definition.is_autoconfigured() {
			registry.autoconfigured_instanceof().clone()
		} else {
			IndexMap::new()
		};
		if definition.instanceof_conditionals().is_empty() && autoconfigured.is_empty() {
			return Ok(definition);
		}

		let class = match definition.class() {
			Some(class) => registry.resolve_value(class)?,
			None => return Ok(definition),
		};
		if class.is_empty() {
			return Ok(definition);
		}

		let conditionals = merge_conditionals(&*registry, autoconfigured, definition.instanceof_conditionals())?;
		definition.set_instanceof_conditionals(IndexMap::new());

		let mut parent = definition.parent().map(str::to_owned);
		let mut matched = false;
		let mut shared = None;
		let mut reflectable = None;
		// One group per applied template, in application order
		let mut instanceof_tags: Vec<IndexMap<String, Vec<TagAttributes>>> = Vec::new();
		let mut instanceof_calls: Vec<MethodCall> = Vec::new();
		let mut instanceof_bindings: IndexMap<String, Value> = IndexMap::new();

		for (interface, templates) in conditionals {
			if interface != class {
				let known = *reflectable.get_or_insert_with(|| registry.reflect_class(&class).is_some());
				if !known || !registry.is_subtype_of(&class, &interface) {
					continue;
				}
			}

			for (index, mut template) in templates.into_iter().enumerate() {
				// links are never revisited, so nothing on them may need resolving
				template.take_instanceof_conditionals();
				template.take_decorated_service();
				template
					.reset_autoconfigured()
					.set_abstract(true)
					.set_parent(parent.clone().unwrap_or_else(|| abstract_id(id)));

				instanceof_tags.push(template.take_tags());
				instanceof_calls.extend(template.take_method_calls());
				// later templates win over earlier ones
				let mut bindings = template.take_bindings();
				for (key, value) in instanceof_bindings {
					bindings.entry(key).or_insert(value);
				}
				instanceof_bindings = bindings;
				if template.is_changed(Change::Shared) {
					shared = Some(template.is_shared());
				}

				let template_id = instanceof_id(&interface, index, id);
				registry.set_definition(template_id.clone(), template);
				parent = Some(template_id);
				matched = true;
			}
		}

		let Some(parent) = parent.filter(|_| matched) else {
			return Ok(definition);
		};

		let bindings = definition.take_bindings();
		let mut placeholder = definition.clone();
		reset_merge_fields(&mut placeholder);
		// autoconfiguration is consumed here, a second run must not apply it again
		placeholder.reset_autoconfigured();
		definition.reset_autoconfigured();
		registry.set_definition(abstract_id(id), placeholder);

		definition.set_parent(parent);
		if let Some(shared) = shared {
			if !definition.is_changed(Change::Shared) {
				definition.set_shared(shared);
			}
		}

		// Decorators only inherit the behavior describing tags
		let is_decorator = definition.decorated_service().is_some();
		for group in instanceof_tags.into_iter().rev() {
			for (name, occurrences) in group {
				if is_decorator && !tags_to_keep.contains(&name) {
					continue;
				}
				for attributes in occurrences {
					if definition.tag(&name).contains(&attributes) {
						continue;
					}
					definition.add_tag(name.clone(), attributes);
				}
			}
		}

		instanceof_calls.extend(definition.take_method_calls());
		definition.set_method_calls(instanceof_calls);

		let mut merged = bindings;
		for (key, value) in instanceof_bindings {
			merged.entry(key).or_insert(value);
		}
		definition.set_bindings(merged);

		debug!(
			target: "wirebox",
			id = %id,
			parent = ?definition.parent(),
			"applied instanceof conditionals"
		);

		Ok(definition)
	}
}

/// Autoconfigured templates first, then the definition's own conditionals
///
/// A locally declared interface that appears in the autoconfigured set keeps
/// the autoconfigured position and gets its template appended after it.
fn merge_conditionals<R: DefinitionRegistry + ?Sized>(
	registry: &R,
	autoconfigured: IndexMap<String, Definition>,
	local: &IndexMap<String, Definition>,
) -> Result<IndexMap<String, Vec<Definition>>, ContainerError> {
	let mut conditionals: IndexMap<String, Vec<Definition>> = autoconfigured
		.into_iter()
		.map(|(interface, template)| (interface, vec![template]))
		.collect();

	for (interface, template) in local {
		if !template.arguments().is_empty() {
			return Err(ContainerError::invalid_template_arguments(interface.as_str()));
		}
		// autoconfigured interfaces are not required to exist
		if registry.reflect_class(interface).is_none() {
			return Err(ContainerError::unknown_conditional_interface(interface.as_str()));
		}
		conditionals
			.entry(interface.clone())
			.or_default()
			.push(template.clone());
	}

	Ok(conditionals)
}

/// Clear every field that children merge rather than inherit
fn reset_merge_fields(definition: &mut Definition) {
	definition
		.set_bindings(IndexMap::new())
		.set_arguments(Vec::new())
		.set_method_calls(Vec::new())
		.set_tags(IndexMap::new())
		.set_abstract(true);
	definition.take_decorated_service();
}

fn behavior_describing_tags<R: DefinitionRegistry + ?Sized>(registry: &R) -> Result<Vec<String>, ContainerError> {
	let Some(value) = registry.parameter(BEHAVIOR_DESCRIBING_TAGS) else {
		return Ok(Vec::new());
	};

	let invalid = || ContainerError::invalid_parameter(BEHAVIOR_DESCRIBING_TAGS, "expected a list of tag names");
	let Value::Array(items) = value else {
		return Err(invalid());
	};
	items
		.iter()
		.map(|item| item.as_str().map(str::to_owned).ok_or_else(invalid))
		.collect()
}
