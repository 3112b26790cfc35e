// Container file format
//
// A container file declares:
// - Parameters referenced as %name% from definitions
// - Classes and interfaces (the hierarchy used to match conditionals)
// - Autoconfigured instanceof templates shared by every autoconfigured service
// - Service definitions, optionally with their own instanceof conditionals

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::builder::ContainerBuilder;
use crate::definition::{Change, DecoratedService, Definition, MethodCall, TagAttributes};
use crate::reflection::ClassInfo;

/// Parsed container file
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContainerFile {
	/// Named parameter values
	#[serde(default, skip_serializing_if = "IndexMap::is_empty")]
	pub parameters: IndexMap<String, Value>,

	/// Known classes and interfaces
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub classes: Vec<ClassInfo>,

	/// Interface -> template applied to autoconfigured services
	#[serde(default, rename = "instanceof", skip_serializing_if = "IndexMap::is_empty")]
	pub autoconfigured_instanceof: IndexMap<String, DefinitionSpec>,

	/// Service id -> definition
	#[serde(default)]
	pub services: IndexMap<String, DefinitionSpec>,
}

/// Service definition as written in a container file
///
/// Optional flags that are present in the file count as explicitly set.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DefinitionSpec {
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub class: Option<String>,

	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub parent: Option<String>,

	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub factory: Option<String>,

	#[serde(default, rename = "abstract", skip_serializing_if = "std::ops::Not::not")]
	pub is_abstract: bool,

	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub shared: Option<bool>,

	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub public: Option<bool>,

	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub lazy: Option<bool>,

	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub autoconfigure: Option<bool>,

	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub arguments: Vec<Value>,

	#[serde(default, skip_serializing_if = "IndexMap::is_empty")]
	pub properties: IndexMap<String, Value>,

	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub calls: Vec<MethodCall>,

	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub tags: Vec<TagSpec>,

	/// Binding key (`$name` or `Type $name`) -> value
	#[serde(default, skip_serializing_if = "IndexMap::is_empty")]
	pub bind: IndexMap<String, Value>,

	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub decorates: Option<DecoratesSpec>,

	/// Interface -> template applied when the class implements it
	#[serde(default, skip_serializing_if = "IndexMap::is_empty")]
	pub instanceof: IndexMap<String, DefinitionSpec>,
}

/// A tag, either a bare name or a name with attributes
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum TagSpec {
	Name(String),
	WithAttributes {
		name: String,
		#[serde(flatten)]
		attributes: TagAttributes,
	},
}

impl TagSpec {
	fn into_parts(self) -> (String, TagAttributes) {
		match self {
			TagSpec::Name(name) => (name, TagAttributes::new()),
			TagSpec::WithAttributes { name, attributes } => (name, attributes),
		}
	}

	fn from_parts(name: &str, attributes: &TagAttributes) -> Self {
		if attributes.is_empty() {
			TagSpec::Name(name.to_string())
		} else {
			TagSpec::WithAttributes {
				name: name.to_string(),
				attributes: attributes.clone(),
			}
		}
	}
}

/// Decorated service, either a bare id or the full form
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum DecoratesSpec {
	Id(String),
	Full(DecoratedService),
}

impl From<DecoratesSpec> for DecoratedService {
	fn from(spec: DecoratesSpec) -> Self {
		match spec {
			DecoratesSpec::Id(id) => DecoratedService::new(id),
			DecoratesSpec::Full(decorated) => decorated,
		}
	}
}

impl From<&DecoratedService> for DecoratesSpec {
	fn from(decorated: &DecoratedService) -> Self {
		if decorated.renamed_id.is_none() && decorated.priority == 0 {
			DecoratesSpec::Id(decorated.id.clone())
		} else {
			DecoratesSpec::Full(decorated.clone())
		}
	}
}

impl From<DefinitionSpec> for Definition {
	fn from(spec: DefinitionSpec) -> Self {
		let mut def = Definition::new();
		if let Some(class) = spec.class {
			def.set_class(class);
		}
		if let Some(parent) = spec.parent {
			def.set_parent(parent);
		}
		if let Some(factory) = spec.factory {
			def.set_factory(factory);
		}
		if let Some(shared) = spec.shared {
			def.set_shared(shared);
		}
		if let Some(public) = spec.public {
			def.set_public(public);
		}
		if let Some(lazy) = spec.lazy {
			def.set_lazy(lazy);
		}
		if let Some(autoconfigure) = spec.autoconfigure {
			def.set_autoconfigured(autoconfigure);
		}
		if let Some(decorates) = spec.decorates {
			def.set_decorated_service(Some(decorates.into()));
		}
		def.set_abstract(spec.is_abstract)
			.set_arguments(spec.arguments)
			.set_method_calls(spec.calls)
			.set_bindings(spec.bind);
		for (name, value) in spec.properties {
			def.set_property(name, value);
		}
		for tag in spec.tags {
			let (name, attributes) = tag.into_parts();
			def.add_tag(name, attributes);
		}
		for (interface, template) in spec.instanceof {
			def.set_instanceof_conditional(interface, template.into());
		}
		def
	}
}

impl From<&Definition> for DefinitionSpec {
	fn from(def: &Definition) -> Self {
		let explicit = |change: Change, value: bool| def.is_changed(change).then_some(value);
		Self {
			class: def.class().map(str::to_owned),
			parent: def.parent().map(str::to_owned),
			factory: def.factory().map(str::to_owned),
			is_abstract: def.is_abstract(),
			shared: explicit(Change::Shared, def.is_shared()),
			public: explicit(Change::Public, def.is_public()),
			lazy: explicit(Change::Lazy, def.is_lazy()),
			autoconfigure: explicit(Change::Autoconfigured, def.is_autoconfigured()),
			arguments: def.arguments().to_vec(),
			properties: def.properties().clone(),
			calls: def.method_calls().to_vec(),
			tags: def
				.tags()
				.iter()
				.flat_map(|(name, occurrences)| occurrences.iter().map(|a| TagSpec::from_parts(name, a)))
				.collect(),
			bind: def.bindings().clone(),
			decorates: def.decorated_service().map(DecoratesSpec::from),
			instanceof: def
				.instanceof_conditionals()
				.iter()
				.map(|(interface, template)| (interface.clone(), template.into()))
				.collect(),
		}
	}
}

impl ContainerFile {
	/// Build a container holding everything this file declares
	pub fn into_builder(self) -> ContainerBuilder {
		let mut builder = ContainerBuilder::new();
		for (name, value) in self.parameters {
			builder.set_parameter(name, value);
		}
		for class in self.classes {
			builder.add_class(class);
		}
		for (interface, template) in self.autoconfigured_instanceof {
			*builder.register_for_autoconfiguration(interface) = template.into();
		}
		for (id, spec) in self.services {
			builder.set_definition(id, spec.into());
		}
		builder
	}

	/// Describe the current state of `builder` in file form
	pub fn from_builder(builder: &ContainerBuilder) -> Self {
		Self {
			parameters: builder.parameters().all().clone(),
			classes: builder.classes().iter().cloned().collect(),
			autoconfigured_instanceof: builder
				.autoconfigured_instanceof()
				.iter()
				.map(|(interface, template)| (interface.clone(), template.into()))
				.collect(),
			services: builder
				.definitions()
				.iter()
				.map(|(id, def)| (id.clone(), def.into()))
				.collect(),
		}
	}

	/// Number of service definitions
	pub fn len(&self) -> usize {
		self.services.len()
	}

	pub fn is_empty(&self) -> bool {
		self.services.is_empty()
	}
}
