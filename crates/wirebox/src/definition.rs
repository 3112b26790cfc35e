// Service definition model
//
// A definition describes how one named object gets built. Fields that the
// user sets explicitly are recorded in a change set so that inheritance can
// tell "explicitly false" apart from "never touched".

use std::collections::BTreeSet;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Attributes attached to one occurrence of a tag
pub type TagAttributes = IndexMap<String, Value>;

/// Fields whose explicit assignment is tracked by [`Definition::changes`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Change {
	Class,
	Factory,
	Shared,
	Public,
	Lazy,
	Autoconfigured,
	DecoratedService,
}

/// A method invoked on the object after construction
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MethodCall {
	pub method: String,

	#[serde(default)]
	pub arguments: Vec<Value>,

	/// Whether the call returns a modified clone instead of mutating
	#[serde(default, skip_serializing_if = "std::ops::Not::not")]
	pub returns_clone: bool,
}

impl MethodCall {
	pub fn new(method: impl Into<String>, arguments: Vec<Value>) -> Self {
		Self {
			method: method.into(),
			arguments,
			returns_clone: false,
		}
	}
}

/// Reference to the definition a decorator wraps
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DecoratedService {
	/// Id of the decorated definition
	pub id: String,

	/// Id the decorated definition is renamed to
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub renamed_id: Option<String>,

	/// Decoration priority (higher wraps first)
	#[serde(default)]
	pub priority: i32,
}

impl DecoratedService {
	pub fn new(id: impl Into<String>) -> Self {
		Self {
			id: id.into(),
			renamed_id: None,
			priority: 0,
		}
	}
}

/// Declarative description of one registry entry
///
/// The same shape doubles as a conditional template: an `instanceof`
/// conditional is a definition fragment that contributes tags, method calls,
/// bindings and the shared flag to every definition whose class matches.
#[derive(Debug, Clone, PartialEq)]
pub struct Definition {
	class: Option<String>,
	parent: Option<String>,
	factory: Option<String>,
	arguments: Vec<Value>,
	properties: IndexMap<String, Value>,
	method_calls: Vec<MethodCall>,
	tags: IndexMap<String, Vec<TagAttributes>>,
	bindings: IndexMap<String, Value>,
	decorated_service: Option<DecoratedService>,
	instanceof_conditionals: IndexMap<String, Definition>,
	shared: bool,
	public: bool,
	lazy: bool,
	is_abstract: bool,
	autoconfigured: bool,
	changes: BTreeSet<Change>,
}

impl Default for Definition {
	fn default() -> Self {
		Self {
			class: None,
			parent: None,
			factory: None,
			arguments: Vec::new(),
			properties: IndexMap::new(),
			method_calls: Vec::new(),
			tags: IndexMap::new(),
			bindings: IndexMap::new(),
			decorated_service: None,
			instanceof_conditionals: IndexMap::new(),
			shared: true,
			public: false,
			lazy: false,
			is_abstract: false,
			autoconfigured: false,
			changes: BTreeSet::new(),
		}
	}
}

impl Definition {
	/// Create an empty definition (no class, shared by default)
	pub fn new() -> Self {
		Self::default()
	}

	/// Create a definition for the given class
	pub fn with_class(class: impl Into<String>) -> Self {
		let mut def = Self::default();
		def.set_class(class);
		def
	}

	// -- accessors -----------------------------------------------------------

	pub fn class(&self) -> Option<&str> {
		self.class.as_deref()
	}

	pub fn parent(&self) -> Option<&str> {
		self.parent.as_deref()
	}

	pub fn factory(&self) -> Option<&str> {
		self.factory.as_deref()
	}

	pub fn arguments(&self) -> &[Value] {
		&self.arguments
	}

	pub fn properties(&self) -> &IndexMap<String, Value> {
		&self.properties
	}

	pub fn method_calls(&self) -> &[MethodCall] {
		&self.method_calls
	}

	pub fn tags(&self) -> &IndexMap<String, Vec<TagAttributes>> {
		&self.tags
	}

	/// All attribute sets recorded for `name` (empty if the tag is absent)
	pub fn tag(&self, name: &str) -> &[TagAttributes] {
		self.tags.get(name).map(Vec::as_slice).unwrap_or(&[])
	}

	pub fn has_tag(&self, name: &str) -> bool {
		self.tags.contains_key(name)
	}

	pub fn bindings(&self) -> &IndexMap<String, Value> {
		&self.bindings
	}

	pub fn decorated_service(&self) -> Option<&DecoratedService> {
		self.decorated_service.as_ref()
	}

	pub fn instanceof_conditionals(&self) -> &IndexMap<String, Definition> {
		&self.instanceof_conditionals
	}

	pub fn is_shared(&self) -> bool {
		self.shared
	}

	pub fn is_public(&self) -> bool {
		self.public
	}

	pub fn is_lazy(&self) -> bool {
		self.lazy
	}

	pub fn is_abstract(&self) -> bool {
		self.is_abstract
	}

	pub fn is_autoconfigured(&self) -> bool {
		self.autoconfigured
	}

	/// Fields explicitly set on this definition
	pub fn changes(&self) -> &BTreeSet<Change> {
		&self.changes
	}

	pub fn is_changed(&self, change: Change) -> bool {
		self.changes.contains(&change)
	}

	// -- mutators ------------------------------------------------------------

	pub fn set_class(&mut self, class: impl Into<String>) -> &mut Self {
		self.changes.insert(Change::Class);
		self.class = Some(class.into());
		self
	}

	pub fn set_parent(&mut self, parent: impl Into<String>) -> &mut Self {
		self.parent = Some(parent.into());
		self
	}

	pub fn set_factory(&mut self, factory: impl Into<String>) -> &mut Self {
		self.changes.insert(Change::Factory);
		self.factory = Some(factory.into());
		self
	}

	pub fn set_shared(&mut self, shared: bool) -> &mut Self {
		self.changes.insert(Change::Shared);
		self.shared = shared;
		self
	}

	pub fn set_public(&mut self, public: bool) -> &mut Self {
		self.changes.insert(Change::Public);
		self.public = public;
		self
	}

	pub fn set_lazy(&mut self, lazy: bool) -> &mut Self {
		self.changes.insert(Change::Lazy);
		self.lazy = lazy;
		self
	}

	pub fn set_abstract(&mut self, is_abstract: bool) -> &mut Self {
		self.is_abstract = is_abstract;
		self
	}

	pub fn set_autoconfigured(&mut self, autoconfigured: bool) -> &mut Self {
		self.changes.insert(Change::Autoconfigured);
		self.autoconfigured = autoconfigured;
		self
	}

	pub fn set_decorated_service(&mut self, decorated: Option<DecoratedService>) -> &mut Self {
		self.changes.insert(Change::DecoratedService);
		self.decorated_service = decorated;
		self
	}

	pub fn set_arguments(&mut self, arguments: Vec<Value>) -> &mut Self {
		self.arguments = arguments;
		self
	}

	pub fn add_argument(&mut self, argument: Value) -> &mut Self {
		self.arguments.push(argument);
		self
	}

	pub fn set_property(&mut self, name: impl Into<String>, value: Value) -> &mut Self {
		self.properties.insert(name.into(), value);
		self
	}

	pub fn set_method_calls(&mut self, calls: Vec<MethodCall>) -> &mut Self {
		self.method_calls = calls;
		self
	}

	pub fn add_method_call(&mut self, method: impl Into<String>, arguments: Vec<Value>) -> &mut Self {
		self.method_calls.push(MethodCall::new(method, arguments));
		self
	}

	pub fn set_tags(&mut self, tags: IndexMap<String, Vec<TagAttributes>>) -> &mut Self {
		self.tags = tags;
		self
	}

	/// Record one more occurrence of `name` (duplicates are allowed)
	pub fn add_tag(&mut self, name: impl Into<String>, attributes: TagAttributes) -> &mut Self {
		self.tags.entry(name.into()).or_default().push(attributes);
		self
	}

	pub fn set_bindings(&mut self, bindings: IndexMap<String, Value>) -> &mut Self {
		self.bindings = bindings;
		self
	}

	pub fn set_binding(&mut self, key: impl Into<String>, value: Value) -> &mut Self {
		self.bindings.insert(key.into(), value);
		self
	}

	pub fn set_instanceof_conditionals(&mut self, conditionals: IndexMap<String, Definition>) -> &mut Self {
		self.instanceof_conditionals = conditionals;
		self
	}

	/// Declare a template applied when the class satisfies `interface`
	pub fn set_instanceof_conditional(&mut self, interface: impl Into<String>, template: Definition) -> &mut Self {
		self.instanceof_conditionals.insert(interface.into(), template);
		self
	}

	pub fn take_tags(&mut self) -> IndexMap<String, Vec<TagAttributes>> {
		std::mem::take(&mut self.tags)
	}

	pub fn take_method_calls(&mut self) -> Vec<MethodCall> {
		std::mem::take(&mut self.method_calls)
	}

	pub fn take_bindings(&mut self) -> IndexMap<String, Value> {
		std::mem::take(&mut self.bindings)
	}

	pub fn take_instanceof_conditionals(&mut self) -> IndexMap<String, Definition> {
		std::mem::take(&mut self.instanceof_conditionals)
	}

	/// Remove the decorated service as if it had never been set
	pub fn take_decorated_service(&mut self) -> Option<DecoratedService> {
		self.changes.remove(&Change::DecoratedService);
		self.decorated_service.take()
	}

	/// Turn autoconfiguration off without marking it as explicitly set
	pub fn reset_autoconfigured(&mut self) -> &mut Self {
		self.changes.remove(&Change::Autoconfigured);
		self.autoconfigured = false;
		self
	}

	// -- builder style -------------------------------------------------------

	pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
		self.set_parent(parent);
		self
	}

	pub fn with_shared(mut self, shared: bool) -> Self {
		self.set_shared(shared);
		self
	}

	pub fn with_autoconfigured(mut self, autoconfigured: bool) -> Self {
		self.set_autoconfigured(autoconfigured);
		self
	}

	pub fn with_argument(mut self, argument: Value) -> Self {
		self.add_argument(argument);
		self
	}

	pub fn with_tag(mut self, name: impl Into<String>, attributes: TagAttributes) -> Self {
		self.add_tag(name, attributes);
		self
	}

	pub fn with_method_call(mut self, method: impl Into<String>, arguments: Vec<Value>) -> Self {
		self.add_method_call(method, arguments);
		self
	}

	pub fn with_binding(mut self, key: impl Into<String>, value: Value) -> Self {
		self.set_binding(key, value);
		self
	}

	pub fn with_decorated_service(mut self, id: impl Into<String>) -> Self {
		self.set_decorated_service(Some(DecoratedService::new(id)));
		self
	}

	pub fn with_conditional(mut self, interface: impl Into<String>, template: Definition) -> Self {
		self.set_instanceof_conditional(interface, template);
		self
	}
}

/// Build tag attributes from `(key, value)` pairs
pub fn tag_attributes<K: Into<String>>(pairs: impl IntoIterator<Item = (K, Value)>) -> TagAttributes {
	pairs.into_iter().map(|(k, v)| (k.into(), v)).collect()
}
