// Container parameters and %placeholder% resolution

use std::sync::LazyLock;

use indexmap::IndexMap;
use regex::Regex;
use serde_json::Value;

use crate::error::ContainerError;

static WHOLE_PLACEHOLDER: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"^%([^%\s]+)%$").expect("valid regex"));
static PLACEHOLDER: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"%%|%([^%\s]+)%").expect("valid regex"));

/// Named configuration values referenced from definitions as `%name%`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParameterBag {
	parameters: IndexMap<String, Value>,
}

impl ParameterBag {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn set(&mut self, name: impl Into<String>, value: Value) {
		self.parameters.insert(name.into(), value);
	}

	pub fn get(&self, name: &str) -> Option<&Value> {
		self.parameters.get(name)
	}

	pub fn has(&self, name: &str) -> bool {
		self.parameters.contains_key(name)
	}

	pub fn remove(&mut self, name: &str) -> Option<Value> {
		self.parameters.shift_remove(name)
	}

	pub fn all(&self) -> &IndexMap<String, Value> {
		&self.parameters
	}

	pub fn len(&self) -> usize {
		self.parameters.len()
	}

	pub fn is_empty(&self) -> bool {
		self.parameters.is_empty()
	}

	/// Replace every `%name%` placeholder in `value`
	///
	/// `%%` stands for a literal percent sign. Parameter values that are
	/// themselves strings are resolved recursively.
	pub fn resolve_value(&self, value: &str) -> Result<String, ContainerError> {
		self.resolve_string(value, &mut Vec::new())
	}

	fn resolve_string(&self, value: &str, resolving: &mut Vec<String>) -> Result<String, ContainerError> {
		if let Some(caps) = WHOLE_PLACEHOLDER.captures(value) {
			return self.resolve_named(&caps[1], resolving);
		}

		let mut resolved = String::with_capacity(value.len());
		let mut last = 0;
		for caps in PLACEHOLDER.captures_iter(value) {
			let Some(m) = caps.get(0) else {
				continue;
			};
			resolved.push_str(&value[last..m.start()]);
			match caps.get(1) {
				Some(name) => resolved.push_str(&self.resolve_named(name.as_str(), resolving)?),
				None => resolved.push('%'),
			}
			last = m.end();
		}
		resolved.push_str(&value[last..]);

		Ok(resolved)
	}

	fn resolve_named(&self, name: &str, resolving: &mut Vec<String>) -> Result<String, ContainerError> {
		if resolving.iter().any(|n| n == name) {
			let mut path = resolving.clone();
			path.push(name.to_string());
			return Err(ContainerError::ParameterCircularReference { path });
		}

		let value = self
			.get(name)
			.ok_or_else(|| ContainerError::parameter_not_found(name))?;

		match value {
			Value::String(s) => {
				resolving.push(name.to_string());
				let resolved = self.resolve_string(s, resolving);
				resolving.pop();
				resolved
			},
			Value::Number(n) => Ok(n.to_string()),
			Value::Bool(b) => Ok(b.to_string()),
			Value::Null => Ok(String::new()),
			Value::Array(_) | Value::Object(_) => Err(ContainerError::invalid_parameter(
				name,
				"a non-scalar value cannot be used as a string",
			)),
		}
	}
}
