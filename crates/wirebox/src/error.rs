// Container error types

use thiserror::Error;

/// Errors that can occur while loading or compiling a container
#[derive(Error, Debug)]
pub enum ContainerError {
	#[error(
		"instanceof conditional for type '{interface}' defines arguments but these are not supported and should be removed"
	)]
	InvalidTemplateArguments { interface: String },

	#[error("'{interface}' is set as an instanceof conditional, but it does not exist")]
	UnknownConditionalInterface { interface: String },

	#[error("parameter '{name}' not found")]
	ParameterNotFound { name: String },

	#[error("circular reference detected for parameter '{}'", .path.join(" -> "))]
	ParameterCircularReference { path: Vec<String> },

	#[error("invalid value for parameter '{name}': {message}")]
	InvalidParameter { name: String, message: String },

	#[error("definition '{0}' not found")]
	DefinitionNotFound(String),

	#[error("failed to parse container file: {0}")]
	Parse(#[from] serde_json::Error),

	#[error("failed to parse container file: {0}")]
	Yaml(#[from] serde_yaml::Error),

	#[error("failed to read container file: {0}")]
	Io(#[from] std::io::Error),

	#[error("unsupported container file format: {0}")]
	UnsupportedFormat(String),
}

impl ContainerError {
	pub fn invalid_template_arguments(interface: impl Into<String>) -> Self {
		Self::InvalidTemplateArguments {
			interface: interface.into(),
		}
	}

	pub fn unknown_conditional_interface(interface: impl Into<String>) -> Self {
		Self::UnknownConditionalInterface {
			interface: interface.into(),
		}
	}

	pub fn parameter_not_found(name: impl Into<String>) -> Self {
		Self::ParameterNotFound { name: name.into() }
	}

	pub fn invalid_parameter(name: impl Into<String>, message: impl Into<String>) -> Self {
		Self::InvalidParameter {
			name: name.into(),
			message: message.into(),
		}
	}
}
