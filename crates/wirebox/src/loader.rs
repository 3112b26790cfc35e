// Loading and dumping container files in JSON or YAML

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use tracing::info;

use crate::builder::ContainerBuilder;
use crate::error::ContainerError;
use crate::types::ContainerFile;

/// Serialization format of a container file
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ContainerFormat {
	#[default]
	Json,
	Yaml,
}

impl ContainerFormat {
	/// Pick the format from the file extension
	pub fn from_path(path: &Path) -> Result<Self, ContainerError> {
		let ext = path.extension().and_then(|e| e.to_str()).unwrap_or_default();
		ext.parse()
			.map_err(|_| ContainerError::UnsupportedFormat(path.display().to_string()))
	}
}

impl FromStr for ContainerFormat {
	type Err = ContainerError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.to_ascii_lowercase().as_str() {
			"json" => Ok(ContainerFormat::Json),
			"yaml" | "yml" => Ok(ContainerFormat::Yaml),
			other => Err(ContainerError::UnsupportedFormat(other.to_string())),
		}
	}
}

impl fmt::Display for ContainerFormat {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			ContainerFormat::Json => f.write_str("json"),
			ContainerFormat::Yaml => f.write_str("yaml"),
		}
	}
}

/// Parse a container file from its textual form
pub fn parse_str(content: &str, format: ContainerFormat) -> Result<ContainerFile, ContainerError> {
	let file = match format {
		ContainerFormat::Json => serde_json::from_str(content)?,
		ContainerFormat::Yaml => serde_yaml::from_str(content)?,
	};
	Ok(file)
}

/// Render a container file in the given format
pub fn to_string(file: &ContainerFile, format: ContainerFormat) -> Result<String, ContainerError> {
	let out = match format {
		ContainerFormat::Json => serde_json::to_string_pretty(file)?,
		ContainerFormat::Yaml => serde_yaml::to_string(file)?,
	};
	Ok(out)
}

/// Read a container file, choosing the format from its extension
pub fn load_file(path: impl AsRef<Path>) -> Result<ContainerFile, ContainerError> {
	let path = path.as_ref();
	let format = ContainerFormat::from_path(path)?;
	info!(target: "wirebox", "Loading container from file: {}", path.display());
	let content = fs_err::read_to_string(path)?;
	let file = parse_str(&content, format)?;
	info!(target: "wirebox", "Loaded {} service definitions from {}", file.len(), path.display());
	Ok(file)
}

/// Read a container file straight into a builder
pub fn load_builder(path: impl AsRef<Path>) -> Result<ContainerBuilder, ContainerError> {
	Ok(load_file(path)?.into_builder())
}
