// Integration tests for loading and compiling container files

use std::path::PathBuf;

use assert_matches::assert_matches;
use serde_json::json;
use tempfile::NamedTempFile;
use wirebox::loader::{self, ContainerFormat};
use wirebox::{BEHAVIOR_DESCRIBING_TAGS, ContainerBuilder, ContainerError, ContainerFile, Definition, tag_attributes};

fn fixture(name: &str) -> PathBuf {
	PathBuf::from(env!("CARGO_MANIFEST_DIR"))
		.join("tests/fixtures/container")
		.join(name)
}

fn compiled(name: &str) -> ContainerBuilder {
	let mut builder = loader::load_builder(fixture(name)).unwrap_or_else(|e| panic!("failed to load {name}: {e}"));
	builder
		.compile()
		.unwrap_or_else(|e| panic!("failed to compile {name}: {e}"));
	builder
}

fn methods(def: &Definition) -> Vec<&str> {
	def.method_calls().iter().map(|c| c.method.as_str()).collect()
}

#[test]
fn test_autoconfigured_yaml_container() {
	let builder = compiled("loggable.yaml");

	let mailer = builder.get_definition("mailer").unwrap();
	assert_eq!(mailer.parent(), Some("instanceof.App\\Loggable.0.mailer"));
	assert_eq!(methods(mailer), vec!["setLogger"]);
	assert!(mailer.has_tag("monitor.tag"));
	assert!(!mailer.is_autoconfigured());

	let link = builder.get_definition("instanceof.App\\Loggable.0.mailer").unwrap();
	assert!(link.is_abstract());
	assert_eq!(link.parent(), Some("abstract-instanceof.mailer"));
	assert!(link.method_calls().is_empty());

	let placeholder = builder.get_definition("abstract-instanceof.mailer").unwrap();
	assert!(placeholder.is_abstract());
	assert_eq!(placeholder.class(), Some("%app.namespace%\\Mailer"));

	assert!(!builder.has_parameter(BEHAVIOR_DESCRIBING_TAGS));
	assert!(builder.get_definition("logger").unwrap().parent().is_none());
}

#[test]
fn test_class_hierarchy_applies_every_matching_template() {
	let builder = compiled("loggable.yaml");

	let buffered = builder.get_definition("buffered_mailer").unwrap();
	assert_eq!(buffered.parent(), Some("instanceof.App\\Resettable.0.buffered_mailer"));
	assert_eq!(
		builder
			.get_definition("instanceof.App\\Resettable.0.buffered_mailer")
			.unwrap()
			.parent(),
		Some("instanceof.App\\Loggable.0.buffered_mailer")
	);

	let tag_names: Vec<_> = buffered.tags().keys().cloned().collect();
	assert_eq!(tag_names, vec!["kernel.reset", "monitor.tag"]);
	assert_eq!(buffered.tag("kernel.reset"), &[tag_attributes([("method", json!("reset"))])]);
	assert_eq!(buffered.bindings()["$limit"], json!(10));
}

#[test]
fn test_decorator_keeps_only_behavior_tags() {
	let builder = compiled("loggable.yaml");

	let decorator = builder.get_definition("mailer.traceable").unwrap();
	let tag_names: Vec<_> = decorator.tags().keys().cloned().collect();
	assert_eq!(tag_names, vec!["kernel.reset"]);
	assert_eq!(methods(decorator), vec!["setLogger"]);

	let placeholder = builder.get_definition("abstract-instanceof.mailer.traceable").unwrap();
	assert!(placeholder.decorated_service().is_none());
}

#[test]
fn test_local_conditionals_extend_existing_parent() {
	let builder = compiled("handlers.json");

	let handler = builder.get_definition("handler.create").unwrap();
	assert_eq!(handler.parent(), Some("instanceof.App\\Handler.0.handler.create"));
	assert_eq!(methods(handler), vec!["setBus", "setClock"]);
	assert!(!handler.is_shared());
	assert_eq!(handler.tag("bus.handler"), &[tag_attributes([("bus", json!("command"))])]);
	assert!(handler.instanceof_conditionals().is_empty());

	let link = builder
		.get_definition("instanceof.App\\Handler.0.handler.create")
		.unwrap();
	assert_eq!(link.parent(), Some("handler.base"));

	let placeholder = builder.get_definition("abstract-instanceof.handler.create").unwrap();
	assert_eq!(placeholder.parent(), Some("handler.base"));
}

#[test]
fn test_unknown_local_interface_fails_compilation() {
	let mut builder = loader::load_builder(fixture("unknown-interface.json")).unwrap();
	let err = builder.compile().unwrap_err();

	assert_matches!(&err, ContainerError::UnknownConditionalInterface { interface } if interface == "App\\DoesNotExist");
	assert!(err.to_string().contains("does not exist"));
}

#[test]
fn test_compiled_dump_is_stable() -> anyhow::Result<()> {
	let builder = compiled("loggable.yaml");
	let dumped = ContainerFile::from_builder(&builder);
	assert_eq!(dumped.services["mailer"].autoconfigure, None);

	let temp_file = NamedTempFile::with_suffix(".json")?;
	std::fs::write(temp_file.path(), loader::to_string(&dumped, ContainerFormat::Json)?)?;

	let mut reloaded = loader::load_builder(temp_file.path())?;
	reloaded.compile()?;
	assert_eq!(ContainerFile::from_builder(&reloaded), dumped);
	Ok(())
}

#[test]
fn test_yaml_and_json_dumps_agree() -> anyhow::Result<()> {
	let builder = compiled("handlers.json");
	let dumped = ContainerFile::from_builder(&builder);

	let yaml = loader::to_string(&dumped, ContainerFormat::Yaml)?;
	let temp_file = NamedTempFile::with_suffix(".yml")?;
	std::fs::write(temp_file.path(), &yaml)?;

	assert_eq!(loader::load_file(temp_file.path())?, dumped);
	Ok(())
}

#[test]
fn test_autoconfigured_template_with_arguments_is_rejected() -> anyhow::Result<()> {
	let container = r#"{
		"instanceof": { "App\\Loggable": { "arguments": ["@logger"] } },
		"services": { "mailer": { "class": "App\\Mailer", "autoconfigure": true } }
	}"#;
	let temp_file = NamedTempFile::with_suffix(".json")?;
	std::fs::write(temp_file.path(), container)?;

	let mut builder = loader::load_builder(temp_file.path())?;
	assert_matches!(
		builder.compile(),
		Err(ContainerError::InvalidTemplateArguments { interface }) if interface == "App\\Loggable"
	);
	assert_eq!(builder.len(), 1);
	Ok(())
}

#[test]
fn test_local_template_with_arguments_is_rejected() -> anyhow::Result<()> {
	let container = r#"{
		"classes": [{ "name": "App\\Loggable", "kind": "interface" }],
		"services": {
			"mailer": {
				"class": "App\\Mailer",
				"instanceof": { "App\\Loggable": { "arguments": ["@logger"] } }
			}
		}
	}"#;
	let temp_file = NamedTempFile::with_suffix(".json")?;
	std::fs::write(temp_file.path(), container)?;

	let mut builder = loader::load_builder(temp_file.path())?;
	assert_matches!(
		builder.compile(),
		Err(ContainerError::InvalidTemplateArguments { interface }) if interface == "App\\Loggable"
	);
	Ok(())
}

#[test]
fn test_unsupported_extension() -> anyhow::Result<()> {
	let temp_file = NamedTempFile::with_suffix(".xml")?;
	assert_matches!(loader::load_file(temp_file.path()), Err(ContainerError::UnsupportedFormat(_)));
	Ok(())
}
