//! Service container definitions and the compiler passes that rewrite them.
//!
//! A [`ContainerBuilder`] collects [`Definition`]s, parameters and class
//! metadata, usually loaded from a [`ContainerFile`]. Compiling the builder
//! runs [`ResolveInstanceofConditionalsPass`], which turns instanceof
//! conditionals into chains of abstract parent definitions.

pub mod builder;
pub mod compiler;
pub mod definition;
pub mod error;
pub mod loader;
pub mod parameters;
pub mod reflection;
pub mod registry;
pub mod types;

pub use builder::ContainerBuilder;
pub use compiler::{
	BEHAVIOR_DESCRIBING_TAGS, Compiler, CompilerPass, ResolveInstanceofConditionalsPass, abstract_id, instanceof_id,
	is_synthetic_id,
};
pub use definition::{Change, DecoratedService, Definition, MethodCall, TagAttributes, tag_attributes};
pub use error::ContainerError;
pub use loader::{ContainerFormat, load_builder, load_file};
pub use parameters::ParameterBag;
pub use reflection::{ClassInfo, ClassKind, ClassMap};
pub use registry::DefinitionRegistry;
pub use types::{ContainerFile, DecoratesSpec, DefinitionSpec, TagSpec};
