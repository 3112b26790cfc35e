//! Compiler passes that rewrite a [`ContainerBuilder`] before it is used.
//!
//! Passes run in the order they were added. The default compiler runs the
//! instanceof conditional resolution pass.

mod instanceof;

use std::fmt;

use tracing::info;

use crate::builder::ContainerBuilder;
use crate::error::ContainerError;

pub use instanceof::{
	BEHAVIOR_DESCRIBING_TAGS, ResolveInstanceofConditionalsPass, abstract_id, instanceof_id, is_synthetic_id,
};

/// A single rewrite step over the whole container
pub trait CompilerPass: fmt::Debug {
	/// Short name used in logs
	fn name(&self) -> &'static str;

	fn process(&self, container: &mut ContainerBuilder) -> Result<(), ContainerError>;
}

/// Ordered list of compiler passes
#[derive(Debug)]
pub struct Compiler {
	passes: Vec<Box<dyn CompilerPass>>,
}

impl Default for Compiler {
	fn default() -> Self {
		Self {
			passes: vec![Box::new(ResolveInstanceofConditionalsPass::new())],
		}
	}
}

impl Compiler {
	/// Create a compiler without any passes
	pub fn empty() -> Self {
		Self { passes: Vec::new() }
	}

	pub fn add_pass(&mut self, pass: impl CompilerPass + 'static) -> &mut Self {
		self.passes.push(Box::new(pass));
		self
	}

	pub fn pass_names(&self) -> impl Iterator<Item = &'static str> + '_ {
		self.passes.iter().map(|p| p.name())
	}

	/// Run every pass in order, stopping at the first failure
	pub fn compile(&self, container: &mut ContainerBuilder) -> Result<(), ContainerError> {
		for pass in &self.passes {
			info!(target: "wirebox", pass = pass.name(), definitions = container.len(), "running compiler pass");
			pass.process(container)?;
		}
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use std::sync::Arc;
	use std::sync::atomic::{AtomicUsize, Ordering};

	use assert_matches::assert_matches;

	use super::*;

	#[derive(Debug)]
	struct CountingPass {
		name: &'static str,
		calls: Arc<AtomicUsize>,
		fail: bool,
	}

	impl CompilerPass for CountingPass {
		fn name(&self) -> &'static str {
			self.name
		}

		fn process(&self, container: &mut ContainerBuilder) -> Result<(), ContainerError> {
			self.calls.fetch_add(1, Ordering::SeqCst);
			if self.fail {
				return Err(ContainerError::DefinitionNotFound(self.name.to_string()));
			}
			container.register(self.name, "App\\Marker");
			Ok(())
		}
	}

	#[test]
	fn test_default_compiler_runs_instanceof_pass() {
		let names: Vec<_> = Compiler::default().pass_names().collect();
		assert_eq!(names, vec!["resolve_instanceof_conditionals"]);
	}

	#[test]
	fn test_passes_run_in_order() {
		let calls = Arc::new(AtomicUsize::new(0));
		let mut compiler = Compiler::empty();
		compiler
			.add_pass(CountingPass { name: "first", calls: calls.clone(), fail: false })
			.add_pass(CountingPass { name: "second", calls: calls.clone(), fail: false });

		let mut container = ContainerBuilder::new();
		compiler.compile(&mut container).unwrap();

		assert_eq!(calls.load(Ordering::SeqCst), 2);
		let ids: Vec<_> = container.definitions().keys().cloned().collect();
		assert_eq!(ids, vec!["first", "second"]);
	}

	#[test]
	fn test_failure_stops_remaining_passes() {
		let calls = Arc::new(AtomicUsize::new(0));
		let mut compiler = Compiler::empty();
		compiler
			.add_pass(CountingPass { name: "broken", calls: calls.clone(), fail: true })
			.add_pass(CountingPass { name: "never", calls: calls.clone(), fail: false });

		let mut container = ContainerBuilder::new();
		let err = compiler.compile(&mut container).unwrap_err();

		assert_matches!(err, ContainerError::DefinitionNotFound(name) if name == "broken");
		assert_eq!(calls.load(Ordering::SeqCst), 1);
		assert!(container.is_empty());
	}
}
