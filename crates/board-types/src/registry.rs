//! Registry trait for self-registering implementations.

/// Base trait for implementation registries.
///
/// Each pluggable implementation (currently the order sources) provides a
/// registry struct that declares its configuration name and factory.
pub trait ImplementationRegistry {
	/// Key used under `[source.implementations]`, e.g. "http" or "memory".
	const NAME: &'static str;

	/// The factory function type this implementation provides.
	type Factory;

	/// Returns the factory that builds the implementation from its config table.
	fn factory() -> Self::Factory;
}
