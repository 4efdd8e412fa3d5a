//! Text functions available inside every template.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use cruet::case::kebab::to_kebab_case;

/// A function callable from templates on a single string argument.
pub type TextFn = fn(&str) -> String;

static DEFAULT_REGISTRY: LazyLock<FunctionRegistry> = LazyLock::new(FunctionRegistry::new);

/// Immutable mapping from a template-visible name to a text function.
///
/// The registry is handed to [`crate::renderer::MiniJinjaRenderer`] when the
/// engine is built; templates can then call each entry either as a function
/// (`{{ kebab(name) }}`) or as a filter (`{{ name | kebab }}`).
#[derive(Debug, Clone)]
pub struct FunctionRegistry {
    functions: BTreeMap<&'static str, TextFn>,
}

fn lower(value: &str) -> String {
    value.to_lowercase()
}

impl FunctionRegistry {
    /// Creates the registry with the built-in functions:
    /// * `kebab` - converts to kebab-case
    /// * `lower` - converts to lowercase
    pub fn new() -> Self {
        let mut functions: BTreeMap<&'static str, TextFn> = BTreeMap::new();
        functions.insert("kebab", to_kebab_case);
        functions.insert("lower", lower);
        Self { functions }
    }

    /// Returns a copy of this registry with `func` registered under `name`.
    pub fn with(mut self, name: &'static str, func: TextFn) -> Self {
        self.functions.insert(name, func);
        self
    }

    pub fn get(&self, name: &str) -> Option<TextFn> {
        self.functions.get(name).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, TextFn)> + '_ {
        self.functions.iter().map(|(name, func)| (*name, *func))
    }
}

impl Default for FunctionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// The process-wide registry, built on first use.
pub fn default_registry() -> &'static FunctionRegistry {
    &DEFAULT_REGISTRY
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kebab() {
        let kebab = default_registry().get("kebab").unwrap();
        assert_eq!(kebab("HelloWorld"), "hello-world");
        assert_eq!(kebab("hello world"), "hello-world");
        assert_eq!(kebab("my_project_name"), "my-project-name");
    }

    #[test]
    fn test_lower() {
        let lower = default_registry().get("lower").unwrap();
        assert_eq!(lower("Hello WORLD"), "hello world");
    }

    #[test]
    fn test_unknown_function() {
        assert!(default_registry().get("upper").is_none());
    }

    #[test]
    fn test_with_adds_function() {
        fn shout(value: &str) -> String {
            value.to_uppercase()
        }
        let registry = FunctionRegistry::new().with("upper", shout);
        let names: Vec<&str> = registry.iter().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["kebab", "lower", "upper"]);
    }
}
