//! Template engine used for `.tmpl` files.
//! Wraps a MiniJinja environment configured for plain-text output with the
//! functions of a [`FunctionRegistry`] available to every template.
use std::io::Write;

use minijinja::{AutoEscape, Environment, UndefinedBehavior};
use serde::Serialize;

use crate::functions::{default_registry, FunctionRegistry};

/// MiniJinja-based template rendering engine.
#[derive(Clone)]
pub struct MiniJinjaRenderer {
    /// MiniJinja environment instance
    env: Environment<'static>,
}

/// A template that parsed successfully and is ready to be executed.
pub struct CompiledTemplate {
    env: Environment<'static>,
    name: String,
}

impl MiniJinjaRenderer {
    /// Creates an engine backed by the process-wide function registry.
    pub fn new() -> Self {
        Self::with_functions(default_registry())
    }

    /// Creates an engine exposing the functions of `registry`.
    ///
    /// The environment keeps the trailing newline of templates, never
    /// auto-escapes and treats undefined values as errors.
    pub fn with_functions(registry: &FunctionRegistry) -> Self {
        let mut env = Environment::new();
        env.set_keep_trailing_newline(true);
        env.set_auto_escape_callback(|_| AutoEscape::None);
        env.set_undefined_behavior(UndefinedBehavior::Strict);

        for (name, func) in registry.iter() {
            env.add_function(name, func);
            env.add_filter(name, func);
        }

        Self { env }
    }

    /// Makes undefined values render as empty strings instead of failing.
    pub fn lenient(mut self) -> Self {
        self.env.set_undefined_behavior(UndefinedBehavior::Lenient);
        self
    }

    /// Parses `source` as a template registered under `name`.
    ///
    /// # Errors
    /// * Returns the MiniJinja syntax error if the template is malformed
    pub fn compile(
        &self,
        name: &str,
        source: &str,
    ) -> Result<CompiledTemplate, minijinja::Error> {
        let mut env = self.env.clone();
        env.add_template_owned(name.to_string(), source.to_string())?;
        Ok(CompiledTemplate { env, name: name.to_string() })
    }

    /// Renders a template string with the given context.
    pub fn render_str<S: Serialize>(
        &self,
        source: &str,
        context: S,
    ) -> Result<String, minijinja::Error> {
        let mut buf = Vec::new();
        self.compile("temp", source)?.execute(context, &mut buf)?;
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }
}

impl Default for MiniJinjaRenderer {
    fn default() -> Self {
        MiniJinjaRenderer::new()
    }
}

impl CompiledTemplate {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Evaluates the template against `context`, streaming the output into `out`.
    pub fn execute<S: Serialize, W: Write>(
        &self,
        context: S,
        out: W,
    ) -> Result<(), minijinja::Error> {
        let tmpl = self.env.get_template(&self.name)?;
        tmpl.render_to_write(context, out)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn render(template: &str, context: serde_json::Value) -> String {
        MiniJinjaRenderer::new().render_str(template, context).unwrap()
    }

    #[test]
    fn test_field_access() {
        let context = json!({"name": "test", "value": 42, "project": {"slug": "demo"}});
        assert_eq!(render("Hello {{ name }}!", context.clone()), "Hello test!");
        assert_eq!(render("Value: {{ value }}", context.clone()), "Value: 42");
        assert_eq!(render("{{ project.slug }}", context), "demo");
    }

    #[test]
    fn test_kebab_function_and_filter() {
        let context = json!({"name": "MyProjectName"});
        assert_eq!(render("{{ kebab(name) }}", context.clone()), "my-project-name");
        assert_eq!(render("{{ name | kebab }}", context), "my-project-name");
    }

    #[test]
    fn test_lower_function_and_filter() {
        let context = json!({"name": "MyProject"});
        assert_eq!(render("{{ lower(name) }}", context.clone()), "myproject");
        assert_eq!(render("{{ name | lower }}", context), "myproject");
    }

    #[test]
    fn test_keeps_trailing_newline() {
        assert_eq!(render("{{ a }}\n", json!({"a": "x"})), "x\n");
    }

    #[test]
    fn test_never_escapes() {
        let engine = MiniJinjaRenderer::new();
        let mut out = Vec::new();
        engine
            .compile("index.html", "{{ markup }}")
            .unwrap()
            .execute(json!({"markup": "<b>g'day</b>"}), &mut out)
            .unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "<b>g'day</b>");
    }

    #[test]
    fn test_undefined_is_fatal() {
        let engine = MiniJinjaRenderer::new();
        let err = engine.render_str("{{ missing }}", json!({})).unwrap_err();
        assert_eq!(err.kind(), minijinja::ErrorKind::UndefinedError);
    }

    #[test]
    fn test_lenient_renders_empty() {
        let engine = MiniJinjaRenderer::new().lenient();
        assert_eq!(engine.render_str("[{{ missing }}]", json!({})).unwrap(), "[]");
    }

    #[test]
    fn test_syntax_error_on_compile() {
        let engine = MiniJinjaRenderer::new();
        let err = engine.compile("broken.tmpl", "{{ unclosed").err().unwrap();
        assert_eq!(err.kind(), minijinja::ErrorKind::SyntaxError);
    }

    #[test]
    fn test_custom_registry() {
        fn shout(value: &str) -> String {
            value.to_uppercase()
        }
        let registry = FunctionRegistry::new().with("shout", shout);
        let engine = MiniJinjaRenderer::with_functions(&registry);
        assert_eq!(engine.render_str("{{ shout('hi') }}", json!({})).unwrap(), "HI");
    }
}
