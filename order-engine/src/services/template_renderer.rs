//! `{{variable}}` substitution for message templates.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::collections::HashMap;

use crate::error::EngineError;

/// `{{name}}`, whitespace inside the braces tolerated.
static PLACEHOLDER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\{\{\s*([\w.\-]+)\s*\}\}").expect("Invalid placeholder pattern")
});

/// Template renderer.
#[derive(Debug, Clone)]
pub struct TemplateRenderer;

impl TemplateRenderer {
    /// Distinct variable names in first-seen order.
    pub fn extract_variables(content: &str) -> Vec<String> {
        let mut variables: Vec<String> = Vec::new();
        for captures in PLACEHOLDER.captures_iter(content) {
            let name = &captures[1];
            if !variables.iter().any(|v| v == name) {
                variables.push(name.to_string());
            }
        }
        variables
    }

    /// Substitute known variables. Unknown placeholders are left in the
    /// output exactly as written. Substituted values are not re-scanned.
    pub fn render(content: &str, context: &HashMap<String, String>) -> String {
        PLACEHOLDER
            .replace_all(content, |captures: &Captures| {
                context
                    .get(&captures[1])
                    .cloned()
                    .unwrap_or_else(|| captures[0].to_string())
            })
            .into_owned()
    }

    /// Render content that arrived as untyped JSON.
    pub fn render_value(
        content: &serde_json::Value,
        context: &HashMap<String, String>,
    ) -> Result<String, EngineError> {
        match content.as_str() {
            Some(text) => Ok(Self::render(text, context)),
            None => Err(EngineError::validation(
                "content",
                "template content must be a string",
            )),
        }
    }

    /// Variables the content references that the context cannot resolve.
    pub fn unresolved(content: &str, context: &HashMap<String, String>) -> Vec<String> {
        Self::extract_variables(content)
            .into_iter()
            .filter(|name| !context.contains_key(name))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_extract_variables_first_seen_order() {
        let vars = TemplateRenderer::extract_variables(
            "{{b}} then {{a}} then {{b}} then {{ c }}",
        );
        assert_eq!(vars, vec!["b", "a", "c"]);
    }

    #[test]
    fn test_extract_ignores_malformed_placeholders() {
        let vars = TemplateRenderer::extract_variables("{{}} {{two words}} {{ok}} {{unclosed");
        assert_eq!(vars, vec!["ok"]);
    }

    #[test]
    fn test_render_leaves_missing_variables_literal() {
        let rendered = TemplateRenderer::render(
            "Hello {{clientName}}, balance {{balance}}",
            &context(&[("clientName", "Asha")]),
        );
        assert_eq!(rendered, "Hello Asha, balance {{balance}}");
    }

    #[test]
    fn test_render_replaces_every_occurrence() {
        let rendered = TemplateRenderer::render(
            "{{name}} / {{ name }} / {{name}}",
            &context(&[("name", "Ravi")]),
        );
        assert_eq!(rendered, "Ravi / Ravi / Ravi");
    }

    #[test]
    fn test_render_does_not_rescan_substituted_values() {
        let rendered = TemplateRenderer::render(
            "{{a}} {{b}}",
            &context(&[("a", "{{b}}"), ("b", "x")]),
        );
        assert_eq!(rendered, "{{b}} x");
    }

    #[test]
    fn test_render_triple_braces() {
        let rendered = TemplateRenderer::render("{{{name}}}", &context(&[("name", "Ravi")]));
        assert_eq!(rendered, "{Ravi}");
    }

    #[test]
    fn test_render_handles_multibyte_text() {
        let rendered = TemplateRenderer::render(
            "नमस्ते {{clientName}} — ₹{{balance}}",
            &context(&[("clientName", "आशा"), ("balance", "600")]),
        );
        assert_eq!(rendered, "नमस्ते आशा — ₹600");
    }

    #[test]
    fn test_render_value_rejects_non_string_content() {
        let result = TemplateRenderer::render_value(&serde_json::json!(42), &HashMap::new());
        assert!(matches!(result, Err(EngineError::Validation { field, .. }) if field == "content"));

        let ok = TemplateRenderer::render_value(
            &serde_json::json!("Hi {{n}}"),
            &context(&[("n", "Asha")]),
        )
        .unwrap();
        assert_eq!(ok, "Hi Asha");
    }

    #[test]
    fn test_unresolved_lists_missing_names() {
        let missing = TemplateRenderer::unresolved(
            "{{clientName}} {{balance}} {{shopName}}",
            &context(&[("clientName", "Asha")]),
        );
        assert_eq!(missing, vec!["balance", "shopName"]);
    }
}
