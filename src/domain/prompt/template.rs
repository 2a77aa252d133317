//! Link reference templates
//!
//! Supports reference syntax: `{{link}}` and `{{link.path.to.field}}`
//! - The first segment names a link, the rest walk into its result
//! - Numeric segments index into arrays (`{{search.documents.0.title}}`)
//! - A reference that cannot be resolved is left in the output verbatim

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde_json::Value;

use crate::domain::chain::{LinkResults, PathLookup};

/// Regex to match references: {{name}} or {{name.path.to.field}}
static REFERENCE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\{\{\s*([a-zA-Z0-9_-]+(?:\.[a-zA-Z0-9_-]+)*)\s*\}\}").unwrap()
});

/// Render a template against the accumulated link results.
///
/// Without results the template is returned as-is. Each reference is resolved
/// on its own; an unresolvable one keeps its original text so partial
/// pipelines still produce usable prompts.
pub fn render(template: &str, results: Option<&LinkResults>) -> String {
    let Some(results) = results else {
        return template.to_string();
    };

    REFERENCE_PATTERN
        .replace_all(template, |caps: &Captures| match results.lookup(&caps[1]) {
            PathLookup::Found(value) => value_to_string(value),
            PathLookup::Missing { .. } => caps[0].to_string(),
        })
        .into_owned()
}

/// Extract all referenced paths, in order of appearance
pub fn references(template: &str) -> Vec<String> {
    REFERENCE_PATTERN
        .captures_iter(template)
        .map(|caps| caps[1].to_string())
        .collect()
}

/// Check if a string contains any references
pub fn has_references(template: &str) -> bool {
    REFERENCE_PATTERN.is_match(template)
}

/// Convert a JSON value to its template string form
pub fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),

        // For arrays and objects, use JSON representation
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn results() -> LinkResults {
        let mut results = LinkResults::new();
        results.insert("step1", json!("i")).unwrap();
        results.insert("step2", json!("Ivan")).unwrap();
        results
            .insert(
                "step3",
                json!({
                    "name": "Ivan",
                    "gender": "boy",
                    "age": 7,
                    "meta": { "nickname": null, "verified": true },
                    "siblings": ["Olga", "Petr"]
                }),
            )
            .unwrap();
        results
    }

    #[test]
    fn test_render_simple_reference() {
        let result = render("Name starts with {{step1}}", Some(&results()));
        assert_eq!(result, "Name starts with i");
    }

    #[test]
    fn test_render_multiple_references() {
        let result = render("{{step2}} is a {{step3.gender}}, age {{step3.age}}", Some(&results()));
        assert_eq!(result, "Ivan is a boy, age 7");
    }

    #[test]
    fn test_render_nested_and_indexed_paths() {
        let results = results();

        assert_eq!(render("{{step3.meta.verified}}", Some(&results)), "true");
        assert_eq!(render("{{step3.siblings.1}}", Some(&results)), "Petr");
    }

    #[test]
    fn test_render_without_results_is_identity() {
        let template = "Hello {{step1}} and {{step3.name}}";
        assert_eq!(render(template, None), template);
    }

    #[test]
    fn test_unknown_reference_is_left_untouched() {
        let template = "Hello {{nobody}}!";
        assert_eq!(render(template, Some(&results())), template);
    }

    #[test]
    fn test_partial_path_is_left_untouched() {
        let result = render(
            "{{step3.name}} lives in {{step3.address.city}}",
            Some(&results()),
        );
        assert_eq!(result, "Ivan lives in {{step3.address.city}}");
    }

    #[test]
    fn test_render_tolerates_inner_whitespace() {
        assert_eq!(render("Hi {{ step2 }}", Some(&results())), "Hi Ivan");
    }

    #[test]
    fn test_render_value_conversion() {
        let results = results();

        assert_eq!(render("[{{step3.meta.nickname}}]", Some(&results)), "[]");
        assert_eq!(
            render("{{step3.siblings}}", Some(&results)),
            "[\"Olga\",\"Petr\"]"
        );
        assert_eq!(
            render("{{step3.meta}}", Some(&results)),
            "{\"nickname\":null,\"verified\":true}"
        );
    }

    #[test]
    fn test_render_no_references() {
        let template = "No references here, not even {single} braces";
        assert_eq!(render(template, Some(&results())), template);
    }

    #[test]
    fn test_references_and_has_references() {
        let refs = references("{{a}} then {{b.c.d}} then {{ e }}");
        assert_eq!(refs, vec!["a", "b.c.d", "e"]);

        assert!(has_references("Hello {{name}}"));
        assert!(!has_references("Hello ${var:name}"));
        assert!(!has_references("{{not valid}}"));
    }
}
