use serde::Serialize;

/// Ordered key/value context handed to an evaluator
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EvaluationContext {
    entries: Vec<(String, String)>,
}

impl EvaluationContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.entries.push((key.into(), value.into()));
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn entries(&self) -> &[(String, String)] {
        &self.entries
    }

    /// Render as XML-style tags, one per entry, keys snake_cased
    pub fn to_xml(&self) -> String {
        self.entries
            .iter()
            .map(|(key, value)| {
                let tag = key.trim().replace(' ', "_");
                format!("<{tag}>{}</{tag}>", escape(value))
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

fn escape(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
