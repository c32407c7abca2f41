use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Results the crawl engine recorded for one job.
///
/// The service owns the shape of these results, so they are kept as named
/// JSON values rather than a fixed record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobAnalysis {
    #[serde(flatten)]
    pub fields: BTreeMap<String, serde_json::Value>,
}

impl JobAnalysis {
    pub fn with_field(
        mut self,
        name: impl Into<String>,
        value: impl Into<serde_json::Value>,
    ) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    pub fn get(&self, name: &str) -> Option<&serde_json::Value> {
        self.fields.get(name)
    }

    /// Fields in name order, with strings shown without quotes.
    pub fn entries(&self) -> impl Iterator<Item = (&str, String)> {
        self.fields.iter().map(|(name, value)| {
            let text = match value {
                serde_json::Value::String(text) => text.clone(),
                other => other.to_string(),
            };
            (name.as_str(), text)
        })
    }
}
