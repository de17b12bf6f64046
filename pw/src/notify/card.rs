//! Legacy actionable message card payload

use serde::{Deserialize, Serialize};

use crate::detector::ChangeRecord;

const CARD_TYPE: &str = "MessageCard";
const CARD_CONTEXT: &str = "http://schema.org/extensions";
const THEME_COLOR: &str = "0076D7";
const SUMMARY: &str = "Changes detected";

/// A message card as accepted by incoming-webhook connectors
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageCard {
    #[serde(rename = "@type")]
    pub card_type: String,

    #[serde(rename = "@context")]
    pub context: String,

    pub theme_color: String,
    pub summary: String,
    pub sections: Vec<CardSection>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardSection {
    pub activity_title: String,
    pub facts: Vec<Fact>,
    pub markdown: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fact {
    pub name: String,
    pub value: String,
}

impl Fact {
    fn new(name: &str, value: impl Into<String>) -> Self {
        Self {
            name: name.to_string(),
            value: value.into(),
        }
    }
}

impl MessageCard {
    /// Render the alert for one change record
    pub fn for_change(record: &ChangeRecord) -> Self {
        let repo = record.repo.to_string();
        Self {
            card_type: CARD_TYPE.to_string(),
            context: CARD_CONTEXT.to_string(),
            theme_color: THEME_COLOR.to_string(),
            summary: SUMMARY.to_string(),
            sections: vec![CardSection {
                activity_title: format!("Changes detected in {}", repo),
                facts: vec![
                    Fact::new("Repository:", repo),
                    Fact::new("Date:", &record.most_recent),
                    Fact::new("Path:", &record.path),
                    Fact::new("Changes:", &record.combined_message),
                ],
                markdown: true,
            }],
        }
    }

    /// Look up a fact value by label, with or without the trailing colon
    pub fn fact(&self, name: &str) -> Option<&str> {
        let label = name.trim_end_matches(':');
        self.sections
            .iter()
            .flat_map(|s| s.facts.iter())
            .find(|f| f.name.trim_end_matches(':') == label)
            .map(|f| f.value.as_str())
    }
}
