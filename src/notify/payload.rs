//! Webhook payload types
//!
//! Serializes to the incoming-webhook attachment shape:
//! `{"attachments": [{"color", "title", "text", "footer", "fields": [...]}]}`.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Color used for error reports (distinct from every tier color)
pub const ERROR_COLOR: &str = "#8963B9";

/// Severity tier of a notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tier {
    Normal,
    Warning,
    Critical,
}

impl Tier {
    /// Attachment color for this tier
    pub fn color(&self) -> &'static str {
        match self {
            Self::Normal => "#36a64f",
            Self::Warning => "#ffcc00",
            Self::Critical => "#cc0000",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Normal => write!(f, "NORMAL"),
            Self::Warning => write!(f, "WARNING"),
            Self::Critical => write!(f, "CRITICAL"),
        }
    }
}

/// One detail field of an attachment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    pub title: String,
    pub value: String,
    pub short: bool,
}

impl Field {
    pub fn short(title: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            value: value.into(),
            short: true,
        }
    }
}

/// One attachment block
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub color: String,
    pub title: String,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub footer: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<Field>,
}

/// A complete message for the webhook
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub attachments: Vec<Attachment>,
}

impl Notification {
    /// Single-attachment notification with the given color
    pub fn new(color: &str, title: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            attachments: vec![Attachment {
                color: color.to_string(),
                title: title.into(),
                text: text.into(),
                footer: None,
                fields: Vec::new(),
            }],
        }
    }

    /// Single-attachment notification colored by tier
    pub fn tiered(tier: Tier, title: impl Into<String>, text: impl Into<String>) -> Self {
        Self::new(tier.color(), title, text)
    }

    /// Error report carrying a diagnostic
    pub fn error(diagnostic: &str) -> Self {
        Self::new(
            ERROR_COLOR,
            "Error notification",
            format!(
                "Check the logs! Events could not be processed: {}",
                diagnostic
            ),
        )
    }

    /// Builder: set the footer of the first attachment
    pub fn with_footer(mut self, footer: impl Into<String>) -> Self {
        if let Some(attachment) = self.attachments.first_mut() {
            attachment.footer = Some(footer.into());
        }
        self
    }

    /// Builder: append a field to the first attachment
    pub fn with_field(mut self, field: Field) -> Self {
        if let Some(attachment) = self.attachments.first_mut() {
            attachment.fields.push(field);
        }
        self
    }

    /// First attachment, which every notification built here has
    pub fn primary(&self) -> Option<&Attachment> {
        self.attachments.first()
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_colors() {
        assert_eq!(Tier::Normal.color(), "#36a64f");
        assert_eq!(Tier::Warning.color(), "#ffcc00");
        assert_eq!(Tier::Critical.color(), "#cc0000");
    }

    #[test]
    fn test_json_shape() {
        let notification = Notification::tiered(Tier::Critical, "title", "text")
            .with_footer("footer")
            .with_field(Field::short("Involved object", "Kind: Pod"));

        let value: serde_json::Value =
            serde_json::from_str(&notification.to_json().unwrap()).unwrap();
        let attachment = &value["attachments"][0];
        assert_eq!(attachment["color"], "#cc0000");
        assert_eq!(attachment["title"], "title");
        assert_eq!(attachment["text"], "text");
        assert_eq!(attachment["footer"], "footer");
        assert_eq!(attachment["fields"][0]["title"], "Involved object");
        assert_eq!(attachment["fields"][0]["short"], true);
    }

    #[test]
    fn test_optional_parts_omitted() {
        let json = Notification::error("boom").to_json().unwrap();
        assert!(!json.contains("footer"));
        assert!(!json.contains("fields"));
        assert!(json.contains(ERROR_COLOR));
        assert!(json.contains("boom"));
    }
}
