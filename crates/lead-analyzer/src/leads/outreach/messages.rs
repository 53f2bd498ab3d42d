use super::{join_or, ScriptError};
use crate::leads::domain::Lead;
use crate::leads::format::format_currency;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutreachChannel {
    #[default]
    Email,
    LinkedIn,
}

impl OutreachChannel {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Email => "email",
            Self::LinkedIn => "linkedin",
        }
    }
}

impl FromStr for OutreachChannel {
    type Err = ScriptError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "email" => Ok(Self::Email),
            "linkedin" => Ok(Self::LinkedIn),
            _ => Err(ScriptError::UnknownChannel {
                value: value.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OutreachMessage {
    pub lead_id: String,
    pub channel: OutreachChannel,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    pub body: String,
}

/// Ready-to-send copy for one lead; mentions the best contact window once scoring has run.
pub fn compose_outreach(lead: &Lead, channel: OutreachChannel) -> OutreachMessage {
    let first_name = lead.name.split_whitespace().next().unwrap_or(&lead.name);
    let interests = join_or(&lead.tags, ", ", "your current priorities");
    let window = lead.best_contact_window();

    let (subject, body) = match channel {
        OutreachChannel::Email => {
            let ask = match window {
                Some(window) => format!(
                    "Would {} between {} work for a quick call?",
                    window.day.label(),
                    window.time_range.label()
                ),
                None => "Would you have 20 minutes for a quick call this week?".to_string(),
            };
            let body = format!(
                "Hi {first_name},\n\n\
                 Thanks for connecting with us through {source}. Given your focus on {interests}, I put together a few ideas that could be worth around {value} to your team.\n\n\
                 {ask}\n\n\
                 Best regards,",
                source = lead.source,
                value = format_currency(lead.estimated_value),
            );
            (
                Some(format!("Following up on your interest via {}", lead.source)),
                body,
            )
        }
        OutreachChannel::LinkedIn => {
            let ask = match window {
                Some(window) => format!("Free for a quick chat on {}?", window.day.label()),
                None => "Open to a quick chat this week?".to_string(),
            };
            let body = format!(
                "Hi {first_name}, great to connect after your interest via {source}. I work with teams focused on {interests} and would love to share a few ideas. {ask}",
                source = lead.source,
            );
            (None, body)
        }
    };

    OutreachMessage {
        lead_id: lead.id.to_string(),
        channel,
        subject,
        body,
    }
}
