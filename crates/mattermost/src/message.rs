use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseType {
    InChannel,
    Ephemeral,
}

/// Slash-command response payload consumed by the platform's message
/// rendering layer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CommandResponse {
    pub response_type: ResponseType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<Attachment>,
}

impl CommandResponse {
    pub fn in_channel(attachment: Attachment) -> Self {
        Self { response_type: ResponseType::InChannel, text: None, attachments: vec![attachment] }
    }

    pub fn ephemeral(text: impl Into<String>) -> Self {
        Self {
            response_type: ResponseType::Ephemeral,
            text: Some(text.into()),
            attachments: Vec::new(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Attachment {
    pub text: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<Field>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub actions: Vec<Action>,
}

impl Attachment {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into(), fields: Vec::new(), actions: Vec::new() }
    }

    pub fn with_fields(mut self, fields: Vec<Field>) -> Self {
        self.fields = fields;
        self
    }

    pub fn with_actions(mut self, actions: Vec<Action>) -> Self {
        self.actions = actions;
        self
    }
}

/// One informational row of an attachment. `short` rows render side by
/// side; full-width rows get a line of their own.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Field {
    pub short: bool,
    pub title: String,
    pub value: String,
}

impl Field {
    pub fn full_width(value: impl Into<String>) -> Self {
        Self { short: false, title: String::new(), value: value.into() }
    }
}

/// A clickable message button. Regenerated on every render; its only
/// identity is the context echoed back by the platform.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Action {
    pub name: String,
    pub integration: Integration,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Integration {
    pub url: String,
    pub context: ActionContext,
}

/// Context blob round-tripped opaquely through the platform back to the
/// callback endpoints. A closed set of fields: the poll, and the chosen
/// option for per-option actions.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionContext {
    pub poll_id: String,
    #[serde(rename = "vote", default, skip_serializing_if = "Option::is_none")]
    pub vote_id: Option<usize>,
}

impl ActionContext {
    pub fn vote(poll_id: impl Into<String>, vote_id: usize) -> Self {
        Self { poll_id: poll_id.into(), vote_id: Some(vote_id) }
    }

    pub fn end_poll(poll_id: impl Into<String>) -> Self {
        Self { poll_id: poll_id.into(), vote_id: None }
    }
}
