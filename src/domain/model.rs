use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of event relayed to the engine. Each kind has its own ingress route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    Message,
    Interaction,
    Command,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Message => "message",
            EventKind::Interaction => "interaction",
            EventKind::Command => "command",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Who triggered an event, as seen by the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    pub user_id: String,
    pub user_name: String,
    pub is_bot: bool,
}

/// Where an event happened. `guild_id` is `None` in direct messages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub guild_id: Option<String>,
    pub channel_id: String,
}

/// Token pair needed by the engine to answer an interaction later.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InteractionHandle {
    pub interaction_token: String,
    pub application_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    pub message_id: String,
    pub location: Location,
    pub author: Actor,
    pub content: String,
}

impl InboundMessage {
    /// Bot traffic (including our own replies) and content-less messages are never relayed.
    pub fn should_forward(&self) -> bool {
        !self.author.is_bot && !self.content.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentEvent {
    pub custom_id: String,
    pub location: Location,
    pub actor: Actor,
    pub values: Vec<String>,
    pub handle: InteractionHandle,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandInvocation {
    pub location: Location,
    pub actor: Actor,
    pub handle: InteractionHandle,
}

/// A slash command option value as received from Discord.
///
/// Snowflake references serialize as their id string; scalars stay scalars.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    Text(String),
    Integer(i64),
    Number(f64),
    Boolean(bool),
    User(u64),
    Channel(u64),
    Role(u64),
    Mentionable(u64),
    Attachment(u64),
}

impl ParamValue {
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            ParamValue::Text(s) => serde_json::Value::String(s.clone()),
            ParamValue::Integer(i) => serde_json::Value::from(*i),
            ParamValue::Number(n) => serde_json::Value::from(*n),
            ParamValue::Boolean(b) => serde_json::Value::Bool(*b),
            ParamValue::User(id)
            | ParamValue::Channel(id)
            | ParamValue::Role(id)
            | ParamValue::Mentionable(id)
            | ParamValue::Attachment(id) => serde_json::Value::String(id.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessagePayload {
    pub guild_id: Option<String>,
    pub channel_id: String,
    pub user_id: String,
    pub user_name: String,
    pub content: String,
    pub message_id: String,
}

impl From<&InboundMessage> for MessagePayload {
    fn from(msg: &InboundMessage) -> Self {
        Self {
            guild_id: msg.location.guild_id.clone(),
            channel_id: msg.location.channel_id.clone(),
            user_id: msg.author.user_id.clone(),
            user_name: msg.author.user_name.clone(),
            content: msg.content.clone(),
            message_id: msg.message_id.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentPayload {
    #[serde(rename = "type")]
    pub kind: String,
    pub custom_id: String,
    pub guild_id: Option<String>,
    pub channel_id: String,
    pub user_id: String,
    pub user_name: String,
    pub values: Vec<String>,
    pub interaction_token: String,
    pub application_id: String,
}

impl From<&ComponentEvent> for ComponentPayload {
    fn from(event: &ComponentEvent) -> Self {
        Self {
            kind: "component".to_string(),
            custom_id: event.custom_id.clone(),
            guild_id: event.location.guild_id.clone(),
            channel_id: event.location.channel_id.clone(),
            user_id: event.actor.user_id.clone(),
            user_name: event.actor.user_name.clone(),
            values: event.values.clone(),
            interaction_token: event.handle.interaction_token.clone(),
            application_id: event.handle.application_id.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandContext {
    pub guild_id: Option<String>,
    pub channel_id: String,
    pub user_id: String,
    pub user_name: String,
    pub interaction_token: String,
    pub application_id: String,
}

impl From<&CommandInvocation> for CommandContext {
    fn from(invocation: &CommandInvocation) -> Self {
        Self {
            guild_id: invocation.location.guild_id.clone(),
            channel_id: invocation.location.channel_id.clone(),
            user_id: invocation.actor.user_id.clone(),
            user_name: invocation.actor.user_name.clone(),
            interaction_token: invocation.handle.interaction_token.clone(),
            application_id: invocation.handle.application_id.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandPayload {
    pub command: String,
    pub context: CommandContext,
    pub params: serde_json::Map<String, serde_json::Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn actor(is_bot: bool) -> Actor {
        Actor {
            user_id: "42".to_string(),
            user_name: "alice".to_string(),
            is_bot,
        }
    }

    fn message(content: &str, is_bot: bool) -> InboundMessage {
        InboundMessage {
            message_id: "1001".to_string(),
            location: Location {
                guild_id: None,
                channel_id: "7".to_string(),
            },
            author: actor(is_bot),
            content: content.to_string(),
        }
    }

    #[test]
    fn test_should_forward_message() {
        assert!(message("hello", false).should_forward());
        assert!(!message("hello", true).should_forward());
        assert!(!message("", false).should_forward());
    }

    #[test]
    fn test_message_payload_serializes_null_guild_in_dm() {
        let payload = MessagePayload::from(&message("hi", false));
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "guild_id": null,
                "channel_id": "7",
                "user_id": "42",
                "user_name": "alice",
                "content": "hi",
                "message_id": "1001"
            })
        );
    }

    #[test]
    fn test_component_payload_shape() {
        let event = ComponentEvent {
            custom_id: "start_btn".to_string(),
            location: Location {
                guild_id: Some("9".to_string()),
                channel_id: "7".to_string(),
            },
            actor: actor(false),
            values: vec![],
            handle: InteractionHandle {
                interaction_token: "tok".to_string(),
                application_id: "55".to_string(),
            },
        };
        let json = serde_json::to_value(ComponentPayload::from(&event)).unwrap();
        assert_eq!(json["type"], "component");
        assert_eq!(json["values"], serde_json::json!([]));
        assert_eq!(json["guild_id"], "9");
    }

    #[test]
    fn test_param_value_snowflakes_become_strings() {
        assert_eq!(
            ParamValue::User(1234567890123).to_json(),
            serde_json::json!("1234567890123")
        );
        assert_eq!(ParamValue::Integer(5).to_json(), serde_json::json!(5));
        assert_eq!(ParamValue::Boolean(true).to_json(), serde_json::json!(true));
        assert_eq!(
            ParamValue::Text("foster-protocol".to_string()).to_json(),
            serde_json::json!("foster-protocol")
        );
    }

    #[test]
    fn test_event_kind_paths() {
        assert_eq!(EventKind::Message.to_string(), "message");
        assert_eq!(EventKind::Interaction.as_str(), "interaction");
        assert_eq!(EventKind::Command.as_str(), "command");
    }
}
