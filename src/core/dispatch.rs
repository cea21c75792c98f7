use crate::core::commands::ResolvedCommand;
use crate::domain::model::{
    CommandContext, CommandInvocation, CommandPayload, ComponentEvent, ComponentPayload,
    EventKind, InboundMessage, MessagePayload,
};
use crate::domain::ports::EventSink;
use crate::utils::error::Result;

/// Turns domain events into engine payloads and hands them to the sink.
pub struct Dispatcher<S: EventSink> {
    sink: S,
}

impl<S: EventSink> Dispatcher<S> {
    pub fn new(sink: S) -> Self {
        Self { sink }
    }

    /// Returns whether the message was forwarded.
    pub fn on_message(&self, msg: &InboundMessage) -> Result<bool> {
        if !msg.should_forward() {
            return Ok(false);
        }
        let payload = serde_json::to_value(MessagePayload::from(msg))?;
        self.sink.forward(EventKind::Message, payload);
        Ok(true)
    }

    pub fn on_component(&self, event: &ComponentEvent) -> Result<()> {
        let payload = serde_json::to_value(ComponentPayload::from(event))?;
        tracing::debug!("Forwarding component {}", event.custom_id);
        self.sink.forward(EventKind::Interaction, payload);
        Ok(())
    }

    pub fn on_command(&self, invocation: &CommandInvocation, command: ResolvedCommand) -> Result<()> {
        tracing::debug!("Forwarding command {}", command.name);
        let payload = serde_json::to_value(CommandPayload {
            command: command.name,
            context: CommandContext::from(invocation),
            params: command.params,
        })?;
        self.sink.forward(EventKind::Command, payload);
        Ok(())
    }
}
