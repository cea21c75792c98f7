//! Serenity-backed gateway adapter.
//!
//! Converts Discord models into domain events, acknowledges interactions
//! within Discord's 3 second window, then hands everything to the dispatcher.

use crate::config::DiscordSettings;
use crate::core::commands::{CommandGroup, OptionKind, ResolvedCommand, CSCRATCH};
use crate::core::dispatch::Dispatcher;
use crate::core::status::GatewayStatus;
use crate::domain::model::{
    Actor, CommandInvocation, ComponentEvent, InboundMessage, InteractionHandle, Location,
    ParamValue,
};
use crate::domain::ports::EventSink;
use crate::utils::error::{GatewayError, Result};
use serenity::all::{
    ChannelId, Command, CommandDataOption, CommandDataOptionValue, CommandInteraction,
    CommandOptionType, ComponentInteraction, ComponentInteractionDataKind, CreateCommand,
    CreateCommandOption, CreateInteractionResponse, CreateInteractionResponseMessage, GuildId,
    Interaction, Message, Ready, ResumedEvent, User,
};
use serenity::async_trait;
use serenity::gateway::{ConnectionStage, ShardManager, ShardStageUpdateEvent};
use serenity::http::HttpError;
use serenity::model::gateway::GatewayIntents;
use serenity::prelude::{Client, Context, EventHandler};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Non-privileged intents plus message content and members, so relayed
/// messages carry text and user names resolve reliably.
pub fn intents() -> GatewayIntents {
    GatewayIntents::non_privileged()
        | GatewayIntents::MESSAGE_CONTENT
        | GatewayIntents::GUILD_MEMBERS
}

fn option_type(kind: OptionKind) -> CommandOptionType {
    match kind {
        OptionKind::String => CommandOptionType::String,
        OptionKind::Integer => CommandOptionType::Integer,
        OptionKind::Boolean => CommandOptionType::Boolean,
        OptionKind::User => CommandOptionType::User,
    }
}

pub fn build_command(group: &CommandGroup) -> CreateCommand {
    let mut command = CreateCommand::new(group.name).description(group.description);
    for sub in group.subcommands {
        let mut option =
            CreateCommandOption::new(CommandOptionType::SubCommand, sub.name, sub.description);
        for opt in sub.options {
            option = option.add_sub_option(
                CreateCommandOption::new(option_type(opt.kind), opt.name, opt.description)
                    .required(opt.is_required()),
            );
        }
        command = command.add_option(option);
    }
    command
}

fn location(guild_id: Option<GuildId>, channel_id: ChannelId) -> Location {
    Location {
        guild_id: guild_id.map(|id| id.to_string()),
        channel_id: channel_id.to_string(),
    }
}

fn actor(user: &User) -> Actor {
    Actor {
        user_id: user.id.to_string(),
        user_name: user.name.clone(),
        is_bot: user.bot,
    }
}

fn param_value(value: &CommandDataOptionValue) -> Option<ParamValue> {
    match value {
        CommandDataOptionValue::String(s) => Some(ParamValue::Text(s.clone())),
        CommandDataOptionValue::Integer(i) => Some(ParamValue::Integer(*i)),
        CommandDataOptionValue::Number(n) => Some(ParamValue::Number(*n)),
        CommandDataOptionValue::Boolean(b) => Some(ParamValue::Boolean(*b)),
        CommandDataOptionValue::User(id) => Some(ParamValue::User(id.get())),
        CommandDataOptionValue::Channel(id) => Some(ParamValue::Channel(id.get())),
        CommandDataOptionValue::Role(id) => Some(ParamValue::Role(id.get())),
        CommandDataOptionValue::Mentionable(id) => Some(ParamValue::Mentionable(id.get())),
        CommandDataOptionValue::Attachment(id) => Some(ParamValue::Attachment(id.get())),
        _ => None,
    }
}

fn collect_params(options: &[CommandDataOption]) -> Vec<(String, ParamValue)> {
    options
        .iter()
        .filter_map(|opt| param_value(&opt.value).map(|v| (opt.name.clone(), v)))
        .collect()
}

/// Resolves a slash command against the `/cscratch` catalog. `None` means the
/// command is not ours and is ignored.
fn route_command(name: &str, options: &[CommandDataOption]) -> Option<Result<ResolvedCommand>> {
    if name != CSCRATCH.name {
        return None;
    }
    let Some(sub) = options.first() else {
        return Some(Err(GatewayError::UnknownCommand {
            name: CSCRATCH.name.to_string(),
        }));
    };
    let supplied = match &sub.value {
        CommandDataOptionValue::SubCommand(nested) => collect_params(nested),
        _ => Vec::new(),
    };
    Some(CSCRATCH.resolve(&sub.name, supplied))
}

fn component_values(kind: &ComponentInteractionDataKind) -> Vec<String> {
    match kind {
        ComponentInteractionDataKind::StringSelect { values } => values.clone(),
        ComponentInteractionDataKind::UserSelect { values } => {
            values.iter().map(|id| id.to_string()).collect()
        }
        ComponentInteractionDataKind::RoleSelect { values } => {
            values.iter().map(|id| id.to_string()).collect()
        }
        ComponentInteractionDataKind::MentionableSelect { values } => {
            values.iter().map(|id| id.to_string()).collect()
        }
        ComponentInteractionDataKind::ChannelSelect { values } => {
            values.iter().map(|id| id.to_string()).collect()
        }
        _ => Vec::new(),
    }
}

/// Discord answers 404 (Unknown interaction) once the acknowledgement window has passed.
fn is_expired_interaction(err: &serenity::Error) -> bool {
    matches!(
        err,
        serenity::Error::Http(HttpError::UnsuccessfulRequest(resp))
            if resp.status_code.as_u16() == 404
    )
}

/// Components get a deferred update (type 6), which posts nothing.
fn component_ack() -> CreateInteractionResponse {
    CreateInteractionResponse::Acknowledge
}

fn defer_response(ephemeral: bool) -> CreateInteractionResponse {
    CreateInteractionResponse::Defer(CreateInteractionResponseMessage::new().ephemeral(ephemeral))
}

fn log_defer_failure(what: &str, err: &serenity::Error) {
    if is_expired_interaction(err) {
        tracing::warn!("{}: Interaction timed out before defer (Gateway Lag)", what);
    } else {
        tracing::error!("{}: Defer failed: {}", what, err);
    }
}

pub struct GatewayHandler<S: EventSink + 'static> {
    dispatcher: Dispatcher<S>,
    status: Arc<GatewayStatus>,
    engine_url: String,
    clear_guild_commands: Vec<u64>,
    commands_synced: AtomicBool,
}

impl<S: EventSink + 'static> GatewayHandler<S> {
    pub fn new(
        sink: S,
        status: Arc<GatewayStatus>,
        engine_url: String,
        settings: &DiscordSettings,
    ) -> Self {
        Self {
            dispatcher: Dispatcher::new(sink),
            status,
            engine_url,
            clear_guild_commands: settings.clear_guild_commands.clone(),
            commands_synced: AtomicBool::new(false),
        }
    }

    async fn sync_commands(&self, ctx: &Context) {
        for guild in &self.clear_guild_commands {
            let guild_id = GuildId::new(*guild);
            match guild_id.set_commands(&ctx.http, Vec::new()).await {
                Ok(_) => tracing::info!("Cleared guild commands in {}", guild_id),
                Err(e) => tracing::warn!("Could not clear guild commands in {}: {}", guild_id, e),
            }
        }

        tracing::info!("Gateway: Syncing commands...");
        match Command::set_global_commands(&ctx.http, vec![build_command(&CSCRATCH)]).await {
            Ok(registered) => tracing::info!("Registered {} global command(s)", registered.len()),
            Err(e) => {
                // allow the next READY to retry
                self.commands_synced.store(false, Ordering::Release);
                tracing::error!("Failed to sync commands: {}", e);
            }
        }
    }

    async fn handle_component(&self, ctx: &Context, component: &ComponentInteraction) {
        let event = ComponentEvent {
            custom_id: component.data.custom_id.clone(),
            location: location(component.guild_id, component.channel_id),
            actor: actor(&component.user),
            values: component_values(&component.data.kind),
            handle: InteractionHandle {
                interaction_token: component.token.clone(),
                application_id: component.application_id.to_string(),
            },
        };

        if let Err(e) = component.create_response(&ctx.http, component_ack()).await {
            log_defer_failure(&format!("Interaction {}", event.custom_id), &e);
            return;
        }

        if let Err(e) = self.dispatcher.on_component(&event) {
            tracing::error!("Interaction {}: Error {}", event.custom_id, e);
        }
    }

    async fn handle_command(&self, ctx: &Context, command: &CommandInteraction) {
        let resolved = match route_command(&command.data.name, &command.data.options) {
            Some(Ok(resolved)) => resolved,
            Some(Err(e)) => {
                tracing::warn!("{}", e);
                return;
            }
            None => {
                tracing::debug!("Ignoring unregistered command /{}", command.data.name);
                return;
            }
        };

        if let Err(e) = command
            .create_response(&ctx.http, defer_response(resolved.ephemeral))
            .await
        {
            log_defer_failure(&format!("Cmd {}", resolved.name), &e);
            return;
        }

        let invocation = CommandInvocation {
            location: location(command.guild_id, command.channel_id),
            actor: actor(&command.user),
            handle: InteractionHandle {
                interaction_token: command.token.clone(),
                application_id: command.application_id.to_string(),
            },
        };
        let name = resolved.name.clone();
        if let Err(e) = self.dispatcher.on_command(&invocation, resolved) {
            tracing::error!("Cmd {}: {}", name, e);
        }
    }
}

#[async_trait]
impl<S: EventSink + 'static> EventHandler for GatewayHandler<S> {
    async fn ready(&self, ctx: Context, ready: Ready) {
        self.status.mark_ready();
        tracing::info!("Gateway Online: {} (ID: {})", ready.user.name, ready.user.id);
        tracing::info!("Forwarding targets to: {}", self.engine_url);

        if !self.commands_synced.swap(true, Ordering::AcqRel) {
            self.sync_commands(&ctx).await;
        }
    }

    async fn resume(&self, _ctx: Context, _event: ResumedEvent) {
        tracing::info!("Gateway session resumed");
        self.status.mark_ready();
    }

    async fn shard_stage_update(&self, _ctx: Context, event: ShardStageUpdateEvent) {
        tracing::debug!("Shard {:?} stage {:?} -> {:?}", event.shard_id, event.old, event.new);
        if event.new == ConnectionStage::Connected {
            self.status.mark_ready();
        } else {
            self.status.mark_disconnected();
        }
    }

    async fn message(&self, _ctx: Context, msg: Message) {
        let inbound = InboundMessage {
            message_id: msg.id.to_string(),
            location: location(msg.guild_id, msg.channel_id),
            author: actor(&msg.author),
            content: msg.content,
        };
        if let Err(e) = self.dispatcher.on_message(&inbound) {
            tracing::error!("Message {}: {}", inbound.message_id, e);
        }
    }

    async fn interaction_create(&self, ctx: Context, interaction: Interaction) {
        match &interaction {
            Interaction::Component(component) => self.handle_component(&ctx, component).await,
            Interaction::Command(command) => self.handle_command(&ctx, command).await,
            _ => {}
        }
    }
}

/// Owns the serenity client until it is started.
pub struct GatewayClient {
    client: Client,
}

impl GatewayClient {
    pub async fn connect<S: EventSink + 'static>(
        token: &str,
        settings: &DiscordSettings,
        engine_url: &str,
        sink: S,
        status: Arc<GatewayStatus>,
    ) -> Result<Self> {
        let handler = GatewayHandler::new(sink, status, engine_url.to_string(), settings);
        let client = Client::builder(token, intents())
            .event_handler(handler)
            .await?;
        Ok(Self { client })
    }

    pub fn shard_manager(&self) -> Arc<ShardManager> {
        self.client.shard_manager.clone()
    }

    /// Runs the gateway until every shard stops.
    pub async fn run(mut self) -> Result<()> {
        self.client.start().await?;
        Ok(())
    }
}
