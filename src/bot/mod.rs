//! Discord gateway adapter.
//!
//! Maps slash-command interactions onto [`Command`]s, runs them through the
//! shared [`StatsService`] and sends the resulting [`Reply`] back as an embed.

use std::sync::Arc;

use serenity::all::{
    ApplicationId, Client, Command as SlashCommand, CommandInteraction, CommandOptionType,
    Context, CreateCommand, CreateCommandOption, CreateEmbed, CreateEmbedAuthor,
    CreateInteractionResponse, CreateInteractionResponseMessage, EditInteractionResponse,
    EventHandler, GatewayIntents, Http, Interaction, Ready, ResolvedValue, Timestamp,
};
use serenity::async_trait;
use thiserror::Error;
use tokio::signal;
use tracing::{error, info, warn};

use crate::commands::{command_definitions, Command, CommandError, CommandDefinition, StatsService};
use crate::format::Reply;

/// Errors talking to Discord.
#[derive(Debug, Error)]
pub enum BotError {
    #[error("Discord error: {0}")]
    Discord(#[from] serenity::Error),
}

/// Gateway event handler.
pub struct Handler {
    service: Arc<StatsService>,
}

impl Handler {
    pub fn new(service: Arc<StatsService>) -> Self {
        Self { service }
    }

    async fn handle_command(&self, ctx: &Context, interaction: &CommandInteraction) {
        let name = interaction.data.name.as_str();
        info!("Command received: {} from {}", name, interaction.user.name);

        let parsed = {
            let resolved = interaction.data.options();
            let options: Vec<(&str, &str)> = resolved
                .iter()
                .filter_map(|option| match &option.value {
                    ResolvedValue::String(value) => Some((option.name, *value)),
                    _ => None,
                })
                .collect();
            Command::parse(name, &options)
        };

        let command = match parsed {
            Ok(command) => command,
            Err(e) => {
                if matches!(e, CommandError::UnknownCommand(_)) {
                    warn!("Unknown command: {}", name);
                } else {
                    warn!("Rejected /{}: {}", name, e);
                }
                let message = CreateInteractionResponseMessage::new()
                    .content(e.user_message())
                    .ephemeral(true);
                if let Err(why) = interaction
                    .create_response(&ctx.http, CreateInteractionResponse::Message(message))
                    .await
                {
                    error!("Cannot respond to /{}: {}", name, why);
                }
                return;
            }
        };

        // Snapshot reads can outlast the initial response window.
        if let Err(why) = interaction.defer(&ctx.http).await {
            error!("Cannot defer /{}: {}", name, why);
            return;
        }

        let response = match self.service.execute(&command).await {
            Ok(reply) => EditInteractionResponse::new().embed(to_embed(&reply)),
            Err(e) => {
                error!("Error executing /{}: {}", command.name(), e);
                EditInteractionResponse::new().content(command.failure_message())
            }
        };

        if let Err(why) = interaction.edit_response(&ctx.http, response).await {
            error!("Cannot send reply for /{}: {}", name, why);
        }
    }
}

#[async_trait]
impl EventHandler for Handler {
    async fn ready(&self, _ctx: Context, ready: Ready) {
        info!("Logged in as {}", ready.user.name);
    }

    async fn interaction_create(&self, ctx: Context, interaction: Interaction) {
        if let Interaction::Command(command) = interaction {
            self.handle_command(&ctx, &command).await;
        }
    }
}

/// Build the Discord embed for a reply.
pub fn to_embed(reply: &Reply) -> CreateEmbed {
    let mut embed = CreateEmbed::new()
        .title(&reply.title)
        .description(&reply.description)
        .colour(reply.colour);

    if let Some(author) = &reply.author {
        let mut builder = CreateEmbedAuthor::new(&author.name);
        if let Some(icon_url) = &author.icon_url {
            builder = builder.icon_url(icon_url);
        }
        embed = embed.author(builder);
    }

    if let Some(url) = &reply.thumbnail_url {
        embed = embed.thumbnail(url);
    }

    for field in &reply.fields {
        embed = embed.field(&field.name, &field.value, false);
    }

    if reply.timestamp {
        embed = embed.timestamp(Timestamp::now());
    }

    embed
}

/// Build the registration payload for a command.
pub fn to_create_command(definition: &CommandDefinition) -> CreateCommand {
    definition.options.iter().fold(
        CreateCommand::new(definition.name).description(definition.description),
        |command, option| {
            command.add_option(
                CreateCommandOption::new(CommandOptionType::String, option.name, option.description)
                    .required(option.required),
            )
        },
    )
}

async fn application_http(token: &str, application_id: Option<u64>) -> Result<Http, BotError> {
    let http = Http::new(token);
    let id = match application_id {
        Some(id) => ApplicationId::new(id),
        None => http.get_current_application_info().await?.id,
    };
    http.set_application_id(id);
    Ok(http)
}

/// Replace the global command set with the bot's commands.
pub async fn register_commands(token: &str, application_id: Option<u64>) -> Result<usize, BotError> {
    let http = application_http(token, application_id).await?;
    let commands: Vec<CreateCommand> = command_definitions().iter().map(to_create_command).collect();

    info!("Started refreshing {} application (/) commands", commands.len());
    let registered = SlashCommand::set_global_commands(&http, commands).await?;
    info!("Successfully registered {} application (/) commands", registered.len());

    Ok(registered.len())
}

/// Remove every global command.
pub async fn clear_commands(token: &str, application_id: Option<u64>) -> Result<(), BotError> {
    let http = application_http(token, application_id).await?;
    SlashCommand::set_global_commands(&http, Vec::new()).await?;
    info!("Successfully deleted all application commands");
    Ok(())
}

/// Connect to the gateway and serve commands until SIGINT or SIGTERM.
pub async fn run_bot(token: &str, service: Arc<StatsService>) -> Result<(), BotError> {
    let mut client = Client::builder(token, GatewayIntents::GUILDS)
        .event_handler(Handler::new(service))
        .await?;

    let shard_manager = client.shard_manager.clone();
    tokio::spawn(async move {
        shutdown_signal().await;
        shard_manager.shutdown_all().await;
    });

    info!("Connecting to Discord gateway");
    client.start().await?;
    info!("Discord client stopped");
    Ok(())
}

/// Wait for Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received SIGINT. Shutting down gracefully...");
        }
        _ = terminate => {
            info!("Received SIGTERM. Shutting down gracefully...");
        }
    }
}
