//! Gateway lifecycle and interaction callbacks.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::future::BoxFuture;
use log::{debug, error, info, warn};
use poise::serenity_prelude::{
    Command, CommandInteraction, ConnectionStage, Context, CreateEmbed, EventHandler, GuildId,
    Interaction, Ready, ResumedEvent, ShardStageUpdateEvent,
};
use tokio::sync::RwLock;
use tokio::time::timeout;

use crate::error::{BotError, Result};

use super::registry::{CommandRegistry, Handler, HandlerResult};
use super::response;

/// Serenity event handler backing a running [`Bot`](super::Bot).
pub(super) struct Events {
    pub registry: Arc<CommandRegistry>,
    pub guild_id: Option<GuildId>,
    pub registered: Arc<RwLock<Vec<Command>>>,
    pub command_timeout: Duration,
    pub defer_message: String,
}

impl Events {
    /// Bulk overwrite the platform's command set with ours.
    async fn overwrite_commands(&self, ctx: &Context) -> Result<()> {
        let commands = self.registry.commands().to_vec();
        let result = match self.guild_id {
            Some(guild_id) => guild_id.set_commands(&ctx.http, commands).await,
            None => Command::set_global_commands(&ctx.http, commands).await,
        };

        let registered = result.map_err(|e| BotError::CommandInvalid(e.to_string()))?;
        info!(
            "Registered {} slash commands ({})",
            registered.len(),
            self.guild_id
                .map_or_else(|| "global".to_string(), |id| format!("guild {id}"))
        );
        *self.registered.write().await = registered;
        Ok(())
    }

    async fn dispatch(
        &self,
        ctx: &Context,
        command: &CommandInteraction,
        handler: &Handler,
    ) -> Result<()> {
        if let Err(e) = response::defer(&ctx.http, command, &self.defer_message).await {
            warn!("Failed to acknowledge /{}: {e}", command.data.name);
            response::followup_text(&ctx.http, command, &e.to_string()).await?;
            return Err(BotError::send(e));
        }

        let run = handler.as_ref();
        match run_with_timeout(run(ctx, command), self.command_timeout).await {
            Ok(embed) => response::send_embed(&ctx.http, command, embed).await,
            Err(message) => {
                response::followup_error(&ctx.http, command, &message).await?;
                Err(BotError::CommandExec(message))
            }
        }
    }
}

/// Run a handler under `limit`. On failure, returns the message shown to the user.
async fn run_with_timeout(
    handler: BoxFuture<'_, HandlerResult>,
    limit: Duration,
) -> std::result::Result<CreateEmbed, String> {
    match timeout(limit, handler).await {
        Ok(Ok(embed)) => Ok(embed),
        Ok(Err(e)) => Err(e.to_string()),
        Err(_) => Err(format!("command timed out after {limit:?}")),
    }
}

#[async_trait]
impl EventHandler for Events {
    async fn ready(&self, ctx: Context, ready: Ready) {
        info!(
            "Logged in successfully as {} (discriminator: {})",
            ready.user.name,
            ready
                .user
                .discriminator
                .map_or_else(|| "none".to_string(), |d| d.to_string())
        );

        if let Err(e) = self.overwrite_commands(&ctx).await {
            error!("Failed to register discord slash commands: {e}");
        }
    }

    async fn resume(&self, _ctx: Context, _event: ResumedEvent) {
        info!("Discord state changed: connected (resumed)");
    }

    async fn shard_stage_update(&self, _ctx: Context, event: ShardStageUpdateEvent) {
        match event.new {
            ConnectionStage::Connected => {
                info!("Discord state changed: connected (shard {})", event.shard_id.0);
            }
            ConnectionStage::Disconnected => {
                info!("Discord state changed: disconnected (shard {})", event.shard_id.0);
            }
            stage => debug!("Shard {} stage: {stage:?}", event.shard_id.0),
        }
    }

    async fn interaction_create(&self, ctx: Context, interaction: Interaction) {
        let Interaction::Command(command) = interaction else {
            return;
        };

        let Some(handler) = self.registry.get(&command.data.name) else {
            debug!("No handler for /{}", command.data.name);
            return;
        };

        debug!(
            "Handling /{} from {} in channel {}",
            command.data.name,
            command.user.tag(),
            command.channel_id
        );

        match self.dispatch(&ctx, &command, handler).await {
            Ok(()) => info!("Completed /{} for {}", command.data.name, command.user.tag()),
            Err(e) => error!(
                "Command /{} from {} failed: {e}",
                command.data.name,
                command.user.tag()
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::bot::HandlerError;

    use super::*;

    fn title(embed: CreateEmbed) -> String {
        let payload = serde_json::to_value(embed).expect("serializable");
        payload["title"].as_str().unwrap_or_default().to_string()
    }

    #[tokio::test(start_paused = true)]
    async fn successful_handler_yields_embed() {
        let handler: BoxFuture<'_, HandlerResult> =
            Box::pin(async { HandlerResult::Ok(CreateEmbed::new().title("It worked!")) });

        let embed = run_with_timeout(handler, Duration::from_secs(30))
            .await
            .expect("handler succeeds");
        assert_eq!(title(embed), "It worked!");
    }

    #[tokio::test(start_paused = true)]
    async fn slow_handler_within_limit_succeeds() {
        let handler: BoxFuture<'_, HandlerResult> = Box::pin(async {
            tokio::time::sleep(Duration::from_secs(20)).await;
            HandlerResult::Ok(CreateEmbed::new().title("late"))
        });

        let embed = run_with_timeout(handler, Duration::from_secs(30))
            .await
            .expect("finishes before the limit");
        assert_eq!(title(embed), "late");
    }

    #[tokio::test(start_paused = true)]
    async fn handler_error_message_is_passed_through() {
        let handler: BoxFuture<'_, HandlerResult> =
            Box::pin(async { Err(HandlerError::from("no such user")) });

        let message = run_with_timeout(handler, Duration::from_secs(30))
            .await
            .expect_err("handler fails");
        assert_eq!(message, "no such user");
    }

    #[tokio::test(start_paused = true)]
    async fn stalled_handler_times_out() {
        let handler: BoxFuture<'_, HandlerResult> = Box::pin(futures::future::pending::<HandlerResult>());

        let message = run_with_timeout(handler, Duration::from_secs(30))
            .await
            .expect_err("handler never finishes");
        assert_eq!(message, "command timed out after 30s");
    }

    #[tokio::test(start_paused = true)]
    async fn sub_second_timeout_is_reported_exactly() {
        let handler: BoxFuture<'_, HandlerResult> = Box::pin(futures::future::pending::<HandlerResult>());

        let message = run_with_timeout(handler, Duration::from_millis(500))
            .await
            .expect_err("handler never finishes");
        assert_eq!(message, "command timed out after 500ms");
    }
}
