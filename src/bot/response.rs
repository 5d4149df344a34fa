//! Deferred interaction responses.
//!
//! Discord fails an interaction that is not acknowledged within a few seconds, so
//! every command is deferred first and answered by editing the deferred reply.

use std::sync::Arc;

use poise::serenity_prelude::{
    CommandInteraction, CreateEmbed, CreateInteractionResponse, CreateInteractionResponseFollowup,
    CreateInteractionResponseMessage, EditInteractionResponse, Error as SerenityError, Http,
};

use crate::error::{BotError, Result};

/// Title of the embed sent when a handler fails.
pub const ERROR_TITLE: &str = "Error";

/// Acknowledge the interaction with a deferred channel message.
pub async fn defer(
    http: &Arc<Http>,
    interaction: &CommandInteraction,
    message: &str,
) -> std::result::Result<(), SerenityError> {
    let response =
        CreateInteractionResponse::Defer(CreateInteractionResponseMessage::new().content(message));
    interaction.create_response(http, response).await
}

/// Send a plain text followup message.
pub async fn followup_text(
    http: &Arc<Http>,
    interaction: &CommandInteraction,
    content: &str,
) -> Result<()> {
    interaction
        .create_followup(http, CreateInteractionResponseFollowup::new().content(content))
        .await
        .map_err(BotError::send)?;
    Ok(())
}

/// Send a followup embed describing a failed command.
pub async fn followup_error(
    http: &Arc<Http>,
    interaction: &CommandInteraction,
    description: &str,
) -> Result<()> {
    interaction
        .create_followup(
            http,
            CreateInteractionResponseFollowup::new().embed(error_embed(description)),
        )
        .await
        .map_err(BotError::send)?;
    Ok(())
}

/// Replace the deferred reply with `embed`, falling back to a followup if the edit fails.
pub async fn send_embed(
    http: &Arc<Http>,
    interaction: &CommandInteraction,
    embed: CreateEmbed,
) -> Result<()> {
    match interaction
        .edit_response(http, EditInteractionResponse::new().embed(embed))
        .await
    {
        Ok(_) => Ok(()),
        Err(e) => followup_text(http, interaction, &format!("Something went wrong: {e}")).await,
    }
}

#[must_use]
pub fn error_embed(description: &str) -> CreateEmbed {
    CreateEmbed::new().title(ERROR_TITLE).description(description)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_embed_carries_message() {
        let payload = serde_json::to_value(error_embed("no such user")).expect("serializable");
        assert_eq!(payload["title"], "Error");
        assert_eq!(payload["description"], "no such user");
    }
}
