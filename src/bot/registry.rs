//! Bookkeeping for slash commands and their handlers.

use std::collections::HashMap;
use std::error::Error as StdError;
use std::sync::Arc;

use futures::future::BoxFuture;
use poise::serenity_prelude::{CommandInteraction, Context, CreateCommand, CreateEmbed};
use serde_json::Value;

use crate::error::{BotError, Result};

/// Error type handlers may return; its message is shown to the invoking user.
pub type HandlerError = Box<dyn StdError + Send + Sync>;

pub type HandlerResult = std::result::Result<CreateEmbed, HandlerError>;

/// Responds to a slash command interaction with an embed.
pub type Handler = Arc<
    dyn for<'a> Fn(&'a Context, &'a CommandInteraction) -> BoxFuture<'a, HandlerResult>
        + Send
        + Sync,
>;

/// Command descriptors in registration order plus a handler per command name.
///
/// No two commands share a name.
#[derive(Clone, Default)]
pub struct CommandRegistry {
    handlers: HashMap<String, Handler>,
    commands: Vec<CreateCommand>,
}

impl CommandRegistry {
    /// Add a command and its handler, returning the command name.
    ///
    /// # Errors
    ///
    /// Returns `CommandInvalid` if the descriptor has no name and
    /// `CommandDuplicate` if the name is already taken.
    pub fn insert(&mut self, command: CreateCommand, handler: Handler) -> Result<String> {
        let name = command_name(&command)?;
        if self.handlers.contains_key(&name) {
            return Err(BotError::CommandDuplicate(name));
        }

        self.handlers.insert(name.clone(), handler);
        self.commands.push(command);
        Ok(name)
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Handler> {
        self.handlers.get(name)
    }

    /// Descriptors to bulk-register with the platform.
    #[must_use]
    pub fn commands(&self) -> &[CreateCommand] {
        &self.commands
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

/// Builders keep their fields private, so read the name back from the payload.
fn command_name(command: &CreateCommand) -> Result<String> {
    let payload = serde_json::to_value(command)
        .map_err(|e| BotError::CommandInvalid(format!("unreadable command descriptor: {e}")))?;

    payload
        .get("name")
        .and_then(Value::as_str)
        .filter(|name| !name.is_empty())
        .map(ToString::to_string)
        .ok_or_else(|| BotError::CommandInvalid("command has no name".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ok_handler<'a>(_: &'a Context, _: &'a CommandInteraction) -> BoxFuture<'a, HandlerResult> {
        Box::pin(async { HandlerResult::Ok(CreateEmbed::new().title("ok")) })
    }

    fn handler() -> Handler {
        Arc::new(ok_handler)
    }

    #[test]
    fn keeps_registration_order() {
        let mut registry = CommandRegistry::default();
        registry
            .insert(CreateCommand::new("first").description("1"), handler())
            .expect("first registers");
        registry
            .insert(CreateCommand::new("second").description("2"), handler())
            .expect("second registers");

        assert_eq!(registry.len(), 2);
        let names: Vec<String> = registry
            .commands()
            .iter()
            .map(|cmd| command_name(cmd).expect("named"))
            .collect();
        assert_eq!(names, ["first", "second"]);
        assert!(registry.get("first").is_some());
        assert!(registry.get("third").is_none());
    }

    #[test]
    fn rejects_duplicate_names() {
        let mut registry = CommandRegistry::default();
        registry
            .insert(CreateCommand::new("hello").description("a"), handler())
            .expect("first registers");

        let err = registry
            .insert(CreateCommand::new("hello").description("b"), handler())
            .expect_err("duplicate must fail");

        assert!(matches!(err, BotError::CommandDuplicate(ref name) if name == "hello"));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn rejects_nameless_command() {
        let mut registry = CommandRegistry::default();
        let err = registry
            .insert(CreateCommand::new(""), handler())
            .expect_err("empty name must fail");
        assert!(matches!(err, BotError::CommandInvalid(_)));
        assert!(registry.is_empty());
    }
}
