//! Flattened lookup over slash command options.

use std::collections::HashMap;

use poise::serenity_prelude::{
    ChannelId, CommandDataOption, CommandDataOptionValue, CommandInteraction, RoleId, UserId,
};

/// Top-level options of a slash command invocation, keyed by option name.
#[derive(Debug, Clone, Default)]
pub struct CommandOptions(HashMap<String, CommandDataOptionValue>);

impl CommandOptions {
    /// Flatten an option list into a map. Later duplicates win.
    #[must_use]
    pub fn from_options(options: &[CommandDataOption]) -> Self {
        Self(
            options
                .iter()
                .map(|opt| (opt.name.clone(), opt.value.clone()))
                .collect(),
        )
    }

    #[must_use]
    pub fn from_interaction(interaction: &CommandInteraction) -> Self {
        Self::from_options(&interaction.data.options)
    }

    /// String value of `key`, or `""` when missing or not a string.
    #[must_use]
    pub fn string(&self, key: &str) -> &str {
        match self.0.get(key) {
            Some(CommandDataOptionValue::String(value)) => value,
            _ => "",
        }
    }

    #[must_use]
    pub fn integer(&self, key: &str) -> Option<i64> {
        match self.0.get(key) {
            Some(CommandDataOptionValue::Integer(value)) => Some(*value),
            _ => None,
        }
    }

    #[must_use]
    pub fn number(&self, key: &str) -> Option<f64> {
        match self.0.get(key) {
            Some(CommandDataOptionValue::Number(value)) => Some(*value),
            _ => None,
        }
    }

    #[must_use]
    pub fn boolean(&self, key: &str) -> Option<bool> {
        match self.0.get(key) {
            Some(CommandDataOptionValue::Boolean(value)) => Some(*value),
            _ => None,
        }
    }

    #[must_use]
    pub fn user(&self, key: &str) -> Option<UserId> {
        match self.0.get(key) {
            Some(CommandDataOptionValue::User(id)) => Some(*id),
            _ => None,
        }
    }

    #[must_use]
    pub fn channel(&self, key: &str) -> Option<ChannelId> {
        match self.0.get(key) {
            Some(CommandDataOptionValue::Channel(id)) => Some(*id),
            _ => None,
        }
    }

    #[must_use]
    pub fn role(&self, key: &str) -> Option<RoleId> {
        match self.0.get(key) {
            Some(CommandDataOptionValue::Role(id)) => Some(*id),
            _ => None,
        }
    }

    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
