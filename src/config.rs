use std::env::{self, VarError};
use std::fmt;
use std::time::Duration;

use log::{debug, error, info};
use poise::serenity_prelude::GatewayIntents;

use crate::error::{BotError, Result};

/// How long a command handler may run before the interaction is failed.
pub const DEFAULT_COMMAND_TIMEOUT: Duration = Duration::from_secs(30);

/// Content of the deferred acknowledgement sent before a handler runs.
pub const DEFAULT_DEFER_MESSAGE: &str = "Calculating numberwang...";

#[derive(Clone)]
pub struct BotOptions {
    /// Bot token, without any `Bot ` prefix.
    pub token: String,
    /// The bot's application ID.
    pub app_id: String,
    /// Guild to register commands in. When unset, commands are registered globally.
    pub guild_id: Option<String>,
    /// Delete every registered command when the bot is closed.
    pub unregister_on_close: bool,
    pub intents: GatewayIntents,
    pub command_timeout: Duration,
    pub defer_message: String,
}

impl BotOptions {
    pub fn new(token: impl Into<String>, app_id: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            app_id: app_id.into(),
            guild_id: None,
            unregister_on_close: false,
            intents: default_intents(),
            command_timeout: DEFAULT_COMMAND_TIMEOUT,
            defer_message: DEFAULT_DEFER_MESSAGE.to_string(),
        }
    }

    #[must_use]
    pub fn guild_id(mut self, guild_id: impl Into<String>) -> Self {
        self.guild_id = Some(guild_id.into());
        self
    }

    #[must_use]
    pub fn unregister_on_close(mut self, unregister: bool) -> Self {
        self.unregister_on_close = unregister;
        self
    }

    #[must_use]
    pub fn intents(mut self, intents: GatewayIntents) -> Self {
        self.intents = intents;
        self
    }

    #[must_use]
    pub fn command_timeout(mut self, timeout: Duration) -> Self {
        self.command_timeout = timeout;
        self
    }

    #[must_use]
    pub fn defer_message(mut self, message: impl Into<String>) -> Self {
        self.defer_message = message.into();
        self
    }

    /// Load options from the process environment, reading `.env` first if present.
    ///
    /// # Errors
    ///
    /// Returns an error if `DISCORD_TOKEN` or `DISCORD_APP_ID` is missing, or if
    /// `DISCORD_UNREGISTER_ON_CLOSE` is not a boolean.
    pub fn from_env() -> Result<Self> {
        debug!("Loading configuration from environment");
        dotenvy::dotenv().ok();
        Self::from_vars(|name| env::var(name))
    }

    fn from_vars<F>(var: F) -> Result<Self>
    where
        F: Fn(&str) -> std::result::Result<String, VarError>,
    {
        let token = var("DISCORD_TOKEN").map_err(|e| {
            error!("Failed to load DISCORD_TOKEN from environment: {e}");
            e
        })?;

        let app_id = var("DISCORD_APP_ID").map_err(|e| {
            error!("Failed to load DISCORD_APP_ID from environment: {e}");
            e
        })?;

        let mut options = Self::new(token, app_id);

        if let Some(guild_id) = optional(&var, "DISCORD_GUILD_ID")? {
            options.guild_id = Some(guild_id);
        }

        if let Some(value) = optional(&var, "DISCORD_UNREGISTER_ON_CLOSE")? {
            options.unregister_on_close = parse_bool("DISCORD_UNREGISTER_ON_CLOSE", &value)?;
        }

        info!("Configuration loaded successfully");
        debug!("Discord token length: {} characters", options.token.len());
        debug!("Discord app ID: {}", options.app_id);
        debug!(
            "Command scope: {}",
            options.guild_id.as_deref().unwrap_or("global")
        );
        debug!("Unregister on close: {}", options.unregister_on_close);

        Ok(options)
    }
}

impl fmt::Debug for BotOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BotOptions")
            .field("token", &format_args!("<{} chars>", self.token.len()))
            .field("app_id", &self.app_id)
            .field("guild_id", &self.guild_id)
            .field("unregister_on_close", &self.unregister_on_close)
            .field("intents", &self.intents)
            .field("command_timeout", &self.command_timeout)
            .field("defer_message", &self.defer_message)
            .finish()
    }
}

fn default_intents() -> GatewayIntents {
    GatewayIntents::non_privileged()
        | GatewayIntents::MESSAGE_CONTENT
        | GatewayIntents::GUILD_MEMBERS
}

/// Reads an optional variable, treating unset and blank the same.
fn optional<F>(var: &F, name: &str) -> Result<Option<String>>
where
    F: Fn(&str) -> std::result::Result<String, VarError>,
{
    match var(name) {
        Ok(value) if value.trim().is_empty() => Ok(None),
        Ok(value) => Ok(Some(value.trim().to_string())),
        Err(VarError::NotPresent) => Ok(None),
        Err(e) => {
            error!("Failed to load {name} from environment: {e}");
            Err(e.into())
        }
    }
}

fn parse_bool(name: &str, value: &str) -> Result<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(BotError::Config(format!(
            "{name} must be a boolean, got '{other}'"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> std::result::Result<String, VarError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |name: &str| vars.get(name).cloned().ok_or(VarError::NotPresent)
    }

    #[test]
    fn defaults_match_platform_expectations() {
        let options = BotOptions::new("token", "123");
        assert_eq!(options.guild_id, None);
        assert!(!options.unregister_on_close);
        assert_eq!(options.command_timeout, Duration::from_secs(30));
        assert_eq!(options.defer_message, "Calculating numberwang...");
        assert!(options.intents.contains(GatewayIntents::GUILD_MESSAGES));
        assert!(options.intents.contains(GatewayIntents::MESSAGE_CONTENT));
        assert!(options.intents.contains(GatewayIntents::GUILD_MEMBERS));
    }

    #[test]
    fn debug_output_hides_token() {
        let options = BotOptions::new("super-secret-token", "123").guild_id("7");
        let debug = format!("{options:?}");
        assert!(!debug.contains("super-secret-token"));
        assert!(debug.contains("<18 chars>"));
        assert!(debug.contains("app_id: \"123\""));
    }

    #[test]
    fn loads_required_and_optional_vars() {
        let options = BotOptions::from_vars(lookup(&[
            ("DISCORD_TOKEN", "abc"),
            ("DISCORD_APP_ID", "42"),
            ("DISCORD_GUILD_ID", " 7 "),
            ("DISCORD_UNREGISTER_ON_CLOSE", "True"),
        ]))
        .expect("options should load");

        assert_eq!(options.token, "abc");
        assert_eq!(options.app_id, "42");
        assert_eq!(options.guild_id.as_deref(), Some("7"));
        assert!(options.unregister_on_close);
    }

    #[test]
    fn blank_guild_means_global() {
        let options = BotOptions::from_vars(lookup(&[
            ("DISCORD_TOKEN", "abc"),
            ("DISCORD_APP_ID", "42"),
            ("DISCORD_GUILD_ID", ""),
        ]))
        .expect("options should load");

        assert_eq!(options.guild_id, None);
    }

    #[test]
    fn missing_token_is_an_error() {
        let result = BotOptions::from_vars(lookup(&[("DISCORD_APP_ID", "42")]));
        assert!(matches!(result, Err(BotError::EnvVar(VarError::NotPresent))));
    }

    #[test]
    fn rejects_non_boolean_unregister() {
        let result = BotOptions::from_vars(lookup(&[
            ("DISCORD_TOKEN", "abc"),
            ("DISCORD_APP_ID", "42"),
            ("DISCORD_UNREGISTER_ON_CLOSE", "maybe"),
        ]));
        assert!(matches!(result, Err(BotError::Config(_))));
    }
}
