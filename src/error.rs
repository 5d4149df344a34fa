use thiserror::Error;

#[derive(Error, Debug)]
pub enum BotError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Environment variable error: {0}")]
    EnvVar(#[from] std::env::VarError),

    #[error("Failed to start session: {0}")]
    Session(Box<poise::serenity_prelude::Error>),

    #[error("Command invalid: {0}")]
    CommandInvalid(String),

    #[error("Failed to send response: {0}")]
    CommandSend(Box<poise::serenity_prelude::Error>),

    #[error("Could not complete command: {0}")]
    CommandExec(String),

    #[error("Duplicate command: {0}")]
    CommandDuplicate(String),
}

impl BotError {
    /// Wraps a serenity error raised while delivering an interaction response.
    pub fn send(err: poise::serenity_prelude::Error) -> Self {
        BotError::CommandSend(Box::new(err))
    }
}

impl From<poise::serenity_prelude::Error> for BotError {
    fn from(err: poise::serenity_prelude::Error) -> Self {
        BotError::Session(Box::new(err))
    }
}

pub type Result<T> = std::result::Result<T, BotError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_category() {
        let err = BotError::Config("invalid discord token".to_string());
        assert_eq!(err.to_string(), "Configuration error: invalid discord token");

        let err = BotError::CommandDuplicate("hello".to_string());
        assert_eq!(err.to_string(), "Duplicate command: hello");
    }

    #[test]
    fn env_var_errors_convert() {
        let err: BotError = std::env::VarError::NotPresent.into();
        assert!(matches!(err, BotError::EnvVar(_)));
    }
}
