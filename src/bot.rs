//! Slash command bot built on serenity.
//!
//! Commands are collected with [`Bot::register`] and bulk-registered every time
//! the gateway session becomes ready. Each invocation is deferred immediately,
//! its handler runs under a timeout, and the resulting embed replaces the
//! deferred reply.

mod events;
mod options;
mod registry;
mod response;

use std::num::NonZeroU64;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use log::{debug, error, info};
use poise::serenity_prelude::{
    ApplicationId, ClientBuilder, Command, CommandInteraction, Context, CreateCommand,
    Error as SerenityError, GatewayIntents, GuildId, Http, ShardManager,
};
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;

use crate::config::BotOptions;
use crate::error::{BotError, Result};

use events::Events;

pub use futures::future::BoxFuture;
pub use options::CommandOptions;
pub use registry::{CommandRegistry, Handler, HandlerError, HandlerResult};
pub use response::error_embed;

/// Live parts of a started client.
struct Session {
    http: Arc<Http>,
    shard_manager: Arc<ShardManager>,
    task: JoinHandle<()>,
}

pub struct Bot {
    token: String,
    app_id: ApplicationId,
    guild_id: Option<GuildId>,
    unregister: bool,
    intents: GatewayIntents,
    command_timeout: Duration,
    defer_message: String,
    registry: CommandRegistry,
    running: Arc<AtomicBool>,
    registered: Arc<RwLock<Vec<Command>>>,
    session: Mutex<Option<Session>>,
}

impl Bot {
    /// Validate options and create a bot. Nothing connects until [`Bot::start`].
    ///
    /// # Errors
    ///
    /// Returns `Config` if the app ID or token is empty, or an ID is not a
    /// non-zero integer.
    pub fn new(options: BotOptions) -> Result<Self> {
        if options.app_id.trim().is_empty() {
            return Err(BotError::Config("invalid discord app id".to_string()));
        }

        if options.token.trim().is_empty() {
            return Err(BotError::Config("invalid discord token".to_string()));
        }

        let app_id = ApplicationId::new(parse_id("app id", &options.app_id)?);
        let guild_id = options
            .guild_id
            .as_deref()
            .map(|id| parse_id("guild id", id).map(GuildId::new))
            .transpose()?;

        Ok(Self {
            token: options.token,
            app_id,
            guild_id,
            unregister: options.unregister_on_close,
            intents: options.intents,
            command_timeout: options.command_timeout,
            defer_message: options.defer_message,
            registry: CommandRegistry::default(),
            running: Arc::new(AtomicBool::new(false)),
            registered: Arc::new(RwLock::new(Vec::new())),
            session: Mutex::new(None),
        })
    }

    /// Register a slash command and its handler.
    ///
    /// The command is not sent to Discord here; all registered commands are
    /// bulk-registered once the session connects.
    ///
    /// # Errors
    ///
    /// Returns `CommandDuplicate` if a command with the same name exists, or
    /// `CommandInvalid` if the descriptor has no name.
    pub fn register<F>(&mut self, command: CreateCommand, handler: F) -> Result<()>
    where
        F: for<'a> Fn(&'a Context, &'a CommandInteraction) -> BoxFuture<'a, HandlerResult>
            + Send
            + Sync
            + 'static,
    {
        let name = self.registry.insert(command, Arc::new(handler))?;
        debug!("Registered handler for /{name}");
        Ok(())
    }

    /// Like [`Bot::register`], for startup code where a bad command set is a bug.
    ///
    /// # Panics
    ///
    /// Panics if the command name is already registered or missing.
    pub fn must_register<F>(&mut self, command: CreateCommand, handler: F)
    where
        F: for<'a> Fn(&'a Context, &'a CommandInteraction) -> BoxFuture<'a, HandlerResult>
            + Send
            + Sync
            + 'static,
    {
        if let Err(e) = self.register(command, handler) {
            panic!("{e}");
        }
    }

    /// Connect to the gateway. Calling this on a running bot does nothing.
    ///
    /// # Errors
    ///
    /// Returns `Session` if the serenity client cannot be built.
    pub async fn start(&self) -> Result<()> {
        if self.running.swap(true, Ordering::SeqCst) {
            debug!("Bot already running, ignoring start");
            return Ok(());
        }

        let events = Events {
            registry: Arc::new(self.registry.clone()),
            guild_id: self.guild_id,
            registered: Arc::clone(&self.registered),
            command_timeout: self.command_timeout,
            defer_message: self.defer_message.clone(),
        };

        debug!("Creating Discord client");
        let client = ClientBuilder::new(&self.token, self.intents)
            .application_id(self.app_id)
            .event_handler(events)
            .await;

        let mut client = match client {
            Ok(client) => client,
            Err(e) => {
                self.running.store(false, Ordering::SeqCst);
                return Err(e.into());
            }
        };

        let http = Arc::clone(&client.http);
        let shard_manager = Arc::clone(&client.shard_manager);

        info!("Starting Discord client with {} commands", self.registry.len());
        let running = Arc::clone(&self.running);
        let task = tokio::spawn(async move { run_session(client.start(), running).await });

        *self.session.lock().await = Some(Session {
            http,
            shard_manager,
            task,
        });

        Ok(())
    }

    /// Disconnect, first unregistering commands when configured to.
    ///
    /// Failures are logged, never returned.
    pub async fn close(&self) {
        let Some(session) = self.session.lock().await.take() else {
            debug!("Close called on a bot that is not running");
            return;
        };

        if self.unregister {
            self.unregister_commands(&session.http).await;
        }

        session.shard_manager.shutdown_all().await;
        if let Err(e) = session.task.await {
            error!("Failed to close discord session cleanly: {e}");
        }

        self.running.store(false, Ordering::SeqCst);
        info!("Discord session closed");
    }

    async fn unregister_commands(&self, http: &Arc<Http>) {
        let commands = std::mem::take(&mut *self.registered.write().await);
        for command in commands {
            let result = match self.guild_id {
                Some(guild_id) => guild_id.delete_command(http, command.id).await,
                None => Command::delete_global_command(http, command.id).await,
            };

            match result {
                Ok(()) => debug!("Unregistered /{}", command.name),
                Err(e) => error!("Could not unregister command /{}: {e}", command.name),
            }
        }
    }

    /// HTTP client of the running session, for calls the bot does not wrap.
    pub async fn http(&self) -> Option<Arc<Http>> {
        self.session
            .lock()
            .await
            .as_ref()
            .map(|session| Arc::clone(&session.http))
    }

    /// Commands Discord accepted at the last registration.
    pub async fn registered_commands(&self) -> Vec<Command> {
        self.registered.read().await.clone()
    }

    /// True between a successful [`Bot::start`] and either [`Bot::close`] or the
    /// gateway session ending on its own, e.g. after Discord rejects the token.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn commands(&self) -> &CommandRegistry {
        &self.registry
    }
}

/// Drive the gateway session, clearing `running` once it ends for any reason.
async fn run_session<F>(session: F, running: Arc<AtomicBool>)
where
    F: Future<Output = std::result::Result<(), SerenityError>>,
{
    match session.await {
        Ok(()) => info!("Discord session ended"),
        Err(e) => error!("Discord session ended with an error: {e}"),
    }
    running.store(false, Ordering::SeqCst);
}

fn parse_id(what: &str, raw: &str) -> Result<u64> {
    raw.trim()
        .parse::<NonZeroU64>()
        .map(NonZeroU64::get)
        .map_err(|_| BotError::Config(format!("invalid discord {what}: '{raw}'")))
}
