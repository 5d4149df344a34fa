use lipstick::bot::BoxFuture;
use lipstick::table::{Table, code_block};
use lipstick::{Bot, BotOptions, CommandOptions, HandlerResult};
use log::{error, info};
use poise::serenity_prelude::{
    CommandInteraction, CommandOptionType, Context, CreateCommand, CreateCommandOption,
    CreateEmbed, Permissions,
};

fn hello<'a>(_ctx: &'a Context, interaction: &'a CommandInteraction) -> BoxFuture<'a, HandlerResult> {
    Box::pin(async move {
        let options = CommandOptions::from_interaction(interaction);
        let name = match options.string("name") {
            "" => "World",
            name => name,
        };
        HandlerResult::Ok(CreateEmbed::new().title("It worked!").description(name))
    })
}

async fn powers(interaction: &CommandInteraction) -> HandlerResult {
    let options = CommandOptions::from_interaction(interaction);
    let rows = options.integer("rows").unwrap_or(3);
    if !(1..=20).contains(&rows) {
        return Err(format!("rows must be between 1 and 20, got {rows}").into());
    }

    let table = Table::new()
        .headers(["#", "square", "cube"])
        .rows((1..=rows).map(|n| [n.to_string(), (n * n).to_string(), (n * n * n).to_string()]));

    Ok(CreateEmbed::new()
        .title("Powers")
        .description(code_block(&table.render())))
}

fn table<'a>(_ctx: &'a Context, interaction: &'a CommandInteraction) -> BoxFuture<'a, HandlerResult> {
    Box::pin(powers(interaction))
}

#[tokio::main]
async fn main() -> lipstick::Result<()> {
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("lipstick=info,serenity=warn"),
    )
    .init();
    info!("Starting lipstick demo bot");

    let mut bot = Bot::new(BotOptions::from_env()?)?;

    bot.register(
        CreateCommand::new("hello")
            .description("Example command")
            .default_member_permissions(Permissions::VIEW_CHANNEL)
            .add_option(CreateCommandOption::new(
                CommandOptionType::String,
                "name",
                "Who to greet",
            )),
        hello,
    )?;
    bot.register(
        CreateCommand::new("table")
            .description("Render a table of powers")
            .add_option(
                CreateCommandOption::new(CommandOptionType::Integer, "rows", "Number of rows")
                    .min_int_value(1)
                    .max_int_value(20),
            ),
        table,
    )?;

    bot.start().await?;

    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {e}");
    }
    info!("Shutdown signal received, shutting down...");

    bot.close().await;
    info!("Bot shut down successfully");
    Ok(())
}
