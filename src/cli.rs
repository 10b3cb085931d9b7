use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "yasami")]
#[command(author, version, about = "Telegram bot for organizing informal social events", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the bot in long polling mode
    Run,

    /// Apply database migrations and exit
    Migrate,
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
