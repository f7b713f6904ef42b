use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "wbstickers")]
#[command(author, version, about = "Telegram bot for Wildberries sellers: supplies, orders and shipping labels", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    /// Run the bot (long polling)
    Run,

    /// Build the label archive of a supply without the bot and print the report
    Prepare {
        /// Supply id, e.g. WB-GI-1234567
        supply_id: String,

        /// Keep stickers and PDFs next to the archive
        #[arg(long)]
        keep_files: bool,
    },

    /// Remove label artifacts left in the labels directory
    Cleanup,
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
