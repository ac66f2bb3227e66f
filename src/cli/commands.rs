use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "deals", about = concat!("deals v", env!("CARGO_PKG_VERSION"), " - opportunity board"), version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Board directory (default: current directory)
    #[arg(short = 'C', long = "board-dir", global = true)]
    pub board_dir: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write a dealboard.toml in the board directory
    Init(InitArgs),
    /// Show columns, cards and totals
    Show,
    /// Add a card at the top of a column
    Add(AddArgs),
    /// Delete a card
    Rm(RmArgs),
    /// Move a card to a column and position
    Mv(MvArgs),
    /// Rename a column
    Rename(RenameArgs),
    /// Preview where a drop at a pointer offset would land
    DropIndex(DropIndexArgs),
    /// Validate board integrity
    Check,
    /// Show entries from the recovery log
    Recovery(RecoveryArgs),
}

#[derive(Args)]
pub struct InitArgs {
    /// Seed column as <id> "name" (repeatable; default: built-in demo board)
    #[arg(long, num_args = 2, value_names = ["ID", "NAME"], action = clap::ArgAction::Append)]
    pub column: Vec<String>,
    /// Overwrite an existing dealboard.toml
    #[arg(long)]
    pub force: bool,
}

#[derive(Args)]
pub struct AddArgs {
    /// Column to add to (default: first column)
    #[arg(long)]
    pub column: Option<String>,
    /// Card title
    #[arg(long)]
    pub title: Option<String>,
    /// Monetary value
    #[arg(long, default_value_t = 0.0)]
    pub value: f64,
    /// Extra field as key=value (repeatable; value parsed as JSON if possible)
    #[arg(long = "field", value_name = "KEY=VALUE")]
    pub fields: Vec<String>,
}

#[derive(Args)]
pub struct RmArgs {
    /// Card ID
    pub id: String,
}

#[derive(Args)]
pub struct MvArgs {
    /// Card ID
    pub id: String,
    /// Target column ID
    pub column: String,
    /// Position in the target column (default: bottom)
    #[arg(long)]
    pub index: Option<usize>,
}

#[derive(Args)]
pub struct RenameArgs {
    /// Column ID
    pub column: String,
    /// New display name
    pub name: String,
}

#[derive(Args)]
pub struct DropIndexArgs {
    /// Column ID
    pub column: String,
    /// Pointer offset from the top of the column's card list, in pixels
    #[arg(allow_negative_numbers = true)]
    pub offset_y: f64,
}

#[derive(Args)]
pub struct RecoveryArgs {
    /// Show only the most recent N entries
    #[arg(long)]
    pub limit: Option<usize>,
}
