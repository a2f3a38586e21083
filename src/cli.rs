use std::path::PathBuf;

use clap::{Args as ClapArgs, Parser, Subcommand, ValueEnum};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Mode {
    Dir,
    Single,
}

#[derive(Debug, Parser)]
#[command(author, version, about)]
pub struct Args {
    /// Preference profile: a JSON object of key -> string standing in for browser storage.
    #[arg(long, global = true, default_value = "site-prefs.json")]
    pub profile: PathBuf,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Render the site shell with the profile's theme and consent applied.
    Render(RenderArgs),
    /// Inspect or change the selected color theme.
    #[command(subcommand)]
    Theme(ThemeCommand),
    /// Inspect or record the cookie consent decision.
    #[command(subcommand)]
    Consent(ConsentCommand),
}

#[derive(Debug, ClapArgs)]
pub struct RenderArgs {
    /// Site config JSON (brand, phone, CTA, third-party scripts). Built-in defaults when omitted.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Output mode: `dir` (index.html + assets/) or `single` (one self-contained HTML).
    #[arg(long, value_enum, default_value = "dir")]
    pub mode: Mode,

    /// Output path. For `dir` mode: a directory. For `single` mode: an HTML file path.
    #[arg(long)]
    pub out: Option<PathBuf>,

    /// Assets directory name for `dir` mode.
    #[arg(long, default_value = "assets")]
    pub assets_dir_name: String,
}

#[derive(Debug, Subcommand)]
pub enum ThemeCommand {
    /// Print the selected theme.
    Get,
    /// List every theme in cycle order.
    List,
    /// Select a theme by identifier (e.g. `blue-gulf`).
    Set { name: String },
    /// Advance to the next theme, wrapping after the last.
    Cycle,
}

#[derive(Debug, Subcommand)]
pub enum ConsentCommand {
    /// Print the stored decision, or `undecided`.
    Status,
    /// Allow every category.
    AcceptAll,
    /// Essential cookies only.
    Dismiss,
    /// Save an explicit choice; categories not named are off.
    Save {
        #[arg(long)]
        analytics: bool,
        #[arg(long)]
        marketing: bool,
        #[arg(long)]
        functional: bool,
    },
}
