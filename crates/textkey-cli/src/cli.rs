use clap::{Parser, Subcommand, ValueEnum};
use textkey_core::models::SendMode;

#[derive(Parser)]
#[command(
    name = "textkey",
    version = env!("CARGO_PKG_VERSION"),
    about = "textkey - a text expansion and automation tool",
    long_about = "textkey lets you define phrases, abbreviations and hotkeys and manage them from the command line."
)]
pub struct Textkey {
    #[clap(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create a folder
    AddFolder {
        /// Title of the new folder
        title: String,

        #[clap(long, short, help = "Title of the parent folder")]
        parent: Option<String>,
    },
    /// Create a phrase inside a folder
    AddPhrase {
        /// Title of the folder to place the phrase in
        folder: String,

        /// Name/description for the phrase
        name: String,

        /// The expansion text
        contents: String,

        #[clap(long, short, help = "Abbreviation that triggers the phrase (repeatable)")]
        abbreviation: Vec<String>,

        #[clap(long, short, help = "Hotkey modifier, e.g. '<ctrl>' (repeatable)")]
        modifier: Vec<String>,

        #[clap(long, short, help = "Hotkey key, e.g. '9' or '<f12>'")]
        key: Option<String>,

        #[clap(long, help = "Window title filter (regular expression)")]
        filter: Option<String>,

        #[clap(long, value_enum, default_value_t, help = "How the phrase is sent")]
        send_mode: SendModeArg,

        #[clap(long, help = "Show the phrase in the tray menu")]
        tray: bool,

        #[clap(long, help = "Ask for confirmation before every expansion")]
        prompt: bool,
    },
    /// Create a script inside a folder
    AddScript {
        /// Title of the folder to place the script in
        folder: String,

        /// Name/description for the script
        name: String,

        /// The script source
        source: String,
    },
    /// Delete an item from a folder
    Remove {
        /// Title of the folder holding the item
        folder: String,

        /// Description of the item to delete
        name: String,
    },
    /// Show one item in full
    Show {
        /// Title of the folder holding the item
        folder: String,

        /// Description of the item to show
        name: String,
    },
    /// List all folders and items
    List,
    /// Run a script by its description
    RunScript {
        /// Description of the script to run
        description: String,
    },
    /// Back up the main configuration file
    Backup,
    /// Restore the main configuration file from its backup
    Restore,
    /// Print the configuration paths
    Paths,
}

/// CLI surface for the phrase send mode.
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum SendModeArg {
    #[default]
    Keyboard,
    CtrlV,
    CtrlShiftV,
    ShiftInsert,
    Selection,
}

impl From<SendModeArg> for SendMode {
    fn from(arg: SendModeArg) -> SendMode {
        match arg {
            SendModeArg::Keyboard => SendMode::Keyboard,
            SendModeArg::CtrlV => SendMode::CbCtrlV,
            SendModeArg::CtrlShiftV => SendMode::CbCtrlShiftV,
            SendModeArg::ShiftInsert => SendMode::CbShiftInsert,
            SendModeArg::Selection => SendMode::Selection,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Textkey::command().debug_assert();
    }
}
