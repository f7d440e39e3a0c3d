//! Command-line argument definitions using clap

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Inspect and edit INI files without losing comments or ordering
#[derive(Parser, Debug)]
#[command(name = "inikeep")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// INI file to work on (defaults to `default_file` from the config file)
    #[arg(short, long, global = true)]
    pub file: Option<PathBuf>,

    /// Fail instead of starting empty when the file does not exist
    #[arg(long, global = true)]
    pub strict: bool,

    /// Increase log output (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// List section names in file order
    Sections,

    /// List the keys of a section
    Keys {
        section: String,
        /// Print `key=value` instead of bare keys
        #[arg(long)]
        values: bool,
    },

    /// Print one value
    Get {
        section: String,
        key: String,
        /// Printed when the section or key is missing, instead of failing
        #[arg(long)]
        default: Option<String>,
        #[arg(long = "type", value_enum, default_value_t = ValueType::String)]
        value_type: ValueType,
    },

    /// Store one value, creating the section and key as needed
    Set {
        section: String,
        key: String,
        value: String,
        #[arg(long = "type", value_enum, default_value_t = ValueType::String)]
        value_type: ValueType,
    },

    /// Remove one key and its comments
    DeleteKey { section: String, key: String },

    /// Remove a whole section
    DeleteSection { section: String },

    /// Remove every key of a section, keeping the header
    EraseSection { section: String },

    /// Remove everything
    Clear,

    /// Print the document as it would be saved
    Show,

    /// Copy every entry of another INI file into this one, saving once
    Merge { other: PathBuf },
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueType {
    String,
    Int,
    Float,
    Bool,
}
