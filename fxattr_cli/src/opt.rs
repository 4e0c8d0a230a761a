//! Options used by the main executable
use std::fmt;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use serde::{Deserialize, Serialize};

pub const APP_NAME: &str = "fxattr";
pub const APP_VERSION: &str = "0.1.0";
pub const APP_AUTHOR: &str = "Wojciech Kępka <wojciech@wkepka.dev>";
pub const APP_ABOUT: &str = "Tool to inspect and modify extended attributes of files.";

#[derive(Parser)]
#[clap(
    name = APP_NAME,
    version = APP_VERSION,
    author = APP_AUTHOR,
    about = APP_ABOUT,
)]
pub struct Opts {
    #[arg(short, long)]
    /// Act on symbolic links themselves instead of the files they point to.
    pub no_follow: bool,
    #[arg(long)]
    /// Show attributes the OS hides for compressed files. Only has an effect on macOS.
    pub show_compression: bool,
    /// Make the output pretty (add color). This is not recommended when using fxattr in
    /// scripts.
    #[arg(long, short)]
    pub pretty: bool,
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Default)]
    /// Change the output format to `json` or `yaml`
    pub output_format: OutputFormat,
    #[clap(subcommand)]
    pub cmd: Command,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Yaml,
    Json,
    Default,
}

/// How attribute values are printed and parsed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Encoding {
    /// UTF-8 text, invalid sequences are replaced when printing
    Text,
    /// Lowercase hexadecimal
    Hex,
    Base64,
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Encoding::Text => write!(f, "text"),
            Encoding::Hex => write!(f, "hex"),
            Encoding::Base64 => write!(f, "base64"),
        }
    }
}

#[derive(Subcommand)]
pub enum Command {
    /// Lists extended attribute names of the given entries.
    List(ListOpts),
    /// Prints the value of a single extended attribute.
    Get(GetOpts),
    /// Sets the value of an extended attribute, overwriting the previous one.
    Set(SetOpts),
    /// Removes an extended attribute.
    Rm(RmOpts),
    /// Prints completions for the specified shell to stdout
    PrintCompletions(CompletionsOpts),
}

#[derive(Args)]
pub struct ListOpts {
    #[clap(required = true)]
    /// A list of entries to list attributes of
    pub paths: Vec<PathBuf>,
    #[arg(short, long)]
    /// Also print the value of every attribute
    pub values: bool,
    #[arg(short, long, value_enum)]
    /// Encoding used to print values
    pub encoding: Option<Encoding>,
}

#[derive(Args)]
pub struct GetOpts {
    pub path: PathBuf,
    /// Name of the attribute, for example `user.checksum`
    pub name: String,
    #[arg(short, long, value_enum)]
    /// Encoding used to print the value
    pub encoding: Option<Encoding>,
}

#[derive(Args)]
pub struct SetOpts {
    pub path: PathBuf,
    /// Name of the attribute, for example `user.checksum`
    pub name: String,
    pub value: String,
    #[arg(short, long, value_enum)]
    /// Encoding of the provided value
    pub encoding: Option<Encoding>,
    #[arg(long, conflicts_with = "replace")]
    /// Fail if the attribute already exists
    pub create: bool,
    #[arg(long)]
    /// Fail if the attribute doesn't exist yet
    pub replace: bool,
}

#[derive(Args)]
pub struct RmOpts {
    pub path: PathBuf,
    /// Name of the attribute to remove
    pub name: String,
}

#[derive(Args)]
pub struct CompletionsOpts {
    #[arg(value_enum)]
    /// A shell for which to print completions.
    pub shell: Shell,
}
