use anyhow::{Context, Result};
use clap::CommandFactory;
use colored::{ColoredString, Colorize};
use serde::Serialize;
use std::fmt::Display;
use std::io;
use std::path::Path;

use crate::config::Config;
use crate::opt::{
    Command, CompletionsOpts, Encoding, GetOpts, ListOpts, Opts, OutputFormat, RmOpts, SetOpts,
    APP_NAME,
};
use crate::util::{decode_value, encode_value, fmt_err, fmt_name, fmt_path};
use crate::Error;
use fxattr_core::{ExtendedAttributes, XattrOptions};

pub struct App {
    pub options: XattrOptions,
    pub encoding: Option<Encoding>,
    pub pretty: bool,
    pub output_format: OutputFormat,
    failed: bool,
}

#[derive(Debug, PartialEq, Eq, Serialize)]
pub struct Attribute {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

#[derive(Debug, PartialEq, Eq, Serialize)]
pub struct Entry {
    pub path: String,
    pub attributes: Vec<Attribute>,
}

impl App {
    /// Runs the command from `opts`. Returns `false` if processing any of the entries failed.
    pub fn run(opts: Opts, config: Config) -> Result<bool> {
        let mut app = Self::new(&opts, config);
        app.run_command(opts.cmd)?;

        Ok(!app.failed)
    }

    pub fn new(opts: &Opts, config: Config) -> App {
        let mut options = XattrOptions::empty();
        if opts.no_follow || config.no_follow {
            options |= XattrOptions::NO_FOLLOW;
        }
        if opts.show_compression {
            options |= XattrOptions::SHOW_COMPRESSION;
        }

        log::debug!(
            "options: {:?}, encoding: {:?}, pretty: {}",
            options,
            config.encoding,
            opts.pretty || config.pretty_output
        );

        App {
            options,
            encoding: config.encoding,
            pretty: opts.pretty || config.pretty_output,
            output_format: opts.output_format,
            failed: false,
        }
    }

    pub fn run_command(&mut self, cmd: Command) -> Result<()> {
        if !self.pretty {
            colored::control::SHOULD_COLORIZE.set_override(false);
        }
        match cmd {
            Command::List(ref opts) => self.list(opts),
            Command::Get(ref opts) => self.get(opts),
            Command::Set(ref opts) => self.set(opts),
            Command::Rm(ref opts) => self.rm(opts),
            Command::PrintCompletions(ref opts) => {
                self.print_completions(opts);
                Ok(())
            }
        }
    }

    fn report<E: Display>(&mut self, path: &Path, err: E) {
        log::warn!("{}: {}", path.display(), err);
        eprintln!("{}: {}", fmt_path(path), fmt_err(err));
        self.failed = true;
    }

    fn encoding_or(&self, encoding: Option<Encoding>) -> Encoding {
        encoding.or(self.encoding).unwrap_or(Encoding::Text)
    }

    /// Reads the attributes of `path`, with values encoded using `encoding` if provided.
    pub fn entry(&self, path: &Path, encoding: Option<Encoding>) -> crate::Result<Entry> {
        let attributes = match encoding {
            Some(encoding) => path
                .xattrs(self.options)?
                .into_iter()
                .map(|attr| {
                    let (name, value) = attr.into_parts();
                    Attribute {
                        name,
                        value: Some(encode_value(&value, encoding)),
                    }
                })
                .collect(),
            None => path
                .xattr_names(self.options)?
                .into_iter()
                .map(|name| Attribute { name, value: None })
                .collect(),
        };

        Ok(Entry {
            path: path.display().to_string(),
            attributes,
        })
    }

    fn print_serialized<T: Serialize>(&self, value: &T) -> Result<()> {
        match self.output_format {
            OutputFormat::Json => {
                let out = serde_json::to_string_pretty(value).map_err(Error::from)?;
                println!("{}", out);
            }
            OutputFormat::Yaml => {
                let out = serde_yaml::to_string(value).map_err(Error::from)?;
                print!("{}", out);
            }
            OutputFormat::Default => {}
        }
        Ok(())
    }

    fn list(&mut self, opts: &ListOpts) -> Result<()> {
        let encoding = opts.values.then(|| self.encoding_or(opts.encoding));
        let mut entries = Vec::new();

        for path in &opts.paths {
            match self.entry(path, encoding) {
                Ok(entry) => entries.push(entry),
                Err(e) => self.report(path, e),
            }
        }

        if self.output_format != OutputFormat::Default {
            return self
                .print_serialized(&entries)
                .context("failed to print attribute list");
        }

        for entry in &entries {
            if opts.values {
                println!("{}:", fmt_path(&entry.path));
                for attr in &entry.attributes {
                    println!(
                        "\t{} = {}",
                        fmt_name(&attr.name),
                        attr.value.as_deref().unwrap_or_default()
                    );
                }
            } else {
                let names = entry
                    .attributes
                    .iter()
                    .map(|attr| fmt_name(&attr.name).to_string())
                    .collect::<Vec<_>>()
                    .join(" ");
                println!("{}: {}", fmt_path(&entry.path), names);
            }
        }

        Ok(())
    }

    fn get(&mut self, opts: &GetOpts) -> Result<()> {
        let encoding = self.encoding_or(opts.encoding);

        let value = match opts.path.xattr_value(&opts.name, self.options) {
            Ok(value) => encode_value(&value, encoding),
            Err(e) => {
                self.report(&opts.path, e);
                return Ok(());
            }
        };

        if self.output_format == OutputFormat::Default {
            println!("{}", value);
            return Ok(());
        }

        let entry = Entry {
            path: opts.path.display().to_string(),
            attributes: vec![Attribute {
                name: opts.name.clone(),
                value: Some(value),
            }],
        };
        self.print_serialized(&entry)
            .context("failed to print attribute value")
    }

    /// Prints the outcome of a modification of `name` on `path`. In serialized output formats the
    /// modified attribute is printed as an [`Entry`], with `value` omitted for removals.
    fn print_modified(
        &self,
        path: &Path,
        name: &str,
        value: Option<String>,
        marker: ColoredString,
    ) -> Result<()> {
        if self.output_format == OutputFormat::Default {
            println!("{}:\t{} {}", fmt_path(path), marker, fmt_name(name));
            return Ok(());
        }

        let entry = Entry {
            path: path.display().to_string(),
            attributes: vec![Attribute {
                name: name.to_string(),
                value,
            }],
        };
        self.print_serialized(&entry)
            .context("failed to print modified attribute")
    }

    fn set(&mut self, opts: &SetOpts) -> Result<()> {
        let encoding = self.encoding_or(opts.encoding);
        let value = match decode_value(&opts.value, encoding) {
            Ok(value) => value,
            Err(e) => {
                self.report(&opts.path, e);
                return Ok(());
            }
        };

        let mut options = self.options;
        if opts.create {
            options |= XattrOptions::CREATE;
        }
        if opts.replace {
            options |= XattrOptions::REPLACE;
        }

        match opts.path.set_xattr(&opts.name, &value, options) {
            Ok(()) => self.print_modified(
                &opts.path,
                &opts.name,
                Some(encode_value(&value, encoding)),
                "+".bold().green(),
            ),
            Err(e) => {
                self.report(&opts.path, e);
                Ok(())
            }
        }
    }

    fn rm(&mut self, opts: &RmOpts) -> Result<()> {
        match opts.path.remove_xattr(&opts.name, self.options) {
            Ok(()) => self.print_modified(&opts.path, &opts.name, None, "X".bold().red()),
            Err(e) => {
                self.report(&opts.path, e);
                Ok(())
            }
        }
    }

    fn print_completions(&self, opts: &CompletionsOpts) {
        let mut app = Opts::command();
        clap_complete::generate(opts.shell, &mut app, APP_NAME, &mut io::stdout());
    }
}
