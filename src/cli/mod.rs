//! Command-line interface parsing and handling
//!
//! This module handles parsing command-line arguments and executing the appropriate commands.

pub mod language_list;
pub mod render;
pub mod settings;


use std::error::Error;
use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::cli::language_list::list_languages;
use crate::cli::render::{copy_block, render_file, render_transcript};
use crate::cli::settings::SettingRegistry;
use crate::core::config::{path_display, Config};
use crate::utils::logging::init_tracing;
use crate::utils::syntax::stylesheet;

#[derive(Parser)]
#[command(name = "chatmark")]
#[command(version)]
#[command(about = "Render chat messages to HTML with decorated, copyable code blocks")]
#[command(
    long_about = "chatmark turns chat message text into HTML. Fenced code blocks get a \
language label and a copy control, and are syntax highlighted when the language is known.\n\n\
Configuration:\n\
  Settings live in a TOML file under the platform config directory.\n\
  Use 'chatmark config show' to see every key and its current value.\n\n\
Environment Variables:\n\
  RUST_LOG          Log filter (overrides -v), e.g. RUST_LOG=chatmark=trace"
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Commands,

    /// Use this config file instead of the default location
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Log debug output to stderr
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Render markdown from a file (or stdin) to HTML
    Render {
        /// Input file; reads stdin when omitted or `-`
        file: Option<PathBuf>,
        /// Wrap code blocks with a language header and copy control
        #[arg(long)]
        decorate: bool,
        /// Skip syntax highlighting even if enabled in the config
        #[arg(long)]
        no_highlight: bool,
    },
    /// Render a JSON history page as a decorated message list
    Transcript {
        /// History page file: {"messages": [...], "has_more": false}
        file: PathBuf,
    },
    /// Copy one code block of a rendered message to the clipboard
    Copy {
        /// Input file; reads stdin when omitted or `-`
        file: Option<PathBuf>,
        /// Which block to copy, counting from 1
        #[arg(long, value_name = "N")]
        block: usize,
    },
    /// List language tags that get highlighted
    Languages,
    /// Print CSS for the highlighter's `hl-` classes
    Css {
        /// Use the light theme instead of the dark one
        #[arg(long)]
        light: bool,
    },
    /// Show or change configuration values
    Config {
        #[command(subcommand)]
        action: ConfigCommand,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Print the config file location
    Path,
    /// Print every setting with its current value
    Show,
    /// Set a configuration value
    Set {
        /// Configuration key, e.g. markdown.breaks or copy.label
        key: String,
        /// Value to set (can be multiple words for labels)
        #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
        value: Vec<String>,
    },
    /// Unset a configuration value so its default applies
    Unset {
        /// Configuration key to unset
        key: String,
    },
}

pub fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    init_tracing(args.verbose);
    tokio::runtime::Runtime::new()?.block_on(run(args))
}

pub async fn run(args: Args) -> Result<(), Box<dyn Error>> {
    let config_path = args.config.unwrap_or_else(Config::get_config_path);

    match args.command {
        Commands::Render {
            file,
            decorate,
            no_highlight,
        } => {
            let mut config = Config::load_from_path(&config_path)?;
            if no_highlight {
                config.highlight.enabled = Some(false);
            }
            let html = render_file(&config, file.as_deref(), decorate)?;
            print!("{html}");
            Ok(())
        }
        Commands::Transcript { file } => {
            let config = Config::load_from_path(&config_path)?;
            let html = render_transcript(&config, &file).await?;
            println!("{html}");
            Ok(())
        }
        Commands::Copy { file, block } => {
            let config = Config::load_from_path(&config_path)?;
            let report = copy_block(&config, file.as_deref(), block).await?;
            println!("{report}");
            Ok(())
        }
        Commands::Languages => {
            list_languages();
            Ok(())
        }
        Commands::Css { light } => {
            let css = stylesheet(!light).ok_or("No highlighting theme available")?;
            print!("{css}");
            Ok(())
        }
        Commands::Config { action } => run_config(action, &config_path),
    }
}

fn run_config(action: ConfigCommand, config_path: &std::path::Path) -> Result<(), Box<dyn Error>> {
    let registry = SettingRegistry::new();
    match action {
        ConfigCommand::Path => {
            println!("{}", path_display(config_path));
            Ok(())
        }
        ConfigCommand::Show => {
            let config = Config::load_from_path(config_path)?;
            println!("Current configuration ({}):", path_display(config_path));
            for line in registry.format_all(&config) {
                println!("{line}");
            }
            Ok(())
        }
        ConfigCommand::Set { key, value } => {
            let mut config = Config::load_from_path(config_path)?;
            match registry.set(&key, &value.join(" "), &mut config) {
                Ok(message) => {
                    config.save_to_path(config_path)?;
                    println!("{message}");
                    Ok(())
                }
                Err(err) => {
                    err.print();
                    std::process::exit(1);
                }
            }
        }
        ConfigCommand::Unset { key } => {
            let mut config = Config::load_from_path(config_path)?;
            match registry.unset(&key, &mut config) {
                Ok(message) => {
                    config.save_to_path(config_path)?;
                    println!("{message}");
                    Ok(())
                }
                Err(err) => {
                    err.print();
                    std::process::exit(1);
                }
            }
        }
    }
}
