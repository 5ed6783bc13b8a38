use crate::dispatcher::{Dispatcher, DispatcherConfig};
use crate::echo::echo_handler;
use crate::logging::{init_logging_with_config, LogConfig};
use crate::manifest::Manifest;
use crate::runtime_config::RuntimeConfig;
use crate::server::{render, BodyParser, BufferedBody, Headers};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Command-line interface for reqrouter
///
/// Inspects and exercises controller manifests without a transport.
#[derive(Parser, Debug)]
#[command(name = "reqrouter")]
#[command(about = "Request dispatch and parameter binding", long_about = None)]
pub struct Cli {
    /// Emit logs (format and level from REQROUTER_LOG_* variables)
    #[arg(short, long, global = true, default_value_t = false)]
    pub verbose: bool,

    /// The subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the compiled route table of a manifest
    Routes {
        /// Path to the controller manifest (YAML)
        #[arg(short, long)]
        manifest: PathBuf,
    },
    /// Dispatch one request against a manifest and print the response
    ///
    /// Every handler echoes its bound arguments.
    Dispatch {
        /// Path to the controller manifest (YAML)
        #[arg(short, long)]
        manifest: PathBuf,

        /// Request method
        #[arg(short = 'X', long, default_value = "GET")]
        method: String,

        /// Request target: path plus optional query string
        #[arg(short, long)]
        target: String,

        /// Request header as `name:value`, repeatable
        #[arg(short = 'H', long = "header")]
        headers: Vec<String>,

        /// Request body
        #[arg(short, long)]
        body: Option<String>,

        /// Hide internal error messages (also REQROUTER_ENV=production)
        #[arg(long, default_value_t = false)]
        production: bool,
    },
}

/// Split `name:value` header arguments
///
/// # Errors
///
/// Fails on arguments without a `:` or with an empty name.
pub fn parse_header_args(args: &[String]) -> Result<Headers> {
    let mut headers = Headers::new();
    for arg in args {
        let (name, value) = arg
            .split_once(':')
            .with_context(|| format!("Invalid header '{arg}', expected name:value"))?;
        let name = name.trim();
        anyhow::ensure!(!name.is_empty(), "Invalid header '{arg}', empty name");
        headers.append(name, value.trim());
    }
    Ok(headers)
}

fn load_dispatcher(manifest: &Path, config: DispatcherConfig) -> Result<Dispatcher> {
    let dispatcher = Dispatcher::with_config(config);
    for descriptor in Manifest::load(manifest)?.into_descriptors(echo_handler)? {
        dispatcher.attach_controller(descriptor)?;
    }
    Ok(dispatcher)
}

/// Execute a parsed command, writing its output to `out`
///
/// # Errors
///
/// Fails if the manifest cannot be loaded, arguments are invalid or
/// output cannot be written.
pub async fn execute(cli: &Cli, out: &mut impl Write) -> Result<()> {
    let runtime = RuntimeConfig::from_env();
    match &cli.command {
        Commands::Routes { manifest } => {
            let dispatcher = load_dispatcher(manifest, runtime.dispatcher_config())?;
            let table = dispatcher.table();
            for (path, entries) in table.table.iter() {
                for entry in entries {
                    writeln!(
                        out,
                        "{:<12} {:<32} {}.{}{}",
                        entry.methods_label(),
                        path,
                        entry.controller_name,
                        entry.handler_name,
                        if entry.body_required { " [body]" } else { "" }
                    )?;
                }
            }
            writeln!(out, "{} route(s)", table.table.len())?;
        }
        Commands::Dispatch {
            manifest,
            method,
            target,
            headers,
            body,
            production,
        } => {
            let mut config = runtime.dispatcher_config();
            config.production |= *production;
            let dispatcher = load_dispatcher(manifest, config)?;
            let headers = parse_header_args(headers)?;
            let parser: &dyn BodyParser = &BufferedBody::new(body.clone().unwrap_or_default());
            let entity = dispatcher
                .handle_request(method, target, Some(parser), headers)
                .await;
            let rendered = render(&entity);

            writeln!(out, "HTTP/1.1 {} {}", rendered.status, rendered.reason)?;
            for (name, value) in &rendered.headers {
                writeln!(out, "{name}: {value}")?;
            }
            writeln!(out)?;
            if !rendered.body.is_empty() {
                out.write_all(&rendered.body)?;
                writeln!(out)?;
            }
        }
    }
    Ok(())
}

/// Parse process arguments and run the selected command against stdout
///
/// # Errors
///
/// See [`execute`].
pub async fn run_cli() -> Result<()> {
    let cli = Cli::parse();
    let _guard = if cli.verbose {
        init_logging_with_config(&LogConfig::from_env())?
    } else {
        None
    };
    let mut buffer = Vec::new();
    execute(&cli, &mut buffer).await?;
    std::io::stdout()
        .write_all(&buffer)
        .context("Failed to write output")
}
