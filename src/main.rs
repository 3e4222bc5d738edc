mod cli;
mod command;
mod config;
mod logging;
mod process;
mod template;
mod workflow;

use anyhow::{Context as _, Result, bail};
use clap::Parser;
use cli::{Context, OutputMode, create_handler};
use command::{Registry, Runtime};
use config::ToolConfig;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "sbom-tool", version)]
#[command(about = "Mutate and inspect SBOM documents from the command line or YAML workflows")]
struct Cli {
    /// Show extra output and debug logging
    #[arg(long, conflicts_with = "silent")]
    verbose: bool,

    /// Only report errors
    #[arg(long)]
    silent: bool,

    /// Emit output as JSON lines
    #[arg(long)]
    json: bool,

    /// Append a transcript of all output to a file
    #[arg(long, value_name = "FILE")]
    log: Option<PathBuf>,

    /// Extra configuration file, applied after user and project config
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Command to run (omit to list commands)
    command: Option<String>,

    /// Command arguments
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    args: Vec<String>,
}

impl Cli {
    /// Pick up global flags given after the command
    ///
    /// Everything after a `--` separator is passed through untouched, with
    /// the separator itself dropped.
    fn hoist_global_flags(&mut self) -> Result<()> {
        let mut args = Vec::with_capacity(self.args.len());
        let mut rest = std::mem::take(&mut self.args).into_iter();
        while let Some(arg) = rest.next() {
            match arg.as_str() {
                "--verbose" => self.verbose = true,
                "--silent" => self.silent = true,
                "--json" => self.json = true,
                "--" => args.extend(rest.by_ref()),
                _ => args.push(arg),
            }
        }
        self.args = args;

        if self.verbose && self.silent {
            bail!("'--verbose' cannot be used with '--silent'");
        }
        Ok(())
    }

    fn output_mode(&self) -> OutputMode {
        if self.json {
            OutputMode::Json
        } else if self.silent {
            OutputMode::Quiet
        } else {
            OutputMode::Console
        }
    }
}

fn list_commands(ctx: &Context, registry: &Registry) {
    let width = registry.entries().map(|e| e.usage.len()).max().unwrap_or(0);

    ctx.write_line("Usage: sbom-tool [options] <command> [arguments]");
    ctx.write_line("");
    ctx.write_line("Commands:");
    for entry in registry.entries() {
        ctx.write_line(format!(
            "  {:width$}  {}",
            entry.usage,
            entry.summary,
            width = width
        ));
    }
}

async fn run(cli: Cli) -> Result<ExitCode> {
    let project_dir = std::env::current_dir().ok();
    let config = ToolConfig::load(project_dir.as_deref(), cli.config.as_deref())?;

    let mut ctx = Context::new(create_handler(cli.output_mode()), cli.verbose);
    if let Some(ref path) = cli.log {
        ctx = ctx
            .with_log_file(path)
            .with_context(|| format!("failed to open log file {}", path.display()))?;
    }

    let client = workflow::loader::http_client(&config.http)?;
    let registry = Registry::builtin();
    let rt = Runtime::new(&ctx, &registry, &config).with_http_client(&client);

    let Some(name) = cli.command else {
        list_commands(&ctx, &registry);
        return Ok(ExitCode::SUCCESS);
    };

    let result = match registry.lookup(&name) {
        Ok(entry) => entry.command.run_cli(&rt, &cli.args).await,
        Err(e) => Err(e),
    };
    if let Err(e) = result {
        tracing::debug!(command = %name, class = ?e.class(), "Command failed");
        ctx.write_error(e.to_string());
    }

    Ok(if ctx.error_count() > 0 {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}

#[tokio::main]
async fn main() -> ExitCode {
    let mut cli = Cli::parse();
    if let Err(e) = cli.hoist_global_flags() {
        eprintln!("Error: {:#}", e);
        return ExitCode::FAILURE;
    }

    if let Err(e) = logging::init_logging(cli.verbose, cli.silent, cli.json) {
        eprintln!("Error: {:#}", e);
        return ExitCode::FAILURE;
    }

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
