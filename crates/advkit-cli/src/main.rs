mod cmd;
mod output;

use advkit_core::config::Config;
use advkit_core::AdvkitError;
use anyhow::Context;
use clap::{Parser, Subcommand};
use cmd::{
    audit::AuditArgs, backlog::BacklogArgs, cac::CacArgs, capa::CapaArgs,
    config::ConfigSubcommand, docs::DocsArgs, readability::ReadabilityArgs, rice::RiceArgs,
    risk::RiskArgs, rpn::RpnArgs, scaffold::ScaffoldSubcommand, sprint::SprintArgs,
    voice::VoiceArgs, Ctx, OutputFormat,
};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "advkit",
    about = "Deterministic advisory tools: prioritisation, risk, quality tracking and content checks",
    version,
    propagate_version = true
)]
struct Cli {
    /// Output format
    #[arg(long, short = 'o', global = true, value_enum, default_value_t = OutputFormat::Text)]
    output: OutputFormat,

    /// Write output to this file instead of stdout
    #[arg(long, short = 'f', global = true, value_name = "PATH")]
    file: Option<PathBuf>,

    /// Enable debug logging on stderr
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    /// Config file (default: .advkit.yaml in the working directory)
    #[arg(long, global = true, env = "ADVKIT_CONFIG", value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Rank features by RICE score, optionally filling an effort budget
    Rice(RiceArgs),

    /// Rank a backlog by WSJF or weighted score into now/next/later
    Backlog(BacklogArgs),

    /// FMEA risk priority numbers with Pareto analysis
    Rpn(RpnArgs),

    /// Score a risk register and build a 5x5 heat map
    Risk(RiskArgs),

    /// Customer acquisition cost, lifetime value and payback per channel
    Cac(CacArgs),

    /// CAPA aging, overdue and effectiveness report
    Capa(CapaArgs),

    /// Risk-based internal audit schedule
    Audit(AuditArgs),

    /// Document control review status
    Docs(DocsArgs),

    /// Readability metrics for plain text
    Readability(ReadabilityArgs),

    /// Brand voice profile and target alignment
    Voice(VoiceArgs),

    /// Sprint velocity statistics and delivery forecast
    Sprint(SprintArgs),

    /// Generate boilerplate from a JSON or YAML spec
    Scaffold {
        #[command(subcommand)]
        subcommand: ScaffoldSubcommand,
    },

    /// Show or validate the effective configuration
    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
    },
}

fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(default_level.into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(cli) {
        // Print the full error chain (anyhow's alternate Display)
        eprintln!("error: {e:#}");
        std::process::exit(exit_code(&e));
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let cwd = std::env::current_dir().context("failed to read working directory")?;
    let config = Config::load(cli.config.as_deref(), &cwd).context("failed to load config")?;
    let ctx = Ctx {
        format: cli.output.into(),
        file: cli.file,
        config,
    };

    match cli.command {
        Commands::Rice(args) => cmd::rice::run(&ctx, args),
        Commands::Backlog(args) => cmd::backlog::run(&ctx, args),
        Commands::Rpn(args) => cmd::rpn::run(&ctx, args),
        Commands::Risk(args) => cmd::risk::run(&ctx, args),
        Commands::Cac(args) => cmd::cac::run(&ctx, args),
        Commands::Capa(args) => cmd::capa::run(&ctx, args),
        Commands::Audit(args) => cmd::audit::run(&ctx, args),
        Commands::Docs(args) => cmd::docs::run(&ctx, args),
        Commands::Readability(args) => cmd::readability::run(&ctx, args),
        Commands::Voice(args) => cmd::voice::run(&ctx, args),
        Commands::Sprint(args) => cmd::sprint::run(&ctx, args),
        Commands::Scaffold { subcommand } => cmd::scaffold::run(&ctx, subcommand),
        Commands::Config { subcommand } => cmd::config::run(&ctx, subcommand),
    }
}

/// Exit code of the first `AdvkitError` in the chain, 1 otherwise.
fn exit_code(e: &anyhow::Error) -> i32 {
    e.chain()
        .find_map(|cause| cause.downcast_ref::<AdvkitError>())
        .map_or(1, AdvkitError::exit_code)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn exit_code_follows_context_chain() {
        let err = anyhow::Error::new(AdvkitError::EmptyInput).context("failed to load");
        assert_eq!(exit_code(&err), 3);
        let err = anyhow::anyhow!("plain failure");
        assert_eq!(exit_code(&err), 1);
    }
}
