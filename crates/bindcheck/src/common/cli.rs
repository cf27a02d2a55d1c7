use std::io::IsTerminal;
use std::path::PathBuf;

use clap::Parser;
use clap_complete::Shell;

use crate::client::commands::execute::ExecuteOpts;
use crate::client::commands::init::InitOpts;
use crate::client::commands::summary::SummaryOpts;
use crate::client::output::outputs::Outputs;
use crate::common::env::{BINDCHECK_CLUSTERS, BINDCHECK_DEBUG};

#[derive(clap::ValueEnum, Clone)]
pub enum ColorPolicy {
    /// Use colors if the stdout is detected to be a terminal.
    Auto,
    /// Always use colors.
    Always,
    /// Never use colors.
    Never,
}

impl ColorPolicy {
    /// Whether terminal output should be colored.
    pub fn use_colors(&self) -> bool {
        match self {
            ColorPolicy::Auto => std::io::stdout().is_terminal(),
            ColorPolicy::Always => true,
            ColorPolicy::Never => false,
        }
    }
}

// Common CLI options
#[derive(Parser)]
pub struct CommonOpts {
    /// File with additional cluster definitions
    #[arg(
        long,
        value_hint = clap::ValueHint::FilePath,
        global = true,
        env = BINDCHECK_CLUSTERS,
        help_heading("GLOBAL OPTIONS"),
        hide_short_help(true)
    )]
    pub clusters: Option<PathBuf>,

    /// Sets console color policy
    #[arg(
        long,
        default_value_t = ColorPolicy::Auto,
        value_enum,
        global = true,
        help_heading("GLOBAL OPTIONS"),
        hide_short_help(true)
    )]
    pub colors: ColorPolicy,

    /// Sets output formatting
    #[arg(
        long,
        env = "BINDCHECK_OUTPUT_MODE",
        default_value_t = Outputs::CLI,
        value_enum,
        global = true,
        help_heading("GLOBAL OPTIONS"),
        hide_short_help(true)
    )]
    pub output_mode: Outputs,

    /// Enables more detailed log output
    #[arg(
        long,
        env = BINDCHECK_DEBUG,
        global = true,
        help_heading("GLOBAL OPTIONS"),
        hide_short_help(true)
    )]
    pub debug: bool,
}

// Root CLI options
#[derive(Parser)]
#[command(
    author,
    about,
    version(crate::BINDCHECK_VERSION),
    disable_help_subcommand(true),
    help_expected(true)
)]
pub struct RootOptions {
    #[clap(flatten)]
    pub common: CommonOpts,

    #[clap(subcommand)]
    pub subcmd: SubCommand,
}

#[derive(Parser)]
pub enum SubCommand {
    /// Generate the workflow definition for the current cluster
    Init(InitOpts),
    /// Validate the binding of a running job (invoked by the workflow manager)
    Execute(ExecuteOpts),
    /// Summarize the written reports
    Summary(SummaryOpts),
    /// List known clusters
    Cluster,
    /// Generate shell completion script
    GenerateCompletion(GenerateCompletionOpts),
}

#[derive(Parser)]
pub struct GenerateCompletionOpts {
    /// Shell flavour for which the completion script should be generated
    #[arg(value_enum)]
    pub shell: Shell,
}
