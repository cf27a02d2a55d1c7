use std::io;

use clap::{CommandFactory, FromArgMatches};
use clap_complete::generate;

use bindcheck::client::commands::cluster::command_cluster_list;
use bindcheck::client::commands::execute::command_execute;
use bindcheck::client::commands::init::command_init;
use bindcheck::client::commands::summary::command_summary;
use bindcheck::client::globalsettings::GlobalSettings;
use bindcheck::client::output::cli::CliOutput;
use bindcheck::client::output::json::JsonOutput;
use bindcheck::client::output::outputs::{Output, Outputs};
use bindcheck::common::cli::{CommonOpts, GenerateCompletionOpts, RootOptions, SubCommand};
use bindcheck::common::setup::setup_logging;

fn make_global_settings(opts: CommonOpts) -> GlobalSettings {
    let printer: Box<dyn Output> = match opts.output_mode {
        Outputs::CLI => Box::new(CliOutput::new(opts.colors.use_colors())),
        Outputs::JSON => Box::<JsonOutput>::default(),
    };
    GlobalSettings::new(opts.clusters, printer)
}

fn generate_completion(opts: GenerateCompletionOpts) -> anyhow::Result<()> {
    let mut app = RootOptions::command();
    eprintln!("Generating completion file for {}...", opts.shell);
    generate(opts.shell, &mut app, "bindcheck", &mut io::stdout());
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> bindcheck::Result<()> {
    let matches = RootOptions::command().get_matches();
    let top_opts = match RootOptions::from_arg_matches(&matches) {
        Ok(opts) => opts,
        Err(error) => error.exit(),
    };

    setup_logging(top_opts.common.debug);
    let gsettings = make_global_settings(top_opts.common);

    let result = match top_opts.subcmd {
        SubCommand::Init(opts) => command_init(&gsettings, opts),
        SubCommand::Execute(opts) => command_execute(&gsettings, opts).await,
        SubCommand::Summary(opts) => command_summary(&gsettings, opts),
        SubCommand::Cluster => command_cluster_list(&gsettings),
        SubCommand::GenerateCompletion(opts) => generate_completion(opts),
    };

    if let Err(e) = result {
        gsettings.printer().print_error(e);
        std::process::exit(1);
    }

    Ok(())
}
