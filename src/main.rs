use clap::Parser;
use vladeval::Opts;
use vladeval::cli::SubCommandExtend;
use vladeval::config::SubCommand;

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let opts = Opts::parse();
    match &opts.subcmd {
        SubCommand::Report(config) => config.run(&opts),
        SubCommand::Search(config) => config.run(&opts),
        SubCommand::Show(config) => config.run(&opts),
    }
}
