mod commands;
mod terminal;

use commands::{CommandLine, Commands, expand, ports, scan};
use rigscan_common::config::Config;
use terminal::{logging, print};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let commands = CommandLine::parse_args();

    let cfg = Config {
        no_banner: commands.no_banner,
        quiet: if commands.json { 2 } else { commands.quiet },
        json: commands.json,
        disable_input: commands.disable_input,
    };

    logging::init_logging(commands.verbose, cfg.json)?;
    print::banner(cfg.no_banner || cfg.json, cfg.quiet);

    match commands.command {
        Commands::Scan(args) => {
            print::header("starting scanner", cfg.quiet);
            scan::scan(args, &cfg).await
        }
        Commands::Expand { target } => expand::expand(&target, &cfg),
        Commands::Ports => ports::ports(&cfg),
    }
}
