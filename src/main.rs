//! # Command Line Interface
//!
//! Subcommands are in the `commands` module.

use env_logger;
#[cfg(windows)]
use colored;
use mbkit::commands;
use mbkit::commands::CommandError;

fn main() -> Result<(),Box<dyn std::error::Error>>
{
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    #[cfg(windows)]
    let _ = colored::control::set_virtual_terminal(true);

    let main_cmd = mbkit::cli::build_cli();
    let matches = main_cmd.clone().get_matches();

    if let Some(cmd) = matches.subcommand_matches("verify") {
        return commands::langx::verify(cmd);
    }
    if let Some(cmd) = matches.subcommand_matches("completions") {
        return commands::completions::generate(main_cmd,cmd);
    }

    log::error!("No subcommand was found, try `mbkit --help`");
    return Err(Box::new(CommandError::InvalidCommand));
}
