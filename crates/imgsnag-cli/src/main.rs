use imgsnag_core::logging;

mod cli;

use crate::cli::CliCommand;

#[tokio::main]
async fn main() {
    // Log file if possible, stderr otherwise.
    logging::init();

    if let Err(err) = CliCommand::run_from_args().await {
        eprintln!("imgsnag error: {:#}", err);
        std::process::exit(1);
    }
}
