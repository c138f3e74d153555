use std::process::ExitCode;
use validation_runner::{cli, infra::logging};

#[tokio::main]
async fn main() -> ExitCode {
    logging::init();

    match cli::run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
