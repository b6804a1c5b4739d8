mod cli;

use std::process::ExitCode;

use clap::Parser;
use tripplanner::TripPlannerError;

#[tokio::main]
async fn main() -> ExitCode {
    let args = cli::Cli::parse();

    match cli::run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            let typed = e
                .chain()
                .find_map(|cause| cause.downcast_ref::<TripPlannerError>());
            if let Some(err) = typed {
                if !matches!(err, TripPlannerError::Validation { .. }) {
                    eprintln!("{}", err.user_message());
                }
            }
            ExitCode::FAILURE
        }
    }
}
