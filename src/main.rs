use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    match juice_backend::run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("juice-backend: {}", e);
            ExitCode::FAILURE
        }
    }
}
