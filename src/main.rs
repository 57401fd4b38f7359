mod cli;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Local .env is optional, real environment variables win
    dotenvy::dotenv().ok();
    env_logger::init();

    cli::run().await?;
    Ok(())
}
