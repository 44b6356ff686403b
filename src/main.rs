mod app;
mod commands;
mod config;
mod logging;
mod recording;
mod transcription;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    app::run().await
}
