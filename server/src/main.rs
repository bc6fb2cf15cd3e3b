//! studystream-server: the StudyStream HTTP API.
//!
//! Usage:
//!   studystream-server --port 3001 --db studystream.db
//!   JWT_SECRET=... STUDYSTREAM_ENV=production studystream-server

use clap::Parser;
use studystream_server::config::ServerConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = ServerConfig::parse();
    studystream_server::run(config).await
}
