use std::path::PathBuf;

use clap::Parser;
use simplelog::LevelFilter;

use crate::seed::SeedSource;

/// REST API over a single table of posts.
#[derive(Debug, Parser)]
#[command(name = "posts_server", version)]
pub struct Config {
    /// Address the HTTP server listens on
    #[arg(long, env = "POSTS_BIND", default_value = "127.0.0.1:8080")]
    pub bind: String,

    /// SQLite database file
    #[arg(long, env = "POSTS_DATABASE", default_value = "app.db")]
    pub database: PathBuf,

    /// JSON array of posts used to fill an empty database; the bundled data otherwise
    #[arg(long, env = "POSTS_SEED_FILE")]
    pub seed_file: Option<PathBuf>,

    #[arg(long, env = "POSTS_LOG_FILE", default_value = "app.log")]
    pub log_file: PathBuf,

    #[arg(long, env = "POSTS_LOG_LEVEL", default_value = "info")]
    pub log_level: LevelFilter,
}

impl Config {
    pub fn seed_source(&self) -> SeedSource {
        match &self.seed_file {
            Some(path) => SeedSource::File(path.clone()),
            None => SeedSource::Bundled,
        }
    }
}
