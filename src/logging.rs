use std::fs::File;
use std::path::Path;

use simplelog::{
    ColorChoice, CombinedLogger, Config, LevelFilter, TermLogger, TerminalMode, WriteLogger,
};

/// Logs to the terminal and to `log_file`.
pub fn init(level: LevelFilter, log_file: &Path) -> std::io::Result<()> {
    CombinedLogger::init(vec![
        TermLogger::new(level, Config::default(), TerminalMode::Mixed, ColorChoice::Auto),
        WriteLogger::new(level, Config::default(), File::create(log_file)?),
    ])
    .map_err(std::io::Error::other)
}
