//! Logger installation for the `sysinit` binary
//!
//! Console-only logging goes through `env_logger` so `RUST_LOG` works as
//! usual. With a log file, a `fern` dispatch writes timestamped lines to
//! both stderr and the file.

use std::path::Path;

use log::LevelFilter;

#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    #[error("Failed to open log file {}: {source}", .path.display())]
    Io {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Logger already installed: {0}")]
    SetLogger(#[from] log::SetLoggerError),
}

pub fn init(verbose: bool, log_file: Option<&Path>) -> Result<(), LoggingError> {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    let Some(path) = log_file else {
        env_logger::Builder::from_env(
            env_logger::Env::default().default_filter_or(level.as_str()),
        )
        .try_init()?;
        return Ok(());
    };

    let io_err = |source: std::io::Error| LoggingError::Io {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(io_err)?;
    }
    let file = fern::log_file(path).map_err(io_err)?;

    fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "{} [{}] {}",
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
                record.level(),
                message
            ))
        })
        .level(level)
        .chain(std::io::stderr())
        .chain(file)
        .apply()?;

    Ok(())
}
