use directories::ProjectDirs;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use super::formatter::BracketedFormatter;
use crate::config::AppConfig;

/// Errors that may occur while preparing the log file.
#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    #[error("No suitable data directory available for logs")]
    NoDataDir,
    #[error("Failed to prepare log directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to create log file at {path}: {source}")]
    CreateLogFile {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Install the global subscriber: bracketed lines on stderr, plus a
/// timestamped log file unless `log_to_file` is false.
///
/// `RUST_LOG` overrides `default_level`. Returns the log file path when one
/// was created. A file that cannot be created only disables file logging.
pub fn setup_logging(default_level: &str, log_to_file: bool) -> Option<PathBuf> {
    let config = AppConfig::default();
    let log_file = if log_to_file {
        Some(open_log_file(&config))
    } else {
        None
    };

    let (file_layer, log_path, file_error) = match log_file {
        Some(Ok((path, file))) => {
            let layer = fmt::layer()
                .event_format(BracketedFormatter)
                .with_writer(std::sync::Mutex::new(file))
                .with_ansi(false);
            (Some(layer), Some(path), None)
        }
        Some(Err(e)) => (None, None, Some(e)),
        None => (None, None, None),
    };

    let stderr_layer = fmt::layer()
        .event_format(BracketedFormatter)
        .with_writer(std::io::stderr);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    // A subscriber may already be installed (tests); keep the existing one.
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(stderr_layer)
        .try_init();

    if let Some(e) = file_error {
        warn!("File logging disabled: {}", e);
    }
    if let Some(path) = &log_path {
        info!("Log file created at: {:?}", path);
        prune_old_logs(path.parent().unwrap_or(Path::new(".")), &config);
    }

    log_path
}

fn log_directory() -> Result<PathBuf, LoggingError> {
    ProjectDirs::from("", "", "yolo-dataset-tools")
        .map(|dirs| dirs.data_local_dir().join("logs"))
        .ok_or(LoggingError::NoDataDir)
}

fn open_log_file(config: &AppConfig) -> Result<(PathBuf, File), LoggingError> {
    let log_dir = log_directory()?;
    fs::create_dir_all(&log_dir).map_err(|source| LoggingError::CreateDir {
        path: log_dir.clone(),
        source,
    })?;

    let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
    let log_path = log_dir.join(format!("{}_{}.log", config.log_file_prefix, timestamp));

    let file = fs::OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(&log_path)
        .map_err(|source| LoggingError::CreateLogFile {
            path: log_path.clone(),
            source,
        })?;

    Ok((log_path, file))
}

/// Keep only the newest `max_log_files` logs. Names sort by timestamp.
fn prune_old_logs(log_dir: &Path, config: &AppConfig) {
    let Ok(entries) = fs::read_dir(log_dir) else {
        return;
    };
    let mut logs: Vec<PathBuf> = entries
        .flatten()
        .map(|e| e.path())
        .filter(|p| is_own_log(p, config.log_file_prefix))
        .collect();
    logs.sort();

    let excess = logs.len().saturating_sub(config.max_log_files);
    for old in logs.into_iter().take(excess) {
        if let Err(e) = fs::remove_file(&old) {
            warn!("Failed to remove old log file {:?}: {}", old, e);
        }
    }
}

fn is_own_log(path: &Path, prefix: &str) -> bool {
    path.extension().is_some_and(|ext| ext == "log")
        && path
            .file_name()
            .is_some_and(|name| name.to_string_lossy().starts_with(prefix))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prune_old_logs_keeps_newest() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig {
            max_log_files: 2,
            ..AppConfig::default()
        };
        for stamp in ["20240101_000000", "20240102_000000", "20240103_000000"] {
            let name = format!("{}_{}.log", config.log_file_prefix, stamp);
            fs::write(dir.path().join(name), "").unwrap();
        }
        fs::write(dir.path().join("other.log"), "").unwrap();

        prune_old_logs(dir.path(), &config);

        let mut left: Vec<String> = fs::read_dir(dir.path())
            .unwrap()
            .flatten()
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .collect();
        left.sort();
        assert_eq!(
            left,
            vec![
                "other.log".to_string(),
                format!("{}_20240102_000000.log", config.log_file_prefix),
                format!("{}_20240103_000000.log", config.log_file_prefix),
            ]
        );
    }
}
