//! File logging for the command-line tool, rotated daily.

use anyhow::{anyhow, Result};
use std::fs;
use std::path::Path;
use std::time::{Duration, SystemTime};
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use time::UtcOffset;
use tracing::Level;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::fmt::time::OffsetTime;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

/// Prefix of every log file written by [`init`].
pub const LOG_FILE_PREFIX: &str = "sectioncfg";

/// Log files older than this are removed by [`init`].
pub const LOG_RETENTION: Duration = Duration::from_secs(2 * 24 * 60 * 60);

type LocalTimer = OffsetTime<&'static [BorrowedFormatItem<'static>]>;

/// Install a global subscriber writing `level` and above into `log_path`.
///
/// `RUST_LOG` directives are honoured on top of `level`.
pub fn init(log_path: &Path, level: Level) -> Result<()> {
    fs::create_dir_all(log_path)?;
    let removed = cleanup_old_logs(log_path, LOG_RETENTION)?;

    let writer = RollingFileAppender::new(Rotation::DAILY, log_path, LOG_FILE_PREFIX);
    let layer = fmt::layer()
        .with_writer(writer)
        .with_ansi(false)
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .with_timer(local_timer());

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(level.into()))
        .with(layer)
        .try_init()
        .map_err(|e| anyhow!("Failed to install log subscriber: {}", e))?;

    tracing::debug!("Logging to {} ({} old files removed)", log_path.display(), removed);
    Ok(())
}

/// Timestamps in the local offset, UTC when it cannot be determined.
fn local_timer() -> LocalTimer {
    let offset = UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC);
    OffsetTime::new(
        offset,
        format_description!("[year]-[month]-[day] [hour]:[minute]:[second]"),
    )
}

/// Delete `sectioncfg*` files in `log_path` last modified more than
/// `max_age` ago. Returns how many were removed.
pub fn cleanup_old_logs(log_path: &Path, max_age: Duration) -> Result<usize> {
    let Some(cutoff) = SystemTime::now().checked_sub(max_age) else {
        return Ok(0);
    };
    let entries = match fs::read_dir(log_path) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(0),
        Err(e) => return Err(e.into()),
    };

    let mut removed = 0;
    for entry in entries {
        let entry = entry?;
        let is_ours = entry
            .file_name()
            .to_str()
            .is_some_and(|name| name.starts_with(LOG_FILE_PREFIX));
        if !is_ours {
            continue;
        }

        let metadata = entry.metadata()?;
        let expired = metadata.is_file()
            && metadata.modified().map(|m| m < cutoff).unwrap_or(false);
        if expired && fs::remove_file(entry.path()).is_ok() {
            removed += 1;
        }
    }

    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cleanup_missing_dir_is_ok() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(
            cleanup_old_logs(&dir.path().join("missing"), LOG_RETENTION).unwrap(),
            0
        );
    }

    #[test]
    fn test_cleanup_keeps_fresh_and_foreign_files() {
        let dir = tempfile::tempdir().unwrap();
        let fresh = dir.path().join("sectioncfg.2026-01-01");
        let foreign = dir.path().join("other.log");
        fs::write(&fresh, "x").unwrap();
        fs::write(&foreign, "x").unwrap();

        assert_eq!(cleanup_old_logs(dir.path(), LOG_RETENTION).unwrap(), 0);

        assert!(fresh.exists());
        assert!(foreign.exists());
    }

    #[test]
    fn test_cleanup_removes_expired_logs_only() {
        let dir = tempfile::tempdir().unwrap();
        let ours = dir.path().join("sectioncfg.2026-01-01");
        let foreign = dir.path().join("other.log");
        fs::write(&ours, "x").unwrap();
        fs::write(&foreign, "x").unwrap();
        std::thread::sleep(Duration::from_millis(20));

        assert_eq!(
            cleanup_old_logs(dir.path(), Duration::from_millis(1)).unwrap(),
            1
        );

        assert!(!ours.exists());
        assert!(foreign.exists());
    }
}
