use thiserror::Error;

/// Errors raised while building the bell schedule or loading a timetable.
#[derive(Error, Debug)]
pub enum ScheduleError {
    #[error("Invalid period table: {0}")]
    InvalidTable(String),

    #[error("Invalid time '{0}', expected HH:MM")]
    InvalidTime(String),

    #[error("Unknown timezone: {0}")]
    UnknownTimezone(String),

    #[error("Failed to read timetable: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse timetable: {0}")]
    Parse(#[from] serde_json::Error),
}
