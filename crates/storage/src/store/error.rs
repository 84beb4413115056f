#![forbid(unsafe_code)]

use tf_core::RecordId;

#[derive(Debug)]
pub enum StoreError {
    Io(std::io::Error),
    Sql(rusqlite::Error),
    InvalidInput(&'static str),
    RecordAlreadyExists,
    GameAlreadyExists,
    SettingAlreadyExists,
    UnknownGame,
    UnknownRecord,
    UnknownSetting,
    HeadMismatch {
        expected: RecordId,
        actual: Option<RecordId>,
    },
}

impl StoreError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::Io(_) => "IO",
            Self::Sql(_) => "SQL",
            Self::InvalidInput(message) => {
                if message.starts_with("RESET_REQUIRED") {
                    "RESET_REQUIRED"
                } else {
                    "INVALID_INPUT"
                }
            }
            Self::RecordAlreadyExists | Self::GameAlreadyExists | Self::SettingAlreadyExists => {
                "ALREADY_EXISTS"
            }
            Self::UnknownGame | Self::UnknownRecord | Self::UnknownSetting => "NOT_FOUND",
            Self::HeadMismatch { .. } => "HEAD_MISMATCH",
        }
    }
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(err) => write!(f, "io: {err}"),
            Self::Sql(err) => write!(f, "sqlite: {err}"),
            Self::InvalidInput(message) => write!(f, "invalid input: {message}"),
            Self::RecordAlreadyExists => write!(f, "record already exists"),
            Self::GameAlreadyExists => write!(f, "game already exists"),
            Self::SettingAlreadyExists => write!(f, "setting already exists"),
            Self::UnknownGame => write!(f, "unknown game"),
            Self::UnknownRecord => write!(f, "unknown record"),
            Self::UnknownSetting => write!(f, "unknown setting"),
            Self::HeadMismatch { expected, actual } => match actual {
                Some(actual) => {
                    write!(f, "head mismatch (expected={expected}, actual={actual})")
                }
                None => write!(f, "head mismatch (expected={expected}, branch is empty)"),
            },
        }
    }
}

impl std::error::Error for StoreError {}

impl From<std::io::Error> for StoreError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sql(value)
    }
}
