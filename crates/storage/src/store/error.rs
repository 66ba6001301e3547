use rusqlite::ErrorCode;

#[derive(Debug)]
pub enum StoreError {
    Io(std::io::Error),
    Sql(rusqlite::Error),
    InvalidInput(&'static str),
    UnknownUser,
    UnknownProject,
    UnknownCategory,
    UnknownFeature,
    DuplicateShortName,
    DuplicateName,
    DuplicateEmail,
    OwnerNotEligible,
    OwnerCannotBeGranted,
    UserOwnsProjects,
}

impl StoreError {
    /// True for transient busy/locked failures the caller may retry once.
    pub fn is_busy(&self) -> bool {
        match self {
            Self::Sql(rusqlite::Error::SqliteFailure(code, _)) => matches!(
                code.code,
                ErrorCode::DatabaseBusy | ErrorCode::DatabaseLocked
            ),
            _ => false,
        }
    }
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(err) => write!(f, "io: {err}"),
            Self::Sql(err) => write!(f, "sqlite: {err}"),
            Self::InvalidInput(message) => write!(f, "invalid input: {message}"),
            Self::UnknownUser => write!(f, "unknown user"),
            Self::UnknownProject => write!(f, "unknown project"),
            Self::UnknownCategory => write!(f, "unknown category"),
            Self::UnknownFeature => write!(f, "unknown feature"),
            Self::DuplicateShortName => write!(f, "short name already in use"),
            Self::DuplicateName => write!(f, "name already in use"),
            Self::DuplicateEmail => write!(f, "email already registered"),
            Self::OwnerNotEligible => write!(f, "owner role cannot hold projects"),
            Self::OwnerCannotBeGranted => write!(f, "project owner cannot receive a grant"),
            Self::UserOwnsProjects => write!(f, "user still owns projects"),
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
