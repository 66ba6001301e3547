#![forbid(unsafe_code)]

pub mod names {
    /// Lowercased, trimmed form used by the uniqueness constraints.
    pub fn canonical(value: &str) -> String {
        value.trim().to_lowercase()
    }

    #[derive(Clone, Debug, PartialEq, Eq, Hash)]
    pub struct ShortName(String);

    impl ShortName {
        pub fn as_str(&self) -> &str {
            &self.0
        }

        pub fn canonical(&self) -> String {
            canonical(&self.0)
        }

        pub fn try_new(value: impl Into<String>) -> Result<Self, ShortNameError> {
            let value = value.into();
            let trimmed = value.trim();
            if trimmed.is_empty() {
                return Err(ShortNameError::Empty);
            }
            if trimmed.len() > 64 {
                return Err(ShortNameError::TooLong);
            }
            Ok(Self(trimmed.to_string()))
        }
    }

    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub enum ShortNameError {
        Empty,
        TooLong,
    }

    impl std::fmt::Display for ShortNameError {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            match self {
                Self::Empty => write!(f, "short name must not be empty"),
                Self::TooLong => write!(f, "short name must be at most 64 characters"),
            }
        }
    }

    impl std::error::Error for ShortNameError {}

    #[derive(Clone, Debug, PartialEq, Eq, Hash)]
    pub struct EmailAddress(String);

    impl EmailAddress {
        pub fn as_str(&self) -> &str {
            &self.0
        }

        pub fn canonical(&self) -> String {
            canonical(&self.0)
        }

        pub fn try_new(value: impl Into<String>) -> Result<Self, EmailError> {
            let value = value.into();
            let trimmed = value.trim();
            if trimmed.is_empty() {
                return Err(EmailError::Empty);
            }
            if trimmed.len() > 254 {
                return Err(EmailError::TooLong);
            }
            let Some(at) = trimmed.find('@') else {
                return Err(EmailError::MissingAtSign);
            };
            if at == 0 || at == trimmed.len() - 1 {
                return Err(EmailError::MissingAtSign);
            }
            Ok(Self(trimmed.to_string()))
        }
    }

    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub enum EmailError {
        Empty,
        TooLong,
        MissingAtSign,
    }

    impl std::fmt::Display for EmailError {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            match self {
                Self::Empty => write!(f, "email must not be empty"),
                Self::TooLong => write!(f, "email must be at most 254 characters"),
                Self::MissingAtSign => write!(f, "email must contain a user and a host part"),
            }
        }
    }

    impl std::error::Error for EmailError {}
}

pub mod model {
    #[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
    pub enum Role {
        Admin,
        ProductOwner,
        Guest,
    }

    impl Role {
        pub fn id(self) -> i64 {
            match self {
                Role::Admin => 1,
                Role::ProductOwner => 2,
                Role::Guest => 3,
            }
        }

        pub fn from_id(value: i64) -> Option<Self> {
            match value {
                1 => Some(Role::Admin),
                2 => Some(Role::ProductOwner),
                3 => Some(Role::Guest),
                _ => None,
            }
        }

        pub fn as_str(self) -> &'static str {
            match self {
                Role::Admin => "admin",
                Role::ProductOwner => "product_owner",
                Role::Guest => "guest",
            }
        }

        pub fn parse(value: &str) -> Option<Self> {
            match value {
                "admin" => Some(Role::Admin),
                "product_owner" => Some(Role::ProductOwner),
                "guest" => Some(Role::Guest),
                _ => None,
            }
        }

        pub fn is_admin(self) -> bool {
            matches!(self, Role::Admin)
        }

        pub fn can_own_projects(self) -> bool {
            matches!(self, Role::Admin | Role::ProductOwner)
        }
    }

    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub enum ProjectStatus {
        Planned,
        Active,
        Paused,
        Completed,
        Cancelled,
    }

    impl ProjectStatus {
        pub fn as_str(self) -> &'static str {
            match self {
                Self::Planned => "planned",
                Self::Active => "active",
                Self::Paused => "paused",
                Self::Completed => "completed",
                Self::Cancelled => "cancelled",
            }
        }

        pub fn parse(value: &str) -> Option<Self> {
            match value {
                "planned" => Some(Self::Planned),
                "active" => Some(Self::Active),
                "paused" => Some(Self::Paused),
                "completed" => Some(Self::Completed),
                "cancelled" => Some(Self::Cancelled),
                _ => None,
            }
        }
    }

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub enum FeatureStatus {
        NotStarted,
        InProgress,
        Blocked,
        Done,
    }

    impl FeatureStatus {
        pub const ALL: [FeatureStatus; 4] = [
            FeatureStatus::NotStarted,
            FeatureStatus::InProgress,
            FeatureStatus::Blocked,
            FeatureStatus::Done,
        ];

        pub fn as_str(self) -> &'static str {
            match self {
                Self::NotStarted => "not_started",
                Self::InProgress => "in_progress",
                Self::Blocked => "blocked",
                Self::Done => "done",
            }
        }

        pub fn parse(value: &str) -> Option<Self> {
            match value {
                "not_started" => Some(Self::NotStarted),
                "in_progress" => Some(Self::InProgress),
                "blocked" => Some(Self::Blocked),
                "done" => Some(Self::Done),
                _ => None,
            }
        }
    }

    #[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
    pub struct PercentDone(u8);

    impl PercentDone {
        pub const ZERO: PercentDone = PercentDone(0);
        pub const COMPLETE: PercentDone = PercentDone(100);

        pub fn value(self) -> u8 {
            self.0
        }

        pub fn try_new(value: i64) -> Result<Self, PercentError> {
            if !(0..=100).contains(&value) {
                return Err(PercentError::OutOfRange(value));
            }
            Ok(Self(value as u8))
        }
    }

    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub enum PercentError {
        OutOfRange(i64),
    }

    impl std::fmt::Display for PercentError {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            match self {
                Self::OutOfRange(value) => {
                    write!(f, "percent done must be within 0..=100, got {value}")
                }
            }
        }
    }

    impl std::error::Error for PercentError {}

    #[derive(Clone, Debug, PartialEq, Eq)]
    pub struct User {
        pub id: i64,
        pub first_name: String,
        pub last_name: String,
        pub email: String,
        pub role: Role,
    }

    #[derive(Clone, Debug, PartialEq, Eq)]
    pub struct Project {
        pub id: i64,
        pub short_name: String,
        pub name: String,
        pub description: String,
        pub status: ProjectStatus,
        pub owner_id: i64,
    }

    #[derive(Clone, Debug, PartialEq, Eq)]
    pub struct Category {
        pub id: i64,
        pub project_id: i64,
        pub name: String,
    }

    #[derive(Clone, Debug, PartialEq, Eq)]
    pub struct Feature {
        pub id: i64,
        pub category_id: i64,
        pub short_name: String,
        pub name: String,
        pub percent_done: PercentDone,
        pub status: FeatureStatus,
        /// ISO-8601 calendar date (`YYYY-MM-DD`); validated at the operation boundary.
        pub estimated_end_date: Option<String>,
    }

    impl Feature {
        /// A feature reported finished by percent but not by status (or the
        /// reverse) is surfaced by the dashboard, never silently corrected.
        pub fn is_inconsistent(&self) -> bool {
            self.percent_done == PercentDone::COMPLETE && self.status != FeatureStatus::Done
        }
    }
}
