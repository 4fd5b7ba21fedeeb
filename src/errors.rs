use std::fmt;

#[derive(Debug, Clone)]
pub enum QrLinkError {
    DatabaseConfig(String),
    DatabaseConnection(String),
    DatabaseOperation(String),
    /// Candidate short code already taken. Retried internally by the
    /// creation path; never escapes it.
    DuplicateCode(String),
    /// Collision retry budget spent. Fatal to the single creation
    /// request, distinct from a generic store failure.
    RetriesExhausted(String),
    NotFound(String),
    Validation(String),
    Serialization(String),
    DateParse(String),
}

impl QrLinkError {
    pub fn code(&self) -> &'static str {
        match self {
            QrLinkError::DatabaseConfig(_) => "E001",
            QrLinkError::DatabaseConnection(_) => "E002",
            QrLinkError::DatabaseOperation(_) => "E003",
            QrLinkError::DuplicateCode(_) => "E004",
            QrLinkError::RetriesExhausted(_) => "E005",
            QrLinkError::NotFound(_) => "E006",
            QrLinkError::Validation(_) => "E007",
            QrLinkError::Serialization(_) => "E008",
            QrLinkError::DateParse(_) => "E009",
        }
    }

    pub fn error_type(&self) -> &'static str {
        match self {
            QrLinkError::DatabaseConfig(_) => "Database Configuration Error",
            QrLinkError::DatabaseConnection(_) => "Database Connection Error",
            QrLinkError::DatabaseOperation(_) => "Database Operation Error",
            QrLinkError::DuplicateCode(_) => "Duplicate Short Code",
            QrLinkError::RetriesExhausted(_) => "Code Generation Retries Exhausted",
            QrLinkError::NotFound(_) => "Resource Not Found",
            QrLinkError::Validation(_) => "Validation Error",
            QrLinkError::Serialization(_) => "Serialization Error",
            QrLinkError::DateParse(_) => "Date Parse Error",
        }
    }

    pub fn message(&self) -> &str {
        match self {
            QrLinkError::DatabaseConfig(msg)
            | QrLinkError::DatabaseConnection(msg)
            | QrLinkError::DatabaseOperation(msg)
            | QrLinkError::DuplicateCode(msg)
            | QrLinkError::RetriesExhausted(msg)
            | QrLinkError::NotFound(msg)
            | QrLinkError::Validation(msg)
            | QrLinkError::Serialization(msg)
            | QrLinkError::DateParse(msg) => msg,
        }
    }
}

impl fmt::Display for QrLinkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.error_type(), self.message())
    }
}

impl std::error::Error for QrLinkError {}

// Convenience constructors
impl QrLinkError {
    pub fn database_config<T: Into<String>>(msg: T) -> Self {
        QrLinkError::DatabaseConfig(msg.into())
    }

    pub fn database_connection<T: Into<String>>(msg: T) -> Self {
        QrLinkError::DatabaseConnection(msg.into())
    }

    pub fn database_operation<T: Into<String>>(msg: T) -> Self {
        QrLinkError::DatabaseOperation(msg.into())
    }

    pub fn duplicate_code<T: Into<String>>(msg: T) -> Self {
        QrLinkError::DuplicateCode(msg.into())
    }

    pub fn retries_exhausted<T: Into<String>>(msg: T) -> Self {
        QrLinkError::RetriesExhausted(msg.into())
    }

    pub fn not_found<T: Into<String>>(msg: T) -> Self {
        QrLinkError::NotFound(msg.into())
    }

    pub fn validation<T: Into<String>>(msg: T) -> Self {
        QrLinkError::Validation(msg.into())
    }

    pub fn serialization<T: Into<String>>(msg: T) -> Self {
        QrLinkError::Serialization(msg.into())
    }

    pub fn date_parse<T: Into<String>>(msg: T) -> Self {
        QrLinkError::DateParse(msg.into())
    }
}

impl From<sea_orm::DbErr> for QrLinkError {
    fn from(err: sea_orm::DbErr) -> Self {
        QrLinkError::DatabaseOperation(err.to_string())
    }
}

impl From<serde_json::Error> for QrLinkError {
    fn from(err: serde_json::Error) -> Self {
        QrLinkError::Serialization(err.to_string())
    }
}

impl From<chrono::ParseError> for QrLinkError {
    fn from(err: chrono::ParseError) -> Self {
        QrLinkError::DateParse(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, QrLinkError>;
