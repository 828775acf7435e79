use thiserror::Error;

/// 使用者可自行修正的輸入問題（空欄位、重複預約）
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("missing field: {field}")]
    MissingField { field: &'static str },

    #[error("group already booked today: {name} on {date}")]
    GroupAlreadyBooked { name: String, date: String },

    #[error("room unavailable: {room} on {date} at {time}")]
    RoomUnavailable {
        room: String,
        date: String,
        time: String,
    },

    #[error("invalid schedule {date} {time}: {reason}")]
    InvalidSchedule {
        date: String,
        time: String,
        reason: String,
    },
}

#[derive(Error, Debug)]
pub enum BookingError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Store request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Store error (status {status}): {message}")]
    Store { status: u16, message: String },

    #[error("Malformed document {id}: {reason}")]
    MalformedDocument { id: String, reason: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error in {field}: {message}")]
    Config { field: String, message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Validation,
    Store,
    Configuration,
}

impl BookingError {
    pub fn store(status: u16, message: impl Into<String>) -> Self {
        BookingError::Store {
            status,
            message: message.into(),
        }
    }

    pub fn malformed(id: impl Into<String>, reason: impl Into<String>) -> Self {
        BookingError::MalformedDocument {
            id: id.into(),
            reason: reason.into(),
        }
    }

    pub fn config(field: impl Into<String>, message: impl Into<String>) -> Self {
        BookingError::Config {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            BookingError::Validation(_) => ErrorCategory::Validation,
            BookingError::Http(_)
            | BookingError::Store { .. }
            | BookingError::MalformedDocument { .. }
            | BookingError::Serialization(_) => ErrorCategory::Store,
            BookingError::Io(_) | BookingError::Config { .. } => ErrorCategory::Configuration,
        }
    }

    pub fn is_validation(&self) -> bool {
        self.category() == ErrorCategory::Validation
    }

    /// 顯示給使用者的訊息；基礎設施錯誤只給通用提示
    pub fn user_friendly_message(&self) -> String {
        match self {
            BookingError::Validation(ValidationError::MissingField { .. }) => {
                "All fields must be filled out!".to_string()
            }
            BookingError::Validation(ValidationError::GroupAlreadyBooked { .. }) => {
                "This Jumuia already has a reservation for today.".to_string()
            }
            BookingError::Validation(ValidationError::RoomUnavailable { .. }) => {
                "Room is already reserved at this time.".to_string()
            }
            BookingError::Validation(ValidationError::InvalidSchedule { date, time, .. }) => {
                format!("'{} {}' is not a valid date and hour slot.", date, time)
            }
            BookingError::Http(_)
            | BookingError::Store { .. }
            | BookingError::MalformedDocument { .. }
            | BookingError::Serialization(_) => {
                "Could not reach the reservation store. Please try again.".to_string()
            }
            BookingError::Io(_) | BookingError::Config { .. } => {
                format!("Invalid configuration: {}", self)
            }
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            BookingError::Validation(ValidationError::MissingField { .. }) => {
                "Provide a group, date, time and room"
            }
            BookingError::Validation(ValidationError::GroupAlreadyBooked { .. }) => {
                "Choose another date for this group"
            }
            BookingError::Validation(ValidationError::RoomUnavailable { .. }) => {
                "Choose another room or time slot"
            }
            BookingError::Validation(ValidationError::InvalidSchedule { .. }) => {
                "Use YYYY-MM-DD for the date and HH:00 for the time"
            }
            BookingError::Http(_) | BookingError::Store { .. } => {
                "Check network connectivity and the store credentials, then retry"
            }
            BookingError::MalformedDocument { .. } | BookingError::Serialization(_) => {
                "Inspect the offending document in the store"
            }
            BookingError::Io(_) | BookingError::Config { .. } => {
                "Check the configuration file and environment variables"
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, BookingError>;
