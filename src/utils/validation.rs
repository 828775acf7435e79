use crate::utils::error::{BookingError, Result};
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(BookingError::config(field_name, "URL cannot be empty"));
    }

    match Url::parse(url_str) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(BookingError::config(
                field_name,
                format!("Unsupported URL scheme: {}", scheme),
            )),
        },
        Err(e) => Err(BookingError::config(
            field_name,
            format!("Invalid URL format '{}': {}", url_str, e),
        )),
    }
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(BookingError::config(
            field_name,
            "Value cannot be empty or whitespace-only",
        ));
    }
    Ok(())
}

/// 集合名稱會直接放進 REST 路徑，不能含有分隔符號
pub fn validate_collection_name(field_name: &str, value: &str) -> Result<()> {
    validate_non_empty_string(field_name, value)?;
    if value.contains('/') || value.contains('?') || value.contains('#') {
        return Err(BookingError::config(
            field_name,
            format!("Collection name '{}' contains a path separator", value),
        ));
    }
    Ok(())
}

/// `${VAR}` 沒有被替換時，值會原樣留下
pub fn validate_substituted(field_name: &str, value: &str) -> Result<()> {
    if value.contains("${") {
        return Err(BookingError::config(
            field_name,
            format!("Unresolved environment variable in '{}'", value),
        ));
    }
    Ok(())
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    if value < min || value > max {
        return Err(BookingError::config(
            field_name,
            format!("Value {} must be between {} and {}", value, min, max),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_url() {
        assert!(validate_url("store.base_url", "https://firestore.googleapis.com").is_ok());
        assert!(validate_url("store.base_url", "http://127.0.0.1:8080").is_ok());
        assert!(validate_url("store.base_url", "").is_err());
        assert!(validate_url("store.base_url", "invalid-url").is_err());
        assert!(validate_url("store.base_url", "ftp://example.com").is_err());
    }

    #[test]
    fn test_validate_collection_name() {
        assert!(validate_collection_name("collections.rooms", "rooms").is_ok());
        assert!(validate_collection_name("collections.rooms", " ").is_err());
        assert!(validate_collection_name("collections.rooms", "rooms/x").is_err());
    }

    #[test]
    fn test_validate_substituted() {
        assert!(validate_substituted("store.api_key", "abc").is_ok());
        assert!(validate_substituted("store.api_key", "${FIRESTORE_API_KEY}").is_err());
    }

    #[test]
    fn test_validate_range() {
        assert!(validate_range("schedule.sweep_interval_seconds", 10, 1, 3600).is_ok());
        assert!(validate_range("schedule.sweep_interval_seconds", 0, 1, 3600).is_err());
    }
}
