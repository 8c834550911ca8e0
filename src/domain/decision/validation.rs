use crate::domain::DomainError;

/// Minimum length of a decision query, after trimming
pub const MIN_QUERY_LENGTH: usize = 10;

/// Maximum length of a decision query, after trimming
pub const MAX_QUERY_LENGTH: usize = 1000;

/// Validate a decision query and return it trimmed
pub fn validate_decision_query(query: &str) -> Result<String, DomainError> {
    let trimmed = query.trim();

    if trimmed.is_empty() {
        return Err(DomainError::validation("Decision query cannot be empty"));
    }

    let length = trimmed.chars().count();

    if length < MIN_QUERY_LENGTH {
        return Err(DomainError::validation(format!(
            "Decision query must be at least {} characters long",
            MIN_QUERY_LENGTH
        )));
    }

    if length > MAX_QUERY_LENGTH {
        return Err(DomainError::validation(format!(
            "Decision query must not exceed {} characters",
            MAX_QUERY_LENGTH
        )));
    }

    Ok(trimmed.to_string())
}
