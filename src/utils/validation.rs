use anyhow::{anyhow, Result};
use thiserror::Error;

pub const MAX_CHALLENGE_HOURS: u32 = 12;
pub const MAX_STUDY_MINUTES: u32 = 240;
pub const MAX_REST_MINUTES: u32 = 120;

/// Why a free-text `"<study> <rest>"` split was rejected.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SplitInputError {
    #[error("expected two numbers like `52 8`, got {0} value(s)")]
    WrongTokenCount(usize),
    #[error("`{0}` is not a whole number")]
    NotANumber(String),
    #[error("{0}")]
    OutOfRange(String),
}

/// Parses a custom split such as `"52 8"` into `(study, rest)` minutes.
pub fn parse_custom_split(input: &str) -> Result<(u32, u32), SplitInputError> {
    let parts: Vec<&str> = input.split_whitespace().collect();
    let [study, rest] = parts.as_slice() else {
        return Err(SplitInputError::WrongTokenCount(parts.len()));
    };
    
    let study = study
        .parse::<u32>()
        .map_err(|_| SplitInputError::NotANumber(study.to_string()))?;
    let rest = rest
        .parse::<u32>()
        .map_err(|_| SplitInputError::NotANumber(rest.to_string()))?;
    
    validate_split(study, rest).map_err(|e| SplitInputError::OutOfRange(e.to_string()))?;
    Ok((study, rest))
}

pub fn validate_split(study_minutes: u32, rest_minutes: u32) -> Result<()> {
    if study_minutes == 0 {
        return Err(anyhow!("Study time must be at least 1 minute"));
    }
    
    if study_minutes > MAX_STUDY_MINUTES {
        return Err(anyhow!("Study time cannot be longer than {} minutes", MAX_STUDY_MINUTES));
    }
    
    if rest_minutes > MAX_REST_MINUTES {
        return Err(anyhow!("Rest time cannot be longer than {} minutes", MAX_REST_MINUTES));
    }
    
    Ok(())
}

pub fn validate_hours(hours: u32) -> Result<()> {
    if hours == 0 {
        return Err(anyhow!("A challenge must last at least 1 hour"));
    }
    
    if hours > MAX_CHALLENGE_HOURS {
        return Err(anyhow!("A challenge cannot be longer than {} hours", MAX_CHALLENGE_HOURS));
    }
    
    Ok(())
}

/// Validates a challenge goal or to-do title and returns it trimmed.
pub fn validate_task_title(title: &str) -> Result<String> {
    let title = title.trim();
    
    if title.is_empty() {
        return Err(anyhow!("Title cannot be empty"));
    }
    
    if title.starts_with('/') {
        return Err(anyhow!("Title cannot start with '/'"));
    }
    
    if title.chars().count() > 200 {
        return Err(anyhow!("Title cannot be longer than 200 characters"));
    }
    
    if title.contains('\n') || title.contains('\r') {
        return Err(anyhow!("Title cannot contain line breaks"));
    }
    
    Ok(title.to_string())
}

pub fn parse_task_id(input: &str) -> Result<i64> {
    let input = input.trim();
    
    if input.is_empty() {
        return Err(anyhow!("Task ID is missing"));
    }
    
    let id = input
        .parse::<i64>()
        .map_err(|_| anyhow!("Task ID must be a number"))?;
    
    if id <= 0 {
        return Err(anyhow!("Task ID must be positive"));
    }
    
    Ok(id)
}
