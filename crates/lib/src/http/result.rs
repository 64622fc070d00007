//! Tagged success/failure result returned by every network-facing call.

use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Outcome of a network call: `Success { data }` or `Failure { error }`.
///
/// Serialized as `{"status": "success", "data": ...}` / `{"status": "failure", "error": "..."}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum ApiResult<T> {
    Success { data: T },
    Failure { error: String },
}

impl<T> ApiResult<T> {
    pub fn success(data: T) -> Self {
        ApiResult::Success { data }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        ApiResult::Failure {
            error: error.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ApiResult::Success { .. })
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            ApiResult::Success { data } => Some(data),
            ApiResult::Failure { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            ApiResult::Success { .. } => None,
            ApiResult::Failure { error } => Some(error),
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ApiResult<U> {
        match self {
            ApiResult::Success { data } => ApiResult::Success { data: f(data) },
            ApiResult::Failure { error } => ApiResult::Failure { error },
        }
    }

    pub fn and_then<U>(self, f: impl FnOnce(T) -> ApiResult<U>) -> ApiResult<U> {
        match self {
            ApiResult::Success { data } => f(data),
            ApiResult::Failure { error } => ApiResult::Failure { error },
        }
    }

    /// Convert into a plain `Result` for `?`-style callers.
    pub fn into_result(self) -> Result<T, String> {
        match self {
            ApiResult::Success { data } => Ok(data),
            ApiResult::Failure { error } => Err(error),
        }
    }
}

impl<T, E: Display> From<Result<T, E>> for ApiResult<T> {
    fn from(res: Result<T, E>) -> Self {
        match res {
            Ok(data) => ApiResult::success(data),
            Err(e) => ApiResult::failure(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_with_status_tag() {
        let ok: ApiResult<String> = ApiResult::success("hi".to_string());
        assert_eq!(
            serde_json::to_value(&ok).unwrap(),
            serde_json::json!({"status": "success", "data": "hi"})
        );
        let err: ApiResult<String> = ApiResult::failure("boom");
        assert_eq!(
            serde_json::to_value(&err).unwrap(),
            serde_json::json!({"status": "failure", "error": "boom"})
        );
    }

    #[test]
    fn and_then_short_circuits_on_failure() {
        let err: ApiResult<u32> = ApiResult::failure("first");
        let chained = err.and_then(|n| ApiResult::success(n + 1));
        assert_eq!(chained.error(), Some("first"));

        let ok: ApiResult<u32> = ApiResult::success(1);
        assert_eq!(ok.and_then(|n| ApiResult::success(n + 1)).data(), Some(&2));
    }

    #[test]
    fn from_result_uses_error_display() {
        let res: Result<u8, std::num::ParseIntError> = "x".parse::<u8>();
        let api: ApiResult<u8> = res.into();
        assert!(!api.is_success());
        assert!(api.error().unwrap().contains("invalid digit"));
    }
}
