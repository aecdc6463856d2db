use std::fmt;

use crate::llm::ApiError;

const MESSAGE_PREFIX: &str = "I'm having trouble connecting to the AI service. ";

/// User-facing failure buckets of a generate call. Every [`ApiError`] maps
/// to exactly one of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    RateLimited,
    Unavailable,
    BadRequest,
    OtherServerError,
    NoResponse,
    ClientFault,
}

impl FailureKind {
    pub fn classify(err: &ApiError) -> Self {
        match err {
            ApiError::Status { status: 429, .. } => FailureKind::RateLimited,
            ApiError::Status { status: 503, .. } => FailureKind::Unavailable,
            ApiError::Status { status: 400, .. } => FailureKind::BadRequest,
            ApiError::Status { .. } => FailureKind::OtherServerError,
            ApiError::NoResponse(_) => FailureKind::NoResponse,
            ApiError::Request(_) => FailureKind::ClientFault,
        }
    }

    fn hint(&self) -> &'static str {
        match self {
            FailureKind::RateLimited =>
                "You've sent too many requests. Please wait a moment and try again.",
            FailureKind::Unavailable =>
                "The AI service is temporarily unavailable. Please try again later.",
            FailureKind::BadRequest =>
                "There was an issue with your request. Please try rephrasing your question.",
            FailureKind::OtherServerError => "Please try again in a moment.",
            FailureKind::NoResponse => "Please check your internet connection.",
            FailureKind::ClientFault => "An unexpected error occurred.",
        }
    }

    pub fn user_message(&self) -> String {
        format!("{}{}", MESSAGE_PREFIX, self.hint())
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FailureKind::RateLimited => "rate_limited",
            FailureKind::Unavailable => "unavailable",
            FailureKind::BadRequest => "bad_request",
            FailureKind::OtherServerError => "server_error",
            FailureKind::NoResponse => "no_response",
            FailureKind::ClientFault => "client_fault",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status(code: u16) -> ApiError {
        ApiError::Status { status: code, body: String::new() }
    }

    #[test]
    fn status_codes_map_to_buckets() {
        assert_eq!(FailureKind::classify(&status(429)), FailureKind::RateLimited);
        assert_eq!(FailureKind::classify(&status(503)), FailureKind::Unavailable);
        assert_eq!(FailureKind::classify(&status(400)), FailureKind::BadRequest);
        assert_eq!(FailureKind::classify(&status(500)), FailureKind::OtherServerError);
        assert_eq!(FailureKind::classify(&status(404)), FailureKind::OtherServerError);
        assert_eq!(
            FailureKind::classify(&ApiError::Request("bad url".into())),
            FailureKind::ClientFault
        );
    }

    #[test]
    fn rate_limit_wording() {
        let msg = FailureKind::RateLimited.user_message();
        assert!(msg.starts_with(MESSAGE_PREFIX));
        assert!(msg.contains("too many requests"));
    }

    #[test]
    fn connectivity_wording() {
        assert!(FailureKind::NoResponse.user_message().contains("check your internet connection"));
    }

    #[test]
    fn messages_are_distinct() {
        let kinds = [
            FailureKind::RateLimited,
            FailureKind::Unavailable,
            FailureKind::BadRequest,
            FailureKind::OtherServerError,
            FailureKind::NoResponse,
            FailureKind::ClientFault,
        ];
        let mut messages: Vec<String> = kinds.iter().map(FailureKind::user_message).collect();
        messages.sort();
        messages.dedup();
        assert_eq!(messages.len(), kinds.len());
    }
}
