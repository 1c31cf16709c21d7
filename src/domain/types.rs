//! Shared identifier types and the request identity context

use serde::{Deserialize, Serialize};

/// Newtype wrapper for journey IDs to provide type safety
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JourneyId(pub String);

impl JourneyId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for JourneyId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for JourneyId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Newtype wrapper for user IDs (journey owners)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub String);

impl UserId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for UserId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Identity of the authenticated caller.
///
/// Every statistics call takes one of these explicitly; nothing in the
/// engine reads identity from ambient state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    pub user_id: UserId,
}

impl RequestContext {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self { user_id: UserId(user_id.into()) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_serialize_as_plain_strings() {
        let json = serde_json::to_string(&JourneyId::from("j-1")).unwrap();
        assert_eq!(json, "\"j-1\"");

        let user: UserId = serde_json::from_str("\"u-7\"").unwrap();
        assert_eq!(user, UserId::from("u-7"));
    }

    #[test]
    fn test_request_context_new() {
        let ctx = RequestContext::new("alice");
        assert_eq!(ctx.user_id.as_str(), "alice");
        assert_eq!(ctx.user_id.to_string(), "alice");
    }
}
