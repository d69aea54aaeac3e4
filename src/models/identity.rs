/// Caller identity already validated by the authentication layer in front of
/// the service. Inserted as a request extension or read from a trusted header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallerIdentity(String);

impl CallerIdentity {
    /// Returns `None` for blank usernames, which count as no identity at all.
    pub fn new(username: impl Into<String>) -> Option<Self> {
        let username = username.into();
        let trimmed = username.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    pub fn username(&self) -> &str {
        &self.0
    }
}
