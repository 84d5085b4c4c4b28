use crate::error::Result;
use crate::types::EventPayload;
use async_trait::async_trait;

/// Identifier of an account in the target learning platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UserId(pub u64);

/// Accounts that already exist downstream. Only profile fields are touched;
/// account creation stays with the bulk importer.
pub trait UserDirectory: Send + Sync {
    fn find_by_email(&self, email: &str) -> Result<Option<UserId>>;

    /// Insert-or-update keyed by `(user, field)`.
    fn upsert_profile_field(&self, user: UserId, field: &str, value: &str) -> Result<()>;
}

/// Where the event payload comes from.
#[async_trait]
pub trait EventSource: Send + Sync {
    async fn fetch_event(&self) -> Result<FetchedEvent>;
}

/// Decoded payload together with the bytes it was decoded from.
#[derive(Debug, Clone)]
pub struct FetchedEvent {
    pub payload: EventPayload,
    pub raw: Vec<u8>,
}

impl FetchedEvent {
    pub fn from_bytes(raw: Vec<u8>) -> Result<Self> {
        let payload = serde_json::from_slice(&raw)?;
        Ok(Self { payload, raw })
    }
}
