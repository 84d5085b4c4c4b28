use crate::app::ports::{UserDirectory, UserId};
use crate::error::{ImportError, Result};
use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;

#[derive(Default)]
struct Inner {
    users: HashMap<String, UserId>,
    profile_data: BTreeMap<(UserId, String), String>,
    next_id: u64,
}

/// Directory held in memory, used for dry runs and tests.
#[derive(Default)]
pub struct InMemoryUserDirectory {
    inner: Mutex<Inner>,
}

impl InMemoryUserDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_user(&self, email: &str) -> UserId {
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(id) = inner.users.get(email) {
            return *id;
        }
        inner.next_id += 1;
        let id = UserId(inner.next_id);
        inner.users.insert(email.to_string(), id);
        id
    }

    /// Snapshot of a user's profile fields.
    pub fn profile(&self, user: UserId) -> BTreeMap<String, String> {
        let inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        inner
            .profile_data
            .iter()
            .filter(|((id, _), _)| *id == user)
            .map(|((_, field), value)| (field.clone(), value.clone()))
            .collect()
    }
}

impl UserDirectory for InMemoryUserDirectory {
    fn find_by_email(&self, email: &str) -> Result<Option<UserId>> {
        let inner = self
            .inner
            .lock()
            .map_err(|e| ImportError::Directory(format!("lock poisoned: {e}")))?;
        Ok(inner.users.get(email).copied())
    }

    fn upsert_profile_field(&self, user: UserId, field: &str, value: &str) -> Result<()> {
        let mut inner = self
            .inner
            .lock()
            .map_err(|e| ImportError::Directory(format!("lock poisoned: {e}")))?;
        if !inner.users.values().any(|id| *id == user) {
            return Err(ImportError::Directory(format!("unknown user {}", user.0)));
        }
        inner.profile_data.insert((user, field.to_string()), value.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upsert_replaces_value() {
        let directory = InMemoryUserDirectory::new();
        let user = directory.add_user("a@b.de");
        directory.upsert_profile_field(user, "unternehmen", "b.de").unwrap();
        directory.upsert_profile_field(user, "unternehmen", "c.de").unwrap();
        assert_eq!(directory.profile(user).get("unternehmen").map(String::as_str), Some("c.de"));
        assert_eq!(directory.profile(user).len(), 1);
    }

    #[test]
    fn test_unknown_user_rejected() {
        let directory = InMemoryUserDirectory::new();
        assert!(directory.upsert_profile_field(UserId(7), "userimport", "x").is_err());
        assert_eq!(directory.find_by_email("nobody@x.de").unwrap(), None);
    }

    #[test]
    fn test_add_user_is_stable() {
        let directory = InMemoryUserDirectory::new();
        assert_eq!(directory.add_user("a@b.de"), directory.add_user("a@b.de"));
    }
}
