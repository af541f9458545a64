//! Identity model shared by login, token issuance, and token review.
//!
//! # Purpose
//! Normalizes user identities so every identity that is embedded in a token
//! or returned to a caller has a non-empty `uid` and a duplicate-free group
//! list.
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub username: String,
    pub uid: String,
    pub email: String,
    pub groups: Vec<String>,
}

impl Identity {
    /// Build a normalized identity.
    ///
    /// An empty `uid` falls back to `username`; repeated groups are dropped,
    /// keeping the first occurrence.
    pub fn new(
        username: impl Into<String>,
        uid: impl Into<String>,
        email: impl Into<String>,
        groups: Vec<String>,
    ) -> Self {
        Self {
            username: username.into(),
            uid: uid.into(),
            email: email.into(),
            groups,
        }
        .normalized()
    }

    pub fn normalized(mut self) -> Self {
        if self.uid.is_empty() {
            self.uid = self.username.clone();
        }
        self.groups = dedup_groups(self.groups);
        self
    }
}

fn dedup_groups(groups: Vec<String>) -> Vec<String> {
    let mut seen = std::collections::HashSet::with_capacity(groups.len());
    groups
        .into_iter()
        .filter(|group| seen.insert(group.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_uid_defaults_to_username() {
        let identity = Identity::new("alice", "", "", vec!["dev".to_string()]);
        assert_eq!(identity.uid, "alice");
    }

    #[test]
    fn explicit_uid_is_kept() {
        let identity = Identity::new("alice", "1001", "alice@example.com", vec![]);
        assert_eq!(identity.uid, "1001");
        assert_eq!(identity.email, "alice@example.com");
    }

    #[test]
    fn groups_keep_first_occurrence_order() {
        let identity = Identity::new(
            "bob",
            "",
            "",
            vec![
                "ops".to_string(),
                "dev".to_string(),
                "ops".to_string(),
                "audit".to_string(),
            ],
        );
        assert_eq!(identity.groups, vec!["ops", "dev", "audit"]);
    }
}
