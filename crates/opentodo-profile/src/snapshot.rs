use chrono::{DateTime, Utc};
use opentodo_core::{model::Profile, PRODUCT_NAME};

/// A complete, pretty-printed serialization of the profile at one instant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    /// Suggested download name, e.g. `OpenTodo_Backup_2024-05-01.json`.
    pub file_name: String,
    pub bytes: Vec<u8>,
}

pub fn export_file_name(at: DateTime<Utc>) -> String {
    format!("{PRODUCT_NAME}_Backup_{}.json", at.format("%Y-%m-%d"))
}

/// A decoded import that has not been applied yet. Carries the live
/// document's `updatedAt` so the caller can decide whether to confirm.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportCandidate {
    pub profile: Profile,
    pub live_updated_at: DateTime<Utc>,
}

impl ImportCandidate {
    pub fn updated_at(&self) -> DateTime<Utc> {
        self.profile.updated_at
    }

    pub fn is_newer_than_live(&self) -> bool {
        self.profile.updated_at > self.live_updated_at
    }

    pub fn is_older_than_live(&self) -> bool {
        self.profile.updated_at < self.live_updated_at
    }

    pub fn into_profile(self) -> Profile {
        self.profile
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};

    use super::*;

    #[test]
    fn file_name_embeds_the_date() {
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 13, 45, 0).unwrap();
        assert_eq!(export_file_name(at), "OpenTodo_Backup_2024-05-01.json");
    }

    #[test]
    fn compares_candidate_with_live_document() {
        let profile = Profile::default();
        let candidate = ImportCandidate {
            live_updated_at: profile.updated_at + Duration::hours(1),
            profile,
        };
        assert!(candidate.is_older_than_live());
        assert!(!candidate.is_newer_than_live());
    }
}
