//! Grouping of subscribers by generation key

use std::collections::BTreeMap;

use shared::{GenerationKey, SharedError, Subscriber};
use crate::config::PreferencePolicy;
use crate::core::report::FailureReason;

/// A subscriber placed in a group, remembering its position in the directory listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member {
    pub index: usize,
    pub subscriber: Subscriber,
    /// Defaults substituted for missing or unrecognized preferences
    pub substitutions: Vec<SharedError>,
}

/// A subscriber left out of every group, with the failure recorded for it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejected {
    pub index: usize,
    pub subscriber: Subscriber,
    pub reason: FailureReason,
}

/// Subscribers grouped by the key their content is generated for.
/// Keys iterate in `GenerationKey` order; members keep directory order within a key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Partition {
    groups: BTreeMap<GenerationKey, Vec<Member>>,
    rejected: Vec<Rejected>,
}

impl Partition {
    pub fn build(subscribers: &[Subscriber], policy: PreferencePolicy) -> Self {
        let mut partition = Self::default();

        for (index, subscriber) in subscribers.iter().enumerate() {
            // Nobody to deliver to, whatever the policy
            if !subscriber.has_recipient() {
                partition.rejected.push(Rejected {
                    index,
                    subscriber: subscriber.clone(),
                    reason: FailureReason::MissingRecipient,
                });
                continue;
            }

            let resolution = subscriber.key_resolution();

            if !resolution.is_exact() && policy == PreferencePolicy::Reject {
                partition.rejected.push(Rejected {
                    index,
                    subscriber: subscriber.clone(),
                    reason: FailureReason::InvalidPreferences(resolution.issues),
                });
                continue;
            }

            partition.groups.entry(resolution.key).or_default().push(Member {
                index,
                subscriber: subscriber.clone(),
                substitutions: resolution.issues,
            });
        }

        partition
    }

    pub fn keys(&self) -> impl Iterator<Item = GenerationKey> + '_ {
        self.groups.keys().copied()
    }

    pub fn key_count(&self) -> usize {
        self.groups.len()
    }

    pub fn members(&self, key: GenerationKey) -> &[Member] {
        self.groups.get(&key).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn iter(&self) -> impl Iterator<Item = (GenerationKey, &Member)> + '_ {
        self.groups
            .iter()
            .flat_map(|(key, members)| members.iter().map(move |member| (*key, member)))
    }

    pub fn member_count(&self) -> usize {
        self.groups.values().map(Vec::len).sum()
    }

    pub fn rejected(&self) -> &[Rejected] {
        &self.rejected
    }

    /// Members whose key was reached through a default
    pub fn substituted(&self) -> impl Iterator<Item = (GenerationKey, &Member)> + '_ {
        self.iter().filter(|(_, member)| !member.substitutions.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::{DifficultyLevel, LanguageCode};

    fn subscribers() -> Vec<Subscriber> {
        vec![
            Subscriber::new(1, "U1", "jp", "low"),
            Subscriber::new(2, "U2", "en", "mid"),
            Subscriber::new(3, "U3", "jp", "low"),
            Subscriber::new(4, "U4", "ko", "high"),
        ]
    }

    #[test]
    fn test_groups_by_key_in_directory_order() {
        let partition = Partition::build(&subscribers(), PreferencePolicy::Fallback);

        let jp_low = GenerationKey::new(LanguageCode::Japanese, DifficultyLevel::Low);
        let ids: Vec<i64> = partition.members(jp_low).iter().map(|m| m.subscriber.id).collect();

        assert_eq!(ids, vec![1, 3]);
        assert_eq!(partition.key_count(), 3);
        assert_eq!(partition.member_count(), 4);
        assert!(partition.rejected().is_empty());
    }

    #[test]
    fn test_fallback_substitutes_default_language() {
        let partition = Partition::build(&subscribers(), PreferencePolicy::Fallback);

        let substituted: Vec<(GenerationKey, i64)> = partition
            .substituted()
            .map(|(key, member)| (key, member.subscriber.id))
            .collect();

        assert_eq!(
            substituted,
            vec![(GenerationKey::new(LanguageCode::Japanese, DifficultyLevel::High), 4)]
        );
    }

    #[test]
    fn test_reject_policy_excludes_unrecognized_preferences() {
        let partition = Partition::build(&subscribers(), PreferencePolicy::Reject);

        assert_eq!(partition.member_count(), 3);
        assert_eq!(partition.rejected().len(), 1);
        assert_eq!(partition.rejected()[0].index, 3);
        assert_eq!(
            partition.rejected()[0].reason,
            FailureReason::InvalidPreferences(vec![SharedError::UnknownLanguage { value: "ko".to_string() }])
        );
    }

    #[test]
    fn test_blank_recipient_is_rejected_under_any_policy() {
        let mut blank = Subscriber::new(5, "  ", "en", "low");
        let subscribers = vec![Subscriber::new(1, "U1", "en", "low"), blank.clone()];

        for policy in [PreferencePolicy::Fallback, PreferencePolicy::Reject] {
            let partition = Partition::build(&subscribers, policy);
            assert_eq!(partition.member_count(), 1);
            assert_eq!(partition.rejected()[0].index, 1);
            assert_eq!(partition.rejected()[0].reason, FailureReason::MissingRecipient);
        }

        blank.recipient_id = String::new();
        let partition = Partition::build(&[blank], PreferencePolicy::Fallback);
        assert_eq!(partition.key_count(), 0);
        assert_eq!(partition.rejected().len(), 1);
    }

    #[test]
    fn test_keys_are_ordered() {
        let partition = Partition::build(&subscribers(), PreferencePolicy::Fallback);
        let keys: Vec<GenerationKey> = partition.keys().collect();

        let mut sorted = keys.clone();
        sorted.sort();
        assert_eq!(keys, sorted);
    }

    #[test]
    fn test_empty_input() {
        let partition = Partition::build(&[], PreferencePolicy::Fallback);
        assert_eq!(partition.key_count(), 0);
        assert_eq!(partition.members(GenerationKey::ALL[0]), &[] as &[Member]);
    }
}
