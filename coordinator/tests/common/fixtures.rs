//! Test fixtures and data for coordinator tests

use shared::{DifficultyLevel, GenerationKey, LanguageCode, Subscriber};

/// Standard test data and fixtures
pub struct TestFixtures;

impl TestFixtures {
    pub const ALICE: &'static str = "U_ALICE";
    pub const BOB: &'static str = "U_BOB";
    pub const CAROL: &'static str = "U_CAROL";

    pub const JP_LOW: GenerationKey = GenerationKey::new(LanguageCode::Japanese, DifficultyLevel::Low);
    pub const JP_MID: GenerationKey = GenerationKey::new(LanguageCode::Japanese, DifficultyLevel::Mid);
    pub const EN_MID: GenerationKey = GenerationKey::new(LanguageCode::English, DifficultyLevel::Mid);

    /// Two subscribers share jp/low, one wants en/mid
    pub fn three_subscribers() -> Vec<Subscriber> {
        vec![
            Subscriber::new(1, Self::ALICE, "jp", "low"),
            Subscriber::new(2, Self::BOB, "jp", "low"),
            Subscriber::new(3, Self::CAROL, "en", "mid"),
        ]
    }

    /// Several subscribers for every one of the nine keys, interleaved
    pub fn every_key(per_key: usize) -> Vec<Subscriber> {
        let mut subscribers = Vec::new();
        for round in 0..per_key {
            for key in GenerationKey::ALL {
                let id = subscribers.len() as i64 + 1;
                subscribers.push(Subscriber::new(
                    id,
                    format!("U{round}_{}_{}", key.language, key.difficulty),
                    key.language.code(),
                    key.difficulty.code(),
                ));
            }
        }
        subscribers
    }

    /// A subscriber whose stored language is not offered
    pub fn unrecognized_language() -> Subscriber {
        Subscriber::new(9, "U_KOREAN", "ko", "expert")
    }

    pub fn expected_content(key: GenerationKey) -> String {
        format!("content for {key}")
    }
}
