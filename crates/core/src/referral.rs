//! Referral codes and reward counting.

use rand::Rng;
use serde::Serialize;

/// Converted referrals needed for one reward (a free month).
pub const REFERRALS_PER_REWARD: i64 = 3;

/// Length of a generated referral code.
pub const CODE_LENGTH: usize = 8;

/// Unambiguous code alphabet (no `0/O`, `1/I/L`).
const CODE_ALPHABET: &[u8] = b"ABCDEFGHJKMNPQRSTUVWXYZ23456789";

pub const STATUS_INVITED: &str = "invited";
pub const STATUS_SIGNED_UP: &str = "signed_up";
pub const STATUS_CONVERTED: &str = "converted";

/// Generate a random referral code.
pub fn generate_code() -> String {
    let mut rng = rand::rng();
    (0..CODE_LENGTH)
        .map(|_| CODE_ALPHABET[rng.random_range(0..CODE_ALPHABET.len())] as char)
        .collect()
}

/// Normalise a user-typed code (trimmed, uppercase).
pub fn normalize_code(code: &str) -> String {
    code.trim().to_ascii_uppercase()
}

/// Reward standing derived from the converted-referral count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RewardProgress {
    pub rewards_earned: i64,
    /// Converted referrals still missing for the next reward.
    pub next_reward_in: i64,
}

pub fn reward_progress(converted: i64) -> RewardProgress {
    let converted = converted.max(0);
    RewardProgress {
        rewards_earned: converted / REFERRALS_PER_REWARD,
        next_reward_in: REFERRALS_PER_REWARD - converted % REFERRALS_PER_REWARD,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_use_the_alphabet() {
        let code = generate_code();
        assert_eq!(code.len(), CODE_LENGTH);
        assert!(code.bytes().all(|b| CODE_ALPHABET.contains(&b)));
    }

    #[test]
    fn normalize_uppercases_and_trims() {
        assert_eq!(normalize_code("  ab3k9xyz "), "AB3K9XYZ");
    }

    #[test]
    fn rewards_every_three_conversions() {
        assert_eq!(
            reward_progress(0),
            RewardProgress { rewards_earned: 0, next_reward_in: 3 }
        );
        assert_eq!(
            reward_progress(2),
            RewardProgress { rewards_earned: 0, next_reward_in: 1 }
        );
        assert_eq!(
            reward_progress(3),
            RewardProgress { rewards_earned: 1, next_reward_in: 3 }
        );
        assert_eq!(
            reward_progress(7),
            RewardProgress { rewards_earned: 2, next_reward_in: 2 }
        );
    }
}
