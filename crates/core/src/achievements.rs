//! Gamified achievements.
//!
//! The catalog is a static list of threshold rules over per-user counters.
//! Evaluation is pure: the API fetches an [`AchievementCounters`] snapshot,
//! asks [`newly_unlocked`] which keys crossed their threshold, and inserts one
//! row per key. Duplicate inserts are stopped by the unique constraint on
//! `(user_id, achievement_key)`.

use std::time::Duration;

use serde::Serialize;

/// Minimum spacing between two achievement checks for the same user.
pub const CHECK_INTERVAL: Duration = Duration::from_secs(60);

/// Counter an achievement rule is measured against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Counter {
    ClientsManaged,
    ReportsAuthored,
    ChecklistItemsDone,
    UsageSeconds,
    ConvertedReferrals,
}

/// One entry of the static catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AchievementRule {
    pub key: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub counter: Counter,
    pub threshold: i64,
}

pub const CATALOG: &[AchievementRule] = &[
    AchievementRule {
        key: "first_client",
        title: "Primeiro cliente",
        description: "Cadastre seu primeiro cliente.",
        counter: Counter::ClientsManaged,
        threshold: 1,
    },
    AchievementRule {
        key: "ten_clients",
        title: "Carteira cheia",
        description: "Gerencie 10 clientes.",
        counter: Counter::ClientsManaged,
        threshold: 10,
    },
    AchievementRule {
        key: "first_report",
        title: "Primeiro relatório",
        description: "Gere seu primeiro relatório.",
        counter: Counter::ReportsAuthored,
        threshold: 1,
    },
    AchievementRule {
        key: "fifty_reports",
        title: "Analista dedicado",
        description: "Gere 50 relatórios.",
        counter: Counter::ReportsAuthored,
        threshold: 50,
    },
    AchievementRule {
        key: "checklist_finisher",
        title: "Organizado",
        description: "Conclua 25 itens de checklist.",
        counter: Counter::ChecklistItemsDone,
        threshold: 25,
    },
    AchievementRule {
        key: "ten_hours",
        title: "Dez horas de foco",
        description: "Acumule 10 horas de uso.",
        counter: Counter::UsageSeconds,
        threshold: 36_000,
    },
    AchievementRule {
        key: "hundred_hours",
        title: "Cem horas de foco",
        description: "Acumule 100 horas de uso.",
        counter: Counter::UsageSeconds,
        threshold: 360_000,
    },
    AchievementRule {
        key: "first_referral",
        title: "Primeira indicação",
        description: "Tenha uma indicação convertida.",
        counter: Counter::ConvertedReferrals,
        threshold: 1,
    },
    AchievementRule {
        key: "ambassador",
        title: "Embaixador",
        description: "Tenha 5 indicações convertidas.",
        counter: Counter::ConvertedReferrals,
        threshold: 5,
    },
];

/// Look up a rule by key.
pub fn find_rule(key: &str) -> Option<&'static AchievementRule> {
    CATALOG.iter().find(|r| r.key == key)
}

/// Snapshot of a user's counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AchievementCounters {
    pub clients_managed: i64,
    pub reports_authored: i64,
    pub checklist_items_done: i64,
    pub usage_seconds: i64,
    pub converted_referrals: i64,
}

impl AchievementCounters {
    pub fn get(&self, counter: Counter) -> i64 {
        match counter {
            Counter::ClientsManaged => self.clients_managed,
            Counter::ReportsAuthored => self.reports_authored,
            Counter::ChecklistItemsDone => self.checklist_items_done,
            Counter::UsageSeconds => self.usage_seconds,
            Counter::ConvertedReferrals => self.converted_referrals,
        }
    }
}

/// Keys whose threshold is met by `counters` and that are not already in
/// `unlocked`. Catalog order is preserved.
pub fn newly_unlocked<'a, I>(counters: &AchievementCounters, unlocked: I) -> Vec<&'static str>
where
    I: IntoIterator<Item = &'a str>,
{
    let unlocked: Vec<&str> = unlocked.into_iter().collect();
    CATALOG
        .iter()
        .filter(|rule| counters.get(rule.counter) >= rule.threshold)
        .filter(|rule| !unlocked.contains(&rule.key))
        .map(|rule| rule.key)
        .collect()
}

/// Progress toward a rule, capped at the threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RuleProgress {
    pub current: i64,
    pub threshold: i64,
    pub percent: i64,
}

pub fn progress(rule: &AchievementRule, counters: &AchievementCounters) -> RuleProgress {
    let current = counters.get(rule.counter).clamp(0, rule.threshold);
    let percent = if rule.threshold <= 0 {
        100
    } else {
        current * 100 / rule.threshold
    };
    RuleProgress {
        current,
        threshold: rule.threshold,
        percent,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_keys_are_unique() {
        for (i, a) in CATALOG.iter().enumerate() {
            for b in &CATALOG[i + 1..] {
                assert_ne!(a.key, b.key);
            }
        }
    }

    #[test]
    fn fresh_user_unlocks_nothing() {
        let unlocked = newly_unlocked(&AchievementCounters::default(), []);
        assert!(unlocked.is_empty());
    }

    #[test]
    fn thresholds_are_inclusive() {
        let counters = AchievementCounters {
            clients_managed: 10,
            ..Default::default()
        };
        assert_eq!(
            newly_unlocked(&counters, []),
            vec!["first_client", "ten_clients"]
        );
    }

    #[test]
    fn already_unlocked_keys_are_skipped() {
        let counters = AchievementCounters {
            reports_authored: 3,
            usage_seconds: 40_000,
            ..Default::default()
        };
        assert_eq!(
            newly_unlocked(&counters, ["first_report"]),
            vec!["ten_hours"]
        );
    }

    #[test]
    fn progress_caps_at_threshold() {
        let rule = find_rule("ambassador").unwrap();
        let counters = AchievementCounters {
            converted_referrals: 2,
            ..Default::default()
        };
        assert_eq!(
            progress(rule, &counters),
            RuleProgress {
                current: 2,
                threshold: 5,
                percent: 40
            }
        );

        let counters = AchievementCounters {
            converted_referrals: 9,
            ..Default::default()
        };
        assert_eq!(progress(rule, &counters).percent, 100);
    }

    #[test]
    fn unknown_rule_is_none() {
        assert!(find_rule("nope").is_none());
    }
}
