//! Milestone catalog evaluated over a learner's whole history.
//!
//! Nothing is persisted: every call re-derives the unlocked set from
//! the daily records, so the report can never disagree with them.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::analytics::report::{current_streak, lifetime_totals, LifetimeTotals};
use crate::scoring::round_to;
use crate::types::DailyRecord;

/// Stats a milestone predicate can see.
#[derive(Debug, Clone, Copy)]
pub struct ProgressSnapshot {
    pub totals: LifetimeTotals,
    pub streak_days: u32,
}

struct MilestoneDef {
    name: &'static str,
    description: &'static str,
    unlocked: fn(&ProgressSnapshot) -> bool,
}

/// The full catalog, thresholds inline in the predicates.
const CATALOG: &[MilestoneDef] = &[
    MilestoneDef {
        name: "First Steps",
        description: "Completed your first lesson",
        unlocked: |p| p.totals.lessons_completed >= 1,
    },
    MilestoneDef {
        name: "Learning Journey",
        description: "Completed 5 lessons",
        unlocked: |p| p.totals.lessons_completed >= 5,
    },
    MilestoneDef {
        name: "Dedicated Learner",
        description: "Completed 10 lessons",
        unlocked: |p| p.totals.lessons_completed >= 10,
    },
    MilestoneDef {
        name: "Practice Warrior",
        description: "Practiced for 1 hour",
        unlocked: |p| p.totals.practice_minutes >= 60,
    },
    MilestoneDef {
        name: "Time Master",
        description: "Practiced for 5 hours",
        unlocked: |p| p.totals.practice_minutes >= 300,
    },
    MilestoneDef {
        name: "Consistency King",
        description: "3-day practice streak",
        unlocked: |p| p.streak_days >= 3,
    },
    MilestoneDef {
        name: "Week Warrior",
        description: "7-day practice streak",
        unlocked: |p| p.streak_days >= 7,
    },
    MilestoneDef {
        name: "Excellence",
        description: "Scored 85+ average",
        unlocked: |p| p.totals.best_daily_score >= 85.0,
    },
    MilestoneDef {
        name: "Perfection",
        description: "Scored 95+ average",
        unlocked: |p| p.totals.best_daily_score >= 95.0,
    },
];

/// One unlocked milestone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Achievement {
    pub name: String,
    pub description: String,
    pub unlocked: bool,
}

/// Whole-history achievement report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AchievementReport {
    pub total_lessons_completed: u32,
    pub total_practice_minutes: u32,
    pub total_attempts: u64,
    /// 2 decimal places
    pub best_daily_score: f64,
    pub current_streak_days: u32,
    /// Unlocked milestones only, in catalog order
    pub achievements: Vec<Achievement>,
}

/// Evaluate the milestone catalog against all of a learner's records.
pub fn evaluate(records: &[DailyRecord], today: NaiveDate) -> AchievementReport {
    let totals = lifetime_totals(records);
    let snapshot = ProgressSnapshot {
        totals,
        streak_days: current_streak(records, today),
    };

    let achievements = CATALOG
        .iter()
        .filter(|def| (def.unlocked)(&snapshot))
        .map(|def| Achievement {
            name: def.name.to_string(),
            description: def.description.to_string(),
            unlocked: true,
        })
        .collect();

    AchievementReport {
        total_lessons_completed: totals.lessons_completed,
        total_practice_minutes: totals.practice_minutes,
        total_attempts: totals.attempts,
        best_daily_score: round_to(totals.best_daily_score, 2),
        current_streak_days: snapshot.streak_days,
        achievements,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn rec(date: NaiveDate, minutes: u32, lessons: u32, avg: f64) -> DailyRecord {
        DailyRecord {
            learner_id: Uuid::nil(),
            date,
            practice_time_minutes: minutes,
            lessons_completed: lessons,
            total_attempts: 3,
            successful_attempts: 2,
            average_pronunciation_score: avg,
        }
    }

    fn names(report: &AchievementReport) -> Vec<&str> {
        report.achievements.iter().map(|a| a.name.as_str()).collect()
    }

    #[test]
    fn test_new_learner_has_nothing() {
        let r = evaluate(&[], d(2025, 3, 10));
        assert!(r.achievements.is_empty());
        assert_eq!(r.total_lessons_completed, 0);
        assert_eq!(r.current_streak_days, 0);
        assert_eq!(r.best_daily_score, 0.0);
    }

    #[test]
    fn test_mid_journey_unlocks() {
        // 5 lessons, 45 minutes, best day 90, 4-day streak
        let today = d(2025, 3, 10);
        let records = vec![
            rec(d(2025, 3, 7), 10, 2, 70.0),
            rec(d(2025, 3, 8), 15, 1, 90.0),
            rec(d(2025, 3, 9), 10, 1, 60.0),
            rec(d(2025, 3, 10), 10, 1, 85.0),
        ];
        let r = evaluate(&records, today);
        assert_eq!(r.total_lessons_completed, 5);
        assert_eq!(r.total_practice_minutes, 45);
        assert_eq!(r.current_streak_days, 4);
        assert_eq!(r.best_daily_score, 90.0);
        assert_eq!(
            names(&r),
            vec!["First Steps", "Learning Journey", "Consistency King", "Excellence"]
        );
    }

    #[test]
    fn test_everything_unlocked_in_catalog_order() {
        let today = d(2025, 3, 10);
        let records: Vec<DailyRecord> = (0..7)
            .map(|i| rec(d(2025, 3, 10 - i), 50, 2, 95.5))
            .collect();
        let r = evaluate(&records, today);
        assert_eq!(r.current_streak_days, 7);
        assert_eq!(
            names(&r),
            vec![
                "First Steps",
                "Learning Journey",
                "Dedicated Learner",
                "Practice Warrior",
                "Time Master",
                "Consistency King",
                "Week Warrior",
                "Excellence",
                "Perfection",
            ]
        );
        assert!(r.achievements.iter().all(|a| a.unlocked));
    }

    #[test]
    fn test_best_score_is_rounded() {
        let r = evaluate(&[rec(d(2025, 3, 10), 5, 0, 88.8888)], d(2025, 3, 10));
        assert_eq!(r.best_daily_score, 88.89);
    }
}
