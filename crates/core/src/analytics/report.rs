//! Read-side reports over daily records: lifetime totals, practice
//! streaks, the dashboard summary, and the progress trend.

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::scoring::round_to;
use crate::types::{DailyRecord, PracticeSession};

/// Whole-history totals over a learner's daily records.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LifetimeTotals {
    pub lessons_completed: u32,
    pub practice_minutes: u32,
    pub attempts: u64,
    /// Highest single-day average score, 0 with no records
    pub best_daily_score: f64,
}

pub fn lifetime_totals(records: &[DailyRecord]) -> LifetimeTotals {
    LifetimeTotals {
        lessons_completed: records.iter().map(|r| r.lessons_completed).sum(),
        practice_minutes: records.iter().map(|r| r.practice_time_minutes).sum(),
        attempts: records.iter().map(|r| u64::from(r.total_attempts)).sum(),
        best_daily_score: records
            .iter()
            .map(|r| r.average_pronunciation_score)
            .fold(0.0, f64::max),
    }
}

/// Consecutive-day practice streak ending today.
///
/// Walks record dates newest-first and counts while the i-th date is
/// exactly i days before `today`, stopping at the first mismatch. A
/// learner with no record for today therefore has a streak of 0.
/// Dates are assumed unique and not in the future.
pub fn current_streak(records: &[DailyRecord], today: NaiveDate) -> u32 {
    let mut dates: Vec<NaiveDate> = records.iter().map(|r| r.date).collect();
    dates.sort_unstable_by(|a, b| b.cmp(a));

    let mut streak = 0;
    for (i, date) in dates.iter().enumerate() {
        let expected = match today.checked_sub_days(Days::new(i as u64)) {
            Some(d) => d,
            None => break,
        };
        if *date == expected {
            streak += 1;
        } else {
            break;
        }
    }
    streak
}

/// Summary block of the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DashboardSummary {
    pub total_practice_time_minutes: u32,
    pub total_lessons_completed: u32,
    pub total_attempts: u64,
    pub successful_attempts: u64,
    /// Percent of attempts that succeeded, 2 decimal places
    pub success_rate: f64,
    /// Attempt-weighted mean of the daily averages, 2 decimal places
    pub average_pronunciation_score: f64,
    /// Length of the requested window in days
    pub days_analyzed: u32,
}

/// Dashboard payload for one learner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dashboard {
    pub summary: DashboardSummary,
    /// Window records, oldest first
    pub daily: Vec<DailyRecord>,
    /// Most recently started sessions, newest first
    pub recent_sessions: Vec<PracticeSession>,
}

/// Summarize one window of daily records.
///
/// The average weighs each day's mean by its attempt count, so it
/// equals the plain mean over every attempt in the window.
pub fn dashboard_summary(daily: &[DailyRecord], days: u32) -> DashboardSummary {
    let total_attempts: u64 = daily.iter().map(|r| u64::from(r.total_attempts)).sum();
    let successful: u64 = daily.iter().map(|r| u64::from(r.successful_attempts)).sum();

    let average = if total_attempts > 0 {
        daily
            .iter()
            .map(|r| r.average_pronunciation_score * f64::from(r.total_attempts))
            .sum::<f64>()
            / total_attempts as f64
    } else {
        0.0
    };
    let success_rate = if total_attempts > 0 {
        successful as f64 / total_attempts as f64 * 100.0
    } else {
        0.0
    };

    DashboardSummary {
        total_practice_time_minutes: daily.iter().map(|r| r.practice_time_minutes).sum(),
        total_lessons_completed: daily.iter().map(|r| r.lessons_completed).sum(),
        total_attempts,
        successful_attempts: successful,
        success_rate: round_to(success_rate, 2),
        average_pronunciation_score: round_to(average, 2),
        days_analyzed: days,
    }
}

/// One day of the progress trend.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrendPoint {
    pub date: NaiveDate,
    /// That day's average pronunciation score
    pub pronunciation_score: f64,
    /// Percent of the day's attempts that succeeded, 2 decimal places
    pub success_rate: f64,
}

/// Score and success-rate trajectory over a date window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressTrend {
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    pub data: Vec<TrendPoint>,
}

pub fn progress_trend(records: &[DailyRecord], today: NaiveDate, days: u32) -> ProgressTrend {
    let in_window = window(records, today, days);
    let data = in_window
        .iter()
        .map(|r| {
            let rate = if r.total_attempts > 0 {
                f64::from(r.successful_attempts) / f64::from(r.total_attempts) * 100.0
            } else {
                0.0
            };
            TrendPoint {
                date: r.date,
                pronunciation_score: r.average_pronunciation_score,
                success_rate: round_to(rate, 2),
            }
        })
        .collect();

    ProgressTrend {
        period_start: window_start(today, days),
        period_end: today,
        data,
    }
}

/// Records dated within `[today - days, today]`, oldest first.
pub fn window(records: &[DailyRecord], today: NaiveDate, days: u32) -> Vec<DailyRecord> {
    let start = window_start(today, days);
    let mut out: Vec<DailyRecord> = records
        .iter()
        .filter(|r| r.date >= start && r.date <= today)
        .cloned()
        .collect();
    out.sort_by_key(|r| r.date);
    out
}

fn window_start(today: NaiveDate, days: u32) -> NaiveDate {
    today
        .checked_sub_days(Days::new(u64::from(days)))
        .unwrap_or(NaiveDate::MIN)
}
