// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Prayer point calculation.
//!
//! Pure functions: (prayer name, local time of day) -> points. Every
//! completion earns the base award; a speed bonus is added depending on
//! where the time falls inside the prayer's fixed window.

use crate::models::PrayerPoints;
use crate::time_utils::hour_fraction;
use chrono::NaiveTime;

/// Base points for any successful prayer completion.
pub const PRAYER_BASE_POINTS: u32 = 20;
/// Bonus for completing within 15 minutes of the optimal time.
pub const SPEED_BONUS_POINTS: u32 = 10;
/// Bonus for completing between window start and the optimal time.
pub const ON_TIME_BONUS: u32 = 5;

/// Bonus window for one prayer, in fractional hours on a 24h clock.
struct BonusWindow {
    start: f64,
    optimal: f64,
    end: f64,
}

/// Fixed per-prayer windows: [start, optimal, end].
fn bonus_window(prayer_name: &str) -> Option<BonusWindow> {
    let (start, optimal, end) = match prayer_name {
        "Fajr" => (4.5, 5.5, 6.5),      // 4:30 - 6:30 AM, optimal 5:30
        "Dhuhr" => (12.0, 12.5, 14.0),  // 12:00 - 2:00 PM, optimal 12:30
        "Asr" => (15.0, 15.5, 17.0),    // 3:00 - 5:00 PM, optimal 3:30
        "Maghrib" => (18.0, 18.25, 19.0), // 6:00 - 7:00 PM, optimal 6:15
        "Isha" => (20.0, 20.5, 22.0),   // 8:00 - 10:00 PM, optimal 8:30
        _ => return None,
    };
    Some(BonusWindow {
        start,
        optimal,
        end,
    })
}

/// Speed bonus for completing a prayer at a given local time.
///
/// An unrecognized prayer name earns no bonus rather than failing; callers
/// that want to reject unknown prayers validate the name at the boundary.
pub fn speed_bonus(prayer_name: &str, completion_time: NaiveTime) -> u32 {
    let Some(window) = bonus_window(prayer_name) else {
        return 0;
    };

    let current = hour_fraction(completion_time);

    // Within 15 minutes of optimal
    if (current - window.optimal).abs() <= 0.25 {
        SPEED_BONUS_POINTS
    } else if current >= window.start && current <= window.optimal {
        ON_TIME_BONUS
    } else if current > window.optimal && current <= window.end {
        ON_TIME_BONUS / 2
    } else {
        0
    }
}

/// Points for a prayer completed at a given local time.
pub fn calculate_points(prayer_name: &str, completion_time: NaiveTime) -> PrayerPoints {
    let base = PRAYER_BASE_POINTS;
    let bonus = speed_bonus(prayer_name, completion_time);

    PrayerPoints {
        base,
        speed_bonus: bonus,
        total: base + bonus,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Prayer;

    fn at(hour: u32, minute: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(hour, minute, 0).unwrap()
    }

    #[test]
    fn test_fajr_window_edges() {
        // Optimal (05:30) -> max bonus
        assert_eq!(calculate_points("Fajr", at(5, 30)).total, 30);
        // Early in window (04:45) -> on-time bonus
        assert_eq!(calculate_points("Fajr", at(4, 45)).total, 25);
        // After optimal (06:00) -> half on-time bonus, floored
        assert_eq!(calculate_points("Fajr", at(6, 0)).total, 22);
        // Outside window (03:00) -> base only
        assert_eq!(calculate_points("Fajr", at(3, 0)).total, 20);
    }

    #[test]
    fn test_optimal_band_is_inclusive() {
        // 15 minutes either side of optimal still earns the max bonus
        assert_eq!(speed_bonus("Fajr", at(5, 15)), SPEED_BONUS_POINTS);
        assert_eq!(speed_bonus("Fajr", at(5, 45)), SPEED_BONUS_POINTS);
        // 16 minutes past falls into the late band
        assert_eq!(speed_bonus("Fajr", at(5, 46)), ON_TIME_BONUS / 2);
    }

    #[test]
    fn test_maghrib_quarter_hour_optimal() {
        assert_eq!(speed_bonus("Maghrib", at(18, 15)), SPEED_BONUS_POINTS);
        assert_eq!(speed_bonus("Maghrib", at(18, 45)), ON_TIME_BONUS / 2);
        assert_eq!(speed_bonus("Maghrib", at(19, 30)), 0);
    }

    #[test]
    fn test_bonus_bounds_for_all_prayers() {
        for prayer in Prayer::ALL {
            for hour in 0..24 {
                for minute in [0, 15, 30, 45] {
                    let points = calculate_points(prayer.as_str(), at(hour, minute));
                    assert!(points.speed_bonus <= SPEED_BONUS_POINTS);
                    assert_eq!(points.base, PRAYER_BASE_POINTS);
                    assert_eq!(points.total, points.base + points.speed_bonus);
                }
            }
        }
    }

    #[test]
    fn test_unknown_prayer_earns_no_bonus() {
        let points = calculate_points("Tahajjud", at(3, 0));
        assert_eq!(points.speed_bonus, 0);
        assert_eq!(points.total, PRAYER_BASE_POINTS);
    }

    #[test]
    fn test_all_prayers_at_optimal_sum_to_150() {
        let optimal_times = [
            ("Fajr", at(5, 30)),
            ("Dhuhr", at(12, 30)),
            ("Asr", at(15, 30)),
            ("Maghrib", at(18, 15)),
            ("Isha", at(20, 30)),
        ];

        let total: u32 = optimal_times
            .iter()
            .map(|(name, time)| calculate_points(name, *time).total)
            .sum();

        assert_eq!(total, 150);
    }
}
