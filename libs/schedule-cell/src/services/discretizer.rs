use chrono::{Duration, NaiveDate, NaiveDateTime};

use crate::models::{AvailabilityWindow, BookableSlot};

const MS_PER_MINUTE: i64 = 60 * 1000;

/// Convert coarse availability windows into discrete, back-to-back bookable
/// slots of exactly `service_duration_minutes` each.
///
/// The window timestamps carry the server's idea of the date; only their
/// time-of-day component is trusted. Each window is spliced onto the
/// caller-supplied `date` before any arithmetic, so a date rollover between
/// client and server clocks cannot shift slots onto the wrong day.
///
/// All duration arithmetic happens in milliseconds. A window too short for
/// one appointment yields nothing; the remainder after the last full slot is
/// dropped, never rounded up. Windows are processed independently and their
/// slots are concatenated in input order - adjacent windows are not merged.
pub fn derive_slots(
    windows: &[AvailabilityWindow],
    service_duration_minutes: i64,
    date: NaiveDate,
) -> Vec<BookableSlot> {
    let service_ms = service_duration_minutes * MS_PER_MINUTE;
    if service_ms <= 0 {
        return Vec::new();
    }

    let mut slots = Vec::new();

    for window in windows {
        let window_start = date.and_time(window.start.time());
        let window_end = date.and_time(window.end.time());

        let available_ms = (window_end - window_start).num_milliseconds();
        if available_ms < service_ms {
            continue;
        }

        let slot_count = available_ms / service_ms;

        for i in 0..slot_count {
            let start = window_start + Duration::milliseconds(i * service_ms);
            let end = start + Duration::milliseconds(service_ms);

            // Rounding guard: a slot must never run past its window.
            if end > window_end {
                break;
            }

            slots.push(BookableSlot {
                start,
                end,
                display_label: display_label(start, end),
            });
        }
    }

    slots
}

/// Service duration for a fetch result: the first window's first service
/// entry, falling back to the platform default.
pub fn service_duration_or_default(windows: &[AvailabilityWindow], default_minutes: i64) -> i64 {
    windows
        .first()
        .and_then(|w| w.service_duration_minutes())
        .unwrap_or(default_minutes)
}

fn display_label(start: NaiveDateTime, end: NaiveDateTime) -> String {
    format!("{} - {}", start.format("%H:%M"), end.format("%H:%M"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::WindowService;
    use chrono::NaiveDate;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 10).unwrap()
    }

    fn dt(value: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S").unwrap()
    }

    fn window(start: &str, end: &str) -> AvailabilityWindow {
        AvailabilityWindow {
            start: dt(&format!("2025-03-10 {}", start)),
            end: dt(&format!("2025-03-10 {}", end)),
            services: vec![],
        }
    }

    #[test]
    fn slot_count_is_floor_of_window_over_duration() {
        // 09:30-17:00 is 450 minutes; seven 60-minute slots fit, the
        // trailing half hour is dropped.
        let slots = derive_slots(&[window("09:30:00", "17:00:00")], 60, date());

        assert_eq!(slots.len(), 7);
        assert_eq!(slots[0].start.to_string(), "2025-03-10 09:30:00");
        assert_eq!(slots[6].end.to_string(), "2025-03-10 16:30:00");
    }

    #[test]
    fn window_shorter_than_service_yields_nothing() {
        let slots = derive_slots(&[window("09:00:00", "09:45:00")], 60, date());
        assert!(slots.is_empty());
    }

    #[test]
    fn slots_within_a_window_are_contiguous() {
        let slots = derive_slots(&[window("08:00:00", "12:00:00")], 45, date());

        for pair in slots.windows(2) {
            assert_eq!(pair[0].end, pair[1].start);
        }
    }

    #[test]
    fn no_slot_runs_past_its_window() {
        let windows = [window("09:00:00", "11:10:00"), window("13:00:00", "14:50:00")];
        let slots = derive_slots(&windows, 25, date());

        let first_end = date().and_time("11:10:00".parse().unwrap());
        let second_start = date().and_time("13:00:00".parse().unwrap());
        for slot in &slots {
            assert!(slot.end <= first_end || slot.start >= second_start);
        }
    }

    #[test]
    fn windows_are_never_merged() {
        // 09:00-11:00 and 14:00-15:30 at 30 minutes: 4 + 3 slots, in window
        // order, none crossing the gap.
        let windows = [window("09:00:00", "11:00:00"), window("14:00:00", "15:30:00")];
        let slots = derive_slots(&windows, 30, date());

        assert_eq!(slots.len(), 7);
        assert_eq!(slots[3].end.to_string(), "2025-03-10 11:00:00");
        assert_eq!(slots[4].start.to_string(), "2025-03-10 14:00:00");
    }

    #[test]
    fn window_times_are_spliced_onto_the_requested_date() {
        // Server reports the window under a different calendar date; the
        // requested date wins.
        let rolled = AvailabilityWindow {
            start: dt("2025-03-09 10:00:00"),
            end: dt("2025-03-09 12:00:00"),
            services: vec![],
        };
        let slots = derive_slots(&[rolled], 60, date());

        assert_eq!(slots[0].start.to_string(), "2025-03-10 10:00:00");
    }

    #[test]
    fn derivation_is_pure() {
        let windows = [window("09:00:00", "17:00:00")];
        assert_eq!(
            derive_slots(&windows, 30, date()),
            derive_slots(&windows, 30, date())
        );
    }

    #[test]
    fn labels_use_short_local_times() {
        let slots = derive_slots(&[window("09:30:00", "10:30:00")], 60, date());
        assert_eq!(slots[0].display_label, "09:30 - 10:30");
    }

    #[test]
    fn duration_defaults_when_no_window_advertises_one() {
        assert_eq!(service_duration_or_default(&[], 60), 60);

        let advertised = AvailabilityWindow {
            start: dt("2025-03-10 09:00:00"),
            end: dt("2025-03-10 12:00:00"),
            services: vec![WindowService { duration_minutes: 20 }],
        };
        assert_eq!(service_duration_or_default(&[advertised], 60), 20);
    }
}
