//! Deterministic ordering of events within a session.

use std::cmp::Ordering;

use crate::event::Event;
use crate::types::AchievementId;

/// Compares two events for display order.
///
/// Events sort by timestamp. At equal timestamps a rich presence snapshot
/// goes after everything else, and remaining ties sort by achievement id
/// (events without one count as id 0).
pub fn compare_events(a: &Event, b: &Event) -> Ordering {
    a.at.cmp(&b.at)
        .then_with(|| a.is_rich_presence().cmp(&b.is_rich_presence()))
        .then_with(|| sort_id(a).cmp(&sort_id(b)))
}

fn sort_id(event: &Event) -> u32 {
    event.achievement_id().map_or(0, AchievementId::get)
}

/// Sorts events in place. Stable, so fully tied events keep insertion order.
pub fn order_events(events: &mut [Event]) {
    events.sort_by(compare_events);
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Duration, TimeZone, Utc};

    use crate::event::{AchievementDisplay, EventKind, Unlock};

    fn ts(minutes: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 2, 10, 0, 0)
            .single()
            .expect("valid test timestamp")
            + Duration::minutes(minutes)
    }

    fn unlock(at: DateTime<Utc>, id: u32) -> Event {
        Event::unlock(
            at,
            Unlock {
                achievement_id: AchievementId::new(id).unwrap(),
                hardcore: true,
                hardcore_later: false,
                unlocker: None,
                achievement: AchievementDisplay::default(),
            },
        )
    }

    fn ids(events: &[Event]) -> Vec<u32> {
        events.iter().map(sort_id).collect()
    }

    #[test]
    fn test_orders_by_timestamp() {
        let mut events = vec![unlock(ts(5), 1), unlock(ts(1), 2), unlock(ts(3), 3)];
        order_events(&mut events);

        assert_eq!(ids(&events), vec![2, 3, 1]);
    }

    #[test]
    fn test_rich_presence_sorts_after_ties() {
        let mut events = vec![
            Event::rich_presence(ts(2), "Level 3"),
            unlock(ts(2), 9),
            Event::custom(ts(2), "Reset", ""),
        ];
        order_events(&mut events);

        assert!(matches!(events[0].kind, EventKind::Custom { .. }));
        assert_eq!(events[1].achievement_id().map(AchievementId::get), Some(9));
        assert!(events[2].is_rich_presence());
    }

    #[test]
    fn test_ties_break_by_achievement_id() {
        let mut events = vec![unlock(ts(0), 30), unlock(ts(0), 4), unlock(ts(0), 12)];
        order_events(&mut events);

        assert_eq!(ids(&events), vec![4, 12, 30]);
    }

    #[test]
    fn test_ordering_independent_of_insertion_order() {
        let mut forward = vec![
            unlock(ts(1), 2),
            unlock(ts(1), 1),
            Event::rich_presence(ts(1), "Map"),
            unlock(ts(0), 7),
        ];
        let mut reversed: Vec<Event> = forward.iter().rev().cloned().collect();

        order_events(&mut forward);
        order_events(&mut reversed);

        assert_eq!(forward, reversed);
    }
}
