//! Picking the events that belong to a day, and ordering them.

use crate::event::Event;
use crate::timestamp::DayWindow;

/// An event touches the window if either end falls strictly inside it.
///
/// An event spanning the whole day (starting before midnight and ending after
/// 23:59:59) does not touch it.
pub fn touches(event: &Event, window: &DayWindow) -> bool {
    window.contains(&event.dtstart) || window.contains(&event.dtend)
}

/// Keep the items whose event touches `window`, ordered by start time.
///
/// Items with equal start times keep their input order.
pub fn select_day<T, I>(items: I, window: &DayWindow) -> Vec<T>
where
    T: AsRef<Event>,
    I: IntoIterator<Item = T>,
{
    let mut selected: Vec<T> = items
        .into_iter()
        .filter(|item| touches(item.as_ref(), window))
        .collect();
    sort_by_start(&mut selected);
    selected
}

/// Stable ascending sort on `dtstart`.
pub fn sort_by_start<T: AsRef<Event>>(items: &mut [T]) {
    items.sort_by_key(|item| item.as_ref().dtstart.to_local());
}

impl AsRef<Event> for Event {
    fn as_ref(&self) -> &Event {
        self
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::slice::Slice;
    use crate::timestamp::Timestamp;

    fn event(start: &str, end: &str) -> Event {
        Event {
            dtstart: Timestamp::parse(Slice::from(start)),
            dtend: Timestamp::parse(Slice::from(end)),
            ..Event::default()
        }
    }

    fn day(y: i32, m: u32, d: u32) -> DayWindow {
        DayWindow::for_date(NaiveDate::from_ymd_opt(y, m, d).unwrap())
    }

    #[test]
    fn test_event_selected_only_on_its_day() {
        let meeting = event("20240101T090000", "20240101T100000");

        assert!(touches(&meeting, &day(2024, 1, 1)));
        assert!(!touches(&meeting, &day(2024, 1, 2)));
    }

    #[test]
    fn test_overnight_event_touches_both_days() {
        let late = event("20240101T230000", "20240102T010000");

        assert!(touches(&late, &day(2024, 1, 1)));
        assert!(touches(&late, &day(2024, 1, 2)));
    }

    #[test]
    fn test_multi_day_event_misses_middle_day() {
        let trip = event("20240101T120000", "20240103T120000");

        assert!(!touches(&trip, &day(2024, 1, 2)));
    }

    #[test]
    fn test_midnight_boundaries_are_exclusive() {
        let all_day = event("20240101", "20240102");

        assert!(!touches(&all_day, &day(2024, 1, 1)));
        assert!(!touches(&all_day, &day(2024, 1, 2)));
    }

    #[test]
    fn test_select_day_sorts_stably() {
        let a = event("20240101T140000", "20240101T150000");
        let b = event("20240101T090000", "20240101T100000");
        let c = event("20240101T140000", "20240101T143000");
        let other_day = event("20240105T090000", "20240105T100000");

        let events = [a.clone(), b.clone(), other_day, c.clone()];
        let selected = select_day(events.iter().cloned(), &day(2024, 1, 1));

        assert_eq!(selected.len(), 3);
        assert_eq!(selected[0].dtstart, b.dtstart);
        assert_eq!(selected[1].dtend, a.dtend);
        assert_eq!(selected[2].dtend, c.dtend);
    }
}
