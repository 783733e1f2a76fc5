//! Slot parsing and rendering.
//!
//! A slot container carries its available times as one comma-separated
//! `data-slots` attribute (`"09:00,09:30,10:00"`). Rendering turns that
//! attribute into one [`SlotControl`] per non-empty label, in the order
//! given.

/// A bookable time label.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Slot {
    label: String,
}

impl Slot {
    /// Creates a slot from a label, trimming surrounding whitespace.
    #[must_use]
    pub fn new(label: &str) -> Self {
        Self {
            label: label.trim().to_string(),
        }
    }

    /// The label exactly as it is sent in booking requests.
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// The label in 12-hour form for display.
    #[must_use]
    pub fn display_label(&self) -> String {
        format_time_label(&self.label)
    }
}

/// Splits a `data-slots` attribute into slots.
///
/// Entries that are empty or whitespace-only are discarded; the remaining
/// order is preserved.
#[must_use]
pub fn parse_slots(raw: &str) -> Vec<Slot> {
    raw.split(',')
        .filter(|entry| !entry.trim().is_empty())
        .map(Slot::new)
        .collect()
}

/// One rendered, activatable control for a slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotControl {
    position: usize,
    slot: Slot,
}

impl SlotControl {
    /// Zero-based position of the control within its container.
    #[must_use]
    pub const fn position(&self) -> usize {
        self.position
    }

    /// The slot this control books.
    #[must_use]
    pub const fn slot(&self) -> &Slot {
        &self.slot
    }

    /// Text shown on the control.
    #[must_use]
    pub fn text(&self) -> &str {
        self.slot.label()
    }
}

/// Renders a `data-slots` attribute into controls.
///
/// An absent attribute renders like an empty one: no controls.
#[must_use]
pub fn render_controls(raw: Option<&str>) -> Vec<SlotControl> {
    parse_slots(raw.unwrap_or_default())
        .into_iter()
        .enumerate()
        .map(|(position, slot)| SlotControl { position, slot })
        .collect()
}

/// Formats a 24-hour `HH:MM` label as `h:MM AM|PM`.
///
/// Labels that already carry an AM/PM marker, or that do not parse as
/// `HH:MM`, are returned unchanged.
#[must_use]
pub fn format_time_label(label: &str) -> String {
    let upper = label.to_ascii_uppercase();
    if upper.contains("AM") || upper.contains("PM") {
        return label.to_string();
    }
    let Some((hour, minute)) = label.trim().split_once(':') else {
        return label.to_string();
    };
    let (Ok(hour), Ok(minute)) = (hour.parse::<u32>(), minute.parse::<u32>()) else {
        return label.to_string();
    };
    if hour > 23 || minute > 59 {
        return label.to_string();
    }
    let meridiem = if hour >= 12 { "PM" } else { "AM" };
    let hour = match hour % 12 {
        0 => 12,
        h => h,
    };
    format!("{hour}:{minute:02} {meridiem}")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(raw: &str) -> Vec<String> {
        parse_slots(raw)
            .iter()
            .map(|s| s.label().to_string())
            .collect()
    }

    #[test]
    fn separators_and_whitespace_only_yield_nothing() {
        for raw in ["", ",", " , ,", "\t,\n, ", ",,,,"] {
            assert!(parse_slots(raw).is_empty(), "input {raw:?}");
            assert!(render_controls(Some(raw)).is_empty(), "input {raw:?}");
        }
    }

    #[test]
    fn absent_attribute_renders_nothing() {
        assert!(render_controls(None).is_empty());
    }

    #[test]
    fn order_and_count_follow_non_empty_entries() {
        assert_eq!(
            labels("09:00,09:30,,10:00, ,11:15"),
            vec!["09:00", "09:30", "10:00", "11:15"]
        );
    }

    #[test]
    fn labels_are_trimmed() {
        assert_eq!(labels(" 09:00 ,\t10:30"), vec!["09:00", "10:30"]);
    }

    #[test]
    fn duplicates_are_kept() {
        assert_eq!(labels("09:00,09:00"), vec!["09:00", "09:00"]);
    }

    #[test]
    fn controls_are_numbered_in_input_order() {
        let controls = render_controls(Some("14:00,08:00"));
        let rendered: Vec<(usize, &str)> =
            controls.iter().map(|c| (c.position(), c.text())).collect();
        assert_eq!(rendered, vec![(0, "14:00"), (1, "08:00")]);
    }

    #[test]
    fn formats_twenty_four_hour_labels() {
        assert_eq!(format_time_label("00:05"), "12:05 AM");
        assert_eq!(format_time_label("09:30"), "9:30 AM");
        assert_eq!(format_time_label("12:00"), "12:00 PM");
        assert_eq!(format_time_label("23:45"), "11:45 PM");
    }

    #[test]
    fn leaves_other_labels_alone() {
        assert_eq!(format_time_label("9:30 am"), "9:30 am");
        assert_eq!(format_time_label("noon"), "noon");
        assert_eq!(format_time_label("25:00"), "25:00");
    }

    #[test]
    fn slot_display_label_uses_twelve_hour_form() {
        assert_eq!(Slot::new(" 15:00 ").display_label(), "3:00 PM");
    }
}
