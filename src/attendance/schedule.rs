use super::state::Slot;

/// Slot labels used when `ATTENDANCE_SLOTS` is not set.
pub const DEFAULT_SLOTS: [&str; 6] = [
    "08h30 - 10h00",
    "10h - 11h30",
    "13h00 - 14h30",
    "14h30 - 16h00",
    "16h00 - 17h30",
    "17h30 - 19h",
];

/// The day's fixed time ranges, one grid column each.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schedule {
    labels: Vec<String>,
}

impl Default for Schedule {
    fn default() -> Self {
        Self {
            labels: DEFAULT_SLOTS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl Schedule {
    /// Returns `None` for an empty label list.
    pub fn new(labels: Vec<String>) -> Option<Self> {
        if labels.is_empty() {
            None
        } else {
            Some(Self { labels })
        }
    }

    /// Parse a comma-separated label list, trimming blanks.
    pub fn from_csv(csv: &str) -> Option<Self> {
        let labels = csv
            .split(',')
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect();
        Self::new(labels)
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn contains(&self, slot: Slot) -> bool {
        slot < self.labels.len()
    }

    pub fn label(&self, slot: Slot) -> Option<&str> {
        self.labels.get(slot).map(String::as_str)
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_has_six_slots() {
        let s = Schedule::default();
        assert_eq!(s.len(), 6);
        assert_eq!(s.label(0), Some("08h30 - 10h00"));
        assert_eq!(s.label(5), Some("17h30 - 19h"));
        assert!(s.contains(5));
        assert!(!s.contains(6));
    }

    #[test]
    fn from_csv_trims_and_skips_blanks() {
        let s = Schedule::from_csv(" 08h-10h , ,10h-12h,").unwrap();
        assert_eq!(s.labels(), &["08h-10h".to_string(), "10h-12h".to_string()]);
    }

    #[test]
    fn empty_csv_is_rejected() {
        assert!(Schedule::from_csv(" , ").is_none());
    }
}
