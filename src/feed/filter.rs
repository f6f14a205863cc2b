use super::parse::Entry;

/// Entries chosen for one channel, plus what was left out and why
#[derive(Debug, Clone)]
pub struct Selection {
    /// Non-short entries in document order, at most `cap` of them
    pub entries: Vec<Entry>,
    /// Number of short-form entries excluded
    pub shorts_excluded: usize,
    /// Number of eligible entries dropped by the cap
    pub over_cap: usize,
}

/// Drop short-form entries, then keep the first `cap` of the rest
pub fn select_entries(entries: Vec<Entry>, cap: usize) -> Selection {
    let total = entries.len();
    let eligible: Vec<Entry> = entries.into_iter().filter(|e| !e.is_short()).collect();
    let shorts_excluded = total - eligible.len();
    let over_cap = eligible.len().saturating_sub(cap);

    Selection {
        entries: eligible.into_iter().take(cap).collect(),
        shorts_excluded,
        over_cap,
    }
}
