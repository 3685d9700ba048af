//! Delimiter scanning within a single text run.

use super::state::BlockMode;

/// A delimiter occurrence. Ordering of the variants is the tie-break
/// priority when two markers start at the same offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Marker {
    DoubleDollar,
    Dollar,
    Fence,
}

impl Marker {
    pub(crate) fn token(self) -> &'static str {
        match self {
            Marker::DoubleDollar => "$$",
            Marker::Dollar => "$",
            Marker::Fence => "```",
        }
    }

    pub(crate) fn mode(self) -> BlockMode {
        match self {
            Marker::DoubleDollar => BlockMode::DisplayMath,
            Marker::Dollar => BlockMode::InlineMath,
            Marker::Fence => BlockMode::Code,
        }
    }
}

/// Find the earliest delimiter at or after `from`. On equal offsets `$$`
/// beats `$` beats ``` (a doubled dollar always ties with its own first
/// dollar, so the tie-break is what routes it to display math).
pub(crate) fn find_marker(text: &str, from: usize) -> Option<(usize, Marker)> {
    let hay = &text[from..];
    let mut best: Option<(usize, Marker)> = None;
    for marker in [Marker::DoubleDollar, Marker::Dollar, Marker::Fence] {
        if let Some(i) = hay.find(marker.token()) {
            let at = from + i;
            if best.is_none_or(|(b, _)| at < b) {
                best = Some((at, marker));
            }
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn double_dollar_wins_ties() {
        assert_eq!(find_marker("a $$x", 0), Some((2, Marker::DoubleDollar)));
    }

    #[test]
    fn earliest_marker_wins() {
        assert_eq!(find_marker("$a ```b", 0), Some((0, Marker::Dollar)));
        assert_eq!(find_marker("a ``` $b", 0), Some((2, Marker::Fence)));
    }

    #[test]
    fn search_start_is_respected() {
        assert_eq!(find_marker("$a $b", 1), Some((3, Marker::Dollar)));
        assert_eq!(find_marker("no markers", 0), None);
    }
}
