use std::ops::Range;

/// A [`Location`] is a half-open byte range `[start_offset, end_offset)` into the source text a
/// tree was parsed from. An invariant to be maintained is that `start_offset <= end_offset`. It
/// is typically the case that your code has logic bugs if this invariant is violated.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Location {
    pub start_offset: usize,
    pub end_offset: usize,
}

impl Location {
    /// Construct a new location. Will panic if `start_offset > end_offset`. Prefer this
    /// constructor to construct a new [`Location`] over using direct struct initialization.
    pub const fn new(start_offset: usize, end_offset: usize) -> Self {
        assert!(
            start_offset <= end_offset,
            "`start_offset` must not be larger than `end_offset`"
        );
        Location {
            start_offset,
            end_offset,
        }
    }

    /// An empty location sitting at `offset`, e.g. for end-of-input.
    pub const fn empty(offset: usize) -> Self {
        Location::new(offset, offset)
    }

    /// The location spanning from the start of `self` to the end of `other`. `other` is expected
    /// to come after `self`; this is not checked.
    pub const fn to(self, other: Location) -> Self {
        Location {
            start_offset: self.start_offset,
            end_offset: other.end_offset,
        }
    }

    pub const fn to_range(self) -> Range<usize> {
        self.start_offset..self.end_offset
    }

    pub const fn len(self) -> usize {
        self.end_offset - self.start_offset
    }

    pub const fn is_empty(self) -> bool {
        self.start_offset == self.end_offset
    }

    /// Whether `other` lies entirely within `self`.
    pub const fn contains(self, other: Location) -> bool {
        self.start_offset <= other.start_offset && other.end_offset <= self.end_offset
    }
}

impl From<Location> for Range<usize> {
    fn from(location: Location) -> Self {
        location.to_range()
    }
}

#[cfg(test)]
mod tests {
    use super::Location;

    #[test]
    fn to_spans_both_locations() {
        let open = Location::new(0, 1);
        let close = Location::new(7, 8);
        assert_eq!(open.to(close), Location::new(0, 8));
    }

    #[test]
    fn contains_is_inclusive_of_edges() {
        let outer = Location::new(2, 10);
        assert!(outer.contains(Location::new(2, 10)));
        assert!(outer.contains(Location::new(3, 4)));
        assert!(!outer.contains(Location::new(1, 4)));
        assert!(!outer.contains(Location::new(9, 11)));
    }

    #[test]
    fn empty_location_has_no_length() {
        let eoi = Location::empty(5);
        assert!(eoi.is_empty());
        assert_eq!(eoi.len(), 0);
        assert_eq!(eoi.to_range(), 5..5);
    }

    #[test]
    #[should_panic(expected = "must not be larger")]
    fn inverted_location_panics() {
        let _ = Location::new(3, 2);
    }
}
