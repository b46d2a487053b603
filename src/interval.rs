//! Closed integer intervals and canonical interval sets.
//!
//! Transition labels are subsets of the full `i64` alphabet, represented
//! compactly as sorted, maximally-merged lists of closed ranges:
//!
//! - `Interval`: a closed range `[min, max]` of symbols
//! - `IntervalSet`: a sorted set of disjoint, non-adjacent intervals
//!
//! `IntervalSet::disjunction` computes the Boolean-algebra atoms of a
//! collection of overlapping ranges; subset construction branches on those
//! atoms instead of on individual integers, which is what makes an unbounded
//! alphabet tractable.

use std::fmt;

use smallvec::SmallVec;

use crate::AutomatonError;

/// A symbol of the automaton alphabet.
pub type Symbol = i64;

/// A closed interval `[min, max]` of symbols, with `min <= max`.
///
/// The two extreme `i64` values are reserved sentinels standing for
/// unbounded-below and unbounded-above; `Display` renders them as `-∞`/`∞`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Interval {
    min: Symbol,
    max: Symbol,
}

impl Interval {
    /// Sentinel standing for "unbounded below".
    pub const MIN_SENTINEL: Symbol = Symbol::MIN;

    /// Sentinel standing for "unbounded above".
    pub const MAX_SENTINEL: Symbol = Symbol::MAX;

    /// The full alphabet.
    pub const FULL: Interval = Interval {
        min: Self::MIN_SENTINEL,
        max: Self::MAX_SENTINEL,
    };

    /// Create a new interval. Rejects `min > max`: a reversed pair is a
    /// caller bug, not something to silently repair.
    pub fn new(min: Symbol, max: Symbol) -> Result<Self, AutomatonError> {
        if min > max {
            return Err(AutomatonError::InvalidRange { min, max });
        }
        Ok(Interval { min, max })
    }

    /// Degenerate interval holding a single symbol.
    pub fn point(value: Symbol) -> Self {
        Interval {
            min: value,
            max: value,
        }
    }

    /// Internal constructor for call sites that already hold the invariant.
    pub(crate) fn raw(min: Symbol, max: Symbol) -> Self {
        debug_assert!(min <= max);
        Interval { min, max }
    }

    /// Lower bound (inclusive).
    #[inline]
    pub fn min(&self) -> Symbol {
        self.min
    }

    /// Upper bound (inclusive).
    #[inline]
    pub fn max(&self) -> Symbol {
        self.max
    }

    /// Whether `value` lies inside this interval.
    #[inline]
    pub fn contains(&self, value: Symbol) -> bool {
        value >= self.min && value <= self.max
    }

    /// Whether `other` is entirely inside this interval.
    pub fn contains_interval(&self, other: &Interval) -> bool {
        self.min <= other.min && other.max <= self.max
    }

    /// Whether the two intervals share at least one symbol.
    #[inline]
    pub fn intersects(&self, other: &Interval) -> bool {
        !(self.max < other.min || other.max < self.min)
    }

    /// Whether `other` overlaps this interval or touches it with no gap.
    /// Adjacency is computed in `i128` so the sentinels cannot overflow.
    #[inline]
    pub(crate) fn touches(&self, other: &Interval) -> bool {
        self.min as i128 <= other.max as i128 + 1 && other.min as i128 <= self.max as i128 + 1
    }

    /// Intersection of two intervals, `None` when they are disjoint.
    pub fn intersection(&self, other: &Interval) -> Option<Interval> {
        if !self.intersects(other) {
            return None;
        }
        Some(Interval::raw(
            self.min.max(other.min),
            self.max.min(other.max),
        ))
    }

    /// Complement of this interval in the full alphabet: zero, one, or two
    /// intervals depending on which bounds sit at a sentinel.
    pub fn complement(&self) -> SmallVec<[Interval; 2]> {
        let mut out = SmallVec::new();
        if self.min != Self::MIN_SENTINEL {
            out.push(Interval::raw(Self::MIN_SENTINEL, self.min - 1));
        }
        if self.max != Self::MAX_SENTINEL {
            out.push(Interval::raw(self.max + 1, Self::MAX_SENTINEL));
        }
        out
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn bound(v: Symbol) -> String {
            if v == Interval::MIN_SENTINEL {
                "-\u{221e}".to_string()
            } else if v == Interval::MAX_SENTINEL {
                "\u{221e}".to_string()
            } else {
                v.to_string()
            }
        }
        if self.min == self.max {
            write!(f, "[{}]", bound(self.min))
        } else {
            write!(f, "[{},{}]", bound(self.min), bound(self.max))
        }
    }
}

/// A subset of the alphabet as a sorted list of disjoint, non-adjacent
/// intervals.
///
/// The canonical form is maintained on every insertion: an added range
/// absorbs every stored range it overlaps or touches, so no two stored
/// ranges can ever be merged further, and any symbol is covered by at most
/// one stored range.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct IntervalSet {
    ranges: Vec<Interval>,
}

impl IntervalSet {
    /// The empty set.
    pub fn new() -> Self {
        IntervalSet { ranges: Vec::new() }
    }

    /// The full alphabet as a one-interval set.
    pub fn universe() -> Self {
        IntervalSet {
            ranges: vec![Interval::FULL],
        }
    }

    /// Build a set from unsorted symbol values, compressing runs of
    /// consecutive values into intervals.
    pub fn from_values(values: &[Symbol]) -> Self {
        let mut sorted = values.to_vec();
        sorted.sort_unstable();
        sorted.dedup();
        let mut set = IntervalSet::new();
        let mut run: Option<Interval> = None;
        for &v in &sorted {
            match run {
                Some(ref mut r) if v as i128 == r.max as i128 + 1 => r.max = v,
                Some(r) => {
                    set.add(r);
                    run = Some(Interval::point(v));
                }
                None => run = Some(Interval::point(v)),
            }
        }
        if let Some(r) = run {
            set.add(r);
        }
        set
    }

    /// Number of stored intervals (not symbols).
    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    /// Whether the set holds no symbol at all.
    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    /// Iterate over the stored intervals in ascending order.
    pub fn iter(&self) -> std::slice::Iter<'_, Interval> {
        self.ranges.iter()
    }

    /// Insert a single symbol. Returns `true` if the set changed.
    pub fn add_value(&mut self, value: Symbol) -> bool {
        self.add(Interval::point(value))
    }

    /// Insert an interval, merging with every stored range it overlaps or
    /// touches. A merge can cascade: once a neighbor is absorbed the grown
    /// range may now touch the next neighbor too, which is absorbed in the
    /// same pass. Returns `true` if the set changed.
    pub fn add(&mut self, interval: Interval) -> bool {
        // First stored range that could overlap or touch the new one.
        let start = self
            .ranges
            .partition_point(|r| (r.max as i128) < interval.min as i128 - 1);
        let mut end = start;
        let mut merged = interval;
        while end < self.ranges.len() && self.ranges[end].touches(&merged) {
            merged = Interval::raw(
                merged.min.min(self.ranges[end].min),
                merged.max.max(self.ranges[end].max),
            );
            end += 1;
        }
        if end == start {
            self.ranges.insert(start, merged);
            return true;
        }
        if end - start == 1 && self.ranges[start].contains_interval(&interval) {
            return false;
        }
        self.ranges.splice(start..end, std::iter::once(merged));
        true
    }

    /// Insert every interval of another set. Returns `true` if this set
    /// changed.
    pub fn add_set(&mut self, other: &IntervalSet) -> bool {
        let mut changed = false;
        for r in &other.ranges {
            changed |= self.add(*r);
        }
        changed
    }

    /// Remove every symbol of `other` from this set, implemented as
    /// intersection with the complement of the operand.
    pub fn remove(&mut self, other: &IntervalSet) {
        *self = self.intersection(&other.complement());
    }

    /// Whether `value` belongs to the set.
    pub fn contains(&self, value: Symbol) -> bool {
        let idx = self.ranges.partition_point(|r| r.max < value);
        idx < self.ranges.len() && self.ranges[idx].contains(value)
    }

    /// Whether the two sets share at least one symbol.
    pub fn intersects(&self, other: &IntervalSet) -> bool {
        let (mut i, mut j) = (0, 0);
        while i < self.ranges.len() && j < other.ranges.len() {
            if self.ranges[i].intersects(&other.ranges[j]) {
                return true;
            }
            if self.ranges[i].max < other.ranges[j].max {
                i += 1;
            } else {
                j += 1;
            }
        }
        false
    }

    /// Whether any stored range overlaps the given interval.
    pub fn intersects_interval(&self, interval: &Interval) -> bool {
        let idx = self.ranges.partition_point(|r| r.max < interval.min);
        idx < self.ranges.len() && self.ranges[idx].intersects(interval)
    }

    /// Intersection of two sets: pairwise range intersections re-inserted
    /// into a fresh set. Quadratic in the number of stored ranges, which are
    /// alphabet atoms, not symbols.
    pub fn intersection(&self, other: &IntervalSet) -> IntervalSet {
        let mut out = IntervalSet::new();
        for a in &self.ranges {
            for b in &other.ranges {
                if let Some(i) = a.intersection(b) {
                    out.add(i);
                }
            }
        }
        out
    }

    /// Complement with respect to the full alphabet: one pass over the
    /// sorted ranges emitting the gap before, between, and after them. The
    /// empty set complements to the universe.
    pub fn complement(&self) -> IntervalSet {
        let mut out = IntervalSet::new();
        if self.ranges.is_empty() {
            return IntervalSet::universe();
        }
        let mut next_min = Interval::MIN_SENTINEL;
        let mut open = true;
        for r in &self.ranges {
            if open && r.min != Interval::MIN_SENTINEL {
                out.add(Interval::raw(next_min, r.min - 1));
            }
            if r.max == Interval::MAX_SENTINEL {
                open = false;
            } else {
                next_min = r.max + 1;
                open = true;
            }
        }
        if open {
            out.add(Interval::raw(next_min, Interval::MAX_SENTINEL));
        }
        out
    }

    /// Union of this set with another, as a new set.
    pub fn union(&self, other: &IntervalSet) -> IntervalSet {
        let mut out = self.clone();
        out.add_set(other);
        out
    }

    /// This set minus every symbol of the given sets.
    pub fn minus(&self, others: &[&IntervalSet]) -> IntervalSet {
        let mut out = self.clone();
        for o in others {
            out = out.intersection(&o.complement());
        }
        out
    }

    /// Union of any number of sets.
    pub fn union_all<'a, I: IntoIterator<Item = &'a IntervalSet>>(sets: I) -> IntervalSet {
        let mut out = IntervalSet::new();
        for s in sets {
            out.add_set(s);
        }
        out
    }

    /// Intersection of any number of sets. An empty collection yields the
    /// empty set.
    pub fn intersection_all<'a, I: IntoIterator<Item = &'a IntervalSet>>(sets: I) -> IntervalSet {
        let mut iter = sets.into_iter();
        let Some(first) = iter.next() else {
            return IntervalSet::new();
        };
        let mut out = first.clone();
        for s in iter {
            out = out.intersection(s);
        }
        out
    }

    /// Compute the coarsest refinement of a collection of possibly
    /// overlapping ranges into pairwise-disjoint atoms, such that every
    /// input range is exactly a union of atoms.
    ///
    /// The rewrite loop looks for a pair of ranges that overlap without
    /// being equal, replaces the first with its intersection against the
    /// second plus its intersections with the pieces of the second's
    /// complement, and restarts. Each rewrite strictly reduces the total
    /// overlap, so the loop terminates; worst case is quadratic in the
    /// number of seed ranges.
    pub fn disjunction(ranges: &[Interval]) -> Vec<Interval> {
        let mut stack: Vec<Interval> = ranges.to_vec();
        stack.sort_unstable();
        stack.dedup();

        'scan: loop {
            for idx in 0..stack.len() {
                let cur = stack[idx];
                for other_idx in 0..stack.len() {
                    if other_idx == idx {
                        continue;
                    }
                    let other = stack[other_idx];
                    let Some(inter) = cur.intersection(&other) else {
                        continue;
                    };
                    if inter == cur {
                        continue;
                    }
                    // Punch a hole: cur is replaced by the overlapping part
                    // plus whatever of cur lies outside `other`.
                    stack.remove(idx);
                    let mut pieces: Vec<Interval> = vec![inter];
                    for comp in other.complement() {
                        if let Some(p) = cur.intersection(&comp) {
                            pieces.push(p);
                        }
                    }
                    for p in pieces {
                        if !stack.contains(&p) {
                            stack.insert(0, p);
                        }
                    }
                    continue 'scan;
                }
            }
            break;
        }

        stack.sort_unstable();
        stack
    }
}

impl From<Interval> for IntervalSet {
    fn from(interval: Interval) -> Self {
        let mut set = IntervalSet::new();
        set.add(interval);
        set
    }
}

impl From<&[Symbol]> for IntervalSet {
    fn from(values: &[Symbol]) -> Self {
        IntervalSet::from_values(values)
    }
}

impl fmt::Display for IntervalSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, r) in self.ranges.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, "{}", r)?;
        }
        write!(f, "}}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_rejects_reversed_bounds() {
        assert!(matches!(
            Interval::new(10, 5),
            Err(AutomatonError::InvalidRange { min: 10, max: 5 })
        ));
        assert!(Interval::new(5, 10).is_ok());
        assert!(Interval::new(7, 7).is_ok());
    }

    #[test]
    fn test_interval_contains_and_intersects() {
        let i = Interval::new(5, 10).unwrap();
        assert!(i.contains(5));
        assert!(i.contains(10));
        assert!(!i.contains(4));
        assert!(!i.contains(11));

        let j = Interval::new(10, 20).unwrap();
        let k = Interval::new(11, 20).unwrap();
        assert!(i.intersects(&j));
        assert!(!i.intersects(&k));
        assert_eq!(i.intersection(&j), Some(Interval::new(10, 10).unwrap()));
        assert_eq!(i.intersection(&k), None);
    }

    #[test]
    fn test_interval_complement_two_ranges() {
        let comp = Interval::new(5, 10).unwrap().complement();
        assert_eq!(comp.len(), 2);
        assert_eq!(comp[0], Interval::raw(Interval::MIN_SENTINEL, 4));
        assert_eq!(comp[1], Interval::raw(11, Interval::MAX_SENTINEL));
    }

    #[test]
    fn test_interval_complement_at_sentinels() {
        let comp = Interval::raw(Interval::MIN_SENTINEL, 3).complement();
        assert_eq!(comp.len(), 1);
        assert_eq!(comp[0], Interval::raw(4, Interval::MAX_SENTINEL));

        let comp = Interval::raw(3, Interval::MAX_SENTINEL).complement();
        assert_eq!(comp.len(), 1);
        assert_eq!(comp[0], Interval::raw(Interval::MIN_SENTINEL, 2));

        assert!(Interval::FULL.complement().is_empty());
    }

    #[test]
    fn test_add_merges_adjacent() {
        let mut set = IntervalSet::new();
        assert!(set.add_value(1));
        assert!(set.add_value(3));
        assert_eq!(set.len(), 2);
        // 2 bridges [1] and [3] into a single range
        assert!(set.add_value(2));
        assert_eq!(set.len(), 1);
        assert_eq!(*set.iter().next().unwrap(), Interval::raw(1, 3));
    }

    #[test]
    fn test_add_cascading_merge() {
        let mut set = IntervalSet::new();
        set.add(Interval::raw(0, 1));
        set.add(Interval::raw(4, 5));
        set.add(Interval::raw(8, 9));
        // Overlaps the first neighbor, then the grown range touches the rest
        assert!(set.add(Interval::raw(1, 8)));
        assert_eq!(set.len(), 1);
        assert_eq!(*set.iter().next().unwrap(), Interval::raw(0, 9));
    }

    #[test]
    fn test_add_contained_is_unchanged() {
        let mut set = IntervalSet::new();
        set.add(Interval::raw(0, 10));
        assert!(!set.add(Interval::raw(3, 7)));
        assert!(!set.add_value(10));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_from_values_compresses_runs() {
        let set = IntervalSet::from_values(&[5, 1, 2, 3, 9, 8, 3]);
        let ranges: Vec<Interval> = set.iter().copied().collect();
        assert_eq!(
            ranges,
            vec![
                Interval::raw(1, 3),
                Interval::raw(5, 5),
                Interval::raw(8, 9)
            ]
        );
    }

    #[test]
    fn test_contains_and_intersects() {
        let set = IntervalSet::from_values(&[1, 2, 3, 7, 8]);
        assert!(set.contains(2));
        assert!(set.contains(7));
        assert!(!set.contains(5));

        let other = IntervalSet::from_values(&[5, 6, 7]);
        assert!(set.intersects(&other));
        let far = IntervalSet::from_values(&[100]);
        assert!(!set.intersects(&far));
        assert!(set.intersects_interval(&Interval::raw(3, 4)));
        assert!(!set.intersects_interval(&Interval::raw(4, 6)));
    }

    #[test]
    fn test_complement_round_trip() {
        let set = IntervalSet::from_values(&[1, 2, 3, 10]);
        let comp = set.complement();
        assert!(!comp.contains(2));
        assert!(comp.contains(0));
        assert!(comp.contains(4));
        assert!(comp.contains(Interval::MAX_SENTINEL));
        assert_eq!(comp.complement(), set);
    }

    #[test]
    fn test_complement_of_empty_is_universe() {
        let set = IntervalSet::new();
        assert_eq!(set.complement(), IntervalSet::universe());
        assert!(IntervalSet::universe().complement().is_empty());
    }

    #[test]
    fn test_union_and_intersection_laws() {
        let set = IntervalSet::from_values(&[-5, 0, 3, 4, 5, 1000]);
        let comp = set.complement();
        let everything = set.union(&comp);
        for v in [-5, -1, 0, 3, 7, 999, 1000, Symbol::MIN, Symbol::MAX] {
            assert!(everything.contains(v), "S ∪ ¬S must contain {}", v);
        }
        assert!(set.intersection(&comp).is_empty());
    }

    #[test]
    fn test_remove() {
        let mut set = IntervalSet::from_values(&[1, 2, 3, 4, 5]);
        set.remove(&IntervalSet::from_values(&[3]));
        assert!(set.contains(2));
        assert!(!set.contains(3));
        assert!(set.contains(4));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_minus_and_union_all() {
        let a = IntervalSet::from_values(&[1, 2, 3]);
        let b = IntervalSet::from_values(&[2]);
        let c = IntervalSet::from_values(&[3]);
        let d = a.minus(&[&b, &c]);
        assert!(d.contains(1));
        assert!(!d.contains(2));
        assert!(!d.contains(3));

        let u = IntervalSet::union_all([&a, &b, &c]);
        assert_eq!(u, a);
    }

    #[test]
    fn test_intersection_all() {
        let a = IntervalSet::from_values(&[1, 2, 3]);
        let b = IntervalSet::from_values(&[2, 3, 4]);
        let i = IntervalSet::intersection_all([&a, &b]);
        assert_eq!(i, IntervalSet::from_values(&[2, 3]));
        assert!(IntervalSet::intersection_all([]).is_empty());
    }

    #[test]
    fn test_disjunction_disjoint_and_covering() {
        let seeds = vec![
            Interval::raw(0, 10),
            Interval::raw(5, 15),
            Interval::raw(8, 8),
        ];
        let atoms = IntervalSet::disjunction(&seeds);

        // Pairwise disjoint
        for (i, a) in atoms.iter().enumerate() {
            for b in atoms.iter().skip(i + 1) {
                assert!(!a.intersects(b), "atoms {} and {} overlap", a, b);
            }
        }

        // Union of atoms equals union of seeds
        let mut atom_union = IntervalSet::new();
        for a in &atoms {
            atom_union.add(*a);
        }
        let mut seed_union = IntervalSet::new();
        for s in &seeds {
            seed_union.add(*s);
        }
        assert_eq!(atom_union, seed_union);

        // Every seed is exactly a union of atoms
        for s in &seeds {
            let mut cover = IntervalSet::new();
            for a in &atoms {
                if s.intersects(a) {
                    assert!(s.contains_interval(a), "atom {} straddles seed {}", a, s);
                    cover.add(*a);
                }
            }
            assert_eq!(cover, IntervalSet::from(*s));
        }
    }

    #[test]
    fn test_disjunction_trivial_inputs() {
        assert!(IntervalSet::disjunction(&[]).is_empty());
        let one = IntervalSet::disjunction(&[Interval::raw(3, 5)]);
        assert_eq!(one, vec![Interval::raw(3, 5)]);
        // Already-disjoint input passes through
        let two = IntervalSet::disjunction(&[Interval::raw(0, 1), Interval::raw(5, 6)]);
        assert_eq!(two, vec![Interval::raw(0, 1), Interval::raw(5, 6)]);
    }

    #[test]
    fn test_disjunction_with_full_range() {
        let atoms = IntervalSet::disjunction(&[Interval::FULL, Interval::raw(0, 1)]);
        for (i, a) in atoms.iter().enumerate() {
            for b in atoms.iter().skip(i + 1) {
                assert!(!a.intersects(b));
            }
        }
        assert!(atoms.contains(&Interval::raw(0, 1)));
        let mut union = IntervalSet::new();
        for a in &atoms {
            union.add(*a);
        }
        assert_eq!(union, IntervalSet::universe());
    }

    #[test]
    fn test_display() {
        assert_eq!(Interval::raw(1, 3).to_string(), "[1,3]");
        assert_eq!(Interval::point(7).to_string(), "[7]");
        assert_eq!(Interval::FULL.to_string(), "[-\u{221e},\u{221e}]");
        let set = IntervalSet::from_values(&[1, 2, 5]);
        assert_eq!(set.to_string(), "{[1,2],[5]}");
        assert_eq!(IntervalSet::new().to_string(), "{}");
    }
}
