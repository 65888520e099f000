//! Identifier-level data model: term ids, triples, patterns, size hints
//! and result windows.

/// Dense integer surrogate for a term within one identifier space.
///
/// Valid identifiers start at 1. The value 0 is reserved: inside an
/// [`IdPattern`] it marks an unbound slot, and a dictionary never
/// assigns it to a term.
pub type TermId = u32;

/// The unbound marker inside an [`IdPattern`].
pub const UNBOUND: TermId = 0;

/// The four identifier spaces of the dictionary.
///
/// `Shared` addresses the subject-object intersection section directly;
/// query pattern slots only ever use the first three roles (a shared term
/// resolves under both `Subject` and `Object` with the same identifier).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TermPosition {
    Subject,
    Predicate,
    Object,
    Shared,
}

impl TermPosition {
    /// The role of pattern slot `pos` (0 = subject, 1 = predicate, 2 = object).
    pub fn of_slot(pos: usize) -> TermPosition {
        match pos {
            0 => TermPosition::Subject,
            1 => TermPosition::Predicate,
            2 => TermPosition::Object,
            _ => panic!("slot index out of range: {pos}"),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TermPosition::Subject => "subject",
            TermPosition::Predicate => "predicate",
            TermPosition::Object => "object",
            TermPosition::Shared => "shared",
        }
    }
}

impl std::fmt::Display for TermPosition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A fact expressed as identifiers: all three components are non-zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct IdTriple {
    pub subject: TermId,
    pub predicate: TermId,
    pub object: TermId,
}

impl IdTriple {
    pub fn new(subject: TermId, predicate: TermId, object: TermId) -> IdTriple {
        IdTriple {
            subject,
            predicate,
            object,
        }
    }

    /// Component at pattern slot `pos` (0 = subject, 1 = predicate, 2 = object).
    pub fn get(&self, pos: usize) -> TermId {
        match pos {
            0 => self.subject,
            1 => self.predicate,
            2 => self.object,
            _ => panic!("slot index out of range: {pos}"),
        }
    }
}

/// A triple pattern over identifiers, where 0 marks an unbound slot.
///
/// A pattern with zero unbound slots matches at most one fact; a pattern
/// with all slots unbound matches every fact.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct IdPattern {
    pub subject: TermId,
    pub predicate: TermId,
    pub object: TermId,
}

impl IdPattern {
    pub fn new(subject: TermId, predicate: TermId, object: TermId) -> IdPattern {
        IdPattern {
            subject,
            predicate,
            object,
        }
    }

    /// The pattern matching every fact.
    pub fn any() -> IdPattern {
        IdPattern::default()
    }

    pub fn get(&self, pos: usize) -> TermId {
        match pos {
            0 => self.subject,
            1 => self.predicate,
            2 => self.object,
            _ => panic!("slot index out of range: {pos}"),
        }
    }

    pub fn bound_count(&self) -> usize {
        [self.subject, self.predicate, self.object]
            .iter()
            .filter(|&&id| id != UNBOUND)
            .count()
    }

    pub fn matches(&self, triple: &IdTriple) -> bool {
        (self.subject == UNBOUND || self.subject == triple.subject)
            && (self.predicate == UNBOUND || self.predicate == triple.predicate)
            && (self.object == UNBOUND || self.object == triple.object)
    }
}

/// A hint over the cardinality of a pattern or join.
///
/// `exact` must only be `true` when `count` equals the number of results a
/// full enumeration would produce; callers must not rely on exactness
/// otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SizeHint {
    pub count: u64,
    pub exact: bool,
}

impl SizeHint {
    pub fn exact(count: u64) -> SizeHint {
        SizeHint { count, exact: true }
    }

    pub fn estimate(count: u64) -> SizeHint {
        SizeHint {
            count,
            exact: false,
        }
    }
}

/// Windowing over a result stream: skip `offset` leading matches, then
/// yield at most `limit` results (`None` means unbounded).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Window {
    pub offset: u64,
    pub limit: Option<u64>,
}

impl Window {
    pub fn new(offset: u64, limit: Option<u64>) -> Window {
        Window { offset, limit }
    }

    /// No offset, no limit.
    pub fn all() -> Window {
        Window::default()
    }

    /// True when `produced` results saturate the limit.
    pub fn is_full(&self, produced: u64) -> bool {
        match self.limit {
            Some(limit) => produced >= limit,
            None => false,
        }
    }

    /// The number of results this window can produce out of `cardinality`
    /// total matches.
    pub fn clamp(&self, cardinality: u64) -> u64 {
        let past_offset = cardinality.saturating_sub(self.offset);
        match self.limit {
            Some(limit) => past_offset.min(limit),
            None => past_offset,
        }
    }

}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pattern_matching() {
        let t = IdTriple::new(3, 1, 7);
        assert!(IdPattern::any().matches(&t));
        assert!(IdPattern::new(3, 0, 0).matches(&t));
        assert!(IdPattern::new(3, 1, 7).matches(&t));
        assert!(!IdPattern::new(3, 2, 0).matches(&t));
        assert!(!IdPattern::new(0, 0, 8).matches(&t));
    }

    #[test]
    fn bound_count() {
        assert_eq!(IdPattern::any().bound_count(), 0);
        assert_eq!(IdPattern::new(1, 0, 2).bound_count(), 2);
        assert_eq!(IdPattern::new(1, 1, 1).bound_count(), 3);
    }

    #[test]
    fn window_clamp() {
        let w = Window::new(1, Some(1));
        assert_eq!(w.clamp(3), 1);
        assert_eq!(w.clamp(1), 0);
        assert_eq!(Window::all().clamp(3), 3);
        assert_eq!(Window::new(5, None).clamp(3), 0);
    }

    #[test]
    fn window_saturation() {
        let w = Window::new(0, Some(2));
        assert!(!w.is_full(1));
        assert!(w.is_full(2));
        assert!(!Window::all().is_full(u64::MAX));
    }
}
