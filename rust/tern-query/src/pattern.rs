//! Term-level triple patterns.

/// A triple pattern over terms: each slot is either bound to a constant
/// term or left unbound (`None`) to match any value.
///
/// A pattern with all three slots bound matches at most one fact; a
/// pattern with no bound slot matches every fact.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TriplePattern {
    pub subject: Option<String>,
    pub predicate: Option<String>,
    pub object: Option<String>,
}

impl TriplePattern {
    pub fn new(
        subject: Option<&str>,
        predicate: Option<&str>,
        object: Option<&str>,
    ) -> TriplePattern {
        TriplePattern {
            subject: subject.map(str::to_string),
            predicate: predicate.map(str::to_string),
            object: object.map(str::to_string),
        }
    }

    /// The pattern matching every fact.
    pub fn any() -> TriplePattern {
        TriplePattern::default()
    }

    pub fn bound_count(&self) -> usize {
        [&self.subject, &self.predicate, &self.object]
            .iter()
            .filter(|slot| slot.is_some())
            .count()
    }
}

impl std::fmt::Display for TriplePattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let slot = |s: &Option<String>| s.as_deref().unwrap_or("?").to_string();
        write!(
            f,
            "({} {} {})",
            slot(&self.subject),
            slot(&self.predicate),
            slot(&self.object)
        )
    }
}
