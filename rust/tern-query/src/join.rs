//! Conjunctive evaluation of several triple patterns sharing named
//! variables.
//!
//! [`JoinIterator`] runs a left-deep nested-loop join: patterns are
//! evaluated in the order given, each level opening an index search with
//! every already-bound variable substituted as a constant. Variables bind
//! to canonical term strings and remember the identifier and role of
//! first binding, so a variable first bound in subject role constrains a
//! later object slot through the dictionary's identifier translation.
//! Duplicate solutions (possible when a pattern carries wildcard slots
//! that do not project into the solution) are suppressed.

use ahash::AHashSet;

use tern_common::{Result, error::Error, verify_arg};
use tern_index::{
    Dictionary, IdPattern, IdTripleStream, SizeHint, TermId, TermPosition, TripleIndex, UNBOUND,
    Window,
};

/// One slot of a join pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JoinTerm {
    /// A constant term the slot must equal.
    Bound(String),
    /// A named variable; occurrences of the same name must agree.
    Var(String),
    /// Matches anything without binding; not part of the solution.
    Any,
}

impl JoinTerm {
    pub fn bound(term: impl Into<String>) -> JoinTerm {
        JoinTerm::Bound(term.into())
    }

    pub fn var(name: impl Into<String>) -> JoinTerm {
        JoinTerm::Var(name.into())
    }
}

impl std::fmt::Display for JoinTerm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JoinTerm::Bound(term) => f.write_str(term),
            JoinTerm::Var(name) => write!(f, "?{name}"),
            JoinTerm::Any => f.write_str("_"),
        }
    }
}

/// One variable assignment inside a [`Solution`], carrying both the term
/// string and its byte encoding.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Binding {
    pub variable: String,
    pub term: String,
    pub bytes: Vec<u8>,
}

/// A complete assignment of the join's variables, in declaration order
/// (first occurrence across the pattern list).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Solution {
    bindings: Vec<Binding>,
}

impl Solution {
    /// The term bound to `variable`, if the join declares it.
    pub fn get(&self, variable: &str) -> Option<&str> {
        self.bindings
            .iter()
            .find(|b| b.variable == variable)
            .map(|b| b.term.as_str())
    }

    /// The byte encoding of the term bound to `variable`.
    pub fn get_bytes(&self, variable: &str) -> Option<&[u8]> {
        self.bindings
            .iter()
            .find(|b| b.variable == variable)
            .map(|b| b.bytes.as_slice())
    }

    pub fn variables(&self) -> impl Iterator<Item = &str> {
        self.bindings.iter().map(|b| b.variable.as_str())
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Binding> {
        self.bindings.iter()
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

impl<'s> IntoIterator for &'s Solution {
    type Item = &'s Binding;
    type IntoIter = std::slice::Iter<'s, Binding>;

    fn into_iter(self) -> Self::IntoIter {
        self.bindings.iter()
    }
}

/// A compiled slot: constants are pre-resolved against the dictionary,
/// variables refer into the declaration-ordered variable table.
#[derive(Debug, Clone)]
enum Slot {
    /// `None` when the constant term is unknown to the dictionary, which
    /// makes the whole join empty.
    Const(Option<TermId>),
    Var(usize),
    Any,
}

/// A variable's current value: the canonical term plus the identifier and
/// role it was first bound under, so re-binding into another role's slot
/// can go through the dictionary's identifier translation.
struct BoundVar {
    term: String,
    bytes: Vec<u8>,
    id: TermId,
    role: TermPosition,
}

/// Nested-loop join over several triple patterns.
///
/// Yields each distinct variable assignment once. `reset` rewinds to the
/// start; re-running produces the same solution set.
pub struct JoinIterator<'a> {
    dict: &'a dyn Dictionary,
    index: &'a dyn TripleIndex,
    compiled: Vec<[Slot; 3]>,
    /// Slots that bind a variable for the first time, per depth.
    binders: Vec<Vec<(usize, usize)>>,
    /// Later occurrences of a variable within the same pattern, per depth.
    checks: Vec<Vec<(usize, usize)>>,
    vars: Vec<String>,
    hint: SizeHint,
    bindings: Vec<Option<BoundVar>>,
    levels: Vec<IdTripleStream<'a>>,
    seen: AHashSet<Vec<String>>,
    pending: Option<Solution>,
    done: bool,
}

impl<'a> JoinIterator<'a> {
    pub(crate) fn new(
        dict: &'a dyn Dictionary,
        index: &'a dyn TripleIndex,
        patterns: &[[JoinTerm; 3]],
    ) -> Result<JoinIterator<'a>> {
        verify_arg!(patterns, !patterns.is_empty());

        let mut vars: Vec<String> = Vec::new();
        let mut occurrences: Vec<usize> = Vec::new();
        let mut compiled = Vec::with_capacity(patterns.len());
        let mut binders = Vec::with_capacity(patterns.len());
        let mut checks = Vec::with_capacity(patterns.len());
        let mut has_any = false;

        for pattern in patterns {
            let mut slots = [const { Slot::Any }; 3];
            let mut level_binders = Vec::new();
            let mut level_checks = Vec::new();
            for (pos, term) in pattern.iter().enumerate() {
                slots[pos] = match term {
                    JoinTerm::Bound(term) => {
                        Slot::Const(dict.term_to_id(term, TermPosition::of_slot(pos)))
                    }
                    JoinTerm::Var(name) => {
                        verify_arg!(patterns, !name.is_empty());
                        let v = match vars.iter().position(|n| n == name) {
                            Some(v) => {
                                occurrences[v] += 1;
                                if level_binders.iter().any(|&(_, b)| b == v) {
                                    level_checks.push((pos, v));
                                }
                                v
                            }
                            None => {
                                vars.push(name.clone());
                                occurrences.push(1);
                                let v = vars.len() - 1;
                                level_binders.push((pos, v));
                                v
                            }
                        };
                        Slot::Var(v)
                    }
                    JoinTerm::Any => {
                        has_any = true;
                        Slot::Any
                    }
                };
            }
            compiled.push(slots);
            binders.push(level_binders);
            checks.push(level_checks);
        }

        let independent = !has_any && occurrences.iter().all(|&n| n == 1);
        let hint = Self::compute_hint(index, &compiled, independent)?;
        let bindings = (0..vars.len()).map(|_| None).collect();

        Ok(JoinIterator {
            dict,
            index,
            compiled,
            binders,
            checks,
            vars,
            hint,
            bindings,
            levels: Vec::new(),
            seen: AHashSet::new(),
            pending: None,
            done: false,
        })
    }

    /// Upper-bound cardinality: the product of the per-pattern hints with
    /// variables treated as wildcards. Exact only when every factor is
    /// exact and the patterns are independent (no shared variables, no
    /// wildcard slots), or when one factor is exactly zero.
    fn compute_hint(
        index: &dyn TripleIndex,
        compiled: &[[Slot; 3]],
        independent: bool,
    ) -> Result<SizeHint> {
        let mut count: u64 = 1;
        let mut all_exact = true;
        for slots in compiled {
            let mut ids = [UNBOUND; 3];
            for (pos, slot) in slots.iter().enumerate() {
                match slot {
                    Slot::Const(Some(id)) => ids[pos] = *id,
                    Slot::Const(None) => return Ok(SizeHint::exact(0)),
                    Slot::Var(_) | Slot::Any => {}
                }
            }
            let (_, hint) =
                index.search(IdPattern::new(ids[0], ids[1], ids[2]), Window::all())?;
            count = count.saturating_mul(hint.count);
            all_exact &= hint.exact;
        }
        if all_exact && (count == 0 || independent) {
            Ok(SizeHint::exact(count))
        } else {
            Ok(SizeHint::estimate(count))
        }
    }

    /// Variable names in declaration order.
    pub fn variables(&self) -> &[String] {
        &self.vars
    }

    /// The cardinality hint computed at construction.
    pub fn cardinality(&self) -> SizeHint {
        self.hint
    }

    /// True iff another solution remains. Does not consume.
    ///
    /// # Errors
    ///
    /// Fails when probing the next solution fails; the join is finished
    /// afterwards, exactly as when `next` surfaces the error.
    pub fn has_next(&mut self) -> Result<bool> {
        if self.pending.is_none() {
            match self.next_solution() {
                Ok(solution) => self.pending = solution,
                Err(err) => {
                    self.done = true;
                    return Err(err);
                }
            }
        }
        Ok(self.pending.is_some())
    }

    /// Rewinds to the start. A fresh run yields the same solution set.
    pub fn reset(&mut self) {
        self.levels.clear();
        self.bindings.iter_mut().for_each(|b| *b = None);
        self.seen.clear();
        self.pending = None;
        self.done = false;
    }

    /// Opens the index search for `depth`, substituting constants and
    /// already-bound variables. An unknown constant, or a binding whose
    /// term has no identifier in the slot's role, yields an empty stream.
    fn open_level(&self, depth: usize) -> Result<IdTripleStream<'a>> {
        let mut ids = [UNBOUND; 3];
        for (pos, slot) in self.compiled[depth].iter().enumerate() {
            match slot {
                Slot::Const(Some(id)) => ids[pos] = *id,
                Slot::Const(None) => return Ok(Box::new(std::iter::empty())),
                Slot::Var(v) => {
                    if let Some(bound) = &self.bindings[*v] {
                        let translated = self.dict.translate_id(
                            bound.id,
                            bound.role,
                            TermPosition::of_slot(pos),
                        )?;
                        match translated {
                            Some(id) => ids[pos] = id,
                            None => return Ok(Box::new(std::iter::empty())),
                        }
                    }
                }
                Slot::Any => {}
            }
        }
        let (stream, _) = self
            .index
            .search(IdPattern::new(ids[0], ids[1], ids[2]), Window::all())?;
        Ok(stream)
    }

    /// Pulls the next consistent triple at `depth`, updating variable
    /// bindings. Returns `false` when the level is exhausted (its
    /// variables are unbound again).
    fn step(&mut self, depth: usize) -> Result<bool> {
        loop {
            match self.levels[depth].next() {
                Some(Ok(triple)) => {
                    for &(pos, v) in &self.binders[depth] {
                        let role = TermPosition::of_slot(pos);
                        let id = triple.get(pos);
                        self.bindings[v] = Some(BoundVar {
                            term: self.dict.id_to_term(id, role)?,
                            bytes: self.dict.id_to_bytes(id, role)?,
                            id,
                            role,
                        });
                    }
                    let consistent = self.checks[depth].iter().try_fold(
                        true,
                        |acc, &(pos, v)| -> Result<bool> {
                            let term = self
                                .dict
                                .id_to_term(triple.get(pos), TermPosition::of_slot(pos))?;
                            let bound = self.bindings[v].as_ref().map(|b| b.term.as_str());
                            Ok(acc && bound == Some(term.as_str()))
                        },
                    )?;
                    if consistent {
                        return Ok(true);
                    }
                }
                Some(Err(err)) => return Err(err),
                None => {
                    for &(_, v) in &self.binders[depth] {
                        self.bindings[v] = None;
                    }
                    return Ok(false);
                }
            }
        }
    }

    fn solution(&self) -> Result<Solution> {
        let mut bindings = Vec::with_capacity(self.vars.len());
        for (v, name) in self.vars.iter().enumerate() {
            match &self.bindings[v] {
                Some(bound) => bindings.push(Binding {
                    variable: name.clone(),
                    term: bound.term.clone(),
                    bytes: bound.bytes.clone(),
                }),
                None => {
                    return Err(Error::corrupt_store(format!(
                        "join variable '{name}' left unbound in a complete assignment"
                    )));
                }
            }
        }
        Ok(Solution { bindings })
    }

    fn next_solution(&mut self) -> Result<Option<Solution>> {
        if self.done {
            return Ok(None);
        }
        if self.levels.is_empty() {
            let stream = self.open_level(0)?;
            self.levels.push(stream);
        }
        loop {
            let depth = self.levels.len() - 1;
            if self.step(depth)? {
                if depth + 1 == self.compiled.len() {
                    let solution = self.solution()?;
                    let key: Vec<String> =
                        solution.iter().map(|b| b.term.clone()).collect();
                    if self.seen.insert(key) {
                        return Ok(Some(solution));
                    }
                } else {
                    let stream = self.open_level(depth + 1)?;
                    self.levels.push(stream);
                }
            } else {
                self.levels.pop();
                if self.levels.is_empty() {
                    self.done = true;
                    return Ok(None);
                }
            }
        }
    }
}

impl<'a> Iterator for JoinIterator<'a> {
    type Item = Result<Solution>;

    fn next(&mut self) -> Option<Result<Solution>> {
        if let Some(solution) = self.pending.take() {
            return Some(Ok(solution));
        }
        match self.next_solution() {
            Ok(Some(solution)) => Some(Ok(solution)),
            Ok(None) => None,
            Err(err) => {
                self.done = true;
                Some(Err(err))
            }
        }
    }
}

impl std::fmt::Debug for JoinIterator<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JoinIterator")
            .field("patterns", &self.compiled.len())
            .field("variables", &self.vars)
            .field("hint", &self.hint)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;
    use tern_store::TripleStore;

    fn store() -> TripleStore {
        TripleStore::from_triples(
            [("a", "p", "b"), ("a", "p", "c"), ("d", "p", "b")],
            true,
        )
    }

    fn collect_var(join: &mut JoinIterator<'_>, var: &str) -> BTreeSet<String> {
        join.map(|s| s.unwrap().get(var).unwrap().to_string())
            .collect()
    }

    #[test]
    fn shared_variable_join_deduplicates() {
        let store = store();
        // ?x has some p-fact (twice for "a"), and ?x p b.
        let patterns = [
            [JoinTerm::var("x"), JoinTerm::bound("p"), JoinTerm::Any],
            [JoinTerm::var("x"), JoinTerm::bound("p"), JoinTerm::bound("b")],
        ];
        let mut join = JoinIterator::new(&store, &store, &patterns).unwrap();
        assert_eq!(join.variables(), ["x"]);
        let xs = collect_var(&mut join, "x");
        assert_eq!(
            xs,
            BTreeSet::from(["a".to_string(), "d".to_string()]),
            "duplicate x=a from the wildcard object must collapse"
        );
        assert!(!join.cardinality().exact);
    }

    #[test]
    fn independent_patterns_form_a_cartesian_product() {
        let store = store();
        let patterns = [
            [JoinTerm::var("x"), JoinTerm::bound("p"), JoinTerm::bound("b")],
            [JoinTerm::var("y"), JoinTerm::bound("p"), JoinTerm::bound("c")],
        ];
        let mut join = JoinIterator::new(&store, &store, &patterns).unwrap();
        assert_eq!(join.cardinality(), SizeHint::exact(2));
        let solutions: Vec<Solution> = join.by_ref().map(|s| s.unwrap()).collect();
        assert_eq!(solutions.len(), 2);
        for s in &solutions {
            assert_eq!(s.get("y"), Some("a"));
        }
    }

    #[test]
    fn reset_reproduces_the_solution_set() {
        let store = store();
        let patterns = [
            [JoinTerm::var("x"), JoinTerm::bound("p"), JoinTerm::Any],
            [JoinTerm::var("x"), JoinTerm::bound("p"), JoinTerm::bound("b")],
        ];
        let mut join = JoinIterator::new(&store, &store, &patterns).unwrap();
        let first = collect_var(&mut join, "x");
        join.reset();
        let second = collect_var(&mut join, "x");
        assert_eq!(first, second);
    }

    #[test]
    fn has_next_does_not_consume() {
        let store = store();
        let patterns = [[
            JoinTerm::var("x"),
            JoinTerm::bound("p"),
            JoinTerm::bound("b"),
        ]];
        let mut join = JoinIterator::new(&store, &store, &patterns).unwrap();
        assert!(join.has_next().unwrap());
        assert!(join.has_next().unwrap());
        assert_eq!(join.by_ref().count(), 2);
        assert!(!join.has_next().unwrap());
    }

    #[test]
    fn unknown_constant_makes_the_join_empty() {
        let store = store();
        let patterns = [[
            JoinTerm::var("x"),
            JoinTerm::bound("nope"),
            JoinTerm::Any,
        ]];
        let mut join = JoinIterator::new(&store, &store, &patterns).unwrap();
        assert_eq!(join.cardinality(), SizeHint::exact(0));
        assert!(join.next().is_none());
    }

    #[test]
    fn repeated_variable_within_one_pattern_requires_equality() {
        let store = TripleStore::from_triples(
            [("e", "p", "e"), ("a", "p", "b")],
            true,
        );
        let patterns = [[JoinTerm::var("x"), JoinTerm::bound("p"), JoinTerm::var("x")]];
        let mut join = JoinIterator::new(&store, &store, &patterns).unwrap();
        let xs = collect_var(&mut join, "x");
        assert_eq!(xs, BTreeSet::from(["e".to_string()]));
    }

    #[test]
    fn variable_binds_across_roles() {
        // x bound in object role at level 0 constrains a subject slot at
        // level 1 through the shared section.
        let store = TripleStore::from_triples(
            [("a", "p", "b"), ("b", "q", "c")],
            true,
        );
        let patterns = [
            [JoinTerm::bound("a"), JoinTerm::bound("p"), JoinTerm::var("x")],
            [JoinTerm::var("x"), JoinTerm::bound("q"), JoinTerm::var("y")],
        ];
        let mut join = JoinIterator::new(&store, &store, &patterns).unwrap();
        let solutions: Vec<Solution> = join.by_ref().map(|s| s.unwrap()).collect();
        assert_eq!(solutions.len(), 1);
        assert_eq!(solutions[0].get("x"), Some("b"));
        assert_eq!(solutions[0].get("y"), Some("c"));
    }

    #[test]
    fn empty_pattern_list_is_rejected() {
        let store = store();
        assert!(JoinIterator::new(&store, &store, &[]).is_err());
    }

    #[test]
    fn solutions_carry_byte_encoded_terms() {
        let store = store();
        let patterns = [[
            JoinTerm::var("x"),
            JoinTerm::bound("p"),
            JoinTerm::bound("c"),
        ]];
        let mut join = JoinIterator::new(&store, &store, &patterns).unwrap();
        let solution = join.next().unwrap().unwrap();
        assert_eq!(solution.get("x"), Some("a"));
        assert_eq!(solution.get_bytes("x"), Some(b"a".as_slice()));
        assert_eq!(solution.get_bytes("missing"), None);
    }

    struct FailingIndex;

    impl TripleIndex for FailingIndex {
        fn search<'a>(
            &'a self,
            _pattern: IdPattern,
            _window: Window,
        ) -> Result<(IdTripleStream<'a>, SizeHint)> {
            Ok((
                Box::new(std::iter::once(Err(Error::corrupt_store("torn page")))),
                SizeHint::estimate(1),
            ))
        }

        fn num_triples(&self) -> u64 {
            1
        }
    }

    #[test]
    fn stream_error_through_has_next_finishes_the_join() {
        let store = store();
        let patterns = [[JoinTerm::var("x"), JoinTerm::Any, JoinTerm::Any]];
        let mut join = JoinIterator::new(&store, &FailingIndex, &patterns).unwrap();
        assert!(join.has_next().is_err());
        assert!(join.next().is_none());
        assert!(!join.has_next().unwrap());
    }
}
