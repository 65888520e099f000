//! Four-section term dictionary.
//!
//! Terms are partitioned into four lexicographically sorted sections:
//! shared (terms appearing as both subject and object), subject-only,
//! predicates, and object-only. Identifier assignment follows the classic
//! shared-prefix convention: in the subject space, ids `1..=S` address the
//! shared section and `S+1..` the subject-only section; the object space
//! mirrors this with the object-only section; predicates are independent.
//! Identifier 0 is never assigned.

use std::collections::BTreeSet;

use tern_common::{Result, error::Error, verify_data};
use tern_index::{Dictionary, TermId, TermPosition};

/// In-memory four-section dictionary, immutable once built.
#[derive(Debug, Default)]
pub struct TermDictionary {
    shared: Vec<String>,
    subjects: Vec<String>,
    predicates: Vec<String>,
    objects: Vec<String>,
}

impl TermDictionary {
    /// Builds the dictionary for a set of term-triples.
    ///
    /// The shared section is the intersection of the subject and object
    /// term sets; the subject/object sections hold the remainders.
    pub fn from_triples<'a, I>(triples: I) -> TermDictionary
    where
        I: IntoIterator<Item = (&'a str, &'a str, &'a str)>,
    {
        let mut subjects = BTreeSet::new();
        let mut predicates = BTreeSet::new();
        let mut objects = BTreeSet::new();
        for (s, p, o) in triples {
            subjects.insert(s.to_string());
            predicates.insert(p.to_string());
            objects.insert(o.to_string());
        }
        let shared: BTreeSet<String> = subjects.intersection(&objects).cloned().collect();
        let subjects = subjects.difference(&shared).cloned().collect();
        let objects = objects.difference(&shared).cloned().collect();
        TermDictionary {
            shared: shared.into_iter().collect(),
            subjects,
            predicates: predicates.into_iter().collect(),
            objects,
        }
    }

    /// Assembles a dictionary from already-sorted sections, validating the
    /// sort order of each.
    pub fn from_sections(
        shared: Vec<String>,
        subjects: Vec<String>,
        predicates: Vec<String>,
        objects: Vec<String>,
    ) -> Result<TermDictionary> {
        for (name, section) in [
            ("shared", &shared),
            ("subjects", &subjects),
            ("predicates", &predicates),
            ("objects", &objects),
        ] {
            verify_data!(name, section.windows(2).all(|w| w[0] < w[1]));
        }
        Ok(TermDictionary {
            shared,
            subjects,
            predicates,
            objects,
        })
    }

    pub fn sections(&self) -> [&[String]; 4] {
        [&self.shared, &self.subjects, &self.predicates, &self.objects]
    }

    /// The (section, local index) addressed by an identifier, where the
    /// section is the role-specific tail for subject/object spaces.
    fn locate(&self, id: TermId, position: TermPosition) -> Option<&str> {
        if id == 0 {
            return None;
        }
        let idx = (id - 1) as usize;
        let shared_len = self.shared.len();
        match position {
            TermPosition::Shared => self.shared.get(idx).map(String::as_str),
            TermPosition::Predicate => self.predicates.get(idx).map(String::as_str),
            TermPosition::Subject => {
                if idx < shared_len {
                    Some(self.shared[idx].as_str())
                } else {
                    self.subjects.get(idx - shared_len).map(String::as_str)
                }
            }
            TermPosition::Object => {
                if idx < shared_len {
                    Some(self.shared[idx].as_str())
                } else {
                    self.objects.get(idx - shared_len).map(String::as_str)
                }
            }
        }
    }

    fn section_id(section: &[String], term: &str) -> Option<usize> {
        section.binary_search_by(|probe| probe.as_str().cmp(term)).ok()
    }
}

impl Dictionary for TermDictionary {
    fn term_to_id(&self, term: &str, position: TermPosition) -> Option<TermId> {
        let shared_len = self.shared.len();
        match position {
            TermPosition::Shared => {
                Self::section_id(&self.shared, term).map(|i| (i + 1) as TermId)
            }
            TermPosition::Predicate => {
                Self::section_id(&self.predicates, term).map(|i| (i + 1) as TermId)
            }
            TermPosition::Subject => Self::section_id(&self.shared, term)
                .map(|i| (i + 1) as TermId)
                .or_else(|| {
                    Self::section_id(&self.subjects, term).map(|i| (shared_len + i + 1) as TermId)
                }),
            TermPosition::Object => Self::section_id(&self.shared, term)
                .map(|i| (i + 1) as TermId)
                .or_else(|| {
                    Self::section_id(&self.objects, term).map(|i| (shared_len + i + 1) as TermId)
                }),
        }
    }

    fn id_to_term(&self, id: TermId, position: TermPosition) -> Result<String> {
        self.locate(id, position)
            .map(str::to_string)
            .ok_or_else(|| Error::invalid_identifier(id, position.as_str()))
    }

    fn num_shared(&self) -> u64 {
        self.shared.len() as u64
    }

    fn num_subjects(&self) -> u64 {
        self.subjects.len() as u64
    }

    fn num_predicates(&self) -> u64 {
        self.predicates.len() as u64
    }

    fn num_objects(&self) -> u64 {
        self.objects.len() as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tern_common::error::ErrorKind;

    fn sample() -> TermDictionary {
        // "b" appears as both subject and object.
        TermDictionary::from_triples([
            ("a", "p", "b"),
            ("b", "p", "c"),
            ("a", "q", "c"),
        ])
    }

    #[test]
    fn sections_are_partitioned() {
        let dict = sample();
        assert_eq!(dict.num_shared(), 1);
        assert_eq!(dict.num_subjects(), 1);
        assert_eq!(dict.num_predicates(), 2);
        assert_eq!(dict.num_objects(), 1);
    }

    #[test]
    fn shared_terms_have_one_id_in_both_spaces() {
        let dict = sample();
        let as_subject = dict.term_to_id("b", TermPosition::Subject).unwrap();
        let as_object = dict.term_to_id("b", TermPosition::Object).unwrap();
        assert_eq!(as_subject, as_object);
        assert_eq!(as_subject, 1);
        assert_eq!(dict.term_to_id("b", TermPosition::Shared), Some(1));
    }

    #[test]
    fn roundtrip_all_roles() {
        let dict = sample();
        for position in [
            TermPosition::Subject,
            TermPosition::Predicate,
            TermPosition::Object,
        ] {
            for term in ["a", "b", "c", "p", "q"] {
                if let Some(id) = dict.term_to_id(term, position) {
                    assert_eq!(dict.id_to_term(id, position).unwrap(), term);
                }
            }
        }
    }

    #[test]
    fn unknown_term_is_none() {
        let dict = sample();
        assert_eq!(dict.term_to_id("zzz", TermPosition::Subject), None);
        // Predicates never share ids with subjects.
        assert_eq!(dict.term_to_id("p", TermPosition::Subject), None);
    }

    #[test]
    fn out_of_range_id_is_an_error() {
        let dict = sample();
        let err = dict.id_to_term(0, TermPosition::Subject).unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::InvalidIdentifier { id: 0, .. }));
        let err = dict.id_to_term(99, TermPosition::Predicate).unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::InvalidIdentifier { id: 99, .. }));
    }

    #[test]
    fn translate_id_across_roles() {
        let dict = sample();
        let b_subj = dict.term_to_id("b", TermPosition::Subject).unwrap();
        assert_eq!(
            dict.translate_id(b_subj, TermPosition::Subject, TermPosition::Object)
                .unwrap(),
            Some(b_subj)
        );
        let a_subj = dict.term_to_id("a", TermPosition::Subject).unwrap();
        // "a" never appears as an object.
        assert_eq!(
            dict.translate_id(a_subj, TermPosition::Subject, TermPosition::Object)
                .unwrap(),
            None
        );
    }

    #[test]
    fn from_sections_rejects_unsorted() {
        let result = TermDictionary::from_sections(
            vec![],
            vec!["b".into(), "a".into()],
            vec![],
            vec![],
        );
        assert!(result.is_err());
    }
}
