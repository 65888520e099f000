//! The store: one dictionary plus one triple table, and its file form.
//!
//! File layout (see [`crate::format`] for framing):
//!
//! ```text
//! magic "TERNSTO1"
//! message: header  — section counts and triple count, little-endian u64s
//! message: dictionary — zstd( per section: u32 count, then u32 len + bytes per term )
//! message: triples — zstd( 3 × u32 per fact, SPO order )
//! ```

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use log::debug;
use tern_common::{Result, verify_data};
use tern_index::{
    Dictionary, IdPattern, IdTriple, IdTripleStream, SizeHint, TermId, TermPosition, TripleIndex,
    Window,
};

use crate::dictionary::TermDictionary;
use crate::format;
use crate::table::TripleTable;

/// Options controlling how a store file is opened.
#[derive(Debug, Clone, Copy)]
pub struct OpenOptions {
    /// Accepted for interface parity with mapping engines; this engine
    /// always materializes the store in memory.
    pub mapped: bool,
    /// Build the auxiliary (P,S,O)/(O,P,S) orderings at load time. Without
    /// them, predicate- and object-bound patterns fall back to scans with
    /// inexact hints.
    pub indexed: bool,
}

impl Default for OpenOptions {
    fn default() -> OpenOptions {
        OpenOptions {
            mapped: true,
            indexed: true,
        }
    }
}

/// An immutable triple store: four-section dictionary + SPO triple table.
///
/// Implements both collaborator traits of `tern-index`; one loaded store
/// serves any number of concurrent readers.
#[derive(Debug, Default)]
pub struct TripleStore {
    dict: TermDictionary,
    table: TripleTable,
}

impl TripleStore {
    /// Builds an in-memory store from term-triples.
    pub fn from_triples<'a, I>(triples: I, indexed: bool) -> TripleStore
    where
        I: IntoIterator<Item = (&'a str, &'a str, &'a str)>,
        I::IntoIter: Clone,
    {
        let iter = triples.into_iter();
        let dict = TermDictionary::from_triples(iter.clone());
        let ids = iter
            .map(|(s, p, o)| {
                // The dictionary was just built from these very terms.
                IdTriple::new(
                    dict.term_to_id(s, TermPosition::Subject).expect("subject"),
                    dict.term_to_id(p, TermPosition::Predicate).expect("predicate"),
                    dict.term_to_id(o, TermPosition::Object).expect("object"),
                )
            })
            .collect();
        TripleStore {
            dict,
            table: TripleTable::new(ids, indexed),
        }
    }

    pub fn dictionary(&self) -> &TermDictionary {
        &self.dict
    }

    pub fn table(&self) -> &TripleTable {
        &self.table
    }

    /// Reads a store file.
    pub fn read_from_path(path: &Path, options: OpenOptions) -> Result<TripleStore> {
        let file = File::open(path)
            .map_err(|e| tern_common::error::Error::io(path.display().to_string(), e))?;
        let store = Self::read(&mut BufReader::new(file), options)?;
        debug!(
            "loaded store from {}: {} triples, indexed={}",
            path.display(),
            store.table.num_triples(),
            store.table.is_indexed()
        );
        Ok(store)
    }

    /// Reads a store from any reader positioned at the magic tag.
    pub fn read<R: Read>(reader: &mut R, options: OpenOptions) -> Result<TripleStore> {
        format::read_magic(reader)?;

        let header = format::read_message(reader, "header")?;
        let mut header = header.as_slice();
        let n_shared = header.read_u64::<LittleEndian>()?;
        let n_subjects = header.read_u64::<LittleEndian>()?;
        let n_predicates = header.read_u64::<LittleEndian>()?;
        let n_objects = header.read_u64::<LittleEndian>()?;
        let n_triples = header.read_u64::<LittleEndian>()?;

        let dict_payload = format::read_compressed(reader, "dictionary")?;
        let mut dict_payload = dict_payload.as_slice();
        let shared = read_section(&mut dict_payload, n_shared)?;
        let subjects = read_section(&mut dict_payload, n_subjects)?;
        let predicates = read_section(&mut dict_payload, n_predicates)?;
        let objects = read_section(&mut dict_payload, n_objects)?;
        let dict = TermDictionary::from_sections(shared, subjects, predicates, objects)?;

        let triples_payload = format::read_compressed(reader, "triples")?;
        // A lying header must not overflow the length check.
        verify_data!(
            triples,
            n_triples.checked_mul(12) == Some(triples_payload.len() as u64)
        );
        let mut triples_payload = triples_payload.as_slice();
        let mut triples = Vec::with_capacity(n_triples as usize);
        for _ in 0..n_triples {
            let s = triples_payload.read_u32::<LittleEndian>()?;
            let p = triples_payload.read_u32::<LittleEndian>()?;
            let o = triples_payload.read_u32::<LittleEndian>()?;
            triples.push(IdTriple::new(s, p, o));
        }
        let table = TripleTable::from_sorted(triples, options.indexed)?;

        Ok(TripleStore { dict, table })
    }

    /// Writes the store to a file.
    pub fn write_to_path(&self, path: &Path) -> Result<()> {
        let file = File::create(path)
            .map_err(|e| tern_common::error::Error::io(path.display().to_string(), e))?;
        let mut writer = BufWriter::new(file);
        self.write(&mut writer)?;
        writer
            .flush()
            .map_err(|e| tern_common::error::Error::io(path.display().to_string(), e))?;
        Ok(())
    }

    /// Writes the store to any writer.
    pub fn write<W: Write>(&self, writer: &mut W) -> Result<()> {
        format::write_magic(writer)?;

        let [shared, subjects, predicates, objects] = self.dict.sections();
        let mut header = Vec::new();
        for count in [
            shared.len(),
            subjects.len(),
            predicates.len(),
            objects.len(),
            self.table.triples().len(),
        ] {
            header.write_u64::<LittleEndian>(count as u64)?;
        }
        format::write_message(writer, &header)?;

        let mut dict_payload = Vec::new();
        for section in [shared, subjects, predicates, objects] {
            for term in section {
                dict_payload.write_u32::<LittleEndian>(term.len() as u32)?;
                dict_payload.extend_from_slice(term.as_bytes());
            }
        }
        format::write_compressed(writer, &dict_payload)?;

        let mut triples_payload = Vec::with_capacity(self.table.triples().len() * 12);
        for t in self.table.triples() {
            triples_payload.write_u32::<LittleEndian>(t.subject)?;
            triples_payload.write_u32::<LittleEndian>(t.predicate)?;
            triples_payload.write_u32::<LittleEndian>(t.object)?;
        }
        format::write_compressed(writer, &triples_payload)?;

        Ok(())
    }
}

fn read_section(payload: &mut &[u8], count: u64) -> Result<Vec<String>> {
    // Each term costs at least its 4-byte length prefix; reject a header
    // count the payload cannot possibly hold before allocating for it.
    verify_data!(
        section,
        count
            .checked_mul(4)
            .is_some_and(|min| min <= payload.len() as u64)
    );
    let mut section = Vec::with_capacity(count as usize);
    for _ in 0..count {
        let len = payload.read_u32::<LittleEndian>()? as usize;
        verify_data!(term, payload.len() >= len);
        let (bytes, rest) = payload.split_at(len);
        let term = std::str::from_utf8(bytes)
            .map_err(|_| {
                tern_common::error::Error::invalid_format("dictionary term", "not valid UTF-8")
            })?
            .to_string();
        *payload = rest;
        section.push(term);
    }
    Ok(section)
}

impl Dictionary for TripleStore {
    fn term_to_id(&self, term: &str, position: TermPosition) -> Option<TermId> {
        self.dict.term_to_id(term, position)
    }

    fn id_to_term(&self, id: TermId, position: TermPosition) -> Result<String> {
        self.dict.id_to_term(id, position)
    }

    fn num_shared(&self) -> u64 {
        self.dict.num_shared()
    }

    fn num_subjects(&self) -> u64 {
        self.dict.num_subjects()
    }

    fn num_predicates(&self) -> u64 {
        self.dict.num_predicates()
    }

    fn num_objects(&self) -> u64 {
        self.dict.num_objects()
    }
}

impl TripleIndex for TripleStore {
    fn search<'a>(
        &'a self,
        pattern: IdPattern,
        window: Window,
    ) -> Result<(IdTripleStream<'a>, SizeHint)> {
        self.table.search(pattern, window)
    }

    fn num_triples(&self) -> u64 {
        self.table.num_triples()
    }
}
