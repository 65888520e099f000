//! Inspect command implementation

use anyhow::{Context, Result};
use serde::Serialize;
use std::path::Path;
use tern_index::{Dictionary, TripleIndex};
use tern_store::{OpenOptions, TripleStore};

#[derive(Serialize)]
struct InspectSummary {
    store: StoreInfo,
    dictionary: DictionaryInfo,
    #[serde(skip_serializing_if = "Option::is_none")]
    sections: Option<SectionTerms>,
}

#[derive(Serialize)]
struct StoreInfo {
    path: String,
    triples: u64,
    indexed: bool,
}

#[derive(Serialize)]
struct DictionaryInfo {
    shared: u64,
    subjects: u64,
    predicates: u64,
    objects: u64,
}

#[derive(Serialize)]
struct SectionTerms {
    shared: Vec<String>,
    subjects: Vec<String>,
    predicates: Vec<String>,
    objects: Vec<String>,
}

pub fn run(verbose: u8, store_path: &str) -> Result<()> {
    let store = TripleStore::read_from_path(Path::new(store_path), OpenOptions::default())
        .with_context(|| format!("Failed to open store: {store_path}"))?;

    let sections = (verbose > 0).then(|| {
        let [shared, subjects, predicates, objects] = store.dictionary().sections();
        SectionTerms {
            shared: shared.to_vec(),
            subjects: subjects.to_vec(),
            predicates: predicates.to_vec(),
            objects: objects.to_vec(),
        }
    });

    let summary = InspectSummary {
        store: StoreInfo {
            path: store_path.to_string(),
            triples: store.num_triples(),
            indexed: store.table().is_indexed(),
        },
        dictionary: DictionaryInfo {
            shared: store.num_shared(),
            subjects: store.num_subjects(),
            predicates: store.num_predicates(),
            objects: store.num_objects(),
        },
        sections,
    };

    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}
