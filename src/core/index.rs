// File: src/core/index.rs
use crate::core::normalize::{dedup_key, is_blank, normalize_field};
use crate::core::types::CourseRecord;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock};
use tracing::{debug, info};

/// Immutable lookup snapshot over a merged catalog.
///
/// Built once from a set of records and never patched in place. Alias
/// promotion goes through [`SubjectIndex::with_aliases`], which returns a new
/// snapshot that is swapped in through [`SharedIndex`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SubjectIndex {
    names: HashMap<String, CourseRecord>,
    codes: HashMap<String, String>,
    aliases: HashMap<String, String>,
    professors: HashMap<String, Vec<String>>,
    /// Canonical names in lexicographic order, so fuzzy scans are reproducible.
    name_order: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct IndexStats {
    pub courses: usize,
    pub codes: usize,
    pub aliases: usize,
    pub professors: usize,
}

impl SubjectIndex {
    /// Normalizes, deduplicates and indexes the records in one pass.
    /// Pure function of its input.
    pub fn build<I>(records: I) -> Self
    where
        I: IntoIterator<Item = CourseRecord>,
    {
        let mut normalized: Vec<CourseRecord> = records
            .into_iter()
            .filter_map(normalize_record)
            .collect();

        // Newest semester first, so the dedup passes below keep it.
        normalized.sort_by(|a, b| b.semester.cmp(&a.semester));

        let mut seen_codes = HashSet::new();
        let mut seen_names = HashSet::new();
        let mut index = SubjectIndex::default();

        for record in normalized {
            if !record.code.is_empty() && !seen_codes.insert(record.code.clone()) {
                debug!(code = %record.code, semester = %record.semester, "older duplicate code dropped");
                continue;
            }
            if !seen_names.insert(dedup_key(&record.name)) {
                debug!(name = %record.name, "near-duplicate name collapsed");
                continue;
            }
            index.insert(record);
        }

        index.name_order = index.names.keys().cloned().collect();
        index.name_order.sort();

        let stats = index.stats();
        info!(
            courses = stats.courses,
            codes = stats.codes,
            aliases = stats.aliases,
            professors = stats.professors,
            "subject index built"
        );
        index
    }

    fn insert(&mut self, record: CourseRecord) {
        let name = record.name.clone();

        if !record.code.is_empty() {
            self.codes.insert(record.code.clone(), name.clone());
        }

        if !record.professor.is_empty() {
            let taught = self.professors.entry(record.professor.clone()).or_default();
            if !taught.contains(&name) {
                taught.push(name.clone());
            }
        }

        for alias in &record.aliases {
            if alias == &name {
                continue;
            }
            if let Some(existing) = self.aliases.get(alias) {
                if existing != &name {
                    debug!(alias = %alias, kept = %existing, dropped = %name, "alias already claimed");
                    continue;
                }
            }
            self.aliases.insert(alias.clone(), name.clone());
        }

        self.names.insert(name, record);
    }

    /// Returns a new snapshot with `ocr_text -> corrected_text` aliases added.
    ///
    /// A target must resolve to a canonical name (directly, through an alias
    /// or through a code); unresolvable pairs are skipped. Existing canonical
    /// names are never shadowed.
    pub fn with_aliases<'a, I>(&self, pairs: I) -> (SubjectIndex, usize)
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut next = self.clone();
        let mut injected = 0;
        for (ocr_text, corrected) in pairs {
            let (ocr_text, corrected) = (ocr_text.trim(), corrected.trim());
            let Some(target) = self.resolve_exact(corrected).map(str::to_string) else {
                debug!(ocr = %ocr_text, corrected = %corrected, "correction target not in catalog, alias skipped");
                continue;
            };
            if ocr_text.is_empty() || self.names.contains_key(ocr_text) {
                continue;
            }
            if next.aliases.get(ocr_text) != Some(&target) {
                next.aliases.insert(ocr_text.to_string(), target);
                injected += 1;
            }
        }
        (next, injected)
    }

    /// Name, alias or code lookup, in that order.
    pub fn resolve_exact(&self, text: &str) -> Option<&str> {
        if let Some((name, _)) = self.names.get_key_value(text) {
            return Some(name.as_str());
        }
        self.aliases
            .get(text)
            .or_else(|| self.codes.get(text))
            .map(String::as_str)
    }

    pub fn record(&self, name: &str) -> Option<&CourseRecord> {
        self.names.get(name)
    }

    pub fn contains_name(&self, name: &str) -> bool {
        self.names.contains_key(name)
    }

    pub fn name_for_code(&self, code: &str) -> Option<&str> {
        self.codes.get(code).map(String::as_str)
    }

    pub fn name_for_alias(&self, alias: &str) -> Option<&str> {
        self.aliases.get(alias).map(String::as_str)
    }

    /// Canonical names taught by `professor`; empty when unknown.
    pub fn courses_taught_by(&self, professor: &str) -> &[String] {
        self.professors.get(professor).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn knows_professor(&self, professor: &str) -> bool {
        self.professors.contains_key(professor)
    }

    /// Professors known to teach `name`, sorted.
    pub fn professors_teaching(&self, name: &str) -> Vec<&str> {
        let mut found: Vec<&str> = self
            .professors
            .iter()
            .filter(|(_, taught)| taught.iter().any(|n| n == name))
            .map(|(prof, _)| prof.as_str())
            .collect();
        found.sort_unstable();
        found
    }

    /// Canonical names in lexicographic order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.name_order.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn stats(&self) -> IndexStats {
        IndexStats {
            courses: self.names.len(),
            codes: self.codes.len(),
            aliases: self.aliases.len(),
            professors: self.professors.len(),
        }
    }
}

fn normalize_record(record: CourseRecord) -> Option<CourseRecord> {
    let name = normalize_field(&record.name);
    if is_blank(&name) {
        debug!(code = %record.code, "record without a name skipped");
        return None;
    }
    let clean = |s: &str| {
        let v = normalize_field(s);
        if is_blank(&v) { String::new() } else { v }
    };
    Some(CourseRecord {
        code: clean(&record.code),
        professor: clean(&record.professor),
        credit: clean(&record.credit),
        semester: clean(&record.semester),
        aliases: record
            .aliases
            .iter()
            .map(|a| normalize_field(a))
            .filter(|a| !is_blank(a))
            .collect(),
        name,
    })
}

/// Holder for the live snapshot.
///
/// Readers take an `Arc` and keep matching against it even while a rebuilt
/// index is being swapped in; the swap itself replaces the whole value.
#[derive(Debug, Default)]
pub struct SharedIndex {
    current: RwLock<Arc<SubjectIndex>>,
}

impl SharedIndex {
    pub fn new(index: SubjectIndex) -> Self {
        Self { current: RwLock::new(Arc::new(index)) }
    }

    pub fn snapshot(&self) -> Arc<SubjectIndex> {
        let guard = self.current.read().unwrap_or_else(|poisoned| poisoned.into_inner());
        Arc::clone(&guard)
    }

    pub fn replace(&self, index: SubjectIndex) {
        let mut guard = self.current.write().unwrap_or_else(|poisoned| poisoned.into_inner());
        *guard = Arc::new(index);
    }
}
