//! Fragment providers.
//!
//! The engine never reads layout itself; a [`FragmentProvider`] supplies the
//! rendered fragments of a page from whatever backend renders the document
//! (browser text layer, native PDF library, server-side layout).

use crate::error::{Error, Result};
use crate::model::RenderedFragment;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;

/// Source of rendered fragments, one page at a time.
pub trait FragmentProvider {
    /// Rendered fragments of `page` (1-based), in render order.
    fn page_fragments(&self, page: u32) -> Result<Vec<RenderedFragment>>;
}

impl<F> FragmentProvider for F
where
    F: Fn(u32) -> Result<Vec<RenderedFragment>>,
{
    fn page_fragments(&self, page: u32) -> Result<Vec<RenderedFragment>> {
        self(page)
    }
}

/// Pre-rendered pages held in memory.
///
/// Serialized as `{ "pages": { "<n>": [ { "text": ..., "box": { ... } } ] } }`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StaticPages {
    pub pages: BTreeMap<u32, Vec<RenderedFragment>>,
}

impl StaticPages {
    /// Creates an empty page set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces the fragments of `page`.
    pub fn insert(&mut self, page: u32, fragments: Vec<RenderedFragment>) {
        self.pages.insert(page, fragments);
    }

    /// Builder-style [`insert`](Self::insert).
    pub fn with_page(mut self, page: u32, fragments: Vec<RenderedFragment>) -> Self {
        self.insert(page, fragments);
        self
    }

    /// Decodes pages from a JSON string.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Decodes pages from a JSON reader.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        Ok(serde_json::from_reader(std::io::BufReader::new(reader))?)
    }

    /// Decodes pages from a JSON file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    /// Checks every fragment for non-finite geometry.
    ///
    /// Resolution silently skips such fragments; loaders call this to
    /// report bad input instead.
    pub fn validate(&self) -> Result<()> {
        for (page, fragments) in &self.pages {
            if let Some((index, _)) = fragments
                .iter()
                .enumerate()
                .find(|(_, f)| !f.bbox.is_finite())
            {
                return Err(Error::InvalidFragment(format!(
                    "page {} fragment {} has non-finite bounds",
                    page, index
                )));
            }
        }
        Ok(())
    }

    /// Encodes the pages as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Number of pages held.
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Page numbers held, ascending.
    pub fn page_numbers(&self) -> impl Iterator<Item = u32> + '_ {
        self.pages.keys().copied()
    }
}

impl FragmentProvider for StaticPages {
    fn page_fragments(&self, page: u32) -> Result<Vec<RenderedFragment>> {
        self.pages.get(&page).cloned().ok_or(Error::PageNotFound(page))
    }
}
