use super::Editor;
use crate::models::BlockType;
use crate::sync::DocumentHost;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PaletteEntry {
    pub block_type: BlockType,
    pub visible: bool,
}

/// Block types available for insertion, with their filter visibility.
#[derive(Clone, Debug, Default)]
pub struct Palette {
    entries: Vec<PaletteEntry>,
    categories_visible: bool,
    query: String,
}

impl Palette {
    pub fn new(types: Vec<BlockType>) -> Self {
        Self {
            entries: types
                .into_iter()
                .map(|block_type| PaletteEntry {
                    block_type,
                    visible: true,
                })
                .collect(),
            categories_visible: true,
            query: String::new(),
        }
    }

    /// Load the palette manifest (a JSON array of block types).
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        Ok(Self::new(serde_json::from_str(json)?))
    }

    pub fn entries(&self) -> &[PaletteEntry] {
        &self.entries
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn categories_visible(&self) -> bool {
        self.categories_visible
    }

    /// Category headers in first-seen order.
    pub fn categories(&self) -> Vec<&str> {
        let mut out: Vec<&str> = vec![];
        for e in &self.entries {
            let c = e.block_type.category.as_str();
            if !out.contains(&c) {
                out.push(c);
            }
        }
        out
    }

    pub fn get(&self, type_name: &str) -> Option<&BlockType> {
        self.entries
            .iter()
            .map(|e| &e.block_type)
            .find(|t| t.type_name == type_name)
    }

    pub fn visible(&self) -> impl Iterator<Item = &BlockType> {
        self.entries
            .iter()
            .filter(|e| e.visible)
            .map(|e| &e.block_type)
    }

    /// The only visible entry, if exactly one is left.
    pub fn sole_visible(&self) -> Option<&BlockType> {
        let mut visible = self.visible();
        let first = visible.next()?;
        visible.next().is_none().then_some(first)
    }

    /// Case-insensitive label filter. An empty query shows everything, including
    /// category headers; any other query hides the headers.
    ///
    /// Labels containing the query win. Only when none does are abbreviations
    /// like `hdr` matched as in-order characters.
    pub fn filter(&mut self, query: &str) {
        let q = query.to_lowercase();
        let loose = !q.is_empty()
            && !self
                .entries
                .iter()
                .any(|e| e.block_type.title.to_lowercase().contains(&q));

        for e in self.entries.iter_mut() {
            let label = e.block_type.title.to_lowercase();
            e.visible = q.is_empty()
                || label.contains(&q)
                || (loose && is_subsequence(&q, &label));
        }
        self.categories_visible = q.is_empty();
        self.query = query.to_string();
    }
}

fn is_subsequence(query: &str, label: &str) -> bool {
    let mut rest = label.chars();
    query.chars().all(|q| rest.any(|c| c == q))
}

impl<H: DocumentHost> Editor<H> {
    pub fn filter(&mut self, query: &str) {
        self.palette.filter(query);
        self.project_palette();
    }

    pub(crate) fn project_palette(&mut self) {
        for e in self.palette.entries() {
            self.host
                .set_palette_entry_visible(&e.block_type.type_name, e.visible);
        }
        self.host
            .set_categories_visible(self.palette.categories_visible());
    }
}
