use super::dom::DocumentHost;
use crate::fragment;
use crate::models::{Block, FieldAttr, RegionMark};
use crate::state::FocusTarget;
use crate::tree::ContentTree;
use std::collections::{BTreeMap, BTreeSet};

/// In-memory document for headless embedding and native tests.
///
/// Keeps just enough structure to observe what the editor projected: node order,
/// field attributes per scope, and the palette/focus chrome state.
#[derive(Clone, Debug, Default)]
pub struct MemoryHost {
    pub block_order: Vec<String>,
    /// block id -> item ids
    pub item_order: BTreeMap<String, Vec<String>>,
    /// scope id -> attributes of the fields it owns
    pub attributes: BTreeMap<String, Vec<(FieldAttr, String)>>,

    /// Type of the palette copy kept as placeholder.
    pub placeholder: Option<String>,
    /// Real nodes ahead of the kept copy in its list.
    pub placeholder_gap: Option<usize>,
    pub activated_regions: Vec<String>,
    /// block id -> displayed item id
    pub shown_items: BTreeMap<String, String>,
    pub add_active: Option<String>,
    pub palette_open: bool,
    pub search_text: String,
    pub hidden_entries: BTreeSet<String>,
    pub categories_visible: bool,
    pub focused: Option<String>,
    pub region_marks: BTreeMap<String, RegionMark>,
    pub region_html: BTreeMap<String, String>,
}

impl MemoryHost {
    /// A document already showing `tree`.
    pub fn from_tree(tree: &ContentTree) -> Self {
        let mut host = Self {
            categories_visible: true,
            ..Default::default()
        };
        for block in tree.blocks() {
            host.mount(host.block_order.len(), block);
        }
        host
    }

    pub fn has_attribute(&self, scope: &str, attr: FieldAttr, value: &str) -> bool {
        self.attributes
            .get(scope)
            .is_some_and(|xs| xs.iter().any(|(a, v)| *a == attr && v == value))
    }

    /// True when order and every field attribute match the tree.
    pub fn mirrors(&self, tree: &ContentTree) -> bool {
        if self.block_order != tree.block_ids() {
            return false;
        }

        tree.blocks().iter().enumerate().all(|(b, block)| {
            let own = block
                .fields
                .iter()
                .all(|f| self.has_attribute(&block.id, f.attr, &f.value));
            let order = !block.is_group()
                || self.item_order.get(&block.id) == Some(&tree.item_ids(b));
            let items = block.items().iter().all(|item| {
                item.fields
                    .iter()
                    .all(|f| self.has_attribute(&item.id, f.attr, &f.value))
            });
            own && order && items
        })
    }

    fn mount(&mut self, index: usize, block: &Block) {
        let at = index.min(self.block_order.len());
        self.block_order.insert(at, block.id.clone());
        self.attributes.insert(
            block.id.clone(),
            block
                .fields
                .iter()
                .map(|f| (f.attr, f.value.clone()))
                .collect(),
        );

        if block.is_group() {
            self.item_order.insert(
                block.id.clone(),
                block.items().iter().map(|i| i.id.clone()).collect(),
            );
        }
        for item in block.items() {
            self.attributes.insert(
                item.id.clone(),
                item.fields
                    .iter()
                    .map(|f| (f.attr, f.value.clone()))
                    .collect(),
            );
            if item.selected {
                self.shown_items.insert(block.id.clone(), item.id.clone());
            }
        }
    }
}

impl DocumentHost for MemoryHost {
    fn rewrite_attribute(&mut self, scope: &str, attr: FieldAttr, from: &str, to: &str) {
        let Some(attrs) = self.attributes.get_mut(scope) else {
            return;
        };
        if let Some(slot) = attrs.iter_mut().find(|(a, v)| *a == attr && v == from) {
            slot.1 = to.to_string();
        }
    }

    fn arrange_blocks(&mut self, order: &[String]) {
        self.block_order = order.to_vec();
    }

    fn arrange_items(&mut self, block: &str, order: &[String]) {
        self.item_order.insert(block.to_string(), order.to_vec());
    }

    fn remove_node(&mut self, id: &str) {
        self.block_order.retain(|b| b != id);
        if let Some(items) = self.item_order.remove(id) {
            for item in items {
                self.attributes.remove(&item);
            }
        }
        for items in self.item_order.values_mut() {
            items.retain(|i| i != id);
        }
        self.attributes.remove(id);
    }

    fn insert_fragment(&mut self, index: usize, html: &str) {
        match fragment::scan(html, "") {
            Ok(block) => self.mount(index, &block),
            Err(e) => tracing::warn!("memory host could not mount fragment: {e}"),
        }
    }

    fn keep_placeholder(&mut self, type_name: &str) {
        self.placeholder = Some(type_name.to_string());
    }

    fn settle_placeholder(&mut self, _group: Option<&str>, gap: usize) {
        if self.placeholder.is_some() {
            self.placeholder_gap = Some(gap);
        }
    }

    // Stray copies only exist in a live document.
    fn discard_stray_placeholders(&mut self) {}

    fn remove_placeholders(&mut self) {
        self.placeholder = None;
        self.placeholder_gap = None;
    }

    fn activate_rich_region(&mut self, id: &str) {
        self.activated_regions.push(id.to_string());
    }

    fn show_group_item(&mut self, block: &str, item: &str) {
        self.shown_items.insert(block.to_string(), item.to_string());
    }

    fn set_add_active(&mut self, block: Option<&str>) {
        self.add_active = block.map(str::to_string);
        if block.is_some() {
            self.palette_open = true;
        }
    }

    fn close_palette(&mut self) {
        self.palette_open = false;
        self.search_text.clear();
    }

    fn set_palette_entry_visible(&mut self, type_name: &str, visible: bool) {
        if visible {
            self.hidden_entries.remove(type_name);
        } else {
            self.hidden_entries.insert(type_name.to_string());
        }
    }

    fn set_categories_visible(&mut self, visible: bool) {
        self.categories_visible = visible;
    }

    fn focus(&mut self, target: Option<&FocusTarget>) {
        self.focused = target.map(|t| t.0.clone());
    }

    fn swap_region_contents(&mut self, a: &str, b: &str) {
        let left = self.region_html.remove(a).unwrap_or_default();
        let right = self.region_html.remove(b).unwrap_or_default();
        self.region_html.insert(a.to_string(), right);
        self.region_html.insert(b.to_string(), left);
    }

    fn set_region_mark(&mut self, id: &str, mark: RegionMark) {
        self.region_marks.insert(id.to_string(), mark);
    }
}
