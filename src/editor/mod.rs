//! The editing session.
//!
//! [`Editor`] owns the content tree, the session state, the palette and the
//! document host. Every structural change goes through it and ends with a full
//! reconcile, so the document's positional identifiers always match tree order
//! once a handler returns.

mod creation;
mod drag;
mod filter;
mod selection;

pub use creation::{create_block, CreationTicket};
pub use drag::{accepts, BlockListUpdate, DropOutcome, GroupListUpdate, ListKind};
pub use filter::{Palette, PaletteEntry};

use crate::error::{EditorError, EditorResult};
use crate::models::{Block, GroupItem, RegionMark};
use crate::state::{FocusTarget, SessionState};
use crate::sync::{reconcile, DocumentHost, NormalizeReport};
use crate::tree::ContentTree;

pub struct Editor<H> {
    tree: ContentTree,
    session: SessionState,
    palette: Palette,
    host: H,
}

impl<H: DocumentHost> Editor<H> {
    /// Start a session over `tree`, normalizing it against `host` first.
    pub fn new(tree: ContentTree, palette: Palette, host: H) -> Self {
        let mut editor = Self {
            tree,
            session: SessionState::new(),
            palette,
            host,
        };
        editor.reconcile();
        editor
    }

    pub fn tree(&self) -> &ContentTree {
        &self.tree
    }

    pub fn session(&self) -> &SessionState {
        &self.session
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    /// Record the element focused before the palette took over.
    pub fn note_focus(&mut self, element_id: impl Into<String>) {
        self.session.note_focus(FocusTarget(element_id.into()));
    }

    /// Normalize and project; also re-derives the selected index from the
    /// highlighted block, since indices shift under any mutation.
    pub(crate) fn reconcile(&mut self) -> NormalizeReport {
        let report = reconcile(&mut self.tree, &mut self.host);
        if let Some(p) = &self.session.placeholder {
            self.host.settle_placeholder(p.group.as_deref(), p.gap);
        }

        if let Some(active) = self.session.add_active.clone() {
            match self.tree.position_of_block(&active) {
                Some(index) => self.session.selected_index = Some(index),
                None => {
                    self.session.clear_selection();
                    self.host.set_add_active(None);
                }
            }
        }
        report
    }

    pub fn remove_block(&mut self, index: usize) -> Block {
        let removed = self.tree.remove_block(index);
        self.host.remove_node(&removed.id);
        self.placeholder_node_left(None, index);
        // A copy dropped into the removed group went with it.
        if self
            .session
            .placeholder
            .as_ref()
            .is_some_and(|p| p.sits_in(Some(removed.id.as_str())))
        {
            self.session.placeholder = None;
        }
        self.reconcile();
        removed
    }

    pub fn remove_block_by_id(&mut self, id: &str) -> EditorResult<Block> {
        let index = self
            .tree
            .position_of_block(id)
            .ok_or_else(|| EditorError::UnknownBlock(id.to_string()))?;
        Ok(self.remove_block(index))
    }

    pub fn remove_group_item_by_id(&mut self, id: &str) -> EditorResult<GroupItem> {
        let (b, s) = self
            .tree
            .locate_item(id)
            .ok_or_else(|| EditorError::UnknownItem(id.to_string()))?;

        let removed = self.tree.remove_group_item(b, s);
        self.host.remove_node(&removed.id);
        let block_id = self.tree.blocks()[b].id.clone();
        self.placeholder_node_left(Some(block_id.as_str()), s);
        if removed.selected {
            self.show_selected_item(b);
        }
        self.reconcile();
        Ok(removed)
    }

    /// Swap the contents of a two-column block. Returns false for any other layout.
    pub fn swap_columns(&mut self, block_id: &str) -> EditorResult<bool> {
        let index = self
            .tree
            .position_of_block(block_id)
            .ok_or_else(|| EditorError::UnknownBlock(block_id.to_string()))?;

        match self.tree.blocks()[index].regions.as_slice() {
            [left, right] => {
                self.host.swap_region_contents(left, right);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    /// A region showing its empty hint is being edited.
    pub fn focus_region(&mut self, id: &str, marked_empty: bool) {
        if marked_empty {
            self.host.set_region_mark(id, RegionMark::CheckEmpty);
            self.session.checking_regions.insert(id.to_string());
        }
    }

    /// Re-apply the empty hint if the region was left empty.
    pub fn blur_region(&mut self, id: &str, is_empty: bool) {
        if is_empty && self.session.checking_regions.remove(id) {
            self.host.set_region_mark(id, RegionMark::Empty);
        }
    }

    fn show_selected_item(&mut self, block: usize) {
        let b = &self.tree.blocks()[block];
        if let Some(s) = b.selected_item() {
            self.host.show_group_item(&b.id, &b.items()[s].id);
        }
    }
}
