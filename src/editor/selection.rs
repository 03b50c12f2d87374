use super::{CreationTicket, Editor};
use crate::error::{EditorError, EditorResult};
use crate::sync::DocumentHost;

impl<H: DocumentHost> Editor<H> {
    /// Arm click/keyboard insertion after `block_id`.
    ///
    /// The index is looked up from the live order and re-derived after every
    /// mutation for as long as the highlight stays on.
    pub fn activate_add(&mut self, block_id: &str) -> EditorResult<usize> {
        let index = self
            .tree
            .position_of_block(block_id)
            .ok_or_else(|| EditorError::UnknownBlock(block_id.to_string()))?;

        self.session.selected_index = Some(index);
        self.session.add_active = Some(block_id.to_string());
        self.host.set_add_active(Some(block_id));
        Ok(index)
    }

    pub fn on_palette_drag_start(&mut self) {
        self.session.clear_selection();
        self.host.set_add_active(None);
    }

    /// Where a click/keyboard creation would insert.
    pub fn insertion_index(&self) -> Option<usize> {
        self.session.selected_index.map(|i| i + 1)
    }

    /// Palette entry clicked. Without an armed insertion point this is a no-op.
    pub fn click_palette_entry(&mut self, type_name: &str) -> EditorResult<Option<CreationTicket>> {
        let Some(index) = self.insertion_index() else {
            tracing::debug!(type_name, "palette click without insertion point");
            return Ok(None);
        };
        self.begin_creation(type_name, index).map(Some)
    }

    /// Confirm key in the palette search: inserts the sole remaining entry.
    pub fn confirm_search(&mut self) -> EditorResult<Option<CreationTicket>> {
        if self.session.selected_index.is_none() {
            return Ok(None);
        }
        let Some(type_name) = self.palette.sole_visible().map(|t| t.type_name.clone()) else {
            return Ok(None);
        };
        self.click_palette_entry(&type_name)
    }

    /// Display one group item and hide its siblings.
    pub fn select_group_item(&mut self, item_id: &str) -> EditorResult<()> {
        let (b, s) = self
            .tree
            .locate_item(item_id)
            .ok_or_else(|| EditorError::UnknownItem(item_id.to_string()))?;

        self.tree.select_group_item(b, s);
        let block_id = self.tree.blocks()[b].id.clone();
        self.host.show_group_item(&block_id, item_id);
        Ok(())
    }
}
