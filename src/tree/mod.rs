//! Ordered two-level content model.
//!
//! The tree is the logical source of truth for block and item order; the document
//! is a projection of it. Structural operations never touch the document and never
//! rewrite identifiers. Callers follow every mutation with a normalize pass.
//!
//! Indices are preconditions: an out-of-range index is a caller bug and panics the
//! same way slice indexing does.

use crate::models::{Block, GroupItem};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ContentTree {
    blocks: Vec<Block>,
}

impl ContentTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_blocks(blocks: Vec<Block>) -> Self {
        Self { blocks }
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub(crate) fn blocks_mut(&mut self) -> &mut [Block] {
        &mut self.blocks
    }

    pub fn block(&self, index: usize) -> Option<&Block> {
        self.blocks.get(index)
    }

    pub fn block_ids(&self) -> Vec<String> {
        self.blocks.iter().map(|b| b.id.clone()).collect()
    }

    pub fn item_ids(&self, block: usize) -> Vec<String> {
        self.blocks[block]
            .items()
            .iter()
            .map(|i| i.id.clone())
            .collect()
    }

    /// Current index of a block, looked up from the live order.
    pub fn position_of_block(&self, id: &str) -> Option<usize> {
        self.blocks.iter().position(|b| b.id == id)
    }

    /// `(block, item)` indices of a group item.
    pub fn locate_item(&self, id: &str) -> Option<(usize, usize)> {
        self.blocks.iter().enumerate().find_map(|(b, block)| {
            block
                .items()
                .iter()
                .position(|i| i.id == id)
                .map(|s| (b, s))
        })
    }

    pub fn insert_block(&mut self, node: Block, at: usize) -> Vec<String> {
        tracing::debug!(block = %node.id, at, "insert block");
        self.blocks.insert(at, node);
        self.block_ids()
    }

    pub fn remove_block(&mut self, index: usize) -> Block {
        let removed = self.blocks.remove(index);
        tracing::debug!(block = %removed.id, index, "remove block");
        removed
    }

    /// Remove-then-insert; `to` is read against the list with the block detached.
    pub fn move_block(&mut self, from: usize, to: usize) -> Vec<String> {
        if from != to {
            let node = self.blocks.remove(from);
            tracing::debug!(block = %node.id, from, to, "move block");
            self.blocks.insert(to, node);
        }
        self.block_ids()
    }

    pub fn insert_group_item(&mut self, block: usize, node: GroupItem, at: usize) -> Vec<String> {
        let items = self.group_mut(block);
        let selected = node.selected;
        items.insert(at, node);
        if selected {
            select_only(items, at);
        }
        self.item_ids(block)
    }

    /// Removing the displayed item hands the display to the first remaining one.
    pub fn remove_group_item(&mut self, block: usize, item: usize) -> GroupItem {
        let items = self.group_mut(block);
        let removed = items.remove(item);
        if removed.selected && !items.is_empty() {
            select_only(items, 0);
        }
        removed
    }

    pub fn move_group_item(&mut self, block: usize, from: usize, to: usize) -> Vec<String> {
        if from != to {
            let items = self.group_mut(block);
            let node = items.remove(from);
            items.insert(to, node);
        }
        self.item_ids(block)
    }

    /// Move an item into another block's group.
    ///
    /// The moved item keeps its selection only if the target group has no
    /// displayed item yet.
    pub fn move_group_item_across_blocks(
        &mut self,
        from_block: usize,
        from_index: usize,
        to_block: usize,
        to_index: usize,
    ) -> Vec<String> {
        if from_block == to_block {
            return self.move_group_item(from_block, from_index, to_index);
        }

        // Validate the target before detaching anything.
        let _ = self.group_mut(to_block);

        let mut node = self.remove_group_item(from_block, from_index);
        let target = self.group_mut(to_block);
        if target.iter().any(|i| i.selected) {
            node.selected = false;
        }
        target.insert(to_index, node);
        self.item_ids(to_block)
    }

    /// Mark one item displayed and every sibling hidden.
    pub fn select_group_item(&mut self, block: usize, item: usize) {
        let items = self.group_mut(block);
        assert!(item < items.len(), "item index {item} out of range");
        select_only(items, item);
    }

    fn group_mut(&mut self, block: usize) -> &mut Vec<GroupItem> {
        let b = &mut self.blocks[block];
        match b.items.as_mut() {
            Some(items) => items,
            None => panic!("block {} is not a group", b.id),
        }
    }
}

fn select_only(items: &mut [GroupItem], index: usize) {
    for (i, item) in items.iter_mut().enumerate() {
        item.selected = i == index;
    }
}
