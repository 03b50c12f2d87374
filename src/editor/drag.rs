use super::{CreationTicket, Editor};
use crate::error::{EditorError, EditorResult};
use crate::models::DraggedNode;
use crate::state::Placeholder;
use crate::sync::DocumentHost;
use std::fmt;

/// A sortable list taking part in drag and drop.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ListKind {
    /// Block type palette; entries are copied out, never moved.
    Palette,
    Blocks,
    /// Item list of the group block with this id.
    Group(String),
}

impl fmt::Display for ListKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ListKind::Palette => write!(f, "palette"),
            ListKind::Blocks => write!(f, "block list"),
            ListKind::Group(id) => write!(f, "group list of {id}"),
        }
    }
}

/// Whether `target` takes drops coming from `source`.
pub fn accepts(target: &ListKind, source: &ListKind) -> bool {
    match (target, source) {
        (ListKind::Palette, _) => false,
        (_, ListKind::Palette) => true,
        (ListKind::Blocks, ListKind::Blocks) => true,
        (ListKind::Group(_), ListKind::Group(_)) => true,
        _ => false,
    }
}

/// The block list changed under a drag.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BlockListUpdate {
    pub item: DraggedNode,
    pub source: ListKind,
    /// Zero-based, read with the dragged node detached.
    pub destination: usize,
}

/// A group's item list changed under a drag.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GroupListUpdate {
    pub item: DraggedNode,
    pub source: ListKind,
    pub target_block: String,
    pub destination: usize,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DropOutcome {
    Reordered,
    /// A palette entry was dropped; the request still has to be sent.
    Create(CreationTicket),
}

impl<H: DocumentHost> Editor<H> {
    pub fn on_block_list_update(&mut self, update: BlockListUpdate) -> EditorResult<DropOutcome> {
        check_drop(&ListKind::Blocks, &update.source)?;

        match update.item {
            DraggedNode::Placeholder { type_name } => {
                let index = self
                    .list_index(None, update.destination)
                    .min(self.tree.len());
                self.drop_placeholder(type_name, None, index, index)
            }
            DraggedNode::Block { id } => {
                let from = self
                    .tree
                    .position_of_block(&id)
                    .ok_or(EditorError::UnknownBlock(id))?;
                self.placeholder_node_left(None, from);
                let to = self
                    .placeholder_node_entered(None, update.destination)
                    .min(self.tree.len() - 1);
                self.tree.move_block(from, to);
                self.reconcile();
                Ok(DropOutcome::Reordered)
            }
            DraggedNode::Item { id } => Err(EditorError::DropRejected {
                from: format!("group item {id}"),
                to: ListKind::Blocks.to_string(),
            }),
        }
    }

    pub fn on_group_list_update(&mut self, update: GroupListUpdate) -> EditorResult<DropOutcome> {
        let target = ListKind::Group(update.target_block.clone());
        check_drop(&target, &update.source)?;

        let to_block = self
            .tree
            .position_of_block(&update.target_block)
            .ok_or_else(|| EditorError::UnknownBlock(update.target_block.clone()))?;

        match update.item {
            // Palette entries always become top-level blocks.
            DraggedNode::Placeholder { type_name } => {
                let group = update.target_block;
                let gap = self
                    .list_index(Some(group.as_str()), update.destination)
                    .min(self.tree.blocks()[to_block].items().len());
                self.drop_placeholder(type_name, Some(group), gap, to_block + 1)
            }
            DraggedNode::Item { id } => {
                if !self.tree.blocks()[to_block].is_group() {
                    return Err(EditorError::NotAGroup(update.target_block));
                }
                let (from_block, from_index) = self
                    .tree
                    .locate_item(&id)
                    .ok_or(EditorError::UnknownItem(id))?;

                let source = self.tree.blocks()[from_block].id.clone();
                self.placeholder_node_left(Some(source.as_str()), from_index);

                let room = self.tree.blocks()[to_block].items().len();
                let room = if from_block == to_block { room - 1 } else { room };
                let to_index = self
                    .placeholder_node_entered(Some(update.target_block.as_str()), update.destination)
                    .min(room);

                self.tree
                    .move_group_item_across_blocks(from_block, from_index, to_block, to_index);
                self.reconcile();
                self.show_selected_item(to_block);
                if from_block != to_block {
                    self.show_selected_item(from_block);
                }
                Ok(DropOutcome::Reordered)
            }
            DraggedNode::Block { id } => Err(EditorError::DropRejected {
                from: format!("block {id}"),
                to: target.to_string(),
            }),
        }
    }

    fn drop_placeholder(
        &mut self,
        type_name: String,
        group: Option<String>,
        gap: usize,
        index: usize,
    ) -> EditorResult<DropOutcome> {
        let ticket = match self.begin_creation(&type_name, index) {
            Ok(ticket) => ticket,
            Err(e) => {
                self.host.discard_stray_placeholders();
                return Err(e);
            }
        };
        self.host.keep_placeholder(&type_name);
        self.session.placeholder = Some(Placeholder {
            type_name,
            index,
            group,
            gap,
        });
        Ok(DropOutcome::Create(ticket))
    }

    /// List index for a drop that replaces the kept placeholder.
    fn list_index(&self, group: Option<&str>, destination: usize) -> usize {
        match &self.session.placeholder {
            Some(p) if p.sits_in(group) && destination > p.gap => destination - 1,
            _ => destination,
        }
    }

    pub(super) fn placeholder_node_left(&mut self, group: Option<&str>, index: usize) {
        if let Some(p) = self.session.placeholder.as_mut().filter(|p| p.sits_in(group)) {
            p.node_left(index);
        }
    }

    fn placeholder_node_entered(&mut self, group: Option<&str>, destination: usize) -> usize {
        match self.session.placeholder.as_mut().filter(|p| p.sits_in(group)) {
            Some(p) => p.node_entered(destination),
            None => destination,
        }
    }
}

fn check_drop(target: &ListKind, source: &ListKind) -> EditorResult<()> {
    if accepts(target, source) {
        return Ok(());
    }
    tracing::warn!(%source, %target, "drop rejected");
    Err(EditorError::DropRejected {
        from: source.to_string(),
        to: target.to_string(),
    })
}
