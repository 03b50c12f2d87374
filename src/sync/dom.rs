use super::reindex::{normalize, NormalizeReport};
use crate::models::{FieldAttr, RegionMark};
use crate::state::FocusTarget;
use crate::tree::ContentTree;

/// The live document the editor projects onto.
///
/// Implementations are best-effort: a missing element is skipped, never an error,
/// since the tree stays authoritative and the next pass repairs the projection.
pub trait DocumentHost {
    /// Set `attr` from `from` to `to` on the field element inside `scope`.
    fn rewrite_attribute(&mut self, scope: &str, attr: FieldAttr, from: &str, to: &str);

    /// Reorder block elements to `order`.
    fn arrange_blocks(&mut self, order: &[String]);

    /// Reorder a group's item elements (list entries and detail panes) to `order`.
    fn arrange_items(&mut self, block: &str, order: &[String]);

    /// Detach a block or item element.
    fn remove_node(&mut self, id: &str);

    /// Mount rendered block markup so it becomes the `index`-th block.
    fn insert_fragment(&mut self, index: usize, html: &str);

    /// Adopt the palette copy just dropped as the pending placeholder,
    /// replacing any one adopted earlier.
    fn keep_placeholder(&mut self, type_name: &str);

    /// Put the adopted copy back behind the first `gap` real nodes of its list:
    /// the block list, or `group`'s item list.
    fn settle_placeholder(&mut self, group: Option<&str>, gap: usize);

    /// Drop palette copies that were never adopted.
    fn discard_stray_placeholders(&mut self);

    /// Drop every palette placeholder in the block list and the group lists.
    fn remove_placeholders(&mut self);

    fn activate_rich_region(&mut self, id: &str);

    /// Highlight `item`'s list entry and show only its detail pane.
    fn show_group_item(&mut self, block: &str, item: &str);

    /// Highlight one block's add affordance, or clear all highlights.
    fn set_add_active(&mut self, block: Option<&str>);

    /// Deactivate the palette panel and clear its search input.
    fn close_palette(&mut self);

    fn set_palette_entry_visible(&mut self, type_name: &str, visible: bool);

    fn set_categories_visible(&mut self, visible: bool);

    /// Focus `target`, or blur whatever holds focus.
    fn focus(&mut self, target: Option<&FocusTarget>);

    fn swap_region_contents(&mut self, a: &str, b: &str);

    fn set_region_mark(&mut self, id: &str, mark: RegionMark);
}

/// Write a normalize result to the document and put nodes in tree order.
pub fn apply<H: DocumentHost + ?Sized>(host: &mut H, tree: &ContentTree, report: &NormalizeReport) {
    for r in &report.rewrites {
        host.rewrite_attribute(&r.scope, r.attr, &r.from, &r.to);
    }

    host.arrange_blocks(&tree.block_ids());
    for (b, block) in tree.blocks().iter().enumerate() {
        if block.is_group() {
            host.arrange_items(&block.id, &tree.item_ids(b));
        }
    }
}

/// Normalize the tree and project the result.
pub fn reconcile<H: DocumentHost + ?Sized>(tree: &mut ContentTree, host: &mut H) -> NormalizeReport {
    let report = normalize(tree);
    apply(host, tree, &report);
    report
}
