//! Browser document host.
//!
//! Markup contract, matching what the manager renders:
//! * `.blocks` holds one `.block-item` per block; palette placeholders dropped
//!   into it or into a group list are `.block-type` copies carrying
//!   `data-typename`.
//! * a group block lists its items as `.list-group-item[data-id]` entries in a
//!   `.list-group` and `.block-group-item` detail panes in `.block-group-items`,
//!   hidden with `d-none`.
//! * `.block-add` is a block's add affordance, `#panelBlocks` the palette panel,
//!   `#block-search` its search input, `.block-category` its category headers.

mod bindings;
mod log;

pub use bindings::BlockEditorHandle;
pub use log::init_logging;

use crate::fragment::{self, FragmentError};
use crate::models::{Block, FieldAttr, GroupItem, RegionMark};
use crate::state::FocusTarget;
use crate::sync::DocumentHost;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, Element};

const HIDDEN: &str = "d-none";
const ACTIVE: &str = "active";
/// Marks the dropped palette copy standing in for a pending block.
const KEPT: &str = "block-pending";

/// Elements a block scan reads.
const SCANNED: &str = "input, textarea, select, [contenteditable], button, \
    .block-group, .block-group-item, .block-editor";

pub struct WebHost {
    document: Document,
    root: Element,
    /// Called with a region's element id when it needs rich editing attached.
    activator: Option<js_sys::Function>,
}

impl WebHost {
    pub fn new(document: Document, root: Element) -> Self {
        Self {
            document,
            root,
            activator: None,
        }
    }

    /// Host over the first element matching `selector` in the current page.
    pub fn attach(selector: &str) -> Option<Self> {
        let document = web_sys::window()?.document()?;
        let root = document.query_selector(selector).ok()??;
        Some(Self::new(document, root))
    }

    pub fn with_activator(mut self, activator: js_sys::Function) -> Self {
        self.activator = Some(activator);
        self
    }

    /// Read the blocks already on the page, in document order.
    ///
    /// Blocks whose markup cannot be read are left out of the session.
    pub fn scan_blocks(&self) -> Vec<Block> {
        self.block_elements()
            .iter()
            .filter_map(|el| match self.read_block(el) {
                Ok(block) => Some(block),
                Err(e) => {
                    tracing::warn!("skipping unreadable block: {e}");
                    None
                }
            })
            .collect()
    }

    fn read_block(&self, root: &Element) -> Result<Block, FragmentError> {
        if root.id().is_empty() {
            return Err(FragmentError::MissingRootId(root.tag_name().to_ascii_lowercase()));
        }
        let mut block = Block::new(root.id(), root.get_attribute("data-type").unwrap_or_default());
        let mut items: Vec<GroupItem> = vec![];
        let mut is_group = false;

        for el in std::iter::once(root.clone()).chain(self.select_all(root, SCANNED)) {
            let classes = el.class_list();
            if classes.contains("block-group") {
                is_group = true;
            }
            if classes.contains("block-group-item") {
                is_group = true;
                if !el.id().is_empty() {
                    items.push(GroupItem::new(el.id()).selected(!classes.contains(HIDDEN)));
                }
            }
            if classes.contains("block-editor") && !el.id().is_empty() {
                block.regions.push(el.id());
            }

            let fields =
                fragment::element_fields(&el.tag_name().to_ascii_lowercase(), |name| el.get_attribute(name));
            if fields.is_empty() {
                continue;
            }
            let pane = el.closest(".block-group-item").ok().flatten().map(|p| p.id());
            match pane.and_then(|id| items.iter_mut().find(|i| i.id == id)) {
                Some(item) => item.fields.extend(fields),
                None => block.fields.extend(fields),
            }
        }

        if is_group {
            fragment::finish_group(&mut block, items);
        }
        Ok(block)
    }

    fn by_id(&self, id: &str) -> Option<Element> {
        self.document.get_element_by_id(id)
    }

    fn select_all(&self, scope: &Element, selector: &str) -> Vec<Element> {
        let Ok(list) = scope.query_selector_all(selector) else {
            return vec![];
        };
        (0..list.length())
            .filter_map(|i| list.item(i))
            .filter_map(|n| n.dyn_into::<Element>().ok())
            .collect()
    }

    fn block_elements(&self) -> Vec<Element> {
        self.select_all(&self.root, ":scope > .block-item")
    }

    fn document_all(&self, selector: &str) -> Vec<Element> {
        match self.document.document_element() {
            Some(html) => self.select_all(&html, selector),
            None => vec![],
        }
    }

    fn list_entry(&self, scope: &Element, item: &str) -> Option<Element> {
        scope
            .query_selector(&format!(".list-group-item[data-id=\"{}\"]", css_escape(item)))
            .ok()
            .flatten()
    }

    /// Where a group keeps its detail panes.
    fn pane_container(&self, owner: &Element) -> Option<Element> {
        if let Ok(Some(el)) = owner.query_selector(".block-group-items") {
            return Some(el);
        }
        owner
            .query_selector(".block-group-item")
            .ok()
            .flatten()
            .and_then(|pane| pane.parent_element())
    }

    /// Palette copies dropped into the block list or a group list.
    fn dropped_copies(&self) -> Vec<Element> {
        self.select_all(&self.root, ".block-type")
            .into_iter()
            .filter(|el| el.closest("#panelBlocks").ok().flatten().is_none())
            .collect()
    }
}

/// Escape a value for use inside a double-quoted attribute selector.
fn css_escape(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

fn set_class(el: &Element, class: &str, on: bool) {
    let _ = el.class_list().toggle_with_force(class, on);
}

impl DocumentHost for WebHost {
    fn rewrite_attribute(&mut self, scope: &str, attr: FieldAttr, from: &str, to: &str) {
        let Some(owner) = self.by_id(scope) else {
            return;
        };
        let selector = format!("[{}=\"{}\"]", attr.attribute(), css_escape(from));
        if let Ok(Some(el)) = owner.query_selector(&selector) {
            let _ = el.set_attribute(attr.attribute(), to);
        }
    }

    fn arrange_blocks(&mut self, order: &[String]) {
        for id in order {
            if let Some(el) = self.by_id(id) {
                let _ = self.root.append_child(&el);
            }
        }
    }

    fn arrange_items(&mut self, block: &str, order: &[String]) {
        let Some(owner) = self.by_id(block) else {
            return;
        };
        let entries = owner.query_selector(".list-group").ok().flatten();
        let panes = self.pane_container(&owner);

        // Items may arrive from another group, so look them up under the root.
        for id in order {
            if let (Some(list), Some(entry)) = (&entries, self.list_entry(&self.root, id)) {
                let _ = list.append_child(&entry);
            }
            if let (Some(container), Some(pane)) = (&panes, self.by_id(id)) {
                let _ = container.append_child(&pane);
            }
        }
    }

    fn remove_node(&mut self, id: &str) {
        if let Some(el) = self.by_id(id) {
            if el.class_list().contains("block-group-item") {
                if let Some(entry) = el
                    .closest(".block-item")
                    .ok()
                    .flatten()
                    .and_then(|owner| self.list_entry(&owner, id))
                {
                    entry.remove();
                }
            }
            el.remove();
        }
    }

    fn insert_fragment(&mut self, index: usize, html: &str) {
        let blocks = self.block_elements();
        let res = match blocks.get(index) {
            Some(next) => next.insert_adjacent_html("beforebegin", html),
            None => self.root.insert_adjacent_html("beforeend", html),
        };
        if let Err(e) = res {
            tracing::warn!("failed to mount block fragment: {e:?}");
        }
    }

    fn keep_placeholder(&mut self, type_name: &str) {
        let mut adopted = false;
        for el in self.dropped_copies() {
            let matches = el.get_attribute("data-typename").as_deref() == Some(type_name);
            if !adopted && matches && !el.class_list().contains(KEPT) {
                set_class(&el, KEPT, true);
                adopted = true;
            } else {
                el.remove();
            }
        }
    }

    fn settle_placeholder(&mut self, group: Option<&str>, gap: usize) {
        let Some(copy) = self
            .dropped_copies()
            .into_iter()
            .find(|el| el.class_list().contains(KEPT))
        else {
            return;
        };
        let (list, nodes) = match group {
            None => (Some(self.root.clone()), self.block_elements()),
            Some(id) => {
                let list = self
                    .by_id(id)
                    .and_then(|owner| owner.query_selector(".list-group").ok().flatten());
                let nodes = list
                    .as_ref()
                    .map(|l| self.select_all(l, ":scope > .list-group-item"))
                    .unwrap_or_default();
                (list, nodes)
            }
        };
        if let Some(list) = list {
            let _ = list.insert_before(&copy, nodes.get(gap).map(AsRef::<web_sys::Node>::as_ref));
        }
    }

    fn discard_stray_placeholders(&mut self) {
        for el in self.dropped_copies() {
            if !el.class_list().contains(KEPT) {
                el.remove();
            }
        }
    }

    fn remove_placeholders(&mut self) {
        for el in self.dropped_copies() {
            el.remove();
        }
    }

    fn activate_rich_region(&mut self, id: &str) {
        if let Some(f) = &self.activator {
            if let Err(e) = f.call1(&JsValue::NULL, &JsValue::from_str(id)) {
                tracing::warn!(region = id, "region activation failed: {e:?}");
            }
        }
    }

    fn show_group_item(&mut self, block: &str, item: &str) {
        let Some(owner) = self.by_id(block) else {
            return;
        };
        for entry in self.select_all(&owner, ".list-group-item") {
            let on = entry.get_attribute("data-id").as_deref() == Some(item);
            set_class(&entry, ACTIVE, on);
        }
        for pane in self.select_all(&owner, ".block-group-item") {
            set_class(&pane, HIDDEN, pane.id() != item);
        }
    }

    fn set_add_active(&mut self, block: Option<&str>) {
        for el in self.document_all(".block-add.active") {
            set_class(&el, ACTIVE, false);
        }
        let Some(id) = block else {
            return;
        };
        if let Some(Ok(Some(add))) = self.by_id(id).map(|b| b.query_selector(".block-add")) {
            set_class(&add, ACTIVE, true);
        }
        if let Some(panel) = self.by_id("panelBlocks") {
            set_class(&panel, ACTIVE, true);
        }
    }

    fn close_palette(&mut self) {
        if let Some(panel) = self.by_id("panelBlocks") {
            set_class(&panel, ACTIVE, false);
        }
        if let Some(input) = self
            .by_id("block-search")
            .and_then(|el| el.dyn_into::<web_sys::HtmlInputElement>().ok())
        {
            input.set_value("");
        }
    }

    fn set_palette_entry_visible(&mut self, type_name: &str, visible: bool) {
        let selector = format!(
            "#panelBlocks .block-type[data-typename=\"{}\"]",
            css_escape(type_name)
        );
        for el in self.document_all(&selector) {
            set_class(&el, HIDDEN, !visible);
        }
    }

    fn set_categories_visible(&mut self, visible: bool) {
        for el in self.document_all(".block-category") {
            set_class(&el, HIDDEN, !visible);
        }
    }

    fn focus(&mut self, target: Option<&FocusTarget>) {
        match target {
            Some(FocusTarget(id)) => {
                if let Some(el) = self
                    .by_id(id)
                    .and_then(|el| el.dyn_into::<web_sys::HtmlElement>().ok())
                {
                    let _ = el.focus();
                }
            }
            None => {
                if let Some(el) = self
                    .document
                    .active_element()
                    .and_then(|el| el.dyn_into::<web_sys::HtmlElement>().ok())
                {
                    let _ = el.blur();
                }
            }
        }
    }

    fn swap_region_contents(&mut self, a: &str, b: &str) {
        let (Some(left), Some(right)) = (self.by_id(a), self.by_id(b)) else {
            return;
        };
        let html = left.inner_html();
        left.set_inner_html(&right.inner_html());
        right.set_inner_html(&html);
    }

    fn set_region_mark(&mut self, id: &str, mark: RegionMark) {
        let Some(el) = self.by_id(id) else {
            return;
        };
        for m in [RegionMark::Empty, RegionMark::CheckEmpty] {
            set_class(&el, <&'static str>::from(m), m == mark);
        }
    }
}


#[cfg(all(test, target_arch = "wasm32"))]
mod wasm_tests {
    use super::*;
    use crate::sync::reconcile;
    use crate::testing::{group_block, group_html, text_html};
    use crate::tree::ContentTree;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    fn mount(markup: &str) -> WebHost {
        let document = web_sys::window()
            .and_then(|w| w.document())
            .expect("document");
        let root = document.create_element("div").expect("create root");
        root.set_class_name("blocks");
        root.set_inner_html(markup);
        document
            .body()
            .expect("body")
            .append_child(&root)
            .expect("attach root");
        WebHost::new(document, root)
    }

    #[wasm_bindgen_test]
    fn test_scan_and_reconcile_live_document() {
        let mut host = mount(&format!("{}{}", text_html("wa", 3), text_html("wb", 7)));
        let mut tree = ContentTree::from_blocks(host.scan_blocks());
        assert_eq!(tree.block_ids(), vec!["wa", "wb"]);

        tree.move_block(1, 0);
        reconcile(&mut tree, &mut host);

        let order: Vec<String> = host.block_elements().iter().map(|e| e.id()).collect();
        assert_eq!(order, vec!["wb", "wa"]);
        let input = host
            .by_id("wa")
            .and_then(|el| el.query_selector("input").ok().flatten())
            .expect("field input");
        assert_eq!(input.get_attribute("name").as_deref(), Some("Blocks[1].Body.Value"));
        host.root.remove();
    }

    #[wasm_bindgen_test]
    fn test_item_moved_across_groups_changes_owner() {
        let mut host = mount(&format!("{}{}", group_html("wg1", 0, 2), group_html("wg2", 1, 1)));
        let mut tree = ContentTree::from_blocks(host.scan_blocks());
        assert_eq!(tree.item_ids(0), vec!["wg1-0", "wg1-1"]);

        tree.move_group_item_across_blocks(0, 1, 1, 0);
        reconcile(&mut tree, &mut host);

        let owner_of = |el: Option<Element>| {
            el.and_then(|e| e.closest(".block-item").ok().flatten())
                .map(|b| b.id())
        };
        let pane = host.by_id("wg1-1");
        assert_eq!(
            pane.as_ref()
                .and_then(|p| p.parent_element())
                .map(|c| c.class_name()),
            Some("block-group-items".to_string())
        );
        assert_eq!(owner_of(pane).as_deref(), Some("wg2"));
        assert_eq!(owner_of(host.list_entry(&host.root, "wg1-1")).as_deref(), Some("wg2"));

        let panes: Vec<String> = host
            .by_id("wg2")
            .map(|b| host.select_all(&b, ".block-group-item"))
            .unwrap_or_default()
            .iter()
            .map(|e| e.id())
            .collect();
        assert_eq!(panes, vec!["wg1-1", "wg2-0"]);

        let title = host
            .by_id("wg1-1")
            .and_then(|el| el.query_selector("input").ok().flatten())
            .expect("title input");
        assert_eq!(title.get_attribute("name").as_deref(), Some("Blocks[1].Items[0].Title"));
        host.root.remove();
    }

    #[wasm_bindgen_test]
    fn test_scan_reads_group_items() {
        let host = mount(&group_html("wg3", 4, 2));
        let blocks = host.scan_blocks();
        assert_eq!(blocks.len(), 1);
        let block = &blocks[0];
        let expected = group_block("wg3", 4, 2);
        assert_eq!(block.type_name, "SliderGroup");
        assert_eq!(block.fields, expected.fields);
        assert_eq!(block.selected_item(), Some(0));

        let second = &block.items()[1];
        assert_eq!(second.id, "wg3-1");
        let mut fields = second.fields.clone();
        let mut want = expected.items()[1].fields.clone();
        fields.sort_by_key(|f| f.attr.attribute());
        want.sort_by_key(|f| f.attr.attribute());
        assert_eq!(fields, want);
        host.root.remove();
    }

    #[wasm_bindgen_test]
    fn test_placeholders_removed_from_group_lists() {
        let host_markup = format!(
            "{}<div class=\"block-type\" data-typename=\"TextBlock\"></div>",
            group_html("wg4", 0, 1)
        );
        let mut host = mount(&host_markup);
        let list = host
            .by_id("wg4")
            .and_then(|b| b.query_selector(".list-group").ok().flatten())
            .expect("group list");
        list.insert_adjacent_html("beforeend", r#"<div class="block-type" data-typename="ImageBlock"></div>"#)
            .expect("drop copy");

        // The block-list copy came from a rejected drop; the group copy is adopted.
        host.keep_placeholder("ImageBlock");
        assert_eq!(host.dropped_copies().len(), 1);
        host.discard_stray_placeholders();
        assert_eq!(host.dropped_copies().len(), 1);

        host.remove_placeholders();
        assert!(host.dropped_copies().is_empty());
        assert!(host.select_all(&list, ".block-type").is_empty());
        host.root.remove();
    }

    #[wasm_bindgen_test]
    fn test_kept_copy_holds_its_slot_through_reorder() {
        let mut host = mount(&format!(
            "{}<div class=\"block-type\" data-typename=\"TextBlock\"></div>{}{}",
            text_html("wx", 0),
            text_html("wy", 1),
            text_html("wz", 2)
        ));
        host.keep_placeholder("TextBlock");

        host.arrange_blocks(&["wz".to_string(), "wy".to_string(), "wx".to_string()]);
        host.settle_placeholder(None, 1);

        let children: Vec<String> = host
            .select_all(&host.root, ":scope > *")
            .iter()
            .map(|e| if e.id().is_empty() { "copy".to_string() } else { e.id() })
            .collect();
        assert_eq!(children, vec!["wz", "copy", "wy", "wx"]);
        host.root.remove();
    }

    #[wasm_bindgen_test]
    fn test_insert_fragment_before_index() {
        let mut host = mount(&text_html("wc", 0));
        host.insert_fragment(0, &text_html("wd", 0));
        let order: Vec<String> = host.block_elements().iter().map(|e| e.id()).collect();
        assert_eq!(order, vec!["wd", "wc"]);
        host.root.remove();
    }
}
