use super::WebHost;
use crate::api::{ApiClient, EditorConfig};
use crate::editor::{
    create_block, BlockListUpdate, CreationTicket, DropOutcome, Editor, GroupListUpdate, ListKind,
    Palette,
};
use crate::error::{EditorError, EditorResult};
use crate::models::DraggedNode;
use crate::tree::ContentTree;
use leptos::task::spawn_local;
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::prelude::*;

fn to_js(e: EditorError) -> JsValue {
    JsValue::from_str(&e.to_string())
}

/// `"palette"`, `"blocks"`, or the id of a group block.
fn list_kind(name: &str) -> ListKind {
    match name {
        "palette" => ListKind::Palette,
        "blocks" => ListKind::Blocks,
        id => ListKind::Group(id.to_string()),
    }
}

/// What a sortable event moved, given the list it came from.
fn dragged(source: &ListKind, id: &str) -> DraggedNode {
    match source {
        ListKind::Palette => DraggedNode::Placeholder {
            type_name: id.to_string(),
        },
        ListKind::Blocks => DraggedNode::Block { id: id.to_string() },
        ListKind::Group(_) => DraggedNode::Item { id: id.to_string() },
    }
}

/// Page-side handle wired to the sortable lists and palette controls.
#[wasm_bindgen]
pub struct BlockEditorHandle {
    editor: Rc<RefCell<Editor<WebHost>>>,
    client: Rc<ApiClient>,
}

#[wasm_bindgen]
impl BlockEditorHandle {
    /// Attach to the block list matching `root_selector`.
    ///
    /// `palette_json` is the block type manifest; `activator` is called with the
    /// element id of every rich region a new block brings in.
    #[wasm_bindgen(constructor)]
    pub fn new(
        root_selector: &str,
        palette_json: &str,
        activator: Option<js_sys::Function>,
    ) -> Result<BlockEditorHandle, JsValue> {
        let mut host = WebHost::attach(root_selector)
            .ok_or_else(|| JsValue::from_str(&format!("no element matches {root_selector}")))?;
        if let Some(f) = activator {
            host = host.with_activator(f);
        }
        let palette = Palette::from_json(palette_json)
            .map_err(|e| JsValue::from_str(&format!("invalid palette manifest: {e}")))?;

        let tree = ContentTree::from_blocks(host.scan_blocks());
        tracing::info!(blocks = tree.len(), "block editor attached");

        Ok(Self {
            editor: Rc::new(RefCell::new(Editor::new(tree, palette, host))),
            client: Rc::new(ApiClient::new(EditorConfig::from_env())),
        })
    }

    #[wasm_bindgen(js_name = blockCount)]
    pub fn block_count(&self) -> usize {
        self.editor.borrow().tree().len()
    }

    #[wasm_bindgen(js_name = noteFocus)]
    pub fn note_focus(&self, element_id: &str) {
        self.editor.borrow_mut().note_focus(element_id);
    }

    /// Block list sort event. `source` names the list the node came from.
    #[wasm_bindgen(js_name = onBlockSortUpdate)]
    pub fn on_block_sort_update(
        &self,
        source: &str,
        node_id: &str,
        destination: usize,
    ) -> Result<(), JsValue> {
        let source = list_kind(source);
        let update = BlockListUpdate {
            item: dragged(&source, node_id),
            source,
            destination,
        };
        let outcome = self.editor.borrow_mut().on_block_list_update(update);
        self.handle_drop(outcome)
    }

    #[wasm_bindgen(js_name = onGroupSortUpdate)]
    pub fn on_group_sort_update(
        &self,
        source: &str,
        node_id: &str,
        target_block: &str,
        destination: usize,
    ) -> Result<(), JsValue> {
        let source = list_kind(source);
        let update = GroupListUpdate {
            item: dragged(&source, node_id),
            source,
            target_block: target_block.to_string(),
            destination,
        };
        let outcome = self.editor.borrow_mut().on_group_list_update(update);
        self.handle_drop(outcome)
    }

    #[wasm_bindgen(js_name = onPaletteSortStart)]
    pub fn on_palette_sort_start(&self) {
        self.editor.borrow_mut().on_palette_drag_start();
    }

    #[wasm_bindgen(js_name = onAddClick)]
    pub fn on_add_click(&self, block_id: &str) -> Result<usize, JsValue> {
        self.editor.borrow_mut().activate_add(block_id).map_err(to_js)
    }

    /// Returns whether a creation request was started.
    #[wasm_bindgen(js_name = onPaletteClick)]
    pub fn on_palette_click(&self, type_name: &str) -> Result<bool, JsValue> {
        let ticket = self.editor.borrow_mut().click_palette_entry(type_name);
        self.handle_request(ticket)
    }

    #[wasm_bindgen(js_name = onSearchInput)]
    pub fn on_search_input(&self, query: &str) {
        self.editor.borrow_mut().filter(query);
    }

    #[wasm_bindgen(js_name = onSearchEnter)]
    pub fn on_search_enter(&self) -> Result<bool, JsValue> {
        let ticket = self.editor.borrow_mut().confirm_search();
        self.handle_request(ticket)
    }

    #[wasm_bindgen(js_name = onRemoveClick)]
    pub fn on_remove_click(&self, block_id: &str) -> Result<(), JsValue> {
        self.editor
            .borrow_mut()
            .remove_block_by_id(block_id)
            .map(|_| ())
            .map_err(to_js)
    }

    #[wasm_bindgen(js_name = onRemoveItemClick)]
    pub fn on_remove_item_click(&self, item_id: &str) -> Result<(), JsValue> {
        self.editor
            .borrow_mut()
            .remove_group_item_by_id(item_id)
            .map(|_| ())
            .map_err(to_js)
    }

    #[wasm_bindgen(js_name = onGroupItemClick)]
    pub fn on_group_item_click(&self, item_id: &str) -> Result<(), JsValue> {
        self.editor
            .borrow_mut()
            .select_group_item(item_id)
            .map_err(to_js)
    }

    #[wasm_bindgen(js_name = onSwapClick)]
    pub fn on_swap_click(&self, block_id: &str) -> Result<bool, JsValue> {
        self.editor.borrow_mut().swap_columns(block_id).map_err(to_js)
    }

    #[wasm_bindgen(js_name = onRegionFocus)]
    pub fn on_region_focus(&self, region_id: &str, marked_empty: bool) {
        self.editor.borrow_mut().focus_region(region_id, marked_empty);
    }

    #[wasm_bindgen(js_name = onRegionBlur)]
    pub fn on_region_blur(&self, region_id: &str, is_empty: bool) {
        self.editor.borrow_mut().blur_region(region_id, is_empty);
    }
}

impl BlockEditorHandle {
    fn handle_drop(&self, outcome: EditorResult<DropOutcome>) -> Result<(), JsValue> {
        match outcome.map_err(to_js)? {
            DropOutcome::Reordered => {}
            DropOutcome::Create(ticket) => self.spawn_creation(ticket),
        }
        Ok(())
    }

    fn handle_request(&self, ticket: EditorResult<Option<CreationTicket>>) -> Result<bool, JsValue> {
        match ticket.map_err(to_js)? {
            Some(ticket) => {
                self.spawn_creation(ticket);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn spawn_creation(&self, ticket: CreationTicket) {
        let editor = Rc::clone(&self.editor);
        let client = Rc::clone(&self.client);
        spawn_local(async move {
            if let Err(e) = create_block(&editor, client.as_ref(), ticket).await {
                tracing::warn!("block creation failed: {e}");
            }
        });
    }
}
