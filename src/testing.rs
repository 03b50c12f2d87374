//! Fixtures shared by the unit tests.

use crate::api::{ApiError, ApiResult, BlockRenderer, CreateBlockRequest};
use crate::editor::{Editor, Palette};
use crate::models::{Block, BlockType, FieldAttr, GroupItem, RenderedFragment};
use crate::sync::MemoryHost;
use crate::tree::ContentTree;
use async_trait::async_trait;
use std::cell::RefCell;

/// Plain block encoded at position `b`.
pub(crate) fn text_block(id: &str, b: usize) -> Block {
    Block::new(id, "HtmlBlock")
        .with_field(FieldAttr::InputId, format!("Blocks_{b}__Body_Value"))
        .with_field(FieldAttr::InputName, format!("Blocks[{b}].Body.Value"))
        .with_field(FieldAttr::ContentId, format!("Blocks_{b}__Body"))
        .with_region(format!("{id}-body"))
}

/// Group block encoded at position `b` with `n` items, the first one displayed.
pub(crate) fn group_block(id: &str, b: usize, n: usize) -> Block {
    let items = (0..n)
        .map(|s| {
            GroupItem::new(format!("{id}-{s}"))
                .with_field(FieldAttr::InputId, format!("Blocks_{b}__Items_{s}__Title"))
                .with_field(FieldAttr::InputName, format!("Blocks[{b}].Items[{s}].Title"))
                .with_field(FieldAttr::MediaId, format!("Blocks_{b}__Items_{s}__Image"))
                .with_field(FieldAttr::ContentId, format!("Blocks_{b}__Items_{s}__Caption"))
                .selected(s == 0)
        })
        .collect();

    Block::new(id, "SliderGroup")
        .with_field(FieldAttr::InputId, format!("Blocks_{b}__Heading"))
        .with_field(FieldAttr::InputName, format!("Blocks[{b}].Heading"))
        .with_items(items)
}

/// Renderer markup equivalent to [`text_block`].
pub(crate) fn text_html(id: &str, b: usize) -> String {
    format!(
        r#"<div id="{id}" class="block-item">
  <div class="block html-block">
    <input type="hidden" id="Blocks_{b}__Body_Value" name="Blocks[{b}].Body.Value">
    <div class="block-editor" id="{id}-body" contenteditable="true" data-id="Blocks_{b}__Body"></div>
  </div>
</div>"#
    )
}

/// Renderer markup equivalent to [`group_block`].
pub(crate) fn group_html(id: &str, b: usize, n: usize) -> String {
    let entries: String = (0..n)
        .map(|s| {
            let active = if s == 0 { " active" } else { "" };
            format!(r##"<a href="#" class="list-group-item{active}" data-id="{id}-{s}">Item</a>"##)
        })
        .collect();
    let panes: String = (0..n)
        .map(|s| {
            let hidden = if s == 0 { "" } else { " d-none" };
            format!(
                r#"<div id="{id}-{s}" class="block-group-item{hidden}">
  <input type="text" id="Blocks_{b}__Items_{s}__Title" name="Blocks[{b}].Items[{s}].Title">
  <div contenteditable="true" data-id="Blocks_{b}__Items_{s}__Caption"></div>
  <button type="button" data-mediaid="Blocks_{b}__Items_{s}__Image">Pick</button>
</div>"#
            )
        })
        .collect();

    format!(
        r#"<div id="{id}" class="block-item" data-type="SliderGroup">
  <div class="block block-group">
    <input type="text" id="Blocks_{b}__Heading" name="Blocks[{b}].Heading">
    <div class="block-group-list"><div class="list-group">{entries}</div></div>
    <div class="block-group-items">{panes}</div>
  </div>
</div>"#
    )
}

pub(crate) fn palette() -> Palette {
    Palette::new(vec![
        BlockType::new("HeaderBlock", "Header", "Content"),
        BlockType::new("TextBlock", "Text", "Content"),
        BlockType::new("ImageBlock", "Image", "Media"),
    ])
}

pub(crate) fn editor(blocks: Vec<Block>) -> Editor<MemoryHost> {
    let tree = ContentTree::from_blocks(blocks);
    let host = MemoryHost::from_tree(&tree);
    Editor::new(tree, palette(), host)
}

/// Renderer that answers from a fixed script and records what it was asked.
pub(crate) struct ScriptedRenderer {
    pub responses: RefCell<Vec<ApiResult<RenderedFragment>>>,
    pub requests: RefCell<Vec<CreateBlockRequest>>,
}

impl ScriptedRenderer {
    pub(crate) fn new(responses: Vec<ApiResult<RenderedFragment>>) -> Self {
        Self {
            responses: RefCell::new(responses),
            requests: RefCell::new(vec![]),
        }
    }
}

#[async_trait(?Send)]
impl BlockRenderer for ScriptedRenderer {
    async fn render_block(&self, req: &CreateBlockRequest) -> ApiResult<RenderedFragment> {
        self.requests.borrow_mut().push(req.clone());
        let mut responses = self.responses.borrow_mut();
        if responses.is_empty() {
            return Err(ApiError::http_status(500, "no scripted response"));
        }
        responses.remove(0)
    }
}
