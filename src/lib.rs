//! Block editing engine for server-rendered page forms.
//!
//! A page is an ordered list of blocks, some of which own a list of group items.
//! Every form field inside a block carries its position in its `id`, `name`,
//! `data-id` or `data-mediaid` attribute (`Blocks_2__Items_1__Title`,
//! `Blocks[2].Items[1].Title`, ...), so the form posts back onto positional
//! arrays. The engine keeps those identifiers in step with the order the
//! author produces by dragging, inserting and removing blocks.
//!
//! [`tree::ContentTree`] holds the order, [`sync::normalize`] re-encodes every
//! field from it, and a [`sync::DocumentHost`] projects the result onto the
//! document. [`editor::Editor`] drives all of it from user interaction.

pub mod api;
pub mod codec;
pub mod editor;
pub mod error;
pub mod fragment;
pub mod models;
pub mod state;
pub mod sync;
pub mod tree;
pub mod web;

#[cfg(test)]
mod testing;

pub use api::{ApiClient, ApiError, ApiErrorKind, ApiResult, BlockRenderer, EditorConfig};
pub use editor::{create_block, Editor, Palette};
pub use error::{EditorError, EditorResult};
pub use models::{Block, BlockType, DraggedNode, FieldAttr, GroupItem};
pub use sync::{DocumentHost, MemoryHost};
pub use tree::ContentTree;
pub use web::{BlockEditorHandle, WebHost};

// Needed for `#[wasm_bindgen(start)]` on the wasm entrypoint.
#[cfg(all(target_arch = "wasm32", not(test)))]
use wasm_bindgen::prelude::wasm_bindgen;


// Only register the WASM start function for normal builds (not for tests),
// otherwise wasm-bindgen-test will end up with multiple entry symbols.
#[cfg_attr(all(target_arch = "wasm32", not(test)), wasm_bindgen(start))]
pub fn main() {
    console_error_panic_hook::set_once();
    web::init_logging();
    // Creation requests are spawned on the Leptos executor.
    let _ = any_spawner::Executor::init_wasm_bindgen();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{group_block, palette, text_block};

    #[test]
    fn test_memory_host_session_end_to_end() {
        let tree = ContentTree::from_blocks(vec![
            text_block("intro", 0),
            group_block("slides", 1, 2),
            text_block("outro", 2),
        ]);
        let host = MemoryHost::from_tree(&tree);
        let mut ed = Editor::new(tree, palette(), host);

        ed.remove_block_by_id("intro").expect("block exists");
        assert_eq!(ed.tree().block_ids(), vec!["slides", "outro"]);
        assert!(ed.host().has_attribute(
            "slides-1",
            FieldAttr::InputName,
            "Blocks[0].Items[1].Title"
        ));
        assert!(ed
            .host()
            .has_attribute("outro", FieldAttr::ContentId, "Blocks_1__Body"));
        assert!(ed.host().mirrors(ed.tree()));
    }
}
