use super::Editor;
use crate::api::{ApiResult, BlockRenderer, CreateBlockRequest};
use crate::error::{EditorError, EditorResult};
use crate::fragment;
use crate::models::RenderedFragment;
use crate::state::{CreationState, PendingCreation};
use crate::sync::DocumentHost;
use std::cell::RefCell;

/// Handle for one creation request, returned when the request starts and
/// handed back when the renderer answers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CreationTicket {
    pub ticket: u64,
    pub request: CreateBlockRequest,
}

impl<H: DocumentHost> Editor<H> {
    /// Start creating a `type_name` block at `index`.
    ///
    /// Only one request may be in flight per session.
    pub fn begin_creation(&mut self, type_name: &str, index: usize) -> EditorResult<CreationTicket> {
        if let Some(pending) = self.session.pending() {
            tracing::warn!(type_name, pending = pending.ticket, "creation already pending");
            return Err(EditorError::CreationPending(pending.ticket));
        }

        let ticket = self.session.take_ticket();
        self.session.creation = CreationState::Requesting(PendingCreation {
            ticket,
            type_name: type_name.to_string(),
            index,
        });
        tracing::info!(type_name, index, ticket, "requesting block");

        Ok(CreationTicket {
            ticket,
            request: CreateBlockRequest {
                type_name: type_name.to_string(),
                block_index: index,
            },
        })
    }

    /// Finish a request with the renderer's answer. Returns the index the new
    /// block landed at.
    ///
    /// On failure the tree is untouched and any placeholder stays in the document.
    pub fn complete_creation(
        &mut self,
        ticket: &CreationTicket,
        result: ApiResult<RenderedFragment>,
    ) -> EditorResult<usize> {
        let pending = match self.session.pending() {
            Some(p) if p.ticket == ticket.ticket => p.clone(),
            _ => return Err(EditorError::UnknownCreation(ticket.ticket)),
        };

        let rendered = match result {
            Ok(rendered) => rendered,
            Err(e) => {
                tracing::warn!(type_name = %pending.type_name, "block render failed: {e}");
                self.fail_creation(&pending, e.to_string());
                return Err(e.into());
            }
        };
        let block = match fragment::scan(&rendered.html, &pending.type_name) {
            Ok(block) => block,
            Err(e) => {
                tracing::warn!(type_name = %pending.type_name, "unusable block fragment: {e}");
                self.fail_creation(&pending, e.to_string());
                return Err(e.into());
            }
        };

        self.host.remove_placeholders();
        self.session.placeholder = None;

        // The list may have shrunk while the request was out.
        let index = pending.index.min(self.tree.len());
        let block_id = block.id.clone();
        let regions = block.regions.clone();

        self.tree.insert_block(block, index);
        self.host.insert_fragment(index, &rendered.html);
        self.reconcile();
        for region in &regions {
            self.host.activate_rich_region(region);
        }

        self.session.clear_selection();
        self.host.set_add_active(None);
        self.host.close_palette();
        self.filter("");
        self.host.focus(self.session.prev_focus.take().as_ref());

        tracing::info!(block = %block_id, index, "block inserted");
        self.session.creation = CreationState::Inserted { block_id, index };
        Ok(index)
    }

    fn fail_creation(&mut self, pending: &PendingCreation, reason: String) {
        self.session.creation = CreationState::Failed {
            type_name: pending.type_name.clone(),
            index: pending.index,
            reason,
        };
    }
}

/// Run a creation request to completion.
///
/// The editor is only borrowed before and after the render call, so other
/// handlers stay usable while the request is out.
pub async fn create_block<H, R>(
    editor: &RefCell<Editor<H>>,
    renderer: &R,
    ticket: CreationTicket,
) -> EditorResult<usize>
where
    H: DocumentHost,
    R: BlockRenderer + ?Sized,
{
    let result = renderer.render_block(&ticket.request).await;
    editor.borrow_mut().complete_creation(&ticket, result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ApiError;
    use crate::models::FieldAttr;
    use crate::editor::{BlockListUpdate, DropOutcome, ListKind};
    use crate::models::DraggedNode;
    use crate::testing::{editor, group_html, text_block, text_html, ScriptedRenderer};
    use futures::executor::block_on;

    fn editor_abc() -> Editor<crate::sync::MemoryHost> {
        editor(vec![text_block("a", 0), text_block("b", 1), text_block("c", 2)])
    }

    #[test]
    fn test_creation_shifts_later_blocks() {
        let mut ed = editor_abc();
        ed.activate_add("a").expect("block exists");
        ed.note_focus("page-title");
        ed.host_mut().palette_open = true;
        ed.host_mut().search_text = "te".to_string();
        ed.filter("te");

        let ticket = ed
            .click_palette_entry("TextBlock")
            .expect("no error")
            .expect("request started");
        assert!(ed.session().is_requesting());

        let renderer = ScriptedRenderer::new(vec![Ok(RenderedFragment::new(text_html("n", 1)))]);
        let cell = RefCell::new(ed);
        let index = block_on(create_block(&cell, &renderer, ticket)).expect("creation succeeds");
        let ed = cell.into_inner();

        assert_eq!(index, 1);
        assert_eq!(renderer.requests.borrow()[0].block_index, 1);
        assert_eq!(ed.tree().block_ids(), vec!["a", "n", "b", "c"]);
        assert_eq!(ed.tree().blocks()[3].fields[1].value, "Blocks[3].Body.Value");
        assert!(ed
            .host()
            .has_attribute("b", FieldAttr::InputId, "Blocks_2__Body_Value"));
        assert!(ed.host().mirrors(ed.tree()));

        assert_eq!(ed.host().activated_regions, vec!["n-body"]);
        assert!(ed.session().selected_index.is_none());
        assert!(ed.host().add_active.is_none());
        assert!(!ed.host().palette_open);
        assert!(ed.host().search_text.is_empty());
        assert!(ed.host().hidden_entries.is_empty());
        assert_eq!(ed.host().focused.as_deref(), Some("page-title"));
        assert_eq!(
            ed.session().creation,
            CreationState::Inserted {
                block_id: "n".to_string(),
                index: 1
            }
        );
    }

    #[test]
    fn test_creation_without_previous_focus_blurs() {
        let mut ed = editor_abc();
        ed.host_mut().focused = Some("search".to_string());
        let ticket = ed.begin_creation("TextBlock", 3).expect("idle");
        ed.complete_creation(&ticket, Ok(RenderedFragment::new(text_html("n", 3))))
            .expect("creation succeeds");
        assert!(ed.host().focused.is_none());
        assert_eq!(ed.tree().block_ids(), vec!["a", "b", "c", "n"]);
    }

    fn palette_drop(type_name: &str, destination: usize) -> BlockListUpdate {
        BlockListUpdate {
            item: DraggedNode::Placeholder {
                type_name: type_name.to_string(),
            },
            source: ListKind::Palette,
            destination,
        }
    }

    #[test]
    fn test_failed_creation_leaves_tree_and_placeholder() {
        let mut ed = editor_abc();
        let DropOutcome::Create(ticket) = ed
            .on_block_list_update(palette_drop("TextBlock", 1))
            .expect("accepted")
        else {
            panic!("expected a creation request");
        };
        assert_eq!(ed.host().placeholder.as_deref(), Some("TextBlock"));
        let before = ed.tree().clone();

        let renderer = ScriptedRenderer::new(vec![Err(ApiError::http_status(500, "boom"))]);
        let cell = RefCell::new(ed);
        let err = block_on(create_block(&cell, &renderer, ticket)).expect_err("render fails");
        let ed = cell.into_inner();

        assert!(matches!(err, EditorError::Request(_)));
        assert_eq!(ed.tree(), &before);
        assert_eq!(ed.host().placeholder.as_deref(), Some("TextBlock"));
        assert_eq!(ed.session().placeholder.as_ref().map(|p| p.gap), Some(1));
        assert!(matches!(ed.session().creation, CreationState::Failed { .. }));
        assert!(!ed.session().is_requesting());
    }

    #[test]
    fn test_dropped_placeholder_is_replaced_by_block() {
        let mut ed = editor_abc();
        let DropOutcome::Create(ticket) = ed
            .on_block_list_update(palette_drop("TextBlock", 2))
            .expect("accepted")
        else {
            panic!("expected a creation request");
        };

        let renderer = ScriptedRenderer::new(vec![Ok(RenderedFragment::new(text_html("n", 2)))]);
        let cell = RefCell::new(ed);
        block_on(create_block(&cell, &renderer, ticket)).expect("creation succeeds");
        let ed = cell.into_inner();

        assert!(ed.host().placeholder.is_none());
        assert!(ed.session().placeholder.is_none());
        assert_eq!(ed.tree().block_ids(), vec!["a", "b", "n", "c"]);
        assert!(ed.host().mirrors(ed.tree()));
    }

    #[test]
    fn test_unusable_fragment_fails_creation() {
        let mut ed = editor_abc();
        let ticket = ed.begin_creation("TextBlock", 1).expect("idle");
        let err = ed
            .complete_creation(&ticket, Ok(RenderedFragment::new("<div class=\"block-item\"></div>")))
            .expect_err("no root id");
        assert!(matches!(err, EditorError::Fragment(_)));
        assert_eq!(ed.tree().len(), 3);
    }

    #[test]
    fn test_second_begin_while_requesting_is_rejected() {
        let mut ed = editor_abc();
        let first = ed.begin_creation("TextBlock", 0).expect("idle");
        assert!(matches!(
            ed.begin_creation("ImageBlock", 1),
            Err(EditorError::CreationPending(t)) if t == first.ticket
        ));

        ed.complete_creation(&first, Ok(RenderedFragment::new(text_html("n", 0))))
            .expect("creation succeeds");
        assert!(ed.begin_creation("ImageBlock", 1).is_ok());
    }

    #[test]
    fn test_stale_ticket_is_rejected() {
        let mut ed = editor_abc();
        let first = ed.begin_creation("TextBlock", 0).expect("idle");
        ed.complete_creation(&first, Err(ApiError::http_status(502, "")))
            .expect_err("render fails");

        assert!(matches!(
            ed.complete_creation(&first, Ok(RenderedFragment::new(text_html("n", 0)))),
            Err(EditorError::UnknownCreation(_))
        ));
        assert_eq!(ed.tree().len(), 3);
    }

    #[test]
    fn test_captured_index_is_clamped_when_list_shrinks() {
        let mut ed = editor_abc();
        let ticket = ed.begin_creation("TextBlock", 3).expect("idle");

        // Other edits keep working while the request is out.
        ed.remove_block(0);
        ed.remove_block(0);

        let index = ed
            .complete_creation(&ticket, Ok(RenderedFragment::new(text_html("n", 3))))
            .expect("creation succeeds");
        assert_eq!(index, 1);
        assert_eq!(ed.tree().block_ids(), vec!["c", "n"]);
        assert_eq!(ed.tree().blocks()[1].fields[0].value, "Blocks_1__Body_Value");
        assert!(ed.host().mirrors(ed.tree()));
    }

    #[test]
    fn test_created_group_block_is_indexed() {
        let mut ed = editor_abc();
        let ticket = ed.begin_creation("SliderGroup", 0).expect("idle");
        ed.complete_creation(&ticket, Ok(RenderedFragment::new(group_html("g", 0, 2))))
            .expect("creation succeeds");

        assert_eq!(ed.tree().blocks()[0].type_name, "SliderGroup");
        assert_eq!(ed.tree().item_ids(0), vec!["g-0", "g-1"]);
        assert!(ed
            .host()
            .has_attribute("c", FieldAttr::InputName, "Blocks[3].Body.Value"));
        assert!(ed.host().mirrors(ed.tree()));
    }
}
