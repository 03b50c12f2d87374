//! Scanning of renderer markup into a [`Block`].
//!
//! The renderer returns one block per response, already indexed for the position it
//! was requested at. Only the markup contract the editor relies on is read:
//!
//! - the first element is the block root and must carry an `id`;
//! - `input`/`textarea`/`select` contribute their `id` and `name`;
//! - `contenteditable="true"` regions contribute `data-id`;
//! - `button`s contribute `data-mediaid`;
//! - `.block-group` marks a group block, `.block-group-item` opens an item scope
//!   (hidden with `.d-none` unless displayed);
//! - `.block-editor` elements are rich regions to activate after mounting.

use crate::models::{Block, FieldAttr, FieldDescriptor, GroupItem};
use regex::Regex;
use std::sync::LazyLock;
use thiserror::Error;

static COMMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<!--.*?-->").expect("comment pattern"));
static TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<(/?)([A-Za-z][A-Za-z0-9-]*)((?:[^>"']|"[^"]*"|'[^']*')*)>"#)
        .expect("tag pattern")
});
static ATTR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"([A-Za-z_:][-A-Za-z0-9_:.]*)(?:\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'=<>`]+)))?"#)
        .expect("attribute pattern")
});

const VOID_TAGS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source",
    "track", "wbr",
];

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FragmentError {
    #[error("rendered fragment contains no element")]
    Empty,
    #[error("rendered fragment root <{0}> has no id")]
    MissingRootId(String),
}

struct Tag<'a> {
    name: String,
    attrs: Vec<(String, &'a str)>,
}

impl Tag<'_> {
    fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| *v)
    }

    fn has_class(&self, class: &str) -> bool {
        self.attr("class")
            .is_some_and(|c| c.split_whitespace().any(|x| x == class))
    }
}

fn parse_attrs(raw: &str) -> Vec<(String, &str)> {
    ATTR.captures_iter(raw)
        .map(|c| {
            let value = c
                .get(2)
                .or_else(|| c.get(3))
                .or_else(|| c.get(4))
                .map_or("", |m| m.as_str());
            (c[1].to_ascii_lowercase(), value)
        })
        .collect()
}

struct Frame {
    tag: String,
    item: Option<usize>,
}

/// Build a block model from renderer markup.
///
/// `type_name` is used unless the root carries a `data-type` attribute.
pub fn scan(html: &str, type_name: &str) -> Result<Block, FragmentError> {
    let html = COMMENT.replace_all(html, "");

    let mut block: Option<Block> = None;
    let mut items: Vec<GroupItem> = vec![];
    let mut is_group = false;
    let mut stack: Vec<Frame> = vec![];

    for caps in TAG.captures_iter(&html) {
        let name = caps[2].to_ascii_lowercase();

        if &caps[1] == "/" {
            if let Some(at) = stack.iter().rposition(|f| f.tag == name) {
                stack.truncate(at);
            }
            continue;
        }

        let raw = caps.get(3).map_or("", |m| m.as_str());
        let self_closing = raw.trim_end().ends_with('/');
        let tag = Tag {
            name,
            attrs: parse_attrs(raw.trim_end().trim_end_matches('/')),
        };

        if block.is_none() {
            let id = tag
                .attr("id")
                .filter(|id| !id.is_empty())
                .ok_or_else(|| FragmentError::MissingRootId(tag.name.clone()))?;
            let ty = tag.attr("data-type").unwrap_or(type_name);
            block = Some(Block::new(id, ty));
        }
        let Some(current) = block.as_mut() else {
            continue;
        };

        let mut opens_item = None;
        if tag.has_class("block-group") {
            is_group = true;
        }
        if tag.has_class("block-group-item") {
            is_group = true;
            if let Some(id) = tag.attr("id").filter(|id| !id.is_empty()) {
                items.push(GroupItem::new(id).selected(!tag.has_class("d-none")));
                opens_item = Some(items.len() - 1);
            }
        }
        if tag.has_class("block-editor") {
            if let Some(id) = tag.attr("id").filter(|id| !id.is_empty()) {
                current.regions.push(id.to_string());
            }
        }

        let fields = tag_fields(&tag);
        if !fields.is_empty() {
            let scope = opens_item.or_else(|| stack.iter().rev().find_map(|f| f.item));
            match scope {
                Some(i) => items[i].fields.extend(fields),
                None => current.fields.extend(fields),
            }
        }

        if !self_closing && !VOID_TAGS.contains(&tag.name.as_str()) {
            stack.push(Frame {
                tag: tag.name,
                item: opens_item,
            });
        }
    }

    let mut block = block.ok_or(FragmentError::Empty)?;
    if is_group {
        finish_group(&mut block, items);
    }
    Ok(block)
}

fn tag_fields(tag: &Tag<'_>) -> Vec<FieldDescriptor> {
    element_fields(&tag.name, |name| tag.attr(name).map(str::to_string))
}

/// Positional fields an element contributes, given its lowercase tag name and
/// an attribute lookup.
pub(crate) fn element_fields(
    tag: &str,
    attr: impl Fn(&str) -> Option<String>,
) -> Vec<FieldDescriptor> {
    let mut out = vec![];
    let mut push = |field: FieldAttr| {
        if let Some(v) = attr(field.attribute()).filter(|v| !v.is_empty()) {
            out.push(FieldDescriptor::new(field, v));
        }
    };

    if matches!(tag, "input" | "textarea" | "select") {
        push(FieldAttr::InputId);
        push(FieldAttr::InputName);
    }
    if attr("contenteditable").is_some_and(|v| v.eq_ignore_ascii_case("true")) {
        push(FieldAttr::ContentId);
    }
    if tag == "button" {
        push(FieldAttr::MediaId);
    }
    out
}

/// Attach scanned items to a group block, displaying at most the first
/// visible one.
pub(crate) fn finish_group(block: &mut Block, mut items: Vec<GroupItem>) {
    if let Some(first) = items.iter().position(|i| i.selected) {
        for item in items.iter_mut().skip(first + 1) {
            item.selected = false;
        }
    }
    block.items = Some(items);
}
