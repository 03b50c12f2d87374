//! Position codec for field identifiers.
//!
//! Form fields bind to a positional array on the server, so every identifier embeds
//! the owning block's index (and, inside a group, the item's index):
//!
//! - ids: `Blocks_{b}__Body`, `Blocks_{b}__Items_{s}__Title`
//! - names: `Blocks[{b}].Body`, `Blocks[{b}].Items[{s}].Title`
//!
//! Rewriting replaces only the first positional match and leaves the rest of the
//! value untouched.

use crate::models::FieldAttr;
use regex::{NoExpand, Regex};
use std::sync::LazyLock;

static BLOCK_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Blocks_(\d+)__").expect("block id pattern"));
static BLOCK_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Blocks\[(\d+)\]").expect("block name pattern"));
static ITEM_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Blocks_(\d+)__Items_(\d+)__").expect("item id pattern"));
static ITEM_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"Blocks\[(\d+)\]\.Items\[(\d+)\]").expect("item name pattern")
});

/// Tree address of a field: a block index and, for group items, the item index.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Position {
    pub block: usize,
    pub item: Option<usize>,
}

impl Position {
    pub fn block(block: usize) -> Self {
        Self { block, item: None }
    }

    pub fn item(block: usize, item: usize) -> Self {
        Self {
            block,
            item: Some(item),
        }
    }
}

pub fn encode_block(block: usize) -> String {
    format!("Blocks_{block}__")
}

pub fn encode_block_name(block: usize) -> String {
    format!("Blocks[{block}]")
}

pub fn encode_item(block: usize, item: usize) -> String {
    format!("Blocks_{block}__Items_{item}__")
}

pub fn encode_item_name(block: usize, item: usize) -> String {
    format!("Blocks[{block}].Items[{item}]")
}

/// Encoded fragment for `pos` in the flavour `attr` uses.
pub fn encode(attr: FieldAttr, pos: Position) -> String {
    match (attr.is_name(), pos.item) {
        (false, None) => encode_block(pos.block),
        (true, None) => encode_block_name(pos.block),
        (false, Some(s)) => encode_item(pos.block, s),
        (true, Some(s)) => encode_item_name(pos.block, s),
    }
}

fn pattern(attr: FieldAttr, item_level: bool) -> &'static Regex {
    match (attr.is_name(), item_level) {
        (false, false) => &BLOCK_ID,
        (true, false) => &BLOCK_NAME,
        (false, true) => &ITEM_ID,
        (true, true) => &ITEM_NAME,
    }
}

/// Rewrite the first positional match in `value` to `pos`.
///
/// Returns `None` when the value is empty or carries no positional pattern of the
/// expected level; such fields are static and left alone.
pub fn rewrite(attr: FieldAttr, value: &str, pos: Position) -> Option<String> {
    if value.is_empty() {
        return None;
    }

    let re = pattern(attr, pos.item.is_some());
    if !re.is_match(value) {
        return None;
    }

    Some(
        re.replacen(value, 1, NoExpand(&encode(attr, pos)))
            .into_owned(),
    )
}

pub fn rewrite_block_position(attr: FieldAttr, value: &str, block: usize) -> Option<String> {
    rewrite(attr, value, Position::block(block))
}

pub fn rewrite_item_position(
    attr: FieldAttr,
    value: &str,
    block: usize,
    item: usize,
) -> Option<String> {
    rewrite(attr, value, Position::item(block, item))
}

/// Address encoded in `value`, preferring the item-level reading.
pub fn decode(attr: FieldAttr, value: &str) -> Option<Position> {
    if let Some(caps) = pattern(attr, true).captures(value) {
        let block = caps[1].parse().ok()?;
        let item = caps[2].parse().ok()?;
        return Some(Position::item(block, item));
    }

    let caps = pattern(attr, false).captures(value)?;
    Some(Position::block(caps[1].parse().ok()?))
}
