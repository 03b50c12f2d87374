use serde::{Deserialize, Serialize};

/// Markup attribute that carries a positional identifier.
///
/// All four kinds are rewritten together by a normalize pass; leaving one behind
/// binds an input to the wrong position on submit.
#[derive(
    Serialize,
    Deserialize,
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    strum::Display,
    strum::IntoStaticStr,
    strum::EnumIter,
)]
pub enum FieldAttr {
    /// `id` of an `input`, `textarea` or `select`.
    #[strum(serialize = "id")]
    InputId,
    /// `name` of an `input`, `textarea` or `select`.
    #[strum(serialize = "name")]
    InputName,
    /// `data-id` of a `contenteditable` region.
    #[strum(serialize = "data-id")]
    ContentId,
    /// `data-mediaid` of a media picker button.
    #[strum(serialize = "data-mediaid")]
    MediaId,
}

impl FieldAttr {
    pub fn attribute(self) -> &'static str {
        self.into()
    }

    /// Names use the bracket flavour (`Blocks[0].Items[1]`), everything else the
    /// underscore flavour (`Blocks_0__Items_1__`).
    pub fn is_name(self) -> bool {
        matches!(self, FieldAttr::InputName)
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct FieldDescriptor {
    pub attr: FieldAttr,
    pub value: String,
}

impl FieldDescriptor {
    pub fn new(attr: FieldAttr, value: impl Into<String>) -> Self {
        Self {
            attr,
            value: value.into(),
        }
    }
}

/// A sub-unit of a group block, shown one at a time in the block's detail pane.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct GroupItem {
    /// Element id of the item's detail pane.
    pub id: String,
    pub fields: Vec<FieldDescriptor>,
    pub selected: bool,
}

impl GroupItem {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            fields: vec![],
            selected: false,
        }
    }

    pub fn with_field(mut self, attr: FieldAttr, value: impl Into<String>) -> Self {
        self.fields.push(FieldDescriptor::new(attr, value));
        self
    }

    pub fn selected(mut self, selected: bool) -> Self {
        self.selected = selected;
        self
    }
}

/// A top-level content unit bound to a server-rendered form fragment.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Block {
    /// Element id of the block's root node.
    pub id: String,
    pub type_name: String,
    pub fields: Vec<FieldDescriptor>,

    /// `Some` for group kinds, even while the group is momentarily empty.
    #[serde(default)]
    pub items: Option<Vec<GroupItem>>,

    /// Ids of rich-content editor regions that need activation once mounted.
    #[serde(default)]
    pub regions: Vec<String>,
}

impl Block {
    pub fn new(id: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            type_name: type_name.into(),
            fields: vec![],
            items: None,
            regions: vec![],
        }
    }

    pub fn with_field(mut self, attr: FieldAttr, value: impl Into<String>) -> Self {
        self.fields.push(FieldDescriptor::new(attr, value));
        self
    }

    pub fn with_items(mut self, items: Vec<GroupItem>) -> Self {
        self.items = Some(items);
        self
    }

    pub fn with_region(mut self, id: impl Into<String>) -> Self {
        self.regions.push(id.into());
        self
    }

    pub fn is_group(&self) -> bool {
        self.items.is_some()
    }

    pub fn items(&self) -> &[GroupItem] {
        self.items.as_deref().unwrap_or(&[])
    }

    pub fn selected_item(&self) -> Option<usize> {
        self.items().iter().position(|i| i.selected)
    }
}

/// A creatable block kind as listed in the palette.
///
/// Mirrors the server-side block type registration (name, category, icon).
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct BlockType {
    #[serde(rename = "typeName")]
    pub type_name: String,

    /// Visible label.
    #[serde(rename = "name")]
    pub title: String,

    #[serde(default)]
    pub category: String,

    #[serde(default)]
    pub icon: Option<String>,
}

impl BlockType {
    pub fn new(
        type_name: impl Into<String>,
        title: impl Into<String>,
        category: impl Into<String>,
    ) -> Self {
        Self {
            type_name: type_name.into(),
            title: title.into(),
            category: category.into(),
            icon: None,
        }
    }
}

/// The node the sortable primitive reports as moved.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DraggedNode {
    /// A palette entry copied into a list; never a tree member.
    Placeholder { type_name: String },
    Block { id: String },
    Item { id: String },
}

/// Markup for one block as returned by the renderer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderedFragment {
    pub html: String,
}

impl RenderedFragment {
    pub fn new(html: impl Into<String>) -> Self {
        Self { html: html.into() }
    }
}

/// Marker kept on a content region to show its empty-state hint.
#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display, strum::IntoStaticStr)]
pub enum RegionMark {
    #[strum(serialize = "empty")]
    Empty,
    #[strum(serialize = "check-empty")]
    CheckEmpty,
}
