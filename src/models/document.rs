//! Renderer-agnostic chat response documents.
//!
//! A [`PresentationDocument`] is an ordered list of display blocks plus an
//! ordered list of actions. The Slack layer converts it to Block Kit; the
//! `--eval` CLI prints it as JSON. Field order and map types are chosen so
//! serialization is deterministic.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Relative text size.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TextSize {
    /// Secondary text.
    Small,
    /// Body text.
    #[default]
    Default,
    /// Section titles.
    Medium,
    /// Card titles.
    Large,
}

/// Semantic text colour.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TextColor {
    /// No emphasis.
    #[default]
    Default,
    /// Needs immediate attention.
    Attention,
    /// Worth a look.
    Warning,
}

/// A run of text with presentation hints.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct TextBlock {
    /// Content; may contain light markdown (`*bold*`, `` `code` ``).
    pub text: String,
    /// Relative size.
    #[serde(default)]
    pub size: TextSize,
    /// Bold weight.
    #[serde(default)]
    pub bold: bool,
    /// Semantic colour.
    #[serde(default)]
    pub color: TextColor,
    /// De-emphasized.
    #[serde(default)]
    pub subtle: bool,
    /// Fixed-width font.
    #[serde(default)]
    pub monospace: bool,
}

impl TextBlock {
    /// Plain body text.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    /// Bold title text of the given size.
    pub fn title(text: impl Into<String>, size: TextSize) -> Self {
        Self::new(text).with_size(size).bold()
    }

    /// Set the size.
    #[must_use]
    pub fn with_size(mut self, size: TextSize) -> Self {
        self.size = size;
        self
    }

    /// Set the colour.
    #[must_use]
    pub fn with_color(mut self, color: TextColor) -> Self {
        self.color = color;
        self
    }

    /// Make bold.
    #[must_use]
    pub fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    /// Make subtle.
    #[must_use]
    pub fn subtle(mut self) -> Self {
        self.subtle = true;
        self
    }

    /// Use a fixed-width font.
    #[must_use]
    pub fn monospace(mut self) -> Self {
        self.monospace = true;
        self
    }
}

/// One row of a fact table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Fact {
    /// Label column.
    pub title: String,
    /// Value column.
    pub value: String,
}

impl Fact {
    /// Build a fact row.
    pub fn new(title: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            value: value.into(),
        }
    }
}

/// Column sizing inside a [`Block::Columns`] row.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ColumnWidth {
    /// Fit content.
    Auto,
    /// Take the remaining width.
    Stretch,
}

/// One cell of a column row.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Column {
    /// Sizing rule.
    pub width: ColumnWidth,
    /// Cell content.
    pub content: TextBlock,
}

impl Column {
    /// Content-sized cell.
    #[must_use]
    pub fn auto(content: TextBlock) -> Self {
        Self {
            width: ColumnWidth::Auto,
            content,
        }
    }

    /// Stretching cell.
    #[must_use]
    pub fn stretch(content: TextBlock) -> Self {
        Self {
            width: ColumnWidth::Stretch,
            content,
        }
    }
}

/// A free-text form field.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct InputField {
    /// Field identifier; submitted values are keyed by it.
    pub id: String,
    /// Field label.
    pub label: String,
    /// Hint shown while empty.
    pub placeholder: String,
    /// Multi-line entry.
    pub multiline: bool,
    /// Submission requires a value.
    pub required: bool,
}

/// One display block.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Block {
    /// A paragraph of text.
    Text(TextBlock),
    /// A two-column label/value table.
    Facts {
        /// Rows in display order.
        facts: Vec<Fact>,
    },
    /// A row of cells.
    Columns {
        /// Cells in display order.
        columns: Vec<Column>,
        /// Draw a separator above the row.
        separator: bool,
    },
    /// A form field.
    Input(InputField),
}

/// Visual weight of an action button.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ActionStyle {
    /// Neutral.
    #[default]
    Default,
    /// Affirmative / submit.
    Positive,
}

/// Opaque key/value payload carried by an action back to the router.
pub type ActionPayload = BTreeMap<String, String>;

/// A button offered with the document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Action {
    /// Button label.
    pub label: String,
    /// Visual weight.
    #[serde(default)]
    pub style: ActionStyle,
    /// Data handed back when pressed.
    pub payload: ActionPayload,
}

impl Action {
    /// Build an action whose payload holds an `action` tag and an `item_key`.
    pub fn for_item(label: impl Into<String>, action: &str, item_key: &str) -> Self {
        let mut payload = ActionPayload::new();
        payload.insert("action".to_owned(), action.to_owned());
        payload.insert("item_key".to_owned(), item_key.to_owned());
        Self {
            label: label.into(),
            style: ActionStyle::Default,
            payload,
        }
    }

    /// Set the visual weight.
    #[must_use]
    pub fn with_style(mut self, style: ActionStyle) -> Self {
        self.style = style;
        self
    }

    /// The payload's `action` tag.
    #[must_use]
    pub fn action_tag(&self) -> Option<&str> {
        self.payload.get("action").map(String::as_str)
    }
}

/// A complete chat response.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct PresentationDocument {
    /// Display blocks in order.
    pub blocks: Vec<Block>,
    /// Available actions in order.
    #[serde(default)]
    pub actions: Vec<Action>,
}

impl PresentationDocument {
    /// Empty document.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a block.
    pub fn push(&mut self, block: Block) {
        self.blocks.push(block);
    }

    /// Append a text block.
    pub fn push_text(&mut self, text: TextBlock) {
        self.blocks.push(Block::Text(text));
    }

    /// Append an action.
    pub fn push_action(&mut self, action: Action) {
        self.actions.push(action);
    }

    /// First input field, if the document is a form.
    #[must_use]
    pub fn input(&self) -> Option<&InputField> {
        self.blocks.iter().find_map(|block| match block {
            Block::Input(field) => Some(field),
            _ => None,
        })
    }

    /// Text of the first text block, used as a notification fallback.
    #[must_use]
    pub fn summary_text(&self) -> &str {
        self.blocks
            .iter()
            .find_map(|block| match block {
                Block::Text(text) => Some(text.text.as_str()),
                _ => None,
            })
            .unwrap_or_default()
    }
}
