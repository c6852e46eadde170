//! Slack Block Kit rendering of [`PresentationDocument`]s.
//!
//! Colours become emoji markers, subtle text becomes a context block, and
//! each action becomes a button whose `action_id` is the action tag and
//! whose `value` is the JSON-encoded payload.

use slack_morphism::prelude::{
    SlackActionBlockElement, SlackActionId, SlackActionsBlock, SlackBlock, SlackBlockButtonElement,
    SlackBlockId, SlackBlockMarkDownText, SlackBlockPlainTextInputElement, SlackBlockPlainTextOnly,
    SlackBlockText, SlackCallbackId, SlackContextBlock, SlackContextBlockElement,
    SlackDividerBlock, SlackHeaderBlock, SlackInputBlock, SlackInputBlockElement, SlackModalView,
    SlackSectionBlock, SlackView,
};
use tracing::warn;

use crate::cards::truncate;
use crate::models::document::{
    Action, ActionStyle, Block, Column, Fact, InputField, PresentationDocument, TextBlock,
    TextColor, TextSize,
};

/// `block_id` of the actions block appended to rendered documents.
pub const ACTIONS_BLOCK_ID: &str = "item_actions";

/// Slack caps modal titles at 24 characters.
const MODAL_TITLE_CAP: usize = 24;

/// Separator between cells of a column row.
const CELL_GAP: &str = "   ";

/// Build a markdown section block.
#[must_use]
pub fn text_section(text: &str) -> SlackBlock {
    SlackBlock::Section(SlackSectionBlock::new().with_text(SlackBlockText::MarkDown(text.into())))
}

fn context_line(text: String) -> SlackBlock {
    SlackBlock::Context(SlackContextBlock::new(vec![
        SlackContextBlockElement::MarkDown(SlackBlockMarkDownText::new(text)),
    ]))
}

fn color_marker(color: TextColor) -> &'static str {
    match color {
        TextColor::Attention => "\u{1f534} ",
        TextColor::Warning => "\u{1f7e0} ",
        TextColor::Default => "",
    }
}

/// Inline mrkdwn for a text run.
#[must_use]
pub fn inline_markdown(text: &TextBlock) -> String {
    let mut out = text.text.clone();
    if text.monospace && !out.contains('`') {
        out = format!("`{out}`");
    }
    if text.bold && !out.is_empty() {
        out = format!("*{out}*");
    }
    format!("{}{out}", color_marker(text.color))
}

fn render_text(text: &TextBlock) -> SlackBlock {
    let is_heading = text.bold && matches!(text.size, TextSize::Large | TextSize::Medium);
    if is_heading && !text.monospace {
        return SlackBlock::Header(SlackHeaderBlock::new(SlackBlockPlainTextOnly::from(
            text.text.as_str(),
        )));
    }
    if text.subtle || text.size == TextSize::Small {
        return context_line(inline_markdown(text));
    }
    text_section(&inline_markdown(text))
}

fn render_facts(facts: &[Fact]) -> SlackBlock {
    let fields = facts
        .iter()
        .map(|fact| SlackBlockText::MarkDown(format!("*{}*\n{}", fact.title, fact.value).into()))
        .collect();
    SlackBlock::Section(SlackSectionBlock::new().with_fields(fields))
}

fn render_columns(columns: &[Column]) -> SlackBlock {
    let row = columns
        .iter()
        .map(|column| inline_markdown(&column.content))
        .filter(|cell| !cell.is_empty())
        .collect::<Vec<_>>()
        .join(CELL_GAP);
    text_section(&row)
}

fn render_input(field: &InputField) -> SlackBlock {
    let element = SlackBlockPlainTextInputElement::new(SlackActionId(field.id.clone()))
        .with_multiline(field.multiline)
        .with_placeholder(SlackBlockPlainTextOnly::from(field.placeholder.as_str()));

    SlackBlock::Input(
        SlackInputBlock::new(
            SlackBlockPlainTextOnly::from(field.label.as_str()),
            SlackInputBlockElement::PlainTextInput(element),
        )
        .with_block_id(SlackBlockId(field.id.clone()))
        .with_optional(!field.required),
    )
}

/// Button for one action, or `None` if the payload cannot be encoded.
fn render_button(action: &Action) -> Option<SlackActionBlockElement> {
    let tag = action.action_tag()?;
    let value = match serde_json::to_string(&action.payload) {
        Ok(value) => value,
        Err(err) => {
            warn!(%err, action = tag, "failed to encode action payload");
            return None;
        }
    };
    let mut button = SlackBlockButtonElement::new(
        SlackActionId(tag.to_owned()),
        SlackBlockPlainTextOnly::from(action.label.as_str()),
    )
    .with_value(value);
    if action.style == ActionStyle::Positive {
        button = button.with_style("primary".to_owned());
    }
    Some(SlackActionBlockElement::Button(button))
}

/// Actions block holding one button per action, if any render.
#[must_use]
pub fn action_buttons(actions: &[Action]) -> Option<SlackBlock> {
    let elements: Vec<SlackActionBlockElement> = actions.iter().filter_map(render_button).collect();
    if elements.is_empty() {
        return None;
    }
    Some(SlackBlock::Actions(
        SlackActionsBlock::new(elements).with_block_id(SlackBlockId(ACTIONS_BLOCK_ID.to_owned())),
    ))
}

/// Render display blocks only, without actions.
#[must_use]
pub fn render_blocks(doc: &PresentationDocument) -> Vec<SlackBlock> {
    let mut out = Vec::with_capacity(doc.blocks.len() + 1);
    for block in &doc.blocks {
        match block {
            Block::Text(text) => out.push(render_text(text)),
            Block::Facts { facts } => out.push(render_facts(facts)),
            Block::Columns { columns, separator } => {
                if *separator {
                    out.push(SlackBlock::Divider(SlackDividerBlock::new()));
                }
                out.push(render_columns(columns));
            }
            Block::Input(field) => out.push(render_input(field)),
        }
    }
    out
}

/// Render a whole document as a message body.
#[must_use]
pub fn render_document(doc: &PresentationDocument) -> Vec<SlackBlock> {
    let mut out = render_blocks(doc);
    if let Some(actions) = action_buttons(&doc.actions) {
        out.push(actions);
    }
    out
}

/// `callback_id` for a form opened for an action on an item.
#[must_use]
pub fn form_callback_id(action: &str, item_key: &str) -> String {
    format!("{action}:{item_key}")
}

/// Build a modal from a form document.
///
/// The first action supplies the submit label and, with its `item_key`,
/// the `callback_id` (`{action}:{item_key}`). The first text block becomes
/// the title. Returns `None` for documents without an input field or an
/// action.
#[must_use]
pub fn form_modal(doc: &PresentationDocument, private_metadata: &str) -> Option<SlackView> {
    doc.input()?;
    let submit = doc.actions.first()?;
    let action = submit.action_tag()?;
    let item_key = submit.payload.get("item_key").map_or("", String::as_str);

    let title = truncate(doc.summary_text(), MODAL_TITLE_CAP);
    let blocks = doc
        .blocks
        .iter()
        .skip_while(|block| matches!(block, Block::Text(_)))
        .cloned()
        .collect::<Vec<_>>();
    let body = render_blocks(&PresentationDocument {
        blocks,
        actions: Vec::new(),
    });

    Some(SlackView::Modal(
        SlackModalView::new(SlackBlockPlainTextOnly::from(title.as_str()), body)
            .with_callback_id(SlackCallbackId(form_callback_id(action, item_key)))
            .with_submit(SlackBlockPlainTextOnly::from(submit.label.as_str()))
            .with_private_metadata(private_metadata.to_owned()),
    ))
}
