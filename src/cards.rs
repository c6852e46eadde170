//! Chat card builders.
//!
//! Each builder is a pure function of its input and returns a fresh
//! [`PresentationDocument`]. Transports decide how to draw the blocks.

use std::collections::BTreeMap;

use crate::models::document::{
    Action, ActionStyle, Block, Column, Fact, InputField, PresentationDocument, TextBlock,
    TextColor, TextSize,
};
use crate::models::interaction::{
    ACTION_CLAIM, ACTION_CLOSE, ACTION_CLOSE_PROMPT, CLOSE_REASON_FIELD,
};
use crate::models::item::{is_closed_status, ItemRecord, ProjectRecord, IN_PROGRESS_STATUS};

/// Maximum rows in a list card.
pub const LIST_CAP: usize = 15;

/// Maximum description length, in characters, in an item card.
pub const DESCRIPTION_CAP: usize = 300;

const ELLIPSIS: &str = "...";

/// Badge colour for a priority: P0 attention, P1 warning, anything else default.
#[must_use]
pub fn priority_color(priority: Option<i64>) -> TextColor {
    match priority {
        Some(0) => TextColor::Attention,
        Some(1) => TextColor::Warning,
        _ => TextColor::Default,
    }
}

/// Glyph for a status: done, active, or open.
#[must_use]
pub fn status_glyph(status: &str) -> &'static str {
    if is_closed_status(status) {
        "\u{2705}"
    } else if status.eq_ignore_ascii_case(IN_PROGRESS_STATUS) {
        "\u{1f504}"
    } else {
        "\u{2b1a}"
    }
}

/// Cap text at `max` characters, ending in `...` when cut.
#[must_use]
pub fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_owned();
    }
    let keep = max.saturating_sub(ELLIPSIS.len());
    let mut out: String = text.chars().take(keep).collect();
    out.push_str(ELLIPSIS);
    out
}

fn priority_badge(item: &ItemRecord, size: TextSize) -> TextBlock {
    TextBlock::new(format!("P{}", item.priority_label()))
        .with_color(priority_color(item.priority_level()))
        .with_size(size)
        .bold()
}

/// Detail card for one item.
#[must_use]
pub fn item_card(item: &ItemRecord) -> PresentationDocument {
    let key = item.display_key();
    let status = item.status();

    let mut doc = PresentationDocument::new();
    doc.push(Block::Columns {
        columns: vec![
            Column::auto(TextBlock::title(key, TextSize::Large).monospace()),
            Column::stretch(TextBlock::new(item.display_title()).bold()),
            Column::auto(priority_badge(item, TextSize::Default)),
        ],
        separator: false,
    });
    doc.push(Block::Facts {
        facts: vec![
            Fact::new("Status", format!("{} {status}", status_glyph(status))),
            Fact::new("Type", item.item_type()),
            Fact::new("Assigned", item.assignee()),
        ],
    });

    let description = item.description();
    if !description.is_empty() {
        doc.push_text(
            TextBlock::new(truncate(description, DESCRIPTION_CAP))
                .with_size(TextSize::Small)
                .subtle(),
        );
    }

    if !item.is_closed() {
        doc.push_action(Action::for_item("Claim", ACTION_CLAIM, key));
        doc.push_action(Action::for_item("Close", ACTION_CLOSE_PROMPT, key));
    }

    doc
}

fn item_row(item: &ItemRecord) -> Block {
    Block::Columns {
        columns: vec![
            Column::auto(
                TextBlock::new(format!("`{}`", item.display_key()))
                    .monospace()
                    .with_size(TextSize::Small),
            ),
            Column::auto(priority_badge(item, TextSize::Small)),
            Column::stretch(TextBlock::new(item.display_title()).with_size(TextSize::Small)),
            Column::auto(TextBlock::new(status_glyph(item.status())).with_size(TextSize::Small)),
        ],
        separator: true,
    }
}

/// Compact list of items under a title, capped at [`LIST_CAP`] rows.
#[must_use]
pub fn item_list_card(items: &[ItemRecord], title: &str) -> PresentationDocument {
    let mut doc = PresentationDocument::new();
    doc.push_text(TextBlock::title(title, TextSize::Large));

    if items.is_empty() {
        doc.push_text(TextBlock::new("No items found.").subtle());
        return doc;
    }

    for item in items.iter().take(LIST_CAP) {
        doc.push(item_row(item));
    }

    if items.len() > LIST_CAP {
        doc.push_text(
            TextBlock::new(format!("... and {} more", items.len() - LIST_CAP))
                .subtle()
                .with_size(TextSize::Small),
        );
    }

    doc
}

/// List card for actionable work.
#[must_use]
pub fn ready_card(items: &[ItemRecord]) -> PresentationDocument {
    item_list_card(items, "Ready Work")
}

/// Message text with an optional title.
#[must_use]
pub fn text_card(text: &str, title: Option<&str>) -> PresentationDocument {
    let mut doc = PresentationDocument::new();
    if let Some(title) = title {
        doc.push_text(TextBlock::title(title, TextSize::Medium));
    }
    doc.push_text(TextBlock::new(text));
    doc
}

/// Failure message.
#[must_use]
pub fn error_card(message: &str) -> PresentationDocument {
    text_card(&format!("\u{26a0}\u{fe0f} {message}"), Some("Error"))
}

/// Acknowledgement of a completed write.
#[must_use]
pub fn confirmation_card(message: &str) -> PresentationDocument {
    text_card(&format!("\u{2705} {message}"), None)
}

/// Error for a command that needed an item key and had none.
#[must_use]
pub fn usage_card(usage: &str) -> PresentationDocument {
    error_card(&format!("No item key found. Usage: {usage}"))
}

/// Form asking for a close reason.
#[must_use]
pub fn close_prompt_card(item_key: &str) -> PresentationDocument {
    let mut doc = PresentationDocument::new();
    doc.push_text(TextBlock::title(format!("Close {item_key}"), TextSize::Medium));
    doc.push(Block::Input(InputField {
        id: CLOSE_REASON_FIELD.to_owned(),
        label: "Reason".to_owned(),
        placeholder: "Reason for closing...".to_owned(),
        multiline: true,
        required: true,
    }));
    doc.push_action(
        Action::for_item("Close Item", ACTION_CLOSE, item_key).with_style(ActionStyle::Positive),
    );
    doc
}

/// Command reference.
#[must_use]
pub fn help_card(bot_name: &str) -> PresentationDocument {
    let mut doc = PresentationDocument::new();
    doc.push_text(TextBlock::title(
        format!("{bot_name}: Commands"),
        TextSize::Large,
    ));
    doc.push(Block::Facts {
        facts: vec![
            Fact::new("ready", "Show actionable work"),
            Fact::new("show <key>", "Show item details"),
            Fact::new("list [project]", "List open items"),
            Fact::new("claim <key>", "Claim an item"),
            Fact::new("done <key> <reason>", "Close an item"),
            Fact::new("status [project]", "Count items by status"),
            Fact::new("projects", "List registered projects"),
            Fact::new("help", "Show this help"),
        ],
    });
    doc.push_text(
        TextBlock::new(
            "You can also use natural phrases like \"what's ready\" or \"show me os-mjb\".",
        )
        .subtle(),
    );
    doc
}

/// Reply for text that matched no command.
#[must_use]
pub fn unknown_card(bot_name: &str) -> PresentationDocument {
    text_card(
        "I didn't understand that. Type *help* to see available commands.",
        Some(bot_name),
    )
}

/// Registered projects, one row each.
#[must_use]
pub fn projects_card(projects: &[ProjectRecord]) -> PresentationDocument {
    let mut doc = PresentationDocument::new();
    doc.push_text(TextBlock::title("Registered Projects", TextSize::Large));

    if projects.is_empty() {
        doc.push_text(TextBlock::new("No projects registered.").subtle());
        return doc;
    }

    for project in projects {
        let has_beads = if project.has_beads {
            "\u{2705}"
        } else {
            "\u{274c}"
        };
        doc.push(Block::Columns {
            columns: vec![
                Column::auto(TextBlock::new(project.name.as_deref().unwrap_or("?")).bold()),
                Column::auto(
                    TextBlock::new(format!("({}-)", project.prefix.as_deref().unwrap_or("?")))
                        .subtle(),
                ),
                Column::auto(TextBlock::new(has_beads)),
            ],
            separator: true,
        });
    }
    doc
}

/// Item counts per status, one line each in status order.
#[must_use]
pub fn status_card(counts: &BTreeMap<String, usize>, project: Option<&str>) -> PresentationDocument {
    let summary = if counts.is_empty() {
        "No items found.".to_owned()
    } else {
        counts
            .iter()
            .map(|(status, count)| format!("*{status}*: {count}"))
            .collect::<Vec<_>>()
            .join("\n")
    };
    let title = match project {
        Some(project) => format!("Status: {project}"),
        None => "Status: All Projects".to_owned(),
    };
    text_card(&summary, Some(&title))
}
