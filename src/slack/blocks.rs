//! Slack Block Kit message builders for the rotation announcements.

use slack_morphism::prelude::{SlackBlock, SlackBlockText, SlackDividerBlock, SlackSectionBlock};

use crate::chat::ChatMessage;
use crate::rotation::report::{notification_entries, ReportEntry};

/// Announcement asking members to react if they eat tomorrow.
pub const EATING_TOMORROW_TEXT: &str =
    "hey <!channel>, please react to this message (:thumbsup:) if you are eating tomorrow";

/// Header of the weekly ratio report.
pub const WEEKLY_REPORT_HEADER: &str =
    "dinner rotation members with the *worst* meals eaten to meals cooked ratios:";

/// Build a markdown section block.
#[must_use]
pub fn text_section(text: &str) -> SlackBlock {
    SlackBlock::Section(SlackSectionBlock::new().with_text(SlackBlockText::MarkDown(text.into())))
}

/// Build a section block with two-column markdown fields.
#[must_use]
pub fn fields_section(fields: &[String]) -> SlackBlock {
    let fields = fields
        .iter()
        .map(|field| SlackBlockText::MarkDown(field.as_str().into()))
        .collect();
    SlackBlock::Section(SlackSectionBlock::new().with_fields(fields))
}

/// Section describing one member of the ranked report.
#[must_use]
pub fn report_entry_section(entry: &ReportEntry) -> SlackBlock {
    fields_section(&[
        format!("*Real Name:*\n{}", entry.member.full_name),
        format!("*Slack Name:*\n<@{}>", entry.member.slack_uid),
        format!("*Ratio Status:*\n{}", entry.ratio.status()),
    ])
}

/// The "eating tomorrow" announcement.
#[must_use]
pub fn eating_tomorrow_message() -> ChatMessage {
    ChatMessage {
        text: EATING_TOMORROW_TEXT.to_owned(),
        blocks: vec![text_section(EATING_TOMORROW_TEXT)],
    }
}

/// The weekly report, limited to the first `limit` ranked entries.
#[must_use]
pub fn weekly_update_message(entries: &[ReportEntry], limit: usize) -> ChatMessage {
    let shown = notification_entries(entries, limit);
    let mut blocks = Vec::with_capacity(shown.len() * 2 + 1);
    blocks.push(text_section(WEEKLY_REPORT_HEADER));
    for entry in shown {
        blocks.push(SlackBlock::Divider(SlackDividerBlock::new()));
        blocks.push(report_entry_section(entry));
    }

    ChatMessage {
        text: WEEKLY_REPORT_HEADER.to_owned(),
        blocks,
    }
}
