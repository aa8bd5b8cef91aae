//! Unit tests for Slack Block Kit builders.

use dinner_rotation::models::member::Member;
use dinner_rotation::rotation::report::rank_members;
use dinner_rotation::slack::blocks;

fn member(uid: &str, name: &str, eaten: i64, cooked: i64) -> Member {
    Member {
        id: 0,
        slack_uid: uid.into(),
        full_name: name.into(),
        meals_eaten: eaten,
        meals_cooked: cooked,
        leader: false,
    }
}

#[test]
fn eating_tomorrow_uses_announcement_text() {
    let message = blocks::eating_tomorrow_message();
    assert_eq!(
        message.text,
        "hey <!channel>, please react to this message (:thumbsup:) if you are eating tomorrow"
    );
}

#[test]
fn report_entry_lists_name_mention_and_status() {
    let entries = rank_members(vec![member("U1", "Ada Lovelace", 4, 0)]);
    let block = blocks::report_entry_section(&entries[0]);
    let rendered = serde_json::to_string(&block).expect("block serializes");
    assert!(rendered.contains("*Real Name:*\\nAda Lovelace"), "{rendered}");
    assert!(rendered.contains("<@U1>"), "{rendered}");
    assert!(rendered.contains("Infinity! You've eaten but never cooked"), "{rendered}");
}

#[test]
fn weekly_update_starts_with_header() {
    let entries = rank_members(vec![member("U1", "A", 1, 1), member("U2", "B", 0, 0)]);
    let message = blocks::weekly_update_message(&entries, 11);
    assert_eq!(message.text, blocks::WEEKLY_REPORT_HEADER);
    let first = serde_json::to_string(&message.blocks[0]).unwrap();
    assert!(first.contains("*worst*"), "{first}");
    // header + divider/section per member
    assert_eq!(message.blocks.len(), 5);
}

#[test]
fn weekly_update_with_zero_limit_has_only_header() {
    let entries = rank_members(vec![member("U1", "A", 1, 1)]);
    let message = blocks::weekly_update_message(&entries, 0);
    assert_eq!(message.blocks.len(), 1);
}
