//! Unread notice counting.

use crate::models::{Notice, UnreadBadge};

/// Counts above this show as "9+".
pub const BADGE_CAP: usize = 9;

/// Notices created strictly after `last_read_at`.
pub fn count_unread(notices: &[Notice], last_read_at: i64) -> usize {
    notices
        .iter()
        .filter(|n| n.created_at > last_read_at)
        .count()
}

pub fn badge_label(count: usize) -> String {
    match count {
        0 => String::new(),
        n if n > BADGE_CAP => format!("{}+", BADGE_CAP),
        n => n.to_string(),
    }
}

pub fn unread_badge(notices: &[Notice], last_read_at: i64) -> UnreadBadge {
    let count = count_unread(notices, last_read_at);
    UnreadBadge {
        count,
        label: badge_label(count),
    }
}

/// Badge shown right after the notice list is opened.
pub fn cleared_badge() -> UnreadBadge {
    UnreadBadge {
        count: 0,
        label: String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn notice(created_at: i64) -> Notice {
        Notice {
            id: created_at.to_string(),
            title: "Exam routine".to_string(),
            text: "Published".to_string(),
            created_at,
        }
    }

    #[test]
    fn test_count_is_strictly_after_last_read() {
        let notices = vec![notice(100), notice(200), notice(300)];
        assert_eq!(count_unread(&notices, 0), 3);
        assert_eq!(count_unread(&notices, 200), 1);
        assert_eq!(count_unread(&notices, 300), 0);
    }

    #[test]
    fn test_badge_label_caps() {
        assert_eq!(badge_label(0), "");
        assert_eq!(badge_label(1), "1");
        assert_eq!(badge_label(9), "9");
        assert_eq!(badge_label(10), "9+");
        assert_eq!(badge_label(250), "9+");
    }

    #[test]
    fn test_unread_badge() {
        let notices: Vec<Notice> = (1..=12).map(notice).collect();
        let badge = unread_badge(&notices, 0);
        assert_eq!(badge.count, 12);
        assert_eq!(badge.label, "9+");
        assert_eq!(cleared_badge().count, 0);
    }
}
