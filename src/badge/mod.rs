pub mod glyph;

use serde::Deserialize;
use std::fmt;

/// Largest count shown as a digit; anything above collapses to "+9".
pub const MAX_COUNT: u32 = 9;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BadgeValue {
    #[default]
    None,
    Dot,
    Count(u8),
    Overflow,
}

impl BadgeValue {
    pub fn from_count(count: u32) -> Self {
        match count {
            0 => BadgeValue::None,
            n if n <= MAX_COUNT => BadgeValue::Count(n as u8),
            _ => BadgeValue::Overflow,
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, BadgeValue::None)
    }

    /// True for badges that carry a number, which is what drives attention requests.
    pub fn is_positive_count(&self) -> bool {
        matches!(self, BadgeValue::Count(_) | BadgeValue::Overflow)
    }

    pub fn label(&self) -> String {
        match self {
            BadgeValue::None => String::new(),
            BadgeValue::Dot => "•".to_string(),
            BadgeValue::Count(n) => n.to_string(),
            BadgeValue::Overflow => format!("+{}", MAX_COUNT),
        }
    }
}

impl fmt::Display for BadgeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

/// Badge of a single server as reported by the state store.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(from = "RawBadge")]
pub enum ServerBadge {
    #[default]
    None,
    Dot,
    Count(u32),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawBadge {
    Count(u32),
    Number(f64),
    Flag(bool),
    Text(String),
    Other(serde_json::Value),
}

impl From<RawBadge> for ServerBadge {
    fn from(raw: RawBadge) -> Self {
        match raw {
            RawBadge::Count(0) => ServerBadge::None,
            RawBadge::Count(n) => ServerBadge::Count(n),
            // Whole numbers count; negative ones carry no unread messages.
            RawBadge::Number(n) if n.fract() == 0.0 => match n {
                n if n >= 1.0 => ServerBadge::Count(n.min(u32::MAX as f64) as u32),
                _ => ServerBadge::None,
            },
            RawBadge::Number(_) => ServerBadge::Dot,
            RawBadge::Flag(true) => ServerBadge::Dot,
            RawBadge::Text(text) if !text.is_empty() => ServerBadge::Dot,
            RawBadge::Other(serde_json::Value::Null) => ServerBadge::None,
            RawBadge::Other(_) => ServerBadge::Dot,
            RawBadge::Flag(false) | RawBadge::Text(_) => ServerBadge::None,
        }
    }
}

pub fn aggregate<'a, I>(badges: I) -> BadgeValue
where
    I: IntoIterator<Item = &'a ServerBadge>,
{
    let mut total: u32 = 0;
    let mut has_dot = false;

    for badge in badges {
        match badge {
            ServerBadge::Count(n) => total = total.saturating_add(*n),
            ServerBadge::Dot => has_dot = true,
            ServerBadge::None => {}
        }
    }

    match BadgeValue::from_count(total) {
        BadgeValue::None if has_dot => BadgeValue::Dot,
        value => value,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aggregate_boundaries() {
        let cases: Vec<(Vec<ServerBadge>, BadgeValue)> = vec![
            (vec![], BadgeValue::None),
            (vec![ServerBadge::None, ServerBadge::None], BadgeValue::None),
            (vec![ServerBadge::Dot], BadgeValue::Dot),
            (vec![ServerBadge::None, ServerBadge::Dot], BadgeValue::Dot),
            (vec![ServerBadge::Count(3), ServerBadge::Dot], BadgeValue::Count(3)),
            (vec![ServerBadge::Count(4), ServerBadge::Count(5)], BadgeValue::Count(9)),
            (vec![ServerBadge::Count(4), ServerBadge::Count(6)], BadgeValue::Overflow),
            (vec![ServerBadge::Count(0), ServerBadge::Dot], BadgeValue::Dot),
            (vec![ServerBadge::Count(u32::MAX), ServerBadge::Count(1)], BadgeValue::Overflow),
        ];

        for (badges, expected) in cases {
            assert_eq!(aggregate(&badges), expected, "badges {:?}", badges);
        }
    }

    #[test]
    fn aggregate_ignores_server_order() {
        let badges = vec![
            ServerBadge::Count(2),
            ServerBadge::Dot,
            ServerBadge::None,
            ServerBadge::Count(5),
        ];
        let expected = aggregate(&badges);

        for shift in 0..badges.len() {
            let mut rotated = badges.clone();
            rotated.rotate_left(shift);
            assert_eq!(aggregate(&rotated), expected);
            rotated.reverse();
            assert_eq!(aggregate(&rotated), expected);
        }
    }

    #[test]
    fn server_badge_deserializes_store_values() {
        let cases = [
            ("3", ServerBadge::Count(3)),
            ("0", ServerBadge::None),
            ("true", ServerBadge::Dot),
            ("false", ServerBadge::None),
            ("\"•\"", ServerBadge::Dot),
            ("\"\"", ServerBadge::None),
            ("null", ServerBadge::None),
            ("3.0", ServerBadge::Count(3)),
            ("2.5", ServerBadge::Dot),
            ("-1", ServerBadge::None),
            ("{\"x\": 1}", ServerBadge::Dot),
            ("[1]", ServerBadge::Dot),
            ("[]", ServerBadge::Dot),
            ("{}", ServerBadge::Dot),
        ];

        for (json, expected) in cases {
            let badge: ServerBadge = serde_json::from_str(json).unwrap();
            assert_eq!(badge, expected, "json {}", json);
        }
    }

    #[test]
    fn labels_match_badge_classes() {
        let cases = [
            (BadgeValue::None, ""),
            (BadgeValue::Dot, "•"),
            (BadgeValue::Count(1), "1"),
            (BadgeValue::Count(9), "9"),
            (BadgeValue::Overflow, "+9"),
        ];

        for (badge, expected) in cases {
            assert_eq!(badge.label(), expected);
        }
    }

    #[test]
    fn only_numeric_badges_are_positive_counts() {
        assert!(BadgeValue::Count(1).is_positive_count());
        assert!(BadgeValue::Overflow.is_positive_count());
        assert!(!BadgeValue::Dot.is_positive_count());
        assert!(!BadgeValue::None.is_positive_count());
    }
}
