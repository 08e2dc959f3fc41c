//! Inbound frame classification.
//!
//! Every text frame is a JSON object with a mandatory `type` tag. This is the
//! only place where the set of tags is open-ended: frames that do not parse,
//! or whose tag this client does not know, are classified here and then
//! dropped. Everything past this point matches exhaustively on
//! [`ServerMessage`].

use serde_json::Value;

use crate::protocol::ServerMessage;

/// Outcome of parsing one inbound frame.
#[derive(Debug, Clone, PartialEq)]
pub enum Frame {
    /// A known message with a well-formed payload.
    Message(ServerMessage),
    /// Valid JSON with a `type` tag outside the known vocabulary.
    UnknownType(String),
    /// Not JSON, no string `type` tag, or a known tag with the wrong shape.
    Malformed(String),
    /// Blank frame.
    Empty,
}

/// Parse a raw text frame.
pub fn classify_frame(raw: &str) -> Frame {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Frame::Empty;
    }

    let value: Value = match serde_json::from_str(trimmed) {
        Ok(v) => v,
        Err(e) => return Frame::Malformed(e.to_string()),
    };

    let tag = match value.get("type").and_then(Value::as_str) {
        Some(t) => t.to_string(),
        None => return Frame::Malformed("missing `type` tag".to_string()),
    };

    if !ServerMessage::is_known_tag(&tag) {
        return Frame::UnknownType(tag);
    }

    match serde_json::from_value::<ServerMessage>(value) {
        Ok(msg) => Frame::Message(msg),
        Err(e) => Frame::Malformed(format!("{tag}: {e}")),
    }
}

/// Parse a frame and keep it only if it is a known, well-formed message.
///
/// Unknown and malformed frames are logged at `debug` and dropped.
pub fn parse_server_frame(raw: &str) -> Option<ServerMessage> {
    match classify_frame(raw) {
        Frame::Message(msg) => Some(msg),
        Frame::UnknownType(tag) => {
            tracing::debug!(%tag, "Ignoring frame with unknown type");
            None
        }
        Frame::Malformed(reason) => {
            tracing::debug!(%reason, "Discarding malformed frame");
            None
        }
        Frame::Empty => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::ScoreEntry;

    #[test]
    fn parses_known_message() {
        let frame = classify_frame(
            r#"{"type":"leaderboard_update","leaderboard":[{"nickname":"ann","score":4}]}"#,
        );
        assert_eq!(
            frame,
            Frame::Message(ServerMessage::LeaderboardUpdate {
                leaderboard: vec![ScoreEntry {
                    nickname: "ann".into(),
                    score: 4
                }]
            })
        );
    }

    #[test]
    fn optional_message_fields_may_be_absent() {
        assert_eq!(
            classify_frame(r#"{"type":"tiktok_connected"}"#),
            Frame::Message(ServerMessage::TiktokConnected { message: None })
        );
    }

    #[test]
    fn extra_fields_are_tolerated() {
        assert_eq!(
            classify_frame(r#"{"type":"timer_update","time":7,"room":"x"}"#),
            Frame::Message(ServerMessage::TimerUpdate { time: 7 })
        );
    }

    #[test]
    fn unknown_tag_is_reported_not_failed() {
        assert_eq!(
            classify_frame(r#"{"type":"gift_received","coins":5}"#),
            Frame::UnknownType("gift_received".into())
        );
        assert_eq!(parse_server_frame(r#"{"type":"gift_received"}"#), None);
    }

    #[test]
    fn garbage_is_malformed() {
        assert!(matches!(classify_frame("not json"), Frame::Malformed(_)));
        assert!(matches!(classify_frame(r#"{"time":3}"#), Frame::Malformed(_)));
        assert!(matches!(classify_frame(r#"{"type":5}"#), Frame::Malformed(_)));
        assert!(matches!(classify_frame("[1,2]"), Frame::Malformed(_)));
    }

    #[test]
    fn known_tag_with_wrong_shape_is_malformed() {
        assert!(matches!(
            classify_frame(r#"{"type":"timer_update","time":"soon"}"#),
            Frame::Malformed(_)
        ));
        assert!(matches!(
            classify_frame(r#"{"type":"new_round","word":"apple"}"#),
            Frame::Malformed(_)
        ));
    }

    #[test]
    fn blank_frames_are_empty() {
        assert_eq!(classify_frame("   \n"), Frame::Empty);
    }
}
