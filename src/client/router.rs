use serde_json::Value;

use crate::client::transport::ChannelFrame;
use crate::error::DecodeError;
use crate::types::events::server::ErrorDetails;
use crate::types::{ServerEvent, ServerEventKind};

/// Decodes one command channel frame. Only the `type` field is inspected
/// before the kind is known; the payload is decoded for that kind alone.
pub fn decode_frame(frame: &ChannelFrame) -> Result<ServerEvent, DecodeError> {
    match frame {
        ChannelFrame::Text(text) => decode_text(text),
        ChannelFrame::Binary(bytes) => decode_text(std::str::from_utf8(bytes).map_err(|_| DecodeError::NotUtf8)?),
    }
}

pub(crate) fn decode_text(text: &str) -> Result<ServerEvent, DecodeError> {
    let value: Value = serde_json::from_str(text).map_err(|e| DecodeError::Json(e.to_string()))?;
    let wire_type = value
        .get("type")
        .and_then(Value::as_str)
        .ok_or(DecodeError::MissingType)?;
    let kind = ServerEventKind::from_wire(wire_type).ok_or_else(|| DecodeError::UnknownType(wire_type.to_string()))?;
    ServerEvent::from_value(kind, value).map_err(|e| DecodeError::Payload {
        event_type: kind.wire_name(),
        reason: e.to_string(),
    })
}

/// What the session does with a decoded event besides forwarding it.
#[derive(Debug, PartialEq)]
pub(crate) enum Route<'a> {
    Ready,
    SessionExpired(&'a ErrorDetails),
    ServerError(&'a ErrorDetails),
    OutputStopped,
    Forward,
}

pub(crate) fn route(event: &ServerEvent) -> Route<'_> {
    match event {
        ServerEvent::SessionCreated(_) => Route::Ready,
        ServerEvent::Error(e) if e.error().is_session_expired() => Route::SessionExpired(e.error()),
        ServerEvent::Error(e) => Route::ServerError(e.error()),
        ServerEvent::OutputAudioBufferStopped(_) => Route::OutputStopped,
        _ => Route::Forward,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> ChannelFrame {
        ChannelFrame::Text(s.to_string())
    }

    #[test]
    fn decodes_both_output_buffer_spellings() {
        for wire in ["output_audio_buffer.stopped", "output_audio_buffer.audio_stopped"] {
            let frame = text(&format!(r#"{{"type":"{}","event_id":"ev_1","response_id":"resp_1"}}"#, wire));
            let event = decode_frame(&frame).unwrap();
            assert_eq!(event.kind(), ServerEventKind::OutputAudioBufferStopped);
            assert_eq!(route(&event), Route::OutputStopped);
        }
        let started = decode_frame(&text(r#"{"type":"output_audio_buffer.audio_started","event_id":"ev_2"}"#)).unwrap();
        assert_eq!(started.kind(), ServerEventKind::OutputAudioBufferStarted);
    }

    #[test]
    fn binary_frames_decode_as_utf8() {
        let frame = ChannelFrame::Binary(br#"{"type":"input_audio_buffer.cleared","event_id":"ev_3"}"#.to_vec());
        assert_eq!(decode_frame(&frame).unwrap().kind(), ServerEventKind::InputAudioBufferCleared);
        assert_eq!(decode_frame(&ChannelFrame::Binary(vec![0xff, 0xfe])), Err(DecodeError::NotUtf8));
    }

    #[test]
    fn rejects_bad_frames() {
        assert!(matches!(decode_frame(&text("{not json")), Err(DecodeError::Json(_))));
        assert_eq!(decode_frame(&text(r#"{"event_id":"x"}"#)), Err(DecodeError::MissingType));
        assert_eq!(decode_frame(&text(r#"{"type":7}"#)), Err(DecodeError::MissingType));
        assert_eq!(
            decode_frame(&text(r#"{"type":"response.mystery","event_id":"x"}"#)),
            Err(DecodeError::UnknownType("response.mystery".to_string()))
        );
        assert!(matches!(
            decode_frame(&text(r#"{"type":"response.done","event_id":"x"}"#)),
            Err(DecodeError::Payload { event_type: "response.done", .. })
        ));
    }

    #[test]
    fn routes_session_expiry_apart_from_other_errors() {
        let expired = decode_frame(&text(
            r#"{"type":"error","event_id":"ev_4","error":{"type":"invalid_request_error","code":"session_expired","message":"Your session hit the maximum duration of 30 minutes."}}"#,
        ))
        .unwrap();
        assert!(matches!(route(&expired), Route::SessionExpired(d) if d.is_session_expired()));

        let generic = decode_frame(&text(
            r#"{"type":"error","event_id":"ev_5","error":{"type":"invalid_request_error","code":"invalid_value","message":"bad"}}"#,
        ))
        .unwrap();
        assert!(matches!(route(&generic), Route::ServerError(_)));

        let created = decode_frame(&text(r#"{"type":"session.created","event_id":"ev_6","session":{"id":"sess_1"}}"#)).unwrap();
        assert_eq!(route(&created), Route::Ready);
    }
}
