//! JSON messages exchanged over the duplex channel.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::event::{LogEvent, LogEventKind};

/// Client-to-server commands.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "action", rename_all = "lowercase")]
pub enum ClientMessage {
    /// Present a signed token for this connection.
    Authenticate {
        /// Bearer token issued by the login endpoint.
        token: String,
    },
    /// Attach to a container's log stream by name.
    Start {
        /// Exact (stripped) container name to attach to.
        #[serde(rename = "containerName")]
        container_name: String,
    },
    /// Release the current attachment.
    Stop,
}

impl ClientMessage {
    /// Parse one inbound text frame.
    ///
    /// Unknown actions and malformed JSON are both protocol errors; the
    /// caller decides what (fixed) wording reaches the client.
    pub fn parse(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(|e| Error::Protocol(e.to_string()))
    }
}

/// Server-to-client events.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ServerMessage {
    /// The connection passed the authentication gate.
    Authenticated,
    /// A log source was attached.
    Connected {
        /// Name of the attached container.
        #[serde(rename = "containerName")]
        container_name: String,
    },
    /// The log source was released.
    Disconnected,
    /// One decoded log line.
    Log {
        /// Line text with transport framing removed.
        data: String,
        /// RFC3339 receipt time.
        timestamp: String,
        /// Originating container name.
        #[serde(rename = "containerName")]
        container_name: String,
    },
    /// Something went wrong; rendered inline by the client.
    Error {
        /// Human-readable description.
        message: String,
    },
}

impl ServerMessage {
    /// Convert an in-transit event into its wire message.
    pub fn from_event(event: LogEvent) -> Self {
        match event.kind {
            LogEventKind::Log => Self::Log {
                data: event.data,
                timestamp: event.timestamp.to_rfc3339(),
                container_name: event.container_name,
            },
            LogEventKind::Error => Self::Error {
                message: event.data,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_messages_use_original_wire_fields() {
        let msg: ClientMessage =
            serde_json::from_str(r#"{"action":"start","containerName":"web-1"}"#).unwrap();
        assert_eq!(
            msg,
            ClientMessage::Start {
                container_name: "web-1".to_string()
            }
        );

        let msg: ClientMessage =
            serde_json::from_str(r#"{"action":"authenticate","token":"abc"}"#).unwrap();
        assert_eq!(
            msg,
            ClientMessage::Authenticate {
                token: "abc".to_string()
            }
        );

        let msg: ClientMessage = serde_json::from_str(r#"{"action":"stop"}"#).unwrap();
        assert_eq!(msg, ClientMessage::Stop);
    }

    #[test]
    fn unknown_action_is_a_protocol_error() {
        assert!(matches!(
            ClientMessage::parse(r#"{"action":"restart"}"#),
            Err(Error::Protocol(_))
        ));
    }

    #[test]
    fn malformed_json_is_a_protocol_error() {
        assert!(matches!(
            ClientMessage::parse("{not json"),
            Err(Error::Protocol(_))
        ));
    }

    #[test]
    fn server_messages_serialize_with_type_tag() {
        let json = serde_json::to_value(ServerMessage::Connected {
            container_name: "web-1".to_string(),
        })
        .unwrap();
        assert_eq!(json["type"], "connected");
        assert_eq!(json["containerName"], "web-1");

        let json = serde_json::to_value(ServerMessage::Error {
            message: "boom".to_string(),
        })
        .unwrap();
        assert_eq!(json["type"], "error");
        assert_eq!(json["message"], "boom");

        let json = serde_json::to_value(ServerMessage::Disconnected).unwrap();
        assert_eq!(json["type"], "disconnected");
    }

    #[test]
    fn log_event_maps_onto_log_message() {
        let event = LogEvent::line("web-1", "hello");
        let json = serde_json::to_value(ServerMessage::from_event(event)).unwrap();
        assert_eq!(json["type"], "log");
        assert_eq!(json["data"], "hello");
        assert_eq!(json["containerName"], "web-1");
        assert!(json["timestamp"].as_str().is_some_and(|t| t.contains('T')));
    }

    #[test]
    fn source_error_maps_onto_error_message() {
        let event = LogEvent::error("web-1", "Log stream error: broken pipe");
        let json = serde_json::to_value(ServerMessage::from_event(event)).unwrap();
        assert_eq!(json["type"], "error");
        assert_eq!(json["message"], "Log stream error: broken pipe");
    }
}
