// Chunked NDJSON streaming for run state changes and notifications
use crate::domain::run::RunState;
use axum::body::Body;
use axum::http::{Response, StatusCode, header};
use bytes::{BufMut, Bytes, BytesMut};
use futures::StreamExt;
use futures::stream;
use serde::Serialize;
use tokio::sync::{broadcast, watch};
use tokio_stream::wrappers::WatchStream;

#[derive(Debug, Serialize)]
#[serde(tag = "event", rename_all = "lowercase")]
enum RunEvent {
    State { state: RunState },
    Notice { message: String },
}

/// Build a chunked response streaming state transitions and notification
/// messages as one JSON object per line. The current state is emitted first
/// so a client is consistent the moment it connects.
pub fn run_event_stream(
    state_rx: watch::Receiver<RunState>,
    mut notice_rx: broadcast::Receiver<String>,
) -> Result<Response<Body>, StatusCode> {
    let states = WatchStream::new(state_rx).map(|state| RunEvent::State { state });

    let notices = async_stream::stream! {
        loop {
            match notice_rx.recv().await {
                Ok(message) => yield RunEvent::Notice { message },
                // A slow reader only loses intermediate messages.
                Err(broadcast::error::RecvError::Lagged(_)) => continue,
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    };

    let byte_stream = stream::select(states, notices).map(encode_event);
    let body = Body::from_stream(byte_stream);

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "application/x-ndjson")
        .header(header::TRANSFER_ENCODING, "chunked")
        .body(body)
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)
}

/// Serialize a single event to a newline-terminated chunk.
fn encode_event(event: RunEvent) -> Result<Bytes, std::io::Error> {
    let json = serde_json::to_vec(&event).map_err(std::io::Error::other)?;

    let mut chunk = BytesMut::with_capacity(json.len() + 1);
    chunk.put_slice(&json);
    chunk.put_u8(b'\n');
    Ok(chunk.freeze())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_event_is_one_json_line() {
        let chunk = encode_event(RunEvent::State {
            state: RunState::Running,
        })
        .unwrap();

        assert_eq!(&chunk[..], b"{\"event\":\"state\",\"state\":\"running\"}\n");
    }
}
