//! Live log-source attachment with guaranteed release.

use bollard::Docker;
use bollard::container::{LogOutput, LogsOptions};
use dockwatch_core::{ContainerInfo, Error, LogEvent};
use futures_util::StreamExt;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::demux::{demux_chunk, encode_frame};

/// Backlog requested when attaching.
const TAIL_LINES: &str = "100";

/// Capacity of the decoded-event channel.
const CHANNEL_CAPACITY: usize = 256;

/// A live attachment to one container's combined stdout/stderr stream.
///
/// Dropping the handle (or calling [`LogStream::detach`]) aborts the follow
/// task, so the engine-side stream is released on every exit path.
pub struct LogStream {
    /// Receiver for decoded events, in engine emission order.
    pub rx: mpsc::Receiver<LogEvent>,
    task: Option<JoinHandle<()>>,
}

impl LogStream {
    /// Attach to a container's log stream: the last 100 lines plus live
    /// follow, with timestamps requested.
    pub fn start(docker: Docker, container: &ContainerInfo) -> Self {
        let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
        let id = container.id.clone();
        let name = container.name.clone();

        let task = tokio::spawn(async move {
            let options = LogsOptions::<String> {
                follow: true,
                stdout: true,
                stderr: true,
                timestamps: true,
                tail: TAIL_LINES.to_string(),
                ..Default::default()
            };

            let mut stream = docker.logs(&id, Some(options));

            while let Some(result) = stream.next().await {
                match result {
                    Ok(output) => {
                        let chunk = reframe(output);
                        for line in demux_chunk(&chunk) {
                            if tx.send(LogEvent::line(name.clone(), line)).await.is_err() {
                                // Receiver dropped, stop streaming
                                return;
                            }
                        }
                    }
                    Err(e) => {
                        let error = Error::Source(e.to_string());
                        tracing::error!("log stream failed for {name}: {error}");
                        let _ = tx.send(LogEvent::from_source_error(name, &error)).await;
                        // No retry; recovery is a client-issued start.
                        return;
                    }
                }
            }
        });

        Self {
            rx,
            task: Some(task),
        }
    }

    /// Build an unmanaged stream around an existing channel (for tests and
    /// mock engines).
    pub fn from_channel(rx: mpsc::Receiver<LogEvent>) -> Self {
        Self { rx, task: None }
    }

    /// Cancel the follow task and release the engine stream.
    ///
    /// Idempotent: detaching an already-detached stream is a no-op.
    pub fn detach(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

impl Drop for LogStream {
    fn drop(&mut self) {
        self.detach();
    }
}

/// Rebuild the engine's wire framing around a demultiplexed record.
///
/// bollard splits the multiplexed transport into per-record frames; the
/// line decoder expects the raw on-the-wire bytes, so the 8-byte header is
/// put back before decoding.
fn reframe(output: LogOutput) -> Vec<u8> {
    let stream_id = match &output {
        LogOutput::StdIn { .. } => 0,
        LogOutput::StdOut { .. } | LogOutput::Console { .. } => 1,
        LogOutput::StdErr { .. } => 2,
    };
    encode_frame(stream_id, &output.into_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reframed_record_survives_the_line_decoder_intact() {
        let output = LogOutput::StdErr {
            message: (&b"2024-01-01T00:00:00Z oh no\n"[..]).into(),
        };
        let lines = demux_chunk(&reframe(output));
        assert_eq!(lines, vec!["2024-01-01T00:00:00Z oh no".to_string()]);
    }

    #[tokio::test]
    async fn detach_is_idempotent() {
        let (_tx, rx) = mpsc::channel(1);
        let mut stream = LogStream::from_channel(rx);
        stream.detach();
        stream.detach();
    }

    #[tokio::test]
    async fn from_channel_passes_events_through() {
        let (tx, rx) = mpsc::channel(4);
        let mut stream = LogStream::from_channel(rx);
        tx.send(LogEvent::line("web-1", "hello")).await.unwrap();
        drop(tx);

        let event = stream.rx.recv().await.unwrap();
        assert_eq!(event.data, "hello");
        assert_eq!(event.container_name, "web-1");
        assert!(stream.rx.recv().await.is_none());
    }
}
