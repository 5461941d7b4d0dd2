//! Attachment sink contract and bundled implementations

use std::path::PathBuf;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use tracing::{error, info, warn};
use uuid::Uuid;

/// One captured attachment
#[derive(Debug, Clone)]
pub struct Attachment {
    pub label: String,
    pub mime: String,
    pub bytes: Vec<u8>,
    pub at: DateTime<Utc>,
}

impl Attachment {
    pub fn text(&self) -> Option<String> {
        if self.mime.starts_with("text/") {
            String::from_utf8(self.bytes.clone()).ok()
        } else {
            None
        }
    }
}

/// Receiver of scenario diagnostics.
///
/// Implementations must tolerate being called from any worker at any point
/// of a scenario, including teardown.
pub trait AttachmentSink: Send + Sync {
    fn attach_text(&self, label: &str, text: &str);
    fn attach_bytes(&self, label: &str, mime: &str, bytes: Vec<u8>);
}

/// Sink that folds attachments into the structured log stream.
///
/// Binary payloads are logged by size only.
#[derive(Debug, Default)]
pub struct LogSink;

impl AttachmentSink for LogSink {
    fn attach_text(&self, label: &str, text: &str) {
        match label {
            "error" => error!(attachment = label, "{}", text),
            "warn" => warn!(attachment = label, "{}", text),
            _ => info!(attachment = label, "{}", text),
        }
    }

    fn attach_bytes(&self, label: &str, mime: &str, bytes: Vec<u8>) {
        info!(attachment = label, mime, size = bytes.len(), "binary attachment captured");
    }
}

/// In-memory sink for assertions in tests
#[derive(Debug, Default)]
pub struct MemorySink {
    attachments: Mutex<Vec<Attachment>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attachments(&self) -> Vec<Attachment> {
        self.attachments.lock().expect("memory sink poisoned").clone()
    }

    pub fn labels(&self) -> Vec<String> {
        self.attachments()
            .into_iter()
            .map(|attachment| attachment.label)
            .collect()
    }
}

impl AttachmentSink for MemorySink {
    fn attach_text(&self, label: &str, text: &str) {
        self.attachments
            .lock()
            .expect("memory sink poisoned")
            .push(Attachment {
                label: label.to_string(),
                mime: "text/plain".to_string(),
                bytes: text.as_bytes().to_vec(),
                at: Utc::now(),
            });
    }

    fn attach_bytes(&self, label: &str, mime: &str, bytes: Vec<u8>) {
        self.attachments
            .lock()
            .expect("memory sink poisoned")
            .push(Attachment {
                label: label.to_string(),
                mime: mime.to_string(),
                bytes,
                at: Utc::now(),
            });
    }
}

/// Sink that writes attachments into a results directory, one file each.
///
/// File names are uuid-prefixed so parallel workers never collide. Write
/// failures are logged and dropped; a sink must not disturb the run.
#[derive(Debug)]
pub struct FileSink {
    dir: PathBuf,
}

impl FileSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn write(&self, label: &str, extension: &str, bytes: &[u8]) {
        let sanitized: String = label
            .chars()
            .map(|c| if c.is_alphanumeric() || c == '-' { c } else { '_' })
            .collect();
        let name = format!("{}-{}.{}", Uuid::new_v4(), sanitized, extension);
        let path = self.dir.join(name);

        if let Err(err) = std::fs::create_dir_all(&self.dir)
            .and_then(|_| std::fs::write(&path, bytes))
        {
            warn!(path = %path.display(), error = %err, "couldn't persist attachment");
        }
    }
}

impl AttachmentSink for FileSink {
    fn attach_text(&self, label: &str, text: &str) {
        self.write(label, "txt", text.as_bytes());
    }

    fn attach_bytes(&self, label: &str, mime: &str, bytes: Vec<u8>) {
        let extension = match mime {
            "image/png" => "png",
            "video/mp4" => "mp4",
            _ => "bin",
        };
        self.write(label, extension, &bytes);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_sink_records_in_order() {
        let sink = MemorySink::new();
        sink.attach_text("first", "one");
        sink.attach_bytes("second", "image/png", vec![1, 2, 3]);

        let attachments = sink.attachments();
        assert_eq!(attachments.len(), 2);
        assert_eq!(attachments[0].text().as_deref(), Some("one"));
        assert_eq!(attachments[1].mime, "image/png");
        assert_eq!(attachments[1].bytes, vec![1, 2, 3]);
    }

    #[test]
    fn test_file_sink_writes_sanitized_names() {
        let dir = tempfile::tempdir().unwrap();
        let sink = FileSink::new(dir.path());
        sink.attach_text("screenshot: Open /equities", "note");
        sink.attach_bytes("recording", "video/mp4", vec![0u8; 16]);

        let entries: Vec<String> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(entries.len(), 2);
        assert!(entries.iter().any(|n| n.ends_with(".txt") && !n.contains('/')));
        assert!(entries.iter().any(|n| n.ends_with(".mp4")));
    }

    #[test]
    fn test_log_sink_accepts_anything() {
        let sink = LogSink;
        sink.attach_text("error", "boom");
        sink.attach_bytes("screenshot", "image/png", vec![0u8; 4]);
    }
}
