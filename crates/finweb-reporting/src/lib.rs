//! # finweb-reporting
//!
//! Reporting boundary of the finweb framework.
//!
//! The framework never renders reports itself; it hands structured
//! attachments (text notes, screenshot bytes, session recordings) to an
//! [`AttachmentSink`] and leaves rendering/storage to the collaborator
//! behind it.
//!
//! Failure diagnostics follow a strict "best effort, never escalate"
//! policy: a scenario's verdict is independent of whether its diagnostics
//! could be captured.

mod capture;
mod sink;
mod video;

pub use capture::capture_failure_diagnostics;
pub use sink::{Attachment, AttachmentSink, FileSink, LogSink, MemorySink};
pub use video::{fetch_recording, recording_url};
