//! Consumed collaborator interfaces.
//!
//! The core never opens connections or touches editor buffers itself; it
//! talks to two capabilities provided by the surrounding integration:
//!
//! - [`Transport`] performs the wire exchange for one operation and
//!   aggregates the server's message stream.
//! - [`Editor`] reads source under the cursor, appends output lines and
//!   surfaces user-facing notifications.
//!
//! [`ScriptedTransport`] and [`RecordingEditor`] are the in-process fakes
//! the crate's own tests run against; integrations ship their own
//! implementations.

use crate::error::{Error, Result};
use crate::message::{DoneResponse, Operation};
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

/// A source file as the editor sees it, for `load-file` style operations.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceFile {
    /// Full path of the file.
    pub path: String,
    /// Base name of the file.
    pub name: String,
    /// Entire file content.
    pub content: String,
}

/// Wire transport: sends one operation and awaits its aggregated response.
///
/// Connection lifetime, framing and any timeout policy live behind this
/// trait; a hung round trip blocks the calling workflow.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, operation: Operation) -> Result<DoneResponse>;
}

/// Editor-side capabilities consumed by interceptors and workflows.
#[async_trait]
pub trait Editor: Send + Sync {
    /// Append lines of text to the designated output buffer.
    async fn append_lines(&self, lines: Vec<String>) -> Result<()>;

    /// The top-level form enclosing the cursor and its start position.
    async fn current_top_form(&self) -> Result<(String, usize)>;

    /// Namespace of the buffer under the cursor.
    async fn current_namespace(&self) -> Result<String>;

    /// The file backing the current buffer.
    async fn current_file(&self) -> Result<SourceFile>;

    /// Transient status-line message.
    async fn echo(&self, text: String) -> Result<()>;

    /// Informational notification.
    async fn info(&self, text: String) -> Result<()>;

    /// Error notification.
    async fn error(&self, text: String) -> Result<()>;
}

/// Transport fake: responses are queued per operation name and handed out
/// in FIFO order; every sent operation is recorded for inspection.
#[derive(Default)]
pub struct ScriptedTransport {
    queues: Mutex<HashMap<String, VecDeque<DoneResponse>>>,
    sent: Mutex<Vec<Operation>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a response for the next `op` operation.
    pub fn respond_with(&self, op: &str, response: DoneResponse) {
        self.queues
            .lock()
            .expect("scripted transport lock poisoned")
            .entry(op.to_string())
            .or_default()
            .push_back(response);
    }

    /// All operations sent so far, in order.
    pub fn sent(&self) -> Vec<Operation> {
        self.sent
            .lock()
            .expect("scripted transport lock poisoned")
            .clone()
    }

    /// The last operation sent with the given name, if any.
    pub fn last_sent(&self, op: &str) -> Option<Operation> {
        self.sent()
            .into_iter()
            .filter(|o| o.op == op)
            .next_back()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, operation: Operation) -> Result<DoneResponse> {
        let response = self
            .queues
            .lock()
            .expect("scripted transport lock poisoned")
            .get_mut(&operation.op)
            .and_then(VecDeque::pop_front)
            .ok_or_else(|| Error::Transport(format!("no scripted response for op {}", operation.op)))?;
        self.sent
            .lock()
            .expect("scripted transport lock poisoned")
            .push(operation);
        Ok(response)
    }
}

/// Editor fake: records everything, answers reads from configured values.
#[derive(Default)]
pub struct RecordingEditor {
    appended: Mutex<Vec<Vec<String>>>,
    echoes: Mutex<Vec<String>>,
    infos: Mutex<Vec<String>>,
    errors: Mutex<Vec<String>>,
    top_form: Mutex<Option<(String, usize)>>,
    namespace: Mutex<Option<String>>,
    file: Mutex<Option<SourceFile>>,
}

impl RecordingEditor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_top_form(&self, code: &str, position: usize) {
        *self.top_form.lock().expect("editor lock poisoned") =
            Some((code.to_string(), position));
    }

    pub fn set_namespace(&self, ns: &str) {
        *self.namespace.lock().expect("editor lock poisoned") = Some(ns.to_string());
    }

    pub fn set_file(&self, file: SourceFile) {
        *self.file.lock().expect("editor lock poisoned") = Some(file);
    }

    /// Every `append_lines` call, one entry per call.
    pub fn appended(&self) -> Vec<Vec<String>> {
        self.appended.lock().expect("editor lock poisoned").clone()
    }

    /// All appended lines flattened across calls.
    pub fn appended_flat(&self) -> Vec<String> {
        self.appended().into_iter().flatten().collect()
    }

    pub fn echoes(&self) -> Vec<String> {
        self.echoes.lock().expect("editor lock poisoned").clone()
    }

    pub fn infos(&self) -> Vec<String> {
        self.infos.lock().expect("editor lock poisoned").clone()
    }

    pub fn errors(&self) -> Vec<String> {
        self.errors.lock().expect("editor lock poisoned").clone()
    }
}

#[async_trait]
impl Editor for RecordingEditor {
    async fn append_lines(&self, lines: Vec<String>) -> Result<()> {
        self.appended.lock().expect("editor lock poisoned").push(lines);
        Ok(())
    }

    async fn current_top_form(&self) -> Result<(String, usize)> {
        self.top_form
            .lock()
            .expect("editor lock poisoned")
            .clone()
            .ok_or_else(|| Error::Editor("no top form configured".into()))
    }

    async fn current_namespace(&self) -> Result<String> {
        self.namespace
            .lock()
            .expect("editor lock poisoned")
            .clone()
            .ok_or_else(|| Error::Editor("no namespace configured".into()))
    }

    async fn current_file(&self) -> Result<SourceFile> {
        self.file
            .lock()
            .expect("editor lock poisoned")
            .clone()
            .ok_or_else(|| Error::Editor("no file configured".into()))
    }

    async fn echo(&self, text: String) -> Result<()> {
        self.echoes.lock().expect("editor lock poisoned").push(text);
        Ok(())
    }

    async fn info(&self, text: String) -> Result<()> {
        self.infos.lock().expect("editor lock poisoned").push(text);
        Ok(())
    }

    async fn error(&self, text: String) -> Result<()> {
        self.errors.lock().expect("editor lock poisoned").push(text);
        Ok(())
    }
}
