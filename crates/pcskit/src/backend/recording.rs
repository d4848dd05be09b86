//! In-memory backend for tests.

use crate::backend::Backend;
use crate::error::Result;
use declarative::CommandOutput;
use std::cell::RefCell;
use std::collections::VecDeque;

/// One recorded invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    pub args: Vec<String>,
    pub cib: Option<String>,
}

/// Backend that records every call and replays queued responses.
///
/// When the queue is empty every call succeeds with no output.
#[derive(Debug, Default)]
pub struct RecordingBackend {
    calls: RefCell<Vec<RecordedCall>>,
    responses: RefCell<VecDeque<CommandOutput>>,
}

impl RecordingBackend {
    /// A backend on which every command succeeds.
    pub fn succeeding() -> Self {
        Self::default()
    }

    /// A backend whose first call returns `xml` on stdout.
    pub fn with_snapshot(xml: &str) -> Self {
        let backend = Self::default();
        backend.push_success(xml);
        backend
    }

    /// Queue a successful response.
    pub fn push_success(&self, stdout: &str) {
        self.push_response(CommandOutput {
            stdout: stdout.as_bytes().to_vec(),
            stderr: Vec::new(),
            success: true,
            code: Some(0),
        });
    }

    /// Queue a failing response.
    pub fn push_failure(&self, code: i32, stderr: &str) {
        self.push_response(CommandOutput {
            stdout: Vec::new(),
            stderr: stderr.as_bytes().to_vec(),
            success: false,
            code: Some(code),
        });
    }

    pub fn push_response(&self, output: CommandOutput) {
        self.responses.borrow_mut().push_back(output);
    }

    /// Every call made so far, in order.
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.borrow().clone()
    }
}

impl Backend for RecordingBackend {
    fn execute(&self, args: &[String], cib: Option<&str>) -> Result<CommandOutput> {
        self.calls.borrow_mut().push(RecordedCall {
            args: args.to_vec(),
            cib: cib.map(str::to_string),
        });
        let output = self.responses.borrow_mut().pop_front();
        Ok(output.unwrap_or_else(|| CommandOutput {
            stdout: Vec::new(),
            stderr: Vec::new(),
            success: true,
            code: Some(0),
        }))
    }
}
