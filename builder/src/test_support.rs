//! Test-only completion backends with deterministic behavior.

use std::cell::RefCell;
use std::collections::VecDeque;

use anyhow::{Result, bail};

use crate::io::completion::{Completion, CompletionRequest};

/// Replays a fixed sequence of replies and records every request it saw.
///
/// When the scripted replies run out, the configured fallback reply repeats
/// forever so multi-iteration workflows stay deterministic.
pub struct ScriptedCompletion {
    replies: RefCell<VecDeque<String>>,
    fallback: String,
    calls: RefCell<Vec<CompletionRequest>>,
}

impl ScriptedCompletion {
    /// Script an exact reply sequence; after it is exhausted, `fallback`
    /// repeats.
    pub fn new<I, S>(replies: I, fallback: &str) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            replies: RefCell::new(replies.into_iter().map(Into::into).collect()),
            fallback: fallback.to_string(),
            calls: RefCell::new(Vec::new()),
        }
    }

    /// A backend that answers every request with the same reply.
    pub fn repeating(reply: &str) -> Self {
        Self::new(Vec::<String>::new(), reply)
    }

    /// Every request seen so far, in call order.
    pub fn calls(&self) -> Vec<CompletionRequest> {
        self.calls.borrow().clone()
    }

    /// Prompts of every request seen so far, in call order.
    pub fn prompts(&self) -> Vec<String> {
        self.calls
            .borrow()
            .iter()
            .map(|request| request.prompt.clone())
            .collect()
    }
}

impl Completion for ScriptedCompletion {
    fn complete(&self, request: &CompletionRequest) -> Result<String> {
        self.calls.borrow_mut().push(request.clone());
        Ok(self
            .replies
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| self.fallback.clone()))
    }
}

/// A backend that fails every request with the same error message.
pub struct FailingCompletion {
    message: String,
    calls: RefCell<Vec<CompletionRequest>>,
}

impl FailingCompletion {
    pub fn new(message: &str) -> Self {
        Self {
            message: message.to_string(),
            calls: RefCell::new(Vec::new()),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.borrow().len()
    }
}

impl Completion for FailingCompletion {
    fn complete(&self, request: &CompletionRequest) -> Result<String> {
        self.calls.borrow_mut().push(request.clone());
        bail!("{}", self.message)
    }
}
