use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use lifequest_core::model::HistoryEntry;

use crate::error::CoachError;

/// Assistant reply recorded when the coaching service cannot be reached.
pub const FALLBACK_REPLY: &str = "Coach link is down. Check your connection and try again.";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ChatRole {
    User,
    Assistant,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatTurn {
    pub role: ChatRole,
    pub content: String,
}

impl ChatTurn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
        }
    }
}

/// What the coach gets to see: the conversation so far and a short window of
/// recent sessions.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CoachingRequest {
    pub turns: Vec<ChatTurn>,
    /// Most recent first.
    pub recent_history: Vec<HistoryEntry>,
}

impl CoachingRequest {
    /// Persona prompt with the recent sessions embedded as JSON, for service
    /// implementations that front a chat-completion model.
    pub fn system_prompt(&self) -> String {
        let context = serde_json::to_string(&self.recent_history).unwrap_or_else(|_| "[]".into());
        format!(
            "You are a sharp, minimalist LifeQuest coach.\n\
             Recent sessions (newest first): {context}\n\
             Give short, punchy, slightly sarcastic but helpful coaching. \
             Two or three sentences at most. Be direct."
        )
    }
}

/// A chat-style coaching service. Replies are advisory text only.
#[async_trait]
pub trait CoachingService: Send + Sync {
    async fn advise(&self, request: &CoachingRequest) -> Result<String, CoachError>;
}

/// The running chat with the coach.
///
/// A request is split into [`begin`](Self::begin) and
/// [`complete`](Self::complete) so a front end can fire it off and drop the
/// result if the user moves on; [`ask`](Self::ask) does both in one await.
/// A request that is never completed is rolled back by
/// [`abandon`](Self::abandon), or by the next `begin`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Conversation {
    turns: Vec<ChatTurn>,
    waiting: bool,
    last_error: Option<String>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the user's message and build the request to send. Blank
    /// messages are ignored and yield `None`.
    pub fn begin(
        &mut self,
        message: &str,
        history: &[HistoryEntry],
        window: usize,
    ) -> Option<CoachingRequest> {
        if message.trim().is_empty() {
            return None;
        }
        self.abandon();
        self.turns.push(ChatTurn::user(message));
        self.waiting = true;
        Some(CoachingRequest {
            turns: self.turns.clone(),
            recent_history: history[..window.min(history.len())].to_vec(),
        })
    }

    /// Record the service's answer, or the fallback reply if it failed.
    /// Returns `None` when no request is outstanding, in which case a late
    /// answer is discarded.
    pub fn complete(&mut self, result: Result<String, CoachError>) -> Option<&ChatTurn> {
        if !self.waiting {
            tracing::debug!("Discarding coaching reply with no outstanding request");
            return None;
        }
        self.waiting = false;
        let reply = match result {
            Ok(text) if !text.trim().is_empty() => {
                self.last_error = None;
                text
            }
            Ok(_) => {
                tracing::warn!("Coaching service returned an empty reply");
                self.last_error = Some("empty reply".into());
                FALLBACK_REPLY.to_string()
            }
            Err(e) => {
                tracing::warn!("Coaching request failed: {e}");
                self.last_error = Some(e.to_string());
                FALLBACK_REPLY.to_string()
            }
        };
        self.turns.push(ChatTurn::assistant(reply));
        self.turns.last()
    }

    /// Drop the outstanding request, removing its unanswered user turn.
    /// Returns `false` when nothing was outstanding.
    pub fn abandon(&mut self) -> bool {
        if !self.waiting {
            return false;
        }
        self.waiting = false;
        if self.turns.last().map(|t| t.role) == Some(ChatRole::User) {
            self.turns.pop();
        }
        tracing::debug!("Coaching request abandoned");
        true
    }

    /// Send a message and wait for the reply.
    pub async fn ask<S: CoachingService + ?Sized>(
        &mut self,
        service: &S,
        message: &str,
        history: &[HistoryEntry],
        window: usize,
    ) -> Option<&ChatTurn> {
        let request = self.begin(message, history, window)?;
        let result = service.advise(&request).await;
        self.complete(result)
    }

    pub fn turns(&self) -> &[ChatTurn] {
        &self.turns
    }

    pub fn is_waiting(&self) -> bool {
        self.waiting
    }

    /// Why the last request fell back, if it did.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }
}
