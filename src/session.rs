use crate::{errors::Error, sid::SessionId, verdict::Verdict};

/// Marks a debug case that ran but printed nothing, as opposed to an empty
/// slot that has not run yet.
pub const NO_OUTPUT: &str = "no output";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionKind {
    Judge,
    Debug,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChannelState {
    Connecting,
    Open,
    Messaged,
    Errored,
    Closed,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct JudgeOutcome {
    pub verdict: Verdict,
    pub message: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DebugOutcome {
    pub outputs: Vec<String>,
    pub message: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    Judge(JudgeOutcome),
    Debug(DebugOutcome),
    Failed(String),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionStatus {
    Idle,
    Connecting,
    AwaitingResult,
    Completed(Outcome),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Level {
    Success,
    Info,
    Warning,
    Error,
}

/// A transient message for the user.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notice {
    pub level: Level,
    pub text: String,
}

/// What the transport driving a session has to do after a transition.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Effect {
    None,
    Dispatch,
    Close,
}

/// State of one submit or debug action, from the moment the user triggers it
/// until its push channel is closed.
///
/// Transitions are plain methods so the protocol can be exercised without a
/// network. Every path ends in exactly one terminal transition: a completed
/// outcome, or a revert to `Idle` with a notice. Events arriving after that
/// are ignored.
#[derive(Debug)]
pub struct SubmissionSession {
    sid: SessionId,
    kind: SessionKind,
    status: SessionStatus,
    channel: Option<ChannelState>,
    terminated: bool,
    notices: Vec<Notice>,
}

impl SubmissionSession {
    pub fn new(sid: SessionId, kind: SessionKind) -> Self {
        Self {
            sid,
            kind,
            status: SessionStatus::Idle,
            channel: None,
            terminated: false,
            notices: Vec::new(),
        }
    }

    pub fn sid(&self) -> &SessionId {
        &self.sid
    }

    pub fn kind(&self) -> SessionKind {
        self.kind
    }

    pub fn status(&self) -> &SessionStatus {
        &self.status
    }

    pub fn channel(&self) -> Option<ChannelState> {
        self.channel
    }

    pub fn notices(&self) -> &[Notice] {
        &self.notices
    }

    pub fn begin(&mut self) {
        if self.channel.is_none() {
            tracing::debug!(sid = %self.sid, kind = ?self.kind, "connecting push channel");
            self.channel = Some(ChannelState::Connecting);
            self.status = SessionStatus::Connecting;
        }
    }

    pub fn on_open(&mut self) -> Effect {
        if self.terminated || self.channel != Some(ChannelState::Connecting) {
            return Effect::None;
        }
        tracing::debug!(sid = %self.sid, "push channel open");
        self.channel = Some(ChannelState::Open);
        Effect::Dispatch
    }

    pub fn on_dispatched(&mut self) {
        if self.terminated || self.channel != Some(ChannelState::Open) {
            return;
        }
        tracing::debug!(sid = %self.sid, "request accepted, awaiting result");
        self.status = SessionStatus::AwaitingResult;
    }

    /// The backend answered the action request with a non-zero code.
    pub fn on_rejected(&mut self, error: Error) -> Effect {
        if self.terminated {
            return Effect::None;
        }
        let level = if error.is_duplicate_submission() {
            Level::Warning
        } else {
            Level::Error
        };
        let text = match (self.kind, error.is_duplicate_submission()) {
            (_, true) => error.to_string(),
            (SessionKind::Judge, false) => format!("submission failed: {error}"),
            (SessionKind::Debug, false) => format!("debug run failed: {error}"),
        };
        tracing::warn!(sid = %self.sid, "{text}");
        self.revert(level, text)
    }

    /// The action request itself could not be delivered.
    pub fn on_dispatch_failed(&mut self, error: Error) -> Effect {
        if self.terminated {
            return Effect::None;
        }
        let text = match self.kind {
            SessionKind::Judge => format!("failed to send submission request: {error}"),
            SessionKind::Debug => format!("failed to send debug request: {error}"),
        };
        tracing::warn!(sid = %self.sid, "{text}");
        self.revert(Level::Error, text)
    }

    /// The first and only message of the channel, already interpreted.
    pub fn on_message(&mut self, interpreted: Result<Outcome, Error>) -> Effect {
        if self.terminated || self.channel != Some(ChannelState::Open) {
            tracing::debug!(sid = %self.sid, "ignoring message on finished session");
            return Effect::None;
        }
        self.channel = Some(ChannelState::Messaged);
        self.terminated = true;

        let outcome = match interpreted {
            Ok(outcome) => outcome,
            Err(error) => {
                tracing::error!(sid = %self.sid, "{error}");
                let text = match self.kind {
                    SessionKind::Judge => "failed to parse judge result",
                    SessionKind::Debug => "failed to parse run result",
                };
                Outcome::Failed(text.to_string())
            }
        };

        match &outcome {
            Outcome::Judge(judge) => match judge.verdict {
                Verdict::Accepted => self.notify(Level::Success, "accepted"),
                Verdict::Rejected => self.notify(Level::Error, "wrong answer"),
                Verdict::Pending | Verdict::Running => {
                    tracing::warn!(sid = %self.sid, verdict = ?judge.verdict, "non-terminal judge status received");
                }
            },
            Outcome::Debug(debug) => {
                if let Some(message) = debug.message.clone() {
                    self.notify(Level::Info, message);
                }
            }
            Outcome::Failed(text) => {
                let text = text.clone();
                self.notify(Level::Error, text);
            }
        }

        tracing::info!(sid = %self.sid, ?outcome, "session completed");
        self.status = SessionStatus::Completed(outcome);
        Effect::Close
    }

    pub fn on_transport_error(&mut self, error: Error) -> Effect {
        if self.terminated {
            return Effect::None;
        }
        self.channel = Some(ChannelState::Errored);
        tracing::warn!(sid = %self.sid, "{error}");
        self.revert(Level::Error, error.to_string())
    }

    pub fn on_closed(&mut self) {
        if self.channel.is_some() {
            tracing::debug!(sid = %self.sid, "push channel closed");
            self.channel = Some(ChannelState::Closed);
        }
    }

    fn revert(&mut self, level: Level, text: String) -> Effect {
        self.terminated = true;
        self.status = SessionStatus::Idle;
        self.notify(level, text);
        Effect::Close
    }

    fn notify(&mut self, level: Level, text: impl Into<String>) {
        self.notices.push(Notice {
            level,
            text: text.into(),
        });
    }
}
