use serde::Deserialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Verdict {
    Pending,
    Running,
    Accepted,
    Rejected,
}

impl Verdict {
    /// Maps the numeric submission status used on the wire. Anything the
    /// backend does not document is left pending.
    pub fn from_status(status: Option<i64>) -> Verdict {
        match status {
            Some(1) => Verdict::Running,
            Some(2) => Verdict::Accepted,
            Some(3) => Verdict::Rejected,
            _ => Verdict::Pending,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Verdict::Accepted | Verdict::Rejected)
    }
}

pub fn status_text(status: Option<i64>) -> &'static str {
    match status {
        Some(0) => "pending",
        Some(1) => "judging",
        Some(2) => "accepted",
        Some(3) => "wrong answer",
        _ => "unknown",
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JudgeInfo {
    pub message: Option<String>,
    pub time: Option<i64>,   // ms
    pub memory: Option<i64>, // KB
}
