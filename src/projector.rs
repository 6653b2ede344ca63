use crate::{
    message::request::{Page, SubmissionRecord},
    question::{acceptance_rate, difficulty_text, parse_tags, QuestionRecord},
    session::{Level, Notice, Outcome, SessionKind, SessionStatus, SubmissionSession, NO_OUTPUT},
    verdict::{status_text, Verdict},
};
use chrono::{DateTime, Utc};
use serde_json::Value;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Indicator {
    Hidden,
    Spinner,
    Check,
    Cross,
}

impl Indicator {
    pub fn glyph(&self) -> &'static str {
        match self {
            Indicator::Hidden => "",
            Indicator::Spinner => "…",
            Indicator::Check => "✔",
            Indicator::Cross => "✘",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Projection {
    pub indicator: Indicator,
    pub label: String,
}

impl Projection {
    pub fn render(&self) -> String {
        match self.indicator {
            Indicator::Hidden => String::new(),
            indicator => format!("{} {}", indicator.glyph(), self.label),
        }
    }
}

pub fn project(session: &SubmissionSession) -> Projection {
    let in_progress = match session.kind() {
        SessionKind::Judge => "judging...",
        SessionKind::Debug => "running...",
    };
    let (indicator, label) = match session.status() {
        SessionStatus::Idle => (Indicator::Hidden, String::new()),
        SessionStatus::Connecting | SessionStatus::AwaitingResult => {
            (Indicator::Spinner, in_progress.to_string())
        }
        SessionStatus::Completed(Outcome::Judge(judge)) => {
            let (indicator, label) = match judge.verdict {
                Verdict::Accepted => (Indicator::Check, "accepted"),
                Verdict::Rejected => (Indicator::Cross, "wrong answer"),
                Verdict::Pending | Verdict::Running => (Indicator::Spinner, in_progress),
            };
            let label = match &judge.message {
                Some(message) if judge.verdict.is_terminal() => format!("{label} ({message})"),
                _ => label.to_string(),
            };
            (indicator, label)
        }
        SessionStatus::Completed(Outcome::Debug(debug)) => {
            let ran = debug.outputs.iter().filter(|output| *output != NO_OUTPUT).count();
            (
                Indicator::Check,
                format!("finished, {ran} of {} cases printed output", debug.outputs.len()),
            )
        }
        SessionStatus::Completed(Outcome::Failed(text)) => (Indicator::Cross, text.clone()),
    };
    Projection { indicator, label }
}

pub fn render_notice(notice: &Notice) -> String {
    let tag = match notice.level {
        Level::Success => "success",
        Level::Info => "info",
        Level::Warning => "warning",
        Level::Error => "error",
    };
    format!("[{tag}] {}", notice.text)
}

/// Pairs each debug input with its output slot; slots not filled yet render
/// blank.
pub fn render_cases(inputs: &[String], outputs: &[String]) -> String {
    let slots = inputs.len().max(outputs.len());
    (0..slots)
        .map(|index| {
            let input = inputs.get(index).map(String::as_str).unwrap_or_default();
            let output = outputs.get(index).map(String::as_str).unwrap_or_default();
            format!(
                "case {}\n  input:  {}\n  output: {}",
                index + 1,
                input.trim_end(),
                output.trim_end()
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn render_submissions(page: &Page<SubmissionRecord>) -> String {
    let mut lines = vec![format!(
        "page {} ({} shown, {} per page, {} submissions)",
        page.current,
        page.records.len(),
        page.size,
        page.total
    )];
    for record in &page.records {
        let info = record.judge_info.clone().unwrap_or_default();
        lines.push(format!(
            "{:<20} {:<20} {:<6} {:<13} {:>7} {:>9}  {}  {}",
            record.id.to_string(),
            record
                .question_id
                .as_ref()
                .map_or("-".to_string(), ToString::to_string),
            record.language.as_deref().unwrap_or("-"),
            status_text(record.status),
            info.time.map_or("N/A".to_string(), |time| format!("{time} ms")),
            info.memory.map_or("N/A".to_string(), format_memory),
            record.create_time.as_ref().map_or("-".to_string(), format_time),
            info.message.as_deref().unwrap_or("-"),
        ));
    }
    lines.join("\n")
}

pub fn render_questions(page: &Page<QuestionRecord>) -> String {
    let mut lines = vec![format!(
        "page {} ({} shown, {} per page, {} questions)",
        page.current,
        page.records.len(),
        page.size,
        page.total
    )];
    for record in &page.records {
        // Only in-flight and accepted submissions are marked.
        let marker = match record.submit_status {
            Some(0 | 1) => Indicator::Spinner,
            Some(2) => Indicator::Check,
            _ => Indicator::Hidden,
        };
        let tags = parse_tags(&record.tags);
        lines.push(format!(
            "{:<1} {:<20} {:<6} {:>6} ({}/{})  {:<19}  {}{}",
            marker.glyph(),
            record.id.to_string(),
            difficulty_text(record.difficulty),
            acceptance_rate(record.accepted_num, record.submit_num),
            record.accepted_num,
            record.submit_num,
            record.update_time.as_ref().map_or("-".to_string(), format_time),
            record.title,
            if tags.is_empty() {
                String::new()
            } else {
                format!(" [{}]", tags.join(", "))
            },
        ));
    }
    lines.join("\n")
}

fn format_memory(kilobytes: i64) -> String {
    if kilobytes >= 1024 {
        format!("{:.1} MB", kilobytes as f64 / 1024.0)
    } else {
        format!("{kilobytes} KB")
    }
}

/// Timestamps arrive either as epoch milliseconds or as date strings.
pub fn format_time(value: &Value) -> String {
    const FORMAT: &str = "%Y-%m-%d %H:%M:%S";
    match value {
        Value::Number(number) => number
            .as_i64()
            .and_then(DateTime::<Utc>::from_timestamp_millis)
            .map_or_else(|| "-".to_string(), |time| time.format(FORMAT).to_string()),
        Value::String(text) => DateTime::parse_from_rfc3339(text)
            .map(|time| time.format(FORMAT).to_string())
            .unwrap_or_else(|_| text.clone()),
        _ => "-".to_string(),
    }
}
