use crate::{
    errors::Error,
    message::push::{DebugPush, JudgePush},
    session::{DebugOutcome, JudgeOutcome, Outcome, NO_OUTPUT},
    verdict::Verdict,
};
use serde::de::DeserializeOwned;

// An empty frame is read as an empty object.
fn parse<T: DeserializeOwned>(body: &str) -> Result<T, Error> {
    let body = if body.trim().is_empty() { "{}" } else { body };
    serde_json::from_str(body).map_err(|e| Error::MalformedResult(e.to_string()))
}

pub fn judge(body: &str) -> Result<Outcome, Error> {
    let push: JudgePush = parse(body)?;
    Ok(Outcome::Judge(JudgeOutcome {
        verdict: Verdict::from_status(push.status),
        message: push.judge_info.and_then(|info| info.message),
    }))
}

/// Lines the outputs up with the `inputs` submitted cases. Slots the backend
/// left out, sent as null or sent empty all read as [`NO_OUTPUT`].
pub fn debug(body: &str, inputs: usize) -> Result<Outcome, Error> {
    let push: DebugPush = parse(body)?;
    let received = push.output_list.unwrap_or_default();
    let slots = inputs.max(received.len());

    let mut received = received.into_iter();
    let outputs = (0..slots)
        .map(|_| match received.next().flatten() {
            Some(output) if !output.is_empty() => output,
            _ => NO_OUTPUT.to_string(),
        })
        .collect();

    Ok(Outcome::Debug(DebugOutcome {
        outputs,
        message: push.message.filter(|message| !message.is_empty()),
    }))
}
