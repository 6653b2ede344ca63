use crate::{
    language::Language,
    question::{Difficulty, QuestionDraft},
    sid::SessionId,
    verdict::JudgeInfo,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitRequest {
    pub question_id: String,
    pub language: Language,
    pub code: String,
    pub sid: SessionId,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DebugRequest {
    pub code: String,
    pub language: Language,
    pub input_list: Vec<String>,
    pub sid: SessionId,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionQuery {
    pub current: u64,
    pub page_size: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<Language>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub question_id: Option<String>,
    pub sort_field: String,
    pub sort_order: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionQuery {
    pub current: u64,
    pub page_size: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<Difficulty>,
    pub sort_field: String,
    pub sort_order: String,
}

/// Body of both `add` and `edit`; `id` is only present when editing.
#[derive(Debug, Serialize)]
pub struct QuestionEditRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<&'a str>,
    #[serde(flatten)]
    pub draft: &'a QuestionDraft,
}

#[derive(Debug, Serialize)]
pub struct DeleteRequest<'a> {
    pub id: &'a str,
}

/// Envelope of every HTTP response: `code` is the application code, 0 on
/// success.
#[derive(Debug, Deserialize)]
pub struct BaseResponse<T> {
    pub code: i64,
    pub data: Option<T>,
    pub message: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Page<T> {
    #[serde(default = "Vec::new")]
    pub records: Vec<T>,
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub current: u64,
    #[serde(default)]
    pub size: u64,
}

/// Backend ids are 64-bit and may be sent either as numbers or as strings.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(from = "RawId")]
pub struct LongId(pub String);

#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Number(i64),
    Text(String),
}

impl From<RawId> for LongId {
    fn from(raw: RawId) -> Self {
        match raw {
            RawId::Number(n) => LongId(n.to_string()),
            RawId::Text(s) => LongId(s),
        }
    }
}

impl std::fmt::Display for LongId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionRecord {
    pub id: LongId,
    #[serde(default)]
    pub question_id: Option<LongId>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub status: Option<i64>,
    #[serde(default)]
    pub judge_info: Option<JudgeInfo>,
    #[serde(default)]
    pub create_time: Option<serde_json::Value>,
}
