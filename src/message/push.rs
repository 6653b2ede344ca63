use crate::verdict::JudgeInfo;
use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JudgePush {
    pub status: Option<i64>,
    pub judge_info: Option<JudgeInfo>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DebugPush {
    pub output_list: Option<Vec<Option<String>>>,
    pub message: Option<String>,
}
