use crate::{errors::Error, message::request::LongId};
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const DEFAULT_TIME_LIMIT: u64 = 1000;
pub const DEFAULT_MEMORY_LIMIT: u64 = 256;
pub const DEFAULT_STACK_LIMIT: u64 = 128;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionCase {
    #[serde(default)]
    pub input: String,
    #[serde(default)]
    pub output: String,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all(serialize = "camelCase"))]
pub struct JudgeConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_limit: Option<u64>, // ms
    #[serde(skip_serializing_if = "Option::is_none")]
    pub memory_limit: Option<u64>, // MB
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stack_limit: Option<u64>, // MB
}

impl JudgeConfig {
    pub fn filled(self) -> JudgeConfig {
        JudgeConfig {
            time_limit: Some(self.time_limit.unwrap_or(DEFAULT_TIME_LIMIT)),
            memory_limit: Some(self.memory_limit.unwrap_or(DEFAULT_MEMORY_LIMIT)),
            stack_limit: Some(self.stack_limit.unwrap_or(DEFAULT_STACK_LIMIT)),
        }
    }
}

/// Sent as the backend's numeric code; read from files either as that code or
/// by name.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "i64", try_from = "RawDifficulty")]
pub enum Difficulty {
    Hard,
    #[default]
    Medium,
    Easy,
}

impl Difficulty {
    pub fn code(&self) -> i64 {
        match self {
            Difficulty::Hard => 0,
            Difficulty::Medium => 1,
            Difficulty::Easy => 2,
        }
    }

    pub fn from_code(code: i64) -> Option<Difficulty> {
        match code {
            0 => Some(Difficulty::Hard),
            1 => Some(Difficulty::Medium),
            2 => Some(Difficulty::Easy),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Difficulty::Hard => "hard",
            Difficulty::Medium => "medium",
            Difficulty::Easy => "easy",
        }
    }
}

impl From<Difficulty> for i64 {
    fn from(difficulty: Difficulty) -> i64 {
        difficulty.code()
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawDifficulty {
    Code(i64),
    Name(String),
}

impl TryFrom<RawDifficulty> for Difficulty {
    type Error = String;

    fn try_from(raw: RawDifficulty) -> Result<Self, Self::Error> {
        match raw {
            RawDifficulty::Code(code) => {
                Difficulty::from_code(code).ok_or_else(|| format!("unknown difficulty code {code}"))
            }
            RawDifficulty::Name(name) => name.parse(),
        }
    }
}

impl std::str::FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "hard" => Ok(Difficulty::Hard),
            "medium" => Ok(Difficulty::Medium),
            "easy" => Ok(Difficulty::Easy),
            other => Err(format!(
                "unknown difficulty {other:?}, expected easy, medium or hard"
            )),
        }
    }
}

pub fn difficulty_text(code: Option<i64>) -> &'static str {
    code.and_then(Difficulty::from_code)
        .map_or("-", |difficulty| difficulty.name())
}

/// Question as served by the question service. Tags, judge config and cases
/// come either as structured JSON or as JSON encoded into a string, so they
/// are kept raw and decoded by the `parse_*` helpers.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionView {
    pub id: LongId,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
    pub difficulty: Option<i64>,
    #[serde(default)]
    pub tags: Value,
    #[serde(default)]
    pub judge_config: Value,
    #[serde(default)]
    pub judge_case: Value,
    #[serde(default)]
    pub submit_num: u64,
    #[serde(default)]
    pub accepted_num: u64,
}

impl QuestionView {
    pub fn render(&self) -> String {
        let config = parse_judge_config(&self.judge_config)
            .unwrap_or_default()
            .filled();
        let tags = parse_tags(&self.tags);

        let mut lines = vec![format!("#{} {}", self.id, self.title)];
        lines.push(format!("difficulty: {}", difficulty_text(self.difficulty)));
        if !tags.is_empty() {
            lines.push(format!("tags: {}", tags.join(", ")));
        }
        lines.push(format!(
            "time limit: {} ms, memory limit: {} MB, stack limit: {} MB",
            config.time_limit.unwrap_or(DEFAULT_TIME_LIMIT),
            config.memory_limit.unwrap_or(DEFAULT_MEMORY_LIMIT),
            config.stack_limit.unwrap_or(DEFAULT_STACK_LIMIT),
        ));
        lines.push(format!(
            "accepted: {} / {} ({})",
            self.accepted_num,
            self.submit_num,
            acceptance_rate(self.accepted_num, self.submit_num)
        ));
        lines.push(String::new());
        lines.push(self.content.clone());

        for (index, case) in parse_judge_cases(&self.judge_case).iter().enumerate() {
            lines.push(format!(
                "\ncase {}\n  input:  {}\n  output: {}",
                index + 1,
                case.input,
                case.output
            ));
        }
        lines.join("\n") + "\n"
    }
}

/// One row of a question list page. `submit_status` is the caller's best
/// submission status, absent or -1 when they never submitted.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionRecord {
    pub id: LongId,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub tags: Value,
    pub difficulty: Option<i64>,
    #[serde(default)]
    pub submit_num: u64,
    #[serde(default)]
    pub accepted_num: u64,
    pub submit_status: Option<i64>,
    pub update_time: Option<Value>,
}

/// A question as written by its author, read from a TOML file:
///
/// ```toml
/// title = "A + B"
/// difficulty = "easy"
/// tags = ["math"]
/// content = "Print the sum of two integers."
///
/// [judge_config]
/// time_limit = 1000
///
/// [[judge_case]]
/// input = "1 2"
/// output = "3"
/// ```
#[derive(Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all(serialize = "camelCase"))]
pub struct QuestionDraft {
    pub title: String,
    #[serde(default)]
    pub difficulty: Difficulty,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub judge_config: JudgeConfig,
    #[serde(default)]
    pub judge_case: Vec<QuestionCase>,
}

impl QuestionDraft {
    pub fn from_toml(text: &str) -> Result<QuestionDraft, Error> {
        let mut draft: QuestionDraft = toml::from_str(text)
            .map_err(|e| Error::Precondition(format!("question file is invalid: {e}")))?;
        if draft.title.trim().is_empty() {
            return Err(Error::Precondition("question title is empty".to_string()));
        }
        draft.title = draft.title.trim().to_string();
        draft.tags = draft
            .tags
            .iter()
            .map(|tag| tag.trim())
            .filter(|tag| !tag.is_empty())
            .map(str::to_string)
            .collect();
        draft.judge_config = draft.judge_config.filled();
        Ok(draft)
    }
}

pub fn acceptance_rate(accepted: u64, submitted: u64) -> String {
    if submitted == 0 {
        return "0%".to_string();
    }
    format!("{:.1}%", accepted as f64 * 100.0 / submitted as f64)
}

// Values that hold JSON text are decoded once; anything else is used as is.
fn decoded(value: &Value) -> Option<Value> {
    match value {
        Value::String(text) => serde_json::from_str(text).ok(),
        Value::Null => None,
        other => Some(other.clone()),
    }
}

pub fn parse_tags(tags: &Value) -> Vec<String> {
    let from_array = |items: &[Value]| -> Vec<String> {
        items
            .iter()
            .filter_map(Value::as_str)
            .map(str::trim)
            .filter(|tag| !tag.is_empty())
            .map(str::to_string)
            .collect()
    };

    match tags {
        Value::Array(items) => from_array(items.as_slice()),
        Value::String(text) => match serde_json::from_str::<Value>(text) {
            Ok(Value::Array(items)) => from_array(items.as_slice()),
            Ok(_) => Vec::new(),
            Err(_) => text
                .split(',')
                .map(str::trim)
                .filter(|tag| !tag.is_empty())
                .map(str::to_string)
                .collect(),
        },
        _ => Vec::new(),
    }
}

pub fn parse_judge_config(config: &Value) -> Option<JudgeConfig> {
    let config = decoded(config)?;
    let object = config.as_object()?;
    let limit = |key: &str| object.get(key).and_then(Value::as_u64);
    Some(JudgeConfig {
        time_limit: limit("timeLimit"),
        memory_limit: limit("memoryLimit"),
        stack_limit: limit("stackLimit"),
    })
}

pub fn parse_judge_cases(cases: &Value) -> Vec<QuestionCase> {
    let Some(Value::Array(items)) = decoded(cases) else {
        return Vec::new();
    };
    let field = |item: &Value, key: &str| {
        item.get(key)
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string()
    };
    items
        .iter()
        .map(|item| QuestionCase {
            input: field(item, "input"),
            output: field(item, "output"),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn tags_from_every_encoding() {
        assert_eq!(parse_tags(&json!(["dp", " ", "greedy "])), vec!["dp", "greedy"]);
        assert_eq!(parse_tags(&json!("[\"math\"]")), vec!["math"]);
        assert_eq!(parse_tags(&json!("math, graphs,,")), vec!["math", "graphs"]);
        assert!(parse_tags(&Value::Null).is_empty());
    }

    #[test]
    fn judge_config_ignores_non_numbers() {
        let config = parse_judge_config(&json!("{\"timeLimit\": 2000, \"memoryLimit\": \"big\"}"));
        assert_eq!(
            config,
            Some(JudgeConfig {
                time_limit: Some(2000),
                memory_limit: None,
                stack_limit: None,
            })
        );
        assert_eq!(parse_judge_config(&json!("{broken")), None);
    }

    #[test]
    fn judge_cases_default_missing_fields() {
        let cases = parse_judge_cases(&json!([{"input": "1 2", "output": "3"}, {"input": "5"}]));
        assert_eq!(
            cases,
            vec![
                QuestionCase {
                    input: "1 2".to_string(),
                    output: "3".to_string()
                },
                QuestionCase {
                    input: "5".to_string(),
                    output: String::new()
                },
            ]
        );
        assert!(parse_judge_cases(&json!("not json")).is_empty());
    }

    #[test]
    fn draft_from_toml_fills_defaults() {
        let draft = QuestionDraft::from_toml(
            "title = \" A + B \"\ndifficulty = \"easy\"\ntags = [\"math\", \" \"]\n\n[judge_config]\ntime_limit = 2000\n\n[[judge_case]]\ninput = \"1 2\"\noutput = \"3\"\n",
        )
        .unwrap();
        assert_eq!(draft.title, "A + B");
        assert_eq!(draft.difficulty, Difficulty::Easy);
        assert_eq!(draft.tags, vec!["math"]);
        assert_eq!(
            draft.judge_config,
            JudgeConfig {
                time_limit: Some(2000),
                memory_limit: Some(DEFAULT_MEMORY_LIMIT),
                stack_limit: Some(DEFAULT_STACK_LIMIT),
            }
        );

        let body = serde_json::to_value(&draft).unwrap();
        assert_eq!(body["difficulty"], 2);
        assert_eq!(body["judgeConfig"]["timeLimit"], 2000);
        assert_eq!(body["judgeCase"], json!([{"input": "1 2", "output": "3"}]));
    }

    #[test]
    fn draft_needs_a_title() {
        assert!(matches!(
            QuestionDraft::from_toml("title = \"  \"\n"),
            Err(Error::Precondition(_))
        ));
        assert!(QuestionDraft::from_toml("difficulty = 1\n").is_err());
        assert!(QuestionDraft::from_toml("title = \"x\"\ndifficulty = 7\n").is_err());
        assert_eq!(
            QuestionDraft::from_toml("title = \"x\"\ndifficulty = 0\n")
                .unwrap()
                .difficulty,
            Difficulty::Hard
        );
    }

    #[test]
    fn difficulty_names() {
        assert_eq!("Easy".parse::<Difficulty>(), Ok(Difficulty::Easy));
        assert!("trivial".parse::<Difficulty>().is_err());
        assert_eq!(difficulty_text(Some(0)), "hard");
        assert_eq!(difficulty_text(Some(9)), "-");
        assert_eq!(difficulty_text(None), "-");
    }

    #[test]
    fn render_uses_default_limits() {
        let view: QuestionView = serde_json::from_value(json!({
            "id": "1900000000000000001",
            "title": "A + B",
            "content": "Add two numbers.",
            "tags": "[\"easy\"]",
            "difficulty": 1,
            "submitNum": 4,
            "acceptedNum": 1
        }))
        .unwrap();
        let rendered = view.render();
        assert!(rendered.starts_with("#1900000000000000001 A + B\n"));
        assert!(rendered.contains("difficulty: medium"));
        assert!(rendered.contains("tags: easy"));
        assert!(rendered.contains("time limit: 1000 ms, memory limit: 256 MB"));
        assert!(rendered.contains("accepted: 1 / 4 (25.0%)"));
    }
}
