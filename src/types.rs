use crate::constants::{LANGUAGE_ENGLISH, LANGUAGE_GERMAN};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;

/// Decoded response of `geteventfull`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EventPayload {
    #[serde(default)]
    pub data: Option<EventData>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EventData {
    /// `None` when the key is absent, null or not a list, which is distinct from
    /// an empty list. Entries that are not question objects are dropped.
    #[serde(default, deserialize_with = "lenient_optional_list")]
    pub questions: Option<Vec<Question>>,
    #[serde(default)]
    pub attendees: Option<Vec<Attendee>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Question {
    #[serde(default, deserialize_with = "lenient_string")]
    pub label: Option<String>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub options: Vec<QuestionOption>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct QuestionOption {
    #[serde(default, deserialize_with = "lenient_string")]
    pub label: Option<String>,
    /// Positional: an element that does not decode stays in place as `None`.
    #[serde(default, deserialize_with = "positional_list")]
    pub option_conditions: Vec<Option<OptionCondition>>,
}

impl QuestionOption {
    pub fn condition(&self, index: usize) -> Option<&OptionCondition> {
        self.option_conditions.get(index).and_then(Option::as_ref)
    }
}

/// Index 0 carries the option id, index 1 the language tag in `param`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OptionCondition {
    #[serde(default, deserialize_with = "loose_id")]
    pub option_id: Option<i64>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub param: Option<String>,
}

/// An attendee decodes from any JSON value so that one broken entry cannot
/// fail the whole payload; non-objects simply carry no answers.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(from = "Value")]
pub struct Attendee {
    pub answers: Vec<Answer>,
}

impl From<Value> for Attendee {
    fn from(value: Value) -> Self {
        let answers = match value.get("answers") {
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(|item| serde_json::from_value::<Answer>(item.clone()).ok())
                .collect(),
            _ => Vec::new(),
        };
        Attendee { answers }
    }
}

/// One questionnaire answer. Free-text answers carry `question_id` at the top
/// level and a string `value`; choice answers nest both ids inside `value`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Answer {
    #[serde(default, deserialize_with = "loose_id")]
    pub question_id: Option<i64>,
    #[serde(default)]
    pub value: AnswerValue,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum AnswerValue {
    Text(String),
    Choice(ChoiceValue),
    Other(Value),
}

impl Default for AnswerValue {
    fn default() -> Self {
        AnswerValue::Other(Value::Null)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChoiceValue {
    #[serde(default, deserialize_with = "loose_id")]
    pub question_id: Option<i64>,
    #[serde(default, deserialize_with = "loose_id")]
    pub option_id: Option<i64>,
}

impl Answer {
    /// `(question_id, option_id)` when this is a choice answer.
    pub fn choice(&self) -> Option<(i64, Option<i64>)> {
        match &self.value {
            AnswerValue::Choice(choice) => choice.question_id.map(|q| (q, choice.option_id)),
            _ => None,
        }
    }

    /// Text of a free-text answer to `question_id`.
    pub fn text_for(&self, question_id: i64) -> Option<&str> {
        match (&self.value, self.question_id) {
            (AnswerValue::Text(text), Some(id)) if id == question_id => Some(text.as_str()),
            _ => None,
        }
    }
}

/// One of the three parallel course offerings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Track {
    One,
    Two,
    Three,
}

impl Track {
    pub const ALL: [Track; 3] = [Track::One, Track::Two, Track::Three];

    /// Zero-based position, used to index per-track arrays.
    pub fn index(self) -> usize {
        match self {
            Track::One => 0,
            Track::Two => 1,
            Track::Three => 2,
        }
    }

    pub fn number(self) -> u8 {
        self.index() as u8 + 1
    }

    /// Label prefix of this track's group options, e.g. "Gruppe II-3".
    pub fn group_prefix(self) -> &'static str {
        match self {
            Track::One => "Gruppe I",
            Track::Two => "Gruppe II",
            Track::Three => "Gruppe III",
        }
    }

    /// Characters of the option label kept as group name ("Gruppe I-12" is 11 wide).
    pub fn group_name_width(self) -> usize {
        match self {
            Track::One => 11,
            Track::Two => 12,
            Track::Three => 13,
        }
    }
}

impl fmt::Display for Track {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "track{}", self.number())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    German,
    English,
}

impl Language {
    /// Normalizes the `param` tag of an option condition.
    pub fn parse(tag: &str) -> Option<Self> {
        match tag.trim().to_lowercase().as_str() {
            LANGUAGE_GERMAN | "german" | "de" => Some(Language::German),
            LANGUAGE_ENGLISH | "english" | "en" => Some(Language::English),
            _ => None,
        }
    }
}

/// Accepts a JSON list; anything else (null, object, scalar) reads as empty.
/// Elements that do not decode are dropped.
fn lenient_list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: serde::de::DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| serde_json::from_value(item).ok())
            .collect(),
        _ => Vec::new(),
    })
}

fn lenient_optional_list<'de, D, T>(deserializer: D) -> Result<Option<Vec<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: serde::de::DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Array(items) => Some(
            items
                .into_iter()
                .filter_map(|item| serde_json::from_value(item).ok())
                .collect(),
        ),
        _ => None,
    })
}

/// Like [`lenient_list`] but keeps every slot, so indices stay meaningful.
fn positional_list<'de, D, T>(deserializer: D) -> Result<Vec<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: serde::de::DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Array(items) => items
            .into_iter()
            .map(|item| serde_json::from_value(item).ok())
            .collect(),
        _ => Vec::new(),
    })
}

fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

/// Ids arrive as numbers or numeric strings depending on the endpoint version.
fn loose_id<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    })
}
