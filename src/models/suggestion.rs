use serde::{ Deserialize, Deserializer, Serialize, Serializer };
use serde_json::Value as JsonValue;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ResourceKind {
    Course,
    Youtube,
    Book,
    Article,
    Other(String),
}

impl ResourceKind {
    pub fn as_str(&self) -> &str {
        match self {
            ResourceKind::Course => "course",
            ResourceKind::Youtube => "youtube",
            ResourceKind::Book => "book",
            ResourceKind::Article => "article",
            ResourceKind::Other(s) => s.as_str(),
        }
    }
}

impl Default for ResourceKind {
    fn default() -> Self {
        ResourceKind::Other(String::new())
    }
}

impl From<&str> for ResourceKind {
    fn from(s: &str) -> Self {
        match s {
            "course" => ResourceKind::Course,
            "youtube" => ResourceKind::Youtube,
            "book" => ResourceKind::Book,
            "article" => ResourceKind::Article,
            _ => ResourceKind::Other(s.to_string()),
        }
    }
}

impl Serialize for ResourceKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ResourceKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match JsonValue::deserialize(deserializer)? {
            JsonValue::String(s) => ResourceKind::from(s.as_str()),
            JsonValue::Null => ResourceKind::default(),
            other => ResourceKind::Other(other.to_string()),
        })
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LearningResource {
    #[serde(default, deserialize_with = "lenient_text")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub url: Option<String>,
    #[serde(rename = "type", default)]
    pub kind: ResourceKind,
}

impl LearningResource {
    pub fn new(title: &str, url: &str, kind: ResourceKind) -> Self {
        Self {
            title: Some(title.to_string()),
            url: Some(url.to_string()),
            kind,
        }
    }
}

/// Semi-structured answer of `/api/ai/generate`. Models are free to omit any
/// field or to answer with numbers where text is expected, so every field is
/// optional and scalar values are read leniently.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SuggestionPayload {
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub average_salary: Option<String>,
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub job_openings: Option<String>,
    #[serde(default, deserialize_with = "lenient_list", skip_serializing_if = "Vec::is_empty")]
    pub learning_resources: Vec<LearningResource>,
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub youtube_video_recommendation: Option<String>,
    #[serde(default, deserialize_with = "lenient_bool")]
    pub cached: bool,
    #[serde(default, deserialize_with = "lenient_millis", skip_serializing_if = "Option::is_none")]
    pub generation_time_ms: Option<u64>,
}

impl SuggestionPayload {
    /// Canned suggestion shown by the dashboard widget when the service fails.
    pub fn fallback() -> Self {
        Self {
            title: Some("Frontend Developer".to_string()),
            explanation: Some(
                "Focus on building interactive user interfaces using React and modern tools.".to_string()
            ),
            average_salary: Some("$100k".to_string()),
            job_openings: None,
            learning_resources: vec![
                LearningResource::new(
                    "React Official Tutorial",
                    "https://react.dev/learn",
                    ResourceKind::Article
                ),
                LearningResource::new(
                    "Free React Course",
                    "https://example.com/course",
                    ResourceKind::Course
                ),
                LearningResource::new("Intro to CSS", "https://example.com/css", ResourceKind::Article)
            ],
            youtube_video_recommendation: Some("https://youtu.be/dummy".to_string()),
            cached: false,
            generation_time_ms: None,
        }
    }
}

fn scalar_to_text(value: JsonValue) -> Option<String> {
    match value {
        JsonValue::String(s) => Some(s),
        JsonValue::Number(n) => Some(n.to_string()),
        JsonValue::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
    where D: Deserializer<'de>
{
    Ok(scalar_to_text(JsonValue::deserialize(deserializer)?))
}

fn lenient_bool<'de, D>(deserializer: D) -> Result<bool, D::Error> where D: Deserializer<'de> {
    Ok(matches!(JsonValue::deserialize(deserializer)?, JsonValue::Bool(true)))
}

fn lenient_millis<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
    where D: Deserializer<'de>
{
    let value = JsonValue::deserialize(deserializer)?;
    Ok(match value {
        JsonValue::Number(n) => n.as_u64().or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f.round() as u64)),
        _ => None,
    })
}

fn lenient_list<'de, D>(deserializer: D) -> Result<Vec<LearningResource>, D::Error>
    where D: Deserializer<'de>
{
    let value = JsonValue::deserialize(deserializer)?;
    let JsonValue::Array(items) = value else {
        return Ok(Vec::new());
    };
    Ok(
        items
            .into_iter()
            .filter_map(|item| serde_json::from_value::<LearningResource>(item).ok())
            .collect()
    )
}
