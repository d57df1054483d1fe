use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Fields the client does not interpret, kept so a parsed body re-serialises unchanged.
pub type Extra = Map<String, Value>;

/// One ranked candidate identity returned alongside a recognition attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopMatch {
    pub name: String,
    /// Similarity score in [0, 1].
    pub score: f64,
    #[serde(flatten)]
    pub extra: Extra,
}

/// Axis-aligned face box decoded from the backend's `[x, y, w, h]` array.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FaceBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Body of `POST /recognize`.
///
/// Holds the body exactly as received next to a typed view of the fields the
/// client displays. Serialising writes the received body back out, so keys
/// the backend omitted are never invented. Failure bodies usually carry only
/// `success` and `error`; missing or `null` fields read as their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Value", into = "Value")]
pub struct RecognitionResult {
    fields: RecognitionFields,
    body: Value,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
struct RecognitionFields {
    #[serde(default, deserialize_with = "null_as_default")]
    success: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    recognized: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    person_name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    confidence: f64,
    #[serde(default)]
    description: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    face_bbox: Vec<f64>,
    #[serde(default, deserialize_with = "null_as_default")]
    top_matches: Vec<TopMatch>,
    #[serde(default, deserialize_with = "null_as_default")]
    processing_time: f64,
    #[serde(default)]
    error: Option<String>,
}

impl TryFrom<Value> for RecognitionResult {
    type Error = serde_json::Error;

    fn try_from(body: Value) -> Result<Self, Self::Error> {
        if !body.is_object() {
            return Err(serde::de::Error::custom("recognition body is not a JSON object"));
        }
        let fields = RecognitionFields::deserialize(&body)?;
        Ok(Self { fields, body })
    }
}

impl From<RecognitionResult> for Value {
    fn from(result: RecognitionResult) -> Self {
        result.body
    }
}

impl RecognitionResult {
    pub fn success(&self) -> bool {
        self.fields.success
    }

    pub fn recognized(&self) -> bool {
        self.fields.recognized
    }

    /// Matched name; empty when nobody was recognized.
    pub fn person_name(&self) -> &str {
        &self.fields.person_name
    }

    /// Confidence of the best match in [0, 1].
    pub fn confidence(&self) -> f64 {
        self.fields.confidence
    }

    pub fn description(&self) -> Option<&str> {
        self.fields.description.as_deref()
    }

    pub fn top_matches(&self) -> &[TopMatch] {
        &self.fields.top_matches
    }

    /// Backend processing time in seconds.
    pub fn processing_time(&self) -> f64 {
        self.fields.processing_time
    }

    pub fn error(&self) -> Option<&str> {
        self.fields.error.as_deref()
    }

    /// The body as the backend sent it.
    pub fn body(&self) -> &Value {
        &self.body
    }

    /// Decode `face_bbox`. Returns `None` unless the backend sent exactly four numbers.
    pub fn face_box(&self) -> Option<FaceBox> {
        match self.fields.face_bbox.as_slice() {
            &[x, y, width, height] => Some(FaceBox {
                x,
                y,
                width,
                height,
            }),
            _ => None,
        }
    }
}

/// Read an explicit `null` as the field's default.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// State of the backend index rebuild job. Returned by
/// `GET /rebuild_status` and embedded in acknowledgements of mutating calls.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RebuildStatus {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_rebuilding: Option<bool>,
    /// Progress in percent, when the backend reports it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub progress: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(flatten)]
    pub extra: Extra,
}

impl RebuildStatus {
    pub fn is_running(&self) -> bool {
        self.is_rebuilding.unwrap_or(false)
    }
}

/// Acknowledgement returned by the mutating endpoints.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub success: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Rebuild status, present after `rebuild_db` or an auto-rebuild.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<RebuildStatus>,
    #[serde(flatten)]
    pub extra: Extra,
}

impl ApiResponse {
    /// An ack is successful unless the backend explicitly says otherwise.
    pub fn is_success(&self) -> bool {
        self.success.unwrap_or(self.error.is_none())
    }
}

/// Body of `GET /stats`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatsResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_identities: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_images: Option<u64>,
    #[serde(flatten)]
    pub extra: Extra,
}

/// Summary of one enrolled person.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdentitySummary {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_count: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub info: Option<String>,
    #[serde(flatten)]
    pub extra: Extra,
}

/// An identity listed by `GET /identities`: either a bare name or a summary object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IdentityEntry {
    Name(String),
    Summary(IdentitySummary),
}

impl IdentityEntry {
    pub fn name(&self) -> &str {
        match self {
            IdentityEntry::Name(name) => name,
            IdentityEntry::Summary(summary) => &summary.name,
        }
    }
}

/// Body of `GET /identities`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IdentitiesResponse {
    #[serde(default, deserialize_with = "null_as_default")]
    pub identities: Vec<IdentityEntry>,
    #[serde(flatten)]
    pub extra: Extra,
}

/// Body of `GET /person/{name}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PersonDetails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub info: Option<String>,
    /// Stored image file names, addressable under `/images/{person}/{filename}`.
    #[serde(default, deserialize_with = "null_as_default")]
    pub images: Vec<String>,
    #[serde(flatten)]
    pub extra: Extra,
}

/// Body of `GET /latest_log`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LogResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(flatten)]
    pub extra: Extra,
}
