use serde::{Deserialize, Deserializer, Serialize};

/// A stored text together with its server-computed embedding.
///
/// Returned by the search endpoint in similarity order. The client never
/// creates records itself and never looks inside `embedding`; it is carried
/// along for display/debugging only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Server-assigned opaque identifier.
    #[serde(deserialize_with = "opaque_id")]
    pub id: String,

    /// Text as submitted by the user.
    pub text: String,

    /// Embedding vector; dimensionality is decided by the backend model.
    #[serde(default)]
    pub embedding: Vec<f32>,
}

/// Accepts ids sent either as JSON strings or as JSON numbers
/// (serial primary keys) and keeps them as text.
fn opaque_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Text(s) => s,
        RawId::Number(n) => n.to_string(),
    })
}
