use serde::{Deserialize, Serialize};

/// One row from the remote schedule feed.
///
/// The feed is a flat table: every field arrives as a string and may be
/// empty. No stable identifier is supplied; see [`crate::keys`] for how
/// one is derived.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteEvent {
    #[serde(default)]
    pub name: String,
    /// Link to the performer's own page.
    #[serde(default)]
    pub persona_link: String,
    /// Link to the festival's announcement post. Identity-bearing for the
    /// non-music categories.
    #[serde(default)]
    pub announcement_link: String,
    /// Link to a downloadable audio preview; empty when none exists.
    #[serde(default)]
    pub sample_link: String,
    #[serde(default)]
    pub performance_date: String,
    #[serde(default)]
    pub performance_time: String,
    #[serde(default)]
    pub stage: String,
    #[serde(default)]
    pub image_link: String,
}

/// A locally stored schedule entry: the remote fields plus state that is
/// only ever acquired locally (downloaded sample, favorite flag).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventRecord {
    /// Stable identity within the category; doubles as the storage key.
    pub normalized_key: String,
    #[serde(flatten)]
    pub event: RemoteEvent,
    /// Downloaded audio preview, base64 in the stored JSON. Cleared by
    /// reconciliation when the remote sample link changes.
    #[serde(default, skip_serializing_if = "Option::is_none", with = "sample_bytes")]
    pub sample: Option<Vec<u8>>,
    /// Local-only favorite flag; reconciliation never touches it.
    #[serde(default)]
    pub favorite: bool,
}

impl EventRecord {
    /// Wrap a remote row as a brand-new local record with default local
    /// state.
    pub fn new(normalized_key: String, event: RemoteEvent) -> Self {
        Self {
            normalized_key,
            event,
            sample: None,
            favorite: false,
        }
    }

    /// Whether this record references a sample that has not been
    /// downloaded yet.
    pub fn needs_sample(&self) -> bool {
        !self.event.sample_link.is_empty() && self.sample.is_none()
    }
}

/// Base64 (de)serialization for the optional sample payload. Raw byte
/// arrays would quadruple the stored size under serde_json's default
/// number-per-byte encoding.
mod sample_bytes {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine as _;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        bytes: &Option<Vec<u8>>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match bytes {
            Some(bytes) => serializer.serialize_some(&STANDARD.encode(bytes)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<Vec<u8>>, D::Error> {
        let encoded: Option<String> = Option::deserialize(deserializer)?;
        encoded
            .map(|s| STANDARD.decode(s.as_bytes()).map_err(serde::de::Error::custom))
            .transpose()
    }
}
