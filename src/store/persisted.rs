//! Persisted console state
//!
//! The live camera source never survives a session: it is dropped when the
//! state is written and again when it is read back, so a blob written by an
//! older build still rehydrates without it.

use super::kv::{KeyValueStore, StoreResult};
use crate::library::{ActiveSource, Comment, Library, PlaylistEntry, Rating};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;

/// Key holding the id of the last selected library item
pub const LAST_SELECTED_KEY: &str = "lastVideoId";

/// Key holding the state blob
pub const STATE_KEY: &str = "video_state";

const STATE_VERSION: u32 = 0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedState {
    pub videos: Library,
    #[serde(default)]
    pub playlist: Vec<PlaylistEntry>,
    #[serde(
        default,
        serialize_with = "serialize_non_live",
        deserialize_with = "deserialize_non_live"
    )]
    pub current_video: Option<ActiveSource>,
    #[serde(default = "default_volume")]
    pub volume: f64,
    #[serde(default)]
    pub comments: BTreeMap<u32, Vec<Comment>>,
    #[serde(default)]
    pub ratings: BTreeMap<u32, Vec<Rating>>,
}

#[derive(Serialize, Deserialize)]
struct Envelope {
    state: PersistedState,
    #[serde(default)]
    version: u32,
}

fn default_volume() -> f64 {
    1.0
}

fn serialize_non_live<S: Serializer>(
    source: &Option<ActiveSource>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    source
        .as_ref()
        .filter(|source| !source.is_live())
        .serialize(serializer)
}

fn deserialize_non_live<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<ActiveSource>, D::Error> {
    // Unrecognised shapes are treated as "nothing selected" rather than
    // failing the whole blob
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value
        .and_then(|value| serde_json::from_value::<ActiveSource>(value).ok())
        .filter(|source| !source.is_live()))
}

/// Read the state blob, if one was written
pub fn load_state(store: &dyn KeyValueStore) -> StoreResult<Option<PersistedState>> {
    let Some(raw) = store.get(STATE_KEY)? else {
        return Ok(None);
    };
    let envelope: Envelope = serde_json::from_str(&raw)?;
    if envelope.version != STATE_VERSION {
        tracing::warn!(
            "Persisted state version {} differs from {}, loading anyway",
            envelope.version,
            STATE_VERSION
        );
    }
    Ok(Some(envelope.state))
}

pub fn save_state(store: &dyn KeyValueStore, state: &PersistedState) -> StoreResult<()> {
    let envelope = Envelope {
        state: state.clone(),
        version: STATE_VERSION,
    };
    store.set(STATE_KEY, &serde_json::to_string(&envelope)?)
}

pub fn load_last_selected(store: &dyn KeyValueStore) -> StoreResult<Option<u32>> {
    let Some(raw) = store.get(LAST_SELECTED_KEY)? else {
        return Ok(None);
    };
    Ok(raw.trim().trim_matches('"').parse().ok())
}

pub fn save_last_selected(store: &dyn KeyValueStore, id: u32) -> StoreResult<()> {
    store.set(LAST_SELECTED_KEY, &id.to_string())
}
