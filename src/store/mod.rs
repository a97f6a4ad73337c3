//! Persistence of console state

pub mod kv;
pub mod persisted;

pub use kv::{FileStore, KeyValueStore, MemoryStore, StoreError, StoreResult};
pub use persisted::{
    load_last_selected, load_state, save_last_selected, save_state, PersistedState,
    LAST_SELECTED_KEY, STATE_KEY,
};
