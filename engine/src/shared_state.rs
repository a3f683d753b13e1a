//
// Copyright 2017-2026 Hans W. Uhlig. All Rights Reserved.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//

//! Typed, keyed state shared across plugins within one session — the
//! mechanism by which, e.g., the `gmcp` plugin reads values the `msdp`
//! plugin wrote (`spec.md` §4.4's `shared_state_set`/`get`/`try_get`).

use dashmap::DashMap;
use std::any::Any;
use std::sync::Arc;

type BoxedValue = Arc<dyn Any + Send + Sync>;

/// A concurrent, type-erased key/value store, one per session.
#[derive(Default)]
pub struct SharedState {
    entries: DashMap<String, BoxedValue>,
}

impl SharedState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `value` under `key`, replacing anything previously there
    /// (even of a different type).
    pub fn set<T: Send + Sync + 'static>(&self, key: impl Into<String>, value: T) {
        self.entries.insert(key.into(), Arc::new(value));
    }

    /// Fetches and clones the value under `key`, if present and of type `T`.
    pub fn get<T: Clone + Send + Sync + 'static>(&self, key: &str) -> Option<T> {
        self.entries.get(key).and_then(|v| v.downcast_ref::<T>().cloned())
    }

    /// Like [`Self::get`], but never panics on a type mismatch — returns
    /// `None` instead of the downcast failing silently elsewhere.
    pub fn try_get<T: Clone + Send + Sync + 'static>(&self, key: &str) -> Option<T> {
        self.get(key)
    }

    pub fn remove(&self, key: &str) {
        self.entries.remove(key);
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_a_typed_value() {
        let state = SharedState::new();
        state.set("msdp.reportable", vec!["HP".to_string(), "MP".to_string()]);
        let back: Vec<String> = state.get("msdp.reportable").unwrap();
        assert_eq!(back, vec!["HP", "MP"]);
    }

    #[test]
    fn mismatched_type_returns_none() {
        let state = SharedState::new();
        state.set("x", 42u32);
        assert_eq!(state.try_get::<String>("x"), None);
    }

    #[test]
    fn missing_key_returns_none() {
        let state = SharedState::new();
        assert_eq!(state.try_get::<u32>("nope"), None);
    }
}
