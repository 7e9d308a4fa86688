//! `localStorage`-backed key-value store.
//!
//! Outside `wasm32` there is no browser storage: reads miss and writes are dropped, so native
//! builds and tests can still wire the adapter in.

use platform_host::{KeyValueFuture, KeyValueStore};

#[derive(Debug, Clone, Copy, Default)]
/// Key-value store backed by `window.localStorage`.
pub struct LocalStorageKeyValueStore;

#[cfg(target_arch = "wasm32")]
fn local_storage() -> Result<web_sys::Storage, String> {
    web_sys::window()
        .ok_or_else(|| "no browser window".to_string())?
        .local_storage()
        .map_err(|err| format!("localStorage access denied: {err:?}"))?
        .ok_or_else(|| "localStorage unavailable".to_string())
}

#[cfg(target_arch = "wasm32")]
impl KeyValueStore for LocalStorageKeyValueStore {
    fn load_value<'a>(
        &'a self,
        key: &'a str,
    ) -> KeyValueFuture<'a, Result<Option<String>, String>> {
        Box::pin(async move {
            local_storage()?
                .get_item(key)
                .map_err(|err| format!("read {key} failed: {err:?}"))
        })
    }

    fn save_value<'a>(
        &'a self,
        key: &'a str,
        raw_json: &'a str,
    ) -> KeyValueFuture<'a, Result<(), String>> {
        Box::pin(async move {
            local_storage()?
                .set_item(key, raw_json)
                .map_err(|err| format!("write {key} failed (quota?): {err:?}"))
        })
    }

    fn delete_value<'a>(&'a self, key: &'a str) -> KeyValueFuture<'a, Result<(), String>> {
        Box::pin(async move {
            local_storage()?
                .remove_item(key)
                .map_err(|err| format!("delete {key} failed: {err:?}"))
        })
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl KeyValueStore for LocalStorageKeyValueStore {
    fn load_value<'a>(
        &'a self,
        _key: &'a str,
    ) -> KeyValueFuture<'a, Result<Option<String>, String>> {
        Box::pin(async { Ok(None) })
    }

    fn save_value<'a>(
        &'a self,
        _key: &'a str,
        _raw_json: &'a str,
    ) -> KeyValueFuture<'a, Result<(), String>> {
        Box::pin(async { Ok(()) })
    }

    fn delete_value<'a>(&'a self, _key: &'a str) -> KeyValueFuture<'a, Result<(), String>> {
        Box::pin(async { Ok(()) })
    }
}
