//! Registry persistence: per-app window geometry in the flat key-value store.

use std::collections::BTreeMap;

use desktop_app_contract::{AppId, WindowGeometry};
use leptos::logging;
use platform_host::{load_json_with, save_json_with, KeyValueStore};

use crate::{
    model::{InstanceId, RegistryEffect},
    registry::InstanceRegistry,
};

pub const WINDOW_GEOMETRY_KEY: &str = "ryos.window_geometry.v1";

/// Loads persisted geometry keyed by app id.
///
/// Missing or unreadable state yields an empty map so the registry falls back to catalog defaults.
pub async fn load_window_geometry<S: KeyValueStore + ?Sized>(
    store: &S,
) -> BTreeMap<AppId, WindowGeometry> {
    match load_json_with::<_, BTreeMap<AppId, WindowGeometry>>(store, WINDOW_GEOMETRY_KEY).await {
        Ok(geometry) => geometry.unwrap_or_default(),
        Err(err) => {
            logging::warn!("window geometry load failed: {err}");
            BTreeMap::new()
        }
    }
}

pub async fn persist_window_geometry<S: KeyValueStore + ?Sized>(
    store: &S,
    geometry: &BTreeMap<AppId, WindowGeometry>,
) -> Result<(), String> {
    save_json_with(store, WINDOW_GEOMETRY_KEY, geometry).await
}

/// Drains the registry's queued effects, persisting geometry when it changed.
///
/// Returns the instances whose input should receive keyboard focus, in order.
pub async fn execute_registry_effects<S: KeyValueStore + ?Sized>(
    store: &S,
    registry: &mut InstanceRegistry,
) -> Vec<InstanceId> {
    let mut focus_targets = Vec::new();
    let mut geometry_dirty = false;
    for effect in registry.take_effects() {
        match effect {
            RegistryEffect::PersistGeometry { .. } => geometry_dirty = true,
            RegistryEffect::FocusInstanceInput(instance_id) => focus_targets.push(instance_id),
        }
    }
    if geometry_dirty {
        if let Err(err) = persist_window_geometry(store, registry.saved_geometry()).await {
            logging::warn!("persist window geometry failed: {err}");
        }
    }
    focus_targets
}

#[cfg(test)]
mod tests {
    use desktop_app_contract::{WindowPosition, WindowSize};
    use futures::executor::block_on;
    use platform_host::MemoryKeyValueStore;
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn geometry_survives_a_registry_restart() {
        let store = MemoryKeyValueStore::default();
        let mut registry = InstanceRegistry::default();
        let id = registry.create_instance(AppId::Paint, None, None);
        registry.update_geometry(
            id,
            WindowPosition { x: 300, y: 90 },
            WindowSize {
                width: 900,
                height: 700,
            },
        );

        let focused = block_on(execute_registry_effects(&store, &mut registry));
        assert_eq!(focused, vec![id]);
        assert!(store.raw(WINDOW_GEOMETRY_KEY).is_some());

        let restored = block_on(load_window_geometry(&store));
        let mut registry = InstanceRegistry::default().with_saved_geometry(restored);
        let id = registry.create_instance(AppId::Paint, None, None);
        let instance = registry.instance(id).expect("instance");
        assert_eq!(instance.position, WindowPosition { x: 300, y: 90 });
        assert_eq!(instance.size.width, 900);
    }

    #[test]
    fn stored_json_is_keyed_by_canonical_app_id() {
        let store = MemoryKeyValueStore::default();
        let geometry = BTreeMap::from([(
            AppId::InternetExplorer,
            WindowGeometry {
                position: WindowPosition { x: 1, y: 2 },
                size: WindowSize {
                    width: 3,
                    height: 4,
                },
            },
        )]);
        block_on(persist_window_geometry(&store, &geometry)).expect("persist");
        let raw: serde_json::Value =
            serde_json::from_str(&store.raw(WINDOW_GEOMETRY_KEY).expect("raw")).expect("json");
        assert_eq!(raw["internet-explorer"]["size"]["height"], 4);
    }

    #[test]
    fn corrupt_geometry_falls_back_to_empty() {
        let store = MemoryKeyValueStore::default();
        block_on(store.save_value(WINDOW_GEOMETRY_KEY, "[1,2")).expect("save raw");
        assert!(block_on(load_window_geometry(&store)).is_empty());
    }
}
