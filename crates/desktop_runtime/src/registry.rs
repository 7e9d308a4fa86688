//! Window instance registry: open instances, stacking order and foreground focus.
//!
//! Every operation is total. Unknown or already-closed instance ids log a warning and leave the
//! registry untouched; callers in the UI event loop have nothing useful to do with an error.

use std::collections::BTreeMap;

use desktop_app_contract::{
    app_descriptor, AppControl, AppId, WindowGeometry, WindowPosition, WindowSize,
};
use leptos::logging;
use platform_host::next_monotonic_timestamp_ms;
use serde_json::Value;

use crate::model::{AppInstance, InstanceId, RegistryConfig, RegistryEffect};

/// Registry of open application instances.
///
/// The stacking order lists open instance ids from bottom to top; its tail is the foreground
/// instance whenever one is focused.
#[derive(Debug, Clone)]
pub struct InstanceRegistry {
    config: RegistryConfig,
    instances: BTreeMap<InstanceId, AppInstance>,
    stacking_order: Vec<InstanceId>,
    next_instance_id: u64,
    saved_geometry: BTreeMap<AppId, WindowGeometry>,
    effects: Vec<RegistryEffect>,
}

impl Default for InstanceRegistry {
    fn default() -> Self {
        Self::new(RegistryConfig::default())
    }
}

impl InstanceRegistry {
    pub fn new(config: RegistryConfig) -> Self {
        Self {
            config,
            instances: BTreeMap::new(),
            stacking_order: Vec::new(),
            next_instance_id: 1,
            saved_geometry: BTreeMap::new(),
            effects: Vec::new(),
        }
    }

    /// Seeds per-app geometry loaded from persistence.
    pub fn with_saved_geometry(mut self, geometry: BTreeMap<AppId, WindowGeometry>) -> Self {
        self.saved_geometry = geometry;
        self
    }

    /// Opens a new instance of `app_id` and brings it to the foreground.
    pub fn create_instance(
        &mut self,
        app_id: AppId,
        initial_data: Option<Value>,
        title: Option<String>,
    ) -> InstanceId {
        let descriptor = app_descriptor(app_id);
        let cycle = self.config.stagger_cycle.max(1);
        let offset = (self.open_count() % cycle) as i32 * self.config.stagger_step;
        let (position, size) = match self.saved_geometry.get(&app_id) {
            Some(saved) => (saved.position.offset(offset), saved.size),
            None => (
                self.config.base_position.offset(offset),
                descriptor.default_size,
            ),
        };

        let instance_id = InstanceId(self.next_instance_id);
        self.next_instance_id = self.next_instance_id.saturating_add(1);
        self.instances.insert(
            instance_id,
            AppInstance {
                instance_id,
                app_id,
                is_open: true,
                is_foreground: false,
                position,
                size: size.clamped_min(descriptor.min_size),
                title,
                initial_data,
                created_at: next_monotonic_timestamp_ms(),
            },
        );
        self.bring_to_front(instance_id);
        instance_id
    }

    /// Closes `instance_id` and hands the foreground to the next candidate.
    ///
    /// Focus then moves to the most recently stacked open instance of the same app, else the most
    /// recently stacked instance of any app. Returns whether an
    /// instance was closed.
    pub fn close_instance(&mut self, instance_id: InstanceId) -> bool {
        let Some(instance) = self.instances.get_mut(&instance_id) else {
            logging::warn!("close ignored: unknown instance {instance_id}");
            return false;
        };
        if !instance.is_open {
            return false;
        }
        instance.is_open = false;
        instance.is_foreground = false;
        let app_id = instance.app_id;

        self.instances.remove(&instance_id);
        self.stacking_order.retain(|id| *id != instance_id);

        let next = self
            .stacking_order
            .iter()
            .rev()
            .copied()
            .find(|id| {
                self.instances
                    .get(id)
                    .is_some_and(|candidate| candidate.is_open && candidate.app_id == app_id)
            })
            .or_else(|| self.stacking_order.last().copied());
        if let Some(next) = next {
            self.bring_to_front(next);
        }
        true
    }

    /// Focuses `instance_id`, or clears every foreground flag when `None`.
    pub fn focus(&mut self, instance_id: Option<InstanceId>) {
        match instance_id {
            None => {
                for instance in self.instances.values_mut() {
                    instance.is_foreground = false;
                }
            }
            Some(id) if self.is_open(id) => self.bring_to_front(id),
            Some(id) => logging::warn!("focus ignored: unknown instance {id}"),
        }
    }

    /// Focuses the instance stacked above `from`, wrapping to the bottom of the stack.
    pub fn focus_next(&mut self, from: InstanceId) {
        self.focus_relative(from, 1);
    }

    /// Focuses the instance stacked below `from`, wrapping to the top of the stack.
    pub fn focus_previous(&mut self, from: InstanceId) {
        let len = self.stacking_order.len();
        self.focus_relative(from, len.saturating_sub(1));
    }

    fn focus_relative(&mut self, from: InstanceId, step: usize) {
        let len = self.stacking_order.len();
        if len < 2 {
            return;
        }
        let Some(index) = self.stacking_order.iter().position(|id| *id == from) else {
            logging::warn!("navigation ignored: unknown instance {from}");
            return;
        };
        let target = self.stacking_order[(index + step) % len];
        self.bring_to_front(target);
    }

    /// Records the latest geometry for `instance_id` without touching the stacking order.
    pub fn update_geometry(
        &mut self,
        instance_id: InstanceId,
        position: WindowPosition,
        size: WindowSize,
    ) {
        let Some(instance) = self.open_instance_mut(instance_id) else {
            logging::warn!("geometry update ignored: unknown instance {instance_id}");
            return;
        };
        instance.position = position;
        instance.size = size.clamped_min(app_descriptor(instance.app_id).min_size);
        let app_id = instance.app_id;
        let geometry = instance.geometry();
        self.saved_geometry.insert(app_id, geometry);
        self.effects
            .push(RegistryEffect::PersistGeometry { app_id, geometry });
    }

    /// Drops the launch payload once the app has consumed it.
    pub fn clear_initial_data(&mut self, instance_id: InstanceId) {
        match self.open_instance_mut(instance_id) {
            Some(instance) => instance.initial_data = None,
            None => logging::warn!("clear ignored: unknown instance {instance_id}"),
        }
    }

    pub fn set_title(&mut self, instance_id: InstanceId, title: Option<String>) {
        match self.open_instance_mut(instance_id) {
            Some(instance) => instance.title = title,
            None => logging::warn!("title update ignored: unknown instance {instance_id}"),
        }
    }

    /// Launches `app_id`, reusing the open instance of single-instance kinds.
    ///
    /// Multi-instance kinds (per the catalog, or when `allow_multiple` is set) always get a new
    /// instance. Reused instances take `initial_data` when one is supplied.
    pub fn launch_or_focus(
        &mut self,
        app_id: AppId,
        initial_data: Option<Value>,
        title: Option<String>,
        allow_multiple: bool,
    ) -> InstanceId {
        if allow_multiple || app_descriptor(app_id).multi_instance {
            return self.create_instance(app_id, initial_data, title);
        }

        let existing = self.stacking_order.iter().rev().copied().find(|id| {
            self.instances
                .get(id)
                .is_some_and(|instance| instance.is_open && instance.app_id == app_id)
        });
        let Some(existing) = existing else {
            return self.create_instance(app_id, initial_data, title);
        };

        if let (Some(data), Some(instance)) = (initial_data, self.instances.get_mut(&existing)) {
            instance.initial_data = Some(data);
        }
        self.bring_to_front(existing);
        existing
    }

    /// Closes every open instance of `app_id`; returns how many were closed.
    pub fn close_app(&mut self, app_id: AppId) -> usize {
        let ids = self
            .query_by_app(app_id)
            .into_iter()
            .map(|instance| instance.instance_id)
            .collect::<Vec<_>>();
        ids.into_iter()
            .filter(|id| self.close_instance(*id))
            .count()
    }

    /// Repairs the stacking order against the set of open instances.
    ///
    /// Drops ids that no longer refer to an open instance, appends open instances missing from
    /// the order (oldest first) and enforces the single-foreground rule. Returns whether anything
    /// changed.
    pub fn reconcile_stacking_order(&mut self) -> bool {
        let before = self.stacking_order.clone();
        let mut seen = Vec::with_capacity(self.stacking_order.len());
        for id in before.iter().copied() {
            if self.is_open(id) && !seen.contains(&id) {
                seen.push(id);
            }
        }
        let mut missing = self
            .instances
            .values()
            .filter(|instance| instance.is_open && !seen.contains(&instance.instance_id))
            .map(|instance| (instance.created_at, instance.instance_id))
            .collect::<Vec<_>>();
        missing.sort();
        seen.extend(missing.into_iter().map(|(_, id)| id));
        self.stacking_order = seen;
        self.instances.retain(|_, instance| instance.is_open);

        let mut changed = self.stacking_order != before;
        let foreground = self
            .instances
            .values()
            .filter(|instance| instance.is_foreground)
            .map(|instance| instance.instance_id)
            .collect::<Vec<_>>();
        if foreground.len() > 1 {
            let keep = self
                .stacking_order
                .iter()
                .rev()
                .copied()
                .find(|id| foreground.contains(id));
            for instance in self.instances.values_mut() {
                instance.is_foreground = Some(instance.instance_id) == keep;
            }
            changed = true;
        }
        if changed {
            logging::warn!("stacking order repaired: {before:?} -> {:?}", self.stacking_order);
        }
        changed
    }

    /// Open instances of `app_id`, oldest first.
    pub fn query_by_app(&self, app_id: AppId) -> Vec<&AppInstance> {
        self.open_instances()
            .into_iter()
            .filter(|instance| instance.app_id == app_id)
            .collect()
    }

    pub fn foreground(&self) -> Option<&AppInstance> {
        self.instances
            .values()
            .find(|instance| instance.is_open && instance.is_foreground)
    }

    pub fn instance(&self, instance_id: InstanceId) -> Option<&AppInstance> {
        self.instances.get(&instance_id)
    }

    /// Open instances in display order (creation time, independent of focus).
    pub fn open_instances(&self) -> Vec<&AppInstance> {
        let mut open = self
            .instances
            .values()
            .filter(|instance| instance.is_open)
            .collect::<Vec<_>>();
        open.sort_by_key(|instance| (instance.created_at, instance.instance_id));
        open
    }

    pub fn stacking_order(&self) -> &[InstanceId] {
        &self.stacking_order
    }

    pub fn saved_geometry(&self) -> &BTreeMap<AppId, WindowGeometry> {
        &self.saved_geometry
    }

    /// Drains queued side-effect intents.
    pub fn take_effects(&mut self) -> Vec<RegistryEffect> {
        std::mem::take(&mut self.effects)
    }

    fn open_count(&self) -> usize {
        self.instances.values().filter(|i| i.is_open).count()
    }

    fn is_open(&self, instance_id: InstanceId) -> bool {
        self.instances
            .get(&instance_id)
            .is_some_and(|instance| instance.is_open)
    }

    fn open_instance_mut(&mut self, instance_id: InstanceId) -> Option<&mut AppInstance> {
        self.instances
            .get_mut(&instance_id)
            .filter(|instance| instance.is_open)
    }

    fn bring_to_front(&mut self, instance_id: InstanceId) {
        let already_top = self.stacking_order.last() == Some(&instance_id)
            && self
                .instances
                .get(&instance_id)
                .is_some_and(|instance| instance.is_foreground);
        if already_top {
            return;
        }
        for instance in self.instances.values_mut() {
            instance.is_foreground = instance.instance_id == instance_id;
        }
        self.stacking_order.retain(|id| *id != instance_id);
        self.stacking_order.push(instance_id);
        self.effects
            .push(RegistryEffect::FocusInstanceInput(instance_id));
    }

    #[cfg(test)]
    pub(crate) fn corrupt_for_test(&mut self, order: Vec<InstanceId>, foreground: &[InstanceId]) {
        self.stacking_order = order;
        for instance in self.instances.values_mut() {
            instance.is_foreground = foreground.contains(&instance.instance_id);
        }
    }
}

impl AppControl for InstanceRegistry {
    fn launch_app(&mut self, app_id: AppId, initial_data: Option<Value>) {
        self.launch_or_focus(app_id, initial_data, None, false);
    }

    fn close_app(&mut self, app_id: AppId) {
        InstanceRegistry::close_app(self, app_id);
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    fn foreground_id(registry: &InstanceRegistry) -> Option<InstanceId> {
        registry.foreground().map(|instance| instance.instance_id)
    }

    fn foreground_count(registry: &InstanceRegistry) -> usize {
        registry
            .open_instances()
            .iter()
            .filter(|instance| instance.is_foreground)
            .count()
    }

    #[test]
    fn create_focuses_new_instance_and_appends_to_stack() {
        let mut registry = InstanceRegistry::default();
        let first = registry.create_instance(AppId::Finder, None, None);
        let second = registry.create_instance(AppId::Terminal, None, None);

        assert_eq!(foreground_id(&registry), Some(second));
        assert_eq!(registry.stacking_order(), &[first, second]);
        assert!(!registry.instance(first).unwrap().is_foreground);
        assert!(
            registry.instance(first).unwrap().created_at
                < registry.instance(second).unwrap().created_at
        );
    }

    #[test]
    fn create_staggers_position_by_open_count() {
        let mut registry = InstanceRegistry::default();
        let first = registry.create_instance(AppId::Finder, None, None);
        let second = registry.create_instance(AppId::Finder, None, None);

        let first = registry.instance(first).unwrap().position;
        let second = registry.instance(second).unwrap().position;
        assert_eq!(first, WindowPosition { x: 16, y: 40 });
        assert_eq!(second, WindowPosition { x: 48, y: 72 });
    }

    #[test]
    fn create_seeds_from_saved_geometry() {
        let saved = WindowGeometry {
            position: WindowPosition { x: 200, y: 120 },
            size: WindowSize {
                width: 800,
                height: 500,
            },
        };
        let mut registry = InstanceRegistry::default()
            .with_saved_geometry(BTreeMap::from([(AppId::Terminal, saved)]));
        let id = registry.create_instance(AppId::Terminal, None, Some("Shell".to_string()));

        let instance = registry.instance(id).unwrap();
        assert_eq!(instance.geometry(), saved);
        assert_eq!(instance.display_title(), "Shell");
    }

    #[test]
    fn at_most_one_foreground_across_create_close_sequences() {
        let mut registry = InstanceRegistry::default();
        let apps = [AppId::Finder, AppId::Paint, AppId::Finder, AppId::TextEdit];
        let mut ids = Vec::new();
        for app in apps {
            ids.push(registry.create_instance(app, None, None));
            assert_eq!(foreground_count(&registry), 1);
        }
        for id in [ids[1], ids[3], ids[0], ids[2]] {
            registry.close_instance(id);
            assert!(foreground_count(&registry) <= 1);
        }
        assert_eq!(foreground_id(&registry), None);
        assert!(registry.stacking_order().is_empty());
    }

    #[test]
    fn closing_foreground_prefers_same_app() {
        let mut registry = InstanceRegistry::default();
        let finder_a = registry.create_instance(AppId::Finder, None, None);
        let paint = registry.create_instance(AppId::Paint, None, None);
        let finder_b = registry.create_instance(AppId::Finder, None, None);

        registry.close_instance(finder_b);

        assert_eq!(foreground_id(&registry), Some(finder_a));
        assert_eq!(registry.stacking_order(), &[paint, finder_a]);
    }

    #[test]
    fn closing_foreground_falls_back_to_most_recent_then_none() {
        let mut registry = InstanceRegistry::default();
        let finder = registry.create_instance(AppId::Finder, None, None);
        let paint = registry.create_instance(AppId::Paint, None, None);
        let terminal = registry.create_instance(AppId::Terminal, None, None);
        registry.focus(Some(paint));
        registry.focus(Some(terminal));

        registry.close_instance(terminal);
        assert_eq!(foreground_id(&registry), Some(paint));

        registry.close_instance(paint);
        assert_eq!(foreground_id(&registry), Some(finder));

        registry.close_instance(finder);
        assert_eq!(foreground_id(&registry), None);
    }

    #[test]
    fn closing_background_instance_hands_focus_to_its_sibling() {
        let mut registry = InstanceRegistry::default();
        let finder = registry.create_instance(AppId::Finder, None, None);
        let other_finder = registry.create_instance(AppId::Finder, None, None);
        let paint = registry.create_instance(AppId::Paint, None, None);

        registry.close_instance(finder);
        assert_eq!(foreground_id(&registry), Some(other_finder));
        assert_eq!(registry.stacking_order(), &[paint, other_finder]);
        assert_eq!(foreground_count(&registry), 1);
    }

    #[test]
    fn close_twice_and_unknown_ids_are_noops() {
        let mut registry = InstanceRegistry::default();
        let id = registry.create_instance(AppId::Paint, None, None);
        assert!(registry.close_instance(id));
        assert!(!registry.close_instance(id));
        assert!(!registry.close_instance(InstanceId(99)));
        assert!(registry.open_instances().is_empty());
    }

    #[test]
    fn focus_moves_to_tail_and_none_clears_flags() {
        let mut registry = InstanceRegistry::default();
        let a = registry.create_instance(AppId::Finder, None, None);
        let b = registry.create_instance(AppId::Paint, None, None);

        registry.focus(Some(a));
        assert_eq!(registry.stacking_order(), &[b, a]);
        assert_eq!(foreground_id(&registry), Some(a));

        registry.focus(None);
        assert_eq!(foreground_id(&registry), None);
        assert_eq!(registry.stacking_order(), &[b, a]);
    }

    #[test]
    fn focusing_unknown_instance_leaves_state_untouched() {
        let mut registry = InstanceRegistry::default();
        let a = registry.create_instance(AppId::Finder, None, None);
        let b = registry.create_instance(AppId::Paint, None, None);
        let before = registry.stacking_order().to_vec();

        registry.focus(Some(InstanceId(42)));

        assert_eq!(registry.stacking_order(), before.as_slice());
        assert_eq!(foreground_id(&registry), Some(b));
        assert!(!registry.instance(a).unwrap().is_foreground);
    }

    #[test]
    fn focus_next_then_previous_returns_to_start() {
        let mut registry = InstanceRegistry::default();
        registry.create_instance(AppId::Finder, None, None);
        registry.create_instance(AppId::Paint, None, None);
        let start = registry.create_instance(AppId::Terminal, None, None);

        registry.focus_next(start);
        let moved_to = foreground_id(&registry).unwrap();
        assert_ne!(moved_to, start);

        registry.focus_previous(moved_to);
        assert_eq!(foreground_id(&registry), Some(start));
    }

    #[test]
    fn navigation_requires_two_open_instances() {
        let mut registry = InstanceRegistry::default();
        let only = registry.create_instance(AppId::Finder, None, None);
        registry.take_effects();

        registry.focus_next(only);
        registry.focus_previous(only);

        assert_eq!(foreground_id(&registry), Some(only));
        assert!(registry.take_effects().is_empty());
    }

    #[test]
    fn update_geometry_does_not_reorder_and_queues_persistence() {
        let mut registry = InstanceRegistry::default();
        let a = registry.create_instance(AppId::Terminal, None, None);
        let b = registry.create_instance(AppId::Paint, None, None);
        registry.take_effects();

        let position = WindowPosition { x: 5, y: 6 };
        let size = WindowSize {
            width: 10,
            height: 10,
        };
        registry.update_geometry(a, position, size);

        assert_eq!(registry.stacking_order(), &[a, b]);
        let geometry = registry.instance(a).unwrap().geometry();
        assert_eq!(geometry.position, position);
        assert_eq!(
            geometry.size,
            app_descriptor(AppId::Terminal).min_size,
            "size clamps to the app minimum"
        );
        assert_eq!(
            registry.take_effects(),
            vec![RegistryEffect::PersistGeometry {
                app_id: AppId::Terminal,
                geometry
            }]
        );
    }

    #[test]
    fn launch_or_focus_reuses_single_instance_apps() {
        let mut registry = InstanceRegistry::default();
        let first = registry.launch_or_focus(AppId::Paint, None, None, false);
        registry.create_instance(AppId::Finder, None, None);

        let again = registry.launch_or_focus(
            AppId::Paint,
            Some(json!({ "path": "/Images/cat.png" })),
            None,
            false,
        );

        assert_eq!(again, first);
        assert_eq!(foreground_id(&registry), Some(first));
        assert_eq!(
            registry.instance(first).unwrap().initial_data,
            Some(json!({ "path": "/Images/cat.png" }))
        );
        assert_eq!(registry.query_by_app(AppId::Paint).len(), 1);
    }

    #[test]
    fn launch_or_focus_creates_for_multi_instance_apps() {
        let mut registry = InstanceRegistry::default();
        let a = registry.launch_or_focus(AppId::TextEdit, None, None, false);
        let b = registry.launch_or_focus(AppId::TextEdit, None, None, false);
        let c = registry.launch_or_focus(AppId::Paint, None, None, true);
        let d = registry.launch_or_focus(AppId::Paint, None, None, true);

        assert_ne!(a, b);
        assert_ne!(c, d);
        assert_eq!(registry.query_by_app(AppId::TextEdit).len(), 2);
        assert_eq!(registry.query_by_app(AppId::Paint).len(), 2);
    }

    #[test]
    fn clear_initial_data_and_close_app() {
        let mut registry = InstanceRegistry::default();
        let a = registry.create_instance(AppId::TextEdit, Some(json!({ "path": "/a" })), None);
        registry.create_instance(AppId::TextEdit, None, None);
        let paint = registry.create_instance(AppId::Paint, None, None);

        registry.clear_initial_data(a);
        assert_eq!(registry.instance(a).unwrap().initial_data, None);

        assert_eq!(registry.close_app(AppId::TextEdit), 2);
        assert_eq!(registry.stacking_order(), &[paint]);
        assert_eq!(foreground_id(&registry), Some(paint));
    }

    #[test]
    fn reconcile_drops_dangling_ids_and_appends_missing() {
        let mut registry = InstanceRegistry::default();
        let a = registry.create_instance(AppId::Finder, None, None);
        let b = registry.create_instance(AppId::Paint, None, None);
        let c = registry.create_instance(AppId::Terminal, None, None);
        registry.corrupt_for_test(vec![InstanceId(77), c, c], &[a, c]);

        assert!(registry.reconcile_stacking_order());
        assert_eq!(registry.stacking_order(), &[c, a, b]);
        assert_eq!(foreground_count(&registry), 1);
        assert_eq!(foreground_id(&registry), Some(a), "topmost flagged instance keeps focus");

        assert!(!registry.reconcile_stacking_order());
    }

    #[test]
    fn registry_implements_app_control() {
        let mut registry = InstanceRegistry::default();
        let control: &mut dyn AppControl = &mut registry;
        control.launch_app(AppId::Paint, None);
        control.launch_app(AppId::Paint, None);
        control.close_app(AppId::Finder);
        assert_eq!(registry.query_by_app(AppId::Paint).len(), 1);

        let control: &mut dyn AppControl = &mut registry;
        control.close_app(AppId::Paint);
        assert!(registry.open_instances().is_empty());
    }
}
