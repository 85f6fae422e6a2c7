//! The settings store: owns the canonical value and notifies observers.

use crate::patch::{Merge, SettingsPatch, SettingsUpdate};
use crate::resources::{self, ResourceDraft};
use estimate_core::{Resource, ResourceId, Settings};
use std::fmt;
use tokio::sync::watch;
use tracing::{debug, info};

/// Receives the new settings after every change.
pub trait SettingsObserver: Send {
    /// Called once per change with the updated value and its revision.
    fn settings_changed(&mut self, settings: &Settings, revision: u64);
}

impl<F> SettingsObserver for F
where
    F: FnMut(&Settings) + Send,
{
    fn settings_changed(&mut self, settings: &Settings, _revision: u64) {
        self(settings)
    }
}

/// Handle returned by [`SettingsStore::subscribe`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Read and write access to settings, as consumed by editors.
pub trait SettingsApi {
    /// Current settings.
    fn get_settings(&self) -> &Settings;
    /// Merge a partial update. Returns true when the value changed.
    fn update_settings(&mut self, patch: SettingsPatch) -> bool;
    /// Append a resource and return its id.
    fn add_resource(&mut self, draft: ResourceDraft) -> ResourceId;
    /// Remove the resource with `id`, if present.
    fn remove_resource(&mut self, id: ResourceId) -> Option<Resource>;
}

impl<S: SettingsApi + ?Sized> SettingsApi for &mut S {
    fn get_settings(&self) -> &Settings {
        (**self).get_settings()
    }

    fn update_settings(&mut self, patch: SettingsPatch) -> bool {
        (**self).update_settings(patch)
    }

    fn add_resource(&mut self, draft: ResourceDraft) -> ResourceId {
        (**self).add_resource(draft)
    }

    fn remove_resource(&mut self, id: ResourceId) -> Option<Resource> {
        (**self).remove_resource(id)
    }
}

/// Explicit state container for the settings singleton.
pub struct SettingsStore {
    settings: Settings,
    revision: u64,
    next_resource_id: u64,
    next_subscription: u64,
    observers: Vec<(SubscriptionId, Box<dyn SettingsObserver>)>,
    tx: watch::Sender<Settings>,
}

impl fmt::Debug for SettingsStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SettingsStore")
            .field("settings", &self.settings)
            .field("revision", &self.revision)
            .field("observers", &self.observers.len())
            .finish()
    }
}

impl Default for SettingsStore {
    fn default() -> Self {
        Self::new(Settings::default())
    }
}

impl SettingsStore {
    /// Create a store seeded with `settings`. Resources without a usable id
    /// are given one.
    pub fn new(mut settings: Settings) -> Self {
        let next_resource_id = resources::assign_ids(&mut settings.resources);
        let (tx, _rx) = watch::channel(settings.clone());
        Self {
            settings,
            revision: 0,
            next_resource_id,
            next_subscription: 1,
            observers: Vec::new(),
            tx,
        }
    }

    /// Number of changes applied since construction.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Apply a single typed edit.
    pub fn apply(&mut self, update: SettingsUpdate) -> bool {
        debug!(path = %update.path(), "applying settings update");
        self.update_settings(update.into())
    }

    /// Register an observer for future changes.
    pub fn subscribe(&mut self, observer: impl SettingsObserver + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.observers.push((id, Box::new(observer)));
        id
    }

    /// Drop an observer. Returns false when it was not registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(sid, _)| *sid != id);
        self.observers.len() != before
    }

    /// Channel receiver that always holds the latest settings.
    pub fn watch(&self) -> watch::Receiver<Settings> {
        self.tx.subscribe()
    }

    /// Consume the store, returning the settings value.
    pub fn into_settings(self) -> Settings {
        self.settings
    }

    fn changed(&mut self) {
        self.revision += 1;
        for (_, obs) in self.observers.iter_mut() {
            obs.settings_changed(&self.settings, self.revision);
        }
        self.tx.send_replace(self.settings.clone());
    }
}

impl SettingsApi for SettingsStore {
    fn get_settings(&self) -> &Settings {
        &self.settings
    }

    fn update_settings(&mut self, patch: SettingsPatch) -> bool {
        if !self.settings.merge(patch) {
            debug!("settings update left value unchanged");
            return false;
        }
        self.changed();
        true
    }

    fn add_resource(&mut self, draft: ResourceDraft) -> ResourceId {
        let id = ResourceId(self.next_resource_id);
        self.next_resource_id = self.next_resource_id.checked_add(1).unwrap_or(u64::MAX);
        info!(%id, title = %draft.title, kind = draft.kind.as_str(), "resource added");
        self.settings.resources.push(draft.into_resource(id));
        self.changed();
        id
    }

    fn remove_resource(&mut self, id: ResourceId) -> Option<Resource> {
        let removed = resources::remove_by_id(&mut self.settings.resources, id)?;
        info!(%id, title = %removed.title, "resource removed");
        self.changed();
        Some(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use estimate_core::{AssumptionField, LocationKind, PriceField, TextField};
    use proptest::prelude::*;
    use rust_decimal::Decimal;
    use std::sync::{Arc, Mutex};

    fn checklist() -> ResourceDraft {
        ResourceDraft::new("Checklist", "Pre-pour inspection", "Checklists", "http://x/doc.pdf")
    }

    #[test]
    fn observers_see_each_change_once() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let mut store = SettingsStore::default();
        store.subscribe(move |s: &Settings| sink.lock().unwrap().push(s.site_name.clone()));

        store.apply(SettingsUpdate::Text(TextField::SiteName, "One".into()));
        store.apply(SettingsUpdate::Text(TextField::SiteName, "One".into()));
        store.apply(SettingsUpdate::Text(TextField::SiteName, "Two".into()));

        assert_eq!(*seen.lock().unwrap(), vec!["One".to_string(), "Two".to_string()]);
        assert_eq!(store.revision(), 2);
    }

    #[test]
    fn unsubscribed_observer_is_silent() {
        let count = Arc::new(Mutex::new(0u32));
        let c = count.clone();
        let mut store = SettingsStore::default();
        let id = store.subscribe(move |_: &Settings| *c.lock().unwrap() += 1);
        store.apply(SettingsUpdate::Price(PriceField::BrickPrice, Decimal::new(20, 0)));
        assert!(store.unsubscribe(id));
        assert!(!store.unsubscribe(id));
        store.apply(SettingsUpdate::Price(PriceField::BrickPrice, Decimal::new(21, 0)));
        assert_eq!(*count.lock().unwrap(), 1);
    }

    #[test]
    fn watch_channel_tracks_latest_value() {
        let mut store = SettingsStore::default();
        let mut rx = store.watch();
        assert!(!rx.has_changed().unwrap());
        store.apply(SettingsUpdate::LocationFactor(LocationKind::Rural, Decimal::new(7, 1)));
        assert!(rx.has_changed().unwrap());
        let latest = rx.borrow_and_update().clone();
        assert_eq!(latest.assumptions.location_factors.rural, Decimal::new(7, 1));
    }

    #[test]
    fn add_resource_appends_at_tail() {
        let mut store = SettingsStore::default();
        store.add_resource(ResourceDraft::new("Guide", "", "Guidelines", "http://x/g.pdf"));
        let before = store.get_settings().resources.len();
        let id = store.add_resource(checklist());
        let list = &store.get_settings().resources;
        assert_eq!(list.len(), before + 1);
        let tail = list.last().unwrap();
        assert_eq!(tail.id, id);
        assert_eq!(tail.title, "Checklist");
        assert_eq!(tail.url, "http://x/doc.pdf");
        assert_eq!(tail.kind.as_str(), "pdf");
    }

    #[test]
    fn duplicates_are_allowed_with_distinct_ids() {
        let mut store = SettingsStore::default();
        let a = store.add_resource(checklist());
        let b = store.add_resource(checklist());
        assert_ne!(a, b);
        assert_eq!(store.get_settings().resources.len(), 2);
    }

    #[test]
    fn remove_unknown_id_is_a_no_op() {
        let mut store = SettingsStore::default();
        let id = store.add_resource(checklist());
        let rev = store.revision();
        assert!(store.remove_resource(ResourceId(id.0 + 100)).is_none());
        assert_eq!(store.revision(), rev);
        assert!(store.remove_resource(id).is_some());
        assert!(store.remove_resource(id).is_none());
    }

    #[test]
    fn seeded_resources_get_ids_and_counter_continues() {
        let mut seed = Settings::default();
        seed.resources.push(checklist().into_resource(ResourceId::UNASSIGNED));
        seed.resources.push(checklist().into_resource(ResourceId(9)));
        let mut store = SettingsStore::new(seed);
        let ids: Vec<u64> = store.get_settings().resources.iter().map(|r| r.id.0).collect();
        assert_eq!(ids, vec![10, 9]);
        assert_eq!(store.add_resource(checklist()), ResourceId(11));
    }

    #[test]
    fn seed_with_max_id_does_not_overflow() {
        let mut seed = Settings::default();
        seed.resources.push(checklist().into_resource(ResourceId(u64::MAX)));
        let mut store = SettingsStore::new(seed);
        let first = store.get_settings().resources[0].id;
        assert_eq!(first, ResourceId(1));
        assert_eq!(store.add_resource(checklist()), ResourceId(2));
        estimate_core::validate_settings(store.get_settings()).unwrap();
    }

    #[test]
    fn store_works_through_a_mutable_reference() {
        fn bump<S: SettingsApi>(mut api: S) -> bool {
            api.update_settings(SettingsUpdate::Price(PriceField::SandPrice, Decimal::new(100, 0)).into())
        }
        let mut store = SettingsStore::default();
        assert!(bump(&mut store));
        assert_eq!(store.get_settings().sand_price, Decimal::new(100, 0));
    }

    proptest! {
        #[test]
        fn distinct_assumption_edits_never_lose_updates(
            i in 0usize..16, j in 0usize..16, v in 0i64..10_000_000, w in 0i64..10_000_000
        ) {
            prop_assume!(i != j);
            let f = AssumptionField::ALL[i];
            let g = AssumptionField::ALL[j];
            let mut store = SettingsStore::default();
            store.apply(SettingsUpdate::Assumption(f, Decimal::new(v, 2)));
            store.apply(SettingsUpdate::Assumption(g, Decimal::new(w, 2)));
            let a = &store.get_settings().assumptions;
            prop_assert_eq!(a.get(f), Decimal::new(v, 2));
            prop_assert_eq!(a.get(g), Decimal::new(w, 2));
        }

        #[test]
        fn removal_preserves_relative_order(n in 1usize..12, pick in 0usize..12) {
            let mut store = SettingsStore::default();
            let ids: Vec<ResourceId> = (0..n)
                .map(|k| store.add_resource(ResourceDraft::new(format!("r{k}"), "", "", "u")))
                .collect();
            let target = ids[pick % n];
            store.remove_resource(target);
            let remaining: Vec<ResourceId> =
                store.get_settings().resources.iter().map(|r| r.id).collect();
            let expected: Vec<ResourceId> = ids.into_iter().filter(|id| *id != target).collect();
            prop_assert_eq!(remaining, expected);
        }
    }
}
