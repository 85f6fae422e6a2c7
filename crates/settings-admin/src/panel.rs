//! Form-facing controller over an injected settings store.
//!
//! `AdminPanel` is what an admin form binds to: it turns raw input (text,
//! factor values, uploaded files, the "add resource" draft) into typed
//! updates and hands them to the store.

use crate::coerce::{self, NumericField};
use crate::patch::SettingsUpdate;
use crate::resources::ResourceDraft;
use crate::store::SettingsApi;
use crate::upload;
use crate::AdminError;
use estimate_core::{
    LocationFactors, LocationKind, QualityFactors, QualityTier, Resource, ResourceId, Settings,
    TextField,
};
use rust_decimal::Decimal;
use std::path::Path;
use tracing::debug;

/// Settings editor bound to a store `S`.
#[derive(Debug)]
pub struct AdminPanel<S> {
    store: S,
    draft: ResourceDraft,
}

impl<S: SettingsApi> AdminPanel<S> {
    /// Panel over `store` with an empty resource draft.
    pub fn new(store: S) -> Self {
        Self {
            store,
            draft: ResourceDraft::default(),
        }
    }

    /// The underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Mutable access to the underlying store.
    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    /// Consume the panel, returning the store.
    pub fn into_store(self) -> S {
        self.store
    }

    /// Current settings as held by the store.
    pub fn settings(&self) -> &Settings {
        self.store.get_settings()
    }

    /// Effective location factors; always a complete triple.
    pub fn location_factors(&self) -> &LocationFactors {
        &self.settings().assumptions.location_factors
    }

    /// Effective quality factors; always a complete triple.
    pub fn quality_factors(&self) -> &QualityFactors {
        &self.settings().assumptions.quality_factors
    }

    fn apply(&mut self, update: SettingsUpdate) -> bool {
        debug!(path = %update.path(), "form edit");
        self.store.update_settings(update.into())
    }

    /// Replace a branding string or the mortar ratio.
    pub fn set_text(&mut self, field: TextField, value: impl Into<String>) -> bool {
        self.apply(SettingsUpdate::Text(field, value.into()))
    }

    /// Numeric input addressed by wire names, with an optional parent
    /// (`"assumptions"`). Blank text writes zero; non-numeric text is
    /// rejected and nothing is written.
    pub fn handle_numeric_input(
        &mut self,
        text: &str,
        field: &str,
        parent: Option<&str>,
    ) -> Result<bool, AdminError> {
        let update = coerce::coerce_named(text, field, parent)?;
        Ok(self.apply(update))
    }

    /// Numeric input for an already resolved field.
    pub fn set_numeric(&mut self, field: NumericField, text: &str) -> Result<bool, AdminError> {
        let update = coerce::coerce(text, field)?;
        Ok(self.apply(update))
    }

    /// Set one location multiplier, leaving the other two untouched.
    pub fn update_location_factor(&mut self, kind: LocationKind, value: Decimal) -> bool {
        self.apply(SettingsUpdate::LocationFactor(kind, value))
    }

    /// Set one quality multiplier, leaving the other two untouched.
    pub fn update_quality_factor(&mut self, tier: QualityTier, value: Decimal) -> bool {
        self.apply(SettingsUpdate::QualityFactor(tier, value))
    }

    /// Read an image and store it as the logo data URL.
    pub fn set_logo_from_file(&mut self, path: impl AsRef<Path>) -> Result<bool, AdminError> {
        let url = upload::logo_data_url(path)?;
        Ok(self.set_text(TextField::LogoUrl, url))
    }

    /// The pending "add resource" form.
    pub fn draft(&self) -> &ResourceDraft {
        &self.draft
    }

    /// Edit the pending "add resource" form.
    pub fn draft_mut(&mut self) -> &mut ResourceDraft {
        &mut self.draft
    }

    /// Store the current draft and reset the form. Title and url are
    /// required.
    pub fn submit_resource_draft(&mut self) -> Result<ResourceId, AdminError> {
        if self.draft.title.trim().is_empty() {
            return Err(AdminError::IncompleteDraft("title"));
        }
        if self.draft.url.trim().is_empty() {
            return Err(AdminError::IncompleteDraft("url"));
        }
        let draft = std::mem::take(&mut self.draft);
        Ok(self.store.add_resource(draft))
    }

    /// Append a resource directly, bypassing the draft.
    pub fn add_resource(&mut self, draft: ResourceDraft) -> ResourceId {
        self.store.add_resource(draft)
    }

    /// Remove the resource with `id`. Unknown ids are a no-op.
    pub fn remove_resource(&mut self, id: ResourceId) -> Option<Resource> {
        self.store.remove_resource(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coerce::CoerceError;
    use crate::store::SettingsStore;
    use estimate_core::{AssumptionField, PriceField, ResourceKind};
    use proptest::prelude::*;

    fn panel() -> AdminPanel<SettingsStore> {
        AdminPanel::new(SettingsStore::default())
    }

    #[test]
    fn numeric_input_sets_top_level_field() {
        let mut p = panel();
        assert!(p.handle_numeric_input("5200", "pricePerSqFt", None).unwrap());
        assert_eq!(p.settings().price_per_sq_ft, Decimal::new(5200, 0));
        p.handle_numeric_input("", "laborCostPerDay", None).unwrap();
        assert_eq!(p.settings().labor_cost_per_day, Decimal::ZERO);
    }

    #[test]
    fn nested_inputs_accumulate() {
        let mut p = panel();
        let painting = p.settings().assumptions.painting_cost_per_sq_ft;
        p.handle_numeric_input("400", "flooringCostPerSqFt", Some("assumptions"))
            .unwrap();
        p.handle_numeric_input("90", "plasteringCostPerSqFt", Some("assumptions"))
            .unwrap();
        let a = &p.settings().assumptions;
        assert_eq!(a.flooring_cost_per_sq_ft, Decimal::new(400, 0));
        assert_eq!(a.plastering_cost_per_sq_ft, Decimal::new(90, 0));
        assert_eq!(a.painting_cost_per_sq_ft, painting);
    }

    #[test]
    fn invalid_numeric_input_leaves_store_untouched() {
        let mut p = panel();
        let before = p.settings().clone();
        let err = p.handle_numeric_input("abc", "brickPrice", None).unwrap_err();
        assert!(matches!(
            err,
            AdminError::Coerce(CoerceError::NotANumber(_))
        ));
        assert!(p.handle_numeric_input("1", "brikPrice", None).is_err());
        assert_eq!(*p.settings(), before);
        assert_eq!(p.store().revision(), 0);
    }

    #[test]
    fn set_numeric_with_resolved_field() {
        let mut p = panel();
        p.set_numeric(NumericField::Price(PriceField::SteelPrice), "270000")
            .unwrap();
        p.set_numeric(
            NumericField::Assumption(AssumptionField::FullEscapePremium),
            "0.2",
        )
        .unwrap();
        assert_eq!(p.settings().steel_price, Decimal::new(270_000, 0));
        assert_eq!(p.settings().assumptions.full_escape_premium, Decimal::new(2, 1));
    }

    #[test]
    fn location_factor_update_from_defaults() {
        let mut p = panel();
        p.update_location_factor(LocationKind::Urban, Decimal::new(15, 1));
        let lf = p.location_factors();
        assert_eq!(lf.urban, Decimal::new(15, 1));
        assert_eq!(lf.suburban, Decimal::new(10, 1));
        assert_eq!(lf.rural, Decimal::new(8, 1));
    }

    #[test]
    fn quality_factor_update_keeps_other_assumptions() {
        let mut p = panel();
        p.handle_numeric_input("123", "garageCost", Some("assumptions"))
            .unwrap();
        p.update_quality_factor(QualityTier::Premium, Decimal::new(135, 2));
        let a = &p.settings().assumptions;
        assert_eq!(a.garage_cost, Decimal::new(123, 0));
        assert_eq!(a.quality_factors.premium, Decimal::new(135, 2));
        assert_eq!(a.quality_factors.standard, Decimal::ONE);
        assert_eq!(a.quality_factors.luxury, Decimal::new(16, 1));
    }

    #[test]
    fn logo_upload_sets_data_url() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("brand.png");
        std::fs::write(&path, [0x89u8, b'P', b'N', b'G']).unwrap();
        let mut p = panel();
        assert!(p.set_logo_from_file(&path).unwrap());
        assert!(p.settings().logo_url.starts_with("data:image/png;base64,"));
        assert!(p.set_logo_from_file(dir.path().join("brand.bmp")).is_err());
    }

    #[test]
    fn draft_submission_requires_title_and_url_then_resets() {
        let mut p = panel();
        p.draft_mut().title = "Checklist".into();
        assert!(matches!(
            p.submit_resource_draft(),
            Err(AdminError::IncompleteDraft("url"))
        ));
        p.draft_mut().url = "http://x/doc.pdf".into();
        p.draft_mut().category = "Checklists".into();
        p.draft_mut().kind = ResourceKind::Checklist;
        let id = p.submit_resource_draft().unwrap();
        assert_eq!(*p.draft(), ResourceDraft::default());
        assert_eq!(p.draft().kind, ResourceKind::Pdf);
        let stored = p.settings().resource(id).unwrap();
        assert_eq!(stored.category, "Checklists");
        assert_eq!(stored.kind, ResourceKind::Checklist);
    }

    #[test]
    fn remove_through_panel() {
        let mut p = panel();
        let a = p.add_resource(ResourceDraft::new("A", "", "", "u1"));
        let b = p.add_resource(ResourceDraft::new("B", "", "", "u2"));
        let c = p.add_resource(ResourceDraft::new("C", "", "", "u3"));
        assert_eq!(p.remove_resource(b).unwrap().title, "B");
        let ids: Vec<ResourceId> = p.settings().resources.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![a, c]);
    }

    #[test]
    fn panel_can_borrow_a_store() {
        let mut store = SettingsStore::default();
        {
            let mut p = AdminPanel::new(&mut store);
            p.set_text(TextField::ReportHeader, "Quotation");
        }
        assert_eq!(store.get_settings().report_header, "Quotation");
    }

    proptest! {
        #[test]
        fn numeric_text_sets_price(cents in 0i64..1_000_000_000) {
            let text = format!("{}.{:02}", cents / 100, cents % 100);
            let mut p = panel();
            p.handle_numeric_input(&text, "cementPrice", None).unwrap();
            prop_assert_eq!(p.settings().cement_price, Decimal::new(cents, 2));
        }
    }
}
