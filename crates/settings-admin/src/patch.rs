//! Partial updates and the keyed merge that applies them.
//!
//! A patch names only the keys it changes. Merging walks the patch level by
//! level (settings, assumptions, factor maps) so keys that are not mentioned
//! keep their current value at every depth.

use estimate_core::{
    AssumptionField, Assumptions, LocationFactors, LocationKind, PriceField, QualityFactors,
    QualityTier, Settings, TextField,
};
use rust_decimal::Decimal;
use serde::Deserialize;

/// Apply a partial value in place.
pub trait Merge {
    /// Partial counterpart of `Self`.
    type Patch;

    /// Merge `patch` into `self`. Returns true when any value changed.
    fn merge(&mut self, patch: Self::Patch) -> bool;
}

fn assign<T: PartialEq>(slot: &mut T, value: Option<T>) -> bool {
    match value {
        Some(v) if *slot != v => {
            *slot = v;
            true
        }
        _ => false,
    }
}

/// Partial location factor map.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "camelCase")]
pub struct LocationFactorsPatch {
    pub urban: Option<Decimal>,
    pub suburban: Option<Decimal>,
    pub rural: Option<Decimal>,
}

impl LocationFactorsPatch {
    /// Patch touching exactly one key.
    pub fn single(kind: LocationKind, value: Decimal) -> Self {
        let mut p = Self::default();
        match kind {
            LocationKind::Urban => p.urban = Some(value),
            LocationKind::Suburban => p.suburban = Some(value),
            LocationKind::Rural => p.rural = Some(value),
        }
        p
    }
}

impl Merge for LocationFactors {
    type Patch = LocationFactorsPatch;

    fn merge(&mut self, p: LocationFactorsPatch) -> bool {
        let mut changed = assign(&mut self.urban, p.urban);
        changed |= assign(&mut self.suburban, p.suburban);
        changed |= assign(&mut self.rural, p.rural);
        changed
    }
}

/// Partial quality factor map.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "camelCase")]
pub struct QualityFactorsPatch {
    pub standard: Option<Decimal>,
    pub premium: Option<Decimal>,
    pub luxury: Option<Decimal>,
}

impl QualityFactorsPatch {
    /// Patch touching exactly one key.
    pub fn single(tier: QualityTier, value: Decimal) -> Self {
        let mut p = Self::default();
        match tier {
            QualityTier::Standard => p.standard = Some(value),
            QualityTier::Premium => p.premium = Some(value),
            QualityTier::Luxury => p.luxury = Some(value),
        }
        p
    }
}

impl Merge for QualityFactors {
    type Patch = QualityFactorsPatch;

    fn merge(&mut self, p: QualityFactorsPatch) -> bool {
        let mut changed = assign(&mut self.standard, p.standard);
        changed |= assign(&mut self.premium, p.premium);
        changed |= assign(&mut self.luxury, p.luxury);
        changed
    }
}

/// Partial assumptions, including nested factor maps.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "camelCase")]
pub struct AssumptionsPatch {
    pub foundation_cost_per_sq_ft: Option<Decimal>,
    pub flooring_cost_per_sq_ft: Option<Decimal>,
    pub painting_cost_per_sq_ft: Option<Decimal>,
    pub plastering_cost_per_sq_ft: Option<Decimal>,
    pub window_cost: Option<Decimal>,
    pub door_cost: Option<Decimal>,
    pub kitchen_base_cost: Option<Decimal>,
    pub water_tank_cost: Option<Decimal>,
    pub parking_cost: Option<Decimal>,
    pub material_cost_factor: Option<Decimal>,
    pub labor_cost_factor: Option<Decimal>,
    pub full_escape_premium: Option<Decimal>,
    pub basement_cost: Option<Decimal>,
    pub garage_cost: Option<Decimal>,
    pub timeline_base_cost: Option<Decimal>,
    pub timeline_factor_per_month: Option<Decimal>,
    pub location_factors: Option<LocationFactorsPatch>,
    pub quality_factors: Option<QualityFactorsPatch>,
}

impl AssumptionsPatch {
    fn slot(&mut self, field: AssumptionField) -> &mut Option<Decimal> {
        use AssumptionField::*;
        match field {
            FoundationCostPerSqFt => &mut self.foundation_cost_per_sq_ft,
            FlooringCostPerSqFt => &mut self.flooring_cost_per_sq_ft,
            PaintingCostPerSqFt => &mut self.painting_cost_per_sq_ft,
            PlasteringCostPerSqFt => &mut self.plastering_cost_per_sq_ft,
            WindowCost => &mut self.window_cost,
            DoorCost => &mut self.door_cost,
            KitchenBaseCost => &mut self.kitchen_base_cost,
            WaterTankCost => &mut self.water_tank_cost,
            ParkingCost => &mut self.parking_cost,
            MaterialCostFactor => &mut self.material_cost_factor,
            LaborCostFactor => &mut self.labor_cost_factor,
            FullEscapePremium => &mut self.full_escape_premium,
            BasementCost => &mut self.basement_cost,
            GarageCost => &mut self.garage_cost,
            TimelineBaseCost => &mut self.timeline_base_cost,
            TimelineFactorPerMonth => &mut self.timeline_factor_per_month,
        }
    }

    /// Set one numeric assumption in the patch.
    pub fn with(mut self, field: AssumptionField, value: Decimal) -> Self {
        *self.slot(field) = Some(value);
        self
    }
}

impl Merge for Assumptions {
    type Patch = AssumptionsPatch;

    fn merge(&mut self, mut p: AssumptionsPatch) -> bool {
        let mut changed = false;
        for &field in AssumptionField::ALL {
            changed |= assign(self.get_mut(field), p.slot(field).take());
        }
        if let Some(lf) = p.location_factors {
            changed |= self.location_factors.merge(lf);
        }
        if let Some(qf) = p.quality_factors {
            changed |= self.quality_factors.merge(qf);
        }
        changed
    }
}

/// Partial settings. Resources are edited through the resource list
/// operations, not through patches.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "camelCase")]
pub struct SettingsPatch {
    pub site_name: Option<String>,
    pub brand_color: Option<String>,
    pub logo_url: Option<String>,
    pub report_header: Option<String>,
    pub price_per_sq_ft: Option<Decimal>,
    pub labor_cost_per_day: Option<Decimal>,
    pub brick_price: Option<Decimal>,
    pub cement_price: Option<Decimal>,
    pub steel_price: Option<Decimal>,
    pub sand_price: Option<Decimal>,
    pub plumbing_cost_per_sq_ft: Option<Decimal>,
    pub electrical_cost_per_sq_ft: Option<Decimal>,
    pub mortar_ratio: Option<String>,
    pub assumptions: Option<AssumptionsPatch>,
}

impl SettingsPatch {
    fn text_slot(&mut self, field: TextField) -> &mut Option<String> {
        match field {
            TextField::SiteName => &mut self.site_name,
            TextField::BrandColor => &mut self.brand_color,
            TextField::LogoUrl => &mut self.logo_url,
            TextField::ReportHeader => &mut self.report_header,
            TextField::MortarRatio => &mut self.mortar_ratio,
        }
    }

    fn price_slot(&mut self, field: PriceField) -> &mut Option<Decimal> {
        match field {
            PriceField::PricePerSqFt => &mut self.price_per_sq_ft,
            PriceField::LaborCostPerDay => &mut self.labor_cost_per_day,
            PriceField::BrickPrice => &mut self.brick_price,
            PriceField::CementPrice => &mut self.cement_price,
            PriceField::SteelPrice => &mut self.steel_price,
            PriceField::SandPrice => &mut self.sand_price,
            PriceField::PlumbingCostPerSqFt => &mut self.plumbing_cost_per_sq_ft,
            PriceField::ElectricalCostPerSqFt => &mut self.electrical_cost_per_sq_ft,
        }
    }

    /// Set one text field in the patch.
    pub fn with_text(mut self, field: TextField, value: impl Into<String>) -> Self {
        *self.text_slot(field) = Some(value.into());
        self
    }

    /// Set one top-level price in the patch.
    pub fn with_price(mut self, field: PriceField, value: Decimal) -> Self {
        *self.price_slot(field) = Some(value);
        self
    }

    /// Set the nested assumptions patch.
    pub fn with_assumptions(mut self, assumptions: AssumptionsPatch) -> Self {
        self.assumptions = Some(assumptions);
        self
    }

    /// True when the patch names no keys at all.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

impl Merge for Settings {
    type Patch = SettingsPatch;

    fn merge(&mut self, mut p: SettingsPatch) -> bool {
        let mut changed = false;
        for &field in TextField::ALL {
            changed |= assign(self.text_mut(field), p.text_slot(field).take());
        }
        for &field in PriceField::ALL {
            changed |= assign(self.price_mut(field), p.price_slot(field).take());
        }
        if let Some(a) = p.assumptions {
            changed |= self.assumptions.merge(a);
        }
        changed
    }
}

/// A single settings edit, one variant per settable field group.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SettingsUpdate {
    /// Replace a branding string or the mortar ratio.
    Text(TextField, String),
    /// Replace a top-level price.
    Price(PriceField, Decimal),
    /// Replace one numeric assumption.
    Assumption(AssumptionField, Decimal),
    /// Replace one location factor.
    LocationFactor(LocationKind, Decimal),
    /// Replace one quality factor.
    QualityFactor(QualityTier, Decimal),
}

impl SettingsUpdate {
    /// Dotted wire path of the edited key, e.g. `assumptions.windowCost`.
    pub fn path(&self) -> String {
        match self {
            SettingsUpdate::Text(f, _) => f.as_str().to_string(),
            SettingsUpdate::Price(f, _) => f.as_str().to_string(),
            SettingsUpdate::Assumption(f, _) => format!("assumptions.{f}"),
            SettingsUpdate::LocationFactor(k, _) => format!("assumptions.locationFactors.{k}"),
            SettingsUpdate::QualityFactor(t, _) => format!("assumptions.qualityFactors.{t}"),
        }
    }
}

impl From<SettingsUpdate> for SettingsPatch {
    fn from(update: SettingsUpdate) -> Self {
        let patch = SettingsPatch::default();
        match update {
            SettingsUpdate::Text(f, v) => patch.with_text(f, v),
            SettingsUpdate::Price(f, v) => patch.with_price(f, v),
            SettingsUpdate::Assumption(f, v) => {
                patch.with_assumptions(AssumptionsPatch::default().with(f, v))
            }
            SettingsUpdate::LocationFactor(k, v) => patch.with_assumptions(AssumptionsPatch {
                location_factors: Some(LocationFactorsPatch::single(k, v)),
                ..Default::default()
            }),
            SettingsUpdate::QualityFactor(t, v) => patch.with_assumptions(AssumptionsPatch {
                quality_factors: Some(QualityFactorsPatch::single(t, v)),
                ..Default::default()
            }),
        }
    }
}
