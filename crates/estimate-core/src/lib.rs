#![deny(warnings)]

//! Core settings model for the construction cost estimator.
//!
//! This crate defines the serializable settings object edited from the admin
//! panel (branding, pricing assumptions, factor maps and reference resources),
//! its defaults, and validation helpers that guard basic invariants.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Multipliers keyed by the area type of the construction site.
///
/// Missing keys in a serialized document fall back to the defaults, so a
/// deserialized value is always a complete triple.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LocationFactors {
    /// Urban multiplier (default 1.2).
    pub urban: Decimal,
    /// Suburban multiplier (default 1.0).
    pub suburban: Decimal,
    /// Rural multiplier (default 0.8).
    pub rural: Decimal,
}

impl Default for LocationFactors {
    fn default() -> Self {
        Self {
            urban: Decimal::new(12, 1),
            suburban: Decimal::ONE,
            rural: Decimal::new(8, 1),
        }
    }
}

impl LocationFactors {
    /// Factor for a single area type.
    pub fn get(&self, kind: LocationKind) -> Decimal {
        match kind {
            LocationKind::Urban => self.urban,
            LocationKind::Suburban => self.suburban,
            LocationKind::Rural => self.rural,
        }
    }

    /// Overwrite exactly one factor, leaving its siblings alone.
    pub fn set(&mut self, kind: LocationKind, value: Decimal) {
        match kind {
            LocationKind::Urban => self.urban = value,
            LocationKind::Suburban => self.suburban = value,
            LocationKind::Rural => self.rural = value,
        }
    }
}

/// Multipliers keyed by finish tier.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct QualityFactors {
    /// Standard finish multiplier (default 1.0).
    pub standard: Decimal,
    /// Premium finish multiplier (default 1.3).
    pub premium: Decimal,
    /// Luxury finish multiplier (default 1.6).
    pub luxury: Decimal,
}

impl Default for QualityFactors {
    fn default() -> Self {
        Self {
            standard: Decimal::ONE,
            premium: Decimal::new(13, 1),
            luxury: Decimal::new(16, 1),
        }
    }
}

impl QualityFactors {
    /// Factor for a single finish tier.
    pub fn get(&self, tier: QualityTier) -> Decimal {
        match tier {
            QualityTier::Standard => self.standard,
            QualityTier::Premium => self.premium,
            QualityTier::Luxury => self.luxury,
        }
    }

    /// Overwrite exactly one factor, leaving its siblings alone.
    pub fn set(&mut self, tier: QualityTier, value: Decimal) {
        match tier {
            QualityTier::Standard => self.standard = value,
            QualityTier::Premium => self.premium = value,
            QualityTier::Luxury => self.luxury = value,
        }
    }
}

/// Granular cost and factor parameters used by the estimator.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Assumptions {
    /// Foundation cost per sq. ft (PKR).
    pub foundation_cost_per_sq_ft: Decimal,
    /// Flooring cost per sq. ft (PKR).
    pub flooring_cost_per_sq_ft: Decimal,
    /// Painting cost per sq. ft (PKR).
    pub painting_cost_per_sq_ft: Decimal,
    /// Plastering cost per sq. ft (PKR).
    pub plastering_cost_per_sq_ft: Decimal,
    /// Cost per window (PKR).
    pub window_cost: Decimal,
    /// Cost per door (PKR).
    pub door_cost: Decimal,
    /// Base kitchen cost (PKR).
    pub kitchen_base_cost: Decimal,
    /// Water tank cost (PKR).
    pub water_tank_cost: Decimal,
    /// Parking area cost (PKR).
    pub parking_cost: Decimal,
    /// Global multiplier on material costs.
    pub material_cost_factor: Decimal,
    /// Global multiplier on labor costs.
    pub labor_cost_factor: Decimal,
    /// Premium fraction for full escape (e.g. 0.15 = 15%).
    pub full_escape_premium: Decimal,
    /// Basement cost (PKR).
    pub basement_cost: Decimal,
    /// Garage cost (PKR).
    pub garage_cost: Decimal,
    /// Fixed timeline cost (PKR).
    pub timeline_base_cost: Decimal,
    /// Fractional cost growth per month of schedule.
    pub timeline_factor_per_month: Decimal,
    /// Area-type multipliers.
    pub location_factors: LocationFactors,
    /// Finish-tier multipliers.
    pub quality_factors: QualityFactors,
}

impl Default for Assumptions {
    fn default() -> Self {
        Self {
            foundation_cost_per_sq_ft: Decimal::new(650, 0),
            flooring_cost_per_sq_ft: Decimal::new(350, 0),
            painting_cost_per_sq_ft: Decimal::new(60, 0),
            plastering_cost_per_sq_ft: Decimal::new(85, 0),
            window_cost: Decimal::new(25_000, 0),
            door_cost: Decimal::new(35_000, 0),
            kitchen_base_cost: Decimal::new(250_000, 0),
            water_tank_cost: Decimal::new(60_000, 0),
            parking_cost: Decimal::new(150_000, 0),
            material_cost_factor: Decimal::ONE,
            labor_cost_factor: Decimal::ONE,
            full_escape_premium: Decimal::new(15, 2),
            basement_cost: Decimal::new(2_500_000, 0),
            garage_cost: Decimal::new(400_000, 0),
            timeline_base_cost: Decimal::new(50_000, 0),
            timeline_factor_per_month: Decimal::new(2, 2),
            location_factors: LocationFactors::default(),
            quality_factors: QualityFactors::default(),
        }
    }
}

impl Assumptions {
    /// Read a numeric assumption by field.
    pub fn get(&self, field: AssumptionField) -> Decimal {
        use AssumptionField::*;
        match field {
            FoundationCostPerSqFt => self.foundation_cost_per_sq_ft,
            FlooringCostPerSqFt => self.flooring_cost_per_sq_ft,
            PaintingCostPerSqFt => self.painting_cost_per_sq_ft,
            PlasteringCostPerSqFt => self.plastering_cost_per_sq_ft,
            WindowCost => self.window_cost,
            DoorCost => self.door_cost,
            KitchenBaseCost => self.kitchen_base_cost,
            WaterTankCost => self.water_tank_cost,
            ParkingCost => self.parking_cost,
            MaterialCostFactor => self.material_cost_factor,
            LaborCostFactor => self.labor_cost_factor,
            FullEscapePremium => self.full_escape_premium,
            BasementCost => self.basement_cost,
            GarageCost => self.garage_cost,
            TimelineBaseCost => self.timeline_base_cost,
            TimelineFactorPerMonth => self.timeline_factor_per_month,
        }
    }

    /// Mutable access to a numeric assumption by field.
    pub fn get_mut(&mut self, field: AssumptionField) -> &mut Decimal {
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
}

/// Stable identifier of a resource. Zero means "not yet assigned".
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct ResourceId(pub u64);

impl ResourceId {
    /// Placeholder for resources that have not been stored yet.
    pub const UNASSIGNED: ResourceId = ResourceId(0);

    /// Largest id a store hands out (2^53 - 1, exact in a JSON number).
    pub const MAX: ResourceId = ResourceId((1 << 53) - 1);

    /// Whether an id has been handed out by a store.
    pub fn is_assigned(self) -> bool {
        self.0 != 0
    }

    /// Assigned and not above [`ResourceId::MAX`].
    pub fn in_range(self) -> bool {
        self.is_assigned() && self <= Self::MAX
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ResourceId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(ResourceId)
    }
}

/// Kind of downloadable reference document.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    /// PDF document.
    #[default]
    Pdf,
    /// Printable checklist.
    Checklist,
    /// Spreadsheet or calculator sheet.
    Spreadsheet,
    /// External link.
    Link,
}

impl ResourceKind {
    /// Wire name, e.g. `"pdf"`.
    pub fn as_str(self) -> &'static str {
        match self {
            ResourceKind::Pdf => "pdf",
            ResourceKind::Checklist => "checklist",
            ResourceKind::Spreadsheet => "spreadsheet",
            ResourceKind::Link => "link",
        }
    }
}

impl FromStr for ResourceKind {
    type Err = UnknownName;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pdf" => Ok(ResourceKind::Pdf),
            "checklist" => Ok(ResourceKind::Checklist),
            "spreadsheet" => Ok(ResourceKind::Spreadsheet),
            "link" => Ok(ResourceKind::Link),
            other => Err(UnknownName::new("resource type", other)),
        }
    }
}

/// A reference document surfaced to end users.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Resource {
    /// Stable key used for removal.
    pub id: ResourceId,
    /// Display title.
    pub title: String,
    /// Short description.
    pub description: String,
    /// Free-form grouping, e.g. "Checklists".
    pub category: String,
    /// Download location.
    pub url: String,
    /// Document kind.
    #[serde(rename = "type")]
    pub kind: ResourceKind,
}

/// The full configuration governing cost calculation and branding.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Settings {
    /// Site name shown in the header.
    pub site_name: String,
    /// Brand color as `#RRGGBB`.
    pub brand_color: String,
    /// Logo as a data URL; empty when no logo was uploaded.
    pub logo_url: String,
    /// Header printed on generated reports.
    pub report_header: String,
    /// Base price per sq. ft (PKR).
    pub price_per_sq_ft: Decimal,
    /// Labor cost per day (PKR).
    pub labor_cost_per_day: Decimal,
    /// Price per brick (PKR).
    pub brick_price: Decimal,
    /// Cement price per bag (PKR).
    pub cement_price: Decimal,
    /// Steel price per ton (PKR).
    pub steel_price: Decimal,
    /// Sand price per cubic foot (PKR).
    pub sand_price: Decimal,
    /// Plumbing cost per sq. ft (PKR).
    pub plumbing_cost_per_sq_ft: Decimal,
    /// Electrical cost per sq. ft (PKR).
    pub electrical_cost_per_sq_ft: Decimal,
    /// Cement to sand ratio, e.g. "1:4".
    pub mortar_ratio: String,
    /// Nested cost parameters.
    pub assumptions: Assumptions,
    /// Ordered reference documents.
    pub resources: Vec<Resource>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            site_name: "Construction Cost Calculator".to_string(),
            brand_color: "#2563eb".to_string(),
            logo_url: String::new(),
            report_header: "Construction Cost Estimate".to_string(),
            price_per_sq_ft: Decimal::new(4_500, 0),
            labor_cost_per_day: Decimal::new(2_500, 0),
            brick_price: Decimal::new(18, 0),
            cement_price: Decimal::new(1_450, 0),
            steel_price: Decimal::new(265_000, 0),
            sand_price: Decimal::new(95, 0),
            plumbing_cost_per_sq_ft: Decimal::new(180, 0),
            electrical_cost_per_sq_ft: Decimal::new(220, 0),
            mortar_ratio: "1:4".to_string(),
            assumptions: Assumptions::default(),
            resources: Vec::new(),
        }
    }
}

impl Settings {
    /// Read a top-level price by field.
    pub fn price(&self, field: PriceField) -> Decimal {
        match field {
            PriceField::PricePerSqFt => self.price_per_sq_ft,
            PriceField::LaborCostPerDay => self.labor_cost_per_day,
            PriceField::BrickPrice => self.brick_price,
            PriceField::CementPrice => self.cement_price,
            PriceField::SteelPrice => self.steel_price,
            PriceField::SandPrice => self.sand_price,
            PriceField::PlumbingCostPerSqFt => self.plumbing_cost_per_sq_ft,
            PriceField::ElectricalCostPerSqFt => self.electrical_cost_per_sq_ft,
        }
    }

    /// Mutable access to a top-level price.
    pub fn price_mut(&mut self, field: PriceField) -> &mut Decimal {
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

    /// Read a flat text field.
    pub fn text(&self, field: TextField) -> &str {
        match field {
            TextField::SiteName => &self.site_name,
            TextField::BrandColor => &self.brand_color,
            TextField::LogoUrl => &self.logo_url,
            TextField::ReportHeader => &self.report_header,
            TextField::MortarRatio => &self.mortar_ratio,
        }
    }

    /// Mutable access to a flat text field.
    pub fn text_mut(&mut self, field: TextField) -> &mut String {
        match field {
            TextField::SiteName => &mut self.site_name,
            TextField::BrandColor => &mut self.brand_color,
            TextField::LogoUrl => &mut self.logo_url,
            TextField::ReportHeader => &mut self.report_header,
            TextField::MortarRatio => &mut self.mortar_ratio,
        }
    }

    /// Look up a resource by its stable id.
    pub fn resource(&self, id: ResourceId) -> Option<&Resource> {
        self.resources.iter().find(|r| r.id == id)
    }
}

/// A field name that does not exist in the closed set it was looked up in.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown {kind}: {name:?}")]
pub struct UnknownName {
    /// What was being looked up, e.g. "price field".
    pub kind: &'static str,
    /// The name as given.
    pub name: String,
}

impl UnknownName {
    fn new(kind: &'static str, name: &str) -> Self {
        Self {
            kind,
            name: name.to_string(),
        }
    }
}

macro_rules! named_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $kind:literal {
            $($(#[$vmeta:meta])* $variant:ident => $wire:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub enum $name {
            $($(#[$vmeta])* $variant),+
        }

        impl $name {
            /// Every variant, in declaration order.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// camelCase wire name of the field.
            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $wire),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = UnknownName;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let s = s.trim();
                $name::ALL
                    .iter()
                    .copied()
                    .find(|v| v.as_str() == s)
                    .ok_or_else(|| UnknownName::new($kind, s))
            }
        }
    };
}

named_enum! {
    /// Top-level numeric pricing fields.
    PriceField, "price field" {
        PricePerSqFt => "pricePerSqFt",
        LaborCostPerDay => "laborCostPerDay",
        BrickPrice => "brickPrice",
        CementPrice => "cementPrice",
        SteelPrice => "steelPrice",
        SandPrice => "sandPrice",
        PlumbingCostPerSqFt => "plumbingCostPerSqFt",
        ElectricalCostPerSqFt => "electricalCostPerSqFt",
    }
}

named_enum! {
    /// Numeric fields nested under `assumptions`.
    AssumptionField, "assumption field" {
        FoundationCostPerSqFt => "foundationCostPerSqFt",
        FlooringCostPerSqFt => "flooringCostPerSqFt",
        PaintingCostPerSqFt => "paintingCostPerSqFt",
        PlasteringCostPerSqFt => "plasteringCostPerSqFt",
        WindowCost => "windowCost",
        DoorCost => "doorCost",
        KitchenBaseCost => "kitchenBaseCost",
        WaterTankCost => "waterTankCost",
        ParkingCost => "parkingCost",
        MaterialCostFactor => "materialCostFactor",
        LaborCostFactor => "laborCostFactor",
        FullEscapePremium => "fullEscapePremium",
        BasementCost => "basementCost",
        GarageCost => "garageCost",
        TimelineBaseCost => "timelineBaseCost",
        TimelineFactorPerMonth => "timelineFactorPerMonth",
    }
}

named_enum! {
    /// Flat string fields (branding plus the mortar ratio).
    TextField, "text field" {
        SiteName => "siteName",
        BrandColor => "brandColor",
        LogoUrl => "logoUrl",
        ReportHeader => "reportHeader",
        MortarRatio => "mortarRatio",
    }
}

named_enum! {
    /// Area type keys of the location factor map.
    LocationKind, "location" {
        Urban => "urban",
        Suburban => "suburban",
        Rural => "rural",
    }
}

named_enum! {
    /// Finish tier keys of the quality factor map.
    QualityTier, "quality tier" {
        Standard => "standard",
        Premium => "premium",
        Luxury => "luxury",
    }
}

impl AssumptionField {
    /// Whether the field is a dimensionless multiplier rather than money.
    pub fn is_factor(self) -> bool {
        matches!(
            self,
            AssumptionField::MaterialCostFactor | AssumptionField::LaborCostFactor
        )
    }
}

/// Validation errors for settings invariants.
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    /// Price or cost must be non-negative.
    #[error("{0} must not be negative")]
    NegativeMoney(String),
    /// Multipliers must be strictly positive.
    #[error("{0} must be > 0")]
    NonPositiveFactor(String),
    /// Brand color must be `#RRGGBB`.
    #[error("brand color {0:?} is not a #RRGGBB hex color")]
    InvalidColor(String),
    /// Mortar ratio must look like `1:4`.
    #[error("mortar ratio {0:?} must be two positive numbers separated by ':'")]
    InvalidMortarRatio(String),
    /// Resource title must not be blank.
    #[error("resource {0} has an empty title")]
    EmptyResourceTitle(ResourceId),
    /// Resource url must not be blank.
    #[error("resource {0} has an empty url")]
    EmptyResourceUrl(ResourceId),
    /// Resource ids must be assigned and unique.
    #[error("resource id {0} is missing or duplicated")]
    DuplicateResourceId(ResourceId),
    /// Resource ids must not exceed `ResourceId::MAX`.
    #[error("resource id {0} is above the maximum id")]
    ResourceIdOutOfRange(ResourceId),
}

/// Validate a `#RRGGBB` color string.
pub fn validate_color(color: &str) -> Result<(), ValidationError> {
    let ok = color.len() == 7
        && color.starts_with('#')
        && color[1..].chars().all(|c| c.is_ascii_hexdigit());
    if !ok {
        return Err(ValidationError::InvalidColor(color.to_string()));
    }
    Ok(())
}

/// Parse a mortar ratio such as `"1:4"` or `"1 : 5.5"` into its two parts.
pub fn parse_mortar_ratio(ratio: &str) -> Result<(Decimal, Decimal), ValidationError> {
    let invalid = || ValidationError::InvalidMortarRatio(ratio.to_string());
    let (a, b) = ratio.split_once(':').ok_or_else(invalid)?;
    let a = Decimal::from_str(a.trim()).map_err(|_| invalid())?;
    let b = Decimal::from_str(b.trim()).map_err(|_| invalid())?;
    if a <= Decimal::ZERO || b <= Decimal::ZERO {
        return Err(invalid());
    }
    Ok((a, b))
}

/// Validate a single resource record.
pub fn validate_resource(r: &Resource) -> Result<(), ValidationError> {
    if r.title.trim().is_empty() {
        return Err(ValidationError::EmptyResourceTitle(r.id));
    }
    if r.url.trim().is_empty() {
        return Err(ValidationError::EmptyResourceUrl(r.id));
    }
    Ok(())
}

fn non_negative(name: &str, v: Decimal) -> Result<(), ValidationError> {
    if v < Decimal::ZERO {
        return Err(ValidationError::NegativeMoney(name.to_string()));
    }
    Ok(())
}

fn positive(name: &str, v: Decimal) -> Result<(), ValidationError> {
    if v <= Decimal::ZERO {
        return Err(ValidationError::NonPositiveFactor(name.to_string()));
    }
    Ok(())
}

/// Validate assumptions, including both factor maps.
pub fn validate_assumptions(a: &Assumptions) -> Result<(), ValidationError> {
    for &field in AssumptionField::ALL {
        let v = a.get(field);
        if field.is_factor() {
            positive(field.as_str(), v)?;
        } else {
            non_negative(field.as_str(), v)?;
        }
    }
    for &kind in LocationKind::ALL {
        positive(
            &format!("locationFactors.{}", kind),
            a.location_factors.get(kind),
        )?;
    }
    for &tier in QualityTier::ALL {
        positive(
            &format!("qualityFactors.{}", tier),
            a.quality_factors.get(tier),
        )?;
    }
    Ok(())
}

/// Validate the whole settings object.
pub fn validate_settings(s: &Settings) -> Result<(), ValidationError> {
    validate_color(&s.brand_color)?;
    parse_mortar_ratio(&s.mortar_ratio)?;
    for &field in PriceField::ALL {
        non_negative(field.as_str(), s.price(field))?;
    }
    validate_assumptions(&s.assumptions)?;

    let mut ids = BTreeSet::new();
    for r in &s.resources {
        if r.id > ResourceId::MAX {
            return Err(ValidationError::ResourceIdOutOfRange(r.id));
        }
        if !r.id.is_assigned() || !ids.insert(r.id) {
            return Err(ValidationError::DuplicateResourceId(r.id));
        }
        validate_resource(r)?;
    }
    Ok(())
}
