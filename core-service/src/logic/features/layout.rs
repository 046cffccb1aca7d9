//! Feature Layout - Centralized Feature Definition
//!
//! **CRITICAL: This file controls the feature schema**
//!
//! The model was trained on one exact column order. Any reordering silently
//! corrupts predictions, so positions are bound by name through [`Layout`]
//! and guarded by a CRC32 layout hash.
//!
//! ## Rules (NEVER break these):
//! 1. Add feature → increment FEATURE_VERSION
//! 2. Change canonical order → increment FEATURE_VERSION
//! 3. Remove feature → increment FEATURE_VERSION

use crc32fast::Hasher;
use serde::{Deserialize, Serialize};

use crate::error::{InvalidReason, LayoutError};

// ============================================================================
// FEATURE VERSION
// ============================================================================

/// Current feature layout version
/// MUST be incremented when the canonical layout changes
pub const FEATURE_VERSION: u8 = 1;

/// Total number of features
pub const FEATURE_COUNT: usize = 8;

// ============================================================================
// FEATURE SLOTS (Authoritative source)
// ============================================================================

/// One named model input. Declaration order is the canonical training order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Feature {
    KneeAdductionAngle,
    BodyWeight,
    Height,
    Bmi,
    WalkingSpeed,
    FootStrikeVelocity,
    Age,
    Sex,
}

/// Semantic type of a feature slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureKind {
    Continuous,
    /// Discrete 0/1 category
    Binary,
}

/// Allowed values for a feature slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Domain {
    /// Any finite number
    Real,
    /// Finite and >= 0
    NonNegative,
    /// Exactly 0 or 1
    Binary,
}

impl Domain {
    /// Check a raw value against this domain.
    pub fn check(self, value: f64) -> Result<(), InvalidReason> {
        if !value.is_finite() {
            return Err(InvalidReason::NotFinite);
        }
        match self {
            Self::Real => Ok(()),
            Self::NonNegative if value < 0.0 => Err(InvalidReason::Negative),
            Self::NonNegative => Ok(()),
            Self::Binary if value == 0.0 || value == 1.0 => Ok(()),
            Self::Binary => Err(InvalidReason::NotBinary),
        }
    }
}

impl Feature {
    /// All features in canonical order.
    pub const ALL: [Feature; FEATURE_COUNT] = [
        Feature::KneeAdductionAngle,
        Feature::BodyWeight,
        Feature::Height,
        Feature::Bmi,
        Feature::WalkingSpeed,
        Feature::FootStrikeVelocity,
        Feature::Age,
        Feature::Sex,
    ];

    /// Canonical position.
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Stable machine name.
    pub const fn name(self) -> &'static str {
        match self {
            Self::KneeAdductionAngle => "knee_adduction_angle",
            Self::BodyWeight => "body_weight",
            Self::Height => "height",
            Self::Bmi => "bmi",
            Self::WalkingSpeed => "walking_speed",
            Self::FootStrikeVelocity => "foot_strike_velocity",
            Self::Age => "age",
            Self::Sex => "sex",
        }
    }

    /// Label the model was trained and displayed with.
    pub const fn label(self) -> &'static str {
        match self {
            Self::KneeAdductionAngle => "膝内收角度",
            Self::BodyWeight => "体重",
            Self::Height => "身高",
            Self::Bmi => "BMI",
            Self::WalkingSpeed => "步行速度",
            Self::FootStrikeVelocity => "足底触地速度",
            Self::Age => "年龄",
            Self::Sex => "性别",
        }
    }

    pub const fn unit(self) -> Option<&'static str> {
        match self {
            Self::KneeAdductionAngle => Some("deg"),
            Self::BodyWeight => Some("kg"),
            Self::Height => Some("cm"),
            Self::Bmi => Some("kg/m^2"),
            Self::WalkingSpeed | Self::FootStrikeVelocity => Some("m/s"),
            Self::Age => Some("years"),
            Self::Sex => None,
        }
    }

    pub const fn domain(self) -> Domain {
        match self {
            Self::KneeAdductionAngle | Self::FootStrikeVelocity => Domain::Real,
            Self::BodyWeight | Self::Height | Self::Bmi | Self::WalkingSpeed | Self::Age => {
                Domain::NonNegative
            }
            Self::Sex => Domain::Binary,
        }
    }

    pub const fn kind(self) -> FeatureKind {
        match self.domain() {
            Domain::Binary => FeatureKind::Binary,
            Domain::Real | Domain::NonNegative => FeatureKind::Continuous,
        }
    }

    /// Form prefill value.
    pub const fn default_value(self) -> f64 {
        match self {
            Self::Age => 30.0,
            _ => 0.0,
        }
    }

    /// Resolve a machine name or a display label.
    pub fn from_name(name: &str) -> Option<Feature> {
        let name = name.trim();
        Self::ALL
            .into_iter()
            .find(|f| f.name().eq_ignore_ascii_case(name) || f.label() == name)
    }
}

impl std::fmt::Display for Feature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

// ============================================================================
// LAYOUT
// ============================================================================

/// An ordering of all feature slots: position `i` of a vector holds
/// `order[i]`. Every feature appears exactly once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Layout {
    order: [Feature; FEATURE_COUNT],
}

impl Layout {
    /// The training order.
    pub const fn canonical() -> Self {
        Self {
            order: Feature::ALL,
        }
    }

    /// Build a layout from an explicit order. Rejects repeated features.
    pub fn new(order: [Feature; FEATURE_COUNT]) -> Result<Self, LayoutError> {
        let mut seen = [false; FEATURE_COUNT];
        for feature in order {
            if std::mem::replace(&mut seen[feature.index()], true) {
                return Err(LayoutError::Duplicate(feature.name()));
            }
        }
        Ok(Self { order })
    }

    /// Bind names (machine names or labels) to positions.
    pub fn from_names<S: AsRef<str>>(names: &[S]) -> Result<Self, LayoutError> {
        if names.len() != FEATURE_COUNT {
            return Err(LayoutError::WrongLength {
                expected: FEATURE_COUNT,
                actual: names.len(),
            });
        }
        let mut order = Feature::ALL;
        for (slot, name) in order.iter_mut().zip(names) {
            let name = name.as_ref();
            *slot = Feature::from_name(name)
                .ok_or_else(|| LayoutError::UnknownFeature(name.to_string()))?;
        }
        Self::new(order)
    }

    pub fn order(&self) -> &[Feature; FEATURE_COUNT] {
        &self.order
    }

    /// Position of `feature` in this layout.
    pub fn position(&self, feature: Feature) -> usize {
        self.order
            .iter()
            .position(|&f| f == feature)
            .unwrap_or_else(|| unreachable!("layout holds every feature"))
    }

    pub fn feature_at(&self, index: usize) -> Option<Feature> {
        self.order.get(index).copied()
    }

    pub fn is_canonical(&self) -> bool {
        self.order == Feature::ALL
    }

    /// CRC32 over the version and the ordered names.
    pub fn hash(&self) -> u32 {
        let mut hasher = Hasher::new();

        hasher.update(&[FEATURE_VERSION]);

        for feature in &self.order {
            hasher.update(feature.name().as_bytes());
            hasher.update(&[0]); // Separator
        }

        hasher.finalize()
    }

    pub fn info(&self) -> LayoutInfo {
        LayoutInfo {
            version: FEATURE_VERSION,
            hash: self.hash(),
            feature_count: FEATURE_COUNT,
            feature_names: self.order.iter().map(|f| f.name().to_string()).collect(),
        }
    }
}

impl Default for Layout {
    fn default() -> Self {
        Self::canonical()
    }
}

/// Hash of the canonical layout.
pub fn layout_hash() -> u32 {
    Layout::canonical().hash()
}

// ============================================================================
// LAYOUT INFO
// ============================================================================

/// Complete layout information for serialization/logging
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutInfo {
    pub version: u8,
    pub hash: u32,
    pub feature_count: usize,
    pub feature_names: Vec<String>,
}

// ============================================================================
// TESTS
// ============================================================================
