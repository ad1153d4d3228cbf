//! Language generation and feature gating
//!
//! The generation selects which edition of the language elaboration follows.
//! On top of it sit independent feature toggles for optional behaviour. Some
//! toggles only take effect at a particular generation: the vendor type
//! extensions are honoured only when compiling for [`Generation::Verilog2001X`].
//!
//! A [`GenerationPolicy`] is assembled once from configuration and is
//! immutable afterwards. It is `Copy`, so elaboration workers take their own
//! copy instead of sharing a lock. Code that needs different rules for one
//! compilation unit derives a new policy with [`GenerationPolicy::with_level`]
//! or [`GenerationPolicy::with_feature`] and passes it down explicitly.

pub mod error;

pub use error::GenerationError;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Language generation, ordered from oldest to newest
#[derive(
    Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum Generation {
    /// IEEE 1364-1995
    #[serde(rename = "1995")]
    Verilog1995 = 1,
    /// IEEE 1364-2001
    #[serde(rename = "2001")]
    Verilog2001 = 2,
    /// IEEE 1364-2001 plus extensions
    #[default]
    #[serde(rename = "2001x")]
    Verilog2001X = 3,
}

impl Generation {
    /// All generations, oldest first
    pub const ALL: [Self; 3] = [Self::Verilog1995, Self::Verilog2001, Self::Verilog2001X];

    /// The spelling used on the command line and in configuration files
    pub const fn flag(self) -> &'static str {
        match self {
            Self::Verilog1995 => "1995",
            Self::Verilog2001 => "2001",
            Self::Verilog2001X => "2001x",
        }
    }
}

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.flag())
    }
}

impl FromStr for Generation {
    type Err = GenerationError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|generation| generation.flag() == text)
            .ok_or_else(|| GenerationError::UnknownGeneration(text.to_owned()))
    }
}

/// Optional elaboration behaviour that can be switched on and off
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Feature {
    /// Vendor type extensions (`xtypes`)
    #[serde(rename = "xtypes")]
    VendorTypes,
    /// Elaborate specify blocks instead of skipping them
    #[serde(rename = "specify")]
    SpecifyBlocks,
    /// Scalar port declarations with vectored net definitions are errors
    /// rather than warnings
    #[serde(rename = "io-range-error")]
    IoRangeError,
}

impl Feature {
    /// All features
    pub const ALL: [Self; 3] = [Self::VendorTypes, Self::SpecifyBlocks, Self::IoRangeError];

    /// The spelling used on the command line and in configuration files
    pub const fn flag(self) -> &'static str {
        match self {
            Self::VendorTypes => "xtypes",
            Self::SpecifyBlocks => "specify",
            Self::IoRangeError => "io-range-error",
        }
    }

    /// The generation this feature is tied to, if any
    pub const fn required_generation(self) -> Option<Generation> {
        match self {
            Self::VendorTypes => Some(Generation::Verilog2001X),
            Self::SpecifyBlocks | Self::IoRangeError => None,
        }
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.flag())
    }
}

impl FromStr for Feature {
    type Err = GenerationError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|feature| feature.flag() == text)
            .ok_or_else(|| GenerationError::UnknownFeature(text.to_owned()))
    }
}

/// One `-g` style flag: select a generation or flip a feature
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum GenerationFlag {
    /// `1995`, `2001`, `2001x`
    Level(Generation),
    /// `xtypes`, `specify`, `io-range-error`
    Enable(Feature),
    /// `no-xtypes`, `no-specify`, `no-io-range-error`
    Disable(Feature),
}

impl FromStr for GenerationFlag {
    type Err = GenerationError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let flag = text.trim();
        if let Ok(level) = flag.parse::<Generation>() {
            return Ok(Self::Level(level));
        }
        if let Some(negated) = flag.strip_prefix("no-") {
            return negated
                .parse::<Feature>()
                .map(Self::Disable)
                .map_err(|_| GenerationError::UnknownFlag(text.to_owned()));
        }
        flag.parse::<Feature>()
            .map(Self::Enable)
            .map_err(|_| GenerationError::UnknownFlag(text.to_owned()))
    }
}

/// Raw on/off state of every feature, before generation gating
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureToggles {
    /// Vendor type extensions
    pub xtypes: bool,
    /// Specify block elaboration
    pub specify: bool,
    /// Strict port width checking
    pub io_range_error: bool,
}

impl FeatureToggles {
    /// Whether `feature` is switched on
    pub const fn get(&self, feature: Feature) -> bool {
        match feature {
            Feature::VendorTypes => self.xtypes,
            Feature::SpecifyBlocks => self.specify,
            Feature::IoRangeError => self.io_range_error,
        }
    }

    fn set(&mut self, feature: Feature, on: bool) {
        match feature {
            Feature::VendorTypes => self.xtypes = on,
            Feature::SpecifyBlocks => self.specify = on,
            Feature::IoRangeError => self.io_range_error = on,
        }
    }
}

impl Default for FeatureToggles {
    fn default() -> Self {
        Self {
            xtypes: true,
            specify: true,
            io_range_error: true,
        }
    }
}

/// The generation and features in force for a compilation
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct GenerationPolicy {
    level: Generation,
    toggles: FeatureToggles,
}

impl GenerationPolicy {
    /// Starts building a policy from the defaults
    #[must_use]
    pub fn builder() -> GenerationPolicyBuilder {
        GenerationPolicyBuilder::default()
    }

    /// The selected generation
    pub const fn current_level(&self) -> Generation {
        self.level
    }

    /// The raw toggles, ignoring generation gating
    pub const fn toggles(&self) -> FeatureToggles {
        self.toggles
    }

    /// Whether the toggle for `feature` is set, ignoring generation gating
    pub const fn is_toggle_set(&self, feature: Feature) -> bool {
        self.toggles.get(feature)
    }

    /// Whether `feature` is in effect
    ///
    /// A feature tied to a generation is only in effect when its toggle is
    /// set and that exact generation is selected.
    pub fn is_feature_enabled(&self, feature: Feature) -> bool {
        self.toggles.get(feature)
            && feature
                .required_generation()
                .is_none_or(|required| self.level == required)
    }

    /// Vendor type extensions are in effect
    pub fn vendor_types_enabled(&self) -> bool {
        self.is_feature_enabled(Feature::VendorTypes)
    }

    /// Specify blocks are elaborated
    pub fn specify_blocks_enabled(&self) -> bool {
        self.is_feature_enabled(Feature::SpecifyBlocks)
    }

    /// Port width mismatches are errors
    pub fn io_range_error_enabled(&self) -> bool {
        self.is_feature_enabled(Feature::IoRangeError)
    }

    /// A copy of this policy with a different generation
    #[must_use]
    pub const fn with_level(mut self, level: Generation) -> Self {
        self.level = level;
        self
    }

    /// A copy of this policy with `feature` switched on or off
    #[must_use]
    pub fn with_feature(mut self, feature: Feature, on: bool) -> Self {
        self.toggles.set(feature, on);
        self
    }
}

impl fmt::Display for GenerationPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.level)?;
        for feature in Feature::ALL {
            let prefix = if self.toggles.get(feature) { "" } else { "no-" };
            write!(f, " {prefix}{feature}")?;
        }
        Ok(())
    }
}

/// Assembles a [`GenerationPolicy`] from configuration sources
#[derive(Clone, Debug, Default)]
pub struct GenerationPolicyBuilder {
    level: Generation,
    toggles: FeatureToggles,
}

impl GenerationPolicyBuilder {
    /// Selects the generation
    #[must_use]
    pub const fn level(mut self, level: Generation) -> Self {
        self.level = level;
        self
    }

    /// Replaces every toggle at once
    #[must_use]
    pub const fn toggles(mut self, toggles: FeatureToggles) -> Self {
        self.toggles = toggles;
        self
    }

    /// Switches `feature` on
    #[must_use]
    pub fn enable(mut self, feature: Feature) -> Self {
        self.toggles.set(feature, true);
        self
    }

    /// Switches `feature` off
    #[must_use]
    pub fn disable(mut self, feature: Feature) -> Self {
        self.toggles.set(feature, false);
        self
    }

    /// Applies a parsed flag
    #[must_use]
    pub fn apply(self, flag: GenerationFlag) -> Self {
        match flag {
            GenerationFlag::Level(level) => self.level(level),
            GenerationFlag::Enable(feature) => self.enable(feature),
            GenerationFlag::Disable(feature) => self.disable(feature),
        }
    }

    /// Parses and applies a flag such as `2001`, `xtypes` or `no-specify`
    ///
    /// # Errors
    ///
    /// Returns `GenerationError::UnknownFlag` if the flag is not recognised.
    pub fn apply_flag(self, flag: &str) -> Result<Self, GenerationError> {
        Ok(self.apply(flag.parse()?))
    }

    /// Freezes the policy
    pub const fn build(self) -> GenerationPolicy {
        GenerationPolicy {
            level: self.level,
            toggles: self.toggles,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let policy = GenerationPolicy::default();
        assert_eq!(policy.current_level(), Generation::Verilog2001X);
        for feature in Feature::ALL {
            assert!(policy.is_feature_enabled(feature), "{feature} should default on");
        }
    }

    #[test]
    fn test_generation_ordering() {
        assert!(Generation::Verilog1995 < Generation::Verilog2001);
        assert!(Generation::Verilog2001 < Generation::Verilog2001X);
        assert_eq!(Generation::Verilog2001X as u8, 3);
    }

    #[test]
    fn test_vendor_types_need_extended_generation() {
        for level in [Generation::Verilog1995, Generation::Verilog2001] {
            let policy = GenerationPolicy::builder()
                .level(level)
                .enable(Feature::VendorTypes)
                .build();
            assert!(policy.is_toggle_set(Feature::VendorTypes));
            assert!(!policy.is_feature_enabled(Feature::VendorTypes));
            assert!(!policy.vendor_types_enabled());
        }

        let policy = GenerationPolicy::builder()
            .level(Generation::Verilog2001X)
            .enable(Feature::VendorTypes)
            .build();
        assert!(policy.vendor_types_enabled());
    }

    #[test]
    fn test_vendor_types_toggle_off() {
        let policy = GenerationPolicy::builder()
            .level(Generation::Verilog2001X)
            .disable(Feature::VendorTypes)
            .build();
        assert!(!policy.vendor_types_enabled());
    }

    #[test]
    fn test_ungated_features_ignore_generation() {
        let policy = GenerationPolicy::builder()
            .level(Generation::Verilog1995)
            .disable(Feature::IoRangeError)
            .build();
        assert!(policy.specify_blocks_enabled());
        assert!(!policy.io_range_error_enabled());
    }

    #[test]
    fn test_parse_flags() {
        assert_eq!(
            "2001".parse::<GenerationFlag>(),
            Ok(GenerationFlag::Level(Generation::Verilog2001))
        );
        assert_eq!(
            "no-specify".parse::<GenerationFlag>(),
            Ok(GenerationFlag::Disable(Feature::SpecifyBlocks))
        );
        assert_eq!(
            "io-range-error".parse::<GenerationFlag>(),
            Ok(GenerationFlag::Enable(Feature::IoRangeError))
        );
        assert_eq!(
            "no-such".parse::<GenerationFlag>(),
            Err(GenerationError::UnknownFlag("no-such".to_owned()))
        );
    }

    #[test]
    fn test_apply_flags_in_order() {
        let policy = GenerationPolicy::builder()
            .apply_flag("1995")
            .and_then(|builder| builder.apply_flag("no-xtypes"))
            .and_then(|builder| builder.apply_flag("2001x"))
            .unwrap()
            .build();
        assert_eq!(policy.current_level(), Generation::Verilog2001X);
        assert!(!policy.vendor_types_enabled());
        assert_eq!(policy.to_string(), "2001x no-xtypes specify io-range-error");
    }

    #[test]
    fn test_override_leaves_original_untouched() {
        let shared = GenerationPolicy::default();
        let unit = shared.with_level(Generation::Verilog2001);
        assert!(shared.vendor_types_enabled());
        assert!(!unit.vendor_types_enabled());

        let no_specify = shared.with_feature(Feature::SpecifyBlocks, false);
        assert!(shared.specify_blocks_enabled());
        assert!(!no_specify.specify_blocks_enabled());
    }

    #[test]
    fn test_deserialize_from_config() {
        #[derive(Deserialize)]
        struct Section {
            generation: Generation,
            features: FeatureToggles,
        }

        let section: Section = toml::from_str(
            r#"
            generation = "2001"
            [features]
            xtypes = false
            "#,
        )
        .unwrap();
        assert_eq!(section.generation, Generation::Verilog2001);
        assert!(!section.features.xtypes);
        assert!(section.features.specify);
    }
}
