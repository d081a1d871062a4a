//! Exclusion rules for reference-catalog comparison.

use regex::Regex;

use super::{ValidateError, ValidateResult};

/// Reference-catalog entries a pack is never required to provide.
///
/// The reference catalog lists every asset the platform ships; a content
/// pack legitimately omits whole families of them. Each rule is a
/// regular expression matched against the full relative path.
#[derive(Debug)]
pub struct ExclusionRules {
    patterns: Vec<Regex>,
}

impl ExclusionRules {
    /// Compile a rule set from regex patterns.
    pub fn new<I, S>(patterns: I) -> ValidateResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let patterns = patterns
            .into_iter()
            .map(|p| {
                Regex::new(p.as_ref()).map_err(|e| ValidateError::InvalidRule {
                    pattern: p.as_ref().to_string(),
                    source: e,
                })
            })
            .collect::<ValidateResult<Vec<_>>>()?;
        Ok(Self { patterns })
    }

    /// An empty rule set that excludes nothing.
    pub fn none() -> Self {
        Self {
            patterns: Vec::new(),
        }
    }

    /// The default rule set: mod namespaces, emissive companions, and
    /// asset families (colormaps, fonts, particles, UI chrome) a pack is
    /// not expected to restyle.
    pub fn default_rules(emissive_suffix: &str) -> ValidateResult<Self> {
        let emissive = format!("{}\\.png$", regex::escape(emissive_suffix));
        Self::new([
            // Non-platform namespaces (mod or integration assets).
            "^assets/(optifine|forge|fabric|realms)/",
            emissive.as_str(),
            "textures/colormap/",
            "textures/font/",
            "textures/particle/",
            "textures/gui/",
            "textures/misc/",
            "textures/map/",
            "textures/mob_effect/",
            "textures/painting/",
        ])
    }

    /// True when any rule matches the path.
    pub fn is_excluded(&self, path: &str) -> bool {
        self.patterns.iter().any(|p| p.is_match(path))
    }

    /// Number of compiled rules.
    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    /// True when the rule set is empty.
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_rules_exclude_known_families() {
        let rules = ExclusionRules::default_rules("_e").unwrap();
        assert!(rules.is_excluded("assets/optifine/ctm/stone.png"));
        assert!(rules.is_excluded("assets/minecraft/textures/block/stone_e.png"));
        assert!(rules.is_excluded("assets/minecraft/textures/colormap/grass.png"));
        assert!(rules.is_excluded("assets/minecraft/textures/particle/flame.png"));
        assert!(!rules.is_excluded("assets/minecraft/textures/block/stone.png"));
    }

    #[test]
    fn test_emissive_suffix_is_escaped() {
        // A suffix containing regex metacharacters must match literally.
        let rules = ExclusionRules::default_rules("_e+glow").unwrap();
        assert!(rules.is_excluded("assets/minecraft/textures/block/stone_e+glow.png"));
        assert!(!rules.is_excluded("assets/minecraft/textures/block/stone_eeglow.png"));
    }

    #[test]
    fn test_invalid_pattern_is_an_error() {
        let err = ExclusionRules::new(["("]);
        assert!(matches!(err, Err(ValidateError::InvalidRule { .. })));
    }

    #[test]
    fn test_none_excludes_nothing() {
        let rules = ExclusionRules::none();
        assert!(rules.is_empty());
        assert!(!rules.is_excluded("assets/minecraft/textures/gui/widgets.png"));
    }
}
