use crate::catalog::DisplayKey;
use serde_with::{DeserializeFromStr, SerializeDisplay};
use std::path::{Path, PathBuf};
use strum::{Display as StrumDisplay, EnumIter, EnumString, IntoEnumIterator};

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    SerializeDisplay,
    DeserializeFromStr,
    EnumString,
    EnumIter,
    StrumDisplay,
)]
#[strum(ascii_case_insensitive)]
pub enum ResolutionTier {
    #[default]
    #[strum(to_string = "1x", serialize = "x1", serialize = "1")]
    X1,
    #[strum(to_string = "2x", serialize = "x2", serialize = "2")]
    X2,
    #[strum(to_string = "3x", serialize = "x3", serialize = "3")]
    X3,
}

impl ResolutionTier {
    pub fn multiplier(self) -> u8 {
        self as u8 + 1
    }
}

/// Maps a catalog entry to an image locator. Must not block: called once per visible
/// item per frame.
pub trait AssetResolver {
    fn resolve(&self, key: &DisplayKey, tier: ResolutionTier) -> PathBuf;

    fn srcset(&self, key: &DisplayKey) -> String {
        ResolutionTier::iter()
            .map(|tier| format!("{} {}", self.resolve(key, tier).display(), tier))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Cover art laid out as `{root}/@2x/{key}@2x.jpg`.
#[derive(Debug, Clone)]
pub struct CoverArtResolver {
    root: PathBuf,
}

impl CoverArtResolver {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }
}

impl AssetResolver for CoverArtResolver {
    fn resolve(&self, key: &DisplayKey, tier: ResolutionTier) -> PathBuf {
        self.root
            .join(format!("@{}", tier))
            .join(format!("{}@{}.jpg", key, tier))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_parsing() {
        let cases = vec![
            ("\"1x\"", ResolutionTier::X1),
            ("\"X2\"", ResolutionTier::X2),
            ("\"3\"", ResolutionTier::X3),
        ];

        for (json, expected) in cases {
            let deserialized: ResolutionTier = serde_json::from_str(json).unwrap();
            assert_eq!(deserialized, expected);
        }
        assert_eq!(serde_json::to_string(&ResolutionTier::X3).unwrap(), "\"3x\"");
        assert_eq!(ResolutionTier::X2.multiplier(), 2);
    }

    #[test]
    fn test_cover_art_paths() {
        let resolver = CoverArtResolver::new("/album-covers");
        let key = DisplayKey::from("angelolsen_allmirrors");

        assert_eq!(
            resolver.resolve(&key, ResolutionTier::X2),
            PathBuf::from("/album-covers/@2x/angelolsen_allmirrors@2x.jpg")
        );
        assert_eq!(
            resolver.srcset(&key),
            "/album-covers/@1x/angelolsen_allmirrors@1x.jpg 1x, \
             /album-covers/@2x/angelolsen_allmirrors@2x.jpg 2x, \
             /album-covers/@3x/angelolsen_allmirrors@3x.jpg 3x"
        );
    }
}
