//! Optional backend capabilities.

use std::fmt;

/// An optional capability a backend build may or may not offer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Feature {
    /// Per-entry extra fields.
    Extra,
    /// Per-entry comments.
    Comment,
    /// Per-entry choice of compression method (including store-only).
    Compression,
}

impl Feature {
    /// All features, in display order.
    pub const ALL: [Self; 3] = [Self::Extra, Self::Comment, Self::Compression];

    /// Returns the lowercase name of the feature.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Extra => "extra",
            Self::Comment => "comment",
            Self::Compression => "compression",
        }
    }

    const fn bit(self) -> u8 {
        match self {
            Self::Extra => 0b001,
            Self::Comment => 0b010,
            Self::Compression => 0b100,
        }
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Set of [`Feature`]s supported by a backend.
///
/// Queried once from the backend when a handle is opened and consulted by
/// every operation that touches an optional capability.
///
/// # Examples
///
/// ```
/// use ziptools_core::backend::Feature;
/// use ziptools_core::backend::FeatureSet;
///
/// let set = FeatureSet::empty().with(Feature::Compression);
/// assert!(set.contains(Feature::Compression));
/// assert!(!set.contains(Feature::Comment));
/// assert_eq!(set.iter().count(), 1);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct FeatureSet(u8);

impl FeatureSet {
    /// Creates an empty feature set.
    #[must_use]
    pub const fn empty() -> Self {
        Self(0)
    }

    /// Creates a set holding every feature.
    #[must_use]
    pub const fn all() -> Self {
        Self(0b111)
    }

    /// Returns the set with `feature` added.
    #[must_use]
    pub const fn with(self, feature: Feature) -> Self {
        Self(self.0 | feature.bit())
    }

    /// Returns the set with `feature` removed.
    #[must_use]
    pub const fn without(self, feature: Feature) -> Self {
        Self(self.0 & !feature.bit())
    }

    /// Returns `true` if `feature` is supported.
    #[must_use]
    pub const fn contains(self, feature: Feature) -> bool {
        self.0 & feature.bit() != 0
    }

    /// Returns `true` if no feature is supported.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Iterates over the supported features.
    pub fn iter(self) -> impl Iterator<Item = Feature> {
        Feature::ALL.into_iter().filter(move |f| self.contains(*f))
    }
}

impl FromIterator<Feature> for FeatureSet {
    fn from_iter<I: IntoIterator<Item = Feature>>(iter: I) -> Self {
        iter.into_iter().fold(Self::empty(), Self::with)
    }
}

impl fmt::Display for FeatureSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.iter().map(Feature::name).collect();
        write!(f, "{{{}}}", names.join(", "))
    }
}
