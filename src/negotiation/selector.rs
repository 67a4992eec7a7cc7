//! Best-fit decoder selection.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::entry::PreferenceEntry;
use super::ranking::AcceptList;
use super::WILDCARD;

/// Decoder family chosen for a request body
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DecodeType {
    /// The header matched no registered family
    #[default]
    Unknown,
    /// Decode the body as JSON
    Json,
}

impl DecodeType {
    /// Lowercase name of the family
    pub fn as_str(&self) -> &'static str {
        match self {
            DecodeType::Unknown => "unknown",
            DecodeType::Json => "json",
        }
    }
}

impl fmt::Display for DecodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DecodeType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "unknown" => Ok(DecodeType::Unknown),
            "json" => Ok(DecodeType::Json),
            _ => Err(format!("Unknown decode type: {s}")),
        }
    }
}

/// A registered `(type, subtype)` pair and the decoder that handles it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecoderFamily {
    /// Primary type, e.g. `application`
    pub media_type: String,
    /// Subtype, e.g. `json`
    pub subtype: String,
    /// Decoder to use when this family matches
    pub decode_type: DecodeType,
}

impl DecoderFamily {
    /// Create a family
    pub fn new(media_type: &str, subtype: &str, decode_type: DecodeType) -> Self {
        Self {
            media_type: media_type.to_string(),
            subtype: subtype.to_string(),
            decode_type,
        }
    }

    /// Does a preference entry accept this family.
    ///
    /// The type must match exactly; the subtype may be `*`.
    pub fn accepts(&self, entry: &PreferenceEntry) -> bool {
        entry.media_type == self.media_type
            && (entry.subtype == self.subtype || entry.subtype == WILDCARD)
    }
}

/// Ordered set of decoder families plus the default used for `*/*` and for
/// requests without a preference header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecoderRegistry {
    families: Vec<DecoderFamily>,
    default: DecodeType,
}

impl Default for DecoderRegistry {
    fn default() -> Self {
        Self::new(DecodeType::Json).register("application", "json", DecodeType::Json)
    }
}

impl DecoderRegistry {
    /// Create an empty registry with the given default family
    pub fn new(default: DecodeType) -> Self {
        Self {
            families: Vec::new(),
            default,
        }
    }

    /// Register a family. Earlier registrations are tried first.
    pub fn register(mut self, media_type: &str, subtype: &str, decode_type: DecodeType) -> Self {
        self.families
            .push(DecoderFamily::new(media_type, subtype, decode_type));
        self
    }

    /// Default family
    pub fn default_type(&self) -> DecodeType {
        self.default
    }

    /// Registered families in registration order
    pub fn families(&self) -> &[DecoderFamily] {
        &self.families
    }

    /// First family the entry accepts
    pub fn lookup(&self, entry: &PreferenceEntry) -> Option<DecodeType> {
        self.families
            .iter()
            .find(|family| family.accepts(entry))
            .map(|family| family.decode_type)
    }
}

/// Picks a decoder family for Accept-family headers.
///
/// Built once from a [`DecoderRegistry`] and shared read-only.
///
/// # Example
///
/// ```
/// use conneg::negotiation::{DecodeType, Negotiator};
///
/// let negotiator = Negotiator::default();
/// assert_eq!(negotiator.negotiate(""), DecodeType::Json);
/// assert_eq!(negotiator.negotiate("text/html"), DecodeType::Unknown);
/// assert_eq!(
///     negotiator.negotiate("application/xml;q=0.9, application/json;q=0.8"),
///     DecodeType::Json
/// );
/// ```
#[derive(Debug, Clone, Default)]
pub struct Negotiator {
    registry: DecoderRegistry,
}

impl Negotiator {
    /// Create a negotiator over a registry
    pub fn new(registry: DecoderRegistry) -> Self {
        Self { registry }
    }

    /// Registry this negotiator selects from
    pub fn registry(&self) -> &DecoderRegistry {
        &self.registry
    }

    /// Parse, rank and select for a raw header value. Never fails.
    pub fn negotiate(&self, header: &str) -> DecodeType {
        self.select(&AcceptList::parse(header))
    }

    /// Walk a ranked list and return the first acceptable family.
    ///
    /// The `*/*` check happens per entry in rank order, so a preferred
    /// concrete range that matches nothing is passed over before a later
    /// wildcard is reached.
    ///
    /// A header that is absent or blank resolves to the default family. A
    /// header whose ranges were all dropped as malformed resolves to
    /// [`DecodeType::Unknown`].
    pub fn select(&self, accepted: &AcceptList) -> DecodeType {
        let default = self.registry.default;
        if accepted.is_absent() {
            tracing::debug!(decode_type = %default, "no preferences, using default");
            return default;
        }

        for entry in accepted {
            if entry.is_wildcard() {
                tracing::debug!(decode_type = %default, "wildcard range, using default");
                return default;
            }
            if let Some(decode_type) = self.registry.lookup(entry) {
                tracing::debug!(%decode_type, range = %entry.essence(), "matched decoder family");
                return decode_type;
            }
        }

        tracing::debug!(
            count = accepted.len(),
            dropped = accepted.dropped(),
            "no acceptable decoder family"
        );
        DecodeType::Unknown
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_registry() {
        let registry = DecoderRegistry::default();
        assert_eq!(registry.default_type(), DecodeType::Json);
        assert_eq!(registry.families().len(), 1);
        assert_eq!(registry.families()[0].media_type, "application");
        assert_eq!(registry.families()[0].subtype, "json");
    }

    #[test]
    fn test_family_accepts() {
        let family = DecoderFamily::new("application", "json", DecodeType::Json);
        assert!(family.accepts(&PreferenceEntry::new("application", "json", 0)));
        assert!(family.accepts(&PreferenceEntry::new("application", "*", 0)));
        assert!(!family.accepts(&PreferenceEntry::new("application", "xml", 0)));
        assert!(!family.accepts(&PreferenceEntry::new("*", "json", 0)));
        assert!(!family.accepts(&PreferenceEntry::new("Application", "json", 0)));
    }

    #[test]
    fn test_negotiate_basic() {
        let negotiator = Negotiator::default();
        assert_eq!(negotiator.negotiate(""), DecodeType::Json);
        assert_eq!(negotiator.negotiate("*/*"), DecodeType::Json);
        assert_eq!(negotiator.negotiate("application/json"), DecodeType::Json);
        assert_eq!(negotiator.negotiate("application/*"), DecodeType::Json);
        assert_eq!(negotiator.negotiate("text/html"), DecodeType::Unknown);
    }

    #[test]
    fn test_walk_falls_through_unsupported() {
        let negotiator = Negotiator::default();
        assert_eq!(
            negotiator.negotiate("application/xml;q=0.9, application/json;q=0.8"),
            DecodeType::Json
        );
    }

    #[test]
    fn test_wildcard_reached_after_unsupported() {
        let negotiator = Negotiator::default();
        assert_eq!(negotiator.negotiate("text/html, */*;q=0.1"), DecodeType::Json);
    }

    #[test]
    fn test_zero_quality_still_matches() {
        // q=0 ranks last but is not treated as a refusal
        let negotiator = Negotiator::default();
        assert_eq!(negotiator.negotiate("application/json;q=0"), DecodeType::Json);
    }

    #[test]
    fn test_entirely_malformed_header_is_unknown() {
        let negotiator = Negotiator::default();
        assert_eq!(negotiator.negotiate("a/b/c"), DecodeType::Unknown);
        assert_eq!(negotiator.negotiate("application/json;q=-1"), DecodeType::Unknown);
        assert_eq!(negotiator.negotiate(";"), DecodeType::Unknown);

        // no range tokens at all means no header
        assert_eq!(negotiator.negotiate("   "), DecodeType::Json);
        assert_eq!(negotiator.negotiate(""), DecodeType::Json);
    }

    #[test]
    fn test_select_absent_vs_dropped() {
        let negotiator = Negotiator::default();

        let absent = AcceptList::parse("");
        assert!(absent.is_absent());
        assert_eq!(negotiator.select(&absent), DecodeType::Json);

        let dropped = AcceptList::parse("a/b/c, text/html;level");
        assert!(dropped.is_empty());
        assert!(!dropped.is_absent());
        assert_eq!(dropped.dropped(), 2);
        assert_eq!(negotiator.select(&dropped), DecodeType::Unknown);
    }

    #[test]
    fn test_empty_registry() {
        let negotiator = Negotiator::new(DecoderRegistry::new(DecodeType::Unknown));
        assert_eq!(negotiator.negotiate(""), DecodeType::Unknown);
        assert_eq!(negotiator.negotiate("application/json"), DecodeType::Unknown);
    }

    #[test]
    fn test_additional_family() {
        let registry =
            DecoderRegistry::default().register("application", "vnd.api+json", DecodeType::Json);
        let negotiator = Negotiator::new(registry);
        assert_eq!(negotiator.negotiate("application/vnd.api+json"), DecodeType::Json);
    }

    #[test]
    fn test_decode_type_parse_and_display() {
        assert_eq!("json".parse::<DecodeType>().unwrap(), DecodeType::Json);
        assert_eq!("JSON".parse::<DecodeType>().unwrap(), DecodeType::Json);
        assert!("xml".parse::<DecodeType>().is_err());
        assert_eq!(DecodeType::Unknown.to_string(), "unknown");
    }
}
