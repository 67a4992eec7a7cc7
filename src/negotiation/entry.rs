//! Preference entries built from parsed media ranges.

use std::collections::BTreeMap;

use serde::Serialize;

use super::error::ParseError;
use super::media_range::MediaRange;
use super::WILDCARD;

/// Quality factor used when a range carries no `q` parameter
pub const DEFAULT_QUALITY: f64 = 1.0;

/// One ranked preference from an Accept-family header
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PreferenceEntry {
    /// Primary type, or `*`
    #[serde(rename = "type")]
    pub media_type: String,
    /// Subtype, or `*`
    pub subtype: String,
    /// Quality factor in `[0.0, 1.0]`
    pub quality: f64,
    /// Parameters other than `q`
    pub extensions: BTreeMap<String, String>,
    /// Index of the range within the header
    pub position: usize,
}

impl PreferenceEntry {
    /// Create an entry with default quality and no extensions
    pub fn new(media_type: &str, subtype: &str, position: usize) -> Self {
        Self {
            media_type: media_type.to_string(),
            subtype: subtype.to_string(),
            quality: DEFAULT_QUALITY,
            extensions: BTreeMap::new(),
            position,
        }
    }

    /// Build an entry from a parsed range.
    ///
    /// Every parameter must be `name=value`. A bad parameter rejects the
    /// whole entry rather than just the parameter.
    pub fn build(range: &MediaRange<'_>, position: usize) -> Result<Self, ParseError> {
        let mut entry = Self::new(range.media_type, range.subtype, position);

        for param in &range.params {
            let (name, value) = param
                .split_once('=')
                .ok_or_else(|| ParseError::InvalidParameter(param.to_string()))?;
            let (name, value) = (name.trim(), value.trim());

            if name == "q" {
                entry.quality = parse_quality(value)
                    .ok_or_else(|| ParseError::InvalidParameter(param.to_string()))?;
            } else {
                entry
                    .extensions
                    .insert(name.to_string(), value.to_string());
            }
        }

        Ok(entry)
    }

    /// Parse one range token into an entry, dropping it if it is malformed.
    pub fn parse(token: &str, position: usize) -> Option<Self> {
        match MediaRange::parse(token).and_then(|range| Self::build(&range, position)) {
            Ok(entry) => Some(entry),
            Err(e) => {
                tracing::debug!(position, "dropping media range: {e}");
                None
            },
        }
    }

    /// Is this the universal `*/*` range
    pub fn is_wildcard(&self) -> bool {
        self.media_type == WILDCARD && self.subtype == WILDCARD
    }

    /// Number of extension parameters
    pub fn extension_count(&self) -> usize {
        self.extensions.len()
    }

    /// `type/subtype` form of the entry
    pub fn essence(&self) -> String {
        format!("{}/{}", self.media_type, self.subtype)
    }
}

/// Parse a `q` value. Values above 1 clamp to 1; negative or NaN values are
/// rejected.
fn parse_quality(value: &str) -> Option<f64> {
    let quality: f64 = value.parse().ok()?;
    if quality.is_nan() || quality < 0.0 {
        return None;
    }
    if quality == 0.0 {
        // folds -0.0 into 0.0
        return Some(0.0);
    }
    Some(quality.min(1.0))
}
