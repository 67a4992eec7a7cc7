//! Media-range splitting.
//!
//! Turns a raw header value into individual range tokens, and each token into
//! a type/subtype pair plus its (still unparsed) parameter tokens.

use super::error::ParseError;
use super::WILDCARD;

/// Split a header value on `,`, keeping each token's index in the header.
///
/// An empty or all-whitespace header yields no tokens at all, so an absent
/// header and an empty one behave the same.
pub fn split_header(header: &str) -> impl Iterator<Item = (usize, &str)> {
    let tokens = if header.trim().is_empty() {
        None
    } else {
        Some(header.split(','))
    };

    tokens.into_iter().flatten().enumerate()
}

/// One media range with its type/subtype resolved
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaRange<'a> {
    /// Primary type, or `*`
    pub media_type: &'a str,
    /// Subtype, or `*`
    pub subtype: &'a str,
    /// Parameter tokens following the type/subtype, untrimmed
    pub params: Vec<&'a str>,
}

impl<'a> MediaRange<'a> {
    /// Parse a single range token such as `text/html; level=1; q=0.5`.
    ///
    /// A missing subtype becomes `*`; blank type or subtype become `*`.
    pub fn parse(token: &'a str) -> Result<Self, ParseError> {
        let mut pieces = token.split(';');
        // split always yields at least one piece
        let type_subtype = pieces.next().unwrap_or_default();

        let mut segments = type_subtype.split('/');
        let media_type = segments.next().unwrap_or_default();
        let subtype = segments.next().unwrap_or(WILDCARD);
        if segments.next().is_some() {
            return Err(ParseError::MalformedTypeSubtype(type_subtype.to_string()));
        }

        Ok(Self {
            media_type: or_wildcard(media_type),
            subtype: or_wildcard(subtype),
            params: pieces.collect(),
        })
    }

    /// Is this the universal `*/*` range
    pub fn is_wildcard(&self) -> bool {
        self.media_type == WILDCARD && self.subtype == WILDCARD
    }
}

fn or_wildcard(segment: &str) -> &str {
    let segment = segment.trim();
    if segment.is_empty() {
        WILDCARD
    } else {
        segment
    }
}
