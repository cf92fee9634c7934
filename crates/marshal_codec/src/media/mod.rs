//! Media types and handler dispatch.
//!
//! - [`MediaType`]: a parsed `type/subtype;param=value` string.
//! - [`MediaRange`]: one entry of an `Accept`-style list, with its
//!   quality value.
//! - [`FormatMatcher`]: resolves a header to the best registered handler,
//!   caching positive results.

// -----------------------------------------------------------------------------
// Modules

mod matcher;

// -----------------------------------------------------------------------------
// Exports

pub use matcher::{FormatMatch, FormatMatcher, FormatMatcherBuilder, ParserGroup, SerializerGroup};

use alloc::string::{String, ToString};
use alloc::vec;
use alloc::vec::Vec;
use core::cmp::Ordering;
use core::fmt;
use core::str::FromStr;

use thiserror::Error;

// -----------------------------------------------------------------------------
// MediaTypeHandler

/// A handler that declares the media types it serves.
pub trait MediaTypeHandler {
    /// Media types in order of preference. The first is the one a
    /// handler produces by default.
    fn media_types(&self) -> &[MediaType];
}

// -----------------------------------------------------------------------------
// MediaTypeError

/// A malformed media type.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum MediaTypeError {
    #[error("empty media type")]
    Empty,
    #[error("media type '{0}' has no subtype")]
    MissingSubtype(String),
    #[error("invalid media type parameter '{0}'")]
    InvalidParameter(String),
}

// -----------------------------------------------------------------------------
// MediaType

/// A media type such as `application/json;charset=utf-8`.
///
/// Type, subtype and parameter names are lowercased.
///
/// # Examples
///
/// ```
/// use marshal_codec::MediaType;
///
/// let ty: MediaType = "Application/JSON; charset=UTF-8".parse().unwrap();
/// assert_eq!(ty.essence(), "application/json");
/// assert_eq!(ty.param("charset"), Some("UTF-8"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MediaType {
    ty: String,
    subtype: String,
    params: Vec<(String, String)>,
}

impl MediaType {
    pub fn parse(text: &str) -> Result<Self, MediaTypeError> {
        let mut parts = text.split(';');
        let essence = parts.next().unwrap_or_default().trim();
        if essence.is_empty() {
            return Err(MediaTypeError::Empty);
        }
        let Some((ty, subtype)) = essence.split_once('/') else {
            return Err(MediaTypeError::MissingSubtype(String::from(essence)));
        };
        let (ty, subtype) = (ty.trim(), subtype.trim());
        if ty.is_empty() || subtype.is_empty() {
            return Err(MediaTypeError::MissingSubtype(String::from(essence)));
        }

        let mut params = Vec::new();
        for param in parts.map(str::trim).filter(|p| !p.is_empty()) {
            let Some((name, value)) = param.split_once('=') else {
                return Err(MediaTypeError::InvalidParameter(String::from(param)));
            };
            let name = name.trim().to_ascii_lowercase();
            if name.is_empty() {
                return Err(MediaTypeError::InvalidParameter(String::from(param)));
            }
            let value = value.trim().trim_matches('"');
            params.push((name, String::from(value)));
        }

        Ok(Self {
            ty: ty.to_ascii_lowercase(),
            subtype: subtype.to_ascii_lowercase(),
            params,
        })
    }

    /// `type/subtype`, without parameters.
    pub fn essence(&self) -> String {
        let mut out = String::with_capacity(self.ty.len() + self.subtype.len() + 1);
        out.push_str(&self.ty);
        out.push('/');
        out.push_str(&self.subtype);
        out
    }

    #[inline]
    pub fn ty(&self) -> &str {
        &self.ty
    }

    #[inline]
    pub fn subtype(&self) -> &str {
        &self.subtype
    }

    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn params(&self) -> &[(String, String)] {
        &self.params
    }

    /// How specifically this type matches a requested range.
    ///
    /// Returns 3 for the same type and subtype, 2 when either side has a
    /// wildcard subtype, 1 when either side is `*/*`, and `None` when
    /// they do not match. Parameters are ignored.
    pub fn match_score(&self, range: &MediaType) -> Option<u8> {
        let any = |t: &MediaType| t.ty == "*" && t.subtype == "*";
        if any(self) || any(range) {
            return Some(1);
        }
        if self.ty != range.ty {
            return None;
        }
        if self.subtype == range.subtype {
            Some(3)
        } else if self.subtype == "*" || range.subtype == "*" {
            Some(2)
        } else {
            None
        }
    }
}

impl FromStr for MediaType {
    type Err = MediaTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.ty, self.subtype)?;
        for (name, value) in &self.params {
            write!(f, ";{name}={value}")?;
        }
        Ok(())
    }
}

// -----------------------------------------------------------------------------
// MediaRange

/// One comma-separated entry of an `Accept` or `Content-Type` header.
#[derive(Debug, Clone, PartialEq)]
pub struct MediaRange {
    media_type: MediaType,
    q: f32,
}

impl MediaRange {
    #[inline]
    pub fn media_type(&self) -> &MediaType {
        &self.media_type
    }

    /// Quality value, 1.0 unless given.
    #[inline]
    pub fn q(&self) -> f32 {
        self.q
    }

    /// Parses a header into ranges, most preferred first.
    ///
    /// Ranges are ordered by descending `q`, keeping header order among
    /// equals. Ranges with `q=0` are dropped. An empty header accepts
    /// anything.
    ///
    /// # Examples
    ///
    /// ```
    /// use marshal_codec::MediaRange;
    ///
    /// let ranges = MediaRange::parse_list("text/html;q=0.5, application/json, text/xml;q=0").unwrap();
    /// let names: Vec<_> = ranges.iter().map(|r| r.media_type().essence()).collect();
    /// assert_eq!(names, ["application/json", "text/html"]);
    /// ```
    pub fn parse_list(header: &str) -> Result<Vec<MediaRange>, MediaTypeError> {
        if header.trim().is_empty() {
            let any = MediaType::parse("*/*")?;
            return Ok(vec![MediaRange { media_type: any, q: 1.0 }]);
        }

        let mut ranges = Vec::new();
        for part in header.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            let mut media_type = MediaType::parse(part)?;
            let mut q = 1.0_f32;
            if let Some(index) = media_type.params.iter().position(|(n, _)| n == "q") {
                let (_, value) = media_type.params.remove(index);
                q = value
                    .parse()
                    .map_err(|_| MediaTypeError::InvalidParameter(format_q(&value)))?;
            }
            if q > 0.0 {
                ranges.push(MediaRange { media_type, q });
            }
        }
        ranges.sort_by(|a, b| b.q.partial_cmp(&a.q).unwrap_or(Ordering::Equal));
        Ok(ranges)
    }
}

fn format_q(value: &str) -> String {
    let mut out = "q=".to_string();
    out.push_str(value);
    out
}

// -----------------------------------------------------------------------------
// Tests
