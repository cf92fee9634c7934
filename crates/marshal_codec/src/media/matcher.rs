use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::fmt;

use dashmap::DashMap;

use super::{MediaRange, MediaType, MediaTypeHandler};
use crate::de::Parser;
use crate::ser::Serializer;

/// Serializers dispatched by `Accept` header.
pub type SerializerGroup = FormatMatcher<dyn Serializer>;

/// Parsers dispatched by `Content-Type` header.
pub type ParserGroup = FormatMatcher<dyn Parser>;

// -----------------------------------------------------------------------------
// FormatMatch

/// The handler chosen for a header, with the media type it matched on.
pub struct FormatMatch<H: ?Sized> {
    media_type: MediaType,
    handler: Arc<H>,
}

impl<H: ?Sized> FormatMatch<H> {
    #[inline]
    pub fn media_type(&self) -> &MediaType {
        &self.media_type
    }

    #[inline]
    pub fn handler(&self) -> &Arc<H> {
        &self.handler
    }
}

impl<H: ?Sized> fmt::Debug for FormatMatch<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormatMatch")
            .field("media_type", &self.media_type)
            .finish_non_exhaustive()
    }
}

// -----------------------------------------------------------------------------
// FormatMatcherBuilder

/// Collects handler batches for a [`FormatMatcher`].
///
/// Each [`add`](Self::add) call prepends its batch, so handlers added
/// later take priority. Order within one batch is kept.
pub struct FormatMatcherBuilder<H: ?Sized> {
    batches: Vec<Vec<Arc<H>>>,
}

impl<H: ?Sized + MediaTypeHandler> FormatMatcherBuilder<H> {
    pub fn new() -> Self {
        Self {
            batches: Vec::new(),
        }
    }

    pub fn add(mut self, batch: impl IntoIterator<Item = Arc<H>>) -> Self {
        self.batches.insert(0, batch.into_iter().collect());
        self
    }

    pub fn build(self) -> FormatMatcher<H> {
        let handlers: Vec<Arc<H>> = self.batches.into_iter().flatten().collect();
        let entries = handlers
            .iter()
            .flat_map(|handler| {
                handler
                    .media_types()
                    .iter()
                    .map(move |ty| (ty.clone(), Arc::clone(handler)))
            })
            .collect();
        FormatMatcher {
            handlers,
            entries,
            cache: DashMap::new(),
        }
    }
}

// -----------------------------------------------------------------------------
// FormatMatcher

/// Resolves media-type headers to registered handlers.
///
/// Handlers are immutable once built. Successful lookups are cached per
/// header string; concurrent lookups of the same header converge on one
/// shared [`FormatMatch`]. Misses are not cached.
pub struct FormatMatcher<H: ?Sized> {
    handlers: Vec<Arc<H>>,
    /// Every (media type, handler) pair in priority order.
    entries: Vec<(MediaType, Arc<H>)>,
    cache: DashMap<String, Arc<FormatMatch<H>>>,
}

impl<H: ?Sized + MediaTypeHandler> FormatMatcher<H> {
    pub fn builder() -> FormatMatcherBuilder<H> {
        FormatMatcherBuilder::new()
    }

    /// Finds the handler for a `Content-Type` or `Accept` header.
    ///
    /// Ranges are tried in quality order; for each, the most specific
    /// matching entry wins, the higher-priority handler breaking ties.
    /// Malformed headers match nothing.
    pub fn resolve(&self, header: &str) -> Option<Arc<FormatMatch<H>>> {
        if let Some(hit) = self.cache.get(header) {
            log::trace!("media type cache hit for '{header}'");
            return Some(Arc::clone(hit.value()));
        }

        let found = self.find(header)?;
        let entry = self
            .cache
            .entry(String::from(header))
            .or_insert_with(|| Arc::new(found));
        Some(Arc::clone(entry.value()))
    }

    fn find(&self, header: &str) -> Option<FormatMatch<H>> {
        let ranges = match MediaRange::parse_list(header) {
            Ok(ranges) => ranges,
            Err(err) => {
                log::debug!("unparseable media type header '{header}': {err}");
                return None;
            }
        };

        for range in &ranges {
            let mut best: Option<(u8, &(MediaType, Arc<H>))> = None;
            for entry in &self.entries {
                let Some(score) = entry.0.match_score(range.media_type()) else {
                    continue;
                };
                if best.is_none_or(|(top, _)| score > top) {
                    best = Some((score, entry));
                }
            }
            if let Some((_, (media_type, handler))) = best {
                return Some(FormatMatch {
                    media_type: media_type.clone(),
                    handler: Arc::clone(handler),
                });
            }
        }

        log::debug!("no handler matches media type '{header}'");
        None
    }

    /// Registered handlers in priority order.
    pub fn handlers(&self) -> &[Arc<H>] {
        &self.handlers
    }

    /// Every media type served, in priority order.
    pub fn supported_media_types(&self) -> impl Iterator<Item = &MediaType> {
        self.entries.iter().map(|(ty, _)| ty)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Number of cached header lookups.
    #[inline]
    pub fn cached(&self) -> usize {
        self.cache.len()
    }
}

impl<H: ?Sized> fmt::Debug for FormatMatcher<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.entries.iter().map(|(ty, _)| ty))
            .finish()
    }
}

// -----------------------------------------------------------------------------
// Tests
