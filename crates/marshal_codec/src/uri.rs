use alloc::borrow::Cow;
use alloc::format;
use alloc::string::String;

// -----------------------------------------------------------------------------
// UriResolution

/// How relative URIs are rewritten on output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum UriResolution {
    /// Written as given.
    #[default]
    None,
    /// Prefixed with the context root, e.g. `/app/foo`.
    RootRelative,
    /// Prefixed with the authority and context root, e.g.
    /// `http://host:8080/app/foo`.
    Absolute,
}

// -----------------------------------------------------------------------------
// UriContext

/// The location relative URIs are resolved against.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UriContext {
    /// Scheme and host, e.g. `http://localhost:8080`.
    pub authority: Option<String>,
    /// Path prefix, e.g. `/app`.
    pub context_root: Option<String>,
}

// -----------------------------------------------------------------------------
// UriResolver

/// Rewrites URI values according to a [`UriResolution`].
///
/// URIs that carry a scheme (`http:`, `mailto:`, ...) are never
/// rewritten.
///
/// # Examples
///
/// ```
/// use marshal_codec::{UriContext, UriResolution, UriResolver};
///
/// let context = UriContext {
///     authority: Some("http://host".into()),
///     context_root: Some("/app".into()),
/// };
/// let resolver = UriResolver::new(UriResolution::Absolute, context);
/// assert_eq!(resolver.resolve("foo/bar"), "http://host/app/foo/bar");
/// assert_eq!(resolver.resolve("/foo"), "http://host/app/foo");
/// assert_eq!(resolver.resolve("https://x/y"), "https://x/y");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UriResolver {
    resolution: UriResolution,
    context: UriContext,
}

impl UriResolver {
    pub fn new(resolution: UriResolution, context: UriContext) -> Self {
        Self {
            resolution,
            context,
        }
    }

    #[inline]
    pub fn resolution(&self) -> UriResolution {
        self.resolution
    }

    pub fn resolve<'a>(&self, uri: &'a str) -> Cow<'a, str> {
        if self.resolution == UriResolution::None || has_scheme(uri) {
            return Cow::Borrowed(uri);
        }
        let root = self.context.context_root.as_deref().unwrap_or("");
        let root = root.trim_end_matches('/');
        let path = uri.trim_start_matches('/');
        let relative = format!("{root}/{path}");
        match (self.resolution, &self.context.authority) {
            (UriResolution::Absolute, Some(authority)) => {
                Cow::Owned(format!("{}{relative}", authority.trim_end_matches('/')))
            }
            _ => Cow::Owned(relative),
        }
    }
}

/// Returns `true` for `scheme:rest`, where the scheme is an ASCII letter
/// followed by letters, digits, `+`, `-` or `.`.
fn has_scheme(uri: &str) -> bool {
    let Some((scheme, _)) = uri.split_once(':') else {
        return false;
    };
    let mut chars = scheme.chars();
    chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::{UriContext, UriResolution, UriResolver};

    #[test]
    fn none_leaves_uris_alone() {
        let resolver = UriResolver::default();
        assert_eq!(resolver.resolve("foo"), "foo");
    }

    #[test]
    fn root_relative() {
        let context = UriContext {
            authority: Some("http://host".into()),
            context_root: Some("/app/".into()),
        };
        let resolver = UriResolver::new(UriResolution::RootRelative, context);
        assert_eq!(resolver.resolve("foo"), "/app/foo");
        assert_eq!(resolver.resolve("mailto:a@b"), "mailto:a@b");
    }

    #[test]
    fn absolute_without_authority_is_root_relative() {
        let resolver = UriResolver::new(UriResolution::Absolute, UriContext::default());
        assert_eq!(resolver.resolve("foo"), "/foo");
    }
}
