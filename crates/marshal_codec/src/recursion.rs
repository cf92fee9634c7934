use alloc::borrow::Cow;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt::Write as _;

use marshal_reflect::{TypeHandle, Value};
use marshal_utils::IdentitySet;

use crate::config::{RecursionPolicy, TraverseConfig};
use crate::error::RecursionError;

// -----------------------------------------------------------------------------
// Guarded

/// Outcome of [`RecursionGuard::push`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub enum Guarded {
    /// A scalar. Nothing was pushed; do not pop.
    Untracked,
    /// The value was pushed; pop it when done.
    Entered,
    /// The value is already on the path. Nothing was pushed; write it as
    /// null.
    Recursion,
}

impl Guarded {
    #[inline]
    pub fn needs_pop(self) -> bool {
        self == Self::Entered
    }
}

// -----------------------------------------------------------------------------
// RecursionGuard

struct Frame {
    attr: Cow<'static, str>,
    identity: usize,
    type_name: String,
}

/// Tracks the path from the root of a walk to the current value.
///
/// Only shared values (containers, beans, objects) are tracked. Each
/// successful [`push`](Self::push) that returns [`Guarded::Entered`] must
/// be matched by exactly one [`pop`](Self::pop).
///
/// The depth limit applies under every policy, including
/// [`RecursionPolicy::Off`].
///
/// # Examples
///
/// ```
/// use marshal_codec::{Guarded, RecursionGuard, TraverseConfig};
/// use marshal_reflect::{MapRef, Value};
///
/// let mut guard = RecursionGuard::new(&TraverseConfig::default());
/// let map = Value::Map(MapRef::new());
/// let ty = map.runtime_type();
///
/// assert_eq!(guard.push("root", &map, &ty), Ok(Guarded::Entered));
/// assert_eq!(guard.push("self", &map, &ty), Ok(Guarded::Recursion));
/// guard.pop();
/// assert_eq!(guard.depth(), 0);
/// ```
pub struct RecursionGuard {
    policy: RecursionPolicy,
    max_depth: usize,
    stack: Vec<Frame>,
    identities: IdentitySet,
}

impl RecursionGuard {
    pub fn new(config: &TraverseConfig) -> Self {
        Self {
            policy: config.recursion(),
            max_depth: config.max_depth(),
            stack: Vec::new(),
            identities: IdentitySet::new(),
        }
    }

    /// Enters `value`, reached through the attribute `attr`.
    ///
    /// Fails if the path is already `max_depth` deep, or if `value` is on
    /// the path and the policy is [`RecursionPolicy::Fail`].
    pub fn push(
        &mut self,
        attr: impl Into<Cow<'static, str>>,
        value: &Value,
        ty: &TypeHandle,
    ) -> Result<Guarded, RecursionError> {
        let Some(identity) = value.identity() else {
            return Ok(Guarded::Untracked);
        };
        let frame = Frame {
            attr: attr.into(),
            identity,
            type_name: String::from(ty.name()),
        };

        if self.stack.len() >= self.max_depth {
            self.stack.push(frame);
            let stack = self.describe();
            self.stack.pop();
            return Err(RecursionError::DepthExceeded {
                max_depth: self.max_depth,
                stack,
            });
        }

        if self.policy.tracks_cycles() && self.identities.contains(identity) {
            self.stack.push(frame);
            let stack = self.describe();
            self.stack.pop();
            return match self.policy {
                RecursionPolicy::Fail => Err(RecursionError::Cycle { stack }),
                RecursionPolicy::Detect => {
                    log::warn!("Recursion occurred, stack={stack}");
                    Ok(Guarded::Recursion)
                }
                _ => Ok(Guarded::Recursion),
            };
        }

        if self.policy.tracks_cycles() {
            self.identities.insert(identity);
        }
        self.stack.push(frame);
        Ok(Guarded::Entered)
    }

    /// Leaves the value most recently entered.
    pub fn pop(&mut self) {
        if let Some(frame) = self.stack.pop() {
            // Untracked policies never inserted the identity.
            self.identities.remove(frame.identity);
        }
    }

    /// Number of values currently entered.
    #[inline]
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Renders the path, e.g. `[0]root:Person -> [1]friend:Person`.
    pub fn describe(&self) -> String {
        let mut out = String::new();
        for (depth, frame) in self.stack.iter().enumerate() {
            if depth > 0 {
                out.push_str(" -> ");
            }
            let _ = write!(out, "[{depth}]{}:{}", frame.attr, frame.type_name);
        }
        out
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use alloc::format;

    use marshal_reflect::{ListRef, MapRef, Value};

    use super::{Guarded, RecursionGuard};
    use crate::config::{RecursionPolicy, TraverseConfig};
    use crate::error::RecursionError;

    fn guard(policy: RecursionPolicy, max_depth: usize) -> RecursionGuard {
        RecursionGuard::new(
            &TraverseConfig::default()
                .with_recursion(policy)
                .with_max_depth(max_depth),
        )
    }

    #[test]
    fn scalars_are_untracked() {
        let mut guard = guard(RecursionPolicy::Fail, 0);
        let v = Value::from(1);
        assert_eq!(guard.push("x", &v, &v.runtime_type()), Ok(Guarded::Untracked));
        assert_eq!(guard.depth(), 0);
    }

    #[test]
    fn fail_policy_reports_path() {
        let mut guard = guard(RecursionPolicy::Fail, 10);
        let map = Value::Map(MapRef::new());
        let list = Value::Collection(ListRef::new());
        let ty = map.runtime_type();
        assert!(guard.push("root", &map, &ty).is_ok());
        assert!(guard.push("items", &list, &list.runtime_type()).is_ok());

        let err = guard.push("back", &map, &ty).unwrap_err();
        assert_eq!(
            err,
            RecursionError::Cycle {
                stack: "[0]root:Map -> [1]items:Collection -> [2]back:Map".into()
            }
        );
        assert_eq!(guard.depth(), 2);
    }

    #[test]
    fn siblings_are_not_cycles() {
        let mut guard = guard(RecursionPolicy::Fail, 10);
        let shared = Value::Map(MapRef::new());
        let ty = shared.runtime_type();
        for attr in ["a", "b"] {
            assert_eq!(guard.push(attr, &shared, &ty), Ok(Guarded::Entered));
            guard.pop();
        }
    }

    #[test]
    fn depth_limit_applies_when_off() {
        let mut guard = guard(RecursionPolicy::Off, 2);
        let map = Value::Map(MapRef::new());
        let ty = map.runtime_type();
        assert!(guard.push("a", &map, &ty).is_ok());
        assert!(guard.push("b", &map, &ty).is_ok());
        let err = guard.push("c", &map, &ty).unwrap_err();
        assert!(matches!(err, RecursionError::DepthExceeded { max_depth: 2, .. }));
        assert!(format!("{err}").starts_with("Depth too deep"));
    }
}
