//! Swaps for `SystemTime` and `Duration`, both as milliseconds.

use alloc::format;
use alloc::string::{String, ToString};
use std::sync::LazyLock;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use crate::info::TypeHandle;
use crate::swap::{Swap, SwapError};
use crate::value::{Object, Value};

static SYSTEM_TIME: LazyLock<TypeHandle> =
    LazyLock::new(|| TypeHandle::object::<SystemTime>("SystemTime"));

static DURATION: LazyLock<TypeHandle> =
    LazyLock::new(|| TypeHandle::object::<Duration>("Duration"));

/// The handle of [`SystemTime`] values.
pub fn system_time_type() -> TypeHandle {
    SYSTEM_TIME.clone()
}

/// The handle of [`Duration`] values.
pub fn duration_type() -> TypeHandle {
    DURATION.clone()
}

impl Object for SystemTime {
    fn type_handle(&self) -> TypeHandle {
        system_time_type()
    }

    fn to_text(&self) -> String {
        format!("{self:?}")
    }
}

impl Object for Duration {
    fn type_handle(&self) -> TypeHandle {
        duration_type()
    }

    fn to_text(&self) -> String {
        format!("{}ms", self.as_millis())
    }
}

fn saturating_millis(duration: Duration) -> i64 {
    i64::try_from(duration.as_millis()).unwrap_or(i64::MAX)
}

fn expect_millis(value: &Value, target: &TypeHandle) -> Result<i64, SwapError> {
    value.as_i64().ok_or_else(|| SwapError::Unswap {
        target: target.to_string(),
        reason: format!("expected integer milliseconds, found {}", value.kind_name()),
    })
}

// -----------------------------------------------------------------------------
// EpochMillisSwap

/// Swaps a [`SystemTime`] for signed milliseconds since the Unix epoch.
///
/// Sub-millisecond precision is dropped.
#[derive(Debug, Clone, Copy, Default)]
pub struct EpochMillisSwap;

impl Swap for EpochMillisSwap {
    fn swapped_type(&self) -> TypeHandle {
        TypeHandle::integer()
    }

    fn swap(&self, value: &Value) -> Result<Value, SwapError> {
        let Some(time) = value.as_object().and_then(|o| o.downcast_ref::<SystemTime>()) else {
            return Err(SwapError::Unexpected {
                swap: "EpochMillisSwap",
                found: value.kind_name(),
            });
        };
        let millis = match time.duration_since(UNIX_EPOCH) {
            Ok(after) => saturating_millis(after),
            Err(before) => -saturating_millis(before.duration()),
        };
        Ok(Value::from(millis))
    }

    fn unswap(&self, value: &Value, target: &TypeHandle) -> Result<Value, SwapError> {
        let millis = expect_millis(value, target)?;
        let offset = Duration::from_millis(millis.unsigned_abs());
        let time = if millis >= 0 {
            UNIX_EPOCH.checked_add(offset)
        } else {
            UNIX_EPOCH.checked_sub(offset)
        };
        let time = time.ok_or_else(|| SwapError::Unswap {
            target: target.to_string(),
            reason: format!("{millis}ms is out of range"),
        })?;
        Ok(Value::object(time))
    }
}

// -----------------------------------------------------------------------------
// DurationMillisSwap

/// Swaps a [`Duration`] for its length in milliseconds.
#[derive(Debug, Clone, Copy, Default)]
pub struct DurationMillisSwap;

impl Swap for DurationMillisSwap {
    fn swapped_type(&self) -> TypeHandle {
        TypeHandle::integer()
    }

    fn swap(&self, value: &Value) -> Result<Value, SwapError> {
        match value.as_object().and_then(|o| o.downcast_ref::<Duration>()) {
            Some(duration) => Ok(Value::from(saturating_millis(*duration))),
            None => Err(SwapError::Unexpected {
                swap: "DurationMillisSwap",
                found: value.kind_name(),
            }),
        }
    }

    fn unswap(&self, value: &Value, target: &TypeHandle) -> Result<Value, SwapError> {
        let millis = expect_millis(value, target)?;
        let millis = u64::try_from(millis).map_err(|_| SwapError::Unswap {
            target: target.to_string(),
            reason: format!("negative duration {millis}ms"),
        })?;
        Ok(Value::object(Duration::from_millis(millis)))
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use std::time::{Duration, SystemTime, UNIX_EPOCH};

    use super::{DurationMillisSwap, EpochMillisSwap, system_time_type};
    use crate::swap::{Swap, SwapError};
    use crate::value::Value;

    #[test]
    fn epoch_millis_both_sides_of_epoch() {
        let swap = EpochMillisSwap;
        let after = UNIX_EPOCH + Duration::from_millis(1_700_000_000_123);
        let before = UNIX_EPOCH - Duration::from_millis(5);

        assert_eq!(swap.swap(&Value::object(after)), Ok(Value::from(1_700_000_000_123_i64)));
        assert_eq!(swap.swap(&Value::object(before)), Ok(Value::from(-5)));

        let back = swap
            .unswap(&Value::from(-5), &system_time_type())
            .unwrap();
        assert_eq!(back.as_object().unwrap().downcast_ref::<SystemTime>(), Some(&before));
    }

    #[test]
    fn wrong_input_is_rejected() {
        assert!(matches!(
            EpochMillisSwap.swap(&Value::from("now")),
            Err(SwapError::Unexpected { found: "string", .. })
        ));
        assert!(matches!(
            DurationMillisSwap.unswap(&Value::from(-1), &system_time_type()),
            Err(SwapError::Unswap { .. })
        ));
    }
}
