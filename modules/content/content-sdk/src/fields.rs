//! Field values as seen by the permission layer.

use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

/// A record field the permitter can test, zero out, and render.
///
/// "Zero" is the value a denied read exposes and the value a write may
/// leave in a field it is not permitted to set.
pub trait FieldValue {
    fn is_zero(&self) -> bool;

    /// Text form, used for loader keys and ownership ids.
    fn text(&self) -> String;
}

impl FieldValue for String {
    fn is_zero(&self) -> bool {
        self.is_empty()
    }

    fn text(&self) -> String {
        self.clone()
    }
}

impl FieldValue for bool {
    fn is_zero(&self) -> bool {
        !*self
    }

    fn text(&self) -> String {
        self.to_string()
    }
}

macro_rules! impl_integer_field {
    ($($ty:ty),*) => {
        $(
            impl FieldValue for $ty {
                fn is_zero(&self) -> bool {
                    *self == 0
                }

                fn text(&self) -> String {
                    self.to_string()
                }
            }
        )*
    };
}

impl_integer_field!(i32, i64, u32, u64);

impl FieldValue for OffsetDateTime {
    fn is_zero(&self) -> bool {
        *self == Self::UNIX_EPOCH
    }

    fn text(&self) -> String {
        self.format(&Rfc3339).unwrap_or_default()
    }
}

impl<T: FieldValue> FieldValue for Option<T> {
    fn is_zero(&self) -> bool {
        self.as_ref().is_none_or(FieldValue::is_zero)
    }

    fn text(&self) -> String {
        self.as_ref().map(FieldValue::text).unwrap_or_default()
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn default_values_are_zero() {
        assert!(String::new().is_zero());
        assert!(0_i32.is_zero());
        assert!(false.is_zero());
        assert!(None::<String>.is_zero());
        assert!(OffsetDateTime::UNIX_EPOCH.is_zero());
    }

    #[test]
    fn some_zero_is_still_zero() {
        assert!(Some(String::new()).is_zero());
        assert!(!Some("x".to_owned()).is_zero());
    }

    #[test]
    fn timestamps_render_as_rfc3339() {
        let at = OffsetDateTime::from_unix_timestamp(86_400).unwrap();

        assert_eq!(at.text(), "1970-01-02T00:00:00Z");
    }
}
