//! The `google.protobuf.Timestamp` well-known type.

use std::sync::{Arc, OnceLock};

use chrono::{DateTime, Utc};

use crate::dynamic::DynamicMessage;
use crate::error::SchemaError;
use crate::field::{FieldDescriptor, FieldType, Label};
use crate::message::MessageDescriptor;
use crate::scalar::Scalar;

/// Full name of the timestamp message type.
pub const TIMESTAMP_TYPE_NAME: &str = "google.protobuf.Timestamp";

const NANOS_PER_SECOND: i64 = 1_000_000_000;
const MAX_NANOS: u32 = 999_999_999;

/// A point in time as seconds and nanoseconds since the Unix epoch.
///
/// Messages of this type are represented by codecs as native date/time
/// values instead of nested maps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct Timestamp {
    pub seconds: i64,
    pub nanos: i32,
}

impl Timestamp {
    pub fn new(seconds: i64, nanos: i32) -> Self {
        Self { seconds, nanos }
    }

    /// The shared descriptor of the timestamp type.
    pub fn descriptor() -> Arc<MessageDescriptor> {
        static DESCRIPTOR: OnceLock<Arc<MessageDescriptor>> = OnceLock::new();
        let descriptor = DESCRIPTOR.get_or_init(|| {
            let fields = vec![
                plain_field("seconds", 0, FieldType::Int64),
                plain_field("nanos", 1, FieldType::Int32),
            ];
            Arc::new(MessageDescriptor::from_parts(
                TIMESTAMP_TYPE_NAME.to_owned(),
                fields,
            ))
        });
        Arc::clone(descriptor)
    }

    /// Whether `descriptor` is the timestamp type.
    ///
    /// The type name is reserved by [`MessageDescriptor::builder`], so the
    /// name alone identifies it.
    pub fn is_timestamp(descriptor: &MessageDescriptor) -> bool {
        descriptor.full_name() == TIMESTAMP_TYPE_NAME
    }

    /// Reads a timestamp out of a message of the timestamp type.
    pub fn from_message(message: &DynamicMessage) -> Result<Self, SchemaError> {
        let seconds = match message.get("seconds")? {
            Scalar::Int64(v) => *v,
            other => return Err(mismatch("seconds", "int64", other)),
        };
        let nanos = match message.get("nanos")? {
            Scalar::Int32(v) => *v,
            other => return Err(mismatch("nanos", "int32", other)),
        };
        Ok(Self { seconds, nanos })
    }

    /// Writes this timestamp into `message`, which must be of the timestamp
    /// type.
    pub fn write_to(&self, message: &mut DynamicMessage) -> Result<(), SchemaError> {
        message.set("seconds", self.seconds)?;
        message.set("nanos", self.nanos)
    }

    pub fn to_message(&self) -> DynamicMessage {
        DynamicMessage::from_scalars(
            Self::descriptor(),
            [Scalar::Int64(self.seconds), Scalar::Int32(self.nanos)],
        )
    }

    /// Carries out-of-range nanoseconds into the seconds, leaving
    /// `0 <= nanos < 1e9`. `None` on seconds overflow.
    pub fn normalized(self) -> Option<Self> {
        let nanos = i64::from(self.nanos);
        let seconds = self.seconds.checked_add(nanos.div_euclid(NANOS_PER_SECOND))?;
        let nanos = nanos.rem_euclid(NANOS_PER_SECOND) as i32;
        Some(Self { seconds, nanos })
    }

    /// The instant of `value`. A leap second is clamped to the last
    /// nanosecond of the preceding second.
    pub fn from_datetime(value: &DateTime<Utc>) -> Self {
        let nanos = value.timestamp_subsec_nanos().min(MAX_NANOS);
        Self {
            seconds: value.timestamp(),
            nanos: nanos as i32,
        }
    }

    /// The instant as a native date/time, `None` if it is outside the range
    /// `chrono` can represent.
    pub fn to_datetime(&self) -> Option<DateTime<Utc>> {
        let normalized = self.normalized()?;
        DateTime::from_timestamp(normalized.seconds, normalized.nanos as u32)
    }
}

fn plain_field(name: &str, index: usize, field_type: FieldType) -> FieldDescriptor {
    FieldDescriptor {
        name: name.to_owned(),
        index,
        field_type,
        label: Label::Singular,
        message_type: None,
    }
}

fn mismatch(field: &str, expected: &'static str, found: &Scalar) -> SchemaError {
    SchemaError::TypeMismatch {
        field: field.to_owned(),
        expected,
        found: found.kind().as_str(),
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(value: DateTime<Utc>) -> Self {
        Self::from_datetime(&value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Timelike};

    #[test]
    fn descriptor_is_shared_and_recognised() {
        let a = Timestamp::descriptor();
        let b = Timestamp::descriptor();
        assert!(Arc::ptr_eq(&a, &b));
        assert!(Timestamp::is_timestamp(&a));
        assert_eq!(a.full_name(), TIMESTAMP_TYPE_NAME);
        let names: Vec<&str> = a.fields().iter().map(|f| f.name()).collect();
        assert_eq!(names, vec!["seconds", "nanos"]);
    }

    #[test]
    fn message_roundtrip() {
        let ts = Timestamp::new(1_689_235_200, 123_456_789);
        let msg = ts.to_message();
        assert_eq!(msg.get("seconds").unwrap(), &Scalar::Int64(1_689_235_200));
        assert_eq!(msg.get("nanos").unwrap(), &Scalar::Int32(123_456_789));
        assert_eq!(Timestamp::from_message(&msg).unwrap(), ts);
    }

    #[test]
    fn datetime_conversion_keeps_nanoseconds() {
        let dt = Utc
            .with_ymd_and_hms(2023, 7, 13, 8, 0, 0)
            .unwrap()
            .checked_add_signed(chrono::Duration::nanoseconds(987_654_321))
            .unwrap();
        let ts = Timestamp::from(dt);
        assert_eq!(ts.nanos, 987_654_321);
        assert_eq!(ts.to_datetime(), Some(dt));
    }

    #[test]
    fn pre_epoch_instants() {
        let dt = Utc.with_ymd_and_hms(1969, 12, 31, 23, 59, 59).unwrap();
        let ts = Timestamp::from(dt);
        assert_eq!(ts, Timestamp::new(-1, 0));
        assert_eq!(ts.to_datetime(), Some(dt));
    }

    #[test]
    fn normalization_matrix() {
        assert_eq!(
            Timestamp::new(10, 1_500_000_000).normalized(),
            Some(Timestamp::new(11, 500_000_000))
        );
        assert_eq!(
            Timestamp::new(10, -1).normalized(),
            Some(Timestamp::new(9, 999_999_999))
        );
        assert_eq!(Timestamp::new(i64::MAX, 1_000_000_000).normalized(), None);
    }

    #[test]
    fn leap_second_is_clamped() {
        let leap = Utc
            .with_ymd_and_hms(2016, 12, 31, 23, 59, 59)
            .unwrap()
            .with_nanosecond(1_500_000_000)
            .unwrap();
        let ts = Timestamp::from(leap);
        assert_eq!(ts, Timestamp::new(1_483_228_799, 999_999_999));
        assert_eq!(ts.normalized(), Some(ts));
    }

    #[test]
    fn out_of_range_instant_has_no_datetime() {
        assert_eq!(Timestamp::new(i64::MAX, 0).to_datetime(), None);
    }
}
