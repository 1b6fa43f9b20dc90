use chrono::{DateTime, Utc};

use crate::{error::ProtoError, proto};

const NANOS_PER_SECOND: u32 = 1_000_000_000;

/// Converts a timestamp into its wire form.
///
/// A leap second instant is folded into the following second, so `nanos`
/// is always below one second.
pub fn to_proto(time: &DateTime<Utc>) -> proto::Timestamp {
    let nanos = time.timestamp_subsec_nanos();
    proto::Timestamp {
        seconds: time.timestamp() + i64::from(nanos / NANOS_PER_SECOND),
        nanos: (nanos % NANOS_PER_SECOND) as i32,
    }
}

/// Converts a wire timestamp back, rejecting missing or out-of-range values.
pub fn from_proto(
    ts: Option<proto::Timestamp>,
    field: &'static str,
) -> Result<DateTime<Utc>, ProtoError> {
    let ts = ts.ok_or(ProtoError::MissingField(field))?;
    if !(0..NANOS_PER_SECOND as i32).contains(&ts.nanos) {
        return Err(ProtoError::InvalidTimestamp {
            seconds: ts.seconds,
            nanos: ts.nanos,
        });
    }
    DateTime::<Utc>::from_timestamp(ts.seconds, ts.nanos as u32).ok_or(
        ProtoError::InvalidTimestamp {
            seconds: ts.seconds,
            nanos: ts.nanos,
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_roundtrip_keeps_nanos() {
        let t = Utc.timestamp_opt(1_700_000_000, 123_456_789).unwrap();
        let back = from_proto(Some(to_proto(&t)), "time").unwrap();
        assert_eq!(back, t);
    }

    #[test]
    fn test_leap_second_is_folded() {
        // 2016-12-31T23:59:60.5Z
        let leap = Utc.timestamp_opt(1_483_228_799, 1_500_000_000).unwrap();

        let pb = to_proto(&leap);
        assert_eq!(pb, proto::Timestamp { seconds: 1_483_228_800, nanos: 500_000_000 });

        let back = from_proto(Some(pb.clone()), "time").unwrap();
        assert_eq!(back, Utc.timestamp_opt(1_483_228_800, 500_000_000).unwrap());
        assert_eq!(to_proto(&back), pb);
    }

    #[test]
    fn test_missing_timestamp() {
        assert_eq!(
            from_proto(None, "timestamp"),
            Err(ProtoError::MissingField("timestamp"))
        );
    }

    #[test]
    fn test_rejects_bad_nanos() {
        let ts = proto::Timestamp { seconds: 10, nanos: -1 };
        assert!(matches!(
            from_proto(Some(ts), "time"),
            Err(ProtoError::InvalidTimestamp { seconds: 10, nanos: -1 })
        ));
    }
}
