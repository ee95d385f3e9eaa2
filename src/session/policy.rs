use strum_macros::{Display, EnumString};

/// How the stored marker moves when a user logs out
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerKind {
    /// Monotonic logout counter
    Counter,
    /// Unix-millisecond floor; sessions issued at or before it are dead
    Timestamp,
}

impl MarkerKind {
    /// Next marker value after a logout. Never goes backwards.
    pub fn advance(&self, current: i64, now_ms: i64) -> i64 {
        match self {
            MarkerKind::Counter => current + 1,
            MarkerKind::Timestamp => now_ms.max(current + 1),
        }
    }
}

/// Rule deciding whether a token's marker snapshot still matches the user's
/// live marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString)]
#[strum(serialize_all = "kebab-case")]
pub enum InvalidationPolicy {
    /// Logout counter, snapshot must equal the live counter
    #[default]
    CounterExact,
    /// Logout counter, snapshot must not be older than the live counter
    CounterNotOlder,
    /// Timestamp floor, the token's issued-at must be strictly after it
    IssuedAfterFloor,
}

impl InvalidationPolicy {
    pub fn marker_kind(&self) -> MarkerKind {
        match self {
            InvalidationPolicy::CounterExact | InvalidationPolicy::CounterNotOlder => {
                MarkerKind::Counter
            }
            InvalidationPolicy::IssuedAfterFloor => MarkerKind::Timestamp,
        }
    }

    /// Marker value embedded in a token issued now.
    ///
    /// Counter policies copy the live counter. The timestamp policy embeds
    /// the issue time, bumped past the floor when a login lands in the same
    /// millisecond as the logout that set it.
    pub fn snapshot(&self, live: i64, now_ms: i64) -> i64 {
        match self.marker_kind() {
            MarkerKind::Counter => live,
            MarkerKind::Timestamp => now_ms.max(live + 1),
        }
    }

    pub fn accepts(&self, snapshot: i64, live: i64) -> bool {
        match self {
            InvalidationPolicy::CounterExact => snapshot == live,
            InvalidationPolicy::CounterNotOlder => snapshot >= live,
            InvalidationPolicy::IssuedAfterFloor => snapshot > live,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(InvalidationPolicy::CounterExact, 3, 3, true)]
    #[case(InvalidationPolicy::CounterExact, 2, 3, false)]
    #[case(InvalidationPolicy::CounterExact, 4, 3, false)]
    #[case(InvalidationPolicy::CounterNotOlder, 3, 3, true)]
    #[case(InvalidationPolicy::CounterNotOlder, 2, 3, false)]
    #[case(InvalidationPolicy::CounterNotOlder, 4, 3, true)]
    #[case(InvalidationPolicy::IssuedAfterFloor, 1_001, 1_000, true)]
    #[case(InvalidationPolicy::IssuedAfterFloor, 1_000, 1_000, false)]
    #[case(InvalidationPolicy::IssuedAfterFloor, 999, 1_000, false)]
    fn test_accepts(
        #[case] policy: InvalidationPolicy,
        #[case] snapshot: i64,
        #[case] live: i64,
        #[case] expected: bool,
    ) {
        assert_eq!(policy.accepts(snapshot, live), expected);
    }

    #[rstest]
    #[case(InvalidationPolicy::CounterExact)]
    #[case(InvalidationPolicy::CounterNotOlder)]
    #[case(InvalidationPolicy::IssuedAfterFloor)]
    fn test_advance_invalidates_earlier_snapshots(#[case] policy: InvalidationPolicy) {
        let now_ms = 1_700_000_000_000;
        let live = 0;
        let snapshot = policy.snapshot(live, now_ms);
        assert!(policy.accepts(snapshot, live));

        // Logout within the same millisecond as the login
        let advanced = policy.marker_kind().advance(live, now_ms);
        assert!(advanced > live);
        assert!(!policy.accepts(snapshot, advanced));

        // A login right after the logout is accepted again
        let fresh = policy.snapshot(advanced, now_ms);
        assert!(policy.accepts(fresh, advanced));
    }

    #[test]
    fn test_timestamp_marker_never_goes_backwards() {
        assert_eq!(MarkerKind::Timestamp.advance(5_000, 4_000), 5_001);
        assert_eq!(MarkerKind::Timestamp.advance(5_000, 6_000), 6_000);
        assert_eq!(MarkerKind::Counter.advance(7, 0), 8);
    }

    #[test]
    fn test_policy_names() {
        assert_eq!(InvalidationPolicy::CounterExact.to_string(), "counter-exact");
        assert_eq!(
            "counter-not-older".parse::<InvalidationPolicy>().unwrap(),
            InvalidationPolicy::CounterNotOlder
        );
        assert_eq!(
            "issued-after-floor".parse::<InvalidationPolicy>().unwrap(),
            InvalidationPolicy::IssuedAfterFloor
        );
    }
}
