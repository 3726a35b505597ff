use chrono::{DateTime, Duration, Utc};

use super::calltype::Calltype;
use super::invocation::InvocationTime;

/// Default offset applied when an invocation is quarantined after a failure
pub const DEFAULT_QUARANTINE_DAYS: i64 = 7;

/// Domain service deciding whether a webservice call may be made
/// Contains pure domain logic without infrastructure dependencies
pub struct ThrottlePolicy;

impl ThrottlePolicy {
    /// A call is allowed when nothing was recorded, or when the whole number
    /// of days since the recorded invocation exceeds the calltype's horizon.
    ///
    /// With a 14 day horizon the call stays disallowed through day 14 and is
    /// allowed from day 15. Future timestamps (quarantine, block) always
    /// disallow.
    pub fn is_invocation_allowed(
        calltype: Calltype,
        last_invocation: Option<InvocationTime>,
        now: DateTime<Utc>,
    ) -> bool {
        match last_invocation {
            None => true,
            Some(InvocationTime::Infinity) => false,
            Some(InvocationTime::At(invoked_at)) => {
                now.signed_duration_since(invoked_at).num_days() > calltype.days_to_cache()
            }
        }
    }

    /// Latest invocation time (inclusive) that no longer suppresses a call.
    ///
    /// Stores use this to evaluate the same rule in a single guarded
    /// statement: a record with `invocation_time <= cutoff` is expired.
    pub fn expiry_cutoff(calltype: Calltype, now: DateTime<Utc>) -> DateTime<Utc> {
        now - Duration::days(calltype.days_to_cache() + 1)
    }

    /// Timestamp written by a quarantine
    pub fn quarantine_until(now: DateTime<Utc>, quarantine: Duration) -> InvocationTime {
        InvocationTime::At(now + quarantine)
    }
}
