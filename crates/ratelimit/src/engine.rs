use warden_core::SessionState;

/// Why a request was denied by [`check_and_consume`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    Rate,
    Quota,
}

/// Outcome of a single rate/quota check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny(DenyReason),
}

/// Run the token-bucket + rolling-quota decision for one request against
/// `session`, mutating it in place. The caller is responsible for writing
/// the mutated session back to the store afterwards, regardless of the
/// outcome, so that `Allowance`/quota state persists across requests.
///
/// Rate is evaluated before quota: a request only consumes a quota unit if
/// it passed the rate check.
#[must_use]
pub fn check_and_consume(session: &mut SessionState, now: i64) -> Decision {
    let delta = (now - session.last_check).max(0) as f64;
    session.last_check = now;

    if session.per > 0.0 {
        session.allowance += delta * (session.rate / session.per);
    }
    if session.allowance > session.rate {
        session.allowance = session.rate;
    }

    if session.allowance < 1.0 {
        return Decision::Deny(DenyReason::Rate);
    }
    session.allowance -= 1.0;

    if quota_exceeded(session, now) {
        return Decision::Deny(DenyReason::Quota);
    }

    Decision::Allow
}

/// The quota sub-algorithm from SPEC_FULL.md §4.2. Mutates `session`'s
/// quota fields on renewal or consumption.
fn quota_exceeded(session: &mut SessionState, now: i64) -> bool {
    if session.quota_max == -1 {
        return false;
    }

    if session.quota_remaining == 0 {
        if session.quota_renews - now < 0 {
            session.quota_renews = now + session.quota_renewal_rate;
            session.quota_remaining = session.quota_max;
            return false;
        }
        return true;
    }

    if session.quota_renews > 0 {
        session.quota_remaining -= 1;
    }
    false
}
