//! Quota ledger: tier limits and the admission-control policy
//!
//! The policy is a pure function of the caller's stored quota state and the
//! current time; all mutation is applied by the store inside its serialized
//! charge operation. Three tiers exist: anonymous callers and unverified
//! accounts share a low fixed ceiling, verified accounts get a higher ceiling
//! plus a time-based reset. Only the verified tier ever resets; for everyone
//! else the counter is permanent and email verification is the sole unlock.

use chrono::{DateTime, Duration, Utc};
use thiserror::Error;

/// Tier-specific rejection reasons, each with its own user-facing message
#[derive(Error, Debug, Clone, PartialEq)]
pub enum QuotaError {
    #[error("Daily limit reached. Come back tomorrow.")]
    QuotaExhausted {
        /// Seconds until the 24-hour reset becomes available
        retry_after_seconds: u64,
    },

    #[error("Free limit reached. Please verify your email to continue.")]
    VerificationRequired,

    #[error("Guest limit reached. Please sign up and log in to make more queries.")]
    GuestLimitExhausted,
}

/// Outcome of the gate for one inbound request
#[derive(Debug, Clone, PartialEq)]
pub enum GateDecision {
    /// Request admitted; `remaining` requests left in the tier
    Admitted { remaining: u32 },
    /// Request rejected with a tier-specific reason
    Rejected(QuotaError),
}

/// What the store must do to an account's quota state after evaluation
#[derive(Debug, Clone, PartialEq)]
pub enum AccountCharge {
    /// Admit the request and persist the new counter state
    Admit {
        new_count: u32,
        new_exhausted_at: Option<DateTime<Utc>>,
        remaining: u32,
    },
    /// Reject the request; `arm_exhausted_at` stamps a missing exhaustion
    /// timestamp so the reset timer is armed from this rejection onward
    Reject {
        error: QuotaError,
        arm_exhausted_at: Option<DateTime<Utc>>,
    },
}

/// What the store must do to a guest record after evaluation
#[derive(Debug, Clone, PartialEq)]
pub enum GuestCharge {
    Admit { new_count: u32, remaining: u32 },
    Reject(QuotaError),
}

/// Tier limits and the reset rule
///
/// Anonymous 2, unverified 2, verified 10; the 24-hour reset applies to the
/// verified tier only.
#[derive(Debug, Clone)]
pub struct QuotaPolicy {
    /// Ceiling for anonymous callers (no reset)
    pub guest_limit: u32,
    /// Ceiling for registered but unverified accounts (no reset)
    pub unverified_limit: u32,
    /// Ceiling for verified accounts
    pub verified_limit: u32,
    /// Elapsed time after exhaustion before a verified account resets
    pub reset_window: Duration,
}

impl Default for QuotaPolicy {
    fn default() -> Self {
        Self {
            guest_limit: 2,
            unverified_limit: 2,
            verified_limit: 10,
            reset_window: Duration::hours(24),
        }
    }
}

impl QuotaPolicy {
    /// Limit for an authenticated account, by verification tier
    pub fn account_limit(&self, verified: bool) -> u32 {
        if verified {
            self.verified_limit
        } else {
            self.unverified_limit
        }
    }

    /// Evaluate one request against an account's stored quota state.
    ///
    /// State machine per account:
    /// - counter below the tier limit: increment and admit; the request that
    ///   brings a verified account to its limit stamps `exhausted_at`,
    ///   arming the reset timer.
    /// - at/over the limit, verified, reset window elapsed: reset the counter
    ///   to 1 (counting this request), clear `exhausted_at`, admit.
    /// - at/over the limit, verified, window not yet elapsed: reject with the
    ///   remaining wait time.
    /// - at/over the limit, unverified: reject; verification is the only way
    ///   out of this tier, and the counter carries over unreset into the
    ///   higher tier afterwards.
    pub fn evaluate_account(
        &self,
        usage_count: u32,
        exhausted_at: Option<DateTime<Utc>>,
        verified: bool,
        now: DateTime<Utc>,
    ) -> AccountCharge {
        let limit = self.account_limit(verified);

        if usage_count >= limit {
            if !verified {
                return AccountCharge::Reject {
                    error: QuotaError::VerificationRequired,
                    arm_exhausted_at: None,
                };
            }

            return match exhausted_at {
                Some(at) if now - at >= self.reset_window => AccountCharge::Admit {
                    new_count: 1,
                    new_exhausted_at: None,
                    remaining: limit.saturating_sub(1),
                },
                Some(at) => {
                    let remaining_wait = self.reset_window - (now - at);
                    AccountCharge::Reject {
                        error: QuotaError::QuotaExhausted {
                            retry_after_seconds: remaining_wait.num_seconds().max(0) as u64,
                        },
                        arm_exhausted_at: None,
                    }
                }
                // At the limit with no timestamp on record (possible only via
                // hand-edited store data): arm the timer now and reject.
                None => AccountCharge::Reject {
                    error: QuotaError::QuotaExhausted {
                        retry_after_seconds: self.reset_window.num_seconds().max(0) as u64,
                    },
                    arm_exhausted_at: Some(now),
                },
            };
        }

        let new_count = usage_count + 1;
        // Stamp the exhaustion timestamp on the admitting request that hits
        // the limit, verified tier only; unverified accounts have no timed
        // reset so nothing is armed for them.
        let new_exhausted_at = if new_count >= limit && verified {
            Some(now)
        } else {
            exhausted_at
        };

        AccountCharge::Admit {
            new_count,
            new_exhausted_at,
            remaining: limit.saturating_sub(new_count),
        }
    }

    /// Evaluate one request against a guest record's counter.
    ///
    /// Single state: the counter is compared against the fixed ceiling with
    /// no reset; once at the ceiling the origin is permanently rejected.
    pub fn evaluate_guest(&self, usage_count: u32) -> GuestCharge {
        if usage_count >= self.guest_limit {
            return GuestCharge::Reject(QuotaError::GuestLimitExhausted);
        }

        let new_count = usage_count + 1;
        GuestCharge::Admit {
            new_count,
            remaining: self.guest_limit.saturating_sub(new_count),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy() -> QuotaPolicy {
        QuotaPolicy::default()
    }

    #[test]
    fn test_guest_admitted_until_ceiling() {
        let p = policy();

        assert_eq!(
            p.evaluate_guest(0),
            GuestCharge::Admit {
                new_count: 1,
                remaining: 1
            }
        );
        assert_eq!(
            p.evaluate_guest(1),
            GuestCharge::Admit {
                new_count: 2,
                remaining: 0
            }
        );
        assert_eq!(
            p.evaluate_guest(2),
            GuestCharge::Reject(QuotaError::GuestLimitExhausted)
        );
    }

    #[test]
    fn test_guest_never_resets() {
        let p = policy();

        // No time input exists for the guest path at all; at the ceiling the
        // rejection is unconditional.
        for count in 2..10 {
            assert_eq!(
                p.evaluate_guest(count),
                GuestCharge::Reject(QuotaError::GuestLimitExhausted)
            );
        }
    }

    #[test]
    fn test_unverified_account_admitted_until_low_ceiling() {
        let p = policy();
        let now = Utc::now();

        let charge = p.evaluate_account(0, None, false, now);
        assert_eq!(
            charge,
            AccountCharge::Admit {
                new_count: 1,
                new_exhausted_at: None,
                remaining: 1
            }
        );

        // Hitting the unverified limit does NOT arm the reset timer
        let charge = p.evaluate_account(1, None, false, now);
        assert_eq!(
            charge,
            AccountCharge::Admit {
                new_count: 2,
                new_exhausted_at: None,
                remaining: 0
            }
        );
    }

    #[test]
    fn test_unverified_account_rejected_with_verification_hint() {
        let p = policy();
        let now = Utc::now();

        let charge = p.evaluate_account(2, None, false, now);
        assert_eq!(
            charge,
            AccountCharge::Reject {
                error: QuotaError::VerificationRequired,
                arm_exhausted_at: None
            }
        );
    }

    #[test]
    fn test_unverified_has_no_time_based_reset() {
        let p = policy();
        let now = Utc::now();

        // Even a week after hitting the limit, an unverified account stays
        // blocked; only verification changes the tier.
        let charge = p.evaluate_account(2, Some(now - Duration::days(7)), false, now);
        assert!(matches!(
            charge,
            AccountCharge::Reject {
                error: QuotaError::VerificationRequired,
                ..
            }
        ));
    }

    #[test]
    fn test_verification_carries_counter_into_higher_tier() {
        let p = policy();
        let now = Utc::now();

        // Counter 2 was the unverified ceiling; after verification it is
        // evaluated against limit 10 without a reset.
        let charge = p.evaluate_account(2, None, true, now);
        assert_eq!(
            charge,
            AccountCharge::Admit {
                new_count: 3,
                new_exhausted_at: None,
                remaining: 7
            }
        );
    }

    #[test]
    fn test_verified_limit_stamps_exhausted_at() {
        let p = policy();
        let now = Utc::now();

        // Request number 10 for a verified account arms the reset timer
        let charge = p.evaluate_account(9, None, true, now);
        assert_eq!(
            charge,
            AccountCharge::Admit {
                new_count: 10,
                new_exhausted_at: Some(now),
                remaining: 0
            }
        );
    }

    #[test]
    fn test_verified_rejected_before_reset_window() {
        let p = policy();
        let now = Utc::now();
        let exhausted = now - Duration::hours(23);

        let charge = p.evaluate_account(10, Some(exhausted), true, now);
        match charge {
            AccountCharge::Reject {
                error: QuotaError::QuotaExhausted {
                    retry_after_seconds,
                },
                arm_exhausted_at: None,
            } => {
                // One hour of the window remains
                assert_eq!(retry_after_seconds, 3600);
            }
            other => panic!("expected QuotaExhausted rejection, got {:?}", other),
        }
    }

    #[test]
    fn test_verified_resets_to_one_after_window() {
        let p = policy();
        let now = Utc::now();
        let exhausted = now - Duration::hours(25);

        let charge = p.evaluate_account(10, Some(exhausted), true, now);
        assert_eq!(
            charge,
            AccountCharge::Admit {
                new_count: 1,
                new_exhausted_at: None,
                remaining: 9
            }
        );
    }

    #[test]
    fn test_verified_reset_boundary_is_inclusive() {
        let p = policy();
        let now = Utc::now();
        let exhausted = now - Duration::hours(24);

        // Exactly 24 hours elapsed counts as eligible
        let charge = p.evaluate_account(10, Some(exhausted), true, now);
        assert!(matches!(charge, AccountCharge::Admit { new_count: 1, .. }));
    }

    #[test]
    fn test_verified_at_limit_without_timestamp_arms_timer() {
        let p = policy();
        let now = Utc::now();

        let charge = p.evaluate_account(10, None, true, now);
        match charge {
            AccountCharge::Reject {
                error: QuotaError::QuotaExhausted { .. },
                arm_exhausted_at: Some(at),
            } => assert_eq!(at, now),
            other => panic!("expected armed rejection, got {:?}", other),
        }
    }

    #[test]
    fn test_account_limit_by_tier() {
        let p = policy();
        assert_eq!(p.account_limit(false), 2);
        assert_eq!(p.account_limit(true), 10);
    }
}
