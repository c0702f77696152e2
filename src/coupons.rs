//! Coupon Validation
//!
//! A customer holds at most one coupon. Checkout offers a code; the policy
//! here decides whether the stored coupon applies. A coupon that does not
//! apply never fails the checkout, it only explains why it was skipped.

use std::fmt;

use jiff::Timestamp;

use crate::discounts::DiscountPercentage;

/// A stored coupon that can be offered at checkout.
pub trait Redeemable {
    /// Coupon code as issued.
    fn code(&self) -> &str;

    /// Percentage taken off the cart total.
    fn discount(&self) -> DiscountPercentage;

    /// Whether the coupon has not been retired.
    fn is_active(&self) -> bool;

    /// Last instant at which the coupon may be used.
    fn expires_at(&self) -> Timestamp;
}

/// Why an offered coupon was not applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NotAppliedReason {
    /// No code, or a blank code, was offered.
    NoCodeSupplied,

    /// The customer holds no coupon.
    NotFound,

    /// The offered code is not the customer's coupon.
    CodeMismatch,

    /// The customer's coupon has been retired.
    Inactive,

    /// The customer's coupon is past its expiry.
    Expired,
}

impl NotAppliedReason {
    /// Stable, machine-readable name.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NoCodeSupplied => "no_code_supplied",
            Self::NotFound => "not_found",
            Self::CodeMismatch => "code_mismatch",
            Self::Inactive => "inactive",
            Self::Expired => "expired",
        }
    }
}

impl fmt::Display for NotAppliedReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of validating an offered coupon code.
#[derive(Debug, Clone, PartialEq)]
pub enum CouponValidation<C> {
    /// The coupon applies.
    Applied(C),

    /// The coupon does not apply; checkout proceeds at full price.
    NotApplied(NotAppliedReason),
}

impl<C> CouponValidation<C> {
    /// Returns the applied coupon, if any.
    pub const fn applied(&self) -> Option<&C> {
        match self {
            Self::Applied(coupon) => Some(coupon),
            Self::NotApplied(_) => None,
        }
    }

    /// Consumes the outcome, returning the applied coupon, if any.
    pub fn into_applied(self) -> Option<C> {
        match self {
            Self::Applied(coupon) => Some(coupon),
            Self::NotApplied(_) => None,
        }
    }

    /// Returns the reason the coupon was skipped, if it was.
    pub const fn not_applied_reason(&self) -> Option<NotAppliedReason> {
        match self {
            Self::Applied(_) => None,
            Self::NotApplied(reason) => Some(*reason),
        }
    }

    /// Whether the coupon applies.
    pub const fn is_applied(&self) -> bool {
        matches!(self, Self::Applied(_))
    }
}

/// Compares an offered code with a stored one.
///
/// Surrounding whitespace is ignored and ASCII letters match case-insensitively.
pub fn codes_match(offered: &str, stored: &str) -> bool {
    offered.trim().eq_ignore_ascii_case(stored.trim())
}

/// Decides whether the customer's stored coupon applies to the offered code.
///
/// A coupon applies when the codes match, it is active, and `now` is not past
/// its expiry.
pub fn validate_coupon<C: Redeemable>(
    offered: Option<&str>,
    stored: Option<C>,
    now: Timestamp,
) -> CouponValidation<C> {
    let Some(offered) = offered.filter(|code| !code.trim().is_empty()) else {
        return CouponValidation::NotApplied(NotAppliedReason::NoCodeSupplied);
    };

    let Some(coupon) = stored else {
        return CouponValidation::NotApplied(NotAppliedReason::NotFound);
    };

    if !codes_match(offered, coupon.code()) {
        return CouponValidation::NotApplied(NotAppliedReason::CodeMismatch);
    }

    if !coupon.is_active() {
        return CouponValidation::NotApplied(NotAppliedReason::Inactive);
    }

    if coupon.expires_at() < now {
        return CouponValidation::NotApplied(NotAppliedReason::Expired);
    }

    CouponValidation::Applied(coupon)
}

#[cfg(test)]
mod tests {
    use jiff::SignedDuration;
    use testresult::TestResult;

    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct TestCoupon {
        code: &'static str,
        active: bool,
        expires_at: Timestamp,
    }

    impl Redeemable for TestCoupon {
        fn code(&self) -> &str {
            self.code
        }

        fn discount(&self) -> DiscountPercentage {
            DiscountPercentage::ZERO
        }

        fn is_active(&self) -> bool {
            self.active
        }

        fn expires_at(&self) -> Timestamp {
            self.expires_at
        }
    }

    fn now() -> Result<Timestamp, jiff::Error> {
        "2025-10-02T12:00:00Z".parse()
    }

    fn coupon(expires_at: Timestamp) -> TestCoupon {
        TestCoupon {
            code: "GIFTAB12CD34",
            active: true,
            expires_at,
        }
    }

    #[test]
    fn test_matching_active_coupon_applies() -> TestResult {
        let now = now()?;
        let stored = coupon(now + SignedDuration::from_hours(1));

        let outcome = validate_coupon(Some("GIFTAB12CD34"), Some(stored.clone()), now);

        assert_eq!(outcome, CouponValidation::Applied(stored));

        Ok(())
    }

    #[test]
    fn test_code_comparison_ignores_case_and_whitespace() -> TestResult {
        let now = now()?;

        let outcome = validate_coupon(
            Some("  giftab12cd34 "),
            Some(coupon(now + SignedDuration::from_hours(1))),
            now,
        );

        assert!(outcome.is_applied());

        Ok(())
    }

    #[test]
    fn test_coupon_expiring_now_still_applies() -> TestResult {
        let now = now()?;

        assert!(validate_coupon(Some("GIFTAB12CD34"), Some(coupon(now)), now).is_applied());

        Ok(())
    }

    #[test]
    fn test_missing_code_is_reported() -> TestResult {
        let now = now()?;

        for offered in [None, Some(""), Some("   ")] {
            let outcome = validate_coupon(offered, Some(coupon(now)), now);

            assert_eq!(
                outcome.not_applied_reason(),
                Some(NotAppliedReason::NoCodeSupplied)
            );
        }

        Ok(())
    }

    #[test]
    fn test_customer_without_coupon_is_not_found() -> TestResult {
        let outcome = validate_coupon::<TestCoupon>(Some("GIFTAB12CD34"), None, now()?);

        assert_eq!(
            outcome.not_applied_reason(),
            Some(NotAppliedReason::NotFound)
        );

        Ok(())
    }

    #[test]
    fn test_someone_elses_code_is_a_mismatch() -> TestResult {
        let now = now()?;

        let outcome = validate_coupon(Some("GIFTOTHER999"), Some(coupon(now)), now);

        assert_eq!(
            outcome.not_applied_reason(),
            Some(NotAppliedReason::CodeMismatch)
        );

        Ok(())
    }

    #[test]
    fn test_inactive_coupon_is_skipped() -> TestResult {
        let now = now()?;
        let stored = TestCoupon {
            active: false,
            ..coupon(now + SignedDuration::from_hours(24))
        };

        let outcome = validate_coupon(Some("GIFTAB12CD34"), Some(stored), now);

        assert_eq!(
            outcome.not_applied_reason(),
            Some(NotAppliedReason::Inactive)
        );

        Ok(())
    }

    #[test]
    fn test_expired_coupon_is_skipped() -> TestResult {
        let now = now()?;

        let outcome = validate_coupon(
            Some("GIFTAB12CD34"),
            Some(coupon(now - SignedDuration::from_secs(1))),
            now,
        );

        assert_eq!(
            outcome.not_applied_reason(),
            Some(NotAppliedReason::Expired)
        );
        assert!(outcome.into_applied().is_none());

        Ok(())
    }
}
