//! Credit accounting from Foreplay response headers.
//!
//! Foreplay bills every request in credits and reports the balance in
//! `X-Credits-Remaining` and the charge in `X-Credit-Cost`. Both are optional.

use reqwest::header::HeaderMap;

pub(crate) const CREDITS_REMAINING_HEADER: &str = "x-credits-remaining";
pub(crate) const CREDIT_COST_HEADER: &str = "x-credit-cost";

/// Credit headers from a single response.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CreditUsage {
    pub remaining: Option<u64>,
    pub cost: Option<u64>,
}

impl CreditUsage {
    #[must_use]
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let read = |name: &str| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.trim().parse::<u64>().ok())
        };
        Self {
            remaining: read(CREDITS_REMAINING_HEADER),
            cost: read(CREDIT_COST_HEADER),
        }
    }
}

/// Running totals for one client over the life of a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CreditLedger {
    pub requests: u32,
    pub total_cost: u64,
    /// Headers from the most recent response.
    pub last: CreditUsage,
    /// Most recent remaining balance the remote advertised, if any response carried one.
    pub last_remaining: Option<u64>,
}

impl CreditLedger {
    pub(crate) fn record(&mut self, usage: CreditUsage) {
        self.requests = self.requests.saturating_add(1);
        self.total_cost = self.total_cost.saturating_add(usage.cost.unwrap_or(0));
        self.last = usage;
        if usage.remaining.is_some() {
            self.last_remaining = usage.remaining;
        }
    }

    /// `true` when a floor is set and the last advertised balance is below it.
    #[must_use]
    pub fn below(&self, floor: Option<u64>) -> bool {
        match (floor, self.last_remaining) {
            (Some(floor), Some(remaining)) => remaining < floor,
            _ => false,
        }
    }
}
