use chrono::{Duration, NaiveDate, NaiveDateTime};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BillingType {
    Recurring,
    OneTime,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanDuration {
    Days(i64),
    Lifetime,
}

/// A purchasable plan. Prices are in the smallest currency unit (paise).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Plan {
    pub id: &'static str,
    pub amount: i64,
    pub duration: PlanDuration,
    pub billing: BillingType,
}

/// Plans are read-only at request time. Add new plans here.
pub const PLAN_CATALOG: &[Plan] = &[
    Plan {
        id: "premium_monthly",
        amount: 29_900,
        duration: PlanDuration::Days(30),
        billing: BillingType::Recurring,
    },
    Plan {
        id: "premium_yearly",
        amount: 299_900,
        duration: PlanDuration::Days(365),
        billing: BillingType::Recurring,
    },
    Plan {
        id: "anytimebuddy_lifetime",
        amount: 999_900,
        duration: PlanDuration::Lifetime,
        billing: BillingType::OneTime,
    },
    Plan {
        id: "track_single",
        amount: 3_000,
        duration: PlanDuration::Lifetime,
        billing: BillingType::OneTime,
    },
];

/// End date used for plans that never expire.
pub fn lifetime_sentinel() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2099, 12, 31)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .unwrap_or(NaiveDateTime::MAX)
}

impl Plan {
    pub fn find(plan_id: &str) -> Option<&'static Plan> {
        PLAN_CATALOG.iter().find(|p| p.id == plan_id)
    }

    pub fn auto_renew(&self) -> bool {
        self.billing == BillingType::Recurring
    }

    pub fn ends_at_from(&self, start: NaiveDateTime) -> NaiveDateTime {
        match self.duration {
            PlanDuration::Days(days) => start + Duration::days(days),
            PlanDuration::Lifetime => lifetime_sentinel(),
        }
    }
}
