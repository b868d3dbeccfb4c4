use std::sync::Arc;

use chrono::NaiveDate;

use crate::error::{AppError, AppResult};
use crate::service::work_rules::WorkRules;
use crate::store::UserDirectory;

/// Days granted at one year of service; each further year adds one.
const FIRST_YEAR_DAYS: u32 = 10;
const MAX_DAYS: u32 = 15;

/// Paid-leave days earned after `hire_date` as of `as_of`.
///
/// Only whole years count. Nothing is granted before the first anniversary,
/// and the grant stops growing at six years.
pub fn entitlement_days(hire_date: NaiveDate, as_of: NaiveDate) -> u32 {
    let years = as_of.years_since(hire_date).unwrap_or(0);
    if years == 0 {
        return 0;
    }
    (FIRST_YEAR_DAYS + (years - 1)).min(MAX_DAYS)
}

pub struct PaidLeaveCalculator {
    users: Arc<dyn UserDirectory>,
    rules: Arc<WorkRules>,
}

impl PaidLeaveCalculator {
    pub fn new(users: Arc<dyn UserDirectory>, rules: Arc<WorkRules>) -> Self {
        Self { users, rules }
    }

    /// Uses the hire date, or the account creation date when none is recorded.
    #[tracing::instrument(name = "paid_leave_days", skip(self))]
    pub async fn calculate_paid_leave_days(&self, user_id: u64, as_of: NaiveDate) -> AppResult<u32> {
        let user = self
            .users
            .find_user(user_id)
            .await?
            .ok_or_else(|| AppError::not_found("user not found"))?;

        let start = user
            .hire_date
            .unwrap_or_else(|| self.rules.local_date(user.created_at));

        let days = entitlement_days(start, as_of);
        tracing::debug!(%start, days, "Paid leave entitlement computed");
        Ok(days)
    }
}
