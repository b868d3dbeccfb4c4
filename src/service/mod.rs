pub mod attendance;
pub mod clock;
pub mod geo;
pub mod paid_leave;
pub mod summary;
pub mod time_correction;
pub mod work_rules;

use std::sync::Arc;

use crate::store::{
    AttendanceStore, CorrectionStore, DepartmentDirectory, Notifier, SummaryStore, UserDirectory,
    WorkLocationDirectory,
};
use attendance::AttendanceRecorder;
use clock::Clock;
use geo::GeoValidator;
use paid_leave::PaidLeaveCalculator;
use summary::SummaryCalculator;
use time_correction::TimeCorrectionWorkflow;
use work_rules::WorkRules;

/// Every external collaborator the services need.
#[derive(Clone)]
pub struct Stores {
    pub users: Arc<dyn UserDirectory>,
    pub locations: Arc<dyn WorkLocationDirectory>,
    pub departments: Arc<dyn DepartmentDirectory>,
    pub attendance: Arc<dyn AttendanceStore>,
    pub summaries: Arc<dyn SummaryStore>,
    pub corrections: Arc<dyn CorrectionStore>,
    pub notifier: Arc<dyn Notifier>,
}

impl Stores {
    /// Uses one backend for every collaborator.
    pub fn shared<S>(store: Arc<S>, notifier: Arc<dyn Notifier>) -> Self
    where
        S: UserDirectory
            + WorkLocationDirectory
            + DepartmentDirectory
            + AttendanceStore
            + SummaryStore
            + CorrectionStore
            + 'static,
    {
        Self {
            users: store.clone(),
            locations: store.clone(),
            departments: store.clone(),
            attendance: store.clone(),
            summaries: store.clone(),
            corrections: store,
            notifier,
        }
    }
}

#[derive(Clone)]
pub struct Services {
    pub recorder: Arc<AttendanceRecorder>,
    pub summaries: Arc<SummaryCalculator>,
    pub corrections: Arc<TimeCorrectionWorkflow>,
    pub paid_leave: Arc<PaidLeaveCalculator>,
}

impl Services {
    pub fn build(stores: Stores, rules: Arc<WorkRules>, clock: Arc<dyn Clock>) -> Self {
        let summaries = Arc::new(SummaryCalculator::new(
            stores.attendance.clone(),
            stores.summaries.clone(),
            stores.departments.clone(),
            rules.clone(),
            clock.clone(),
        ));

        let recorder = Arc::new(AttendanceRecorder::new(
            stores.users.clone(),
            GeoValidator::new(stores.locations.clone()),
            stores.attendance.clone(),
            stores.corrections.clone(),
            summaries.clone(),
            rules.clone(),
            clock.clone(),
        ));

        let corrections = Arc::new(TimeCorrectionWorkflow::new(
            stores.users.clone(),
            stores.attendance.clone(),
            stores.corrections.clone(),
            stores.notifier.clone(),
            clock,
        ));

        let paid_leave = Arc::new(PaidLeaveCalculator::new(stores.users, rules));

        Self {
            recorder,
            summaries,
            corrections,
            paid_leave,
        }
    }
}
