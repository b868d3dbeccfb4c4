use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard};

use anyhow::anyhow;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};

use crate::error::{AppError, AppResult};
use crate::model::attendance::{AttendanceRecord, NewAttendanceRecord, PunchType};
use crate::model::summary::{AttendanceSummary, SummaryType};
use crate::model::time_correction::{CorrectionStatus, NewTimeCorrection, TimeCorrection};
use crate::model::user::User;
use crate::model::work_location::{LocationType, WorkLocation};
use crate::store::{
    AttendanceStore, CorrectionStore, DUPLICATE_PUNCH, DepartmentDirectory, SummaryStore,
    UserDirectory, WorkLocationDirectory,
};

#[derive(Default)]
struct State {
    users: HashMap<u64, User>,
    locations: Vec<WorkLocation>,
    departments: HashMap<u64, Vec<u64>>,
    records: BTreeMap<u64, AttendanceRecord>,
    summaries: BTreeMap<(u64, NaiveDate, SummaryType), AttendanceSummary>,
    corrections: BTreeMap<u64, TimeCorrection>,
    next_record_id: u64,
    next_correction_id: u64,
}

/// In-process store with the same uniqueness rules as the MySQL schema.
#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<State>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> AppResult<MutexGuard<'_, State>> {
        self.state
            .lock()
            .map_err(|_| AppError::Unexpected(anyhow!("memory store lock poisoned")))
    }

    pub fn add_user(&self, user: User) -> AppResult<()> {
        let mut state = self.lock()?;
        if let Some(department_id) = user.department_id {
            let members = state.departments.entry(department_id).or_default();
            if !members.contains(&user.id) {
                members.push(user.id);
            }
        }
        state.users.insert(user.id, user);
        Ok(())
    }

    pub fn add_location(&self, location: WorkLocation) -> AppResult<()> {
        self.lock()?.locations.push(location);
        Ok(())
    }

    /// Number of summary rows currently held, across all users and types.
    pub fn summary_count(&self) -> AppResult<usize> {
        Ok(self.lock()?.summaries.len())
    }
}

fn conflicts_with(existing: &AttendanceRecord, user_id: u64, punch_type: PunchType, work_date: NaiveDate) -> bool {
    existing.user_id == user_id && existing.punch_type == punch_type && existing.work_date == work_date
}

#[async_trait]
impl UserDirectory for MemoryStore {
    async fn find_user(&self, user_id: u64) -> AppResult<Option<User>> {
        Ok(self.lock()?.users.get(&user_id).cloned())
    }
}

#[async_trait]
impl WorkLocationDirectory for MemoryStore {
    async fn find_by_type(&self, location_type: LocationType) -> AppResult<Vec<WorkLocation>> {
        Ok(self
            .lock()?
            .locations
            .iter()
            .filter(|l| l.location_type == location_type)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl DepartmentDirectory for MemoryStore {
    async fn member_ids(&self, department_id: u64) -> AppResult<Vec<u64>> {
        Ok(self
            .lock()?
            .departments
            .get(&department_id)
            .cloned()
            .unwrap_or_default())
    }
}

#[async_trait]
impl AttendanceStore for MemoryStore {
    async fn insert(&self, record: NewAttendanceRecord) -> AppResult<AttendanceRecord> {
        let mut state = self.lock()?;
        if state
            .records
            .values()
            .any(|r| conflicts_with(r, record.user_id, record.punch_type, record.work_date))
        {
            return Err(AppError::conflict(DUPLICATE_PUNCH));
        }

        state.next_record_id += 1;
        let stored = AttendanceRecord {
            id: state.next_record_id,
            user_id: record.user_id,
            punch_type: record.punch_type,
            timestamp: record.timestamp,
            work_date: record.work_date,
            latitude: record.latitude,
            longitude: record.longitude,
        };
        state.records.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn find_by_id(&self, id: u64) -> AppResult<Option<AttendanceRecord>> {
        Ok(self.lock()?.records.get(&id).cloned())
    }

    async fn find_by_user_between_dates(
        &self,
        user_id: u64,
        start: NaiveDate,
        end: NaiveDate,
    ) -> AppResult<Vec<AttendanceRecord>> {
        let mut records: Vec<_> = self
            .lock()?
            .records
            .values()
            .filter(|r| r.user_id == user_id && r.work_date >= start && r.work_date <= end)
            .cloned()
            .collect();
        records.sort_by_key(|r| (r.timestamp, r.id));
        Ok(records)
    }

    async fn find_by_user_since(
        &self,
        user_id: u64,
        punch_type: PunchType,
        since: DateTime<Utc>,
    ) -> AppResult<Vec<AttendanceRecord>> {
        let mut records: Vec<_> = self
            .lock()?
            .records
            .values()
            .filter(|r| r.user_id == user_id && r.punch_type == punch_type && r.timestamp >= since)
            .cloned()
            .collect();
        records.sort_by_key(|r| (r.timestamp, r.id));
        Ok(records)
    }

    async fn amend(
        &self,
        id: u64,
        punch_type: PunchType,
        timestamp: DateTime<Utc>,
        work_date: NaiveDate,
    ) -> AppResult<AttendanceRecord> {
        let mut state = self.lock()?;
        let user_id = match state.records.get(&id) {
            Some(record) => record.user_id,
            None => return Err(AppError::not_found("attendance record not found")),
        };
        if state
            .records
            .values()
            .any(|r| r.id != id && conflicts_with(r, user_id, punch_type, work_date))
        {
            return Err(AppError::conflict(DUPLICATE_PUNCH));
        }

        let record = state
            .records
            .get_mut(&id)
            .ok_or_else(|| AppError::not_found("attendance record not found"))?;
        record.punch_type = punch_type;
        record.timestamp = timestamp;
        record.work_date = work_date;
        Ok(record.clone())
    }
}

#[async_trait]
impl SummaryStore for MemoryStore {
    async fn upsert(&self, summary: &AttendanceSummary) -> AppResult<()> {
        self.lock()?.summaries.insert(
            (summary.user_id, summary.target_date, summary.summary_type),
            summary.clone(),
        );
        Ok(())
    }

    async fn find(
        &self,
        user_id: u64,
        target_date: NaiveDate,
        summary_type: SummaryType,
    ) -> AppResult<Option<AttendanceSummary>> {
        Ok(self
            .lock()?
            .summaries
            .get(&(user_id, target_date, summary_type))
            .cloned())
    }

    async fn find_between(
        &self,
        user_id: Option<u64>,
        summary_type: SummaryType,
        start: NaiveDate,
        end: NaiveDate,
    ) -> AppResult<Vec<AttendanceSummary>> {
        Ok(self
            .lock()?
            .summaries
            .values()
            .filter(|s| {
                s.summary_type == summary_type
                    && s.target_date >= start
                    && s.target_date <= end
                    && user_id.is_none_or(|id| s.user_id == id)
            })
            .cloned()
            .collect())
    }
}

#[async_trait]
impl CorrectionStore for MemoryStore {
    async fn insert(&self, correction: NewTimeCorrection) -> AppResult<TimeCorrection> {
        let mut state = self.lock()?;
        state.next_correction_id += 1;
        let stored = TimeCorrection {
            id: state.next_correction_id,
            user_id: correction.user_id,
            attendance_id: correction.attendance_id,
            request_type: correction.request_type,
            current_type: correction.current_type,
            requested_time: correction.requested_time,
            requested_type: correction.requested_type,
            reason: correction.reason,
            status: CorrectionStatus::Pending,
            approver_id: None,
            approved_at: None,
            applied_at: None,
            created_at: correction.created_at,
        };
        state.corrections.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn find_by_id(&self, id: u64) -> AppResult<Option<TimeCorrection>> {
        Ok(self.lock()?.corrections.get(&id).cloned())
    }

    async fn find_by_user(&self, user_id: u64) -> AppResult<Vec<TimeCorrection>> {
        let mut found: Vec<_> = self
            .lock()?
            .corrections
            .values()
            .filter(|c| c.user_id == user_id)
            .cloned()
            .collect();
        found.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
        Ok(found)
    }

    async fn find_by_attendance(&self, attendance_id: u64) -> AppResult<Vec<TimeCorrection>> {
        let mut found: Vec<_> = self
            .lock()?
            .corrections
            .values()
            .filter(|c| c.attendance_id == attendance_id)
            .cloned()
            .collect();
        found.sort_by_key(|c| (c.created_at, c.id));
        Ok(found)
    }

    async fn find_pending(&self) -> AppResult<Vec<TimeCorrection>> {
        let mut found: Vec<_> = self
            .lock()?
            .corrections
            .values()
            .filter(|c| c.status == CorrectionStatus::Pending)
            .cloned()
            .collect();
        found.sort_by_key(|c| (c.created_at, c.id));
        Ok(found)
    }

    async fn count_pending(&self, user_id: Option<u64>) -> AppResult<u64> {
        Ok(self
            .lock()?
            .corrections
            .values()
            .filter(|c| c.status == CorrectionStatus::Pending)
            .filter(|c| user_id.is_none_or(|id| c.user_id == id))
            .count() as u64)
    }

    async fn decide(
        &self,
        id: u64,
        status: CorrectionStatus,
        approver_id: u64,
        decided_at: DateTime<Utc>,
    ) -> AppResult<bool> {
        let mut state = self.lock()?;
        match state.corrections.get_mut(&id) {
            Some(correction) if correction.status == CorrectionStatus::Pending => {
                correction.status = status;
                correction.approver_id = Some(approver_id);
                correction.approved_at = Some(decided_at);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn mark_applied(&self, id: u64, applied_at: DateTime<Utc>) -> AppResult<bool> {
        let mut state = self.lock()?;
        match state.corrections.get_mut(&id) {
            Some(correction)
                if correction.status == CorrectionStatus::Approved
                    && correction.applied_at.is_none() =>
            {
                correction.applied_at = Some(applied_at);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn clear_applied(&self, id: u64) -> AppResult<()> {
        if let Some(correction) = self.lock()?.corrections.get_mut(&id) {
            correction.applied_at = None;
        }
        Ok(())
    }
}
