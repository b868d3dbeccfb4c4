#![allow(dead_code)]

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use hrm_attendance::model::user::User;
use hrm_attendance::model::work_location::{LocationType, WorkLocation};
use hrm_attendance::service::clock::FixedClock;
use hrm_attendance::service::geo::EARTH_RADIUS_METERS;
use hrm_attendance::service::work_rules::WorkRules;
use hrm_attendance::service::{Services, Stores};
use hrm_attendance::store::LogNotifier;
use hrm_attendance::store::memory::MemoryStore;

pub const OFFICE_LAT: f64 = 35.681236;
pub const OFFICE_LON: f64 = 139.767125;
pub const METERS_PER_DEGREE: f64 = EARTH_RADIUS_METERS * std::f64::consts::PI / 180.0;

pub const ALICE: u64 = 1;
pub const BOB: u64 = 2;
pub const REMOTE: u64 = 3;
pub const MANAGER: u64 = 9;
pub const DEPARTMENT: u64 = 10;

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Tokyo wall-clock time as a UTC instant.
pub fn tokyo(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
    WorkRules::default().local_to_utc(date(y, m, d).and_hms_opt(h, min, 0).unwrap())
}

/// Latitude `meters` due north of the office.
pub fn north_of_office(meters: f64) -> f64 {
    OFFICE_LAT + meters / METERS_PER_DEGREE
}

pub fn user(id: u64, department_id: Option<u64>) -> User {
    User {
        id,
        name: format!("user-{id}"),
        location_type: LocationType::Office,
        skip_location_check: false,
        hire_date: Some(date(2024, 4, 1)),
        created_at: tokyo(2024, 4, 1, 9, 0),
        department_id,
    }
}

pub struct Harness {
    pub store: Arc<MemoryStore>,
    pub clock: Arc<FixedClock>,
    pub services: Services,
}

impl Harness {
    /// Office with a 100m geofence, two department members, one remote
    /// worker and a manager. The clock starts Monday 2026-01-05 09:00 Tokyo.
    pub fn new() -> Self {
        let store = Arc::new(MemoryStore::new());
        store
            .add_location(WorkLocation {
                id: 1,
                name: "Head office".to_string(),
                location_type: LocationType::Office,
                latitude: OFFICE_LAT,
                longitude: OFFICE_LON,
                radius_meters: 100.0,
            })
            .unwrap();

        store.add_user(user(ALICE, Some(DEPARTMENT))).unwrap();
        store.add_user(user(BOB, Some(DEPARTMENT))).unwrap();
        store
            .add_user(User {
                skip_location_check: true,
                ..user(REMOTE, None)
            })
            .unwrap();
        store.add_user(user(MANAGER, None)).unwrap();

        let clock = Arc::new(FixedClock::new(tokyo(2026, 1, 5, 9, 0)));
        let services = Services::build(
            Stores::shared(store.clone(), Arc::new(LogNotifier)),
            Arc::new(WorkRules::default()),
            clock.clone(),
        );

        Self {
            store,
            clock,
            services,
        }
    }

    pub fn at(&self, instant: DateTime<Utc>) {
        self.clock.set(instant);
    }

    /// Clocks `user_id` in and out at the office on the given times.
    pub async fn work(&self, user_id: u64, from: DateTime<Utc>, to: DateTime<Utc>) {
        self.at(from);
        self.services
            .recorder
            .clock_in(user_id, Some(OFFICE_LAT), Some(OFFICE_LON))
            .await
            .unwrap();
        self.at(to);
        self.services
            .recorder
            .clock_out(user_id, Some(OFFICE_LAT), Some(OFFICE_LON))
            .await
            .unwrap();
    }
}
