use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// One bookable clinic session of a doctor.
///
/// `res` is the remaining capacity: `0 <= res <= capacity`. The time window and
/// the owning doctor never change after creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleSlot {
    pub sid: i64,
    pub did: String,
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
    pub capacity: i64,
    pub res: i64,
}

impl ScheduleSlot {
    /// Closed-interval overlap: touching endpoints count.
    pub fn overlaps(&self, other: &ScheduleSlot) -> bool {
        windows_overlap(self.start_time, self.end_time, other.start_time, other.end_time)
    }

    pub fn booked(&self) -> i64 {
        self.capacity - self.res
    }

    pub fn view(&self) -> ScheduleView {
        ScheduleView {
            sid: self.sid,
            did: self.did.clone(),
            start_time: self.start_time,
            end_time: self.end_time,
            capacity: self.capacity,
            res: self.res,
        }
    }
}

pub fn windows_overlap(
    a_start: NaiveDateTime,
    a_end: NaiveDateTime,
    b_start: NaiveDateTime,
    b_end: NaiveDateTime,
) -> bool {
    !(a_end < b_start) && !(a_start > b_end)
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleView {
    pub sid: i64,
    pub did: String,
    #[serde(with = "crate::time::wire")]
    pub start_time: NaiveDateTime,
    #[serde(with = "crate::time::wire")]
    pub end_time: NaiveDateTime,
    pub capacity: i64,
    pub res: i64,
}
