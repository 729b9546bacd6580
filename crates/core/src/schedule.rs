// Schedule entity: the time ranges of one event
//
// A schedule is identified by its event. Each range may carry the id of the
// backend slot it came from. A range the backend accepted without reporting
// its slot id is marked `saved` and blocks remote deletes until a reload.

use chrono::{NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

use crate::draft::DraftList;
use crate::entity::Entity;
use crate::error::{Result, SyncError};
use crate::state::{LocalKey, RemoteId};
use crate::traits::SlotStore;
use crate::validation::{is_blank, FieldErrors, ValidationContext};
use crate::wire::{format_time, format_time_with_seconds, parse_bool, parse_time, set_time};

fn default_start() -> NaiveTime {
    NaiveTime::from_hms_opt(9, 0, 0).unwrap_or_default()
}

fn default_end() -> NaiveTime {
    NaiveTime::from_hms_opt(17, 0, 0).unwrap_or_default()
}

fn is_false(value: &bool) -> bool {
    !value
}

fn minutes(time: &NaiveTime) -> u32 {
    time.hour() * 60 + time.minute()
}

/// One start/end range of a schedule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slot_id: Option<RemoteId>,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    #[serde(default, skip_serializing_if = "is_false")]
    pub saved: bool,
}

impl TimeRange {
    pub fn new(start_time: NaiveTime, end_time: NaiveTime) -> Self {
        Self {
            slot_id: None,
            start_time,
            end_time,
            saved: false,
        }
    }

    /// Range backed by a known backend slot
    pub fn from_slot(slot_id: RemoteId, start_time: NaiveTime, end_time: NaiveTime) -> Self {
        Self {
            slot_id: Some(slot_id),
            start_time,
            end_time,
            saved: true,
        }
    }

    /// Whether the backend holds this range
    pub fn is_saved(&self) -> bool {
        self.saved || self.slot_id.is_some()
    }

    /// Saved, but the backend never told us under which slot id
    pub fn is_unidentified(&self) -> bool {
        self.is_saved() && self.slot_id.is_none()
    }

    /// Valid only when the end is strictly after the start, same day, to the minute
    pub fn is_valid(&self) -> bool {
        minutes(&self.end_time) > minutes(&self.start_time)
    }

    /// Length rendered as `"{h}h {m}m"`, minutes omitted when zero
    pub fn duration(&self) -> String {
        let total = minutes(&self.end_time) as i64 - minutes(&self.start_time) as i64;
        let (hours, mins) = (total.div_euclid(60), total.rem_euclid(60));
        if mins > 0 {
            format!("{}h {}m", hours, mins)
        } else {
            format!("{}h", hours)
        }
    }

    /// `HH:MM-HH:MM`
    pub fn display(&self) -> String {
        format!(
            "{}-{}",
            format_time(&self.start_time),
            format_time(&self.end_time)
        )
    }
}

impl Default for TimeRange {
    fn default() -> Self {
        Self::new(default_start(), default_end())
    }
}

/// Editable schedule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schedule {
    pub event_id: String,
    #[serde(default)]
    pub event_title: Option<String>,
    pub time_ranges: Vec<TimeRange>,
    #[serde(default)]
    pub is_assigned: bool,
}

impl Default for Schedule {
    fn default() -> Self {
        Self {
            event_id: String::new(),
            event_title: None,
            time_ranges: vec![TimeRange::default()],
            is_assigned: false,
        }
    }
}

/// Slot as nested in `GET /event/slot/`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlotRecord {
    pub id: String,
    pub start_time: String,
    pub end_time: String,
}

/// Event with its slots, as listed by `GET /event/slot/`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleRecord {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub time_slot: Option<Vec<SlotRecord>>,
}

impl ScheduleRecord {
    pub fn has_slots(&self) -> bool {
        self.time_slot.as_ref().is_some_and(|slots| !slots.is_empty())
    }
}

/// One range in a schedule body
#[derive(Debug, Clone, Serialize)]
pub struct SlotPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub start_time: String,
    pub end_time: String,
}

/// Body of `POST /slot/` and `PUT /slot/`
#[derive(Debug, Clone, Serialize)]
pub struct SchedulePayload {
    pub event_id: String,
    pub time_slots: Vec<SlotPayload>,
    pub is_assigned: bool,
}

impl Schedule {
    pub fn for_event(event_id: impl Into<String>) -> Self {
        Self {
            event_id: event_id.into(),
            ..Self::default()
        }
    }

    pub fn add_range(&mut self, start_time: NaiveTime, end_time: NaiveTime) {
        self.time_ranges.push(TimeRange::new(start_time, end_time));
    }

    /// Remove a range; a schedule always keeps at least one
    pub fn remove_range(&mut self, index: usize) -> Result<TimeRange> {
        self.check_removable(index)?;
        Ok(self.time_ranges.remove(index))
    }

    fn check_removable(&self, index: usize) -> Result<()> {
        if index >= self.time_ranges.len() {
            return Err(SyncError::invalid_value(
                "time_ranges",
                format!("no range at index {}", index),
            ));
        }
        if self.time_ranges.len() == 1 {
            return Err(SyncError::invalid_value(
                "time_ranges",
                "a schedule keeps at least one range",
            ));
        }
        Ok(())
    }

    fn range_mut(&mut self, index: &str, field: &str) -> Result<&mut TimeRange> {
        let index: usize = index
            .parse()
            .map_err(|_| SyncError::unknown_field(Self::KIND, field))?;
        self.time_ranges
            .get_mut(index)
            .ok_or_else(|| SyncError::invalid_value(field, format!("no range at index {}", index)))
    }
}

impl Entity for Schedule {
    const KIND: &'static str = "schedule";

    type Record = ScheduleRecord;
    type Payload = SchedulePayload;

    fn from_record(record: ScheduleRecord) -> (RemoteId, Self) {
        let has_slots = record.has_slots();
        let time_ranges = record
            .time_slot
            .unwrap_or_default()
            .into_iter()
            .map(|slot| {
                TimeRange::from_slot(
                    RemoteId::new(slot.id),
                    parse_time(&slot.start_time).unwrap_or_else(default_start),
                    parse_time(&slot.end_time).unwrap_or_else(default_end),
                )
            })
            .collect::<Vec<_>>();

        (
            RemoteId::new(record.id.clone()),
            Schedule {
                event_id: record.id,
                event_title: Some(record.title),
                time_ranges: if time_ranges.is_empty() {
                    vec![TimeRange::default()]
                } else {
                    time_ranges
                },
                is_assigned: has_slots,
            },
        )
    }

    fn payload(&self, _id: Option<&RemoteId>) -> SchedulePayload {
        SchedulePayload {
            event_id: self.event_id.clone(),
            time_slots: self
                .time_ranges
                .iter()
                .map(|range| SlotPayload {
                    id: range.slot_id.as_ref().map(|id| id.to_string()),
                    start_time: format_time_with_seconds(&range.start_time),
                    end_time: format_time_with_seconds(&range.end_time),
                })
                .collect(),
            is_assigned: self.is_assigned,
        }
    }

    fn validate(&self, _ctx: &ValidationContext) -> FieldErrors {
        let mut errors = FieldErrors::new();

        if is_blank(&self.event_id) {
            errors.insert("event_id", "Seleccione un evento");
        }
        if self.time_ranges.iter().any(|range| !range.is_valid()) {
            errors.insert(
                "time_ranges",
                "Algunos rangos tienen fin antes o igual al inicio",
            );
        }

        errors
    }

    /// Fields: `event_id`, `is_assigned`, `ranges.N.start_time`, `ranges.N.end_time`
    fn set_field(&mut self, field: &str, value: &str) -> Result<()> {
        match field.split('.').collect::<Vec<_>>().as_slice() {
            ["event_id"] => self.event_id = value.to_string(),
            ["is_assigned"] => self.is_assigned = parse_bool(field, value)?,
            ["ranges", index, "start_time"] => {
                let time = set_time(field, value)?;
                self.range_mut(index, field)?.start_time = time;
            }
            ["ranges", index, "end_time"] => {
                let time = set_time(field, value)?;
                self.range_mut(index, field)?.end_time = time;
            }
            _ => return Err(SyncError::unknown_field(Self::KIND, field)),
        }
        Ok(())
    }

    fn label(&self) -> String {
        let ranges = self
            .time_ranges
            .iter()
            .map(TimeRange::display)
            .collect::<Vec<_>>()
            .join(", ");
        match &self.event_title {
            Some(title) => format!("{} [{}]", title, ranges),
            None => format!("{} [{}]", self.event_id, ranges),
        }
    }

    /// Slot updates are keyed by event, so the event id stands in
    fn fallback_id(&self) -> Option<RemoteId> {
        Some(RemoteId::new(self.event_id.clone())).filter(|id| !id.as_str().is_empty())
    }

    /// Every range is now held by the backend
    ///
    /// Slot ids not yet known locally are handed out, in order, to the ranges
    /// lacking one. When the counts disagree the ranges stay unidentified.
    fn confirmed(&mut self, part_ids: &[RemoteId]) {
        let known: Vec<RemoteId> = self
            .time_ranges
            .iter()
            .filter_map(|range| range.slot_id.clone())
            .collect();
        let fresh: Vec<&RemoteId> = part_ids.iter().filter(|id| !known.contains(id)).collect();
        let missing = self
            .time_ranges
            .iter()
            .filter(|range| range.slot_id.is_none())
            .count();

        if fresh.len() == missing {
            let mut fresh = fresh.into_iter();
            for range in self.time_ranges.iter_mut().filter(|r| r.slot_id.is_none()) {
                range.slot_id = fresh.next().cloned();
            }
        } else if missing > 0 {
            tracing::warn!(
                event_id = %self.event_id,
                missing,
                reported = fresh.len(),
                "Could not match slot ids to saved ranges"
            );
        }

        for range in &mut self.time_ranges {
            range.saved = true;
        }
    }

    fn check_deletable(&self) -> Result<()> {
        if self.time_ranges.iter().any(TimeRange::is_unidentified) {
            return Err(SyncError::UnknownPartIds { kind: Self::KIND });
        }
        Ok(())
    }
}

impl DraftList<Schedule> {
    /// Remove one range of a schedule
    ///
    /// Ranges backed by a saved slot are deleted remotely first; local removal
    /// only happens once the backend accepted the delete.
    pub async fn remove_slot<S>(&mut self, key: LocalKey, index: usize, store: &S) -> Result<()>
    where
        S: SlotStore + ?Sized,
    {
        let record = self.record_mut(key)?;
        record.value().check_removable(index)?;
        if record.value().time_ranges[index].is_unidentified() {
            return Err(SyncError::UnknownPartIds {
                kind: Schedule::KIND,
            });
        }

        if let Some(slot_id) = record.value().time_ranges[index].slot_id.clone() {
            store.delete_slot(&slot_id).await.inspect_err(|e| {
                tracing::warn!(key = %key, slot_id = %slot_id, error = %e, "Slot delete failed");
            })?;
            tracing::info!(key = %key, slot_id = %slot_id, "Slot deleted");
        }

        record.value_mut().time_ranges.remove(index);
        record.mark_edited();
        Ok(())
    }
}
