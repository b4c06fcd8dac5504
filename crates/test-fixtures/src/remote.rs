//! InMemoryRemote: a deterministic [`IRemoteStore`] with a call log and
//! failure injection, used by the storage and sync test suites.

use std::collections::{BTreeMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::NaiveDate;
use tokio::sync::Semaphore;

use muster_core::errors::{MusterResult, RemoteError};
use muster_core::models::{AttendanceKey, AttendanceMark, Meeting, Member};
use muster_core::traits::IRemoteStore;

use crate::seeds::GroupSeed;

/// One observed call against the remote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteCall {
    UpsertAttendance { target: String, is_present: bool },
    DeleteAttendance { target: String },
    InsertMember { id: String },
    UpdateMember { id: String },
    DeleteMember { id: String },
    UpsertMeeting { id: String },
    DeleteMeeting { id: String },
    ListMembers { group_id: String },
    ListMeetings { group_id: String, since: NaiveDate },
    ListAttendance { meeting_ids: Vec<String> },
}

impl RemoteCall {
    pub fn is_write(&self) -> bool {
        !matches!(
            self,
            Self::ListMembers { .. } | Self::ListMeetings { .. } | Self::ListAttendance { .. }
        )
    }
}

#[derive(Default)]
struct RemoteState {
    members: BTreeMap<String, Member>,
    meetings: BTreeMap<String, Meeting>,
    attendance: BTreeMap<AttendanceKey, AttendanceMark>,
    calls: Vec<RemoteCall>,
    failing_targets: HashSet<String>,
}

/// Server stand-in. Cheap to clone; clones share state.
#[derive(Clone, Default)]
pub struct InMemoryRemote {
    state: Arc<Mutex<RemoteState>>,
    down: Arc<AtomicBool>,
    fail_reads: Arc<AtomicBool>,
    write_gate: Option<Arc<Semaphore>>,
}

impl InMemoryRemote {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remote pre-populated from a seed file.
    pub fn seeded(seed: &GroupSeed) -> Self {
        let remote = Self::new();
        {
            let mut state = remote.lock();
            for m in &seed.members {
                state.members.insert(m.id.clone(), m.clone());
            }
            for m in seed.meetings() {
                state.meetings.insert(m.id.clone(), m);
            }
            for a in &seed.attendance {
                state.attendance.insert(a.key(), a.clone());
            }
        }
        remote
    }

    /// Writes wait for a permit on `gate` before touching state. Start the
    /// gate with zero permits to hold a sync pass mid-flight.
    pub fn with_write_gate(mut self, gate: Arc<Semaphore>) -> Self {
        self.write_gate = Some(gate);
        self
    }

    // --- Failure injection ---

    /// Every call fails with a network error while `down` is set.
    pub fn set_down(&self, down: bool) {
        self.down.store(down, Ordering::SeqCst);
    }

    /// Bulk reads fail while set; writes are unaffected.
    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Writes to `target` (an id, or `meeting/member` for attendance) fail
    /// until [`heal`](Self::heal) is called.
    pub fn fail_writes_for(&self, target: &str) {
        self.lock().failing_targets.insert(target.to_string());
    }

    pub fn heal(&self, target: &str) {
        self.lock().failing_targets.remove(target);
    }

    // --- Inspection ---

    pub fn calls(&self) -> Vec<RemoteCall> {
        self.lock().calls.clone()
    }

    pub fn write_calls(&self) -> Vec<RemoteCall> {
        self.lock()
            .calls
            .iter()
            .filter(|c| c.is_write())
            .cloned()
            .collect()
    }

    pub fn write_count(&self) -> usize {
        self.lock().calls.iter().filter(|c| c.is_write()).count()
    }

    pub fn reset_calls(&self) {
        self.lock().calls.clear();
    }

    pub fn member(&self, id: &str) -> Option<Member> {
        self.lock().members.get(id).cloned()
    }

    pub fn meeting(&self, id: &str) -> Option<Meeting> {
        self.lock().meetings.get(id).cloned()
    }

    pub fn attendance(&self, meeting_id: &str, member_id: &str) -> Option<AttendanceMark> {
        let key = AttendanceKey {
            meeting_id: meeting_id.to_string(),
            member_id: member_id.to_string(),
        };
        self.lock().attendance.get(&key).cloned()
    }

    pub fn attendance_len(&self) -> usize {
        self.lock().attendance.len()
    }

    pub fn put_member(&self, member: Member) {
        self.lock().members.insert(member.id.clone(), member);
    }

    pub fn put_meeting(&self, meeting: Meeting) {
        self.lock().meetings.insert(meeting.id.clone(), meeting);
    }

    pub fn put_attendance(&self, mark: AttendanceMark) {
        self.lock().attendance.insert(mark.key(), mark);
    }

    fn lock(&self) -> MutexGuard<'_, RemoteState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn check_up(&self) -> MusterResult<()> {
        if self.down.load(Ordering::SeqCst) {
            return Err(RemoteError::Network {
                reason: "remote unreachable".to_string(),
            }
            .into());
        }
        Ok(())
    }

    async fn before_write(&self) -> MusterResult<()> {
        if let Some(gate) = &self.write_gate {
            let permit = gate.acquire().await.map_err(|_| RemoteError::Network {
                reason: "write gate closed".to_string(),
            })?;
            permit.forget();
        }
        self.check_up()
    }

    fn before_read(&self) -> MusterResult<()> {
        self.check_up()?;
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(RemoteError::Network {
                reason: "bulk read failed".to_string(),
            }
            .into());
        }
        Ok(())
    }

    /// Log the call, then fail it if its target is marked failing.
    fn record_write(state: &mut RemoteState, call: RemoteCall, target: &str) -> MusterResult<()> {
        state.calls.push(call);
        if state.failing_targets.contains(target) {
            return Err(RemoteError::Rejected {
                status: 503,
                reason: format!("injected failure for {target}"),
            }
            .into());
        }
        Ok(())
    }
}

fn attendance_target(meeting_id: &str, member_id: &str) -> String {
    format!("{meeting_id}/{member_id}")
}

impl IRemoteStore for InMemoryRemote {
    async fn upsert_attendance(&self, mark: &AttendanceMark) -> MusterResult<()> {
        self.before_write().await?;
        let target = attendance_target(&mark.meeting_id, &mark.member_id);
        let mut state = self.lock();
        let call = RemoteCall::UpsertAttendance {
            target: target.clone(),
            is_present: mark.is_present,
        };
        Self::record_write(&mut state, call, &target)?;
        state.attendance.insert(mark.key(), mark.clone());
        Ok(())
    }

    async fn delete_attendance(&self, key: &AttendanceKey) -> MusterResult<()> {
        self.before_write().await?;
        let target = attendance_target(&key.meeting_id, &key.member_id);
        let mut state = self.lock();
        let call = RemoteCall::DeleteAttendance {
            target: target.clone(),
        };
        Self::record_write(&mut state, call, &target)?;
        state.attendance.remove(key);
        Ok(())
    }

    async fn insert_member(&self, member: &Member) -> MusterResult<()> {
        self.before_write().await?;
        let mut state = self.lock();
        let call = RemoteCall::InsertMember {
            id: member.id.clone(),
        };
        Self::record_write(&mut state, call, &member.id)?;
        if state.members.contains_key(&member.id) {
            return Err(RemoteError::AlreadyExists {
                entity: "member".to_string(),
                id: member.id.clone(),
            }
            .into());
        }
        state.members.insert(member.id.clone(), member.clone());
        Ok(())
    }

    async fn update_member(&self, member: &Member) -> MusterResult<()> {
        self.before_write().await?;
        let mut state = self.lock();
        let call = RemoteCall::UpdateMember {
            id: member.id.clone(),
        };
        Self::record_write(&mut state, call, &member.id)?;
        match state.members.get_mut(&member.id) {
            Some(existing) => {
                *existing = member.clone();
                Ok(())
            }
            None => Err(RemoteError::NotFound {
                entity: "member".to_string(),
                id: member.id.clone(),
            }
            .into()),
        }
    }

    async fn delete_member(&self, id: &str) -> MusterResult<()> {
        self.before_write().await?;
        let mut state = self.lock();
        let call = RemoteCall::DeleteMember { id: id.to_string() };
        Self::record_write(&mut state, call, id)?;
        state.members.remove(id);
        state.attendance.retain(|key, _| key.member_id != id);
        Ok(())
    }

    async fn upsert_meeting(&self, meeting: &Meeting) -> MusterResult<()> {
        self.before_write().await?;
        let mut state = self.lock();
        let call = RemoteCall::UpsertMeeting {
            id: meeting.id.clone(),
        };
        Self::record_write(&mut state, call, &meeting.id)?;
        state.meetings.insert(meeting.id.clone(), meeting.clone());
        Ok(())
    }

    async fn delete_meeting(&self, id: &str) -> MusterResult<()> {
        self.before_write().await?;
        let mut state = self.lock();
        let call = RemoteCall::DeleteMeeting { id: id.to_string() };
        Self::record_write(&mut state, call, id)?;
        state.meetings.remove(id);
        state.attendance.retain(|key, _| key.meeting_id != id);
        Ok(())
    }

    async fn list_members(&self, group_id: &str) -> MusterResult<Vec<Member>> {
        let mut state = self.lock();
        state.calls.push(RemoteCall::ListMembers {
            group_id: group_id.to_string(),
        });
        drop(state);
        self.before_read()?;
        let state = self.lock();
        Ok(state
            .members
            .values()
            .filter(|m| m.group_id == group_id)
            .cloned()
            .collect())
    }

    async fn list_meetings(&self, group_id: &str, since: NaiveDate) -> MusterResult<Vec<Meeting>> {
        let mut state = self.lock();
        state.calls.push(RemoteCall::ListMeetings {
            group_id: group_id.to_string(),
            since,
        });
        drop(state);
        self.before_read()?;
        let state = self.lock();
        Ok(state
            .meetings
            .values()
            .filter(|m| m.group_id == group_id && m.held_on >= since)
            .cloned()
            .collect())
    }

    async fn list_attendance(&self, meeting_ids: &[String]) -> MusterResult<Vec<AttendanceMark>> {
        let mut state = self.lock();
        state.calls.push(RemoteCall::ListAttendance {
            meeting_ids: meeting_ids.to_vec(),
        });
        drop(state);
        self.before_read()?;
        let state = self.lock();
        Ok(state
            .attendance
            .values()
            .filter(|a| meeting_ids.contains(&a.meeting_id))
            .cloned()
            .collect())
    }
}
