//! HttpRemoteStore: `IRemoteStore` over the JSON API.

use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::Serialize;

use muster_core::config::RemoteConfig;
use muster_core::errors::{MusterError, MusterResult, RemoteError};
use muster_core::models::{AttendanceKey, AttendanceMark, Meeting, Member};
use muster_core::traits::IRemoteStore;

use super::http_client::{HttpClient, HttpClientConfig};
use super::protocol::{AttendanceQuery, GroupQuery, IdPayload};

const ATTENDANCE_UPSERT: &str = "/v1/attendance/upsert";
const ATTENDANCE_DELETE: &str = "/v1/attendance/delete";
const ATTENDANCE_LIST: &str = "/v1/attendance/list";
const MEMBER_INSERT: &str = "/v1/members/insert";
const MEMBER_UPDATE: &str = "/v1/members/update";
const MEMBER_DELETE: &str = "/v1/members/delete";
const MEMBER_LIST: &str = "/v1/members/list";
const MEETING_UPSERT: &str = "/v1/meetings/upsert";
const MEETING_DELETE: &str = "/v1/meetings/delete";
const MEETING_LIST: &str = "/v1/meetings/list";

#[derive(Debug)]
pub struct HttpRemoteStore {
    client: HttpClient,
}

impl HttpRemoteStore {
    pub fn new(config: &RemoteConfig) -> MusterResult<Self> {
        let mut client = HttpClient::new(HttpClientConfig::from(config))?;
        if let Some(token) = &config.bearer_token {
            client.set_bearer_token(token.clone());
        }
        Ok(Self { client })
    }

    pub fn client(&self) -> &HttpClient {
        &self.client
    }

    async fn write<Req: Serialize + Sync>(&self, path: &str, payload: &Req) -> MusterResult<()> {
        self.client
            .post::<_, serde_json::Value>(path, payload)
            .await?
            .into_data()?;
        Ok(())
    }

    async fn list<Req, T>(&self, path: &str, query: &Req) -> MusterResult<Vec<T>>
    where
        Req: Serialize + Sync,
        T: DeserializeOwned,
    {
        let data = self.client.post::<_, Vec<T>>(path, query).await?.into_data()?;
        Ok(data.unwrap_or_default())
    }
}

/// Map a 409 or 404 on a keyed write to its typed remote error.
fn keyed(result: MusterResult<()>, entity: &str, id: &str) -> MusterResult<()> {
    match result {
        Err(MusterError::Remote(RemoteError::Rejected { status: 409, .. })) => {
            Err(RemoteError::AlreadyExists {
                entity: entity.to_string(),
                id: id.to_string(),
            }
            .into())
        }
        Err(MusterError::Remote(RemoteError::Rejected { status: 404, .. })) => {
            Err(RemoteError::NotFound {
                entity: entity.to_string(),
                id: id.to_string(),
            }
            .into())
        }
        other => other,
    }
}

/// Deletes of rows the server no longer has are success.
fn absent_ok(result: MusterResult<()>) -> MusterResult<()> {
    match result {
        Err(MusterError::Remote(RemoteError::Rejected { status: 404, .. })) => Ok(()),
        other => other,
    }
}

impl IRemoteStore for HttpRemoteStore {
    async fn upsert_attendance(&self, mark: &AttendanceMark) -> MusterResult<()> {
        self.write(ATTENDANCE_UPSERT, mark).await
    }

    async fn delete_attendance(&self, key: &AttendanceKey) -> MusterResult<()> {
        absent_ok(self.write(ATTENDANCE_DELETE, key).await)
    }

    async fn insert_member(&self, member: &Member) -> MusterResult<()> {
        keyed(self.write(MEMBER_INSERT, member).await, "member", &member.id)
    }

    async fn update_member(&self, member: &Member) -> MusterResult<()> {
        keyed(self.write(MEMBER_UPDATE, member).await, "member", &member.id)
    }

    async fn delete_member(&self, id: &str) -> MusterResult<()> {
        let body = IdPayload { id: id.to_string() };
        absent_ok(self.write(MEMBER_DELETE, &body).await)
    }

    async fn upsert_meeting(&self, meeting: &Meeting) -> MusterResult<()> {
        self.write(MEETING_UPSERT, meeting).await
    }

    async fn delete_meeting(&self, id: &str) -> MusterResult<()> {
        let body = IdPayload { id: id.to_string() };
        absent_ok(self.write(MEETING_DELETE, &body).await)
    }

    async fn list_members(&self, group_id: &str) -> MusterResult<Vec<Member>> {
        let query = GroupQuery {
            group_id: group_id.to_string(),
            since: None,
        };
        self.list(MEMBER_LIST, &query).await
    }

    async fn list_meetings(&self, group_id: &str, since: NaiveDate) -> MusterResult<Vec<Meeting>> {
        let query = GroupQuery {
            group_id: group_id.to_string(),
            since: Some(since),
        };
        self.list(MEETING_LIST, &query).await
    }

    async fn list_attendance(&self, meeting_ids: &[String]) -> MusterResult<Vec<AttendanceMark>> {
        let query = AttendanceQuery {
            meeting_ids: meeting_ids.to_vec(),
        };
        self.list(ATTENDANCE_LIST, &query).await
    }
}
