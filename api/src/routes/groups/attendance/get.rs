//! Attendance session read-only routes (list sessions, get session,
//! list records, export records as CSV).

use axum::{
    Json,
    extract::{Path, Query, State},
    http::{HeaderMap, HeaderValue, StatusCode},
};
use chrono::{SecondsFormat, Utc};
use sea_orm::{ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder};
use util::state::AppState;

use crate::response::ApiResponse;

use super::common::{
    AttendanceRecordDto, AttendanceSessionResponse, ListQuery, ListResponse, RecordsListQuery,
    RecordsListResponse,
};
use db::models::attendance_session::{
    Column as SessionCol, Entity as SessionEntity, Model as Session,
};
use db::models::{
    attendance_record::{Column as RecordCol, Entity as RecordEntity},
    user::{Column as UserCol, Entity as UserEntity},
};

/// GET `/api/groups/{group_id}/attendance/sessions`
///
/// List attendance sessions for a group.
///
/// **Auth**: Faculty of the group (or admin).
///
/// **Query**:
/// - `q` *(optional)*: fuzzy match on session name
/// - `sort` *(optional)*: `created_at` | `session_name` | `expires_at`
///   (prefix `-` for desc)
/// - `page` *(default 1)*
/// - `per_page` *(default 20, max 100)*
pub async fn list_sessions(
    State(state): State<AppState>,
    Path(group_id): Path<i64>,
    Query(q): Query<ListQuery>,
) -> (StatusCode, Json<ApiResponse<ListResponse>>) {
    let db = state.db();
    let page = q.page.unwrap_or(1).max(1) as u64;
    let per_page = q.per_page.unwrap_or(20).clamp(1, 100) as u64;

    // Base select
    let mut sel = SessionEntity::find().filter(SessionCol::GroupId.eq(group_id));
    if let Some(s) = q.q.as_ref().filter(|s| !s.trim().is_empty()) {
        sel = sel.filter(SessionCol::SessionName.contains(s.as_str()));
    }
    sel = match q.sort.as_deref() {
        Some(sort) if sort.starts_with('-') => match &sort[1..] {
            "created_at" => sel.order_by_desc(SessionCol::CreatedAt),
            "session_name" => sel.order_by_desc(SessionCol::SessionName),
            "expires_at" => sel.order_by_desc(SessionCol::ExpiresAt),
            _ => sel.order_by_desc(SessionCol::CreatedAt),
        },
        Some("created_at") => sel.order_by_asc(SessionCol::CreatedAt),
        Some("session_name") => sel.order_by_asc(SessionCol::SessionName),
        Some("expires_at") => sel.order_by_asc(SessionCol::ExpiresAt),
        _ => sel.order_by_desc(SessionCol::CreatedAt),
    };

    let paginator = sel.paginate(db, per_page);
    let total = paginator.num_items().await.unwrap_or(0) as i32;
    let rows: Vec<Session> = paginator
        .fetch_page(page.saturating_sub(1))
        .await
        .unwrap_or_default();

    let mut sessions = Vec::with_capacity(rows.len());
    for s in rows {
        let count = Session::record_count(db, s.id).await.unwrap_or(0) as i64;
        sessions.push(AttendanceSessionResponse::from_with_count(s, count));
    }

    let resp = ListResponse {
        sessions,
        page: page as i32,
        per_page: per_page as i32,
        total,
    };

    (
        StatusCode::OK,
        Json(ApiResponse::success(resp, "Attendance sessions retrieved")),
    )
}

/// GET `/api/groups/{group_id}/attendance/sessions/{session_id}`
///
/// Fetch a single attendance session with its record count.
///
/// **Auth**: Faculty of the group (or admin).
pub async fn get_session(
    State(state): State<AppState>,
    Path((group_id, session_id)): Path<(i64, i64)>,
) -> (StatusCode, Json<ApiResponse<AttendanceSessionResponse>>) {
    let db = state.db();

    let m = SessionEntity::find()
        .filter(
            Condition::all()
                .add(SessionCol::Id.eq(session_id))
                .add(SessionCol::GroupId.eq(group_id)),
        )
        .one(db)
        .await;

    match m {
        Ok(Some(row)) => {
            let count = Session::record_count(db, row.id).await.unwrap_or(0) as i64;
            let resp = AttendanceSessionResponse::from_with_count(row, count);

            (
                StatusCode::OK,
                Json(ApiResponse::success(resp, "Attendance session retrieved")),
            )
        }
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(ApiResponse::error("Attendance session not found")),
        ),
        Err(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiResponse::error(
                "Database error retrieving attendance session",
            )),
        ),
    }
}

/// GET `/api/groups/{group_id}/attendance/sessions/{session_id}/records`
///
/// List check-in records for a session with pagination, sorting, and search.
///
/// **Auth**: Faculty of the group (or admin).
///
/// **Query**:
/// - `q` *(optional)*: numeric → `student_id`; otherwise `username` contains
/// - `sort` *(optional)*: `check_in_time` | `student_id` | `distance`
///   (prefix with `-` for desc). Default `-check_in_time`.
/// - `page` *(default 1)*
/// - `per_page` *(default 20, max 200)*
pub async fn list_session_records(
    State(state): State<AppState>,
    Path((_, session_id)): Path<(i64, i64)>,
    Query(q): Query<RecordsListQuery>,
) -> (StatusCode, Json<ApiResponse<RecordsListResponse>>) {
    let db = state.db();

    let page = q.page.unwrap_or(1).max(1) as u64;
    let per_page = q.per_page.unwrap_or(20).clamp(1, 200) as u64;

    // ----- Base selector
    let mut sel = RecordEntity::find().filter(RecordCol::SessionId.eq(session_id));

    // ----- Search (q)
    if let Some(raw) = q
        .q
        .as_ref()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
    {
        if let Ok(sid) = raw.parse::<i64>() {
            sel = sel.filter(RecordCol::StudentId.eq(sid));
        } else {
            // username contains → resolve student ids and filter
            let name_ids: Vec<i64> = UserEntity::find()
                .filter(UserCol::Username.contains(raw.as_str()))
                .all(db)
                .await
                .unwrap_or_default()
                .into_iter()
                .map(|u| u.id)
                .collect();
            let mut cond = Condition::any();
            if !name_ids.is_empty() {
                cond = cond.add(RecordCol::StudentId.is_in(name_ids));
            } else {
                // no matching usernames -> empty result
                cond = cond.add(RecordCol::StudentId.eq(-1));
            }
            sel = sel.filter(cond);
        }
    }

    // ----- Sorting
    sel = match q.sort.as_deref() {
        Some(sort) if sort.starts_with('-') => match &sort[1..] {
            "check_in_time" => sel.order_by_desc(RecordCol::CheckInTime),
            "student_id" => sel.order_by_desc(RecordCol::StudentId),
            "distance" => sel.order_by_desc(RecordCol::DistanceFromFacultyMeters),
            _ => sel.order_by_desc(RecordCol::CheckInTime),
        },
        Some("check_in_time") => sel.order_by_asc(RecordCol::CheckInTime),
        Some("student_id") => sel.order_by_asc(RecordCol::StudentId),
        Some("distance") => sel.order_by_asc(RecordCol::DistanceFromFacultyMeters),
        _ => sel.order_by_desc(RecordCol::CheckInTime), // default newest first
    };

    // ----- Pagination
    let paginator = sel.paginate(db, per_page);
    let total = paginator.num_items().await.unwrap_or(0) as i32;
    let rows = paginator
        .fetch_page(page.saturating_sub(1))
        .await
        .unwrap_or_default();

    // Resolve usernames only for the page results
    let student_ids: Vec<i64> = rows.iter().map(|r| r.student_id).collect();
    let mut uname_map = std::collections::HashMap::<i64, String>::new();
    if !student_ids.is_empty() {
        let users = UserEntity::find()
            .filter(UserCol::Id.is_in(student_ids.clone()))
            .all(db)
            .await
            .unwrap_or_default();
        for u in users {
            uname_map.insert(u.id, u.username);
        }
    }

    let records = rows
        .into_iter()
        .map(|r| AttendanceRecordDto {
            id: r.id,
            session_id,
            student_id: r.student_id,
            username: uname_map.get(&r.student_id).cloned(),
            status: r.status.to_string(),
            check_in_time: r
                .check_in_time
                .with_timezone(&Utc)
                .to_rfc3339_opts(SecondsFormat::Secs, true),
            distance_from_faculty_meters: r.distance_from_faculty_meters,
        })
        .collect::<Vec<_>>();

    let resp = RecordsListResponse {
        records,
        page: page as i32,
        per_page: per_page as i32,
        total,
    };

    (
        StatusCode::OK,
        Json(ApiResponse::success(resp, "Attendance records retrieved")),
    )
}

/// GET `/api/groups/{group_id}/attendance/sessions/{session_id}/records/export`
///
/// Export all check-in records for a session as a CSV file.
///
/// **Auth**: Faculty of the group (or admin).
///
/// **Response**: `text/csv` attachment with columns:
/// `session_id,student_id,username,status,check_in_time,student_latitude,student_longitude,distance_from_faculty_meters`
pub async fn export_session_records_csv(
    State(state): State<AppState>,
    Path((_, session_id)): Path<(i64, i64)>,
) -> (StatusCode, (HeaderMap, String)) {
    let db = state.db();

    let records = match RecordEntity::find()
        .filter(RecordCol::SessionId.eq(session_id))
        .all(db)
        .await
    {
        Ok(v) => v,
        Err(_) => {
            let mut headers = HeaderMap::new();
            headers.insert(
                axum::http::header::CONTENT_TYPE,
                HeaderValue::from_static("text/plain; charset=utf-8"),
            );
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                (headers, "error".to_string()),
            );
        }
    };

    let student_ids: Vec<i64> = records.iter().map(|r| r.student_id).collect();
    let users = UserEntity::find()
        .filter(UserCol::Id.is_in(student_ids.clone()))
        .all(db)
        .await
        .unwrap_or_default();

    let mut uname_map = std::collections::HashMap::<i64, String>::new();
    for u in users {
        uname_map.insert(u.id, u.username);
    }

    // CSV header
    let mut csv = String::from(
        "session_id,student_id,username,status,check_in_time,student_latitude,student_longitude,distance_from_faculty_meters\n",
    );

    fn esc(s: &str) -> String {
        if s.contains(',') || s.contains('"') || s.contains('\n') {
            format!("\"{}\"", s.replace('"', "\"\""))
        } else {
            s.to_string()
        }
    }

    for r in records {
        let uname = uname_map.get(&r.student_id).map(|s| s.as_str()).unwrap_or("");
        let check_in_iso = r
            .check_in_time
            .with_timezone(&Utc)
            .to_rfc3339_opts(SecondsFormat::Secs, true);

        let row = format!(
            "{},{},{},{},{},{},{},{:.1}\n",
            r.session_id,
            r.student_id,
            esc(uname),
            r.status,
            esc(&check_in_iso),
            r.student_latitude,
            r.student_longitude,
            r.distance_from_faculty_meters
        );
        csv.push_str(&row);
    }

    let filename = format!("attendance_session_{}.csv", session_id);

    let mut headers = HeaderMap::new();
    headers.insert(
        axum::http::header::CONTENT_TYPE,
        HeaderValue::from_static("text/csv; charset=utf-8"),
    );
    headers.insert(
        axum::http::header::CONTENT_DISPOSITION,
        HeaderValue::from_str(&format!("attachment; filename=\"{}\"", filename))
            .unwrap_or(HeaderValue::from_static("attachment")),
    );

    (StatusCode::OK, (headers, csv))
}
