use api::auth::generate_jwt;
use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use chrono::{Duration, Utc};
use serde_json::Value;
use tower::ServiceExt;

use db::models::{
    attendance_session::{
        Column as SessionCol, Entity as SessionEntity, Model as SessionModel, SessionType,
    },
    group::Model as GroupModel,
    group_member::{Model as GroupMemberModel, Role},
    user::Model as UserModel,
};
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};

use crate::helpers::make_test_app;

const FACULTY_LAT: f64 = 12.9716;
const FACULTY_LNG: f64 = 77.5946;

struct TestCtx {
    faculty: UserModel,
    student: UserModel,
    outsider: UserModel,
    admin: UserModel,
    group: GroupModel,
}

async fn setup(db: &sea_orm::DatabaseConnection) -> TestCtx {
    let faculty = UserModel::create(db, "sess_fac", "sess_fac@test.com", "password", false)
        .await
        .unwrap();
    let student = UserModel::create(db, "sess_stud", "sess_stud@test.com", "password", false)
        .await
        .unwrap();
    let outsider = UserModel::create(db, "sess_out", "sess_out@test.com", "password", false)
        .await
        .unwrap();
    let admin = UserModel::create(db, "sess_admin", "sess_admin@test.com", "password", true)
        .await
        .unwrap();
    let group = GroupModel::create(db, "PHY105", "Mechanics").await.unwrap();

    GroupMemberModel::assign(db, faculty.id, group.id, Role::Faculty)
        .await
        .unwrap();
    GroupMemberModel::assign(db, student.id, group.id, Role::Student)
        .await
        .unwrap();

    TestCtx {
        faculty,
        student,
        outsider,
        admin,
        group,
    }
}

fn create_session_request(token: &str, group_id: i64, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(format!("/api/groups/{}/attendance/sessions", group_id))
        .header("Authorization", format!("Bearer {}", token))
        .header("Content-Type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get_request(token: &str, uri: String) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .header("Authorization", format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap()
}

async fn body_json(resp: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn minimal_session_body() -> Value {
    serde_json::json!({
        "session_name": "Week 1 Lab",
        "session_type": "lab",
        "faculty_latitude": FACULTY_LAT,
        "faculty_longitude": FACULTY_LNG,
    })
}

#[tokio::test]
async fn faculty_creates_session_with_generated_token_and_default_window() {
    let (app, state) = make_test_app().await;
    let ctx = setup(state.db()).await;

    let (token, _) = generate_jwt(ctx.faculty.id, ctx.faculty.admin);
    let resp = app
        .oneshot(create_session_request(
            &token,
            ctx.group.id,
            minimal_session_body(),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);

    let json = body_json(resp).await;
    assert_eq!(json["success"], true);
    assert_eq!(json["message"], "Attendance session created");
    let qr_token = json["data"]["qr_token"].as_str().unwrap();
    assert_eq!(qr_token.len(), 32);
    assert_eq!(json["data"]["allowed_radius_meters"], 50.0);
    assert_eq!(json["data"]["record_count"], 0);

    // Session lands in the right group with a ~30 minute expiry window.
    let id = json["data"]["id"].as_i64().expect("id present");
    let sess = SessionEntity::find()
        .filter(SessionCol::Id.eq(id))
        .one(state.db())
        .await
        .unwrap()
        .expect("session created");
    assert_eq!(sess.group_id, ctx.group.id);
    let window = sess.expires_at - sess.created_at;
    assert!(window >= Duration::minutes(29) && window <= Duration::minutes(31));
}

#[tokio::test]
async fn student_cannot_create_session() {
    let (app, state) = make_test_app().await;
    let ctx = setup(state.db()).await;

    let (token, _) = generate_jwt(ctx.student.id, ctx.student.admin);
    let resp = app
        .oneshot(create_session_request(
            &token,
            ctx.group.id,
            minimal_session_body(),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn non_member_cannot_create_session_but_admin_can() {
    let (app, state) = make_test_app().await;
    let ctx = setup(state.db()).await;

    let (token, _) = generate_jwt(ctx.outsider.id, ctx.outsider.admin);
    let resp = app
        .clone()
        .oneshot(create_session_request(
            &token,
            ctx.group.id,
            minimal_session_body(),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let (token, _) = generate_jwt(ctx.admin.id, ctx.admin.admin);
    let resp = app
        .oneshot(create_session_request(
            &token,
            ctx.group.id,
            minimal_session_body(),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
}

#[tokio::test]
async fn invalid_session_payload_is_422() {
    let (app, state) = make_test_app().await;
    let ctx = setup(state.db()).await;

    let (token, _) = generate_jwt(ctx.faculty.id, ctx.faculty.admin);
    let body = serde_json::json!({
        "session_name": "Bad Coordinates",
        "session_type": "lecture",
        "faculty_latitude": 123.0,
        "faculty_longitude": FACULTY_LNG,
    });
    let resp = app
        .oneshot(create_session_request(&token, ctx.group.id, body))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn list_and_get_sessions() {
    let (app, state) = make_test_app().await;
    let ctx = setup(state.db()).await;

    let sess = SessionModel::create(
        state.db(),
        ctx.group.id,
        ctx.faculty.id,
        "Seeded Lecture",
        SessionType::Lecture,
        FACULTY_LAT,
        FACULTY_LNG,
        50.0,
        Utc::now() + Duration::minutes(30),
    )
    .await
    .unwrap();

    let (token, _) = generate_jwt(ctx.faculty.id, ctx.faculty.admin);
    let resp = app
        .clone()
        .oneshot(get_request(
            &token,
            format!("/api/groups/{}/attendance/sessions", ctx.group.id),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let json = body_json(resp).await;
    assert_eq!(json["data"]["total"], 1);
    assert_eq!(json["data"]["sessions"][0]["session_name"], "Seeded Lecture");

    let resp = app
        .clone()
        .oneshot(get_request(
            &token,
            format!(
                "/api/groups/{}/attendance/sessions/{}",
                ctx.group.id, sess.id
            ),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = app
        .oneshot(get_request(
            &token,
            format!("/api/groups/{}/attendance/sessions/99999", ctx.group.id),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn records_listing_and_csv_export_after_check_in() {
    let (app, state) = make_test_app().await;
    let ctx = setup(state.db()).await;

    let sess = SessionModel::create(
        state.db(),
        ctx.group.id,
        ctx.faculty.id,
        "Recorded Lab",
        SessionType::Lab,
        FACULTY_LAT,
        FACULTY_LNG,
        50.0,
        Utc::now() + Duration::minutes(30),
    )
    .await
    .unwrap();

    // Student checks in through the public endpoint.
    let (student_token, _) = generate_jwt(ctx.student.id, ctx.student.admin);
    let body = serde_json::json!({
        "qr_code_token": sess.qr_token,
        "student_latitude": FACULTY_LAT,
        "student_longitude": FACULTY_LNG,
    });
    let req = Request::builder()
        .method("POST")
        .uri("/api/attendance/check-in")
        .header("Authorization", format!("Bearer {}", student_token))
        .header("Content-Type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    let resp = app.clone().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    // Faculty sees the record with the username resolved.
    let (token, _) = generate_jwt(ctx.faculty.id, ctx.faculty.admin);
    let resp = app
        .clone()
        .oneshot(get_request(
            &token,
            format!(
                "/api/groups/{}/attendance/sessions/{}/records",
                ctx.group.id, sess.id
            ),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let json = body_json(resp).await;
    assert_eq!(json["data"]["total"], 1);
    assert_eq!(json["data"]["records"][0]["username"], "sess_stud");
    assert_eq!(json["data"]["records"][0]["status"], "present");

    // CSV export carries the same record.
    let resp = app
        .oneshot(get_request(
            &token,
            format!(
                "/api/groups/{}/attendance/sessions/{}/records/export",
                ctx.group.id, sess.id
            ),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let content_type = resp
        .headers()
        .get("content-type")
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(content_type.starts_with("text/csv"));

    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    let csv = String::from_utf8(bytes.to_vec()).unwrap();
    let mut lines = csv.lines();
    assert!(lines.next().unwrap().starts_with("session_id,student_id,username,status"));
    assert!(lines.next().unwrap().contains("sess_stud"));
}
