use api::auth::generate_jwt;
use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use chrono::{Duration, Utc};
use sea_orm::{EntityTrait, PaginatorTrait};
use serde_json::Value;
use tower::ServiceExt;

use db::models::{
    attendance_record,
    attendance_session::{Model as SessionModel, SessionType},
    group::Model as GroupModel,
    group_member::{Model as GroupMemberModel, Role},
    user::Model as UserModel,
};

use crate::helpers::make_test_app;

const FACULTY_LAT: f64 = 12.9716;
const FACULTY_LNG: f64 = 77.5946;

struct TestCtx {
    student: UserModel,
    session: SessionModel,
}

async fn setup(db: &sea_orm::DatabaseConnection, expires_in_minutes: i64) -> TestCtx {
    let lecturer = UserModel::create(db, "ci_lect", "ci_lect@test.com", "password", false)
        .await
        .unwrap();
    let student = UserModel::create(db, "ci_student", "ci_student@test.com", "password", false)
        .await
        .unwrap();
    let group = GroupModel::create(db, "CSC212", "Data Structures")
        .await
        .unwrap();

    GroupMemberModel::assign(db, lecturer.id, group.id, Role::Faculty)
        .await
        .unwrap();
    GroupMemberModel::assign(db, student.id, group.id, Role::Student)
        .await
        .unwrap();

    let session = SessionModel::create(
        db,
        group.id,
        lecturer.id,
        "Week 3 Lecture",
        SessionType::Lecture,
        FACULTY_LAT,
        FACULTY_LNG,
        50.0,
        Utc::now() + Duration::minutes(expires_in_minutes),
    )
    .await
    .unwrap();

    TestCtx { student, session }
}

fn check_in_request(token: &str, qr_token: &str, lat: f64, lng: f64) -> Request<Body> {
    let body = serde_json::json!({
        "qr_code_token": qr_token,
        "student_latitude": lat,
        "student_longitude": lng,
    });
    Request::builder()
        .method("POST")
        .uri("/api/attendance/check-in")
        .header("Authorization", format!("Bearer {}", token))
        .header("Content-Type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_json(resp: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn check_in_at_session_position_is_present() {
    let (app, state) = make_test_app().await;
    let ctx = setup(state.db(), 30).await;

    let (token, _) = generate_jwt(ctx.student.id, ctx.student.admin);
    let resp = app
        .oneshot(check_in_request(
            &token,
            &ctx.session.qr_token,
            FACULTY_LAT,
            FACULTY_LNG,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let json = body_json(resp).await;
    assert_eq!(json["success"], true);
    assert_eq!(json["data"]["status"], "present");
    assert_eq!(json["data"]["session_name"], "Week 3 Lecture");
    assert_eq!(json["data"]["session_type"], "lecture");
    assert!(json["data"]["distance_from_faculty_meters"].as_f64().unwrap() < 1.0);

    let count = attendance_record::Entity::find()
        .count(state.db())
        .await
        .unwrap();
    assert_eq!(count, 1);
}

#[tokio::test]
async fn check_in_200m_away_is_late() {
    let (app, state) = make_test_app().await;
    let ctx = setup(state.db(), 30).await;

    let (token, _) = generate_jwt(ctx.student.id, ctx.student.admin);
    let resp = app
        .oneshot(check_in_request(
            &token,
            &ctx.session.qr_token,
            FACULTY_LAT + 0.0018,
            FACULTY_LNG,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let json = body_json(resp).await;
    assert_eq!(json["data"]["status"], "late");
    let d = json["data"]["distance_from_faculty_meters"].as_f64().unwrap();
    assert!((d - 200.0).abs() / 200.0 < 0.05, "got {d}");
}

#[tokio::test]
async fn unknown_token_is_404_and_nothing_is_inserted() {
    let (app, state) = make_test_app().await;
    let ctx = setup(state.db(), 30).await;

    let (token, _) = generate_jwt(ctx.student.id, ctx.student.admin);
    let resp = app
        .oneshot(check_in_request(
            &token,
            "no-such-token",
            FACULTY_LAT,
            FACULTY_LNG,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let count = attendance_record::Entity::find()
        .count(state.db())
        .await
        .unwrap();
    assert_eq!(count, 0);
}

#[tokio::test]
async fn second_check_in_is_409() {
    let (app, state) = make_test_app().await;
    let ctx = setup(state.db(), 30).await;

    let (token, _) = generate_jwt(ctx.student.id, ctx.student.admin);
    let first = app
        .clone()
        .oneshot(check_in_request(
            &token,
            &ctx.session.qr_token,
            FACULTY_LAT,
            FACULTY_LNG,
        ))
        .await
        .unwrap();
    assert_eq!(first.status(), StatusCode::OK);

    let second = app
        .oneshot(check_in_request(
            &token,
            &ctx.session.qr_token,
            FACULTY_LAT,
            FACULTY_LNG,
        ))
        .await
        .unwrap();
    assert_eq!(second.status(), StatusCode::CONFLICT);

    let count = attendance_record::Entity::find()
        .count(state.db())
        .await
        .unwrap();
    assert_eq!(count, 1);
}

#[tokio::test]
async fn expired_session_is_410() {
    let (app, state) = make_test_app().await;
    let ctx = setup(state.db(), -5).await;

    let (token, _) = generate_jwt(ctx.student.id, ctx.student.admin);
    let resp = app
        .oneshot(check_in_request(
            &token,
            &ctx.session.qr_token,
            FACULTY_LAT,
            FACULTY_LNG,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::GONE);
}

#[tokio::test]
async fn missing_bearer_token_is_401() {
    let (app, state) = make_test_app().await;
    let ctx = setup(state.db(), 30).await;

    let body = serde_json::json!({
        "qr_code_token": ctx.session.qr_token,
        "student_latitude": FACULTY_LAT,
        "student_longitude": FACULTY_LNG,
    });
    let req = Request::builder()
        .method("POST")
        .uri("/api/attendance/check-in")
        .header("Content-Type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();

    let resp = app.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn out_of_range_latitude_is_422() {
    let (app, state) = make_test_app().await;
    let ctx = setup(state.db(), 30).await;

    let (token, _) = generate_jwt(ctx.student.id, ctx.student.admin);
    let resp = app
        .oneshot(check_in_request(
            &token,
            &ctx.session.qr_token,
            95.0,
            FACULTY_LNG,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
}
