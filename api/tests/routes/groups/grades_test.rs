use api::auth::generate_jwt;
use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use chrono::{Duration, Utc};
use serde_json::Value;
use tower::ServiceExt;

use db::models::{
    assignment::Model as AssignmentModel,
    group::Model as GroupModel,
    group_member::{Model as GroupMemberModel, Role},
    submission::Model as SubmissionModel,
    user::Model as UserModel,
};

use crate::helpers::make_test_app;

struct TestCtx {
    faculty: UserModel,
    alice: UserModel,
    bob: UserModel,
    outsider: UserModel,
    admin: UserModel,
    group: GroupModel,
}

async fn setup(db: &sea_orm::DatabaseConnection) -> TestCtx {
    let faculty = UserModel::create(db, "gr_fac", "gr_fac@test.com", "password", false)
        .await
        .unwrap();
    let alice = UserModel::create(db, "gr_alice", "gr_alice@test.com", "password", false)
        .await
        .unwrap();
    let bob = UserModel::create(db, "gr_bob", "gr_bob@test.com", "password", false)
        .await
        .unwrap();
    let outsider = UserModel::create(db, "gr_out", "gr_out@test.com", "password", false)
        .await
        .unwrap();
    let admin = UserModel::create(db, "gr_admin", "gr_admin@test.com", "password", true)
        .await
        .unwrap();
    let group = GroupModel::create(db, "MAT144", "Linear Algebra")
        .await
        .unwrap();

    GroupMemberModel::assign(db, faculty.id, group.id, Role::Faculty)
        .await
        .unwrap();
    for u in [&alice, &bob] {
        GroupMemberModel::assign(db, u.id, group.id, Role::Student)
            .await
            .unwrap();
    }

    TestCtx {
        faculty,
        alice,
        bob,
        outsider,
        admin,
        group,
    }
}

fn grades_request(token: &str, group_id: i64) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(format!("/api/groups/{}/grades", group_id))
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

#[tokio::test]
async fn member_sees_aggregated_grades_sorted_by_gpa() {
    let (app, state) = make_test_app().await;
    let ctx = setup(state.db()).await;
    let db = state.db();

    let due = Utc::now() + Duration::days(7);
    let a1 = AssignmentModel::create(db, ctx.group.id, "Sheet 1", 100.0, due)
        .await
        .unwrap();

    // alice 92% -> 4.0; bob ungraded submission only -> roster entry with gpa 0
    SubmissionModel::create(db, a1.id, ctx.alice.id, 1, Some(92.0))
        .await
        .unwrap();
    SubmissionModel::create(db, a1.id, ctx.bob.id, 1, None)
        .await
        .unwrap();

    let (token, _) = generate_jwt(ctx.alice.id, ctx.alice.admin);
    let resp = app.oneshot(grades_request(&token, ctx.group.id)).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let json = body_json(resp).await;
    assert_eq!(json["success"], true);
    assert_eq!(json["data"]["total_students"], 2);
    assert_eq!(json["data"]["total_assignments"], 1);
    assert_eq!(json["data"]["students"][0]["username"], "gr_alice");
    assert_eq!(json["data"]["students"][0]["gpa"], 4.0);
    assert_eq!(json["data"]["students"][1]["username"], "gr_bob");
    assert_eq!(json["data"]["students"][1]["gpa"], 0.0);
    // Only alice counts toward the class averages.
    assert_eq!(json["data"]["class_average_gpa"], 4.0);
    assert_eq!(json["data"]["class_average_score"], 92.0);
}

#[tokio::test]
async fn faculty_sees_zero_stats_for_group_without_assignments() {
    let (app, state) = make_test_app().await;
    let ctx = setup(state.db()).await;

    let (token, _) = generate_jwt(ctx.faculty.id, ctx.faculty.admin);
    let resp = app.oneshot(grades_request(&token, ctx.group.id)).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let json = body_json(resp).await;
    assert_eq!(json["data"]["total_students"], 0);
    assert_eq!(json["data"]["class_average_gpa"], 0.0);
    assert_eq!(json["data"]["assignment_completion_rate"], 0.0);
    assert!(json["data"]["students"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn non_member_is_403() {
    let (app, state) = make_test_app().await;
    let ctx = setup(state.db()).await;

    let (token, _) = generate_jwt(ctx.outsider.id, ctx.outsider.admin);
    let resp = app.oneshot(grades_request(&token, ctx.group.id)).await.unwrap();
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn admin_gets_404_for_unknown_group() {
    let (app, state) = make_test_app().await;
    let ctx = setup(state.db()).await;

    let (token, _) = generate_jwt(ctx.admin.id, ctx.admin.admin);
    let resp = app.oneshot(grades_request(&token, 424242)).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}
