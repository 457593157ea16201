use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Serialize;

use crate::response::ApiResponse;
use db::grade::{self, GroupGradeStats, StudentGradeSummary};
use util::state::AppState;

#[derive(Debug, Serialize)]
pub struct StudentGradeRow {
    pub student_id: i64,
    pub username: String,
    pub total_points_earned: f64,
    pub total_points_possible: f64,
    pub percentage: f64,
    pub gpa: f64,
    pub completed_assignments: i64,
    pub total_assignments: i64,
    pub completion_rate: f64,
}

impl From<StudentGradeSummary> for StudentGradeRow {
    fn from(s: StudentGradeSummary) -> Self {
        Self {
            student_id: s.student_id,
            username: s.username,
            total_points_earned: s.total_points_earned,
            total_points_possible: s.total_points_possible,
            percentage: s.percentage,
            gpa: s.gpa,
            completed_assignments: s.completed_assignments,
            total_assignments: s.total_assignments,
            completion_rate: s.completion_rate,
        }
    }
}

#[derive(Debug, Serialize, Default)]
pub struct GroupGradesResponse {
    pub students: Vec<StudentGradeRow>,
    pub class_average_gpa: f64,
    pub class_average_score: f64,
    pub total_students: i64,
    pub total_assignments: i64,
    pub assignment_completion_rate: f64,
}

impl From<GroupGradeStats> for GroupGradesResponse {
    fn from(stats: GroupGradeStats) -> Self {
        Self {
            students: stats.students.into_iter().map(Into::into).collect(),
            class_average_gpa: stats.class_average_gpa,
            class_average_score: stats.class_average_score,
            total_students: stats.total_students,
            total_assignments: stats.total_assignments,
            assignment_completion_rate: stats.assignment_completion_rate,
        }
    }
}

/// GET `/api/groups/{group_id}/grades`
///
/// Per-student grade summaries and class statistics for the group,
/// computed fresh from assignments and graded submissions.
///
/// **Auth**: any member of the group (or admin).
pub async fn get_group_grades(
    State(state): State<AppState>,
    Path(group_id): Path<i64>,
) -> (StatusCode, Json<ApiResponse<GroupGradesResponse>>) {
    let db = state.db();

    match grade::group_student_grades(db, group_id).await {
        Ok(Some(stats)) => (
            StatusCode::OK,
            Json(ApiResponse::success(
                GroupGradesResponse::from(stats),
                "Group grades retrieved",
            )),
        ),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(ApiResponse::error("Group not found")),
        ),
        Err(e) => {
            tracing::error!(error = %e, group_id, "failed to compute group grades");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::error("Database error retrieving group grades")),
            )
        }
    }
}
