//! Grade aggregation for a group.
//!
//! Joins assignments, graded submissions and the student roster into
//! per-student summaries plus class-level statistics. Everything here is
//! computed fresh per call; nothing is cached or persisted.

use std::cmp::Ordering;
use std::collections::HashMap;

use sea_orm::{ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter};

use crate::models::{
    assignment::{Column as AssignmentCol, Entity as AssignmentEntity},
    group,
    group_member,
    submission::{Column as SubCol, Entity as SubmissionEntity, Model as SubmissionModel},
    user::{Column as UserCol, Entity as UserEntity},
};

/// Per-student grade summary, derived on demand.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct StudentGradeSummary {
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

/// Class-level statistics with the full per-student roster.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct GroupGradeStats {
    pub students: Vec<StudentGradeSummary>,
    pub class_average_gpa: f64,
    pub class_average_score: f64,
    pub total_students: i64,
    pub total_assignments: i64,
    pub assignment_completion_rate: f64,
}

impl GroupGradeStats {
    fn zero() -> Self {
        Self {
            students: Vec::new(),
            class_average_gpa: 0.0,
            class_average_score: 0.0,
            total_students: 0,
            total_assignments: 0,
            assignment_completion_rate: 0.0,
        }
    }
}

/// Helper to compute percentage safely.
pub fn percentage(earned: f64, possible: f64) -> f64 {
    if possible <= 0.0 {
        0.0
    } else {
        (earned * 100.0) / possible
    }
}

/// Maps a percentage in [0, 100] to a 4.0-scale GPA via a fixed,
/// monotonic step table.
pub fn gpa_for_percentage(pct: f64) -> f64 {
    match pct {
        p if p >= 90.0 => 4.0,
        p if p >= 85.0 => 3.7,
        p if p >= 80.0 => 3.3,
        p if p >= 75.0 => 3.0,
        p if p >= 70.0 => 2.7,
        p if p >= 65.0 => 2.3,
        p if p >= 60.0 => 2.0,
        p if p >= 55.0 => 1.7,
        p if p >= 50.0 => 1.3,
        p if p >= 45.0 => 1.0,
        _ => 0.0,
    }
}

/// Computes grade summaries and class statistics for a group.
///
/// Returns `None` when the group does not exist, and a zero-valued stats
/// object when it has no assignments. Students without any graded
/// submission appear in the roster with a GPA of 0 but are excluded from
/// the class averages.
pub async fn group_student_grades(
    db: &DatabaseConnection,
    group_id: i64,
) -> Result<Option<GroupGradeStats>, DbErr> {
    if !group::Model::exists(db, group_id).await? {
        return Ok(None);
    }

    let assignments = AssignmentEntity::find()
        .filter(AssignmentCol::GroupId.eq(group_id))
        .all(db)
        .await?;
    if assignments.is_empty() {
        return Ok(Some(GroupGradeStats::zero()));
    }

    let total_assignments = assignments.len() as i64;
    let assignment_ids: Vec<i64> = assignments.iter().map(|a| a.id).collect();
    let max_score_by_assignment: HashMap<i64, f64> =
        assignments.iter().map(|a| (a.id, a.max_score)).collect();

    let student_ids = group_member::Model::student_ids(db, group_id).await?;
    let mut username_by_id = HashMap::<i64, String>::new();
    if !student_ids.is_empty() {
        let users = UserEntity::find()
            .filter(UserCol::Id.is_in(student_ids.clone()))
            .all(db)
            .await?;
        for u in users {
            username_by_id.insert(u.id, u.username);
        }
    }

    let graded: Vec<SubmissionModel> = SubmissionEntity::find()
        .filter(SubCol::AssignmentId.is_in(assignment_ids))
        .filter(SubCol::StudentId.is_in(student_ids.clone()))
        .filter(SubCol::TotalScore.is_not_null())
        .all(db)
        .await?;

    // Normalize to one canonical row per (student, assignment): highest
    // attempt wins, newest row breaks ties.
    let mut canonical = HashMap::<(i64, i64), SubmissionModel>::new();
    for sub in graded {
        let key = (sub.student_id, sub.assignment_id);
        match canonical.get(&key) {
            Some(existing)
                if (existing.attempt, existing.id) >= (sub.attempt, sub.id) => {}
            _ => {
                canonical.insert(key, sub);
            }
        }
    }

    let mut students = Vec::with_capacity(student_ids.len());
    for student_id in &student_ids {
        let mut earned = 0.0;
        let mut possible = 0.0;
        let mut completed = 0_i64;

        for ((sid, assignment_id), sub) in canonical.iter() {
            if sid != student_id {
                continue;
            }
            earned += sub.total_score.unwrap_or(0.0);
            possible += max_score_by_assignment
                .get(assignment_id)
                .copied()
                .unwrap_or(0.0);
            completed += 1;
        }

        let pct = percentage(earned, possible);
        students.push(StudentGradeSummary {
            student_id: *student_id,
            username: username_by_id
                .get(student_id)
                .cloned()
                .unwrap_or_default(),
            total_points_earned: earned,
            total_points_possible: possible,
            percentage: pct,
            gpa: gpa_for_percentage(pct),
            completed_assignments: completed,
            total_assignments,
            completion_rate: percentage(completed as f64, total_assignments as f64),
        });
    }

    // Class averages run over students with at least one graded submission;
    // the completion rate averages over the whole roster.
    let graded_students: Vec<&StudentGradeSummary> = students
        .iter()
        .filter(|s| s.completed_assignments > 0)
        .collect();
    let (class_average_gpa, class_average_score) = if graded_students.is_empty() {
        (0.0, 0.0)
    } else {
        let n = graded_students.len() as f64;
        (
            graded_students.iter().map(|s| s.gpa).sum::<f64>() / n,
            graded_students.iter().map(|s| s.percentage).sum::<f64>() / n,
        )
    };
    let assignment_completion_rate = if students.is_empty() {
        0.0
    } else {
        students.iter().map(|s| s.completion_rate).sum::<f64>() / students.len() as f64
    };

    students.sort_by(|a, b| {
        b.gpa
            .partial_cmp(&a.gpa)
            .unwrap_or(Ordering::Equal)
            .then(a.student_id.cmp(&b.student_id))
    });

    Ok(Some(GroupGradeStats {
        total_students: students.len() as i64,
        students,
        class_average_gpa,
        class_average_score,
        total_assignments,
        assignment_completion_rate,
    }))
}
