use chrono::{DateTime, Utc};
use sea_orm::ActiveValue::Set;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A student's submission for an assignment.
///
/// `total_score` is NULL until the submission has been graded; the grade
/// aggregator only considers rows where it is set.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Deserialize, Serialize)]
#[sea_orm(table_name = "submissions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,

    pub assignment_id: i64,
    pub student_id: i64,

    /// Attempt number, starting at 1.
    pub attempt: i64,

    /// Awarded score; NULL while ungraded.
    pub total_score: Option<f64>,

    pub submitted_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::assignment::Entity",
        from = "Column::AssignmentId",
        to = "super::assignment::Column::Id",
        on_delete = "Cascade"
    )]
    Assignment,

    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::StudentId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    Student,
}

impl Related<super::assignment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Assignment.def()
    }
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Student.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub async fn create(
        db: &DbConn,
        assignment_id: i64,
        student_id: i64,
        attempt: i64,
        total_score: Option<f64>,
    ) -> Result<Model, DbErr> {
        let now = Utc::now();
        let submission = ActiveModel {
            assignment_id: Set(assignment_id),
            student_id: Set(student_id),
            attempt: Set(attempt),
            total_score: Set(total_score),
            submitted_at: Set(now),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        submission.insert(db).await
    }

    /// Records a grade for an existing submission.
    pub async fn set_score(db: &DbConn, id: i64, total_score: f64) -> Result<Model, DbErr> {
        let submission = ActiveModel {
            id: Set(id),
            total_score: Set(Some(total_score)),
            updated_at: Set(Utc::now()),
            ..Default::default()
        };

        submission.update(db).await
    }
}
