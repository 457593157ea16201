use chrono::{DateTime, Utc};
use sea_orm::ActiveValue::Set;
use sea_orm::entity::prelude::*;

/// One student's check-in result for a session.
///
/// Created exactly once per accepted check-in; never mutated afterwards.
/// A unique index on (`session_id`, `student_id`) backs the one-record
/// invariant at the storage layer.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, serde::Serialize)]
#[sea_orm(table_name = "attendance_records")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub session_id: i64,
    pub student_id: i64,
    pub status: AttendanceStatus,
    pub check_in_time: DateTime<Utc>,
    pub student_latitude: f64,
    pub student_longitude: f64,
    pub distance_from_faculty_meters: f64,
}

/// Outcome classification of a check-in.
///
/// "Late" is the out-of-tolerance-but-still-accepted case; check-ins past
/// the configured radius are recorded, not rejected.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "attendance_status")]
pub enum AttendanceStatus {
    #[sea_orm(string_value = "present")]
    Present,
    #[sea_orm(string_value = "late")]
    Late,
}

impl std::fmt::Display for AttendanceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            AttendanceStatus::Present => "present",
            AttendanceStatus::Late => "late",
        };
        write!(f, "{}", s)
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::attendance_session::Entity",
        from = "Column::SessionId",
        to = "super::attendance_session::Column::Id"
    )]
    Session,
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::StudentId",
        to = "super::user::Column::Id"
    )]
    Student,
}

impl Related<super::attendance_session::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Session.def()
    }
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Student.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    #[allow(clippy::too_many_arguments)]
    pub async fn create(
        db: &DbConn,
        session_id: i64,
        student_id: i64,
        status: AttendanceStatus,
        check_in_time: DateTime<Utc>,
        student_latitude: f64,
        student_longitude: f64,
        distance_from_faculty_meters: f64,
    ) -> Result<Model, DbErr> {
        let record = ActiveModel {
            session_id: Set(session_id),
            student_id: Set(student_id),
            status: Set(status),
            check_in_time: Set(check_in_time),
            student_latitude: Set(student_latitude),
            student_longitude: Set(student_longitude),
            distance_from_faculty_meters: Set(distance_from_faculty_meters),
            ..Default::default()
        };

        record.insert(db).await
    }

    /// Whether a record already exists for (session, student).
    pub async fn exists_for(
        db: &DbConn,
        session_id: i64,
        student_id: i64,
    ) -> Result<bool, DbErr> {
        Ok(Entity::find()
            .filter(Column::SessionId.eq(session_id))
            .filter(Column::StudentId.eq(student_id))
            .one(db)
            .await?
            .is_some())
    }
}
