use chrono::{DateTime, Utc};
use sea_orm::ActiveValue::Set;
use sea_orm::entity::prelude::*;
use sea_orm::PaginatorTrait;
use uuid::Uuid;

/// One instructor-initiated attendance window.
///
/// The `qr_token` is the opaque credential embedded in the QR code shown to
/// the class; it is unique and single-purpose. The faculty coordinates and
/// radius anchor the range check performed at check-in time.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, serde::Serialize)]
#[sea_orm(table_name = "attendance_sessions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub group_id: i64,
    pub created_by: i64,
    pub qr_token: String,
    pub session_name: String,
    pub session_type: SessionType,
    pub faculty_latitude: f64,
    pub faculty_longitude: f64,
    pub allowed_radius_meters: f64,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

/// Kind of class meeting the session covers.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
#[sea_orm(
    rs_type = "String",
    db_type = "Enum",
    enum_name = "attendance_session_type"
)]
pub enum SessionType {
    #[sea_orm(string_value = "lecture")]
    Lecture,
    #[sea_orm(string_value = "lab")]
    Lab,
    #[sea_orm(string_value = "tutorial")]
    Tutorial,
}

impl std::fmt::Display for SessionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            SessionType::Lecture => "lecture",
            SessionType::Lab => "lab",
            SessionType::Tutorial => "tutorial",
        };
        write!(f, "{}", s)
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::group::Entity",
        from = "Column::GroupId",
        to = "super::group::Column::Id"
    )]
    Group,
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::CreatedBy",
        to = "super::user::Column::Id"
    )]
    Creator,
    #[sea_orm(has_many = "super::attendance_record::Entity")]
    Records,
}

impl Related<super::group::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Group.def()
    }
}

impl Related<super::attendance_record::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Records.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Creates a session with a freshly generated `qr_token`.
    #[allow(clippy::too_many_arguments)]
    pub async fn create(
        db: &DbConn,
        group_id: i64,
        created_by: i64,
        session_name: &str,
        session_type: SessionType,
        faculty_latitude: f64,
        faculty_longitude: f64,
        allowed_radius_meters: f64,
        expires_at: DateTime<Utc>,
    ) -> Result<Model, DbErr> {
        let session = ActiveModel {
            group_id: Set(group_id),
            created_by: Set(created_by),
            qr_token: Set(Uuid::new_v4().simple().to_string()),
            session_name: Set(session_name.to_owned()),
            session_type: Set(session_type),
            faculty_latitude: Set(faculty_latitude),
            faculty_longitude: Set(faculty_longitude),
            allowed_radius_meters: Set(allowed_radius_meters),
            created_at: Set(Utc::now()),
            expires_at: Set(expires_at),
            ..Default::default()
        };

        session.insert(db).await
    }

    pub async fn find_by_token(db: &DbConn, qr_token: &str) -> Result<Option<Model>, DbErr> {
        Entity::find()
            .filter(Column::QrToken.eq(qr_token))
            .one(db)
            .await
    }

    /// Whether the session is past its expiry at the given instant.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }

    /// Number of check-in records for this session.
    pub async fn record_count(db: &DbConn, session_id: i64) -> Result<u64, DbErr> {
        super::attendance_record::Entity::find()
            .filter(super::attendance_record::Column::SessionId.eq(session_id))
            .count(db)
            .await
    }
}
