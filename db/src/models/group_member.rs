use sea_orm::ActiveValue::Set;
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveModelTrait, QuerySelect};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// The user-group membership table. Role within a group lives here.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "group_members")]
pub struct Model {
    /// User ID (foreign key to `users`)
    #[sea_orm(primary_key, auto_increment = false)]
    pub user_id: i64,

    /// Group ID (foreign key to `groups`)
    #[sea_orm(primary_key, auto_increment = false)]
    pub group_id: i64,

    /// Role type: Faculty or Student
    pub role: Role,
}

/// Enum representing user roles within a group.
/// Backed by a `group_role_type` enum in the database.
#[derive(
    Debug, Clone, PartialEq, EnumIter, DeriveActiveEnum, Display, EnumString, Deserialize, Serialize,
)]
#[serde(rename_all = "snake_case")]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "group_role_type")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Role {
    #[sea_orm(string_value = "faculty")]
    Faculty,

    #[sea_orm(string_value = "student")]
    Student,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id"
    )]
    User,

    #[sea_orm(
        belongs_to = "super::group::Entity",
        from = "Column::GroupId",
        to = "super::group::Column::Id"
    )]
    Group,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::group::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Group.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Assigns a user to a group with the given role.
    pub async fn assign(
        db: &DatabaseConnection,
        user_id: i64,
        group_id: i64,
        role: Role,
    ) -> Result<Model, DbErr> {
        let membership = ActiveModel {
            user_id: Set(user_id),
            group_id: Set(group_id),
            role: Set(role),
        };
        membership.insert(db).await
    }

    /// Returns the user's role within the group, if they are a member.
    pub async fn role_of(
        db: &DatabaseConnection,
        user_id: i64,
        group_id: i64,
    ) -> Result<Option<Role>, DbErr> {
        Ok(Entity::find()
            .filter(Column::UserId.eq(user_id))
            .filter(Column::GroupId.eq(group_id))
            .one(db)
            .await?
            .map(|m| m.role))
    }

    /// Checks whether the user holds the given role within the group.
    pub async fn is_in_role(
        db: &DatabaseConnection,
        user_id: i64,
        group_id: i64,
        role: Role,
    ) -> Result<bool, DbErr> {
        Ok(Self::role_of(db, user_id, group_id).await? == Some(role))
    }

    /// IDs of all student members of the group.
    pub async fn student_ids(db: &DatabaseConnection, group_id: i64) -> Result<Vec<i64>, DbErr> {
        let ids = Entity::find()
            .select_only()
            .column(Column::UserId)
            .filter(Column::GroupId.eq(group_id))
            .filter(Column::Role.eq(Role::Student))
            .into_tuple::<i64>()
            .all(db)
            .await?;
        Ok(ids)
    }
}
