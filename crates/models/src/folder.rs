use chrono::Utc;
use sea_orm::{entity::prelude::*, DatabaseConnection, Set};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::bookmark;
use crate::errors;
use crate::user;

pub const DEFAULT_ICON: &str = "📁";
pub const MAX_NAME_CHARS: usize = 50;
pub const MAX_ICON_CHARS: usize = 10;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "folder")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub icon: String,
    pub allow_duplicate: bool,
    pub is_shared: bool,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    User,
    Bookmark,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::User => Entity::belongs_to(user::Entity)
                .from(Column::UserId)
                .to(user::Column::Id)
                .into(),
            Relation::Bookmark => Entity::has_many(bookmark::Entity).into(),
        }
    }
}

impl Related<user::Entity> for Entity {
    fn to() -> RelationDef { Relation::User.def() }
}

impl Related<bookmark::Entity> for Entity {
    fn to() -> RelationDef { Relation::Bookmark.def() }
}

impl ActiveModelBehavior for ActiveModel {}

pub fn validate_name(name: &str) -> Result<(), errors::ModelError> {
    if name.is_empty() {
        return Err(errors::ModelError::Validation("folder name required".into()));
    }
    if name.chars().count() > MAX_NAME_CHARS {
        return Err(errors::ModelError::Validation("folder name too long (max 50 chars)".into()));
    }
    Ok(())
}

pub fn validate_icon(icon: &str) -> Result<(), errors::ModelError> {
    if icon.is_empty() {
        return Err(errors::ModelError::Validation("folder icon required".into()));
    }
    if icon.chars().count() > MAX_ICON_CHARS {
        return Err(errors::ModelError::Validation("folder icon too long (max 10 chars)".into()));
    }
    Ok(())
}

pub async fn create(
    db: &DatabaseConnection,
    user_id: Uuid,
    name: &str,
    icon: Option<&str>,
) -> Result<Model, errors::ModelError> {
    validate_name(name)?;
    let icon = icon.unwrap_or(DEFAULT_ICON);
    validate_icon(icon)?;
    let now = Utc::now().into();
    let am = ActiveModel {
        id: Set(Uuid::new_v4()),
        user_id: Set(user_id),
        name: Set(name.to_string()),
        icon: Set(icon.to_string()),
        allow_duplicate: Set(true),
        is_shared: Set(false),
        created_at: Set(now),
        updated_at: Set(now),
    };
    am.insert(db).await.map_err(|e| errors::ModelError::Db(e.to_string()))
}
