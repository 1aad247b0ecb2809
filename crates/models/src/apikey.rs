use chrono::Utc;
use rand::{distributions::Alphanumeric, Rng};
use sea_orm::{entity::prelude::*, Set};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::user;

/// Fixed recognizable prefix marking the credential type.
pub const KEY_PREFIX: &str = "mk_";
/// Random alphanumeric characters following the prefix.
pub const KEY_RANDOM_LEN: usize = 32;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "api_key")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: Uuid,
    pub key: String,
    pub created_at: DateTimeWithTimeZone,
    pub last_used_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation { User }

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::User => Entity::belongs_to(user::Entity)
                .from(Column::UserId)
                .to(user::Column::Id)
                .into(),
        }
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Generate an opaque key value: `mk_` + 32 random alphanumerics.
/// Global uniqueness is additionally backed by a unique index.
pub fn generate_key() -> String {
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(KEY_RANDOM_LEN)
        .map(char::from)
        .collect();
    format!("{KEY_PREFIX}{suffix}")
}

/// Build the ActiveModel for a fresh key; usable inside a transaction.
pub fn new_key_model(user_id: Uuid) -> ActiveModel {
    ActiveModel {
        id: Set(Uuid::new_v4()),
        user_id: Set(user_id),
        key: Set(generate_key()),
        created_at: Set(Utc::now().into()),
        last_used_at: Set(None),
    }
}
