use chrono::Utc;
use sea_orm::{entity::prelude::*, Set};
use serde::{Deserialize, Serialize};
use url::Url;
use uuid::Uuid;

use crate::errors;
use crate::folder;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "bookmark")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub folder_id: Uuid,
    pub url: String,
    pub title: String,
    pub description: Option<String>,
    pub favicon_url: Option<String>,
    pub og_image_url: Option<String>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation { Folder }

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Folder => Entity::belongs_to(folder::Entity)
                .from(Column::FolderId)
                .to(folder::Column::Id)
                .into(),
        }
    }
}

impl Related<folder::Entity> for Entity {
    fn to() -> RelationDef { Relation::Folder.def() }
}

impl ActiveModelBehavior for ActiveModel {}

/// URLs must be absolute http(s); comparison elsewhere stays exact-string,
/// so no normalization happens here.
pub fn validate_url(url: &str) -> Result<(), errors::ModelError> {
    let parsed = Url::parse(url)
        .map_err(|_| errors::ModelError::Validation("invalid url".into()))?;
    if parsed.scheme() != "http" && parsed.scheme() != "https" {
        return Err(errors::ModelError::Validation("url must be http(s)".into()));
    }
    if parsed.host_str().is_none() {
        return Err(errors::ModelError::Validation("url must have a host".into()));
    }
    Ok(())
}

pub fn validate_title(title: &str) -> Result<(), errors::ModelError> {
    if title.is_empty() {
        return Err(errors::ModelError::Validation("title required".into()));
    }
    Ok(())
}

/// Build a fresh ActiveModel; usable inside or outside a transaction.
pub fn new_model(
    folder_id: Uuid,
    url: &str,
    title: &str,
    description: Option<&str>,
    favicon_url: Option<&str>,
    og_image_url: Option<&str>,
) -> ActiveModel {
    let now = Utc::now().into();
    ActiveModel {
        id: Set(Uuid::new_v4()),
        folder_id: Set(folder_id),
        url: Set(url.to_string()),
        title: Set(title.to_string()),
        description: Set(description.map(str::to_string)),
        favicon_url: Set(favicon_url.map(str::to_string)),
        og_image_url: Set(og_image_url.map(str::to_string)),
        created_at: Set(now),
        updated_at: Set(now),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_must_be_absolute_http() {
        assert!(validate_url("https://example.com").is_ok());
        assert!(validate_url("http://example.com/a?b=c").is_ok());
        assert!(validate_url("example.com").is_err());
        assert!(validate_url("ftp://example.com").is_err());
        assert!(validate_url("/relative/path").is_err());
    }

    #[test]
    fn title_required() {
        assert!(validate_title("").is_err());
        assert!(validate_title("Example").is_ok());
    }
}
