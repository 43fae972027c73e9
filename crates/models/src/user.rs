use chrono::Utc;
use sea_orm::{entity::prelude::*, ConnectionTrait, QueryFilter, Set};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::ModelError;
use crate::validate;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "user")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    #[sea_orm(unique)]
    pub email: String,
    pub phone: String,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    Apartment,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Apartment => Entity::has_many(crate::apartment::Entity).into(),
        }
    }
}

impl Related<crate::apartment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Apartment.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

pub fn validate_name(name: &str) -> Result<(), ModelError> {
    if !validate::is_valid_name(name) {
        return Err(ModelError::Validation("name must be 2-50 letters and spaces".into()));
    }
    Ok(())
}

pub fn validate_email(email: &str) -> Result<(), ModelError> {
    if !validate::is_valid_email(email) {
        return Err(ModelError::Validation("invalid email".into()));
    }
    Ok(())
}

pub fn validate_phone(phone: &str) -> Result<(), ModelError> {
    if !validate::is_valid_phone(phone) {
        return Err(ModelError::Validation("invalid phone".into()));
    }
    Ok(())
}

/// Insert a user; `email` is trimmed and lowercased before storage.
pub async fn create<C: ConnectionTrait>(db: &C, name: &str, email: &str, phone: &str) -> Result<Model, ModelError> {
    let name = name.trim();
    let email = email.trim().to_lowercase();
    let phone = phone.trim();
    validate_name(name)?;
    validate_email(&email)?;
    validate_phone(phone)?;
    let now = Utc::now().into();
    let am = ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(name.to_string()),
        email: Set(email),
        phone: Set(phone.to_string()),
        created_at: Set(now),
        updated_at: Set(now),
    };
    am.insert(db)
        .await
        .map_err(|e| ModelError::from_db(e, "User with this email already exists"))
}

pub async fn find_by_email<C: ConnectionTrait>(db: &C, email: &str) -> Result<Option<Model>, ModelError> {
    let found = Entity::find()
        .filter(Column::Email.eq(email.trim().to_lowercase()))
        .one(db)
        .await?;
    Ok(found)
}

/// Apply optional name/phone changes and bump `updated_at`.
pub async fn update_contact<C: ConnectionTrait>(
    db: &C,
    id: Uuid,
    name: Option<&str>,
    phone: Option<&str>,
) -> Result<Model, ModelError> {
    let mut am: ActiveModel = Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| ModelError::Validation("user not found".into()))?
        .into();
    if let Some(name) = name.map(str::trim) {
        validate_name(name)?;
        am.name = Set(name.to_string());
    }
    if let Some(phone) = phone.map(str::trim) {
        validate_phone(phone)?;
        am.phone = Set(phone.to_string());
    }
    am.updated_at = Set(Utc::now().into());
    Ok(am.update(db).await?)
}
