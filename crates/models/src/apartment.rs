//! `apartment` entity: one rental listing owned by a user.
use chrono::Utc;
use common::types::apartment::{ApartmentView, PetPolicy};
use sea_orm::entity::prelude::*;
use sea_orm::FromJsonQueryResult;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::user;

/// JSON array column (amenities, images, lease terms).
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, FromJsonQueryResult)]
pub struct StringList(pub Vec<String>);

impl From<Vec<String>> for StringList {
    fn from(v: Vec<String>) -> Self {
        StringList(v)
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "apartment")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub unit_name: String,
    pub unit_number: String,
    pub project: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    pub bedrooms: i32,
    pub bathrooms: f64,
    pub square_footage: i32,
    pub price: f64,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    #[sea_orm(column_type = "JsonBinary")]
    pub amenities: StringList,
    #[sea_orm(column_type = "JsonBinary")]
    pub images: StringList,
    pub is_available: bool,
    pub floor_plan: Option<String>,
    pub pet_policy: String,
    pub parking_spaces: i32,
    #[sea_orm(column_type = "JsonBinary")]
    pub lease_terms: StringList,
    pub contact_email: String,
    pub contact_phone: String,
    pub virtual_tour_url: Option<String>,
    pub user_id: Uuid,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    User,
}

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

impl Related<user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn pet_policy(&self) -> PetPolicy {
        // Rows are only written through validated input; fall back to the strictest policy.
        self.pet_policy.parse().unwrap_or(PetPolicy::NotAllowed)
    }

    pub fn into_view(self) -> ApartmentView {
        let pet_policy = self.pet_policy();
        ApartmentView {
            id: self.id,
            unit_name: self.unit_name,
            unit_number: self.unit_number,
            project: self.project,
            description: self.description,
            bedrooms: self.bedrooms,
            bathrooms: self.bathrooms,
            square_footage: self.square_footage,
            price: self.price,
            address: self.address,
            city: self.city,
            state: self.state,
            zip_code: self.zip_code,
            amenities: self.amenities.0,
            images: self.images.0,
            is_available: self.is_available,
            floor_plan: self.floor_plan,
            pet_policy,
            parking_spaces: self.parking_spaces,
            lease_terms: self.lease_terms.0,
            contact_email: self.contact_email,
            contact_phone: self.contact_phone,
            virtual_tour_url: self.virtual_tour_url,
            user_id: self.user_id,
            created_at: self.created_at.with_timezone(&Utc),
            updated_at: self.updated_at.with_timezone(&Utc),
        }
    }
}
