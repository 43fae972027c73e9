#![cfg(test)]
use std::sync::Arc;

use common::types::apartment::ApartmentInput;
use sea_orm::DatabaseConnection;
use uuid::Uuid;

use crate::apartment::repo::seaorm::SeaOrmApartmentRepository;
use crate::apartment::ApartmentService;

/// Fresh in-memory database per test; each test owns its own schema.
pub async fn get_db() -> Result<DatabaseConnection, anyhow::Error> {
    models::db::connect_in_memory().await
}

pub async fn seed_user(db: &DatabaseConnection, email: &str) -> Result<Uuid, anyhow::Error> {
    let user = models::user::create(db, "Test Owner", email, "5551234567").await?;
    Ok(user.id)
}

pub fn apartments(db: &DatabaseConnection) -> ApartmentService<SeaOrmApartmentRepository> {
    ApartmentService::new(Arc::new(SeaOrmApartmentRepository::new(db.clone())))
}

pub fn listing(unit_number: &str, project: &str, price: f64, bedrooms: i32, city: &str) -> ApartmentInput {
    ApartmentInput {
        unit_name: Some(format!("{project} {unit_number}")),
        unit_number: Some(unit_number.into()),
        project: Some(project.into()),
        description: Some("Sunny unit close to transit".into()),
        bedrooms: Some(bedrooms),
        bathrooms: Some(1.0),
        square_footage: Some(800),
        price: Some(price),
        address: Some("100 Market St".into()),
        city: Some(city.into()),
        state: Some("CA".into()),
        zip_code: Some("94105".into()),
        amenities: Some(vec!["Gym".into()]),
        pet_policy: Some("allowed".into()),
        parking_spaces: Some(1),
        lease_terms: Some(vec!["12 months".into()]),
        contact_email: Some("leasing@example.com".into()),
        contact_phone: Some("5559876543".into()),
        ..Default::default()
    }
}
