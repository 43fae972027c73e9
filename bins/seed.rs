//! Load sample users and listings into the configured database.
//!
//! Existing users and listings are removed first, so running it twice leaves
//! the same data set behind.

use std::process::ExitCode;

use common::types::apartment::ApartmentInput;
use dotenvy::dotenv;
use models::{apartment, user, user_credentials};
use sea_orm::{DatabaseConnection, EntityTrait};
use serde::Deserialize;
use service::auth::domain::RegisterInput;
use tracing::{error, info};

const SEED_DATA: &str = include_str!("seed_data.json");

#[derive(Deserialize)]
struct SeedUser {
    name: String,
    email: String,
    password: String,
    phone: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SeedData {
    users: Vec<SeedUser>,
    /// Listings owned by the first user.
    owner_listings: Vec<ApartmentInput>,
    /// Listings spread across the remaining users.
    listings: Vec<ApartmentInput>,
}

async fn wipe(db: &DatabaseConnection) -> anyhow::Result<()> {
    let apartments = apartment::Entity::delete_many().exec(db).await?.rows_affected;
    user_credentials::Entity::delete_many().exec(db).await?;
    let users = user::Entity::delete_many().exec(db).await?.rows_affected;
    info!(apartments, users, "cleared existing users and apartments");
    Ok(())
}

async fn seed() -> anyhow::Result<()> {
    let data: SeedData = serde_json::from_str(SEED_DATA)?;
    anyhow::ensure!(data.users.len() > 1, "seed data needs at least two users");

    let cfg = configs::AppConfig::load_and_validate()?;
    let state = server::build_state(&cfg).await?;
    wipe(&state.db).await?;

    let mut owners = Vec::with_capacity(data.users.len());
    for u in data.users {
        let session = state
            .auth
            .register(RegisterInput { name: u.name, email: u.email, password: u.password, phone: u.phone })
            .await?;
        info!(name = %session.user.name, email = %session.user.email, "created user");
        owners.push(session.user.id);
    }

    let first = owners[0];
    let others = &owners[1..];
    let assigned = data
        .owner_listings
        .into_iter()
        .map(|input| (first, input))
        .chain(data.listings.into_iter().enumerate().map(|(i, input)| (others[i % others.len()], input)));

    let mut created = 0usize;
    for (owner, input) in assigned {
        let apt = state.apartments.create(owner, input, Vec::new()).await?;
        created += 1;
        info!(unit = %apt.unit_name, number = %apt.unit_number, project = %apt.project, price = apt.price, "created apartment");
    }
    info!(users = owners.len(), apartments = created, "database seeding completed");
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenv().ok();
    common::utils::logging::init_logging_from_env();

    match seed().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "seeding failed");
            ExitCode::FAILURE
        }
    }
}
