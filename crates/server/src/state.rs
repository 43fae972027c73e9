use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use sea_orm::DatabaseConnection;
use service::apartment::repo::seaorm::SeaOrmApartmentRepository;
use service::apartment::ApartmentService;
use service::auth::repo::seaorm::SeaOrmAuthRepository;
use service::auth::{AuthConfig, AuthService};

/// Where uploaded listing images go and how large each may be.
#[derive(Clone, Debug)]
pub struct UploadSettings {
    pub dir: PathBuf,
    pub max_file_bytes: usize,
}

impl UploadSettings {
    pub fn from_config(api: &configs::ApiConfig) -> Self {
        Self { dir: PathBuf::from(&api.uploads_dir), max_file_bytes: api.max_upload_bytes }
    }

    pub fn apartments_dir(&self) -> PathBuf {
        self.dir.join("apartments")
    }
}

#[derive(Clone)]
pub struct ServerState {
    pub db: DatabaseConnection,
    pub auth: Arc<AuthService<SeaOrmAuthRepository>>,
    pub apartments: Arc<ApartmentService<SeaOrmApartmentRepository>>,
    pub uploads: UploadSettings,
    pub started_at: Instant,
}

impl ServerState {
    pub fn new(db: DatabaseConnection, auth: &configs::AuthConfig, api: &configs::ApiConfig) -> Self {
        let auth_repo = Arc::new(SeaOrmAuthRepository::new(db.clone()));
        let apartment_repo = Arc::new(SeaOrmApartmentRepository::new(db.clone()));
        Self {
            auth: Arc::new(AuthService::new(auth_repo, AuthConfig::new(auth.jwt_secret.clone(), auth.token_ttl_hours))),
            apartments: Arc::new(ApartmentService::new(apartment_repo)),
            uploads: UploadSettings::from_config(api),
            started_at: Instant::now(),
            db,
        }
    }
}
