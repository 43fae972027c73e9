use common::types::apartment::{ApartmentInput, ApartmentStatsView, ApartmentView, PetPolicy, PriceRange};
use common::types::auth::{AuthPayload, LoginRequest, ProfileUpdateRequest, RegisterRequest, UserView};
use common::types::{FieldError, Health, PageMeta};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                SecurityScheme::Http(HttpBuilder::new().scheme(HttpAuthScheme::Bearer).bearer_format("JWT").build()),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    info(title = "Apartments API", description = "Rental listings with authentication, filtering, search and statistics"),
    paths(
        crate::routes::health,
        crate::routes::auth::register,
        crate::routes::auth::login,
        crate::routes::auth::me,
        crate::routes::auth::logout,
        crate::routes::auth::update_profile,
        crate::routes::apartments::list,
        crate::routes::apartments::get_one,
        crate::routes::apartments::create,
        crate::routes::apartments::update,
        crate::routes::apartments::delete,
        crate::routes::apartments::stats,
        crate::routes::apartments::search,
        crate::routes::apartments::mine,
    ),
    components(
        schemas(
            Health,
            FieldError,
            PageMeta,
            UserView,
            AuthPayload,
            RegisterRequest,
            LoginRequest,
            ProfileUpdateRequest,
            PetPolicy,
            PriceRange,
            ApartmentView,
            ApartmentInput,
            ApartmentStatsView,
        )
    ),
    modifiers(&BearerAuth),
    tags(
        (name = "health"),
        (name = "auth"),
        (name = "apartments")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn documents_every_route() {
        let doc = ApiDoc::openapi();
        for path in [
            "/health",
            "/api/v1/auth/register",
            "/api/v1/auth/profile",
            "/api/v1/apartments",
            "/api/v1/apartments/{id}",
            "/api/v1/apartments/my-apartments",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("bearer"));
    }
}
