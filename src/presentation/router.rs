use std::sync::Arc;

use axum::Router;

use crate::{
    domain::{
        repositories::{
            conference_repository::ConferenceRepository, profile_repository::ProfileRepository,
            registration_repository::RegistrationRepository,
        },
        services::{
            announcement_service::AnnouncementCache, identity_service::IdentityResolver,
            notification_service::ConfirmationNotifier,
        },
    },
    presentation::handlers::{
        announcement_handler::create_announcement_router, conference_handler::create_conference_router,
        profile_handler::create_profile_router, registration_handler::create_registration_router,
    },
    usecase::{
        announcement_usecase::AnnouncementUsecase, conference_usecase::ConferenceUsecase,
        profile_usecase::ProfileUsecase, query_usecase::QueryUsecase, registration_usecase::RegistrationUsecase,
        retry::RetryPolicy,
    },
};

/// Storage backends the usecases are wired against
pub struct Repositories<C, P, R> {
    pub conferences: C,
    pub profiles: P,
    pub registrations: R,
}

/// Build the whole API, every route nested under `/api`
pub fn create_app_router<C, P, R, N, I, K>(
    repositories: Repositories<C, P, R>,
    notifier: N,
    identity_resolver: I,
    announcements: Arc<AnnouncementUsecase<C, K>>,
    retry: RetryPolicy,
) -> Router
where
    C: ConferenceRepository + Send + Sync + 'static + Clone,
    P: ProfileRepository + Send + Sync + 'static + Clone,
    R: RegistrationRepository + Send + Sync + 'static + Clone,
    N: ConfirmationNotifier + 'static + Clone,
    I: IdentityResolver + 'static + Clone,
    K: AnnouncementCache + 'static,
{
    let Repositories {
        conferences,
        profiles,
        registrations,
    } = repositories;

    let profile_usecase = ProfileUsecase::new(profiles.clone(), retry);
    let conference_usecase = ConferenceUsecase::new(conferences.clone(), profiles.clone(), notifier.clone(), retry);
    let query_usecase = QueryUsecase::new(conferences, profiles);
    let registration_usecase = RegistrationUsecase::new(registrations, notifier, retry);

    let api = Router::new()
        .merge(create_profile_router(profile_usecase, identity_resolver.clone()))
        .merge(create_conference_router(
            conference_usecase,
            query_usecase,
            identity_resolver.clone(),
        ))
        .merge(create_registration_router(registration_usecase, identity_resolver))
        .merge(create_announcement_router(announcements));

    Router::new().nest("/api", api)
}
