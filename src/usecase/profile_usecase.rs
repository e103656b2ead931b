use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{
    domain::{
        error::DomainError,
        models::{
            identity::Identity,
            profile::{DisplayName, Profile, TeeShirtSize},
            versioned::Versioned,
        },
        repositories::profile_repository::ProfileRepository,
    },
    usecase::retry::RetryPolicy,
};

/// Fields a caller may set on their own profile
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfileForm {
    pub display_name: Option<DisplayName>,
    pub tee_shirt_size: Option<TeeShirtSize>,
}

pub struct ProfileUsecase<P: ProfileRepository> {
    profile_repository: P,
    retry: RetryPolicy,
}

impl<P: ProfileRepository> ProfileUsecase<P> {
    pub fn new(profile_repository: P, retry: RetryPolicy) -> Self {
        Self {
            profile_repository,
            retry,
        }
    }

    /// Create the caller's profile or update the fields present in the form
    pub async fn save_profile(&self, identity: &Identity, form: ProfileForm) -> Result<Profile, DomainError>
    where
        P: Send + Sync,
    {
        let this = self;
        let form = &form;
        let profile = self
            .retry
            .run("save_profile", move || this.try_save(identity, form))
            .await?;
        info!(user_id = %identity.user_id(), "profile saved");
        Ok(profile)
    }

    pub async fn get_profile(&self, identity: &Identity) -> Result<Option<Profile>, DomainError>
    where
        P: Send + Sync,
    {
        Ok(self
            .profile_repository
            .find_by_user_id(identity.user_id())
            .await?
            .map(|profile| profile.record))
    }

    async fn try_save(&self, identity: &Identity, form: &ProfileForm) -> Result<Profile, DomainError> {
        let profile = match self.profile_repository.find_by_user_id(identity.user_id()).await? {
            Some(mut stored) => {
                stored.record.update(form.display_name.clone(), form.tee_shirt_size);
                stored
            }
            None => Versioned::unsaved(Profile::new(
                identity.user_id().clone(),
                form.display_name.clone(),
                identity.email().to_string(),
                form.tee_shirt_size,
            )),
        };
        self.profile_repository.save(&profile).await?;
        Ok(profile.record)
    }
}
