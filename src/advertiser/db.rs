use async_trait::async_trait;
use mongodb::bson;
use mongodb::error::{Error as DatabaseError, ErrorKind, WriteFailure};

use crate::database::MongoAdvertiserStore;
use crate::error::Error;
use crate::user::UserId;

use super::{AdvertiserProfile, AdvertiserProfileId};

#[async_trait]
pub trait AdvertiserStore: Send + Sync {
    async fn insert_profile(&self, profile: &AdvertiserProfile) -> Result<(), Error>;

    async fn replace_profile(&self, profile: &AdvertiserProfile) -> Result<(), Error>;

    async fn fetch_profile_by_id(
        &self,
        advertiser_id: AdvertiserProfileId,
    ) -> Result<Option<AdvertiserProfile>, Error>;

    async fn fetch_profile_by_user(
        &self,
        user_id: UserId,
    ) -> Result<Option<AdvertiserProfile>, Error>;

    async fn fetch_profile_by_business_number(
        &self,
        business_number: &str,
        exclude_user: Option<UserId>,
    ) -> Result<Option<AdvertiserProfile>, Error>;
}

fn is_duplicate_key_error(error: &DatabaseError) -> bool {
    match &*error.kind {
        ErrorKind::Write(WriteFailure::WriteError(write_error)) => write_error.code == 11000,
        _ => false,
    }
}

#[async_trait]
impl AdvertiserStore for MongoAdvertiserStore {
    #[tracing::instrument(skip(self))]
    async fn insert_profile(&self, profile: &AdvertiserProfile) -> Result<(), Error> {
        match self.insert_one(profile, None).await {
            Ok(_) => Ok(()),
            Err(error) if is_duplicate_key_error(&error) => Err(Error::BusinessNumberTaken {
                business_number: profile.business_number.clone(),
            }),
            Err(error) => Err(error.into()),
        }
    }

    #[tracing::instrument(skip(self))]
    async fn replace_profile(&self, profile: &AdvertiserProfile) -> Result<(), Error> {
        match self
            .replace_one(bson::doc! { "_id": profile.id }, profile, None)
            .await
        {
            Ok(_) => Ok(()),
            Err(error) if is_duplicate_key_error(&error) => Err(Error::BusinessNumberTaken {
                business_number: profile.business_number.clone(),
            }),
            Err(error) => Err(error.into()),
        }
    }

    #[tracing::instrument(skip(self))]
    async fn fetch_profile_by_id(
        &self,
        advertiser_id: AdvertiserProfileId,
    ) -> Result<Option<AdvertiserProfile>, Error> {
        let profile: Option<AdvertiserProfile> = self
            .find_one(bson::doc! { "_id": advertiser_id }, None)
            .await?;

        Ok(profile)
    }

    #[tracing::instrument(skip(self))]
    async fn fetch_profile_by_user(
        &self,
        user_id: UserId,
    ) -> Result<Option<AdvertiserProfile>, Error> {
        let profile: Option<AdvertiserProfile> = self
            .find_one(bson::doc! { "user_id": user_id }, None)
            .await?;

        Ok(profile)
    }

    #[tracing::instrument(skip(self))]
    async fn fetch_profile_by_business_number(
        &self,
        business_number: &str,
        exclude_user: Option<UserId>,
    ) -> Result<Option<AdvertiserProfile>, Error> {
        let mut filter = bson::doc! { "business_number": business_number };
        if let Some(user_id) = exclude_user {
            filter.insert("user_id", bson::doc! { "$ne": user_id });
        }

        let profile: Option<AdvertiserProfile> = self.find_one(filter, None).await?;

        Ok(profile)
    }
}
