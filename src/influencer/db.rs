use async_trait::async_trait;
use chrono::Utc;
use futures::TryStreamExt;
use mongodb::bson;
use mongodb::options::FindOptions;

use crate::database::{MongoChannelStore, MongoInfluencerStore};
use crate::error::Error;
use crate::user::UserId;

use super::{Channel, ChannelId, InfluencerProfile, InfluencerProfileId};

#[async_trait]
pub trait InfluencerStore: Send + Sync {
    async fn insert_profile(&self, profile: &InfluencerProfile) -> Result<(), Error>;

    async fn fetch_profile_by_id(
        &self,
        influencer_id: InfluencerProfileId,
    ) -> Result<Option<InfluencerProfile>, Error>;

    async fn fetch_profile_by_user(
        &self,
        user_id: UserId,
    ) -> Result<Option<InfluencerProfile>, Error>;

    async fn update_profile_verified(
        &self,
        influencer_id: InfluencerProfileId,
        is_verified: bool,
    ) -> Result<(), Error>;
}

#[async_trait]
pub trait ChannelStore: Send + Sync {
    async fn insert_channel(&self, channel: &Channel) -> Result<(), Error>;

    async fn insert_channels(&self, channels: &[Channel]) -> Result<(), Error>;

    async fn fetch_channels_by_influencer(
        &self,
        influencer_id: InfluencerProfileId,
    ) -> Result<Vec<Channel>, Error>;

    async fn count_channels_by_influencer(
        &self,
        influencer_id: InfluencerProfileId,
    ) -> Result<u64, Error>;

    async fn fetch_channel_by_influencer_and_url(
        &self,
        influencer_id: InfluencerProfileId,
        channel_url: &str,
    ) -> Result<Option<Channel>, Error>;

    async fn delete_channels_by_influencer(
        &self,
        influencer_id: InfluencerProfileId,
    ) -> Result<(), Error>;

    /// Returns false when no channel matched the (influencer, channel) pair,
    /// which doubles as the ownership check.
    async fn delete_channel(
        &self,
        influencer_id: InfluencerProfileId,
        channel_id: ChannelId,
    ) -> Result<bool, Error>;
}

#[async_trait]
impl InfluencerStore for MongoInfluencerStore {
    #[tracing::instrument(skip(self))]
    async fn insert_profile(&self, profile: &InfluencerProfile) -> Result<(), Error> {
        self.insert_one(profile, None).await?;

        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn fetch_profile_by_id(
        &self,
        influencer_id: InfluencerProfileId,
    ) -> Result<Option<InfluencerProfile>, Error> {
        let profile: Option<InfluencerProfile> = self
            .find_one(bson::doc! { "_id": influencer_id }, None)
            .await?;

        Ok(profile)
    }

    #[tracing::instrument(skip(self))]
    async fn fetch_profile_by_user(
        &self,
        user_id: UserId,
    ) -> Result<Option<InfluencerProfile>, Error> {
        let profile: Option<InfluencerProfile> = self
            .find_one(bson::doc! { "user_id": user_id }, None)
            .await?;

        Ok(profile)
    }

    #[tracing::instrument(skip(self))]
    async fn update_profile_verified(
        &self,
        influencer_id: InfluencerProfileId,
        is_verified: bool,
    ) -> Result<(), Error> {
        let now = bson::DateTime::from_chrono(Utc::now());

        let result = self
            .update_one(
                bson::doc! { "_id": influencer_id },
                bson::doc! { "$set": { "is_verified": is_verified, "modified_at": now } },
                None,
            )
            .await?;

        if result.matched_count == 0 {
            return Err(Error::ConcurrentModificationDetected);
        }

        Ok(())
    }
}

#[async_trait]
impl ChannelStore for MongoChannelStore {
    #[tracing::instrument(skip(self))]
    async fn insert_channel(&self, channel: &Channel) -> Result<(), Error> {
        self.insert_one(channel, None).await?;

        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn insert_channels(&self, channels: &[Channel]) -> Result<(), Error> {
        if channels.is_empty() {
            return Ok(());
        }
        self.insert_many(channels, None).await?;

        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn fetch_channels_by_influencer(
        &self,
        influencer_id: InfluencerProfileId,
    ) -> Result<Vec<Channel>, Error> {
        let options = FindOptions::builder()
            .sort(bson::doc! { "created_at": -1 })
            .build();

        let channels: Vec<Channel> = self
            .find(bson::doc! { "influencer_id": influencer_id }, options)
            .await?
            .try_collect()
            .await?;

        Ok(channels)
    }

    #[tracing::instrument(skip(self))]
    async fn count_channels_by_influencer(
        &self,
        influencer_id: InfluencerProfileId,
    ) -> Result<u64, Error> {
        let count = self
            .count_documents(bson::doc! { "influencer_id": influencer_id }, None)
            .await?;

        Ok(count)
    }

    #[tracing::instrument(skip(self))]
    async fn fetch_channel_by_influencer_and_url(
        &self,
        influencer_id: InfluencerProfileId,
        channel_url: &str,
    ) -> Result<Option<Channel>, Error> {
        let channel: Option<Channel> = self
            .find_one(
                bson::doc! { "influencer_id": influencer_id, "channel_url": channel_url },
                None,
            )
            .await?;

        Ok(channel)
    }

    #[tracing::instrument(skip(self))]
    async fn delete_channels_by_influencer(
        &self,
        influencer_id: InfluencerProfileId,
    ) -> Result<(), Error> {
        self.delete_many(bson::doc! { "influencer_id": influencer_id }, None)
            .await?;

        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn delete_channel(
        &self,
        influencer_id: InfluencerProfileId,
        channel_id: ChannelId,
    ) -> Result<bool, Error> {
        let result = self
            .delete_one(
                bson::doc! { "_id": channel_id, "influencer_id": influencer_id },
                None,
            )
            .await?;

        Ok(result.deleted_count > 0)
    }
}
