use async_trait::async_trait;
use chrono::Utc;
use futures::TryStreamExt;
use mongodb::bson;
use mongodb::options::FindOptions;

use crate::advertiser::AdvertiserProfileId;
use crate::database::MongoCampaignStore;
use crate::error::Error;

use super::{Campaign, CampaignId, CampaignListFilter, CampaignSort, CampaignStatus};

#[async_trait]
pub trait CampaignStore: Send + Sync {
    async fn insert_campaign(&self, campaign: &Campaign) -> Result<(), Error>;

    async fn fetch_campaign_by_id(
        &self,
        campaign_id: CampaignId,
    ) -> Result<Option<Campaign>, Error>;

    async fn fetch_campaigns(
        &self,
        filter: &CampaignListFilter,
        offset: u64,
        limit: i64,
    ) -> Result<Vec<Campaign>, Error>;

    async fn count_campaigns(&self, filter: &CampaignListFilter) -> Result<u64, Error>;

    async fn fetch_campaigns_by_advertiser(
        &self,
        advertiser_id: AdvertiserProfileId,
    ) -> Result<Vec<Campaign>, Error>;

    /// Compare-and-set on the lifecycle status. Zero matched documents means
    /// somebody else transitioned the campaign first.
    async fn update_campaign_status(
        &self,
        campaign_id: CampaignId,
        from: CampaignStatus,
        to: CampaignStatus,
    ) -> Result<(), Error>;
}

fn filter_document(filter: &CampaignListFilter) -> bson::Document {
    let mut document = bson::doc! { "status": filter.status };
    if let Some(category) = &filter.category {
        document.insert("category", category.as_str());
    }
    document
}

#[async_trait]
impl CampaignStore for MongoCampaignStore {
    #[tracing::instrument(skip(self))]
    async fn insert_campaign(&self, campaign: &Campaign) -> Result<(), Error> {
        self.insert_one(campaign, None).await?;

        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn fetch_campaign_by_id(
        &self,
        campaign_id: CampaignId,
    ) -> Result<Option<Campaign>, Error> {
        let campaign: Option<Campaign> =
            self.find_one(bson::doc! { "_id": campaign_id }, None).await?;

        Ok(campaign)
    }

    #[tracing::instrument(skip(self))]
    async fn fetch_campaigns(
        &self,
        filter: &CampaignListFilter,
        offset: u64,
        limit: i64,
    ) -> Result<Vec<Campaign>, Error> {
        let sort = match filter.sort {
            CampaignSort::Latest => bson::doc! { "created_at": -1 },
            CampaignSort::Deadline => bson::doc! { "recruitment_end": 1 },
        };
        let options = FindOptions::builder()
            .sort(sort)
            .skip(offset)
            .limit(limit)
            .build();

        let campaigns: Vec<Campaign> = self
            .find(filter_document(filter), options)
            .await?
            .try_collect()
            .await?;

        Ok(campaigns)
    }

    #[tracing::instrument(skip(self))]
    async fn count_campaigns(&self, filter: &CampaignListFilter) -> Result<u64, Error> {
        let count = self.count_documents(filter_document(filter), None).await?;

        Ok(count)
    }

    #[tracing::instrument(skip(self))]
    async fn fetch_campaigns_by_advertiser(
        &self,
        advertiser_id: AdvertiserProfileId,
    ) -> Result<Vec<Campaign>, Error> {
        let options = FindOptions::builder()
            .sort(bson::doc! { "created_at": -1 })
            .build();

        let campaigns: Vec<Campaign> = self
            .find(bson::doc! { "advertiser_id": advertiser_id }, options)
            .await?
            .try_collect()
            .await?;

        Ok(campaigns)
    }

    #[tracing::instrument(skip(self))]
    async fn update_campaign_status(
        &self,
        campaign_id: CampaignId,
        from: CampaignStatus,
        to: CampaignStatus,
    ) -> Result<(), Error> {
        let now = bson::DateTime::from_chrono(Utc::now());

        let result = self
            .update_one(
                bson::doc! { "_id": campaign_id, "status": from },
                bson::doc! { "$set": { "status": to, "modified_at": now } },
                None,
            )
            .await?;

        if result.matched_count == 0 {
            return Err(Error::ConcurrentModificationDetected);
        }

        Ok(())
    }
}
