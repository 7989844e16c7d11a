use async_trait::async_trait;
use chrono::Utc;
use futures::TryStreamExt;
use mongodb::bson::{self, Bson};
use mongodb::error::{Error as DatabaseError, ErrorKind, WriteFailure};
use mongodb::options::FindOptions;

use crate::campaign::CampaignId;
use crate::database::MongoApplicationStore;
use crate::error::Error;
use crate::influencer::InfluencerProfileId;

use super::{Application, ApplicationId, ApplicationStatus};

#[async_trait]
pub trait ApplicationStore: Send + Sync {
    async fn insert_application(&self, application: &Application) -> Result<(), Error>;

    async fn fetch_application_by_campaign_and_influencer(
        &self,
        campaign_id: CampaignId,
        influencer_id: InfluencerProfileId,
    ) -> Result<Option<Application>, Error>;

    async fn fetch_applications_by_campaign(
        &self,
        campaign_id: CampaignId,
    ) -> Result<Vec<Application>, Error>;

    async fn count_applications_by_campaign(&self, campaign_id: CampaignId)
        -> Result<u64, Error>;

    async fn fetch_applications_by_influencer(
        &self,
        influencer_id: InfluencerProfileId,
        status: Option<ApplicationStatus>,
        offset: u64,
        limit: i64,
    ) -> Result<Vec<Application>, Error>;

    async fn count_applications_by_influencer(
        &self,
        influencer_id: InfluencerProfileId,
        status: Option<ApplicationStatus>,
    ) -> Result<u64, Error>;

    /// Marks the given applications `selected` and every other application of
    /// the campaign `rejected`. Both updates set absolute values, so running
    /// the partition again with the same inputs is a no-op.
    async fn finalize_selection(
        &self,
        campaign_id: CampaignId,
        selected_ids: &[ApplicationId],
    ) -> Result<(), Error>;
}

fn is_duplicate_key_error(error: &DatabaseError) -> bool {
    match &*error.kind {
        ErrorKind::Write(WriteFailure::WriteError(write_error)) => write_error.code == 11000,
        _ => false,
    }
}

fn influencer_filter(
    influencer_id: InfluencerProfileId,
    status: Option<ApplicationStatus>,
) -> bson::Document {
    let mut document = bson::doc! { "influencer_id": influencer_id };
    if let Some(status) = status {
        document.insert("status", status);
    }
    document
}

#[async_trait]
impl ApplicationStore for MongoApplicationStore {
    #[tracing::instrument(skip(self))]
    async fn insert_application(&self, application: &Application) -> Result<(), Error> {
        match self.insert_one(application, None).await {
            Ok(_) => Ok(()),
            // the unique (campaign_id, influencer_id) index closes the
            // pre-check race between concurrent duplicate applies
            Err(error) if is_duplicate_key_error(&error) => Err(Error::AlreadyApplied {
                campaign_id: application.campaign_id,
                influencer_id: application.influencer_id,
            }),
            Err(error) => Err(error.into()),
        }
    }

    #[tracing::instrument(skip(self))]
    async fn fetch_application_by_campaign_and_influencer(
        &self,
        campaign_id: CampaignId,
        influencer_id: InfluencerProfileId,
    ) -> Result<Option<Application>, Error> {
        let application: Option<Application> = self
            .find_one(
                bson::doc! { "campaign_id": campaign_id, "influencer_id": influencer_id },
                None,
            )
            .await?;

        Ok(application)
    }

    #[tracing::instrument(skip(self))]
    async fn fetch_applications_by_campaign(
        &self,
        campaign_id: CampaignId,
    ) -> Result<Vec<Application>, Error> {
        let options = FindOptions::builder()
            .sort(bson::doc! { "created_at": 1 })
            .build();

        let applications: Vec<Application> = self
            .find(bson::doc! { "campaign_id": campaign_id }, options)
            .await?
            .try_collect()
            .await?;

        Ok(applications)
    }

    #[tracing::instrument(skip(self))]
    async fn count_applications_by_campaign(
        &self,
        campaign_id: CampaignId,
    ) -> Result<u64, Error> {
        let count = self
            .count_documents(bson::doc! { "campaign_id": campaign_id }, None)
            .await?;

        Ok(count)
    }

    #[tracing::instrument(skip(self))]
    async fn fetch_applications_by_influencer(
        &self,
        influencer_id: InfluencerProfileId,
        status: Option<ApplicationStatus>,
        offset: u64,
        limit: i64,
    ) -> Result<Vec<Application>, Error> {
        let options = FindOptions::builder()
            .sort(bson::doc! { "created_at": -1 })
            .skip(offset)
            .limit(limit)
            .build();

        let applications: Vec<Application> = self
            .find(influencer_filter(influencer_id, status), options)
            .await?
            .try_collect()
            .await?;

        Ok(applications)
    }

    #[tracing::instrument(skip(self))]
    async fn count_applications_by_influencer(
        &self,
        influencer_id: InfluencerProfileId,
        status: Option<ApplicationStatus>,
    ) -> Result<u64, Error> {
        let count = self
            .count_documents(influencer_filter(influencer_id, status), None)
            .await?;

        Ok(count)
    }

    #[tracing::instrument(skip(self))]
    async fn finalize_selection(
        &self,
        campaign_id: CampaignId,
        selected_ids: &[ApplicationId],
    ) -> Result<(), Error> {
        let now = bson::DateTime::from_chrono(Utc::now());
        let ids: Vec<Bson> = selected_ids.iter().map(|id| Bson::from(*id)).collect();

        self.update_many(
            bson::doc! { "campaign_id": campaign_id, "_id": { "$in": ids.clone() } },
            bson::doc! { "$set": { "status": ApplicationStatus::Selected, "modified_at": now } },
            None,
        )
        .await?;

        self.update_many(
            bson::doc! { "campaign_id": campaign_id, "_id": { "$nin": ids } },
            bson::doc! { "$set": { "status": ApplicationStatus::Rejected, "modified_at": now } },
            None,
        )
        .await?;

        Ok(())
    }
}
