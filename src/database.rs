use mongodb::bson;
use mongodb::options::IndexOptions;
use mongodb::{Collection, Database as MongoDb, IndexModel};

use crate::advertiser::db::AdvertiserStore;
use crate::advertiser::AdvertiserProfile;
use crate::application::db::ApplicationStore;
use crate::application::Application;
use crate::campaign::db::CampaignStore;
use crate::campaign::Campaign;
use crate::error::Error;
use crate::influencer::db::{ChannelStore, InfluencerStore};
use crate::influencer::{Channel, InfluencerProfile};

pub type MongoCampaignStore = Collection<Campaign>;
pub type MongoApplicationStore = Collection<Application>;
pub type MongoAdvertiserStore = Collection<AdvertiserProfile>;
pub type MongoInfluencerStore = Collection<InfluencerProfile>;
pub type MongoChannelStore = Collection<Channel>;

/// Storage seam for everything the managers touch. Production wires a
/// `MongoDatabase`; tests wire `test::MockDatabase`.
pub trait Database: Send + Sync {
    fn campaigns(&self) -> &dyn CampaignStore;
    fn applications(&self) -> &dyn ApplicationStore;
    fn advertisers(&self) -> &dyn AdvertiserStore;
    fn influencers(&self) -> &dyn InfluencerStore;
    fn channels(&self) -> &dyn ChannelStore;
}

#[derive(Debug, Clone)]
pub struct MongoDatabase {
    campaigns: Collection<Campaign>,
    applications: Collection<Application>,
    advertisers: Collection<AdvertiserProfile>,
    influencers: Collection<InfluencerProfile>,
    channels: Collection<Channel>,
    db: MongoDb,
}

impl MongoDatabase {
    pub async fn initialize(db: MongoDb) -> Result<MongoDatabase, Error> {
        let database = MongoDatabase {
            campaigns: db.collection("campaigns"),
            applications: db.collection("applications"),
            advertisers: db.collection("advertiser_profiles"),
            influencers: db.collection("influencer_profiles"),
            channels: db.collection("influencer_channels"),
            db,
        };

        database.ensure_indexes().await?;

        Ok(database)
    }

    /// Unique indexes backing the invariants the managers pre-check: one
    /// application per (campaign, influencer) and one profile per business
    /// number. The pre-checks alone cannot close the race between
    /// concurrent requests.
    pub async fn ensure_indexes(&self) -> Result<(), Error> {
        self.applications
            .create_index(
                IndexModel::builder()
                    .keys(bson::doc! { "campaign_id": 1, "influencer_id": 1 })
                    .options(IndexOptions::builder().unique(true).build())
                    .build(),
                None,
            )
            .await?;

        self.advertisers
            .create_index(
                IndexModel::builder()
                    .keys(bson::doc! { "business_number": 1 })
                    .options(IndexOptions::builder().unique(true).build())
                    .build(),
                None,
            )
            .await?;

        Ok(())
    }

    pub async fn drop(&self) -> Result<(), Error> {
        self.db.drop(None).await?;
        Ok(())
    }
}

impl Database for MongoDatabase {
    fn campaigns(&self) -> &dyn CampaignStore {
        &self.campaigns
    }

    fn applications(&self) -> &dyn ApplicationStore {
        &self.applications
    }

    fn advertisers(&self) -> &dyn AdvertiserStore {
        &self.advertisers
    }

    fn influencers(&self) -> &dyn InfluencerStore {
        &self.influencers
    }

    fn channels(&self) -> &dyn ChannelStore {
        &self.channels
    }
}

pub mod test {
    //! Closure-stubbed store doubles. Every hook panics until a test assigns
    //! it, so an unexpected storage call fails loudly.

    use async_trait::async_trait;

    use crate::advertiser::db::AdvertiserStore;
    use crate::advertiser::{AdvertiserProfile, AdvertiserProfileId};
    use crate::application::db::ApplicationStore;
    use crate::application::{Application, ApplicationId, ApplicationStatus};
    use crate::campaign::db::CampaignStore;
    use crate::campaign::{Campaign, CampaignId, CampaignListFilter, CampaignStatus};
    use crate::error::Error;
    use crate::influencer::db::{ChannelStore, InfluencerStore};
    use crate::influencer::{Channel, ChannelId, InfluencerProfile, InfluencerProfileId};
    use crate::user::UserId;

    use super::Database;

    pub struct MockDatabase {
        pub campaigns: MockCampaignStore,
        pub applications: MockApplicationStore,
        pub advertisers: MockAdvertiserStore,
        pub influencers: MockInfluencerStore,
        pub channels: MockChannelStore,
    }

    impl MockDatabase {
        pub fn new() -> MockDatabase {
            MockDatabase {
                campaigns: MockCampaignStore::new(),
                applications: MockApplicationStore::new(),
                advertisers: MockAdvertiserStore::new(),
                influencers: MockInfluencerStore::new(),
                channels: MockChannelStore::new(),
            }
        }
    }

    impl Default for MockDatabase {
        fn default() -> MockDatabase {
            MockDatabase::new()
        }
    }

    impl Database for MockDatabase {
        fn campaigns(&self) -> &dyn CampaignStore {
            &self.campaigns
        }

        fn applications(&self) -> &dyn ApplicationStore {
            &self.applications
        }

        fn advertisers(&self) -> &dyn AdvertiserStore {
            &self.advertisers
        }

        fn influencers(&self) -> &dyn InfluencerStore {
            &self.influencers
        }

        fn channels(&self) -> &dyn ChannelStore {
            &self.channels
        }
    }

    pub struct MockCampaignStore {
        pub on_insert_campaign: Box<dyn Fn(&Campaign) -> Result<(), Error> + Send + Sync>,
        pub on_fetch_campaign_by_id:
            Box<dyn Fn(CampaignId) -> Result<Option<Campaign>, Error> + Send + Sync>,
        pub on_fetch_campaigns: Box<
            dyn Fn(&CampaignListFilter, u64, i64) -> Result<Vec<Campaign>, Error> + Send + Sync,
        >,
        pub on_count_campaigns:
            Box<dyn Fn(&CampaignListFilter) -> Result<u64, Error> + Send + Sync>,
        pub on_fetch_campaigns_by_advertiser:
            Box<dyn Fn(AdvertiserProfileId) -> Result<Vec<Campaign>, Error> + Send + Sync>,
        pub on_update_campaign_status: Box<
            dyn Fn(CampaignId, CampaignStatus, CampaignStatus) -> Result<(), Error> + Send + Sync,
        >,
    }

    impl MockCampaignStore {
        pub fn new() -> MockCampaignStore {
            MockCampaignStore {
                on_insert_campaign: Box::new(|_| unimplemented!("insert_campaign")),
                on_fetch_campaign_by_id: Box::new(|_| unimplemented!("fetch_campaign_by_id")),
                on_fetch_campaigns: Box::new(|_, _, _| unimplemented!("fetch_campaigns")),
                on_count_campaigns: Box::new(|_| unimplemented!("count_campaigns")),
                on_fetch_campaigns_by_advertiser: Box::new(|_| {
                    unimplemented!("fetch_campaigns_by_advertiser")
                }),
                on_update_campaign_status: Box::new(|_, _, _| {
                    unimplemented!("update_campaign_status")
                }),
            }
        }
    }

    #[async_trait]
    impl CampaignStore for MockCampaignStore {
        async fn insert_campaign(&self, campaign: &Campaign) -> Result<(), Error> {
            (self.on_insert_campaign)(campaign)
        }

        async fn fetch_campaign_by_id(
            &self,
            campaign_id: CampaignId,
        ) -> Result<Option<Campaign>, Error> {
            (self.on_fetch_campaign_by_id)(campaign_id)
        }

        async fn fetch_campaigns(
            &self,
            filter: &CampaignListFilter,
            offset: u64,
            limit: i64,
        ) -> Result<Vec<Campaign>, Error> {
            (self.on_fetch_campaigns)(filter, offset, limit)
        }

        async fn count_campaigns(&self, filter: &CampaignListFilter) -> Result<u64, Error> {
            (self.on_count_campaigns)(filter)
        }

        async fn fetch_campaigns_by_advertiser(
            &self,
            advertiser_id: AdvertiserProfileId,
        ) -> Result<Vec<Campaign>, Error> {
            (self.on_fetch_campaigns_by_advertiser)(advertiser_id)
        }

        async fn update_campaign_status(
            &self,
            campaign_id: CampaignId,
            from: CampaignStatus,
            to: CampaignStatus,
        ) -> Result<(), Error> {
            (self.on_update_campaign_status)(campaign_id, from, to)
        }
    }

    pub struct MockApplicationStore {
        pub on_insert_application: Box<dyn Fn(&Application) -> Result<(), Error> + Send + Sync>,
        pub on_fetch_application_by_campaign_and_influencer: Box<
            dyn Fn(CampaignId, InfluencerProfileId) -> Result<Option<Application>, Error>
                + Send
                + Sync,
        >,
        pub on_fetch_applications_by_campaign:
            Box<dyn Fn(CampaignId) -> Result<Vec<Application>, Error> + Send + Sync>,
        pub on_count_applications_by_campaign:
            Box<dyn Fn(CampaignId) -> Result<u64, Error> + Send + Sync>,
        pub on_fetch_applications_by_influencer: Box<
            dyn Fn(
                    InfluencerProfileId,
                    Option<ApplicationStatus>,
                    u64,
                    i64,
                ) -> Result<Vec<Application>, Error>
                + Send
                + Sync,
        >,
        pub on_count_applications_by_influencer: Box<
            dyn Fn(InfluencerProfileId, Option<ApplicationStatus>) -> Result<u64, Error>
                + Send
                + Sync,
        >,
        pub on_finalize_selection:
            Box<dyn Fn(CampaignId, &[ApplicationId]) -> Result<(), Error> + Send + Sync>,
    }

    impl MockApplicationStore {
        pub fn new() -> MockApplicationStore {
            MockApplicationStore {
                on_insert_application: Box::new(|_| unimplemented!("insert_application")),
                on_fetch_application_by_campaign_and_influencer: Box::new(|_, _| {
                    unimplemented!("fetch_application_by_campaign_and_influencer")
                }),
                on_fetch_applications_by_campaign: Box::new(|_| {
                    unimplemented!("fetch_applications_by_campaign")
                }),
                on_count_applications_by_campaign: Box::new(|_| {
                    unimplemented!("count_applications_by_campaign")
                }),
                on_fetch_applications_by_influencer: Box::new(|_, _, _, _| {
                    unimplemented!("fetch_applications_by_influencer")
                }),
                on_count_applications_by_influencer: Box::new(|_, _| {
                    unimplemented!("count_applications_by_influencer")
                }),
                on_finalize_selection: Box::new(|_, _| unimplemented!("finalize_selection")),
            }
        }
    }

    #[async_trait]
    impl ApplicationStore for MockApplicationStore {
        async fn insert_application(&self, application: &Application) -> Result<(), Error> {
            (self.on_insert_application)(application)
        }

        async fn fetch_application_by_campaign_and_influencer(
            &self,
            campaign_id: CampaignId,
            influencer_id: InfluencerProfileId,
        ) -> Result<Option<Application>, Error> {
            (self.on_fetch_application_by_campaign_and_influencer)(campaign_id, influencer_id)
        }

        async fn fetch_applications_by_campaign(
            &self,
            campaign_id: CampaignId,
        ) -> Result<Vec<Application>, Error> {
            (self.on_fetch_applications_by_campaign)(campaign_id)
        }

        async fn count_applications_by_campaign(
            &self,
            campaign_id: CampaignId,
        ) -> Result<u64, Error> {
            (self.on_count_applications_by_campaign)(campaign_id)
        }

        async fn fetch_applications_by_influencer(
            &self,
            influencer_id: InfluencerProfileId,
            status: Option<ApplicationStatus>,
            offset: u64,
            limit: i64,
        ) -> Result<Vec<Application>, Error> {
            (self.on_fetch_applications_by_influencer)(influencer_id, status, offset, limit)
        }

        async fn count_applications_by_influencer(
            &self,
            influencer_id: InfluencerProfileId,
            status: Option<ApplicationStatus>,
        ) -> Result<u64, Error> {
            (self.on_count_applications_by_influencer)(influencer_id, status)
        }

        async fn finalize_selection(
            &self,
            campaign_id: CampaignId,
            selected_ids: &[ApplicationId],
        ) -> Result<(), Error> {
            (self.on_finalize_selection)(campaign_id, selected_ids)
        }
    }

    pub struct MockAdvertiserStore {
        pub on_insert_profile:
            Box<dyn Fn(&AdvertiserProfile) -> Result<(), Error> + Send + Sync>,
        pub on_replace_profile:
            Box<dyn Fn(&AdvertiserProfile) -> Result<(), Error> + Send + Sync>,
        pub on_fetch_profile_by_id: Box<
            dyn Fn(AdvertiserProfileId) -> Result<Option<AdvertiserProfile>, Error> + Send + Sync,
        >,
        pub on_fetch_profile_by_user:
            Box<dyn Fn(UserId) -> Result<Option<AdvertiserProfile>, Error> + Send + Sync>,
        pub on_fetch_profile_by_business_number: Box<
            dyn Fn(&str, Option<UserId>) -> Result<Option<AdvertiserProfile>, Error> + Send + Sync,
        >,
    }

    impl MockAdvertiserStore {
        pub fn new() -> MockAdvertiserStore {
            MockAdvertiserStore {
                on_insert_profile: Box::new(|_| unimplemented!("insert_profile")),
                on_replace_profile: Box::new(|_| unimplemented!("replace_profile")),
                on_fetch_profile_by_id: Box::new(|_| unimplemented!("fetch_profile_by_id")),
                on_fetch_profile_by_user: Box::new(|_| unimplemented!("fetch_profile_by_user")),
                on_fetch_profile_by_business_number: Box::new(|_, _| {
                    unimplemented!("fetch_profile_by_business_number")
                }),
            }
        }
    }

    #[async_trait]
    impl AdvertiserStore for MockAdvertiserStore {
        async fn insert_profile(&self, profile: &AdvertiserProfile) -> Result<(), Error> {
            (self.on_insert_profile)(profile)
        }

        async fn replace_profile(&self, profile: &AdvertiserProfile) -> Result<(), Error> {
            (self.on_replace_profile)(profile)
        }

        async fn fetch_profile_by_id(
            &self,
            advertiser_id: AdvertiserProfileId,
        ) -> Result<Option<AdvertiserProfile>, Error> {
            (self.on_fetch_profile_by_id)(advertiser_id)
        }

        async fn fetch_profile_by_user(
            &self,
            user_id: UserId,
        ) -> Result<Option<AdvertiserProfile>, Error> {
            (self.on_fetch_profile_by_user)(user_id)
        }

        async fn fetch_profile_by_business_number(
            &self,
            business_number: &str,
            exclude_user: Option<UserId>,
        ) -> Result<Option<AdvertiserProfile>, Error> {
            (self.on_fetch_profile_by_business_number)(business_number, exclude_user)
        }
    }

    pub struct MockInfluencerStore {
        pub on_insert_profile:
            Box<dyn Fn(&InfluencerProfile) -> Result<(), Error> + Send + Sync>,
        pub on_fetch_profile_by_id: Box<
            dyn Fn(InfluencerProfileId) -> Result<Option<InfluencerProfile>, Error> + Send + Sync,
        >,
        pub on_fetch_profile_by_user:
            Box<dyn Fn(UserId) -> Result<Option<InfluencerProfile>, Error> + Send + Sync>,
        pub on_update_profile_verified:
            Box<dyn Fn(InfluencerProfileId, bool) -> Result<(), Error> + Send + Sync>,
    }

    impl MockInfluencerStore {
        pub fn new() -> MockInfluencerStore {
            MockInfluencerStore {
                on_insert_profile: Box::new(|_| unimplemented!("insert_profile")),
                on_fetch_profile_by_id: Box::new(|_| unimplemented!("fetch_profile_by_id")),
                on_fetch_profile_by_user: Box::new(|_| unimplemented!("fetch_profile_by_user")),
                on_update_profile_verified: Box::new(|_, _| {
                    unimplemented!("update_profile_verified")
                }),
            }
        }
    }

    #[async_trait]
    impl InfluencerStore for MockInfluencerStore {
        async fn insert_profile(&self, profile: &InfluencerProfile) -> Result<(), Error> {
            (self.on_insert_profile)(profile)
        }

        async fn fetch_profile_by_id(
            &self,
            influencer_id: InfluencerProfileId,
        ) -> Result<Option<InfluencerProfile>, Error> {
            (self.on_fetch_profile_by_id)(influencer_id)
        }

        async fn fetch_profile_by_user(
            &self,
            user_id: UserId,
        ) -> Result<Option<InfluencerProfile>, Error> {
            (self.on_fetch_profile_by_user)(user_id)
        }

        async fn update_profile_verified(
            &self,
            influencer_id: InfluencerProfileId,
            is_verified: bool,
        ) -> Result<(), Error> {
            (self.on_update_profile_verified)(influencer_id, is_verified)
        }
    }

    pub struct MockChannelStore {
        pub on_insert_channel: Box<dyn Fn(&Channel) -> Result<(), Error> + Send + Sync>,
        pub on_insert_channels: Box<dyn Fn(&[Channel]) -> Result<(), Error> + Send + Sync>,
        pub on_fetch_channels_by_influencer:
            Box<dyn Fn(InfluencerProfileId) -> Result<Vec<Channel>, Error> + Send + Sync>,
        pub on_count_channels_by_influencer:
            Box<dyn Fn(InfluencerProfileId) -> Result<u64, Error> + Send + Sync>,
        pub on_fetch_channel_by_influencer_and_url: Box<
            dyn Fn(InfluencerProfileId, &str) -> Result<Option<Channel>, Error> + Send + Sync,
        >,
        pub on_delete_channels_by_influencer:
            Box<dyn Fn(InfluencerProfileId) -> Result<(), Error> + Send + Sync>,
        pub on_delete_channel:
            Box<dyn Fn(InfluencerProfileId, ChannelId) -> Result<bool, Error> + Send + Sync>,
    }

    impl MockChannelStore {
        pub fn new() -> MockChannelStore {
            MockChannelStore {
                on_insert_channel: Box::new(|_| unimplemented!("insert_channel")),
                on_insert_channels: Box::new(|_| unimplemented!("insert_channels")),
                on_fetch_channels_by_influencer: Box::new(|_| {
                    unimplemented!("fetch_channels_by_influencer")
                }),
                on_count_channels_by_influencer: Box::new(|_| {
                    unimplemented!("count_channels_by_influencer")
                }),
                on_fetch_channel_by_influencer_and_url: Box::new(|_, _| {
                    unimplemented!("fetch_channel_by_influencer_and_url")
                }),
                on_delete_channels_by_influencer: Box::new(|_| {
                    unimplemented!("delete_channels_by_influencer")
                }),
                on_delete_channel: Box::new(|_, _| unimplemented!("delete_channel")),
            }
        }
    }

    #[async_trait]
    impl ChannelStore for MockChannelStore {
        async fn insert_channel(&self, channel: &Channel) -> Result<(), Error> {
            (self.on_insert_channel)(channel)
        }

        async fn insert_channels(&self, channels: &[Channel]) -> Result<(), Error> {
            (self.on_insert_channels)(channels)
        }

        async fn fetch_channels_by_influencer(
            &self,
            influencer_id: InfluencerProfileId,
        ) -> Result<Vec<Channel>, Error> {
            (self.on_fetch_channels_by_influencer)(influencer_id)
        }

        async fn count_channels_by_influencer(
            &self,
            influencer_id: InfluencerProfileId,
        ) -> Result<u64, Error> {
            (self.on_count_channels_by_influencer)(influencer_id)
        }

        async fn fetch_channel_by_influencer_and_url(
            &self,
            influencer_id: InfluencerProfileId,
            channel_url: &str,
        ) -> Result<Option<Channel>, Error> {
            (self.on_fetch_channel_by_influencer_and_url)(influencer_id, channel_url)
        }

        async fn delete_channels_by_influencer(
            &self,
            influencer_id: InfluencerProfileId,
        ) -> Result<(), Error> {
            (self.on_delete_channels_by_influencer)(influencer_id)
        }

        async fn delete_channel(
            &self,
            influencer_id: InfluencerProfileId,
            channel_id: ChannelId,
        ) -> Result<bool, Error> {
            (self.on_delete_channel)(influencer_id, channel_id)
        }
    }
}
