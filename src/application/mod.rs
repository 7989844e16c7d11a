use chrono::{DateTime, NaiveDate, Utc};
use mongodb::bson::Bson;
use serde::{Deserialize, Serialize};

use crate::campaign::CampaignId;
use crate::influencer::InfluencerProfileId;
use crate::typedid::{TypedId, TypedIdMarker};

pub mod db;
pub mod endpoints;
pub mod manager;
pub use endpoints::*;

pub type ApplicationId = TypedId<Application>;

/// One influencer's request to participate in one campaign. At most one
/// application exists per (campaign, influencer) pair.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Application {
    #[serde(rename = "_id")]
    pub id: ApplicationId,
    pub campaign_id: CampaignId,
    pub influencer_id: InfluencerProfileId,
    pub message: String,
    pub visit_date: NaiveDate,
    pub status: ApplicationStatus,
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub modified_at: DateTime<Utc>,
}

impl TypedIdMarker for Application {
    fn tag() -> &'static str {
        "APL"
    }
}

/// Applications start as `applied` and are finalized exactly once by the
/// selection workflow.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ApplicationStatus {
    Applied,
    Selected,
    Rejected,
}

impl From<ApplicationStatus> for Bson {
    fn from(status: ApplicationStatus) -> Bson {
        let rendered = match status {
            ApplicationStatus::Applied => "applied",
            ApplicationStatus::Selected => "selected",
            ApplicationStatus::Rejected => "rejected",
        };
        rendered.into()
    }
}
