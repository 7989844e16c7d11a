use chrono::{DateTime, NaiveDate, Utc};
use mongodb::bson::Bson;
use serde::{Deserialize, Serialize};

use crate::advertiser::AdvertiserProfileId;
use crate::typedid::{TypedId, TypedIdMarker};

pub mod db;
pub mod endpoints;
pub mod manager;
pub use endpoints::*;

pub type CampaignId = TypedId<Campaign>;

/// A recruitment listing owned by one advertiser. The advertiser's category
/// is denormalized onto the campaign at creation so list filtering does not
/// need a join.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Campaign {
    #[serde(rename = "_id")]
    pub id: CampaignId,
    pub advertiser_id: AdvertiserProfileId,
    pub title: String,
    pub recruitment_start: NaiveDate,
    pub recruitment_end: NaiveDate,
    pub recruitment_count: u32,
    pub benefits: String,
    pub mission: String,
    pub store_info: String,
    pub category: String,
    pub status: CampaignStatus,
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub modified_at: DateTime<Utc>,
}

impl TypedIdMarker for Campaign {
    fn tag() -> &'static str {
        "CPN"
    }
}

/// Strictly linear lifecycle: recruiting -> closed -> selected.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CampaignStatus {
    Recruiting,
    Closed,
    Selected,
}

impl From<CampaignStatus> for Bson {
    fn from(status: CampaignStatus) -> Bson {
        let rendered = match status {
            CampaignStatus::Recruiting => "recruiting",
            CampaignStatus::Closed => "closed",
            CampaignStatus::Selected => "selected",
        };
        rendered.into()
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CampaignSort {
    Latest,
    Deadline,
}

#[derive(Clone, Debug, PartialEq)]
pub struct CampaignListFilter {
    pub status: CampaignStatus,
    pub category: Option<String>,
    pub sort: CampaignSort,
}

#[derive(Clone, Debug)]
pub struct CampaignDraft {
    pub title: String,
    pub recruitment_start: NaiveDate,
    pub recruitment_end: NaiveDate,
    pub recruitment_count: u32,
    pub benefits: String,
    pub mission: String,
    pub store_info: String,
}
