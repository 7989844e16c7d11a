use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::typedid::{TypedId, TypedIdMarker};
use crate::user::UserId;

pub mod db;
pub mod endpoints;
pub mod manager;
pub use endpoints::*;

pub type AdvertiserProfileId = TypedId<AdvertiserProfile>;

/// Business-side extension of an account. Only verified advertisers may
/// create, close, or select campaigns; verification is granted when the
/// registration data (including a checksum-valid business number) lands.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct AdvertiserProfile {
    #[serde(rename = "_id")]
    pub id: AdvertiserProfileId,
    pub user_id: UserId,
    pub company_name: String,
    pub address: String,
    pub location: String,
    pub store_phone: String,
    pub category: String,
    pub business_number: String,
    pub representative_name: String,
    pub is_verified: bool,
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub modified_at: DateTime<Utc>,
}

impl TypedIdMarker for AdvertiserProfile {
    fn tag() -> &'static str {
        "ADV"
    }
}

#[derive(Clone, Debug)]
pub struct AdvertiserProfileDraft {
    pub company_name: String,
    pub address: String,
    pub location: String,
    pub store_phone: String,
    pub category: String,
    pub business_number: String,
    pub representative_name: String,
}
