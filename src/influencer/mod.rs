use chrono::{DateTime, Utc};
use mongodb::bson::Bson;
use serde::{Deserialize, Serialize};

use crate::typedid::{TypedId, TypedIdMarker};
use crate::user::UserId;

pub mod db;
pub mod endpoints;
pub mod manager;
pub use endpoints::*;

pub type InfluencerProfileId = TypedId<InfluencerProfile>;
pub type ChannelId = TypedId<Channel>;

/// Creator-side extension of an account. Verification flips on once at
/// least one SNS channel is registered.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct InfluencerProfile {
    #[serde(rename = "_id")]
    pub id: InfluencerProfileId,
    pub user_id: UserId,
    pub is_verified: bool,
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub modified_at: DateTime<Utc>,
}

impl TypedIdMarker for InfluencerProfile {
    fn tag() -> &'static str {
        "INF"
    }
}

/// A registered SNS presence. Urls are stored normalized and must be unique
/// within one influencer's channel set.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Channel {
    #[serde(rename = "_id")]
    pub id: ChannelId,
    pub influencer_id: InfluencerProfileId,
    pub platform: ChannelPlatform,
    pub channel_name: String,
    pub channel_url: String,
    pub follower_count: u64,
    pub verification_status: ChannelVerificationStatus,
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub modified_at: DateTime<Utc>,
}

impl TypedIdMarker for Channel {
    fn tag() -> &'static str {
        "CHN"
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChannelPlatform {
    Naver,
    Youtube,
    Instagram,
    Threads,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChannelVerificationStatus {
    Pending,
    Verified,
    Failed,
}

impl From<ChannelVerificationStatus> for Bson {
    fn from(status: ChannelVerificationStatus) -> Bson {
        let rendered = match status {
            ChannelVerificationStatus::Pending => "pending",
            ChannelVerificationStatus::Verified => "verified",
            ChannelVerificationStatus::Failed => "failed",
        };
        rendered.into()
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct ChannelDraft {
    pub platform: ChannelPlatform,
    pub channel_name: Option<String>,
    pub channel_url: String,
    pub follower_count: Option<u64>,
}

pub const MAX_CHANNELS: u64 = 10;
