use actix_web::web::{Data, Json, Path, Query};
use actix_web::{delete, get, post, HttpResponse};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::auth::Identity;
use crate::database::Database;
use crate::error::Error;
use crate::user::UserId;
use crate::utils::SuccessBody;

use super::{
    manager, Channel, ChannelDraft, ChannelId, ChannelPlatform, ChannelVerificationStatus,
    InfluencerProfile, InfluencerProfileId,
};

#[derive(Clone, Debug, Deserialize)]
pub struct CreateInfluencerProfileBody {
    pub channels: Vec<ChannelDraft>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ChannelBody {
    pub id: ChannelId,
    pub platform: ChannelPlatform,
    pub channel_name: String,
    pub channel_url: String,
    pub follower_count: u64,
    pub verification_status: ChannelVerificationStatus,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
}

impl ChannelBody {
    pub fn render(channel: Channel) -> ChannelBody {
        ChannelBody {
            id: channel.id,
            platform: channel.platform,
            channel_name: channel.channel_name,
            channel_url: channel.channel_url,
            follower_count: channel.follower_count,
            verification_status: channel.verification_status,
            created_at: channel.created_at,
            modified_at: channel.modified_at,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct InfluencerProfileBody {
    pub id: InfluencerProfileId,
    pub user_id: UserId,
    pub is_verified: bool,
    pub channels: Vec<ChannelBody>,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
}

impl InfluencerProfileBody {
    pub fn render(profile: InfluencerProfile, channels: Vec<Channel>) -> InfluencerProfileBody {
        InfluencerProfileBody {
            id: profile.id,
            user_id: profile.user_id,
            is_verified: profile.is_verified,
            channels: channels.into_iter().map(ChannelBody::render).collect(),
            created_at: profile.created_at,
            modified_at: profile.modified_at,
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct ChannelDuplicateQuery {
    pub channel_url: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ChannelDuplicateBody {
    pub is_duplicate: bool,
}

#[get("/influencer/profile")]
#[tracing::instrument(skip(db))]
async fn get_influencer_profile(
    db: Data<Box<dyn Database>>,
    identity: Identity,
) -> Result<Json<InfluencerProfileBody>, Error> {
    let (profile, channels) = manager::get_profile(&***db, identity.0).await?;

    Ok(Json(InfluencerProfileBody::render(profile, channels)))
}

#[post("/influencer/profile")]
#[tracing::instrument(skip(db))]
async fn upsert_influencer_profile(
    db: Data<Box<dyn Database>>,
    identity: Identity,
    body: Json<CreateInfluencerProfileBody>,
) -> Result<HttpResponse, Error> {
    let body = body.into_inner();

    let (profile, channels) = manager::upsert_profile(&***db, identity.0, body.channels).await?;

    Ok(HttpResponse::Created().json(InfluencerProfileBody::render(profile, channels)))
}

#[post("/influencer/channels")]
#[tracing::instrument(skip(db))]
async fn add_channel(
    db: Data<Box<dyn Database>>,
    identity: Identity,
    body: Json<ChannelDraft>,
) -> Result<HttpResponse, Error> {
    let channel = manager::add_channel(&***db, identity.0, body.into_inner()).await?;

    Ok(HttpResponse::Created().json(ChannelBody::render(channel)))
}

#[delete("/influencer/channels/{channel_id}")]
#[tracing::instrument(skip(db))]
async fn delete_channel(
    db: Data<Box<dyn Database>>,
    identity: Identity,
    params: Path<ChannelId>,
) -> Result<Json<SuccessBody>, Error> {
    let channel_id = params.into_inner();

    manager::delete_channel(&***db, identity.0, channel_id).await?;

    Ok(Json(SuccessBody {}))
}

#[get("/influencer/channels/duplicate")]
#[tracing::instrument(skip(db))]
async fn check_channel_duplicate(
    db: Data<Box<dyn Database>>,
    identity: Identity,
    query: Query<ChannelDuplicateQuery>,
) -> Result<Json<ChannelDuplicateBody>, Error> {
    let is_duplicate =
        manager::check_channel_duplicate(&***db, identity.0, &query.channel_url).await?;

    Ok(Json(ChannelDuplicateBody { is_duplicate }))
}
