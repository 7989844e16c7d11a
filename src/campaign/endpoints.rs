use actix_web::web::{Data, Json, Path, Query};
use actix_web::{get, post, put, HttpResponse};
use chrono::{DateTime, NaiveDate, Utc};
use futures::{stream, StreamExt, TryStreamExt};
use serde::{Deserialize, Serialize};

use crate::advertiser::AdvertiserProfileId;
use crate::application::{ApplicationBody, ApplicationId};
use crate::auth::Identity;
use crate::database::Database;
use crate::error::Error;
use crate::pagination::{calculate_offset, calculate_pagination, Pagination};
use crate::validation::{days_remaining, is_deadline_soon};

use super::manager::{self, CampaignDetail};
use super::{Campaign, CampaignDraft, CampaignId, CampaignListFilter, CampaignSort, CampaignStatus};

const MAX_PAGE_SIZE: i64 = 100;

fn default_status() -> CampaignStatus {
    CampaignStatus::Recruiting
}

fn default_sort() -> CampaignSort {
    CampaignSort::Latest
}

fn default_page() -> i64 {
    1
}

fn default_limit() -> i64 {
    20
}

#[derive(Clone, Debug, Deserialize)]
pub struct CampaignListQuery {
    pub category: Option<String>,
    #[serde(default = "default_status")]
    pub status: CampaignStatus,
    #[serde(default = "default_sort")]
    pub sort: CampaignSort,
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default = "default_limit")]
    pub limit: i64,
}

#[derive(Clone, Debug, Deserialize)]
pub struct CreateCampaignBody {
    pub title: String,
    pub recruitment_start: NaiveDate,
    pub recruitment_end: NaiveDate,
    pub recruitment_count: u32,
    pub benefits: String,
    pub mission: String,
    pub store_info: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CampaignBody {
    pub id: CampaignId,
    pub title: String,
    pub recruitment_start: NaiveDate,
    pub recruitment_end: NaiveDate,
    pub recruitment_count: u32,
    pub benefits: String,
    pub status: CampaignStatus,
    pub category: String,
    pub company_name: String,
    pub location: String,
    pub created_at: DateTime<Utc>,
    pub days_remaining: i64,
    pub is_deadline_soon: bool,
}

impl CampaignBody {
    pub async fn render(
        db: &dyn Database,
        campaign: Campaign,
        today: NaiveDate,
    ) -> Result<CampaignBody, Error> {
        let advertiser = db
            .advertisers()
            .fetch_profile_by_id(campaign.advertiser_id)
            .await?
            .ok_or_else(|| {
                Error::ExistentialState(format!(
                    "campaign {} references missing advertiser {}",
                    campaign.id, campaign.advertiser_id
                ))
            })?;

        Ok(CampaignBody {
            id: campaign.id,
            title: campaign.title,
            recruitment_start: campaign.recruitment_start,
            recruitment_end: campaign.recruitment_end,
            recruitment_count: campaign.recruitment_count,
            benefits: campaign.benefits,
            status: campaign.status,
            category: campaign.category,
            company_name: advertiser.company_name,
            location: advertiser.location,
            created_at: campaign.created_at,
            days_remaining: days_remaining(campaign.recruitment_end, today),
            is_deadline_soon: is_deadline_soon(campaign.recruitment_end, today),
        })
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CampaignListBody {
    pub campaigns: Vec<CampaignBody>,
    pub pagination: Pagination,
}

#[derive(Clone, Debug, Serialize)]
pub struct AdvertiserSummaryBody {
    pub id: AdvertiserProfileId,
    pub company_name: String,
    pub location: String,
    pub category: String,
    pub store_phone: String,
}

#[derive(Clone, Debug, Serialize)]
pub struct CampaignDetailBody {
    pub id: CampaignId,
    pub title: String,
    pub recruitment_start: NaiveDate,
    pub recruitment_end: NaiveDate,
    pub recruitment_count: u32,
    pub benefits: String,
    pub mission: String,
    pub store_info: String,
    pub status: CampaignStatus,
    pub category: String,
    pub company_name: String,
    pub location: String,
    pub created_at: DateTime<Utc>,
    pub days_remaining: i64,
    pub is_deadline_soon: bool,
    pub has_applied: bool,
    pub has_influencer_profile: bool,
    pub advertiser: AdvertiserSummaryBody,
}

impl CampaignDetailBody {
    pub fn render(detail: CampaignDetail, today: NaiveDate) -> CampaignDetailBody {
        let CampaignDetail {
            campaign,
            advertiser,
            has_influencer_profile,
            has_applied,
        } = detail;

        CampaignDetailBody {
            id: campaign.id,
            title: campaign.title,
            recruitment_start: campaign.recruitment_start,
            recruitment_end: campaign.recruitment_end,
            recruitment_count: campaign.recruitment_count,
            benefits: campaign.benefits,
            mission: campaign.mission,
            store_info: campaign.store_info,
            status: campaign.status,
            category: campaign.category,
            company_name: advertiser.company_name.clone(),
            location: advertiser.location.clone(),
            created_at: campaign.created_at,
            days_remaining: days_remaining(campaign.recruitment_end, today),
            is_deadline_soon: is_deadline_soon(campaign.recruitment_end, today),
            has_applied,
            has_influencer_profile,
            advertiser: AdvertiserSummaryBody {
                id: advertiser.id,
                company_name: advertiser.company_name,
                location: advertiser.location,
                category: advertiser.category,
                store_phone: advertiser.store_phone,
            },
        }
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct AdvertiserCampaignBody {
    pub id: CampaignId,
    pub title: String,
    pub recruitment_start: NaiveDate,
    pub recruitment_end: NaiveDate,
    pub recruitment_count: u32,
    pub status: CampaignStatus,
    pub applicant_count: u64,
    pub created_at: DateTime<Utc>,
}

impl AdvertiserCampaignBody {
    pub fn render(campaign: Campaign, applicant_count: u64) -> AdvertiserCampaignBody {
        AdvertiserCampaignBody {
            id: campaign.id,
            title: campaign.title,
            recruitment_start: campaign.recruitment_start,
            recruitment_end: campaign.recruitment_end,
            recruitment_count: campaign.recruitment_count,
            status: campaign.status,
            applicant_count,
            created_at: campaign.created_at,
        }
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct AdvertiserCampaignDetailBody {
    pub id: CampaignId,
    pub title: String,
    pub recruitment_start: NaiveDate,
    pub recruitment_end: NaiveDate,
    pub recruitment_count: u32,
    pub benefits: String,
    pub mission: String,
    pub store_info: String,
    pub status: CampaignStatus,
    pub created_at: DateTime<Utc>,
    pub applications: Vec<ApplicationBody>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CloseCampaignBody {
    pub status: CampaignStatus,
}

#[derive(Clone, Debug, Deserialize)]
pub struct SelectApplicantsBody {
    pub selected_ids: Vec<ApplicationId>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SelectionResultBody {
    pub selected_count: usize,
    pub rejected_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

#[get("/campaigns")]
#[tracing::instrument(skip(db))]
async fn get_campaigns(
    db: Data<Box<dyn Database>>,
    query: Query<CampaignListQuery>,
) -> Result<Json<CampaignListBody>, Error> {
    let query = query.into_inner();
    let filter = CampaignListFilter {
        status: query.status,
        category: query.category,
        sort: query.sort,
    };
    let limit = query.limit.clamp(1, MAX_PAGE_SIZE);
    let offset = calculate_offset(query.page, limit);

    let (campaigns, total) = manager::get_campaigns(&***db, &filter, offset, limit).await?;

    let today = Utc::now().date_naive();
    let campaigns = stream::iter(campaigns)
        .then(|campaign| CampaignBody::render(&***db, campaign, today))
        .try_collect()
        .await?;

    Ok(Json(CampaignListBody {
        campaigns,
        pagination: calculate_pagination(query.page, limit, total),
    }))
}

#[get("/campaigns/{campaign_id}")]
#[tracing::instrument(skip(db))]
async fn get_campaign_by_id(
    db: Data<Box<dyn Database>>,
    params: Path<CampaignId>,
    identity: Option<Identity>,
) -> Result<Json<CampaignDetailBody>, Error> {
    let campaign_id = params.into_inner();
    let viewer = identity.map(|identity| identity.0);

    let detail = manager::get_campaign_detail(&***db, campaign_id, viewer).await?;

    Ok(Json(CampaignDetailBody::render(
        detail,
        Utc::now().date_naive(),
    )))
}

#[post("/advertiser/campaigns")]
#[tracing::instrument(skip(db))]
async fn create_campaign(
    db: Data<Box<dyn Database>>,
    identity: Identity,
    body: Json<CreateCampaignBody>,
) -> Result<HttpResponse, Error> {
    let body = body.into_inner();
    let draft = CampaignDraft {
        title: body.title,
        recruitment_start: body.recruitment_start,
        recruitment_end: body.recruitment_end,
        recruitment_count: body.recruitment_count,
        benefits: body.benefits,
        mission: body.mission,
        store_info: body.store_info,
    };

    let today = Utc::now().date_naive();
    let campaign = manager::create_campaign(&***db, identity.0, draft, today).await?;
    let body = CampaignBody::render(&***db, campaign, today).await?;

    Ok(HttpResponse::Created().json(body))
}

#[get("/advertiser/campaigns")]
#[tracing::instrument(skip(db))]
async fn get_advertiser_campaigns(
    db: Data<Box<dyn Database>>,
    identity: Identity,
) -> Result<Json<Vec<AdvertiserCampaignBody>>, Error> {
    let campaigns = manager::get_advertiser_campaigns(&***db, identity.0).await?;

    let body = campaigns
        .into_iter()
        .map(|(campaign, applicant_count)| {
            AdvertiserCampaignBody::render(campaign, applicant_count)
        })
        .collect();

    Ok(Json(body))
}

#[get("/advertiser/campaigns/{campaign_id}")]
#[tracing::instrument(skip(db))]
async fn get_advertiser_campaign_by_id(
    db: Data<Box<dyn Database>>,
    identity: Identity,
    params: Path<CampaignId>,
) -> Result<Json<AdvertiserCampaignDetailBody>, Error> {
    let campaign_id = params.into_inner();

    let (campaign, applications) =
        manager::get_advertiser_campaign_detail(&***db, identity.0, campaign_id).await?;

    Ok(Json(AdvertiserCampaignDetailBody {
        id: campaign.id,
        title: campaign.title,
        recruitment_start: campaign.recruitment_start,
        recruitment_end: campaign.recruitment_end,
        recruitment_count: campaign.recruitment_count,
        benefits: campaign.benefits,
        mission: campaign.mission,
        store_info: campaign.store_info,
        status: campaign.status,
        created_at: campaign.created_at,
        applications: applications
            .into_iter()
            .map(ApplicationBody::render)
            .collect(),
    }))
}

#[put("/advertiser/campaigns/{campaign_id}/close")]
#[tracing::instrument(skip(db))]
async fn close_campaign(
    db: Data<Box<dyn Database>>,
    identity: Identity,
    params: Path<CampaignId>,
) -> Result<Json<CloseCampaignBody>, Error> {
    let campaign_id = params.into_inner();

    let status = manager::close_campaign(&***db, identity.0, campaign_id).await?;

    Ok(Json(CloseCampaignBody { status }))
}

#[post("/advertiser/campaigns/{campaign_id}/select")]
#[tracing::instrument(skip(db))]
async fn select_applicants(
    db: Data<Box<dyn Database>>,
    identity: Identity,
    params: Path<CampaignId>,
    body: Json<SelectApplicantsBody>,
) -> Result<Json<SelectionResultBody>, Error> {
    let campaign_id = params.into_inner();
    let body = body.into_inner();

    let outcome =
        manager::select_applicants(&***db, identity.0, campaign_id, body.selected_ids).await?;

    Ok(Json(SelectionResultBody {
        selected_count: outcome.selected_count,
        rejected_count: outcome.rejected_count,
        warning: outcome.warning,
    }))
}
