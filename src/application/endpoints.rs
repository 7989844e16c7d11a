use actix_web::web::{Data, Json, Path, Query};
use actix_web::{get, post, HttpResponse};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::auth::Identity;
use crate::campaign::{CampaignId, CampaignStatus};
use crate::database::Database;
use crate::error::Error;
use crate::influencer::InfluencerProfileId;
use crate::pagination::Pagination;

use super::{manager, Application, ApplicationId, ApplicationStatus};

const MAX_PAGE_SIZE: i64 = 50;

fn default_page() -> i64 {
    1
}

fn default_limit() -> i64 {
    10
}

#[derive(Clone, Debug, Deserialize)]
pub struct ApplyBody {
    pub message: String,
    pub visit_date: NaiveDate,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ApplicationBody {
    pub id: ApplicationId,
    pub campaign_id: CampaignId,
    pub influencer_id: InfluencerProfileId,
    pub message: String,
    pub visit_date: NaiveDate,
    pub status: ApplicationStatus,
    pub created_at: DateTime<Utc>,
}

impl ApplicationBody {
    pub fn render(application: Application) -> ApplicationBody {
        ApplicationBody {
            id: application.id,
            campaign_id: application.campaign_id,
            influencer_id: application.influencer_id,
            message: application.message,
            visit_date: application.visit_date,
            status: application.status,
            created_at: application.created_at,
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct MyApplicationsQuery {
    pub status: Option<ApplicationStatus>,
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default = "default_limit")]
    pub limit: i64,
}

/// Campaign summary attached to a list entry. Applications outlive their
/// campaign, so a dangling reference renders as a tombstone instead of
/// failing the whole page.
#[derive(Clone, Debug, Serialize)]
pub struct AppliedCampaignBody {
    pub id: CampaignId,
    pub title: String,
    pub company_name: String,
    pub location: String,
    pub category: String,
    pub recruitment_end: Option<NaiveDate>,
    pub status: CampaignStatus,
    pub is_deleted: bool,
}

#[derive(Clone, Debug, Serialize)]
pub struct MyApplicationBody {
    pub id: ApplicationId,
    pub message: String,
    pub visit_date: NaiveDate,
    pub status: ApplicationStatus,
    pub applied_at: DateTime<Utc>,
    pub campaign: AppliedCampaignBody,
}

impl MyApplicationBody {
    pub async fn render(
        db: &dyn Database,
        application: Application,
    ) -> Result<MyApplicationBody, Error> {
        let campaign = db
            .campaigns()
            .fetch_campaign_by_id(application.campaign_id)
            .await?;

        let campaign_body = match campaign {
            Some(campaign) => {
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

                AppliedCampaignBody {
                    id: campaign.id,
                    title: campaign.title,
                    company_name: advertiser.company_name,
                    location: advertiser.location,
                    category: campaign.category,
                    recruitment_end: Some(campaign.recruitment_end),
                    status: campaign.status,
                    is_deleted: false,
                }
            }
            None => AppliedCampaignBody {
                id: application.campaign_id,
                title: "Deleted campaign".to_string(),
                company_name: "-".to_string(),
                location: "-".to_string(),
                category: "-".to_string(),
                recruitment_end: None,
                status: CampaignStatus::Closed,
                is_deleted: true,
            },
        };

        Ok(MyApplicationBody {
            id: application.id,
            message: application.message,
            visit_date: application.visit_date,
            status: application.status,
            applied_at: application.created_at,
            campaign: campaign_body,
        })
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct MyApplicationsBody {
    pub applications: Vec<MyApplicationBody>,
    pub pagination: Pagination,
}

#[post("/campaigns/{campaign_id}/apply")]
#[tracing::instrument(skip(db))]
async fn apply_to_campaign(
    db: Data<Box<dyn Database>>,
    identity: Identity,
    params: Path<CampaignId>,
    body: Json<ApplyBody>,
) -> Result<HttpResponse, Error> {
    let campaign_id = params.into_inner();
    let body = body.into_inner();

    let application = manager::create_application(
        &***db,
        identity.0,
        campaign_id,
        body.message,
        body.visit_date,
        Utc::now().date_naive(),
    )
    .await?;

    Ok(HttpResponse::Created().json(ApplicationBody::render(application)))
}

#[get("/my/applications")]
#[tracing::instrument(skip(db))]
async fn get_my_applications(
    db: Data<Box<dyn Database>>,
    identity: Identity,
    query: Query<MyApplicationsQuery>,
) -> Result<Json<MyApplicationsBody>, Error> {
    let query = query.into_inner();
    let limit = query.limit.clamp(1, MAX_PAGE_SIZE);

    let (applications, pagination) =
        manager::get_my_applications(&***db, identity.0, query.status, query.page, limit).await?;

    let mut rendered = Vec::with_capacity(applications.len());
    for application in applications {
        rendered.push(MyApplicationBody::render(&***db, application).await?);
    }

    Ok(Json(MyApplicationsBody {
        applications: rendered,
        pagination,
    }))
}
