use chrono::{NaiveDate, Utc};

use crate::campaign::CampaignStatus;
use crate::database::Database;
use crate::error::Error;
use crate::pagination::{calculate_offset, calculate_pagination, Pagination};
use crate::user::UserId;
use crate::validation::{is_after_date, is_future_date};

use super::{Application, ApplicationId, ApplicationStatus};
use crate::campaign::CampaignId;

const MESSAGE_MIN_CHARS: usize = 10;
const MESSAGE_MAX_CHARS: usize = 500;

/// Preconditions run top to bottom and the first failure wins; nothing is
/// written until every gate has passed.
#[tracing::instrument(skip(db, message))]
pub async fn create_application(
    db: &dyn Database,
    user_id: UserId,
    campaign_id: CampaignId,
    message: String,
    visit_date: NaiveDate,
    today: NaiveDate,
) -> Result<Application, Error> {
    let length = message.chars().count();
    if length < MESSAGE_MIN_CHARS || length > MESSAGE_MAX_CHARS {
        return Err(Error::InvalidMessageLength { length });
    }

    let influencer = db
        .influencers()
        .fetch_profile_by_user(user_id)
        .await?
        .ok_or(Error::InfluencerProfileNotFound { user_id })?;

    if !influencer.is_verified {
        return Err(Error::InfluencerNotVerified {
            influencer_id: influencer.id,
        });
    }

    let campaign = db
        .campaigns()
        .fetch_campaign_by_id(campaign_id)
        .await?
        .ok_or(Error::CampaignNotFound { campaign_id })?;

    if campaign.status != CampaignStatus::Recruiting {
        return Err(Error::RecruitmentClosed { campaign_id });
    }

    // the status field and the calendar window are independent gates: a
    // campaign whose window lapsed without an explicit close still reads
    // recruiting but must not accept applications
    if today < campaign.recruitment_start || today > campaign.recruitment_end {
        return Err(Error::RecruitmentClosed { campaign_id });
    }

    let existing = db
        .applications()
        .fetch_application_by_campaign_and_influencer(campaign.id, influencer.id)
        .await?;
    if existing.is_some() {
        return Err(Error::AlreadyApplied {
            campaign_id,
            influencer_id: influencer.id,
        });
    }

    if !is_future_date(visit_date, today) {
        return Err(Error::InvalidVisitDate { visit_date });
    }
    if !is_after_date(visit_date, campaign.recruitment_end) {
        return Err(Error::InvalidVisitDate { visit_date });
    }

    let now = Utc::now();
    let application = Application {
        id: ApplicationId::new(),
        campaign_id: campaign.id,
        influencer_id: influencer.id,
        message,
        visit_date,
        status: ApplicationStatus::Applied,
        created_at: now,
        modified_at: now,
    };

    db.applications().insert_application(&application).await?;

    Ok(application)
}

#[tracing::instrument(skip(db))]
pub async fn get_my_applications(
    db: &dyn Database,
    user_id: UserId,
    status: Option<ApplicationStatus>,
    page: i64,
    limit: i64,
) -> Result<(Vec<Application>, Pagination), Error> {
    let influencer = db
        .influencers()
        .fetch_profile_by_user(user_id)
        .await?
        .ok_or(Error::InfluencerProfileNotFound { user_id })?;

    let offset = calculate_offset(page, limit);
    let applications = db
        .applications()
        .fetch_applications_by_influencer(influencer.id, status, offset, limit.max(1))
        .await?;
    let total = db
        .applications()
        .count_applications_by_influencer(influencer.id, status)
        .await?;

    Ok((applications, calculate_pagination(page, limit, total)))
}
