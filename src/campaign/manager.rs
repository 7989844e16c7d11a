use chrono::{NaiveDate, Utc};

use crate::advertiser::AdvertiserProfile;
use crate::application::{Application, ApplicationId};
use crate::database::Database;
use crate::error::Error;
use crate::user::UserId;
use crate::validation::{is_after_date, is_future_date};

use super::{Campaign, CampaignDraft, CampaignId, CampaignListFilter, CampaignStatus};

pub struct CampaignDetail {
    pub campaign: Campaign,
    pub advertiser: AdvertiserProfile,
    pub has_influencer_profile: bool,
    pub has_applied: bool,
}

#[derive(Debug)]
pub struct SelectionOutcome {
    pub selected_count: usize,
    pub rejected_count: usize,
    pub warning: Option<String>,
}

async fn assert_owned_campaign(
    db: &dyn Database,
    user_id: UserId,
    campaign_id: CampaignId,
) -> Result<(AdvertiserProfile, Campaign), Error> {
    let advertiser = db
        .advertisers()
        .fetch_profile_by_user(user_id)
        .await?
        .ok_or(Error::AdvertiserProfileNotFound { user_id })?;

    let campaign = db
        .campaigns()
        .fetch_campaign_by_id(campaign_id)
        .await?
        .ok_or(Error::CampaignNotFound { campaign_id })?;

    if campaign.advertiser_id != advertiser.id {
        return Err(Error::CampaignAccessDenied { campaign_id });
    }

    Ok((advertiser, campaign))
}

#[tracing::instrument(skip(db))]
pub async fn create_campaign(
    db: &dyn Database,
    user_id: UserId,
    draft: CampaignDraft,
    today: NaiveDate,
) -> Result<Campaign, Error> {
    let advertiser = db
        .advertisers()
        .fetch_profile_by_user(user_id)
        .await?
        .ok_or(Error::AdvertiserProfileNotFound { user_id })?;

    if !advertiser.is_verified {
        return Err(Error::AdvertiserNotVerified {
            advertiser_id: advertiser.id,
        });
    }

    if !is_future_date(draft.recruitment_start, today)
        || !is_after_date(draft.recruitment_end, draft.recruitment_start)
    {
        return Err(Error::InvalidDateRange {
            recruitment_start: draft.recruitment_start,
            recruitment_end: draft.recruitment_end,
        });
    }

    let now = Utc::now();
    let campaign = Campaign {
        id: CampaignId::new(),
        advertiser_id: advertiser.id,
        title: draft.title,
        recruitment_start: draft.recruitment_start,
        recruitment_end: draft.recruitment_end,
        recruitment_count: draft.recruitment_count,
        benefits: draft.benefits,
        mission: draft.mission,
        store_info: draft.store_info,
        category: advertiser.category.clone(),
        status: CampaignStatus::Recruiting,
        created_at: now,
        modified_at: now,
    };

    db.campaigns().insert_campaign(&campaign).await?;

    Ok(campaign)
}

#[tracing::instrument(skip(db))]
pub async fn get_campaigns(
    db: &dyn Database,
    filter: &CampaignListFilter,
    offset: u64,
    limit: i64,
) -> Result<(Vec<Campaign>, u64), Error> {
    let campaigns = db.campaigns().fetch_campaigns(filter, offset, limit).await?;
    let total = db.campaigns().count_campaigns(filter).await?;

    Ok((campaigns, total))
}

#[tracing::instrument(skip(db))]
pub async fn get_campaign_detail(
    db: &dyn Database,
    campaign_id: CampaignId,
    viewer: Option<UserId>,
) -> Result<CampaignDetail, Error> {
    let campaign = db
        .campaigns()
        .fetch_campaign_by_id(campaign_id)
        .await?
        .ok_or(Error::CampaignNotFound { campaign_id })?;

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

    let mut has_influencer_profile = false;
    let mut has_applied = false;

    if let Some(user_id) = viewer {
        if let Some(influencer) = db.influencers().fetch_profile_by_user(user_id).await? {
            if influencer.is_verified {
                has_influencer_profile = true;
                has_applied = db
                    .applications()
                    .fetch_application_by_campaign_and_influencer(campaign.id, influencer.id)
                    .await?
                    .is_some();
            }
        }
    }

    Ok(CampaignDetail {
        campaign,
        advertiser,
        has_influencer_profile,
        has_applied,
    })
}

#[tracing::instrument(skip(db))]
pub async fn get_advertiser_campaigns(
    db: &dyn Database,
    user_id: UserId,
) -> Result<Vec<(Campaign, u64)>, Error> {
    let advertiser = db
        .advertisers()
        .fetch_profile_by_user(user_id)
        .await?
        .ok_or(Error::AdvertiserProfileNotFound { user_id })?;

    let campaigns = db
        .campaigns()
        .fetch_campaigns_by_advertiser(advertiser.id)
        .await?;

    let mut listed = Vec::with_capacity(campaigns.len());
    for campaign in campaigns {
        let applicant_count = db
            .applications()
            .count_applications_by_campaign(campaign.id)
            .await?;
        listed.push((campaign, applicant_count));
    }

    Ok(listed)
}

#[tracing::instrument(skip(db))]
pub async fn get_advertiser_campaign_detail(
    db: &dyn Database,
    user_id: UserId,
    campaign_id: CampaignId,
) -> Result<(Campaign, Vec<Application>), Error> {
    let (_, campaign) = assert_owned_campaign(db, user_id, campaign_id).await?;

    let applications = db
        .applications()
        .fetch_applications_by_campaign(campaign.id)
        .await?;

    Ok((campaign, applications))
}

#[tracing::instrument(skip(db))]
pub async fn close_campaign(
    db: &dyn Database,
    user_id: UserId,
    campaign_id: CampaignId,
) -> Result<CampaignStatus, Error> {
    let (_, campaign) = assert_owned_campaign(db, user_id, campaign_id).await?;

    match campaign.status {
        CampaignStatus::Recruiting => {}
        CampaignStatus::Closed => return Err(Error::CampaignAlreadyClosed { campaign_id }),
        CampaignStatus::Selected => return Err(Error::CampaignAlreadySelected { campaign_id }),
    }

    db.campaigns()
        .update_campaign_status(
            campaign.id,
            CampaignStatus::Recruiting,
            CampaignStatus::Closed,
        )
        .await?;

    Ok(CampaignStatus::Closed)
}

#[tracing::instrument(skip(db))]
pub async fn select_applicants(
    db: &dyn Database,
    user_id: UserId,
    campaign_id: CampaignId,
    selected_ids: Vec<ApplicationId>,
) -> Result<SelectionOutcome, Error> {
    let (_, campaign) = assert_owned_campaign(db, user_id, campaign_id).await?;

    match campaign.status {
        CampaignStatus::Closed => {}
        CampaignStatus::Recruiting => return Err(Error::CampaignNotClosedYet { campaign_id }),
        CampaignStatus::Selected => return Err(Error::CampaignAlreadySelected { campaign_id }),
    }

    let applications = db
        .applications()
        .fetch_applications_by_campaign(campaign.id)
        .await?;

    let unknown_ids: Vec<ApplicationId> = selected_ids
        .iter()
        .copied()
        .filter(|id| !applications.iter().any(|application| application.id == *id))
        .collect();
    if !unknown_ids.is_empty() {
        return Err(Error::InvalidSelection {
            campaign_id,
            application_ids: unknown_ids,
        });
    }

    let selected_count = applications
        .iter()
        .filter(|application| selected_ids.contains(&application.id))
        .count();
    let rejected_count = applications.len() - selected_count;

    // applications are partitioned before the terminal status flip so a
    // retry after a partial failure re-enters while the campaign still
    // reads closed and converges on the same end state
    db.applications()
        .finalize_selection(campaign.id, &selected_ids)
        .await?;
    db.campaigns()
        .update_campaign_status(campaign.id, CampaignStatus::Closed, CampaignStatus::Selected)
        .await?;

    let warning = if selected_count as u32 != campaign.recruitment_count {
        Some(format!(
            "selected {} applicants for {} recruitment slots",
            selected_count, campaign.recruitment_count
        ))
    } else {
        None
    };

    Ok(SelectionOutcome {
        selected_count,
        rejected_count,
        warning,
    })
}
