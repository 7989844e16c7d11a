//! Drives a campaign through its whole life: created while recruiting,
//! applications inside the window, the window lapsing, the explicit close,
//! and the terminal selection. Storage is a stateful in-memory double so the
//! clock can be moved freely.

use std::sync::{Arc, Mutex};

use chrono::{NaiveDate, Utc};

use crewmatch_server::advertiser::{AdvertiserProfile, AdvertiserProfileId};
use crewmatch_server::application::{manager as applications, Application, ApplicationStatus};
use crewmatch_server::campaign::{manager as campaigns, Campaign, CampaignDraft, CampaignStatus};
use crewmatch_server::database::test::MockDatabase;
use crewmatch_server::error::Error;
use crewmatch_server::influencer::{InfluencerProfile, InfluencerProfileId};
use crewmatch_server::user::UserId;

struct World {
    advertiser: AdvertiserProfile,
    influencers: Vec<InfluencerProfile>,
    campaign: Option<Campaign>,
    applications: Vec<Application>,
}

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

fn new_world(advertiser_user: UserId, influencer_users: &[UserId]) -> Arc<Mutex<World>> {
    let now = Utc::now();
    Arc::new(Mutex::new(World {
        advertiser: AdvertiserProfile {
            id: AdvertiserProfileId::new(),
            user_id: advertiser_user,
            company_name: "Han River Bites".to_string(),
            address: "12 Mapo-daero, Seoul".to_string(),
            location: "Seoul Mapo-gu".to_string(),
            store_phone: "010-1234-5678".to_string(),
            category: "food".to_string(),
            business_number: "123-45-67891".to_string(),
            representative_name: "Kim Jiwoo".to_string(),
            is_verified: true,
            created_at: now,
            modified_at: now,
        },
        influencers: influencer_users
            .iter()
            .map(|user_id| InfluencerProfile {
                id: InfluencerProfileId::new(),
                user_id: *user_id,
                is_verified: true,
                created_at: now,
                modified_at: now,
            })
            .collect(),
        campaign: None,
        applications: vec![],
    }))
}

fn wired_db(world: &Arc<Mutex<World>>) -> MockDatabase {
    let mut db = MockDatabase::new();

    let w = Arc::clone(world);
    db.advertisers.on_fetch_profile_by_user = Box::new(move |user_id| {
        let w = w.lock().unwrap();
        Ok(Some(w.advertiser.clone()).filter(|profile| profile.user_id == user_id))
    });

    let w = Arc::clone(world);
    db.influencers.on_fetch_profile_by_user = Box::new(move |user_id| {
        let w = w.lock().unwrap();
        Ok(w.influencers
            .iter()
            .find(|profile| profile.user_id == user_id)
            .cloned())
    });

    let w = Arc::clone(world);
    db.campaigns.on_insert_campaign = Box::new(move |campaign| {
        w.lock().unwrap().campaign = Some(campaign.clone());
        Ok(())
    });

    let w = Arc::clone(world);
    db.campaigns.on_fetch_campaign_by_id = Box::new(move |campaign_id| {
        let w = w.lock().unwrap();
        Ok(w.campaign.clone().filter(|campaign| campaign.id == campaign_id))
    });

    let w = Arc::clone(world);
    db.campaigns.on_update_campaign_status = Box::new(move |campaign_id, from, to| {
        let mut w = w.lock().unwrap();
        match w.campaign.as_mut() {
            Some(campaign) if campaign.id == campaign_id && campaign.status == from => {
                campaign.status = to;
                Ok(())
            }
            _ => Err(Error::ConcurrentModificationDetected),
        }
    });

    let w = Arc::clone(world);
    db.applications.on_fetch_application_by_campaign_and_influencer =
        Box::new(move |campaign_id, influencer_id| {
            let w = w.lock().unwrap();
            Ok(w.applications
                .iter()
                .find(|application| {
                    application.campaign_id == campaign_id
                        && application.influencer_id == influencer_id
                })
                .cloned())
        });

    let w = Arc::clone(world);
    db.applications.on_insert_application = Box::new(move |application| {
        let mut w = w.lock().unwrap();
        // mirrors the storage-level unique (campaign_id, influencer_id) index
        if w.applications.iter().any(|existing| {
            existing.campaign_id == application.campaign_id
                && existing.influencer_id == application.influencer_id
        }) {
            return Err(Error::AlreadyApplied {
                campaign_id: application.campaign_id,
                influencer_id: application.influencer_id,
            });
        }
        w.applications.push(application.clone());
        Ok(())
    });

    let w = Arc::clone(world);
    db.applications.on_fetch_applications_by_campaign = Box::new(move |campaign_id| {
        let w = w.lock().unwrap();
        Ok(w.applications
            .iter()
            .filter(|application| application.campaign_id == campaign_id)
            .cloned()
            .collect())
    });

    let w = Arc::clone(world);
    db.applications.on_finalize_selection = Box::new(move |campaign_id, selected| {
        let mut w = w.lock().unwrap();
        for application in w
            .applications
            .iter_mut()
            .filter(|application| application.campaign_id == campaign_id)
        {
            application.status = if selected.contains(&application.id) {
                ApplicationStatus::Selected
            } else {
                ApplicationStatus::Rejected
            };
        }
        Ok(())
    });

    db
}

#[tokio::test]
async fn campaign_lifecycle_from_recruiting_to_selected() {
    let advertiser_user = UserId::new();
    let influencer_users = [UserId::new(), UserId::new(), UserId::new()];
    let world = new_world(advertiser_user, &influencer_users);
    let db = wired_db(&world);

    // created with a window starting tomorrow
    let created_on = date(2025, 6, 15);
    let draft = CampaignDraft {
        title: "Weekend tasting crew".to_string(),
        recruitment_start: date(2025, 6, 16),
        recruitment_end: date(2025, 6, 23),
        recruitment_count: 1,
        benefits: "Dinner for two".to_string(),
        mission: "Post an honest review".to_string(),
        store_info: "Open 11:00-22:00".to_string(),
    };
    let campaign = campaigns::create_campaign(&db, advertiser_user, draft, created_on)
        .await
        .unwrap();
    assert_eq!(campaign.status, CampaignStatus::Recruiting);

    // two applications inside the window
    let mid_window = date(2025, 6, 18);
    let first = applications::create_application(
        &db,
        influencer_users[0],
        campaign.id,
        "I cover new restaurant openings weekly".to_string(),
        date(2025, 6, 28),
        mid_window,
    )
    .await
    .unwrap();
    let second = applications::create_application(
        &db,
        influencer_users[1],
        campaign.id,
        "My readers keep asking for Mapo-gu picks".to_string(),
        date(2025, 6, 29),
        mid_window,
    )
    .await
    .unwrap();

    // applying twice conflicts regardless of the window
    let duplicate = applications::create_application(
        &db,
        influencer_users[0],
        campaign.id,
        "Let me apply one more time".to_string(),
        date(2025, 6, 28),
        mid_window,
    )
    .await;
    assert_eq!(
        duplicate.unwrap_err(),
        Error::AlreadyApplied {
            campaign_id: campaign.id,
            influencer_id: first.influencer_id,
        }
    );

    // the clock moves past the window with no explicit close; the status
    // still reads recruiting but applying is over
    let after_window = date(2025, 6, 30);
    {
        let w = world.lock().unwrap();
        assert_eq!(
            w.campaign.as_ref().unwrap().status,
            CampaignStatus::Recruiting
        );
    }
    let late = applications::create_application(
        &db,
        influencer_users[2],
        campaign.id,
        "Am I too late for this one?".to_string(),
        date(2025, 7, 5),
        after_window,
    )
    .await;
    assert_eq!(
        late.unwrap_err(),
        Error::RecruitmentClosed {
            campaign_id: campaign.id
        }
    );

    // selection before closing is rejected
    let premature =
        campaigns::select_applicants(&db, advertiser_user, campaign.id, vec![first.id]).await;
    assert_eq!(
        premature.unwrap_err(),
        Error::CampaignNotClosedYet {
            campaign_id: campaign.id
        }
    );

    // explicit close, exactly once
    let status = campaigns::close_campaign(&db, advertiser_user, campaign.id)
        .await
        .unwrap();
    assert_eq!(status, CampaignStatus::Closed);

    let reclose = campaigns::close_campaign(&db, advertiser_user, campaign.id).await;
    assert_eq!(
        reclose.unwrap_err(),
        Error::CampaignAlreadyClosed {
            campaign_id: campaign.id
        }
    );

    // terminal selection partitions every application
    let outcome =
        campaigns::select_applicants(&db, advertiser_user, campaign.id, vec![first.id])
            .await
            .unwrap();
    assert_eq!(outcome.selected_count, 1);
    assert_eq!(outcome.rejected_count, 1);
    assert!(outcome.warning.is_none());

    {
        let w = world.lock().unwrap();
        assert_eq!(w.campaign.as_ref().unwrap().status, CampaignStatus::Selected);
        for application in &w.applications {
            assert_ne!(application.status, ApplicationStatus::Applied);
        }
        let selected: Vec<_> = w
            .applications
            .iter()
            .filter(|application| application.status == ApplicationStatus::Selected)
            .collect();
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].id, first.id);
        assert_eq!(
            w.applications
                .iter()
                .filter(|application| application.status == ApplicationStatus::Rejected)
                .map(|application| application.id)
                .collect::<Vec<_>>(),
            vec![second.id]
        );
    }

    // the machine is monotonic: no re-selection, no falling back
    let reselect =
        campaigns::select_applicants(&db, advertiser_user, campaign.id, vec![second.id]).await;
    assert_eq!(
        reselect.unwrap_err(),
        Error::CampaignAlreadySelected {
            campaign_id: campaign.id
        }
    );

    let close_after_selection = campaigns::close_campaign(&db, advertiser_user, campaign.id).await;
    assert_eq!(
        close_after_selection.unwrap_err(),
        Error::CampaignAlreadySelected {
            campaign_id: campaign.id
        }
    );
}

#[tokio::test]
async fn selection_with_a_foreign_application_id_changes_nothing() {
    let advertiser_user = UserId::new();
    let influencer_users = [UserId::new()];
    let world = new_world(advertiser_user, &influencer_users);
    let db = wired_db(&world);

    let draft = CampaignDraft {
        title: "New menu preview".to_string(),
        recruitment_start: date(2025, 6, 16),
        recruitment_end: date(2025, 6, 23),
        recruitment_count: 1,
        benefits: "Full tasting course".to_string(),
        mission: "Cover the new menu".to_string(),
        store_info: "Reservations required".to_string(),
    };
    let campaign = campaigns::create_campaign(&db, advertiser_user, draft, date(2025, 6, 15))
        .await
        .unwrap();

    let application = applications::create_application(
        &db,
        influencer_users[0],
        campaign.id,
        "I cover new restaurant openings weekly".to_string(),
        date(2025, 6, 28),
        date(2025, 6, 18),
    )
    .await
    .unwrap();

    campaigns::close_campaign(&db, advertiser_user, campaign.id)
        .await
        .unwrap();

    let foreign_id = crewmatch_server::application::ApplicationId::new();
    let result = campaigns::select_applicants(
        &db,
        advertiser_user,
        campaign.id,
        vec![application.id, foreign_id],
    )
    .await;

    assert_eq!(
        result.unwrap_err(),
        Error::InvalidSelection {
            campaign_id: campaign.id,
            application_ids: vec![foreign_id],
        }
    );

    let w = world.lock().unwrap();
    assert_eq!(w.campaign.as_ref().unwrap().status, CampaignStatus::Closed);
    assert!(w
        .applications
        .iter()
        .all(|application| application.status == ApplicationStatus::Applied));
}
