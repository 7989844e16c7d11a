use chrono::{Duration, Utc};

use crate::advertiser::AdvertiserProfile;
use crate::application::{Application, ApplicationStatus};
use crate::campaign::{Campaign, CampaignStatus};
use crate::database::{Database, MongoDatabase};
use crate::error::Error;
use crate::influencer::{
    Channel, ChannelPlatform, ChannelVerificationStatus, InfluencerProfile,
};

/// Drops the database and loads a small demo data set: one advertiser with a
/// recruiting and a closed campaign, and two verified influencers who applied
/// to the closed one. Development only.
pub async fn seed(db: &MongoDatabase) -> Result<(), Error> {
    db.drop().await?;
    db.ensure_indexes().await?;

    let advertiser_user_id = "7b9a7440-9b34-40bb-b533-3a6d6e2874bc".parse().unwrap();
    let influencer1_user_id = "95b1e9b0-94a0-41cf-9e09-4b9c53fbbd13".parse().unwrap();
    let influencer2_user_id = "cfe4d27b-121f-49b0-99ba-9a24646c6ad9".parse().unwrap();
    let advertiser_id = "5c7f1b63-7c52-41e2-9c29-5d7a57e542d5".parse().unwrap();
    let influencer1_id = "0b2f9de2-9ea6-4f9c-8f19-66b87ee03ad1".parse().unwrap();
    let influencer2_id = "e5a7e9a1-16c2-45a1-8c83-51b3b0c76a77".parse().unwrap();
    let channel_id = "c41d2b8e-74d4-45a6-a9d5-2f3e37ce1d3f".parse().unwrap();
    let recruiting_campaign_id = "6a1c1ae6-51a1-43fd-8275-dfdc21c74ae2".parse().unwrap();
    let closed_campaign_id = "9d5a6b1d-01f7-41d4-a7a0-77c0d2ba87f6".parse().unwrap();
    let application1_id = "3f2b5f86-0f82-4dd1-a6ff-9ff4bb2ad6c4".parse().unwrap();
    let application2_id = "ba0a1ad9-5f17-4e06-95b1-07c1a1b3b9a8".parse().unwrap();

    let now = Utc::now();
    let today = now.date_naive();

    let advertiser = AdvertiserProfile {
        id: advertiser_id,
        user_id: advertiser_user_id,
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
    };

    let influencers = vec![
        InfluencerProfile {
            id: influencer1_id,
            user_id: influencer1_user_id,
            is_verified: true,
            created_at: now,
            modified_at: now,
        },
        InfluencerProfile {
            id: influencer2_id,
            user_id: influencer2_user_id,
            is_verified: true,
            created_at: now,
            modified_at: now,
        },
    ];

    let channel = Channel {
        id: channel_id,
        influencer_id: influencer1_id,
        platform: ChannelPlatform::Naver,
        channel_name: "tastyfood".to_string(),
        channel_url: "https://blog.naver.com/tastyfood".to_string(),
        follower_count: 4200,
        verification_status: ChannelVerificationStatus::Verified,
        created_at: now,
        modified_at: now,
    };

    let campaigns = vec![
        Campaign {
            id: recruiting_campaign_id,
            advertiser_id,
            title: "Weekend tasting crew".to_string(),
            recruitment_start: today - Duration::days(3),
            recruitment_end: today + Duration::days(7),
            recruitment_count: 5,
            benefits: "Dinner for two, up to 80,000 KRW".to_string(),
            mission: "Post an honest review with photos within a week".to_string(),
            store_info: "Open 11:00-22:00, closed Mondays".to_string(),
            category: "food".to_string(),
            status: CampaignStatus::Recruiting,
            created_at: now,
            modified_at: now,
        },
        Campaign {
            id: closed_campaign_id,
            advertiser_id,
            title: "New menu preview".to_string(),
            recruitment_start: today - Duration::days(14),
            recruitment_end: today - Duration::days(2),
            recruitment_count: 2,
            benefits: "Full tasting course".to_string(),
            mission: "Cover the new menu in one post".to_string(),
            store_info: "Reservations required".to_string(),
            category: "food".to_string(),
            status: CampaignStatus::Closed,
            created_at: now - Duration::days(14),
            modified_at: now,
        },
    ];

    let applications = vec![
        Application {
            id: application1_id,
            campaign_id: closed_campaign_id,
            influencer_id: influencer1_id,
            message: "I cover new restaurant openings every week".to_string(),
            visit_date: today + Duration::days(5),
            status: ApplicationStatus::Applied,
            created_at: now - Duration::days(5),
            modified_at: now - Duration::days(5),
        },
        Application {
            id: application2_id,
            campaign_id: closed_campaign_id,
            influencer_id: influencer2_id,
            message: "My readers keep asking for Mapo-gu picks".to_string(),
            visit_date: today + Duration::days(6),
            status: ApplicationStatus::Applied,
            created_at: now - Duration::days(4),
            modified_at: now - Duration::days(4),
        },
    ];

    db.advertisers().insert_profile(&advertiser).await?;
    for influencer in &influencers {
        db.influencers().insert_profile(influencer).await?;
    }
    db.channels().insert_channel(&channel).await?;
    for campaign in &campaigns {
        db.campaigns().insert_campaign(campaign).await?;
    }
    for application in &applications {
        db.applications().insert_application(application).await?;
    }

    Ok(())
}
