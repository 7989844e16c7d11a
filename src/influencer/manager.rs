use chrono::Utc;

use crate::database::Database;
use crate::error::Error;
use crate::user::UserId;
use crate::validation::{extract_channel_name, is_valid_channel_url, normalize_channel_url};

use super::{
    Channel, ChannelDraft, ChannelId, ChannelVerificationStatus, InfluencerProfile,
    InfluencerProfileId, MAX_CHANNELS,
};

#[tracing::instrument(skip(db))]
pub async fn get_profile(
    db: &dyn Database,
    user_id: UserId,
) -> Result<(InfluencerProfile, Vec<Channel>), Error> {
    let profile = db
        .influencers()
        .fetch_profile_by_user(user_id)
        .await?
        .ok_or(Error::InfluencerProfileNotFound { user_id })?;

    let channels = db.channels().fetch_channels_by_influencer(profile.id).await?;

    Ok((profile, channels))
}

fn build_channel(
    influencer_id: InfluencerProfileId,
    draft: ChannelDraft,
) -> Result<Channel, Error> {
    if !is_valid_channel_url(draft.platform, &draft.channel_url) {
        return Err(Error::InvalidChannelUrl {
            platform: draft.platform,
            url: draft.channel_url,
        });
    }

    let channel_url = normalize_channel_url(&draft.channel_url);
    let platform = draft.platform;
    let channel_name = draft
        .channel_name
        .or_else(|| extract_channel_name(platform, &channel_url))
        .unwrap_or_else(|| channel_url.clone());

    let now = Utc::now();
    Ok(Channel {
        id: ChannelId::new(),
        influencer_id,
        platform: draft.platform,
        channel_name,
        channel_url,
        follower_count: draft.follower_count.unwrap_or(0),
        verification_status: ChannelVerificationStatus::Pending,
        created_at: now,
        modified_at: now,
    })
}

/// The flip to verified is deliberately non-fatal: channel registration has
/// already landed, so a failure here only logs.
async fn ensure_verified(db: &dyn Database, profile: &mut InfluencerProfile) {
    if profile.is_verified {
        return;
    }

    match db
        .influencers()
        .update_profile_verified(profile.id, true)
        .await
    {
        Ok(()) => profile.is_verified = true,
        Err(error) => {
            tracing::warn!(
                influencer_id = %profile.id,
                %error,
                "failed to mark influencer profile verified"
            );
        }
    }
}

/// Creates the profile on first submission and replaces the whole channel
/// set. Registering at least one channel verifies the influencer.
#[tracing::instrument(skip(db))]
pub async fn upsert_profile(
    db: &dyn Database,
    user_id: UserId,
    drafts: Vec<ChannelDraft>,
) -> Result<(InfluencerProfile, Vec<Channel>), Error> {
    if drafts.len() as u64 > MAX_CHANNELS {
        return Err(Error::TooManyChannels {
            count: drafts.len() as u64,
        });
    }

    // validate the whole submission before touching storage
    let mut seen_urls: Vec<String> = Vec::with_capacity(drafts.len());
    for draft in &drafts {
        if !is_valid_channel_url(draft.platform, &draft.channel_url) {
            return Err(Error::InvalidChannelUrl {
                platform: draft.platform,
                url: draft.channel_url.clone(),
            });
        }
        let normalized = normalize_channel_url(&draft.channel_url);
        if seen_urls.contains(&normalized) {
            return Err(Error::ChannelUrlTaken {
                channel_url: normalized,
            });
        }
        seen_urls.push(normalized);
    }

    let mut profile = match db.influencers().fetch_profile_by_user(user_id).await? {
        Some(profile) => profile,
        None => {
            let now = Utc::now();
            let profile = InfluencerProfile {
                id: InfluencerProfileId::new(),
                user_id,
                is_verified: false,
                created_at: now,
                modified_at: now,
            };
            db.influencers().insert_profile(&profile).await?;
            profile
        }
    };

    let channels: Vec<Channel> = drafts
        .into_iter()
        .map(|draft| build_channel(profile.id, draft))
        .collect::<Result<_, _>>()?;

    db.channels()
        .delete_channels_by_influencer(profile.id)
        .await?;
    db.channels().insert_channels(&channels).await?;

    if !channels.is_empty() {
        ensure_verified(db, &mut profile).await;
    }

    Ok((profile, channels))
}

#[tracing::instrument(skip(db))]
pub async fn add_channel(
    db: &dyn Database,
    user_id: UserId,
    draft: ChannelDraft,
) -> Result<Channel, Error> {
    let mut profile = db
        .influencers()
        .fetch_profile_by_user(user_id)
        .await?
        .ok_or(Error::InfluencerProfileNotFound { user_id })?;

    let count = db
        .channels()
        .count_channels_by_influencer(profile.id)
        .await?;
    if count >= MAX_CHANNELS {
        return Err(Error::TooManyChannels { count });
    }

    let channel = build_channel(profile.id, draft)?;

    let existing = db
        .channels()
        .fetch_channel_by_influencer_and_url(profile.id, &channel.channel_url)
        .await?;
    if existing.is_some() {
        return Err(Error::ChannelUrlTaken {
            channel_url: channel.channel_url,
        });
    }

    db.channels().insert_channel(&channel).await?;

    ensure_verified(db, &mut profile).await;

    Ok(channel)
}

#[tracing::instrument(skip(db))]
pub async fn delete_channel(
    db: &dyn Database,
    user_id: UserId,
    channel_id: ChannelId,
) -> Result<(), Error> {
    let profile = db
        .influencers()
        .fetch_profile_by_user(user_id)
        .await?
        .ok_or(Error::InfluencerProfileNotFound { user_id })?;

    let deleted = db.channels().delete_channel(profile.id, channel_id).await?;
    if !deleted {
        return Err(Error::ChannelNotFound { channel_id });
    }

    Ok(())
}

#[tracing::instrument(skip(db))]
pub async fn check_channel_duplicate(
    db: &dyn Database,
    user_id: UserId,
    channel_url: &str,
) -> Result<bool, Error> {
    let profile = match db.influencers().fetch_profile_by_user(user_id).await? {
        Some(profile) => profile,
        None => return Ok(false),
    };

    let existing = db
        .channels()
        .fetch_channel_by_influencer_and_url(profile.id, &normalize_channel_url(channel_url))
        .await?;

    Ok(existing.is_some())
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::database::test::MockDatabase;
    use crate::influencer::ChannelPlatform;

    fn sample_profile(user_id: UserId, is_verified: bool) -> InfluencerProfile {
        let now = Utc::now();
        InfluencerProfile {
            id: InfluencerProfileId::new(),
            user_id,
            is_verified,
            created_at: now,
            modified_at: now,
        }
    }

    fn naver_draft(url: &str) -> ChannelDraft {
        ChannelDraft {
            platform: ChannelPlatform::Naver,
            channel_name: None,
            channel_url: url.to_string(),
            follower_count: Some(1200),
        }
    }

    #[tokio::test]
    async fn first_channel_submission_creates_and_verifies_the_profile() {
        let mut db = MockDatabase::new();
        let user_id = UserId::new();

        db.influencers.on_fetch_profile_by_user = Box::new(|_| Ok(None));

        let inserted_profile = Arc::new(Mutex::new(false));
        let inserted_profile_clone = Arc::clone(&inserted_profile);
        db.influencers.on_insert_profile = Box::new(move |profile| {
            *inserted_profile_clone.lock().unwrap() = true;
            assert!(!profile.is_verified);
            Ok(())
        });
        db.channels.on_delete_channels_by_influencer = Box::new(|_| Ok(()));

        let inserted_channels = Arc::new(Mutex::new(false));
        let inserted_channels_clone = Arc::clone(&inserted_channels);
        db.channels.on_insert_channels = Box::new(move |channels| {
            *inserted_channels_clone.lock().unwrap() = true;
            assert_eq!(channels.len(), 1);
            assert_eq!(channels[0].channel_url, "https://blog.naver.com/tastyfood");
            assert_eq!(channels[0].channel_name, "tastyfood");
            assert_eq!(
                channels[0].verification_status,
                ChannelVerificationStatus::Pending
            );
            Ok(())
        });
        db.influencers.on_update_profile_verified = Box::new(|_, is_verified| {
            assert!(is_verified);
            Ok(())
        });

        let (profile, channels) = upsert_profile(
            &db,
            user_id,
            vec![naver_draft("https://Blog.Naver.com/TastyFood/")],
        )
        .await
        .unwrap();

        assert!(profile.is_verified);
        assert_eq!(channels.len(), 1);
        assert!(*inserted_profile.lock().unwrap());
        assert!(*inserted_channels.lock().unwrap());
    }

    #[tokio::test]
    async fn verification_flip_failure_is_not_fatal() {
        let mut db = MockDatabase::new();
        let user_id = UserId::new();
        let profile = sample_profile(user_id, false);

        db.influencers.on_fetch_profile_by_user = Box::new(move |_| Ok(Some(profile.clone())));
        db.channels.on_delete_channels_by_influencer = Box::new(|_| Ok(()));
        db.channels.on_insert_channels = Box::new(|_| Ok(()));
        db.influencers.on_update_profile_verified =
            Box::new(|_, _| Err(Error::ConcurrentModificationDetected));

        let (profile, channels) = upsert_profile(
            &db,
            user_id,
            vec![naver_draft("https://blog.naver.com/tastyfood")],
        )
        .await
        .unwrap();

        assert!(!profile.is_verified, "flip failure must not surface");
        assert_eq!(channels.len(), 1);
    }

    #[tokio::test]
    async fn invalid_urls_fail_before_any_store_call() {
        // no store hooks are stubbed: any db call would panic
        let db = MockDatabase::new();

        let result = upsert_profile(
            &db,
            UserId::new(),
            vec![naver_draft("https://example.com/not-a-blog")],
        )
        .await;

        assert_eq!(
            result.unwrap_err(),
            Error::InvalidChannelUrl {
                platform: ChannelPlatform::Naver,
                url: "https://example.com/not-a-blog".to_string(),
            }
        );
    }

    #[tokio::test]
    async fn cosmetic_url_variants_collide_within_one_submission() {
        let db = MockDatabase::new();

        let result = upsert_profile(
            &db,
            UserId::new(),
            vec![
                naver_draft("https://blog.naver.com/tastyfood"),
                naver_draft("HTTP://BLOG.NAVER.COM/tastyfood/"),
            ],
        )
        .await;

        assert_eq!(
            result.unwrap_err(),
            Error::ChannelUrlTaken {
                channel_url: "https://blog.naver.com/tastyfood".to_string()
            }
        );
    }

    #[tokio::test]
    async fn add_channel_enforces_the_channel_cap() {
        let mut db = MockDatabase::new();
        let user_id = UserId::new();
        let profile = sample_profile(user_id, true);

        db.influencers.on_fetch_profile_by_user = Box::new(move |_| Ok(Some(profile.clone())));
        db.channels.on_count_channels_by_influencer = Box::new(|_| Ok(MAX_CHANNELS));

        let result = add_channel(&db, user_id, naver_draft("https://blog.naver.com/more")).await;

        assert_eq!(
            result.unwrap_err(),
            Error::TooManyChannels {
                count: MAX_CHANNELS
            }
        );
    }

    #[tokio::test]
    async fn add_channel_rejects_an_already_registered_url() {
        let mut db = MockDatabase::new();
        let user_id = UserId::new();
        let profile = sample_profile(user_id, true);
        let profile_id = profile.id;

        db.influencers.on_fetch_profile_by_user = Box::new(move |_| Ok(Some(profile.clone())));
        db.channels.on_count_channels_by_influencer = Box::new(|_| Ok(2));
        db.channels.on_fetch_channel_by_influencer_and_url = Box::new(move |id, url| {
            assert_eq!(id, profile_id);
            assert_eq!(url, "https://blog.naver.com/tastyfood");
            let now = Utc::now();
            Ok(Some(Channel {
                id: ChannelId::new(),
                influencer_id: id,
                platform: ChannelPlatform::Naver,
                channel_name: "tastyfood".to_string(),
                channel_url: url.to_string(),
                follower_count: 100,
                verification_status: ChannelVerificationStatus::Verified,
                created_at: now,
                modified_at: now,
            }))
        });

        let result =
            add_channel(&db, user_id, naver_draft("https://blog.naver.com/TastyFood")).await;

        assert_eq!(
            result.unwrap_err(),
            Error::ChannelUrlTaken {
                channel_url: "https://blog.naver.com/tastyfood".to_string()
            }
        );
    }

    #[tokio::test]
    async fn delete_channel_requires_ownership() {
        let mut db = MockDatabase::new();
        let user_id = UserId::new();
        let profile = sample_profile(user_id, true);
        let channel_id = ChannelId::new();

        db.influencers.on_fetch_profile_by_user = Box::new(move |_| Ok(Some(profile.clone())));
        db.channels.on_delete_channel = Box::new(|_, _| Ok(false));

        let result = delete_channel(&db, user_id, channel_id).await;

        assert_eq!(result.unwrap_err(), Error::ChannelNotFound { channel_id });
    }

    #[tokio::test]
    async fn duplicate_probe_without_a_profile_reports_no_duplicate() {
        let mut db = MockDatabase::new();

        db.influencers.on_fetch_profile_by_user = Box::new(|_| Ok(None));

        let is_duplicate =
            check_channel_duplicate(&db, UserId::new(), "https://blog.naver.com/tastyfood")
                .await
                .unwrap();

        assert!(!is_duplicate);
    }
}
