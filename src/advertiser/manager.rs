use chrono::Utc;

use crate::database::Database;
use crate::error::Error;
use crate::user::UserId;
use crate::validation::{
    format_business_number, format_phone_number, is_valid_business_number, is_valid_phone_number,
};

use super::{AdvertiserProfile, AdvertiserProfileDraft, AdvertiserProfileId};

#[tracing::instrument(skip(db))]
pub async fn get_profile(db: &dyn Database, user_id: UserId) -> Result<AdvertiserProfile, Error> {
    let profile = db
        .advertisers()
        .fetch_profile_by_user(user_id)
        .await?
        .ok_or(Error::AdvertiserProfileNotFound { user_id })?;

    Ok(profile)
}

/// Creates the profile on first submission and replaces it afterwards.
/// Registration data passing the checksum gate is what verifies an
/// advertiser. Returns the profile and whether it was newly created.
#[tracing::instrument(skip(db))]
pub async fn upsert_profile(
    db: &dyn Database,
    user_id: UserId,
    draft: AdvertiserProfileDraft,
) -> Result<(AdvertiserProfile, bool), Error> {
    if !is_valid_business_number(&draft.business_number) {
        return Err(Error::InvalidBusinessNumber {
            business_number: draft.business_number,
        });
    }
    if !is_valid_phone_number(&draft.store_phone) {
        return Err(Error::InvalidPhoneNumber {
            phone: draft.store_phone,
        });
    }

    let business_number = format_business_number(&draft.business_number);
    let store_phone = format_phone_number(&draft.store_phone);

    let taken = db
        .advertisers()
        .fetch_profile_by_business_number(&business_number, Some(user_id))
        .await?;
    if taken.is_some() {
        return Err(Error::BusinessNumberTaken { business_number });
    }

    let now = Utc::now();
    match db.advertisers().fetch_profile_by_user(user_id).await? {
        None => {
            let profile = AdvertiserProfile {
                id: AdvertiserProfileId::new(),
                user_id,
                company_name: draft.company_name,
                address: draft.address,
                location: draft.location,
                store_phone,
                category: draft.category,
                business_number,
                representative_name: draft.representative_name,
                is_verified: true,
                created_at: now,
                modified_at: now,
            };

            db.advertisers().insert_profile(&profile).await?;

            Ok((profile, true))
        }
        Some(existing) => {
            let profile = AdvertiserProfile {
                id: existing.id,
                user_id: existing.user_id,
                company_name: draft.company_name,
                address: draft.address,
                location: draft.location,
                store_phone,
                category: draft.category,
                business_number,
                representative_name: draft.representative_name,
                is_verified: true,
                created_at: existing.created_at,
                modified_at: now,
            };

            db.advertisers().replace_profile(&profile).await?;

            Ok((profile, false))
        }
    }
}

#[tracing::instrument(skip(db))]
pub async fn check_business_number(
    db: &dyn Database,
    business_number: &str,
    exclude_user: Option<UserId>,
) -> Result<bool, Error> {
    if !is_valid_business_number(business_number) {
        return Err(Error::InvalidBusinessNumber {
            business_number: business_number.to_string(),
        });
    }

    let existing = db
        .advertisers()
        .fetch_profile_by_business_number(&format_business_number(business_number), exclude_user)
        .await?;

    Ok(existing.is_some())
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::database::test::MockDatabase;

    fn sample_draft() -> AdvertiserProfileDraft {
        AdvertiserProfileDraft {
            company_name: "Han River Bites".to_string(),
            address: "12 Mapo-daero, Seoul".to_string(),
            location: "Seoul Mapo-gu".to_string(),
            store_phone: "01012345678".to_string(),
            category: "food".to_string(),
            business_number: "123-45-67891".to_string(),
            representative_name: "Kim Jiwoo".to_string(),
        }
    }

    #[tokio::test]
    async fn bad_checksum_fails_before_any_lookup() {
        // no store hooks are stubbed: any db call would panic
        let db = MockDatabase::new();
        let mut draft = sample_draft();
        draft.business_number = "123-45-67890".to_string();

        let result = upsert_profile(&db, UserId::new(), draft).await;

        assert_eq!(
            result.unwrap_err(),
            Error::InvalidBusinessNumber {
                business_number: "123-45-67890".to_string()
            }
        );
    }

    #[tokio::test]
    async fn bad_phone_number_is_rejected() {
        let db = MockDatabase::new();
        let mut draft = sample_draft();
        draft.store_phone = "02-312-4455".to_string();

        let result = upsert_profile(&db, UserId::new(), draft).await;

        assert_eq!(
            result.unwrap_err(),
            Error::InvalidPhoneNumber {
                phone: "02-312-4455".to_string()
            }
        );
    }

    #[tokio::test]
    async fn first_submission_creates_a_verified_profile() {
        let mut db = MockDatabase::new();
        let user_id = UserId::new();

        db.advertisers.on_fetch_profile_by_business_number = Box::new(move |number, exclude| {
            assert_eq!(number, "123-45-67891");
            assert_eq!(exclude, Some(user_id));
            Ok(None)
        });
        db.advertisers.on_fetch_profile_by_user = Box::new(|_| Ok(None));

        let inserted = Arc::new(Mutex::new(false));
        let inserted_clone = Arc::clone(&inserted);
        db.advertisers.on_insert_profile = Box::new(move |profile| {
            *inserted_clone.lock().unwrap() = true;
            assert!(profile.is_verified);
            assert_eq!(profile.business_number, "123-45-67891");
            assert_eq!(profile.store_phone, "010-1234-5678");
            Ok(())
        });

        let (profile, created) = upsert_profile(&db, user_id, sample_draft()).await.unwrap();

        assert!(created);
        assert!(profile.is_verified);
        assert!(*inserted.lock().unwrap(), "db.insert_profile was not called");
    }

    #[tokio::test]
    async fn resubmission_replaces_the_existing_profile() {
        let mut db = MockDatabase::new();
        let user_id = UserId::new();

        let now = Utc::now();
        let existing = AdvertiserProfile {
            id: AdvertiserProfileId::new(),
            user_id,
            company_name: "Old Name".to_string(),
            address: "Old address".to_string(),
            location: "Seoul Jongno-gu".to_string(),
            store_phone: "010-9999-9999".to_string(),
            category: "cafe".to_string(),
            business_number: "220-81-62517".to_string(),
            representative_name: "Old Rep".to_string(),
            is_verified: true,
            created_at: now,
            modified_at: now,
        };
        let existing_id = existing.id;

        db.advertisers.on_fetch_profile_by_business_number = Box::new(|_, _| Ok(None));
        db.advertisers.on_fetch_profile_by_user = Box::new(move |_| Ok(Some(existing.clone())));

        let replaced = Arc::new(Mutex::new(false));
        let replaced_clone = Arc::clone(&replaced);
        db.advertisers.on_replace_profile = Box::new(move |profile| {
            *replaced_clone.lock().unwrap() = true;
            assert_eq!(profile.id, existing_id);
            assert_eq!(profile.company_name, "Han River Bites");
            Ok(())
        });

        let (profile, created) = upsert_profile(&db, user_id, sample_draft()).await.unwrap();

        assert!(!created);
        assert_eq!(profile.id, existing_id);
        assert!(*replaced.lock().unwrap(), "db.replace_profile was not called");
    }

    #[tokio::test]
    async fn business_number_in_use_by_someone_else_conflicts() {
        let mut db = MockDatabase::new();
        let user_id = UserId::new();

        let now = Utc::now();
        let other = AdvertiserProfile {
            id: AdvertiserProfileId::new(),
            user_id: UserId::new(),
            company_name: "Other Store".to_string(),
            address: "Elsewhere".to_string(),
            location: "Busan Haeundae-gu".to_string(),
            store_phone: "010-2222-3333".to_string(),
            category: "food".to_string(),
            business_number: "123-45-67891".to_string(),
            representative_name: "Park".to_string(),
            is_verified: true,
            created_at: now,
            modified_at: now,
        };

        db.advertisers.on_fetch_profile_by_business_number =
            Box::new(move |_, _| Ok(Some(other.clone())));

        let result = upsert_profile(&db, user_id, sample_draft()).await;

        assert_eq!(
            result.unwrap_err(),
            Error::BusinessNumberTaken {
                business_number: "123-45-67891".to_string()
            }
        );
    }

    #[tokio::test]
    async fn duplicate_probe_reports_presence() {
        let mut db = MockDatabase::new();

        db.advertisers.on_fetch_profile_by_business_number = Box::new(|number, exclude| {
            assert_eq!(number, "123-45-67891");
            assert_eq!(exclude, None);
            Ok(None)
        });

        let is_duplicate = check_business_number(&db, "1234567891", None).await.unwrap();

        assert!(!is_duplicate);
    }

    #[tokio::test]
    async fn duplicate_probe_rejects_malformed_numbers() {
        let db = MockDatabase::new();

        let result = check_business_number(&db, "not-a-number", None).await;

        assert!(matches!(result, Err(Error::InvalidBusinessNumber { .. })));
    }
}
