use actix_web::web::{Data, Json, Path, Query};
use actix_web::{get, post, HttpResponse};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::auth::Identity;
use crate::database::Database;
use crate::error::Error;
use crate::user::UserId;

use super::{manager, AdvertiserProfile, AdvertiserProfileDraft, AdvertiserProfileId};

#[derive(Clone, Debug, Deserialize)]
pub struct CreateAdvertiserProfileBody {
    pub company_name: String,
    pub address: String,
    pub location: String,
    pub store_phone: String,
    pub category: String,
    pub business_number: String,
    pub representative_name: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AdvertiserProfileBody {
    pub id: AdvertiserProfileId,
    pub user_id: UserId,
    pub company_name: String,
    pub address: String,
    pub location: String,
    pub store_phone: String,
    pub category: String,
    pub business_number: String,
    pub representative_name: String,
    pub is_verified: bool,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
}

impl AdvertiserProfileBody {
    pub fn render(profile: AdvertiserProfile) -> AdvertiserProfileBody {
        AdvertiserProfileBody {
            id: profile.id,
            user_id: profile.user_id,
            company_name: profile.company_name,
            address: profile.address,
            location: profile.location,
            store_phone: profile.store_phone,
            category: profile.category,
            business_number: profile.business_number,
            representative_name: profile.representative_name,
            is_verified: profile.is_verified,
            created_at: profile.created_at,
            modified_at: profile.modified_at,
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct DuplicateQuery {
    pub exclude_user_id: Option<UserId>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BusinessNumberDuplicateBody {
    pub is_duplicate: bool,
}

#[get("/advertiser/profile")]
#[tracing::instrument(skip(db))]
async fn get_advertiser_profile(
    db: Data<Box<dyn Database>>,
    identity: Identity,
) -> Result<Json<AdvertiserProfileBody>, Error> {
    let profile = manager::get_profile(&***db, identity.0).await?;

    Ok(Json(AdvertiserProfileBody::render(profile)))
}

#[post("/advertiser/profile")]
#[tracing::instrument(skip(db))]
async fn upsert_advertiser_profile(
    db: Data<Box<dyn Database>>,
    identity: Identity,
    body: Json<CreateAdvertiserProfileBody>,
) -> Result<HttpResponse, Error> {
    let body = body.into_inner();
    let draft = AdvertiserProfileDraft {
        company_name: body.company_name,
        address: body.address,
        location: body.location,
        store_phone: body.store_phone,
        category: body.category,
        business_number: body.business_number,
        representative_name: body.representative_name,
    };

    let (profile, created) = manager::upsert_profile(&***db, identity.0, draft).await?;
    let body = AdvertiserProfileBody::render(profile);

    if created {
        Ok(HttpResponse::Created().json(body))
    } else {
        Ok(HttpResponse::Ok().json(body))
    }
}

#[get("/advertiser/business-number/{business_number}/duplicate")]
#[tracing::instrument(skip(db))]
async fn check_business_number_duplicate(
    db: Data<Box<dyn Database>>,
    params: Path<String>,
    query: Query<DuplicateQuery>,
) -> Result<Json<BusinessNumberDuplicateBody>, Error> {
    let business_number = params.into_inner();

    let is_duplicate =
        manager::check_business_number(&***db, &business_number, query.exclude_user_id).await?;

    Ok(Json(BusinessNumberDuplicateBody { is_duplicate }))
}
