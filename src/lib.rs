use actix_web::web::ServiceConfig;

pub mod advertiser;
pub mod application;
pub mod auth;
pub mod campaign;
pub mod database;
pub mod error;
pub mod influencer;
pub mod pagination;
pub mod seed;
pub mod typedid;
pub mod user;
pub mod utils;
pub mod validation;

/// Registers every route on the given service config. Building the app per
/// instance (rather than caching one globally) keeps tests hermetic.
pub fn routes(cfg: &mut ServiceConfig) {
    cfg.service(campaign::endpoints::get_campaigns)
        .service(campaign::endpoints::get_campaign_by_id)
        .service(campaign::endpoints::create_campaign)
        .service(campaign::endpoints::get_advertiser_campaigns)
        .service(campaign::endpoints::get_advertiser_campaign_by_id)
        .service(campaign::endpoints::close_campaign)
        .service(campaign::endpoints::select_applicants)
        .service(application::endpoints::apply_to_campaign)
        .service(application::endpoints::get_my_applications)
        .service(advertiser::endpoints::get_advertiser_profile)
        .service(advertiser::endpoints::upsert_advertiser_profile)
        .service(advertiser::endpoints::check_business_number_duplicate)
        .service(influencer::endpoints::get_influencer_profile)
        .service(influencer::endpoints::upsert_influencer_profile)
        .service(influencer::endpoints::add_channel)
        .service(influencer::endpoints::check_channel_duplicate)
        .service(influencer::endpoints::delete_channel);
}
