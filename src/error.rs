use std::fmt::{Debug, Display};
use std::io::Error as IoError;

use actix_web::error::{JsonPayloadError, PathError, QueryPayloadError};
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use derivative::Derivative;
use mongodb::bson::ser::Error as BsonError;
use mongodb::error::Error as DatabaseError;
use serde::{Serialize, Serializer};

use crate::advertiser::AdvertiserProfileId;
use crate::application::ApplicationId;
use crate::campaign::CampaignId;
use crate::influencer::{ChannelId, ChannelPlatform, InfluencerProfileId};
use crate::user::UserId;

#[derive(Debug, Serialize, Derivative)]
#[derivative(PartialEq, Eq)]
#[serde(untagged)]
pub enum Error {
    // 400
    #[serde(serialize_with = "display")]
    InvalidJson(#[derivative(PartialEq = "ignore")] JsonPayloadError),
    #[serde(serialize_with = "display")]
    InvalidPath(#[derivative(PartialEq = "ignore")] PathError),
    #[serde(serialize_with = "display")]
    InvalidQuery(#[derivative(PartialEq = "ignore")] QueryPayloadError),
    InvalidDateRange {
        recruitment_start: chrono::NaiveDate,
        recruitment_end: chrono::NaiveDate,
    },
    InvalidVisitDate {
        visit_date: chrono::NaiveDate,
    },
    InvalidMessageLength {
        length: usize,
    },
    InvalidBusinessNumber {
        business_number: String,
    },
    InvalidPhoneNumber {
        phone: String,
    },
    InvalidChannelUrl {
        platform: ChannelPlatform,
        url: String,
    },
    TooManyChannels {
        count: u64,
    },

    // 401
    Unauthenticated,

    // 403
    CampaignAccessDenied {
        campaign_id: CampaignId,
    },
    AdvertiserNotVerified {
        advertiser_id: AdvertiserProfileId,
    },
    InfluencerNotVerified {
        influencer_id: InfluencerProfileId,
    },

    // 404
    PathNotFound,
    CampaignNotFound {
        campaign_id: CampaignId,
    },
    AdvertiserProfileNotFound {
        user_id: UserId,
    },
    InfluencerProfileNotFound {
        user_id: UserId,
    },
    ChannelNotFound {
        channel_id: ChannelId,
    },

    // 409
    ConcurrentModificationDetected,
    AlreadyApplied {
        campaign_id: CampaignId,
        influencer_id: InfluencerProfileId,
    },
    RecruitmentClosed {
        campaign_id: CampaignId,
    },
    CampaignAlreadyClosed {
        campaign_id: CampaignId,
    },
    CampaignAlreadySelected {
        campaign_id: CampaignId,
    },
    CampaignNotClosedYet {
        campaign_id: CampaignId,
    },
    InvalidSelection {
        campaign_id: CampaignId,
        application_ids: Vec<ApplicationId>,
    },
    BusinessNumberTaken {
        business_number: String,
    },
    ChannelUrlTaken {
        channel_url: String,
    },

    // 500
    ExistentialState(String),
    #[serde(serialize_with = "display")]
    FailedDatabaseCall(#[derivative(PartialEq = "ignore")] DatabaseError),
    #[serde(serialize_with = "display")]
    FailedToSerializeToBson(#[derivative(PartialEq = "ignore")] BsonError),
    #[serde(serialize_with = "display")]
    IoError(#[derivative(PartialEq = "ignore")] IoError),
}

impl Error {
    pub fn error_code(&self) -> &'static str {
        match self {
            Error::InvalidJson(_) => "E4001000",
            Error::InvalidPath(_) => "E4001001",
            Error::InvalidQuery(_) => "E4001002",
            Error::InvalidDateRange { .. } => "E4001003",
            Error::InvalidVisitDate { .. } => "E4001004",
            Error::InvalidMessageLength { .. } => "E4001005",
            Error::InvalidBusinessNumber { .. } => "E4001006",
            Error::InvalidPhoneNumber { .. } => "E4001007",
            Error::InvalidChannelUrl { .. } => "E4001008",
            Error::TooManyChannels { .. } => "E4001009",
            Error::Unauthenticated => "E4011000",
            Error::CampaignAccessDenied { .. } => "E4031000",
            Error::AdvertiserNotVerified { .. } => "E4031001",
            Error::InfluencerNotVerified { .. } => "E4031002",
            Error::PathNotFound => "E4041000",
            Error::CampaignNotFound { .. } => "E4041001",
            Error::AdvertiserProfileNotFound { .. } => "E4041002",
            Error::InfluencerProfileNotFound { .. } => "E4041003",
            Error::ChannelNotFound { .. } => "E4041004",
            Error::ConcurrentModificationDetected => "E4091000",
            Error::AlreadyApplied { .. } => "E4091001",
            Error::RecruitmentClosed { .. } => "E4091002",
            Error::CampaignAlreadyClosed { .. } => "E4091003",
            Error::CampaignAlreadySelected { .. } => "E4091004",
            Error::CampaignNotClosedYet { .. } => "E4091005",
            Error::InvalidSelection { .. } => "E4091006",
            Error::BusinessNumberTaken { .. } => "E4091007",
            Error::ChannelUrlTaken { .. } => "E4091008",
            Error::ExistentialState(_) => "E5001000",
            Error::FailedDatabaseCall(_) => "E5001001",
            Error::FailedToSerializeToBson(_) => "E5001002",
            Error::IoError(_) => "E5001003",
        }
    }

    pub fn error_message(&self) -> &'static str {
        match self {
            Error::InvalidJson(_) => "The given json could not be parsed",
            Error::InvalidPath(_) => "The given path could not be parsed",
            Error::InvalidQuery(_) => "The given query could not be parsed",
            Error::InvalidDateRange { .. } => {
                "The recruitment window must start in the future and end after it starts"
            }
            Error::InvalidVisitDate { .. } => {
                "The visit date must be in the future and after the recruitment window ends"
            }
            Error::InvalidMessageLength { .. } => {
                "The application message must be between 10 and 500 characters"
            }
            Error::InvalidBusinessNumber { .. } => {
                "The given business registration number is not valid"
            }
            Error::InvalidPhoneNumber { .. } => "The given phone number is not valid",
            Error::InvalidChannelUrl { .. } => {
                "The given url is not a valid channel url for the platform"
            }
            Error::TooManyChannels { .. } => "No more channels can be registered",
            Error::Unauthenticated => "The request is missing valid credentials",
            Error::CampaignAccessDenied { .. } => {
                "The requested campaign belongs to a different advertiser"
            }
            Error::AdvertiserNotVerified { .. } => {
                "The advertiser profile has not been verified yet"
            }
            Error::InfluencerNotVerified { .. } => {
                "The influencer profile has not been verified yet"
            }
            Error::PathNotFound => "The requested path was not found",
            Error::CampaignNotFound { .. } => "The requested campaign was not found",
            Error::AdvertiserProfileNotFound { .. } => {
                "No advertiser profile exists for this user"
            }
            Error::InfluencerProfileNotFound { .. } => {
                "No influencer profile exists for this user"
            }
            Error::ChannelNotFound { .. } => "The requested channel was not found",
            Error::ConcurrentModificationDetected => {
                "The server detected a concurrent modification"
            }
            Error::AlreadyApplied { .. } => {
                "An application for this campaign already exists"
            }
            Error::RecruitmentClosed { .. } => {
                "The campaign is no longer accepting applications"
            }
            Error::CampaignAlreadyClosed { .. } => "The campaign is already closed",
            Error::CampaignAlreadySelected { .. } => {
                "Applicants for this campaign have already been selected"
            }
            Error::CampaignNotClosedYet { .. } => {
                "The campaign must be closed before applicants can be selected"
            }
            Error::InvalidSelection { .. } => {
                "The selection contains applications from a different campaign"
            }
            Error::BusinessNumberTaken { .. } => {
                "The business registration number is already in use"
            }
            Error::ChannelUrlTaken { .. } => "The channel url is already registered",
            Error::ExistentialState(_) => "The server detected an invalid state",
            Error::FailedDatabaseCall(_) => {
                "An error occurred when communicating with the database"
            }
            Error::FailedToSerializeToBson(_) => {
                "An error occurred when serializing an object to bson"
            }
            Error::IoError(_) => "An error occurred during an I/O operation",
        }
    }
}

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        match self {
            Error::InvalidJson(_) => StatusCode::BAD_REQUEST,
            Error::InvalidPath(_) => StatusCode::BAD_REQUEST,
            Error::InvalidQuery(_) => StatusCode::BAD_REQUEST,
            Error::InvalidDateRange { .. } => StatusCode::BAD_REQUEST,
            Error::InvalidVisitDate { .. } => StatusCode::BAD_REQUEST,
            Error::InvalidMessageLength { .. } => StatusCode::BAD_REQUEST,
            Error::InvalidBusinessNumber { .. } => StatusCode::BAD_REQUEST,
            Error::InvalidPhoneNumber { .. } => StatusCode::BAD_REQUEST,
            Error::InvalidChannelUrl { .. } => StatusCode::BAD_REQUEST,
            Error::TooManyChannels { .. } => StatusCode::BAD_REQUEST,
            Error::Unauthenticated => StatusCode::UNAUTHORIZED,
            Error::CampaignAccessDenied { .. } => StatusCode::FORBIDDEN,
            Error::AdvertiserNotVerified { .. } => StatusCode::FORBIDDEN,
            Error::InfluencerNotVerified { .. } => StatusCode::FORBIDDEN,
            Error::PathNotFound => StatusCode::NOT_FOUND,
            Error::CampaignNotFound { .. } => StatusCode::NOT_FOUND,
            Error::AdvertiserProfileNotFound { .. } => StatusCode::NOT_FOUND,
            Error::InfluencerProfileNotFound { .. } => StatusCode::NOT_FOUND,
            Error::ChannelNotFound { .. } => StatusCode::NOT_FOUND,
            Error::ConcurrentModificationDetected => StatusCode::CONFLICT,
            Error::AlreadyApplied { .. } => StatusCode::CONFLICT,
            Error::RecruitmentClosed { .. } => StatusCode::CONFLICT,
            Error::CampaignAlreadyClosed { .. } => StatusCode::CONFLICT,
            Error::CampaignAlreadySelected { .. } => StatusCode::CONFLICT,
            Error::CampaignNotClosedYet { .. } => StatusCode::CONFLICT,
            Error::InvalidSelection { .. } => StatusCode::CONFLICT,
            Error::BusinessNumberTaken { .. } => StatusCode::CONFLICT,
            Error::ChannelUrlTaken { .. } => StatusCode::CONFLICT,
            Error::ExistentialState(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Error::FailedDatabaseCall(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Error::FailedToSerializeToBson(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Error::IoError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        #[derive(Serialize)]
        struct Envelope<'a> {
            error_code: &'static str,
            error_message: &'static str,
            error_meta: &'a Error,
        }

        HttpResponse::build(self.status_code()).json(&Envelope {
            error_code: self.error_code(),
            error_message: self.error_message(),
            error_meta: self,
        })
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> Result<(), std::fmt::Error> {
        Debug::fmt(self, f)
    }
}

impl From<DatabaseError> for Error {
    fn from(error: DatabaseError) -> Error {
        Error::FailedDatabaseCall(error)
    }
}

impl From<BsonError> for Error {
    fn from(error: BsonError) -> Error {
        Error::FailedToSerializeToBson(error)
    }
}

impl From<IoError> for Error {
    fn from(error: IoError) -> Error {
        Error::IoError(error)
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::InvalidJson(err) => Some(err),
            Error::InvalidPath(err) => Some(err),
            Error::InvalidQuery(err) => Some(err),
            Error::FailedDatabaseCall(err) => Some(err),
            Error::FailedToSerializeToBson(err) => Some(err),
            Error::IoError(err) => Some(err),
            _ => None,
        }
    }
}

fn display<T, S>(value: &T, serializer: S) -> Result<S::Ok, S::Error>
where
    T: Display,
    S: Serializer,
{
    serializer.collect_str(value)
}
