use actix_web::dev::Payload;
use actix_web::{FromRequest, HttpRequest};
use futures::future::{ready, Ready};

use crate::error::Error;
use crate::user::UserId;

const USER_ID_HEADER: &str = "X-User-Id";

/// Authenticated caller. The fronting identity layer validates the session
/// and injects the account id as a header; this extractor only parses it.
#[derive(Copy, Clone, Debug)]
pub struct Identity(pub UserId);

fn identity_from_request(req: &HttpRequest) -> Result<Identity, Error> {
    let header = req
        .headers()
        .get(USER_ID_HEADER)
        .ok_or(Error::Unauthenticated)?;
    let value = header.to_str().map_err(|_| Error::Unauthenticated)?;
    let user_id = value.parse().map_err(|_| Error::Unauthenticated)?;

    Ok(Identity(user_id))
}

impl FromRequest for Identity {
    type Error = Error;
    type Future = Ready<Result<Identity, Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(identity_from_request(req))
    }
}
