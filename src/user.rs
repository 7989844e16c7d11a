use crate::typedid::{TypedId, TypedIdMarker};

pub type UserId = TypedId<User>;

/// Account identity owned by the hosted identity provider. The server never
/// stores users itself; profiles reference them by id.
#[derive(Clone, Debug)]
pub struct User;

impl TypedIdMarker for User {
    fn tag() -> &'static str {
        "USR"
    }
}
