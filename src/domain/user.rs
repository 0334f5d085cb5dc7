use serde::Serialize;

/// Account on the streaming service.
///
/// Two users are the same user when their ids match, whatever the
/// display name or profile link say.
#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub link: String,
}

impl PartialEq for User {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for User {}
