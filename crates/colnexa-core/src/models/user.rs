use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::utils::contains_ignore_case;

/// A backend user, as cached after login and as listed by the users endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct AuthUser {
    pub id: i64,
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default, deserialize_with = "role_name")]
    pub role: Option<String>,
    #[serde(default, deserialize_with = "null_as_false")]
    pub blocked: bool,
    #[serde(rename = "createdAt", alias = "created_at", default)]
    #[cfg_attr(feature = "ts", ts(type = "string | null"))]
    pub created_at: Option<DateTime<Utc>>,
}

impl AuthUser {
    pub fn display_name(&self) -> &str {
        &self.username
    }

    pub fn status_label(&self) -> &'static str {
        if self.blocked {
            "Blocked"
        } else {
            "Active"
        }
    }

    fn matches_search(&self, query: &str) -> bool {
        contains_ignore_case(&self.username, query) || contains_ignore_case(&self.email, query)
    }
}

/// Successful login payload: the bearer token and the user it belongs to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    pub jwt: String,
    pub user: AuthUser,
}

/// `blocked` comes back as `null` for users an admin never touched.
fn null_as_false<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<bool>::deserialize(deserializer)?.unwrap_or(false))
}

/// Accept the role either as a plain name or as a populated relation object.
fn role_name<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RoleField {
        Name(String),
        Relation { name: Option<String> },
        Other(serde_json::Value),
    }

    Ok(match Option::<RoleField>::deserialize(deserializer)? {
        Some(RoleField::Name(name)) => Some(name),
        Some(RoleField::Relation { name }) => name,
        Some(RoleField::Other(_)) | None => None,
    })
}

/// Status filter for the users listing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UserStatusFilter {
    #[default]
    All,
    Active,
    Blocked,
}

impl UserStatusFilter {
    pub fn accepts(&self, user: &AuthUser) -> bool {
        match self {
            UserStatusFilter::All => true,
            UserStatusFilter::Active => !user.blocked,
            UserStatusFilter::Blocked => user.blocked,
        }
    }
}

impl FromStr for UserStatusFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "all" => Ok(UserStatusFilter::All),
            "active" => Ok(UserStatusFilter::Active),
            "blocked" => Ok(UserStatusFilter::Blocked),
            other => Err(format!(
                "unknown status filter '{}' (expected all, active or blocked)",
                other
            )),
        }
    }
}

impl fmt::Display for UserStatusFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            UserStatusFilter::All => "all",
            UserStatusFilter::Active => "active",
            UserStatusFilter::Blocked => "blocked",
        };
        f.write_str(name)
    }
}

/// Users whose username or email contains `query` (case-insensitive) and
/// whose status passes `status`. An empty query matches everyone.
pub fn filter_users<'a>(
    users: &'a [AuthUser],
    query: &str,
    status: UserStatusFilter,
) -> Vec<&'a AuthUser> {
    users
        .iter()
        .filter(|u| u.matches_search(query) && status.accepts(u))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(id: i64, username: &str, email: &str, blocked: bool) -> AuthUser {
        AuthUser {
            id,
            username: username.to_string(),
            email: email.to_string(),
            role: None,
            blocked,
            created_at: None,
        }
    }

    #[test]
    fn test_parse_login_user() {
        let json = r#"{"id":7,"username":"admin","email":"admin@colnexa.com.co","provider":"local","confirmed":true,"blocked":null,"role":{"id":1,"name":"Authenticated","type":"authenticated"},"created_at":"2024-03-01T12:30:00.000Z"}"#;
        let u: AuthUser = serde_json::from_str(json).expect("Failed to parse user JSON");
        assert_eq!(u.id, 7);
        assert_eq!(u.display_name(), "admin");
        assert!(!u.blocked);
        assert_eq!(u.role.as_deref(), Some("Authenticated"));
        assert_eq!(
            u.created_at.map(|d| d.to_rfc3339()),
            Some("2024-03-01T12:30:00+00:00".to_string())
        );
    }

    #[test]
    fn test_parse_user_camel_case_and_string_role() {
        let json = r#"{"id":2,"username":"ana","email":"ana@x.co","blocked":true,"role":"editor","createdAt":"2025-01-05T00:00:00Z"}"#;
        let u: AuthUser = serde_json::from_str(json).expect("Failed to parse user JSON");
        assert!(u.blocked);
        assert_eq!(u.status_label(), "Blocked");
        assert_eq!(u.role.as_deref(), Some("editor"));
        assert!(u.created_at.is_some());
    }

    #[test]
    fn test_cached_profile_roundtrips_through_storage_format() {
        let cached = user(3, "luis", "luis@x.co", false);
        let stored = serde_json::to_string(&cached).unwrap();
        let restored: AuthUser = serde_json::from_str(&stored).unwrap();
        assert_eq!(cached, restored);
    }

    #[test]
    fn test_filter_users_by_search_and_status() {
        let users = vec![
            user(1, "Maria", "maria@colnexa.co", false),
            user(2, "pedro", "PEDRO@example.com", true),
            user(3, "juan", "juan@colnexa.co", false),
        ];

        let all = filter_users(&users, "", UserStatusFilter::All);
        assert_eq!(all.len(), 3);

        let colnexa = filter_users(&users, "COLNEXA", UserStatusFilter::All);
        assert_eq!(colnexa.iter().map(|u| u.id).collect::<Vec<_>>(), vec![1, 3]);

        let by_email = filter_users(&users, "pedro@", UserStatusFilter::All);
        assert_eq!(by_email.len(), 1);

        let blocked = filter_users(&users, "", UserStatusFilter::Blocked);
        assert_eq!(blocked.iter().map(|u| u.id).collect::<Vec<_>>(), vec![2]);

        let active_maria = filter_users(&users, "mar", UserStatusFilter::Active);
        assert_eq!(active_maria.len(), 1);
        assert!(filter_users(&users, "pedro", UserStatusFilter::Active).is_empty());
    }

    #[test]
    fn test_status_filter_from_str() {
        assert_eq!("all".parse::<UserStatusFilter>(), Ok(UserStatusFilter::All));
        assert_eq!("Active".parse::<UserStatusFilter>(), Ok(UserStatusFilter::Active));
        assert_eq!("BLOCKED".parse::<UserStatusFilter>(), Ok(UserStatusFilter::Blocked));
        assert!("banned".parse::<UserStatusFilter>().is_err());
        assert_eq!(UserStatusFilter::Blocked.to_string(), "blocked");
    }
}
