use serde::{Deserialize, Serialize};
use std::time::SystemTime;

/// The four account roles of the platform. The wire strings match what
/// clients send in registration payloads and render on profile pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UserRole {
    Artist,
    ViewerStudent,
    Institution,
    ServiceProvider,
}

impl UserRole {
    pub fn as_str(self) -> &'static str {
        match self {
            UserRole::Artist => "Artist",
            UserRole::ViewerStudent => "Viewer/Student",
            UserRole::Institution => "Institution",
            UserRole::ServiceProvider => "Service Provider",
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "Artist" => Some(UserRole::Artist),
            "Viewer/Student" => Some(UserRole::ViewerStudent),
            "Institution" => Some(UserRole::Institution),
            "Service Provider" => Some(UserRole::ServiceProvider),
            _ => None,
        }
    }
}

impl Serialize for UserRole {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for UserRole {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        UserRole::from_str(&s)
            .ok_or_else(|| serde::de::Error::custom(format!("unknown role: {}", s)))
    }
}

/// Postal address of an institution or service provider. The street
/// address only applies to service providers.
/// District, state and country may be autofilled from the postal code.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub address: Option<String>,
    pub postal_code: String,
    pub district: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
}

/// Role-specific profile data, one variant per account role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoleProfile {
    Artist {
        art_form: String,
        specialisation: String,
    },
    ViewerStudent {
        art_form: String,
    },
    Institution {
        university_affiliation: String,
        registration_id: String,
        location: Location,
    },
    ServiceProvider {
        owner_name: String,
        expertise: Vec<String>,
        location: Location,
    },
}

impl RoleProfile {
    pub fn role(&self) -> UserRole {
        match self {
            RoleProfile::Artist { .. } => UserRole::Artist,
            RoleProfile::ViewerStudent { .. } => UserRole::ViewerStudent,
            RoleProfile::Institution { .. } => UserRole::Institution,
            RoleProfile::ServiceProvider { .. } => UserRole::ServiceProvider,
        }
    }

    pub fn location_mut(&mut self) -> Option<&mut Location> {
        match self {
            RoleProfile::Institution { location, .. }
            | RoleProfile::ServiceProvider { location, .. } => Some(location),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: usize,
    pub username: String,
    pub email: String,
    pub role: UserRole,
    pub profile_picture: Option<String>,
    pub description: Option<String>,
    pub created: SystemTime,
}

/// The fields needed to create a user row, before an id exists.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub role: UserRole,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_wire_string_roundtrip() {
        for role in [
            UserRole::Artist,
            UserRole::ViewerStudent,
            UserRole::Institution,
            UserRole::ServiceProvider,
        ] {
            assert_eq!(UserRole::from_str(role.as_str()), Some(role));
        }
    }

    #[test]
    fn role_from_str_rejects_unknown() {
        assert_eq!(UserRole::from_str(""), None);
        assert_eq!(UserRole::from_str("artist"), None);
        assert_eq!(UserRole::from_str("Admin"), None);
    }

    #[test]
    fn viewer_student_wire_string_has_slash() {
        assert_eq!(UserRole::ViewerStudent.as_str(), "Viewer/Student");
    }

    #[test]
    fn role_profile_reports_its_role() {
        let profile = RoleProfile::Artist {
            art_form: "Painting".to_string(),
            specialisation: "Oil".to_string(),
        };
        assert_eq!(profile.role(), UserRole::Artist);

        let profile = RoleProfile::ServiceProvider {
            owner_name: "Ravi Kumar".to_string(),
            expertise: vec!["Framing".to_string()],
            location: Location::default(),
        };
        assert_eq!(profile.role(), UserRole::ServiceProvider);
    }
}
