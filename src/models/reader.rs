//! Reader (patron/staff account) model and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::error::AppError;

/// Access rights levels per functional area
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Rights {
    None = 0,
    Read = 1,
    Write = 2,
}

/// Closed set of account roles
///
/// The legacy front-end compared free-form role strings (including the
/// Vietnamese display labels); all of those spellings are normalized into
/// this enum once, at the authentication boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Librarian,
    Accountant,
    Warehouse,
    Manager,
    Reader,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Librarian => "librarian",
            Role::Accountant => "accountant",
            Role::Warehouse => "warehouse",
            Role::Manager => "manager",
            Role::Reader => "reader",
        }
    }

    /// Staff accounts have role-based rights; readers only see their own data
    pub fn is_staff(&self) -> bool {
        !matches!(self, Role::Reader)
    }

    /// Rights granted to this role per functional area
    pub fn rights(&self) -> RoleRights {
        match self {
            Role::Admin => RoleRights {
                catalog: Rights::Write,
                readers: Rights::Write,
                circulation: Rights::Write,
                fines: Rights::Write,
                reservations: Rights::Write,
                settings: Rights::Write,
            },
            Role::Librarian => RoleRights {
                catalog: Rights::Write,
                readers: Rights::Write,
                circulation: Rights::Write,
                fines: Rights::Write,
                reservations: Rights::Write,
                settings: Rights::Read,
            },
            Role::Accountant => RoleRights {
                catalog: Rights::Read,
                readers: Rights::Read,
                circulation: Rights::Read,
                fines: Rights::Write,
                reservations: Rights::Read,
                settings: Rights::Read,
            },
            Role::Warehouse => RoleRights {
                catalog: Rights::Write,
                readers: Rights::None,
                circulation: Rights::Read,
                fines: Rights::None,
                reservations: Rights::Read,
                settings: Rights::None,
            },
            Role::Manager => RoleRights {
                catalog: Rights::Read,
                readers: Rights::Read,
                circulation: Rights::Read,
                fines: Rights::Read,
                reservations: Rights::Read,
                settings: Rights::Read,
            },
            Role::Reader => RoleRights {
                catalog: Rights::Read,
                readers: Rights::None,
                circulation: Rights::None,
                fines: Rights::None,
                reservations: Rights::None,
                settings: Rights::None,
            },
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Accepts both the canonical slugs and the legacy display labels
        match s.trim().to_lowercase().as_str() {
            "admin" | "administrator" | "quản trị viên" => Ok(Role::Admin),
            "librarian" | "thủ thư" => Ok(Role::Librarian),
            "accountant" | "kế toán" => Ok(Role::Accountant),
            "warehouse" | "thủ kho" => Ok(Role::Warehouse),
            "manager" | "quản lý" => Ok(Role::Manager),
            "reader" | "độc giả" => Ok(Role::Reader),
            _ => Err(format!("Invalid role: {}", s)),
        }
    }
}

/// Reader account status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ReaderStatus {
    Active,
    Blocked,
}

impl ReaderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReaderStatus::Active => "active",
            ReaderStatus::Blocked => "blocked",
        }
    }
}

impl std::str::FromStr for ReaderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "active" => Ok(ReaderStatus::Active),
            "blocked" => Ok(ReaderStatus::Blocked),
            _ => Err(format!("Invalid reader status: {}", s)),
        }
    }
}

/// Internal row structure for database queries (with String fields)
#[derive(Debug, Clone, FromRow)]
pub struct ReaderRow {
    id: i32,
    card_number: String,
    login: String,
    password: Option<String>,
    full_name: String,
    email: Option<String>,
    phone: Option<String>,
    address: Option<String>,
    role: String,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: Option<DateTime<Utc>>,
}

impl From<ReaderRow> for Reader {
    fn from(row: ReaderRow) -> Self {
        Reader {
            id: row.id,
            card_number: row.card_number,
            login: row.login,
            password: row.password,
            full_name: row.full_name,
            email: row.email,
            phone: row.phone,
            address: row.address,
            role: row.role.parse().unwrap_or(Role::Reader),
            status: row.status.parse().unwrap_or(ReaderStatus::Active),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Full reader model from database
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Reader {
    pub id: i32,
    /// Membership card number, unique
    pub card_number: String,
    pub login: String,
    /// Hashed password (argon2)
    #[serde(skip_serializing)]
    pub password: Option<String>,
    pub full_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub role: Role,
    pub status: ReaderStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Reader query parameters
#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct ReaderQuery {
    pub name: Option<String>,
    pub card_number: Option<String>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

/// Create reader request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateReader {
    /// Login (username) - required and unique, used for authentication
    #[validate(length(min = 3, message = "Login must be at least 3 characters"))]
    pub login: String,
    #[validate(length(min = 4, message = "Password must be at least 4 characters"))]
    pub password: Option<String>,
    #[validate(length(min = 1, message = "Full name is required"))]
    pub full_name: String,
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub role: Option<Role>,
}

/// Update reader request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateReader {
    pub login: Option<String>,
    pub password: Option<String>,
    pub full_name: Option<String>,
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub role: Option<Role>,
    pub status: Option<ReaderStatus>,
}

/// JWT Claims for authenticated accounts
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub reader_id: i32,
    pub role: Role,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    /// Create a new JWT token
    pub fn create_token(&self, secret: &str) -> Result<String, jsonwebtoken::errors::Error> {
        use jsonwebtoken::{encode, EncodingKey, Header};
        encode(
            &Header::default(),
            self,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
    }

    /// Parse JWT token
    pub fn from_token(token: &str, secret: &str) -> Result<Self, jsonwebtoken::errors::Error> {
        use jsonwebtoken::{decode, DecodingKey, Validation};
        let token_data = decode::<Self>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &Validation::default(),
        )?;
        Ok(token_data.claims)
    }

    fn rights(&self) -> RoleRights {
        self.role.rights()
    }

    // Authorization checks

    pub fn require_read_catalog(&self) -> Result<(), AppError> {
        if self.rights().catalog as u8 >= Rights::Read as u8 {
            Ok(())
        } else {
            Err(AppError::Authorization("Insufficient rights to read the catalog".to_string()))
        }
    }

    pub fn require_write_catalog(&self) -> Result<(), AppError> {
        if self.rights().catalog as u8 >= Rights::Write as u8 {
            Ok(())
        } else {
            Err(AppError::Authorization("Insufficient rights to modify the catalog".to_string()))
        }
    }

    pub fn require_read_readers(&self) -> Result<(), AppError> {
        if self.rights().readers as u8 >= Rights::Read as u8 {
            Ok(())
        } else {
            Err(AppError::Authorization("Insufficient rights to read reader accounts".to_string()))
        }
    }

    pub fn require_write_readers(&self) -> Result<(), AppError> {
        if self.rights().readers as u8 >= Rights::Write as u8 {
            Ok(())
        } else {
            Err(AppError::Authorization("Insufficient rights to modify reader accounts".to_string()))
        }
    }

    pub fn require_write_circulation(&self) -> Result<(), AppError> {
        if self.rights().circulation as u8 >= Rights::Write as u8 {
            Ok(())
        } else {
            Err(AppError::Authorization("Insufficient rights to manage loans".to_string()))
        }
    }

    pub fn require_write_fines(&self) -> Result<(), AppError> {
        if self.rights().fines as u8 >= Rights::Write as u8 {
            Ok(())
        } else {
            Err(AppError::Authorization("Insufficient rights to manage fines".to_string()))
        }
    }

    pub fn require_write_reservations(&self) -> Result<(), AppError> {
        if self.rights().reservations as u8 >= Rights::Write as u8 {
            Ok(())
        } else {
            Err(AppError::Authorization("Insufficient rights to manage reservations".to_string()))
        }
    }

    pub fn require_read_settings(&self) -> Result<(), AppError> {
        if self.rights().settings as u8 >= Rights::Read as u8 {
            Ok(())
        } else {
            Err(AppError::Authorization("Insufficient rights to read settings".to_string()))
        }
    }

    pub fn require_write_settings(&self) -> Result<(), AppError> {
        if self.rights().settings as u8 >= Rights::Write as u8 {
            Ok(())
        } else {
            Err(AppError::Authorization("Insufficient rights to write settings".to_string()))
        }
    }

    /// Staff with circulation read rights, or the reader looking at their own
    /// records
    pub fn require_read_circulation_for(&self, reader_id: i32) -> Result<(), AppError> {
        if self.rights().circulation as u8 >= Rights::Read as u8 || self.reader_id == reader_id {
            Ok(())
        } else {
            Err(AppError::Authorization("Insufficient rights to read these records".to_string()))
        }
    }

    /// Staff with fine read rights, or the reader looking at their own fines
    pub fn require_read_fines_for(&self, reader_id: i32) -> Result<(), AppError> {
        if self.rights().fines as u8 >= Rights::Read as u8 || self.reader_id == reader_id {
            Ok(())
        } else {
            Err(AppError::Authorization("Insufficient rights to read these fines".to_string()))
        }
    }

    /// Staff with reservation read rights, or the reader looking at their
    /// own reservations
    pub fn require_read_reservations_for(&self, reader_id: i32) -> Result<(), AppError> {
        if self.rights().reservations as u8 >= Rights::Read as u8 || self.reader_id == reader_id {
            Ok(())
        } else {
            Err(AppError::Authorization("Insufficient rights to read these reservations".to_string()))
        }
    }

    /// Staff with reservation write rights, or the reader acting on their
    /// own reservation
    pub fn require_reserve_for(&self, reader_id: i32) -> Result<(), AppError> {
        if self.rights().reservations as u8 >= Rights::Write as u8 || self.reader_id == reader_id {
            Ok(())
        } else {
            Err(AppError::Authorization("Insufficient rights to manage this reservation".to_string()))
        }
    }

    /// Any staff role
    pub fn require_staff(&self) -> Result<(), AppError> {
        if self.role.is_staff() {
            Ok(())
        } else {
            Err(AppError::Authorization("Staff privileges required".to_string()))
        }
    }

    /// Check if account is admin
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Require admin privileges
    pub fn require_admin(&self) -> Result<(), AppError> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(AppError::Authorization("Administrator privileges required".to_string()))
        }
    }
}

/// Rights granted by a role per functional area
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RoleRights {
    pub catalog: Rights,
    pub readers: Rights,
    pub circulation: Rights,
    pub fines: Rights,
    pub reservations: Rights,
    pub settings: Rights,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_normalization_accepts_legacy_labels() {
        assert_eq!("Thủ thư".parse::<Role>().unwrap(), Role::Librarian);
        assert_eq!("Độc giả".parse::<Role>().unwrap(), Role::Reader);
        assert_eq!("Kế toán".parse::<Role>().unwrap(), Role::Accountant);
        assert_eq!("librarian".parse::<Role>().unwrap(), Role::Librarian);
        assert!("sorcerer".parse::<Role>().is_err());
    }

    #[test]
    fn test_reader_role_cannot_touch_circulation() {
        let rights = Role::Reader.rights();
        assert_eq!(rights.circulation, Rights::None);
        assert_eq!(rights.fines, Rights::None);
    }
}
