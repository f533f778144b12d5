use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Account role. Parsed once at the boundary; exhaustive everywhere after.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Patient,
    Doctor,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Patient => "patient",
            Role::Doctor => "doctor",
            Role::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "patient" => Ok(Role::Patient),
            "doctor" => Ok(Role::Doctor),
            "admin" => Ok(Role::Admin),
            other => Err(format!("Invalid role: {}", other)),
        }
    }
}

/// Registration status workflow.
///
/// ```text
/// pending ──> confirmed ──> completed
///    │            │
///    └────────────┴──────> cancelled
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RegistrationStatus {
    #[default]
    Pending,
    Confirmed,
    Completed,
    Cancelled,
}

impl RegistrationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RegistrationStatus::Pending => "pending",
            RegistrationStatus::Confirmed => "confirmed",
            RegistrationStatus::Completed => "completed",
            RegistrationStatus::Cancelled => "cancelled",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            RegistrationStatus::Completed | RegistrationStatus::Cancelled
        )
    }

    /// Forward transition table. A self-transition is always allowed.
    pub fn can_transition_to(&self, next: RegistrationStatus) -> bool {
        use RegistrationStatus::*;

        if *self == next {
            return true;
        }
        if self.is_terminal() {
            return false;
        }
        matches!(
            (self, next),
            (Pending, Confirmed) | (Pending, Cancelled) | (Confirmed, Completed) | (Confirmed, Cancelled)
        )
    }
}

impl fmt::Display for RegistrationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RegistrationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "pending" => Ok(RegistrationStatus::Pending),
            "confirmed" => Ok(RegistrationStatus::Confirmed),
            "completed" => Ok(RegistrationStatus::Completed),
            "cancelled" => Ok(RegistrationStatus::Cancelled),
            other => Err(format!("invalid status: {}", other)),
        }
    }
}

/// Account model (maps to accounts.json)
#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub id: String,
    pub username: String,
    pub password_hash: String,
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linked_id: Option<String>,
    #[serde(default)]
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: DateTime<Utc>,
}

/// Redacts the password hash.
impl fmt::Debug for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Account")
            .field("id", &self.id)
            .field("username", &self.username)
            .field("password_hash", &"[REDACTED]")
            .field("role", &self.role)
            .field("linked_id", &self.linked_id)
            .field("created_at", &self.created_at)
            .field("updated_at", &self.updated_at)
            .finish()
    }
}

/// Patient model (maps to patients.json)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Patient {
    pub id: String,
    pub name: String,
    /// 男 or 女
    pub gender: String,
    pub age: i32,
    pub phone: String,
    pub id_card: String,
    pub address: String,
    pub emergency_contact: String,
    pub emergency_phone: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Doctor model (maps to doctors.json)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Doctor {
    pub id: String,
    pub name: String,
    pub department: String,
    pub title: String,
    pub introduction: String,
    pub photo: String,
    /// Disease ids this doctor treats (1-3)
    pub diseases: Vec<String>,
    pub work_schedule: Vec<WorkSchedule>,
    pub max_patients: i32,
    pub fee: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WorkSchedule {
    pub day_of_week: String,
    pub start_time: String,
    pub end_time: String,
    pub is_available: bool,
}

/// Department model (maps to departments.json)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Department {
    pub id: String,
    pub name: String,
    pub description: String,
}

/// Disease model (maps to diseases.json)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Disease {
    pub id: String,
    pub name: String,
    pub description: String,
    /// e.g. 内科, 外科, 儿科
    pub category: String,
    pub symptoms: String,
    pub treatment: String,
}

/// Registration model (maps to registrations.json)
///
/// `department` and `departments` are kept consistent: the primary
/// department is always the first entry of the list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Registration {
    pub id: String,
    pub patient_id: String,
    pub doctor_id: String,
    pub department: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub departments: Vec<String>,
    pub registration_date: DateTime<Utc>,
    pub visit_date: DateTime<Utc>,
    pub time_slot: String,
    pub status: RegistrationStatus,
    pub symptoms: String,
    pub notes: String,
    pub created_at: DateTime<Utc>,
}

/// Registration create/update body. `status` stays a string until the
/// workflow decides what the caller may set.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RegistrationRequest {
    pub patient_id: String,
    pub doctor_id: String,
    pub department: String,
    pub departments: Vec<String>,
    pub registration_date: Option<DateTime<Utc>>,
    pub visit_date: Option<DateTime<Utc>>,
    pub time_slot: String,
    pub status: Option<String>,
    pub symptoms: String,
    pub notes: String,
}

impl RegistrationRequest {
    /// `None` when the status was omitted or blank.
    pub fn requested_status(&self) -> Result<Option<RegistrationStatus>, String> {
        match self.status.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(raw) => raw.parse().map(Some),
        }
    }

    pub fn into_registration(self, status: RegistrationStatus) -> Registration {
        Registration {
            id: String::new(),
            patient_id: self.patient_id,
            doctor_id: self.doctor_id,
            department: self.department,
            departments: self.departments,
            registration_date: self.registration_date.unwrap_or_default(),
            visit_date: self.visit_date.unwrap_or_default(),
            time_slot: self.time_slot,
            status,
            symptoms: self.symptoms,
            notes: self.notes,
            created_at: DateTime::<Utc>::default(),
        }
    }
}

/// Verified session token claims, threaded through request extensions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: String,
    pub role: Role,
    pub expires_at: DateTime<Utc>,
}

/// The authenticated caller, resolved from a verified token to its stored account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
    pub account_id: String,
    pub role: Role,
    pub linked_id: Option<String>,
}

impl Caller {
    pub fn from_account(account: &Account) -> Self {
        Caller {
            account_id: account.id.clone(),
            role: account.role,
            linked_id: account
                .linked_id
                .as_deref()
                .map(str::trim)
                .filter(|id| !id.is_empty())
                .map(str::to_string),
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// Login response
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    pub role: Role,
    pub id: String,
    pub is_new: bool,
}

/// Public view of an account (never includes the password hash)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountSummary {
    pub id: String,
    pub username: String,
    pub role: Role,
    pub linked_id: Option<String>,
}

impl From<&Account> for AccountSummary {
    fn from(account: &Account) -> Self {
        AccountSummary {
            id: account.id.clone(),
            username: account.username.clone(),
            role: account.role,
            linked_id: account.linked_id.clone(),
        }
    }
}

/// Body of `assignDoctorAccount`
#[derive(Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AssignDoctorAccountRequest {
    pub doctor_id: String,
    pub username: String,
    pub password: String,
}

impl fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginRequest")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

#[derive(Clone, Default, Deserialize)]
#[serde(default)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Result of `upsertMyPatientProfile`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientProfileResponse {
    pub patient_id: String,
    pub patient: Patient,
}

/// `{"message": ...}` acknowledgement for deletes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        MessageResponse {
            message: message.into(),
        }
    }
}

/// Dashboard snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexInfo {
    pub patients: Vec<Patient>,
    pub doctors: Vec<Doctor>,
    pub registrations: Vec<Registration>,
}
