use core::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use voilerie_core::{DomainError, Entity, SailId};

use crate::location::Location;

/// Sail category.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SailType {
    #[serde(rename = "Grand-voile")]
    GrandVoile,
    #[serde(rename = "Génois")]
    Genois,
    #[serde(rename = "Foc")]
    Foc,
    #[serde(rename = "Spinnaker")]
    Spinnaker,
    #[serde(rename = "Gennaker")]
    Gennaker,
    #[serde(rename = "Code 0")]
    Code0,
    #[serde(rename = "Trinquette")]
    Trinquette,
    #[serde(rename = "Tourmentin")]
    Tourmentin,
    #[serde(rename = "Voile d'étai")]
    VoileDEtai,
}

impl SailType {
    pub const ALL: [SailType; 9] = [
        SailType::GrandVoile,
        SailType::Genois,
        SailType::Foc,
        SailType::Spinnaker,
        SailType::Gennaker,
        SailType::Code0,
        SailType::Trinquette,
        SailType::Tourmentin,
        SailType::VoileDEtai,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SailType::GrandVoile => "Grand-voile",
            SailType::Genois => "Génois",
            SailType::Foc => "Foc",
            SailType::Spinnaker => "Spinnaker",
            SailType::Gennaker => "Gennaker",
            SailType::Code0 => "Code 0",
            SailType::Trinquette => "Trinquette",
            SailType::Tourmentin => "Tourmentin",
            SailType::VoileDEtai => "Voile d'étai",
        }
    }
}

impl core::fmt::Display for SailType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SailType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SailType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| DomainError::validation(format!("unknown sail type `{s}`")))
    }
}

/// A sail held in the loft.
///
/// Field names follow the interchange document (camelCase, flat strings).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sail {
    pub id: SailId,
    pub name: String,
    #[serde(rename = "type")]
    pub sail_type: SailType,
    pub client_name: String,
    pub boat_name: String,
    pub date_added: DateTime<Utc>,
    pub last_modified: DateTime<Utc>,
    pub position: Location,
}

impl Sail {
    /// Stamp a mutation without letting `last_modified` go backwards.
    pub(crate) fn touch(&mut self, at: DateTime<Utc>) {
        self.last_modified = self.last_modified.max(at);
    }
}

impl Entity for Sail {
    type Id = SailId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Input of the intake form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SailDraft {
    pub name: String,
    #[serde(rename = "type")]
    pub sail_type: SailType,
    pub client_name: String,
    pub boat_name: String,
    /// Defaults to the intake area.
    #[serde(default)]
    pub location: Option<Location>,
}

impl SailDraft {
    pub fn new(
        name: impl Into<String>,
        sail_type: SailType,
        client_name: impl Into<String>,
        boat_name: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            sail_type,
            client_name: client_name.into(),
            boat_name: boat_name.into(),
            location: None,
        }
    }

    pub fn at(mut self, location: Location) -> Self {
        self.location = Some(location);
        self
    }

    /// Required-field check performed by the form before submitting.
    ///
    /// The store never calls this; it accepts any draft it is given.
    pub fn validate(&self) -> Result<(), DomainError> {
        for (field, value) in [
            ("name", &self.name),
            ("clientName", &self.client_name),
            ("boatName", &self.boat_name),
        ] {
            if value.trim().is_empty() {
                return Err(DomainError::validation(format!("{field} cannot be empty")));
            }
        }
        Ok(())
    }
}

/// Partial edit of a sail. `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SailPatch {
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub sail_type: Option<SailType>,
    pub client_name: Option<String>,
    pub boat_name: Option<String>,
    pub position: Option<Location>,
}

impl SailPatch {
    pub fn is_empty(&self) -> bool {
        self == &SailPatch::default()
    }

    /// Apply the descriptive fields; `position` is handled by the aggregate.
    pub(crate) fn apply_fields(&self, sail: &mut Sail) {
        if let Some(name) = &self.name {
            sail.name = name.clone();
        }
        if let Some(sail_type) = self.sail_type {
            sail.sail_type = sail_type;
        }
        if let Some(client_name) = &self.client_name {
            sail.client_name = client_name.clone();
        }
        if let Some(boat_name) = &self.boat_name {
            sail.boat_name = boat_name.clone();
        }
    }
}
