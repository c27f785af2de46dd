//! Emergency button flow: modal actions and the logged click event.

use serde::{Deserialize, Serialize};

/// Message shown when the user asks to call emergency services.
pub const CALL_SERVICES_MESSAGE: &str = "📞 Conectando com os serviços de emergência...\n\n\
     Por favor, mantenha a calma e aguarde instruções.";

/// Message shown when the user asks for the nearest shelters.
pub const SHELTERS_MESSAGE: &str = "🏠 Buscando abrigos mais próximos da sua localização...\n\n\
     Em desenvolvimento: Integração com mapa em tempo real.";

/// Buttons inside the emergency modal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ModalAction {
    /// Call 190/192.
    CallServices,
    /// Show the nearest shelters.
    NearestShelters,
    /// Dismiss the modal.
    Close,
}

impl ModalAction {
    /// Value of the button's `data-action` attribute.
    #[must_use]
    pub const fn data_attribute(self) -> &'static str {
        match self {
            Self::CallServices => "call-services",
            Self::NearestShelters => "nearest-shelters",
            Self::Close => "close",
        }
    }

    /// Parse a `data-action` attribute.
    #[must_use]
    pub fn from_data_attribute(value: &str) -> Option<Self> {
        match value {
            "call-services" => Some(Self::CallServices),
            "nearest-shelters" => Some(Self::NearestShelters),
            "close" => Some(Self::Close),
            _ => None,
        }
    }
}

/// Record logged for every emergency button click.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmergencyEvent {
    /// Always `"emergency_button_click"`.
    #[serde(rename = "type")]
    pub kind: String,
    /// ISO-8601 click time.
    pub timestamp: String,
    /// Browser user agent.
    pub user_agent: String,
    /// Always `"unknown"`; no geolocation is performed.
    pub location: String,
}

impl EmergencyEvent {
    /// Event kind written to `type`.
    pub const KIND: &'static str = "emergency_button_click";

    /// Build the record for a click.
    #[must_use]
    pub fn button_click(timestamp: impl Into<String>, user_agent: impl Into<String>) -> Self {
        Self {
            kind: Self::KIND.to_string(),
            timestamp: timestamp.into(),
            user_agent: user_agent.into(),
            location: "unknown".to_string(),
        }
    }

    /// JSON form, as written to the console.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
