//! Alert card actions and their popup copy.

use serde::{Deserialize, Serialize};

/// Button on an alert card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AlertAction {
    /// "Ver Rotas de Fuga"
    EvacuationRoutes,
    /// "Ver Recomendações"
    SafetyRecommendations,
    /// "Ver Detalhes"
    Details,
}

impl AlertAction {
    /// Recognize a button by its trimmed label.
    #[must_use]
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim() {
            "Ver Rotas de Fuga" => Some(Self::EvacuationRoutes),
            "Ver Recomendações" => Some(Self::SafetyRecommendations),
            "Ver Detalhes" => Some(Self::Details),
            _ => None,
        }
    }

    /// Button label as rendered.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::EvacuationRoutes => "Ver Rotas de Fuga",
            Self::SafetyRecommendations => "Ver Recomendações",
            Self::Details => "Ver Detalhes",
        }
    }
}

/// Text read from an alert card.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertCardInfo {
    /// `.alert-title`
    pub title: String,
    /// First `.alert-info`
    pub location: String,
    /// Second `.alert-info`
    pub timeframe: String,
    /// Third `.alert-info`, absent on some cards
    pub metric: Option<String>,
}

const GENERIC_RECOMMENDATIONS: &[&str] = &[
    "• Mantenha a calma",
    "• Siga as instruções oficiais",
    "• Procure abrigo seguro",
    "• Monitore os canais oficiais",
];

/// Safety recommendations for an alert title, with a generic fallback.
#[must_use]
pub fn safety_recommendations(title: &str) -> &'static [&'static str] {
    match title {
        "Enchente Iminente" => &[
            "• Procure áreas elevadas",
            "• Desligue a energia elétrica",
            "• Leve documentos importantes",
            "• Siga as rotas indicadas pela Defesa Civil",
        ],
        "Chuva Intensa" => &[
            "• Evite áreas alagadas",
            "• Não atravesse ruas inundadas",
            "• Mantenha-se em local seguro",
            "• Monitore os alertas oficial",
        ],
        "Monitoramento Ativo" => &[
            "• Mantenha-se informado",
            "• Tenha um kit de emergência pronto",
            "• Conheça as rotas de evacuação",
            "• Siga as orientações oficiais",
        ],
        _ => GENERIC_RECOMMENDATIONS,
    }
}

/// Popup shown for "Ver Rotas de Fuga".
#[must_use]
pub fn evacuation_routes_message(title: &str) -> String {
    format!(
        "🗺️ Mostrando rotas de evacuação para: {title}\n\n\
         Em desenvolvimento: Integração com sistema de navegação em tempo real."
    )
}

/// Popup shown for "Ver Recomendações".
#[must_use]
pub fn recommendations_message(title: &str) -> String {
    format!(
        "🛡️ Recomendações de segurança para: {title}\n\n{}",
        safety_recommendations(title).join("\n")
    )
}

/// Popup shown for "Ver Detalhes".
#[must_use]
pub fn details_message(card: &AlertCardInfo) -> String {
    format!(
        "📊 Detalhes do Alerta:\n\n\
         Título: {}\n\
         Localização: {}\n\
         Timeframe: {}\n\
         Métrica: {}\n\n\
         Mais informações em desenvolvimento...",
        card.title,
        card.location,
        card.timeframe,
        card.metric.as_deref().unwrap_or("N/A"),
    )
}

/// Popup for `action` on `card`.
#[must_use]
pub fn action_message(action: AlertAction, card: &AlertCardInfo) -> String {
    match action {
        AlertAction::EvacuationRoutes => evacuation_routes_message(&card.title),
        AlertAction::SafetyRecommendations => recommendations_message(&card.title),
        AlertAction::Details => details_message(card),
    }
}
