//! Emergency modal markup and styles.
//!
//! The modal is built on demand. Its stylesheet is injected once, under
//! [`STYLES_ID`], the first time the modal opens.

use guardian_core::ModalAction;
use std::fmt::Write as _;

/// Class of the modal root; clicks on the root itself close it.
pub const MODAL_CLASS: &str = "emergency-modal";

/// Id of the injected `<style>` element.
pub const STYLES_ID: &str = "emergency-modal-styles";

/// Modal stylesheet.
pub const MODAL_STYLES: &str = "\
.emergency-modal {
    position: fixed;
    top: 0;
    left: 0;
    width: 100%;
    height: 100%;
    background: rgba(0,0,0,0.8);
    display: flex;
    align-items: center;
    justify-content: center;
    z-index: 2000;
    animation: fade-in 0.3s ease;
}
.modal-content {
    background: var(--card);
    border-radius: var(--radius-lg);
    max-width: 500px;
    width: 90%;
    animation: slide-up 0.3s ease;
}
.modal-header {
    padding: var(--spacing-4);
    border-bottom: 1px solid var(--border);
    display: flex;
    align-items: center;
    gap: var(--spacing-3);
}
.modal-header.emergency {
    background: var(--emergency-10);
    color: var(--emergency);
}
.modal-body {
    padding: var(--spacing-6);
}
.emergency-options {
    display: flex;
    flex-direction: column;
    gap: var(--spacing-3);
    margin-top: var(--spacing-4);
}
";

/// Buttons in display order.
pub const BUTTONS: [ModalAction; 3] = [
    ModalAction::CallServices,
    ModalAction::NearestShelters,
    ModalAction::Close,
];

/// Button class, icon class and label.
#[must_use]
pub const fn button_parts(action: ModalAction) -> (&'static str, &'static str, &'static str) {
    match action {
        ModalAction::CallServices => (
            "btn btn-emergency",
            "fas fa-phone",
            "Chamar Emergência (190/192)",
        ),
        ModalAction::NearestShelters => (
            "btn btn-alert",
            "fas fa-map-marker-alt",
            "Abrigos Mais Próximos",
        ),
        ModalAction::Close => ("btn btn-primary", "fas fa-times", "Fechar"),
    }
}

/// Inner HTML of the modal root.
#[must_use]
pub fn modal_markup() -> String {
    let mut buttons = String::new();
    for action in BUTTONS {
        let (class, icon, label) = button_parts(action);
        let _ = write!(
            buttons,
            "<button class=\"{class}\" data-action=\"{}\"><i class=\"{icon}\"></i> {label}</button>",
            action.data_attribute()
        );
    }
    format!(
        "<div class=\"modal-content\">\
         <div class=\"modal-header emergency\">\
         <i class=\"fas fa-exclamation-triangle\"></i>\
         <h3>EMERGÊNCIA - PRECISA DE AJUDA?</h3>\
         </div>\
         <div class=\"modal-body\">\
         <p>Estamos acionando os serviços de emergência para sua localização.</p>\
         <div class=\"emergency-options\">{buttons}</div>\
         </div>\
         </div>"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_markup_has_one_button_per_action() {
        let html = modal_markup();
        assert_eq!(html.matches("<button").count(), BUTTONS.len());
        for action in BUTTONS {
            let attr = format!("data-action=\"{}\"", action.data_attribute());
            assert_eq!(html.matches(&attr).count(), 1, "{attr}");
        }
    }

    #[test]
    fn test_markup_button_order() {
        let html = modal_markup();
        let call = html.find("call-services").unwrap();
        let shelters = html.find("nearest-shelters").unwrap();
        let close = html.find("data-action=\"close\"").unwrap();
        assert!(call < shelters && shelters < close);
    }

    #[test]
    fn test_styles_cover_modal_class() {
        assert!(MODAL_STYLES.contains(&format!(".{MODAL_CLASS} {{")));
        assert!(MODAL_STYLES.contains("z-index: 2000"));
    }

    #[test]
    fn test_close_button_parts() {
        assert_eq!(
            button_parts(ModalAction::Close),
            ("btn btn-primary", "fas fa-times", "Fechar")
        );
    }
}
