//! Email templates for the notification pipeline, rendered with Jinja2
//! syntax. Templates are embedded at compile time from `templates/emails/`.

use minijinja::{context, Environment};
use std::sync::OnceLock;

use crate::core::error::{AppError, Result};

static TEMPLATE_ENV: OnceLock<Environment<'static>> = OnceLock::new();

const TECH_SHEET_TEMPLATE: &str = "tech_sheet.html.jinja";
const TECH_SHEET_UNAVAILABLE_TEMPLATE: &str = "tech_sheet_unavailable.html.jinja";

fn env() -> &'static Environment<'static> {
    TEMPLATE_ENV.get_or_init(|| {
        let mut env = Environment::new();
        env.add_template(
            TECH_SHEET_TEMPLATE,
            include_str!("../../../templates/emails/tech_sheet.html.jinja"),
        )
        .expect("embedded template is valid");
        env.add_template(
            TECH_SHEET_UNAVAILABLE_TEMPLATE,
            include_str!("../../../templates/emails/tech_sheet_unavailable.html.jinja"),
        )
        .expect("embedded template is valid");
        env
    })
}

/// Subject and HTML body of a composed email
#[derive(Debug, Clone)]
pub struct EmailContent {
    pub subject: String,
    pub html: String,
}

/// Compose the datasheet email for a lead.
///
/// With a datasheet link the email carries the download link; without one
/// it announces that the sheet is temporarily unavailable and that a human
/// follow-up is coming. Both variants end with the business signature.
pub fn tech_sheet_email(
    recipient_name: Option<&str>,
    product_name: &str,
    datasheet_url: Option<&str>,
) -> Result<EmailContent> {
    let subject = format!("Fiche technique - {}", product_name);
    let name = recipient_name.unwrap_or("");

    let (template, ctx) = match datasheet_url {
        Some(url) => (
            TECH_SHEET_TEMPLATE,
            context! { name, product_name, datasheet_url => url },
        ),
        None => (
            TECH_SHEET_UNAVAILABLE_TEMPLATE,
            context! { name, product_name },
        ),
    };

    let html = env()
        .get_template(template)
        .and_then(|t| t.render(ctx))
        .map_err(|e| AppError::Internal(format!("Failed to render email template: {}", e)))?;

    Ok(EmailContent { subject, html })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn datasheet_variant_carries_the_link() {
        let email = tech_sheet_email(
            Some("Jean"),
            "Takeuchi TB320",
            Some("https://cdn.tubocom.com/fiches/tb320.pdf"),
        )
        .unwrap();

        assert_eq!(email.subject, "Fiche technique - Takeuchi TB320");
        assert!(email.html.contains("Bonjour Jean,"));
        assert!(email
            .html
            .contains("https://cdn.tubocom.com/fiches/tb320.pdf"));
        assert!(email.html.contains("Takeuchi TB320"));
        assert!(email.html.contains("L'équipe TBC.MC"));
    }

    #[test]
    fn unavailable_variant_announces_follow_up() {
        let email = tech_sheet_email(Some("Jean"), "Takeuchi TB320", None).unwrap();

        assert_eq!(email.subject, "Fiche technique - Takeuchi TB320");
        assert!(email.html.contains("n'est pas disponible pour le moment"));
        assert!(!email.html.contains("Télécharger la fiche technique"));
        assert!(email.html.contains("L'équipe TBC.MC"));
    }

    #[test]
    fn missing_recipient_name_renders_empty() {
        let email = tech_sheet_email(None, "Dumper", Some("https://x.fr/d.pdf")).unwrap();
        assert!(email.html.contains("Bonjour ,"));
    }
}
