//! Message template model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::error::EngineError;
use crate::services::template_renderer::TemplateRenderer;

/// Template type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TemplateType {
    OrderConfirmation,
    OrderReady,
    PostDelivery,
    TrialReminder,
    DeliveryReminder,
    PaymentReminder,
    InactiveClient,
    Custom,
}

impl TemplateType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TemplateType::OrderConfirmation => "order_confirmation",
            TemplateType::OrderReady => "order_ready",
            TemplateType::PostDelivery => "post_delivery",
            TemplateType::TrialReminder => "trial_reminder",
            TemplateType::DeliveryReminder => "delivery_reminder",
            TemplateType::PaymentReminder => "payment_reminder",
            TemplateType::InactiveClient => "inactive_client",
            TemplateType::Custom => "custom",
        }
    }

    pub fn from_string(s: &str) -> Self {
        match s {
            "order_confirmation" => TemplateType::OrderConfirmation,
            "order_ready" => TemplateType::OrderReady,
            "post_delivery" => TemplateType::PostDelivery,
            "trial_reminder" => TemplateType::TrialReminder,
            "delivery_reminder" => TemplateType::DeliveryReminder,
            "payment_reminder" => TemplateType::PaymentReminder,
            "inactive_client" => TemplateType::InactiveClient,
            _ => TemplateType::Custom,
        }
    }

    /// Built-in text used when no active template of this type exists.
    pub fn default_content(&self) -> &'static str {
        match self {
            TemplateType::OrderConfirmation => {
                "Hello {{clientName}}, your order {{orderNumber}} has been booked at {{shopName}}. \
                 Total: {{finalAmount}}, advance received: {{advance}}. \
                 Expected delivery: {{deliveryDate}}."
            }
            TemplateType::OrderReady => {
                "Hello {{clientName}}, your order {{orderNumber}} is ready for pickup at {{shopName}}. \
                 Balance due: {{balance}}."
            }
            TemplateType::PostDelivery => {
                "Hello {{clientName}}, thank you for collecting order {{orderNumber}} from \
                 {{shopName}}. We hope you love the fit!"
            }
            TemplateType::TrialReminder => {
                "Hello {{clientName}}, a reminder that your trial for order {{orderNumber}} \
                 is scheduled on {{trialDate}} at {{shopName}}."
            }
            TemplateType::DeliveryReminder => {
                "Hello {{clientName}}, your order {{orderNumber}} is due for delivery on \
                 {{deliveryDate}}."
            }
            TemplateType::PaymentReminder => {
                "Hello {{clientName}}, a balance of {{balance}} is pending on order \
                 {{orderNumber}}. Thank you, {{shopName}}."
            }
            TemplateType::InactiveClient => {
                "Hello {{clientName}}, it has been a while! Visit {{shopName}} for your next outfit."
            }
            TemplateType::Custom => "Hello {{clientName}}",
        }
    }
}

/// Input for creating a template.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateTemplate {
    #[validate(length(min = 1, message = "name is required"))]
    pub name: String,
    pub template_type: TemplateType,
    pub content: String,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

/// User-editable message template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageTemplate {
    pub template_id: Uuid,
    pub name: String,
    pub template_type: TemplateType,
    pub content: String,
    /// Derived from `content`; kept current by [`MessageTemplate::set_content`].
    pub variables: Vec<String>,
    pub active: bool,
    pub created_utc: DateTime<Utc>,
    pub updated_utc: DateTime<Utc>,
}

impl MessageTemplate {
    pub fn new(input: CreateTemplate) -> Result<Self, EngineError> {
        input.validate()?;
        let now = Utc::now();
        Ok(Self {
            template_id: Uuid::new_v4(),
            name: input.name,
            template_type: input.template_type,
            variables: TemplateRenderer::extract_variables(&input.content),
            content: input.content,
            active: input.active,
            created_utc: now,
            updated_utc: now,
        })
    }

    pub fn set_content(&mut self, content: impl Into<String>) {
        self.content = content.into();
        self.variables = TemplateRenderer::extract_variables(&self.content);
        self.updated_utc = Utc::now();
    }

    pub fn set_active(&mut self, active: bool) {
        self.active = active;
        self.updated_utc = Utc::now();
    }
}

/// Templates handed to the engine by the caller.
#[derive(Debug, Clone, Default)]
pub struct TemplateCatalog {
    templates: Vec<MessageTemplate>,
}

impl TemplateCatalog {
    pub fn new(templates: Vec<MessageTemplate>) -> Self {
        Self { templates }
    }

    pub fn templates(&self) -> &[MessageTemplate] {
        &self.templates
    }

    pub fn insert(&mut self, template: MessageTemplate) {
        self.templates.push(template);
    }

    /// First active template of the given type, in catalog order.
    pub fn active(&self, template_type: TemplateType) -> Option<&MessageTemplate> {
        self.templates
            .iter()
            .find(|t| t.active && t.template_type == template_type)
    }

    /// Content to render for `template_type`, and whether the built-in text was used.
    pub fn content_for(&self, template_type: TemplateType) -> (&str, bool) {
        match self.active(template_type) {
            Some(template) => (template.content.as_str(), false),
            None => (template_type.default_content(), true),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn template(name: &str, template_type: TemplateType, content: &str, active: bool) -> MessageTemplate {
        MessageTemplate::new(CreateTemplate {
            name: name.to_string(),
            template_type,
            content: content.to_string(),
            active,
        })
        .unwrap()
    }

    #[test]
    fn test_new_template_extracts_variables() {
        let t = template(
            "Thanks",
            TemplateType::PostDelivery,
            "Hi {{clientName}}, order {{orderNumber}} delivered. {{clientName}}",
            true,
        );
        assert_eq!(t.variables, vec!["clientName", "orderNumber"]);
    }

    #[test]
    fn test_set_content_recomputes_variables() {
        let mut t = template("Ready", TemplateType::OrderReady, "Hi {{clientName}}", true);
        t.set_content("Balance {{balance}} for {{orderNumber}}");
        assert_eq!(t.variables, vec!["balance", "orderNumber"]);
    }

    #[test]
    fn test_name_is_required() {
        let result = MessageTemplate::new(CreateTemplate {
            name: String::new(),
            template_type: TemplateType::Custom,
            content: "Hi".to_string(),
            active: true,
        });
        assert!(matches!(result, Err(EngineError::ValidationErrors(_))));
    }

    #[test]
    fn test_catalog_skips_inactive_templates() {
        let catalog = TemplateCatalog::new(vec![
            template("Old", TemplateType::PostDelivery, "old text", false),
            template("New", TemplateType::PostDelivery, "new text", true),
            template("Later", TemplateType::PostDelivery, "later text", true),
        ]);
        assert_eq!(catalog.active(TemplateType::PostDelivery).unwrap().name, "New");
        assert_eq!(catalog.content_for(TemplateType::PostDelivery), ("new text", false));
    }

    #[test]
    fn test_inserted_template_becomes_active() {
        let mut catalog = TemplateCatalog::default();
        assert!(catalog.active(TemplateType::TrialReminder).is_none());

        catalog.insert(template("Trial", TemplateType::TrialReminder, "See you {{trialDate}}", true));
        assert_eq!(catalog.templates().len(), 1);
        assert_eq!(
            catalog.content_for(TemplateType::TrialReminder),
            ("See you {{trialDate}}", false)
        );
    }

    #[test]
    fn test_catalog_falls_back_to_default_content() {
        let catalog = TemplateCatalog::default();
        let (content, fallback) = catalog.content_for(TemplateType::PaymentReminder);
        assert!(fallback);
        assert!(content.contains("{{balance}}"));
    }

    #[test]
    fn test_type_string_round_trip() {
        for t in [
            TemplateType::OrderConfirmation,
            TemplateType::OrderReady,
            TemplateType::PostDelivery,
            TemplateType::TrialReminder,
            TemplateType::DeliveryReminder,
            TemplateType::PaymentReminder,
            TemplateType::InactiveClient,
            TemplateType::Custom,
        ] {
            assert_eq!(TemplateType::from_string(t.as_str()), t);
        }
        assert_eq!(TemplateType::from_string("birthday"), TemplateType::Custom);
    }
}
