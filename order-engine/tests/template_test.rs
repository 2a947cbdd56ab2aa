//! Template renderer integration tests.

mod common;

use common::{context, template};
use order_engine::models::TemplateType;
use order_engine::services::TemplateRenderer;

#[test]
fn missing_values_stay_literal() {
    let rendered = TemplateRenderer::render(
        "Hello {{clientName}}, balance {{balance}}",
        &context(&[("clientName", "Asha")]),
    );
    assert_eq!(rendered, "Hello Asha, balance {{balance}}");
}

#[test]
fn empty_context_returns_content_unchanged() {
    let content = "Hi {{clientName}}, see you on {{ trialDate }}!";
    assert_eq!(TemplateRenderer::render(content, &context(&[])), content);
}

#[test]
fn template_variables_follow_content_edits() {
    let mut t = template(TemplateType::TrialReminder, "Trial on {{trialDate}}");
    assert_eq!(t.variables, vec!["trialDate"]);

    t.set_content("{{clientName}}: trial on {{trialDate}} at {{shopName}}");
    assert_eq!(t.variables, vec!["clientName", "trialDate", "shopName"]);
}

#[test]
fn builtin_texts_render_with_order_context_names() {
    let ctx = context(&[
        ("clientName", "Asha"),
        ("orderNumber", "ORD-9"),
        ("shopName", "Stitch Studio"),
        ("finalAmount", "₹1000.00"),
        ("advance", "₹400.00"),
        ("balance", "₹600.00"),
        ("trialDate", "20 Oct 2026"),
        ("deliveryDate", "02 Nov 2026"),
    ]);

    for template_type in [
        TemplateType::OrderConfirmation,
        TemplateType::OrderReady,
        TemplateType::PostDelivery,
        TemplateType::TrialReminder,
        TemplateType::DeliveryReminder,
        TemplateType::PaymentReminder,
        TemplateType::InactiveClient,
        TemplateType::Custom,
    ] {
        let content = template_type.default_content();
        assert!(
            TemplateRenderer::unresolved(content, &ctx).is_empty(),
            "{} has unresolved variables",
            template_type.as_str()
        );
        assert!(!TemplateRenderer::render(content, &ctx).contains("{{"));
    }
}
