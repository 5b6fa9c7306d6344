//! Minijinja template rendering for task email bodies.
//!
//! Templates are plain strings (not pre-registered files), so a fresh
//! [`minijinja::Environment`] is created per render call.

use serde::Serialize;

use rently_core::rental::RentalSummary;

use crate::traits::NotifyError;

/// Body template for the rental confirmation email.
pub const RENTAL_CONFIRMATION_TEMPLATE: &str = "\
Dear {{ customer_name }},

Your rental order #{{ rental_order_id }} has been confirmed.

Order Details:
- Start Date: {{ start_ts }}
- End Date: {{ end_ts }}
- Total Amount: {{ total_amount | money }}
- Status: {{ status }}

Thank you for choosing our service!
";

/// Body template for the payment receipt email.
pub const PAYMENT_RECEIPT_TEMPLATE: &str = "\
Hello,

We have received your payment (reference {{ payment_intent_id }}).

No further action is needed. This receipt was sent by {{ app_name }}.
";

/// Context for [`RENTAL_CONFIRMATION_TEMPLATE`].
#[derive(Debug, Clone, Serialize)]
pub struct ConfirmationContext {
    pub customer_name: String,
    pub rental_order_id: i64,
    /// Pre-formatted start timestamp (`YYYY-MM-DD HH:MM`).
    pub start_ts: String,
    pub end_ts: String,
    pub total_amount: f64,
    pub status: String,
}

impl ConfirmationContext {
    pub fn from_summary(summary: &RentalSummary) -> Self {
        Self {
            customer_name: summary.customer_name.clone(),
            rental_order_id: summary.rental_order_id,
            start_ts: summary.start_ts.format("%Y-%m-%d %H:%M").to_string(),
            end_ts: summary.end_ts.format("%Y-%m-%d %H:%M").to_string(),
            total_amount: summary.total_amount,
            status: summary.status.clone(),
        }
    }
}

/// Context for [`PAYMENT_RECEIPT_TEMPLATE`].
#[derive(Debug, Clone, Serialize)]
pub struct ReceiptContext {
    pub payment_intent_id: String,
    pub app_name: String,
}

/// Renders email body templates using minijinja.
#[derive(Debug, Default)]
pub struct TemplateRenderer {
    _private: (),
}

impl TemplateRenderer {
    pub fn new() -> Self {
        Self { _private: () }
    }

    /// Build a configured minijinja environment with custom filters.
    fn build_env() -> minijinja::Environment<'static> {
        let mut env = minijinja::Environment::new();
        env.add_filter("money", money_filter);
        env
    }

    /// Render a template string with the given context.
    ///
    /// # Errors
    ///
    /// Returns [`NotifyError::Template`] if the template is invalid or
    /// rendering fails.
    pub fn render<S: Serialize>(
        &self,
        template_str: &str,
        ctx: &S,
    ) -> Result<String, NotifyError> {
        let env = Self::build_env();
        env.render_str(template_str, ctx)
            .map_err(|e| NotifyError::Template(e.to_string()))
    }

    /// Validate that a template string parses without errors.
    ///
    /// This does not evaluate the template — it only checks syntax.
    pub fn validate(&self, template_str: &str) -> Result<(), NotifyError> {
        let env = Self::build_env();
        env.template_from_str(template_str)
            .map_err(|e| NotifyError::Template(e.to_string()))?;
        Ok(())
    }

    /// Render the rental confirmation body.
    pub fn rental_confirmation(&self, ctx: &ConfirmationContext) -> Result<String, NotifyError> {
        self.render(RENTAL_CONFIRMATION_TEMPLATE, ctx)
    }

    /// Render the payment receipt body.
    pub fn payment_receipt(&self, ctx: &ReceiptContext) -> Result<String, NotifyError> {
        self.render(PAYMENT_RECEIPT_TEMPLATE, ctx)
    }
}

/// Custom filter: format an amount as dollars with two decimals.
fn money_filter(value: f64) -> String {
    format!("${:.2}", value)
}
