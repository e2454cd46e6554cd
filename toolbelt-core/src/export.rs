//! Estimate export rendering.
//!
//! Produces the two hand-off documents for an estimate: a self-contained
//! printable HTML page and an email subject/body pair. Both are rendered
//! from one [`EstimateDocument`], so the dollar figures in the printed and
//! emailed copies always agree. Actual printing and mail composition are
//! the caller's concern.

use rust_decimal::Decimal;

use crate::models::{PricingType, Service};
use crate::pricing::common::format_money;
use crate::pricing::{EstimateCalculator, EstimateLineItem, EstimateTotals, PricingError};

/// One rendered estimate line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EstimateRow {
    pub service_name: String,
    pub quantity: u32,
    /// Human-readable rate description, e.g. "$45.00/hr x 2hrs".
    pub rate_detail: String,
    pub line_total: Decimal,
}

/// A fully priced estimate ready to be rendered for print or email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EstimateDocument {
    rows: Vec<EstimateRow>,
    totals: EstimateTotals,
}

impl EstimateDocument {
    /// Prices the selection against the catalog and captures the rows both
    /// renderings share.
    pub fn new(
        catalog: &[Service],
        items: &[EstimateLineItem],
    ) -> Result<Self, PricingError> {
        let calculator = EstimateCalculator::new(catalog);
        let totals = calculator.totals(items)?;
        let mut rows = Vec::with_capacity(items.len());
        for item in items {
            let service = calculator.service(item.service_id)?;
            let rate_detail = match service.pricing {
                PricingType::Hourly => format!(
                    "{}/hr x {}hrs",
                    format_money(service.hourly_rate.unwrap_or(Decimal::ZERO)),
                    service.estimated_duration_hours
                ),
                PricingType::Flat => format!(
                    "{} flat rate",
                    format_money(service.flat_rate.unwrap_or(Decimal::ZERO))
                ),
            };
            rows.push(EstimateRow {
                service_name: service.name.clone(),
                quantity: item.quantity,
                rate_detail,
                line_total: calculator.line_total(item)?,
            });
        }
        Ok(Self { rows, totals })
    }

    pub fn rows(&self) -> &[EstimateRow] {
        &self.rows
    }

    pub fn totals(&self) -> &EstimateTotals {
        &self.totals
    }

    /// Renders a self-contained printable HTML document.
    pub fn to_html(&self) -> String {
        let mut body_rows = String::new();
        for row in &self.rows {
            body_rows.push_str(&format!(
                "      <tr><td>{}</td><td>{}</td><td>{}</td><td class=\"amount\">{}</td></tr>\n",
                escape_html(&row.service_name),
                row.quantity,
                escape_html(&row.rate_detail),
                format_money(row.line_total)
            ));
        }
        format!(
            "<!DOCTYPE html>\n\
             <html>\n\
             <head>\n\
             <meta charset=\"utf-8\">\n\
             <title>Service Estimate</title>\n\
             <style>\n\
             body {{ font-family: sans-serif; margin: 2em; }}\n\
             table {{ border-collapse: collapse; width: 100%; }}\n\
             th, td {{ border-bottom: 1px solid #ccc; padding: 6px 10px; text-align: left; }}\n\
             .amount {{ text-align: right; }}\n\
             tfoot td {{ font-weight: bold; border-bottom: none; }}\n\
             .fine-print {{ color: #666; font-size: 0.8em; }}\n\
             </style>\n\
             </head>\n\
             <body>\n\
             <h1>Service Estimate</h1>\n\
             <table>\n\
             <thead>\n\
             <tr><th>Service</th><th>Qty</th><th>Rate</th><th class=\"amount\">Total</th></tr>\n\
             </thead>\n\
             <tbody>\n{body_rows}      </tbody>\n\
             <tfoot>\n\
             <tr><td colspan=\"3\">Labor cost</td><td class=\"amount\">{labor}</td></tr>\n\
             <tr><td colspan=\"3\">Estimated duration</td><td class=\"amount\">{duration}hrs</td></tr>\n\
             <tr><td colspan=\"3\">Suggested total</td><td class=\"amount\">{suggested}</td></tr>\n\
             </tfoot>\n\
             </table>\n\
             <p class=\"fine-print\">Suggested total includes a 15% allowance for materials and overhead.</p>\n\
             </body>\n\
             </html>\n",
            labor = format_money(self.totals.labor_cost),
            duration = self.totals.total_duration_hours,
            suggested = format_money(self.totals.suggested_total),
        )
    }

    /// Renders the email hand-off: a subject line and a plain-text body
    /// showing the same figures as the printable copy.
    pub fn to_email(&self) -> (String, String) {
        let subject = "Your service estimate".to_string();
        let mut body = String::from("Hello,\n\nHere is the estimate you requested:\n\n");
        for row in &self.rows {
            body.push_str(&format!(
                "  {} ({}x) - {} = {}\n",
                row.service_name,
                row.quantity,
                row.rate_detail,
                format_money(row.line_total)
            ));
        }
        body.push_str(&format!(
            "\nLabor cost: {}\nEstimated duration: {}hrs\nSuggested total: {}\n\n\
             The suggested total includes a 15% allowance for materials and overhead.\n\
             Reply to this email or give us a call to get on the schedule.\n",
            format_money(self.totals.labor_cost),
            self.totals.total_duration_hours,
            format_money(self.totals.suggested_total),
        ));
        (subject, body)
    }
}

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
