//! # Ticket Template & Rendering
//!
//! The configurable receipt layout and a plain-text renderer with the same
//! sections as the thermal printout. Printer I/O lives outside this crate;
//! the host sends the rendered text wherever it needs to.
//!
//! ```text
//!        RESTAURANTE POS            ◄─ header
//!   Calle Principal #123, Centro
//! --------------------------------
//! Ticket: T123456                   ◄─ content toggles
//! Fecha: 15/01/2024, 14:05:09
//! --------------------------------
//! Tacos al pastor                   ◄─ one block per item
//! 2 x $100.00 = $220.00
//!   + Extra queso
//! --------------------------------
//! Subtotal / IVA / Descuento / Propina / TOTAL
//! --------------------------------
//!   ¡Gracias por su preferencia!    ◄─ footer
//! ```

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::payment::Ticket;
use crate::types::{OrderType, PaymentMethod, TicketType};

/// Printable width of an 80 mm thermal roll, in characters.
pub const TICKET_WIDTH: usize = 32;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase", default)]
pub struct TicketHeader {
    pub business_name: String,
    pub address: String,
    pub phone: String,
    pub email: String,
    pub rfc: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase", default)]
pub struct TicketContent {
    pub show_ticket_number: bool,
    pub show_date: bool,
    pub show_cashier: bool,
    pub show_waiter: bool,
    pub show_customer: bool,
    pub show_table: bool,
    pub show_item_details: bool,
    pub show_modifiers: bool,
    pub show_special_instructions: bool,
}

impl Default for TicketContent {
    fn default() -> Self {
        Self {
            show_ticket_number: true,
            show_date: true,
            show_cashier: true,
            show_waiter: true,
            show_customer: true,
            show_table: true,
            show_item_details: true,
            show_modifiers: true,
            show_special_instructions: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase", default)]
pub struct TicketFooter {
    pub thank_you_message: String,
    pub return_policy: String,
    pub additional_info: String,
    pub website: String,
    pub social_media: String,
}

/// Receipt layout stored under the ticket-template key.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(default)]
pub struct TicketTemplate {
    pub header: TicketHeader,
    pub content: TicketContent,
    pub footer: TicketFooter,
}

impl Default for TicketHeader {
    fn default() -> Self {
        Self {
            business_name: "RESTAURANTE POS".to_string(),
            address: "Calle Principal #123, Centro".to_string(),
            phone: "Tel: (555) 123-4567".to_string(),
            email: "info@restaurantepos.com".to_string(),
            rfc: "RFC: ABC123456789".to_string(),
        }
    }
}

impl Default for TicketFooter {
    fn default() -> Self {
        Self {
            thank_you_message: "¡Gracias por su preferencia!".to_string(),
            return_policy: "Cambios y devoluciones: 7 días con ticket".to_string(),
            additional_info: "Conserve su ticket como comprobante".to_string(),
            website: "www.restaurantepos.com".to_string(),
            social_media: "@RestaurantePOS".to_string(),
        }
    }
}

fn separator(out: &mut String) {
    out.push_str(&"-".repeat(TICKET_WIDTH));
    out.push('\n');
}

fn centered(out: &mut String, text: &str) {
    let len = text.chars().count();
    if len < TICKET_WIDTH {
        out.push_str(&" ".repeat((TICKET_WIDTH - len) / 2));
    }
    out.push_str(text);
    out.push('\n');
}

fn line(out: &mut String, text: impl AsRef<str>) {
    out.push_str(text.as_ref());
    out.push('\n');
}

fn order_type_label(order_type: OrderType) -> &'static str {
    match order_type {
        OrderType::DineIn => "En mesa",
        OrderType::Takeout => "Para llevar",
        OrderType::Delivery => "Domicilio",
    }
}

fn payment_method_label(method: PaymentMethod) -> &'static str {
    match method {
        PaymentMethod::Cash => "Efectivo",
        PaymentMethod::Card => "Tarjeta",
        PaymentMethod::Transfer => "Transferencia",
    }
}

/// Renders a ticket as plain text, honoring the template's toggles.
pub fn render_text(ticket: &Ticket, template: &TicketTemplate) -> String {
    let mut out = String::new();
    let header = &template.header;
    let content = &template.content;
    let order = &ticket.order;
    let payment = &ticket.payment;
    let totals = &ticket.totals;

    for text in [&header.business_name, &header.address, &header.phone, &header.rfc] {
        if !text.is_empty() {
            centered(&mut out, text);
        }
    }
    if ticket.ticket_type == TicketType::Electronic {
        centered(&mut out, "Factura Electrónica");
    }
    separator(&mut out);

    if content.show_ticket_number {
        line(&mut out, format!("Ticket: {}", ticket.number));
    }
    if content.show_date {
        line(&mut out, format!("Fecha: {}", ticket.date));
    }
    if content.show_cashier && !ticket.cashier.is_empty() {
        line(&mut out, format!("Cajero: {}", ticket.cashier));
    }
    if content.show_waiter {
        if let Some(waiter) = &order.waiter {
            line(&mut out, format!("Mesero: {}", waiter));
        }
    }
    if content.show_customer {
        if let Some(customer) = &order.customer {
            line(&mut out, format!("Cliente: {}", customer));
        }
    }
    if content.show_table {
        if let Some(table) = &order.table_id {
            line(&mut out, format!("Mesa: {}", table));
        }
    }
    line(&mut out, format!("Tipo: {}", order_type_label(order.order_type)));
    separator(&mut out);

    for item in &order.items {
        line(&mut out, &item.name);
        if content.show_item_details {
            line(
                &mut out,
                format!("{} x {} = {}", item.quantity, item.price, item.line_subtotal()),
            );
        }
        if content.show_modifiers && !item.modifiers.is_empty() {
            let names: Vec<&str> = item.modifiers.iter().map(|m| m.name.as_str()).collect();
            line(&mut out, format!("  + {}", names.join(", ")));
        }
        if content.show_special_instructions {
            if let Some(note) = &item.special_instructions {
                line(&mut out, format!("  Nota: {}", note));
            }
        }
    }
    separator(&mut out);

    line(&mut out, format!("Subtotal: {}", totals.subtotal));
    line(&mut out, format!("IVA: {}", totals.tax));
    if totals.delivery_fee.is_positive() {
        line(&mut out, format!("Envío: {}", totals.delivery_fee));
    }
    if totals.discount_amount.is_positive() {
        line(&mut out, format!("Descuento: -{}", totals.discount_amount));
    }
    if totals.tip.is_positive() {
        line(&mut out, format!("Propina: {}", totals.tip));
    }
    line(&mut out, format!("TOTAL: {}", totals.final_total));
    separator(&mut out);

    line(&mut out, format!("Pago: {}", payment_method_label(payment.method)));
    if payment.change.is_positive() {
        line(&mut out, format!("Cambio: {}", payment.change));
    }

    let footer = &template.footer;
    if !footer.thank_you_message.is_empty() {
        out.push('\n');
        centered(&mut out, &footer.thank_you_message);
    }
    for text in [&footer.return_policy, &footer.additional_info] {
        if !text.is_empty() {
            centered(&mut out, text);
        }
    }

    out
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::currency::{Currency, ExchangeRate};
    use crate::money::Money;
    use crate::order::{Order, SelectedModifier};
    use crate::payment::{PaymentProcessor, PaymentRequest};
    use crate::settings::GeneralSettings;
    use chrono::{TimeZone, Utc};

    fn ticket() -> Ticket {
        let now = Utc.with_ymd_and_hms(2024, 1, 15, 14, 5, 9).unwrap();
        let mut order = Order::dine_in("Mesa 3", Some("Juan".to_string()));
        order
            .add_line(
                "prod-1",
                "Tacos al pastor",
                Money::from_major(100),
                None,
                vec![SelectedModifier::new("Extra queso", Money::from_major(10))],
                2,
                Some("Sin cebolla".to_string()),
            )
            .unwrap();
        order.save(now).unwrap();

        let settings = GeneralSettings {
            utc_offset_minutes: 0,
            ..GeneralSettings::default()
        };
        let processor = PaymentProcessor::new(ExchangeRate::default(), &settings);
        let request = PaymentRequest {
            amount_received: Money::from_major(300),
            currency: Currency::Mxn,
            ..PaymentRequest::default()
        };
        processor
            .process(&mut order, &request, "María", now)
            .unwrap()
            .ticket
    }

    #[test]
    fn test_render_full_ticket() {
        let text = render_text(&ticket(), &TicketTemplate::default());

        assert!(text.contains("RESTAURANTE POS"));
        assert!(text.contains("Fecha: 15/01/2024, 14:05:09"));
        assert!(text.contains("Cajero: María"));
        assert!(text.contains("Mesero: Juan"));
        assert!(text.contains("Mesa: Mesa 3"));
        assert!(text.contains("2 x $100.00 = $220.00"));
        assert!(text.contains("  + Extra queso"));
        assert!(text.contains("  Nota: Sin cebolla"));
        assert!(text.contains("IVA: $35.20"));
        assert!(text.contains("TOTAL: $255.20"));
        assert!(text.contains("Pago: Efectivo"));
        assert!(text.contains("Cambio: $44.80"));
        assert!(text.contains("¡Gracias por su preferencia!"));
        assert!(!text.contains("Descuento"));
    }

    #[test]
    fn test_toggles_hide_sections() {
        let mut template = TicketTemplate::default();
        template.content.show_modifiers = false;
        template.content.show_special_instructions = false;
        template.content.show_waiter = false;
        template.footer.thank_you_message.clear();

        let text = render_text(&ticket(), &template);
        assert!(!text.contains("Extra queso"));
        assert!(!text.contains("Nota:"));
        assert!(!text.contains("Mesero"));
        assert!(!text.contains("Gracias"));
    }

    #[test]
    fn test_template_json_camel_case() {
        let json = serde_json::to_value(TicketTemplate::default()).unwrap();
        assert_eq!(json["header"]["businessName"], "RESTAURANTE POS");
        assert_eq!(json["content"]["showTicketNumber"], true);

        let partial: TicketTemplate =
            serde_json::from_str(r#"{"header":{"businessName":"La Cantina"}}"#).unwrap();
        assert_eq!(partial.header.business_name, "La Cantina");
        assert!(partial.content.show_date);
    }
}
