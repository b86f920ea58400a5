//! HTML invoice renderer
//!
//! Every dynamic value is interpolated through [`esc`] (or a formatter
//! that only emits digits); nothing caller-controlled reaches the markup
//! raw.

use chrono::NaiveDateTime;
use rust_decimal::Decimal;

use super::{capitalize, payment_method_name, Invoice};

const STYLE: &str = "\
        body { font-family: Arial, sans-serif; margin: 0; padding: 20px; color: #333; }
        .invoice-container { max-width: 800px; margin: 0 auto; background: white; }
        .invoice-header { text-align: center; border-bottom: 2px solid #3498db; padding-bottom: 20px; margin-bottom: 30px; }
        .shop-logo { font-size: 2rem; color: #3498db; margin-bottom: 10px; }
        .shop-name { font-size: 2rem; font-weight: bold; color: #2c3e50; margin: 0; }
        .shop-tagline { color: #7f8c8d; margin: 5px 0; }
        .invoice-title { font-size: 1.5rem; color: #e74c3c; margin: 20px 0 10px 0; }
        .invoice-details { display: grid; grid-template-columns: 1fr 1fr; gap: 30px; margin-bottom: 30px; }
        .detail-section h3 { color: #2c3e50; border-bottom: 1px solid #ecf0f1; padding-bottom: 5px; }
        .detail-section p { margin: 5px 0; line-height: 1.4; }
        .items-table { width: 100%; border-collapse: collapse; margin: 20px 0; }
        .items-table th, .items-table td { padding: 12px; text-align: left; border-bottom: 1px solid #ecf0f1; }
        .items-table th { background: #f8f9fa; font-weight: bold; color: #2c3e50; }
        .items-table .text-right { text-align: right; }
        .totals-section { background: #f8f9fa; padding: 20px; border-radius: 5px; margin-top: 20px; }
        .total-row { display: flex; justify-content: space-between; margin: 5px 0; }
        .total-row.grand-total { font-weight: bold; font-size: 1.2rem; color: #2c3e50; border-top: 2px solid #dee2e6; padding-top: 10px; margin-top: 10px; }
        .footer { text-align: center; margin-top: 40px; padding-top: 20px; border-top: 1px solid #ecf0f1; color: #7f8c8d; }
        @media print { body { margin: 0; } .no-print { display: none; } }";

/// The escaping chokepoint.
fn esc(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#039;"),
            _ => out.push(c),
        }
    }
    out
}

fn money(amount: Decimal) -> String {
    format!("${:.2}", amount)
}

/// `2026-03-01 09:30:05` into `March 1, 2026`; unparseable input passes
/// through escaped.
fn long_date(value: &str) -> String {
    match NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S") {
        Ok(parsed) => parsed.format("%B %-d, %Y").to_string(),
        Err(_) => esc(value),
    }
}

pub fn render(invoice: &Invoice) -> String {
    let shop = &invoice.shop;
    let customer = &invoice.customer;
    let totals = &invoice.totals;

    let mut html = String::with_capacity(6 * 1024);
    html.push_str(&format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n    <meta charset=\"UTF-8\">\n    \
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n    \
         <title>Invoice - {}</title>\n    <style>\n{}\n    </style>\n</head>\n<body>\n",
        esc(&invoice.invoice_number),
        STYLE
    ));

    html.push_str(&format!(
        "<div class=\"invoice-container\">\n\
         <div class=\"invoice-header\">\n\
         <div class=\"shop-logo\">{}</div>\n\
         <h1 class=\"shop-name\">{}</h1>\n\
         <p class=\"shop-tagline\">{}</p>\n\
         <h2 class=\"invoice-title\">INVOICE</h2>\n\
         </div>\n",
        esc(shop.logo),
        esc(shop.name),
        esc(shop.tagline)
    ));

    html.push_str("<div class=\"invoice-details\">\n<div class=\"detail-section\">\n<h3>Invoice Details</h3>\n");
    html.push_str(&format!(
        "<p><strong>Invoice Number:</strong> {}</p>\n\
         <p><strong>Order Number:</strong> {}</p>\n\
         <p><strong>Order Date:</strong> {}</p>\n\
         <p><strong>Invoice Date:</strong> {}</p>\n\
         <p><strong>Payment Method:</strong> {}</p>\n\
         <p><strong>Status:</strong> {}</p>\n\
         </div>\n",
        esc(&invoice.invoice_number),
        esc(&invoice.order_number),
        long_date(&invoice.order_date),
        long_date(&invoice.invoice_date),
        esc(&payment_method_name(&invoice.payment_method)),
        esc(&capitalize(&invoice.status))
    ));

    html.push_str(&format!(
        "<div class=\"detail-section\">\n<h3>Customer Information</h3>\n\
         <p><strong>{}</strong></p>\n\
         <p>{}</p>\n\
         <p>Phone: {}</p>\n\
         <p>Email: {}</p>\n\
         </div>\n</div>\n",
        esc(customer.name.as_deref().unwrap_or("")),
        esc(&customer.shipping_address),
        esc(customer.phone.as_deref().unwrap_or("")),
        esc(customer.email.as_deref().unwrap_or(""))
    ));

    html.push_str(
        "<table class=\"items-table\">\n<thead>\n<tr>\n\
         <th>Item Name</th>\n\
         <th class=\"text-right\">Quantity</th>\n\
         <th class=\"text-right\">Price per Item</th>\n\
         <th class=\"text-right\">Total per Item</th>\n\
         </tr>\n</thead>\n<tbody>\n",
    );
    for item in &invoice.items {
        html.push_str(&format!(
            "<tr>\n<td>{}</td>\n\
             <td class=\"text-right\">{}</td>\n\
             <td class=\"text-right\">{}</td>\n\
             <td class=\"text-right\">{}</td>\n</tr>\n",
            esc(&item.name),
            item.quantity,
            money(item.unit_price),
            money(item.total_price)
        ));
    }
    html.push_str("</tbody>\n</table>\n");

    let shipping = if totals.shipping_cost > Decimal::ZERO {
        money(totals.shipping_cost)
    } else {
        "Free".to_string()
    };
    html.push_str(&format!(
        "<div class=\"totals-section\">\n\
         <div class=\"total-row\"><span>Subtotal:</span><span>{}</span></div>\n\
         <div class=\"total-row\"><span>Tax:</span><span>{}</span></div>\n\
         <div class=\"total-row\"><span>Shipping:</span><span>{}</span></div>\n\
         <div class=\"total-row grand-total\"><span>Grand Total:</span><span>{}</span></div>\n\
         </div>\n",
        money(totals.subtotal),
        money(totals.tax_amount),
        shipping,
        money(totals.total_amount)
    ));

    html.push_str(&format!(
        "<div class=\"footer\">\n\
         <p><strong>Thank you for shopping with {}!</strong></p>\n\
         <p>For any questions about your order, please contact our customer service.</p>\n\
         <p>Email: {} | Phone: {}</p>\n\
         <p>Visit us at: {}</p>\n\
         </div>\n</div>\n</body>\n</html>",
        esc(shop.name),
        esc(shop.email),
        esc(shop.phone),
        esc(shop.website)
    ));

    html
}

#[cfg(test)]
mod tests {
    use super::super::{Customer, InvoiceItem, InvoiceTotals, SHOP};
    use super::*;

    fn invoice_with_item(name: &str) -> Invoice {
        let unit = Decimal::new(299, 2);
        Invoice {
            invoice_number: "INV-20260301093005-a1b2c3".to_string(),
            order_number: "SV-20260301093005-a1b2c3".to_string(),
            order_date: "2026-03-01 09:30:05".to_string(),
            invoice_date: "2026-03-02 10:00:00".to_string(),
            status: "pending".to_string(),
            payment_method: "cod".to_string(),
            shop: SHOP,
            customer: Customer {
                name: Some("Ada".to_string()),
                email: Some("ada@example.com".to_string()),
                phone: None,
                shipping_address: "12 Main St".to_string(),
            },
            items: vec![InvoiceItem {
                name: name.to_string(),
                image: String::new(),
                quantity: 2,
                unit_price: unit,
                total_price: unit * Decimal::from(2),
            }],
            totals: InvoiceTotals {
                subtotal: Decimal::new(598, 2),
                tax_amount: Decimal::ZERO,
                shipping_cost: Decimal::ZERO,
                total_amount: Decimal::new(598, 2),
            },
        }
    }

    #[test]
    fn test_esc() {
        assert_eq!(esc("<script>"), "&lt;script&gt;");
        assert_eq!(esc("a & b"), "a &amp; b");
        assert_eq!(esc("\"x\" 'y'"), "&quot;x&quot; &#039;y&#039;");
        assert_eq!(esc("plain"), "plain");
    }

    #[test]
    fn test_money_format() {
        assert_eq!(money(Decimal::new(299, 2)), "$2.99");
        assert_eq!(money(Decimal::new(94, 1)), "$9.40");
        assert_eq!(money(Decimal::from(5)), "$5.00");
    }

    #[test]
    fn test_long_date() {
        assert_eq!(long_date("2026-03-01 09:30:05"), "March 1, 2026");
        assert_eq!(long_date("not a date"), "not a date");
    }

    #[test]
    fn test_hostile_product_name_is_inert() {
        let html = render(&invoice_with_item("<script>alert(1)</script>"));
        assert!(!html.contains("<script>alert(1)</script>"));
        assert!(html.contains("&lt;script&gt;alert(1)&lt;/script&gt;"));
    }

    #[test]
    fn test_document_content() {
        let html = render(&invoice_with_item("Fresh Bananas"));
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<title>Invoice - INV-20260301093005-a1b2c3</title>"));
        assert!(html.contains("Cash on Delivery"));
        assert!(html.contains("<span>Free</span>"));
        assert!(html.contains("$5.98"));
        assert!(html.contains("March 1, 2026"));
        assert!(html.contains("Thank you for shopping with Supershop!"));
    }
}
