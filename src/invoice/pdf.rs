//! Minimal PDF invoice writer
//!
//! Emits a single-page document with four Helvetica text lines: a valid
//! object graph, a real xref table, and nothing else. Deliberately not a
//! general PDF renderer.

use super::Invoice;

/// Escape the characters with meaning inside a PDF literal string.
fn pdf_escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '(' => out.push_str("\\("),
            ')' => out.push_str("\\)"),
            _ => out.push(c),
        }
    }
    out
}

fn content_stream(invoice: &Invoice) -> String {
    let lines = [
        format!("Invoice: {}", invoice.invoice_number),
        format!("Order: {}", invoice.order_number),
        format!(
            "Customer: {}",
            invoice.customer.name.as_deref().unwrap_or("")
        ),
        format!("Total: ${:.2}", invoice.totals.total_amount),
    ];

    let mut stream = String::from("BT\n/F1 12 Tf\n100 700 Td\n");
    for (i, line) in lines.iter().enumerate() {
        if i > 0 {
            stream.push_str("0 -20 Td\n");
        }
        stream.push_str(&format!("({}) Tj\n", pdf_escape(line)));
    }
    stream.push_str("ET\n");
    stream
}

pub fn render(invoice: &Invoice) -> Vec<u8> {
    let stream = content_stream(invoice);
    let objects = [
        "<< /Type /Catalog /Pages 2 0 R >>".to_string(),
        "<< /Type /Pages /Kids [3 0 R] /Count 1 >>".to_string(),
        "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] \
         /Resources << /Font << /F1 5 0 R >> >> /Contents 4 0 R >>"
            .to_string(),
        format!("<< /Length {} >>\nstream\n{}endstream", stream.len(), stream),
        "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica >>".to_string(),
    ];

    // Offsets are byte positions, so the document is assembled in one
    // buffer and measured as it grows.
    let mut out = String::from("%PDF-1.4\n");
    let mut offsets = Vec::with_capacity(objects.len());
    for (i, body) in objects.iter().enumerate() {
        offsets.push(out.len());
        out.push_str(&format!("{} 0 obj\n{}\nendobj\n", i + 1, body));
    }

    let xref_offset = out.len();
    out.push_str(&format!("xref\n0 {}\n", objects.len() + 1));
    out.push_str("0000000000 65535 f \n");
    for offset in &offsets {
        out.push_str(&format!("{offset:010} 00000 n \n"));
    }
    out.push_str(&format!(
        "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{}\n%%EOF",
        objects.len() + 1,
        xref_offset
    ));

    out.into_bytes()
}

#[cfg(test)]
mod tests {
    use super::super::{Customer, InvoiceTotals, SHOP};
    use super::*;
    use rust_decimal::Decimal;

    fn invoice(customer_name: &str) -> Invoice {
        Invoice {
            invoice_number: "INV-20260301093005-a1b2c3".to_string(),
            order_number: "SV-20260301093005-a1b2c3".to_string(),
            order_date: "2026-03-01 09:30:05".to_string(),
            invoice_date: "2026-03-02 10:00:00".to_string(),
            status: "confirmed".to_string(),
            payment_method: "card".to_string(),
            shop: SHOP,
            customer: Customer {
                name: Some(customer_name.to_string()),
                email: None,
                phone: None,
                shipping_address: "12 Main St".to_string(),
            },
            items: vec![],
            totals: InvoiceTotals {
                subtotal: Decimal::new(947, 2),
                tax_amount: Decimal::ZERO,
                shipping_cost: Decimal::ZERO,
                total_amount: Decimal::new(947, 2),
            },
        }
    }

    #[test]
    fn test_document_framing() {
        let bytes = render(&invoice("Ada"));
        assert!(bytes.starts_with(b"%PDF-"));
        assert!(bytes.ends_with(b"%%EOF"));
        let text = String::from_utf8(bytes).unwrap();
        assert!(text.contains("(Invoice: INV-20260301093005-a1b2c3) Tj"));
        assert!(text.contains("(Total: $9.47) Tj"));
        assert!(text.contains("/BaseFont /Helvetica"));
    }

    #[test]
    fn test_parens_escaped() {
        let text = String::from_utf8(render(&invoice("Acme (Ltd)"))).unwrap();
        assert!(text.contains("(Customer: Acme \\(Ltd\\)) Tj"));
    }

    #[test]
    fn test_xref_offsets_are_real() {
        let text = String::from_utf8(render(&invoice("Ada"))).unwrap();

        let start = text.rfind("startxref\n").unwrap() + "startxref\n".len();
        let xref_offset: usize = text[start..].lines().next().unwrap().trim().parse().unwrap();
        assert!(text[xref_offset..].starts_with("xref\n0 6\n"));

        // Each in-use entry must point at its numbered object.
        for (entry, object) in text[xref_offset..].lines().skip(3).take(5).zip(1..) {
            let offset: usize = entry[..10].parse().unwrap();
            assert!(text[offset..].starts_with(&format!("{object} 0 obj")));
        }
    }

    #[test]
    fn test_stream_length_matches() {
        let text = String::from_utf8(render(&invoice("Ada"))).unwrap();
        let length: usize = text
            .split("/Length ")
            .nth(1)
            .unwrap()
            .split(' ')
            .next()
            .unwrap()
            .parse()
            .unwrap();
        let stream_start = text.find("stream\n").unwrap() + "stream\n".len();
        let stream_end = text.find("endstream").unwrap();
        assert_eq!(length, stream_end - stream_start);
    }
}
