//! Render a draft order back into the structured template layout, for the
//! operator's confirmation message. The output is itself a valid V2 message:
//! re-parsing a summary yields the same items and fields.

use super::types::{DeliveryFeeSource, DraftOrder};

fn field(out: &mut String, label: &str, value: &str) {
    out.push_str(label);
    out.push_str(": ");
    out.push_str(if value.trim().is_empty() { "-" } else { value });
    out.push('\n');
}

/// Format a draft order as the structured template.
pub fn format_order_summary(draft: &DraftOrder) -> String {
    let mut out = String::new();

    field(&mut out, "Nama Pemesan", &draft.customer_name);
    field(&mut out, "Nama Penerima", &draft.receiver_name);
    field(&mut out, "No HP", &draft.phone_number);
    // Multi-line addresses stay multi-line; the parser re-collects them.
    field(&mut out, "Alamat Pengiriman", &draft.address);
    field(&mut out, "Nama Event", &draft.event_name);
    field(&mut out, "Durasi Event", &draft.event_duration);
    field(&mut out, "Tanggal Event", &draft.event_date);
    field(&mut out, "Jam Pengiriman", &draft.delivery_time);

    out.push_str("Detail Pesanan:\n");
    for item in &draft.items {
        out.push_str(&format!("\u{2022} {} x {}\n", item.quantity, item.name));
    }

    field(&mut out, "Metode Pengiriman", &draft.delivery_method);
    match draft.delivery_fee_source {
        DeliveryFeeSource::UserInput => {
            field(&mut out, "Ongkir", &format_rupiah(draft.delivery_fee));
        }
        DeliveryFeeSource::UserEmpty | DeliveryFeeSource::NotProvided => {
            field(&mut out, "Ongkir", "-");
        }
    }

    if !draft.notes.is_empty() {
        out.push_str("Catatan:\n");
        for note in &draft.notes {
            out.push_str("- ");
            out.push_str(note);
            out.push('\n');
        }
    }

    out
}

/// Format an amount with Indonesian thousands separators, "Rp 50.000" style.
pub fn format_rupiah(amount: i64) -> String {
    let digits = amount.abs().to_string();
    let mut grouped = String::new();
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(c);
    }
    let sign = if amount < 0 { "-" } else { "" };
    format!("Rp {sign}{grouped}")
}
