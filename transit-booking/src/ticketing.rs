use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;
use transit_shared::models::Booking;

/// Proof-of-travel minted when a booking is paid
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ticket {
    pub number: String,
    pub qr_code: String,
}

/// Mints ticket numbers and their QR payloads.
///
/// Numbers combine a millisecond timestamp with a process-wide sequence, so
/// confirmations landing in the same millisecond still get distinct tickets.
#[derive(Debug, Default)]
pub struct TicketIssuer {
    sequence: AtomicU64,
}

impl TicketIssuer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue a ticket for `booking`
    pub fn issue(&self, booking: &Booking) -> Ticket {
        let number = self.next_number();
        let qr_code = Self::qr_payload(&number, booking);
        Ticket { number, qr_code }
    }

    /// Generate a unique ticket number
    fn next_number(&self) -> String {
        // Format: TKT-{millis base36}-{sequence base36}
        let millis = Utc::now().timestamp_millis().max(0) as u64;
        let seq = self.sequence.fetch_add(1, Ordering::Relaxed);
        format!("TKT-{}-{:0>4}", to_base36(millis), to_base36(seq))
    }

    /// QR content for a ticket. Deterministic in the ticket number and the
    /// booking it was issued for.
    pub fn qr_payload(ticket_number: &str, booking: &Booking) -> String {
        serde_json::json!({
            "ticket": ticket_number,
            "booking_id": booking.id,
            "route_id": booking.route_id,
            "departure_date": booking.departure_date,
            "seats": booking.seat_numbers,
        })
        .to_string()
    }
}

fn to_base36(mut value: u64) -> String {
    const DIGITS: &[u8; 36] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";
    if value == 0 {
        return "0".to_string();
    }
    let mut out = Vec::new();
    while value > 0 {
        out.push(DIGITS[(value % 36) as usize]);
        value /= 36;
    }
    out.reverse();
    String::from_utf8_lossy(&out).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use transit_shared::models::{PassengerDetail, Route};

    fn booking() -> Booking {
        let route = Route::new("DSM-MWZ-001", "Dar es Salaam", "Mwanza", 45000, "TZS", 22);
        Booking::new(
            "BK-7".to_string(),
            "REF-7".to_string(),
            &route,
            "2025-02-10".to_string(),
            vec!["3C".to_string()],
            "user-7".to_string(),
            vec![PassengerDetail::new("Baraka", "+255722000000")],
        )
    }

    #[test]
    fn test_base36() {
        assert_eq!(to_base36(0), "0");
        assert_eq!(to_base36(35), "Z");
        assert_eq!(to_base36(36), "10");
        assert_eq!(to_base36(1_295), "ZZ");
    }

    #[test]
    fn test_ticket_generation() {
        let issuer = TicketIssuer::new();
        let ticket = issuer.issue(&booking());

        assert!(ticket.number.starts_with("TKT-"));
        assert!(!ticket.qr_code.is_empty());

        let qr: serde_json::Value = serde_json::from_str(&ticket.qr_code).unwrap();
        assert_eq!(qr["ticket"], ticket.number.as_str());
        assert_eq!(qr["booking_id"], "BK-7");
    }

    #[test]
    fn test_qr_payload_is_deterministic() {
        let booking = booking();
        assert_eq!(
            TicketIssuer::qr_payload("TKT-A", &booking),
            TicketIssuer::qr_payload("TKT-A", &booking)
        );
        assert_ne!(
            TicketIssuer::qr_payload("TKT-A", &booking),
            TicketIssuer::qr_payload("TKT-B", &booking)
        );
    }

    #[test]
    fn test_rapid_issuance_never_repeats() {
        let issuer = TicketIssuer::new();
        let booking = booking();

        let numbers: HashSet<String> = std::thread::scope(|s| {
            let handles: Vec<_> = (0..8)
                .map(|_| s.spawn(|| (0..250).map(|_| issuer.issue(&booking).number).collect::<Vec<_>>()))
                .collect();
            handles.into_iter().flat_map(|h| h.join().unwrap()).collect()
        });

        assert_eq!(numbers.len(), 2000);
    }
}
