use once_cell::sync::Lazy;
use prometheus::{register_int_counter, register_int_gauge, Encoder, IntCounter, IntGauge, TextEncoder};

// Prometheus metrics (default registry)
pub static BOOKINGS_ADMITTED_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!("officedesk_bookings_admitted_total", "Bookings admitted by the admission core")
        .expect("register bookings_admitted_total")
});

pub static BOOKING_CONFLICTS_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "officedesk_booking_conflicts_total",
        "Admissions and reschedules rejected for overlapping an active booking"
    )
    .expect("register booking_conflicts_total")
});

pub static LEAVE_DAY_REPLACEMENTS_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!("officedesk_leave_day_replacements_total", "Committed leave day-set edits")
        .expect("register leave_day_replacements_total")
});

pub static JWKS_REFRESH_FAILURES_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!("officedesk_jwks_refresh_failures_total", "Failed key-set refresh attempts")
        .expect("register jwks_refresh_failures_total")
});

pub static DB_POOL_SWAPS: Lazy<IntGauge> = Lazy::new(|| {
    register_int_gauge!("officedesk_db_pool_swaps", "Database pools swapped in by the liveness probe")
        .expect("register db_pool_swaps")
});

/// Render the default registry in the text exposition format.
pub fn encode_metrics() -> Result<String, prometheus::Error> {
    let encoder = TextEncoder::new();
    let mut buffer = Vec::new();
    encoder.encode(&prometheus::gather(), &mut buffer)?;
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_show_up_in_exposition() {
        BOOKING_CONFLICTS_TOTAL.inc();
        DB_POOL_SWAPS.set(2);
        let text = encode_metrics().unwrap();
        assert!(text.contains("officedesk_booking_conflicts_total"));
        assert!(text.contains("officedesk_db_pool_swaps 2"));
    }
}
