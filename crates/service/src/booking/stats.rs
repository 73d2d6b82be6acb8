use std::collections::HashMap;

use serde::Serialize;
use uuid::Uuid;

/// Monthly hours a resource can be booked for.
pub const MONTHLY_CAPACITY_HOURS: f64 = 160.0;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceUsage {
    pub resource_id: Uuid,
    pub resource_name: String,
    pub resource_type: String,
    pub booking_count: usize,
    pub total_hours: i64,
    pub utilization_rate: i64,
}

/// Per-resource usage over `confirmed` bookings, in resource order.
///
/// Hours are whole hours (truncated); the rate is a truncated percentage of
/// [`MONTHLY_CAPACITY_HOURS`], capped at 100.
pub fn utilization(resources: &[models::resource::Model], confirmed: &[models::booking::Model]) -> Vec<ResourceUsage> {
    let mut per: HashMap<Uuid, (usize, i64)> = HashMap::new();
    for b in confirmed {
        let entry = per.entry(b.resource_id).or_default();
        entry.0 += 1;
        entry.1 += (b.end_time - b.start_time).num_milliseconds();
    }
    resources
        .iter()
        .map(|r| {
            let (count, ms) = per.get(&r.id).copied().unwrap_or_default();
            let total_hours = ms / 3_600_000;
            let rate = ((total_hours as f64 / MONTHLY_CAPACITY_HOURS) * 100.0) as i64;
            ResourceUsage {
                resource_id: r.id,
                resource_name: r.name.clone(),
                resource_type: r.resource_type.clone(),
                booking_count: count,
                total_hours,
                utilization_rate: rate.min(100),
            }
        })
        .collect()
}
