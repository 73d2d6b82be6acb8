use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi, ToSchema};
use uuid::Uuid;

#[derive(ToSchema)]
pub struct HealthResponse { pub status: String }

#[derive(ToSchema)]
#[schema(rename_all = "camelCase")]
pub struct UserDoc {
    pub id: Uuid,
    pub email: String,
    /// `user` or `admin`
    pub role: String,
    pub sick_allowance: i32,
    pub annual_allowance: i32,
    pub casual_allowance: i32,
    pub department: Option<String>,
    pub avatar: Option<String>,
    pub created_at: String,
}

#[derive(ToSchema)]
pub struct RoleDoc { pub role: String }

#[derive(ToSchema)]
pub struct AllowancesDoc { pub annual: i32, pub sick: i32, pub casual: i32 }

#[derive(ToSchema)]
pub struct HolidayDoc { pub id: Uuid, pub date: String, pub name: String }

#[derive(ToSchema)]
pub struct HolidayInputDoc { pub date: String, pub name: String }

#[derive(ToSchema)]
#[schema(rename_all = "camelCase")]
pub struct LeaveDayDoc {
    pub id: Uuid,
    pub leave_id: Uuid,
    pub date: String,
    pub is_half_day: bool,
    /// `morning` or `evening`
    pub half_day_period: Option<String>,
}

#[derive(ToSchema)]
#[schema(rename_all = "camelCase")]
pub struct LeaveDoc {
    pub id: Uuid,
    pub user_id: Uuid,
    /// Present on admin listings.
    pub user_email: Option<String>,
    #[schema(rename = "type")]
    pub kind: String,
    pub start_date: String,
    pub end_date: String,
    pub reason: String,
    pub status: String,
    pub approver_comment: Option<String>,
    pub created_at: String,
    pub total_leave_days: f64,
    pub days: Vec<LeaveDayDoc>,
}

#[derive(ToSchema)]
#[schema(rename_all = "camelCase")]
pub struct CreateLeaveDoc {
    /// `sick`, `annual` or `casual`
    #[schema(rename = "type")]
    pub kind: String,
    pub start_date: String,
    pub end_date: String,
    pub reason: Option<String>,
    pub is_half_day: Option<bool>,
    pub half_day_period: Option<String>,
}

#[derive(ToSchema)]
#[schema(rename_all = "camelCase")]
pub struct EditLeaveDoc {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub is_half_day: Option<bool>,
    pub half_day_period: Option<String>,
}

#[derive(ToSchema)]
#[schema(rename_all = "camelCase")]
pub struct LeaveStatusDoc {
    /// `approved`, `rejected` or `pending`
    pub status: String,
    pub approver_comment: Option<String>,
}

#[derive(ToSchema)]
#[schema(rename_all = "camelCase")]
pub struct ResourceDoc {
    pub id: Uuid,
    pub name: String,
    #[schema(rename = "type")]
    pub kind: String,
    pub description: Option<String>,
    pub is_active: bool,
    pub min_lead_time_hours: i32,
    pub icon: Option<String>,
    pub color: Option<String>,
    #[schema(value_type = Option<Object>)]
    pub specs: Option<serde_json::Value>,
    #[schema(value_type = Option<Object>)]
    pub form_fields: Option<serde_json::Value>,
    pub created_at: String,
}

#[derive(ToSchema)]
#[schema(rename_all = "camelCase")]
pub struct ResourceInputDoc {
    pub name: String,
    #[schema(rename = "type")]
    pub kind: Option<String>,
    pub description: Option<String>,
    pub is_active: Option<bool>,
    pub min_lead_time_hours: Option<i32>,
    pub icon: Option<String>,
    pub color: Option<String>,
    #[schema(value_type = Option<Object>)]
    pub specs: Option<serde_json::Value>,
    #[schema(value_type = Option<Object>)]
    pub form_fields: Option<serde_json::Value>,
}

#[derive(ToSchema)]
#[schema(rename_all = "camelCase")]
pub struct BookingDoc {
    pub id: Uuid,
    pub resource_id: Uuid,
    pub user_id: Uuid,
    pub start: String,
    pub end: String,
    pub status: String,
    pub created_at: String,
    pub rejection_reason: Option<String>,
    #[schema(value_type = Option<Object>)]
    pub details: Option<serde_json::Value>,
}

#[derive(ToSchema)]
#[schema(rename_all = "camelCase")]
pub struct CreateBookingDoc {
    pub resource_id: Uuid,
    /// RFC3339
    pub start: String,
    /// RFC3339, after `start`
    pub end: String,
    #[schema(value_type = Option<Object>)]
    pub details: Option<serde_json::Value>,
}

#[derive(ToSchema)]
pub struct RescheduleDoc { pub start: String, pub end: String }

#[derive(ToSchema)]
#[schema(rename_all = "camelCase")]
pub struct ProcessDoc {
    /// `confirmed`, `rejected`, `completed`, `checked_in` or `cancelled`
    pub status: String,
    pub rejection_reason: Option<String>,
}

#[derive(ToSchema)]
#[schema(rename_all = "camelCase")]
pub struct ResourceUsageDoc {
    pub resource_id: Uuid,
    pub resource_name: String,
    pub resource_type: String,
    pub booking_count: i64,
    pub total_hours: i64,
    pub utilization_rate: i64,
}

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                SecurityScheme::Http(HttpBuilder::new().scheme(HttpAuthScheme::Bearer).bearer_format("JWT").build()),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health,
        crate::routes::metrics,
        crate::routes::users::me,
        crate::routes::users::list,
        crate::routes::users::set_role,
        crate::routes::users::set_allowances,
        crate::routes::holidays::list,
        crate::routes::holidays::upsert,
        crate::routes::holidays::remove,
        crate::routes::leaves::create,
        crate::routes::leaves::list,
        crate::routes::leaves::get,
        crate::routes::leaves::days,
        crate::routes::leaves::edit,
        crate::routes::leaves::set_status,
        crate::routes::leaves::delete,
        crate::routes::resources::list,
        crate::routes::resources::create,
        crate::routes::resources::update,
        crate::routes::resources::delete,
        crate::routes::bookings::create,
        crate::routes::bookings::list,
        crate::routes::bookings::reschedule,
        crate::routes::bookings::process,
        crate::routes::bookings::cancel,
        crate::routes::bookings::stats,
    ),
    components(
        schemas(
            HealthResponse,
            UserDoc,
            RoleDoc,
            AllowancesDoc,
            HolidayDoc,
            HolidayInputDoc,
            LeaveDayDoc,
            LeaveDoc,
            CreateLeaveDoc,
            EditLeaveDoc,
            LeaveStatusDoc,
            ResourceDoc,
            ResourceInputDoc,
            BookingDoc,
            CreateBookingDoc,
            RescheduleDoc,
            ProcessDoc,
            ResourceUsageDoc,
        )
    ),
    modifiers(&BearerAuth),
    tags(
        (name = "health"),
        (name = "users"),
        (name = "holidays"),
        (name = "leaves"),
        (name = "resources"),
        (name = "bookings")
    )
)]
pub struct ApiDoc;
