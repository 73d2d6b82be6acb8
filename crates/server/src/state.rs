use std::sync::Arc;

use models::pool::DbPool;
use service::booking::repo::seaorm::SeaOrmBookingRepository;
use service::booking::BookingService;
use service::holidays::{seaorm::SeaOrmHolidayRepository, HolidayService};
use service::identity::{IdentityService, KeySet};
use service::leave::repo::seaorm::SeaOrmLeaveRepository;
use service::leave::LeaveService;
use service::resources::{seaorm::SeaOrmResourceRepository, ResourceService};
use service::users::{seaorm::SeaOrmUserRepository, UserService};

/// Shared handler state. Every service reads the current pool per operation.
#[derive(Clone)]
pub struct AppState {
    pub pool: Arc<DbPool>,
    pub identity: Arc<IdentityService<SeaOrmUserRepository>>,
    pub users: Arc<UserService<SeaOrmUserRepository>>,
    pub holidays: Arc<HolidayService<SeaOrmHolidayRepository>>,
    pub leaves: Arc<LeaveService<SeaOrmLeaveRepository>>,
    pub bookings: Arc<BookingService<SeaOrmBookingRepository>>,
    pub resources: Arc<ResourceService<SeaOrmResourceRepository>>,
}

impl AppState {
    pub fn new(pool: Arc<DbPool>, keys: Arc<KeySet>) -> Self {
        let user_repo = Arc::new(SeaOrmUserRepository::new(Arc::clone(&pool)));
        AppState {
            identity: Arc::new(IdentityService::new(keys, Arc::clone(&user_repo))),
            users: Arc::new(UserService::new(user_repo)),
            holidays: Arc::new(HolidayService::new(Arc::new(SeaOrmHolidayRepository::new(Arc::clone(&pool))))),
            leaves: Arc::new(LeaveService::new(Arc::new(SeaOrmLeaveRepository::new(Arc::clone(&pool))))),
            bookings: Arc::new(BookingService::new(Arc::new(SeaOrmBookingRepository::new(Arc::clone(&pool))))),
            resources: Arc::new(ResourceService::new(Arc::new(SeaOrmResourceRepository::new(Arc::clone(&pool))))),
            pool,
        }
    }
}
