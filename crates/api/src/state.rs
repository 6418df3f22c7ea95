use std::sync::Arc;

use salon_core::booking::BookingService;
use salon_core::capacity::ScheduleService;
use salon_core::dashboard::DashboardAggregator;
use salon_core::lifecycle::{Lifecycle, LifecyclePorts};
use salon_core::ports::{Clock, Notifier, PaymentProvider};
use salon_core::reminders::ReminderSweep;
use salon_core::waitlist::WaitlistRelease;
use salon_db::PgStore;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheap to clone; the engines sit behind `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub pool: salon_db::DbPool,
    pub config: Arc<ServerConfig>,
    pub booking: Arc<BookingService>,
    pub lifecycle: Arc<Lifecycle>,
    pub schedule: Arc<ScheduleService>,
    pub dashboard: Arc<DashboardAggregator>,
    pub payments: Arc<dyn PaymentProvider>,
    pub reminders: Arc<ReminderSweep>,
}

impl AppState {
    /// Wire every engine onto one PostgreSQL store.
    pub fn new(
        pool: salon_db::DbPool,
        config: ServerConfig,
        payments: Arc<dyn PaymentProvider>,
        notifier: Arc<dyn Notifier>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let store = Arc::new(PgStore::new(pool.clone()));

        let booking = BookingService::new(store.clone(), store.clone(), store.clone(), config.booking);
        let waitlist = Arc::new(WaitlistRelease::new(store.clone(), notifier.clone()));
        let lifecycle = Lifecycle::new(
            LifecyclePorts {
                appointments: store.clone(),
                accounts: store.clone(),
                audit: store.clone(),
                payments: payments.clone(),
                notifier: notifier.clone(),
                waitlist,
                clock: clock.clone(),
            },
            config.record_history,
        );
        let schedule = ScheduleService::new(store.clone(), store.clone(), clock.clone());
        let dashboard = DashboardAggregator::new(store.clone(), clock.clone());
        let reminders = ReminderSweep::new(store, notifier, clock);

        Self {
            pool,
            config: Arc::new(config),
            booking: Arc::new(booking),
            lifecycle: Arc::new(lifecycle),
            schedule: Arc::new(schedule),
            dashboard: Arc::new(dashboard),
            payments,
            reminders: Arc::new(reminders),
        }
    }
}
