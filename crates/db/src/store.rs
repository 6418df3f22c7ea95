//! [`PgStore`]: the PostgreSQL implementation of the core store ports.

use async_trait::async_trait;
use chrono::NaiveDate;
use salon_core::appointment::{
    Appointment, AppointmentDetails, AppointmentDraft, CustomerRef, ServiceItem,
};
use salon_core::capacity::Stylist;
use salon_core::dashboard::{HistoryRow, TimeWindow};
use salon_core::ports::{
    AccountStore, AppointmentStore, AuditLog, CatalogStore, HistoryQueries, RewardBalance,
    StoreError, WaitlistMatch, WaitlistStore,
};
use salon_core::status::AppointmentStatus;
use salon_core::types::{DbId, WallTime};
use sqlx::PgPool;

use crate::error::store_error;
use crate::models::appointment::AppointmentDetailsRow;
use crate::models::dashboard::HistoryRecord;
use crate::repositories::{
    AppointmentRepo, AuditRepo, HistoryRepo, ServiceRepo, StylistRepo, UserRepo, WaitlistRepo,
};

/// Store ports backed by a connection pool. Cheap to clone.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

fn corrupt(err: impl std::fmt::Display) -> StoreError {
    StoreError::Backend(format!("Corrupt row: {err}"))
}

pub fn decode_details(row: AppointmentDetailsRow) -> Result<AppointmentDetails, StoreError> {
    AppointmentDetails::try_from(row).map_err(corrupt)
}

fn decode_all(rows: Vec<AppointmentDetailsRow>) -> Result<Vec<AppointmentDetails>, StoreError> {
    rows.into_iter().map(decode_details).collect()
}

pub fn decode_history(record: HistoryRecord) -> Result<HistoryRow, StoreError> {
    Ok(HistoryRow {
        appointment_id: record.appointment_id,
        status: record.status.parse().map_err(corrupt)?,
        changed_at: record.changed_at,
        appointment_date: record.appointment_date,
        amount: record.amount,
        service_name: record.service_name,
        customer_name: record.customer_name,
    })
}

#[async_trait]
impl AppointmentStore for PgStore {
    async fn find_details(&self, id: DbId) -> Result<Option<AppointmentDetails>, StoreError> {
        AppointmentRepo::find_details(&self.pool, id)
            .await
            .map_err(store_error)?
            .map(decode_details)
            .transpose()
    }

    async fn exists_booked_at(&self, at: WallTime) -> Result<bool, StoreError> {
        AppointmentRepo::exists_booked_at(&self.pool, at)
            .await
            .map_err(store_error)
    }

    async fn has_overlap(
        &self,
        stylist_id: DbId,
        start: WallTime,
        end: WallTime,
    ) -> Result<bool, StoreError> {
        AppointmentRepo::has_overlap(&self.pool, stylist_id, start, end)
            .await
            .map_err(store_error)
    }

    async fn insert_booked(&self, draft: &AppointmentDraft) -> Result<Appointment, StoreError> {
        let row = AppointmentRepo::insert_booked(&self.pool, draft)
            .await
            .map_err(store_error)?
            .ok_or_else(|| StoreError::Conflict("Stylist is already booked at this time".into()))?;
        Appointment::try_from(row).map_err(corrupt)
    }

    async fn save(&self, appointment: &Appointment) -> Result<(), StoreError> {
        let found = AppointmentRepo::save(&self.pool, appointment)
            .await
            .map_err(store_error)?;
        if found {
            Ok(())
        } else {
            Err(StoreError::Backend(format!(
                "Appointment {} vanished during update",
                appointment.id
            )))
        }
    }

    async fn list_between(
        &self,
        start: WallTime,
        end: WallTime,
    ) -> Result<Vec<AppointmentDetails>, StoreError> {
        decode_all(
            AppointmentRepo::list_between(&self.pool, start, end)
                .await
                .map_err(store_error)?,
        )
    }

    async fn reminder_candidates(
        &self,
        now: WallTime,
    ) -> Result<Vec<AppointmentDetails>, StoreError> {
        decode_all(
            AppointmentRepo::reminder_candidates(&self.pool, now)
                .await
                .map_err(store_error)?,
        )
    }
}

#[async_trait]
impl CatalogStore for PgStore {
    async fn find_service(&self, id: DbId) -> Result<Option<ServiceItem>, StoreError> {
        Ok(ServiceRepo::find_by_id(&self.pool, id)
            .await
            .map_err(store_error)?
            .map(Into::into))
    }

    async fn find_stylist(&self, id: DbId) -> Result<Option<Stylist>, StoreError> {
        Ok(StylistRepo::find_by_id(&self.pool, id)
            .await
            .map_err(store_error)?
            .map(Into::into))
    }

    async fn list_stylists(&self) -> Result<Vec<Stylist>, StoreError> {
        Ok(StylistRepo::list(&self.pool)
            .await
            .map_err(store_error)?
            .into_iter()
            .map(Into::into)
            .collect())
    }
}

#[async_trait]
impl AccountStore for PgStore {
    async fn find_customer(&self, id: DbId) -> Result<Option<CustomerRef>, StoreError> {
        Ok(UserRepo::find_by_id(&self.pool, id)
            .await
            .map_err(store_error)?
            .as_ref()
            .map(CustomerRef::from))
    }

    async fn credit_rewards(
        &self,
        user_id: DbId,
        cashback: f64,
        points: i32,
    ) -> Result<RewardBalance, StoreError> {
        let (wallet_balance, loyalty_points) =
            UserRepo::credit_rewards(&self.pool, user_id, cashback, points)
                .await
                .map_err(store_error)?
                .ok_or_else(|| StoreError::Backend(format!("User {user_id} not found")))?;
        Ok(RewardBalance {
            wallet_balance,
            loyalty_points,
        })
    }
}

#[async_trait]
impl WaitlistStore for PgStore {
    async fn pending_for_slot(
        &self,
        stylist_id: DbId,
        day: NaiveDate,
        time_key: &str,
    ) -> Result<Vec<WaitlistMatch>, StoreError> {
        let rows = WaitlistRepo::pending_for_slot(&self.pool, stylist_id, day, time_key)
            .await
            .map_err(store_error)?;
        Ok(rows
            .into_iter()
            .map(|row| WaitlistMatch {
                entry_id: row.id,
                customer: CustomerRef {
                    id: row.user_id,
                    name: row.customer_name,
                    email: row.customer_email,
                },
                preferred_time: row.preferred_time,
            })
            .collect())
    }

    async fn mark_notified(&self, entry_id: DbId) -> Result<(), StoreError> {
        WaitlistRepo::mark_notified(&self.pool, entry_id)
            .await
            .map_err(store_error)
    }
}

#[async_trait]
impl AuditLog for PgStore {
    async fn append_history(
        &self,
        appointment_id: DbId,
        status: AppointmentStatus,
        changed_at: WallTime,
    ) -> Result<(), StoreError> {
        AuditRepo::append_history(&self.pool, appointment_id, status.as_str(), changed_at)
            .await
            .map(|_| ())
            .map_err(store_error)
    }

    async fn append_timeline(
        &self,
        appointment_id: DbId,
        status: AppointmentStatus,
        at: WallTime,
    ) -> Result<(), StoreError> {
        AuditRepo::append_timeline(&self.pool, appointment_id, status.as_str(), at)
            .await
            .map(|_| ())
            .map_err(store_error)
    }
}

#[async_trait]
impl HistoryQueries for PgStore {
    async fn count_with_status(
        &self,
        status: AppointmentStatus,
        window: &TimeWindow,
    ) -> Result<i64, StoreError> {
        HistoryRepo::count_with_status(&self.pool, status.as_str(), window.start, window.end)
            .await
            .map_err(store_error)
    }

    async fn completed_revenue(&self, window: &TimeWindow) -> Result<Option<f64>, StoreError> {
        HistoryRepo::completed_revenue(&self.pool, window.start, window.end)
            .await
            .map_err(store_error)
    }

    async fn top_service(
        &self,
        status: AppointmentStatus,
        window: &TimeWindow,
    ) -> Result<Option<String>, StoreError> {
        HistoryRepo::top_service(&self.pool, status.as_str(), window.start, window.end)
            .await
            .map_err(store_error)
    }

    async fn top_customer(
        &self,
        status: AppointmentStatus,
        window: &TimeWindow,
    ) -> Result<Option<String>, StoreError> {
        HistoryRepo::top_customer(&self.pool, status.as_str(), window.start, window.end)
            .await
            .map_err(store_error)
    }

    async fn rows_with_statuses(
        &self,
        statuses: &[AppointmentStatus],
        window: &TimeWindow,
    ) -> Result<Vec<HistoryRow>, StoreError> {
        let names: Vec<String> = statuses.iter().map(|s| s.as_str().to_string()).collect();
        HistoryRepo::rows_with_statuses(&self.pool, &names, window.start, window.end)
            .await
            .map_err(store_error)?
            .into_iter()
            .map(decode_history)
            .collect()
    }
}
