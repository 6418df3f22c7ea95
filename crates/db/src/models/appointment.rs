//! Appointment rows and their joined read model.

use salon_core::appointment::{
    Appointment, AppointmentDetails, CustomerRef, ServiceItem, StylistRef,
};
use salon_core::error::CoreError;
use salon_core::types::{DbId, WallTime};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `appointments` table.
#[derive(Debug, Clone, FromRow)]
pub struct AppointmentRow {
    pub id: DbId,
    pub service_id: DbId,
    pub user_id: DbId,
    pub stylist_id: Option<DbId>,
    pub appointment_date: WallTime,
    pub start_time: WallTime,
    pub end_time: WallTime,
    pub status: String,
    pub amount: Option<f64>,
    pub payment_status: String,
    pub razorpay_payment_id: Option<String>,
    pub refund_status: Option<String>,
    pub refund_id: Option<String>,
    pub reminder_sent: bool,
    pub reminder_minutes: i32,
    pub created_at: WallTime,
}

impl TryFrom<AppointmentRow> for Appointment {
    type Error = CoreError;

    fn try_from(row: AppointmentRow) -> Result<Self, Self::Error> {
        Ok(Appointment {
            id: row.id,
            service_id: row.service_id,
            user_id: row.user_id,
            stylist_id: row.stylist_id,
            appointment_date: row.appointment_date,
            start_time: row.start_time,
            end_time: row.end_time,
            status: row.status.parse()?,
            amount: row.amount,
            payment_status: row.payment_status,
            razorpay_payment_id: row.razorpay_payment_id,
            refund_status: row.refund_status,
            refund_id: row.refund_id,
            reminder_sent: row.reminder_sent,
            reminder_minutes: row.reminder_minutes,
            created_at: row.created_at,
        })
    }
}

/// An appointment row with customer, service and stylist columns joined.
#[derive(Debug, Clone, FromRow)]
pub struct AppointmentDetailsRow {
    #[sqlx(flatten)]
    pub appointment: AppointmentRow,
    pub customer_name: String,
    pub customer_email: Option<String>,
    pub service_name: String,
    pub service_category: Option<String>,
    pub service_price: Option<String>,
    pub service_duration: i32,
    pub stylist_name: Option<String>,
}

impl TryFrom<AppointmentDetailsRow> for AppointmentDetails {
    type Error = CoreError;

    fn try_from(row: AppointmentDetailsRow) -> Result<Self, Self::Error> {
        let stylist = match (row.appointment.stylist_id, row.stylist_name) {
            (Some(id), Some(name)) => Some(StylistRef { id, name }),
            _ => None,
        };
        Ok(AppointmentDetails {
            customer: CustomerRef {
                id: row.appointment.user_id,
                name: row.customer_name,
                email: row.customer_email,
            },
            service: ServiceItem {
                id: row.appointment.service_id,
                name: row.service_name,
                category: row.service_category,
                price: row.service_price,
                duration_minutes: row.service_duration,
            },
            stylist,
            appointment: row.appointment.try_into()?,
        })
    }
}

/// A row from the `appointment_timeline` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct TimelineEntry {
    pub id: DbId,
    pub appointment_id: DbId,
    pub status: String,
    pub created_at: WallTime,
}
