//! Request inputs and their shapes.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use super::shape::{optional, push_error, required, Field, Kind};
use super::Input;
use crate::error::FieldErrors;
use crate::types::{PaymentStatus, PaymentType, Role, RoomStatus, UserStatus, UtilityType};

const SELF_SERVICE_ROLES: &[&str] = &["LANDLORD", "BOARDER"];

fn non_negative(errors: &mut FieldErrors, field: &str, value: Option<Decimal>) {
    if value.is_some_and(|v| v.is_sign_negative() && !v.is_zero()) {
        push_error(errors, field, "Must be zero or greater");
    }
}

fn positive(errors: &mut FieldErrors, field: &str, value: Option<Decimal>) {
    if value.is_some_and(|v| v <= Decimal::ZERO) {
        push_error(errors, field, "Must be greater than zero");
    }
}

/// Precision and scale of a NUMERIC column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Numeric {
    pub precision: u32,
    pub scale: u32,
}

/// Money columns, NUMERIC(12, 2)
pub const MONEY: Numeric = Numeric { precision: 12, scale: 2 };
/// Meter readings, NUMERIC(14, 3)
pub const METER: Numeric = Numeric { precision: 14, scale: 3 };
/// Rates per unit, NUMERIC(12, 4)
pub const RATE: Numeric = Numeric { precision: 12, scale: 4 };

impl Numeric {
    /// Exclusive bound on the magnitude of a stored value
    pub fn limit(&self) -> Decimal {
        Decimal::from(10i64.pow(self.precision - self.scale))
    }

    pub fn holds(&self, value: Decimal) -> bool {
        value.normalize().scale() <= self.scale && value.abs() < self.limit()
    }
}

fn fits(errors: &mut FieldErrors, field: &str, value: Option<Decimal>, column: Numeric) {
    let Some(value) = value else { return };
    if value.normalize().scale() > column.scale {
        push_error(errors, field, format!("Must have at most {} decimal places", column.scale));
    } else if value.abs() >= column.limit() {
        push_error(errors, field, format!("Must be less than {}", column.limit()));
    }
}

fn ordered<T: PartialOrd>(errors: &mut FieldErrors, field: &str, low: Option<T>, high: Option<T>, message: &str) {
    if let (Some(low), Some(high)) = (low, high) {
        if high < low {
            push_error(errors, field, message);
        }
    }
}

// Auth

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterInput {
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    #[validate(length(min = 8, max = 128, message = "Password must be 8 to 128 characters"))]
    pub password: String,
    pub role: Role,
    #[validate(length(min = 1, max = 100, message = "Must be 1 to 100 characters"))]
    pub first_name: String,
    #[validate(length(min = 1, max = 100, message = "Must be 1 to 100 characters"))]
    pub last_name: String,
    #[validate(length(max = 30, message = "Must be at most 30 characters"))]
    pub phone: Option<String>,
    #[validate(length(max = 200, message = "Must be at most 200 characters"))]
    pub business_name: Option<String>,
}

impl Input for RegisterInput {
    fn shape() -> &'static [Field] {
        const SHAPE: &[Field] = &[
            required("email", Kind::Text),
            required("password", Kind::Text),
            required("role", Kind::OneOf(SELF_SERVICE_ROLES)),
            required("firstName", Kind::Text),
            required("lastName", Kind::Text),
            optional("phone", Kind::Text),
            optional("businessName", Kind::Text),
        ];
        SHAPE
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct LoginInput {
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    #[validate(length(min = 1, message = "Required"))]
    pub password: String,
}

impl Input for LoginInput {
    fn shape() -> &'static [Field] {
        const SHAPE: &[Field] = &[required("email", Kind::Text), required("password", Kind::Text)];
        SHAPE
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AccessCodeInput {
    #[validate(length(min = 4, max = 32, message = "Must be 4 to 32 characters"))]
    pub access_code: String,
}

impl Input for AccessCodeInput {
    fn shape() -> &'static [Field] {
        const SHAPE: &[Field] = &[required("accessCode", Kind::Text)];
        SHAPE
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordInput {
    #[validate(length(min = 1, message = "Required"))]
    pub current_password: String,
    #[validate(length(min = 8, max = 128, message = "Password must be 8 to 128 characters"))]
    pub new_password: String,
}

impl Input for ChangePasswordInput {
    fn shape() -> &'static [Field] {
        const SHAPE: &[Field] = &[
            required("currentPassword", Kind::Text),
            required("newPassword", Kind::Text),
        ];
        SHAPE
    }
}

// Rooms

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateRoomInput {
    #[validate(length(min = 1, max = 20, message = "Must be 1 to 20 characters"))]
    pub room_number: String,
    #[validate(range(min = 0, max = 200, message = "Must be between 0 and 200"))]
    pub floor: i32,
    #[validate(range(min = 1, max = 50, message = "Must be between 1 and 50"))]
    pub capacity: i32,
    pub monthly_rate: Decimal,
    pub status: Option<RoomStatus>,
    #[validate(length(max = 500, message = "Must be at most 500 characters"))]
    pub description: Option<String>,
}

impl Input for CreateRoomInput {
    fn shape() -> &'static [Field] {
        const SHAPE: &[Field] = &[
            required("roomNumber", Kind::Text),
            required("floor", Kind::Integer),
            required("capacity", Kind::Integer),
            required("monthlyRate", Kind::Decimal),
            optional("status", Kind::OneOf(RoomStatus::LABELS)),
            optional("description", Kind::Text),
        ];
        SHAPE
    }

    fn check(&self, errors: &mut FieldErrors) {
        non_negative(errors, "monthlyRate", Some(self.monthly_rate));
        fits(errors, "monthlyRate", Some(self.monthly_rate), MONEY);
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRoomInput {
    pub id: Uuid,
    #[validate(length(min = 1, max = 20, message = "Must be 1 to 20 characters"))]
    pub room_number: Option<String>,
    #[validate(range(min = 0, max = 200, message = "Must be between 0 and 200"))]
    pub floor: Option<i32>,
    #[validate(range(min = 1, max = 50, message = "Must be between 1 and 50"))]
    pub capacity: Option<i32>,
    pub monthly_rate: Option<Decimal>,
    pub status: Option<RoomStatus>,
    #[validate(length(max = 500, message = "Must be at most 500 characters"))]
    pub description: Option<String>,
}

impl Input for UpdateRoomInput {
    fn shape() -> &'static [Field] {
        const SHAPE: &[Field] = &[
            required("id", Kind::Uuid),
            optional("roomNumber", Kind::Text),
            optional("floor", Kind::Integer),
            optional("capacity", Kind::Integer),
            optional("monthlyRate", Kind::Decimal),
            optional("status", Kind::OneOf(RoomStatus::LABELS)),
            optional("description", Kind::Text),
        ];
        SHAPE
    }

    fn check(&self, errors: &mut FieldErrors) {
        non_negative(errors, "monthlyRate", self.monthly_rate);
        fits(errors, "monthlyRate", self.monthly_rate, MONEY);
    }
}

// Boarders

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateBoarderInput {
    #[validate(length(min = 1, max = 100, message = "Must be 1 to 100 characters"))]
    pub first_name: String,
    #[validate(length(min = 1, max = 100, message = "Must be 1 to 100 characters"))]
    pub last_name: String,
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    #[validate(length(max = 30, message = "Must be at most 30 characters"))]
    pub phone: Option<String>,
    /// Defaults to today
    pub move_in_date: Option<NaiveDate>,
    pub room_id: Option<Uuid>,
}

impl Input for CreateBoarderInput {
    fn shape() -> &'static [Field] {
        const SHAPE: &[Field] = &[
            required("firstName", Kind::Text),
            required("lastName", Kind::Text),
            required("email", Kind::Text),
            optional("phone", Kind::Text),
            optional("moveInDate", Kind::Date),
            optional("roomId", Kind::Uuid),
        ];
        SHAPE
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBoarderInput {
    pub id: Uuid,
    #[validate(length(min = 1, max = 100, message = "Must be 1 to 100 characters"))]
    pub first_name: Option<String>,
    #[validate(length(min = 1, max = 100, message = "Must be 1 to 100 characters"))]
    pub last_name: Option<String>,
    #[validate(email(message = "Invalid email address"))]
    pub email: Option<String>,
    #[validate(length(max = 30, message = "Must be at most 30 characters"))]
    pub phone: Option<String>,
    pub move_in_date: Option<NaiveDate>,
    pub move_out_date: Option<NaiveDate>,
    pub is_active: Option<bool>,
}

impl Input for UpdateBoarderInput {
    fn shape() -> &'static [Field] {
        const SHAPE: &[Field] = &[
            required("id", Kind::Uuid),
            optional("firstName", Kind::Text),
            optional("lastName", Kind::Text),
            optional("email", Kind::Text),
            optional("phone", Kind::Text),
            optional("moveInDate", Kind::Date),
            optional("moveOutDate", Kind::Date),
            optional("isActive", Kind::Bool),
        ];
        SHAPE
    }

    fn check(&self, errors: &mut FieldErrors) {
        ordered(
            errors,
            "moveOutDate",
            self.move_in_date,
            self.move_out_date,
            "Move-out date cannot be before move-in date",
        );
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AssignRoomInput {
    /// Boarder id
    pub id: Uuid,
    pub room_id: Uuid,
}

impl Input for AssignRoomInput {
    fn shape() -> &'static [Field] {
        const SHAPE: &[Field] = &[required("id", Kind::Uuid), required("roomId", Kind::Uuid)];
        SHAPE
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct MoveOutInput {
    pub id: Uuid,
    /// Defaults to today
    pub move_out_date: Option<NaiveDate>,
}

impl Input for MoveOutInput {
    fn shape() -> &'static [Field] {
        const SHAPE: &[Field] = &[required("id", Kind::Uuid), optional("moveOutDate", Kind::Date)];
        SHAPE
    }
}

// Payments

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreatePaymentInput {
    pub boarder_id: Uuid,
    pub amount: Decimal,
    #[serde(rename = "type")]
    pub payment_type: PaymentType,
    pub status: Option<PaymentStatus>,
    pub due_date: NaiveDate,
    pub paid_date: Option<DateTime<Utc>>,
    #[validate(length(max = 500, message = "Must be at most 500 characters"))]
    pub description: Option<String>,
}

impl Input for CreatePaymentInput {
    fn shape() -> &'static [Field] {
        const SHAPE: &[Field] = &[
            required("boarderId", Kind::Uuid),
            required("amount", Kind::Decimal),
            required("type", Kind::OneOf(PaymentType::LABELS)),
            optional("status", Kind::OneOf(PaymentStatus::LABELS)),
            required("dueDate", Kind::Date),
            optional("paidDate", Kind::DateTime),
            optional("description", Kind::Text),
        ];
        SHAPE
    }

    fn check(&self, errors: &mut FieldErrors) {
        positive(errors, "amount", Some(self.amount));
        fits(errors, "amount", Some(self.amount), MONEY);
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePaymentInput {
    pub id: Uuid,
    pub amount: Option<Decimal>,
    #[serde(rename = "type")]
    pub payment_type: Option<PaymentType>,
    pub status: Option<PaymentStatus>,
    pub due_date: Option<NaiveDate>,
    pub paid_date: Option<DateTime<Utc>>,
    #[validate(length(max = 500, message = "Must be at most 500 characters"))]
    pub description: Option<String>,
}

impl Input for UpdatePaymentInput {
    fn shape() -> &'static [Field] {
        const SHAPE: &[Field] = &[
            required("id", Kind::Uuid),
            optional("amount", Kind::Decimal),
            optional("type", Kind::OneOf(PaymentType::LABELS)),
            optional("status", Kind::OneOf(PaymentStatus::LABELS)),
            optional("dueDate", Kind::Date),
            optional("paidDate", Kind::DateTime),
            optional("description", Kind::Text),
        ];
        SHAPE
    }

    fn check(&self, errors: &mut FieldErrors) {
        positive(errors, "amount", self.amount);
        fits(errors, "amount", self.amount, MONEY);
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct MarkPaidInput {
    pub id: Uuid,
    /// Defaults to now
    pub paid_date: Option<DateTime<Utc>>,
}

impl Input for MarkPaidInput {
    fn shape() -> &'static [Field] {
        const SHAPE: &[Field] = &[required("id", Kind::Uuid), optional("paidDate", Kind::DateTime)];
        SHAPE
    }
}

// Utility readings

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateReadingInput {
    pub room_id: Uuid,
    #[serde(rename = "type")]
    pub utility_type: UtilityType,
    pub previous_reading: Decimal,
    pub current_reading: Decimal,
    pub rate_per_unit: Decimal,
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    /// Defaults to today
    pub reading_date: Option<NaiveDate>,
}

impl Input for CreateReadingInput {
    fn shape() -> &'static [Field] {
        const SHAPE: &[Field] = &[
            required("roomId", Kind::Uuid),
            required("type", Kind::OneOf(UtilityType::LABELS)),
            required("previousReading", Kind::Decimal),
            required("currentReading", Kind::Decimal),
            required("ratePerUnit", Kind::Decimal),
            required("periodStart", Kind::Date),
            required("periodEnd", Kind::Date),
            optional("readingDate", Kind::Date),
        ];
        SHAPE
    }

    fn check(&self, errors: &mut FieldErrors) {
        check_reading(
            errors,
            Some(self.previous_reading),
            Some(self.current_reading),
            Some(self.rate_per_unit),
            Some(self.period_start),
            Some(self.period_end),
        );
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateReadingInput {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub utility_type: Option<UtilityType>,
    pub previous_reading: Option<Decimal>,
    pub current_reading: Option<Decimal>,
    pub rate_per_unit: Option<Decimal>,
    pub period_start: Option<NaiveDate>,
    pub period_end: Option<NaiveDate>,
    pub reading_date: Option<NaiveDate>,
}

impl Input for UpdateReadingInput {
    fn shape() -> &'static [Field] {
        const SHAPE: &[Field] = &[
            required("id", Kind::Uuid),
            optional("type", Kind::OneOf(UtilityType::LABELS)),
            optional("previousReading", Kind::Decimal),
            optional("currentReading", Kind::Decimal),
            optional("ratePerUnit", Kind::Decimal),
            optional("periodStart", Kind::Date),
            optional("periodEnd", Kind::Date),
            optional("readingDate", Kind::Date),
        ];
        SHAPE
    }

    fn check(&self, errors: &mut FieldErrors) {
        check_reading(
            errors,
            self.previous_reading,
            self.current_reading,
            self.rate_per_unit,
            self.period_start,
            self.period_end,
        );
    }
}

/// Meter and period rules shared by reading inputs and merged updates.
pub fn check_reading(
    errors: &mut FieldErrors,
    previous: Option<Decimal>,
    current: Option<Decimal>,
    rate: Option<Decimal>,
    period_start: Option<NaiveDate>,
    period_end: Option<NaiveDate>,
) {
    non_negative(errors, "previousReading", previous);
    non_negative(errors, "currentReading", current);
    non_negative(errors, "ratePerUnit", rate);
    fits(errors, "previousReading", previous, METER);
    fits(errors, "currentReading", current, METER);
    fits(errors, "ratePerUnit", rate, RATE);
    ordered(
        errors,
        "currentReading",
        previous,
        current,
        "Current reading must be greater than or equal to previous reading",
    );
    ordered(
        errors,
        "periodEnd",
        period_start,
        period_end,
        "Period end cannot be before period start",
    );
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct BillReadingInput {
    /// Reading id
    pub id: Uuid,
    pub due_date: NaiveDate,
    #[validate(length(max = 500, message = "Must be at most 500 characters"))]
    pub description: Option<String>,
}

impl Input for BillReadingInput {
    fn shape() -> &'static [Field] {
        const SHAPE: &[Field] = &[
            required("id", Kind::Uuid),
            required("dueDate", Kind::Date),
            optional("description", Kind::Text),
        ];
        SHAPE
    }
}

// Admin

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateAdminInput {
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    #[validate(length(min = 8, max = 128, message = "Password must be 8 to 128 characters"))]
    pub password: String,
}

impl Input for CreateAdminInput {
    fn shape() -> &'static [Field] {
        const SHAPE: &[Field] = &[required("email", Kind::Text), required("password", Kind::Text)];
        SHAPE
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AdminUpdateUserInput {
    pub id: Uuid,
    #[validate(email(message = "Invalid email address"))]
    pub email: Option<String>,
    #[validate(length(min = 8, max = 128, message = "Password must be 8 to 128 characters"))]
    pub password: Option<String>,
    pub role: Option<Role>,
    pub status: Option<UserStatus>,
}

impl Input for AdminUpdateUserInput {
    fn shape() -> &'static [Field] {
        const SHAPE: &[Field] = &[
            required("id", Kind::Uuid),
            optional("email", Kind::Text),
            optional("password", Kind::Text),
            optional("role", Kind::OneOf(Role::LABELS)),
            optional("status", Kind::OneOf(UserStatus::LABELS)),
        ];
        SHAPE
    }
}
