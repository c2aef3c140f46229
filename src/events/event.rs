use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use crate::types::{PaymentStatus, Role, UserStatus};

/// Closed set of event kinds; handlers subscribe by kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    UserRegistered,
    UserUpdated,
    PasswordChanged,
    RoomCreated,
    RoomUpdated,
    RoomDeleted,
    BoarderCreated,
    BoarderUpdated,
    BoarderDeleted,
    BoarderAssigned,
    BoarderUnassigned,
    BoarderMovedOut,
    AccessCodeRegenerated,
    PaymentCreated,
    PaymentUpdated,
    PaymentDeleted,
    PaymentPaid,
    PaymentsMarkedOverdue,
    ReadingCreated,
    ReadingUpdated,
    ReadingDeleted,
    ReadingBilled,
}

impl EventKind {
    pub const ALL: &'static [EventKind] = &[
        EventKind::UserRegistered,
        EventKind::UserUpdated,
        EventKind::PasswordChanged,
        EventKind::RoomCreated,
        EventKind::RoomUpdated,
        EventKind::RoomDeleted,
        EventKind::BoarderCreated,
        EventKind::BoarderUpdated,
        EventKind::BoarderDeleted,
        EventKind::BoarderAssigned,
        EventKind::BoarderUnassigned,
        EventKind::BoarderMovedOut,
        EventKind::AccessCodeRegenerated,
        EventKind::PaymentCreated,
        EventKind::PaymentUpdated,
        EventKind::PaymentDeleted,
        EventKind::PaymentPaid,
        EventKind::PaymentsMarkedOverdue,
        EventKind::ReadingCreated,
        EventKind::ReadingUpdated,
        EventKind::ReadingDeleted,
        EventKind::ReadingBilled,
    ];
}

/// Something that happened after a successful write.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DomainEvent {
    UserRegistered { user_id: Uuid, role: Role, status: UserStatus },
    UserUpdated { user_id: Uuid, role: Role, status: UserStatus },
    PasswordChanged { user_id: Uuid },
    RoomCreated { room_id: Uuid, room_number: String },
    RoomUpdated { room_id: Uuid },
    RoomDeleted { room_id: Uuid },
    BoarderCreated { boarder_id: Uuid, room_id: Option<Uuid> },
    BoarderUpdated { boarder_id: Uuid },
    BoarderDeleted { boarder_id: Uuid, payments_removed: u64 },
    BoarderAssigned { boarder_id: Uuid, room_id: Uuid, previous_room_id: Option<Uuid> },
    BoarderUnassigned { boarder_id: Uuid, room_id: Uuid },
    BoarderMovedOut { boarder_id: Uuid, room_id: Option<Uuid>, move_out_date: NaiveDate },
    AccessCodeRegenerated { boarder_id: Uuid },
    PaymentCreated { payment_id: Uuid, boarder_id: Uuid, amount: Decimal },
    PaymentUpdated { payment_id: Uuid, status: PaymentStatus },
    PaymentDeleted { payment_id: Uuid },
    PaymentPaid { payment_id: Uuid, boarder_id: Uuid, previous_status: PaymentStatus },
    PaymentsMarkedOverdue { payment_ids: Vec<Uuid> },
    ReadingCreated { reading_id: Uuid, room_id: Uuid, amount: Decimal },
    ReadingUpdated { reading_id: Uuid },
    ReadingDeleted { reading_id: Uuid },
    ReadingBilled { reading_id: Uuid, payment_ids: Vec<Uuid> },
}

impl DomainEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            DomainEvent::UserRegistered { .. } => EventKind::UserRegistered,
            DomainEvent::UserUpdated { .. } => EventKind::UserUpdated,
            DomainEvent::PasswordChanged { .. } => EventKind::PasswordChanged,
            DomainEvent::RoomCreated { .. } => EventKind::RoomCreated,
            DomainEvent::RoomUpdated { .. } => EventKind::RoomUpdated,
            DomainEvent::RoomDeleted { .. } => EventKind::RoomDeleted,
            DomainEvent::BoarderCreated { .. } => EventKind::BoarderCreated,
            DomainEvent::BoarderUpdated { .. } => EventKind::BoarderUpdated,
            DomainEvent::BoarderDeleted { .. } => EventKind::BoarderDeleted,
            DomainEvent::BoarderAssigned { .. } => EventKind::BoarderAssigned,
            DomainEvent::BoarderUnassigned { .. } => EventKind::BoarderUnassigned,
            DomainEvent::BoarderMovedOut { .. } => EventKind::BoarderMovedOut,
            DomainEvent::AccessCodeRegenerated { .. } => EventKind::AccessCodeRegenerated,
            DomainEvent::PaymentCreated { .. } => EventKind::PaymentCreated,
            DomainEvent::PaymentUpdated { .. } => EventKind::PaymentUpdated,
            DomainEvent::PaymentDeleted { .. } => EventKind::PaymentDeleted,
            DomainEvent::PaymentPaid { .. } => EventKind::PaymentPaid,
            DomainEvent::PaymentsMarkedOverdue { .. } => EventKind::PaymentsMarkedOverdue,
            DomainEvent::ReadingCreated { .. } => EventKind::ReadingCreated,
            DomainEvent::ReadingUpdated { .. } => EventKind::ReadingUpdated,
            DomainEvent::ReadingDeleted { .. } => EventKind::ReadingDeleted,
            DomainEvent::ReadingBilled { .. } => EventKind::ReadingBilled,
        }
    }
}
