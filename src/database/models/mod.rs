pub mod boarder;
pub mod payment;
pub mod room;
pub mod user;
pub mod utility_reading;

pub use boarder::{Boarder, BoarderFilter};
pub use payment::{Payment, PaymentFilter, PaymentSummary, StatusTotal};
pub use room::{Room, RoomDetail, RoomFilter};
pub use user::{LandlordProfile, Profile, RegisteredUser, User, UserFilter};
pub use utility_reading::{ConsumptionLine, ConsumptionSummary, TypeTotal, UtilityFilter, UtilityReading};
