/// Shared enums used across the codebase
///
/// Every enum is stored as a PostgreSQL enum type, serialized as
/// SCREAMING_SNAKE_CASE and parsed case-insensitively from strings.
use serde::{Deserialize, Serialize};

/// Returned when a string does not name any variant of a labelled enum
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} '{value}'")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

macro_rules! labelled_enum {
    ($(#[$doc:meta])* $name:ident, $pg:literal, { $($variant:ident => $label:literal),+ $(,)? }) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
        #[serde(rename_all = "SCREAMING_SNAKE_CASE")]
        #[sqlx(type_name = $pg, rename_all = "SCREAMING_SNAKE_CASE")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];
            pub const LABELS: &'static [&'static str] = &[$($label),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $label),+
                }
            }

            /// Lenient parse used by guards: anything unrecognized is `None`
            pub fn parse(value: Option<&str>) -> Option<Self> {
                value.and_then(|v| v.parse().ok())
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = UnknownVariant;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().to_ascii_uppercase().as_str() {
                    $($label => Ok($name::$variant),)+
                    _ => Err(UnknownVariant {
                        kind: stringify!($name),
                        value: s.to_string(),
                    }),
                }
            }
        }
    };
}

labelled_enum!(
    /// Account type of a user
    Role, "user_role", {
        Landlord => "LANDLORD",
        Boarder => "BOARDER",
        Admin => "ADMIN",
    }
);

labelled_enum!(
    /// Approval state of a user account
    UserStatus, "user_status", {
        Pending => "PENDING",
        Approved => "APPROVED",
        Suspended => "SUSPENDED",
    }
);

labelled_enum!(
    RoomStatus, "room_status", {
        Available => "AVAILABLE",
        Occupied => "OCCUPIED",
        Maintenance => "MAINTENANCE",
    }
);

labelled_enum!(
    PaymentType, "payment_type", {
        Rent => "RENT",
        Utility => "UTILITY",
        Deposit => "DEPOSIT",
        Other => "OTHER",
    }
);

labelled_enum!(
    /// PAID and CANCELLED are terminal in the product sense only; nothing
    /// enforces it (see `PaymentService::mark_as_paid`)
    PaymentStatus, "payment_status", {
        Pending => "PENDING",
        Paid => "PAID",
        Overdue => "OVERDUE",
        Cancelled => "CANCELLED",
    }
);

labelled_enum!(
    UtilityType, "utility_type", {
        Electricity => "ELECTRICITY",
        Water => "WATER",
        Internet => "INTERNET",
        Other => "OTHER",
    }
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_case_insensitively() {
        assert_eq!("landlord".parse::<Role>().unwrap(), Role::Landlord);
        assert_eq!(" APPROVED ".parse::<UserStatus>().unwrap(), UserStatus::Approved);
        assert!("OWNER".parse::<Role>().is_err());
    }

    #[test]
    fn lenient_parse_maps_garbage_to_none() {
        assert_eq!(Role::parse(None), None);
        assert_eq!(Role::parse(Some("nobody")), None);
        assert_eq!(PaymentStatus::parse(Some("paid")), Some(PaymentStatus::Paid));
    }

    #[test]
    fn serializes_as_screaming_case() {
        let json = serde_json::to_value(UtilityType::Electricity).unwrap();
        assert_eq!(json, serde_json::json!("ELECTRICITY"));
        assert_eq!(PaymentType::LABELS, &["RENT", "UTILITY", "DEPOSIT", "OTHER"]);
    }
}
