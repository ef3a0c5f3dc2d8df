//! Text-backed domain enums shared by models and repositories

use serde::{Deserialize, Serialize};
use sqlx::{Decode, Encode, Postgres};
use utoipa::ToSchema;

/// Declares an enum stored as lowercase TEXT in Postgres and serialized as
/// the same lowercase string in JSON.
macro_rules! text_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
        #[serde(rename_all = "lowercase")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.to_lowercase().as_str() {
                    $($text => Ok($name::$variant),)+
                    _ => Err(format!("Invalid {}: {}", stringify!($name), s)),
                }
            }
        }

        impl sqlx::Type<Postgres> for $name {
            fn type_info() -> sqlx::postgres::PgTypeInfo {
                <String as sqlx::Type<Postgres>>::type_info()
            }

            fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
                <String as sqlx::Type<Postgres>>::compatible(ty)
            }
        }

        impl<'r> Decode<'r, Postgres> for $name {
            fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
                let s: String = Decode::<Postgres>::decode(value)?;
                s.parse().map_err(|e: String| e.into())
            }
        }

        impl Encode<'_, Postgres> for $name {
            fn encode_by_ref(&self, buf: &mut sqlx::postgres::PgArgumentBuffer) -> sqlx::encode::IsNull {
                <String as Encode<Postgres>>::encode(self.as_str().to_string(), buf)
            }
        }
    };
}

text_enum! {
    /// Account role, carried in session tokens
    Role {
        Admin => "admin",
        User => "user",
        Technician => "technician",
    }
}

text_enum! {
    /// Toolkit status. `Available`/`Borrowed` follow stock levels,
    /// `Maintenance`/`Retired` are set by catalog maintenance.
    ToolkitStatus {
        Available => "available",
        Borrowed => "borrowed",
        Maintenance => "maintenance",
        Retired => "retired",
    }
}

text_enum! {
    /// Physical condition of a toolkit
    ToolkitCondition {
        Excellent => "excellent",
        Good => "good",
        Fair => "fair",
        Poor => "poor",
    }
}

text_enum! {
    /// Loan lifecycle status
    LoanStatus {
        Borrowed => "borrowed",
        Returned => "returned",
        Overdue => "overdue",
        Damaged => "damaged",
    }
}

impl Default for Role {
    fn default() -> Self {
        Role::User
    }
}

impl Default for ToolkitStatus {
    fn default() -> Self {
        ToolkitStatus::Available
    }
}

impl Default for ToolkitCondition {
    fn default() -> Self {
        ToolkitCondition::Good
    }
}

impl Default for LoanStatus {
    fn default() -> Self {
        LoanStatus::Borrowed
    }
}

impl ToolkitStatus {
    /// Whether this status is recomputed from stock levels on every stock change
    pub fn follows_stock(&self) -> bool {
        matches!(self, ToolkitStatus::Available | ToolkitStatus::Borrowed)
    }

    /// Whether new loans may be issued against a toolkit in this status
    pub fn is_lendable(&self) -> bool {
        self.follows_stock()
    }
}

impl LoanStatus {
    pub fn is_returned(&self) -> bool {
        *self == LoanStatus::Returned
    }
}
