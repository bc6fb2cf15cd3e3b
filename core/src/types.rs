//! Shared primitive types used across the whole service.

use thiserror::Error;

/// A stable, unique identifier for a registered learner.
pub type UserId = String;

/// Identifier of a catalog item (video, quiz, reading).
pub type ContentId = String;

/// Identifier of a learner-defined goal.
pub type GoalId = String;

/// Gamification points. Signed so ledger arithmetic never underflows.
pub type Points = i64;

/// A text column held a value outside the known set.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid {kind} '{value}'")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

/// Declares a closed set of lowercase text values stored in SQLite and sent
/// over JSON as plain strings.
macro_rules! text_enum {
    (
        $(#[$meta:meta])*
        $name:ident ($kind:literal) { $($variant:ident => $text:literal),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = $crate::types::UnknownVariant;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok($name::$variant),)+
                    other => Err($crate::types::UnknownVariant {
                        kind: $kind,
                        value: other.to_string(),
                    }),
                }
            }
        }

        impl rusqlite::types::ToSql for $name {
            fn to_sql(&self) -> rusqlite::Result<rusqlite::types::ToSqlOutput<'_>> {
                Ok(self.as_str().into())
            }
        }

        impl rusqlite::types::FromSql for $name {
            fn column_result(
                value: rusqlite::types::ValueRef<'_>,
            ) -> rusqlite::types::FromSqlResult<Self> {
                value
                    .as_str()?
                    .parse()
                    .map_err(|e| rusqlite::types::FromSqlError::Other(Box::new(e)))
            }
        }
    };
}

pub(crate) use text_enum;

#[cfg(test)]
mod tests {
    text_enum! {
        Colour ("colour") { Red => "red", DarkBlue => "dark_blue" }
    }

    #[test]
    fn parses_and_prints_known_values() {
        assert_eq!("dark_blue".parse::<Colour>().unwrap(), Colour::DarkBlue);
        assert_eq!(Colour::Red.to_string(), "red");
        assert_eq!(Colour::ALL.len(), 2);
    }

    #[test]
    fn rejects_unknown_values_with_kind() {
        let err = "green".parse::<Colour>().unwrap_err();
        assert_eq!(err.to_string(), "Invalid colour 'green'");
    }

    #[test]
    fn serde_uses_the_same_text() {
        let json = serde_json::to_string(&Colour::DarkBlue).unwrap();
        assert_eq!(json, "\"dark_blue\"");
    }
}
