//! Wire and domain types for the persistence gateway.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::color::Color;
use crate::generator::{Category, ColorPalette};

use super::error::GatewayError;

/// A schemaless row as exchanged with the row store.
pub type Row = serde_json::Map<String, serde_json::Value>;

/// An authenticated user identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
}

/// Credentials issued by the auth service after sign-in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
    pub principal: Principal,
}

impl Session {
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }
}

/// Result of a successful registration. The account is not usable until the
/// emailed token has been verified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignUpOutcome {
    pub principal: Principal,
    pub confirmation_sent: bool,
}

/// Named global counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatName {
    Generated,
    Downloaded,
}

impl StatName {
    pub fn as_str(self) -> &'static str {
        match self {
            StatName::Generated => "generated",
            StatName::Downloaded => "downloaded",
        }
    }
}

/// Snapshot of the singleton `stats` row.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalStats {
    #[serde(default)]
    pub generated: u64,
    #[serde(default)]
    pub downloaded: u64,
}

impl GlobalStats {
    pub fn get(&self, stat: StatName) -> u64 {
        match stat {
            StatName::Generated => self.generated,
            StatName::Downloaded => self.downloaded,
        }
    }
}

/// A palette persisted for one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SavedPalette {
    pub id: String,
    pub created_at: DateTime<Utc>,
    #[serde(flatten)]
    pub palette: ColorPalette,
}

/// Insert shape of a `saved_palettes` row.
#[derive(Debug, Serialize)]
pub struct NewPaletteRow<'a> {
    pub user_id: &'a str,
    pub palette_name: &'a str,
    pub primary_color: Color,
    pub secondary_color: Color,
    pub accent_color: Color,
    pub background_color: Color,
    pub text_color: Color,
    pub category: Category,
}

impl<'a> NewPaletteRow<'a> {
    pub fn new(owner: &'a Principal, palette: &'a ColorPalette) -> Self {
        Self {
            user_id: &owner.id,
            palette_name: &palette.name,
            primary_color: palette.primary,
            secondary_color: palette.secondary,
            accent_color: palette.accent,
            background_color: palette.background,
            text_color: palette.text,
            category: palette.category,
        }
    }
}

/// Read shape of a `saved_palettes` row.
#[derive(Debug, Deserialize)]
pub struct PaletteRow {
    pub id: String,
    pub palette_name: String,
    pub primary_color: Color,
    pub secondary_color: Color,
    pub accent_color: Color,
    pub background_color: Color,
    pub text_color: Color,
    pub category: Category,
    pub created_at: DateTime<Utc>,
}

impl From<PaletteRow> for SavedPalette {
    fn from(row: PaletteRow) -> Self {
        Self {
            id: row.id,
            created_at: row.created_at,
            palette: ColorPalette {
                primary: row.primary_color,
                secondary: row.secondary_color,
                accent: row.accent_color,
                background: row.background_color,
                text: row.text_color,
                name: row.palette_name,
                category: row.category,
            },
        }
    }
}

/// Serialize a value into a row map.
pub fn to_row<T: Serialize>(value: &T) -> Result<Row, GatewayError> {
    match serde_json::to_value(value)? {
        serde_json::Value::Object(map) => Ok(map),
        other => Err(GatewayError::Decode(serde::ser::Error::custom(format!(
            "expected a JSON object, got {other}"
        )))),
    }
}

/// Deserialize a row map into a typed value.
pub fn from_row<T: serde::de::DeserializeOwned>(row: Row) -> Result<T, GatewayError> {
    Ok(serde_json::from_value(serde_json::Value::Object(row))?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use serde_json::json;

    #[test]
    fn new_row_uses_column_names() {
        let owner = Principal {
            id: "user-1".into(),
            email: None,
        };
        let palette = ColorPalette::default();
        let row = to_row(&NewPaletteRow::new(&owner, &palette)).unwrap();

        assert_eq!(row["user_id"], "user-1");
        assert_eq!(row["palette_name"], "Default");
        assert_eq!(row["primary_color"], "#3b82f6");
        assert_eq!(row["text_color"], "#2d3748");
        assert_eq!(row["category"], "Vibrant");
        assert_eq!(row.len(), 8);
    }

    #[test]
    fn row_maps_back_to_saved_palette() {
        let row = json!({
            "id": "8d3c",
            "user_id": "user-1",
            "palette_name": "Ocean Breeze",
            "primary_color": "#0EA5E9",
            "secondary_color": "#06B6D4",
            "accent_color": "#F97316",
            "background_color": "#F0F9FF",
            "text_color": "#0C4A6E",
            "category": "Cool",
            "created_at": "2024-05-01T12:30:00.123456+00:00"
        });
        let serde_json::Value::Object(row) = row else {
            unreachable!()
        };
        let saved: SavedPalette = from_row::<PaletteRow>(row).unwrap().into();

        assert_eq!(saved.id, "8d3c");
        assert_eq!(saved.palette.name, "Ocean Breeze");
        assert_eq!(saved.palette.category, Category::Cool);
        assert_eq!(saved.palette.text.to_hex_upper(), "#0C4A6E");
        assert_eq!(saved.created_at.to_rfc3339(), "2024-05-01T12:30:00.123456+00:00");
    }

    #[test]
    fn malformed_color_is_a_decode_error() {
        let serde_json::Value::Object(row) = json!({
            "id": "x",
            "palette_name": "Broken",
            "primary_color": "blue",
            "secondary_color": "#000000",
            "accent_color": "#000000",
            "background_color": "#000000",
            "text_color": "#ffffff",
            "category": "Dark",
            "created_at": "2024-05-01T12:30:00Z"
        }) else {
            unreachable!()
        };
        assert!(matches!(
            from_row::<PaletteRow>(row),
            Err(GatewayError::Decode(_))
        ));
    }

    #[test]
    fn to_row_rejects_non_objects() {
        assert!(matches!(to_row(&42), Err(GatewayError::Decode(_))));
    }

    #[test]
    fn stats_tolerate_extra_columns() {
        let stats: GlobalStats =
            serde_json::from_value(json!({"id": 1, "generated": 10, "downloaded": 3})).unwrap();
        assert_eq!(stats.get(StatName::Generated), 10);
        assert_eq!(stats.get(StatName::Downloaded), 3);
        assert_eq!(serde_json::to_value(StatName::Downloaded).unwrap(), "downloaded");
    }

    #[test]
    fn session_expiry() {
        let now = Utc::now();
        let mut session = Session {
            access_token: "t".into(),
            refresh_token: None,
            expires_at: None,
            principal: Principal {
                id: "u".into(),
                email: None,
            },
        };
        assert!(!session.is_expired_at(now));
        session.expires_at = Some(now - Duration::seconds(1));
        assert!(session.is_expired_at(now));
        session.expires_at = Some(now + Duration::minutes(5));
        assert!(!session.is_expired_at(now));
    }
}
