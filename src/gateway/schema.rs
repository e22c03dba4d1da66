//! Table and procedure names, plus the bootstrap DDL.

pub const SAVED_PALETTES_TABLE: &str = "saved_palettes";
pub const STATS_TABLE: &str = "stats";

/// Atomically increments one counter column of the `stats` row.
pub const INCREMENT_STAT_RPC: &str = "increment_stat";
/// Executes [`CREATE_SAVED_PALETTES_SQL`] server-side.
pub const CREATE_TABLE_RPC: &str = "create_saved_palettes_table";

/// Idempotent: every statement is guarded with `IF NOT EXISTS`.
pub const CREATE_SAVED_PALETTES_SQL: &str = "\
CREATE TABLE IF NOT EXISTS saved_palettes (
  id UUID DEFAULT uuid_generate_v4() PRIMARY KEY,
  user_id UUID REFERENCES auth.users(id) ON DELETE CASCADE,
  palette_name TEXT NOT NULL,
  primary_color TEXT NOT NULL,
  secondary_color TEXT NOT NULL,
  accent_color TEXT NOT NULL,
  background_color TEXT NOT NULL,
  text_color TEXT NOT NULL,
  category TEXT NOT NULL,
  created_at TIMESTAMP WITH TIME ZONE DEFAULT TIMEZONE('utc'::text, NOW())
);

CREATE INDEX IF NOT EXISTS saved_palettes_user_id_idx ON saved_palettes(user_id);
";
