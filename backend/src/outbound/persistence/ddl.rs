//! Idempotent schema bootstrap for the relational store.

/// Creates the donor log, its roster index and the aggregate table, then
/// seeds the `global` aggregate without touching an existing total.
pub(crate) const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS donors (
    id UUID PRIMARY KEY,
    seq BIGSERIAL NOT NULL,
    full_name VARCHAR(200) NOT NULL CHECK (char_length(btrim(full_name)) BETWEEN 2 AND 200),
    blood_group VARCHAR(3) NOT NULL
        CHECK (blood_group IN ('A+', 'A-', 'B+', 'B-', 'AB+', 'AB-', 'O+', 'O-')),
    age INTEGER NOT NULL CHECK (age BETWEEN 18 AND 100),
    academic_year VARCHAR(16) NOT NULL
        CHECK (academic_year IN ('FY', 'SY', 'TY', 'Final Year')),
    donated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX IF NOT EXISTS donors_donated_at_seq_idx
    ON donors (donated_at DESC, seq DESC);

CREATE TABLE IF NOT EXISTS donation_stats (
    id VARCHAR(32) PRIMARY KEY,
    total_blood_units BIGINT NOT NULL DEFAULT 0 CHECK (total_blood_units >= 0),
    last_updated TIMESTAMPTZ
);

INSERT INTO donation_stats (id, total_blood_units, last_updated)
VALUES ('global', 0, NULL)
ON CONFLICT (id) DO NOTHING;
"#;

/// Recount the donor log and overwrite the aggregate in one statement.
///
/// Binds: `$1` aggregate key, `$2` timestamp.
pub(crate) const RECOUNT_SQL: &str = r#"
INSERT INTO donation_stats (id, total_blood_units, last_updated)
SELECT $1, COUNT(*), $2 FROM donors
ON CONFLICT (id) DO UPDATE
SET total_blood_units = EXCLUDED.total_blood_units,
    last_updated = EXCLUDED.last_updated
RETURNING total_blood_units
"#;
