//! DDL for the relational store backing the built-in tools (spec §1 "a catalog of
//! side-effecting tools against a relational store"; individual tool semantics are explicitly
//! out of the hard design per spec §1, but a concrete schema is needed to make the tools real).

pub const CREATE_TABLES: &str = r#"
CREATE TABLE IF NOT EXISTS food_logs (
    id TEXT PRIMARY KEY,
    user_id TEXT NOT NULL,
    item TEXT NOT NULL,
    meal TEXT,
    logged_at_unix INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS tasks (
    id TEXT PRIMARY KEY,
    user_id TEXT NOT NULL,
    title TEXT NOT NULL,
    due_at_unix INTEGER,
    priority TEXT NOT NULL DEFAULT 'normal',
    completed INTEGER NOT NULL DEFAULT 0,
    created_at_unix INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS events (
    id TEXT PRIMARY KEY,
    user_id TEXT NOT NULL,
    title TEXT NOT NULL,
    starts_at_unix INTEGER NOT NULL,
    recurrence TEXT,
    last_expanded_unix INTEGER,
    created_at_unix INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS reminders (
    id TEXT PRIMARY KEY,
    user_id TEXT NOT NULL,
    message TEXT NOT NULL,
    fire_at_unix INTEGER NOT NULL,
    fired INTEGER NOT NULL DEFAULT 0,
    created_at_unix INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS scheduler_job_state (
    job_name TEXT PRIMARY KEY,
    last_run_unix INTEGER,
    last_status TEXT
);

CREATE TABLE IF NOT EXISTS vault_sync_state (
    file_path TEXT PRIMARY KEY,
    content_hash TEXT NOT NULL,
    synced_at_unix INTEGER NOT NULL
);
"#;
