use sea_orm::{
    ConnectOptions, ConnectionTrait, Database, DatabaseBackend, DatabaseConnection, Statement,
};

/// Open the sqlite database at the given file path, creating parent
/// directories and the file itself when missing. The connection is owned by
/// the caller and injected into handlers via application state; closing it is
/// an explicit `DatabaseConnection::close` at shutdown.
pub async fn connect(db_file: &str) -> anyhow::Result<DatabaseConnection> {
    if let Some(parent) = std::path::Path::new(db_file).parent() {
        std::fs::create_dir_all(parent)?;
    }
    let absolute_path = if std::path::Path::new(db_file).is_absolute() {
        std::path::PathBuf::from(db_file)
    } else {
        std::env::current_dir()?.join(db_file)
    };
    // Normalize path separators and ensure proper URL form on Windows
    let normalized = absolute_path.to_string_lossy().replace('\\', "/");
    let needs_leading_slash = !normalized.starts_with('/') && normalized.contains(':');
    let prefix = if needs_leading_slash { "/" } else { "" };
    let db_url = format!("sqlite://{}{}?mode=rwc", prefix, normalized);
    let conn = Database::connect(&db_url).await?;
    Ok(conn)
}

/// In-memory database for tests. Capped at a single pooled connection so
/// every query sees the same memory database.
pub async fn connect_in_memory() -> anyhow::Result<DatabaseConnection> {
    let mut options = ConnectOptions::new("sqlite::memory:".to_owned());
    options.max_connections(1);
    let conn = Database::connect(options).await?;
    Ok(conn)
}

/// Create-if-missing DDL for the five CRM tables. Cascade deletes from
/// clients to activities and stage history are enforced here, at the storage
/// layer; sqlx enables sqlite foreign keys by default.
pub async fn init_schema(conn: &DatabaseConnection) -> anyhow::Result<()> {
    let statements = [
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id TEXT PRIMARY KEY NOT NULL,
            name TEXT NOT NULL UNIQUE,
            created_at TEXT NOT NULL
        );
        "#,
        r#"
        CREATE TABLE IF NOT EXISTS services (
            id TEXT PRIMARY KEY NOT NULL,
            name TEXT NOT NULL UNIQUE,
            created_at TEXT NOT NULL
        );
        "#,
        r#"
        CREATE TABLE IF NOT EXISTS clients (
            id TEXT PRIMARY KEY NOT NULL,
            company_name TEXT NOT NULL,
            contact_person TEXT,
            email TEXT,
            phone TEXT,
            stage TEXT NOT NULL,
            status TEXT,
            value REAL NOT NULL DEFAULT 0,
            priority TEXT NOT NULL,
            country TEXT,
            responsible_person_id TEXT REFERENCES users (id),
            service_id TEXT REFERENCES services (id),
            notes TEXT,
            linkedin TEXT,
            source TEXT,
            industry TEXT,
            estimated_close_date TEXT,
            win_probability INTEGER,
            last_follow_up TEXT,
            next_follow_up TEXT,
            pipeline_start_date TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );
        "#,
        r#"
        CREATE TABLE IF NOT EXISTS activities (
            id TEXT PRIMARY KEY NOT NULL,
            client_id TEXT NOT NULL REFERENCES clients (id) ON DELETE CASCADE,
            action TEXT NOT NULL,
            user_id TEXT REFERENCES users (id),
            created_at TEXT NOT NULL
        );
        "#,
        r#"
        CREATE TABLE IF NOT EXISTS client_stage_history (
            id TEXT PRIMARY KEY NOT NULL,
            client_id TEXT NOT NULL REFERENCES clients (id) ON DELETE CASCADE,
            stage TEXT NOT NULL,
            entered_at TEXT NOT NULL,
            exited_at TEXT,
            duration_seconds INTEGER
        );
        "#,
        "CREATE INDEX IF NOT EXISTS idx_activities_client ON activities (client_id);",
        "CREATE INDEX IF NOT EXISTS idx_stage_history_client ON client_stage_history (client_id);",
    ];

    for sql in statements {
        conn.execute(Statement::from_string(
            DatabaseBackend::Sqlite,
            sql.to_string(),
        ))
        .await?;
    }
    tracing::info!("database schema ready");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn schema_bootstrap_is_idempotent() {
        let conn = connect_in_memory().await.unwrap();
        init_schema(&conn).await.unwrap();
        init_schema(&conn).await.unwrap();
    }
}
