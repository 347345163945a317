use anyhow::{Result, anyhow};
use eco_bot::config::database_url_from_env;
use eco_bot::database::connection::DatabaseManager;
use eco_bot::database::legacy::parse_legacy_users;
use eco_bot::database::models::UserRecord;
use std::env;
use std::io;
use std::path::Path;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize basic logging for the migration
    env_logger::init();

    // Parse command line arguments
    let args: Vec<String> = env::args().collect();
    let command = args.get(1).map(|s| s.as_str()).unwrap_or("migrate");

    match command {
        "migrate" | "up" => run_migrations().await,
        "check" => check_database().await,
        "import" => match args.get(2) {
            Some(file) => import_legacy(Path::new(file)).await,
            None => {
                eprintln!("Missing file argument for import");
                print_help();
                std::process::exit(1);
            }
        },
        "reset" => reset_database().await,
        "help" | "--help" | "-h" => {
            print_help();
            Ok(())
        }
        _ => {
            eprintln!("Unknown command: {command}");
            print_help();
            std::process::exit(1);
        }
    }
}

async fn connect() -> Result<DatabaseManager> {
    dotenvy::dotenv().ok();
    let database_url = database_url_from_env();

    println!("📊 Database URL: {}", mask_url(&database_url));

    // Ensure data directory exists for SQLite
    if let Some(db_path) = sqlite_path(&database_url) {
        if let Some(parent) = Path::new(db_path).parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                println!("📁 Creating directory: {}", parent.display());
                std::fs::create_dir_all(parent)?;
            }
        }
    }

    let db_manager = DatabaseManager::new(&database_url).await
        .map_err(|e| anyhow!("Failed to connect to database: {}", e))?;
    Ok(db_manager)
}

async fn run_migrations() -> Result<()> {
    println!("🔧 Eco Bot - Database Migration Tool");
    println!("====================================");

    let db_manager = connect().await?;

    println!("🚀 Running database migrations...");

    match db_manager.run_migrations().await {
        Ok(_) => {
            println!("✅ Migrations completed successfully!");
        }
        Err(e) => {
            eprintln!("❌ Migration failed: {e}");
            std::process::exit(1);
        }
    }

    Ok(())
}

async fn check_database() -> Result<()> {
    println!("🔍 Checking database connection and schema...");

    let db_manager = connect().await?;

    match check_tables(&db_manager).await {
        Ok(tables) => {
            println!("✅ Database connection successful!");
            println!("📋 Found tables:");
            for table in &tables {
                println!("  • {table}");
            }
            if tables.iter().any(|t| t == "users") {
                let users = UserRecord::count(&db_manager.pool).await?;
                println!("👥 Registered users: {users}");
            }
        }
        Err(e) => {
            println!("⚠️  Database check failed: {e}");
            println!("💡 Try running 'migrate up' to create the schema");
        }
    }

    Ok(())
}

/// Writes legacy users that have no row yet. Existing rows are left alone.
async fn import_legacy(file: &Path) -> Result<()> {
    println!("📥 Importing legacy users from {}", file.display());

    if !file.exists() {
        return Err(anyhow!("Legacy file not found: {}", file.display()));
    }

    let db_manager = connect().await?;
    db_manager.run_migrations().await?;

    // Unlike the startup import, a corrupt file is an error here.
    let json = tokio::fs::read_to_string(file).await?;
    let users = parse_legacy_users(&json)?;
    let mut imported = 0;
    let mut skipped = 0;
    for user in users {
        if UserRecord::find_by_id(&db_manager.pool, user.id).await?.is_some() {
            skipped += 1;
            continue;
        }
        user.save(&db_manager.pool).await?;
        imported += 1;
    }

    println!("✅ Imported {imported} users, kept {skipped} existing rows");
    Ok(())
}

async fn reset_database() -> Result<()> {
    println!("⚠️  WARNING: This will delete ALL data in the database!");
    println!("🤔 Are you sure you want to continue? (yes/no)");

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;

    if input.trim().to_lowercase() != "yes" {
        println!("❌ Reset cancelled.");
        return Ok(());
    }

    dotenvy::dotenv().ok();
    let database_url = database_url_from_env();

    // For SQLite, we can just delete the file
    match sqlite_path(&database_url) {
        Some(db_path) => {
            if Path::new(db_path).exists() {
                std::fs::remove_file(db_path)?;
                println!("🗑️  Deleted database file: {db_path}");
            }
        }
        None => return Err(anyhow!("Reset is only supported for SQLite databases")),
    }

    // Run migrations to recreate the schema
    println!("🔄 Recreating database schema...");
    run_migrations().await?;

    println!("✅ Database reset completed!");

    Ok(())
}

async fn check_tables(db_manager: &DatabaseManager) -> Result<Vec<String>> {
    let tables = sqlx::query_scalar::<_, String>("SELECT name FROM sqlite_master WHERE type='table'")
        .fetch_all(&db_manager.pool)
        .await?;

    Ok(tables)
}

fn sqlite_path(url: &str) -> Option<&str> {
    let path = url.strip_prefix("sqlite:")?;
    Some(path.strip_prefix("//").unwrap_or(path))
}

fn mask_url(url: &str) -> String {
    // Simple URL masking for security (don't show full paths in production)
    match sqlite_path(url).and_then(|path| Path::new(path).file_name()) {
        Some(filename) => format!("sqlite:.../{}", filename.to_string_lossy()),
        None => url.to_string(),
    }
}

fn print_help() {
    println!("🌿 Eco Bot - Database Migration Tool");
    println!();
    println!("USAGE:");
    println!("    migrate [COMMAND]");
    println!();
    println!("COMMANDS:");
    println!("    migrate, up    Run database migrations (default)");
    println!("    check          Check database connection, schema and user count");
    println!("    import <file>  Import a legacy JSON user dump (existing rows win)");
    println!("    reset          Reset database (SQLite only) - DESTRUCTIVE!");
    println!("    help           Show this help message");
    println!();
    println!("ENVIRONMENT:");
    println!("    DATABASE_URL   Database connection string (default: sqlite:./data/ecobot.db)");
    println!();
    println!("EXAMPLES:");
    println!("    migrate                        # Run migrations");
    println!("    migrate check                  # Check database status");
    println!("    migrate import user_data.json  # One-time legacy import");
    println!();
}
