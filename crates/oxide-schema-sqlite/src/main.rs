//! oxide-schema CLI
//!
//! Command-line tool for comparing a SQLite database with a schema file and migrating it.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

use oxide_schema_core::{Diff, MigrateOperation, Schema, parse_column};
use oxide_schema_sqlite::backup::backup;
use oxide_schema_sqlite::{Database, DatabaseOptions};

/// Keeps a SQLite database in line with a declared schema.
#[derive(Parser)]
#[command(name = "oxide-schema")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Database URL (SQLite path or connection string).
    #[arg(short, long, env = "DATABASE_URL", default_value = "sqlite:db.sqlite3")]
    database: String,

    /// Enable verbose output.
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the operations that would bring the database in line with a schema file.
    Diff {
        /// File of `CREATE TABLE` statements.
        schema: PathBuf,

        /// Only compare this table.
        #[arg(short, long)]
        table: Option<String>,

        /// Report renamed columns as an added and a dropped column.
        #[arg(long)]
        no_rename: bool,

        /// Print the diff as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Migrate the database to match a schema file. Dry run unless `--write` is given.
    Migrate {
        /// File of `CREATE TABLE` statements.
        schema: PathBuf,

        /// Only migrate this table.
        #[arg(short, long)]
        table: Option<String>,

        /// Report renamed columns as an added and a dropped column.
        #[arg(long)]
        no_rename: bool,

        /// Perform the migration.
        #[arg(long)]
        write: bool,

        /// Don't back up the database file first.
        #[arg(long)]
        no_backup: bool,
    },

    /// Print the live schema as SQL.
    Schema,

    /// Drop a table.
    DropTable {
        /// Table name.
        table: String,
    },

    /// Rename a table.
    RenameTable {
        /// Current table name.
        old_name: String,
        /// New table name.
        new_name: String,
    },

    /// Add a column, e.g. `add-column people "age INTEGER"`.
    AddColumn {
        /// Table name.
        table: String,
        /// Column definition.
        column: String,
    },

    /// Drop a column.
    DropColumn {
        /// Table name.
        table: String,
        /// Column name.
        column: String,
    },

    /// Replace a column's definition, e.g. `alter-column people "age INTEGER NOT NULL"`.
    AlterColumn {
        /// Table name.
        table: String,
        /// New column definition.
        column: String,
    },

    /// Rename a column.
    RenameColumn {
        /// Table name.
        table: String,
        /// Current column name.
        old_name: String,
        /// New column name.
        new_name: String,
    },

    /// Put a table's columns in a new order.
    ReorderColumns {
        /// Table name.
        table: String,
        /// Every column name, in the new order.
        #[arg(required = true)]
        columns: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let log_level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .without_time()
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let write = match &cli.command {
        Commands::Diff { .. } | Commands::Schema => false,
        Commands::Migrate { write, .. } => *write,
        _ => true,
    };
    let options = DatabaseOptions::new(&cli.database).readonly(!write);

    match cli.command {
        Commands::Diff {
            schema,
            table,
            no_rename,
            json,
        } => {
            let db = Database::connect(options).await?;
            let diff = compute_diff(&db, &schema, table.as_deref(), !no_rename)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&diff)?);
            } else {
                print_diff(&diff);
            }
        }

        Commands::Migrate {
            schema,
            table,
            no_rename,
            write,
            no_backup,
        } => {
            let file = options.file_path();
            let mut db = Database::connect(options).await?;
            let diff = compute_diff(&db, &schema, table.as_deref(), !no_rename)?;
            if !write {
                print_diff(&diff);
                if !diff.is_empty() {
                    info!("Dry run mode - pass --write to apply.");
                }
                return Ok(());
            }
            if diff.is_empty() {
                print_diff(&diff);
                return Ok(());
            }

            print_operations(&diff);
            if let (false, Some(file)) = (no_backup, &file) {
                let target = backup(file)?;
                println!();
                println!("Backup of database saved at {}", target.display());
            }
            db.apply_diff(&diff).await?;
            println!();
            println!(
                "Performed {} operation(s) on {} table(s).",
                diff.len(),
                diff.tables().len()
            );
        }

        Commands::Schema => {
            let db = Database::connect(options).await?;
            print!("{}", db.schema());
        }

        Commands::DropTable { table } => {
            let mut db = Database::connect(options).await?;
            db.drop_table(&table).await?;
            println!("Table {table:?} dropped from the database.");
        }

        Commands::RenameTable { old_name, new_name } => {
            let mut db = Database::connect(options).await?;
            db.rename_table(&old_name, &new_name).await?;
            println!("Table {old_name:?} renamed to {new_name:?}.");
        }

        Commands::AddColumn { table, column } => {
            let mut db = Database::connect(options).await?;
            db.add_column(&table, parse_column(&column)?).await?;
            println!("Column added to table {table:?}.");
        }

        Commands::DropColumn { table, column } => {
            let mut db = Database::connect(options).await?;
            db.drop_column(&table, &column).await?;
            println!("Column {column:?} dropped from table {table:?}.");
        }

        Commands::AlterColumn { table, column } => {
            let mut db = Database::connect(options).await?;
            let column = parse_column(&column)?;
            let name = column.name.clone();
            db.alter_column(&table, column).await?;
            println!("Column {name:?} altered in table {table:?}.");
        }

        Commands::RenameColumn {
            table,
            old_name,
            new_name,
        } => {
            let mut db = Database::connect(options).await?;
            db.rename_column(&table, &old_name, &new_name).await?;
            println!("Column {old_name:?} renamed to {new_name:?} in table {table:?}.");
        }

        Commands::ReorderColumns { table, columns } => {
            let mut db = Database::connect(options).await?;
            let order: Vec<&str> = columns.iter().map(String::as_str).collect();
            db.reorder_columns(&table, &order).await?;
            println!("Columns of table {table:?} reordered.");
        }
    }

    Ok(())
}

/// Reads a schema file and diffs the database against it, or against one of its tables.
fn compute_diff(
    db: &Database,
    path: &Path,
    table: Option<&str>,
    detect_renaming: bool,
) -> anyhow::Result<Diff> {
    let declared = Schema::from_sql(&std::fs::read_to_string(path)?)?;
    let diff = match table {
        Some(name) => {
            let table = declared
                .table(name)
                .ok_or_else(|| anyhow::anyhow!("table {name:?} is not declared in {}", path.display()))?;
            db.diff_table(table, detect_renaming)
        }
        None => db.diff(&declared, detect_renaming),
    };
    Ok(diff)
}

/// Prints a diff grouped by table, followed by its summary.
fn print_diff(diff: &Diff) {
    if diff.is_empty() {
        println!("No changes.");
        return;
    }
    print_operations(diff);
    println!();
    println!("{}", diff.summary());
}

/// Prints one block per table touched by the diff.
fn print_operations(diff: &Diff) {
    for (i, table) in diff.tables().into_iter().enumerate() {
        if i > 0 {
            println!();
        }
        let operations: Vec<&MigrateOperation> = diff.for_table(table).collect();
        match operations.as_slice() {
            [single @ (MigrateOperation::CreateTable { .. } | MigrateOperation::DropTable { .. })] => {
                println!("{single}");
            }
            _ => {
                println!("Table {table}");
                for operation in operations {
                    println!("  - {operation}");
                }
            }
        }
    }
}
