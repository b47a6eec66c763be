use std::process;

use anyhow::Result;
use clap::Parser;
use sqlite_tables::sqlite::DEFAULT_DB_PATH;
use sqlite_tables::{Connection, SqliteConfig, Table};
use tracing_subscriber::EnvFilter;

const OFFICES_SQL: &str = "SELECT * FROM offices;";

#[derive(Parser, Debug)]
#[command(name = "sqlite-tables", about = "Load SQLite query results into tables")]
struct Cli {
    /// Path to the database file
    #[arg(default_value = DEFAULT_DB_PATH)]
    db_path: String,

    /// Print tables as JSON instead of a text grid
    #[arg(long)]
    json: bool,
}

fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let config = SqliteConfig::new(cli.db_path);

    if let Err(err) = run(&config, cli.json) {
        eprintln!("error: {err:#}");
        process::exit(1);
    }
}

fn run(config: &SqliteConfig, json: bool) -> Result<()> {
    // Row tuples, column names fetched separately.
    let mut conn = Connection::from_config(config)?;
    let outcome = cursor_walkthrough(&mut conn, json);
    let closed = conn.close();
    outcome?;
    closed?;

    // Single-step tables.
    let mut conn = Connection::from_config(config)?;
    let outcome = table_walkthrough(&mut conn, json);
    let closed = conn.close();
    outcome?;
    closed?;
    Ok(())
}

fn cursor_walkthrough(conn: &mut Connection, json: bool) -> Result<()> {
    let names = conn.list_tables()?;
    println!("tables: {names:?}");

    let offices = conn.query(OFFICES_SQL)?;
    for row in &offices.rows {
        let cells: Vec<String> = row.iter().map(ToString::to_string).collect();
        println!("({})", cells.join(", "));
    }
    println!("columns: {:?}", conn.columns_of()?);

    let table = Table::new(conn.columns_of()?.to_vec(), offices.rows)?;
    print_table(&table, json)
}

fn table_walkthrough(conn: &mut Connection, json: bool) -> Result<()> {
    print_table(&conn.read_tables()?, json)?;
    print_table(&conn.query_as_table(OFFICES_SQL)?, json)
}

fn print_table(table: &Table, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(table)?);
    } else {
        print!("{table}");
    }
    Ok(())
}
