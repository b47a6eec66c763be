use rusqlite::Connection;
use tempfile::NamedTempFile;

// Helper function to create a temporary file-based database with the given schema
pub fn create_temp_db(schema: &str) -> NamedTempFile {
    let temp_file = NamedTempFile::new().unwrap();
    let conn = Connection::open(temp_file.path()).unwrap();
    conn.execute_batch(schema).unwrap();
    conn.close().unwrap();
    temp_file
}

// Fixture with the `offices` and `employees` tables
pub fn create_offices_db() -> NamedTempFile {
    create_temp_db(
        r#"
        CREATE TABLE offices (
            officeCode TEXT PRIMARY KEY,
            city TEXT NOT NULL
        );
        CREATE TABLE employees (
            employeeNumber INTEGER PRIMARY KEY,
            lastName TEXT NOT NULL,
            officeCode TEXT REFERENCES offices(officeCode)
        );
        CREATE INDEX idx_employees_office ON employees(officeCode);
        INSERT INTO offices (officeCode, city) VALUES ('1', 'Boston');
        INSERT INTO employees (employeeNumber, lastName, officeCode) VALUES (1002, 'Murphy', '1');
        "#,
    )
}
