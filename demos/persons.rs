use std::io::{self, Write};
use std::time::Instant;

use sqlhandle::{AccessMode, Database, IN_MEMORY, as_transaction};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut db = Database::open(IN_MEMORY, AccessMode::ReadWriteCreate)?;

    db.execute(
        r#"
        CREATE TABLE IF NOT EXISTS persons (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL
        )
        "#,
    )?;

    as_transaction(&mut db, |db| {
        let mut stmt = db.prepare("INSERT INTO persons (name) VALUES (:name)")?;

        for name in ["Steven", "John", "Alex"] {
            stmt.bind(":name", name)?;
            db.execute_statement(&stmt)?;
        }

        Ok::<_, sqlhandle::Error>(())
    })?;

    let stmt = db.prepare("SELECT id, name FROM persons")?;

    let mut o = io::sink();

    let start = Instant::now();
    let mut c = 0;

    for _ in 0..100_000 {
        writeln!(o, "Found persons:")?;

        let mut rows = db.execute_statement(&stmt)?;

        while let Some(row) = rows.next()? {
            c += 1;

            let id = row.get("id")?.read::<i64>();
            let name = row.get("name")?;
            writeln!(o, "ID: {id}, Name: {}", name.read::<String>())?;
        }
    }

    println!("Elapsed: {:?}", start.elapsed());
    println!("Total persons found: {c}");
    println!("Database size: {} bytes", db.size()?);
    Ok(())
}
