use criterion::Criterion;
use sqlhandle::{AccessMode, Database, IN_MEMORY};

criterion::criterion_group!(benches, read_statement, write_statement);
criterion::criterion_main!(benches);

fn read_statement(bencher: &mut Criterion) {
    let db = create();
    populate(&db, 100);

    let mut statement = db
        .prepare("SELECT * FROM data WHERE a > :a AND b > :b")
        .unwrap();

    bencher.bench_function("read_statement", |b| {
        b.iter(|| {
            statement.bind(":a", 42).unwrap();
            statement.bind(":b", 42.0).unwrap();

            let mut rows = db.execute_statement(&statement).unwrap();

            while let Some(row) = rows.next().unwrap() {
                assert!(row.get(0).unwrap().read::<i64>() > 42);
                assert!(row.get(1).unwrap().read::<f64>() > 42.0);
            }
        });
    });
}

fn write_statement(bencher: &mut Criterion) {
    let db = create();
    let mut statement = db
        .prepare("INSERT INTO data (a, b, c, d) VALUES (:a, :b, :c, :d)")
        .unwrap();

    bencher.bench_function("write_statement", |b| {
        b.iter(|| {
            statement.bind(":a", 42).unwrap();
            statement.bind(":b", 42.0).unwrap();
            statement.bind(":c", 42.0).unwrap();
            statement.bind(":d", 42.0).unwrap();

            let rows = db.execute_statement(&statement).unwrap();
            assert!(rows.is_done());
        });
    });
}

fn create() -> Database {
    let db = Database::open(IN_MEMORY, AccessMode::ReadWriteCreate).unwrap();
    db.execute("CREATE TABLE data (a INTEGER, b REAL, c REAL, d REAL)")
        .unwrap();
    db
}

fn populate(db: &Database, count: usize) {
    let mut statement = db
        .prepare("INSERT INTO data (a, b, c, d) VALUES (:a, :b, :c, :d)")
        .unwrap();

    for i in 0..count {
        statement.bind("a", i as i64).unwrap();
        statement.bind("b", i as f64).unwrap();
        statement.bind("c", i as f64).unwrap();
        statement.bind("d", i as f64).unwrap();
        assert!(db.execute_statement(&statement).unwrap().is_done());
    }
}
