//! A small, handle-based interface to [SQLite].
//!
//! <br>
//!
//! ## Usage
//!
//! Everything starts with a [`Database`]. SQL is either run directly through
//! [`execute`], or compiled once with [`prepare`] into a [`Statement`] whose
//! named parameters can be [bound] before it is run with
//! [`execute_statement`]. Both produce a [`Rows`] cursor, which is positioned
//! on the first row as soon as it is returned.
//!
//! A [`Row`] hands out [`Field`]s by column name or position, and a field is
//! converted into a Rust value with [`Field::read`].
//!
//! <br>
//!
//! #### Connecting and querying
//!
//! ```
//! use sqlhandle::{AccessMode, Database, IN_MEMORY};
//!
//! let db = Database::open(IN_MEMORY, AccessMode::ReadWriteCreate)?;
//!
//! db.execute_batch(r#"
//!     CREATE TABLE users (name TEXT, age INTEGER);
//!
//!     INSERT INTO users VALUES ('Alice', 42);
//!     INSERT INTO users VALUES ('Bob', 52);
//! "#)?;
//!
//! let users = db
//!     .execute("SELECT name, age FROM users ORDER BY age")?
//!     .mapped(|row| Ok((row.get("name")?.read::<String>(), row.get("age")?.read::<i64>())))
//!     .collect::<sqlhandle::Result<Vec<_>>>()?;
//!
//! assert_eq!(users, [("Alice".to_string(), 42), ("Bob".to_string(), 52)]);
//! # Ok::<_, sqlhandle::Error>(())
//! ```
//!
//! <br>
//!
//! #### Binding parameters
//!
//! ```
//! use sqlhandle::{AccessMode, Database, IN_MEMORY};
//!
//! let db = Database::open(IN_MEMORY, AccessMode::ReadWriteCreate)?;
//! db.execute("CREATE TABLE users (name TEXT, age INTEGER)")?;
//!
//! let mut insert = db.prepare("INSERT INTO users VALUES (:name, :age)")?;
//!
//! for (name, age) in [("Alice", 42), ("Bob", 52)] {
//!     insert.bind(":name", name)?;
//!     insert.bind(":age", age)?;
//!     db.execute_statement(&insert)?;
//! }
//!
//! let mut select = db.prepare("SELECT name FROM users WHERE age > @age")?;
//! select.bind("age", 50)?;
//!
//! let rows = db.execute_statement(&select)?;
//! assert_eq!(rows.row().unwrap().get("name")?.read::<String>(), "Bob");
//! # Ok::<_, sqlhandle::Error>(())
//! ```
//!
//! <br>
//!
//! #### Transactions
//!
//! [`as_transaction`] wraps a unit of work in `BEGIN` and `COMMIT`, rolling
//! back if the work fails. A write which conflicts with another connection is
//! reported as [`Error::TransactionFailed`].
//!
//! <br>
//!
//! ## Features
//!
//! * `bundled` (default) builds and links the SQLite library shipped with
//!   `sqll-sys`.
//! * `threadsafe` (default) makes [`Database`] [`Send`].
//!
//! [SQLite]: https://www.sqlite.org
//! [`execute`]: Database::execute
//! [`prepare`]: Database::prepare
//! [`execute_statement`]: Database::execute_statement
//! [bound]: Statement::bind

#![warn(rustdoc::broken_intra_doc_links)]
#![cfg_attr(docsrs, feature(doc_cfg))]


mod bind_value;
mod bytes;
mod database;
mod error;
mod ffi;
mod field;
mod handle;
mod open_options;
mod row;
mod rows;
mod statement;
mod transaction;
mod value;
mod version;

#[doc(inline)]
pub use self::bind_value::{BindValue, Null};
#[doc(inline)]
pub use self::database::{Database, IN_MEMORY, TEMPORARY};
#[doc(inline)]
pub use self::error::{Code, Error, ErrorKind, Result};
#[doc(inline)]
pub use self::field::{Field, FromField};
#[doc(inline)]
pub use self::open_options::{AccessMode, CacheVisibility, OpenOptions, memory_uri};
#[doc(inline)]
pub use self::row::{ColumnIndex, Row};
#[doc(inline)]
pub use self::rows::{Mapped, Rows};
#[doc(inline)]
pub use self::statement::Statement;
#[doc(inline)]
pub use self::transaction::as_transaction;
#[doc(inline)]
pub use self::value::Type;
#[doc(inline)]
pub use self::version::{lib_version, lib_version_number};
