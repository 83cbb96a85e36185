//! gridsched - Conference schedule extraction from programme grid spreadsheets
//!
//! This crate reads a human-oriented conference programme grid (one worksheet of an
//! XLSX workbook: day headings, time slots, room columns, free-text cells) and turns it
//! into normalized schedule entries. Two projections are provided on top of the same
//! extraction engine: a topic → people directory (JSON) and a relational seed script (SQL).
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use std::fs::File;
//! use gridsched::ExtractorBuilder;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Create an extractor with default settings (topic directory projection)
//!     let extractor = ExtractorBuilder::new().build()?;
//!
//!     // Open the programme workbook
//!     let input = File::open("programme.xlsx")?;
//!
//!     // Write the topic directory as JSON
//!     let output = File::create("topics.json")?;
//!     extractor.convert(input, output)?;
//!
//!     Ok(())
//! }
//! ```
//!
//! # Seed SQL
//!
//! ```rust,no_run
//! use std::fs::File;
//! use gridsched::{ExtractorBuilder, Projection, SheetSelector};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let extractor = ExtractorBuilder::new()
//!         .with_sheet_selector(SheetSelector::Name("Programme".to_string()))
//!         .with_projection(Projection::SeedSql)
//!         .with_timezone("Europe/London")
//!         .build()?;
//!
//!     let sql = extractor.convert_to_string(File::open("programme.xlsx")?)?;
//!     println!("{}", sql);
//!
//!     Ok(())
//! }
//! ```
//!
//! # Working with a grid directly
//!
//! The engine itself is a pure function of a [`CellGrid`]; no workbook is needed.
//!
//! ```rust
//! use gridsched::{CellGrid, Category, ExtractorBuilder};
//!
//! # fn main() -> Result<(), gridsched::GridScheduleError> {
//! let grid = CellGrid::from_cells([
//!     (4, "B", "Science, Technology and Society"),
//!     (4, "C", "STS"),
//!     (10, "A", "Wednesday 8 April 2026"),
//!     (10, "C", "Room 1"),
//!     (11, "B", "09:00-10:30 Paper Session"),
//!     (11, "C", "STS2"),
//!     (12, "C", "Jane Smith"),
//! ]);
//!
//! let schedule = ExtractorBuilder::new().build()?.extract(&grid)?;
//! let entry = &schedule.entries[0];
//! assert_eq!(entry.category, Category::Theme);
//! assert_eq!(entry.theme_code.as_deref(), Some("STS"));
//! assert_eq!(entry.participants, vec!["Jane Smith"]);
//! # Ok(())
//! # }
//! ```

mod api;
mod builder;
mod error;
mod grid;
mod layout;
mod output;
mod parser;
mod schedule;
mod security;
mod text;
mod themes;
mod types;

// 公開API
pub use api::{Category, ExtractionMode, Projection, SheetSelector};
pub use builder::{Extractor, ExtractorBuilder};
pub use error::GridScheduleError;
pub use grid::CellGrid;
pub use layout::{GridLayout, RoundtableAddendum};
pub use output::{Topic, TopicDirectory};
pub use schedule::Schedule;
pub use themes::ThemeDirectory;
pub use types::{DaySection, ScheduleEntry};
