//! POST sensor measurements to DIANA (JSON) or SPARK (form) back-ends.
//!
//! ```no_run
//! use measurement_poster::{MeasurementRecord, Poster, Quantity, ServerType, Unit};
//!
//! let poster = Poster::new("http://localhost:8080/measurements", ServerType::Diana)?;
//! let record = MeasurementRecord::now("s1", Quantity::new(21.5, Unit::Celsius));
//! if !poster.post(&record) {
//!     eprintln!("measurement not delivered, see logs");
//! }
//! # Ok::<(), measurement_poster::PosterError>(())
//! ```

pub mod config;
pub mod poster;
pub mod record;
pub mod replay;
pub mod transport;

pub use poster::{Poster, PosterError, ServerType};
pub use record::{MeasurementRecord, Quantity, Unit};
