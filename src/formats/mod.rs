//! File format adapters
//!
//! Readers for the fragment list and centromere inputs, and the reader and
//! writer of the distance law table.

pub mod fragments;
pub mod table;

pub use fragments::{read_centromeres, read_fragment_list, parse_fragment_line};
pub use table::{export_distance_law, export_slopes, import_distance_law, write_distance_law};
