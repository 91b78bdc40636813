//! A library to train attention-based GANs for facial expression editing

#![deny(rustdoc::broken_intra_doc_links)]

pub mod compose;
pub mod dataset;
pub mod error;
pub mod function;
pub mod metric;
pub mod model;
pub mod monitor;
pub mod range;
pub mod sample;
pub mod train;
