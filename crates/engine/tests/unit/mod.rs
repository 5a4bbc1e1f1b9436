//! # Unit Components
//!
//! This module organizes the unit tests by engine structure, one file per
//! component, plus the façade tests that exercise the end-to-end
//! lookup/update/squash contract.

/// Unit tests for the Branch Target Buffer.
pub mod btb;


/// Unit tests for the saturating counter primitives.
pub mod counter;



/// Unit tests for the speculative history tracker.
pub mod history;

/// Unit tests for the indirect target predictor.
pub mod indirect;
