//! Census API client and the broadband lookup built on it

pub mod client;
pub mod lookup;

pub use client::{CensusClient, CensusSource, CensusTable};
pub use lookup::{BroadbandLookup, BroadbandResult};
