//! Financial data provider clients

pub mod yahoo;

pub use yahoo::YahooRevenueLookup;
