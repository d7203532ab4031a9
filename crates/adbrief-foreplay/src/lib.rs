//! Client for the Foreplay ad-discovery API and the ad selector built on it.
//!
//! The client resolves tracked brand names to Foreplay brand ids and lists
//! each brand's most recent ads. The selector walks the tracked brands in a
//! random order, filters and ranks their ads, and stops as soon as enough
//! brands have something new to show.

pub mod client;
pub mod credits;
pub mod error;
pub mod select;
pub mod types;

pub use client::ForeplayClient;
pub use credits::{CreditLedger, CreditUsage};
pub use error::ForeplayError;
pub use select::{
    is_in_market, qualify_ads, rank_ads, select_ads, select_in_order, shuffle_brands, FilterStats,
    SelectOptions, SelectionReport,
};
