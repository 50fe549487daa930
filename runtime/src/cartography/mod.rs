//! Cartography: sitemap discovery, extraction and page-title derivation.

pub mod robots;
pub mod sitemap;
pub mod title;
