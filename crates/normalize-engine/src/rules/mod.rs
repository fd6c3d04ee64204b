pub mod base_rent;
pub mod budget;
pub mod country_settings;
pub mod free_rent;
pub mod leases;
pub mod mla;
