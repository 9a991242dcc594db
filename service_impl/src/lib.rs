pub mod canton;
pub mod clock;
pub mod macros;
pub mod permission;
pub mod statistics;
pub mod time_record;
pub mod user_category;
pub mod uuid_service;

#[cfg(test)]
pub mod test;
