#[cfg(test)]
pub mod canton;
#[cfg(test)]
pub mod time_record;
