pub mod classify;
pub mod dates;
pub mod enrich;
pub mod normalize;
pub mod row;
