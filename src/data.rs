pub mod generator;
pub mod interchange;
pub mod prices;
