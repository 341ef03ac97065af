pub mod decision;
pub mod device;
pub mod game;
pub mod market;
pub mod parameters;
pub mod report;
pub mod search;
pub mod station;
pub mod validation;
