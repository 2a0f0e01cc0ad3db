//! Domain model: entities, value objects, validation rules and the ports
//! that storage and payment adapters implement.

pub mod access;
pub mod contest;
pub mod money;
pub mod payment;
pub mod player;
pub mod ports;
pub mod principal;
pub mod profile;
pub mod team;
