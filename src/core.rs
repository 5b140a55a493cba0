pub mod access;
pub mod forms;
pub mod models;
pub mod ports;
pub mod results;
pub mod services;
