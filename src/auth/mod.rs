pub mod controller;
pub mod jwt;
pub mod middleware;
pub mod model;
pub mod password;
pub mod service;
