pub mod controllers;
pub mod dto;
pub mod error;
pub mod repositories;
pub mod response;
pub mod routes;
pub mod state;
