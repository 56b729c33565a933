pub mod history;
pub mod maps;
pub mod routes;
