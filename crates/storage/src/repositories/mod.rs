pub mod trades_repo;
