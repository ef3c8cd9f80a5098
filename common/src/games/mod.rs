pub mod connect4;
