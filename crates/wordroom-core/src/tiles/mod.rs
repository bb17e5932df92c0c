pub mod alphabet;
pub mod letter;
pub mod pool;
