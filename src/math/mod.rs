pub mod partition;
pub mod random;
pub mod vector;
