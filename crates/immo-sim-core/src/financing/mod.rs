pub mod capacity;
pub mod loan;
