pub mod policy;
pub mod reports;
pub mod simulation;

pub use policy::PolicyKind;
pub use reports::RunReport;
pub use simulation::run_matrix;
