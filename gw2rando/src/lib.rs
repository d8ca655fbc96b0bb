pub mod eligibility;
pub mod helpers;
pub mod randomize;
pub mod regions;
pub mod settings;
pub mod traverse;
