pub mod kinds;
pub mod run;
