pub mod predictor;
pub mod replay;
pub mod run;
pub mod state;
