pub mod controller_model;
