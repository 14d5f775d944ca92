pub(crate) mod artifact_controller;
pub(crate) mod health_check_controller;
