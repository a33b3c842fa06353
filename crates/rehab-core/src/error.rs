//! Error types for the rehab coach core.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("{0} must not be empty")]
    EmptyField(&'static str),

    #[error("no patient with id '{0}'")]
    PatientNotFound(String),

    #[error("no exercise with id '{0}' in the catalog")]
    UnknownExercise(String),

    #[error("no patient is bound to the plan builder")]
    NoPatientSelected,
}

pub type Result<T> = std::result::Result<T, Error>;
