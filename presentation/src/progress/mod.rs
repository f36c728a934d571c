//! Progress reporting while a validation job drains

pub mod reporter;
