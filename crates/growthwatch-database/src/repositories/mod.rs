//! Repository implementations.

pub mod profile;

pub use profile::ProfileRepository;
